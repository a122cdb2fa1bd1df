//! Wire-level records returned by the staking ledger and the collaborator
//! traits the engine drives.
//!
//! The ledger contract is the sole source of truth for balances and the
//! sole executor of fund transfers. Everything in this module is read from
//! it or submitted to it; nothing is owned here.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::state::{Address, ContractSummary};

/// A numeric wire field that may arrive as a native integer or as a
/// string-encoded big integer (decimal or `0x`-prefixed hex).
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum RawField {
    Uint(u64),
    Big(String),
}

impl Default for RawField {
    fn default() -> Self {
        RawField::Uint(0)
    }
}

impl RawField {
    /// Full-width reading of the value. `None` when it is not numeric or
    /// does not fit, never a truncated result.
    pub fn as_u128(&self) -> Option<u128> {
        match self {
            RawField::Uint(v) => Some(u128::from(*v)),
            RawField::Big(s) => {
                let s = s.trim();
                match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
                    Some(hex) => u128::from_str_radix(hex, 16).ok(),
                    None => s.parse().ok(),
                }
            }
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        self.as_u128().and_then(|v| u64::try_from(v).ok())
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_u128().and_then(|v| i64::try_from(v).ok())
    }
}

/// One position exactly as the ledger reports it, before normalization.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawPosition {
    pub position_id: Option<RawField>,
    pub percent_interest: RawField,
    pub unlock_date: Option<RawField>,
    pub wei_interest: RawField,
    pub wei_staked: RawField,
    pub open: bool,
}

/// Awaitable confirmation for a submitted mutation.
///
/// Confirmation is the only success signal the engine accepts; local state
/// is never updated speculatively before it resolves.
#[allow(async_fn_in_trait)]
pub trait TransactionHandle {
    async fn confirmed(self) -> Result<(), EngineError>;
}

/// The external ledger contract, as seen from this side of the wire.
///
/// Implementations map provider and network faults to
/// [`EngineError::LedgerCommunicationFailure`] and signer or contract
/// declines to [`EngineError::TransactionRejected`].
#[allow(async_fn_in_trait)]
pub trait StakingLedger {
    type Tx: TransactionHandle;

    async fn position_ids_for_address(&self, address: &Address) -> Result<Vec<u64>, EngineError>;

    async fn position_by_id(&self, id: u64) -> Result<RawPosition, EngineError>;

    async fn contract_summary(&self) -> Result<ContractSummary, EngineError>;

    /// Stakes `value` base units for `lock_days` days; 0 days is the
    /// flexible term.
    async fn submit_stake(&self, lock_days: u64, value: u128) -> Result<Self::Tx, EngineError>;

    async fn submit_unstake(&self, position_id: u64) -> Result<Self::Tx, EngineError>;

    async fn submit_emergency_withdraw_all(&self) -> Result<Self::Tx, EngineError>;

    async fn submit_emergency_withdraw_amount(&self, value: u128)
        -> Result<Self::Tx, EngineError>;
}
