use std::fmt;

use crate::error::EngineError;
use crate::ledger::RawPosition;

pub const SECONDS_PER_DAY: i64 = 86_400;

/// `percentInterest` wire values are scaled by this (800 = 8.00%).
pub const RATE_SCALE: u32 = 100;

/// Ledger account identifier.
///
/// Stored exactly as received for display; authorization comparisons go
/// through [`Address::matches`] because the ledger does not treat casing as
/// significant.
#[derive(Clone, Debug)]
pub struct Address(String);

impl Address {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive identity comparison.
    pub fn matches(&self, other: &Address) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// One deposit held by the ledger, unit-correct and internally consistent.
///
/// Time-dependent fields are derived on every read against an explicit
/// `now`; nothing derived is stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    pub position_id: u64,
    /// Principal in base units. Immutable once created.
    pub staked: u128,
    /// Accrued interest in base units, as currently reported by the ledger
    /// and treated as authoritative.
    pub interest: u128,
    /// Interest rate scaled by [`RATE_SCALE`], as assigned at creation.
    pub rate_bps: u32,
    /// Epoch seconds after which the position is eligible for withdrawal.
    pub unlock_ts: i64,
    /// Ledger-owned open/closed flag; observed here, never mutated.
    pub open: bool,
}

impl Position {
    /// Maps a raw ledger record into a `Position`.
    ///
    /// Fails per record, never per batch: the synchronizer drops a record
    /// this rejects and keeps the rest.
    pub fn from_raw(raw: &RawPosition) -> Result<Self, EngineError> {
        let position_id = raw
            .position_id
            .as_ref()
            .and_then(|field| field.as_u64())
            .ok_or_else(|| malformed("positionId missing or not numeric"))?;
        let unlock_ts = raw
            .unlock_date
            .as_ref()
            .and_then(|field| field.as_i64())
            .ok_or_else(|| malformed("unlockDate missing or not numeric"))?;
        let staked = raw
            .wei_staked
            .as_u128()
            .ok_or_else(|| malformed("weiStaked is not an integer in range"))?;
        let interest = raw
            .wei_interest
            .as_u128()
            .ok_or_else(|| malformed("weiInterest is not an integer in range"))?;
        let rate_bps = raw
            .percent_interest
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| malformed("percentInterest out of range"))?;

        // The withdrawable total must stay representable.
        staked
            .checked_add(interest)
            .ok_or_else(|| malformed("staked plus interest overflows"))?;

        Ok(Self {
            position_id,
            staked,
            interest,
            rate_bps,
            unlock_ts,
            open: raw.open,
        })
    }

    /// Whole days until unlock, floored, never negative.
    pub fn days_remaining(&self, now: i64) -> u64 {
        days_remaining(self.unlock_ts, now)
    }

    /// A position is withdrawable once the day countdown reaches zero. The
    /// ledger keeps second granularity; the countdown is deliberately
    /// day-granular.
    pub fn is_matured(&self, now: i64) -> bool {
        self.days_remaining(now) == 0
    }

    /// Principal plus reported interest, in base units. Purely additive;
    /// any payout math beyond that belongs to the ledger.
    pub fn withdrawable(&self) -> u128 {
        // from_raw guarantees this sum fits.
        self.staked.saturating_add(self.interest)
    }

    /// Display-only percentage, two decimal digits of fidelity. Exact rate
    /// math must use `rate_bps`.
    pub fn rate_percent(&self) -> f64 {
        f64::from(self.rate_bps) / f64::from(RATE_SCALE)
    }
}

/// Whole days between `now` and `unlock_ts`, floored and clamped at zero.
pub fn days_remaining(unlock_ts: i64, now: i64) -> u64 {
    let remaining = unlock_ts.saturating_sub(now);
    if remaining <= 0 {
        0
    } else {
        (remaining / SECONDS_PER_DAY) as u64
    }
}

/// Snapshot of the positions owned by one address.
///
/// Replaced wholesale by the synchronizer; never partially populated.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PositionCollection {
    items: Vec<Position>,
}

impl PositionCollection {
    /// Builds a collection, keeping the first record per id. The ledger
    /// assigns unique ids, so a duplicate within one batch is a wire
    /// anomaly and is dropped.
    pub fn from_positions(positions: Vec<Position>) -> Self {
        let mut items: Vec<Position> = Vec::with_capacity(positions.len());
        for position in positions {
            if items
                .iter()
                .any(|existing| existing.position_id == position.position_id)
            {
                tracing::warn!(
                    target: "sync",
                    position_id = position.position_id,
                    "duplicate position id in batch, keeping first"
                );
                continue;
            }
            items.push(position);
        }
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, position_id: u64) -> Option<&Position> {
        self.items.iter().find(|p| p.position_id == position_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Position> {
        self.items.iter()
    }

    /// Sum of open principal, in base units. Backs the unstake view's
    /// balance line.
    pub fn total_staked_open(&self) -> u128 {
        self.items
            .iter()
            .filter(|p| p.open)
            .fold(0u128, |acc, p| acc.saturating_add(p.staked))
    }
}

/// Ledger-wide totals and configuration from the contract info query.
#[derive(Clone, Debug)]
pub struct ContractSummary {
    pub owner: Address,
    pub total_positions: u64,
    /// Contract balance in base units.
    pub balance: u128,
    /// Offered lock periods, in days.
    pub lock_periods: Vec<u64>,
}

/// The connected address alongside the ledger-reported owner.
///
/// Re-derived whenever the summary is fetched; never cached beyond the
/// session.
#[derive(Clone, Debug)]
pub struct AuthorizationContext {
    pub connected: Address,
    pub owner: Address,
}

impl AuthorizationContext {
    pub fn is_owner(&self) -> bool {
        self.connected.matches(&self.owner)
    }
}

fn malformed(reason: &str) -> EngineError {
    EngineError::MalformedPositionRecord(reason.to_string())
}
