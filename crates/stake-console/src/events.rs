//! Messages that cross the UI boundary: user intents going in, dispatch
//! outcomes coming back.

/// One lock-period amount row as entered in the fixed-term staking panel.
#[derive(Clone, Debug)]
pub struct FixedStakeInput {
    pub lock_days: u64,
    pub amount: String,
}

/// An in-flight user intent.
///
/// Amounts arrive as the raw UI strings; parsing and validation happen in
/// the gate, not at construction. A rejected request is never retried
/// automatically.
#[derive(Clone, Debug)]
pub enum ActionRequest {
    StakeFlexible { amount: String },
    StakeFixed { lock_days: u64, amount: String },
    UnstakeFlexible { position_id: Option<u64> },
    EmergencyWithdrawAll,
    EmergencyWithdrawAmount { amount: String },
}

/// Terminal result of a dispatched action. Gate rejections and ledger
/// failures are reported as errors, not outcomes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The ledger confirmed the transaction and local state was refreshed.
    Confirmed,
    /// The user declined the irreversibility confirmation; nothing was
    /// dispatched and no error is surfaced.
    Declined,
    /// Another dispatch holds this action's slot; the attempt was dropped,
    /// not queued.
    InFlight,
}
