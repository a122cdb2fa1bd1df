use thiserror::Error;

/// Failure taxonomy for the derivation and gating layer.
///
/// Every variant is recoverable by a user retry or an address change;
/// nothing here aborts the session.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("invalid amount: {0}")]
    InvalidAmountFormat(String),
    #[error("malformed position record: {0}")]
    MalformedPositionRecord(String),
    #[error("no position selected")]
    NoPositionSelected,
    #[error("position {0} has not matured yet")]
    PositionNotMatured(u64),
    #[error("connected address is not the ledger owner")]
    NotAuthorized,
    #[error("requested amount exceeds the ledger balance")]
    AmountExceedsBalance,
    #[error("lock period of {0} days is not offered by the ledger")]
    UnknownLockPeriod(u64),
    #[error("ledger communication failure: {0}")]
    LedgerCommunicationFailure(String),
    #[error("transaction rejected: {0}")]
    TransactionRejected(String),
}

/// Returns early with the given error when the condition does not hold.
macro_rules! require {
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Err($err);
        }
    };
}

pub(crate) use require;
