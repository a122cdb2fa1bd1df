//! Preconditions checked before a mutating dispatch leaves the process.

use crate::error::EngineError;
use crate::state::{AuthorizationContext, Position};

/// Privileged actions require the connected address to be the ledger
/// owner. `None` means no summary has been fetched yet, which is treated
/// as unauthorized rather than optimistically allowed.
pub fn require_owner(auth: Option<&AuthorizationContext>) -> Result<(), EngineError> {
    match auth {
        Some(context) if context.is_owner() => Ok(()),
        _ => Err(EngineError::NotAuthorized),
    }
}

/// Withdrawal is gated on the day countdown alone; a stale `open` flag
/// from a previous sync does not enter into it.
pub fn require_matured(position: &Position, now: i64) -> Result<(), EngineError> {
    if position.is_matured(now) {
        Ok(())
    } else {
        Err(EngineError::PositionNotMatured(position.position_id))
    }
}

/// Stake and withdrawal amounts must be strictly positive once parsed.
pub fn require_positive(value: u128) -> Result<(), EngineError> {
    if value > 0 {
        Ok(())
    } else {
        Err(EngineError::InvalidAmountFormat(
            "amount must be greater than zero".into(),
        ))
    }
}
