//! The action gate: validates a prospective action locally, debounces its
//! slot, hands it to the ledger, and classifies the result.
//!
//! Every rejection here happens before a network call, so the ledger never
//! has to revert what the client can already see is invalid.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{info, warn};

use crate::error::{require, EngineError};
use crate::events::{ActionOutcome, ActionRequest, FixedStakeInput};
use crate::guard;
use crate::ledger::{StakingLedger, TransactionHandle};
use crate::session::{Session, ViewMode};
use crate::sync;
use crate::units;

const WITHDRAW_ALL_WARNING: &str =
    "Withdraw every deposit held by the ledger? This cannot be undone.";
const WITHDRAW_AMOUNT_WARNING: &str =
    "Withdraw the requested amount from the ledger? This cannot be undone.";

/// UI collaborator that shows the irreversibility warning for privileged
/// actions and reports the user's choice.
pub trait ConfirmationPrompt {
    fn confirm_irreversible(&self, warning: &str) -> bool;
}

/// Resolves the fixed-term staking panel's input rows into a single
/// request.
///
/// A row carries a value when its amount parses to a positive number.
/// With several carrying rows the lowest duration wins; a non-empty row
/// that does not parse fails the resolution rather than being skipped.
pub fn resolve_fixed_stake(inputs: &[FixedStakeInput]) -> Result<ActionRequest, EngineError> {
    let mut chosen: Option<(u64, String)> = None;
    for input in inputs {
        if input.amount.trim().is_empty() {
            continue;
        }
        let value = units::to_base_units(&input.amount)?;
        if value == 0 {
            continue;
        }
        match &chosen {
            Some((lock_days, _)) if *lock_days <= input.lock_days => {}
            _ => chosen = Some((input.lock_days, input.amount.clone())),
        }
    }
    let (lock_days, amount) = chosen.ok_or_else(|| {
        EngineError::InvalidAmountFormat("no lock period amount entered".into())
    })?;
    Ok(ActionRequest::StakeFixed { lock_days, amount })
}

/// Mutating dispatches are serialized per slot: a stake and an unstake may
/// be in flight at the same time, two actions of the same slot may not.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ActionSlot {
    FlexibleStake,
    FixedStake,
    Unstake,
    Admin,
}

impl ActionRequest {
    pub(crate) fn slot(&self) -> ActionSlot {
        match self {
            ActionRequest::StakeFlexible { .. } => ActionSlot::FlexibleStake,
            ActionRequest::StakeFixed { .. } => ActionSlot::FixedStake,
            ActionRequest::UnstakeFlexible { .. } => ActionSlot::Unstake,
            ActionRequest::EmergencyWithdrawAll
            | ActionRequest::EmergencyWithdrawAmount { .. } => ActionSlot::Admin,
        }
    }
}

#[derive(Default)]
pub(crate) struct ActionSlots {
    flexible_stake: AtomicBool,
    fixed_stake: AtomicBool,
    unstake: AtomicBool,
    admin: AtomicBool,
}

impl ActionSlots {
    fn flag(&self, slot: ActionSlot) -> &AtomicBool {
        match slot {
            ActionSlot::FlexibleStake => &self.flexible_stake,
            ActionSlot::FixedStake => &self.fixed_stake,
            ActionSlot::Unstake => &self.unstake,
            ActionSlot::Admin => &self.admin,
        }
    }

    /// `None` while another dispatch holds the slot.
    fn acquire(&self, slot: ActionSlot) -> Option<SlotGuard<'_>> {
        let flag = self.flag(slot);
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SlotGuard { flag })
    }
}

/// Frees the slot on every exit path, early returns included.
struct SlotGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

pub(crate) async fn dispatch<L, P>(
    session: &Session<L, P>,
    request: ActionRequest,
    now: i64,
) -> Result<ActionOutcome, EngineError>
where
    L: StakingLedger,
    P: ConfirmationPrompt,
{
    let slot = request.slot();
    let Some(_slot_guard) = session.slots().acquire(slot) else {
        info!(target: "dispatch", ?slot, "dispatch already in flight, dropping attempt");
        return Ok(ActionOutcome::InFlight);
    };

    match request {
        ActionRequest::StakeFlexible { amount } => stake_flexible(session, &amount).await,
        ActionRequest::StakeFixed { lock_days, amount } => {
            stake_fixed(session, lock_days, &amount).await
        }
        ActionRequest::UnstakeFlexible { position_id } => {
            unstake(session, position_id, now).await
        }
        ActionRequest::EmergencyWithdrawAll => emergency_withdraw_all(session).await,
        ActionRequest::EmergencyWithdrawAmount { amount } => {
            emergency_withdraw_amount(session, &amount).await
        }
    }
}

async fn stake_flexible<L, P>(
    session: &Session<L, P>,
    amount: &str,
) -> Result<ActionOutcome, EngineError>
where
    L: StakingLedger,
{
    let value = units::to_base_units(amount)?;
    guard::require_positive(value)?;
    submit_stake(session, 0, value).await
}

async fn stake_fixed<L, P>(
    session: &Session<L, P>,
    lock_days: u64,
    amount: &str,
) -> Result<ActionOutcome, EngineError>
where
    L: StakingLedger,
{
    let value = units::to_base_units(amount)?;
    guard::require_positive(value)?;
    // Without a cached summary the offered periods are unknown; the ledger
    // enforces them either way.
    if let Some(summary) = session.summary().await {
        if !summary.lock_periods.is_empty() {
            require!(
                summary.lock_periods.contains(&lock_days),
                EngineError::UnknownLockPeriod(lock_days)
            );
        }
    }
    submit_stake(session, lock_days, value).await
}

async fn submit_stake<L, P>(
    session: &Session<L, P>,
    lock_days: u64,
    value: u128,
) -> Result<ActionOutcome, EngineError>
where
    L: StakingLedger,
{
    info!(target: "dispatch", lock_days, value = %value, "submitting stake");
    let tx = session.ledger().submit_stake(lock_days, value).await?;
    tx.confirmed().await?;
    info!(target: "dispatch", lock_days, "stake confirmed");
    refresh_after_action(session).await;
    Ok(ActionOutcome::Confirmed)
}

async fn unstake<L, P>(
    session: &Session<L, P>,
    position_id: Option<u64>,
    now: i64,
) -> Result<ActionOutcome, EngineError>
where
    L: StakingLedger,
{
    let position_id = position_id.ok_or(EngineError::NoPositionSelected)?;
    let positions = session.positions().await;
    let position = positions
        .get(position_id)
        .ok_or(EngineError::NoPositionSelected)?;
    guard::require_matured(position, now)?;

    info!(target: "dispatch", position_id, "submitting unstake");
    let tx = session.ledger().submit_unstake(position_id).await?;
    tx.confirmed().await?;
    info!(target: "dispatch", position_id, "unstake confirmed");
    refresh_after_action(session).await;
    Ok(ActionOutcome::Confirmed)
}

async fn emergency_withdraw_all<L, P>(
    session: &Session<L, P>,
) -> Result<ActionOutcome, EngineError>
where
    L: StakingLedger,
    P: ConfirmationPrompt,
{
    guard::require_owner(session.authorization().await.as_ref())?;
    if !session.prompt().confirm_irreversible(WITHDRAW_ALL_WARNING) {
        return Ok(ActionOutcome::Declined);
    }

    info!(target: "dispatch", "submitting emergency withdrawal of full balance");
    let tx = session.ledger().submit_emergency_withdraw_all().await?;
    tx.confirmed().await?;
    info!(target: "dispatch", "emergency withdrawal confirmed");
    refresh_after_action(session).await;
    Ok(ActionOutcome::Confirmed)
}

async fn emergency_withdraw_amount<L, P>(
    session: &Session<L, P>,
    amount: &str,
) -> Result<ActionOutcome, EngineError>
where
    L: StakingLedger,
    P: ConfirmationPrompt,
{
    guard::require_owner(session.authorization().await.as_ref())?;
    let value = units::to_base_units(amount)?;
    guard::require_positive(value)?;
    let summary = session.summary().await.ok_or(EngineError::NotAuthorized)?;
    require!(value <= summary.balance, EngineError::AmountExceedsBalance);

    if !session.prompt().confirm_irreversible(WITHDRAW_AMOUNT_WARNING) {
        return Ok(ActionOutcome::Declined);
    }

    info!(target: "dispatch", value = %value, "submitting emergency withdrawal");
    let tx = session
        .ledger()
        .submit_emergency_withdraw_amount(value)
        .await?;
    tx.confirmed().await?;
    info!(target: "dispatch", value = %value, "emergency withdrawal confirmed");
    refresh_after_action(session).await;
    Ok(ActionOutcome::Confirmed)
}

/// Best-effort refresh once an action is confirmed. A failure here is a
/// logging matter; the action itself already succeeded.
async fn refresh_after_action<L, P>(session: &Session<L, P>)
where
    L: StakingLedger,
{
    if let Err(err) = sync::fetch_summary(session).await {
        warn!(target: "dispatch", ?err, "summary refresh after confirmed action failed");
    }
    if session.mode().await == ViewMode::FlexibleUnstake {
        if let Err(err) = sync::sync_positions(session).await {
            warn!(target: "dispatch", ?err, "position refresh after confirmed action failed");
        }
    }
}
