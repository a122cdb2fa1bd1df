//! Process-local session context: one connected address, its published
//! ledger state, and the view-mode machine that drives synchronization.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use tokio::sync::RwLock;

use crate::error::EngineError;
use crate::events::{ActionOutcome, ActionRequest};
use crate::ledger::StakingLedger;
use crate::processor::{self, ActionSlots, ConfirmationPrompt};
use crate::state::{Address, AuthorizationContext, ContractSummary, PositionCollection};
use crate::sync;

/// Which action set the UI currently shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewMode {
    FlexibleStake,
    FlexibleUnstake,
}

/// Session context for one connected address.
///
/// Created on connect, replaced wholesale on an address or network change,
/// dropped on disconnect. Published state is single-writer (the
/// synchronizer and the gate) and multi-reader, and is replaced wholesale
/// rather than mutated field by field.
pub struct Session<L, P> {
    ledger: L,
    prompt: P,
    connected: Address,
    mode: RwLock<ViewMode>,
    positions: RwLock<PositionCollection>,
    summary: RwLock<Option<ContractSummary>>,
    /// Latest sync generation handed out; only this generation may publish.
    sync_generation: AtomicU64,
    syncs_in_flight: AtomicUsize,
    slots: ActionSlots,
}

impl<L, P> Session<L, P> {
    /// Builds the context for a freshly connected address. No network work
    /// happens here; [`Session::refresh`] pulls the first summary.
    pub fn connect(ledger: L, prompt: P, connected: Address) -> Self {
        Self {
            ledger,
            prompt,
            connected,
            mode: RwLock::new(ViewMode::FlexibleStake),
            positions: RwLock::new(PositionCollection::default()),
            summary: RwLock::new(None),
            sync_generation: AtomicU64::new(0),
            syncs_in_flight: AtomicUsize::new(0),
            slots: ActionSlots::default(),
        }
    }

    pub fn connected(&self) -> &Address {
        &self.connected
    }

    pub async fn mode(&self) -> ViewMode {
        *self.mode.read().await
    }

    /// Switches back to the stake view. The last-fetched collection stays
    /// cached until the next sync or an address change; an in-flight sync
    /// is not cancelled.
    pub async fn switch_to_stake(&self) {
        *self.mode.write().await = ViewMode::FlexibleStake;
    }

    /// Snapshot of the published collection.
    pub async fn positions(&self) -> PositionCollection {
        self.positions.read().await.clone()
    }

    pub async fn summary(&self) -> Option<ContractSummary> {
        self.summary.read().await.clone()
    }

    /// Connected address paired with the ledger-reported owner; `None`
    /// until a summary has been fetched.
    pub async fn authorization(&self) -> Option<AuthorizationContext> {
        self.summary.read().await.as_ref().map(|summary| AuthorizationContext {
            connected: self.connected.clone(),
            owner: summary.owner.clone(),
        })
    }

    /// True while any synchronization is in flight.
    pub fn is_syncing(&self) -> bool {
        self.syncs_in_flight.load(Ordering::Acquire) > 0
    }

    pub(crate) fn ledger(&self) -> &L {
        &self.ledger
    }

    pub(crate) fn prompt(&self) -> &P {
        &self.prompt
    }

    pub(crate) fn slots(&self) -> &ActionSlots {
        &self.slots
    }

    pub(crate) fn begin_sync(&self) -> u64 {
        self.syncs_in_flight.fetch_add(1, Ordering::AcqRel);
        self.sync_generation.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub(crate) fn finish_sync(&self) {
        self.syncs_in_flight.fetch_sub(1, Ordering::AcqRel);
    }

    /// Publishes a freshly built collection if `generation` is still the
    /// latest requested. Returns whether the publish happened.
    pub(crate) async fn publish_positions(
        &self,
        generation: u64,
        collection: PositionCollection,
    ) -> bool {
        if self.sync_generation.load(Ordering::Acquire) != generation {
            return false;
        }
        *self.positions.write().await = collection;
        true
    }

    pub(crate) async fn publish_summary(&self, summary: ContractSummary) {
        *self.summary.write().await = Some(summary);
    }
}

impl<L, P> Session<L, P>
where
    L: StakingLedger,
    P: ConfirmationPrompt,
{
    /// Switches to the unstake view and synchronizes the collection. A
    /// repeat switch is a no-op. An in-flight sync from an earlier switch
    /// is not cancelled; the generation rule handles its late result.
    pub async fn switch_to_unstake(&self) -> Result<(), EngineError> {
        {
            let mut mode = self.mode.write().await;
            if *mode == ViewMode::FlexibleUnstake {
                return Ok(());
            }
            *mode = ViewMode::FlexibleUnstake;
        }
        sync::sync_positions(self).await
    }

    /// Forces a full re-synchronization: summary always, positions when
    /// the unstake view is active.
    pub async fn refresh(&self) -> Result<(), EngineError> {
        sync::fetch_summary(self).await?;
        if self.mode().await == ViewMode::FlexibleUnstake {
            sync::sync_positions(self).await?;
        }
        Ok(())
    }

    /// Validates and dispatches a user action.
    ///
    /// Gate rejections come back as errors before any network call; ledger
    /// and signer failures come back as errors after dispatch. The
    /// non-error terminals are in [`ActionOutcome`]. `now` is the clock
    /// the maturity gate is evaluated against.
    pub async fn dispatch(
        &self,
        request: ActionRequest,
        now: i64,
    ) -> Result<ActionOutcome, EngineError> {
        processor::dispatch(self, request, now).await
    }
}
