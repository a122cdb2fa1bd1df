//! Client-side derivation and gating layer for a term-deposit staking
//! ledger.
//!
//! The ledger contract alone owns funds, lock periods, and payout math;
//! this crate sits between a UI and that contract:
//!
//! 1. Reading:
//!    - raw position records are normalized into unit-correct domain
//!      objects, tolerating big-integer wire encodings without truncation
//!    - time-dependent fields (day countdown, withdrawable value) are
//!      derived on every read against an explicit clock
//!    - the collection of one address's positions is fetched concurrently
//!      and published wholesale, never partially
//!
//! 2. Gating:
//!    - stake, unstake, and privileged withdrawal intents are validated
//!      locally (amount shape, maturity, owner authorization) before any
//!      transaction is submitted
//!    - privileged actions additionally pass an irreversibility
//!      confirmation
//!    - each action kind is debounced to one dispatch in flight
//!
//! 3. Session:
//!    - a [`Session`] is created per connected address and replaced on an
//!      address change; it owns the view-mode machine, the published
//!      collection, and the authorization context
//!
//! Nothing here signs, broadcasts, or persists; the [`StakingLedger`] and
//! [`ConfirmationPrompt`] collaborators own those edges.

pub mod error;
pub mod events;
mod guard;
pub mod ledger;
pub mod processor;
pub mod session;
pub mod state;
mod sync;
pub mod units;


pub use error::EngineError;
pub use events::{ActionOutcome, ActionRequest, FixedStakeInput};
pub use ledger::{RawField, RawPosition, StakingLedger, TransactionHandle};
pub use processor::{resolve_fixed_stake, ConfirmationPrompt};
pub use session::{Session, ViewMode};
pub use state::{
    days_remaining, Address, AuthorizationContext, ContractSummary, Position, PositionCollection,
};
