//! Builds and publishes the position collection for the connected address.
//!
//! One sync is one atomic unit: the id list is fetched, every record is
//! fetched concurrently, and the result replaces the published collection
//! wholesale. A failed sync clears the collection instead of leaving stale
//! entries behind.

use futures::future::try_join_all;
use tracing::{debug, warn};

use crate::error::EngineError;
use crate::ledger::StakingLedger;
use crate::session::Session;
use crate::state::{Position, PositionCollection};

/// Fetches, normalizes, and publishes the connected address's positions.
///
/// Each invocation is tagged with a generation; only the latest-requested
/// generation may publish, so a slow fetch cannot overwrite a newer result
/// (and cannot clear it on failure either).
pub(crate) async fn sync_positions<L, P>(session: &Session<L, P>) -> Result<(), EngineError>
where
    L: StakingLedger,
{
    let generation = session.begin_sync();
    let result = fetch_collection(session).await;
    let outcome = match result {
        Ok(collection) => {
            let count = collection.len();
            if session.publish_positions(generation, collection).await {
                debug!(target: "sync", generation, count, "published position collection");
            } else {
                warn!(target: "sync", generation, "discarding stale sync result");
            }
            Ok(())
        }
        Err(err) => {
            if session
                .publish_positions(generation, PositionCollection::default())
                .await
            {
                warn!(target: "sync", generation, ?err, "sync failed, cleared position collection");
            } else {
                warn!(target: "sync", generation, ?err, "discarding stale sync failure");
            }
            Err(err)
        }
    };
    session.finish_sync();
    outcome
}

async fn fetch_collection<L, P>(
    session: &Session<L, P>,
) -> Result<PositionCollection, EngineError>
where
    L: StakingLedger,
{
    let ledger = session.ledger();
    let ids = ledger
        .position_ids_for_address(session.connected())
        .await?;
    debug!(target: "sync", count = ids.len(), "fetched position ids");

    // All records fetched concurrently; the first failure fails the batch.
    let records = try_join_all(ids.iter().map(|id| ledger.position_by_id(*id))).await?;

    let mut positions = Vec::with_capacity(records.len());
    for record in &records {
        match Position::from_raw(record) {
            Ok(position) => positions.push(position),
            Err(err) => {
                warn!(target: "sync", ?err, "skipping malformed position record");
            }
        }
    }
    Ok(PositionCollection::from_positions(positions))
}

/// Fetches ledger-wide info and republishes the authorization context.
pub(crate) async fn fetch_summary<L, P>(session: &Session<L, P>) -> Result<(), EngineError>
where
    L: StakingLedger,
{
    let summary = session.ledger().contract_summary().await?;
    debug!(
        target: "sync",
        owner = %summary.owner,
        balance = %summary.balance,
        "fetched contract summary"
    );
    session.publish_summary(summary).await;
    Ok(())
}
