//! Sweep action - reclaims rooms that expired before anyone joined
//!
//! The query predicate is the only gate in the default mode: a room that
//! becomes `active` between the select and the delete is still deleted. This
//! is an accepted risk while the sweep interval is short next to typical
//! join latency. `SweepConsistency::Conditional` closes the window by
//! re-checking the status inside the delete statement.

use chrono::{DateTime, Utc};
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::domains::rooms::models::RECLAIMABLE_STATUSES;
use crate::kernel::BaseRoomStore;

/// How the batch delete guards against rooms that moved on after the query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SweepConsistency {
    /// Delete exactly what the query matched.
    #[default]
    QueryGated,
    /// Delete only rows still in a reclaimable status at delete time.
    Conditional,
}

impl FromStr for SweepConsistency {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "query-gated" | "query_gated" => Ok(Self::QueryGated),
            "conditional" => Ok(Self::Conditional),
            other => anyhow::bail!("unknown sweep consistency mode: {}", other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepResult {
    pub deleted_count: u64,
}

/// A failed sweep attempt. Nothing is reconciled; the next run re-queries.
#[derive(Error, Debug)]
pub enum SweepError {
    #[error("failed to query expired rooms: {0}")]
    StoreQuery(#[source] anyhow::Error),

    #[error("failed to delete {matched} expired rooms: {source}")]
    StoreDelete {
        matched: usize,
        #[source]
        source: anyhow::Error,
    },
}

/// Delete every room that expired before `now` while still waiting for a match.
///
/// The matched set is removed with one batched delete. Holds no state between
/// calls, so overlapping or repeated runs are harmless.
#[instrument(skip(store), fields(sweep_id = %Uuid::new_v4()))]
pub async fn sweep_expired_rooms(
    now: DateTime<Utc>,
    store: &dyn BaseRoomStore,
    consistency: SweepConsistency,
) -> Result<SweepResult, SweepError> {
    let expired = store
        .find_expired(now, &RECLAIMABLE_STATUSES)
        .await
        .map_err(SweepError::StoreQuery)?;

    if expired.is_empty() {
        debug!("No expired rooms to clean up");
        return Ok(SweepResult { deleted_count: 0 });
    }

    debug!(matched = expired.len(), "Deleting expired rooms");

    let guard = match consistency {
        SweepConsistency::QueryGated => None,
        SweepConsistency::Conditional => Some(&RECLAIMABLE_STATUSES[..]),
    };

    let deleted_count = store
        .delete_batch(&expired, guard)
        .await
        .map_err(|source| SweepError::StoreDelete {
            matched: expired.len(),
            source,
        })?;

    info!(
        matched = expired.len(),
        deleted = deleted_count,
        "Cleaned up {} expired rooms",
        deleted_count
    );

    Ok(SweepResult { deleted_count })
}
