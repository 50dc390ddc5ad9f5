use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::fmt;

use crate::common::RoomId;

/// Display name used when the guest did not provide one.
pub const FALLBACK_GUEST_NAME: &str = "Someone";

/// Statuses in which an expired room may be reclaimed by the sweeper.
/// Anything past matchmaking is never swept, whatever its `expires_at`.
pub static RECLAIMABLE_STATUSES: [RoomStatus; 2] =
    [RoomStatus::Waiting, RoomStatus::PendingJoin];

/// Lifecycle state of a room.
///
/// Only the matchmaking states are interpreted here; in-game states set by the
/// client round-trip through `Other` unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RoomStatus {
    Waiting,
    PendingJoin,
    Active,
    Other(String),
}

impl RoomStatus {
    pub fn as_str(&self) -> &str {
        match self {
            RoomStatus::Waiting => "waiting",
            RoomStatus::PendingJoin => "pendingJoin",
            RoomStatus::Active => "active",
            RoomStatus::Other(status) => status,
        }
    }

    pub fn is_reclaimable(&self) -> bool {
        RECLAIMABLE_STATUSES.contains(self)
    }
}

impl From<String> for RoomStatus {
    fn from(status: String) -> Self {
        match status.as_str() {
            "waiting" => RoomStatus::Waiting,
            "pendingJoin" => RoomStatus::PendingJoin,
            "active" => RoomStatus::Active,
            _ => RoomStatus::Other(status),
        }
    }
}

impl From<&str> for RoomStatus {
    fn from(status: &str) -> Self {
        status.to_string().into()
    }
}

impl From<RoomStatus> for String {
    fn from(status: RoomStatus) -> Self {
        match status {
            RoomStatus::Other(status) => status,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fields of a room document this engine reads.
///
/// Deserializes from the row image published on the change feed and from
/// `games` rows directly. Other columns (game state, timestamps) are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct RoomSnapshot {
    pub room_id: RoomId,
    #[sqlx(try_from = "String")]
    pub status: RoomStatus,
    pub host_fcm_token: Option<String>,
    pub pending_guest_name: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl RoomSnapshot {
    /// Host push token, or `None` when missing or blank.
    pub fn host_token(&self) -> Option<&str> {
        self.host_fcm_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }

    /// Guest name for display, falling back to "Someone".
    pub fn guest_display_name(&self) -> &str {
        self.pending_guest_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(FALLBACK_GUEST_NAME)
    }

    /// Find room by ID
    pub async fn find_by_id(room_id: &RoomId, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT room_id, status, host_fcm_token, pending_guest_name, expires_at
             FROM games
             WHERE room_id = $1",
        )
        .bind(room_id)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    /// Keys of rooms that expired before `now` while in one of `statuses`
    pub async fn find_expired(
        now: DateTime<Utc>,
        statuses: &[RoomStatus],
        pool: &PgPool,
    ) -> Result<Vec<RoomId>> {
        sqlx::query_scalar::<_, RoomId>(
            "SELECT room_id
             FROM games
             WHERE expires_at < $1
               AND status = ANY($2)
             ORDER BY expires_at",
        )
        .bind(now)
        .bind(status_strings(statuses))
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Delete a set of rooms in a single statement (atomic in Postgres)
    ///
    /// When `only_statuses` is given the status predicate is re-checked by the
    /// same statement, so rows that moved on since they were selected survive.
    pub async fn delete_batch(
        ids: &[RoomId],
        only_statuses: Option<&[RoomStatus]>,
        pool: &PgPool,
    ) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let keys: Vec<String> = ids.iter().map(|id| id.as_str().to_string()).collect();

        let result = match only_statuses {
            Some(statuses) => {
                sqlx::query("DELETE FROM games WHERE room_id = ANY($1) AND status = ANY($2)")
                    .bind(keys)
                    .bind(status_strings(statuses))
                    .execute(pool)
                    .await?
            }
            None => {
                sqlx::query("DELETE FROM games WHERE room_id = ANY($1)")
                    .bind(keys)
                    .execute(pool)
                    .await?
            }
        };

        Ok(result.rows_affected())
    }

    /// Insert a room (also publishes a creation event on the change feed)
    pub async fn insert(&self, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO games (room_id, status, host_fcm_token, pending_guest_name, expires_at)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING room_id, status, host_fcm_token, pending_guest_name, expires_at",
        )
        .bind(&self.room_id)
        .bind(self.status.as_str())
        .bind(&self.host_fcm_token)
        .bind(&self.pending_guest_name)
        .bind(self.expires_at)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// Move a room to a new status, recording the pending guest if any
    pub async fn update_status(
        room_id: &RoomId,
        status: &RoomStatus,
        pending_guest_name: Option<&str>,
        pool: &PgPool,
    ) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "UPDATE games
             SET status = $2, pending_guest_name = $3, updated_at = NOW()
             WHERE room_id = $1
             RETURNING room_id, status, host_fcm_token, pending_guest_name, expires_at",
        )
        .bind(room_id)
        .bind(status.as_str())
        .bind(pending_guest_name)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }
}

fn status_strings(statuses: &[RoomStatus]) -> Vec<String> {
    statuses.iter().map(|s| s.as_str().to_string()).collect()
}
