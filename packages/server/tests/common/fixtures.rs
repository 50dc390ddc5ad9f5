//! Test fixtures for creating rooms.
//!
//! These fixtures use the model methods directly so inserts go through the
//! same trigger the app's writes do.

use anyhow::Result;
use chrono::{DateTime, Utc};
use rooms_core::common::RoomId;
use rooms_core::domains::rooms::{RoomSnapshot, RoomStatus};
use sqlx::PgPool;
use uuid::Uuid;

/// A room id no other test will use
pub fn unique_room_id(prefix: &str) -> RoomId {
    RoomId::new(format!("{}-{}", prefix, Uuid::new_v4().simple()))
}

/// Build a room snapshot with a host token and no pending guest
pub fn room(id: &RoomId, status: RoomStatus, expires_at: DateTime<Utc>) -> RoomSnapshot {
    RoomSnapshot {
        room_id: id.clone(),
        status,
        host_fcm_token: Some(format!("fcm-{}", id)),
        pending_guest_name: None,
        expires_at,
    }
}

/// Insert a room into the games table
pub async fn create_test_room(
    pool: &PgPool,
    id: &RoomId,
    status: RoomStatus,
    expires_at: DateTime<Utc>,
) -> Result<RoomSnapshot> {
    room(id, status, expires_at).insert(pool).await
}
