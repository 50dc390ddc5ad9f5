use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::RoomId;
use crate::domains::rooms::models::RoomSnapshot;

/// One write to a room document, as published by the `games` change feed.
///
/// Delivery is at-least-once: the same `event_id` may arrive more than once,
/// and events for different rooms arrive concurrently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomWriteEvent {
    pub event_id: Uuid,
    pub room_id: RoomId,
    /// Absent when the write created the room.
    #[serde(default)]
    pub before: Option<RoomSnapshot>,
    pub after: RoomSnapshot,
}

impl RoomWriteEvent {
    /// Build an event with a fresh id, keyed by the `after` snapshot's room.
    pub fn new(before: Option<RoomSnapshot>, after: RoomSnapshot) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            room_id: after.room_id.clone(),
            before,
            after,
        }
    }
}

/// Outcome of comparing the two snapshots of a write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    /// The room just entered `pendingJoin`; the host should be told.
    JoinRequested,
    NoOp,
}
