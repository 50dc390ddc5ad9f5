// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Business logic (classifying transitions, deciding what to sweep) lives in
// domain actions that take these traits as parameters.
//
// Naming convention: Base* for trait names (e.g., BaseRoomStore)

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::common::utils::PushMessage;
use crate::common::{DeliveryHandle, RoomId};
use crate::domains::rooms::RoomStatus;

// =============================================================================
// Push Notification Trait (Infrastructure)
// =============================================================================

#[async_trait]
pub trait BasePushNotificationService: Send + Sync {
    /// Submit one message addressed to a device push token.
    ///
    /// `Ok` means the provider accepted the message for delivery; it says
    /// nothing about whether the device received it.
    async fn send(&self, push_token: &str, message: &PushMessage) -> Result<DeliveryHandle>;
}

// =============================================================================
// Room Store Trait (Infrastructure - document store over the `games` table)
// =============================================================================

#[async_trait]
pub trait BaseRoomStore: Send + Sync {
    /// Keys of rooms with `expires_at < now` whose status is one of `statuses`.
    async fn find_expired(&self, now: DateTime<Utc>, statuses: &[RoomStatus])
        -> Result<Vec<RoomId>>;

    /// Delete `ids` as one batch; either every row goes or none does.
    ///
    /// With `only_statuses` set, a row is only deleted if its status is still
    /// one of those values at delete time. Returns the number of rows removed.
    async fn delete_batch(&self, ids: &[RoomId], only_statuses: Option<&[RoomStatus]>)
        -> Result<u64>;
}
