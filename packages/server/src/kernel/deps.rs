//! Server dependencies for room reactions (using traits for testability)
//!
//! This module provides the dependency container handed to the change-feed
//! listener and the scheduler. External services sit behind trait objects so
//! tests can swap in the mocks from `test_dependencies`.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::common::utils::{FcmClient, PushMessage};
use crate::common::{DeliveryHandle, RoomId};
use crate::domains::rooms::{RoomSnapshot, RoomStatus, SweepConsistency};
use crate::kernel::{BasePushNotificationService, BaseRoomStore};

// =============================================================================
// FcmClient Adapter (implements BasePushNotificationService trait)
// =============================================================================

/// Wrapper around FcmClient that implements BasePushNotificationService trait
pub struct FcmAdapter(pub Arc<FcmClient>);

impl FcmAdapter {
    pub fn new(client: Arc<FcmClient>) -> Self {
        Self(client)
    }
}

#[async_trait]
impl BasePushNotificationService for FcmAdapter {
    async fn send(&self, push_token: &str, message: &PushMessage) -> Result<DeliveryHandle> {
        self.0.send(push_token, message).await
    }
}

// =============================================================================
// Postgres room store (implements BaseRoomStore trait)
// =============================================================================

/// Room store backed by the `games` table
#[derive(Clone)]
pub struct PgRoomStore {
    pool: PgPool,
}

impl PgRoomStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseRoomStore for PgRoomStore {
    async fn find_expired(
        &self,
        now: DateTime<Utc>,
        statuses: &[RoomStatus],
    ) -> Result<Vec<RoomId>> {
        RoomSnapshot::find_expired(now, statuses, &self.pool).await
    }

    async fn delete_batch(
        &self,
        ids: &[RoomId],
        only_statuses: Option<&[RoomStatus]>,
    ) -> Result<u64> {
        RoomSnapshot::delete_batch(ids, only_statuses, &self.pool).await
    }
}

// =============================================================================
// ServerDeps
// =============================================================================

/// Dependencies shared by every room reaction (using traits for testability)
#[derive(Clone)]
pub struct ServerDeps {
    pub room_store: Arc<dyn BaseRoomStore>,
    pub push_service: Arc<dyn BasePushNotificationService>,
    pub sweep_consistency: SweepConsistency,
}

impl ServerDeps {
    /// Create new ServerDeps with the given dependencies
    pub fn new(
        room_store: Arc<dyn BaseRoomStore>,
        push_service: Arc<dyn BasePushNotificationService>,
        sweep_consistency: SweepConsistency,
    ) -> Self {
        Self {
            room_store,
            push_service,
            sweep_consistency,
        }
    }
}
