// TestDependencies - mock implementations for testing
//
// Provides mock services that can be injected into ServerDeps for tests.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use super::{BasePushNotificationService, BaseRoomStore, ServerDeps};
use crate::common::utils::PushMessage;
use crate::common::{DeliveryHandle, RoomId};
use crate::domains::rooms::{RoomSnapshot, RoomStatus, SweepConsistency};

// =============================================================================
// Mock Push Notification Service
// =============================================================================

pub struct MockPushNotificationService {
    sent_messages: Arc<Mutex<Vec<(String, PushMessage)>>>,
    failure: Option<String>,
}

impl MockPushNotificationService {
    pub fn new() -> Self {
        Self {
            sent_messages: Arc::new(Mutex::new(Vec::new())),
            failure: None,
        }
    }

    /// Reject every send with the given reason (the attempt is still recorded)
    pub fn failing_with(mut self, reason: impl Into<String>) -> Self {
        self.failure = Some(reason.into());
        self
    }

    /// Get all (token, message) pairs that were submitted
    pub fn sent_messages(&self) -> Vec<(String, PushMessage)> {
        self.sent_messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Get the number of send attempts
    pub fn send_count(&self) -> usize {
        self.sent_messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    /// Check if a message was sent to the given token
    pub fn was_sent_to(&self, token: &str) -> bool {
        self.sent_messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .any(|(t, _)| t == token)
    }
}

impl Default for MockPushNotificationService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BasePushNotificationService for MockPushNotificationService {
    async fn send(&self, push_token: &str, message: &PushMessage) -> Result<DeliveryHandle> {
        let count = {
            let mut sent = self.sent_messages.lock().unwrap_or_else(|e| e.into_inner());
            sent.push((push_token.to_string(), message.clone()));
            sent.len()
        };

        if let Some(reason) = &self.failure {
            anyhow::bail!("FCM API error 404: {}", reason);
        }

        Ok(DeliveryHandle(format!("projects/test/messages/{}", count)))
    }
}

// =============================================================================
// In-memory Room Store
// =============================================================================

#[derive(Default)]
pub struct InMemoryRoomStore {
    rooms: Mutex<BTreeMap<RoomId, RoomSnapshot>>,
    delete_batches: Mutex<Vec<Vec<RoomId>>>,
    guarded_deletes: Mutex<usize>,
    fail_queries: bool,
    fail_deletes: bool,
}

impl InMemoryRoomStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a fixture room with no host token
    pub fn with_room(self, id: &str, status: RoomStatus, expires_at: DateTime<Utc>) -> Self {
        self.insert(RoomSnapshot {
            room_id: RoomId::new(id),
            status,
            host_fcm_token: None,
            pending_guest_name: None,
            expires_at,
        });
        self
    }

    pub fn failing_queries(mut self) -> Self {
        self.fail_queries = true;
        self
    }

    pub fn failing_deletes(mut self) -> Self {
        self.fail_deletes = true;
        self
    }

    pub fn insert(&self, room: RoomSnapshot) {
        self.rooms
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(room.room_id.clone(), room);
    }

    /// Change a room's status in place, as a concurrent writer would
    pub fn set_status(&self, id: &RoomId, status: RoomStatus) {
        if let Some(room) = self
            .rooms
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get_mut(id)
        {
            room.status = status;
        }
    }

    /// Keys of the rooms still stored, in key order
    pub fn room_ids(&self) -> Vec<RoomId> {
        self.rooms
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect()
    }

    /// Every batch passed to `delete_batch`, in call order
    pub fn delete_batches(&self) -> Vec<Vec<RoomId>> {
        self.delete_batches
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Number of batches deleted with a status guard
    pub fn guarded_deletes(&self) -> usize {
        *self.guarded_deletes.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl BaseRoomStore for InMemoryRoomStore {
    async fn find_expired(
        &self,
        now: DateTime<Utc>,
        statuses: &[RoomStatus],
    ) -> Result<Vec<RoomId>> {
        if self.fail_queries {
            anyhow::bail!("room store unavailable");
        }

        Ok(self
            .rooms
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .filter(|room| room.expires_at < now && statuses.contains(&room.status))
            .map(|room| room.room_id.clone())
            .collect())
    }

    async fn delete_batch(
        &self,
        ids: &[RoomId],
        only_statuses: Option<&[RoomStatus]>,
    ) -> Result<u64> {
        if self.fail_deletes {
            anyhow::bail!("batch commit failed");
        }

        self.delete_batches
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(ids.to_vec());

        if only_statuses.is_some() {
            *self.guarded_deletes.lock().unwrap_or_else(|e| e.into_inner()) += 1;
        }

        let mut rooms = self.rooms.lock().unwrap_or_else(|e| e.into_inner());
        let mut deleted = 0;
        for id in ids {
            let allowed = match (rooms.get(id), only_statuses) {
                (None, _) => false,
                (Some(_), None) => true,
                (Some(room), Some(statuses)) => statuses.contains(&room.status),
            };
            if allowed {
                rooms.remove(id);
                deleted += 1;
            }
        }

        Ok(deleted)
    }
}

// =============================================================================
// Test ServerDeps
// =============================================================================

/// Container for test dependencies that keeps typed handles to the mocks
pub struct TestDependencies {
    pub room_store: Arc<InMemoryRoomStore>,
    pub push_service: Arc<MockPushNotificationService>,
    pub sweep_consistency: SweepConsistency,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            room_store: Arc::new(InMemoryRoomStore::new()),
            push_service: Arc::new(MockPushNotificationService::new()),
            sweep_consistency: SweepConsistency::default(),
        }
    }

    /// Set an in-memory room store
    pub fn mock_store(mut self, store: InMemoryRoomStore) -> Self {
        self.room_store = Arc::new(store);
        self
    }

    /// Set a mock push notification service
    pub fn mock_push(mut self, push: MockPushNotificationService) -> Self {
        self.push_service = Arc::new(push);
        self
    }

    pub fn consistency(mut self, consistency: SweepConsistency) -> Self {
        self.sweep_consistency = consistency;
        self
    }

    /// Build ServerDeps sharing the mocks held by this container
    pub fn server_deps(&self) -> ServerDeps {
        ServerDeps::new(
            self.room_store.clone(),
            self.push_service.clone(),
            self.sweep_consistency,
        )
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
