//! Dispatch action - turns a room write into at most one push notification

use tracing::{debug, error, info, instrument, warn};

use crate::common::DeliveryHandle;
use crate::domains::rooms::actions::classify_transition;
use crate::domains::rooms::events::{RoomWriteEvent, TransitionKind};
use crate::domains::rooms::models::join_request_message;
use crate::kernel::BasePushNotificationService;

/// Why a write did not produce a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The write was not a transition into `pendingJoin`.
    NoOp,
    /// Join requested, but the host has no push token to address.
    NoToken,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchResult {
    Sent(DeliveryHandle),
    Skipped(SkipReason),
    /// The push provider rejected the message. Already logged.
    Failed(String),
}

/// Notify the host of a room when a guest asks to join.
///
/// This action:
/// 1. Classifies the write from its own before/after pair
/// 2. Skips when the host has no push token
/// 3. Sends exactly one join-request message to the host
///
/// Never returns an error: a rejected send is logged and reported as
/// `Failed` so the write that triggered it is not retried or rolled back.
/// Calling it twice for the same event may send twice.
#[instrument(skip(event, push_service), fields(room_id = %event.room_id, event_id = %event.event_id))]
pub async fn dispatch_room_write(
    event: &RoomWriteEvent,
    push_service: &dyn BasePushNotificationService,
) -> DispatchResult {
    if classify_transition(event.before.as_ref(), &event.after) == TransitionKind::NoOp {
        debug!("Room write is not a join request, skipping");
        return DispatchResult::Skipped(SkipReason::NoOp);
    }

    let Some(host_token) = event.after.host_token() else {
        warn!("No FCM token for host, skipping join request notification");
        return DispatchResult::Skipped(SkipReason::NoToken);
    };

    let guest_name = event.after.guest_display_name();
    let message = join_request_message(&event.room_id, guest_name);

    debug!(guest = %guest_name, "Sending join request notification");

    match push_service.send(host_token, &message).await {
        Ok(handle) => {
            info!(delivery = %handle, "Join request notification sent");
            DispatchResult::Sent(handle)
        }
        Err(e) => {
            error!(error = %e, "Failed to send join request notification");
            DispatchResult::Failed(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::RoomId;
    use crate::domains::rooms::models::{RoomSnapshot, RoomStatus};
    use crate::kernel::test_dependencies::MockPushNotificationService;
    use chrono::Utc;

    fn room(status: RoomStatus, token: Option<&str>, guest: Option<&str>) -> RoomSnapshot {
        RoomSnapshot {
            room_id: RoomId::new("room-42"),
            status,
            host_fcm_token: token.map(str::to_string),
            pending_guest_name: guest.map(str::to_string),
            expires_at: Utc::now(),
        }
    }

    fn join_event(token: Option<&str>, guest: Option<&str>) -> RoomWriteEvent {
        RoomWriteEvent::new(
            Some(room(RoomStatus::Waiting, token, None)),
            room(RoomStatus::PendingJoin, token, guest),
        )
    }

    #[tokio::test]
    async fn sends_one_message_to_host_on_join_request() {
        let push = MockPushNotificationService::new();

        let result = dispatch_room_write(&join_event(Some("host-token"), Some("Vanna")), &push).await;

        assert!(matches!(result, DispatchResult::Sent(_)));
        let sent = push.sent_messages();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "host-token");
        assert_eq!(sent[0].1.data["type"], "join_request");
        assert_eq!(sent[0].1.data["roomId"], "room-42");
        assert!(sent[0].1.notification.body.contains("Vanna"));
    }

    #[tokio::test]
    async fn missing_guest_name_falls_back_to_someone() {
        let push = MockPushNotificationService::new();

        dispatch_room_write(&join_event(Some("host-token"), None), &push).await;

        let sent = push.sent_messages();
        assert_eq!(sent[0].1.notification.body, "Someone wants to join your game");
        assert_eq!(sent[0].1.data["guestName"], "Someone");
    }

    #[tokio::test]
    async fn skips_without_host_token() {
        let push = MockPushNotificationService::new();

        for token in [None, Some(""), Some("  ")] {
            let result = dispatch_room_write(&join_event(token, Some("Vanna")), &push).await;
            assert_eq!(result, DispatchResult::Skipped(SkipReason::NoToken));
        }

        assert_eq!(push.send_count(), 0);
    }

    #[tokio::test]
    async fn skips_noop_writes_without_sending() {
        let push = MockPushNotificationService::new();
        let event = RoomWriteEvent::new(
            Some(room(RoomStatus::PendingJoin, Some("t"), Some("Vanna"))),
            room(RoomStatus::PendingJoin, Some("t"), Some("Vanna")),
        );

        let result = dispatch_room_write(&event, &push).await;

        assert_eq!(result, DispatchResult::Skipped(SkipReason::NoOp));
        assert_eq!(push.send_count(), 0);
    }

    #[tokio::test]
    async fn provider_rejection_is_reported_not_raised() {
        let push = MockPushNotificationService::new().failing_with("registration-token-not-registered");

        let result = dispatch_room_write(&join_event(Some("stale-token"), None), &push).await;

        match result {
            DispatchResult::Failed(reason) => {
                assert!(reason.contains("registration-token-not-registered"))
            }
            other => panic!("expected Failed, got {:?}", other),
        }
        assert_eq!(push.send_count(), 1);
    }

    #[tokio::test]
    async fn redelivered_event_is_tolerated() {
        let push = MockPushNotificationService::new();
        let event = join_event(Some("host-token"), Some("Vanna"));

        let first = dispatch_room_write(&event, &push).await;
        let second = dispatch_room_write(&event, &push).await;

        assert!(matches!(first, DispatchResult::Sent(_)));
        assert!(matches!(second, DispatchResult::Sent(_)));
        assert_eq!(push.send_count(), 2);
    }
}
