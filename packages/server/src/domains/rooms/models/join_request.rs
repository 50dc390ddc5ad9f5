use std::collections::BTreeMap;

use crate::common::utils::{
    AndroidConfig, AndroidNotification, ApnsConfig, ApnsPayload, Aps, PushMessage,
    PushNotification,
};
use crate::common::RoomId;

pub const JOIN_REQUEST_TYPE: &str = "join_request";
pub const JOIN_REQUEST_TITLE: &str = "Join Request";
pub const JOIN_REQUESTS_CHANNEL_ID: &str = "join_requests";

/// Intent the Flutter client registers for notification taps.
const CLICK_ACTION: &str = "FLUTTER_NOTIFICATION_CLICK";

/// Build the push message telling a host that `guest_name` asked to join.
///
/// The data block is what the client deep-links on; the title and body are
/// only for display and may change without breaking the app.
pub fn join_request_message(room_id: &RoomId, guest_name: &str) -> PushMessage {
    let notification = PushNotification {
        title: JOIN_REQUEST_TITLE.to_string(),
        body: format!("{} wants to join your game", guest_name),
    };

    let data = BTreeMap::from([
        ("type".to_string(), JOIN_REQUEST_TYPE.to_string()),
        ("roomId".to_string(), room_id.to_string()),
        ("guestName".to_string(), guest_name.to_string()),
        ("click_action".to_string(), CLICK_ACTION.to_string()),
    ]);

    PushMessage {
        android: Some(AndroidConfig {
            priority: "high".to_string(),
            notification: Some(AndroidNotification {
                channel_id: JOIN_REQUESTS_CHANNEL_ID.to_string(),
                notification_priority: Some("PRIORITY_HIGH".to_string()),
            }),
        }),
        apns: Some(ApnsConfig {
            headers: BTreeMap::from([("apns-priority".to_string(), "10".to_string())]),
            payload: ApnsPayload {
                aps: Aps {
                    alert: Some(notification.clone()),
                    sound: Some("default".to_string()),
                    badge: Some(1),
                },
            },
        }),
        notification,
        data,
    }
}
