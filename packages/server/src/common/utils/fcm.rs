use anyhow::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{error, info};

use crate::common::DeliveryHandle;

const FCM_API_BASE: &str = "https://fcm.googleapis.com/v1/projects";

/// Firebase Cloud Messaging client (HTTP v1 API)
/// Sends push notifications to the mobile app's FCM registration tokens
pub struct FcmClient {
    client: Client,
    project_id: String,
    access_token: String,
}

/// A platform-agnostic push message. The target token is supplied at send time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PushMessage {
    pub notification: PushNotification,
    /// FCM requires every data value to be a string.
    pub data: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub android: Option<AndroidConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apns: Option<ApnsConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PushNotification {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AndroidConfig {
    pub priority: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<AndroidNotification>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AndroidNotification {
    pub channel_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_priority: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApnsConfig {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    pub payload: ApnsPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApnsPayload {
    pub aps: Aps,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert: Option<PushNotification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<u32>,
}

#[derive(Debug, Serialize)]
struct FcmRequest<'a> {
    message: FcmMessage<'a>,
}

#[derive(Debug, Serialize)]
struct FcmMessage<'a> {
    token: &'a str,
    #[serde(flatten)]
    message: &'a PushMessage,
}

#[derive(Debug, Deserialize)]
struct FcmResponse {
    name: String,
}

impl FcmClient {
    pub fn new(project_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            project_id: project_id.into(),
            access_token: access_token.into(),
        }
    }

    fn send_url(&self) -> String {
        format!("{}/{}/messages:send", FCM_API_BASE, self.project_id)
    }

    /// Send a push message to a single FCM registration token
    ///
    /// Returns the message name FCM assigned on acceptance. Any non-2xx
    /// response is an error; FCM does not retry on our behalf.
    pub async fn send(&self, token: &str, message: &PushMessage) -> Result<DeliveryHandle> {
        let request = FcmRequest {
            message: FcmMessage { token, message },
        };

        info!(project = %self.project_id, "Sending FCM push notification");

        let response = self
            .client
            .post(self.send_url())
            .bearer_auth(&self.access_token)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await?;
            error!("FCM push failed {}: {}", status, body);
            anyhow::bail!("FCM API error {}: {}", status, body);
        }

        let fcm_response: FcmResponse = response.json().await?;

        info!(message = %fcm_response.name, "FCM notification accepted");
        Ok(DeliveryHandle(fcm_response.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_message() -> PushMessage {
        PushMessage {
            notification: PushNotification {
                title: "Hello".to_string(),
                body: "World".to_string(),
            },
            data: BTreeMap::from([("k".to_string(), "v".to_string())]),
            android: None,
            apns: Some(ApnsConfig {
                headers: BTreeMap::new(),
                payload: ApnsPayload {
                    aps: Aps {
                        alert: None,
                        sound: Some("default".to_string()),
                        badge: Some(1),
                    },
                },
            }),
        }
    }

    #[test]
    fn test_fcm_client_creation() {
        let client = FcmClient::new("ouk-chaktrong", "ya29.token");
        assert_eq!(
            client.send_url(),
            "https://fcm.googleapis.com/v1/projects/ouk-chaktrong/messages:send"
        );
    }

    #[test]
    fn request_envelope_flattens_message_next_to_token() {
        let message = sample_message();
        let request = FcmRequest {
            message: FcmMessage {
                token: "device-token",
                message: &message,
            },
        };

        let json = serde_json::to_value(&request).unwrap();
        let inner = &json["message"];

        assert_eq!(inner["token"], "device-token");
        assert_eq!(inner["notification"]["title"], "Hello");
        assert_eq!(inner["data"]["k"], "v");
        assert!(inner.get("android").is_none());
        // Empty header maps are omitted entirely
        assert!(inner["apns"].get("headers").is_none());
        assert_eq!(inner["apns"]["payload"]["aps"]["badge"], 1);
        assert!(inner["apns"]["payload"]["aps"].get("alert").is_none());
    }

    #[tokio::test]
    #[ignore] // Requires a valid FCM project, access token and device token
    async fn test_send_notification() {
        let project = std::env::var("TEST_FCM_PROJECT_ID").expect("TEST_FCM_PROJECT_ID not set");
        let access = std::env::var("TEST_FCM_ACCESS_TOKEN").expect("TEST_FCM_ACCESS_TOKEN not set");
        let token = std::env::var("TEST_FCM_TOKEN").expect("TEST_FCM_TOKEN not set");

        let client = FcmClient::new(project, access);
        let result = client.send(&token, &sample_message()).await;

        assert!(result.is_ok());
    }
}
