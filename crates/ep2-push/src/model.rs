//! Records exchanged between push clients and the push relay.
//!
//! Field names follow the JSON wire form, so these records interoperate with
//! browser clients.

use std::fmt;

use ep2_key::{AnonymizedMessage, CloakedMessage, SealedMessage};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A VAPID keypair, base64url text as web-push produces it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VapidKeys {
    pub public_key: String,
    pub private_key: String,
}

impl fmt::Debug for VapidKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VapidKeys")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

/// Relay answer to a VAPID request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VapidResponse {
    /// The keys, anonymized by the relay for itself. Opaque to the client.
    pub encrypted_vapid_keys: AnonymizedMessage<VapidKeys>,
    /// Needed by the client to subscribe with its push service.
    pub vapid_public_key: String,
}

/// Proof of key ownership sent with a VAPID request: the relay's own id,
/// anonymized by the requester for the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VapidRequest {
    pub peer_id: String,
    pub payload: AnonymizedMessage<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionKeys {
    pub p256dh: String,
    pub auth: String,
}

/// A browser push subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushSubscription {
    pub endpoint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_time: Option<u64>,
    pub keys: SubscriptionKeys,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub title: String,
    pub action: String,
}

/// Notification contents. Fields this crate does not interpret are kept in
/// `extra` and passed through unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vibrate: Option<Vec<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<NotificationAction>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NotificationOptions {
    pub fn text(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            body: Some(body.into()),
            ..Self::default()
        }
    }
}

/// What a subscription owner hands to peers allowed to push to it.
///
/// The relay alone can open both halves: the subscription is sealed to it
/// and the VAPID keys were anonymized by it for itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushAuthorization {
    pub sealed_push_subscription: SealedMessage<PushSubscription>,
    pub anonymized_vapid_keys: AnonymizedMessage<VapidKeys>,
}

/// A push as seen by the relay: authorization plus a notification cloaked
/// for the receiver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushMessage {
    pub a: PushAuthorization,
    pub cno: CloakedMessage<NotificationOptions>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_subscription_wire_names() {
        let sub: PushSubscription = serde_json::from_value(json!({
            "endpoint": "https://push.example/abc",
            "expirationTime": null,
            "keys": {"p256dh": "BNc", "auth": "tBH"}
        }))
        .unwrap();
        assert_eq!(sub.expiration_time, None);
        assert_eq!(sub.keys.auth, "tBH");
    }

    #[test]
    fn test_notification_keeps_unknown_fields() {
        let value = json!({"title": "t", "badge": "/b.png", "requireInteraction": true});
        let opts: NotificationOptions = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(opts.title.as_deref(), Some("t"));
        assert_eq!(opts.extra["badge"], "/b.png");
        assert_eq!(serde_json::to_value(&opts).unwrap(), value);
    }

    #[test]
    fn test_vapid_debug_hides_private_key() {
        let keys = VapidKeys {
            public_key: "pub".into(),
            private_key: "very-private".into(),
        };
        assert!(!format!("{keys:?}").contains("very-private"));
    }
}
