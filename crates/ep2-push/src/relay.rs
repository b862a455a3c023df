//! Relay-side steps: issuing VAPID keys and opening push messages.
//!
//! The relay never sees a notification in clear. It opens what was sealed
//! or anonymized for it and forwards the cloaked notification as opaque
//! JSON text.

use ep2_key::utils::short_id;
use ep2_key::IdentityKey;
use tracing::{debug, info, warn};

use crate::error::PushError;
use crate::model::{PushMessage, PushSubscription, VapidKeys, VapidRequest, VapidResponse};

/// Everything needed to hand a push to the push service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub subscription: PushSubscription,
    pub vapid_keys: VapidKeys,
    /// JSON text of the cloaked notification.
    pub payload: String,
}

/// Reject payloads of `max` bytes or more.
pub fn check_payload_size(size: usize, max: usize) -> Result<(), PushError> {
    if size >= max {
        return Err(PushError::PayloadTooLarge { size, max });
    }
    Ok(())
}

/// Check a VAPID request really comes from the peer it names. Returns that
/// peer id.
pub fn accept_vapid_request(server: &IdentityKey, request: &VapidRequest) -> Result<String, PushError> {
    let claimed = request.payload.decrypt(server, &request.peer_id)?;
    if claimed != server.id() {
        warn!(peer = short_id(&request.peer_id), "vapid request names another relay");
        return Err(PushError::Malformed("vapid request addressed to another relay".into()));
    }
    Ok(request.peer_id.clone())
}

/// Wrap freshly generated VAPID keys for `peer_id`.
///
/// The keys are anonymized by the relay for itself, so only the relay can
/// use them later; the response as a whole is anonymized for the peer.
pub fn issue_vapid(
    server: &IdentityKey,
    peer_id: &str,
    keys: VapidKeys,
) -> Result<ep2_key::AnonymizedMessage<VapidResponse>, PushError> {
    let encrypted_vapid_keys = server.anonymize(&keys, server.id())?;
    let response = VapidResponse {
        encrypted_vapid_keys,
        vapid_public_key: keys.public_key,
    };
    info!(peer = short_id(peer_id), "delivering new VAPID keys");
    Ok(server.anonymize(&response, peer_id)?)
}

/// Open a push message addressed through this relay.
pub fn open_push_message(
    server: &IdentityKey,
    msg: &PushMessage,
    max_bytes: usize,
) -> Result<Delivery, PushError> {
    let vapid_keys = msg.a.anonymized_vapid_keys.decrypt(server, server.id())?;
    let subscription = msg.a.sealed_push_subscription.decrypt(server)?;

    let payload = msg
        .cno
        .to_json()
        .map_err(|e| PushError::Malformed(e.to_string()))?;
    if let Err(e) = check_payload_size(payload.len(), max_bytes) {
        warn!(size = payload.len(), max = max_bytes, "refusing push too big");
        return Err(e);
    }

    debug!(endpoint = %subscription.endpoint, size = payload.len(), "push ready for delivery");
    Ok(Delivery {
        subscription,
        vapid_keys,
        payload,
    })
}
