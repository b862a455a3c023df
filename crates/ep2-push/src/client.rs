//! Client-side steps: requesting VAPID keys, authorizing peers and
//! composing pushes.

use ep2_key::utils::short_id;
use ep2_key::{AnonymizedMessage, IdentityKey, SealedMessage};
use tracing::debug;

use crate::error::PushError;
use crate::model::{
    NotificationOptions, PushAuthorization, PushMessage, PushSubscription, VapidRequest,
    VapidResponse,
};
use crate::relay::check_payload_size;

/// Build a VAPID request proving ownership of `key`.
pub fn vapid_request(key: &IdentityKey, server_id: &str) -> Result<VapidRequest, PushError> {
    Ok(VapidRequest {
        peer_id: key.id().to_string(),
        payload: key.anonymize(&server_id.to_string(), server_id)?,
    })
}

/// Open the relay's answer to a VAPID request.
pub fn open_vapid_response(
    key: &IdentityKey,
    server_id: &str,
    response: &AnonymizedMessage<VapidResponse>,
) -> Result<VapidResponse, PushError> {
    Ok(response.decrypt(key, server_id)?)
}

impl PushAuthorization {
    /// Authorization for pushing to `subscription`, readable only by the
    /// relay `server_id`.
    pub fn new(
        subscription: &PushSubscription,
        vapid: &VapidResponse,
        server_id: &str,
    ) -> Result<Self, PushError> {
        Ok(Self {
            sealed_push_subscription: SealedMessage::encrypt(subscription, server_id)?,
            anonymized_vapid_keys: vapid.encrypted_vapid_keys.clone(),
        })
    }
}

/// Cloak `notification` for `receiver_id` and bundle it with the receiver's
/// authorization.
///
/// Fails with [`PushError::PayloadTooLarge`] when the cloaked notification
/// would be refused by the relay.
pub fn compose_push(
    sender: &IdentityKey,
    authorization: &PushAuthorization,
    receiver_id: &str,
    notification: &NotificationOptions,
    max_bytes: usize,
) -> Result<PushMessage, PushError> {
    let cno = sender.cloak(notification, receiver_id)?;
    let size = cno
        .to_json()
        .map_err(|e| PushError::Malformed(e.to_string()))?
        .len();
    check_payload_size(size, max_bytes)?;

    debug!(receiver = short_id(receiver_id), size, "push composed");
    Ok(PushMessage {
        a: authorization.clone(),
        cno,
    })
}
