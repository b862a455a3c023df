//! Signed key exchange producing a [`SharedChannel`].
//!
//! The initiator boxes a fresh random secret for the peer, wraps it with the
//! nonce in a [`HandshakeMessage`], signs the JSON bytes of that message and
//! sends an [`EncryptedHandshake`]. The responder checks the signature before
//! it parses anything, then opens the secret with the initiator's id.
//!
//! Text fields use URL-safe base64 without padding.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::channel::SharedChannel;
use crate::identity::{id_to_public_key, verify_signature};
use crate::utils::{random_array, short_id, to_array};
use crate::{nacl, IdentityKey, KeyError, KEY_SIZE, NONCE_SIZE};

/// Unsigned inner payload of a handshake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandshakeMessage {
    pub nonce: String,
    pub encrypted_shared_secret: String,
}

/// The transmittable handshake: signed message bytes plus the signer's
/// public signing key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedHandshake {
    /// Base64 of the JSON bytes of a [`HandshakeMessage`].
    pub message: String,
    /// Base64 Ed25519 signature over the decoded `message` bytes.
    pub signature: String,
    pub public_sign_key: String,
}

impl EncryptedHandshake {
    pub fn to_json(&self) -> Result<String, KeyError> {
        serde_json::to_string(self).map_err(|e| KeyError::MalformedEnvelope(e.to_string()))
    }

    pub fn from_json(text: &str) -> Result<Self, KeyError> {
        serde_json::from_str(text).map_err(|e| KeyError::MalformedEnvelope(e.to_string()))
    }
}

fn b64_decode(field: &str, text: &str) -> Result<Vec<u8>, KeyError> {
    URL_SAFE_NO_PAD
        .decode(text)
        .map_err(|e| KeyError::MalformedEnvelope(format!("{field}: {e}")))
}

/// Decode a field covered by the signature check. Text that does not decode
/// cannot verify.
fn signed_field(text: &str) -> Result<Vec<u8>, KeyError> {
    URL_SAFE_NO_PAD
        .decode(text)
        .map_err(|_| KeyError::SignatureVerification)
}

pub(crate) fn initiate(
    key: &IdentityKey,
    peer_id: &str,
) -> Result<(SharedChannel, EncryptedHandshake), KeyError> {
    let peer = id_to_public_key(peer_id)?;
    let nonce: [u8; NONCE_SIZE] = random_array()?;
    let secret = Zeroizing::new(random_array::<KEY_SIZE>()?);

    let encrypted = nacl::box_encrypt(secret.as_slice(), &nonce, &peer, key.box_secret())?;
    let inner = HandshakeMessage {
        nonce: URL_SAFE_NO_PAD.encode(nonce),
        encrypted_shared_secret: URL_SAFE_NO_PAD.encode(encrypted),
    };
    let message =
        serde_json::to_vec(&inner).map_err(|e| KeyError::MalformedEnvelope(e.to_string()))?;
    let signature = key.sign(&message);

    debug!(peer = short_id(peer_id), "handshake initiated");
    Ok((
        SharedChannel::new(*secret),
        EncryptedHandshake {
            message: URL_SAFE_NO_PAD.encode(&message),
            signature: URL_SAFE_NO_PAD.encode(signature),
            public_sign_key: URL_SAFE_NO_PAD.encode(key.public_sign_key()),
        },
    ))
}

pub(crate) fn receive(
    key: &IdentityKey,
    peer_id: &str,
    handshake: &EncryptedHandshake,
) -> Result<SharedChannel, KeyError> {
    let peer = id_to_public_key(peer_id)?;
    let signed = signed_field(&handshake.message).and_then(|message| {
        let signature = signed_field(&handshake.signature)?;
        let sign_key = signed_field(&handshake.public_sign_key)?;
        verify_signature(&sign_key, &message, &signature)?;
        Ok(message)
    });
    let message = match signed {
        Ok(message) => message,
        Err(e) => {
            warn!(peer = short_id(peer_id), "handshake signature rejected");
            return Err(e);
        }
    };

    let inner: HandshakeMessage = serde_json::from_slice(&message)
        .map_err(|e| KeyError::MalformedEnvelope(format!("handshake message: {e}")))?;
    let nonce = b64_decode("nonce", &inner.nonce)?;
    let encrypted = b64_decode("encryptedSharedSecret", &inner.encrypted_shared_secret)?;

    let secret = Zeroizing::new(nacl::box_open(&encrypted, &nonce, &peer, key.box_secret())?);
    let secret: [u8; KEY_SIZE] = to_array(&secret, |n| {
        KeyError::MalformedEnvelope(format!("shared secret must be {KEY_SIZE} bytes, got {n}"))
    })?;
    debug!(peer = short_id(peer_id), "handshake accepted");
    Ok(SharedChannel::new(secret))
}
