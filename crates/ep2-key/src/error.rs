//! Error type shared by every key, envelope and handshake operation.

use thiserror::Error;

/// Failures surfaced by the key core.
///
/// Every variant is returned to the caller of the operation that detected it.
/// Nothing in this crate retries a cryptographic failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// The primitive self-test failed; no key operation can proceed.
    #[error("crypto primitives unavailable: {0}")]
    Initialization(String),

    #[error("invalid seed material: {0}")]
    InvalidSeedMaterial(String),

    /// A peer id could not be decoded to a public box key.
    #[error("invalid peer id {id:?}: {reason}")]
    InvalidIdentifier { id: String, reason: String },

    /// A box, seal or secretbox open failed its integrity check.
    #[error("incorrect key pair for the given ciphertext")]
    AuthenticationFailure,

    #[error("failed to verify message signature")]
    SignatureVerification,

    #[error("malformed key material: {0}")]
    MalformedKeyMaterial(String),

    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// The payload could not be encoded, or authenticated bytes did not
    /// decode to the expected type.
    #[error("payload encoding error: {0}")]
    Payload(String),

    /// Direct and anonymized envelopes can only be opened with the claimed
    /// sender id.
    #[error("a sender id is required to open a {0} envelope")]
    SenderRequired(&'static str),

    #[error("encryption failed: {0}")]
    Encryption(String),
}

impl KeyError {
    /// True for failures that reject a peer or message: authentication and
    /// signature failures. Transport layers close the connection on these.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            KeyError::AuthenticationFailure | KeyError::SignatureVerification
        )
    }

    pub(crate) fn invalid_id(id: &str, reason: impl Into<String>) -> Self {
        KeyError::InvalidIdentifier {
            id: id.to_string(),
            reason: reason.into(),
        }
    }
}
