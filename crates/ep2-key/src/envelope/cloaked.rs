use std::marker::PhantomData;

use crypto_box::PublicKey;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use super::wire_envelope;
use crate::identity::{id_to_public_key, public_key_to_id};
use crate::utils::{decode_payload, encode_payload, short_id, to_array};
use crate::{nacl, IdentityKey, KeyError, KEY_SIZE};

/// Sealed to the recipient together with the sender's public box key.
///
/// The sender is hidden from everyone but the recipient, who learns it on
/// open. The two seals are independent: nothing ties the revealed sender to
/// the payload, so the sender id is a claim, not a proof.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase", bound = "")]
pub struct CloakedMessage<T> {
    pub cipher: Vec<u8>,
    pub encrypted_sender_public_box_key: Vec<u8>,
    #[serde(skip)]
    pub(crate) _payload: PhantomData<fn() -> T>,
}

wire_envelope!(CloakedMessage, "cloaked" { cipher, encrypted_sender_public_box_key });

/// An opened [`CloakedMessage`]. Serializes as the payload's own fields plus
/// `sender`.
///
/// The flat form needs a map-shaped payload (a struct or JSON object).
/// Serializing one whose payload is a scalar or sequence fails; read
/// `payload` and `sender` directly instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Uncloaked<T> {
    #[serde(flatten)]
    pub payload: T,
    pub sender: String,
}

impl<T> CloakedMessage<T> {
    pub(crate) fn validate(&self) -> Result<(), KeyError> {
        super::expect_len(
            "encryptedSenderPublicBoxKey",
            &self.encrypted_sender_public_box_key,
            KEY_SIZE + nacl::SEAL_OVERHEAD,
        )?;
        if self.cipher.len() < nacl::SEAL_OVERHEAD {
            return Err(KeyError::MalformedEnvelope(
                "cipher shorter than the seal overhead".into(),
            ));
        }
        Ok(())
    }
}

impl<T: Serialize> CloakedMessage<T> {
    pub fn encrypt(obj: &T, sender: &IdentityKey, receiver_id: &str) -> Result<Self, KeyError> {
        Self::encrypt_from(obj, sender.box_public(), receiver_id)
    }

    /// Cloak with an explicit sender public box key.
    pub fn encrypt_from(
        obj: &T,
        sender_public_box_key: &PublicKey,
        receiver_id: &str,
    ) -> Result<Self, KeyError> {
        let receiver = id_to_public_key(receiver_id)?;
        let cipher = nacl::seal(&encode_payload(obj)?, &receiver)?;
        let encrypted_sender_public_box_key = nacl::seal(sender_public_box_key.as_bytes(), &receiver)?;
        debug!(receiver = short_id(receiver_id), "cloaked message sealed");
        Ok(Self {
            cipher,
            encrypted_sender_public_box_key,
            _payload: PhantomData,
        })
    }
}

impl<T: DeserializeOwned> CloakedMessage<T> {
    /// Open both seals and return the payload with the sender id it names.
    pub fn decrypt(&self, recipient: &IdentityKey) -> Result<Uncloaked<T>, KeyError> {
        let sender_key = self.sender(recipient)?;
        let plain = nacl::seal_open(&self.cipher, recipient.box_secret())?;
        Ok(Uncloaked {
            payload: decode_payload(&plain)?,
            sender: public_key_to_id(&sender_key),
        })
    }

    /// Only the sender half: the public box key the envelope names.
    pub fn sender(&self, recipient: &IdentityKey) -> Result<PublicKey, KeyError> {
        let raw = nacl::seal_open(&self.encrypted_sender_public_box_key, recipient.box_secret())?;
        let bytes: [u8; KEY_SIZE] = to_array(&raw, |n| {
            KeyError::MalformedEnvelope(format!("sender key must be {KEY_SIZE} bytes, got {n}"))
        })?;
        Ok(PublicKey::from(bytes))
    }
}
