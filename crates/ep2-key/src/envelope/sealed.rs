use std::marker::PhantomData;

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use super::wire_envelope;
use crate::identity::id_to_public_key;
use crate::utils::{decode_payload, encode_payload};
use crate::{nacl, IdentityKey, KeyError};

/// Anonymous sealed box. No sender key is involved, so not even the
/// recipient learns who sent it.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase", bound = "")]
pub struct SealedMessage<T> {
    pub cipher: Vec<u8>,
    #[serde(skip)]
    pub(crate) _payload: PhantomData<fn() -> T>,
}

wire_envelope!(SealedMessage, "sealed" { cipher });

impl<T> SealedMessage<T> {
    pub(crate) fn validate(&self) -> Result<(), KeyError> {
        if self.cipher.len() < nacl::SEAL_OVERHEAD {
            return Err(KeyError::MalformedEnvelope(format!(
                "cipher shorter than the {}-byte seal overhead",
                nacl::SEAL_OVERHEAD
            )));
        }
        Ok(())
    }
}

impl<T: Serialize> SealedMessage<T> {
    pub fn encrypt(obj: &T, receiver_id: &str) -> Result<Self, KeyError> {
        let receiver = id_to_public_key(receiver_id)?;
        let cipher = nacl::seal(&encode_payload(obj)?, &receiver)?;
        Ok(Self {
            cipher,
            _payload: PhantomData,
        })
    }
}

impl<T: DeserializeOwned> SealedMessage<T> {
    pub fn decrypt(&self, recipient: &IdentityKey) -> Result<T, KeyError> {
        let plain = nacl::seal_open(&self.cipher, recipient.box_secret())?;
        decode_payload(&plain)
    }
}
