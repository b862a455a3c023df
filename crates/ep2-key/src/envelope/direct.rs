use std::marker::PhantomData;

use crypto_box::SalsaBox;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use super::{expect_len, wire_envelope};
use crate::channel::DirectChannel;
use crate::utils::{decode_payload, encode_payload, random_array};
use crate::{nacl, IdentityKey, KeyError, NONCE_SIZE};

/// Box-encrypted between two known keys. The recipient must already know
/// the sender's id to open it.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase", bound = "")]
pub struct DirectMessage<T> {
    pub nonce: Vec<u8>,
    pub cipher: Vec<u8>,
    #[serde(skip)]
    pub(crate) _payload: PhantomData<fn() -> T>,
}

wire_envelope!(DirectMessage, "direct" { nonce, cipher });

impl<T> DirectMessage<T> {
    pub(crate) fn validate(&self) -> Result<(), KeyError> {
        expect_len("nonce", &self.nonce, NONCE_SIZE)
    }
}

impl<T: Serialize> DirectMessage<T> {
    pub fn encrypt(obj: &T, sender: &IdentityKey, receiver_id: &str) -> Result<Self, KeyError> {
        DirectChannel::new(sender, receiver_id)?.encrypt(obj)
    }

    pub(crate) fn encrypt_with(sbox: &SalsaBox, obj: &T) -> Result<Self, KeyError> {
        let plain = encode_payload(obj)?;
        let nonce: [u8; NONCE_SIZE] = random_array()?;
        let cipher = nacl::box_encrypt_with(sbox, &plain, &nonce)?;
        Ok(Self {
            nonce: nonce.to_vec(),
            cipher,
            _payload: PhantomData,
        })
    }
}

impl<T: DeserializeOwned> DirectMessage<T> {
    /// Open with the recipient's key and the id of the expected sender.
    pub fn decrypt(&self, recipient: &IdentityKey, sender_id: &str) -> Result<T, KeyError> {
        DirectChannel::new(recipient, sender_id)?.decrypt(self)
    }

    pub(crate) fn decrypt_with(&self, sbox: &SalsaBox) -> Result<T, KeyError> {
        let plain = nacl::box_open_with(sbox, &self.cipher, &self.nonce)?;
        decode_payload(&plain)
    }
}
