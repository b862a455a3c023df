use std::marker::PhantomData;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;
use zeroize::Zeroizing;

use super::{expect_len, wire_envelope};
use crate::identity::id_to_public_key;
use crate::utils::{decode_payload, encode_payload, random_array, short_id};
use crate::{nacl, IdentityKey, KeyError, KEY_SIZE, NONCE_SIZE};

/// Secretbox under a one-time key, with the key sealed to the recipient.
///
/// A relay can carry it without learning the payload, and the sender stays
/// anonymous to everyone.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase", bound = "")]
pub struct RelayMessage<T> {
    pub nonce: Vec<u8>,
    pub cipher: Vec<u8>,
    pub encrypted_key: Vec<u8>,
    #[serde(skip)]
    pub(crate) _payload: PhantomData<fn() -> T>,
}

wire_envelope!(RelayMessage, "relay" { nonce, cipher, encrypted_key });

impl<T> RelayMessage<T> {
    pub(crate) fn validate(&self) -> Result<(), KeyError> {
        expect_len("nonce", &self.nonce, NONCE_SIZE)?;
        expect_len(
            "encryptedKey",
            &self.encrypted_key,
            KEY_SIZE + nacl::SEAL_OVERHEAD,
        )
    }
}

impl<T: Serialize> RelayMessage<T> {
    pub fn encrypt(obj: &T, receiver_id: &str) -> Result<Self, KeyError> {
        let receiver = id_to_public_key(receiver_id)?;
        let plain = encode_payload(obj)?;

        let key = Zeroizing::new(random_array::<KEY_SIZE>()?);
        let nonce: [u8; NONCE_SIZE] = random_array()?;
        let cipher = nacl::secretbox_encrypt(&plain, &nonce, &key)?;
        let encrypted_key = nacl::seal(key.as_slice(), &receiver)?;

        debug!(receiver = short_id(receiver_id), size = cipher.len(), "relay message sealed");
        Ok(Self {
            nonce: nonce.to_vec(),
            cipher,
            encrypted_key,
            _payload: PhantomData,
        })
    }
}

impl<T: DeserializeOwned> RelayMessage<T> {
    pub fn decrypt(&self, recipient: &IdentityKey) -> Result<T, KeyError> {
        let key = Zeroizing::new(nacl::seal_open(&self.encrypted_key, recipient.box_secret())?);
        let plain = nacl::secretbox_open(&self.cipher, &self.nonce, &key)?;
        decode_payload(&plain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_round_trip() {
        let b = IdentityKey::generate().unwrap();
        let msg = RelayMessage::encrypt(&json!(["a", 1]), b.id()).unwrap();
        assert_eq!(msg.encrypted_key.len(), 80);
        assert_eq!(msg.decrypt(&b).unwrap(), json!(["a", 1]));
    }

    #[test]
    fn test_wire_field_names() {
        let b = IdentityKey::generate().unwrap();
        let msg = RelayMessage::encrypt(&1u8, b.id()).unwrap();
        let wire: Value = serde_json::from_str(&msg.to_json().unwrap()).unwrap();
        let mut keys: Vec<_> = wire.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, ["cipher", "encryptedKey", "nonce"]);
        assert!(wire["nonce"].as_array().unwrap().iter().all(|v| v.as_u64().unwrap() < 256));
    }

    #[test]
    fn test_wrong_recipient_rejected() {
        let b = IdentityKey::generate().unwrap();
        let c = IdentityKey::generate().unwrap();
        let msg = RelayMessage::encrypt(&1u8, b.id()).unwrap();
        assert_eq!(msg.decrypt(&c), Err(KeyError::AuthenticationFailure));
    }

    #[test]
    fn test_tampered_cipher_and_key_rejected() {
        let b = IdentityKey::generate().unwrap();
        let msg = RelayMessage::encrypt(&"payload", b.id()).unwrap().cast::<String>();

        let mut bad = msg.clone();
        bad.cipher[0] ^= 1;
        assert_eq!(bad.decrypt(&b), Err(KeyError::AuthenticationFailure));

        let mut bad = msg.clone();
        bad.encrypted_key[40] ^= 1;
        assert_eq!(bad.decrypt(&b), Err(KeyError::AuthenticationFailure));

        assert_eq!(msg.decrypt(&b).unwrap(), "payload");
    }

    #[test]
    fn test_invalid_receiver_id() {
        let err = RelayMessage::encrypt(&1u8, "not-an-id").unwrap_err();
        assert!(matches!(err, KeyError::InvalidIdentifier { .. }));
    }
}
