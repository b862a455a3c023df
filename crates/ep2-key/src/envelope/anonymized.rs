use std::marker::PhantomData;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use super::{expect_len, wire_envelope};
use crate::identity::{id_to_public_key, verify_signature};
use crate::utils::{decode_payload, encode_payload, random_array, short_id};
use crate::{nacl, IdentityKey, KeyError, KEY_SIZE, NONCE_SIZE, SIGNATURE_SIZE};

/// Box-encrypted for a known recipient and signed by the sender, with the
/// sender's public signing key boxed as well.
///
/// `cipher` is `signature || box(payload)`; the signature covers the boxed
/// bytes. The same nonce boxes the payload and the signing key. Opening
/// needs the claimed sender id: the signing key is recovered with it, the
/// signature is checked against the still-encrypted payload, and only then
/// is the payload opened.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase", bound = "")]
pub struct AnonymizedMessage<T> {
    pub cipher: Vec<u8>,
    pub encrypted_sender_signing_key: Vec<u8>,
    pub nonce: Vec<u8>,
    #[serde(skip)]
    pub(crate) _payload: PhantomData<fn() -> T>,
}

wire_envelope!(AnonymizedMessage, "anonymized" { cipher, encrypted_sender_signing_key, nonce });

impl<T> AnonymizedMessage<T> {
    pub(crate) fn validate(&self) -> Result<(), KeyError> {
        expect_len("nonce", &self.nonce, NONCE_SIZE)?;
        expect_len(
            "encryptedSenderSigningKey",
            &self.encrypted_sender_signing_key,
            KEY_SIZE + nacl::MAC_SIZE,
        )
    }
}

impl<T: Serialize> AnonymizedMessage<T> {
    pub fn encrypt(obj: &T, sender: &IdentityKey, receiver_id: &str) -> Result<Self, KeyError> {
        let receiver = id_to_public_key(receiver_id)?;
        let sbox = nacl::precompute(&receiver, sender.box_secret());
        let nonce: [u8; NONCE_SIZE] = random_array()?;

        let inner = nacl::box_encrypt_with(&sbox, &encode_payload(obj)?, &nonce)?;
        let encrypted_sender_signing_key =
            nacl::box_encrypt_with(&sbox, &sender.public_sign_key(), &nonce)?;

        let signature = sender.sign(&inner);
        let mut cipher = Vec::with_capacity(SIGNATURE_SIZE + inner.len());
        cipher.extend_from_slice(&signature);
        cipher.extend_from_slice(&inner);

        debug!(receiver = short_id(receiver_id), "anonymized message signed");
        Ok(Self {
            cipher,
            encrypted_sender_signing_key,
            nonce: nonce.to_vec(),
            _payload: PhantomData,
        })
    }
}

impl<T: DeserializeOwned> AnonymizedMessage<T> {
    /// Open a message claimed to come from `sender_id`.
    pub fn decrypt(&self, recipient: &IdentityKey, sender_id: &str) -> Result<T, KeyError> {
        let sender = id_to_public_key(sender_id)?;
        let sbox = nacl::precompute(&sender, recipient.box_secret());

        let sign_key =
            nacl::box_open_with(&sbox, &self.encrypted_sender_signing_key, &self.nonce)?;
        if self.cipher.len() < SIGNATURE_SIZE {
            return Err(KeyError::SignatureVerification);
        }
        let (signature, inner) = self.cipher.split_at(SIGNATURE_SIZE);
        if let Err(e) = verify_signature(&sign_key, inner, signature) {
            warn!(sender = short_id(sender_id), "anonymized message signature rejected");
            return Err(e);
        }

        let plain = nacl::box_open_with(&sbox, inner, &self.nonce)?;
        decode_payload(&plain)
    }
}
