//! Session channels.
//!
//! [`SharedChannel`] wraps the symmetric secret agreed in a handshake.
//! [`DirectChannel`] is a precomputed box between our key and one peer, for
//! [`DirectMessage`]s.

use std::fmt;
use std::marker::PhantomData;

use crypto_box::SalsaBox;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::envelope::{expect_len, wire_envelope, DirectMessage};
use crate::identity::id_to_public_key;
use crate::utils::{constant_time_compare, decode_payload, encode_payload, random_array};
use crate::{nacl, IdentityKey, KeyError, KEY_SIZE, NONCE_SIZE};

/// Secretbox record produced by a [`SharedChannel`].
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase", bound = "")]
pub struct ChannelMessage<T> {
    pub nonce: Vec<u8>,
    pub cipher: Vec<u8>,
    #[serde(skip)]
    pub(crate) _payload: PhantomData<fn() -> T>,
}

wire_envelope!(ChannelMessage, "channel" { nonce, cipher });

impl<T> ChannelMessage<T> {
    pub(crate) fn validate(&self) -> Result<(), KeyError> {
        expect_len("nonce", &self.nonce, NONCE_SIZE)
    }
}

/// Symmetric channel over a shared secret. Both ends of a successful
/// handshake hold byte-identical secrets.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SharedChannel {
    secret: [u8; KEY_SIZE],
}

impl SharedChannel {
    pub fn new(secret: [u8; KEY_SIZE]) -> Self {
        Self { secret }
    }

    pub fn shared_secret(&self) -> &[u8; KEY_SIZE] {
        &self.secret
    }

    pub fn encrypt<T: Serialize>(&self, obj: &T) -> Result<ChannelMessage<T>, KeyError> {
        let nonce: [u8; NONCE_SIZE] = random_array()?;
        let cipher = nacl::secretbox_encrypt(&encode_payload(obj)?, &nonce, &self.secret)?;
        Ok(ChannelMessage {
            nonce: nonce.to_vec(),
            cipher,
            _payload: PhantomData,
        })
    }

    pub fn decrypt<T: DeserializeOwned>(&self, msg: &ChannelMessage<T>) -> Result<T, KeyError> {
        let plain = nacl::secretbox_open(&msg.cipher, &msg.nonce, &self.secret)?;
        decode_payload(&plain)
    }

    /// Encrypt and render as JSON text, for transports that carry strings.
    pub fn seal_frame<T: Serialize>(&self, obj: &T) -> Result<String, KeyError> {
        self.encrypt(obj)?.to_json()
    }

    pub fn open_frame<T: DeserializeOwned>(&self, frame: &str) -> Result<T, KeyError> {
        self.decrypt(&ChannelMessage::<T>::from_json(frame)?)
    }
}

impl PartialEq for SharedChannel {
    fn eq(&self, other: &Self) -> bool {
        constant_time_compare(&self.secret, &other.secret)
    }
}

impl Eq for SharedChannel {}

impl fmt::Debug for SharedChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedChannel").finish_non_exhaustive()
    }
}

/// Precomputed box between our secret key and a peer's public key.
///
/// Either side's channel opens the other side's messages.
pub struct DirectChannel {
    peer_id: String,
    sbox: SalsaBox,
}

impl DirectChannel {
    pub fn new(key: &IdentityKey, peer_id: &str) -> Result<Self, KeyError> {
        let peer = id_to_public_key(peer_id)?;
        Ok(Self {
            peer_id: peer_id.to_string(),
            sbox: nacl::precompute(&peer, key.box_secret()),
        })
    }

    pub fn peer_id(&self) -> &str {
        &self.peer_id
    }

    pub fn encrypt<T: Serialize>(&self, obj: &T) -> Result<DirectMessage<T>, KeyError> {
        DirectMessage::encrypt_with(&self.sbox, obj)
    }

    pub fn decrypt<T: DeserializeOwned>(&self, msg: &DirectMessage<T>) -> Result<T, KeyError> {
        msg.decrypt_with(&self.sbox)
    }

    /// Encrypt a text frame and render the envelope as JSON.
    pub fn encrypt_text(&self, text: &str) -> Result<String, KeyError> {
        DirectMessage::<&str>::encrypt_with(&self.sbox, &text)?.to_json()
    }

    pub fn decrypt_text(&self, frame: &str) -> Result<String, KeyError> {
        self.decrypt(&DirectMessage::<String>::from_json(frame)?)
    }
}

impl fmt::Debug for DirectChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectChannel")
            .field("peer_id", &self.peer_id)
            .finish_non_exhaustive()
    }
}
