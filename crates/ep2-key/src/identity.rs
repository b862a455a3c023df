//! Peer identity keys.
//!
//! An [`IdentityKey`] holds an Ed25519 signing key and an X25519 box key,
//! both derived from one 32-byte seed with the libsodium seeded keypair
//! rules. The public identifier is the lowercase hex of the box public key.

use std::fmt;

use crypto_box::{PublicKey, SecretKey};
use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;
use zeroize::Zeroizing;

use crate::channel::{DirectChannel, SharedChannel};
use crate::envelope::{AnonymizedMessage, CloakedMessage, RelayMessage, SealedMessage};
use crate::handshake::{self, EncryptedHandshake};
use crate::hash::{box_secret_from_seed, seed_from_phrase};
use crate::utils::{random_array, short_id, to_array};
use crate::{init, KeyError, KEY_SIZE, SEED_SIZE, SIGNATURE_SIZE};

/// Seed material accepted by [`IdentityKey::create`].
#[derive(Debug, Clone, Copy)]
pub enum Seed<'a> {
    /// Exactly [`SEED_SIZE`] raw bytes, used as-is.
    Bytes(&'a [u8]),
    /// Any string, hashed to a seed with unkeyed BLAKE2b-256. No stretching
    /// is applied: a low-entropy phrase gives an easily guessed key.
    Phrase(&'a str),
}

/// A signing keypair and a box keypair derived from one seed.
///
/// Immutable after construction. Private halves never leave the crate
/// except through [`crate::codec`].
pub struct IdentityKey {
    seed: Option<Zeroizing<[u8; SEED_SIZE]>>,
    sign_key: SigningKey,
    box_secret: SecretKey,
    box_public: PublicKey,
    id: String,
}

impl IdentityKey {
    /// Build a key from an optional seed. Without a seed a random one is drawn
    /// from the OS CSPRNG and kept with the key.
    pub fn create(seed: Option<Seed<'_>>) -> Result<Self, KeyError> {
        init::ensure_initialized()?;
        let seed: [u8; SEED_SIZE] = match seed {
            None => random_array()?,
            Some(Seed::Phrase(phrase)) => seed_from_phrase(phrase),
            Some(Seed::Bytes(bytes)) => to_array(bytes, |n| {
                KeyError::InvalidSeedMaterial(format!("expected {SEED_SIZE} seed bytes, got {n}"))
            })?,
        };
        Ok(Self::derive(seed))
    }

    /// A fresh random key.
    pub fn generate() -> Result<Self, KeyError> {
        Self::create(None)
    }

    pub fn from_seed(seed: &[u8]) -> Result<Self, KeyError> {
        Self::create(Some(Seed::Bytes(seed)))
    }

    pub fn from_phrase(phrase: &str) -> Result<Self, KeyError> {
        Self::create(Some(Seed::Phrase(phrase)))
    }

    fn derive(seed: [u8; SEED_SIZE]) -> Self {
        let seed = Zeroizing::new(seed);
        let sign_key = SigningKey::from_bytes(&seed);
        let box_secret = SecretKey::from(box_secret_from_seed(&seed));
        Self::assemble(Some(seed), sign_key, box_secret)
    }

    /// Rebuild a key from stored halves. Used by the key codec, which has
    /// already checked that the parts belong together.
    pub(crate) fn from_parts(
        seed: Option<[u8; SEED_SIZE]>,
        sign_key: SigningKey,
        box_secret: SecretKey,
    ) -> Self {
        Self::assemble(seed.map(Zeroizing::new), sign_key, box_secret)
    }

    fn assemble(
        seed: Option<Zeroizing<[u8; SEED_SIZE]>>,
        sign_key: SigningKey,
        box_secret: SecretKey,
    ) -> Self {
        let box_public = box_secret.public_key();
        let id = public_key_to_id(&box_public);
        debug!(id = short_id(&id), seeded = seed.is_some(), "identity key ready");
        Self {
            seed,
            sign_key,
            box_secret,
            box_public,
            id,
        }
    }

    /// Public identifier: lowercase hex of the box public key.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn seed(&self) -> Option<&[u8; SEED_SIZE]> {
        self.seed.as_deref()
    }

    pub fn public_sign_key(&self) -> [u8; KEY_SIZE] {
        self.sign_key.verifying_key().to_bytes()
    }

    pub fn public_box_key(&self) -> [u8; KEY_SIZE] {
        *self.box_public.as_bytes()
    }

    /// Detached Ed25519 signature over `message`.
    pub fn sign(&self, message: &[u8]) -> [u8; SIGNATURE_SIZE] {
        self.sign_key.sign(message).to_bytes()
    }

    pub(crate) fn sign_key(&self) -> &SigningKey {
        &self.sign_key
    }

    pub(crate) fn box_secret(&self) -> &SecretKey {
        &self.box_secret
    }

    pub(crate) fn box_public(&self) -> &PublicKey {
        &self.box_public
    }

    /// Seal `obj` for `receiver_id`, signed by this key, sender hidden until
    /// the receiver opens it with this key's id.
    pub fn anonymize<T: Serialize>(
        &self,
        obj: &T,
        receiver_id: &str,
    ) -> Result<AnonymizedMessage<T>, KeyError> {
        AnonymizedMessage::encrypt(obj, self, receiver_id)
    }

    /// Seal `obj` for `receiver_id` together with this key's id.
    pub fn cloak<T: Serialize>(
        &self,
        obj: &T,
        receiver_id: &str,
    ) -> Result<CloakedMessage<T>, KeyError> {
        CloakedMessage::encrypt(obj, self, receiver_id)
    }

    /// Anonymous sealed box for `receiver_id`. This key is not involved.
    pub fn seal<T: Serialize>(
        &self,
        obj: &T,
        receiver_id: &str,
    ) -> Result<SealedMessage<T>, KeyError> {
        SealedMessage::encrypt(obj, receiver_id)
    }

    /// Relay envelope for `receiver_id`. Needs no sender key.
    pub fn encrypt<T: Serialize>(receiver_id: &str, obj: &T) -> Result<RelayMessage<T>, KeyError> {
        RelayMessage::encrypt(obj, receiver_id)
    }

    pub fn encrypt_symmetrically<T: Serialize>(
        &self,
        obj: &T,
        receiver_id: &str,
    ) -> Result<RelayMessage<T>, KeyError> {
        RelayMessage::encrypt(obj, receiver_id)
    }

    pub fn decrypt_symmetrically<T: DeserializeOwned>(
        &self,
        msg: &RelayMessage<T>,
    ) -> Result<T, KeyError> {
        msg.decrypt(self)
    }

    /// Precomputed box channel with `receiver_id` for [`crate::DirectMessage`]s.
    pub fn init_secure_channel(&self, receiver_id: &str) -> Result<DirectChannel, KeyError> {
        DirectChannel::new(self, receiver_id)
    }

    pub fn initiate_handshake(
        &self,
        peer_id: &str,
    ) -> Result<(SharedChannel, EncryptedHandshake), KeyError> {
        handshake::initiate(self, peer_id)
    }

    pub fn receive_handshake(
        &self,
        peer_id: &str,
        handshake: &EncryptedHandshake,
    ) -> Result<SharedChannel, KeyError> {
        handshake::receive(self, peer_id, handshake)
    }
}

impl Clone for IdentityKey {
    fn clone(&self) -> Self {
        Self {
            seed: self.seed.clone(),
            sign_key: self.sign_key.clone(),
            box_secret: SecretKey::from(self.box_secret.to_bytes()),
            box_public: self.box_public.clone(),
            id: self.id.clone(),
        }
    }
}

impl fmt::Debug for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityKey").field("id", &self.id).finish_non_exhaustive()
    }
}

impl PartialEq for IdentityKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.public_sign_key() == other.public_sign_key()
    }
}

impl Eq for IdentityKey {}

pub fn public_key_to_id(key: &PublicKey) -> String {
    hex::encode(key.as_bytes())
}

/// Recover the box public key an id encodes.
pub fn id_to_public_key(id: &str) -> Result<PublicKey, KeyError> {
    let bytes = hex::decode(id).map_err(|e| KeyError::invalid_id(id, e.to_string()))?;
    let raw: [u8; KEY_SIZE] = to_array(&bytes, |n| {
        KeyError::invalid_id(id, format!("expected {KEY_SIZE} bytes, got {n}"))
    })?;
    Ok(PublicKey::from(raw))
}

/// Verify a detached Ed25519 signature with strict (non-malleable) rules.
pub fn verify_signature(
    public_sign_key: &[u8],
    message: &[u8],
    signature: &[u8],
) -> Result<(), KeyError> {
    let key = VerifyingKey::try_from(public_sign_key).map_err(|_| KeyError::SignatureVerification)?;
    let sig = Signature::from_slice(signature).map_err(|_| KeyError::SignatureVerification)?;
    key.verify_strict(message, &sig)
        .map_err(|_| KeyError::SignatureVerification)
}
