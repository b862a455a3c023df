//! JSON form of an [`IdentityKey`].
//!
//! ```json
//! {
//!   "id": "<hex box public key>",
//!   "seed": [..32 bytes..] | null,
//!   "signKeyPair": { "publicKey": [..32..], "privateKey": [..64..], "keyType": "ed25519" },
//!   "boxKeyPair":  { "publicKey": [..32..], "privateKey": [..32..], "keyType": "x25519" }
//! }
//! ```
//!
//! The signing private key is the libsodium 64-byte form (seed followed by
//! public key). Parsing checks that every stored public half, the id and the
//! seed agree with the private halves; any disagreement is rejected.

use crypto_box::SecretKey;
use ed25519_dalek::SigningKey;
use serde::{Deserialize, Serialize};
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::hash::box_secret_from_seed;
use crate::identity::public_key_to_id;
use crate::utils::{constant_time_compare, short_id, to_array};
use crate::{IdentityKey, KeyError, KEY_SIZE, SEED_SIZE};

pub const SIGN_KEY_TYPE: &str = "ed25519";
pub const BOX_KEY_TYPE: &str = "x25519";

/// One stored keypair.
#[derive(Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct KeyPairFile {
    pub public_key: Vec<u8>,
    pub private_key: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_type: Option<String>,
}

/// Serialized identity key. Holds private material and is wiped on drop.
#[derive(Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct KeyFile {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub seed: Option<Vec<u8>>,
    pub sign_key_pair: KeyPairFile,
    pub box_key_pair: KeyPairFile,
}

fn malformed(msg: impl Into<String>) -> KeyError {
    KeyError::MalformedKeyMaterial(msg.into())
}

fn check_key_type(pair: &KeyPairFile, expected: &str) -> Result<(), KeyError> {
    match pair.key_type.as_deref() {
        None => Ok(()),
        Some(t) if t == expected => Ok(()),
        Some(t) => Err(malformed(format!("expected keyType {expected}, got {t}"))),
    }
}

impl KeyFile {
    pub fn from_key(key: &IdentityKey) -> Self {
        Self {
            id: Some(key.id().to_string()),
            seed: key.seed().map(|s| s.to_vec()),
            sign_key_pair: KeyPairFile {
                public_key: key.public_sign_key().to_vec(),
                private_key: key.sign_key().to_keypair_bytes().to_vec(),
                key_type: Some(SIGN_KEY_TYPE.to_string()),
            },
            box_key_pair: KeyPairFile {
                public_key: key.public_box_key().to_vec(),
                private_key: key.box_secret().to_bytes().to_vec(),
                key_type: Some(BOX_KEY_TYPE.to_string()),
            },
        }
    }

    /// Rebuild the key, rejecting any part that does not belong with the
    /// private halves.
    pub fn to_key(&self) -> Result<IdentityKey, KeyError> {
        check_key_type(&self.sign_key_pair, SIGN_KEY_TYPE)?;
        check_key_type(&self.box_key_pair, BOX_KEY_TYPE)?;

        let mut keypair: [u8; 64] = to_array(&self.sign_key_pair.private_key, |n| {
            malformed(format!("signKeyPair.privateKey must be 64 bytes, got {n}"))
        })?;
        let sign_key = SigningKey::from_keypair_bytes(&keypair);
        keypair.zeroize();
        let sign_key =
            sign_key.map_err(|_| malformed("signKeyPair private and public halves disagree"))?;
        if !constant_time_compare(
            &self.sign_key_pair.public_key,
            sign_key.verifying_key().as_bytes(),
        ) {
            return Err(malformed("signKeyPair.publicKey does not match privateKey"));
        }

        let mut raw: [u8; KEY_SIZE] = to_array(&self.box_key_pair.private_key, |n| {
            malformed(format!("boxKeyPair.privateKey must be {KEY_SIZE} bytes, got {n}"))
        })?;
        let box_secret = SecretKey::from(raw);
        raw.zeroize();
        if !constant_time_compare(&self.box_key_pair.public_key, box_secret.public_key().as_bytes()) {
            return Err(malformed("boxKeyPair.publicKey does not match privateKey"));
        }

        let seed = match &self.seed {
            None => None,
            Some(bytes) => {
                let seed: [u8; SEED_SIZE] = to_array(bytes, |n| {
                    malformed(format!("seed must be {SEED_SIZE} bytes, got {n}"))
                })?;
                let derived_box = box_secret_from_seed(&seed);
                let seeded_sign = SigningKey::from_bytes(&seed);
                if seeded_sign.verifying_key() != sign_key.verifying_key()
                    || !constant_time_compare(&derived_box, &box_secret.to_bytes())
                {
                    return Err(malformed("seed does not derive the stored keys"));
                }
                Some(seed)
            }
        };

        let id = public_key_to_id(&box_secret.public_key());
        if let Some(stored) = &self.id {
            if stored != &id {
                return Err(malformed(format!("id {stored:?} does not match boxKeyPair")));
            }
        }

        Ok(IdentityKey::from_parts(seed, sign_key, box_secret))
    }
}

impl IdentityKey {
    /// Serialize including private material. Treat the output as a secret.
    pub fn to_json(&self) -> Result<String, KeyError> {
        serde_json::to_string(&KeyFile::from_key(self))
            .map_err(|e| malformed(e.to_string()))
    }

    pub fn from_json(text: &str) -> Result<Self, KeyError> {
        crate::init::ensure_initialized()?;
        let file: KeyFile = serde_json::from_str(text).map_err(|e| malformed(e.to_string()))?;
        let key = file.to_key()?;
        debug!(id = short_id(key.id()), "identity key restored");
        Ok(key)
    }
}
