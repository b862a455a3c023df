#![forbid(unsafe_code)]

//! Identity keys recoverable from a 12-word BIP-39 mnemonic.
//!
//! The mnemonic's entropy, as lowercase hex text, is the phrase seed of the
//! [`IdentityKey`]: the same mnemonic always gives the same id and keys.

use std::ops::Deref;

use bip39::{Language, Mnemonic};
use ep2_key::IdentityKey;
use tracing::debug;
use zeroize::Zeroizing;

mod error;

#[cfg(test)]
mod proptests;

pub use error::BipError;

/// Entropy strength of generated mnemonics, in bytes (128 bits, 12 words).
pub const ENTROPY_BYTES: usize = 16;
pub const WORD_COUNT: usize = 12;

/// An identity key together with the mnemonic it was derived from.
pub struct BipKey {
    mnemonic: Zeroizing<String>,
    bip39_seed: Zeroizing<[u8; 64]>,
    key: IdentityKey,
}

impl BipKey {
    /// Recover from `mnemonic`, or generate a fresh one when absent.
    pub fn create(mnemonic: Option<&str>) -> Result<Self, BipError> {
        let parsed = match mnemonic {
            Some(phrase) => Mnemonic::parse_in(Language::English, phrase)
                .map_err(|e| BipError::InvalidMnemonic(e.to_string()))?,
            None => {
                let mut entropy = Zeroizing::new([0u8; ENTROPY_BYTES]);
                getrandom::getrandom(entropy.as_mut_slice())
                    .map_err(|e| BipError::Entropy(e.to_string()))?;
                Mnemonic::from_entropy_in(Language::English, entropy.as_slice())
                    .map_err(|e| BipError::Entropy(e.to_string()))?
            }
        };
        Self::derive(&parsed)
    }

    pub fn generate() -> Result<Self, BipError> {
        Self::create(None)
    }

    pub fn from_mnemonic(phrase: &str) -> Result<Self, BipError> {
        Self::create(Some(phrase))
    }

    fn derive(mnemonic: &Mnemonic) -> Result<Self, BipError> {
        let entropy = Zeroizing::new(hex::encode(mnemonic.to_entropy()));
        let key = IdentityKey::from_phrase(&entropy)?;
        debug!(words = mnemonic.word_count(), "mnemonic key derived");
        Ok(Self {
            mnemonic: Zeroizing::new(mnemonic.to_string()),
            bip39_seed: Zeroizing::new(mnemonic.to_seed("")),
            key,
        })
    }

    /// The normalized mnemonic phrase. Treat as a secret.
    pub fn mnemonic(&self) -> &str {
        &self.mnemonic
    }

    /// Standard BIP-39 seed of the mnemonic with an empty passphrase, for
    /// callers that run their own hierarchical derivation.
    pub fn bip39_seed(&self) -> &[u8; 64] {
        &self.bip39_seed
    }

    pub fn key(&self) -> &IdentityKey {
        &self.key
    }

    pub fn into_key(self) -> IdentityKey {
        self.key
    }
}

impl Deref for BipKey {
    type Target = IdentityKey;

    fn deref(&self) -> &IdentityKey {
        &self.key
    }
}

impl std::fmt::Debug for BipKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BipKey")
            .field("id", &self.key.id())
            .finish_non_exhaustive()
    }
}

/// True if `phrase` is a valid English BIP-39 mnemonic.
pub fn validate_mnemonic(phrase: &str) -> bool {
    Mnemonic::parse_in(Language::English, phrase).is_ok()
}
