//! Thin wrappers over the fixed primitive set.
//!
//! Box is X25519-XSalsa20-Poly1305, seal is the libsodium sealed box and
//! secretbox is XSalsa20-Poly1305. Every open maps its failure to
//! `AuthenticationFailure`; wrong-length nonces and keys are reported as
//! malformed input before any primitive runs.

use crypto_box::{
    aead::{generic_array::GenericArray, Aead},
    PublicKey, SalsaBox, SecretKey,
};
use crypto_secretbox::{aead::KeyInit, XSalsa20Poly1305};
use rand_core::OsRng;

use crate::KeyError;

pub const NONCE_SIZE: usize = 24;
pub const KEY_SIZE: usize = 32;
pub const MAC_SIZE: usize = 16;
pub const SEAL_OVERHEAD: usize = KEY_SIZE + MAC_SIZE;

fn check_nonce(nonce: &[u8]) -> Result<(), KeyError> {
    if nonce.len() != NONCE_SIZE {
        return Err(KeyError::MalformedEnvelope(format!(
            "nonce must be {} bytes, got {}",
            NONCE_SIZE,
            nonce.len()
        )));
    }
    Ok(())
}

/// Precompute the box key between a peer public key and our secret key.
pub fn precompute(their_public: &PublicKey, our_secret: &SecretKey) -> SalsaBox {
    SalsaBox::new(their_public, our_secret)
}

pub fn box_encrypt_with(
    sbox: &SalsaBox,
    msg: &[u8],
    nonce: &[u8; NONCE_SIZE],
) -> Result<Vec<u8>, KeyError> {
    sbox.encrypt(GenericArray::from_slice(nonce), msg)
        .map_err(|_| KeyError::Encryption("box".into()))
}

pub fn box_open_with(sbox: &SalsaBox, cipher: &[u8], nonce: &[u8]) -> Result<Vec<u8>, KeyError> {
    check_nonce(nonce)?;
    sbox.decrypt(GenericArray::from_slice(nonce), cipher)
        .map_err(|_| KeyError::AuthenticationFailure)
}

pub fn box_encrypt(
    msg: &[u8],
    nonce: &[u8; NONCE_SIZE],
    their_public: &PublicKey,
    our_secret: &SecretKey,
) -> Result<Vec<u8>, KeyError> {
    box_encrypt_with(&precompute(their_public, our_secret), msg, nonce)
}

pub fn box_open(
    cipher: &[u8],
    nonce: &[u8],
    their_public: &PublicKey,
    our_secret: &SecretKey,
) -> Result<Vec<u8>, KeyError> {
    box_open_with(&precompute(their_public, our_secret), cipher, nonce)
}

/// Anonymous sealed box: only `their_public` matters, the sender is not
/// recorded anywhere in the output.
pub fn seal(msg: &[u8], their_public: &PublicKey) -> Result<Vec<u8>, KeyError> {
    their_public
        .seal(&mut OsRng, msg)
        .map_err(|_| KeyError::Encryption("seal".into()))
}

pub fn seal_open(cipher: &[u8], our_secret: &SecretKey) -> Result<Vec<u8>, KeyError> {
    if cipher.len() < SEAL_OVERHEAD {
        return Err(KeyError::AuthenticationFailure);
    }
    our_secret
        .unseal(cipher)
        .map_err(|_| KeyError::AuthenticationFailure)
}

pub fn secretbox_encrypt(
    msg: &[u8],
    nonce: &[u8; NONCE_SIZE],
    key: &[u8; KEY_SIZE],
) -> Result<Vec<u8>, KeyError> {
    let cipher = XSalsa20Poly1305::new(GenericArray::from_slice(key));
    cipher
        .encrypt(GenericArray::from_slice(nonce), msg)
        .map_err(|_| KeyError::Encryption("secretbox".into()))
}

pub fn secretbox_open(cipher: &[u8], nonce: &[u8], key: &[u8]) -> Result<Vec<u8>, KeyError> {
    check_nonce(nonce)?;
    let aead = XSalsa20Poly1305::new_from_slice(key).map_err(|_| {
        KeyError::MalformedEnvelope(format!("secret key must be {} bytes", KEY_SIZE))
    })?;
    aead.decrypt(GenericArray::from_slice(nonce), cipher)
        .map_err(|_| KeyError::AuthenticationFailure)
}
