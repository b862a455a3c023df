use blake2::{digest::consts::U32, Blake2b, Digest};
use sha2::Sha512;

use crate::SEED_SIZE;

type Blake2b256 = Blake2b<U32>;

/// Derive a 32-byte seed from an arbitrary string (unkeyed BLAKE2b-256,
/// the same as libsodium `crypto_generichash(32, s)`).
///
/// There is no stretching: a low-entropy phrase gives a weak key.
pub fn seed_from_phrase(phrase: &str) -> [u8; SEED_SIZE] {
    let mut h = Blake2b256::new();
    h.update(phrase.as_bytes());
    h.finalize().into()
}

/// Box secret for a seed, as `crypto_box_seed_keypair` derives it:
/// the first 32 bytes of SHA-512(seed).
pub(crate) fn box_secret_from_seed(seed: &[u8; SEED_SIZE]) -> [u8; 32] {
    let out = Sha512::digest(seed);
    let mut arr = [0u8; 32];
    arr.copy_from_slice(&out[..32]);
    arr
}
