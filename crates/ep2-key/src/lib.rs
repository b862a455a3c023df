#![forbid(unsafe_code)]

//! Peer identity keys and the encrypted messages built on them.
//!
//! One 32-byte seed gives an Ed25519 signing key and an X25519 box key.
//! On top of those keys sit five envelope kinds, a signed handshake that
//! agrees a symmetric session secret, and a JSON form for keys and
//! envelopes. The primitive set is fixed and matches libsodium byte for
//! byte, so ids, keys and envelopes interoperate with libsodium peers.

pub mod channel;
pub mod codec;
pub mod envelope;
pub mod error;
pub mod handshake;
pub mod hash;
pub mod identity;
pub mod init;
pub mod nacl;
pub mod utils;

#[cfg(test)]
mod proptests;

pub use channel::{ChannelMessage, DirectChannel, SharedChannel};
pub use codec::{KeyFile, KeyPairFile};
pub use envelope::{
    AnonymizedMessage, CloakedMessage, DirectMessage, Envelope, Opened, RelayMessage,
    SealedMessage, Uncloaked,
};
pub use error::KeyError;
pub use handshake::{EncryptedHandshake, HandshakeMessage};
pub use identity::{id_to_public_key, verify_signature, IdentityKey, Seed};
pub use init::ensure_initialized;

pub const SEED_SIZE: usize = 32;
pub const KEY_SIZE: usize = nacl::KEY_SIZE;
pub const NONCE_SIZE: usize = nacl::NONCE_SIZE;
pub const SIGNATURE_SIZE: usize = ed25519_dalek::SIGNATURE_LENGTH;
