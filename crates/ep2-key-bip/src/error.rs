use ep2_key::KeyError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BipError {
    /// Unknown word, wrong word count or bad checksum.
    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("entropy source failed: {0}")]
    Entropy(String),

    #[error(transparent)]
    Key(#[from] KeyError),
}
