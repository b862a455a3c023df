use ep2_key::KeyError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PushError {
    /// The serialized notification reached the relay's size limit.
    #[error("refusing push too big: {size} bytes, max size {max} bytes")]
    PayloadTooLarge { size: usize, max: usize },

    #[error("no key installed to handle push")]
    NoKey,

    #[error("no push data available")]
    EmptyPayload,

    #[error("malformed push message: {0}")]
    Malformed(String),

    #[error(transparent)]
    Key(#[from] KeyError),
}

impl PushError {
    /// Failures that mean the message was not for us or was forged.
    pub fn is_rejection(&self) -> bool {
        matches!(self, PushError::Key(e) if e.is_rejection())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
