//! Encrypted envelopes.
//!
//! Five closed variants, each a plain wire record whose byte fields travel
//! as JSON integer arrays:
//!
//! | kind         | fields                                        | sender            |
//! |--------------|-----------------------------------------------|-------------------|
//! | `direct`     | `nonce`, `cipher`                             | known in advance  |
//! | `relay`      | `nonce`, `cipher`, `encryptedKey`             | anonymous         |
//! | `sealed`     | `cipher`                                      | anonymous         |
//! | `cloaked`    | `cipher`, `encryptedSenderPublicBoxKey`       | revealed on open  |
//! | `anonymized` | `cipher`, `encryptedSenderSigningKey`, `nonce`| claimed, verified |
//!
//! Every payload is JSON-encoded before encryption and decoded after a
//! successful open. Opening never mutates the envelope.
//!
//! Each concrete type parses itself with `from_json`. When the variant is
//! not known up front, [`Envelope`] carries a `kind` tag and dispatches to
//! the matching open routine.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::{IdentityKey, KeyError};

mod anonymized;
mod cloaked;
mod direct;
mod relay;
mod sealed;

pub use anonymized::AnonymizedMessage;
pub use cloaked::{CloakedMessage, Uncloaked};
pub use direct::DirectMessage;
pub use relay::RelayMessage;
pub use sealed::SealedMessage;

/// Shared trait impls for an envelope record `$name<T>`.
///
/// The payload type only appears as a marker, so none of these need bounds
/// on `T`.
macro_rules! wire_envelope {
    ($name:ident, $kind:literal { $($field:ident),+ $(,)? }) => {
        impl<T> Clone for $name<T> {
            fn clone(&self) -> Self {
                Self {
                    $($field: self.$field.clone(),)+
                    _payload: ::std::marker::PhantomData,
                }
            }
        }

        impl<T> PartialEq for $name<T> {
            fn eq(&self, other: &Self) -> bool {
                true $(&& self.$field == other.$field)+
            }
        }

        impl<T> Eq for $name<T> {}

        impl<T> ::std::fmt::Debug for $name<T> {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.debug_struct(stringify!($name))
                    $(.field(stringify!($field), &format_args!("[{} bytes]", self.$field.len())))+
                    .finish()
            }
        }

        impl<T> $name<T> {
            /// Tag used by [`crate::envelope::Envelope`].
            pub const KIND: &'static str = $kind;

            pub fn to_json(&self) -> Result<String, $crate::KeyError> {
                ::serde_json::to_string(self)
                    .map_err(|e| $crate::KeyError::MalformedEnvelope(e.to_string()))
            }

            /// Parse the wire form and check field lengths.
            pub fn from_json(text: &str) -> Result<Self, $crate::KeyError> {
                let parsed: Self = ::serde_json::from_str(text)
                    .map_err(|e| $crate::KeyError::MalformedEnvelope(e.to_string()))?;
                parsed.validate()?;
                Ok(parsed)
            }

            /// Retype the envelope for a different payload type. Opening then
            /// decodes the plaintext as `U`.
            pub fn cast<U>(self) -> $name<U> {
                $name {
                    $($field: self.$field,)+
                    _payload: ::std::marker::PhantomData,
                }
            }
        }
    };
}

pub(crate) use wire_envelope;

/// Check a byte field has exactly `len` bytes.
pub(crate) fn expect_len(field: &str, bytes: &[u8], len: usize) -> Result<(), KeyError> {
    if bytes.len() != len {
        return Err(KeyError::MalformedEnvelope(format!(
            "{field} must be {len} bytes, got {}",
            bytes.len()
        )));
    }
    Ok(())
}

/// An envelope of any kind, tagged on the wire with `kind`.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
#[serde(tag = "kind", rename_all = "lowercase", bound = "")]
pub enum Envelope<T> {
    Direct(DirectMessage<T>),
    Relay(RelayMessage<T>),
    Sealed(SealedMessage<T>),
    Cloaked(CloakedMessage<T>),
    Anonymized(AnonymizedMessage<T>),
}

/// Plaintext recovered from an [`Envelope`], with the sender id when the
/// envelope kind identifies one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opened<T> {
    pub payload: T,
    pub sender: Option<String>,
}

impl<T> Envelope<T> {
    pub fn kind(&self) -> &'static str {
        match self {
            Envelope::Direct(_) => DirectMessage::<T>::KIND,
            Envelope::Relay(_) => RelayMessage::<T>::KIND,
            Envelope::Sealed(_) => SealedMessage::<T>::KIND,
            Envelope::Cloaked(_) => CloakedMessage::<T>::KIND,
            Envelope::Anonymized(_) => AnonymizedMessage::<T>::KIND,
        }
    }

    pub fn to_json(&self) -> Result<String, KeyError> {
        serde_json::to_string(self).map_err(|e| KeyError::MalformedEnvelope(e.to_string()))
    }

    /// Parse a tagged envelope. Unknown tags and wrong field shapes are
    /// rejected before any key is touched.
    pub fn from_json(text: &str) -> Result<Self, KeyError> {
        let parsed: Self =
            serde_json::from_str(text).map_err(|e| KeyError::MalformedEnvelope(e.to_string()))?;
        match &parsed {
            Envelope::Direct(m) => m.validate()?,
            Envelope::Relay(m) => m.validate()?,
            Envelope::Sealed(m) => m.validate()?,
            Envelope::Cloaked(m) => m.validate()?,
            Envelope::Anonymized(m) => m.validate()?,
        }
        Ok(parsed)
    }
}

impl<T: DeserializeOwned> Envelope<T> {
    /// Open with `recipient`'s keys.
    ///
    /// `claimed_sender` is required for `direct` and `anonymized` envelopes
    /// and ignored by the other kinds. A `cloaked` envelope reports the
    /// sender id it carries.
    pub fn open(
        &self,
        recipient: &IdentityKey,
        claimed_sender: Option<&str>,
    ) -> Result<Opened<T>, KeyError> {
        debug!(kind = self.kind(), "opening envelope");
        let opened = match self {
            Envelope::Direct(m) => {
                let sender = claimed_sender.ok_or(KeyError::SenderRequired(DirectMessage::<T>::KIND))?;
                Opened {
                    payload: m.decrypt(recipient, sender)?,
                    sender: Some(sender.to_string()),
                }
            }
            Envelope::Relay(m) => Opened {
                payload: m.decrypt(recipient)?,
                sender: None,
            },
            Envelope::Sealed(m) => Opened {
                payload: m.decrypt(recipient)?,
                sender: None,
            },
            Envelope::Cloaked(m) => {
                let Uncloaked { payload, sender } = m.decrypt(recipient)?;
                Opened {
                    payload,
                    sender: Some(sender),
                }
            }
            Envelope::Anonymized(m) => {
                let sender =
                    claimed_sender.ok_or(KeyError::SenderRequired(AnonymizedMessage::<T>::KIND))?;
                Opened {
                    payload: m.decrypt(recipient, sender)?,
                    sender: Some(sender.to_string()),
                }
            }
        };
        Ok(opened)
    }
}

macro_rules! envelope_from {
    ($($variant:ident($ty:ident)),+ $(,)?) => {
        $(
            impl<T> From<$ty<T>> for Envelope<T> {
                fn from(m: $ty<T>) -> Self {
                    Envelope::$variant(m)
                }
            }
        )+
    };
}

envelope_from!(
    Direct(DirectMessage),
    Relay(RelayMessage),
    Sealed(SealedMessage),
    Cloaked(CloakedMessage),
    Anonymized(AnonymizedMessage),
);
