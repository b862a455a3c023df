//! Small helpers shared by the key and envelope modules.

use constant_time_eq::constant_time_eq;
use serde::{de::DeserializeOwned, Serialize};

use crate::KeyError;

/// Compare two byte slices in constant time.
///
/// ```rust
/// use ep2_key::utils::constant_time_compare;
///
/// assert!(constant_time_compare(&[7u8; 32], &[7u8; 32]));
/// assert!(!constant_time_compare(&[7u8; 32], &[8u8; 32]));
/// ```
pub fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    constant_time_eq(a, b)
}

/// Leading characters of an id, for log lines.
pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

/// Fill a fresh array from the OS CSPRNG.
pub(crate) fn random_array<const N: usize>() -> Result<[u8; N], KeyError> {
    let mut buf = [0u8; N];
    getrandom::getrandom(&mut buf)
        .map_err(|e| KeyError::Encryption(format!("rng failure: {e}")))?;
    Ok(buf)
}

/// Canonical byte form of a payload: its JSON text.
pub(crate) fn encode_payload<T: Serialize + ?Sized>(obj: &T) -> Result<Vec<u8>, KeyError> {
    serde_json::to_vec(obj).map_err(|e| KeyError::Payload(e.to_string()))
}

pub(crate) fn decode_payload<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, KeyError> {
    serde_json::from_slice(bytes).map_err(|e| KeyError::Payload(e.to_string()))
}

/// Copy a slice into a fixed array, failing with `err` on a length mismatch.
pub(crate) fn to_array<const N: usize>(
    bytes: &[u8],
    err: impl FnOnce(usize) -> KeyError,
) -> Result<[u8; N], KeyError> {
    bytes.try_into().map_err(|_| err(bytes.len()))
}
