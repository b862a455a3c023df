//! One-shot initialization gate for the primitive set.
//!
//! The first caller runs a known-answer self-test of box, seal and
//! secretbox; every later caller gets the cached outcome.

use std::sync::OnceLock;

use crypto_box::SecretKey;
use tracing::{debug, warn};

use crate::{nacl, KeyError};

static READY: OnceLock<Result<(), String>> = OnceLock::new();

/// Run the self-test once per process and return its cached result.
pub fn ensure_initialized() -> Result<(), KeyError> {
    READY
        .get_or_init(|| {
            let outcome = self_test();
            match &outcome {
                Ok(()) => debug!("crypto primitives ready"),
                Err(reason) => warn!(%reason, "crypto self-test failed"),
            }
            outcome
        })
        .clone()
        .map_err(KeyError::Initialization)
}

/// True once the gate has been passed successfully.
pub fn is_initialized() -> bool {
    matches!(READY.get(), Some(Ok(())))
}

fn self_test() -> Result<(), String> {
    let alice = SecretKey::from([0x11; 32]);
    let bob = SecretKey::from([0x22; 32]);
    let nonce = [0x33; nacl::NONCE_SIZE];
    let probe = b"ep2 self-test";

    let boxed = nacl::box_encrypt(probe, &nonce, &bob.public_key(), &alice)
        .map_err(|e| format!("box: {e}"))?;
    let opened = nacl::box_open(&boxed, &nonce, &alice.public_key(), &bob)
        .map_err(|e| format!("box open: {e}"))?;
    if opened != probe {
        return Err("box round trip mismatch".into());
    }

    let sealed = nacl::seal(probe, &bob.public_key()).map_err(|e| format!("seal: {e}"))?;
    if nacl::seal_open(&sealed, &bob).map_err(|e| format!("seal open: {e}"))? != probe {
        return Err("seal round trip mismatch".into());
    }

    let key = [0x44; nacl::KEY_SIZE];
    let secret = nacl::secretbox_encrypt(probe, &nonce, &key).map_err(|e| format!("secretbox: {e}"))?;
    if nacl::secretbox_open(&secret, &nonce, &key).map_err(|e| format!("secretbox open: {e}"))?
        != probe
    {
        return Err("secretbox round trip mismatch".into());
    }
    Ok(())
}
