//! Holder of the key used to open incoming pushes.
//!
//! The front end installs or replaces the key at any time; push handling
//! reads whatever key is current when a push arrives.

use std::sync::Arc;

use ep2_key::utils::short_id;
use ep2_key::IdentityKey;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::PushError;

/// Messages the front end posts to the push handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControlMessage {
    /// Replace the current key. `key` is the key's JSON text.
    UpdateKey { key: String },
}

/// Shared, replaceable slot for the current identity key.
#[derive(Clone, Default)]
pub struct KeySession {
    current: Arc<RwLock<Option<Arc<IdentityKey>>>>,
}

impl KeySession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `key`, replacing any previous one.
    pub async fn install(&self, key: IdentityKey) {
        let mut slot = self.current.write().await;
        info!(id = short_id(key.id()), replaced = slot.is_some(), "key installed");
        *slot = Some(Arc::new(key));
    }

    /// Restore a key from its JSON text and install it. Returns the key id.
    ///
    /// A key that fails to restore leaves the current key in place.
    pub async fn install_json(&self, text: &str) -> Result<String, PushError> {
        let key = IdentityKey::from_json(text)?;
        let id = key.id().to_string();
        self.install(key).await;
        Ok(id)
    }

    pub async fn handle_message(&self, msg: ControlMessage) -> Result<String, PushError> {
        match msg {
            ControlMessage::UpdateKey { key } => self.install_json(&key).await,
        }
    }

    pub async fn current(&self) -> Option<Arc<IdentityKey>> {
        self.current.read().await.clone()
    }

    /// Drop the current key. Returns whether one was installed.
    pub async fn teardown(&self) -> bool {
        let dropped = self.current.write().await.take();
        if let Some(key) = &dropped {
            debug!(id = short_id(key.id()), "key removed");
        }
        dropped.is_some()
    }
}

impl std::fmt::Debug for KeySession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeySession").finish_non_exhaustive()
    }
}
