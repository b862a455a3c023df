//! Opening pushes delivered by the push service.

use ep2_key::utils::short_id;
use ep2_key::CloakedMessage;
use tracing::{debug, warn};

use crate::error::PushError;
use crate::model::{NotificationAction, NotificationOptions};
use crate::session::KeySession;

/// Vibration pattern applied to every received notification, in ms.
pub const DEFAULT_VIBRATE: [u32; 5] = [1000, 2000, 3000, 4000, 5000];

type PushHandler = Box<dyn Fn(&NotificationOptions) + Send + Sync>;

/// A decrypted push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedPush {
    pub notification: NotificationOptions,
    /// Id of the sender, as revealed by the cloaked envelope.
    pub sender: String,
}

pub struct PushReceiver {
    session: KeySession,
    handler: Option<PushHandler>,
}

impl PushReceiver {
    pub fn new(session: KeySession) -> Self {
        Self {
            session,
            handler: None,
        }
    }

    /// Call `handler` with every notification successfully opened.
    pub fn with_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&NotificationOptions) + Send + Sync + 'static,
    {
        self.handler = Some(Box::new(handler));
        self
    }

    pub fn session(&self) -> &KeySession {
        &self.session
    }

    /// Open the text of a push event.
    pub async fn handle_push(&self, data: &str) -> Result<ReceivedPush, PushError> {
        let key = self.session.current().await.ok_or(PushError::NoKey)?;
        if data.is_empty() {
            warn!("no push data available");
            return Err(PushError::EmptyPayload);
        }

        let cloaked = CloakedMessage::<NotificationOptions>::from_json(data).map_err(|e| {
            warn!(error = %e, "invalid push request");
            PushError::Malformed(e.to_string())
        })?;
        let opened = cloaked.decrypt(&key).map_err(|e| {
            warn!(error = %e, "unable to decrypt push request");
            e
        })?;
        debug!(sender = short_id(&opened.sender), "received push");

        let mut notification = opened.payload;
        notification.vibrate = Some(DEFAULT_VIBRATE.to_vec());
        notification.actions = Some(vec![
            NotificationAction {
                title: "Open".into(),
                action: "open".into(),
            },
            NotificationAction {
                title: "Close".into(),
                action: "close".into(),
            },
        ]);

        if let Some(handler) = &self.handler {
            handler(&notification);
        }
        Ok(ReceivedPush {
            notification,
            sender: opened.sender,
        })
    }
}

impl std::fmt::Debug for PushReceiver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PushReceiver")
            .field("handler", &self.handler.is_some())
            .finish_non_exhaustive()
    }
}
