#![forbid(unsafe_code)]

//! End-to-end encrypted push delivery on top of `ep2-key`.
//!
//! A subscription owner obtains VAPID keys from the push relay and hands
//! peers a [`PushAuthorization`]. Peers cloak notifications for the owner
//! and send them with that authorization. The relay opens only the
//! authorization, forwards the cloaked notification, and the owner's
//! [`PushReceiver`] decrypts it with the key held by its [`KeySession`].

pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod receiver;
pub mod relay;
pub mod session;

#[cfg(test)]
mod proptests;

pub use client::{compose_push, open_vapid_response, vapid_request};
pub use config::PushConfig;
pub use error::{ConfigError, PushError};
pub use model::{
    NotificationAction, NotificationOptions, PushAuthorization, PushMessage, PushSubscription,
    SubscriptionKeys, VapidKeys, VapidRequest, VapidResponse,
};
pub use receiver::{PushReceiver, ReceivedPush};
pub use relay::{accept_vapid_request, check_payload_size, issue_vapid, open_push_message, Delivery};
pub use session::{ControlMessage, KeySession};
