//! Push delivery from VAPID issue to the receiver's notification.

use ep2_key::IdentityKey;
use ep2_push::{
    accept_vapid_request, compose_push, issue_vapid, open_push_message, open_vapid_response,
    vapid_request, ControlMessage, KeySession, NotificationOptions, PushAuthorization,
    PushConfig, PushError, PushMessage, PushReceiver, PushSubscription, SubscriptionKeys,
    VapidKeys,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn subscription() -> PushSubscription {
    PushSubscription {
        endpoint: "https://push.example/send/owner".into(),
        expiration_time: Some(1_900_000_000),
        keys: SubscriptionKeys {
            p256dh: "BNcRdreALRFXTkOOUHK1EtK2wtaz5Ry4YfYCA_0QTpQtUbVlUls0VJXg7A8u-Ts1XbjhazAkj7I99e8QcYP7DkM".into(),
            auth: "tBHItJI5svbpez7KI4CCXg".into(),
        },
    }
}

struct Parties {
    server: IdentityKey,
    owner: IdentityKey,
    authorization: PushAuthorization,
}

fn authorize() -> Parties {
    let server = IdentityKey::generate().unwrap();
    let owner = IdentityKey::generate().unwrap();

    let request = vapid_request(&owner, server.id()).unwrap();
    let peer = accept_vapid_request(&server, &request).unwrap();
    let wrapped = issue_vapid(
        &server,
        &peer,
        VapidKeys {
            public_key: "BVapidPublic".into(),
            private_key: "vapid-private".into(),
        },
    )
    .unwrap();
    let vapid = open_vapid_response(&owner, server.id(), &wrapped).unwrap();
    assert_eq!(vapid.vapid_public_key, "BVapidPublic");

    let authorization = PushAuthorization::new(&subscription(), &vapid, server.id()).unwrap();
    Parties {
        server,
        owner,
        authorization,
    }
}

#[tokio::test]
async fn test_push_end_to_end() {
    init_tracing();
    let max = PushConfig::default().push_max_bytes;
    let parties = authorize();

    // The authorization travels as JSON to whoever may push.
    let auth_text = serde_json::to_string(&parties.authorization).unwrap();
    let authorization: PushAuthorization = serde_json::from_str(&auth_text).unwrap();

    let sender = IdentityKey::from_phrase("a friend").unwrap();
    let mut options = NotificationOptions::text("New message", "hello there");
    options.data = Some(serde_json::json!("conversation-7"));
    let push = compose_push(&sender, &authorization, parties.owner.id(), &options, max).unwrap();

    let wire = serde_json::to_string(&push).unwrap();
    let at_relay: PushMessage = serde_json::from_str(&wire).unwrap();
    let delivery = open_push_message(&parties.server, &at_relay, max).unwrap();
    assert_eq!(delivery.subscription, subscription());
    assert_eq!(delivery.vapid_keys.private_key, "vapid-private");
    assert!(!delivery.payload.contains("hello there"));

    let session = KeySession::new();
    session
        .handle_message(ControlMessage::UpdateKey {
            key: parties.owner.to_json().unwrap(),
        })
        .await
        .unwrap();
    let receiver = PushReceiver::new(session);
    let received = receiver.handle_push(&delivery.payload).await.unwrap();

    assert_eq!(received.sender, sender.id());
    assert_eq!(received.notification.body.as_deref(), Some("hello there"));
    assert_eq!(received.notification.data, options.data);
    assert_eq!(received.notification.actions.map(|a| a.len()), Some(2));
}

#[tokio::test]
async fn test_relay_refuses_foreign_authorization() {
    init_tracing();
    let parties = authorize();
    let other_relay = IdentityKey::generate().unwrap();
    let sender = IdentityKey::generate().unwrap();

    let push = compose_push(
        &sender,
        &parties.authorization,
        parties.owner.id(),
        &NotificationOptions::text("t", "b"),
        4078,
    )
    .unwrap();
    let err = open_push_message(&other_relay, &push, 4078).unwrap_err();
    assert!(err.is_rejection());
}

#[tokio::test]
async fn test_relay_applies_its_own_limit() {
    let parties = authorize();
    let sender = IdentityKey::generate().unwrap();
    let push = compose_push(
        &sender,
        &parties.authorization,
        parties.owner.id(),
        &NotificationOptions::text("t", "x".repeat(500)),
        4078,
    )
    .unwrap();

    assert!(matches!(
        open_push_message(&parties.server, &push, 256),
        Err(PushError::PayloadTooLarge { max: 256, .. })
    ));
}

#[tokio::test]
async fn test_receiver_after_teardown() {
    let parties = authorize();
    let sender = IdentityKey::generate().unwrap();
    let push = compose_push(
        &sender,
        &parties.authorization,
        parties.owner.id(),
        &NotificationOptions::text("t", "b"),
        4078,
    )
    .unwrap();
    let payload = push.cno.to_json().unwrap();

    let session = KeySession::new();
    session.install(parties.owner.clone()).await;
    let receiver = PushReceiver::new(session.clone());
    assert!(receiver.handle_push(&payload).await.is_ok());

    assert!(session.teardown().await);
    assert!(matches!(receiver.handle_push(&payload).await, Err(PushError::NoKey)));
}
