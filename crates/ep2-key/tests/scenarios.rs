//! End-to-end scenarios across keys, envelopes and handshakes.

use ep2_key::{
    AnonymizedMessage, Envelope, IdentityKey, KeyError, RelayMessage, SharedChannel,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Note {
    msg: String,
}

#[test]
fn test_phrase_seed_pins_id() {
    init_tracing();
    let a = IdentityKey::from_phrase("some strong seed").expect("key from phrase");
    assert_eq!(
        a.id(),
        "a44cc3f042ff10d01bb5d311b335fb56cf9493a0ba1f4667d7cfc3e61a6fac75"
    );
    let again = IdentityKey::from_phrase("some strong seed").expect("key from phrase");
    assert_eq!(a, again);
}

#[test]
fn test_anonymized_hi_for_b_only_from_a() {
    init_tracing();
    let a = IdentityKey::generate().unwrap();
    let b = IdentityKey::generate().unwrap();
    let c = IdentityKey::generate().unwrap();

    let msg = a
        .anonymize(&Note { msg: "hi".into() }, b.id())
        .expect("anonymize");
    assert_eq!(msg.decrypt(&b, a.id()).unwrap(), Note { msg: "hi".into() });

    let err = msg.decrypt(&b, c.id()).unwrap_err();
    assert!(err.is_rejection());
}

#[test]
fn test_relay_survives_an_intermediary() {
    init_tracing();
    let b = IdentityKey::generate().unwrap();
    let recipient_id = b.id().to_string();
    let b_file = b.to_json().unwrap();
    drop(b);

    // Sender side: only the id is known.
    let wire = {
        let msg = IdentityKey::encrypt(&recipient_id, &json!({"title": "relay"})).unwrap();
        msg.to_json().unwrap()
    };

    // Relay side: it can parse and forward, nothing more.
    let forwarded: Value = serde_json::from_str(&wire).unwrap();
    let forwarded = forwarded.to_string();

    // Recipient side: restore the key from disk and open.
    let b = IdentityKey::from_json(&b_file).unwrap();
    let msg = RelayMessage::<Value>::from_json(&forwarded).unwrap();
    assert_eq!(b.decrypt_symmetrically(&msg).unwrap(), json!({"title": "relay"}));
}

#[test]
fn test_handshake_then_bulk_traffic() {
    init_tracing();
    let a = IdentityKey::generate().unwrap();
    let b = IdentityKey::generate().unwrap();

    let (a_channel, handshake) = a.initiate_handshake(b.id()).unwrap();
    let handshake_json = handshake.to_json().unwrap();

    let received = ep2_key::EncryptedHandshake::from_json(&handshake_json).unwrap();
    let b_channel: SharedChannel = b.receive_handshake(a.id(), &received).unwrap();
    assert_eq!(a_channel, b_channel);

    for i in 0..5 {
        let frame = a_channel.seal_frame(&json!({"seq": i})).unwrap();
        assert_eq!(b_channel.open_frame::<Value>(&frame).unwrap(), json!({"seq": i}));
    }

    let c = IdentityKey::generate().unwrap();
    assert_eq!(
        c.receive_handshake(a.id(), &received),
        Err(KeyError::AuthenticationFailure)
    );
}

#[test]
fn test_tagged_envelopes_from_unknown_source() {
    init_tracing();
    let a = IdentityKey::generate().unwrap();
    let b = IdentityKey::generate().unwrap();

    let inbox: Vec<String> = vec![
        Envelope::from(a.cloak(&json!({"k": 1}), b.id()).unwrap()).to_json().unwrap(),
        Envelope::from(a.seal(&json!({"k": 2}), b.id()).unwrap()).to_json().unwrap(),
        Envelope::from(AnonymizedMessage::encrypt(&json!({"k": 3}), &a, b.id()).unwrap())
            .to_json()
            .unwrap(),
    ];

    let mut got = Vec::new();
    for text in inbox {
        let env = Envelope::<Value>::from_json(&text).unwrap();
        let opened = env.open(&b, Some(a.id())).unwrap();
        got.push(opened.payload["k"].as_u64().unwrap());
    }
    assert_eq!(got, [1, 2, 3]);
}
