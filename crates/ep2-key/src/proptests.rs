#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::json;

    use crate::identity::verify_signature;
    use crate::{IdentityKey, KeyError, SharedChannel, SIGNATURE_SIZE};

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn test_seed_determinism(seed in any::<[u8; 32]>()) {
            let a = IdentityKey::from_seed(&seed).unwrap();
            let b = IdentityKey::from_seed(&seed).unwrap();
            prop_assert_eq!(a.id(), b.id());
            prop_assert_eq!(a.public_sign_key(), b.public_sign_key());
        }

        #[test]
        fn test_distinct_seeds_distinct_ids(s1 in any::<[u8; 32]>(), s2 in any::<[u8; 32]>()) {
            prop_assume!(s1 != s2);
            let a = IdentityKey::from_seed(&s1).unwrap();
            let b = IdentityKey::from_seed(&s2).unwrap();
            prop_assert_ne!(a.id(), b.id());
        }

        #[test]
        fn test_signature_round_trip(seed in any::<[u8; 32]>(), message in any::<Vec<u8>>()) {
            let key = IdentityKey::from_seed(&seed).unwrap();
            let sig = key.sign(&message);
            prop_assert!(verify_signature(&key.public_sign_key(), &message, &sig).is_ok());
        }

        #[test]
        fn test_every_envelope_round_trips(text in ".{0,64}", n in any::<i64>()) {
            let a = IdentityKey::generate().unwrap();
            let b = IdentityKey::generate().unwrap();
            let payload = json!({"text": text, "n": n});

            let direct = a.init_secure_channel(b.id()).unwrap().encrypt(&payload).unwrap();
            prop_assert_eq!(direct.decrypt(&b, a.id()).unwrap(), payload.clone());

            let relay = IdentityKey::encrypt(b.id(), &payload).unwrap();
            prop_assert_eq!(b.decrypt_symmetrically(&relay).unwrap(), payload.clone());

            let sealed = a.seal(&payload, b.id()).unwrap();
            prop_assert_eq!(sealed.decrypt(&b).unwrap(), payload.clone());

            let cloaked = a.cloak(&payload, b.id()).unwrap();
            prop_assert_eq!(cloaked.decrypt(&b).unwrap().payload, payload.clone());

            let anonymized = a.anonymize(&payload, b.id()).unwrap();
            prop_assert_eq!(anonymized.decrypt(&b, a.id()).unwrap(), payload);
        }

        #[test]
        fn test_anonymized_byte_flip_rejected(idx in any::<prop::sample::Index>(), bit in 0u8..8) {
            let a = IdentityKey::generate().unwrap();
            let b = IdentityKey::generate().unwrap();
            let mut msg = a.anonymize(&json!({"msg": "hi"}), b.id()).unwrap();
            let i = idx.index(msg.cipher.len());
            msg.cipher[i] ^= 1 << bit;
            let err = msg.decrypt(&b, a.id()).unwrap_err();
            prop_assert!(err.is_rejection());
            if i < SIGNATURE_SIZE {
                prop_assert_eq!(err, KeyError::SignatureVerification);
            }
        }

        #[test]
        fn test_relay_byte_flip_rejected(idx in any::<prop::sample::Index>(), bit in 0u8..8) {
            let b = IdentityKey::generate().unwrap();
            let mut msg = IdentityKey::encrypt(b.id(), &"relayed").unwrap().cast::<String>();
            let i = idx.index(msg.cipher.len());
            msg.cipher[i] ^= 1 << bit;
            prop_assert_eq!(msg.decrypt(&b), Err(KeyError::AuthenticationFailure));
        }

        #[test]
        fn test_relay_key_byte_flip_rejected(idx in any::<prop::sample::Index>(), bit in 0u8..8) {
            let b = IdentityKey::generate().unwrap();
            let mut msg = IdentityKey::encrypt(b.id(), &"relayed").unwrap().cast::<String>();
            let i = idx.index(msg.encrypted_key.len());
            msg.encrypted_key[i] ^= 1 << bit;
            prop_assert_eq!(msg.decrypt(&b), Err(KeyError::AuthenticationFailure));
        }

        #[test]
        fn test_sealed_byte_flip_rejected(idx in any::<prop::sample::Index>(), bit in 0u8..8) {
            let a = IdentityKey::generate().unwrap();
            let b = IdentityKey::generate().unwrap();
            let mut msg = a.seal(&json!({"msg": "hi"}), b.id()).unwrap();
            let i = idx.index(msg.cipher.len());
            msg.cipher[i] ^= 1 << bit;
            prop_assert_eq!(msg.decrypt(&b), Err(KeyError::AuthenticationFailure));
        }

        #[test]
        fn test_cloaked_byte_flip_rejected(
            idx in any::<prop::sample::Index>(),
            bit in 0u8..8,
            sender_field in any::<bool>(),
        ) {
            let a = IdentityKey::generate().unwrap();
            let b = IdentityKey::generate().unwrap();
            let mut msg = a.cloak(&json!({"msg": "hi"}), b.id()).unwrap();
            let field = if sender_field {
                &mut msg.encrypted_sender_public_box_key
            } else {
                &mut msg.cipher
            };
            let i = idx.index(field.len());
            field[i] ^= 1 << bit;
            prop_assert_eq!(msg.decrypt(&b).unwrap_err(), KeyError::AuthenticationFailure);
        }

        #[test]
        fn test_direct_byte_flip_rejected(idx in any::<prop::sample::Index>(), bit in 0u8..8) {
            let a = IdentityKey::generate().unwrap();
            let b = IdentityKey::generate().unwrap();
            let mut msg = a.init_secure_channel(b.id()).unwrap().encrypt(&json!({"msg": "hi"})).unwrap();
            let i = idx.index(msg.cipher.len());
            msg.cipher[i] ^= 1 << bit;
            prop_assert_eq!(msg.decrypt(&b, a.id()), Err(KeyError::AuthenticationFailure));
        }

        #[test]
        fn test_shared_channel_byte_flip_rejected(
            secret in any::<[u8; 32]>(),
            idx in any::<prop::sample::Index>(),
            bit in 0u8..8,
        ) {
            let ch = SharedChannel::new(secret);
            let mut msg = ch.encrypt(&vec![1u8, 2, 3]).unwrap();
            let i = idx.index(msg.cipher.len());
            msg.cipher[i] ^= 1 << bit;
            prop_assert_eq!(ch.decrypt(&msg), Err(KeyError::AuthenticationFailure));
        }
    }
}
