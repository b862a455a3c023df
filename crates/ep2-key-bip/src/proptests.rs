#[cfg(test)]
mod tests {
    use bip39::{Language, Mnemonic};
    use proptest::prelude::*;

    use crate::BipKey;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn test_mnemonic_recovery_is_deterministic(entropy in any::<[u8; 16]>()) {
            let phrase = Mnemonic::from_entropy_in(Language::English, &entropy).unwrap().to_string();
            let a = BipKey::from_mnemonic(&phrase).unwrap();
            let b = BipKey::from_mnemonic(&phrase).unwrap();
            prop_assert_eq!(a.id(), b.id());
            prop_assert_eq!(a.public_sign_key(), b.public_sign_key());
            prop_assert_eq!(a.mnemonic(), phrase.as_str());
        }

        #[test]
        fn test_distinct_entropy_distinct_ids(e1 in any::<[u8; 16]>(), e2 in any::<[u8; 16]>()) {
            prop_assume!(e1 != e2);
            let m1 = Mnemonic::from_entropy_in(Language::English, &e1).unwrap().to_string();
            let m2 = Mnemonic::from_entropy_in(Language::English, &e2).unwrap().to_string();
            let k1 = BipKey::from_mnemonic(&m1).unwrap();
            let k2 = BipKey::from_mnemonic(&m2).unwrap();
            prop_assert_ne!(k1.id(), k2.id());
        }
    }
}
