#[cfg(test)]
mod tests {
    use ep2_key::IdentityKey;
    use proptest::prelude::*;

    use crate::error::PushError;
    use crate::model::NotificationOptions;
    use crate::relay::check_payload_size;

    proptest! {
        #[test]
        fn test_size_check_matches_bound(size in 0usize..10_000, max in 1usize..10_000) {
            let result = check_payload_size(size, max);
            prop_assert_eq!(result.is_ok(), size < max);
            if let Err(PushError::PayloadTooLarge { size: s, max: m }) = result {
                prop_assert_eq!((s, m), (size, max));
            }
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn test_notification_survives_cloaking(title in "\\PC{0,40}", body in "\\PC{0,200}") {
            let sender = IdentityKey::generate().unwrap();
            let receiver = IdentityKey::generate().unwrap();
            let options = NotificationOptions::text(title, body);

            let cloaked = sender.cloak(&options, receiver.id()).unwrap();
            let opened = cloaked.decrypt(&receiver).unwrap();
            prop_assert_eq!(opened.payload, options);
            prop_assert_eq!(opened.sender, sender.id());
        }
    }
}
