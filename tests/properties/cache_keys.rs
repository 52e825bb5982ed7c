//! Property tests for the dependency cache key.

use proptest::prelude::*;

use stager::domain::services::dependency_key;

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: the key is a pure function of the two byte strings.
    #[test]
    fn property_key_is_deterministic(manifest in any::<Vec<u8>>(), lock in any::<Vec<u8>>()) {
        prop_assert_eq!(
            dependency_key(&manifest, Some(&lock)),
            dependency_key(&manifest, Some(&lock))
        );
    }

    /// PROPERTY: moving bytes across the manifest/lock boundary changes the key.
    #[test]
    fn property_key_is_framed(bytes in proptest::collection::vec(any::<u8>(), 2..64), split in 1usize..63) {
        let split = split.min(bytes.len() - 1);
        let (left, right) = bytes.split_at(split);
        let (shifted_left, shifted_right) = bytes.split_at(split - 1);
        prop_assert_ne!(
            dependency_key(left, Some(right)),
            dependency_key(shifted_left, Some(shifted_right))
        );
    }

    /// PROPERTY: an absent lock never collides with an empty one.
    #[test]
    fn property_absent_lock_differs_from_empty_lock(manifest in any::<Vec<u8>>()) {
        prop_assert_ne!(dependency_key(&manifest, None), dependency_key(&manifest, Some(&[])));
    }
}
