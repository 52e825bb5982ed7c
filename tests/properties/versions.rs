//! Property tests for version parsing and ordering.

use proptest::prelude::*;

use stager::domain::value_objects::Version;

fn version_string() -> impl Strategy<Value = String> {
    let release = proptest::collection::vec(0u64..50, 1..=4)
        .prop_map(|parts| parts.iter().map(|p| p.to_string()).collect::<Vec<_>>().join("."));
    let pre = prop_oneof![
        Just(String::new()),
        (prop_oneof![Just("a"), Just("b"), Just("rc")], 0u64..5).prop_map(|(k, n)| format!("{k}{n}")),
    ];
    let post = prop_oneof![Just(String::new()), (0u64..5).prop_map(|n| format!(".post{n}"))];
    let dev = prop_oneof![Just(String::new()), (0u64..5).prop_map(|n| format!(".dev{n}"))];
    (release, pre, post, dev).prop_map(|(r, a, p, d)| format!("{r}{a}{p}{d}"))
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: parsing arbitrary text never panics.
    #[test]
    fn property_version_parse_never_panics(input in ".{0,40}") {
        let _ = input.parse::<Version>();
    }

    /// PROPERTY: the canonical rendering parses back to an equal version.
    #[test]
    fn property_version_display_is_canonical(raw in version_string()) {
        let version: Version = raw.parse().unwrap();
        let reparsed: Version = version.to_string().parse().unwrap();
        prop_assert_eq!(&reparsed, &version);
        prop_assert_eq!(reparsed.to_string(), version.to_string());
    }

    /// PROPERTY: ordering is antisymmetric and agrees with equality.
    #[test]
    fn property_version_ordering_is_consistent(a in version_string(), b in version_string()) {
        let a: Version = a.parse().unwrap();
        let b: Version = b.parse().unwrap();
        prop_assert_eq!(a.cmp(&b), b.cmp(&a).reverse());
        prop_assert_eq!(a == b, a.cmp(&b).is_eq());
    }

    /// PROPERTY: sorting is transitive (a sorted list is pairwise non-decreasing).
    #[test]
    fn property_version_sort_is_transitive(raw in proptest::collection::vec(version_string(), 2..12)) {
        let mut versions: Vec<Version> = raw.iter().map(|r| r.parse().unwrap()).collect();
        versions.sort();
        for i in 0..versions.len() {
            for j in i..versions.len() {
                prop_assert!(versions[i] <= versions[j]);
            }
        }
    }
}
