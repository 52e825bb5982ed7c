//! Property tests for package names and requirements.

use proptest::prelude::*;

use stager::domain::value_objects::{PackageName, Requirement, Version};

fn name_string() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Za-z0-9]([A-Za-z0-9._-]{0,10}[A-Za-z0-9])?").unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: parsing arbitrary text never panics.
    #[test]
    fn property_requirement_parse_never_panics(input in ".{0,60}") {
        let _ = input.parse::<Requirement>();
    }

    /// PROPERTY: name normalization is idempotent and case/separator insensitive.
    #[test]
    fn property_name_normalization_is_idempotent(raw in name_string()) {
        let once = PackageName::new(&raw).unwrap();
        let twice = PackageName::new(once.as_str()).unwrap();
        prop_assert_eq!(&once, &twice);

        let shouted = PackageName::new(&raw.to_ascii_uppercase().replace('-', "_")).unwrap();
        prop_assert_eq!(once, shouted);
    }

    /// PROPERTY: a rendered requirement parses back to the same requirement.
    #[test]
    fn property_requirement_display_round_trips(
        name in name_string(),
        major in 0u64..20,
        minor in 0u64..20,
        op in prop_oneof![Just(">="), Just("=="), Just("<"), Just("~="), Just("!=")],
    ) {
        let raw = format!("{name} {op}{major}.{minor}");
        let requirement: Requirement = raw.parse().unwrap();
        let reparsed: Requirement = requirement.to_string().parse().unwrap();
        prop_assert_eq!(reparsed, requirement);
    }

    /// PROPERTY: `==V` is satisfied by exactly V.
    #[test]
    fn property_exact_pin_matches_only_itself(major in 0u64..20, minor in 0u64..20, other in 0u64..20) {
        let requirement: Requirement = format!("pkg=={major}.{minor}").parse().unwrap();
        let pinned: Version = format!("{major}.{minor}").parse().unwrap();
        let candidate: Version = format!("{major}.{other}").parse().unwrap();
        prop_assert!(requirement.is_satisfied_by(&pinned));
        prop_assert_eq!(requirement.is_satisfied_by(&candidate), other == minor);
    }
}
