//! Property tests for layer merging and conflict detection.

use proptest::prelude::*;

use nixlayer::domain::entities::Config;
use nixlayer::domain::services::{detect_conflicts, merge, ordered_union};
use nixlayer::LayerKind;

fn package() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,8}"
}

fn packages() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec(package(), 0..8)
}

fn shell() -> impl Strategy<Value = Option<&'static str>> {
    proptest::option::of(prop_oneof![Just("bash"), Just("zsh"), Just("fish")])
}

fn config(kind: LayerKind) -> impl Strategy<Value = Config> {
    (packages(), shell()).prop_map(move |(core, shell)| {
        let config = Config::new(kind, "prop").with_core_packages(core);
        match shell {
            Some(shell) => config.with_shell(shell),
            None => config,
        }
    })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: the union holds every item once, base items first.
    #[test]
    fn property_union_is_ordered_and_unique(a in packages(), b in packages()) {
        let union = ordered_union(&a, &b);

        for item in a.iter().chain(b.iter()) {
            prop_assert_eq!(union.iter().filter(|u| *u == item).count(), 1);
        }

        let mut expected: Vec<String> = Vec::new();
        for item in a.iter().chain(b.iter()) {
            if !expected.contains(item) {
                expected.push(item.clone());
            }
        }
        prop_assert_eq!(union, expected);
    }

    /// PROPERTY: merging the same overlay twice changes nothing.
    #[test]
    fn property_merge_is_idempotent(
        a in config(LayerKind::Personal),
        b in config(LayerKind::Project),
    ) {
        let once = merge(&a, &b);
        let twice = merge(&once, &b);
        prop_assert_eq!(once, twice);
    }

    /// PROPERTY: a config never conflicts with itself.
    #[test]
    fn property_self_has_no_conflicts(a in config(LayerKind::Personal)) {
        prop_assert!(detect_conflicts(&a, &a).is_empty());
    }
}
