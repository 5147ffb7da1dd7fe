//! Property tests for user-supplied names.

use proptest::prelude::*;

use nixlayer::domain::value_objects::validate_label;
use nixlayer::EnvironmentName;

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: accepted environment names are a single path component.
    #[test]
    fn property_environment_names_stay_inside(value in ".{0,24}") {
        if let Ok(name) = EnvironmentName::parse(&value) {
            let path = std::path::Path::new(name.as_str());
            prop_assert_eq!(path.components().count(), 1);
            prop_assert!(!name.as_str().starts_with('.'));
        }
    }

    /// PROPERTY: label validation never panics, and accepted labels have no separators.
    #[test]
    fn property_labels_have_no_separators(value in ".{0,24}") {
        if validate_label(&value).is_ok() {
            prop_assert!(!value.contains('/'));
            prop_assert!(!value.contains('\\'));
        }
    }
}
