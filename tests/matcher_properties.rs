// tests/matcher_properties.rs
use proptest::prelude::*;
use rmq_portable::layout::{EntryKind, classify, is_support_dir};

// Random ASCII casing of a fixed word.
fn any_case(word: &'static str) -> impl Strategy<Value = String> {
    proptest::collection::vec(any::<bool>(), word.len()).prop_map(move |mask| {
        word.chars()
            .zip(mask)
            .map(|(c, upper)| if upper { c.to_ascii_uppercase() } else { c })
            .collect()
    })
}

proptest! {
    #[test]
    fn erl_prefix_is_always_runtime(prefix in any_case("erl"), suffix in "[a-zA-Z0-9._-]{0,12}") {
        prop_assert_eq!(classify(&format!("{prefix}{suffix}")), Some(EntryKind::Runtime));
    }

    #[test]
    fn rabbit_prefix_is_always_broker(prefix in any_case("rabbit"), suffix in "[a-zA-Z0-9._-]{0,12}") {
        prop_assert_eq!(classify(&format!("{prefix}{suffix}")), Some(EntryKind::Broker));
    }

    #[test]
    fn data_matches_only_exactly(name in any_case("data"), suffix in "[a-z0-9]{1,6}") {
        prop_assert_eq!(classify(&name), Some(EntryKind::Data));
        prop_assert_eq!(classify(&format!("{name}{suffix}")), None);
    }

    #[test]
    fn classification_ignores_ascii_case(name in "[a-zA-Z0-9_-]{0,16}") {
        prop_assert_eq!(classify(&name), classify(&name.to_ascii_uppercase()));
        prop_assert_eq!(classify(&name), classify(&name.to_ascii_lowercase()));
    }

    #[test]
    fn unrelated_names_are_ignored(name in "[abcf-qs-z0-9_][a-z0-9_-]{0,12}") {
        prop_assert_eq!(classify(&name), None);
    }

    #[test]
    fn erts_prefix_is_a_support_dir(prefix in any_case("erts"), suffix in "-?[0-9.]{0,8}") {
        let name = format!("{prefix}{suffix}");
        prop_assert!(is_support_dir(&name));
    }
}
