use super::*;
use proptest::prelude::*;

proptest! {
    /// canonicalize(canonicalize(x)) == canonicalize(x) for any input
    #[test]
    fn prop_canonicalize_idempotent(raw in ".*") {
        let once = canonicalize(&raw);
        let twice = canonicalize(&once);
        prop_assert_eq!(once, twice);
    }

    /// Surrounding whitespace never changes the canonical form
    #[test]
    fn prop_canonicalize_whitespace_insensitive(raw in "[a-z0-9-]{1,20}") {
        let padded = format!("  {}\t", raw);
        prop_assert_eq!(canonicalize(&padded), canonicalize(&raw));
    }

    /// ASCII case never changes the canonical form outside the trail namespace
    #[test]
    fn prop_canonicalize_case_insensitive(raw in "[a-zA-Z0-9-]{1,20}") {
        prop_assert_eq!(
            canonicalize(&raw.to_uppercase()),
            canonicalize(&raw.to_lowercase())
        );
    }

    /// Trail-namespace keys survive untouched apart from trimming
    #[test]
    fn prop_trail_keys_pass_through(suffix in "[a-zA-Z0-9/._-]{0,20}") {
        let key = format!("trail:{}", suffix);
        prop_assert_eq!(canonicalize(&key), key.clone());
        let padded = format!("  {}  ", key);
        prop_assert_eq!(canonicalize(&padded), key);
    }

    /// The canonical form never contains uppercase ASCII outside trail keys
    #[test]
    fn prop_canonical_form_is_lowercase(raw in "[^\\r\\n]{0,40}") {
        let canonical = canonicalize(&raw);
        if !canonical.starts_with("trail:") {
            prop_assert!(!canonical.chars().any(|c| c.is_ascii_uppercase()));
        }
    }
}
