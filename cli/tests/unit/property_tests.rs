//! Property-based tests for parameter validation and naming.
//!
//! Uses `proptest` to verify invariants across many random inputs.

#![allow(clippy::expect_used)]

use chrono::{TimeZone, Utc};
use proptest::prelude::*;

use puppet_provision::domain::config::{normalize_environment, validate_environment, validate_tag};
use puppet_provision::domain::{NodeIdentity, PuppetConfigInput, validate};

fn input(env: &str, tags: Vec<String>) -> PuppetConfigInput {
    PuppetConfigInput {
        environment: Some(env.to_string()),
        server: Some("puppet".to_string()),
        tags,
        ..PuppetConfigInput::default()
    }
}

// ============================================================================
// Environment names
// ============================================================================

proptest! {
    /// Separators always fold into underscores, so any mix of letters,
    /// digits and separators is accepted.
    #[test]
    fn prop_separated_names_are_accepted(raw in "[A-Za-z0-9 .\\-_]{1,40}") {
        let env = validate_environment(&raw).expect("should accept");
        prop_assert_eq!(env.len(), raw.len());
        prop_assert!(env.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'));
    }

    /// Normalizing twice changes nothing.
    #[test]
    fn prop_normalize_is_idempotent(raw in "\\PC{0,40}") {
        let once = normalize_environment(&raw);
        prop_assert_eq!(normalize_environment(&once), once);
    }

    /// Any character outside the allowed set is rejected and the error
    /// carries the raw value.
    #[test]
    fn prop_foreign_characters_are_rejected(
        head in "[a-z0-9]{0,10}",
        bad in "[!@#$%^&*()+=/,;:<>?~]",
        tail in "[a-z0-9]{0,10}",
    ) {
        let raw = format!("{head}{bad}{tail}");
        let err = validate(input(&raw, Vec::new())).expect_err("should reject");
        let msg = err.to_string();
        prop_assert!(msg.contains("environment"), "got: {}", msg);
        prop_assert!(msg.contains(&raw), "got: {}", msg);
    }
}

#[test]
fn test_environment_with_spaces_and_dots_normalizes() {
    let cfg = validate(input("My Env.v2-x", Vec::new())).expect("valid");
    assert_eq!(cfg.environment, "my_env_v2_x");
}

#[test]
fn test_empty_environment_is_rejected() {
    assert!(validate(input("", Vec::new())).is_err());
}

// ============================================================================
// Tags
// ============================================================================

proptest! {
    /// Tags built from the allowed alphabet always validate.
    #[test]
    fn prop_well_formed_tags_accepted(tag in "[a-z0-9_][a-z0-9_:.\\-]{0,30}") {
        prop_assert!(validate_tag(&tag).is_ok());
    }

    /// Upper-case letters anywhere make a tag invalid.
    #[test]
    fn prop_uppercase_tags_rejected(pre in "[a-z]{0,5}", up in "[A-Z]", post in "[a-z]{0,5}") {
        let tag = format!("{pre}{up}{post}");
        prop_assert!(validate_tag(&tag).is_err());
    }

    /// The first bad tag is the one reported.
    #[test]
    fn prop_first_invalid_tag_reported(good in "[a-z]{1,8}", n in 1u32..100) {
        let first = format!("-bad{n}");
        let second = format!("Bad{n}");
        let err = validate(input("e1", vec![good, first.clone(), second])).expect_err("reject");
        prop_assert!(err.to_string().contains(&first), "got: {}", err);
    }
}

#[test]
fn test_environment_checked_before_tags_and_server() {
    let err = validate(PuppetConfigInput {
        environment: Some("bad!".to_string()),
        server: None,
        tags: vec!["-x".to_string()],
        ..PuppetConfigInput::default()
    })
    .expect_err("reject");
    assert!(err.to_string().contains("environment"), "got: {err}");
}

// ============================================================================
// Node identity
// ============================================================================

proptest! {
    /// The certname is always a 12-digit UTC timestamp, a dash, then the
    /// node name.
    #[test]
    fn prop_certname_is_timestamp_dash_node_name(
        node_id in "[a-z0-9_]{1,20}",
        secs in 0i64..4_000_000_000,
    ) {
        let cfg = validate(input("e1", Vec::new())).expect("valid");
        let now = Utc.timestamp_opt(secs, 0).single().expect("valid timestamp");
        let id = NodeIdentity::derive(&cfg, &node_id, now);
        prop_assert_eq!(&id.node_name, &node_id);
        let (stamp, rest) = id.certname.split_at(12);
        prop_assert!(stamp.chars().all(|c| c.is_ascii_digit()));
        prop_assert_eq!(rest, format!("-{node_id}"));
    }
}
