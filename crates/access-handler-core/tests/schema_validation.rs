// crates/access-handler-core/tests/schema_validation.rs
// ============================================================================
// Module: Schema Validation Tests
// Description: Structural comparison of target-argument schema snapshots.
// Purpose: Ensure drift is detected on any id or resource name difference.
// ============================================================================

//! ## Overview
//! Covers the equivalence rules of target schema comparison, including the
//! absent/present resource name asymmetry, plus property checks for
//! reflexivity and single-field mutations.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::collections::BTreeMap;

use access_handler_core::TargetArgument;
use access_handler_core::TargetSchema;
use access_handler_core::drifted_kinds;
use access_handler_core::validate_target_kinds;
use access_handler_core::validate_target_schema;
use proptest::prelude::*;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn schema(entries: &[(&str, &str, Option<&str>)]) -> TargetSchema {
    entries
        .iter()
        .map(|(key, id, resource)| ((*key).to_string(), TargetArgument::new(*id, *resource)))
        .collect()
}

// ============================================================================
// SECTION: Equivalence Rules
// ============================================================================

#[test]
fn identical_schemas_are_valid() {
    let left = schema(&[("1", "abc", Some("abc"))]);
    let right = schema(&[("1", "abc", Some("abc"))]);
    assert!(validate_target_schema(&left, &right));
}

#[test]
fn differing_id_and_resource_name_is_invalid() {
    let left = schema(&[("1", "abc", Some("abc"))]);
    let right = schema(&[("1", "123", Some("123"))]);
    assert!(!validate_target_schema(&left, &right));
}

#[test]
fn absent_resource_names_on_both_sides_are_equal() {
    let left = schema(&[("1", "abc", None)]);
    let right = schema(&[("1", "abc", None)]);
    assert!(validate_target_schema(&left, &right));
}

#[test]
fn one_sided_resource_name_is_unequal() {
    let left = schema(&[("1", "abc", None)]);
    let right = schema(&[("1", "abc", Some("group"))]);
    assert!(!validate_target_schema(&left, &right));
    assert!(!validate_target_schema(&right, &left));
}

#[test]
fn differing_key_sets_are_invalid() {
    let left = schema(&[("1", "abc", None), ("2", "def", None)]);
    let right = schema(&[("1", "abc", None), ("3", "def", None)]);
    assert!(!validate_target_schema(&left, &right));

    let shorter = schema(&[("1", "abc", None)]);
    assert!(!validate_target_schema(&left, &shorter));
}

#[test]
fn empty_schemas_are_valid() {
    assert!(validate_target_schema(&TargetSchema::new(), &TargetSchema::new()));
}

#[test]
fn drifted_kinds_lists_changed_and_missing_kinds() {
    let mut registered = BTreeMap::new();
    registered.insert("Group".to_string(), schema(&[("groupId", "groupId", Some("Group"))]));
    registered.insert("Role".to_string(), schema(&[("roleId", "roleId", None)]));

    let mut reported = BTreeMap::new();
    reported.insert("Group".to_string(), schema(&[("groupId", "groupId", Some("Team"))]));
    reported.insert("Account".to_string(), schema(&[("accountId", "accountId", None)]));

    assert_eq!(drifted_kinds(&registered, &reported), vec!["Account", "Group", "Role"]);
    assert!(!validate_target_kinds(&registered, &reported));
    assert!(validate_target_kinds(&registered, &registered.clone()));
}

// ============================================================================
// SECTION: Properties
// ============================================================================

fn arb_schema() -> impl Strategy<Value = TargetSchema> {
    prop::collection::btree_map(
        "[a-z]{1,8}",
        ("[a-z0-9]{1,8}", prop::option::of("[A-Za-z]{1,8}"))
            .prop_map(|(id, resource_name)| TargetArgument {
                id,
                resource_name,
            }),
        0 .. 8,
    )
}

proptest! {
    #[test]
    fn validation_is_reflexive(schema in arb_schema()) {
        prop_assert!(validate_target_schema(&schema, &schema.clone()));
    }

    #[test]
    fn validation_is_symmetric(left in arb_schema(), right in arb_schema()) {
        prop_assert_eq!(
            validate_target_schema(&left, &right),
            validate_target_schema(&right, &left)
        );
    }

    #[test]
    fn changing_any_id_breaks_equivalence(schema in arb_schema(), pick in any::<prop::sample::Index>()) {
        prop_assume!(!schema.is_empty());
        let mut mutated = schema.clone();
        let key = schema.keys().nth(pick.index(schema.len())).unwrap().clone();
        let entry = mutated.get_mut(&key).unwrap();
        entry.id.push('!');
        prop_assert!(!validate_target_schema(&schema, &mutated));
    }

    #[test]
    fn toggling_any_resource_name_breaks_equivalence(schema in arb_schema(), pick in any::<prop::sample::Index>()) {
        prop_assume!(!schema.is_empty());
        let mut mutated = schema.clone();
        let key = schema.keys().nth(pick.index(schema.len())).unwrap().clone();
        let entry = mutated.get_mut(&key).unwrap();
        entry.resource_name = match entry.resource_name.take() {
            Some(_) => None,
            None => Some("Resource".to_string()),
        };
        prop_assert!(!validate_target_schema(&schema, &mutated));
    }
}
