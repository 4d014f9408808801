//! Property-based tests for fingerprint stability and discrimination.
//!
//! - Determinism: the same request always produces the same key
//! - Order invariance: parameter insertion order never affects the key
//! - Sensitivity: changing any component changes the key

use appstore_cache::{Fingerprint, canonical_parameters};
use proptest::prelude::*;
use std::collections::BTreeMap;

fn source_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("https://appstore-api.repebble.com/api".to_string()),
        Just("https://appstore-api.rebble.io/api".to_string()),
        "https://[a-z]{3,10}\\.test/api".prop_map(String::from),
    ]
}

fn entity_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-f0-9]{24}".prop_map(String::from),
        Just("apps".to_string()),
        Just("faces".to_string()),
    ]
}

fn params_strategy() -> impl Strategy<Value = BTreeMap<String, String>> {
    prop::collection::btree_map("[a-z_]{1,12}", "[a-z0-9]{0,10}", 0..6)
}

proptest! {
    #[test]
    fn same_request_same_key(
        source in source_strategy(),
        entity in entity_strategy(),
        params in params_strategy(),
    ) {
        let a = Fingerprint::compute(&source, &entity, &params);
        let b = Fingerprint::compute(&source, &entity, &params);
        prop_assert_eq!(a, b);
    }

    #[test]
    fn insertion_order_is_irrelevant(
        source in source_strategy(),
        entity in entity_strategy(),
        params in params_strategy(),
    ) {
        let forward: Vec<(String, String)> = params.clone().into_iter().collect();
        let reversed: Vec<(String, String)> = params.into_iter().rev().collect();
        prop_assert_eq!(
            Fingerprint::compute(&source, &entity, forward),
            Fingerprint::compute(&source, &entity, reversed)
        );
    }

    #[test]
    fn changing_a_parameter_value_changes_key(
        source in source_strategy(),
        entity in entity_strategy(),
        mut params in params_strategy(),
        key in "[a-z_]{1,12}",
    ) {
        params.insert(key.clone(), "one".to_string());
        let before = Fingerprint::compute(&source, &entity, &params);
        params.insert(key, "two".to_string());
        let after = Fingerprint::compute(&source, &entity, &params);
        prop_assert_ne!(before, after);
    }

    #[test]
    fn changing_the_entity_changes_key(
        source in source_strategy(),
        entity in entity_strategy(),
        params in params_strategy(),
    ) {
        let other = format!("{entity}-other");
        prop_assert_ne!(
            Fingerprint::compute(&source, &entity, &params),
            Fingerprint::compute(&source, &other, &params)
        );
    }

    #[test]
    fn changing_the_source_changes_key(
        source in source_strategy(),
        entity in entity_strategy(),
        params in params_strategy(),
    ) {
        let other = format!("{source}/v2");
        prop_assert_ne!(
            Fingerprint::compute(&source, &entity, &params),
            Fingerprint::compute(&other, &entity, &params)
        );
    }

    #[test]
    fn canonical_form_is_sorted(params in params_strategy()) {
        let rendered = canonical_parameters(&params);
        let keys: Vec<&str> = rendered
            .split('&')
            .filter(|pair| !pair.is_empty())
            .filter_map(|pair| pair.split('=').next())
            .collect();
        let mut sorted = keys.clone();
        sorted.sort_unstable();
        prop_assert_eq!(keys, sorted);
    }
}
