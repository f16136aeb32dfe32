//! Proptest strategies for option-merging invariants

#![allow(dead_code)] // Not every test binary uses every strategy

use indexmap::IndexMap;
use proptest::prelude::*;
use proptest::strategy::Just;

use registrar_core::options::MergeOptions;

/// Strategy for generating scalar JSON option values, nulls included
pub fn option_value_strategy() -> impl Strategy<Value = serde_json::Value> {
    prop_oneof![
        Just(serde_json::Value::Null),
        any::<bool>().prop_map(serde_json::Value::from),
        any::<i64>().prop_map(serde_json::Value::from),
        "[a-z]{1,8}".prop_map(serde_json::Value::from),
        Just(serde_json::json!({"expiresIn": 60000})),
    ]
}

/// Strategy for generating option keys, occasionally yielding the reserved
/// control keys so the filtering paths get exercised
pub fn option_key_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        6 => "[a-z][a-zA-Z0-9]{0,10}",
        1 => Just("override".to_string()),
        1 => Just("merge".to_string()),
    ]
}

/// Strategy for generating pass-through field maps
pub fn field_map_strategy() -> impl Strategy<Value = IndexMap<String, serde_json::Value>> {
    proptest::collection::vec((option_key_strategy(), option_value_strategy()), 0..6)
        .prop_map(|pairs| pairs.into_iter().collect())
}

/// Strategy for generating complete MergeOptions instances
pub fn merge_options_strategy() -> impl Strategy<Value = MergeOptions> {
    (any::<bool>(), any::<bool>(), field_map_strategy()).prop_map(|(r#override, merge, fields)| {
        MergeOptions {
            r#override,
            merge,
            fields,
        }
    })
}

/// Strategy for generating optional MergeOptions
pub fn maybe_options_strategy() -> impl Strategy<Value = Option<MergeOptions>> {
    prop::option::of(merge_options_strategy())
}
