mod common;

use common::strategies::*;
use proptest::prelude::*;

use registrar_core::options::{self, MergeOptions};

proptest! {
    /// Property: control keys never reach the effective options
    #[test]
    fn control_keys_never_appear_in_output(
        group in maybe_options_strategy(),
        item in maybe_options_strategy(),
    ) {
        let effective = options::merge(group.as_ref(), item.as_ref());

        prop_assert!(!effective.contains_key("override"));
        prop_assert!(!effective.contains_key("merge"));
    }

    /// Property: every output key comes from one of the inputs
    #[test]
    fn output_keys_are_subset_of_input_keys(
        group in maybe_options_strategy(),
        item in maybe_options_strategy(),
    ) {
        let effective = options::merge(group.as_ref(), item.as_ref());

        for key in effective.keys() {
            let in_group = group.as_ref().is_some_and(|g| g.fields.contains_key(key));
            let in_item = item.as_ref().is_some_and(|i| i.fields.contains_key(key));
            prop_assert!(in_group || in_item, "key {} appeared from nowhere", key);
        }
    }

    /// Property: group override without merge replaces item options wholesale
    #[test]
    fn override_without_merge_uses_group_fields(
        fields in field_map_strategy(),
        item in merge_options_strategy(),
    ) {
        let group = MergeOptions { r#override: true, merge: false, fields };

        let effective = options::merge(Some(&group), Some(&item));
        let group_alone = options::merge(Some(&group), None);

        prop_assert_eq!(effective, group_alone);
    }

    /// Property: without group options the item's non-control fields pass
    /// through untouched
    #[test]
    fn missing_group_passes_item_through(item in merge_options_strategy()) {
        let effective = options::merge(None, Some(&item));

        for (key, value) in &effective {
            prop_assert_eq!(item.fields.get(key), Some(value));
        }

        let expected = item
            .fields
            .keys()
            .filter(|k| *k != "override" && *k != "merge")
            .count();
        prop_assert_eq!(effective.len(), expected);
    }

    /// Property: merge mode never emits nulls, and every value is traceable
    /// to one side
    #[test]
    fn merge_mode_values_come_from_a_side(
        group_fields in field_map_strategy(),
        item in merge_options_strategy(),
        override_flag in any::<bool>(),
    ) {
        let group = MergeOptions {
            r#override: override_flag,
            merge: true,
            fields: group_fields,
        };

        let effective = options::merge(Some(&group), Some(&item));

        for (key, value) in &effective {
            prop_assert!(!value.is_null());
            let from_group = group.fields.get(key) == Some(value);
            let from_item = item.fields.get(key) == Some(value);
            prop_assert!(from_group || from_item, "value for {} matches neither side", key);
        }
    }
}

#[cfg(test)]
mod merge_edge_cases {
    use registrar_core::options::{self, MergeOptions};
    use serde_json::json;

    #[test]
    fn test_item_control_flags_are_never_consulted() {
        let group = MergeOptions::new().with_cache(json!({"expiresIn": 1000}));
        let item = MergeOptions::new()
            .with_override(true)
            .with_merge(true)
            .with_generate_key(json!("item-key"));

        // Only group-side flags select the branch: neither set here, so the
        // item's fields win outright
        let effective = options::merge(Some(&group), Some(&item));
        assert_eq!(effective.keys().collect::<Vec<_>>(), vec!["generateKey"]);
    }

    #[test]
    fn test_key_absent_on_both_sides_is_left_out() {
        let group = MergeOptions::new()
            .with_merge(true)
            .with_field("callback", json!(null));
        let item = MergeOptions::new().with_field("callback", json!(null));

        let effective = options::merge(Some(&group), Some(&item));
        assert!(!effective.contains_key("callback"));
    }

    #[test]
    fn test_effective_options_serialize_in_insertion_order() {
        let group = MergeOptions::new()
            .with_merge(true)
            .with_cache(json!({"expiresIn": 1000}));
        let item = MergeOptions::new().with_generate_key(json!("k"));

        let effective = options::merge(Some(&group), Some(&item));
        let serialized = serde_json::to_string(&effective).unwrap();

        assert_eq!(
            serialized,
            r#"{"generateKey":"k","cache":{"expiresIn":1000}}"#
        );
    }
}
