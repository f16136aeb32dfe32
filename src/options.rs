//! # Option Merging
//!
//! Group-level default options combine with item-level options into the one
//! effective option set a method registers with. Two boolean flags on the
//! group steer the combination: `override` (group wins per key) and `merge`
//! (key-union instead of whole-set replacement). The flags live outside the
//! pass-through fields, so they can never leak into what gets registered.
//!
//! ## Usage
//!
//! ```rust
//! use registrar_core::options::{self, MergeOptions};
//! use serde_json::json;
//!
//! let group = MergeOptions::new()
//!     .with_merge(true)
//!     .with_cache(json!({"expiresIn": 1000}));
//! let item = MergeOptions::new().with_field("generateKey", json!("custom"));
//!
//! let effective = options::merge(Some(&group), Some(&item));
//! assert_eq!(effective.get("cache"), Some(&json!({"expiresIn": 1000})));
//! assert_eq!(effective.get("generateKey"), Some(&json!("custom")));
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The merged option set handed to the method registration sink
pub type EffectiveOptions = IndexMap<String, Value>;

/// Group- or item-level registration options.
///
/// `override` and `merge` are control flags consulted only on the group side
/// of a merge; every other key is an opaque pass-through field delivered to
/// the host as-is. Conventional pass-through keys are `bind`, `cache`,
/// `generateKey` and `callback`, but any key is accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MergeOptions {
    /// Group values win over item values on shared keys
    #[serde(default)]
    pub r#override: bool,

    /// Combine group and item fields key-by-key instead of replacing wholesale
    #[serde(default)]
    pub merge: bool,

    /// Opaque pass-through fields in declaration order
    #[serde(flatten, default)]
    pub fields: IndexMap<String, Value>,
}

impl MergeOptions {
    /// Create empty options with both control flags off
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the `override` control flag
    pub fn with_override(mut self, value: bool) -> Self {
        self.r#override = value;
        self
    }

    /// Set the `merge` control flag
    pub fn with_merge(mut self, value: bool) -> Self {
        self.merge = value;
        self
    }

    /// Add an arbitrary pass-through field
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    /// Add the conventional `bind` pass-through field
    pub fn with_bind(self, value: Value) -> Self {
        self.with_field("bind", value)
    }

    /// Add the conventional `cache` pass-through field
    pub fn with_cache(self, value: Value) -> Self {
        self.with_field("cache", value)
    }

    /// Add the conventional `generateKey` pass-through field
    pub fn with_generate_key(self, value: Value) -> Self {
        self.with_field("generateKey", value)
    }

    /// Add the conventional `callback` pass-through field
    pub fn with_callback(self, value: bool) -> Self {
        self.with_field("callback", Value::Bool(value))
    }

    /// The pass-through fields with any stray control keys dropped
    fn pass_through(&self) -> EffectiveOptions {
        self.fields
            .iter()
            .filter(|(key, _)| !is_control_key(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

fn is_control_key(key: &str) -> bool {
    key == "override" || key == "merge"
}

/// Combine group-level and item-level options into one effective set.
///
/// Four cases, in precedence order:
/// 1. No group options: the item's fields are taken as-is.
/// 2. Group options present and either no item options exist or the group
///    has `override` set without `merge`: the group's fields replace the
///    item's entirely.
/// 3. Both present and the group has `merge` set: the key union is walked,
///    item keys first, first write wins per key. A key takes the group value
///    when the item side is absent, or when `override` is set and the group
///    side is present; otherwise the item value. Absent means the key is
///    missing or explicitly null, and a key whose chosen side is absent is
///    left out.
/// 4. Both present, neither flag set: the item's fields are taken as-is.
///
/// Item-level control flags are never consulted.
pub fn merge(group: Option<&MergeOptions>, item: Option<&MergeOptions>) -> EffectiveOptions {
    match (group, item) {
        (None, None) => EffectiveOptions::new(),
        (None, Some(item_opts)) => item_opts.pass_through(),
        (Some(group_opts), None) => group_opts.pass_through(),
        (Some(group_opts), Some(item_opts)) => {
            if group_opts.r#override && !group_opts.merge {
                group_opts.pass_through()
            } else if group_opts.merge {
                merge_union(group_opts, item_opts)
            } else {
                item_opts.pass_through()
            }
        }
    }
}

/// Case 3: key-union walk, item keys first, first write wins per key
fn merge_union(group_opts: &MergeOptions, item_opts: &MergeOptions) -> EffectiveOptions {
    let mut effective = EffectiveOptions::new();

    let union = item_opts.fields.keys().chain(group_opts.fields.keys());
    for key in union {
        if is_control_key(key) || effective.contains_key(key) {
            continue;
        }

        let from_item = item_opts.fields.get(key).filter(|v| !v.is_null());
        let from_group = group_opts.fields.get(key).filter(|v| !v.is_null());

        let chosen = if from_item.is_none() || (group_opts.r#override && from_group.is_some()) {
            from_group
        } else {
            from_item
        };

        if let Some(value) = chosen {
            effective.insert(key.clone(), value.clone());
        }
    }

    effective
}
