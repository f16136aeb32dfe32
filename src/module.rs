//! Module Value Model
//!
//! Core value types flowing through the registration pipeline. Every resolved
//! item is classified exactly once into a [`ModuleValue`] at resolution time;
//! downstream phases match on the tag instead of re-inspecting shapes.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::options::MergeOptions;

/// Origin string reported for items that were declared inline rather than
/// loaded from a path reference.
pub const INLINE_ORIGIN: &str = "<inline>";

/// One of the five ordered registration passes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Apps,
    Binds,
    Methods,
    Handlers,
    Routes,
}

impl Phase {
    /// All phases in execution order
    pub const ALL: [Phase; 5] = [
        Phase::Apps,
        Phase::Binds,
        Phase::Methods,
        Phase::Handlers,
        Phase::Routes,
    ];

    /// Configuration section name for this phase
    pub fn section(&self) -> &'static str {
        match self {
            Phase::Apps => "apps",
            Phase::Binds => "binds",
            Phase::Methods => "methods",
            Phase::Handlers => "handlers",
            Phase::Routes => "routes",
        }
    }

    /// Singular noun used when reporting naming failures
    pub fn noun(&self) -> &'static str {
        match self {
            Phase::Apps => "app",
            Phase::Binds => "bind",
            Phase::Methods => "method",
            Phase::Handlers => "handler",
            Phase::Routes => "route",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.section())
    }
}

/// Signature shared by every invocable registered through the pipeline
pub type CallableFn = dyn Fn(&[Value]) -> Value + Send + Sync;

/// An invocable value with an optional intrinsic name.
///
/// The intrinsic name participates in base-name derivation: it overrides the
/// path-derived name for callables and fills a missing name for descriptors.
#[derive(Clone)]
pub struct Callable {
    name: Option<String>,
    func: Arc<CallableFn>,
}

impl Callable {
    /// Create an anonymous callable
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        Self {
            name: None,
            func: Arc::new(func),
        }
    }

    /// Create a callable carrying its own name
    pub fn named<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        Self {
            name: Some(name.into()),
            func: Arc::new(func),
        }
    }

    /// The intrinsic name, if any
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Invoke the underlying function
    pub fn invoke(&self, args: &[Value]) -> Value {
        (self.func)(args)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Two callables are equal when they share the same function and name.
/// Cloned callables stay equal; independently constructed ones do not.
impl PartialEq for Callable {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && Arc::ptr_eq(&self.func, &other.func)
    }
}

/// The methods-phase item shape: a callable plus its own merge options
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDescriptor {
    pub method: Callable,
    pub options: Option<MergeOptions>,
}

impl MethodDescriptor {
    /// Create a descriptor without item-level options
    pub fn new(method: Callable) -> Self {
        Self {
            method,
            options: None,
        }
    }

    /// Attach item-level options to the descriptor
    pub fn with_options(mut self, options: MergeOptions) -> Self {
        self.options = Some(options);
        self
    }
}

/// The tagged classification every resolved item receives exactly once.
///
/// - `Callable`: an invocable registered directly under its derived name
/// - `Descriptor`: a callable bundled with item-level merge options
/// - `Collection`: a keyed map whose entries register individually
/// - `Data`: any other value; a JSON object behaves as a keyed collection in
///   the apps and binds phases and as an opaque value in the routes phase
#[derive(Debug, Clone, PartialEq)]
pub enum ModuleValue {
    Callable(Callable),
    Descriptor(MethodDescriptor),
    Collection(IndexMap<String, ModuleValue>),
    Data(Value),
}

impl ModuleValue {
    /// The name the value carries on its own, independent of any path.
    ///
    /// Callables report their intrinsic name; descriptors report the wrapped
    /// method's name. Collections and data values have none.
    pub fn intrinsic_name(&self) -> Option<&str> {
        match self {
            ModuleValue::Callable(callable) => callable.name(),
            ModuleValue::Descriptor(descriptor) => descriptor.method.name(),
            _ => None,
        }
    }

    /// The keyed entries this value fans out into, if it has mapping shape.
    ///
    /// Collections yield their entries as-is; JSON objects yield one `Data`
    /// entry per key. Everything else has no mapping shape.
    pub fn keyed_entries(&self) -> Option<Vec<(String, ModuleValue)>> {
        match self {
            ModuleValue::Collection(entries) => Some(
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect(),
            ),
            ModuleValue::Data(Value::Object(fields)) => Some(
                fields
                    .iter()
                    .map(|(key, value)| (key.clone(), ModuleValue::Data(value.clone())))
                    .collect(),
            ),
            _ => None,
        }
    }
}

impl From<Value> for ModuleValue {
    fn from(value: Value) -> Self {
        ModuleValue::Data(value)
    }
}

impl From<Callable> for ModuleValue {
    fn from(callable: Callable) -> Self {
        ModuleValue::Callable(callable)
    }
}

impl From<MethodDescriptor> for ModuleValue {
    fn from(descriptor: MethodDescriptor) -> Self {
        ModuleValue::Descriptor(descriptor)
    }
}

/// One concrete item produced by pattern resolution
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedItem {
    /// A relative path reference that still needs loading
    PathRef(String),
    /// A value already in hand, no load required
    Value(ModuleValue),
}

/// Intermediate product of module resolution, before phase-specific naming
#[derive(Debug, Clone)]
pub struct LoadedModule {
    /// Best-effort name derived from the path or the value itself
    pub base_name: Option<String>,
    /// The classified value
    pub value: ModuleValue,
    /// The path reference, or [`INLINE_ORIGIN`] for inline items
    pub origin: String,
}

/// A value paired with the registration name derived for it
#[derive(Debug, Clone)]
pub struct NamedModule {
    /// The key the value registers under
    pub name: String,
    /// The collection key, when the value came out of a keyed fan-out
    pub sub_key: Option<String>,
    /// The value handed to the sink
    pub value: ModuleValue,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_phase_order_and_names() {
        let sections: Vec<&str> = Phase::ALL.iter().map(|p| p.section()).collect();
        assert_eq!(
            sections,
            vec!["apps", "binds", "methods", "handlers", "routes"]
        );
        assert_eq!(Phase::Methods.noun(), "method");
        assert_eq!(Phase::Handlers.to_string(), "handlers");
    }

    #[test]
    fn test_callable_invocation() {
        let double = Callable::named("double", |args: &[Value]| {
            json!(args[0].as_i64().unwrap_or(0) * 2)
        });
        assert_eq!(double.name(), Some("double"));
        assert_eq!(double.invoke(&[json!(21)]), json!(42));
    }

    #[test]
    fn test_callable_equality_follows_clones() {
        let original = Callable::named("same", |_: &[Value]| json!(null));
        let clone = original.clone();
        let independent = Callable::named("same", |_: &[Value]| json!(null));

        assert_eq!(original, clone);
        assert_ne!(original, independent);
    }

    #[test]
    fn test_intrinsic_names() {
        let named = ModuleValue::Callable(Callable::named("add", |_: &[Value]| json!(null)));
        assert_eq!(named.intrinsic_name(), Some("add"));

        let anonymous = ModuleValue::Callable(Callable::new(|_: &[Value]| json!(null)));
        assert_eq!(anonymous.intrinsic_name(), None);

        let descriptor = ModuleValue::Descriptor(MethodDescriptor::new(Callable::named(
            "subtract",
            |_: &[Value]| json!(null),
        )));
        assert_eq!(descriptor.intrinsic_name(), Some("subtract"));

        assert_eq!(ModuleValue::Data(json!({"a": 1})).intrinsic_name(), None);
    }

    #[test]
    fn test_keyed_entries_for_mapping_shapes() {
        let data = ModuleValue::Data(json!({"db": {"host": "localhost"}, "cache": null}));
        let entries = data.keyed_entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, "db");
        assert_eq!(entries[0].1, ModuleValue::Data(json!({"host": "localhost"})));

        let mut collection = IndexMap::new();
        collection.insert(
            "add".to_string(),
            ModuleValue::Callable(Callable::new(|_: &[Value]| json!(null))),
        );
        let entries = ModuleValue::Collection(collection).keyed_entries().unwrap();
        assert_eq!(entries[0].0, "add");

        assert!(ModuleValue::Data(json!([1, 2])).keyed_entries().is_none());
        assert!(ModuleValue::Data(json!("scalar")).keyed_entries().is_none());
    }
}
