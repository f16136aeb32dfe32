//! Shared fixtures for pipeline integration tests

#![allow(dead_code)] // Not every test binary uses every helper

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use parking_lot::Mutex;
use serde_json::{json, Value};

use registrar_core::module::{Callable, MethodDescriptor, ModuleValue};
use registrar_core::options::{EffectiveOptions, MergeOptions};
use registrar_core::pipeline::HostSinks;

/// Write one fixture file, creating parent directories as needed
pub fn write_fixture(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create fixture directory");
    }
    fs::write(&path, content).expect("Failed to write fixture file");
}

/// A callable that sums its integer arguments
pub fn adding_callable() -> Callable {
    Callable::new(|args: &[Value]| {
        json!(args.iter().filter_map(Value::as_i64).sum::<i64>())
    })
}

/// A callable that always returns the given value
pub fn constant_callable(value: Value) -> Callable {
    Callable::new(move |_: &[Value]| value.clone())
}

/// A collection module with one plain callable and one descriptor entry
pub fn math_collection(descriptor_options: Option<MergeOptions>) -> ModuleValue {
    let mut entries = IndexMap::new();
    entries.insert("add".to_string(), ModuleValue::Callable(adding_callable()));

    let subtract = Callable::new(|args: &[Value]| {
        let a = args.first().and_then(Value::as_i64).unwrap_or(0);
        let b = args.get(1).and_then(Value::as_i64).unwrap_or(0);
        json!(a - b)
    });
    let mut descriptor = MethodDescriptor::new(subtract);
    if let Some(options) = descriptor_options {
        descriptor = descriptor.with_options(options);
    }
    entries.insert("subtract".to_string(), ModuleValue::Descriptor(descriptor));

    ModuleValue::Collection(entries)
}

/// Sink that records every host call in arrival order
#[derive(Debug, Default)]
pub struct RecordingHost {
    events: Mutex<Vec<String>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every host call so far, in the order it arrived
    pub fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }
}

impl HostSinks for RecordingHost {
    fn set_app_value(&self, name: &str, _value: ModuleValue) {
        self.events.lock().push(format!("app:{name}"));
    }

    fn bind_context(&self, context: &IndexMap<String, ModuleValue>) {
        self.events.lock().push(format!("bind_flush:{}", context.len()));
    }

    fn register_method(&self, name: &str, _callable: Callable, _options: EffectiveOptions) {
        self.events.lock().push(format!("method:{name}"));
    }

    fn register_handler(&self, name: &str, _factory: ModuleValue) {
        self.events.lock().push(format!("handler:{name}"));
    }

    fn register_route(&self, route: ModuleValue) {
        let path = route_path(&route);
        self.events.lock().push(format!("route:{path}"));
    }
}

fn route_path(route: &ModuleValue) -> String {
    match route {
        ModuleValue::Data(value) => value
            .get("path")
            .and_then(Value::as_str)
            .unwrap_or("?")
            .to_string(),
        _ => "?".to_string(),
    }
}
