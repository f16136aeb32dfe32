//! Host Registration Sinks
//!
//! The host framework's registration entry points behind one synchronous
//! trait. Sink calls happen only during the ordered commit that follows a
//! phase's concurrent resolution, and they are infallible: a host that can
//! reject registrations absorbs those failures itself.
//!
//! [`InMemoryHost`] is a complete implementation backed by concurrent maps,
//! usable as a default host and as the observable end of integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashMap;
use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::module::{Callable, ModuleValue};
use crate::options::EffectiveOptions;

/// Host framework registration entry points
pub trait HostSinks: Send + Sync {
    /// Store a shared application value
    fn set_app_value(&self, name: &str, value: ModuleValue);

    /// Receive the full bound context; called at most once per run, after
    /// the binds phase commits
    fn bind_context(&self, context: &IndexMap<String, ModuleValue>);

    /// Register one invocable method under its dotted name
    fn register_method(&self, name: &str, callable: Callable, options: EffectiveOptions);

    /// Register one handler factory under its name
    fn register_handler(&self, name: &str, factory: ModuleValue);

    /// Register one route descriptor
    fn register_route(&self, route: ModuleValue);
}

/// In-memory host implementation backed by concurrent maps
#[derive(Debug, Default)]
pub struct InMemoryHost {
    app_values: DashMap<String, ModuleValue>,
    bound_context: RwLock<IndexMap<String, ModuleValue>>,
    bind_calls: AtomicUsize,
    methods: RwLock<IndexMap<String, (Callable, EffectiveOptions)>>,
    handlers: DashMap<String, ModuleValue>,
    routes: RwLock<Vec<ModuleValue>>,
}

impl InMemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// A stored application value
    pub fn app_value(&self, name: &str) -> Option<ModuleValue> {
        self.app_values.get(name).map(|entry| entry.clone())
    }

    /// The bound context received from the flush
    pub fn bound_context(&self) -> IndexMap<String, ModuleValue> {
        self.bound_context.read().clone()
    }

    /// How many times the bound context was flushed
    pub fn bind_context_calls(&self) -> usize {
        self.bind_calls.load(Ordering::SeqCst)
    }

    /// The options a method registered with
    pub fn method_options(&self, name: &str) -> Option<EffectiveOptions> {
        self.methods
            .read()
            .get(name)
            .map(|(_, options)| options.clone())
    }

    /// Invoke a registered method by its dotted name
    pub fn invoke_method(
        &self,
        name: &str,
        args: &[serde_json::Value],
    ) -> Option<serde_json::Value> {
        let methods = self.methods.read();
        let (callable, _) = methods.get(name)?;
        Some(callable.invoke(args))
    }

    /// Registered method names in registration order
    pub fn method_names(&self) -> Vec<String> {
        self.methods.read().keys().cloned().collect()
    }

    /// A registered handler factory
    pub fn handler(&self, name: &str) -> Option<ModuleValue> {
        self.handlers.get(name).map(|entry| entry.clone())
    }

    /// Number of registered handlers
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// The registered routes in registration order
    pub fn routes(&self) -> Vec<ModuleValue> {
        self.routes.read().clone()
    }
}

impl HostSinks for InMemoryHost {
    fn set_app_value(&self, name: &str, value: ModuleValue) {
        self.app_values.insert(name.to_string(), value);
    }

    fn bind_context(&self, context: &IndexMap<String, ModuleValue>) {
        self.bind_calls.fetch_add(1, Ordering::SeqCst);
        *self.bound_context.write() = context.clone();
    }

    fn register_method(&self, name: &str, callable: Callable, options: EffectiveOptions) {
        self.methods
            .write()
            .insert(name.to_string(), (callable, options));
    }

    fn register_handler(&self, name: &str, factory: ModuleValue) {
        self.handlers.insert(name.to_string(), factory);
    }

    fn register_route(&self, route: ModuleValue) {
        self.routes.write().push(route);
    }
}
