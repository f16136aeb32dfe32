//! # Injection Pipeline
//!
//! ## Overview
//!
//! The pipeline turns a validated [`InjectionConfig`] into host
//! registrations. It runs the five phases strictly in order (apps, binds,
//! methods, handlers, routes); within one phase every group resolves
//! concurrently, and within one group every matched item loads
//! concurrently. Nothing reaches the host until a phase's resolution work
//! has fully succeeded: each group buffers its registrations as commit
//! entries, and the buffers are applied sequentially in declaration order.
//! A failure anywhere in a phase aborts the phase's remaining tasks,
//! drains them, and stops the run with nothing from the failing phase
//! committed.
//!
//! ## Architecture
//!
//! ```text
//! InjectionPipeline
//! ├── run()                    - five phases in declaration order
//! │   └── run_phase()          - one task per group, ordered commit
//! │       └── resolve_group()  - patterns -> modules -> commit entries
//! ├── HostSinks                - host registration entry points
//! └── PipelineResult           - everything the run registered
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use registrar_core::config::{InjectionConfig, InjectionGroup};
//! use registrar_core::module::ModuleValue;
//! use registrar_core::pipeline::{InMemoryHost, InjectionPipeline};
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let config = InjectionConfig::new().app_group(
//!     InjectionGroup::new()
//!         .include_value(ModuleValue::Data(json!({"db": {"host": "localhost"}}))),
//! );
//!
//! let host = Arc::new(InMemoryHost::new());
//! let pipeline = InjectionPipeline::new(config, host.clone());
//! let result = pipeline.run().await.unwrap();
//!
//! assert_eq!(result.apps.len(), 1);
//! assert!(host.app_value("db").is_some());
//! # });
//! ```

pub mod sinks;

// Re-export main types for easy access
pub use sinks::{HostSinks, InMemoryHost};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use futures::future;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::{InjectionConfig, InjectionGroup};
use crate::error::{InjectError, Result};
use crate::module::{Callable, LoadedModule, ModuleValue, NamedModule, Phase};
use crate::options::{self, EffectiveOptions};
use crate::registry::PipelineResult;
use crate::resolver::{
    FileLoader, GlobExpander, ModuleLoader, ModuleResolver, PatternExpander, PatternResolver,
};

/// Drives the five registration phases against a host
pub struct InjectionPipeline {
    config: InjectionConfig,
    expander: Arc<dyn PatternExpander>,
    loader: Arc<dyn ModuleLoader>,
    sinks: Arc<dyn HostSinks>,
}

impl InjectionPipeline {
    /// Create a pipeline with the default glob expander and file loader
    pub fn new(config: InjectionConfig, sinks: Arc<dyn HostSinks>) -> Self {
        Self {
            config,
            expander: Arc::new(GlobExpander::new()),
            loader: Arc::new(FileLoader::new()),
            sinks,
        }
    }

    /// Replace the pattern expansion engine
    pub fn with_expander(mut self, expander: Arc<dyn PatternExpander>) -> Self {
        self.expander = expander;
        self
    }

    /// Replace the module loader
    pub fn with_loader(mut self, loader: Arc<dyn ModuleLoader>) -> Self {
        self.loader = loader;
        self
    }

    /// Run all five phases in order and return what was registered
    pub async fn run(&self) -> Result<PipelineResult> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let clock = Instant::now();

        self.config.validate()?;

        let root = self.config.search_root();
        let mut result = PipelineResult::new(run_id, started_at);

        info!(
            run_id = %run_id,
            root = %root.display(),
            "🔧 Starting registration run"
        );

        for phase in Phase::ALL {
            self.run_phase(phase, &root, &mut result).await?;
        }

        result.finalize(clock.elapsed().as_millis() as u64);
        info!(
            run_id = %run_id,
            duration_ms = result.summary.duration_ms,
            registrations = result.summary.counts.total(),
            "✅ Registration run complete"
        );

        Ok(result)
    }

    /// Resolve every group of one phase concurrently, then commit the
    /// buffered registrations sequentially in declaration order
    async fn run_phase(
        &self,
        phase: Phase,
        root: &Path,
        result: &mut PipelineResult,
    ) -> Result<()> {
        let groups = self.config.section(phase);
        if groups.is_empty() {
            debug!(phase = %phase, "No groups configured, skipping phase");
            return Ok(());
        }

        debug!(phase = %phase, groups = groups.len(), "Starting phase");

        let mut handles = Vec::with_capacity(groups.len());
        for group in groups {
            let group = group.clone();
            let root = root.to_path_buf();
            let patterns = PatternResolver::new(Arc::clone(&self.expander));
            let modules = ModuleResolver::new(Arc::clone(&self.loader));
            handles.push(tokio::spawn(async move {
                resolve_group(phase, group, root, patterns, modules).await
            }));
        }

        let group_entries = join_ordered(handles, phase).await?;

        let mut committed = 0usize;
        for entries in group_entries {
            for entry in entries {
                self.commit(entry, result);
                committed += 1;
            }
        }
        result.summary.counts.record(phase, committed);

        if phase == Phase::Binds && !result.binds.is_empty() {
            self.sinks.bind_context(&result.binds);
            debug!(values = result.binds.len(), "Flushed bound context to host");
        }

        info!(phase = %phase, registrations = committed, "Phase complete");
        Ok(())
    }

    /// Apply one buffered registration to the host and mirror it into the
    /// returned result. Bind values only accumulate here; the host sees
    /// them in a single flush after the binds phase commits.
    fn commit(&self, entry: CommitEntry, result: &mut PipelineResult) {
        match entry {
            CommitEntry::App(named) => {
                debug!(name = %named.name, "Committing app value");
                self.sinks.set_app_value(&named.name, named.value.clone());
                result.apps.insert(named.name, named.value);
            }
            CommitEntry::Bind(named) => {
                debug!(name = %named.name, "Committing bind value");
                result.binds.insert(named.name, named.value);
            }
            CommitEntry::Method {
                prefix,
                base,
                sub_key,
                callable,
                options,
            } => {
                let dotted = dotted_name(prefix.as_deref(), &base, sub_key.as_deref());
                debug!(method = %dotted, "Committing method");
                self.sinks.register_method(&dotted, callable.clone(), options);
                match sub_key {
                    Some(key) => {
                        result
                            .methods
                            .insert_keyed(prefix.as_deref(), &base, &key, callable)
                    }
                    None => result.methods.insert_direct(prefix.as_deref(), &base, callable),
                }
            }
            CommitEntry::Handler { name, value } => {
                debug!(handler = %name, "Committing handler");
                self.sinks.register_handler(&name, value);
            }
            CommitEntry::Route(value) => {
                self.sinks.register_route(value);
            }
        }
    }
}

impl std::fmt::Debug for InjectionPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InjectionPipeline")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// One buffered registration, produced during a group's resolution and
/// applied during the phase's ordered commit
#[derive(Debug, Clone)]
enum CommitEntry {
    App(NamedModule),
    Bind(NamedModule),
    Method {
        prefix: Option<String>,
        base: String,
        sub_key: Option<String>,
        callable: Callable,
        options: EffectiveOptions,
    },
    Handler { name: String, value: ModuleValue },
    Route(ModuleValue),
}

/// Expand a group's includes, load every matched item concurrently, and
/// map the loaded modules to commit entries for the phase
async fn resolve_group(
    phase: Phase,
    group: InjectionGroup,
    root: PathBuf,
    patterns: PatternResolver,
    modules: ModuleResolver,
) -> Result<Vec<CommitEntry>> {
    let items = patterns.resolve(&group, &root).await?;

    let mut handles = Vec::with_capacity(items.len());
    for item in items {
        let modules = modules.clone();
        let root = root.clone();
        handles.push(tokio::spawn(async move { modules.resolve(item, &root).await }));
    }
    let loaded = join_ordered(handles, phase).await?;

    let mut entries = Vec::new();
    for module in loaded {
        entries.extend(map_to_entries(phase, &group, module)?);
    }
    Ok(entries)
}

/// Turn one loaded module into the phase's registrations
fn map_to_entries(
    phase: Phase,
    group: &InjectionGroup,
    module: LoadedModule,
) -> Result<Vec<CommitEntry>> {
    match phase {
        Phase::Apps => Ok(named_value_entries(phase, module)?
            .into_iter()
            .map(CommitEntry::App)
            .collect()),
        Phase::Binds => Ok(named_value_entries(phase, module)?
            .into_iter()
            .map(CommitEntry::Bind)
            .collect()),
        Phase::Methods => method_entries(group, module),
        Phase::Handlers => handler_entries(module),
        Phase::Routes => Ok(vec![CommitEntry::Route(module.value)]),
    }
}

/// Apps and binds share one shape rule: mappings fan out to one entry per
/// key, callables and descriptors register as a single named value, and
/// anything else contributes nothing
fn named_value_entries(phase: Phase, module: LoadedModule) -> Result<Vec<NamedModule>> {
    if let Some(entries) = module.value.keyed_entries() {
        return Ok(entries
            .into_iter()
            .map(|(key, value)| NamedModule {
                name: key.clone(),
                sub_key: Some(key),
                value,
            })
            .collect());
    }

    match &module.value {
        ModuleValue::Callable(_) | ModuleValue::Descriptor(_) => {
            let name = module
                .base_name
                .clone()
                .ok_or_else(|| InjectError::naming(phase, module.origin.clone()))?;
            Ok(vec![NamedModule {
                name,
                sub_key: None,
                value: module.value,
            }])
        }
        _ => {
            debug!(
                phase = %phase,
                origin = %module.origin,
                "Skipping value with no registrable shape"
            );
            Ok(Vec::new())
        }
    }
}

/// Methods phase mapping. The base name is required before the shape is
/// even examined; collections contribute one method per callable entry,
/// with descriptor options merged against the group's.
fn method_entries(group: &InjectionGroup, module: LoadedModule) -> Result<Vec<CommitEntry>> {
    let base = module
        .base_name
        .clone()
        .ok_or_else(|| InjectError::naming(Phase::Methods, module.origin.clone()))?;
    let prefix = group.prefix.clone();
    let group_options = group.options.as_ref();

    match module.value {
        ModuleValue::Callable(callable) => Ok(vec![CommitEntry::Method {
            prefix,
            base,
            sub_key: None,
            callable,
            options: options::merge(group_options, None),
        }]),
        ModuleValue::Descriptor(descriptor) => Ok(vec![CommitEntry::Method {
            prefix,
            base,
            sub_key: None,
            options: options::merge(group_options, descriptor.options.as_ref()),
            callable: descriptor.method,
        }]),
        ModuleValue::Collection(collection) => {
            let mut commits = Vec::new();
            for (key, value) in collection {
                match value {
                    ModuleValue::Callable(callable) => commits.push(CommitEntry::Method {
                        prefix: prefix.clone(),
                        base: base.clone(),
                        sub_key: Some(key),
                        callable,
                        options: options::merge(group_options, None),
                    }),
                    ModuleValue::Descriptor(descriptor) => commits.push(CommitEntry::Method {
                        prefix: prefix.clone(),
                        base: base.clone(),
                        sub_key: Some(key),
                        options: options::merge(group_options, descriptor.options.as_ref()),
                        callable: descriptor.method,
                    }),
                    _ => {
                        debug!(base = %base, key = %key, "Skipping non-callable collection entry");
                    }
                }
            }
            Ok(commits)
        }
        ModuleValue::Data(_) => {
            debug!(origin = %module.origin, "Data module contributes no methods");
            Ok(Vec::new())
        }
    }
}

/// Handlers register verbatim under their derived name, one per item
fn handler_entries(module: LoadedModule) -> Result<Vec<CommitEntry>> {
    let name = module
        .base_name
        .clone()
        .ok_or_else(|| InjectError::naming(Phase::Handlers, module.origin.clone()))?;
    Ok(vec![CommitEntry::Handler {
        name,
        value: module.value,
    }])
}

/// Compose `prefix.base.subKey`, omitting the absent parts
fn dotted_name(prefix: Option<&str>, base: &str, sub_key: Option<&str>) -> String {
    let mut name = String::new();
    if let Some(prefix) = prefix {
        name.push_str(prefix);
        name.push('.');
    }
    name.push_str(base);
    if let Some(key) = sub_key {
        name.push('.');
        name.push_str(key);
    }
    name
}

/// Await task handles in declaration order. The first failure aborts the
/// remaining tasks and waits for them to drain before reporting it.
async fn join_ordered<T>(handles: Vec<JoinHandle<Result<T>>>, phase: Phase) -> Result<Vec<T>> {
    let mut results = Vec::with_capacity(handles.len());
    let mut pending = handles.into_iter();

    while let Some(handle) = pending.next() {
        let outcome = match handle.await {
            Ok(outcome) => outcome,
            Err(join_err) => {
                abort_and_drain(pending.collect()).await;
                return Err(InjectError::task_join(phase, join_err.to_string()));
            }
        };

        match outcome {
            Ok(value) => results.push(value),
            Err(err) => {
                abort_and_drain(pending.collect()).await;
                return Err(err);
            }
        }
    }

    Ok(results)
}

/// Abort the given tasks and wait until every one has actually finished
async fn abort_and_drain<T>(handles: Vec<JoinHandle<T>>) {
    for handle in &handles {
        handle.abort();
    }
    let _ = future::join_all(handles).await;
}
