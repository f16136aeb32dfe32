#![allow(clippy::doc_markdown)] // Allow technical terms like generateKey, YAML in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Registrar Core
//!
//! Declarative bulk registration for host application frameworks.
//!
//! ## Overview
//!
//! Registrar Core takes a declarative configuration of glob patterns and
//! inline values and injects the resolved modules into a host framework's
//! registration surfaces: shared app values, a bound invocation context,
//! server methods, handler factories, and routes. One run walks the five
//! phases in a fixed order, resolves each phase's groups concurrently, and
//! commits every registration deterministically in declaration order.
//!
//! ## Key Features
//!
//! - **Declarative configuration**: YAML, JSON, or builder-assembled groups
//!   of glob patterns and inline values
//! - **Phase ordering**: apps, binds, methods, handlers, routes, always in
//!   that order, with the bound context flushed to the host exactly once
//! - **Concurrent resolution, ordered commit**: groups and items resolve in
//!   parallel while registrations land in declaration order
//! - **Option merging**: group-level and item-level method options combined
//!   under explicit `override` and `merge` control flags
//! - **Host-agnostic sinks**: any framework plugs in through [`HostSinks`]
//!
//! ## Module Organization
//!
//! - [`config`] - Injection configuration, groups and include entries
//! - [`error`] - Structured error handling
//! - [`logging`] - Environment-aware structured logging
//! - [`module`] - Module values, callables and phase identities
//! - [`options`] - Group and item option merging
//! - [`pipeline`] - The five-phase pipeline and host sinks
//! - [`registry`] - Accumulated results: app values, binds, method tree
//! - [`resolver`] - Pattern expansion and module loading
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use registrar_core::{InMemoryHost, InjectionConfig, InjectionPipeline};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = InjectionConfig::from_yaml(
//!     r#"
//!     relative_to: ./app
//!     methods:
//!       - prefix: math
//!         includes:
//!           - "methods/**/*.json"
//!         options:
//!           cache:
//!             expiresIn: 60000
//!     "#,
//! )?;
//!
//! let host = Arc::new(InMemoryHost::new());
//! let result = InjectionPipeline::new(config, host.clone()).run().await?;
//!
//! println!("registered {} methods", result.methods.len());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod module;
pub mod options;
pub mod pipeline;
pub mod registry;
pub mod resolver;

pub use config::{IncludeEntry, InjectionConfig, InjectionGroup};
pub use error::{InjectError, Result};
pub use module::{Callable, MethodDescriptor, ModuleValue, Phase};
pub use options::{EffectiveOptions, MergeOptions};
pub use pipeline::{HostSinks, InMemoryHost, InjectionPipeline};
pub use registry::{MethodNode, MethodTree, PhaseCounts, PipelineResult, RegistryStats, RunSummary};
pub use resolver::{
    FileLoader, GlobExpander, ModuleCatalog, ModuleLoader, ModuleResolver, PatternExpander,
    PatternResolver,
};
