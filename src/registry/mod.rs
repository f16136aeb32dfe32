//! # Registry Layer
//!
//! The result stores a registration run builds up and returns.
//!
//! ## Overview
//!
//! Every committed registration is mirrored here alongside the host sink
//! call, so callers inspect exactly what the host received without reaching
//! into process globals. The stores live on the returned [`PipelineResult`]
//! value and are never rolled back once a phase has committed.
//!
//! ## Architecture
//!
//! ```text
//! PipelineResult
//! ├── apps        (shared application values by name)
//! ├── binds       (bound context values by name)
//! ├── methods     (MethodTree: prefix -> base -> direct | keyed)
//! └── summary     (run id, timing, per-phase counts)
//! ```

pub mod accumulator;
pub mod method_tree;

// Re-export main types for easy access
pub use accumulator::{PhaseCounts, PipelineResult, RegistryStats, RunSummary};
pub use method_tree::{MethodNode, MethodTree};
