//! # Resolution Layer
//!
//! Turns configured include declarations into loaded, classified module
//! values. Pattern resolution expands glob entries against the search root
//! and applies the group's exclusions; module resolution loads the surviving
//! path references and derives a best-effort base name for each value.

pub mod loader;
pub mod module;
pub mod pattern;

pub use loader::{FileLoader, ModuleCatalog, ModuleLoader};
pub use module::ModuleResolver;
pub use pattern::{GlobExpander, PatternExpander, PatternResolver};
