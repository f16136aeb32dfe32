//! Injection Configuration System
//!
//! YAML/JSON-driven configuration describing what each registration phase
//! loads: groups of include patterns or inline values, exclusion patterns,
//! and group-level merge options. String include entries are glob patterns;
//! any other entry is an inline data value. Callables cannot appear in
//! configuration files and are added through the builder API instead.
//!
//! ## Usage
//!
//! ```rust
//! use registrar_core::config::InjectionConfig;
//!
//! let config = InjectionConfig::from_yaml(
//!     r#"
//!     relative_to: /srv/app
//!     methods:
//!       - prefix: math
//!         includes:
//!           - "methods/**/*.json"
//!         ignores:
//!           - "methods/**/internal/*"
//!     "#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.methods.len(), 1);
//! config.validate().unwrap();
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{InjectError, Result};
use crate::module::{ModuleValue, Phase};
use crate::options::MergeOptions;

/// Complete configuration for one registration run
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InjectionConfig {
    /// Search root that glob patterns and path references resolve against;
    /// defaults to the current working directory
    pub relative_to: Option<PathBuf>,

    /// Shared application value groups
    pub apps: Vec<InjectionGroup>,

    /// Bound helper context groups
    pub binds: Vec<InjectionGroup>,

    /// Invocable method groups
    pub methods: Vec<InjectionGroup>,

    /// Request handler groups
    pub handlers: Vec<InjectionGroup>,

    /// Route table groups
    pub routes: Vec<InjectionGroup>,
}

/// One configured unit of work for a single phase
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InjectionGroup {
    /// Dotted namespace prepended to method names; other phases ignore it
    #[serde(default)]
    pub prefix: Option<String>,

    /// Patterns or inline values to resolve, in declaration order
    pub includes: Vec<IncludeEntry>,

    /// Glob patterns excluded from every pattern expansion in this group
    #[serde(default)]
    pub ignores: Vec<String>,

    /// Group-level default options for the methods phase
    #[serde(default)]
    pub options: Option<MergeOptions>,
}

/// One include declaration: a glob pattern or an inline value
#[derive(Debug, Clone, PartialEq)]
pub enum IncludeEntry {
    /// A glob pattern expanded against the search root
    Pattern(String),
    /// An inline value used as-is, no expansion attempted
    Inline(ModuleValue),
}

/// String entries become patterns; every other shape becomes inline data
impl<'de> Deserialize<'de> for IncludeEntry {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::String(pattern) => IncludeEntry::Pattern(pattern),
            other => IncludeEntry::Inline(ModuleValue::Data(other)),
        })
    }
}

impl InjectionConfig {
    /// Create an empty configuration for programmatic assembly
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from YAML content
    pub fn from_yaml(yaml_content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml_content)?)
    }

    /// Load a configuration from a YAML file
    pub fn from_yaml_file(file_path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(file_path).map_err(|e| {
            InjectError::config_validation(format!(
                "Failed to read {}: {e}",
                file_path.display()
            ))
        })?;
        Self::from_yaml(&content)
    }

    /// Load a configuration from JSON content
    pub fn from_json(json_content: &str) -> Result<Self> {
        Ok(serde_json::from_str(json_content)?)
    }

    /// Set the search root patterns resolve against
    pub fn with_relative_to(mut self, root: impl Into<PathBuf>) -> Self {
        self.relative_to = Some(root.into());
        self
    }

    /// Add a group to the apps phase
    pub fn app_group(mut self, group: InjectionGroup) -> Self {
        self.apps.push(group);
        self
    }

    /// Add a group to the binds phase
    pub fn bind_group(mut self, group: InjectionGroup) -> Self {
        self.binds.push(group);
        self
    }

    /// Add a group to the methods phase
    pub fn method_group(mut self, group: InjectionGroup) -> Self {
        self.methods.push(group);
        self
    }

    /// Add a group to the handlers phase
    pub fn handler_group(mut self, group: InjectionGroup) -> Self {
        self.handlers.push(group);
        self
    }

    /// Add a group to the routes phase
    pub fn route_group(mut self, group: InjectionGroup) -> Self {
        self.routes.push(group);
        self
    }

    /// The groups configured for one phase
    pub fn section(&self, phase: Phase) -> &[InjectionGroup] {
        match phase {
            Phase::Apps => &self.apps,
            Phase::Binds => &self.binds,
            Phase::Methods => &self.methods,
            Phase::Handlers => &self.handlers,
            Phase::Routes => &self.routes,
        }
    }

    /// The search root, falling back to the current working directory
    pub fn search_root(&self) -> PathBuf {
        match &self.relative_to {
            Some(root) => root.clone(),
            None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    /// Validate the configuration before any phase runs.
    ///
    /// Rejects groups with empty `includes`, empty `prefix` strings, and
    /// empty pattern strings. Runs synchronously; a failure here means
    /// nothing was resolved or registered.
    pub fn validate(&self) -> Result<()> {
        for phase in Phase::ALL {
            for (index, group) in self.section(phase).iter().enumerate() {
                group.validate(phase, index)?;
            }
        }
        Ok(())
    }
}

impl InjectionGroup {
    /// Create an empty group for programmatic assembly
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the method name prefix
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Add a glob pattern include entry
    pub fn include_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.includes.push(IncludeEntry::Pattern(pattern.into()));
        self
    }

    /// Add an inline value include entry
    pub fn include_value(mut self, value: impl Into<ModuleValue>) -> Self {
        self.includes.push(IncludeEntry::Inline(value.into()));
        self
    }

    /// Add an exclusion pattern
    pub fn ignore(mut self, pattern: impl Into<String>) -> Self {
        self.ignores.push(pattern.into());
        self
    }

    /// Set the group-level options
    pub fn with_options(mut self, options: MergeOptions) -> Self {
        self.options = Some(options);
        self
    }

    fn validate(&self, phase: Phase, index: usize) -> Result<()> {
        if self.includes.is_empty() {
            return Err(InjectError::config_validation(format!(
                "{phase} group {index}: includes must not be empty"
            )));
        }

        if let Some(prefix) = &self.prefix {
            if prefix.is_empty() {
                return Err(InjectError::config_validation(format!(
                    "{phase} group {index}: prefix must not be empty"
                )));
            }
        }

        for entry in &self.includes {
            if let IncludeEntry::Pattern(pattern) = entry {
                if pattern.is_empty() {
                    return Err(InjectError::config_validation(format!(
                        "{phase} group {index}: include pattern must not be empty"
                    )));
                }
            }
        }

        Ok(())
    }
}
