//! Module Loading
//!
//! Loads the path references produced by pattern expansion. [`FileLoader`]
//! reads JSON and YAML data modules straight from disk. [`ModuleCatalog`]
//! serves programmatically registered values and is the only way callables
//! enter a run, since data files cannot carry functions; unregistered
//! references fall through to a wrapped loader.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use crate::module::ModuleValue;

/// Module loading primitive: one reference string to one classified value
#[async_trait]
pub trait ModuleLoader: Send + Sync {
    /// Load one path reference relative to the search root
    async fn load(&self, root: &Path, reference: &str) -> anyhow::Result<ModuleValue>;
}

/// Loads JSON and YAML data modules from the filesystem
#[derive(Debug, Default, Clone)]
pub struct FileLoader;

impl FileLoader {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ModuleLoader for FileLoader {
    async fn load(&self, root: &Path, reference: &str) -> anyhow::Result<ModuleValue> {
        let path = root.join(reference);
        let content = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let value: serde_json::Value = match extension {
            "json" => serde_json::from_str(&content)
                .with_context(|| format!("invalid JSON in {}", path.display()))?,
            "yaml" | "yml" => serde_yaml::from_str(&content)
                .with_context(|| format!("invalid YAML in {}", path.display()))?,
            other => bail!(
                "unsupported module extension '{other}' for {}",
                path.display()
            ),
        };

        Ok(ModuleValue::Data(value))
    }
}

/// Programmatic module registry with filesystem fallback.
///
/// Entries registered under a reference string shadow files at the same
/// relative path, so a pattern can match a file on disk while the catalog
/// supplies the callable registered for it.
pub struct ModuleCatalog {
    entries: DashMap<String, ModuleValue>,
    fallback: Option<Arc<dyn ModuleLoader>>,
}

impl ModuleCatalog {
    /// Create a catalog that falls back to [`FileLoader`] for unregistered
    /// references
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            fallback: Some(Arc::new(FileLoader)),
        }
    }

    /// Create a catalog that serves only registered entries
    pub fn without_fallback() -> Self {
        Self {
            entries: DashMap::new(),
            fallback: None,
        }
    }

    /// Register a value under a reference string, replacing any previous one
    pub fn register(&self, reference: impl Into<String>, value: impl Into<ModuleValue>) {
        let reference = reference.into();
        debug!(reference = %reference, "Registered catalog module");
        self.entries.insert(reference, value.into());
    }

    /// Whether a reference is registered
    pub fn contains(&self, reference: &str) -> bool {
        self.entries.contains_key(reference)
    }

    /// Number of registered entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog has no registered entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ModuleCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ModuleCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleCatalog")
            .field("entries", &self.entries.len())
            .field("has_fallback", &self.fallback.is_some())
            .finish()
    }
}

#[async_trait]
impl ModuleLoader for ModuleCatalog {
    async fn load(&self, root: &Path, reference: &str) -> anyhow::Result<ModuleValue> {
        if let Some(entry) = self.entries.get(reference) {
            return Ok(entry.clone());
        }

        match &self.fallback {
            Some(loader) => loader.load(root, reference).await,
            None => bail!("module '{reference}' is not registered in the catalog"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::Callable;
    use serde_json::{json, Value};
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_file_loader_reads_json_and_yaml() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("db.json"), r#"{"host": "localhost"}"#).unwrap();
        fs::write(dir.path().join("cache.yaml"), "ttl: 30\n").unwrap();

        let json_value = FileLoader.load(dir.path(), "db.json").await.unwrap();
        assert_eq!(json_value, ModuleValue::Data(json!({"host": "localhost"})));

        let yaml_value = FileLoader.load(dir.path(), "cache.yaml").await.unwrap();
        assert_eq!(yaml_value, ModuleValue::Data(json!({"ttl": 30})));
    }

    #[tokio::test]
    async fn test_file_loader_rejects_unknown_extension() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("notes.txt"), "plain").unwrap();

        let err = FileLoader.load(dir.path(), "notes.txt").await.unwrap_err();
        assert!(err.to_string().contains("unsupported module extension"));
    }

    #[tokio::test]
    async fn test_file_loader_reports_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = FileLoader.load(dir.path(), "gone.json").await.unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }

    #[tokio::test]
    async fn test_catalog_entries_shadow_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("add.json"), r#"{"stub": true}"#).unwrap();

        let catalog = ModuleCatalog::new();
        catalog.register(
            "add.json",
            Callable::named("add", |args: &[Value]| {
                json!(args[0].as_i64().unwrap_or(0) + args[1].as_i64().unwrap_or(0))
            }),
        );

        let value = catalog.load(dir.path(), "add.json").await.unwrap();
        match value {
            ModuleValue::Callable(callable) => {
                assert_eq!(callable.invoke(&[json!(2), json!(3)]), json!(5));
            }
            other => panic!("expected callable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_catalog_falls_back_to_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("db.json"), r#"{"host": "localhost"}"#).unwrap();

        let catalog = ModuleCatalog::new();
        let value = catalog.load(dir.path(), "db.json").await.unwrap();
        assert_eq!(value, ModuleValue::Data(json!({"host": "localhost"})));
    }

    #[tokio::test]
    async fn test_catalog_without_fallback_rejects_unknown() {
        let dir = TempDir::new().unwrap();
        let catalog = ModuleCatalog::without_fallback();

        let err = catalog.load(dir.path(), "gone.json").await.unwrap_err();
        assert!(err.to_string().contains("not registered"));
    }
}
