//! Module Resolution
//!
//! Turns one resolved item into a loaded module. Path references go through
//! the loader and get a provisional base name from the final path segment
//! with its extension stripped; inline values pass straight through. A
//! callable's intrinsic name overrides the path-derived name, while a
//! descriptor's method name only fills in when the path gave none.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::error::{InjectError, Result};
use crate::module::{LoadedModule, ModuleValue, ResolvedItem, INLINE_ORIGIN};
use crate::resolver::loader::ModuleLoader;

/// Resolves one concrete item into a loaded, provisionally named module
#[derive(Clone)]
pub struct ModuleResolver {
    loader: Arc<dyn ModuleLoader>,
}

impl ModuleResolver {
    pub fn new(loader: Arc<dyn ModuleLoader>) -> Self {
        Self { loader }
    }

    /// Resolve one item, loading it when it is a path reference.
    ///
    /// Loader failures are wrapped with the reference they were loading;
    /// whether a missing base name is fatal is decided per phase, so the
    /// derived name stays optional here.
    pub async fn resolve(&self, item: ResolvedItem, root: &Path) -> Result<LoadedModule> {
        let (value, provisional, origin) = match item {
            ResolvedItem::PathRef(reference) => {
                let value = self
                    .loader
                    .load(root, &reference)
                    .await
                    .map_err(|e| InjectError::load(reference.clone(), e))?;
                let provisional = file_stem(&reference);
                (value, provisional, reference)
            }
            ResolvedItem::Value(value) => (value, None, INLINE_ORIGIN.to_string()),
        };

        let base_name = derive_base_name(&value, provisional);
        debug!(origin = %origin, base_name = ?base_name, "Resolved module");

        Ok(LoadedModule {
            base_name,
            value,
            origin,
        })
    }
}

/// Final path segment with the extension stripped
fn file_stem(reference: &str) -> Option<String> {
    Path::new(reference)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
}

fn derive_base_name(value: &ModuleValue, provisional: Option<String>) -> Option<String> {
    match value {
        ModuleValue::Callable(callable) => callable.name().map(String::from).or(provisional),
        ModuleValue::Descriptor(descriptor) => {
            provisional.or_else(|| descriptor.method.name().map(String::from))
        }
        _ => provisional,
    }
}
