//! Pattern Resolution
//!
//! Expands one group's include entries into concrete items. String entries
//! are glob patterns expanded case-sensitively against the search root,
//! matching files only; anything matching one of the group's ignore
//! patterns is dropped. A pattern with zero surviving matches fails the
//! group, even when the expansion primitive itself succeeded.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::debug;

use crate::config::{IncludeEntry, InjectionGroup};
use crate::error::{InjectError, Result};
use crate::module::ResolvedItem;

/// Pattern expansion primitive, kept behind a trait so tests and embedders
/// can substitute their own filesystem view
#[async_trait]
pub trait PatternExpander: Send + Sync {
    /// Expand one pattern against the root, excluding anything that matches
    /// an ignore pattern. Returned paths are relative to the root.
    async fn expand(
        &self,
        pattern: &str,
        ignores: &[String],
        root: &Path,
    ) -> anyhow::Result<Vec<String>>;
}

/// Glob-based expander walking the real filesystem
#[derive(Debug, Default, Clone)]
pub struct GlobExpander;

impl GlobExpander {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PatternExpander for GlobExpander {
    async fn expand(
        &self,
        pattern: &str,
        ignores: &[String],
        root: &Path,
    ) -> anyhow::Result<Vec<String>> {
        let pattern = pattern.to_string();
        let ignores = ignores.to_vec();
        let root = root.to_path_buf();

        tokio::task::spawn_blocking(move || expand_blocking(&pattern, &ignores, &root))
            .await
            .context("pattern expansion task failed")?
    }
}

fn expand_blocking(pattern: &str, ignores: &[String], root: &Path) -> anyhow::Result<Vec<String>> {
    let ignore_set = build_ignore_set(ignores)?;
    let full_pattern = root.join(pattern);

    let entries = glob::glob(&full_pattern.to_string_lossy())
        .with_context(|| format!("invalid glob pattern: {pattern}"))?;

    let mut matched = Vec::new();
    for entry in entries {
        let path = entry.with_context(|| format!("glob walk failed for pattern: {pattern}"))?;
        if !path.is_file() {
            continue;
        }

        let relative = path.strip_prefix(root).unwrap_or(&path);
        if ignore_set.is_match(relative) {
            continue;
        }

        matched.push(relative.to_string_lossy().into_owned());
    }

    Ok(matched)
}

fn build_ignore_set(ignores: &[String]) -> anyhow::Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in ignores {
        let glob =
            Glob::new(pattern).with_context(|| format!("invalid ignore pattern: {pattern}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

/// Resolves one group's include declarations into concrete items
#[derive(Clone)]
pub struct PatternResolver {
    expander: Arc<dyn PatternExpander>,
}

impl PatternResolver {
    pub fn new(expander: Arc<dyn PatternExpander>) -> Self {
        Self { expander }
    }

    /// Resolve a group into items in declaration order.
    ///
    /// Inline entries pass through untouched. Patterns expand sequentially
    /// so the cross-entry order stays deterministic; expansion failures and
    /// zero-match patterns fail the whole group.
    pub async fn resolve(
        &self,
        group: &InjectionGroup,
        root: &Path,
    ) -> Result<Vec<ResolvedItem>> {
        let mut items = Vec::new();

        for entry in &group.includes {
            match entry {
                IncludeEntry::Inline(value) => {
                    items.push(ResolvedItem::Value(value.clone()));
                }
                IncludeEntry::Pattern(pattern) => {
                    let files = self
                        .expander
                        .expand(pattern, &group.ignores, root)
                        .await
                        .map_err(|e| InjectError::pattern_expansion(pattern, e))?;

                    if files.is_empty() {
                        return Err(InjectError::pattern_resolution(pattern));
                    }

                    debug!(pattern = %pattern, matched = files.len(), "Expanded include pattern");
                    items.extend(files.into_iter().map(ResolvedItem::PathRef));
                }
            }
        }

        Ok(items)
    }
}
