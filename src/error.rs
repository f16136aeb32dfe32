//! # Injection Error Types
//!
//! Structured error types for every way a registration run can fail, using
//! thiserror instead of `Box<dyn Error>` patterns. Collaborator failures
//! (pattern expansion, module loading) keep their `anyhow` sources attached
//! so the full cause chain stays visible to callers.

use thiserror::Error;

use crate::module::Phase;

/// Comprehensive registration pipeline error types
#[derive(Error, Debug)]
pub enum InjectError {
    #[error("Invalid injection configuration: {reason}")]
    ConfigValidation { reason: String },

    #[error("Unable to retrieve files from pattern: {pattern}")]
    PatternResolution { pattern: String },

    #[error("Pattern expansion failed for {pattern}: {source}")]
    PatternExpansion {
        pattern: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Unable to identify the {} name for {origin}", .phase.noun())]
    Naming { phase: Phase, origin: String },

    #[error("Unable to load module {reference}: {source}")]
    Load {
        reference: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Resolution task failed in {phase} phase: {reason}")]
    TaskJoin { phase: Phase, reason: String },
}

impl InjectError {
    /// Create a configuration validation error
    pub fn config_validation(reason: impl Into<String>) -> Self {
        Self::ConfigValidation {
            reason: reason.into(),
        }
    }

    /// Create a zero-match pattern error
    pub fn pattern_resolution(pattern: impl Into<String>) -> Self {
        Self::PatternResolution {
            pattern: pattern.into(),
        }
    }

    /// Create a pattern expansion failure wrapping the primitive's error
    pub fn pattern_expansion(pattern: impl Into<String>, source: anyhow::Error) -> Self {
        Self::PatternExpansion {
            pattern: pattern.into(),
            source,
        }
    }

    /// Create a naming error for an item whose registration name cannot be derived
    pub fn naming(phase: Phase, origin: impl Into<String>) -> Self {
        Self::Naming {
            phase,
            origin: origin.into(),
        }
    }

    /// Create a module load error wrapping the loader's failure
    pub fn load(reference: impl Into<String>, source: anyhow::Error) -> Self {
        Self::Load {
            reference: reference.into(),
            source,
        }
    }

    /// Create a task join error for a panicked or lost resolution task
    pub fn task_join(phase: Phase, reason: impl Into<String>) -> Self {
        Self::TaskJoin {
            phase,
            reason: reason.into(),
        }
    }
}

/// Conversion from serde_yaml::Error for configuration parsing
impl From<serde_yaml::Error> for InjectError {
    fn from(err: serde_yaml::Error) -> Self {
        InjectError::config_validation(err.to_string())
    }
}

/// Conversion from serde_json::Error for configuration parsing
impl From<serde_json::Error> for InjectError {
    fn from(err: serde_json::Error) -> Self {
        InjectError::config_validation(err.to_string())
    }
}

/// Result type alias for registration pipeline operations
pub type Result<T> = std::result::Result<T, InjectError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let config_err = InjectError::config_validation("includes must not be empty");
        assert!(matches!(config_err, InjectError::ConfigValidation { .. }));

        let pattern_err = InjectError::pattern_resolution("routes/**/*.json");
        assert!(matches!(pattern_err, InjectError::PatternResolution { .. }));

        let naming_err = InjectError::naming(Phase::Methods, "<inline>");
        assert!(matches!(naming_err, InjectError::Naming { .. }));
    }

    #[test]
    fn test_error_display() {
        let pattern_err = InjectError::pattern_resolution("methods/**/*.js");
        assert_eq!(
            pattern_err.to_string(),
            "Unable to retrieve files from pattern: methods/**/*.js"
        );

        let naming_err = InjectError::naming(Phase::Apps, "<inline>");
        assert_eq!(
            naming_err.to_string(),
            "Unable to identify the app name for <inline>"
        );

        let join_err = InjectError::task_join(Phase::Routes, "task panicked");
        assert!(join_err.to_string().contains("routes phase"));
    }

    #[test]
    fn test_error_sources_preserved() {
        let load_err = InjectError::load(
            "methods/missing.yaml",
            anyhow::anyhow!("No such file or directory"),
        );
        let display = load_err.to_string();
        assert!(display.contains("methods/missing.yaml"));
        assert!(display.contains("No such file or directory"));
        assert!(std::error::Error::source(&load_err).is_some());
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_err = serde_yaml::from_str::<serde_yaml::Value>("{invalid").unwrap_err();
        let inject_err: InjectError = yaml_err.into();
        assert!(matches!(inject_err, InjectError::ConfigValidation { .. }));
    }
}
