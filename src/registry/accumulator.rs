//! Run Accumulator
//!
//! The explicit result value a registration run builds and returns. Every
//! committed registration is mirrored here next to the host sink call, so
//! callers can inspect exactly what the host received. Committed stores are
//! never rolled back; a failing phase simply contributes nothing.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use uuid::Uuid;

use crate::module::{ModuleValue, Phase};
use crate::registry::method_tree::MethodTree;

/// Registrations committed per phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PhaseCounts {
    pub apps: usize,
    pub binds: usize,
    pub methods: usize,
    pub handlers: usize,
    pub routes: usize,
}

impl PhaseCounts {
    /// Add committed registrations to one phase's count
    pub fn record(&mut self, phase: Phase, count: usize) {
        match phase {
            Phase::Apps => self.apps += count,
            Phase::Binds => self.binds += count,
            Phase::Methods => self.methods += count,
            Phase::Handlers => self.handlers += count,
            Phase::Routes => self.routes += count,
        }
    }

    /// The count for one phase
    pub fn get(&self, phase: Phase) -> usize {
        match phase {
            Phase::Apps => self.apps,
            Phase::Binds => self.binds,
            Phase::Methods => self.methods,
            Phase::Handlers => self.handlers,
            Phase::Routes => self.routes,
        }
    }

    /// Total registrations across all phases
    pub fn total(&self) -> usize {
        self.apps + self.binds + self.methods + self.handlers + self.routes
    }
}

/// Identity, timing and volume for one registration run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Correlates every log line the run emitted
    pub run_id: Uuid,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// Wall-clock duration of the whole run in milliseconds
    pub duration_ms: u64,

    /// Registrations committed per phase
    pub counts: PhaseCounts,
}

/// Everything a completed run registered, in commit order
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// Shared application values by name
    pub apps: IndexMap<String, ModuleValue>,

    /// Bound context values by name, flushed to the host once after the
    /// binds phase commits
    pub binds: IndexMap<String, ModuleValue>,

    /// The method tree
    pub methods: MethodTree,

    /// Run identity, timing and per-phase counts
    pub summary: RunSummary,
}

impl PipelineResult {
    pub(crate) fn new(run_id: Uuid, started_at: DateTime<Utc>) -> Self {
        Self {
            apps: IndexMap::new(),
            binds: IndexMap::new(),
            methods: MethodTree::new(),
            summary: RunSummary {
                run_id,
                started_at,
                duration_ms: 0,
                counts: PhaseCounts::default(),
            },
        }
    }

    pub(crate) fn finalize(&mut self, duration_ms: u64) {
        self.summary.duration_ms = duration_ms;
    }

    /// Registry statistics for the completed run
    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            app_values: self.apps.len(),
            bind_values: self.binds.len(),
            method_callables: self.methods.len(),
            handler_registrations: self.summary.counts.handlers,
            route_registrations: self.summary.counts.routes,
        }
    }
}

/// Registry statistics: distinct stored values plus committed sink calls
/// for the phases that have no result store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RegistryStats {
    /// Distinct app values stored
    pub app_values: usize,
    /// Distinct bind values stored
    pub bind_values: usize,
    /// Callables reachable in the method tree
    pub method_callables: usize,
    /// Handler registrations committed to the host
    pub handler_registrations: usize,
    /// Route registrations committed to the host
    pub route_registrations: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::Callable;
    use serde_json::{json, Value};

    #[test]
    fn test_phase_counts_record_and_total() {
        let mut counts = PhaseCounts::default();
        counts.record(Phase::Apps, 2);
        counts.record(Phase::Methods, 3);
        counts.record(Phase::Methods, 1);

        assert_eq!(counts.get(Phase::Apps), 2);
        assert_eq!(counts.get(Phase::Methods), 4);
        assert_eq!(counts.get(Phase::Routes), 0);
        assert_eq!(counts.total(), 6);
    }

    #[test]
    fn test_stats_reflect_stores_and_counts() {
        let mut result = PipelineResult::new(Uuid::new_v4(), Utc::now());
        result
            .apps
            .insert("db".to_string(), ModuleValue::Data(json!({"host": "x"})));
        result.methods.insert_direct(
            Some("math"),
            "square",
            Callable::new(|_: &[Value]| json!(null)),
        );
        result.summary.counts.record(Phase::Handlers, 2);
        result.summary.counts.record(Phase::Routes, 5);
        result.finalize(12);

        let stats = result.stats();
        assert_eq!(stats.app_values, 1);
        assert_eq!(stats.bind_values, 0);
        assert_eq!(stats.method_callables, 1);
        assert_eq!(stats.handler_registrations, 2);
        assert_eq!(stats.route_registrations, 5);
        assert_eq!(result.summary.duration_ms, 12);
    }
}
