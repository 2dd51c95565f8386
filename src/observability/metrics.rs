//! Metrics recorded by the manager.
//!
//! # Metrics
//! - `unit_events_total` (counter): lifecycle events received, by kind
//! - `unit_reloads_total` (counter): reload attempts, by unit type and outcome
//! - `managed_units` (gauge): units currently in the registry

use crate::client::{UnitChangeKind, UnitType};

/// Outcome label for a reload attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    Healthy,
    Failed,
    Panicked,
}

impl ReloadOutcome {
    fn as_str(&self) -> &'static str {
        match self {
            ReloadOutcome::Healthy => "healthy",
            ReloadOutcome::Failed => "failed",
            ReloadOutcome::Panicked => "panicked",
        }
    }
}

pub fn record_unit_event(kind: UnitChangeKind) {
    ::metrics::counter!("unit_events_total", "kind" => kind.as_str()).increment(1);
}

pub fn record_reload(unit_type: UnitType, outcome: ReloadOutcome) {
    ::metrics::counter!(
        "unit_reloads_total",
        "unit_type" => unit_type.as_str(),
        "outcome" => outcome.as_str()
    )
    .increment(1);
}

pub fn record_unit_count(count: usize) {
    ::metrics::gauge!("managed_units").set(count as f64);
}
