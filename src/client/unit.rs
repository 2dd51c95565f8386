//! Unit handles.
//!
//! The manager only ever holds `Arc<dyn Unit>` references; the unit's fields
//! belong to the control-plane client that created it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

use crate::client::action::Action;
use crate::client::types::{Expected, Payload, UnitConfig, UnitId, UnitLogLevel, UnitState, UnitType};

/// Errors returned when pushing status for a unit.
#[derive(Debug, Error)]
pub enum UnitError {
    #[error("unit {0} has been removed")]
    Removed(UnitId),
}

/// A control-plane managed configuration entity.
pub trait Unit: Send + Sync {
    fn id(&self) -> &UnitId;

    fn unit_type(&self) -> UnitType;

    /// Current desired state, log level and raw configuration.
    fn expected(&self) -> Expected;

    /// Report observed state back to the control plane.
    fn update_state(
        &self,
        state: UnitState,
        message: &str,
        payload: Option<&Payload>,
    ) -> Result<(), UnitError>;

    fn register_action(&self, action: Arc<dyn Action>);

    fn unregister_action(&self, action: &Arc<dyn Action>);
}

/// A single status report written to a unit.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    pub state: UnitState,
    pub message: String,
    pub payload: Option<Payload>,
}

/// In-memory unit used by the channel client.
///
/// Records every status report so the host (or a test) can observe what the
/// manager pushed.
pub struct ManagedUnit {
    id: UnitId,
    unit_type: UnitType,
    expected: Mutex<Expected>,
    reports: Mutex<Vec<StatusReport>>,
    actions: Mutex<HashMap<String, Arc<dyn Action>>>,
    removed: AtomicBool,
}

impl ManagedUnit {
    pub fn new(id: impl Into<UnitId>, unit_type: UnitType, state: UnitState, config: UnitConfig) -> Self {
        Self {
            id: id.into(),
            unit_type,
            expected: Mutex::new(Expected {
                state,
                log_level: UnitLogLevel::default(),
                config: Arc::new(config),
            }),
            reports: Mutex::new(Vec::new()),
            actions: Mutex::new(HashMap::new()),
            removed: AtomicBool::new(false),
        }
    }

    pub fn with_log_level(self, log_level: UnitLogLevel) -> Self {
        self.expected
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .log_level = log_level;
        self
    }

    /// Replace the desired state; the next Modified event observes it.
    pub fn set_expected(&self, state: UnitState, log_level: UnitLogLevel, config: UnitConfig) {
        let mut expected = self.expected.lock().unwrap_or_else(PoisonError::into_inner);
        *expected = Expected {
            state,
            log_level,
            config: Arc::new(config),
        };
    }

    /// Reject all further status writes.
    pub fn mark_removed(&self) {
        self.removed.store(true, Ordering::SeqCst);
    }

    pub fn is_removed(&self) -> bool {
        self.removed.load(Ordering::SeqCst)
    }

    /// Snapshot of every status report received so far.
    pub fn reports(&self) -> Vec<StatusReport> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// States of every report received so far, in order.
    pub fn states(&self) -> Vec<UnitState> {
        self.reports().into_iter().map(|r| r.state).collect()
    }

    pub fn last_report(&self) -> Option<StatusReport> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    pub fn action_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .actions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }
}

impl Unit for ManagedUnit {
    fn id(&self) -> &UnitId {
        &self.id
    }

    fn unit_type(&self) -> UnitType {
        self.unit_type
    }

    fn expected(&self) -> Expected {
        self.expected
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn update_state(
        &self,
        state: UnitState,
        message: &str,
        payload: Option<&Payload>,
    ) -> Result<(), UnitError> {
        if self.is_removed() {
            return Err(UnitError::Removed(self.id.clone()));
        }
        tracing::trace!(unit_id = %self.id, state = %state, message, "Unit status updated");
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(StatusReport {
                state,
                message: message.to_string(),
                payload: payload.cloned(),
            });
        Ok(())
    }

    fn register_action(&self, action: Arc<dyn Action>) {
        self.actions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(action.name().to_string(), action);
    }

    fn unregister_action(&self, action: &Arc<dyn Action>) {
        self.actions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(action.name());
    }
}
