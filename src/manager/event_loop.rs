//! Unit change listener.
//!
//! Events are consumed one at a time in arrival order. Reload work for each
//! event runs on its own task so a slow subsystem never delays the next
//! event; completion is only observable through the unit's status.

use futures_util::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use crate::client::{ControlClient, Unit, UnitChange, UnitChangeKind, UnitState};
use crate::manager::unit_manager::Inner;
use crate::observability::metrics::{self, ReloadOutcome};

/// Receive unit changes until the client closes the stream.
pub(crate) async fn run(inner: Arc<Inner>, client: Arc<dyn ControlClient>) {
    tracing::debug!("Listening for unit changes");

    while let Some(change) = client.next_change().await {
        inner.dispatch(change);
    }

    tracing::debug!("Unit change stream closed");
}

impl Inner {
    pub(crate) fn dispatch(self: &Arc<Self>, change: UnitChange) {
        let UnitChange { kind, unit } = change;
        metrics::record_unit_event(kind);

        match kind {
            UnitChangeKind::Added => {
                tracing::debug!(unit_id = %unit.id(), unit_type = %unit.unit_type(), "Got unit added");
                self.spawn_reload(unit);
            }
            UnitChangeKind::Modified => {
                let expected = unit.expected();
                tracing::debug!(
                    unit_id = %unit.id(),
                    expected_state = %expected.state,
                    "Got unit modified"
                );
                if expected.state == UnitState::Stopped {
                    self.stop_unit(&unit);
                }
                self.spawn_reload(unit);
            }
            UnitChangeKind::Removed => {
                tracing::debug!(unit_id = %unit.id(), "Got unit removed");
                self.units.remove(unit.id());
            }
        }
    }

    /// Register `unit`, then run its reload on its own task. A panic inside
    /// the reload is turned into a Failed status instead of unwinding the
    /// runtime.
    ///
    /// Registration happens here, not in the task, so registry changes follow
    /// event order.
    fn spawn_reload(self: &Arc<Self>, unit: Arc<dyn Unit>) {
        self.units.add(unit.clone());
        let inner = self.clone();
        tokio::spawn(async move {
            let reload = AssertUnwindSafe(inner.handle_unit_reload(&unit)).catch_unwind();
            if let Err(panic) = reload.await {
                let reason = panic_message(panic.as_ref());
                tracing::error!(unit_id = %unit.id(), reason, "Unit reload panicked");
                metrics::record_reload(unit.unit_type(), ReloadOutcome::Panicked);
                inner.push_status(
                    &unit,
                    UnitState::Failed,
                    &format!("reload task panicked: {reason}"),
                );
            }
        });
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
