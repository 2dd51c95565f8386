//! Process shutdown driven by the control plane or the host.

use std::sync::Arc;

use crate::client::{Unit, UnitState};
use crate::manager::unit_manager::Inner;

impl Inner {
    /// Run the shutdown sequence with `unit` as the status subject.
    ///
    /// Only the first call after start does anything. The stop callback runs
    /// at most once for the manager's lifetime.
    pub(crate) fn stop_unit(&self, unit: &Arc<dyn Unit>) {
        // The lock covers only the running transition, not the status pushes
        // or the callback, so a callback that re-enters the manager cannot
        // deadlock. A losing concurrent caller may return before Stopped is
        // pushed; the callback itself is still guarded by `stop_once`.
        {
            let mut state = self.lock_state();
            if !state.running {
                return;
            }
            state.running = false;
        }

        tracing::info!(unit_id = %unit.id(), "Stopping process");
        self.push_status(unit, UnitState::Stopping, "stopping process");

        if let Some(callback) = self.stop_callback.load_full() {
            self.stop_once.call_once(|| (**callback)());
        }
        if let Some(client) = &self.client {
            client.stop();
        }

        self.push_status(unit, UnitState::Stopped, "stopped process");
        tracing::info!(unit_id = %unit.id(), "Process stopped");
    }
}
