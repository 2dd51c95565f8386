//! Per-unit reload handlers.
//!
//! The event loop registers the unit before the task is spawned. Each
//! handler returns the Healthy message or the error whose text becomes
//! the Failed message; `handle_unit_reload` writes that single terminal status.

use std::sync::Arc;

use crate::client::{Unit, UnitState, UnitType};
use crate::manager::unit_manager::Inner;
use crate::manager::UnitReloadError;
use crate::observability::metrics::{self, ReloadOutcome};
use crate::reload;

impl Inner {
    /// Reload the subsystem for the unit's type. A unit removed before the
    /// task got to run is skipped.
    pub(crate) async fn handle_unit_reload(&self, unit: &Arc<dyn Unit>) {
        if !self.units.contains(unit.id()) {
            tracing::debug!(unit_id = %unit.id(), "Unit removed before reload, skipping");
            return;
        }

        let unit_type = unit.unit_type();
        let result = match unit_type {
            UnitType::Output => self.handle_output_reload(unit).await,
            UnitType::Input => self.handle_input_reload(unit).await,
        };

        match result {
            Ok(message) => {
                tracing::info!(unit_id = %unit.id(), unit_type = %unit_type, "Unit reloaded");
                metrics::record_reload(unit_type, ReloadOutcome::Healthy);
                self.push_status(unit, UnitState::Healthy, message);
            }
            Err(e) => {
                tracing::warn!(unit_id = %unit.id(), unit_type = %unit_type, error = %e, "Unit reload failed");
                metrics::record_reload(unit_type, ReloadOutcome::Failed);
                self.push_status(unit, UnitState::Failed, &e.to_string());
            }
        }
    }

    async fn handle_output_reload(&self, unit: &Arc<dyn Unit>) -> Result<&'static str, UnitReloadError> {
        let expected = unit.expected();
        tracing::debug!(unit_id = %unit.id(), output_type = %expected.config.kind, "Got output unit config");

        let config = self
            .transform
            .output_config(&expected.config)
            .map_err(UnitReloadError::OutputConfig)?;

        let output = self
            .reloadables
            .get_reloadable(reload::OUTPUT)
            .ok_or(UnitReloadError::MissingReloadable(reload::OUTPUT))?;

        self.push_status(unit, UnitState::Configuring, "reloading output component");
        output
            .reload(config)
            .await
            .map_err(UnitReloadError::OutputReload)?;

        Ok("reloaded output component")
    }

    async fn handle_input_reload(&self, unit: &Arc<dyn Unit>) -> Result<&'static str, UnitReloadError> {
        let expected = unit.expected();
        self.set_main_unit(unit.id());
        tracing::debug!(unit_id = %unit.id(), input_type = %expected.config.kind, "Got input unit config");

        let inputs = self
            .reloadables
            .get_reloadable_list(reload::INPUT)
            .ok_or(UnitReloadError::MissingReloadable(reload::INPUT))?;

        self.push_status(unit, UnitState::Configuring, "found reloader for 'input'");

        let configs = self
            .transform
            .input_configs(&expected.config, &self.agent_info())
            .map_err(UnitReloadError::InputConfig)?;

        inputs
            .reload(configs)
            .await
            .map_err(UnitReloadError::InputReload)?;

        Ok("inputs reloaded")
    }
}
