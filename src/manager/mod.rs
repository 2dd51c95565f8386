//! Unit reconciliation manager.
//!
//! # Data Flow
//! ```text
//! ControlClient::next_change
//!     → event_loop.rs (one event at a time, arrival order)
//!         Added    → units.add, spawn reload task
//!         Modified → expected STOPPED? shutdown.rs first; then units.add, spawn reload task
//!         Removed  → drop from units.rs
//!     → handlers.rs (per task)
//!         still registered? → transform → reload registry lookup → Reloadable::reload
//!         → CONFIGURING, then exactly one of HEALTHY / FAILED
//! ```
//!
//! # Design Decisions
//! - The first input unit becomes the main unit and stays so for the
//!   manager's lifetime, even after it is removed
//! - Running flag and main unit share one lock; the unit map has its own
//! - The stop callback is guarded by `Once`, not by the running flag alone
//! - No retries: a later Modified event is the only way to recover a unit

pub mod error;
mod event_loop;
mod handlers;
mod shutdown;
pub mod unit_manager;
pub mod units;

use async_trait::async_trait;
use std::sync::Arc;

use crate::client::{Action, ConfigMap, Payload, UnitState};

pub use unit_manager::UnitManager;
pub use error::{ManagerError, UnitReloadError};
pub use units::UnitRegistry;

/// Hook invoked when the process itself must terminate.
pub type StopCallback = Box<dyn Fn() + Send + Sync>;

/// Management contract consumed by the host process.
#[async_trait]
pub trait Manager: Send + Sync {
    /// True when the process runs under control-plane management.
    fn enabled(&self) -> bool;

    /// Connect to the control plane and start processing unit changes.
    ///
    /// Call once.
    async fn start(&self) -> Result<(), ManagerError>;

    /// Shut down through the main unit. No-op when not running or when no
    /// main unit is registered.
    fn stop(&self);

    /// Register the process termination hook. Runs at most once.
    fn set_stop_callback(&self, callback: StopCallback);

    /// Report process-wide status through the main unit.
    fn update_status(&self, state: UnitState, message: &str);

    fn register_action(&self, action: Arc<dyn Action>);

    fn unregister_action(&self, action: &Arc<dyn Action>);

    /// Extra fields attached to every status push.
    fn set_payload(&self, payload: Payload);

    /// Validate a raw configuration before it is applied. Accepts everything.
    fn check_raw_config(&self, config: &ConfigMap) -> Result<(), ManagerError>;
}
