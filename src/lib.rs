//! Unit reconciliation manager library.
//!
//! Receives lifecycle events for control-plane managed units, reloads the
//! matching local subsystem and reports unit status back.

pub mod client;
pub mod config;
pub mod lifecycle;
pub mod manager;
pub mod observability;
pub mod reload;
pub mod transform;

pub use client::{ChannelClient, ControlClient, ControlPlane, Unit, UnitState, UnitType};
pub use config::ManagementConfig;
pub use lifecycle::Shutdown;
pub use manager::{Manager, UnitManager};
pub use reload::ReloadRegistry;
