//! Control-plane client interface.
//!
//! # Data Flow
//! ```text
//! control plane
//!     → ControlClient::next_change (Added / Modified / Removed + unit)
//!     → manager event loop
//!     → Unit::update_state (status back to the control plane)
//! ```
//!
//! The manager never speaks the transport itself; it is only a caller of
//! [`ControlClient`] and [`Unit`].

pub mod action;
pub mod channel;
pub mod feed;
pub mod types;
pub mod unit;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

pub use action::{Action, ActionError};
pub use channel::{ChannelClient, ControlPlane};
pub use feed::{feed_lines, FeedError, UnitEvent};
pub use types::{
    AgentInfo, ConfigMap, DataStream, Expected, Payload, StreamConfig, UnitConfig, UnitId,
    UnitLogLevel, UnitState, UnitType,
};
pub use unit::{ManagedUnit, StatusReport, Unit, UnitError};

/// Errors raised by a control client.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("control channel is closed")]
    Closed,

    #[error("control plane disconnected")]
    Disconnected,

    #[error("failed to connect to control plane: {0}")]
    Connect(String),
}

/// Kind of lifecycle notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitChangeKind {
    Added,
    Modified,
    Removed,
}

impl UnitChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitChangeKind::Added => "added",
            UnitChangeKind::Modified => "modified",
            UnitChangeKind::Removed => "removed",
        }
    }
}

/// A lifecycle notification for one unit.
#[derive(Clone)]
pub struct UnitChange {
    pub kind: UnitChangeKind,
    pub unit: Arc<dyn Unit>,
}

impl UnitChange {
    pub fn new(kind: UnitChangeKind, unit: Arc<dyn Unit>) -> Self {
        Self { kind, unit }
    }
}

impl fmt::Debug for UnitChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnitChange")
            .field("kind", &self.kind)
            .field("unit_id", self.unit.id())
            .field("unit_type", &self.unit.unit_type())
            .finish()
    }
}

/// Connection to the control plane.
#[async_trait]
pub trait ControlClient: Send + Sync {
    /// Establish the connection.
    async fn start(&self) -> Result<(), ClientError>;

    /// Close the connection. Pending and future `next_change` calls return `None`.
    fn stop(&self);

    /// Wait for the next lifecycle event; `None` once the connection is gone.
    async fn next_change(&self) -> Option<UnitChange>;

    /// Identity of the supervising agent.
    fn agent_info(&self) -> AgentInfo;
}
