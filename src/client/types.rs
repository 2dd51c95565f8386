//! Control-plane data types shared by the client and the manager.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Free-form key/value mapping used for configuration sources and payloads.
pub type ConfigMap = Map<String, Value>;

/// Extra fields attached to status reports.
pub type Payload = ConfigMap;

/// Identifier assigned to a unit by the control plane.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(String);

impl UnitId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UnitId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for UnitId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Category of a unit; selects the reload path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitType {
    Input,
    Output,
}

impl UnitType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitType::Input => "input",
            UnitType::Output => "output",
        }
    }
}

impl fmt::Display for UnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reported (or desired) state of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UnitState {
    Starting,
    Configuring,
    Healthy,
    Degraded,
    Failed,
    Stopping,
    Stopped,
}

impl UnitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitState::Starting => "STARTING",
            UnitState::Configuring => "CONFIGURING",
            UnitState::Healthy => "HEALTHY",
            UnitState::Degraded => "DEGRADED",
            UnitState::Failed => "FAILED",
            UnitState::Stopping => "STOPPING",
            UnitState::Stopped => "STOPPED",
        }
    }

    /// Healthy and Failed end a reload attempt.
    pub fn is_terminal(&self) -> bool {
        matches!(self, UnitState::Healthy | UnitState::Failed)
    }
}

impl fmt::Display for UnitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log level requested by the control plane for a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitLogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

/// Data stream routing for an input or one of its streams.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataStream {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub dataset: Option<String>,
    pub namespace: Option<String>,
}

/// One stream within an input unit's configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    pub id: String,
    pub data_stream: Option<DataStream>,
    pub source: ConfigMap,
}

/// Raw configuration carried by a unit's expected state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitConfig {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub revision: u64,
    pub data_stream: Option<DataStream>,
    pub source: ConfigMap,
    pub streams: Vec<StreamConfig>,
}

/// Desired state triple for a unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Expected {
    pub state: UnitState,
    pub log_level: UnitLogLevel,
    pub config: Arc<UnitConfig>,
}

/// Identity of the agent supervising this process.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AgentInfo {
    pub id: String,
    pub version: String,
    pub snapshot: bool,
}
