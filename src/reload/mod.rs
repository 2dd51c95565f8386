//! Reload dispatcher.
//!
//! # Data Flow
//! ```text
//! subsystems register at startup:
//!     "output" → Reloadable      (one config)
//!     "input"  → ReloadableList  (one config per input stream)
//!
//! manager resolves by name on every unit reload:
//!     get_reloadable / get_reloadable_list
//!     → reload(config) → Ok | ReloadError
//! ```

pub mod registry;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::client::ConfigMap;

pub use registry::{RegistryError, ReloadRegistry};

/// Name of the singular output reloadable.
pub const OUTPUT: &str = "output";

/// Name of the input reloadable list.
pub const INPUT: &str = "input";

/// A configuration handed to a reloadable subsystem.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConfigWithMeta {
    pub config: ConfigMap,
    #[serde(default)]
    pub meta: ConfigMap,
}

impl ConfigWithMeta {
    pub fn new(config: ConfigMap) -> Self {
        Self {
            config,
            meta: ConfigMap::new(),
        }
    }
}

/// Errors returned by a subsystem reload.
#[derive(Debug, Error)]
pub enum ReloadError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{0}")]
    Failed(String),
}

/// A subsystem that takes a single configuration.
#[async_trait]
pub trait Reloadable: Send + Sync {
    async fn reload(&self, config: ConfigWithMeta) -> Result<(), ReloadError>;
}

/// A subsystem that takes a list of configurations.
#[async_trait]
pub trait ReloadableList: Send + Sync {
    async fn reload(&self, configs: Vec<ConfigWithMeta>) -> Result<(), ReloadError>;
}
