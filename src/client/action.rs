//! Actions the control plane can invoke on the process through a unit.

use async_trait::async_trait;
use thiserror::Error;

use crate::client::types::ConfigMap;

/// Errors returned by an action handler.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("invalid action parameters: {0}")]
    InvalidParams(String),

    #[error("action failed: {0}")]
    Failed(String),
}

/// A named operation registered on a unit.
#[async_trait]
pub trait Action: Send + Sync {
    /// Name the control plane uses to address the action.
    fn name(&self) -> &str;

    /// Run the action with the given parameters.
    async fn execute(&self, params: ConfigMap) -> Result<ConfigMap, ActionError>;
}
