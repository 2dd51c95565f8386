//! Manager error types.

use thiserror::Error;

use crate::client::ClientError;
use crate::reload::ReloadError;
use crate::transform::TransformError;

/// Errors surfaced to the host process.
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("unit manager is disabled")]
    Disabled,

    #[error("error starting connection to client: {0}")]
    Connection(#[source] ClientError),
}

/// Reasons a unit reload ends in Failed. The display text becomes the
/// status message pushed to the unit.
#[derive(Debug, Error)]
pub enum UnitReloadError {
    #[error("failed to find reloadable type '{0}'")]
    MissingReloadable(&'static str),

    #[error("failed to generate config for output: {0}")]
    OutputConfig(#[source] TransformError),

    #[error("failed to reload component: {0}")]
    OutputReload(#[source] ReloadError),

    #[error("failed to create unit config: {0}")]
    InputConfig(#[source] TransformError),

    #[error("error reloading input: {0}")]
    InputReload(#[source] ReloadError),
}
