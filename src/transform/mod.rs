//! Raw unit configuration → reload configuration.
//!
//! # Data Flow
//! ```text
//! output unit: UnitConfig               → group_by_outputs       → ConfigWithMeta
//! input unit:  UnitConfig + AgentInfo   → generate_input_configs → Vec<ConfigWithMeta>
//! ```

pub mod input;
pub mod output;

use thiserror::Error;

use crate::client::{AgentInfo, UnitConfig};
use crate::reload::ConfigWithMeta;

pub use input::generate_input_configs;
pub use output::group_by_outputs;

/// Errors raised while converting unit configuration.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("{0} config does not have a configured type")]
    MissingType(&'static str),

    #[error("processors for stream '{0}' must be a list")]
    InvalidProcessors(String),
}

/// Conversion of unit configuration into subsystem reload configuration.
pub trait ConfigTransform: Send + Sync {
    fn output_config(&self, raw: &UnitConfig) -> Result<ConfigWithMeta, TransformError>;

    fn input_configs(
        &self,
        raw: &UnitConfig,
        agent: &AgentInfo,
    ) -> Result<Vec<ConfigWithMeta>, TransformError>;
}

/// The stock transforms.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTransform;

impl ConfigTransform for DefaultTransform {
    fn output_config(&self, raw: &UnitConfig) -> Result<ConfigWithMeta, TransformError> {
        group_by_outputs(raw)
    }

    fn input_configs(
        &self,
        raw: &UnitConfig,
        agent: &AgentInfo,
    ) -> Result<Vec<ConfigWithMeta>, TransformError> {
        generate_input_configs(raw, agent)
    }
}
