//! Output unit configuration → output reload configuration.

use serde_json::Value;

use crate::client::{ConfigMap, UnitConfig};
use crate::reload::ConfigWithMeta;
use crate::transform::TransformError;

/// Index pattern applied when the output source doesn't name one.
pub const DEFAULT_OUTPUT_INDEX: &str = "logs-%{[data_stream.dataset]}-%{[data_stream.namespace]}";

/// Group an output unit's source under its output type.
///
/// `{type: "elasticsearch", source: {hosts: [..]}}` becomes
/// `{"elasticsearch": {hosts: [..], index: ..}}`.
pub fn group_by_outputs(raw: &UnitConfig) -> Result<ConfigWithMeta, TransformError> {
    if raw.kind.is_empty() {
        return Err(TransformError::MissingType("output"));
    }

    let mut source = raw.source.clone();
    source.remove("type");
    source
        .entry("index")
        .or_insert_with(|| Value::String(DEFAULT_OUTPUT_INDEX.to_string()));

    let mut config = ConfigMap::new();
    config.insert(raw.kind.clone(), Value::Object(source));

    Ok(ConfigWithMeta::new(config))
}
