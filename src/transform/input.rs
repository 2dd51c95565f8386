//! Input unit configuration → input reload configurations.

use serde_json::{json, Value};

use crate::client::{AgentInfo, ConfigMap, DataStream, UnitConfig};
use crate::reload::ConfigWithMeta;
use crate::transform::TransformError;

const DEFAULT_DATA_STREAM_TYPE: &str = "logs";
const DEFAULT_DATASET: &str = "generic";
const DEFAULT_NAMESPACE: &str = "default";

/// Data stream with every field filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ResolvedDataStream {
    kind: String,
    dataset: String,
    namespace: String,
}

impl ResolvedDataStream {
    /// Stream-level fields win over input-level fields, then defaults.
    fn resolve(input: Option<&DataStream>, stream: Option<&DataStream>) -> Self {
        Self {
            kind: pick(input, stream, |ds| ds.kind.as_ref(), DEFAULT_DATA_STREAM_TYPE),
            dataset: pick(input, stream, |ds| ds.dataset.as_ref(), DEFAULT_DATASET),
            namespace: pick(input, stream, |ds| ds.namespace.as_ref(), DEFAULT_NAMESPACE),
        }
    }

    fn index(&self) -> String {
        format!("{}-{}-{}", self.kind, self.dataset, self.namespace)
    }
}

fn pick(
    input: Option<&DataStream>,
    stream: Option<&DataStream>,
    field: fn(&DataStream) -> Option<&String>,
    default: &str,
) -> String {
    stream
        .and_then(field)
        .or_else(|| input.and_then(field))
        .cloned()
        .unwrap_or_else(|| default.to_string())
}

/// Build the reload configurations for an input unit: one per stream, or a
/// single one from the input source when the unit has no streams.
pub fn generate_input_configs(
    raw: &UnitConfig,
    agent: &AgentInfo,
) -> Result<Vec<ConfigWithMeta>, TransformError> {
    if raw.kind.is_empty() {
        return Err(TransformError::MissingType("input"));
    }

    let mut base = raw.source.clone();
    base.remove("streams");

    if raw.streams.is_empty() {
        let data_stream = ResolvedDataStream::resolve(raw.data_stream.as_ref(), None);
        return Ok(vec![finish_config(raw, base, &raw.id, &data_stream, agent)?]);
    }

    raw.streams
        .iter()
        .map(|stream| {
            let mut merged = base.clone();
            for (key, value) in &stream.source {
                merged.insert(key.clone(), value.clone());
            }
            let id = if stream.id.is_empty() { &raw.id } else { &stream.id };
            let data_stream =
                ResolvedDataStream::resolve(raw.data_stream.as_ref(), stream.data_stream.as_ref());
            finish_config(raw, merged, id, &data_stream, agent)
        })
        .collect()
}

fn finish_config(
    raw: &UnitConfig,
    mut config: ConfigMap,
    id: &str,
    data_stream: &ResolvedDataStream,
    agent: &AgentInfo,
) -> Result<ConfigWithMeta, TransformError> {
    if !id.is_empty() {
        config.insert("id".into(), Value::String(id.to_string()));
    }
    config.insert("type".into(), Value::String(raw.kind.clone()));
    config
        .entry("index")
        .or_insert_with(|| Value::String(data_stream.index()));

    let mut processors = match config.remove("processors") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(list)) => list,
        Some(_) => return Err(TransformError::InvalidProcessors(id.to_string())),
    };
    processors.push(json!({
        "add_fields": {
            "target": "",
            "fields": {
                "agent": {
                    "id": agent.id,
                    "version": agent.version,
                    "snapshot": agent.snapshot,
                },
                "data_stream": {
                    "type": data_stream.kind,
                    "dataset": data_stream.dataset,
                    "namespace": data_stream.namespace,
                },
            },
        }
    }));
    config.insert("processors".into(), Value::Array(processors));

    Ok(ConfigWithMeta::new(config))
}
