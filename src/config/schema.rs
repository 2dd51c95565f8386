//! Configuration schema definitions.

use serde::{Deserialize, Serialize};

use crate::client::AgentInfo;

/// Root of the configuration file.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Settings {
    pub management: ManagementConfig,
}

/// Control-plane management settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ManagementConfig {
    /// Run under control-plane management.
    pub enabled: bool,

    /// Default log filter when `RUST_LOG` is unset.
    pub log_level: String,

    /// Identity reported to inputs.
    pub agent: AgentIdentity,
}

impl Default for ManagementConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_level: "info".to_string(),
            agent: AgentIdentity::default(),
        }
    }
}

/// Identity of the supervising agent.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AgentIdentity {
    /// Agent ID; generated at startup when absent.
    pub id: Option<String>,

    pub version: String,

    pub snapshot: bool,
}

impl Default for AgentIdentity {
    fn default() -> Self {
        Self {
            id: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
            snapshot: false,
        }
    }
}

impl AgentIdentity {
    /// Resolve into agent info, generating an ID when none is configured.
    pub fn to_agent_info(&self) -> AgentInfo {
        AgentInfo {
            id: self
                .id
                .clone()
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            version: self.version.clone(),
            snapshot: self.snapshot,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings: Settings = toml::from_str("").unwrap();
        assert!(!settings.management.enabled);
        assert_eq!(settings.management.log_level, "info");
        assert!(settings.management.agent.id.is_none());
    }

    #[test]
    fn test_agent_id_generated_once_missing() {
        let identity = AgentIdentity::default();
        let info = identity.to_agent_info();
        assert!(uuid::Uuid::parse_str(&info.id).is_ok());

        let fixed = AgentIdentity {
            id: Some("agent-1".into()),
            ..Default::default()
        };
        assert_eq!(fixed.to_agent_info().id, "agent-1");
    }
}
