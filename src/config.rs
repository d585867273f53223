//! Server configuration loading and validation

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::protocol::agent::{AgentCardOverride, AgentSkill};
use crate::protocol::error::{DispatchError, DispatchResult};

/// Server configuration
///
/// Loaded from a JSON file and optionally overridden by CLI flags. All
/// process-level knobs flow through this struct into the lifecycle
/// controller; nothing reads ambient environment state at runtime.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    /// Agent name, used in the capability descriptor and health report
    pub name: String,

    /// Human-readable agent description
    pub description: String,

    /// Agent implementation version
    pub version: String,

    /// Host interface to bind
    pub host: String,

    /// TCP port to bind
    pub port: u16,

    /// Optional per-request deadline for engine invocations, in seconds.
    /// Absent means no deadline is enforced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Skills advertised in the capability descriptor
    pub skills: Vec<AgentSkill>,

    /// Explicit capability descriptor overrides
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_card: Option<AgentCardOverride>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "a2a-agent".to_string(),
            description: "A2A workflow agent".to_string(),
            version: "0.1.0".to_string(),
            host: "0.0.0.0".to_string(),
            port: 5000,
            timeout_secs: None,
            skills: Vec::new(),
            agent_card: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from a JSON file.
    ///
    /// An unreadable file, invalid JSON, or a missing required field is a
    /// fatal [`DispatchError::Config`].
    pub fn from_file(path: impl AsRef<Path>) -> DispatchResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            DispatchError::Config(format!("cannot read {}: {e}", path.display()))
        })?;

        let config: ServerConfig = serde_json::from_str(&raw).map_err(|e| {
            DispatchError::Config(format!("invalid config {}: {e}", path.display()))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Check required fields.
    pub fn validate(&self) -> DispatchResult<()> {
        if self.name.trim().is_empty() {
            return Err(DispatchError::Config(
                "missing required field: name".to_string(),
            ));
        }
        Ok(())
    }

    /// The socket address string this server binds.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 5000);
        assert_eq!(config.host, "0.0.0.0");
        assert!(config.timeout_secs.is_none());
        assert!(config.agent_card.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bind_addr() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8081,
            ..ServerConfig::default()
        };
        assert_eq!(config.bind_addr(), "127.0.0.1:8081");
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: ServerConfig =
            serde_json::from_str(r#"{"name": "research-agent", "port": 7000}"#).unwrap();
        assert_eq!(config.name, "research-agent");
        assert_eq!(config.port, 7000);
        assert_eq!(config.version, "0.1.0");
    }

    #[test]
    fn test_agent_card_section_parses() {
        let config: ServerConfig = serde_json::from_str(
            r#"{
                "name": "x",
                "agentCard": {"protocolVersion": "0.9", "capabilities": {"streaming": true}}
            }"#,
        )
        .unwrap();

        let card = config.agent_card.unwrap();
        assert_eq!(card.protocol_version.as_deref(), Some("0.9"));
        assert!(card.capabilities.unwrap().streaming);
    }

    #[test]
    fn test_empty_name_rejected() {
        let config = ServerConfig {
            name: "  ".to_string(),
            ..ServerConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, DispatchError::Config(_)));
        assert!(err.to_string().contains("name"));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = ServerConfig::from_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, DispatchError::Config(_)));
        assert!(err.is_fatal());
    }
}
