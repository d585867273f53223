//! Agent discovery and capability types

use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::ServerConfig;

/// Protocol version advertised when configuration does not override it.
pub const DEFAULT_PROTOCOL_VERSION: &str = "1.0";

/// Input/output MIME modes advertised when configuration omits them.
pub const DEFAULT_MODES: &[&str] = &["text/plain"];

/// Agent Card for agent discovery
///
/// Published at `/.well-known/agent.json` and returned by the
/// `agent/getAuthenticatedExtendedCard` JSON-RPC method. Built once at
/// startup from configuration; immutable for the life of the process.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentCard {
    /// Name of the agent
    pub name: String,

    /// Human-readable description of the agent
    pub description: String,

    /// A2A protocol version this server speaks
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,

    /// Agent implementation version
    pub version: String,

    /// Base URL callers should use to reach this agent
    pub url: Url,

    /// MIME types accepted as input
    #[serde(rename = "defaultInputModes")]
    pub default_input_modes: Vec<String>,

    /// MIME types produced as output
    #[serde(rename = "defaultOutputModes")]
    pub default_output_modes: Vec<String>,

    /// Agent capability flags
    pub capabilities: AgentCapabilities,

    /// Skills this agent advertises
    #[serde(default)]
    pub skills: Vec<AgentSkill>,
}

impl AgentCard {
    /// Build the card from configuration.
    ///
    /// Pure and infallible: an explicit `agentCard` section in configuration
    /// wins field-by-field over a default synthesized from the top-level
    /// name/description/version and the bound port.
    pub fn build(config: &ServerConfig, port: u16) -> AgentCard {
        let over = config.agent_card.as_ref();

        AgentCard {
            name: over
                .and_then(|c| c.name.clone())
                .unwrap_or_else(|| config.name.clone()),
            description: over
                .and_then(|c| c.description.clone())
                .unwrap_or_else(|| config.description.clone()),
            protocol_version: over
                .and_then(|c| c.protocol_version.clone())
                .unwrap_or_else(|| DEFAULT_PROTOCOL_VERSION.to_string()),
            version: over
                .and_then(|c| c.version.clone())
                .unwrap_or_else(|| config.version.clone()),
            url: over
                .and_then(|c| c.url.clone())
                .unwrap_or_else(|| default_url(port)),
            default_input_modes: over
                .and_then(|c| c.default_input_modes.clone())
                .unwrap_or_else(default_modes),
            default_output_modes: over
                .and_then(|c| c.default_output_modes.clone())
                .unwrap_or_else(default_modes),
            capabilities: over
                .and_then(|c| c.capabilities.clone())
                .unwrap_or_default(),
            skills: over
                .and_then(|c| c.skills.clone())
                .unwrap_or_else(|| config.skills.clone()),
        }
    }
}

/// Optional `agentCard` section of the configuration file
///
/// Every field is optional; present fields override the synthesized default.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AgentCardOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(
        rename = "protocolVersion",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub protocol_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<Url>,

    #[serde(
        rename = "defaultInputModes",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub default_input_modes: Option<Vec<String>>,

    #[serde(
        rename = "defaultOutputModes",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub default_output_modes: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<AgentCapabilities>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<AgentSkill>>,
}

/// Agent capability flags
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgentCapabilities {
    /// Supports streaming responses
    #[serde(default)]
    pub streaming: bool,

    /// Supports push notifications via webhooks
    #[serde(rename = "pushNotifications", default)]
    pub push_notifications: bool,

    /// Retains task state transition history
    #[serde(rename = "stateTransitionHistory", default = "default_true")]
    pub state_transition_history: bool,
}

impl Default for AgentCapabilities {
    fn default() -> Self {
        Self {
            streaming: false,
            push_notifications: false,
            state_transition_history: true,
        }
    }
}

/// A skill advertised in the agent card
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgentSkill {
    /// Unique identifier of the skill
    pub id: String,

    /// Human-readable name
    pub name: String,

    /// What the skill does
    #[serde(default)]
    pub description: String,

    /// Free-form discovery tags
    #[serde(default)]
    pub tags: Vec<String>,
}

fn default_true() -> bool {
    true
}

fn default_modes() -> Vec<String> {
    DEFAULT_MODES.iter().map(|m| m.to_string()).collect()
}

fn default_url(port: u16) -> Url {
    // The literal shape is parseable for every u16 port.
    format!("http://localhost:{port}/")
        .parse()
        .expect("default agent url")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_from_defaults() {
        let config = ServerConfig {
            name: "Test Agent".to_string(),
            description: "A test agent".to_string(),
            version: "2.0.0".to_string(),
            ..ServerConfig::default()
        };

        let card = AgentCard::build(&config, 8080);

        assert_eq!(card.name, "Test Agent");
        assert_eq!(card.description, "A test agent");
        assert_eq!(card.version, "2.0.0");
        assert_eq!(card.protocol_version, DEFAULT_PROTOCOL_VERSION);
        assert_eq!(card.url.as_str(), "http://localhost:8080/");
        assert_eq!(card.default_input_modes, vec!["text/plain"]);
        assert_eq!(card.default_output_modes, vec!["text/plain"]);
        assert!(!card.capabilities.streaming);
        assert!(!card.capabilities.push_notifications);
        assert!(card.capabilities.state_transition_history);
        assert!(card.skills.is_empty());
    }

    #[test]
    fn test_explicit_card_wins_field_by_field() {
        let config = ServerConfig {
            name: "Fallback Name".to_string(),
            agent_card: Some(AgentCardOverride {
                name: Some("Override Name".to_string()),
                url: Some("https://agent.example.com/".parse().unwrap()),
                default_input_modes: Some(vec!["application/json".to_string()]),
                ..AgentCardOverride::default()
            }),
            ..ServerConfig::default()
        };

        let card = AgentCard::build(&config, 8080);

        // Overridden fields come from the explicit card
        assert_eq!(card.name, "Override Name");
        assert_eq!(card.url.as_str(), "https://agent.example.com/");
        assert_eq!(card.default_input_modes, vec!["application/json"]);

        // Omitted fields still fall back per-field
        assert_eq!(card.description, config.description);
        assert_eq!(card.protocol_version, DEFAULT_PROTOCOL_VERSION);
        assert_eq!(card.default_output_modes, vec!["text/plain"]);
        assert!(card.capabilities.state_transition_history);
    }

    #[test]
    fn test_card_serialization_field_names() {
        let card = AgentCard::build(&ServerConfig::default(), 4000);
        let json = serde_json::to_value(&card).unwrap();

        assert!(json.get("protocolVersion").is_some());
        assert!(json.get("defaultInputModes").is_some());
        assert!(json.get("defaultOutputModes").is_some());
        assert_eq!(json["capabilities"]["streaming"], false);
        assert_eq!(json["capabilities"]["pushNotifications"], false);
        assert_eq!(json["capabilities"]["stateTransitionHistory"], true);
    }

    #[test]
    fn test_capabilities_deserialization_defaults() {
        let caps: AgentCapabilities = serde_json::from_str("{}").unwrap();
        assert!(!caps.streaming);
        assert!(!caps.push_notifications);
        assert!(caps.state_transition_history);
    }
}
