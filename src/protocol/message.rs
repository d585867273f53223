//! A2A message types and wire-format normalization

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// A message exchanged with the dispatcher
///
/// Messages are the unit of communication on both wire surfaces. Each message
/// carries a role (defaulting to `user` for inbound payloads that omit it),
/// one or more parts, and optional correlation identifiers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// Role of the message sender
    #[serde(default)]
    pub role: Role,

    /// Message content parts
    #[serde(default)]
    pub parts: Vec<Part>,

    /// Optional message identifier
    #[serde(rename = "messageId", default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,

    /// Optional context identifier (for multi-turn conversations)
    #[serde(rename = "contextId", default, skip_serializing_if = "Option::is_none")]
    pub context_id: Option<String>,

    /// Optional task identifier
    #[serde(rename = "taskId", default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
}

impl Message {
    /// Create a new message with text content
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            parts: vec![Part::text(text)],
            message_id: None,
            context_id: None,
            task_id: None,
        }
    }

    /// Create a user message with text content
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    /// Create an agent message with text content
    pub fn agent(text: impl Into<String>) -> Self {
        Self::new(Role::Agent, text)
    }

    /// Set the message ID
    pub fn with_message_id(mut self, id: impl Into<String>) -> Self {
        self.message_id = Some(id.into());
        self
    }

    /// Set the context ID
    pub fn with_context_id(mut self, id: impl Into<String>) -> Self {
        self.context_id = Some(id.into());
        self
    }

    /// Extract the textual content of this message.
    ///
    /// Concatenates all text parts in order, space-joined, then trims the
    /// result. Non-text parts are skipped.
    pub fn text_content(&self) -> String {
        let joined = self
            .parts
            .iter()
            .filter_map(Part::as_text)
            .collect::<Vec<_>>()
            .join(" ");
        joined.trim().to_string()
    }
}

/// Role of a message sender
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Message from a user
    #[default]
    User,

    /// Message from an AI agent
    Agent,
}

/// File content for file parts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FileContent {
    /// MIME type of the file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,

    /// Name of the file
    pub name: String,

    /// URI reference to the file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_with_uri: Option<String>,

    /// Base64-encoded file content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_with_bytes: Option<String>,
}

/// A part of a message, discriminated by the canonical `kind` field
///
/// Inbound payloads may use the legacy `type` field instead of `kind`; the
/// two are reconciled once, here, during deserialization. Parts with an
/// unrecognized or missing discriminant are preserved verbatim and ignored
/// by text extraction.
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    /// Text content
    Text {
        /// The text content
        text: String,
    },

    /// File reference
    File {
        /// File content
        file: FileContent,
    },

    /// Structured data
    Data {
        /// The structured data
        data: Value,
    },

    /// A part of an unrecognized kind, carried through untouched
    Unknown(Value),
}

impl Part {
    /// Create a text part
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Create a data part
    pub fn data(data: Value) -> Self {
        Self::Data { data }
    }

    /// The text of this part, if it is a text part
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Part::Text { text } => Some(text),
            _ => None,
        }
    }

    /// Normalize a raw JSON value into a part.
    ///
    /// Accepts both `kind` (canonical) and `type` (legacy) discriminants.
    fn from_value(value: Value) -> Self {
        let kind = value
            .get("kind")
            .or_else(|| value.get("type"))
            .and_then(Value::as_str);

        match kind {
            Some("text") => {
                if let Some(text) = value.get("text").and_then(Value::as_str) {
                    return Part::Text {
                        text: text.to_string(),
                    };
                }
                Part::Unknown(value)
            }
            Some("file") => {
                if let Some(file) = value.get("file") {
                    if let Ok(file) = serde_json::from_value::<FileContent>(file.clone()) {
                        return Part::File { file };
                    }
                }
                Part::Unknown(value)
            }
            Some("data") => {
                if let Some(data) = value.get("data") {
                    return Part::Data { data: data.clone() };
                }
                Part::Unknown(value)
            }
            _ => Part::Unknown(value),
        }
    }
}

impl Serialize for Part {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Part::Text { text } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("kind", "text")?;
                map.serialize_entry("text", text)?;
                map.end()
            }
            Part::File { file } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("kind", "file")?;
                map.serialize_entry("file", file)?;
                map.end()
            }
            Part::Data { data } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("kind", "data")?;
                map.serialize_entry("data", data)?;
                map.end()
            }
            Part::Unknown(value) => value.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Part {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Part::from_value(value))
    }
}
