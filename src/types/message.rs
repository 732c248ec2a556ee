//! Message types for chat transcripts.
//!
//! Messages use the OpenAI chat-completions wire shape, so a transcript can be
//! deserialized straight from a request body and serialized back untouched.
//! Keys the types do not model (`cache_control`, `reasoning_content`, provider
//! extensions) are kept in `extra` maps and written back as they came in.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};

/// A single transcript turn, tagged by role.
///
/// `tool_calls` only exists on assistant turns and `tool_call_id` only on
/// tool turns. A record without a `role` fails to deserialize.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Message {
    System {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<MessageContent>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(flatten)]
        extra: Map<String, Value>,
    },
    User {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<MessageContent>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(flatten)]
        extra: Map<String, Value>,
    },
    Assistant {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<MessageContent>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tool_calls: Option<Vec<ToolCall>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(flatten)]
        extra: Map<String, Value>,
    },
    Tool {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<MessageContent>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tool_call_id: Option<String>,
        #[serde(flatten)]
        extra: Map<String, Value>,
    },
}

impl Message {
    /// Create a system message.
    pub fn system(text: impl Into<String>) -> Self {
        Self::System {
            content: Some(MessageContent::Text(text.into())),
            name: None,
            extra: Map::new(),
        }
    }

    /// Create a user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self::User {
            content: Some(MessageContent::Text(text.into())),
            name: None,
            extra: Map::new(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::Assistant {
            content: Some(MessageContent::Text(text.into())),
            tool_calls: None,
            name: None,
            extra: Map::new(),
        }
    }

    /// Create an assistant message that requests tool execution.
    pub fn assistant_with_tool_calls(text: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self::Assistant {
            content: Some(MessageContent::Text(text.into())),
            tool_calls: Some(tool_calls),
            name: None,
            extra: Map::new(),
        }
    }

    /// Create a tool result message.
    pub fn tool(tool_call_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::Tool {
            content: Some(MessageContent::Text(text.into())),
            tool_call_id: Some(tool_call_id.into()),
            extra: Map::new(),
        }
    }

    /// The empty assistant turn inserted between a tool result and a user turn.
    pub fn synthetic_assistant() -> Self {
        Self::assistant("")
    }

    pub fn role(&self) -> Role {
        match self {
            Self::System { .. } => Role::System,
            Self::User { .. } => Role::User,
            Self::Assistant { .. } => Role::Assistant,
            Self::Tool { .. } => Role::Tool,
        }
    }

    pub fn content(&self) -> Option<&MessageContent> {
        match self {
            Self::System { content, .. }
            | Self::User { content, .. }
            | Self::Assistant { content, .. }
            | Self::Tool { content, .. } => content.as_ref(),
        }
    }

    /// Extract the text content, concatenating all text parts.
    pub fn text(&self) -> String {
        self.content().map(MessageContent::text).unwrap_or_default()
    }

    /// Whether the message carries any non-empty content.
    pub fn has_content(&self) -> bool {
        self.content().is_some_and(|content| !content.is_empty())
    }

    /// Tool calls requested by this message (always empty for non-assistant turns).
    pub fn tool_calls(&self) -> &[ToolCall] {
        match self {
            Self::Assistant {
                tool_calls: Some(calls),
                ..
            } => calls,
            _ => &[],
        }
    }

    /// An assistant turn that still waits for at least one tool result.
    pub fn has_pending_tool_calls(&self) -> bool {
        !self.tool_calls().is_empty()
    }

    pub fn tool_call_id(&self) -> Option<&str> {
        match self {
            Self::Tool { tool_call_id, .. } => tool_call_id.as_deref(),
            _ => None,
        }
    }

    /// Wire fields not modelled by this type.
    pub fn extra(&self) -> &Map<String, Value> {
        match self {
            Self::System { extra, .. }
            | Self::User { extra, .. }
            | Self::Assistant { extra, .. }
            | Self::Tool { extra, .. } => extra,
        }
    }

    pub fn extra_mut(&mut self) -> &mut Map<String, Value> {
        match self {
            Self::System { extra, .. }
            | Self::User { extra, .. }
            | Self::Assistant { extra, .. }
            | Self::Tool { extra, .. } => extra,
        }
    }
}

/// Conversation role.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// Message content: a plain string or a list of typed parts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl MessageContent {
    pub fn text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Parts(parts) => parts
                .iter()
                .filter_map(|part| match part {
                    ContentPart::Text { text, .. } => Some(text.as_str()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join(""),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::Parts(parts) => parts.is_empty(),
        }
    }
}

impl From<String> for MessageContent {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for MessageContent {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// A single part of structured message content.
///
/// Part types without a dedicated variant (`document`, `thinking`,
/// `refusal`, ...) are carried verbatim in [`ContentPart::Other`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text {
        text: String,
        #[serde(flatten)]
        extra: Map<String, Value>,
    },
    ImageUrl {
        image_url: ImageUrl,
        #[serde(flatten)]
        extra: Map<String, Value>,
    },
    InputAudio {
        input_audio: Value,
    },
    File {
        file: Value,
    },
    #[serde(untagged)]
    Other(Value),
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            extra: Map::new(),
        }
    }

    /// The `type` tag of this part, if it has one.
    pub fn kind(&self) -> Option<&str> {
        match self {
            Self::Text { .. } => Some("text"),
            Self::ImageUrl { .. } => Some("image_url"),
            Self::InputAudio { .. } => Some("input_audio"),
            Self::File { .. } => Some("file"),
            Self::Other(value) => value.get("type").and_then(Value::as_str),
        }
    }
}

/// Image reference embedded in a content part.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageUrl {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A tool invocation requested by an assistant turn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type", default = "default_tool_call_type")]
    pub kind: String,
    pub function: FunctionCall,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ToolCall {
    /// Create a function tool call with JSON-encoded arguments.
    pub fn function(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind: default_tool_call_type(),
            function: FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            },
            extra: Map::new(),
        }
    }
}

/// Function name and raw argument payload of a tool call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub arguments: String,
}

fn default_tool_call_type() -> String {
    "function".to_string()
}
