//! Chat request and reply types for the model boundary.
//!
//! The core issues one synchronous request per attempt: role-tagged messages
//! plus a schema descriptor, and gets back a text payload. How the request is
//! transported is the model client's business.

use serde::{Deserialize, Serialize};

/// Unique identifier for one batch run.
///
/// Appears in every log line the driver emits so a run can be followed
/// through the rotating log.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub uuid::Uuid);

impl RunId {
    /// Create a new, unique run ID.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Who authored a chat message. Requests only ever carry the user turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
}

/// A single role-tagged message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// One request to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The conversation, oldest first.
    pub messages: Vec<ChatMessage>,
    /// JSON Schema of the expected record, passed to the model as its output
    /// format constraint.
    pub format: serde_json::Value,
}

/// The text the model returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelReply {
    pub content: String,
}

impl ModelReply {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// What to ask the model for.
///
/// The message sent is `preamble`, a newline, then `instructions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptSpec {
    /// Short lead-in, e.g. "Generate a character profile with the following traits:".
    pub preamble: String,
    /// The detailed layout and guidelines for the record.
    pub instructions: String,
}

impl PromptSpec {
    pub fn new(preamble: impl Into<String>, instructions: impl Into<String>) -> Self {
        Self {
            preamble: preamble.into(),
            instructions: instructions.into(),
        }
    }

    /// Render the single user message carried by every attempt.
    pub fn render(&self) -> String {
        format!("{}\n{}", self.preamble, self.instructions)
    }

    /// Build the chat request for this prompt and schema descriptor.
    pub fn to_request(&self, format: serde_json::Value) -> ChatRequest {
        ChatRequest {
            messages: vec![ChatMessage::user(self.render())],
            format,
        }
    }
}
