//! Message and History domain types.
//!
//! A conversation is an append-only sequence of messages. Entries are never
//! deleted, only filtered on read: when history is replayed into a new model
//! request, user turns made of typed content parts keep only their text
//! parts, so screenshots are sent once and never resent on later cycles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions (step prompt, tool-usage addendum)
    System,
    /// The operator or a step's user-message factory
    User,
    /// The model
    Assistant,
}

/// One typed part of a multimodal user message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// Plain text
    Text { text: String },
    /// An image as a data URI (e.g. `data:image/png;base64,...`)
    ImageUrl { image_url: String },
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn image(data_uri: impl Into<String>) -> Self {
        Self::ImageUrl {
            image_url: data_uri.into(),
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text { .. })
    }
}

/// Message content: a plain string or an ordered list of typed parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl MessageContent {
    /// The concatenated text of this content (image parts contribute nothing).
    pub fn as_text(&self) -> String {
        match self {
            Self::Text(t) => t.clone(),
            Self::Parts(parts) => parts
                .iter()
                .filter_map(|p| match p {
                    ContentPart::Text { text } => Some(text.as_str()),
                    ContentPart::ImageUrl { .. } => None,
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// A single message in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Who sent this message
    pub role: Role,

    /// The content
    pub content: MessageContent,
}

impl Message {
    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: MessageContent::Text(content.into()),
        }
    }

    /// Create a new plain-text user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Text(content.into()),
        }
    }

    /// Create a multimodal user message from content parts.
    pub fn user_parts(parts: Vec<ContentPart>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Parts(parts),
        }
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: MessageContent::Text(content.into()),
        }
    }
}

/// The ordered conversation log for one agent instance.
///
/// Append-only during a run. `reset` exists for configurations that clear
/// the conversation once a task terminates — callers must not assume history
/// survives a `finish`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct History {
    entries: Vec<Message>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message.
    pub fn push(&mut self, message: Message) {
        self.entries.push(message);
    }

    pub fn entries(&self) -> &[Message] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Project the log for replay into a new model request.
    ///
    /// User entries whose content is a part list keep only their text parts;
    /// everything else is passed through unchanged.
    pub fn replay(&self) -> Vec<Message> {
        self.entries
            .iter()
            .map(|m| match (&m.role, &m.content) {
                (Role::User, MessageContent::Parts(parts)) => Message {
                    role: Role::User,
                    content: MessageContent::Parts(
                        parts.iter().filter(|p| p.is_text()).cloned().collect(),
                    ),
                },
                _ => m.clone(),
            })
            .collect()
    }

    /// Clear the log.
    pub fn reset(&mut self) {
        self.entries.clear();
    }
}

/// A serialized run record, written to disk on terminal completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    /// Unique id for this run
    pub run_id: Uuid,

    /// The task the agent was driving toward
    pub task: String,

    /// When the terminal tool fired
    pub completed_at: DateTime<Utc>,

    /// The full (unprojected) message history
    pub messages: Vec<Message>,
}

impl Transcript {
    pub fn new(run_id: Uuid, task: impl Into<String>, history: &History) -> Self {
        Self {
            run_id,
            task: task.into(),
            completed_at: Utc::now(),
            messages: history.entries().to_vec(),
        }
    }
}
