use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role type for a transcript entry.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// User role.
    User,

    /// Assistant role.
    Assistant,
}

/// The role+content pair sent to the backend as conversation history.
///
/// This is the wire shape of a message: local-only fields (client id, error
/// flag) are stripped before a transcript crosses the network.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TranscriptEntry {
    /// The role of the message.
    pub role: MessageRole,

    /// The text content of the message.
    pub content: String,
}

impl TranscriptEntry {
    /// Create a new `TranscriptEntry` with the given role and content.
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// A message authored by the user.
#[derive(Debug, Clone, PartialEq)]
pub struct UserMessage {
    /// Client-generated unique identifier.
    pub id: Uuid,

    /// The text content of the message.
    pub content: String,
}

/// A message authored by the assistant, possibly flagged as an error
/// placeholder when a send failed.
#[derive(Debug, Clone, PartialEq)]
pub struct AssistantMessage {
    /// Client-generated unique identifier.
    pub id: Uuid,

    /// The text content of the message.
    pub content: String,

    /// True when this entry records a failed send rather than a real reply.
    pub error: bool,
}

/// A transcript message. Immutable once appended.
///
/// User and assistant messages are separate variants rather than a shared
/// shape with a role flag; only assistant messages can carry the error mark.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// A message from the user.
    User(UserMessage),

    /// A message from the assistant.
    Assistant(AssistantMessage),
}

impl Message {
    /// Create a new user message with a fresh client id.
    pub fn user(content: impl Into<String>) -> Self {
        Message::User(UserMessage {
            id: Uuid::new_v4(),
            content: content.into(),
        })
    }

    /// Create a new assistant message with a fresh client id.
    pub fn assistant(content: impl Into<String>) -> Self {
        Message::Assistant(AssistantMessage {
            id: Uuid::new_v4(),
            content: content.into(),
            error: false,
        })
    }

    /// Create a new error-flagged assistant message.
    pub fn error(content: impl Into<String>) -> Self {
        Message::Assistant(AssistantMessage {
            id: Uuid::new_v4(),
            content: content.into(),
            error: true,
        })
    }

    /// The client-generated identifier.
    pub fn id(&self) -> Uuid {
        match self {
            Message::User(m) => m.id,
            Message::Assistant(m) => m.id,
        }
    }

    /// The role of this message.
    pub fn role(&self) -> MessageRole {
        match self {
            Message::User(_) => MessageRole::User,
            Message::Assistant(_) => MessageRole::Assistant,
        }
    }

    /// The text content.
    pub fn content(&self) -> &str {
        match self {
            Message::User(m) => &m.content,
            Message::Assistant(m) => &m.content,
        }
    }

    /// True for an error-flagged assistant message.
    pub fn is_error(&self) -> bool {
        match self {
            Message::User(_) => false,
            Message::Assistant(m) => m.error,
        }
    }

    /// Strip local-only fields, producing the wire shape.
    pub fn to_entry(&self) -> TranscriptEntry {
        TranscriptEntry::new(self.role(), self.content())
    }
}
