use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::persona::INITIAL_GREETING;

/// Opaque, never-reused identity of a transcript message.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(Uuid);

impl MessageId {
    /// Generates a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who authored a message.
///
/// The serialized names are the role strings the Gemini API expects.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person typing.
    User,

    /// The language model.
    Model,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Model => write!(f, "model"),
        }
    }
}

/// A single entry in the transcript.
///
/// The role is fixed at creation.  Only model messages change afterwards, as
/// streamed text accumulates or a failure replaces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    id: MessageId,
    role: Role,
    /// The message text.
    pub text: String,
    /// Whether the text describes a local failure rather than conversation content.
    #[serde(default)]
    pub is_error: bool,
}

impl Message {
    /// Create a new message with a fresh id.
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            role,
            text: text.into(),
            is_error: false,
        }
    }

    /// Create a new user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    /// Create a new model message.
    pub fn model(text: impl Into<String>) -> Self {
        Self::new(Role::Model, text)
    }

    /// Create the empty model message that a streamed response fills in.
    pub fn placeholder() -> Self {
        Self::model("")
    }

    /// Create the greeting that opens every conversation.
    pub fn greeting() -> Self {
        Self::model(INITIAL_GREETING)
    }

    /// The message identity.
    pub fn id(&self) -> MessageId {
        self.id
    }

    /// The message author.
    pub fn role(&self) -> Role {
        self.role
    }

    /// True for messages whose text may still change.
    pub fn is_mutable(&self) -> bool {
        self.role == Role::Model
    }
}
