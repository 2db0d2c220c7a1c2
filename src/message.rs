//! Chat log entries.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind tag of a [`ChatMessage`], without its content.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    User,
    Bot,
    Sources,
    Loading,
}

/// Tagged content of a chat message.
///
/// Two bodies are equal when both kind and content match; the reconciler's
/// duplicate check relies on this.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "lowercase")]
pub enum MessageBody {
    User(String),
    Bot(String),
    /// Source URLs backing the preceding bot answer.
    Sources(Vec<String>),
    /// Placeholder shown while an answer is pending.
    Loading(String),
}

impl MessageBody {
    #[must_use]
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::User(_) => MessageKind::User,
            Self::Bot(_) => MessageKind::Bot,
            Self::Sources(_) => MessageKind::Sources,
            Self::Loading(_) => MessageKind::Loading,
        }
    }
}

/// A single entry in the chat log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Stable render key. Freshly generated for every message, never reused.
    pub id: Uuid,
    #[serde(flatten)]
    pub body: MessageBody,
}

impl ChatMessage {
    #[must_use]
    pub fn new(body: MessageBody) -> Self {
        Self { id: Uuid::new_v4(), body }
    }

    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(MessageBody::User(text.into()))
    }

    #[must_use]
    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(MessageBody::Bot(text.into()))
    }

    #[must_use]
    pub fn sources(urls: Vec<String>) -> Self {
        Self::new(MessageBody::Sources(urls))
    }

    #[must_use]
    pub fn loading(text: impl Into<String>) -> Self {
        Self::new(MessageBody::Loading(text.into()))
    }

    #[must_use]
    pub fn kind(&self) -> MessageKind {
        self.body.kind()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.kind() == MessageKind::Loading
    }

    /// Text content, or `None` for a sources message.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match &self.body {
            MessageBody::User(text) | MessageBody::Bot(text) | MessageBody::Loading(text) => Some(text.as_str()),
            MessageBody::Sources(_) => None,
        }
    }
}

#[cfg(test)]
#[path = "message_test.rs"]
mod tests;
