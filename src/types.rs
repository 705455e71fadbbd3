use serde::{Deserialize, Serialize};

use crate::store::ContentRef;

/// A single instruction decoded from a model reply.
///
/// Exactly one variant is active per reply; `Invalid` carries the reason the
/// reply could not be turned into one of the four real actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Fetch {
        url: String,
    },
    Render {
        url: String,
        wait_for: Option<String>,
    },
    Extract {
        content_ref: ContentRef,
        selector: String,
    },
    Respond {
        content: String,
    },
    Invalid {
        reason: String,
    },
}

impl Action {
    /// Short tag used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Action::Fetch { .. } => "fetch",
            Action::Render { .. } => "render",
            Action::Extract { .. } => "extract",
            Action::Respond { .. } => "response",
            Action::Invalid { .. } => "invalid",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A message in the conversation history sent to the LLM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Append-only message history for one agent run.
///
/// Messages are never removed or rewritten, so the model always sees its
/// action/result history in chronological order.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    /// Seed a conversation with the system prompt and the user's query.
    pub fn seeded(system_prompt: &str, query: &str) -> Self {
        Self {
            messages: vec![ChatMessage::system(system_prompt), ChatMessage::user(query)],
        }
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub(crate) fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn into_messages(self) -> Vec<ChatMessage> {
        self.messages
    }
}

pub const MAX_STEPS_PER_QUERY: usize = 5;
pub const CLEANED_TEXT_MAX_CHARS: usize = 6000;
