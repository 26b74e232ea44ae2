//! UI-agnostic display payloads
//!
//! The orchestrator produces these and the hosting UI renders them. Nothing
//! here is fed back into later prompts.

use crate::prompt::WELCOME_MESSAGE;

/// A rendered message in the conversation window
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// Who a message is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Critic,
    System,
    Error,
}

impl ChatRole {
    pub fn author(&self) -> &'static str {
        match self {
            ChatRole::User => "You",
            ChatRole::Critic => "CritiqueAI",
            ChatRole::System => "system",
            ChatRole::Error => "error",
        }
    }
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Shown once when a session starts.
    pub fn greeting() -> Self {
        Self::new(ChatRole::Critic, WELCOME_MESSAGE)
    }

    pub fn error(err: &dyn std::fmt::Display) -> Self {
        Self::new(ChatRole::Error, format!("⚠️ {}", err))
    }
}
