pub mod ai;
pub mod config;
pub mod critic;
pub mod error;
pub mod media;
pub mod prompt;
pub mod state;

// Re-export main types for convenience
pub use ai::{CompletionService, OpenAIClient};
pub use config::{Config, Secrets};
pub use critic::{ConversationTurn, Critic};
pub use error::{CompletionError, ConfigError};
pub use media::{classify, Category};
pub use prompt::{Completion, CompletionRequest};
pub use state::{ChatMessage, ChatRole};
