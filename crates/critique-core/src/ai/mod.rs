pub mod openai;

pub use openai::OpenAIClient;

use async_trait::async_trait;

use crate::error::CompletionResult;
use crate::prompt::{Completion, CompletionRequest};

/// A hosted chat-completion backend.
///
/// The orchestrator only needs one request/response cycle per turn, so the
/// interface is a single call. Transport, auth and rate-limit failures all come
/// back as a `CompletionError`.
#[async_trait]
pub trait CompletionService: Send + Sync + 'static {
    async fn complete(&self, request: &CompletionRequest) -> CompletionResult<Completion>;
}
