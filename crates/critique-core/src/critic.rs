//! Per-turn completion orchestration.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::ai::CompletionService;
use crate::error::{CompletionError, CompletionResult};
use crate::media::{classify, Category};
use crate::prompt::CompletionRequest;
use crate::state::{ChatMessage, ChatRole};

/// One finished exchange. Built from a single completion and thrown away once
/// its two display messages have been produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationTurn {
    pub input: String,
    pub category: Category,
    pub model: String,
    pub reply: String,
    pub total_tokens: Option<u64>,
    pub elapsed_secs: f64,
}

impl ConversationTurn {
    pub fn critique_message(&self) -> ChatMessage {
        let icon = self.category.icon();
        ChatMessage::new(
            ChatRole::Critic,
            format!("{icon} **CRITIQUE** {icon}\n\n{}", self.reply),
        )
    }

    pub fn analytics_message(&self) -> ChatMessage {
        let tokens = self
            .total_tokens
            .map(|t| t.to_string())
            .unwrap_or_else(|| "?".to_string());
        ChatMessage::new(
            ChatRole::System,
            format!(
                "**Model**: {} | **Tokens**: {} | **Response Time**: {:.2}s",
                self.model, tokens, self.elapsed_secs
            ),
        )
    }

    /// Critique first, analytics second.
    pub fn into_messages(self) -> [ChatMessage; 2] {
        [self.critique_message(), self.analytics_message()]
    }
}

#[derive(Clone)]
pub struct Critic {
    service: Arc<dyn CompletionService>,
    model: String,
    deadline: Option<Duration>,
}

impl Critic {
    pub fn new(service: Arc<dyn CompletionService>, model: &str) -> Self {
        Self {
            service,
            model: model.to_string(),
            deadline: None,
        }
    }

    /// Fail the turn if the completion service hasn't answered within `deadline`.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn set_model(&mut self, model: &str) {
        self.model = model.to_string();
    }

    /// Run one turn: classify, ask the completion service once, time it.
    pub async fn critique(&self, text: &str) -> CompletionResult<ConversationTurn> {
        let start = Instant::now();

        let category = classify(text);
        debug!(category = %category, "classified message");

        let request = CompletionRequest::critique(&self.model, text);
        let result = match self.deadline {
            Some(deadline) => tokio::time::timeout(deadline, self.service.complete(&request))
                .await
                .unwrap_or_else(|_| Err(CompletionError::Deadline(deadline.as_secs()))),
            None => self.service.complete(&request).await,
        };

        let completion = match result {
            Ok(completion) => completion,
            Err(e) => {
                warn!(category = %category, error = %e, "completion failed");
                return Err(e);
            }
        };

        let elapsed_secs = round_secs(start.elapsed());
        info!(
            category = %category,
            tokens = ?completion.total_tokens,
            served_by = ?completion.model,
            elapsed_secs,
            "critique ready"
        );

        Ok(ConversationTurn {
            input: text.to_string(),
            category,
            model: self.model.clone(),
            reply: completion.content,
            total_tokens: completion.total_tokens,
            elapsed_secs,
        })
    }
}

fn round_secs(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::{Completion, PromptRole, SYSTEM_PROMPT};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records the last request and replays a canned result.
    struct FakeService {
        reply: fn() -> CompletionResult<Completion>,
        delay: Option<Duration>,
        seen: Mutex<Vec<CompletionRequest>>,
    }

    impl FakeService {
        fn new(reply: fn() -> CompletionResult<Completion>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                delay: None,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl CompletionService for FakeService {
        async fn complete(&self, request: &CompletionRequest) -> CompletionResult<Completion> {
            self.seen.lock().unwrap().push(request.clone());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            (self.reply)()
        }
    }

    fn ok_with_usage() -> CompletionResult<Completion> {
        Ok(Completion {
            content: "Dreams within dreams, within budget. 8/10".to_string(),
            total_tokens: Some(321),
            model: None,
        })
    }

    fn ok_without_usage() -> CompletionResult<Completion> {
        Ok(Completion {
            content: "Meh.".to_string(),
            total_tokens: None,
            model: None,
        })
    }

    fn rate_limited() -> CompletionResult<Completion> {
        Err(CompletionError::RateLimited {
            body: "slow down".to_string(),
        })
    }

    #[tokio::test]
    async fn movie_question_end_to_end() {
        let service = FakeService::new(ok_with_usage);
        let critic = Critic::new(service.clone(), "gpt-3.5-turbo");

        let turn = critic.critique("Can you review the movie Inception?").await.unwrap();
        assert_eq!(turn.category, Category::Movies);

        let [critique, analytics] = turn.into_messages();
        assert_eq!(critique.role, ChatRole::Critic);
        assert_eq!(
            critique.content,
            "🎬 **CRITIQUE** 🎬\n\nDreams within dreams, within budget. 8/10"
        );

        assert_eq!(analytics.role, ChatRole::System);
        assert!(analytics
            .content
            .starts_with("**Model**: gpt-3.5-turbo | **Tokens**: 321 | **Response Time**: "));
        assert!(analytics.content.ends_with('s'));

        let seen = service.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].messages[0].role, PromptRole::System);
        assert_eq!(seen[0].messages[0].content, SYSTEM_PROMPT);
        assert_eq!(seen[0].messages[1].content, "Can you review the movie Inception?");
    }

    #[tokio::test]
    async fn missing_usage_shows_question_mark() {
        let critic = Critic::new(FakeService::new(ok_without_usage), "gpt-3.5-turbo");
        let turn = critic.critique("What do you think of silence?").await.unwrap();
        assert_eq!(turn.category, Category::General);
        assert!(turn.critique_message().content.starts_with("🔍 **CRITIQUE** 🔍"));
        assert!(turn.analytics_message().content.contains("**Tokens**: ? |"));
    }

    #[tokio::test]
    async fn analytics_names_configured_model_not_served_one() {
        fn served_by_snapshot() -> CompletionResult<Completion> {
            Ok(Completion {
                content: "Fine.".to_string(),
                total_tokens: Some(7),
                model: Some("gpt-3.5-turbo-0125".to_string()),
            })
        }
        let critic = Critic::new(FakeService::new(served_by_snapshot), "gpt-3.5-turbo");
        let turn = critic.critique("a book").await.unwrap();
        assert_eq!(turn.input, "a book");
        assert!(turn.analytics_message().content.starts_with("**Model**: gpt-3.5-turbo |"));
    }

    #[tokio::test]
    async fn elapsed_time_is_non_negative_and_rounded() {
        let critic = Critic::new(FakeService::new(ok_with_usage), "gpt-3.5-turbo");
        let turn = critic.critique("a song").await.unwrap();
        assert!(turn.elapsed_secs >= 0.0);
        assert_eq!(turn.elapsed_secs, (turn.elapsed_secs * 100.0).round() / 100.0);
    }

    #[tokio::test]
    async fn failure_is_returned_once_without_a_turn() {
        let service = FakeService::new(rate_limited);
        let critic = Critic::new(service.clone(), "gpt-3.5-turbo");
        let err = critic.critique("the album").await.unwrap_err();
        assert!(matches!(err, CompletionError::RateLimited { .. }));
        assert_eq!(service.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn prompts_do_not_carry_history() {
        let service = FakeService::new(ok_with_usage);
        let critic = Critic::new(service.clone(), "gpt-3.5-turbo");
        critic.critique("first").await.unwrap();
        critic.critique("second").await.unwrap();

        let seen = service.seen.lock().unwrap();
        assert_eq!(seen[1].messages.len(), 2);
        assert_eq!(seen[1].messages[1].content, "second");
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_fails_fast() {
        let service = Arc::new(FakeService {
            reply: ok_with_usage,
            delay: Some(Duration::from_secs(30)),
            seen: Mutex::new(Vec::new()),
        });
        let critic =
            Critic::new(service, "gpt-3.5-turbo").with_deadline(Duration::from_secs(5));
        let err = critic.critique("a film").await.unwrap_err();
        assert!(matches!(err, CompletionError::Deadline(5)));
    }

    #[test]
    fn analytics_line_format() {
        let turn = ConversationTurn {
            input: "x".to_string(),
            category: Category::Books,
            model: "gpt-3.5-turbo".to_string(),
            reply: "r".to_string(),
            total_tokens: Some(42),
            elapsed_secs: 1.5,
        };
        assert_eq!(
            turn.analytics_message().content,
            "**Model**: gpt-3.5-turbo | **Tokens**: 42 | **Response Time**: 1.50s"
        );
    }

    #[test]
    fn rounding_to_hundredths() {
        assert_eq!(round_secs(Duration::from_millis(1234)), 1.23);
        assert_eq!(round_secs(Duration::from_millis(1236)), 1.24);
        assert_eq!(round_secs(Duration::ZERO), 0.0);
    }
}
