use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::ai::CompletionService;
use crate::error::{CompletionError, CompletionResult};
use crate::prompt::{Completion, CompletionRequest};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

#[derive(Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct OpenAIUsage {
    total_tokens: Option<u64>,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    choices: Vec<OpenAIChoice>,
    usage: Option<OpenAIUsage>,
    model: Option<String>,
}

#[derive(Clone)]
pub struct OpenAIClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAIClient {
    pub fn new(api_key: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point the client at another OpenAI-compatible endpoint.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn query(&self, request: &CompletionRequest) -> CompletionResult<Completion> {
        let url = format!("{}/chat/completions", self.base_url);
        debug!(model = %request.model, url = %url, "sending chat completion request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            return Err(CompletionError::from_status(status, text));
        }

        let body = response.text().await?;
        let openai_response: OpenAIResponse = serde_json::from_str(&body)?;

        let content = openai_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(CompletionError::EmptyResponse)?;

        Ok(Completion {
            content,
            total_tokens: openai_response.usage.and_then(|u| u.total_tokens),
            model: openai_response.model,
        })
    }

    pub fn list_models() -> Vec<String> {
        vec![
            "gpt-3.5-turbo".to_string(),
            "gpt-4o-mini".to_string(),
            "gpt-4o".to_string(),
            "gpt-4-turbo".to_string(),
        ]
    }
}

#[async_trait]
impl CompletionService for OpenAIClient {
    async fn complete(&self, request: &CompletionRequest) -> CompletionResult<Completion> {
        self.query(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> OpenAIClient {
        OpenAIClient::new("sk-test").with_base_url(&server.uri())
    }

    #[tokio::test]
    async fn sends_two_message_prompt_and_reads_usage() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "gpt-3.5-turbo",
                "max_tokens": 500,
                "messages": [
                    {"role": "system"},
                    {"role": "user", "content": "Review Heat"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "gpt-3.5-turbo-0125",
                "choices": [{"message": {"role": "assistant", "content": "A taut thriller."}}],
                "usage": {"prompt_tokens": 120, "completion_tokens": 30, "total_tokens": 150}
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let request = CompletionRequest::critique("gpt-3.5-turbo", "Review Heat");
        let completion = client_for(&mock_server).query(&request).await.unwrap();

        assert_eq!(completion.content, "A taut thriller.");
        assert_eq!(completion.total_tokens, Some(150));
        assert_eq!(completion.model.as_deref(), Some("gpt-3.5-turbo-0125"));
    }

    #[tokio::test]
    async fn missing_usage_is_unknown_not_an_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": "Fine."}}]
            })))
            .mount(&mock_server)
            .await;

        let request = CompletionRequest::critique("gpt-3.5-turbo", "x");
        let completion = client_for(&mock_server).query(&request).await.unwrap();
        assert_eq!(completion.total_tokens, None);
    }

    #[tokio::test]
    async fn unauthorized_and_rate_limited() {
        let mock_server = MockServer::start().await;
        let request = CompletionRequest::critique("gpt-3.5-turbo", "x");

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Incorrect API key"))
            .up_to_n_times(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota"))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        match client.query(&request).await {
            Err(CompletionError::Unauthorized { status, body }) => {
                assert_eq!(status, 401);
                assert!(body.contains("Incorrect API key"));
            }
            other => panic!("expected Unauthorized, got {:?}", other.map(|c| c.content)),
        }
        assert!(matches!(
            client.query(&request).await,
            Err(CompletionError::RateLimited { .. })
        ));
    }

    #[tokio::test]
    async fn server_error_keeps_status() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .mount(&mock_server)
            .await;

        let request = CompletionRequest::critique("gpt-3.5-turbo", "x");
        let err = client_for(&mock_server).query(&request).await.unwrap_err();
        assert!(matches!(err, CompletionError::Api { status: 500, .. }));
        assert!(err.to_string().contains("Internal Server Error"));
    }

    #[tokio::test]
    async fn empty_choices_and_garbage_bodies() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .up_to_n_times(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let request = CompletionRequest::critique("gpt-3.5-turbo", "x");
        assert!(matches!(
            client.query(&request).await,
            Err(CompletionError::EmptyResponse)
        ));
        assert!(matches!(
            client.query(&request).await,
            Err(CompletionError::MalformedResponse(_))
        ));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = OpenAIClient::new("k").with_base_url("http://localhost:8080/v1/");
        assert_eq!(client.base_url(), "http://localhost:8080/v1");
    }
}
