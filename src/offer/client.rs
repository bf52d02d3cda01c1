//! Chat completions client for the external text-completion service.

use reqwest::Client;
use serde::{Deserialize, Serialize};

const DEFAULT_TEMPERATURE: f32 = 0.3;

/// Completion client error types.
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    /// Network-level error (connection failed, reset, etc.)
    #[error("Network error: {0}")]
    Network(String),

    /// The service answered with a non-success status
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Response body doesn't match the chat completions shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// A single chat message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-compatible chat completions client.
///
/// One attempt per call, no retry, no timeout beyond the HTTP client default.
#[derive(Clone)]
pub struct CompletionClient {
    http: Client,
    api_key: String,
    model: String,
    api_url: String,
}

impl CompletionClient {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        api_url: impl Into<String>,
    ) -> Self {
        Self {
            http: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            api_url: api_url.into(),
        }
    }

    /// Send the messages and return the first choice's content.
    ///
    /// `Ok(None)` means the service answered but produced no text.
    pub async fn complete(
        &self,
        messages: &[ChatMessage],
    ) -> Result<Option<String>, CompletionError> {
        let payload = ChatCompletionRequest {
            model: &self.model,
            messages,
            temperature: DEFAULT_TEMPERATURE,
        };

        let response = self
            .http
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| CompletionError::Network(e.to_string()))?;

        let status = response.status();
        tracing::debug!(status = status.as_u16(), "Received completion response");

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(CompletionError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::InvalidResponse(e.to_string()))?;

        Ok(body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> CompletionClient {
        CompletionClient::new(
            "test-api-key",
            "gpt-4o-mini",
            format!("{}/v1/chat/completions", server.uri()),
        )
    }

    fn messages() -> Vec<ChatMessage> {
        vec![ChatMessage::system("sys"), ChatMessage::user("hallo")]
    }

    #[tokio::test]
    async fn returns_first_choice_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer test-api-key"))
            .and(body_partial_json(json!({
                "model": "gpt-4o-mini",
                "messages": [
                    { "role": "system", "content": "sys" },
                    { "role": "user", "content": "hallo" }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "content": "Beste klant, ..." } }]
            })))
            .mount(&server)
            .await;

        let reply = client(&server).complete(&messages()).await.unwrap();
        assert_eq!(reply.as_deref(), Some("Beste klant, ..."));
    }

    #[tokio::test]
    async fn empty_choices_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .mount(&server)
            .await;

        let reply = client(&server).complete(&messages()).await.unwrap();
        assert!(reply.is_none());
    }

    #[tokio::test]
    async fn error_status_maps_to_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Invalid API key"))
            .mount(&server)
            .await;

        let result = client(&server).complete(&messages()).await;
        match result {
            Err(CompletionError::Api { status, message }) => {
                assert_eq!(status, 401);
                assert_eq!(message, "Invalid API key");
            }
            other => panic!("expected API error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn garbage_body_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let result = client(&server).complete(&messages()).await;
        assert!(matches!(result, Err(CompletionError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn unreachable_service_is_network_error() {
        let client = CompletionClient::new("k", "m", "http://127.0.0.1:1/v1/chat/completions");
        let result = client.complete(&messages()).await;
        assert!(matches!(result, Err(CompletionError::Network(_))));
    }
}
