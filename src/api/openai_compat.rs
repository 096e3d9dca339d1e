use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;

use crate::api::{Message, MessageRole, RefineError, RefineProvider, RefineRequest};
use crate::constants::{
    AI_REQUEST_TIMEOUT, AI_SEED, AI_TEMPERATURE, AI_TOP_P, DEFAULT_SYSTEM_PROMPT,
};

/// Provider for any backend speaking the OpenAI chat-completions
/// protocol (OpenAI, DeepSeek, and compatible gateways).
pub struct OpenAiCompatibleProvider {
    client: Client,
    pub name: String,
    pub model: String,
    pub base_url: String,
    system_prompt: Option<String>,
}

impl OpenAiCompatibleProvider {
    pub fn new(
        name: String,
        model: String,
        base_url: String,
        system_prompt: Option<String>,
    ) -> Self {
        let client = Client::builder()
            .timeout(AI_REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            name,
            model,
            base_url,
            system_prompt,
        }
    }

    fn build_messages(&self, request: &RefineRequest) -> Vec<Message> {
        let system = self
            .system_prompt
            .clone()
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());
        vec![
            Message {
                role: MessageRole::System,
                content: system,
            },
            Message {
                role: MessageRole::User,
                content: format!(
                    "Original text: {}\n\nGuidance: {}",
                    request.text, request.guidance
                ),
            },
        ]
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Pulls the human-readable message out of an OpenAI-style error body,
/// falling back to the raw body text.
fn error_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => parsed.error.message,
        Err(_) if body.trim().is_empty() => format!("API returned status {status}"),
        Err(_) => body.trim().to_string(),
    }
}

/// Single point where HTTP statuses become failure categories.
fn classify_status(status: StatusCode, message: String) -> RefineError {
    match status {
        StatusCode::UNAUTHORIZED => RefineError::Credential(message),
        StatusCode::FORBIDDEN => RefineError::Access(message),
        _ => RefineError::Transient(format!("API error ({status}): {message}")),
    }
}

#[async_trait]
impl RefineProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn requires_api_key(&self) -> bool {
        true
    }

    async fn check_availability(&self, api_key: Option<&str>) -> Result<(), RefineError> {
        let Some(key) = api_key.filter(|k| !k.is_empty()) else {
            return Err(RefineError::Credential("API key is missing".to_string()));
        };

        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(url)
            .bearer_auth(key)
            .send()
            .await
            .map_err(|e| RefineError::Transient(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(classify_status(status, error_message(status, &body)))
        }
    }

    async fn refine(&self, request: &RefineRequest) -> Result<String, RefineError> {
        let Some(key) = request.api_key.as_deref().filter(|k| !k.is_empty()) else {
            return Err(RefineError::Credential("API key is missing".to_string()));
        };

        tracing::debug!(
            provider = %self.name,
            model = %self.model,
            language = request.language.tag(),
            "dispatching refinement request"
        );

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(url)
            .bearer_auth(key)
            .json(&json!({
                "model": self.model,
                "messages": self.build_messages(request),
                "stream": false,
                "temperature": AI_TEMPERATURE,
                "top_p": AI_TOP_P,
                "seed": AI_SEED
            }))
            .send()
            .await
            .map_err(|e| RefineError::Transient(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, error_message(status, &body)));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| RefineError::Transient(format!("Failed to parse response: {e}")))?;

        body.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| RefineError::Transient("No choices in response".to_string()))
    }
}
