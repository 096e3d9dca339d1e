use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;

use crate::api::{Message, MessageRole, RefineError, RefineProvider, RefineRequest};
use crate::constants::{
    AI_REQUEST_TIMEOUT, AI_SEED, AI_TEMPERATURE, AI_TOP_P, DEFAULT_SYSTEM_PROMPT,
};

/// Provider for a local Ollama instance. Keyless, so the credential
/// preconditions and the auto-process suppression guard do not apply;
/// this is also the backend used when exercising the editor without a
/// remote account.
pub struct OllamaProvider {
    client: Client,
    pub model: String,
    pub base_url: String,
}

impl OllamaProvider {
    pub fn new(model: String, base_url: String) -> Self {
        let client = Client::builder()
            .timeout(AI_REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            model,
            base_url,
        }
    }
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: Message,
}

#[derive(Deserialize)]
struct OllamaTags {
    models: Vec<OllamaModel>,
}

#[derive(Deserialize)]
struct OllamaModel {
    name: String,
}

#[async_trait]
impl RefineProvider for OllamaProvider {
    fn name(&self) -> &str {
        "Ollama"
    }

    fn requires_api_key(&self) -> bool {
        false
    }

    async fn check_availability(&self, _api_key: Option<&str>) -> Result<(), RefineError> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| RefineError::Transient(e.to_string()))?;

        if !response.status().is_success() {
            return Err(RefineError::Transient(format!(
                "Ollama returned status {}",
                response.status()
            )));
        }

        let tags: OllamaTags = response
            .json()
            .await
            .map_err(|e| RefineError::Transient(format!("Failed to parse tags: {e}")))?;
        if tags
            .models
            .iter()
            .any(|m| m.name == self.model || m.name.starts_with(&format!("{}:", self.model)))
        {
            Ok(())
        } else {
            Err(RefineError::Access(format!(
                "Model {} not found in Ollama",
                self.model
            )))
        }
    }

    async fn refine(&self, request: &RefineRequest) -> Result<String, RefineError> {
        tracing::debug!(
            model = %self.model,
            language = request.language.tag(),
            "dispatching refinement request to Ollama"
        );

        let url = format!("{}/api/chat", self.base_url);
        let response = self
            .client
            .post(url)
            .json(&json!({
                "model": self.model,
                "messages": [
                    Message {
                        role: MessageRole::System,
                        content: DEFAULT_SYSTEM_PROMPT.to_string(),
                    },
                    Message {
                        role: MessageRole::User,
                        content: format!(
                            "Original text: {}\n\nGuidance: {}",
                            request.text, request.guidance
                        ),
                    },
                ],
                "stream": false,
                "options": {
                    "temperature": AI_TEMPERATURE,
                    "top_p": AI_TOP_P,
                    "seed": AI_SEED
                }
            }))
            .send()
            .await
            .map_err(|e| RefineError::Transient(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            if status == StatusCode::NOT_FOUND {
                return Err(RefineError::Access(format!(
                    "Model {} not found in Ollama",
                    self.model
                )));
            }
            let body = response.text().await.unwrap_or_default();
            return Err(RefineError::Transient(format!(
                "Ollama chat error ({status}): {body}"
            )));
        }

        let body: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| RefineError::Transient(format!("Failed to parse response: {e}")))?;
        Ok(body.message.content)
    }
}
