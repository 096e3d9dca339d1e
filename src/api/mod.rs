use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ProviderConfig;
use crate::state::Language;

pub mod ollama;
pub mod openai_compat;

use crate::api::ollama::OllamaProvider;
use crate::api::openai_compat::OpenAiCompatibleProvider;

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

/// Failure categories for the refinement capability.
///
/// The category is decided once, at the provider boundary, from the
/// HTTP status; the engine only matches on the variant and never
/// re-derives the classification from message text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RefineError {
    /// The credential was rejected (HTTP 401, or no key supplied).
    #[error("{0}")]
    Credential(String),
    /// The configured model or endpoint is not available to this
    /// credential (HTTP 403). Retrying cannot succeed without
    /// reconfiguration.
    #[error("{0}")]
    Access(String),
    /// Network, timeout, malformed response, or anything else. Retry is
    /// possible once the user acts.
    #[error("{0}")]
    Transient(String),
}

/// One refinement call: the text under edit plus the instruction
/// guiding the rewrite. The credential is captured at dispatch time so
/// a later key change cannot leak into an in-flight request.
#[derive(Debug, Clone)]
pub struct RefineRequest {
    pub text: String,
    pub guidance: String,
    pub language: Language,
    pub api_key: Option<String>,
}

#[async_trait]
pub trait RefineProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Whether this provider authenticates with an API key. Keyless
    /// providers skip the credential preconditions and the
    /// error-suppression guard of the scheduler.
    fn requires_api_key(&self) -> bool;

    /// Produces a rewrite of `request.text`, or a classified failure.
    async fn refine(&self, request: &RefineRequest) -> Result<String, RefineError>;

    /// Cheap reachability/entitlement probe, used at startup.
    async fn check_availability(&self, api_key: Option<&str>) -> Result<(), RefineError>;
}

pub fn create_provider(config: &ProviderConfig) -> Arc<dyn RefineProvider> {
    match config.name.as_str() {
        "Ollama" => Arc::new(OllamaProvider::new(
            config.active_model.clone(),
            config.base_url.clone(),
        )),
        _ => Arc::new(OpenAiCompatibleProvider::new(
            config.name.clone(),
            config.active_model.clone(),
            config.base_url.clone(),
            config.system_prompt.clone(),
        )),
    }
}
