mod client;
pub(crate) mod types;

use async_trait::async_trait;
use tracing::debug;

use crate::error::AiError;
use crate::traits::{EmbedAgent, Message};
use client::{OpenAiClient, OPENAI_API_URL};
use types::ChatRequest;

// =============================================================================
// OpenAi Agent
// =============================================================================

#[derive(Clone)]
pub struct OpenAi {
    api_key: String,
    pub(crate) model: String,
    embedding_model: String,
    temperature: f32,
    base_url: Option<String>,
}

impl std::fmt::Debug for OpenAi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAi")
            .field("model", &self.model)
            .field("embedding_model", &self.embedding_model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl OpenAi {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            embedding_model: "text-embedding-3-small".to_string(),
            temperature: 0.3,
            base_url: None,
        }
    }

    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Get the model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }

    fn client(&self) -> Result<OpenAiClient, AiError> {
        OpenAiClient::new(
            &self.api_key,
            self.base_url.as_deref().unwrap_or(OPENAI_API_URL),
        )
    }

    /// Send a full conversation and return the assistant's reply text.
    pub async fn chat(&self, messages: &[Message]) -> Result<String, AiError> {
        let request = ChatRequest::new(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .max_tokens(4096);

        self.client()?.chat(&request).await
    }

    /// Simple single-prompt completion.
    pub async fn complete(&self, prompt: &str) -> Result<String, AiError> {
        debug!(model = %self.model, prompt_chars = prompt.len(), "completion");
        self.chat(&[Message::user(prompt)]).await
    }
}

// =============================================================================
// EmbedAgent Implementation
// =============================================================================

#[async_trait]
impl EmbedAgent for OpenAi {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, AiError> {
        self.client()?
            .embed(&self.embedding_model, serde_json::Value::String(text.to_string()))
            .await?
            .into_iter()
            .next()
            .ok_or(AiError::EmptyResponse("embeddings"))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AiError> {
        let input = serde_json::Value::Array(
            texts
                .iter()
                .map(|t| serde_json::Value::String(t.clone()))
                .collect(),
        );
        self.client()?.embed(&self.embedding_model, input).await
    }
}
