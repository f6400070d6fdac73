use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use ai_client::{cosine_similarity, truncate_to_char_boundary, EmbedAgent};

use crate::traits::SemanticAnalyzer;

/// Embedding inputs are cut to this many bytes.
const MAX_EMBED_BYTES: usize = 24_000;

/// Cosine similarity of embedding vectors.
pub struct EmbeddingAnalyzer {
    agent: Arc<dyn EmbedAgent>,
}

impl EmbeddingAnalyzer {
    pub fn new(agent: Arc<dyn EmbedAgent>) -> Self {
        Self { agent }
    }
}

#[async_trait]
impl SemanticAnalyzer for EmbeddingAnalyzer {
    async fn similarity(&self, a: &str, b: &str) -> Result<f64> {
        let inputs = vec![
            truncate_to_char_boundary(a, MAX_EMBED_BYTES).to_string(),
            truncate_to_char_boundary(b, MAX_EMBED_BYTES).to_string(),
        ];
        let vectors = self.agent.embed_batch(&inputs).await?;
        match vectors.as_slice() {
            [va, vb] => Ok(cosine_similarity(va, vb)),
            other => Err(anyhow!("expected 2 embeddings, got {}", other.len())),
        }
    }
}
