// Trait seams for the workflow's outbound collaborators.
//
// TextGenerator wraps the chat model, WebSearcher the fact-check backends,
// SemanticAnalyzer the embedding service, TimingAdvisor the scheduler, and
// PostReviewer the compliance engine. Test doubles live in `testing`.

use anyhow::Result;
use async_trait::async_trait;

use postcraft_common::{Claim, Platform, PostingTime, Review};

// ---------------------------------------------------------------------------
// TextGenerator
// ---------------------------------------------------------------------------

/// Prompt in, free-form text out. Replies are parsed defensively by callers.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

#[async_trait]
impl TextGenerator for ai_client::OpenAi {
    async fn generate(&self, prompt: &str) -> Result<String> {
        Ok(self.complete(prompt).await?)
    }
}

// ---------------------------------------------------------------------------
// WebSearcher
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub url: String,
    pub title: String,
    pub snippet: String,
}

impl SearchResult {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            snippet: String::new(),
        }
    }
}

#[async_trait]
pub trait WebSearcher: Send + Sync {
    /// Backend name used when recording provider errors.
    fn name(&self) -> &str;

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>>;
}

// ---------------------------------------------------------------------------
// SemanticAnalyzer
// ---------------------------------------------------------------------------

#[async_trait]
pub trait SemanticAnalyzer: Send + Sync {
    /// Similarity of two texts in [-1, 1].
    async fn similarity(&self, a: &str, b: &str) -> Result<f64>;
}

// ---------------------------------------------------------------------------
// TimingAdvisor
// ---------------------------------------------------------------------------

#[async_trait]
pub trait TimingAdvisor: Send + Sync {
    async fn suggest_times(
        &self,
        platforms: &[Platform],
        text: &str,
        topic_hint: &str,
    ) -> Result<Vec<PostingTime>>;
}

// ---------------------------------------------------------------------------
// PostReviewer
// ---------------------------------------------------------------------------

/// Compliance review of one post version. Pure and infallible.
pub trait PostReviewer: Send + Sync {
    fn review(&self, platform: Platform, text: &str, claims: &[Claim]) -> Review;
}
