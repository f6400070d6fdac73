// Test doubles for the workflow's trait seams.
//
// - MockGenerator (TextGenerator): prompt-marker -> reply table, call log
// - MockSearcher (WebSearcher): query-substring -> results, query log
// - FailingSearcher (WebSearcher): every call errors
// - CountingReviewer (PostReviewer): wraps a reviewer, counts calls per platform
// - FixedTimingAdvisor (TimingAdvisor): canned suggestions
// - FixedSemanticAnalyzer (SemanticAnalyzer): constant score or failure

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;

use postcraft_common::{Claim, Platform, PostingTime, Review};

use crate::traits::{
    PostReviewer, SearchResult, SemanticAnalyzer, TextGenerator, TimingAdvisor, WebSearcher,
};

// ---------------------------------------------------------------------------
// MockGenerator
// ---------------------------------------------------------------------------

enum Reply {
    Text(String),
    Fail,
}

/// Replies are chosen by the first registered marker contained in the prompt.
/// Prompts that match nothing fail, so unexpected calls surface as errors.
pub struct MockGenerator {
    replies: Vec<(String, Reply)>,
    calls: Mutex<Vec<String>>,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self {
            replies: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn on_prompt(mut self, marker: &str, reply: &str) -> Self {
        self.replies.push((marker.to_string(), Reply::Text(reply.to_string())));
        self
    }

    pub fn fail_on(mut self, marker: &str) -> Self {
        self.replies.push((marker.to_string(), Reply::Fail));
        self
    }

    /// Every prompt received, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_containing(&self, needle: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|p| p.contains(needle)).count()
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.calls.lock().unwrap().push(prompt.to_string());
        match self.replies.iter().find(|(marker, _)| prompt.contains(marker.as_str())) {
            Some((_, Reply::Text(text))) => Ok(text.clone()),
            Some((marker, Reply::Fail)) => bail!("MockGenerator: forced failure for '{marker}'"),
            None => bail!("MockGenerator: no reply registered for prompt"),
        }
    }
}

// ---------------------------------------------------------------------------
// MockSearcher
// ---------------------------------------------------------------------------

/// Returns the results of the first registered substring found in the query
/// (case-insensitive), or an empty list.
pub struct MockSearcher {
    results: Vec<(String, Vec<SearchResult>)>,
    queries: Mutex<Vec<String>>,
}

impl MockSearcher {
    pub fn new() -> Self {
        Self {
            results: Vec::new(),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn on_search(mut self, substring: &str, results: Vec<SearchResult>) -> Self {
        self.results.push((substring.to_lowercase(), results));
        self
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

impl Default for MockSearcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WebSearcher for MockSearcher {
    fn name(&self) -> &str {
        "mock"
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        self.queries.lock().unwrap().push(query.to_string());
        let lower = query.to_lowercase();
        Ok(self
            .results
            .iter()
            .find(|(substring, _)| lower.contains(substring.as_str()))
            .map(|(_, results)| results.iter().take(max_results).cloned().collect())
            .unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// FailingSearcher
// ---------------------------------------------------------------------------

pub struct FailingSearcher {
    calls: AtomicUsize,
}

impl FailingSearcher {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for FailingSearcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WebSearcher for FailingSearcher {
    fn name(&self) -> &str {
        "failing"
    }

    async fn search(&self, query: &str, _max_results: usize) -> Result<Vec<SearchResult>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        bail!("FailingSearcher: search refused for '{query}'")
    }
}

// ---------------------------------------------------------------------------
// CountingReviewer
// ---------------------------------------------------------------------------

pub struct CountingReviewer<R> {
    inner: R,
    counts: Mutex<HashMap<Platform, usize>>,
}

impl<R: PostReviewer> CountingReviewer<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            counts: Mutex::new(HashMap::new()),
        }
    }

    pub fn count_for(&self, platform: Platform) -> usize {
        self.counts.lock().unwrap().get(&platform).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.lock().unwrap().values().sum()
    }
}

impl<R: PostReviewer> PostReviewer for CountingReviewer<R> {
    fn review(&self, platform: Platform, text: &str, claims: &[Claim]) -> Review {
        *self.counts.lock().unwrap().entry(platform).or_insert(0) += 1;
        self.inner.review(platform, text, claims)
    }
}

// ---------------------------------------------------------------------------
// FixedTimingAdvisor
// ---------------------------------------------------------------------------

pub struct FixedTimingAdvisor {
    times: Vec<PostingTime>,
    fail: bool,
}

impl FixedTimingAdvisor {
    pub fn new(times: Vec<PostingTime>) -> Self {
        Self { times, fail: false }
    }

    pub fn failing() -> Self {
        Self {
            times: Vec::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl TimingAdvisor for FixedTimingAdvisor {
    async fn suggest_times(
        &self,
        platforms: &[Platform],
        _text: &str,
        _topic_hint: &str,
    ) -> Result<Vec<PostingTime>> {
        if self.fail {
            bail!("FixedTimingAdvisor: forced failure");
        }
        Ok(self
            .times
            .iter()
            .filter(|t| platforms.contains(&t.platform))
            .cloned()
            .collect())
    }
}

// ---------------------------------------------------------------------------
// FixedSemanticAnalyzer
// ---------------------------------------------------------------------------

pub struct FixedSemanticAnalyzer {
    score: Option<f64>,
}

impl FixedSemanticAnalyzer {
    pub fn new(score: f64) -> Self {
        Self { score: Some(score) }
    }

    pub fn failing() -> Self {
        Self { score: None }
    }
}

#[async_trait]
impl SemanticAnalyzer for FixedSemanticAnalyzer {
    async fn similarity(&self, _a: &str, _b: &str) -> Result<f64> {
        match self.score {
            Some(score) => Ok(score),
            None => bail!("FixedSemanticAnalyzer: embeddings unavailable"),
        }
    }
}
