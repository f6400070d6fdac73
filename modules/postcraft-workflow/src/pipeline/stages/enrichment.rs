use anyhow::{Context, Result};
use futures::future::join_all;
use tracing::{info, warn};

use postcraft_common::{Platform, WorkflowError, WorkflowState};

use crate::traits::{SemanticAnalyzer, TimingAdvisor};

/// Post metadata key holding the source/draft similarity.
pub const SIMILARITY_KEY: &str = "semantic_similarity";

pub async fn analyze_similarity(analyzer: &dyn SemanticAnalyzer, state: &mut WorkflowState) -> Result<()> {
    let source = state.text.as_str();
    let scores = join_all(state.drafts.iter().map(|(platform, post)| async move {
        (*platform, analyzer.similarity(source, &post.primary_text).await)
    }))
    .await;

    for (platform, score) in scores {
        match score {
            Ok(score) => {
                if let Some(post) = state.drafts.get_mut(&platform) {
                    post.set_metadata(SIMILARITY_KEY, serde_json::json!(score));
                }
            }
            Err(e) => {
                warn!(platform = %platform, error = %e, "Semantic analysis failed");
                state.record_error(
                    WorkflowError::stage("semantic-analysis", format!("{platform}: {e:#}")).to_string(),
                );
            }
        }
    }
    Ok(())
}

pub async fn compute_timings(advisor: &dyn TimingAdvisor, state: &mut WorkflowState) -> Result<()> {
    let platforms: Vec<Platform> = state.drafts.keys().copied().collect();
    if platforms.is_empty() {
        state.timings.clear();
        return Ok(());
    }

    let timings = advisor
        .suggest_times(&platforms, &state.text, state.topic_hint_or_empty())
        .await
        .context("timing advisor failed")?;
    info!(suggestions = timings.len(), "Posting times computed");
    state.timings = timings;
    Ok(())
}
