//! Single-pass rewrite of blocked posts.
//!
//! Each blocked platform gets one rewrite request and one re-review against
//! the claims of its previous review. There is no second pass; a rewrite
//! that is still blocked leaves the pipeline blocked.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use futures::future::join_all;
use tracing::{info, warn};

use ai_client::strip_code_blocks;
use postcraft_common::{Platform, ReviewStatus, WorkflowError, WorkflowState};

use crate::prompts::rewrite_prompt;
use crate::traits::{PostReviewer, TextGenerator};

pub const REVISION_NOTE: &str = "auto-revised";

const STAGE: &str = "remediate-if-blocked";

pub struct Remediator {
    generator: Arc<dyn TextGenerator>,
    reviewer: Arc<dyn PostReviewer>,
}

impl Remediator {
    pub fn new(generator: Arc<dyn TextGenerator>, reviewer: Arc<dyn PostReviewer>) -> Self {
        Self {
            generator,
            reviewer,
        }
    }

    /// Rewrite and re-review every blocked post. Returns how many posts
    /// received a new review. Failures are recorded and keep the old review.
    pub async fn remediate(&self, state: &mut WorkflowState) -> usize {
        let blocked: Vec<(Platform, String)> = state
            .reviews
            .iter()
            .filter(|(_, review)| review.status() == ReviewStatus::Block)
            .filter_map(|(platform, review)| {
                let post = state.drafts.get(platform)?;
                Some((*platform, rewrite_prompt(review.issues(), &post.primary_text)))
            })
            .collect();

        if blocked.is_empty() {
            return 0;
        }
        info!(platforms = blocked.len(), "Remediating blocked posts");

        let rewrites = join_all(blocked.into_iter().map(|(platform, prompt)| async move {
            (platform, self.generator.generate(&prompt).await)
        }))
        .await;

        let mut revised = 0;
        for (platform, reply) in rewrites {
            match self.apply(state, platform, reply) {
                Ok(()) => revised += 1,
                Err(e) => {
                    warn!(platform = %platform, error = %e, "Remediation failed");
                    state.record_error(
                        WorkflowError::stage(STAGE, format!("{platform}: {e:#}")).to_string(),
                    );
                }
            }
        }
        revised
    }

    fn apply(&self, state: &mut WorkflowState, platform: Platform, reply: Result<String>) -> Result<()> {
        let reply = reply?;
        let text = strip_code_blocks(&reply).trim();
        if text.is_empty() {
            return Err(anyhow!("rewrite came back empty"));
        }

        let claims = state
            .reviews
            .get(&platform)
            .map(|r| r.claims().to_vec())
            .unwrap_or_default();
        let post = state
            .drafts
            .get_mut(&platform)
            .ok_or_else(|| anyhow!("no draft to revise"))?;
        if !post.revise(text, REVISION_NOTE) {
            return Err(anyhow!("post was already revised"));
        }

        let review = self.reviewer.review(platform, &post.primary_text, &claims);
        info!(platform = %platform, status = %review.status(), "Post re-reviewed after rewrite");
        state.reviews.insert(platform, review);
        Ok(())
    }
}
