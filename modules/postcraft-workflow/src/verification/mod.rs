//! Claim verification: dedup, search, relevance, confidence, rewording.
//!
//! The verifier never lets a searcher error escape. A failing query variant
//! is logged, recorded as a provider error, and treated as an empty result.

pub mod dedup;
pub mod query;
pub mod scoring;
pub mod standardize;
pub mod tables;

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info, warn};

use postcraft_common::{Claim, WorkflowError};

use crate::traits::{SearchResult, WebSearcher};
use dedup::group_claims;
use scoring::{filter_relevant, score_confidence};
use standardize::standardize_claim_text;

pub use scoring::ScoringPolicy;
pub use tables::{EntityTable, VerificationTables};

/// Results requested per query variant.
pub const DEFAULT_MAX_RESULTS: usize = 5;

/// One verified claim plus any provider errors hit along the way.
#[derive(Debug)]
pub struct VerifiedClaim {
    pub claim: Claim,
    pub errors: Vec<WorkflowError>,
}

/// Output of verifying a whole claim list.
#[derive(Debug, Default)]
pub struct VerificationOutcome {
    /// One verified claim per dedup group, in first-occurrence order.
    pub claims: Vec<Claim>,
    /// For every input claim, the index into `claims` of its verified representative.
    pub assignment: Vec<usize>,
    pub errors: Vec<WorkflowError>,
}

pub struct ClaimVerifier {
    searcher: Arc<dyn WebSearcher>,
    tables: VerificationTables,
    policy: ScoringPolicy,
    max_results: usize,
}

impl ClaimVerifier {
    pub fn new(searcher: Arc<dyn WebSearcher>) -> Self {
        Self {
            searcher,
            tables: VerificationTables::default(),
            policy: ScoringPolicy::default(),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    pub fn with_tables(mut self, tables: VerificationTables) -> Self {
        self.tables = tables;
        self
    }

    pub fn with_policy(mut self, policy: ScoringPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results.max(1);
        self
    }

    pub fn tables(&self) -> &VerificationTables {
        &self.tables
    }

    /// Dedup `claims`, then verify each distinct claim once.
    pub async fn verify_all(&self, claims: &[Claim]) -> VerificationOutcome {
        let groups = group_claims(claims, &self.tables.entities);
        info!(
            input = claims.len(),
            unique = groups.unique.len(),
            provider = self.searcher.name(),
            "Verifying claims"
        );

        let verified = join_all(groups.unique.iter().map(|c| self.verify_claim(c))).await;

        let mut outcome = VerificationOutcome {
            assignment: groups.assignment,
            ..Default::default()
        };
        for item in verified {
            outcome.claims.push(item.claim);
            outcome.errors.extend(item.errors);
        }
        outcome
    }

    /// Search, score and reword one claim. Severity is carried over unchanged.
    pub async fn verify_claim(&self, claim: &Claim) -> VerifiedClaim {
        let (raw, errors) = self.search(&claim.text).await;
        let relevant = filter_relevant(&raw, &claim.text, &self.tables, &self.policy);
        let confidence = score_confidence(&claim.text, raw.len(), &relevant, &self.tables, &self.policy);

        let sources: Vec<String> = relevant
            .iter()
            .take(self.policy.max_sources)
            .map(|r| r.url.clone())
            .collect();

        debug!(
            claim = claim.text.as_str(),
            raw = raw.len(),
            relevant = relevant.len(),
            confidence,
            "Claim scored"
        );

        VerifiedClaim {
            claim: Claim {
                text: standardize_claim_text(&claim.text, confidence),
                severity: claim.severity,
                sources,
                confidence,
            },
            errors,
        }
    }

    /// Run every query variant, merging results by url and capping the total.
    async fn search(&self, claim_text: &str) -> (Vec<SearchResult>, Vec<WorkflowError>) {
        let mut results: Vec<SearchResult> = Vec::new();
        let mut errors = Vec::new();

        for variant in query::query_variants(claim_text, &self.tables) {
            match self.searcher.search(&variant, self.max_results).await {
                Ok(found) => {
                    for result in found {
                        if !result.url.is_empty() && !results.iter().any(|r| r.url == result.url) {
                            results.push(result);
                        }
                    }
                }
                Err(e) => {
                    warn!(provider = self.searcher.name(), query = variant.as_str(), error = %e, "Search failed");
                    errors.push(WorkflowError::provider(self.searcher.name(), format!("{e:#}")));
                }
            }
        }

        results.truncate(self.max_results * 2);
        (results, errors)
    }
}
