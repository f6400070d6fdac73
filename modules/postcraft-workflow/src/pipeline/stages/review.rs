use std::collections::{BTreeMap, HashSet};

use anyhow::Result;
use tracing::info;

use postcraft_common::{Claim, Platform, Review, WorkflowState};

use crate::traits::PostReviewer;
use crate::verification::ClaimVerifier;

/// Verify every platform's claims with one global dedup pass, then give each
/// platform back the verified representatives of its own claims. Each rebuilt
/// claim keeps the severity that platform extracted.
pub async fn verify_claims(verifier: &ClaimVerifier, state: &mut WorkflowState) -> Result<()> {
    let origins: Vec<Platform> = state
        .claims
        .iter()
        .flat_map(|(platform, claims)| std::iter::repeat(*platform).take(claims.len()))
        .collect();
    let flattened: Vec<Claim> = state.claims.values().flatten().cloned().collect();

    let outcome = verifier.verify_all(&flattened).await;
    for error in &outcome.errors {
        state.record_error(error.to_string());
    }

    let mut rebuilt: BTreeMap<Platform, Vec<Claim>> =
        state.claims.keys().map(|platform| (*platform, Vec::new())).collect();
    let mut placed: HashSet<(Platform, usize)> = HashSet::new();
    for ((platform, extracted), group) in origins.iter().zip(&flattened).zip(&outcome.assignment) {
        if !placed.insert((*platform, *group)) {
            continue;
        }
        if let Some(verified) = outcome.claims.get(*group) {
            let claim = Claim {
                severity: extracted.severity,
                ..verified.clone()
            };
            rebuilt.entry(*platform).or_default().push(claim);
        }
    }

    info!(
        extracted = flattened.len(),
        verified = outcome.claims.len(),
        provider_errors = outcome.errors.len(),
        "Claims verified"
    );
    state.claims = rebuilt;
    Ok(())
}

/// One fresh review per draft, replacing whatever was there.
pub fn run_compliance(reviewer: &dyn PostReviewer, state: &mut WorkflowState) {
    let reviews: BTreeMap<Platform, Review> = state
        .drafts
        .iter()
        .map(|(platform, post)| {
            let claims = state.claims.get(platform).map(Vec::as_slice).unwrap_or(&[]);
            (*platform, reviewer.review(*platform, &post.primary_text, claims))
        })
        .collect();

    for (platform, review) in &reviews {
        info!(platform = %platform, status = %review.status(), issues = review.issues().len(), "Post reviewed");
    }
    state.reviews = reviews;
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::compliance::ComplianceEngine;
    use crate::testing::{FailingSearcher, MockSearcher};
    use crate::traits::SearchResult;
    use postcraft_common::{ClaimSeverity, ComplianceMode, Post, ReviewStatus};

    #[tokio::test]
    async fn duplicates_across_platforms_are_verified_once() {
        let searcher = Arc::new(MockSearcher::new().on_search(
            "remote",
            vec![SearchResult::new("80% prefer remote work, Buffer survey", "https://buffer.com/state-of-remote")],
        ));
        let verifier = ClaimVerifier::new(searcher.clone());
        let mut state = WorkflowState::new("source", None);
        state.claims.insert(
            Platform::Twitter,
            vec![Claim::new("Buffer survey: 80% prefer remote", ClaimSeverity::High)],
        );
        state.claims.insert(
            Platform::Linkedin,
            vec![
                Claim::new("80% of workers prefer remote, per Buffer", ClaimSeverity::High),
                Claim::new("Buffer survey: 80% prefer remote", ClaimSeverity::High),
            ],
        );

        verify_claims(&verifier, &mut state).await.unwrap();

        assert_eq!(state.claims[&Platform::Twitter].len(), 1);
        assert_eq!(state.claims[&Platform::Linkedin].len(), 1);
        assert_eq!(state.claims[&Platform::Twitter], state.claims[&Platform::Linkedin]);
    }

    #[tokio::test]
    async fn provider_failures_are_recorded_and_claims_kept() {
        let verifier = ClaimVerifier::new(Arc::new(FailingSearcher::new()));
        let mut state = WorkflowState::new("source", None);
        state.claims.insert(
            Platform::Twitter,
            vec![Claim::new("Deloitte reports 40% growth", ClaimSeverity::Medium)],
        );
        state.claims.insert(Platform::Instagram, Vec::new());

        verify_claims(&verifier, &mut state).await.unwrap();

        assert_eq!(state.claims[&Platform::Twitter][0].confidence, 0.1);
        assert!(state.claims[&Platform::Instagram].is_empty());
        assert!(state.errors().iter().all(|e| e.starts_with("failing provider error")));
        assert!(!state.errors().is_empty());
    }

    #[tokio::test]
    async fn shared_claims_keep_each_platforms_severity() {
        let verifier = ClaimVerifier::new(Arc::new(FailingSearcher::new()));
        let engine = ComplianceEngine::new(ComplianceMode::Standard);
        let mut state = WorkflowState::new("source", None);
        state.claims.insert(
            Platform::Twitter,
            vec![Claim::new("Buffer survey: 80% prefer remote", ClaimSeverity::Low)],
        );
        state.claims.insert(
            Platform::Linkedin,
            vec![Claim::new("80% of workers prefer remote, per Buffer", ClaimSeverity::High)],
        );
        for platform in [Platform::Twitter, Platform::Linkedin] {
            state
                .drafts
                .insert(platform, Post::new(platform, "Most people like working from home"));
        }

        verify_claims(&verifier, &mut state).await.unwrap();
        run_compliance(&engine, &mut state);

        let twitter = &state.claims[&Platform::Twitter][0];
        let linkedin = &state.claims[&Platform::Linkedin][0];
        assert_eq!(twitter.severity, ClaimSeverity::Low);
        assert_eq!(linkedin.severity, ClaimSeverity::High);
        assert_eq!(linkedin.text, twitter.text);
        assert_eq!(linkedin.confidence, 0.1);

        assert_eq!(state.reviews[&Platform::Twitter].status(), ReviewStatus::Pass);
        let linkedin_review = &state.reviews[&Platform::Linkedin];
        assert_eq!(linkedin_review.status(), ReviewStatus::Flag);
        assert!(linkedin_review.has_rule("low_confidence_claim"));
    }

    #[test]
    fn compliance_reviews_every_draft() {
        let engine = ComplianceEngine::new(ComplianceMode::Strict);
        let mut state = WorkflowState::new("source", None);
        state
            .drafts
            .insert(Platform::Twitter, Post::new(Platform::Twitter, "We diagnose issues fast"));
        state
            .drafts
            .insert(Platform::Linkedin, Post::new(Platform::Linkedin, "A measured update"));
        state.claims.insert(
            Platform::Linkedin,
            vec![Claim::new("x", ClaimSeverity::High).with_confidence(0.2)],
        );

        run_compliance(&engine, &mut state);

        assert_eq!(state.reviews[&Platform::Twitter].status(), ReviewStatus::Block);
        assert_eq!(state.reviews[&Platform::Linkedin].status(), ReviewStatus::Flag);
        assert_eq!(state.reviews[&Platform::Linkedin].claims().len(), 1);
    }
}
