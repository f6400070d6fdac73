//! End-to-end workflow runs against test doubles.

use std::sync::Arc;

use chrono::{TimeZone, Utc};

use postcraft_common::{
    ComplianceMode, Config, ContentPlan, Platform, PostingTime, ReviewStatus, WorkflowError,
};
use postcraft_workflow::compliance::ComplianceEngine;
use postcraft_workflow::pipeline::stages::SIMILARITY_KEY;
use postcraft_workflow::remediation::REVISION_NOTE;
use postcraft_workflow::testing::{
    CountingReviewer, FailingSearcher, FixedSemanticAnalyzer, FixedTimingAdvisor, MockGenerator,
    MockSearcher,
};
use postcraft_workflow::traits::{PostReviewer, SearchResult, SemanticAnalyzer, WebSearcher};
use postcraft_workflow::{Workflow, WorkflowDeps};

const SOURCE: &str = "Remote work is no longer an experiment. A Buffer survey found that 80% of \
                      workers prefer remote arrangements, and companies are reshaping offices.";

const TWITTER_DRAFT: &str = r##"{"primary_text": "We diagnose remote burnout early: 80% prefer remote work, per a Buffer survey.", "hashtags": ["#RemoteWork"], "mentions": ["@buffer"]}"##;

const LINKEDIN_DRAFT: &str = r##"{"primary_text": "Remote work keeps gaining ground. According to a Buffer survey, 80% of workers prefer remote arrangements, and teams are adapting their rituals to match.", "hashtags": ["#FutureOfWork"], "mentions": []}"##;

const CLAIMS: &str = r#"[
  {"text": "Buffer survey: 80% prefer remote", "severity": "high"},
  {"text": "80% of workers prefer remote, per Buffer", "severity": "high"}
]"#;

const REWRITE: &str = "We spot remote burnout early: 80% prefer remote work, per a Buffer survey.";

fn generator() -> MockGenerator {
    MockGenerator::new()
        .on_prompt("has compliance issues", REWRITE)
        .on_prompt(
            "Extract 5-8 key bullet points",
            r#"[{"text": "80% of workers prefer remote work (Buffer)", "importance": 0.9},
                {"text": "Offices are being redesigned", "importance": 0.4}]"#,
        )
        .on_prompt("Create a twitter post", TWITTER_DRAFT)
        .on_prompt("Create a linkedin post", LINKEDIN_DRAFT)
        .on_prompt("extract up to 10", CLAIMS)
}

fn searcher() -> MockSearcher {
    MockSearcher::new().on_search(
        "remote",
        vec![SearchResult::new(
            "80% of workers prefer remote work",
            "https://www.pewresearch.org/remote-work",
        )],
    )
}

fn timings() -> FixedTimingAdvisor {
    let at = Utc.with_ymd_and_hms(2026, 10, 14, 3, 30, 0).unwrap().fixed_offset();
    FixedTimingAdvisor::new(
        Platform::ALL
            .iter()
            .map(|&platform| PostingTime {
                platform,
                local_datetime: at,
                rationale: "Lunch break browsing peak".into(),
            })
            .collect(),
    )
}

fn config(mode: ComplianceMode) -> Config {
    let mut config = Config::for_tests();
    config.platforms = vec![Platform::Twitter, Platform::Linkedin];
    config.compliance_mode = mode;
    config
}

struct Harness {
    generator: Arc<MockGenerator>,
    reviewer: Arc<CountingReviewer<ComplianceEngine>>,
    workflow: Workflow,
}

fn harness(
    config: Config,
    generator: MockGenerator,
    searcher: Arc<dyn WebSearcher>,
    semantic: Option<Arc<dyn SemanticAnalyzer>>,
) -> Harness {
    let generator = Arc::new(generator);
    let reviewer = Arc::new(CountingReviewer::new(ComplianceEngine::new(config.compliance_mode)));
    let deps = WorkflowDeps::builder()
        .config(config)
        .generator(generator.clone())
        .searcher(searcher)
        .timing(Arc::new(timings()))
        .semantic(semantic)
        .reviewer(Some(reviewer.clone() as Arc<dyn PostReviewer>))
        .build();
    Harness {
        generator,
        reviewer,
        workflow: Workflow::new(deps),
    }
}

#[tokio::test]
async fn strict_run_remediates_the_blocked_post_once() {
    let h = harness(config(ComplianceMode::Strict), generator(), Arc::new(searcher()), None);

    let state = h.workflow.run(SOURCE, Some("remote work")).await.unwrap();

    assert!(state.errors().is_empty(), "unexpected errors: {:?}", state.errors());

    let twitter = &state.drafts[&Platform::Twitter];
    assert_eq!(twitter.primary_text, REWRITE);
    assert_eq!(twitter.notes.as_deref(), Some(REVISION_NOTE));
    assert_eq!(state.reviews[&Platform::Twitter].status(), ReviewStatus::Pass);
    assert_eq!(state.reviews[&Platform::Linkedin].status(), ReviewStatus::Pass);
    assert!(state.drafts[&Platform::Linkedin].notes.is_none());

    assert_eq!(h.reviewer.count_for(Platform::Twitter), 2);
    assert_eq!(h.reviewer.count_for(Platform::Linkedin), 1);
    assert_eq!(h.generator.calls_containing("has compliance issues"), 1);

    // Both phrasings of the Buffer claim collapse into one per platform.
    for platform in [Platform::Twitter, Platform::Linkedin] {
        let claims = &state.claims[&platform];
        assert_eq!(claims.len(), 1);
        assert!(claims[0].confidence >= 0.1 && claims[0].confidence <= 0.95);
        assert_eq!(claims[0].sources, vec!["https://www.pewresearch.org/remote-work".to_string()]);
    }

    assert_eq!(state.timings.len(), 2);
    assert_eq!(state.key_points.len(), 2);
    assert_eq!(state.version(), 7);
}

#[tokio::test]
async fn failing_search_still_yields_a_complete_plan() {
    let failing = Arc::new(FailingSearcher::new());
    let h = harness(config(ComplianceMode::Standard), generator(), failing.clone(), None);

    let state = h.workflow.run(SOURCE, None).await.unwrap();

    assert!(failing.calls() > 0);
    assert!(!state.errors().is_empty());
    assert_eq!(state.drafts.len(), 2);
    assert_eq!(state.reviews.len(), 2);
    assert_eq!(state.timings.len(), 2);
    for claims in state.claims.values() {
        assert!(!claims.is_empty());
        assert!(claims.iter().all(|c| c.confidence == 0.1 && c.sources.is_empty()));
    }
    // High-severity claims at floor confidence are flagged.
    assert!(state
        .reviews
        .values()
        .all(|r| r.status() == ReviewStatus::Flag && r.has_rule("low_confidence_claim")));
}

#[tokio::test]
async fn missing_credential_fails_before_any_stage() {
    let mut config = config(ComplianceMode::Standard);
    config.openai_api_key = String::new();
    let h = harness(config, generator(), Arc::new(searcher()), None);

    let err = h.workflow.run(SOURCE, None).await.unwrap_err();

    assert!(matches!(err, WorkflowError::Configuration(_)));
    assert!(err.is_fatal());
    assert!(h.generator.calls().is_empty());
    assert_eq!(h.reviewer.total(), 0);
}

#[tokio::test]
async fn key_point_failure_falls_back_to_source_excerpt() {
    let generator = MockGenerator::new()
        .fail_on("Extract 5-8 key bullet points")
        .on_prompt("Create a twitter post", TWITTER_DRAFT)
        .on_prompt("Create a linkedin post", LINKEDIN_DRAFT)
        .on_prompt("extract up to 10", "[]");
    let h = harness(config(ComplianceMode::Standard), generator, Arc::new(searcher()), None);

    let state = h.workflow.run(SOURCE, None).await.unwrap();

    assert!(state.key_points.is_empty());
    assert_eq!(state.errors().len(), 1);
    assert!(state.errors()[0].starts_with("extract-key-points failed"));
    assert_eq!(state.drafts.len(), 2);
    let draft_prompt = h
        .generator
        .calls()
        .into_iter()
        .find(|p| p.contains("Create a twitter post"))
        .unwrap();
    assert!(draft_prompt.contains("Original blog content"));
}

#[tokio::test]
async fn generator_outage_degrades_every_stage_without_aborting() {
    let h = harness(config(ComplianceMode::Standard), MockGenerator::new(), Arc::new(searcher()), None);

    let state = h.workflow.run(SOURCE, None).await.unwrap();

    assert!(state.key_points.is_empty());
    assert!(state.drafts.is_empty());
    assert!(state.reviews.is_empty());
    assert!(state.timings.is_empty());
    // One key point failure plus one per platform draft.
    assert_eq!(state.errors().len(), 3);

    let plan = serde_json::to_value(ContentPlan::from(state)).unwrap();
    for key in ["key_points", "posts", "reviews", "timings", "errors"] {
        assert!(plan.get(key).is_some(), "missing {key}");
    }
}

#[tokio::test]
async fn semantic_scores_are_attached_when_enabled() {
    let h = harness(
        config(ComplianceMode::Standard),
        generator(),
        Arc::new(searcher()),
        Some(Arc::new(FixedSemanticAnalyzer::new(0.77))),
    );

    let state = h.workflow.run(SOURCE, None).await.unwrap();

    assert_eq!(state.version(), 8);
    for post in state.drafts.values() {
        let metadata = post.metadata.as_ref().unwrap();
        assert_eq!(metadata[SIMILARITY_KEY], serde_json::json!(0.77));
    }
}

#[tokio::test]
async fn semantic_failures_are_isolated() {
    let h = harness(
        config(ComplianceMode::Standard),
        generator(),
        Arc::new(searcher()),
        Some(Arc::new(FixedSemanticAnalyzer::failing())),
    );

    let state = h.workflow.run(SOURCE, None).await.unwrap();

    assert_eq!(state.errors().len(), 2);
    assert!(state.errors().iter().all(|e| e.starts_with("semantic-analysis failed")));
    assert_eq!(state.reviews.len(), 2);
    assert_eq!(state.timings.len(), 2);
}
