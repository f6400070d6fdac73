//! Sequential stage orchestrator.
//!
//! Stages run one after another over a single `&mut WorkflowState`. A stage
//! that fails has its message appended to `errors` and its written fields
//! reset to empty; the remaining stages still run. Only a configuration
//! problem, checked before the first stage, fails the whole run.

mod deps;
pub mod stages;

use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use postcraft_common::{StateField, WorkflowError, WorkflowState};

use crate::compliance::ComplianceEngine;
use crate::remediation::Remediator;
use crate::traits::PostReviewer;
use crate::verification::ClaimVerifier;

pub use deps::WorkflowDeps;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    ExtractKeyPoints,
    GenerateDrafts,
    SemanticAnalysis,
    ExtractClaims,
    VerifyClaims,
    RunCompliance,
    Remediate,
    ComputeTimings,
}

impl Stage {
    /// Every stage in execution order.
    pub const ORDER: [Stage; 8] = [
        Stage::ExtractKeyPoints,
        Stage::GenerateDrafts,
        Stage::SemanticAnalysis,
        Stage::ExtractClaims,
        Stage::VerifyClaims,
        Stage::RunCompliance,
        Stage::Remediate,
        Stage::ComputeTimings,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Stage::ExtractKeyPoints => "extract-key-points",
            Stage::GenerateDrafts => "generate-drafts",
            Stage::SemanticAnalysis => "semantic-analysis",
            Stage::ExtractClaims => "extract-claims",
            Stage::VerifyClaims => "verify-claims",
            Stage::RunCompliance => "run-compliance",
            Stage::Remediate => "remediate-if-blocked",
            Stage::ComputeTimings => "compute-timings",
        }
    }

    /// Fields an earlier stage must have produced.
    pub fn reads(&self) -> &'static [StateField] {
        use StateField::*;
        match self {
            Stage::ExtractKeyPoints => &[],
            Stage::GenerateDrafts => &[KeyPoints],
            Stage::SemanticAnalysis => &[Drafts],
            Stage::ExtractClaims => &[Drafts],
            Stage::VerifyClaims => &[Claims],
            Stage::RunCompliance => &[Drafts, Claims],
            Stage::Remediate => &[Drafts, Claims, Reviews],
            Stage::ComputeTimings => &[Drafts],
        }
    }

    /// Fields this stage owns; reset to empty when it fails.
    pub fn writes(&self) -> &'static [StateField] {
        use StateField::*;
        match self {
            Stage::ExtractKeyPoints => &[KeyPoints],
            Stage::GenerateDrafts => &[Drafts],
            Stage::SemanticAnalysis => &[PostMetadata],
            Stage::ExtractClaims => &[Claims],
            Stage::VerifyClaims => &[Claims],
            Stage::RunCompliance => &[Reviews],
            Stage::Remediate => &[Drafts, Reviews],
            Stage::ComputeTimings => &[Timings],
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub struct Workflow {
    deps: WorkflowDeps,
    verifier: ClaimVerifier,
    reviewer: Arc<dyn PostReviewer>,
    remediator: Remediator,
}

impl Workflow {
    pub fn new(deps: WorkflowDeps) -> Self {
        let reviewer: Arc<dyn PostReviewer> = match &deps.reviewer {
            Some(reviewer) => reviewer.clone(),
            None => Arc::new(ComplianceEngine::new(deps.config.compliance_mode)),
        };
        let verifier = ClaimVerifier::new(deps.searcher.clone())
            .with_tables(deps.tables.clone())
            .with_policy(deps.policy.clone());
        let remediator = Remediator::new(deps.generator.clone(), reviewer.clone());
        Self {
            deps,
            verifier,
            reviewer,
            remediator,
        }
    }

    /// Stages this workflow will run. Semantic analysis is skipped when no
    /// analyzer is configured.
    pub fn stages(&self) -> Vec<Stage> {
        Stage::ORDER
            .into_iter()
            .filter(|s| *s != Stage::SemanticAnalysis || self.deps.semantic.is_some())
            .collect()
    }

    /// Run every stage over `text`. Fails only on configuration errors,
    /// before any stage runs; everything else ends up in `errors`.
    pub async fn run(&self, text: &str, topic_hint: Option<&str>) -> Result<WorkflowState, WorkflowError> {
        self.deps.config.validate()?;

        let run_id = Uuid::new_v4();
        let span = info_span!("workflow", run_id = %run_id);
        let state = async {
            let mut state = WorkflowState::new(text, topic_hint.map(str::to_string));
            info!(
                chars = text.chars().count(),
                platforms = self.deps.config.platforms.len(),
                "Workflow started"
            );

            for stage in self.stages() {
                self.run_stage(stage, &mut state).await;
            }

            info!(
                drafts = state.drafts.len(),
                reviews = state.reviews.len(),
                timings = state.timings.len(),
                errors = state.errors().len(),
                version = state.version(),
                "Workflow finished"
            );
            state
        }
        .instrument(span)
        .await;
        Ok(state)
    }

    /// Run a single stage with the orchestrator's failure handling.
    pub async fn run_stage(&self, stage: Stage, state: &mut WorkflowState) {
        let span = info_span!("stage", name = stage.name());

        if let Some(missing) = stage.reads().iter().find(|f| !state.is_produced(**f)) {
            let _enter = span.enter();
            warn!(field = ?missing, "Stage input was never produced");
            state.record_error(
                WorkflowError::stage(stage.name(), format!("requires {missing:?}, which no earlier stage produced"))
                    .to_string(),
            );
            state.bump_version();
            return;
        }

        let result = self.execute(stage, state).instrument(span.clone()).await;

        let _enter = span.enter();
        if let Err(e) = result {
            warn!(error = %e, "Stage failed");
            state.record_error(WorkflowError::stage(stage.name(), &e).to_string());
            for field in stage.writes() {
                state.reset(*field);
            }
        }
        for field in stage.writes() {
            state.mark_produced(*field);
        }
        state.bump_version();
    }

    async fn execute(&self, stage: Stage, state: &mut WorkflowState) -> Result<()> {
        let generator = self.deps.generator.as_ref();
        match stage {
            Stage::ExtractKeyPoints => stages::extract_key_points(generator, state).await,
            Stage::GenerateDrafts => stages::generate_drafts(generator, &self.deps.config, state).await,
            Stage::SemanticAnalysis => match &self.deps.semantic {
                Some(analyzer) => stages::analyze_similarity(analyzer.as_ref(), state).await,
                None => Ok(()),
            },
            Stage::ExtractClaims => stages::extract_claims(generator, state).await,
            Stage::VerifyClaims => stages::verify_claims(&self.verifier, state).await,
            Stage::RunCompliance => {
                stages::run_compliance(self.reviewer.as_ref(), state);
                Ok(())
            }
            Stage::Remediate => {
                let revised = self.remediator.remediate(state).await;
                info!(revised, "Remediation complete");
                Ok(())
            }
            Stage::ComputeTimings => stages::compute_timings(self.deps.timing.as_ref(), state).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FixedTimingAdvisor, MockGenerator, MockSearcher};
    use postcraft_common::{Config, Platform, Post};

    fn workflow(generator: MockGenerator) -> Workflow {
        Workflow::new(
            WorkflowDeps::builder()
                .config(Config::for_tests())
                .generator(Arc::new(generator))
                .searcher(Arc::new(MockSearcher::new()))
                .timing(Arc::new(FixedTimingAdvisor::new(vec![])))
                .build(),
        )
    }

    #[test]
    fn every_read_is_written_by_an_earlier_stage() {
        for (i, stage) in Stage::ORDER.iter().enumerate() {
            for field in stage.reads() {
                assert!(
                    Stage::ORDER[..i].iter().any(|s| s.writes().contains(field)),
                    "{stage} reads {field:?} before anything writes it"
                );
            }
        }
    }

    #[test]
    fn semantic_stage_is_skipped_without_analyzer() {
        let wf = workflow(MockGenerator::new());
        assert!(!wf.stages().contains(&Stage::SemanticAnalysis));
        assert_eq!(wf.stages().len(), 7);
    }

    #[tokio::test]
    async fn missing_input_is_a_stage_error_and_leaves_state_alone() {
        let wf = workflow(MockGenerator::new());
        let mut state = WorkflowState::new("text", None);
        state
            .drafts
            .insert(Platform::Twitter, Post::new(Platform::Twitter, "kept"));

        wf.run_stage(Stage::Remediate, &mut state).await;

        assert_eq!(state.errors().len(), 1);
        assert!(state.errors()[0].starts_with("remediate-if-blocked failed"));
        assert_eq!(state.drafts.len(), 1);
        assert_eq!(state.version(), 1);
    }

    #[tokio::test]
    async fn failed_stage_resets_its_fields_and_still_counts_as_produced() {
        let wf = workflow(MockGenerator::new().fail_on("Extract 5-8 key bullet points"));
        let mut state = WorkflowState::new("Some source text", None);

        wf.run_stage(Stage::ExtractKeyPoints, &mut state).await;

        assert!(state.key_points.is_empty());
        assert!(state.is_produced(StateField::KeyPoints));
        assert!(state.errors()[0].starts_with("extract-key-points failed"));
    }
}
