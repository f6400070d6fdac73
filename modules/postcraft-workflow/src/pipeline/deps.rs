use std::sync::Arc;

use typed_builder::TypedBuilder;

use ai_client::OpenAi;
use postcraft_common::{Config, WorkflowError};

use crate::search::build_searcher;
use crate::semantic::EmbeddingAnalyzer;
use crate::timing::HeuristicTimingAdvisor;
use crate::traits::{PostReviewer, SemanticAnalyzer, TextGenerator, TimingAdvisor, WebSearcher};
use crate::verification::{ScoringPolicy, VerificationTables};

/// Long-lived collaborators for one or many workflow runs.
///
/// Production code builds this with [`WorkflowDeps::from_config`]; tests use
/// the builder and swap in doubles from `testing`.
#[derive(Clone, TypedBuilder)]
pub struct WorkflowDeps {
    #[builder(setter(into))]
    pub config: Arc<Config>,
    pub generator: Arc<dyn TextGenerator>,
    pub searcher: Arc<dyn WebSearcher>,
    pub timing: Arc<dyn TimingAdvisor>,
    /// Enables the semantic-analysis stage when present.
    #[builder(default)]
    pub semantic: Option<Arc<dyn SemanticAnalyzer>>,
    /// Defaults to a `ComplianceEngine` in the configured mode.
    #[builder(default)]
    pub reviewer: Option<Arc<dyn PostReviewer>>,
    #[builder(default)]
    pub tables: VerificationTables,
    #[builder(default)]
    pub policy: ScoringPolicy,
}

impl WorkflowDeps {
    pub fn from_config(config: Config) -> Result<Self, WorkflowError> {
        config.validate()?;

        let mut openai = OpenAi::new(&config.openai_api_key, &config.openai_model)
            .with_embedding_model(&config.embedding_model);
        if let Some(base_url) = &config.openai_base_url {
            openai = openai.with_base_url(base_url);
        }
        let openai = Arc::new(openai);

        let searcher = build_searcher(&config).map_err(|e| WorkflowError::provider(config.search_provider.as_str(), e))?;

        let semantic: Option<Arc<dyn SemanticAnalyzer>> = if config.semantic_analysis {
            Some(Arc::new(EmbeddingAnalyzer::new(openai.clone())))
        } else {
            None
        };

        Ok(Self::builder()
            .timing(Arc::new(HeuristicTimingAdvisor::new(config.default_tz)))
            .generator(openai)
            .searcher(searcher)
            .semantic(semantic)
            .config(config)
            .build())
    }
}
