use thiserror::Error;

/// Invalid or missing process configuration. Always fatal, raised before
/// any pipeline stage runs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

#[derive(Error, Debug)]
pub enum WorkflowError {
    /// Fatal pre-flight failure. No state is produced.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// A stage failed; the orchestrator records it and moves on.
    #[error("{stage} failed: {message}")]
    Stage { stage: &'static str, message: String },

    /// A Search Provider or Generation Service call failed. Never retried.
    #[error("{provider} provider error: {message}")]
    Provider { provider: String, message: String },
}

impl WorkflowError {
    pub fn stage(stage: &'static str, err: impl std::fmt::Display) -> Self {
        WorkflowError::Stage {
            stage,
            message: format!("{err:#}"),
        }
    }

    pub fn provider(provider: impl Into<String>, err: impl std::fmt::Display) -> Self {
        WorkflowError::Provider {
            provider: provider.into(),
            message: format!("{err:#}"),
        }
    }

    /// True for errors that halt the whole invocation.
    pub fn is_fatal(&self) -> bool {
        matches!(self, WorkflowError::Configuration(_))
    }
}
