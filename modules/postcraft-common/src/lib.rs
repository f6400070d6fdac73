pub mod config;
pub mod error;
pub mod types;

pub use config::{ComplianceMode, Config, SearchProviderKind};
pub use error::{ConfigError, WorkflowError};
pub use types::*;
