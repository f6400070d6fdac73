pub mod compliance;
pub mod mentions;
pub mod pipeline;
pub mod prompts;
pub mod remediation;
pub mod report;
pub mod search;
pub mod semantic;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod timing;
pub mod traits;
pub mod verification;

pub use pipeline::{Stage, Workflow, WorkflowDeps};
