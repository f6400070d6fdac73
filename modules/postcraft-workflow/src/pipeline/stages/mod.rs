//! Stage bodies. Each takes the collaborators it needs plus the state.
//! Per-platform failures are recorded in place; a returned `Err` means the
//! whole stage failed and the orchestrator resets its fields.

mod enrichment;
mod generation;
mod review;

pub use enrichment::{analyze_similarity, compute_timings, SIMILARITY_KEY};
pub use generation::{extract_claims, extract_key_points, generate_drafts, MAX_CLAIMS_PER_POST};
pub use review::{run_compliance, verify_claims};
