//! Search primitives: top-n selection and ranked results.

/// Adaptive top-n selection (full sort vs. partial selection).
pub mod topk;
/// Ranked result type.
pub mod types;

pub use topk::select_top_n;
pub use types::Ranking;
