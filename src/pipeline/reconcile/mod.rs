pub mod candidate;
pub mod dedup;
pub mod merge;

pub use candidate::{coerce_model_candidate, parse_model_candidate, ModelCandidate};
pub use dedup::{deduplicate_categories, DedupConflict};
pub use merge::{reconcile_sources, Reconciled, ReconciliationSummary, SourceRef};
