//! Enumeration of potential blocking witnesses within a clause.
pub mod literal;
pub mod set;

pub use literal::{BlockingLiteralGenerator, BlockingLiteralSelectionHeuristic};
pub use set::{CandidateSizeBounds, LiteralOccurrenceBlockingSetCandidateGenerator};
