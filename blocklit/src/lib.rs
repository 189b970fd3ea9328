//! Blocked-clause and set-blocked-clause elimination for CNF formulas.
//!
//! A clause C is *blocked* by one of its literals l when resolving C on l
//! against any clause containing ¬l only ever produces tautological
//! resolvents; such clauses can be removed without affecting satisfiability.
//! *Set-blocked* clauses generalize the witness from a single literal to a
//! subset of the clause.
//!
//! The crate provides the overlap indexes the checks run against (the
//! literal-occurrence lookup of the formula and an AVL interval tree over
//! clause literal-intervals), heuristic-driven candidate and witness
//! enumeration, the two elimination checks, and a pass driver that removes
//! every clause a witness is found for.
use thiserror::Error;

use blocklit_formula::ClauseId;

pub mod blocking;
pub mod interval_tree;
pub mod overlap;
pub mod pass;
pub mod select;

mod bce;
mod sbce;

pub use bce::BlockedClauseEliminator;
pub use interval_tree::{AvlIntervalTree, ClauseRemovalResult};
pub use sbce::SetBlockedClauseEliminator;

/// Errors of the elimination machinery.
///
/// A check that merely finds no witness is not an error; only invalid
/// configuration and structurally impossible situations are.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("the random selection heuristic requires an rng seed")]
    MissingRngSeed,
    #[error("an rng seed is only valid for the random selection heuristic")]
    UnexpectedRngSeed,
    #[error("a clause with {len} literals cannot have a blocking set")]
    ClauseTooShort { len: usize },
    #[error("invalid blocking set size bounds {min}..={max}")]
    InvalidSizeBounds { min: usize, max: usize },
    #[error("blocking set size bound {max} exceeds the {eligible} eligible literals")]
    SizeBoundExceedsCandidates { max: usize, eligible: usize },
    #[error("clause {0} is not present in the formula")]
    ClauseNotFound(ClauseId),
}
