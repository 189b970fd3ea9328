//! Errors raised by formula mutations.
use thiserror::Error;

use crate::clause::ClauseId;

/// Possible errors while building or mutating a formula.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormulaError {
    #[error("a formula over {requested} variables exceeds the addressable literal range")]
    TooManyVariables { requested: usize },
    #[error("literal {literal} references a variable outside the declared range 1..={num_variables}")]
    VariableOutOfRange {
        literal: isize,
        num_variables: usize,
    },
    #[error("clause id {0} is already present in the formula")]
    DuplicateClauseId(ClauseId),
    #[error("refusing to store a tautological clause")]
    TautologicalClause,
}
