//! The blocked-clause check.
use rustc_hash::FxHashSet;

use blocklit_formula::{Clause, ClauseId, Formula, Lit};

use crate::blocking::BlockingLiteralGenerator;
use crate::overlap::OverlapSource;
use crate::Error;

/// Searches clauses for blocking literals.
///
/// A clause C is blocked by l ∈ C when every resolvent of C on l is a
/// tautology, i.e. every clause containing ¬l shares some further literal
/// with C in opposite polarity. Removing a blocked clause preserves
/// satisfiability, so a pass may delete each clause this check finds a
/// witness for, provided the overlap source is notified of the removal.
pub struct BlockedClauseEliminator<O: OverlapSource> {
    overlap: O,
}

impl<O: OverlapSource> BlockedClauseEliminator<O> {
    pub fn new(overlap: O) -> BlockedClauseEliminator<O> {
        BlockedClauseEliminator { overlap }
    }

    /// Builds the overlap source's derived state for the formula.
    pub fn initialize(&mut self, formula: &Formula) -> Result<(), Error> {
        self.overlap.initialize(formula)
    }

    /// Finds a literal blocking the clause `cid`, trying candidates in the
    /// generator's order.
    ///
    /// Returns `Ok(None)` when no literal of the clause blocks it. A missing
    /// clause id is an error: the caller handed out a stale id.
    pub fn determine_blocking_literal(
        &self,
        formula: &Formula,
        cid: ClauseId,
        generator: &mut BlockingLiteralGenerator,
    ) -> Result<Option<Lit>, Error> {
        let clause = formula.get_clause(cid).ok_or(Error::ClauseNotFound(cid))?;

        generator.init(clause.lits(), formula.literal_occurrence());

        while let Some(candidate) = generator.next_candidate() {
            if self.blocks(formula, clause, candidate) {
                return Ok(Some(candidate));
            }
        }
        Ok(None)
    }

    /// Tells the overlap source that a clause left the formula.
    pub fn notify_clause_removed(&mut self, cid: ClauseId, clause: &Clause) {
        self.overlap.notify_clause_removed(cid, clause);
    }

    /// Whether every clause of the resolution environment of `lit` yields a
    /// tautological resolvent against `clause`.
    ///
    /// An empty environment does not witness a blocking: under the
    /// definition used here a literal with no resolution partners never
    /// blocks.
    fn blocks(&self, formula: &Formula, clause: &Clause, lit: Lit) -> bool {
        let environment = self.overlap.overlapping_clauses_for(formula, !lit);
        if environment.is_empty() {
            return false;
        }

        let difference: FxHashSet<Lit> = clause
            .lits()
            .iter()
            .copied()
            .filter(|&other| other != lit)
            .collect();

        environment.into_iter().all(|partner_cid| {
            formula.get_clause(partner_cid).map_or(false, |partner| {
                partner
                    .lits()
                    .iter()
                    .any(|&other| difference.contains(&!other))
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use blocklit_formula::lit;

    use crate::overlap::{AvlIntervalTreeOverlap, LiteralOccurrenceOverlap};

    fn formula_with(num_variables: usize, clauses: &[&[isize]]) -> Formula {
        let mut formula = Formula::new(num_variables, clauses.len()).unwrap();
        for (cid, clause) in clauses.iter().enumerate() {
            formula
                .add_clause(cid, clause.iter().map(|&number| Lit::from_dimacs(number)))
                .unwrap();
        }
        formula
    }

    fn check_with_both_backends(
        formula: &Formula,
        cid: ClauseId,
    ) -> Option<Lit> {
        let mut generator = BlockingLiteralGenerator::sequential();

        let occurrence = BlockedClauseEliminator::new(LiteralOccurrenceOverlap::new());
        let from_occurrence = occurrence
            .determine_blocking_literal(formula, cid, &mut generator)
            .unwrap();

        let mut tree = BlockedClauseEliminator::new(AvlIntervalTreeOverlap::new());
        tree.initialize(formula).unwrap();
        let from_tree = tree
            .determine_blocking_literal(formula, cid, &mut generator)
            .unwrap();

        assert_eq!(from_occurrence, from_tree);
        from_occurrence
    }

    #[test]
    fn finds_blocking_literal() {
        let formula = formula_with(3, &[&[1, 2, -3], &[-1, 2, 3], &[1, -2, 3]]);

        // Clause 2 is stored as [-2, 1, 3]; -2 blocks it: both clauses
        // containing 2 also contain the negation of another of its literals.
        assert_eq!(check_with_both_backends(&formula, 2), Some(lit![-2]));
    }

    #[test]
    fn reports_unblocked_clauses() {
        let formula = formula_with(3, &[&[1, 2, -3], &[-1, 2, 3], &[1, 2, 3]]);

        assert_eq!(check_with_both_backends(&formula, 2), None);
    }

    #[test]
    fn empty_resolution_environment_never_blocks() {
        // No clause contains a negation of clause 0's literals.
        let formula = formula_with(2, &[&[1, 2]]);

        assert_eq!(check_with_both_backends(&formula, 0), None);
    }

    #[test]
    fn generator_order_picks_the_first_witness() {
        // Every literal of clause 0 blocks it. Sequential order tries 1
        // first; max-overlap order starts with 2, whose negation has the
        // largest resolution environment.
        let formula = formula_with(
            6,
            &[
                &[1, 2, 3],
                &[-1, -2],
                &[-3, -2, 4],
                &[-3, -1, 5],
                &[-3, -2, 6],
            ],
        );

        let eliminator = BlockedClauseEliminator::new(LiteralOccurrenceOverlap::new());

        let mut sequential = BlockingLiteralGenerator::sequential();
        assert_eq!(
            eliminator
                .determine_blocking_literal(&formula, 0, &mut sequential)
                .unwrap(),
            Some(lit![1])
        );

        let mut max_overlap = BlockingLiteralGenerator::max_clause_overlap();
        assert_eq!(
            eliminator
                .determine_blocking_literal(&formula, 0, &mut max_overlap)
                .unwrap(),
            Some(lit![2])
        );
    }

    #[test]
    fn dangling_clause_id_is_an_error() {
        let formula = formula_with(2, &[&[1, 2]]);
        let eliminator = BlockedClauseEliminator::new(LiteralOccurrenceOverlap::new());
        let mut generator = BlockingLiteralGenerator::sequential();

        assert_eq!(
            eliminator
                .determine_blocking_literal(&formula, 9, &mut generator)
                .err(),
            Some(Error::ClauseNotFound(9))
        );
    }
}
