//! The set-blocked-clause check.
use rustc_hash::FxHashSet;

use blocklit_formula::{Clause, ClauseId, Formula, Lit};

use crate::blocking::{CandidateSizeBounds, LiteralOccurrenceBlockingSetCandidateGenerator};
use crate::overlap::OverlapSource;
use crate::Error;

/// Searches clauses for blocking sets.
///
/// A clause C is set-blocked by a non-empty L ⊆ C when for every clause C'
/// containing the negation of some literal of L, the clause
/// (C \ L) ∪ ¬L ∪ C' is a tautology. Blocked clauses are the |L| = 1 case,
/// so this check subsumes the blocked-clause one at higher enumeration cost.
pub struct SetBlockedClauseEliminator<O: OverlapSource> {
    overlap: O,
}

impl<O: OverlapSource> SetBlockedClauseEliminator<O> {
    pub fn new(overlap: O) -> SetBlockedClauseEliminator<O> {
        SetBlockedClauseEliminator { overlap }
    }

    /// Builds the overlap source's derived state for the formula.
    pub fn initialize(&mut self, formula: &Formula) -> Result<(), Error> {
        self.overlap.initialize(formula)
    }

    /// Finds a subset of clause `cid` that blocks it, trying candidates in
    /// the generator's order within the given size bounds.
    ///
    /// Clauses with fewer than two literals never have a blocking set and
    /// yield `Ok(None)` without touching the generator. A missing clause id
    /// is an error.
    pub fn determine_blocking_set(
        &self,
        formula: &Formula,
        cid: ClauseId,
        generator: &mut LiteralOccurrenceBlockingSetCandidateGenerator,
        size_bounds: Option<CandidateSizeBounds>,
    ) -> Result<Option<Vec<Lit>>, Error> {
        let clause = formula.get_clause(cid).ok_or(Error::ClauseNotFound(cid))?;
        if clause.len() < 2 {
            return Ok(None);
        }

        generator.init(clause.lits(), formula.literal_occurrence(), size_bounds)?;

        while let Some(candidate) = generator.next_candidate() {
            if self.set_blocks(formula, clause, &candidate) {
                return Ok(Some(candidate));
            }
        }
        Ok(None)
    }

    /// Tells the overlap source that a clause left the formula.
    pub fn notify_clause_removed(&mut self, cid: ClauseId, clause: &Clause) {
        self.overlap.notify_clause_removed(cid, clause);
    }

    /// Whether every clause of the resolution environment of the set yields
    /// a tautological super-resolvent.
    ///
    /// The environment is the union of the environments of the set's
    /// literals, checked once per clause. Each member C' must contain some
    /// literal k outside L whose negation lies in C \ L; literals of C'
    /// negating a member of L only reproduce the ¬L part of the resolvent
    /// and do not count as witnesses.
    fn set_blocks(&self, formula: &Formula, clause: &Clause, blocking_set: &[Lit]) -> bool {
        let set: FxHashSet<Lit> = blocking_set.iter().copied().collect();
        let difference: FxHashSet<Lit> = clause
            .lits()
            .iter()
            .copied()
            .filter(|lit| !set.contains(lit))
            .collect();

        let mut environment: FxHashSet<ClauseId> = FxHashSet::default();
        for &lit in blocking_set {
            environment.extend(self.overlap.overlapping_clauses_for(formula, !lit));
        }
        if environment.is_empty() {
            return false;
        }

        environment.into_iter().all(|partner_cid| {
            formula.get_clause(partner_cid).map_or(false, |partner| {
                partner
                    .lits()
                    .iter()
                    .any(|&other| !set.contains(&other) && difference.contains(&!other))
            })
        })
    }
}
