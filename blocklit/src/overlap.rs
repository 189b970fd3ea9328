//! Sources of clause overlap information for the elimination checks.
//!
//! The checks only ever ask one question: which clauses contain a given
//! literal. Two interchangeable backends answer it, one reading the
//! formula's literal-occurrence lookup directly and one stabbing an AVL
//! interval tree over the clause literal-intervals.
use log::debug;
use rustc_hash::FxHashSet;

use blocklit_formula::{Clause, ClauseId, Formula, Lit};

use crate::interval_tree::{AvlIntervalTree, ClauseRemovalResult};
use crate::Error;

/// Capability the eliminators run against.
///
/// `overlapping_clauses_for` must return exactly the ids of the clauses that
/// contain the literal. Implementations holding derived state are initialized
/// from the formula once per pass and told about every clause removal so they
/// stay in lockstep with the formula and its occurrence lookup.
pub trait OverlapSource {
    fn initialize(&mut self, formula: &Formula) -> Result<(), Error>;

    fn overlapping_clauses_for(&self, formula: &Formula, lit: Lit) -> FxHashSet<ClauseId>;

    fn notify_clause_removed(&mut self, cid: ClauseId, clause: &Clause);
}

/// Overlap source backed by the formula's own literal-occurrence lookup.
///
/// Holds no state of its own; the formula keeps the lookup exact through
/// every mutation.
#[derive(Default)]
pub struct LiteralOccurrenceOverlap;

impl LiteralOccurrenceOverlap {
    pub fn new() -> LiteralOccurrenceOverlap {
        LiteralOccurrenceOverlap
    }
}

impl OverlapSource for LiteralOccurrenceOverlap {
    fn initialize(&mut self, _formula: &Formula) -> Result<(), Error> {
        Ok(())
    }

    fn overlapping_clauses_for(&self, formula: &Formula, lit: Lit) -> FxHashSet<ClauseId> {
        formula
            .literal_occurrence()
            .get(lit)
            .cloned()
            .unwrap_or_default()
    }

    fn notify_clause_removed(&mut self, _cid: ClauseId, _clause: &Clause) {}
}

/// Overlap source backed by an AVL interval tree over clause literal-bounds.
///
/// Stabbing the tree over-approximates: it returns every clause whose
/// literal interval contains the query literal, so the hits are filtered by
/// actual clause membership before they reach the checks.
#[derive(Default)]
pub struct AvlIntervalTreeOverlap {
    tree: AvlIntervalTree,
}

impl AvlIntervalTreeOverlap {
    pub fn new() -> AvlIntervalTreeOverlap {
        AvlIntervalTreeOverlap::default()
    }
}

impl OverlapSource for AvlIntervalTreeOverlap {
    fn initialize(&mut self, formula: &Formula) -> Result<(), Error> {
        self.tree = AvlIntervalTree::new();
        for (cid, clause) in formula.clauses() {
            if let Some(bounds) = clause.bounds() {
                self.tree.insert(cid, bounds);
            }
        }
        Ok(())
    }

    fn overlapping_clauses_for(&self, formula: &Formula, lit: Lit) -> FxHashSet<ClauseId> {
        self.tree
            .overlaps(lit)
            .into_iter()
            .filter(|&cid| {
                formula
                    .get_clause(cid)
                    .map_or(false, |clause| clause.contains(lit))
            })
            .collect()
    }

    fn notify_clause_removed(&mut self, cid: ClauseId, clause: &Clause) {
        if let Some(bounds) = clause.bounds() {
            match self.tree.remove(cid, bounds) {
                ClauseRemovalResult::Removed => (),
                result => debug!(
                    "interval of removed clause {} was not dropped from the tree: {:?}",
                    cid, result
                ),
            }
        }
    }
}
