//! CNF formulas with an occurrence lookup maintained in lockstep.
use std::collections::BTreeMap;
use std::fmt;
use std::fmt::Write;

use crate::clause::{Clause, ClauseId};
use crate::error::FormulaError;
use crate::lit::Lit;
use crate::occurrence::LiteralOccurrenceLookup;

/// Outcome of assigning a literal and propagating the consequences.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Propagation {
    /// The assignment and all induced unit assignments were consistent.
    Propagated,
    /// Some clause became empty; the formula is unsatisfiable.
    Conflict(Lit),
}

/// A CNF formula: clauses addressed by stable ids, plus the per-literal
/// occurrence lookup and the variable assignment fixed by unit propagation.
///
/// Clause ids are assigned by the caller on insertion and never reused, so
/// the id space may contain gaps after deletions. Clauses are kept in an
/// ordered map to make iteration deterministic in id order.
///
/// Every mutation keeps the occurrence lookup exact: for each literal `l`
/// present in the formula, the lookup entry for `l` is the set of ids of the
/// clauses containing `l`. Tautological clauses are never stored.
pub struct Formula {
    num_variables: usize,
    num_declared_clauses: usize,
    clauses: BTreeMap<ClauseId, Clause>,
    occurrence: LiteralOccurrenceLookup,
    assignment: Vec<Option<bool>>,
}

impl Formula {
    /// Creates an empty formula over `num_variables` variables.
    ///
    /// `num_declared_clauses` is the clause count announced by the problem
    /// header; it is informational and does not bound insertions.
    pub fn new(num_variables: usize, num_declared_clauses: usize) -> Result<Formula, FormulaError> {
        Ok(Formula {
            num_variables,
            num_declared_clauses,
            clauses: BTreeMap::new(),
            occurrence: LiteralOccurrenceLookup::new(num_variables)?,
            assignment: vec![None; num_variables],
        })
    }

    /// Upper bound on variable numbers declared for this formula.
    pub fn num_variables(&self) -> usize {
        self.num_variables
    }

    /// Clause count announced by the problem header.
    pub fn num_declared_clauses(&self) -> usize {
        self.num_declared_clauses
    }

    /// Number of clauses currently stored.
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Stores a clause under the given id.
    ///
    /// The literals are normalized (sorted ascending by signed value,
    /// deduplicated). Fails on a duplicate id, on a literal outside the
    /// declared variable range, and on tautological input.
    pub fn add_clause(
        &mut self,
        cid: ClauseId,
        literals: impl IntoIterator<Item = Lit>,
    ) -> Result<(), FormulaError> {
        if self.clauses.contains_key(&cid) {
            return Err(FormulaError::DuplicateClauseId(cid));
        }

        let clause = Clause::new(literals);
        for &lit in clause.lits() {
            if lit.var().to_dimacs() as usize > self.num_variables {
                return Err(FormulaError::VariableOutOfRange {
                    literal: lit.to_dimacs(),
                    num_variables: self.num_variables,
                });
            }
        }
        if clause.is_tautology() {
            return Err(FormulaError::TautologicalClause);
        }

        self.occurrence.record(cid, clause.lits());
        self.clauses.insert(cid, clause);
        Ok(())
    }

    /// Removes a clause, returning it, or `None` when the id is not present.
    pub fn remove_clause(&mut self, cid: ClauseId) -> Option<Clause> {
        let clause = self.clauses.remove(&cid)?;
        for &lit in clause.lits() {
            self.occurrence.forget(cid, lit);
        }
        Some(clause)
    }

    /// Removes the literal from every clause containing it.
    ///
    /// Clauses that become empty stay in the formula; detecting the resulting
    /// conflict is the concern of [`propagate`](Formula::propagate).
    pub fn remove_literal_from_formula(&mut self, lit: Lit) {
        let affected: Vec<ClauseId> = match self.occurrence.get(lit) {
            Some(cids) => cids.iter().copied().collect(),
            None => return,
        };

        for cid in affected {
            if let Some(clause) = self.clauses.get_mut(&cid) {
                clause.remove_literal(lit);
            }
            self.occurrence.forget(cid, lit);
        }
    }

    /// The clause stored under `cid`.
    pub fn get_clause(&self, cid: ClauseId) -> Option<&Clause> {
        self.clauses.get(&cid)
    }

    /// All stored clauses with their ids, ascending by id.
    pub fn clauses(&self) -> impl Iterator<Item = (ClauseId, &Clause)> {
        self.clauses.iter().map(|(&cid, clause)| (cid, clause))
    }

    /// Ids of all stored clauses, ascending.
    pub fn clause_ids(&self) -> impl Iterator<Item = ClauseId> + '_ {
        self.clauses.keys().copied()
    }

    /// The occurrence lookup maintained alongside the clauses.
    pub fn literal_occurrence(&self) -> &LiteralOccurrenceLookup {
        &self.occurrence
    }

    /// The truth value the variable of `lit` was fixed to, if any.
    pub fn value_of(&self, lit: Lit) -> Option<bool> {
        self.assignment[lit.index()].map(|value| value == lit.is_positive())
    }

    /// Whether the variable of `lit` has been fixed by propagation.
    pub fn is_assigned(&self, lit: Lit) -> bool {
        self.assignment[lit.index()].is_some()
    }

    /// Fixes `lit` to true and propagates the consequences.
    ///
    /// Clauses satisfied by an assignment are removed, falsified literals are
    /// stripped from the remaining clauses, and clauses reduced to a single
    /// literal induce further assignments. A clause stripped to emptiness
    /// reports a conflict.
    pub fn propagate(&mut self, lit: Lit) -> Propagation {
        let mut pending = vec![lit];

        while let Some(lit) = pending.pop() {
            match self.value_of(lit) {
                Some(true) => continue,
                Some(false) => return Propagation::Conflict(lit),
                None => (),
            }
            self.assignment[lit.index()] = Some(lit.is_positive());

            let satisfied: Vec<ClauseId> = match self.occurrence.get(lit) {
                Some(cids) => cids.iter().copied().collect(),
                None => vec![],
            };
            for cid in satisfied {
                self.remove_clause(cid);
            }

            let weakened: Vec<ClauseId> = match self.occurrence.get(!lit) {
                Some(cids) => cids.iter().copied().collect(),
                None => vec![],
            };
            for cid in weakened {
                let clause = match self.clauses.get_mut(&cid) {
                    Some(clause) => clause,
                    None => continue,
                };
                clause.remove_literal(!lit);
                self.occurrence.forget(cid, !lit);

                match *clause.lits() {
                    [] => return Propagation::Conflict(lit),
                    [unit] => pending.push(unit),
                    _ => (),
                }
            }
        }

        Propagation::Propagated
    }

    /// Renders the formula in DIMACS CNF syntax, clauses in id order.
    pub fn stringify(&self) -> String {
        let mut out = String::new();
        let _ = write!(out, "p cnf {} {}", self.num_variables, self.clauses.len());
        for (_, clause) in self.clauses() {
            out.push('\n');
            for lit in clause.lits() {
                let _ = write!(out, "{} ", lit);
            }
            out.push('0');
        }
        out
    }
}

impl fmt::Debug for Formula {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(&self.num_variables, f)?;
        f.debug_map().entries(self.clauses()).finish()
    }
}
