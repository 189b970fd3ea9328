//! Clauses and their literal bounds.
use std::fmt;

use crate::lit::Lit;

/// Identifier of a clause within a formula.
///
/// Assigned when the clause is inserted and never reused after a deletion, so
/// gaps are normal in a formula that has been preprocessed.
pub type ClauseId = usize;

/// Smallest and largest signed literal of a non-empty clause.
///
/// These are the endpoints of the clause's literal interval as indexed by the
/// AVL interval tree.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct LiteralBounds {
    pub lower: Lit,
    pub upper: Lit,
}

/// A clause, stored as a set of literals in ascending signed order.
///
/// Duplicate literals are removed on construction. Whether a clause is
/// tautological can be queried but tautological clauses are rejected at the
/// formula level, not here.
#[derive(Clone, PartialEq, Eq)]
pub struct Clause {
    literals: Vec<Lit>,
}

impl Clause {
    /// Creates a clause from arbitrary literals, sorting and deduplicating.
    pub fn new(literals: impl IntoIterator<Item = Lit>) -> Clause {
        let mut literals: Vec<Lit> = literals.into_iter().collect();
        literals.sort_unstable();
        literals.dedup();
        Clause { literals }
    }

    /// The literals in ascending signed order.
    #[inline]
    pub fn lits(&self) -> &[Lit] {
        &self.literals
    }

    /// Number of literals.
    #[inline]
    pub fn len(&self) -> usize {
        self.literals.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    /// Whether the clause contains the given literal.
    pub fn contains(&self, lit: Lit) -> bool {
        self.literals.binary_search(&lit).is_ok()
    }

    /// Whether the clause contains both some literal and its negation.
    pub fn is_tautology(&self) -> bool {
        self.literals.iter().any(|&lit| self.contains(!lit))
    }

    /// The smallest and largest literal, or `None` for the empty clause.
    pub fn bounds(&self) -> Option<LiteralBounds> {
        match (self.literals.first(), self.literals.last()) {
            (Some(&lower), Some(&upper)) => Some(LiteralBounds { lower, upper }),
            _ => None,
        }
    }

    /// Removes a literal, returning whether it was present.
    pub fn remove_literal(&mut self, lit: Lit) -> bool {
        match self.literals.binary_search(&lit) {
            Ok(position) => {
                self.literals.remove(position);
                true
            }
            Err(_) => false,
        }
    }
}

impl fmt::Debug for Clause {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list().entries(self.literals.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::lits;

    #[test]
    fn normalizes_on_construction() {
        let clause = Clause::new(lits![3, -2, 1, 3, -2].iter().cloned());
        assert_eq!(clause.lits(), &lits![-2, 1, 3]);
    }

    #[test]
    fn tautology_detection() {
        assert!(Clause::new(lits![-3, 1, 3].iter().cloned()).is_tautology());
        assert!(!Clause::new(lits![-3, 1, 2].iter().cloned()).is_tautology());
        assert!(!Clause::new(std::iter::empty()).is_tautology());
    }

    #[test]
    fn bounds_of_clause() {
        let clause = Clause::new(lits![4, -3, 1].iter().cloned());
        let bounds = clause.bounds().unwrap();
        assert_eq!(bounds.lower.to_dimacs(), -3);
        assert_eq!(bounds.upper.to_dimacs(), 4);

        assert_eq!(Clause::new(std::iter::empty()).bounds(), None);
    }

    #[test]
    fn contains_uses_signed_order() {
        let clause = Clause::new(lits![-5, -1, 2, 7].iter().cloned());
        assert!(clause.contains(Lit::from_dimacs(-5)));
        assert!(clause.contains(Lit::from_dimacs(2)));
        assert!(!clause.contains(Lit::from_dimacs(5)));
        assert!(!clause.contains(Lit::from_dimacs(-2)));
    }

    #[test]
    fn remove_literal() {
        let mut clause = Clause::new(lits![-4, 2, 6].iter().cloned());
        assert!(clause.remove_literal(Lit::from_dimacs(2)));
        assert!(!clause.remove_literal(Lit::from_dimacs(2)));
        assert_eq!(clause.lits(), &lits![-4, 6]);
    }
}
