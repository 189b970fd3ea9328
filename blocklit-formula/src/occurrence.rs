//! Lookup from signed literals to the clauses containing them.
use std::ops::Index;

use rustc_hash::FxHashSet;

use crate::clause::ClauseId;
use crate::error::FormulaError;
use crate::lit::Lit;

/// For each signed literal, the set of ids of the clauses containing it.
///
/// Storage is a single array of `2 * num_variables + 1` clause-id sets. A
/// nonzero literal `l` with `|l| <= n` maps to slot `|l|` when negative and
/// `n + l` when positive; slot 0 is reserved as the out-of-range sentinel and
/// stays empty.
///
/// The lookup only tracks ids; it never dereferences clauses.
pub struct LiteralOccurrenceLookup {
    num_variables: usize,
    occurrences: Vec<FxHashSet<ClauseId>>,
}

impl LiteralOccurrenceLookup {
    /// Creates an empty lookup for formulas over `num_variables` variables.
    ///
    /// Fails when the slot array size `2 * num_variables + 1` would overflow
    /// `usize`.
    pub fn new(num_variables: usize) -> Result<LiteralOccurrenceLookup, FormulaError> {
        if num_variables > (usize::max_value() - 1) / 2 {
            return Err(FormulaError::TooManyVariables {
                requested: num_variables,
            });
        }

        Ok(LiteralOccurrenceLookup {
            num_variables,
            occurrences: vec![FxHashSet::default(); 2 * num_variables + 1],
        })
    }

    /// Number of variables the lookup was sized for.
    pub fn num_variables(&self) -> usize {
        self.num_variables
    }

    /// Slot of a literal in the occurrence array, 0 for out-of-range literals.
    fn slot(&self, lit: Lit) -> usize {
        let number = lit.to_dimacs();
        if number.abs() as usize > self.num_variables {
            return 0;
        }
        if number < 0 {
            -number as usize
        } else {
            self.num_variables + number as usize
        }
    }

    /// The clauses containing `lit`, or `None` when the literal's variable is
    /// outside the declared range.
    pub fn get(&self, lit: Lit) -> Option<&FxHashSet<ClauseId>> {
        match self.slot(lit) {
            0 => None,
            slot => Some(&self.occurrences[slot]),
        }
    }

    /// Number of clauses containing `lit`, 0 for out-of-range literals.
    pub fn count(&self, lit: Lit) -> usize {
        self.get(lit).map_or(0, FxHashSet::len)
    }

    /// Records that the clause `cid` contains each of the given literals.
    ///
    /// Out-of-range literals are ignored; the formula validates variable
    /// ranges before clauses reach the lookup.
    pub fn record(&mut self, cid: ClauseId, literals: &[Lit]) {
        for &lit in literals {
            match self.slot(lit) {
                0 => (),
                slot => {
                    self.occurrences[slot].insert(cid);
                }
            }
        }
    }

    /// Removes `cid` from the entry of a single literal.
    pub fn forget(&mut self, cid: ClauseId, lit: Lit) {
        match self.slot(lit) {
            0 => (),
            slot => {
                self.occurrences[slot].remove(&cid);
            }
        }
    }
}

/// Panicking variant of [`get`](LiteralOccurrenceLookup::get) for literals
/// known to be in range.
impl Index<Lit> for LiteralOccurrenceLookup {
    type Output = FxHashSet<ClauseId>;

    fn index(&self, lit: Lit) -> &FxHashSet<ClauseId> {
        self.get(lit)
            .expect("literal outside the declared variable range")
    }
}
