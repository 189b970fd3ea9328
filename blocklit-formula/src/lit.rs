//! Literals and variables.
use std::{fmt, ops};

/// A boolean variable.
///
/// Variables are identified by a positive 1-based number, matching the DIMACS
/// CNF convention. The number 0 is not a valid variable.
///
/// Creating a variable with a number larger than `Var::max_var().to_dimacs()`
/// is unsupported and may panic.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Var {
    number: u32,
}

impl Var {
    /// Creates a variable from its positive 1-based DIMACS number.
    #[inline]
    pub fn from_dimacs(number: isize) -> Var {
        debug_assert!(number > 0);
        debug_assert!(number <= Var::max_var().to_dimacs());
        Var {
            number: number as u32,
        }
    }

    /// The 1-based number representing this variable in the DIMACS CNF encoding.
    #[inline]
    pub fn to_dimacs(self) -> isize {
        self.number as isize
    }

    /// The 0-based index of this variable, suitable for indexing per-variable
    /// containers of length `num_variables`.
    #[inline]
    pub fn index(self) -> usize {
        (self.number - 1) as usize
    }

    /// The variable with the largest number that is supported.
    ///
    /// This is less than the backing integer type supports, leaving headroom
    /// for the signed literal encoding and sentinel values.
    pub const fn max_var() -> Var {
        Var {
            number: i32::max_value() as u32 - 1,
        }
    }

    /// Largest number of variables supported.
    pub const fn max_count() -> usize {
        Self::max_var().number as usize
    }

    /// Creates a literal from this var and a `bool` that is `true` when the
    /// literal is positive.
    #[inline]
    pub fn lit(self, polarity: bool) -> Lit {
        Lit::from_var(self, polarity)
    }

    /// Creates a positive literal from this var.
    #[inline]
    pub fn positive(self) -> Lit {
        self.lit(true)
    }

    /// Creates a negative literal from this var.
    #[inline]
    pub fn negative(self) -> Lit {
        self.lit(false)
    }
}

/// Uses the 1-based DIMACS CNF encoding.
impl fmt::Debug for Var {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_dimacs())
    }
}

/// Uses the 1-based DIMACS CNF encoding.
impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A boolean literal.
///
/// A literal is a variable or the negation of a variable.
///
/// A literal is represented by the nonzero signed integer that denotes it in
/// the DIMACS CNF encoding: the absolute value is the variable number, the
/// sign is the polarity. As a consequence the derived `Ord` is ascending
/// signed order, which is the order clauses keep their literals in and the
/// order the clause-interval machinery is built on.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Lit {
    value: i32,
}

impl Lit {
    /// Creates a literal from a `Var` and a `bool` that is `true` when the
    /// literal is positive.
    #[inline]
    pub fn from_var(var: Var, polarity: bool) -> Lit {
        Lit {
            value: if polarity {
                var.number as i32
            } else {
                -(var.number as i32)
            },
        }
    }

    /// Create a positive literal from a `Var`.
    #[inline]
    pub fn positive(var: Var) -> Lit {
        Lit::from_var(var, true)
    }

    /// Create a negative literal from a `Var`.
    #[inline]
    pub fn negative(var: Var) -> Lit {
        Lit::from_var(var, false)
    }

    /// Creates a literal from a nonzero signed integer.
    ///
    /// The absolute value is used as 1-based variable number, the sign of the
    /// integer is used as polarity of the literal.
    #[inline]
    pub fn from_dimacs(number: isize) -> Lit {
        debug_assert!(number != 0);
        debug_assert!(number.abs() <= Var::max_var().to_dimacs());
        Lit {
            value: number as i32,
        }
    }

    /// Signed integer representation of the literal, opposite of `from_dimacs`.
    #[inline]
    pub fn to_dimacs(self) -> isize {
        self.value as isize
    }

    /// The literal's variable.
    #[inline]
    pub fn var(self) -> Var {
        Var {
            number: self.value.abs() as u32,
        }
    }

    /// 0-based index of the literal's _variable_.
    #[inline]
    pub fn index(self) -> usize {
        self.var().index()
    }

    /// Whether the literal is negative, i.e. a negated variable.
    #[inline]
    pub fn is_negative(self) -> bool {
        self.value < 0
    }

    /// Whether the literal is positive, i.e. a non-negated variable.
    #[inline]
    pub fn is_positive(self) -> bool {
        self.value > 0
    }
}

impl ops::Not for Lit {
    type Output = Lit;

    #[inline]
    fn not(self) -> Lit {
        Lit { value: -self.value }
    }
}

impl From<Var> for Lit {
    #[inline]
    fn from(var: Var) -> Lit {
        Lit::positive(var)
    }
}

/// Uses the signed DIMACS CNF encoding.
impl fmt::Debug for Lit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_dimacs())
    }
}

/// Uses the signed DIMACS CNF encoding.
impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(any(test, feature = "proptest-strategies"))]
#[doc(hidden)]
pub mod strategy {
    use super::*;
    use proptest::{prelude::*, *};

    pub fn var(number: impl Strategy<Value = usize>) -> impl Strategy<Value = Var> {
        number.prop_map(|number| Var::from_dimacs(number as isize))
    }

    pub fn lit(number: impl Strategy<Value = usize>) -> impl Strategy<Value = Lit> {
        (var(number), bool::ANY).prop_map(|(var, polarity)| var.lit(polarity))
    }
}
