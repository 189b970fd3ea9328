//! Nodes of the clause-interval tree.
use std::cmp::{max, min};

use blocklit_formula::ClauseId;

/// AVL balancing state, the difference between right and left subtree height.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum BalancingFactor {
    LeftHeavy,
    Balanced,
    RightHeavy,
}

/// One clause interval endpoint stored at a node.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) struct BoundEntry {
    pub bound: isize,
    pub cid: ClauseId,
}

/// A tree node hosting every stored interval that contains its key.
///
/// The key is the midpoint of the interval that created the node and is never
/// recomputed when further intervals join. The two endpoint lists mirror each
/// other: `lower_bounds` ascending by `(bound, cid)`, `upper_bounds`
/// descending by bound with ascending cid on ties. Both always hold the same
/// set of clause ids.
///
/// `subtree_min_lower` / `subtree_max_upper` aggregate the endpoint range of
/// the whole subtree rooted here; stabbing queries use them to prune descent.
pub(crate) struct Node {
    pub key: isize,
    pub lower_bounds: Vec<BoundEntry>,
    pub upper_bounds: Vec<BoundEntry>,
    pub balance: BalancingFactor,
    pub subtree_min_lower: isize,
    pub subtree_max_upper: isize,
    pub left: Option<Box<Node>>,
    pub right: Option<Box<Node>>,
}

impl Node {
    /// A leaf created for the interval `[lo, hi]` of clause `cid`, keyed on
    /// the interval's midpoint.
    pub fn new(key: isize, lo: isize, hi: isize, cid: ClauseId) -> Node {
        Node {
            key,
            lower_bounds: vec![BoundEntry { bound: lo, cid }],
            upper_bounds: vec![BoundEntry { bound: hi, cid }],
            balance: BalancingFactor::Balanced,
            subtree_min_lower: lo,
            subtree_max_upper: hi,
            left: None,
            right: None,
        }
    }

    /// Position of `(lo, cid)` in the ascending lower-bound list.
    pub fn lower_position(&self, lo: isize, cid: ClauseId) -> Result<usize, usize> {
        self.lower_bounds
            .binary_search_by(|entry| entry.bound.cmp(&lo).then(entry.cid.cmp(&cid)))
    }

    /// Position of `(hi, cid)` in the descending upper-bound list.
    pub fn upper_position(&self, hi: isize, cid: ClauseId) -> Result<usize, usize> {
        self.upper_bounds
            .binary_search_by(|entry| entry.bound.cmp(&hi).reverse().then(entry.cid.cmp(&cid)))
    }

    /// Adds the interval `[lo, hi]` of clause `cid` to this node's endpoint
    /// lists. Returns false when either endpoint entry is already present.
    pub fn insert_bounds(&mut self, lo: isize, hi: isize, cid: ClauseId) -> bool {
        let lower_position = match self.lower_position(lo, cid) {
            Ok(_) => return false,
            Err(position) => position,
        };
        let upper_position = match self.upper_position(hi, cid) {
            Ok(_) => return false,
            Err(position) => position,
        };

        self.lower_bounds
            .insert(lower_position, BoundEntry { bound: lo, cid });
        self.upper_bounds
            .insert(upper_position, BoundEntry { bound: hi, cid });
        true
    }

    /// Whether any endpoint list references the clause, regardless of bounds.
    pub fn references_clause(&self, cid: ClauseId) -> bool {
        self.lower_bounds.iter().any(|entry| entry.cid == cid)
            || self.upper_bounds.iter().any(|entry| entry.cid == cid)
    }

    /// Clause ids of the node-local intervals containing `point`.
    ///
    /// Every interval here contains the key, so for a point on the key both
    /// lists match in full, for a point below only the prefix of the
    /// ascending lower bounds can match, and symmetrically above.
    pub fn stab(&self, point: isize, out: &mut Vec<ClauseId>) {
        if point == self.key {
            out.extend(self.lower_bounds.iter().map(|entry| entry.cid));
        } else if point < self.key {
            for entry in &self.lower_bounds {
                if entry.bound > point {
                    break;
                }
                out.push(entry.cid);
            }
        } else {
            for entry in &self.upper_bounds {
                if entry.bound < point {
                    break;
                }
                out.push(entry.cid);
            }
        }
    }

    /// Recomputes the subtree endpoint aggregates from the node-local lists
    /// and the children's aggregates.
    pub fn update_aggregates(&mut self) {
        let mut min_lower = self
            .lower_bounds
            .first()
            .map(|entry| entry.bound)
            .unwrap_or(isize::max_value());
        let mut max_upper = self
            .upper_bounds
            .first()
            .map(|entry| entry.bound)
            .unwrap_or(isize::min_value());

        if let Some(left) = &self.left {
            min_lower = min(min_lower, left.subtree_min_lower);
            max_upper = max(max_upper, left.subtree_max_upper);
        }
        if let Some(right) = &self.right {
            min_lower = min(min_lower, right.subtree_min_lower);
            max_upper = max(max_upper, right.subtree_max_upper);
        }

        self.subtree_min_lower = min_lower;
        self.subtree_max_upper = max_upper;
    }
}
