//! AVL tree over clause literal-intervals with stabbing queries.
//!
//! Each stored clause contributes the interval between its smallest and
//! largest signed literal. Nodes are keyed on interval midpoints and host
//! every inserted interval that contains their key, so a single node can
//! carry many clauses. A stabbing query with a literal returns the ids of all
//! clauses whose interval contains that literal; the result may contain a
//! clause more than once when branches overlap, callers deduplicate.
//!
//! Children are owned by their parent, the root by the tree. Balancing works
//! without parent links: insertion and deletion retrace through the recursion
//! by reporting height changes upward.
use blocklit_formula::{ClauseId, Lit, LiteralBounds};

mod node;

use node::Node;
pub use node::BalancingFactor;

/// Outcome of removing a clause interval from the tree.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ClauseRemovalResult {
    Removed,
    /// No entry for the clause at the expected host node.
    NotFound,
    /// The clause is present at the host node but under different bounds,
    /// or only one of the two endpoint lists references it. Indicates the
    /// caller passed stale bounds.
    ValidationError,
}

/// Midpoint of a literal interval, rounding halves away from zero.
fn midpoint(lo: isize, hi: isize) -> isize {
    let sum = lo + hi;
    (sum + sum.signum()) / 2
}

/// The interval tree, mapping literal stabs to overlapping clause intervals.
#[derive(Default)]
pub struct AvlIntervalTree {
    root: Option<Box<Node>>,
    len: usize,
}

impl AvlIntervalTree {
    pub fn new() -> AvlIntervalTree {
        AvlIntervalTree::default()
    }

    /// Number of stored clause intervals.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Inserts the literal interval of clause `cid`.
    ///
    /// The interval joins the first node on the search path whose key it
    /// contains; otherwise a new leaf keyed on the interval midpoint is
    /// created. Returns false when the clause is already stored at its host
    /// node under the same bounds.
    pub fn insert(&mut self, cid: ClauseId, bounds: LiteralBounds) -> bool {
        let lo = bounds.lower.to_dimacs();
        let hi = bounds.upper.to_dimacs();
        let m = midpoint(lo, hi);

        let inserted = match self.root.as_mut() {
            None => {
                self.root = Some(Box::new(Node::new(m, lo, hi, cid)));
                true
            }
            Some(root) => insert_node(root, cid, lo, hi, m).0,
        };
        if inserted {
            self.len += 1;
        }
        inserted
    }

    /// Removes the literal interval of clause `cid`.
    ///
    /// The host node's key lies inside `[lo, hi]`, but rotations since the
    /// insertion may have moved it off the plain midpoint descent path, so
    /// the search walks every node whose key falls into the interval, with
    /// the usual BST range pruning. A node whose endpoint lists run empty is
    /// physically deleted and the tree is rebalanced.
    pub fn remove(&mut self, cid: ClauseId, bounds: LiteralBounds) -> ClauseRemovalResult {
        let lo = bounds.lower.to_dimacs();
        let hi = bounds.upper.to_dimacs();

        let (result, _) = remove_node(&mut self.root, cid, lo, hi);
        if result == ClauseRemovalResult::Removed {
            self.len -= 1;
        }
        result
    }

    /// Ids of every clause whose literal interval contains the literal.
    ///
    /// Duplicates across branches are possible; callers deduplicate.
    pub fn overlaps(&self, lit: Lit) -> Vec<ClauseId> {
        let mut out = vec![];
        collect_overlaps(&self.root, lit.to_dimacs(), &mut out);
        out
    }
}

fn insert_node(node: &mut Box<Node>, cid: ClauseId, lo: isize, hi: isize, m: isize) -> (bool, bool) {
    if lo <= node.key && node.key <= hi {
        if !node.insert_bounds(lo, hi, cid) {
            return (false, false);
        }
        node.subtree_min_lower = node.subtree_min_lower.min(lo);
        node.subtree_max_upper = node.subtree_max_upper.max(hi);
        return (true, false);
    }

    let went_left = m < node.key;
    let child = if went_left {
        &mut node.left
    } else {
        &mut node.right
    };

    let child_grew = match child.as_mut() {
        Some(child) => {
            let (inserted, grew) = insert_node(child, cid, lo, hi, m);
            if !inserted {
                return (false, false);
            }
            grew
        }
        None => {
            *child = Some(Box::new(Node::new(m, lo, hi, cid)));
            true
        }
    };

    node.subtree_min_lower = node.subtree_min_lower.min(lo);
    node.subtree_max_upper = node.subtree_max_upper.max(hi);

    if !child_grew {
        return (true, false);
    }

    use BalancingFactor::*;
    let grew = if went_left {
        match node.balance {
            RightHeavy => {
                node.balance = Balanced;
                false
            }
            Balanced => {
                node.balance = LeftHeavy;
                true
            }
            LeftHeavy => {
                rebalance_left_heavy(node);
                false
            }
        }
    } else {
        match node.balance {
            LeftHeavy => {
                node.balance = Balanced;
                false
            }
            Balanced => {
                node.balance = RightHeavy;
                true
            }
            RightHeavy => {
                rebalance_right_heavy(node);
                false
            }
        }
    };
    (true, grew)
}

fn remove_node(
    slot: &mut Option<Box<Node>>,
    cid: ClauseId,
    lo: isize,
    hi: isize,
) -> (ClauseRemovalResult, bool) {
    use ClauseRemovalResult::*;

    enum Step {
        Miss,
        Resolved(ClauseRemovalResult),
        DeleteHost,
        Search { left: bool, right: bool },
    }

    let step = match slot.as_mut() {
        None => Step::Miss,
        Some(node) => {
            if node.key > hi {
                Step::Search {
                    left: true,
                    right: false,
                }
            } else if node.key < lo {
                Step::Search {
                    left: false,
                    right: true,
                }
            } else {
                // A node inside the key range; the host is either this node
                // or another in-range node further down on either side.
                match (node.lower_position(lo, cid), node.upper_position(hi, cid)) {
                    (Ok(lower_position), Ok(upper_position)) => {
                        node.lower_bounds.remove(lower_position);
                        node.upper_bounds.remove(upper_position);
                        if node.lower_bounds.is_empty() {
                            Step::DeleteHost
                        } else {
                            node.update_aggregates();
                            Step::Resolved(Removed)
                        }
                    }
                    (Err(_), Err(_)) => {
                        if node.references_clause(cid) {
                            Step::Resolved(ValidationError)
                        } else {
                            Step::Search {
                                left: true,
                                right: true,
                            }
                        }
                    }
                    _ => Step::Resolved(ValidationError),
                }
            }
        }
    };

    match step {
        Step::Miss => (NotFound, false),
        Step::Resolved(result) => (result, false),
        Step::DeleteHost => (Removed, delete_root(slot)),
        Step::Search { left, right } => {
            let node = slot.as_mut().expect("searching below a present node");
            if left {
                let (result, child_shrank) = remove_node(&mut node.left, cid, lo, hi);
                match result {
                    Removed => {
                        node.update_aggregates();
                        if !child_shrank {
                            return (Removed, false);
                        }
                        return (Removed, shrink_rebalance(node, true));
                    }
                    ValidationError => return (ValidationError, false),
                    NotFound => (),
                }
            }
            if right {
                let (result, child_shrank) = remove_node(&mut node.right, cid, lo, hi);
                match result {
                    Removed => {
                        node.update_aggregates();
                        if !child_shrank {
                            return (Removed, false);
                        }
                        return (Removed, shrink_rebalance(node, false));
                    }
                    ValidationError => return (ValidationError, false),
                    NotFound => (),
                }
            }
            (NotFound, false)
        }
    }
}

/// Physically removes the node in `slot` whose endpoint lists ran empty.
/// Returns whether the subtree height decreased.
fn delete_root(slot: &mut Option<Box<Node>>) -> bool {
    let node = slot.as_mut().expect("deleting a present node");
    match (node.left.is_some(), node.right.is_some()) {
        (false, false) => {
            *slot = None;
            true
        }
        (true, false) => {
            let left = node.left.take();
            *slot = left;
            true
        }
        (false, true) => {
            let right = node.right.take();
            *slot = right;
            true
        }
        (true, true) => {
            // Move the in-order successor's payload here, then the successor
            // itself (which has no left child) is spliced out of the right
            // subtree.
            let (successor, child_shrank) = take_leftmost(&mut node.right);
            node.key = successor.key;
            node.lower_bounds = successor.lower_bounds;
            node.upper_bounds = successor.upper_bounds;
            node.update_aggregates();
            if !child_shrank {
                return false;
            }
            shrink_rebalance(node, false)
        }
    }
}

struct Payload {
    key: isize,
    lower_bounds: Vec<node::BoundEntry>,
    upper_bounds: Vec<node::BoundEntry>,
}

fn take_leftmost(slot: &mut Option<Box<Node>>) -> (Payload, bool) {
    let has_left = slot
        .as_ref()
        .expect("successor search in a non-empty subtree")
        .left
        .is_some();

    if has_left {
        let node = slot.as_mut().expect("checked above");
        let (payload, child_shrank) = take_leftmost(&mut node.left);
        node.update_aggregates();
        if !child_shrank {
            return (payload, false);
        }
        let shrank = shrink_rebalance(node, true);
        (payload, shrank)
    } else {
        let mut node = slot.take().expect("checked above");
        *slot = node.right.take();
        (
            Payload {
                key: node.key,
                lower_bounds: std::mem::replace(&mut node.lower_bounds, vec![]),
                upper_bounds: std::mem::replace(&mut node.upper_bounds, vec![]),
            },
            true,
        )
    }
}

/// Adjusts the balance of a node one of whose subtrees lost a level.
/// Returns whether the height of the subtree rooted here decreased.
fn shrink_rebalance(node: &mut Box<Node>, left_shrank: bool) -> bool {
    use BalancingFactor::*;
    if left_shrank {
        match node.balance {
            LeftHeavy => {
                node.balance = Balanced;
                true
            }
            Balanced => {
                node.balance = RightHeavy;
                false
            }
            RightHeavy => rebalance_right_heavy(node),
        }
    } else {
        match node.balance {
            RightHeavy => {
                node.balance = Balanced;
                true
            }
            Balanced => {
                node.balance = LeftHeavy;
                false
            }
            LeftHeavy => rebalance_left_heavy(node),
        }
    }
}

/// Restores the AVL invariant at a node whose left subtree is two levels
/// taller. Balance factors follow the standard post-rotation table. Returns
/// whether the subtree height decreased.
fn rebalance_left_heavy(node: &mut Box<Node>) -> bool {
    use BalancingFactor::*;
    let left_balance = node.left.as_ref().expect("left-heavy node").balance;
    match left_balance {
        LeftHeavy => {
            rotate_right(node);
            node.balance = Balanced;
            node.right.as_mut().expect("demoted node").balance = Balanced;
            true
        }
        Balanced => {
            // Only reachable through deletion; height is unchanged.
            rotate_right(node);
            node.balance = RightHeavy;
            node.right.as_mut().expect("demoted node").balance = LeftHeavy;
            false
        }
        RightHeavy => {
            let pivot_balance = node
                .left
                .as_ref()
                .and_then(|left| left.right.as_ref())
                .expect("pivot of a double rotation")
                .balance;
            rotate_left(node.left.as_mut().expect("left-heavy node"));
            rotate_right(node);
            node.balance = Balanced;
            node.left.as_mut().expect("rotated child").balance = match pivot_balance {
                RightHeavy => LeftHeavy,
                _ => Balanced,
            };
            node.right.as_mut().expect("rotated child").balance = match pivot_balance {
                LeftHeavy => RightHeavy,
                _ => Balanced,
            };
            true
        }
    }
}

/// Mirror of [`rebalance_left_heavy`].
fn rebalance_right_heavy(node: &mut Box<Node>) -> bool {
    use BalancingFactor::*;
    let right_balance = node.right.as_ref().expect("right-heavy node").balance;
    match right_balance {
        RightHeavy => {
            rotate_left(node);
            node.balance = Balanced;
            node.left.as_mut().expect("demoted node").balance = Balanced;
            true
        }
        Balanced => {
            rotate_left(node);
            node.balance = LeftHeavy;
            node.left.as_mut().expect("demoted node").balance = RightHeavy;
            false
        }
        LeftHeavy => {
            let pivot_balance = node
                .right
                .as_ref()
                .and_then(|right| right.left.as_ref())
                .expect("pivot of a double rotation")
                .balance;
            rotate_right(node.right.as_mut().expect("right-heavy node"));
            rotate_left(node);
            node.balance = Balanced;
            node.left.as_mut().expect("rotated child").balance = match pivot_balance {
                RightHeavy => LeftHeavy,
                _ => Balanced,
            };
            node.right.as_mut().expect("rotated child").balance = match pivot_balance {
                LeftHeavy => RightHeavy,
                _ => Balanced,
            };
            true
        }
    }
}

/// Left rotation on keys, balance handled by the caller. The endpoint lists
/// travel with their node; since every hosted interval contains its node's
/// key, rotations never need to split or merge them.
fn rotate_left(node: &mut Box<Node>) {
    let mut new_root = node.right.take().expect("left rotation needs a right child");
    node.right = new_root.left.take();
    node.update_aggregates();
    std::mem::swap(node, &mut new_root);
    node.left = Some(new_root);
    node.update_aggregates();
}

/// Mirror of [`rotate_left`].
fn rotate_right(node: &mut Box<Node>) {
    let mut new_root = node.left.take().expect("right rotation needs a left child");
    node.left = new_root.right.take();
    node.update_aggregates();
    std::mem::swap(node, &mut new_root);
    node.right = Some(new_root);
    node.update_aggregates();
}

fn collect_overlaps(slot: &Option<Box<Node>>, point: isize, out: &mut Vec<ClauseId>) {
    let node = match slot {
        Some(node) => node,
        None => return,
    };
    if point < node.subtree_min_lower || point > node.subtree_max_upper {
        return;
    }
    node.stab(point, out);
    collect_overlaps(&node.left, point, out);
    collect_overlaps(&node.right, point, out);
}

#[cfg(test)]
mod tests {
    use super::*;

    use blocklit_formula::lit;
    use proptest::prelude::*;
    use rustc_hash::FxHashSet;

    fn bounds(lo: isize, hi: isize) -> LiteralBounds {
        LiteralBounds {
            lower: Lit::from_dimacs(lo),
            upper: Lit::from_dimacs(hi),
        }
    }

    fn tree_of(intervals: &[(ClauseId, isize, isize)]) -> AvlIntervalTree {
        let mut tree = AvlIntervalTree::new();
        for &(cid, lo, hi) in intervals {
            assert!(tree.insert(cid, bounds(lo, hi)));
        }
        tree
    }

    fn overlap_set(tree: &AvlIntervalTree, point: isize) -> FxHashSet<ClauseId> {
        tree.overlaps(lit![point]).into_iter().collect()
    }

    fn node_cids(node: &Node) -> Vec<ClauseId> {
        node.lower_bounds.iter().map(|entry| entry.cid).collect()
    }

    /// Checks the BST, balance, and aggregate invariants; returns the height.
    fn check_invariants(slot: &Option<Box<Node>>) -> usize {
        let node = match slot {
            Some(node) => node,
            None => return 0,
        };

        assert!(!node.lower_bounds.is_empty());
        assert_eq!(node.lower_bounds.len(), node.upper_bounds.len());
        for entry in &node.lower_bounds {
            assert!(entry.bound <= node.key);
        }
        for entry in &node.upper_bounds {
            assert!(entry.bound >= node.key);
        }

        if let Some(left) = &node.left {
            assert!(left.key < node.key);
        }
        if let Some(right) = &node.right {
            assert!(right.key > node.key);
        }

        let left_height = check_invariants(&node.left);
        let right_height = check_invariants(&node.right);
        let expected_balance = match right_height as isize - left_height as isize {
            -1 => BalancingFactor::LeftHeavy,
            0 => BalancingFactor::Balanced,
            1 => BalancingFactor::RightHeavy,
            difference => panic!("unbalanced node, height difference {}", difference),
        };
        assert_eq!(node.balance, expected_balance);

        let mut min_lower = node.lower_bounds[0].bound;
        let mut max_upper = node.upper_bounds[0].bound;
        if let Some(left) = &node.left {
            min_lower = min_lower.min(left.subtree_min_lower);
            max_upper = max_upper.max(left.subtree_max_upper);
        }
        if let Some(right) = &node.right {
            min_lower = min_lower.min(right.subtree_min_lower);
            max_upper = max_upper.max(right.subtree_max_upper);
        }
        assert_eq!(node.subtree_min_lower, min_lower);
        assert_eq!(node.subtree_max_upper, max_upper);

        1 + left_height.max(right_height)
    }

    #[test]
    fn midpoint_rounds_half_away_from_zero() {
        assert_eq!(midpoint(-3, 4), 1);
        assert_eq!(midpoint(4, 7), 6);
        assert_eq!(midpoint(-5, -2), -4);
        assert_eq!(midpoint(-10, -5), -8);
        assert_eq!(midpoint(-4, 4), 0);
        assert_eq!(midpoint(6, 8), 7);
    }

    #[test]
    fn single_interval() {
        let tree = tree_of(&[(0, -3, 4)]);

        let root = tree.root.as_ref().unwrap();
        assert_eq!(root.key, 1);
        assert_eq!(root.balance, BalancingFactor::Balanced);
        assert_eq!(node_cids(root), vec![0]);
        assert_eq!(root.lower_bounds[0].bound, -3);
        assert_eq!(root.upper_bounds[0].bound, 4);

        for &point in [-3isize, 1, 4].iter() {
            assert_eq!(tree.overlaps(lit![point]), vec![0]);
        }
        assert!(tree.overlaps(lit![-4]).is_empty());
        assert!(tree.overlaps(lit![5]).is_empty());
    }

    #[test]
    fn insert_rotates_left() {
        let tree = tree_of(&[
            (0, -3, 4),
            (1, -2, 3),
            (2, 4, 7),
            (3, 6, 8),
            (4, 7, 10),
            (5, 8, 9),
        ]);

        let root = tree.root.as_ref().unwrap();
        assert_eq!(root.key, 6);
        assert_eq!(root.balance, BalancingFactor::Balanced);
        assert_eq!(node_cids(root), vec![2, 3]);

        let left = root.left.as_ref().unwrap();
        assert_eq!(left.key, 1);
        assert_eq!(left.balance, BalancingFactor::Balanced);
        assert_eq!(node_cids(left), vec![0, 1]);

        let right = root.right.as_ref().unwrap();
        assert_eq!(right.key, 9);
        assert_eq!(right.balance, BalancingFactor::Balanced);
        assert_eq!(node_cids(right), vec![4, 5]);

        check_invariants(&tree.root);
    }

    #[test]
    fn insert_rotates_right() {
        let tree = tree_of(&[
            (0, -3, 4),
            (1, -2, 5),
            (2, -5, -2),
            (3, -4, -3),
            (4, -10, -5),
            (5, -8, -5),
        ]);

        let root = tree.root.as_ref().unwrap();
        assert_eq!(root.key, -4);
        assert_eq!(node_cids(root), vec![2, 3]);

        let left = root.left.as_ref().unwrap();
        assert_eq!(left.key, -8);
        assert_eq!(node_cids(left), vec![4, 5]);

        let right = root.right.as_ref().unwrap();
        assert_eq!(right.key, 1);
        assert_eq!(node_cids(right), vec![0, 1]);

        check_invariants(&tree.root);
    }

    #[test]
    fn insert_rotates_double() {
        // Inserting clause 4 forces a left-right rotation below the root.
        let tree = tree_of(&[
            (0, 1, 4),
            (1, -5, -1),
            (2, 5, 7),
            (3, -10, -4),
            (4, -6, -4),
            (5, -8, -5),
        ]);

        let root = tree.root.as_ref().unwrap();
        assert_eq!(root.key, 3);
        assert_eq!(root.balance, BalancingFactor::LeftHeavy);
        assert_eq!(node_cids(root), vec![0]);

        let left = root.left.as_ref().unwrap();
        assert_eq!(left.key, -5);
        assert_eq!(left.balance, BalancingFactor::Balanced);
        assert_eq!(node_cids(left), vec![5, 4]);

        assert_eq!(left.left.as_ref().unwrap().key, -7);
        assert_eq!(node_cids(left.left.as_ref().unwrap()), vec![3]);
        assert_eq!(left.right.as_ref().unwrap().key, -3);
        assert_eq!(node_cids(left.right.as_ref().unwrap()), vec![1]);

        assert_eq!(root.right.as_ref().unwrap().key, 6);
        assert_eq!(node_cids(root.right.as_ref().unwrap()), vec![2]);

        check_invariants(&tree.root);
    }

    #[test]
    fn stabbing_across_levels() {
        let tree = tree_of(&[
            (0, -4, 4),
            (1, -2, 2),
            (2, -1, 3),
            (3, -6, -2),
            (4, -4, -3),
            (5, -11, -7),
        ]);
        check_invariants(&tree.root);

        let expected = |point: isize| -> FxHashSet<ClauseId> {
            [(0usize, -4, 4), (1, -2, 2), (2, -1, 3), (3, -6, -2), (4, -4, -3), (5, -11, -7)]
                .iter()
                .filter(|&&(_, lo, hi)| lo <= point && point <= hi)
                .map(|&(cid, _, _)| cid)
                .collect()
        };

        for point in -12..=6 {
            if point == 0 {
                continue;
            }
            assert_eq!(overlap_set(&tree, point), expected(point), "stab at {}", point);
        }
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let mut tree = tree_of(&[(0, -3, 4)]);
        assert!(!tree.insert(0, bounds(-3, 4)));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn remove_from_shared_node_keeps_structure() {
        let mut tree = tree_of(&[(0, -3, 4), (1, -2, 3)]);
        assert_eq!(tree.remove(0, bounds(-3, 4)), ClauseRemovalResult::Removed);

        let root = tree.root.as_ref().unwrap();
        assert_eq!(root.key, 1);
        assert_eq!(node_cids(root), vec![1]);
        assert_eq!(tree.len(), 1);
        assert!(tree.overlaps(lit![4]).is_empty());
        assert_eq!(tree.overlaps(lit![3]), vec![1]);
        check_invariants(&tree.root);
    }

    #[test]
    fn remove_reports_missing_and_stale_entries() {
        let mut tree = tree_of(&[(0, -3, 4), (1, -2, 3)]);

        assert_eq!(tree.remove(7, bounds(-3, 4)), ClauseRemovalResult::NotFound);
        // Clause 1 is hosted at the root, but under bounds [-2, 3].
        assert_eq!(
            tree.remove(1, bounds(-3, 3)),
            ClauseRemovalResult::ValidationError
        );
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn removing_last_interval_of_a_node_deletes_it() {
        let mut tree = tree_of(&[
            (0, -3, 4),
            (1, -2, 3),
            (2, 4, 7),
            (3, 6, 8),
            (4, 7, 10),
            (5, 8, 9),
        ]);

        assert_eq!(tree.remove(4, bounds(7, 10)), ClauseRemovalResult::Removed);
        assert_eq!(tree.remove(5, bounds(8, 9)), ClauseRemovalResult::Removed);

        // Node 9 is gone, the remaining structure stays balanced.
        check_invariants(&tree.root);
        assert_eq!(tree.len(), 4);
        assert!(overlap_set(&tree, 9).is_empty());
        assert_eq!(
            overlap_set(&tree, 7),
            vec![2, 3].into_iter().collect::<FxHashSet<_>>()
        );
    }

    #[test]
    fn remove_finds_hosts_displaced_by_rotations() {
        // Clause 0's host is created as the root; the rotation triggered by
        // clauses 1 and 2 pushes it below a node whose key also lies inside
        // clause 0's interval, so a plain midpoint descent would stop at the
        // wrong node.
        let mut tree = tree_of(&[(0, -10, 10), (1, 3, 5), (2, 6, 8)]);

        let root = tree.root.as_ref().unwrap();
        assert_eq!(root.key, 4);
        assert_eq!(root.left.as_ref().unwrap().key, 0);

        assert_eq!(tree.remove(0, bounds(-10, 10)), ClauseRemovalResult::Removed);
        check_invariants(&tree.root);
        assert_eq!(tree.len(), 2);
        assert!(overlap_set(&tree, -10).is_empty());
        assert_eq!(
            overlap_set(&tree, 4),
            vec![1].into_iter().collect::<FxHashSet<_>>()
        );
    }

    #[test]
    fn remove_interior_node_with_two_children() {
        let mut tree = tree_of(&[
            (0, -3, 4),
            (1, 4, 7),
            (2, -9, -6),
            (3, 9, 12),
        ]);
        check_invariants(&tree.root);

        // The root hosts only clause 0; removing it promotes the in-order
        // successor while both children survive.
        assert_eq!(tree.remove(0, bounds(-3, 4)), ClauseRemovalResult::Removed);
        check_invariants(&tree.root);
        assert_eq!(tree.len(), 3);

        assert_eq!(
            overlap_set(&tree, 5),
            vec![1].into_iter().collect::<FxHashSet<_>>()
        );
        assert_eq!(
            overlap_set(&tree, -7),
            vec![2].into_iter().collect::<FxHashSet<_>>()
        );
        assert_eq!(
            overlap_set(&tree, 10),
            vec![3].into_iter().collect::<FxHashSet<_>>()
        );
        assert!(overlap_set(&tree, -3).is_empty());
    }

    fn interval_strategy() -> impl Strategy<Value = Vec<(isize, isize)>> {
        proptest::collection::vec(
            (-40isize..=40, -40isize..=40).prop_map(|(a, b)| {
                let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
                // Bounds are literals, so 0 is not a valid endpoint.
                (if lo == 0 { -1 } else { lo }, if hi == 0 { 1 } else { hi })
            }),
            0..80,
        )
    }

    proptest! {
        #[test]
        fn overlaps_matches_naive_scan(intervals in interval_strategy(), points in proptest::collection::vec(-45isize..=45, 1..20)) {
            let tree = tree_of(
                &intervals
                    .iter()
                    .enumerate()
                    .map(|(cid, &(lo, hi))| (cid, lo, hi))
                    .collect::<Vec<_>>(),
            );
            check_invariants(&tree.root);

            for &point in &points {
                if point == 0 {
                    continue;
                }
                let expected: FxHashSet<ClauseId> = intervals
                    .iter()
                    .enumerate()
                    .filter(|&(_, &(lo, hi))| lo <= point && point <= hi)
                    .map(|(cid, _)| cid)
                    .collect();
                prop_assert_eq!(overlap_set(&tree, point), expected);
            }
        }

        #[test]
        fn insert_delete_roundtrip(intervals in interval_strategy(), seed in 0u64..1000) {
            use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

            let mut tree = tree_of(
                &intervals
                    .iter()
                    .enumerate()
                    .map(|(cid, &(lo, hi))| (cid, lo, hi))
                    .collect::<Vec<_>>(),
            );

            let mut order: Vec<usize> = (0..intervals.len()).collect();
            order.shuffle(&mut StdRng::seed_from_u64(seed));

            for cid in order {
                let (lo, hi) = intervals[cid];
                prop_assert_eq!(
                    tree.remove(cid, bounds(lo, hi)),
                    ClauseRemovalResult::Removed
                );
                check_invariants(&tree.root);
            }

            prop_assert!(tree.is_empty());
            prop_assert!(tree.root.is_none());
        }
    }
}
