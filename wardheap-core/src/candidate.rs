//! Merge candidates ordered for the Ward priority queue.

use std::cmp::Ordering;

use crate::cluster::ClusterId;

/// A prospective merge of two clusters and its Ward cost.
///
/// Candidates are stored in canonical form (`left < right`) and ordered by
/// cost, then by `left`, then by `right`, so equal-cost merges resolve to
/// the lexicographically smallest id pair on every platform. A candidate
/// carries no knowledge of whether its clusters are still active; the tree
/// checks that when the candidate is popped.
///
/// # Examples
/// ```
/// use wardheap_core::{ClusterId, MergeCandidate};
///
/// let candidate = MergeCandidate::new(ClusterId::new(4), ClusterId::new(1), 0.5);
/// assert_eq!(candidate.left(), ClusterId::new(1));
/// assert_eq!(candidate.right(), ClusterId::new(4));
/// assert!(candidate < MergeCandidate::new(ClusterId::new(0), ClusterId::new(2), 0.75));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct MergeCandidate {
    left: ClusterId,
    right: ClusterId,
    cost: f64,
}

impl MergeCandidate {
    /// Creates a candidate, swapping the ids when needed so `left < right`.
    #[must_use]
    pub fn new(a: ClusterId, b: ClusterId, cost: f64) -> Self {
        let (left, right) = if a <= b { (a, b) } else { (b, a) };
        Self { left, right, cost }
    }

    /// Returns the smaller cluster id.
    #[must_use]
    #[rustfmt::skip]
    pub const fn left(&self) -> ClusterId { self.left }

    /// Returns the larger cluster id.
    #[must_use]
    #[rustfmt::skip]
    pub const fn right(&self) -> ClusterId { self.right }

    /// Returns the Ward cost of performing this merge.
    #[must_use]
    #[rustfmt::skip]
    pub const fn cost(&self) -> f64 { self.cost }
}

impl PartialEq for MergeCandidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}

impl Eq for MergeCandidate {}

impl Ord for MergeCandidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cost
            .total_cmp(&other.cost)
            .then_with(|| self.left.cmp(&other.left))
            .then_with(|| self.right.cmp(&other.right))
    }
}

impl PartialOrd for MergeCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
