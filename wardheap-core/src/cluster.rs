//! Clusters in the evolving dendrogram and the Ward linkage cost.
//!
//! A cluster is either a leaf wrapping one sample or the merge of two earlier
//! clusters. Clusters store member sample indices rather than copies of the
//! samples; variance is always evaluated against the owning
//! [`SampleMatrix`].

use std::fmt;

use crate::{candidate::MergeCandidate, error::WardError, samples::SampleMatrix};

/// Identifier of a cluster within one dendrogram.
///
/// Leaves take the ids `0..n`; every merge takes the next id in creation
/// order, so a cluster's id is also its index in the cluster array.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClusterId(usize);

impl ClusterId {
    /// Wraps a raw id.
    #[must_use]
    #[rustfmt::skip]
    pub const fn new(id: usize) -> Self { Self(id) }

    /// Returns the raw id.
    #[must_use]
    #[rustfmt::skip]
    pub const fn get(self) -> usize { self.0 }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<usize> for ClusterId {
    fn from(value: usize) -> Self {
        Self(value)
    }
}

/// How the cost of merging two clusters is measured.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WardCriterion {
    /// Increase in mean squared distance to the centroid:
    /// `variance(a ∪ b) − (variance(a) + variance(b))`.
    ///
    /// Always non-negative for two singletons. It can be negative when a
    /// small cluster sits close to the centroid of a much larger one.
    #[default]
    Variance,
    /// Increase in the within-cluster sum of squares (variance times member
    /// count). Non-negative for every pair of disjoint clusters, and merge
    /// costs never decrease over a build.
    SumOfSquares,
}

impl fmt::Display for WardCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Variance => "variance",
            Self::SumOfSquares => "sum-of-squares",
        })
    }
}

/// A node of the dendrogram.
#[derive(Clone, Debug, PartialEq)]
pub struct Cluster {
    id: ClusterId,
    children: Option<(ClusterId, ClusterId)>,
    members: Vec<usize>,
    merge_cost: Option<f64>,
    active: bool,
}

impl Cluster {
    /// Creates an active leaf covering the single sample `sample`.
    #[must_use]
    pub fn leaf(id: ClusterId, sample: usize) -> Self {
        Self {
            id,
            children: None,
            members: vec![sample],
            merge_cost: None,
            active: true,
        }
    }

    /// Creates the active cluster produced by merging `left` and `right`.
    ///
    /// Members are `left`'s followed by `right`'s.
    #[must_use]
    pub fn merged(id: ClusterId, left: &Self, right: &Self, cost: f64) -> Self {
        Self {
            id,
            children: Some((left.id, right.id)),
            members: left.combine(right),
            merge_cost: Some(cost),
            active: true,
        }
    }

    /// Returns this cluster's id.
    #[must_use]
    #[rustfmt::skip]
    pub const fn id(&self) -> ClusterId { self.id }

    /// Returns the ids of the two merged clusters, or `None` for a leaf.
    #[must_use]
    #[rustfmt::skip]
    pub const fn children(&self) -> Option<(ClusterId, ClusterId)> { self.children }

    /// Returns the id of the left child, if any.
    #[must_use]
    pub fn left_id(&self) -> Option<ClusterId> {
        self.children.map(|(left, _)| left)
    }

    /// Returns the id of the right child, if any.
    #[must_use]
    pub fn right_id(&self) -> Option<ClusterId> {
        self.children.map(|(_, right)| right)
    }

    /// Returns the sample indices covered by this cluster.
    #[must_use]
    pub fn members(&self) -> &[usize] {
        &self.members
    }

    /// Returns the number of samples covered by this cluster.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Always `false`: every cluster covers at least one sample.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Returns the cost of the merge that created this cluster.
    #[must_use]
    #[rustfmt::skip]
    pub const fn merge_cost(&self) -> Option<f64> { self.merge_cost }

    /// Returns whether this cluster is a leaf.
    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Returns whether this cluster has not yet been merged away.
    #[must_use]
    #[rustfmt::skip]
    pub const fn is_active(&self) -> bool { self.active }

    pub(crate) fn deactivate(&mut self) {
        self.active = false;
    }

    /// Returns this cluster's members followed by `other`'s.
    ///
    /// # Examples
    /// ```
    /// use wardheap_core::{Cluster, ClusterId};
    ///
    /// let a = Cluster::leaf(ClusterId::new(0), 0);
    /// let b = Cluster::leaf(ClusterId::new(1), 1);
    /// assert_eq!(b.combine(&a), vec![1, 0]);
    /// ```
    #[must_use]
    pub fn combine(&self, other: &Self) -> Vec<usize> {
        let mut members = Vec::with_capacity(self.len() + other.len());
        members.extend_from_slice(&self.members);
        members.extend_from_slice(&other.members);
        members
    }

    /// Mean squared Euclidean distance of the members from their centroid.
    ///
    /// A single-member cluster has variance `0.0`.
    ///
    /// # Errors
    /// Returns [`WardError::SampleOutOfBounds`] when a member index is not a
    /// row of `samples`.
    ///
    /// # Examples
    /// ```
    /// use wardheap_core::{Cluster, ClusterId, SampleMatrix};
    ///
    /// let samples = SampleMatrix::try_from_rows(vec![vec![2.0, 2.0], vec![0.0, 2.0]])?;
    /// let a = Cluster::leaf(ClusterId::new(0), 0);
    /// let b = Cluster::leaf(ClusterId::new(1), 1);
    /// let both = Cluster::merged(ClusterId::new(2), &a, &b, 1.0);
    /// assert_eq!(a.variance(&samples)?, 0.0);
    /// assert_eq!(both.variance(&samples)?, 1.0);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn variance(&self, samples: &SampleMatrix) -> Result<f64, WardError> {
        Dispersion::of(samples, &self.members, &[]).map(|d| d.variance())
    }

    /// Ward cost of merging `self` and `other` under
    /// [`WardCriterion::Variance`].
    ///
    /// # Errors
    /// Returns [`WardError::SampleOutOfBounds`] when a member of either
    /// cluster is not a row of `samples`.
    pub fn ward(&self, other: &Self, samples: &SampleMatrix) -> Result<MergeCandidate, WardError> {
        self.ward_with(other, samples, WardCriterion::Variance)
    }

    /// Ward cost of merging `self` and `other` under `criterion`.
    ///
    /// # Errors
    /// Returns [`WardError::SampleOutOfBounds`] when a member of either
    /// cluster is not a row of `samples`.
    pub fn ward_with(
        &self,
        other: &Self,
        samples: &SampleMatrix,
        criterion: WardCriterion,
    ) -> Result<MergeCandidate, WardError> {
        let left = Dispersion::of(samples, &self.members, &[])?;
        let right = Dispersion::of(samples, &other.members, &[])?;
        let union = Dispersion::of(samples, &self.members, &other.members)?;
        let cost = match criterion {
            WardCriterion::Variance => union.variance() - (left.variance() + right.variance()),
            WardCriterion::SumOfSquares => {
                union.sum_of_squares - (left.sum_of_squares + right.sum_of_squares)
            }
        };
        Ok(MergeCandidate::new(self.id, other.id, cost))
    }
}

/// Sum of squared distances to the centroid over a set of members.
struct Dispersion {
    count: usize,
    sum_of_squares: f64,
}

impl Dispersion {
    /// Evaluates the dispersion of `head` and `tail` taken together, without
    /// materialising their concatenation.
    fn of(samples: &SampleMatrix, head: &[usize], tail: &[usize]) -> Result<Self, WardError> {
        let count = head.len() + tail.len();
        if count <= 1 {
            // Still validate the lone member.
            for &index in head.iter().chain(tail) {
                row(samples, index)?;
            }
            return Ok(Self {
                count,
                sum_of_squares: 0.0,
            });
        }

        let mut centroid = vec![0.0_f64; samples.dimension()];
        for &index in head.iter().chain(tail) {
            for (acc, value) in centroid.iter_mut().zip(row(samples, index)?) {
                *acc += value;
            }
        }
        let divisor = count as f64;
        for acc in &mut centroid {
            *acc /= divisor;
        }

        let mut sum_of_squares = 0.0_f64;
        for &index in head.iter().chain(tail) {
            sum_of_squares += row(samples, index)?
                .iter()
                .zip(&centroid)
                .map(|(value, mean)| (value - mean) * (value - mean))
                .sum::<f64>();
        }
        Ok(Self {
            count,
            sum_of_squares,
        })
    }

    fn variance(&self) -> f64 {
        if self.count <= 1 {
            return 0.0;
        }
        let divisor = self.count as f64;
        self.sum_of_squares / divisor
    }
}

fn row(samples: &SampleMatrix, index: usize) -> Result<&[f64], WardError> {
    samples.row(index).ok_or(WardError::SampleOutOfBounds {
        index,
        rows: samples.rows(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn pair() -> SampleMatrix {
        SampleMatrix::try_from_rows(vec![vec![2.0, 2.0], vec![0.0, 2.0]]).expect("valid rows")
    }

    fn leaf(id: usize) -> Cluster {
        Cluster::leaf(ClusterId::new(id), id)
    }

    #[rstest]
    fn leaf_variance_is_zero(pair: SampleMatrix) {
        assert_eq!(leaf(0).variance(&pair).expect("in bounds"), 0.0);
        assert_eq!(leaf(1).variance(&pair).expect("in bounds"), 0.0);
    }

    #[rstest]
    fn merged_variance_is_mean_squared_distance(pair: SampleMatrix) {
        let merged = Cluster::merged(ClusterId::new(2), &leaf(0), &leaf(1), 0.0);
        let first = merged.variance(&pair).expect("in bounds");
        assert_eq!(first, 1.0);
        assert_eq!(merged.variance(&pair).expect("in bounds"), first);
    }

    #[rstest]
    #[case::variance(WardCriterion::Variance, 1.0)]
    #[case::sum_of_squares(WardCriterion::SumOfSquares, 2.0)]
    fn ward_cost_of_two_leaves(
        pair: SampleMatrix,
        #[case] criterion: WardCriterion,
        #[case] expected: f64,
    ) {
        let candidate = leaf(1)
            .ward_with(&leaf(0), &pair, criterion)
            .expect("in bounds");
        assert_eq!(candidate.cost(), expected);
        assert_eq!(candidate.left(), ClusterId::new(0));
        assert_eq!(candidate.right(), ClusterId::new(1));
    }

    #[test]
    fn merged_records_children_and_cost() {
        let merged = Cluster::merged(ClusterId::new(5), &leaf(3), &leaf(1), 0.25);
        assert_eq!(merged.children(), Some((ClusterId::new(3), ClusterId::new(1))));
        assert_eq!(merged.left_id(), Some(ClusterId::new(3)));
        assert_eq!(merged.right_id(), Some(ClusterId::new(1)));
        assert_eq!(merged.members(), &[3, 1]);
        assert_eq!(merged.merge_cost(), Some(0.25));
        assert!(!merged.is_leaf());
        assert!(merged.is_active());
    }

    #[test]
    fn combine_does_not_mutate_inputs() {
        let a = Cluster::merged(ClusterId::new(4), &leaf(0), &leaf(2), 0.0);
        let b = leaf(1);
        let combined = a.combine(&b);
        assert_eq!(combined, vec![0, 2, 1]);
        assert_eq!(combined.len(), a.len() + b.len());
        assert_eq!(a.members(), &[0, 2]);
        assert_eq!(b.members(), &[1]);
    }

    #[rstest]
    fn out_of_range_members_are_reported(pair: SampleMatrix) {
        let stray = leaf(9);
        let err = stray.variance(&pair).expect_err("row 9 does not exist");
        assert_eq!(err, WardError::SampleOutOfBounds { index: 9, rows: 2 });
        let err = leaf(0).ward(&stray, &pair).expect_err("row 9 does not exist");
        assert!(matches!(err, WardError::SampleOutOfBounds { index: 9, .. }));
    }
}
