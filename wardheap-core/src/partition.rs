//! Flat clusterings cut from a dendrogram.
//!
//! Provides the [`Partition`] produced by [`crate::Dendrogram::cut`] and
//! validation of externally supplied label vectors.

use thiserror::Error;

/// A flat clustering assigning every sample a label in `0..cluster_count`.
///
/// # Examples
/// ```
/// use wardheap_core::Partition;
///
/// let partition = Partition::try_from_labels(vec![0, 1, 0])?;
/// assert_eq!(partition.cluster_count(), 2);
/// assert_eq!(partition.cluster_sizes(), vec![2, 1]);
/// # Ok::<(), wardheap_core::NonContiguousLabels>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    assignments: Vec<usize>,
    cluster_count: usize,
}

/// Error returned when labels are not contiguous starting at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NonContiguousLabels {
    /// The labels do not include `0`.
    #[error("labels must include 0")]
    MissingZero,
    /// The labels skip a value below the maximum.
    #[error("labels must be contiguous; {missing} is missing")]
    Gap {
        /// Smallest label absent from the assignments.
        missing: usize,
    },
}

impl Partition {
    pub(crate) fn from_parts(assignments: Vec<usize>, cluster_count: usize) -> Self {
        debug_assert!(assignments.iter().all(|&label| label < cluster_count));
        Self {
            assignments,
            cluster_count,
        }
    }

    /// Builds a partition from labels that must be contiguous from zero.
    ///
    /// An empty label vector yields a partition with no clusters.
    ///
    /// # Errors
    /// Returns [`NonContiguousLabels::MissingZero`] when `0` is absent and
    /// [`NonContiguousLabels::Gap`] when a label below the maximum is unused.
    pub fn try_from_labels(assignments: Vec<usize>) -> Result<Self, NonContiguousLabels> {
        let Some(&max) = assignments.iter().max() else {
            return Ok(Self::from_parts(assignments, 0));
        };
        let mut seen = vec![false; max + 1];
        for &label in &assignments {
            if let Some(flag) = seen.get_mut(label) {
                *flag = true;
            }
        }
        match seen.iter().position(|&present| !present) {
            Some(0) => Err(NonContiguousLabels::MissingZero),
            Some(missing) => Err(NonContiguousLabels::Gap { missing }),
            None => Ok(Self::from_parts(assignments, max + 1)),
        }
    }

    /// Label of each sample, in sample order.
    #[must_use]
    pub fn assignments(&self) -> &[usize] {
        &self.assignments
    }

    /// Number of distinct labels.
    #[must_use]
    #[rustfmt::skip]
    pub const fn cluster_count(&self) -> usize { self.cluster_count }

    /// Number of samples carrying each label.
    #[must_use]
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0_usize; self.cluster_count];
        for &label in &self.assignments {
            if let Some(size) = sizes.get_mut(label) {
                *size += 1;
            }
        }
        sizes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(vec![], 0)]
    #[case(vec![0, 0, 0], 1)]
    #[case(vec![2, 0, 1, 1], 3)]
    fn accepts_contiguous_labels(#[case] labels: Vec<usize>, #[case] expected: usize) {
        let partition = Partition::try_from_labels(labels).expect("labels are contiguous");
        assert_eq!(partition.cluster_count(), expected);
        assert_eq!(partition.cluster_sizes().iter().sum::<usize>(), partition.assignments().len());
    }

    #[rstest]
    #[case(vec![1, 2], NonContiguousLabels::MissingZero)]
    #[case(vec![0, 3, 1], NonContiguousLabels::Gap { missing: 2 })]
    fn rejects_non_contiguous_labels(
        #[case] labels: Vec<usize>,
        #[case] expected: NonContiguousLabels,
    ) {
        assert_eq!(Partition::try_from_labels(labels), Err(expected));
    }
}
