//! The completed merge tree and flat cuts through it.

use std::collections::HashSet;

use crate::{
    Result,
    cluster::{Cluster, ClusterId, WardCriterion},
    error::WardError,
    partition::Partition,
};

/// One merge performed by [`crate::HierarchicalTree::merge_step`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MergeStep {
    /// Child covering the smaller sample index.
    pub left: ClusterId,
    /// The other child.
    pub right: ClusterId,
    /// Id of the cluster created by the merge.
    pub merged: ClusterId,
    /// Ward cost of the merge.
    pub cost: f64,
}

/// The cluster array produced by a finished build.
///
/// Leaves occupy ids `0..n`; internal clusters follow in merge order. A full
/// build holds `2n − 1` clusters and its last entry is the root.
#[derive(Clone, Debug, PartialEq)]
pub struct Dendrogram {
    sample_count: usize,
    clusters: Vec<Cluster>,
    criterion: WardCriterion,
}

impl Dendrogram {
    pub(crate) fn from_parts(
        sample_count: usize,
        clusters: Vec<Cluster>,
        criterion: WardCriterion,
    ) -> Self {
        Self {
            sample_count,
            clusters,
            criterion,
        }
    }

    /// Number of samples (leaves).
    #[must_use]
    #[rustfmt::skip]
    pub const fn sample_count(&self) -> usize { self.sample_count }

    /// Number of clusters, leaves included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    /// Always `false`: a dendrogram has at least one leaf.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Criterion the merge costs were measured with.
    #[must_use]
    #[rustfmt::skip]
    pub const fn criterion(&self) -> WardCriterion { self.criterion }

    /// Every cluster, indexed by id.
    #[must_use]
    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    /// Consumes the dendrogram, returning the cluster array.
    #[must_use]
    pub fn into_clusters(self) -> Vec<Cluster> {
        self.clusters
    }

    /// Looks up a cluster by id.
    #[must_use]
    pub fn cluster(&self, id: ClusterId) -> Option<&Cluster> {
        self.clusters.get(id.get())
    }

    /// Sample indices covered by cluster `id`.
    #[must_use]
    pub fn members(&self, id: ClusterId) -> Option<&[usize]> {
        self.cluster(id).map(Cluster::members)
    }

    /// The clusters that were still active when the build stopped.
    pub fn active_clusters(&self) -> impl Iterator<Item = &Cluster> + '_ {
        self.clusters.iter().filter(|cluster| cluster.is_active())
    }

    /// Number of clusters that were still active when the build stopped.
    #[must_use]
    pub fn final_cluster_count(&self) -> usize {
        // Each merge retires two clusters and adds one.
        self.sample_count - self.merge_count()
    }

    /// Number of merges performed.
    #[must_use]
    pub fn merge_count(&self) -> usize {
        self.clusters.len() - self.sample_count
    }

    /// The root covering every sample, when the build ran to one cluster.
    #[must_use]
    pub fn root(&self) -> Option<&Cluster> {
        if self.final_cluster_count() == 1 {
            self.clusters.last()
        } else {
            None
        }
    }

    /// Iterates the merges in the order they were performed.
    pub fn merges(&self) -> impl ExactSizeIterator<Item = MergeStep> + '_ {
        self.clusters
            .get(self.sample_count..)
            .unwrap_or_default()
            .iter()
            .map(|cluster| {
                let (left, right) = cluster.children().unwrap_or_default();
                MergeStep {
                    left,
                    right,
                    merged: cluster.id(),
                    cost: cluster.merge_cost().unwrap_or_default(),
                }
            })
    }

    /// Flat clustering at the point of the build where `k` clusters were
    /// active.
    ///
    /// Labels are numbered by each cluster's smallest sample index, so sample
    /// `0` always carries label `0`.
    ///
    /// # Errors
    /// Returns [`WardError::InvalidClusterCount`] unless
    /// `final_cluster_count() <= k <= sample_count()`.
    ///
    /// # Examples
    /// ```
    /// use wardheap_core::{HierarchicalTree, SampleMatrix};
    ///
    /// let samples = SampleMatrix::try_from_rows(vec![
    ///     vec![0.0, 0.0],
    ///     vec![1.0, 1.0],
    ///     vec![5.0, 25.0],
    /// ])?;
    /// let dendrogram = HierarchicalTree::new(samples)?.run()?;
    /// let partition = dendrogram.cut(2)?;
    /// assert_eq!(partition.assignments(), &[0, 0, 1]);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn cut(&self, k: usize) -> Result<Partition> {
        let min = self.final_cluster_count();
        let max = self.sample_count;
        if k < min || k > max {
            return Err(WardError::InvalidClusterCount {
                requested: k,
                min,
                max,
            });
        }

        // The first `n - k` merges produce the k-cluster state.
        let horizon = 2 * self.sample_count - k;
        let created = self.clusters.get(..horizon).unwrap_or_default();
        let consumed: HashSet<ClusterId> = created
            .iter()
            .filter_map(Cluster::children)
            .flat_map(|(left, right)| [left, right])
            .collect();

        let mut survivors: Vec<&Cluster> = created
            .iter()
            .filter(|cluster| !consumed.contains(&cluster.id()))
            .collect();
        survivors.sort_by_key(|cluster| cluster.members().iter().min().copied());

        let mut labels = vec![0_usize; self.sample_count];
        for (label, cluster) in survivors.iter().enumerate() {
            for &sample in cluster.members() {
                if let Some(slot) = labels.get_mut(sample) {
                    *slot = label;
                }
            }
        }
        Ok(Partition::from_parts(labels, survivors.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HierarchicalTree, SampleMatrix, WardBuilder};
    use rstest::{fixture, rstest};

    #[fixture]
    fn line() -> SampleMatrix {
        SampleMatrix::try_from_flat(1, vec![0.0, 0.1, 5.0, 5.2, 20.0]).expect("valid samples")
    }

    #[rstest]
    fn merges_follow_append_order(line: SampleMatrix) {
        let dendrogram = HierarchicalTree::new(line)
            .and_then(HierarchicalTree::run)
            .expect("build must succeed");
        let merged: Vec<usize> = dendrogram.merges().map(|step| step.merged.get()).collect();
        assert_eq!(merged, vec![5, 6, 7, 8]);
        assert_eq!(dendrogram.merge_count(), 4);
        assert_eq!(dendrogram.root().map(Cluster::id), Some(ClusterId::new(8)));
    }

    #[rstest]
    #[case(5, vec![0, 1, 2, 3, 4])]
    #[case(3, vec![0, 0, 1, 1, 2])]
    #[case(1, vec![0, 0, 0, 0, 0])]
    fn cut_reconstructs_intermediate_states(
        line: SampleMatrix,
        #[case] k: usize,
        #[case] expected: Vec<usize>,
    ) {
        let dendrogram = HierarchicalTree::new(line)
            .and_then(HierarchicalTree::run)
            .expect("build must succeed");
        let partition = dendrogram.cut(k).expect("k is in range");
        assert_eq!(partition.assignments(), expected.as_slice());
        assert_eq!(partition.cluster_count(), k);
    }

    #[rstest]
    fn early_stopped_dendrogram_has_no_root(line: SampleMatrix) {
        let dendrogram = WardBuilder::new()
            .with_target_clusters(2)
            .build(line)
            .and_then(HierarchicalTree::run)
            .expect("build must succeed");
        assert_eq!(dendrogram.final_cluster_count(), 2);
        assert!(dendrogram.root().is_none());
        assert_eq!(dendrogram.active_clusters().count(), 2);

        let err = dendrogram.cut(1).expect_err("only two clusters remain");
        assert_eq!(
            err,
            WardError::InvalidClusterCount {
                requested: 1,
                min: 2,
                max: 5
            }
        );
        assert!(dendrogram.cut(6).is_err());
    }
}
