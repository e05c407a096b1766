//! Greedy Ward merge scheduling.
//!
//! [`HierarchicalTree`] owns the samples, the append-only cluster array and a
//! min-cost queue of [`MergeCandidate`]s among the active clusters. Each merge
//! step pops the cheapest live candidate, appends the merged cluster,
//! retires its two children and then rebuilds the whole queue from the
//! surviving clusters. Rebuilding from scratch costs `O(k²)` scores per step
//! for `k` active clusters, which keeps invalidation trivially correct: the
//! queue never outlives the cluster set it was scored against.
//!
//! Candidates that reference an inactive cluster are still discarded when
//! popped, so the loop stays correct if the queue is ever maintained
//! incrementally.

mod scoring;

use std::{cmp::Reverse, collections::BinaryHeap, num::NonZeroUsize};

#[cfg(feature = "metrics")]
use std::time::Instant;

use tracing::{Span, debug, field, info, instrument, trace};

use crate::{
    Result,
    builder::WardBuilder,
    candidate::MergeCandidate,
    cluster::{Cluster, ClusterId, WardCriterion},
    dendrogram::{Dendrogram, MergeStep},
    error::WardError,
    samples::SampleMatrix,
};

/// Validated settings handed over by [`WardBuilder`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct TreeConfig {
    pub(crate) target: NonZeroUsize,
    pub(crate) criterion: WardCriterion,
    pub(crate) parallel: bool,
}

/// Agglomerative Ward clustering driven by a priority queue.
///
/// # Examples
/// ```
/// use wardheap_core::{ClusterId, HierarchicalTree, SampleMatrix};
///
/// let samples = SampleMatrix::try_from_rows(vec![
///     vec![0.0, 0.0],
///     vec![1.0, 1.0],
///     vec![5.0, 25.0],
/// ])?;
/// let mut tree = HierarchicalTree::new(samples)?;
///
/// let first = tree.merge_step()?.expect("two merges remain");
/// assert_eq!(first.merged, ClusterId::new(3));
/// assert_eq!(first.cost, 0.5);
/// assert_eq!(tree.cluster(first.merged).map(|c| c.members()), Some(&[0, 1][..]));
///
/// let dendrogram = tree.run()?;
/// assert_eq!(dendrogram.len(), 5);
/// assert_eq!(dendrogram.root().map(|c| c.members()), Some(&[0, 1, 2][..]));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct HierarchicalTree {
    samples: SampleMatrix,
    clusters: Vec<Cluster>,
    queue: BinaryHeap<Reverse<MergeCandidate>>,
    active: usize,
    config: TreeConfig,
    stale_discards: usize,
}

impl HierarchicalTree {
    /// Builds a tree with the default configuration: merge down to a single
    /// root using [`WardCriterion::Variance`].
    ///
    /// # Errors
    /// Propagates any error from [`WardBuilder::build`].
    pub fn new(samples: SampleMatrix) -> Result<Self> {
        WardBuilder::new().build(samples)
    }

    #[instrument(
        name = "core.tree.new",
        err,
        skip(samples, config),
        fields(
            samples = samples.rows(),
            dimension = samples.dimension(),
            target = config.target.get(),
            criterion = %config.criterion,
            parallel = config.parallel,
        ),
    )]
    pub(crate) fn with_config(samples: SampleMatrix, config: TreeConfig) -> Result<Self> {
        let rows = samples.rows();
        // Room for every merge down to the root.
        let mut clusters = Vec::with_capacity(rows.saturating_mul(2).saturating_sub(1));
        clusters.extend((0..rows).map(|row| Cluster::leaf(ClusterId::new(row), row)));

        let mut tree = Self {
            samples,
            clusters,
            queue: BinaryHeap::new(),
            active: rows,
            config,
            stale_discards: 0,
        };
        if !tree.is_complete() {
            tree.rebuild_queue()?;
        }
        Ok(tree)
    }

    /// The samples being clustered.
    #[must_use]
    pub fn samples(&self) -> &SampleMatrix {
        &self.samples
    }

    /// Every cluster created so far, indexed by id.
    #[must_use]
    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    /// Looks up a cluster by id.
    #[must_use]
    pub fn cluster(&self, id: ClusterId) -> Option<&Cluster> {
        self.clusters.get(id.get())
    }

    /// Iterates the clusters that have not been merged away.
    pub fn active_clusters(&self) -> impl Iterator<Item = &Cluster> + '_ {
        self.clusters.iter().filter(|cluster| cluster.is_active())
    }

    /// Number of clusters that have not been merged away.
    #[must_use]
    #[rustfmt::skip]
    pub const fn active_count(&self) -> usize { self.active }

    /// Number of candidates currently queued.
    #[must_use]
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Number of stale candidates discarded so far.
    #[must_use]
    #[rustfmt::skip]
    pub const fn stale_discards(&self) -> usize { self.stale_discards }

    /// Number of clusters at which the merge loop stops.
    #[must_use]
    pub const fn target_clusters(&self) -> usize {
        self.config.target.get()
    }

    /// The merge-cost criterion in use.
    #[must_use]
    pub const fn criterion(&self) -> WardCriterion {
        self.config.criterion
    }

    /// Returns whether no further merges will be performed.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.active <= self.config.target.get()
    }

    /// Performs one merge, or returns `Ok(None)` once the tree is complete.
    ///
    /// The merged cluster takes the next free id. Its left child is the
    /// child covering the smaller sample index, so members stay rooted at the
    /// lowest sample they contain.
    ///
    /// # Errors
    /// Returns [`WardError::QueueExhausted`] if no live candidate remains
    /// before the terminal state, and [`WardError::UnknownCluster`] if a
    /// candidate references an id that was never created. Both indicate broken
    /// bookkeeping rather than bad input.
    pub fn merge_step(&mut self) -> Result<Option<MergeStep>> {
        if self.is_complete() {
            return Ok(None);
        }

        let candidate = self.pop_live_candidate()?;
        let (left, right) = self.orient(candidate)?;
        let id = ClusterId::new(self.clusters.len());
        let merged = Cluster::merged(id, left, right, candidate.cost());
        let step = MergeStep {
            left: left.id(),
            right: right.id(),
            merged: id,
            cost: candidate.cost(),
        };

        self.retire(step.left);
        self.retire(step.right);
        self.clusters.push(merged);
        self.active -= 1;

        debug!(
            merged = %step.merged,
            left = %step.left,
            right = %step.right,
            cost = step.cost,
            active = self.active,
            "merged clusters"
        );
        #[cfg(feature = "metrics")]
        metrics::counter!("ward_merges_total").increment(1);

        if self.is_complete() {
            self.queue.clear();
        } else {
            self.rebuild_queue()?;
        }
        Ok(Some(step))
    }

    /// Runs merge steps until the tree is complete and returns the
    /// dendrogram.
    ///
    /// # Errors
    /// Propagates any error from [`Self::merge_step`].
    #[instrument(
        name = "core.tree.run",
        err,
        skip(self),
        fields(
            samples = self.samples.rows(),
            target = self.config.target.get(),
            merges = field::Empty,
        ),
    )]
    pub fn run(mut self) -> Result<Dendrogram> {
        let mut merges = 0_usize;
        while self.merge_step()?.is_some() {
            merges += 1;
        }
        Span::current().record("merges", merges);
        info!(
            merges,
            clusters = self.active,
            stale = self.stale_discards,
            "dendrogram build completed"
        );
        Ok(Dendrogram::from_parts(
            self.samples.rows(),
            self.clusters,
            self.config.criterion,
        ))
    }

    fn pop_live_candidate(&mut self) -> Result<MergeCandidate> {
        loop {
            let Some(Reverse(candidate)) = self.queue.pop() else {
                return Err(WardError::QueueExhausted {
                    active: self.active,
                });
            };
            if self.is_live(&candidate)? {
                return Ok(candidate);
            }
            self.stale_discards += 1;
            trace!(
                left = %candidate.left(),
                right = %candidate.right(),
                "discarded stale candidate"
            );
            #[cfg(feature = "metrics")]
            metrics::counter!("ward_stale_candidates_total").increment(1);
        }
    }

    fn is_live(&self, candidate: &MergeCandidate) -> Result<bool> {
        let left = self.require(candidate.left())?;
        let right = self.require(candidate.right())?;
        Ok(left.is_active() && right.is_active() && left.id() != right.id())
    }

    fn orient(&self, candidate: MergeCandidate) -> Result<(&Cluster, &Cluster)> {
        let a = self.require(candidate.left())?;
        let b = self.require(candidate.right())?;
        if b.members().first() < a.members().first() {
            Ok((b, a))
        } else {
            Ok((a, b))
        }
    }

    fn require(&self, id: ClusterId) -> Result<&Cluster> {
        self.cluster(id).ok_or(WardError::UnknownCluster { id })
    }

    fn retire(&mut self, id: ClusterId) {
        if let Some(cluster) = self.clusters.get_mut(id.get()) {
            cluster.deactivate();
        }
    }

    #[instrument(
        name = "core.tree.rebuild_queue",
        level = "debug",
        err,
        skip(self),
        fields(active = self.active, candidates = field::Empty),
    )]
    fn rebuild_queue(&mut self) -> Result<()> {
        #[cfg(feature = "metrics")]
        let started = Instant::now();

        let active: Vec<&Cluster> = self.active_clusters().collect();
        debug_assert_eq!(active.len(), self.active);
        let candidates = scoring::score_pairs(
            &self.samples,
            &active,
            self.config.criterion,
            self.config.parallel,
        )?;
        debug_assert_eq!(candidates.len(), scoring::pair_count(self.active));
        Span::current().record("candidates", candidates.len());

        self.queue = candidates.into_iter().map(Reverse).collect();

        #[cfg(feature = "metrics")]
        metrics::histogram!("ward_queue_rebuild_seconds").record(started.elapsed().as_secs_f64());
        Ok(())
    }
}
