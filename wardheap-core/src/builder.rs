//! Builder for configuring Ward dendrogram builds.
//!
//! Exposes the scoring-strategy selection surface and the validation applied
//! before a [`HierarchicalTree`] is constructed.

use std::num::NonZeroUsize;

use crate::{
    Result,
    cluster::WardCriterion,
    error::WardError,
    samples::SampleMatrix,
    tree::{HierarchicalTree, TreeConfig},
};

/// Selects how pairwise merge costs are computed when the queue is rebuilt.
///
/// `Auto` uses the rayon-backed parallel scorer when the `parallel` feature is
/// compiled in and the sequential scorer otherwise. Both produce identical
/// queues, so the choice never changes the resulting dendrogram.
///
/// # Examples
/// ```
/// use wardheap_core::ScoringStrategy;
///
/// let strategy = ScoringStrategy::default();
/// assert!(matches!(strategy, ScoringStrategy::Auto));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScoringStrategy {
    /// Let the library pick.
    #[default]
    Auto,
    /// Score pairs on the calling thread.
    Sequential,
    /// Score pairs on the rayon thread pool.
    Parallel,
}

impl ScoringStrategy {
    fn resolve(self) -> Result<bool> {
        match self {
            Self::Auto => Ok(cfg!(feature = "parallel")),
            Self::Sequential => Ok(false),
            #[cfg(feature = "parallel")]
            Self::Parallel => Ok(true),
            #[cfg(not(feature = "parallel"))]
            Self::Parallel => Err(WardError::BackendUnavailable {
                requested: Self::Parallel,
            }),
        }
    }
}

/// Configures and constructs [`HierarchicalTree`] instances.
///
/// # Examples
/// ```
/// use wardheap_core::{SampleMatrix, WardBuilder, WardCriterion};
///
/// let samples = SampleMatrix::try_from_rows(vec![
///     vec![0.0, 0.0],
///     vec![1.0, 1.0],
///     vec![5.0, 25.0],
/// ])?;
/// let tree = WardBuilder::new()
///     .with_target_clusters(2)
///     .with_criterion(WardCriterion::SumOfSquares)
///     .build(samples)?;
/// assert_eq!(tree.target_clusters(), 2);
/// assert_eq!(tree.active_count(), 3);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct WardBuilder {
    target_clusters: usize,
    criterion: WardCriterion,
    scoring: ScoringStrategy,
}

impl Default for WardBuilder {
    fn default() -> Self {
        Self {
            target_clusters: 1,
            criterion: WardCriterion::Variance,
            scoring: ScoringStrategy::Auto,
        }
    }
}

impl WardBuilder {
    /// Creates a builder that merges down to a single root using the
    /// variance criterion.
    ///
    /// # Examples
    /// ```
    /// use wardheap_core::{ScoringStrategy, WardBuilder, WardCriterion};
    ///
    /// let builder = WardBuilder::new();
    /// assert_eq!(builder.target_clusters(), 1);
    /// assert_eq!(builder.criterion(), WardCriterion::Variance);
    /// assert_eq!(builder.scoring(), ScoringStrategy::Auto);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stops the merge loop once `count` clusters remain.
    #[must_use]
    pub const fn with_target_clusters(mut self, count: usize) -> Self {
        self.target_clusters = count;
        self
    }

    /// Returns the configured number of final clusters.
    #[must_use]
    pub const fn target_clusters(&self) -> usize {
        self.target_clusters
    }

    /// Sets the merge-cost criterion.
    #[must_use]
    pub const fn with_criterion(mut self, criterion: WardCriterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Returns the configured merge-cost criterion.
    #[must_use]
    pub const fn criterion(&self) -> WardCriterion {
        self.criterion
    }

    /// Sets the pairwise scoring strategy.
    #[must_use]
    pub const fn with_scoring(mut self, scoring: ScoringStrategy) -> Self {
        self.scoring = scoring;
        self
    }

    /// Returns the configured scoring strategy.
    #[must_use]
    pub const fn scoring(&self) -> ScoringStrategy {
        self.scoring
    }

    /// Validates the configuration against `samples` and constructs the
    /// tree, scoring every pair of leaves.
    ///
    /// # Errors
    /// Returns [`WardError::InvalidTargetClusters`] for a target of zero,
    /// [`WardError::TargetExceedsSamples`] when the target is larger than the
    /// number of samples, and [`WardError::BackendUnavailable`] when parallel
    /// scoring is requested without the `parallel` feature.
    pub fn build(self, samples: SampleMatrix) -> Result<HierarchicalTree> {
        let target = NonZeroUsize::new(self.target_clusters).ok_or(
            WardError::InvalidTargetClusters {
                got: self.target_clusters,
            },
        )?;
        if target.get() > samples.rows() {
            return Err(WardError::TargetExceedsSamples {
                target: target.get(),
                samples: samples.rows(),
            });
        }
        let parallel = self.scoring.resolve()?;

        HierarchicalTree::with_config(
            samples,
            TreeConfig {
                target,
                criterion: self.criterion,
                parallel,
            },
        )
    }
}
