//! Pairwise Ward scoring over the active clusters.
//!
//! Scoring is a pure function of two immutable clusters and the sample
//! matrix, so the rayon path simply fans the pairs out and collects the
//! results before the heap is rebuilt.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::{
    Result,
    candidate::MergeCandidate,
    cluster::{Cluster, WardCriterion},
    samples::SampleMatrix,
};

/// Scores every unordered pair of `active` clusters.
pub(super) fn score_pairs(
    samples: &SampleMatrix,
    active: &[&Cluster],
    criterion: WardCriterion,
    parallel: bool,
) -> Result<Vec<MergeCandidate>> {
    if parallel {
        score_parallel(samples, active, criterion)
    } else {
        score_sequential(samples, active, criterion)
    }
}

fn score_sequential(
    samples: &SampleMatrix,
    active: &[&Cluster],
    criterion: WardCriterion,
) -> Result<Vec<MergeCandidate>> {
    active
        .iter()
        .enumerate()
        .flat_map(|(offset, left)| {
            active
                .iter()
                .skip(offset + 1)
                .map(move |right| left.ward_with(right, samples, criterion))
        })
        .collect()
}

#[cfg(feature = "parallel")]
fn score_parallel(
    samples: &SampleMatrix,
    active: &[&Cluster],
    criterion: WardCriterion,
) -> Result<Vec<MergeCandidate>> {
    active
        .par_iter()
        .enumerate()
        .flat_map_iter(|(offset, left)| {
            active
                .iter()
                .skip(offset + 1)
                .map(move |right| left.ward_with(right, samples, criterion))
        })
        .collect()
}

// The builder never resolves to parallel scoring without the feature.
#[cfg(not(feature = "parallel"))]
fn score_parallel(
    samples: &SampleMatrix,
    active: &[&Cluster],
    criterion: WardCriterion,
) -> Result<Vec<MergeCandidate>> {
    score_sequential(samples, active, criterion)
}

/// Number of unordered pairs among `active` clusters.
pub(super) const fn pair_count(active: usize) -> usize {
    active.saturating_mul(active.saturating_sub(1)) / 2
}
