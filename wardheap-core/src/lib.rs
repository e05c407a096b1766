//! Ward agglomerative clustering driven by a priority queue.
//!
//! Build a [`SampleMatrix`], configure a [`WardBuilder`], and run the
//! resulting [`HierarchicalTree`] to obtain a [`Dendrogram`]. Cut the
//! dendrogram with [`Dendrogram::cut`] to recover a flat [`Partition`] at any
//! level it contains.
//!
//! # Tie-breaking
//!
//! Candidates with equal cost resolve to the lexicographically smallest
//! `(left, right)` id pair, so builds are reproducible across runs and
//! platforms, and sequential and parallel scoring yield the same tree.
//!
//! # Metrics
//!
//! When the `metrics` feature is enabled the tree emits:
//!
//! - `ward_merges_total` (counter)
//! - `ward_stale_candidates_total` (counter)
//! - `ward_queue_rebuild_seconds` (histogram, seconds)
#![cfg_attr(docsrs, feature(doc_cfg))]

mod builder;
mod candidate;
mod cluster;
mod dendrogram;
mod error;
mod partition;
mod samples;
#[cfg(test)]
mod test_utils;
mod tree;

pub use crate::{
    builder::{ScoringStrategy, WardBuilder},
    candidate::MergeCandidate,
    cluster::{Cluster, ClusterId, WardCriterion},
    dendrogram::{Dendrogram, MergeStep},
    error::{Result, SampleError, SampleErrorCode, WardError, WardErrorCode},
    partition::{NonContiguousLabels, Partition},
    samples::SampleMatrix,
    tree::HierarchicalTree,
};
