//! Shared test utilities for `wardheap-core`.

use proptest::test_runner::Config as ProptestConfig;
use rand::{Rng, SeedableRng, rngs::SmallRng};
use wardheap_test_support::ci::property_test_profile::ProptestRunProfile;

use crate::{HierarchicalTree, SampleMatrix};

/// Builds a proptest configuration from the shared CI profile.
#[must_use]
pub(crate) fn suite_proptest_config(default_cases: u32) -> ProptestConfig {
    let profile = ProptestRunProfile::load(default_cases, false);
    ProptestConfig {
        cases: profile.cases(),
        fork: profile.fork(),
        ..ProptestConfig::default()
    }
}

/// Draws `rows` samples of `dimension` features uniformly from `[-10, 10)`.
pub(crate) fn uniform_samples(seed: u64, rows: usize, dimension: usize) -> SampleMatrix {
    let mut rng = SmallRng::seed_from_u64(seed);
    let values = (0..rows * dimension)
        .map(|_| rng.gen_range(-10.0..10.0))
        .collect();
    SampleMatrix::try_from_flat(dimension, values).expect("generated samples are valid")
}

/// Asserts that the active clusters' members partition `0..rows`.
pub(crate) fn assert_active_partition(tree: &HierarchicalTree) {
    let rows = tree.samples().rows();
    let mut seen = vec![false; rows];
    for cluster in tree.active_clusters() {
        for &member in cluster.members() {
            assert!(member < rows, "member {member} out of range");
            assert!(!seen[member], "sample {member} appears in two active clusters");
            seen[member] = true;
        }
    }
    assert!(seen.iter().all(|&covered| covered), "active clusters miss a sample");
}
