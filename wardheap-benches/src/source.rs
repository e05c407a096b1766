//! Seeded synthetic samples for benchmarking.
//!
//! Points are drawn uniformly from a unit cube around `blobs` centres spread
//! over `[0, 100)` in every dimension.

use rand::{Rng, SeedableRng, rngs::SmallRng};
use wardheap_core::{SampleError, SampleMatrix};

/// Errors that may occur during synthetic sample generation.
#[derive(Clone, Debug, thiserror::Error, PartialEq)]
pub enum SyntheticError {
    /// The requested blob count was zero.
    #[error("blob count must be greater than zero")]
    ZeroBlobs,
    /// The generated values were rejected as samples.
    #[error(transparent)]
    Samples(#[from] SampleError),
}

/// Configuration for synthetic blob generation.
#[derive(Clone, Debug)]
pub struct SyntheticConfig {
    /// Number of points to generate.
    pub point_count: usize,
    /// Dimensionality of each point.
    pub dimensions: usize,
    /// Number of blob centres the points are spread across.
    pub blobs: usize,
    /// RNG seed for reproducibility.
    pub seed: u64,
}

/// Generates `point_count` points assigned round-robin to the blobs.
///
/// # Errors
/// Returns [`SyntheticError::ZeroBlobs`] when `blobs` is zero and
/// [`SyntheticError::Samples`] when the point or dimension count is zero.
///
/// # Examples
/// ```
/// use wardheap_benches::source::{SyntheticConfig, generate_blobs};
///
/// let config = SyntheticConfig { point_count: 12, dimensions: 3, blobs: 4, seed: 7 };
/// let samples = generate_blobs(&config).expect("valid config");
/// assert_eq!(samples.rows(), 12);
/// assert_eq!(samples.dimension(), 3);
/// ```
pub fn generate_blobs(config: &SyntheticConfig) -> Result<SampleMatrix, SyntheticError> {
    if config.blobs == 0 {
        return Err(SyntheticError::ZeroBlobs);
    }
    let mut rng = SmallRng::seed_from_u64(config.seed);
    let centres: Vec<Vec<f64>> = (0..config.blobs)
        .map(|_| {
            (0..config.dimensions)
                .map(|_| rng.gen_range(0.0..100.0))
                .collect()
        })
        .collect();

    let mut values = Vec::with_capacity(config.point_count.saturating_mul(config.dimensions));
    for (_, centre) in (0..config.point_count).zip(centres.iter().cycle()) {
        values.extend(
            centre
                .iter()
                .map(|&coordinate| coordinate + rng.gen_range(-0.5..0.5)),
        );
    }
    Ok(SampleMatrix::try_from_flat(config.dimensions, values)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn config(point_count: usize, dimensions: usize, blobs: usize) -> SyntheticConfig {
        SyntheticConfig {
            point_count,
            dimensions,
            blobs,
            seed: 42,
        }
    }

    #[rstest]
    #[case::small(10, 2, 3)]
    #[case::tall(200, 8, 5)]
    fn generates_requested_shape(
        #[case] point_count: usize,
        #[case] dimensions: usize,
        #[case] blobs: usize,
    ) {
        let samples = generate_blobs(&config(point_count, dimensions, blobs))
            .expect("generation must succeed");
        assert_eq!(samples.rows(), point_count);
        assert_eq!(samples.dimension(), dimensions);
    }

    #[rstest]
    fn generation_is_reproducible() {
        let first = generate_blobs(&config(16, 4, 2)).expect("generation must succeed");
        let second = generate_blobs(&config(16, 4, 2)).expect("generation must succeed");
        assert_eq!(first, second);
    }

    #[rstest]
    #[case(config(10, 2, 0), SyntheticError::ZeroBlobs)]
    #[case(config(0, 2, 1), SyntheticError::Samples(SampleError::EmptySamples))]
    #[case(config(10, 0, 1), SyntheticError::Samples(SampleError::ZeroDimension))]
    fn rejects_degenerate_configs(#[case] config: SyntheticConfig, #[case] expected: SyntheticError) {
        assert_eq!(generate_blobs(&config), Err(expected));
    }
}
