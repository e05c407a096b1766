//! Benchmark setup error type.

use crate::source::SyntheticError;
use wardheap_core::WardError;

/// Errors that may occur during benchmark setup.
#[derive(Debug, thiserror::Error)]
pub enum BenchSetupError {
    /// Synthetic data generation failed.
    #[error("synthetic sample generation failed: {0}")]
    Synthetic(#[from] SyntheticError),
    /// Building the dendrogram failed.
    #[error("ward build failed: {0}")]
    Ward(#[from] WardError),
}
