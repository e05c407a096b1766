//! Dense sample providers that load feature vectors from Arrow and Parquet.
//!
//! Rows are read from a `FixedSizeList<Float32 | Float64, D>` column and
//! widened to `f64` into a [`wardheap_core::SampleMatrix`].

mod errors;
mod ingest;
mod provider;

pub use errors::DenseProviderError;
pub use provider::DenseSampleProvider;

#[cfg(test)]
mod tests;
