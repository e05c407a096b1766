//! Tests covering dense sample ingestion from Arrow and Parquet sources.

mod support;
