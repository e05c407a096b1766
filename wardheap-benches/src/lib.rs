//! Benchmark support crate for wardheap.
//!
//! Provides seeded synthetic sample generators and the setup error type used
//! by the Criterion benchmarks.

pub mod error;
pub mod source;
