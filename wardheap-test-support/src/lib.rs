//! Shared test utilities used across wardheap crates.

pub mod ci;
pub mod tracing;
