//! Validated sample matrices.
//!
//! A [`SampleMatrix`] is the immutable `(n, d)` input to a Ward build. Every
//! constructor checks the shape and the values up front so the clustering
//! engine never has to reason about ragged rows or missing values.

use crate::error::SampleError;

/// Row-major matrix of finite `f64` samples.
///
/// # Examples
/// ```
/// use wardheap_core::SampleMatrix;
///
/// let samples = SampleMatrix::try_from_rows(vec![vec![0.0, 0.0], vec![1.0, 1.0]])?;
/// assert_eq!(samples.rows(), 2);
/// assert_eq!(samples.dimension(), 2);
/// assert_eq!(samples.row(1), Some(&[1.0, 1.0][..]));
/// # Ok::<(), wardheap_core::SampleError>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct SampleMatrix {
    rows: usize,
    dimension: usize,
    values: Vec<f64>,
}

impl SampleMatrix {
    /// Builds a matrix from one vector per sample.
    ///
    /// # Errors
    /// Returns [`SampleError::EmptySamples`] for an empty input,
    /// [`SampleError::ZeroDimension`] when the first row is empty,
    /// [`SampleError::RaggedRow`] when any row differs in length from the
    /// first, and [`SampleError::NonFiniteValue`] for NaN or infinite values.
    pub fn try_from_rows(rows: Vec<Vec<f64>>) -> Result<Self, SampleError> {
        let dimension = rows.first().ok_or(SampleError::EmptySamples)?.len();
        if dimension == 0 {
            return Err(SampleError::ZeroDimension);
        }
        let mut values = Vec::with_capacity(rows.len().saturating_mul(dimension));
        for (row, sample) in rows.iter().enumerate() {
            if sample.len() != dimension {
                return Err(SampleError::RaggedRow {
                    row,
                    expected: dimension,
                    actual: sample.len(),
                });
            }
            values.extend_from_slice(sample);
        }
        Self::try_from_flat(dimension, values)
    }

    /// Builds a matrix from a row-major buffer of `rows * dimension` values.
    ///
    /// # Errors
    /// Returns [`SampleError::ZeroDimension`] when `dimension == 0`,
    /// [`SampleError::EmptySamples`] when `values` is empty,
    /// [`SampleError::RaggedBuffer`] when the buffer length is not a multiple
    /// of `dimension`, and [`SampleError::NonFiniteValue`] for NaN or infinite
    /// values.
    ///
    /// # Examples
    /// ```
    /// use wardheap_core::{SampleError, SampleMatrix};
    ///
    /// let err = SampleMatrix::try_from_flat(2, vec![0.0, 1.0, 2.0]).unwrap_err();
    /// assert_eq!(err, SampleError::RaggedBuffer { len: 3, dimension: 2 });
    /// ```
    pub fn try_from_flat(dimension: usize, values: Vec<f64>) -> Result<Self, SampleError> {
        if dimension == 0 {
            return Err(SampleError::ZeroDimension);
        }
        if values.is_empty() {
            return Err(SampleError::EmptySamples);
        }
        if values.len() % dimension != 0 {
            return Err(SampleError::RaggedBuffer {
                len: values.len(),
                dimension,
            });
        }
        if let Some(position) = values.iter().position(|value| !value.is_finite()) {
            return Err(SampleError::NonFiniteValue {
                row: position / dimension,
                column: position % dimension,
            });
        }
        Ok(Self {
            rows: values.len() / dimension,
            dimension,
            values,
        })
    }

    /// Number of samples.
    #[must_use]
    #[rustfmt::skip]
    pub const fn rows(&self) -> usize { self.rows }

    /// Number of features per sample.
    #[must_use]
    #[rustfmt::skip]
    pub const fn dimension(&self) -> usize { self.dimension }

    /// The row-major backing buffer.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Returns the features of sample `index`, or `None` when out of range.
    #[must_use]
    pub fn row(&self, index: usize) -> Option<&[f64]> {
        let start = index.checked_mul(self.dimension)?;
        let end = start.checked_add(self.dimension)?;
        self.values.get(start..end)
    }

    /// Iterates the samples in row order.
    pub fn iter_rows(&self) -> impl ExactSizeIterator<Item = &[f64]> + '_ {
        self.values.chunks_exact(self.dimension)
    }
}
