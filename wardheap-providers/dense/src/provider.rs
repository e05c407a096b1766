//! Dense sample provider and Parquet ingestion.
use std::{fs::File, path::Path};

use arrow_array::{Array, FixedSizeListArray, RecordBatch, RecordBatchReader};
use parquet::arrow::{ProjectionMask, arrow_reader::ParquetRecordBatchReaderBuilder};
use parquet::file::reader::ChunkReader;
use wardheap_core::SampleMatrix;

use crate::errors::DenseProviderError;
use crate::ingest::{append_fixed_size_list_values, validate_fixed_size_list_field};

/// Named sample matrix loaded from a dense Arrow column.
#[derive(Debug, Clone)]
pub struct DenseSampleProvider {
    name: String,
    samples: SampleMatrix,
}

impl DenseSampleProvider {
    fn from_values(
        name: impl Into<String>,
        dimension: usize,
        values: Vec<f64>,
    ) -> Result<Self, DenseProviderError> {
        let samples = SampleMatrix::try_from_flat(dimension, values)?;
        Ok(Self {
            name: name.into(),
            samples,
        })
    }

    /// Human-readable name of the data source.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of rows loaded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.rows()
    }

    /// Always `false`: empty inputs are rejected at load time.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.rows() == 0
    }

    /// Returns the dimensionality of each row.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.samples.dimension()
    }

    /// The loaded samples.
    #[must_use]
    pub fn samples(&self) -> &SampleMatrix {
        &self.samples
    }

    /// Consumes the provider, returning the samples.
    #[must_use]
    pub fn into_samples(self) -> SampleMatrix {
        self.samples
    }

    /// Loads samples from an Arrow [`FixedSizeListArray`].
    ///
    /// # Errors
    /// Returns [`DenseProviderError`] when the array is not a list of floats,
    /// contains nulls, or yields an invalid sample matrix.
    pub fn try_from_fixed_size_list(
        name: impl Into<String>,
        array: &FixedSizeListArray,
    ) -> Result<Self, DenseProviderError> {
        let mut values = Vec::new();
        let dimension = append_fixed_size_list_values(array, None, 0, &mut values)?;
        Self::from_values(name, dimension, values)
    }

    /// Loads samples from a Parquet column containing
    /// `FixedSizeList<Float32 | Float64, D>` rows.
    ///
    /// # Errors
    /// Returns [`DenseProviderError::Io`] when the file cannot be opened and
    /// otherwise propagates [`Self::try_from_parquet_reader`] failures.
    pub fn try_from_parquet_path(
        name: impl Into<String>,
        path: impl AsRef<Path>,
        column: &str,
    ) -> Result<Self, DenseProviderError> {
        let file = File::open(path)?;
        Self::try_from_parquet_reader(name, file, column)
    }

    /// Loads samples from a Parquet reader.
    ///
    /// # Errors
    /// Returns [`DenseProviderError`] when the column is missing, has the
    /// wrong type, or the data cannot be decoded.
    pub fn try_from_parquet_reader<R>(
        name: impl Into<String>,
        reader: R,
        column: &str,
    ) -> Result<Self, DenseProviderError>
    where
        R: ChunkReader + Send + 'static,
    {
        let builder = ParquetRecordBatchReaderBuilder::try_new(reader)?;
        let mask = ProjectionMask::columns(builder.parquet_schema(), [column]);
        let reader = builder.with_projection(mask).build()?;
        let schema = reader.schema();
        let column_index =
            schema
                .index_of(column)
                .map_err(|_| DenseProviderError::ColumnNotFound {
                    column: column.to_owned(),
                })?;
        let dimension = validate_fixed_size_list_field(schema.field(column_index), column)?;
        let batches = reader.collect::<Result<Vec<_>, _>>()?;
        Self::try_from_record_batches(name, column_index, column, Some(dimension), &batches)
    }

    pub(crate) fn try_from_record_batches(
        name: impl Into<String>,
        column_index: usize,
        column: &str,
        mut dimension: Option<usize>,
        batches: &[RecordBatch],
    ) -> Result<Self, DenseProviderError> {
        let mut values = Vec::new();
        let mut rows = 0_usize;
        for batch in batches {
            let column_array = batch.column(column_index);
            let list = column_array
                .as_any()
                .downcast_ref::<FixedSizeListArray>()
                .ok_or_else(|| DenseProviderError::InvalidColumnType {
                    column: column.to_owned(),
                    actual: column_array.data_type().clone(),
                })?;
            dimension = Some(append_fixed_size_list_values(
                list,
                dimension,
                rows,
                &mut values,
            )?);
            rows += list.len();
        }
        // Zero rows are reported by the matrix as empty samples.
        Self::from_values(name, dimension.unwrap_or(1), values)
    }
}
