//! Helpers for widening fixed-size list arrays into `f64` buffers.
use arrow_array::{Array, FixedSizeListArray, Float32Array, Float64Array};
use arrow_schema::{DataType, Field};

use crate::errors::DenseProviderError;

fn is_float(data_type: &DataType) -> bool {
    matches!(data_type, DataType::Float32 | DataType::Float64)
}

pub(crate) fn validate_fixed_size_list_field(
    field: &Field,
    column: &str,
) -> Result<usize, DenseProviderError> {
    match field.data_type() {
        DataType::FixedSizeList(child, width) => {
            if !is_float(child.data_type()) {
                return Err(DenseProviderError::InvalidListValueType {
                    actual: child.data_type().clone(),
                });
            }
            dimension_from_width(*width)
        }
        other => Err(DenseProviderError::InvalidColumnType {
            column: column.to_owned(),
            actual: other.clone(),
        }),
    }
}

fn dimension_from_width(width: i32) -> Result<usize, DenseProviderError> {
    match usize::try_from(width) {
        Ok(dimension) if dimension > 0 => Ok(dimension),
        _ => Err(DenseProviderError::InvalidDimension { actual: width }),
    }
}

pub(crate) fn append_fixed_size_list_values(
    array: &FixedSizeListArray,
    expected_dimension: Option<usize>,
    start_row: usize,
    out: &mut Vec<f64>,
) -> Result<usize, DenseProviderError> {
    let dimension = validate_fixed_size_list(array)?;
    if let Some(expected) = expected_dimension.filter(|&expected| expected != dimension) {
        return Err(DenseProviderError::InconsistentBatchDimension {
            expected,
            actual: dimension,
        });
    }
    copy_list_values(array, dimension, start_row, out)?;
    Ok(dimension)
}

pub(crate) fn validate_fixed_size_list(
    array: &FixedSizeListArray,
) -> Result<usize, DenseProviderError> {
    let value_type = array.value_type();
    if !is_float(&value_type) {
        return Err(DenseProviderError::InvalidListValueType { actual: value_type });
    }
    dimension_from_width(array.value_length())
}

pub(crate) fn copy_list_values(
    array: &FixedSizeListArray,
    dimension: usize,
    start_row: usize,
    out: &mut Vec<f64>,
) -> Result<(), DenseProviderError> {
    let rows = array.len();
    let additional = rows
        .checked_mul(dimension)
        .ok_or(DenseProviderError::CapacityOverflow { rows, dimension })?;
    out.reserve(additional);
    for row_index in 0..rows {
        let absolute_row = start_row + row_index;
        if array.is_null(row_index) {
            return Err(DenseProviderError::NullRow { row: absolute_row });
        }
        let row = array.value(row_index);
        if row.len() != dimension {
            return Err(DenseProviderError::InvalidRowLength {
                row: absolute_row,
                expected: dimension,
                actual: row.len(),
            });
        }
        if let Some(value_index) = (0..dimension).find(|&idx| row.is_null(idx)) {
            return Err(DenseProviderError::NullValue {
                row: absolute_row,
                value_index,
            });
        }
        if let Some(floats) = row.as_any().downcast_ref::<Float64Array>() {
            out.extend(floats.values().iter().copied());
        } else if let Some(floats) = row.as_any().downcast_ref::<Float32Array>() {
            out.extend(floats.values().iter().map(|&value| f64::from(value)));
        } else {
            return Err(DenseProviderError::InvalidListValueType {
                actual: row.data_type().clone(),
            });
        }
    }
    Ok(())
}
