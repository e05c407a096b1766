use std::sync::Arc;

use arrow_array::{Array, ArrayRef, FixedSizeListArray, Float32Array, Float64Array, RecordBatch};
use arrow_schema::{DataType, Field, Schema};
use bytes::Bytes;
use parquet::arrow::arrow_writer::ArrowWriter;

pub(super) fn f32_list(rows: &[Vec<f32>], dimension: usize) -> FixedSizeListArray {
    assert!(rows.iter().all(|row| row.len() == dimension));
    let values = Float32Array::from_iter_values(rows.iter().flatten().copied());
    FixedSizeListArray::new(
        Arc::new(Field::new("item", DataType::Float32, true)),
        i32::try_from(dimension).expect("dimension fits in i32"),
        Arc::new(values) as ArrayRef,
        None,
    )
}

pub(super) fn f64_list(rows: &[Vec<f64>], dimension: usize) -> FixedSizeListArray {
    assert!(rows.iter().all(|row| row.len() == dimension));
    let values = Float64Array::from_iter_values(rows.iter().flatten().copied());
    FixedSizeListArray::new(
        Arc::new(Field::new("item", DataType::Float64, true)),
        i32::try_from(dimension).expect("dimension fits in i32"),
        Arc::new(values) as ArrayRef,
        None,
    )
}

pub(super) fn batch(array: FixedSizeListArray) -> RecordBatch {
    let field = Field::new("features", array.data_type().clone(), true);
    RecordBatch::try_new(
        Arc::new(Schema::new(vec![field])),
        vec![Arc::new(array) as ArrayRef],
    )
    .expect("batch")
}

pub(super) fn write_parquet(batch: &RecordBatch) -> Bytes {
    let mut buffer = Vec::new();
    {
        let mut writer = ArrowWriter::try_new(&mut buffer, batch.schema(), None).expect("writer");
        writer.write(batch).expect("write");
        writer.close().expect("close");
    }
    Bytes::from(buffer)
}
