//! Input builders shared by the CLI tests.

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use arrow_array::{ArrayRef, FixedSizeListArray, Float32Array, RecordBatch};
use arrow_schema::{DataType, Field, Schema};
use parquet::arrow::arrow_writer::ArrowWriter;
use tempfile::TempDir;

pub(super) fn temp_dir() -> TempDir {
    match TempDir::new() {
        Ok(dir) => dir,
        Err(err) => panic!("failed to create temp dir: {err}"),
    }
}

pub(super) fn create_text_file(dir: &TempDir, name: &str, contents: &str) -> io::Result<PathBuf> {
    let path = dir.path().join(name);
    let mut file = File::create(&path)?;
    file.write_all(contents.as_bytes())?;
    Ok(path)
}

/// Writes two well-separated pairs of 2-D points to a `features` column:
/// (0, 0), (0, 1), (10, 10), (10, 11).
pub(super) fn create_parquet_file(
    dir: &TempDir,
    name: &str,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let path = dir.path().join(name);
    let item_field = Arc::new(Field::new("item", DataType::Float32, false));
    let schema = Arc::new(Schema::new(vec![Field::new(
        "features",
        DataType::FixedSizeList(item_field.clone(), 2),
        false,
    )]));
    let values = Float32Array::from(vec![0.0_f32, 0.0, 0.0, 1.0, 10.0, 10.0, 10.0, 11.0]);
    let list = FixedSizeListArray::new(item_field, 2, Arc::new(values) as ArrayRef, None);
    let batch = RecordBatch::try_new(schema.clone(), vec![Arc::new(list) as ArrayRef])?;

    let file = File::create(&path)?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(path)
}
