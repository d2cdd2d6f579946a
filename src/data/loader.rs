use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, AsArray};
use arrow::datatypes::{
    DataType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type, UInt32Type,
    UInt64Type,
};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Column, Frame, Value};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a flat table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – any scalar or list columns
/// * `.json`    – `[{ "text_left": ..., "text_right": ..., ... }, ...]`
/// * `.csv`     – header row, one pair per line
pub fn load_file(path: &Path) -> Result<Frame> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let frame = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        "csv" => load_csv(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    log::info!(
        "loaded {} rows x {} columns from {}",
        frame.len(),
        frame.width(),
        path.display()
    );
    Ok(frame)
}

// ---------------------------------------------------------------------------
// Row builder shared by the record-oriented formats
// ---------------------------------------------------------------------------

/// Collects rows whose column sets may differ; absent cells become `Null`.
#[derive(Default)]
struct RowCollector {
    columns: Vec<Column>,
    n_rows: usize,
}

impl RowCollector {
    fn push_row(&mut self, cells: impl IntoIterator<Item = (String, Value)>) {
        for (name, value) in cells {
            match self.columns.iter_mut().find(|c| c.name == name) {
                Some(column) => column.values.push(value),
                None => {
                    let mut values = vec![Value::Null; self.n_rows];
                    values.push(value);
                    self.columns.push(Column::new(name, values));
                }
            }
        }
        self.n_rows += 1;
        for column in &mut self.columns {
            column.values.resize(self.n_rows, Value::Null);
        }
    }

    fn finish(self) -> Result<Frame> {
        if self.columns.is_empty() {
            return Ok(Frame::with_rows(self.n_rows));
        }
        Ok(Frame::from_columns(self.columns)?)
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "id_left": "q1", "text_left": "cheap flights", "text_right": "...", "label": 1 },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Frame> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut rows = RowCollector::default();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        rows.push_row(obj.iter().map(|(k, v)| (k.clone(), json_to_value(v))));
    }
    rows.finish()
}

fn json_to_value(val: &JsonValue) -> Value {
    match val {
        JsonValue::String(s) => Value::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                Value::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Array(items) => Value::List(items.iter().map(json_to_value).collect()),
        JsonValue::Null => Value::Null,
        other => Value::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout:  header row with column names, one pair per record.
/// Cell types are guessed per value.
fn load_csv(path: &Path) -> Result<Frame> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();
    for (i, header) in headers.iter().enumerate() {
        if headers[..i].contains(header) {
            bail!("duplicate CSV header `{header}`");
        }
    }

    let mut rows = RowCollector::default();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        if record.len() != headers.len() {
            bail!(
                "CSV row {row_no}: {} fields but {} headers",
                record.len(),
                headers.len()
            );
        }
        rows.push_row(
            headers
                .iter()
                .zip(record.iter())
                .map(|(name, cell)| (name.clone(), guess_value(cell))),
        );
    }
    rows.finish()
}

fn guess_value(s: &str) -> Value {
    if s.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return Value::Integer(i);
    }
    // "nan" / "inf" stay text: they are words, and JSON cannot store them.
    if let Ok(f) = s.parse::<f64>() {
        if f.is_finite() {
            return Value::Float(f);
        }
    }
    if s == "true" || s == "false" {
        return Value::Bool(s == "true");
    }
    Value::String(s.to_string())
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file column by column.
///
/// Strings, integers, floats and bools map to the matching [`Value`];
/// List / LargeList columns become [`Value::List`].
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Frame> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let schema = builder.schema().clone();
    let reader = builder.build().context("building parquet reader")?;

    let mut columns: Vec<Column> = schema
        .fields()
        .iter()
        .map(|f| Column::new(f.name().clone(), Vec::new()))
        .collect();
    let mut n_rows = 0;

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for (column, array) in columns.iter_mut().zip(batch.columns()) {
            for row in 0..batch.num_rows() {
                column.values.push(extract_value(array, row));
            }
        }
        n_rows += batch.num_rows();
    }

    if columns.is_empty() {
        return Ok(Frame::with_rows(n_rows));
    }
    Ok(Frame::from_columns(columns)?)
}

// -- Arrow helpers --

/// Extract a single value from an Arrow column at a given row.
fn extract_value(col: &Arc<dyn Array>, row: usize) -> Value {
    if col.is_null(row) {
        return Value::Null;
    }
    match col.data_type() {
        DataType::Utf8 => Value::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => Value::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int8 => Value::Integer(i64::from(col.as_primitive::<Int8Type>().value(row))),
        DataType::Int16 => Value::Integer(i64::from(col.as_primitive::<Int16Type>().value(row))),
        DataType::Int32 => Value::Integer(i64::from(col.as_primitive::<Int32Type>().value(row))),
        DataType::Int64 => Value::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::UInt32 => {
            Value::Integer(i64::from(col.as_primitive::<UInt32Type>().value(row)))
        }
        DataType::UInt64 => {
            let v = col.as_primitive::<UInt64Type>().value(row);
            i64::try_from(v).map_or(Value::Float(v as f64), Value::Integer)
        }
        DataType::Float32 => {
            Value::Float(f64::from(col.as_primitive::<Float32Type>().value(row)))
        }
        DataType::Float64 => Value::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => Value::Bool(col.as_boolean().value(row)),
        DataType::List(_) => list_value(&col.as_list::<i32>().value(row)),
        DataType::LargeList(_) => list_value(&col.as_list::<i64>().value(row)),
        other => Value::String(format!("{other:?}")),
    }
}

fn list_value(items: &Arc<dyn Array>) -> Value {
    Value::List((0..items.len()).map(|i| extract_value(items, i)).collect())
}
