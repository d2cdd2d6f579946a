use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{ArrayRef, BooleanArray, Float64Array, Int64Array, ListArray, StringArray};
use arrow::buffer::{NullBuffer, OffsetBuffer};
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use parquet::arrow::ArrowWriter;
use serde_json::{Map, Value as JsonValue};

use super::model::{Frame, Value};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Write a flat table to a file.  Dispatch by extension, mirroring
/// [`load_file`](super::loader::load_file).
pub fn write_file(frame: &Frame, path: &Path) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "parquet" | "pq" => write_parquet(frame, path),
        "json" => write_json(frame, path),
        "csv" => write_csv(frame, path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("writing {}", path.display()))?;

    log::info!("wrote {} rows to {}", frame.len(), path.display());
    Ok(())
}

/// Render the first `limit` rows as a boxed text table.
pub fn pretty_table(frame: &Frame, limit: usize) -> Result<String> {
    let positions: Vec<usize> = (0..frame.len().min(limit)).collect();
    let head = frame.take(&positions)?;
    let batch = to_record_batch(&head)?;
    Ok(pretty_format_batches(&[batch])?.to_string())
}

// ---------------------------------------------------------------------------
// Arrow conversion
// ---------------------------------------------------------------------------

/// Convert a frame into a single Arrow record batch.
///
/// Column types are inferred from the values: all integers → Int64,
/// integers mixed with floats → Float64, bools → Boolean, lists → List of
/// the inferred item type, anything else → Utf8 via `Display`.
pub fn to_record_batch(frame: &Frame) -> Result<RecordBatch> {
    let mut fields = Vec::with_capacity(frame.width());
    let mut arrays = Vec::with_capacity(frame.width());
    for column in frame.columns() {
        let array = values_to_array(&column.values)?;
        fields.push(Field::new(&column.name, array.data_type().clone(), true));
        arrays.push(array);
    }
    let schema = Arc::new(Schema::new(fields));
    if arrays.is_empty() {
        bail!("cannot convert a frame without columns");
    }
    RecordBatch::try_new(schema, arrays).context("building record batch")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Int,
    Float,
    Bool,
    Text,
    List,
}

fn infer_kind(values: &[Value]) -> Kind {
    let mut kind: Option<Kind> = None;
    for value in values {
        let this = match value {
            Value::Null => continue,
            Value::Integer(_) => Kind::Int,
            Value::Float(_) => Kind::Float,
            Value::Bool(_) => Kind::Bool,
            Value::String(_) => Kind::Text,
            Value::List(_) => Kind::List,
        };
        kind = Some(match (kind, this) {
            (None, k) => k,
            (Some(a), b) if a == b => a,
            (Some(Kind::Int), Kind::Float) | (Some(Kind::Float), Kind::Int) => Kind::Float,
            _ => return Kind::Text,
        });
    }
    kind.unwrap_or(Kind::Text)
}

fn values_to_array(values: &[Value]) -> Result<ArrayRef> {
    let array: ArrayRef = match infer_kind(values) {
        Kind::Int => Arc::new(Int64Array::from(
            values
                .iter()
                .map(|v| match v {
                    Value::Integer(i) => Some(*i),
                    _ => None,
                })
                .collect::<Vec<_>>(),
        )),
        Kind::Float => Arc::new(Float64Array::from(
            values.iter().map(Value::as_f64).collect::<Vec<_>>(),
        )),
        Kind::Bool => Arc::new(BooleanArray::from(
            values
                .iter()
                .map(|v| match v {
                    Value::Bool(b) => Some(*b),
                    _ => None,
                })
                .collect::<Vec<_>>(),
        )),
        Kind::Text => Arc::new(StringArray::from(
            values
                .iter()
                .map(|v| (!v.is_null()).then(|| v.to_string()))
                .collect::<Vec<_>>(),
        )),
        Kind::List => {
            let mut lengths = Vec::with_capacity(values.len());
            let mut validity = Vec::with_capacity(values.len());
            let mut items = Vec::new();
            for value in values {
                match value {
                    Value::List(inner) => {
                        lengths.push(inner.len());
                        validity.push(true);
                        items.extend(inner.iter().cloned());
                    }
                    _ => {
                        lengths.push(0);
                        validity.push(false);
                    }
                }
            }
            let item_array = values_to_array(&items)?;
            let item_field = Arc::new(Field::new("item", item_array.data_type().clone(), true));
            Arc::new(
                ListArray::try_new(
                    item_field,
                    OffsetBuffer::from_lengths(lengths),
                    item_array,
                    Some(NullBuffer::from(validity)),
                )
                .context("building list column")?,
            )
        }
    };
    Ok(array)
}

// ---------------------------------------------------------------------------
// Writers
// ---------------------------------------------------------------------------

fn write_parquet(frame: &Frame, path: &Path) -> Result<()> {
    let batch = to_record_batch(frame)?;
    let file = File::create(path).context("creating parquet file")?;
    let mut writer =
        ArrowWriter::try_new(file, batch.schema(), None).context("creating parquet writer")?;
    writer.write(&batch).context("writing record batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn write_csv(frame: &Frame, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV")?;
    writer
        .write_record(frame.column_names())
        .context("writing CSV headers")?;
    for row in 0..frame.len() {
        let record: Vec<String> = frame
            .columns()
            .iter()
            .map(|c| match &c.values[row] {
                Value::Null => String::new(),
                other => other.to_string(),
            })
            .collect();
        writer
            .write_record(&record)
            .with_context(|| format!("CSV row {row}"))?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

/// Records-oriented JSON, readable by `load_file` and `pd.read_json`.
fn write_json(frame: &Frame, path: &Path) -> Result<()> {
    let records: Vec<JsonValue> = (0..frame.len())
        .map(|row| {
            let obj: Map<String, JsonValue> = frame
                .columns()
                .iter()
                .map(|c| (c.name.clone(), value_to_json(&c.values[row])))
                .collect();
            JsonValue::Object(obj)
        })
        .collect();
    let file = File::create(path).context("creating JSON file")?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, &records).context("writing JSON")?;
    writer.flush().context("flushing JSON")?;
    Ok(())
}

fn value_to_json(value: &Value) -> JsonValue {
    match value {
        Value::String(s) => JsonValue::String(s.clone()),
        Value::Integer(i) => JsonValue::from(*i),
        Value::Float(f) => JsonValue::from(*f),
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::List(items) => JsonValue::Array(items.iter().map(value_to_json).collect()),
        Value::Null => JsonValue::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Column;
    use arrow::array::Array;
    use arrow::datatypes::DataType;

    #[test]
    fn infer_kind_widens_numbers_and_falls_back_to_text() {
        assert_eq!(
            infer_kind(&[Value::Integer(1), Value::Null, Value::Float(0.5)]),
            Kind::Float
        );
        assert_eq!(
            infer_kind(&[Value::Integer(1), Value::from("x")]),
            Kind::Text
        );
        assert_eq!(infer_kind(&[Value::Null]), Kind::Text);
    }

    #[test]
    fn record_batch_keeps_column_types() {
        let frame = Frame::from_columns(vec![
            Column::new("id_left", vec!["q1".into(), "q2".into()]),
            Column::new("label", vec![Value::Integer(1), Value::Null]),
            Column::new(
                "tokens",
                vec![
                    Value::List(vec!["a".into(), "b".into()]),
                    Value::List(vec![]),
                ],
            ),
        ])
        .unwrap();
        let batch = to_record_batch(&frame).unwrap();
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.schema().field(0).data_type(), &DataType::Utf8);
        assert_eq!(batch.schema().field(1).data_type(), &DataType::Int64);
        assert!(matches!(batch.schema().field(2).data_type(), DataType::List(_)));
        assert!(batch.column(1).is_null(1));
    }

    #[test]
    fn pretty_table_limits_rows() {
        let frame = Frame::from_columns(vec![Column::new(
            "text_left",
            vec!["query 1".into(), "query 2".into()],
        )])
        .unwrap();
        let table = pretty_table(&frame, 1).unwrap();
        assert!(table.contains("query 1"));
        assert!(!table.contains("query 2"));
    }
}
