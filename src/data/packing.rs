use std::collections::HashMap;

use log::info;

use super::keyed::KeyedFrame;
use super::model::{Frame, Value};
use super::pack::{DataPack, ID_LEFT, ID_RIGHT, TEXT_LEFT, TEXT_RIGHT};
use crate::error::Result;

/// Build a [`DataPack`] from a flat table with one row per pair.
///
/// The frame needs `text_left` and `text_right`. Missing `id_left` /
/// `id_right` columns are generated per distinct text (`L-0`, `L-1`, ... and
/// `R-0`, ...). Columns ending in `_left` / `_right` describe the entities and
/// keep the value from the first row of each id; all other columns stay on
/// the relation.
pub fn pack(frame: &Frame) -> Result<DataPack> {
    let mut frame = frame.clone();
    for (id, text, prefix) in [(ID_LEFT, TEXT_LEFT, "L-"), (ID_RIGHT, TEXT_RIGHT, "R-")] {
        let texts = frame.column(text)?;
        if !frame.has_column(id) {
            let ids = generate_ids(texts, prefix);
            frame.set_column(id, ids)?;
        }
    }

    let names: Vec<String> = frame.column_names().iter().map(|s| s.to_string()).collect();
    let left_columns = side_columns(&names, "_left", ID_LEFT);
    let right_columns = side_columns(&names, "_right", ID_RIGHT);
    let mut relation_columns = vec![ID_LEFT, ID_RIGHT];
    relation_columns.extend(
        names
            .iter()
            .map(String::as_str)
            .filter(|n| !n.ends_with("_left") && !n.ends_with("_right")),
    );

    let left = entity_table(&frame, ID_LEFT, &left_columns)?;
    let right = entity_table(&frame, ID_RIGHT, &right_columns)?;
    let relation = frame.select_columns(&relation_columns)?;

    let pack = DataPack::new(relation, left, right);
    pack.validate()?;
    info!(
        "packed {} pairs ({} left, {} right)",
        pack.len(),
        pack.left().len(),
        pack.right().len()
    );
    Ok(pack)
}

fn side_columns<'a>(names: &'a [String], suffix: &str, id: &str) -> Vec<&'a str> {
    names
        .iter()
        .map(String::as_str)
        .filter(|n| n.ends_with(suffix) && *n != id)
        .collect()
}

/// One row per distinct id, taken from its first occurrence.
fn entity_table(frame: &Frame, id: &str, columns: &[&str]) -> Result<KeyedFrame> {
    let rows = frame.first_occurrences(id)?;
    let ids = frame.column(id)?;
    let keys = rows.iter().map(|&r| ids[r].clone()).collect();
    let content = frame.select_columns(columns)?.take(&rows)?;
    KeyedFrame::new(id, keys, content)
}

fn generate_ids(texts: &[Value], prefix: &str) -> Vec<Value> {
    let mut assigned: HashMap<&Value, usize> = HashMap::new();
    texts
        .iter()
        .map(|text| {
            let next = assigned.len();
            let n = *assigned.entry(text).or_insert(next);
            Value::String(format!("{prefix}{n}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Column;
    use crate::data::pack::LABEL;

    fn flat() -> Frame {
        Frame::from_columns(vec![
            Column::new(
                TEXT_LEFT,
                vec!["cheap flights".into(), "cheap flights".into(), "rust".into()],
            ),
            Column::new(
                TEXT_RIGHT,
                vec!["fares".into(), "hotels".into(), "fares".into()],
            ),
            Column::new(
                LABEL,
                vec![Value::Integer(1), Value::Integer(0), Value::Integer(0)],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn pack_generates_ids_per_distinct_text() {
        let pack = pack(&flat()).unwrap();
        assert_eq!(pack.len(), 3);
        assert_eq!(pack.left().keys(), &[Value::from("L-0"), Value::from("L-1")]);
        assert_eq!(pack.right().keys(), &[Value::from("R-0"), Value::from("R-1")]);
        assert_eq!(
            pack.relation().column(ID_RIGHT).unwrap(),
            &[Value::from("R-0"), Value::from("R-1"), Value::from("R-0")]
        );
        assert_eq!(pack.relation().column_names(), vec![ID_LEFT, ID_RIGHT, LABEL]);
    }

    #[test]
    fn pack_keeps_given_ids_and_side_columns() {
        let mut frame = flat();
        frame
            .set_column(ID_LEFT, vec!["a".into(), "a".into(), "b".into()])
            .unwrap();
        frame
            .set_column(
                "lang_left",
                vec!["en".into(), "en".into(), "en".into()],
            )
            .unwrap();
        let pack = pack(&frame).unwrap();
        assert_eq!(pack.left().keys(), &[Value::from("a"), Value::from("b")]);
        assert_eq!(
            pack.left().frame().column_names(),
            vec![TEXT_LEFT, "lang_left"]
        );
    }

    #[test]
    fn pack_requires_text_columns() {
        let frame = flat().select_columns(&[TEXT_LEFT, LABEL]).unwrap();
        assert!(pack(&frame).is_err());
    }
}
