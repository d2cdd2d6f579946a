use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::model::{Column, Frame, Value};
use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// KeyedFrame – an entity table indexed by identifier
// ---------------------------------------------------------------------------

/// A [`Frame`] whose rows are labelled by a named key column, the way a
/// Pandas frame carries an index. The key column is not part of `frame`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyedFrame {
    key: Column,
    frame: Frame,
}

impl KeyedFrame {
    /// Pair `keys` (named `key_name`) with the content rows in `frame`.
    pub fn new(key_name: impl Into<String>, keys: Vec<Value>, frame: Frame) -> Result<Self> {
        let key = Column::new(key_name, keys);
        if key.values.len() != frame.len() {
            return Err(Error::length_mismatch(key.name, frame.len(), key.values.len()));
        }
        if frame.has_column(&key.name) {
            return Err(Error::DuplicateColumn(key.name));
        }
        Ok(KeyedFrame { key, frame })
    }

    /// Promote `key_name` out of `frame` into the key column.
    pub fn from_frame(mut frame: Frame, key_name: &str) -> Result<Self> {
        let key = frame.drop_column(key_name)?;
        Ok(KeyedFrame { key, frame })
    }

    /// Name of the key column (e.g. `id_left`).
    pub fn key_name(&self) -> &str {
        &self.key.name
    }

    pub fn keys(&self) -> &[Value] {
        &self.key.values
    }

    /// Content columns, without the key.
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn frame_mut(&mut self) -> &mut Frame {
        &mut self.frame
    }

    pub fn len(&self) -> usize {
        self.frame.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.is_empty()
    }

    /// Map each key to the row holding it. Keys are expected to be unique;
    /// on duplicates the first row wins.
    pub fn positions(&self) -> HashMap<&Value, usize> {
        let mut map = HashMap::with_capacity(self.key.values.len());
        for (row, key) in self.key.values.iter().enumerate() {
            map.entry(key).or_insert(row);
        }
        map
    }

    /// First key that appears on more than one row.
    pub fn duplicate_key(&self) -> Option<&Value> {
        let mut seen = std::collections::HashSet::new();
        self.key.values.iter().find(|k| !seen.insert(*k))
    }

    /// Row positions for `keys`, in order. Unknown keys are lookup errors.
    pub fn locate(&self, keys: &[Value]) -> Result<Vec<usize>> {
        let index = self.positions();
        keys.iter()
            .map(|k| {
                index
                    .get(k)
                    .copied()
                    .ok_or_else(|| Error::key_not_found(self.key_name(), k))
            })
            .collect()
    }

    /// Rows labelled by `keys`, in the order given.
    pub fn loc(&self, keys: &[Value]) -> Result<KeyedFrame> {
        let rows = self.locate(keys)?;
        self.take(&rows)
    }

    /// Rows at `positions`, key column included.
    pub fn take(&self, positions: &[usize]) -> Result<KeyedFrame> {
        let frame = self.frame.take(positions)?;
        let key = Column::new(
            self.key.name.clone(),
            positions.iter().map(|&p| self.key.values[p].clone()).collect(),
        );
        Ok(KeyedFrame { key, frame })
    }

    /// Flatten into a plain frame with the key as its first column.
    pub fn reset_index(self) -> Result<Frame> {
        let mut flat = Frame::from_columns(vec![self.key])?;
        flat.append_columns(self.frame)?;
        Ok(flat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs() -> KeyedFrame {
        let frame = Frame::from_columns(vec![Column::new(
            "text_right",
            vec!["document 1".into(), "document 2".into()],
        )])
        .unwrap();
        KeyedFrame::new("id_right", vec!["did1".into(), "did2".into()], frame).unwrap()
    }

    #[test]
    fn loc_follows_requested_key_order() {
        let sub = docs().loc(&["did2".into(), "did1".into()]).unwrap();
        assert_eq!(sub.keys(), &[Value::from("did2"), Value::from("did1")]);
        assert_eq!(
            sub.frame().column("text_right").unwrap()[0],
            Value::from("document 2")
        );
    }

    #[test]
    fn loc_unknown_key_is_lookup_error() {
        let err = docs().loc(&["did9".into()]).unwrap_err();
        assert!(matches!(err, Error::KeyNotFound { ref key, .. } if key == "did9"));
    }

    #[test]
    fn reset_index_puts_key_first() {
        let flat = docs().reset_index().unwrap();
        assert_eq!(flat.column_names(), vec!["id_right", "text_right"]);
        assert_eq!(flat.len(), 2);
    }

    #[test]
    fn from_frame_extracts_key_column() {
        let frame = docs().reset_index().unwrap();
        let keyed = KeyedFrame::from_frame(frame, "id_right").unwrap();
        assert_eq!(keyed.key_name(), "id_right");
        assert_eq!(keyed.frame().column_names(), vec!["text_right"]);
    }

    #[test]
    fn duplicate_key_detected() {
        let keyed =
            KeyedFrame::new("id", vec!["a".into(), "a".into()], Frame::with_rows(2)).unwrap();
        assert_eq!(keyed.duplicate_key(), Some(&Value::from("a")));
        assert_eq!(docs().duplicate_key(), None);
    }

    #[test]
    fn new_rejects_length_mismatch() {
        let err = KeyedFrame::new("id", vec!["a".into()], Frame::with_rows(2)).unwrap_err();
        assert!(matches!(err, Error::LengthMismatch { .. }));
    }
}
