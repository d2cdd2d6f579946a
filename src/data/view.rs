use std::collections::BTreeMap;

use super::index::Selection;
use super::model::{Frame, Value};
use super::pack::{DataPack, ID_LEFT, ID_RIGHT, LABEL};
use crate::error::Result;

// ---------------------------------------------------------------------------
// FrameView – the pack seen as one flat table
// ---------------------------------------------------------------------------

/// Read-only joined view of a [`DataPack`].
///
/// Holds only a borrow of the pack; every call re-joins the current
/// content, so a view never goes stale. Output columns are the left
/// entity (key first), then the right entity, then the relation columns
/// other than the two ids.
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    pack: &'a DataPack,
}

/// Training inputs: one full-length array per feature column plus the
/// labels, if the pack has any.
#[derive(Debug, Clone, PartialEq)]
pub struct Unpacked {
    pub features: BTreeMap<String, Vec<Value>>,
    pub labels: Option<Vec<Value>>,
}

impl<'a> FrameView<'a> {
    pub fn new(pack: &'a DataPack) -> Self {
        FrameView { pack }
    }

    /// Joined rows for the relation rows at `index`, in request order.
    pub fn slice(&self, index: impl Into<Selection>) -> Result<Frame> {
        let positions = index.into().resolve(self.pack.len())?;

        let mut rest = self.pack.relation().take(&positions)?;
        let left_ids = rest.drop_column(ID_LEFT)?.values;
        let right_ids = rest.drop_column(ID_RIGHT)?.values;

        let mut joined = self.pack.left().loc(&left_ids)?.reset_index()?;
        joined.append_columns(self.pack.right().loc(&right_ids)?.reset_index()?)?;
        joined.append_columns(rest)?;
        Ok(joined)
    }

    /// The whole joined table; one row per relation row.
    pub fn full(&self) -> Result<Frame> {
        self.slice(Selection::all())
    }

    /// Split the full joined table into feature columns and labels.
    pub fn unpack(&self) -> Result<Unpacked> {
        let mut frame = self.full()?;
        let labels = if self.pack.has_label() {
            Some(frame.drop_column(LABEL)?.values)
        } else {
            None
        };
        let features = frame
            .into_columns()
            .into_iter()
            .map(|c| (c.name, c.values))
            .collect();
        Ok(Unpacked { features, labels })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::keyed::KeyedFrame;
    use crate::data::model::Column;
    use crate::data::pack::{TEXT_LEFT, TEXT_RIGHT};
    use crate::error::Error;

    fn pack_with_aux() -> DataPack {
        let relation = Frame::from_columns(vec![
            Column::new(ID_LEFT, vec!["q1".into(), "q1".into()]),
            Column::new(ID_RIGHT, vec!["d2".into(), "d1".into()]),
            Column::new("score", vec![Value::Float(0.5), Value::Float(0.25)]),
        ])
        .unwrap();
        let left = KeyedFrame::new(
            ID_LEFT,
            vec!["q1".into()],
            Frame::from_columns(vec![Column::new(TEXT_LEFT, vec!["q".into()])]).unwrap(),
        )
        .unwrap();
        let right = KeyedFrame::new(
            ID_RIGHT,
            vec!["d1".into(), "d2".into()],
            Frame::from_columns(vec![Column::new(TEXT_RIGHT, vec!["a".into(), "b".into()])])
                .unwrap(),
        )
        .unwrap();
        DataPack::new(relation, left, right)
    }

    #[test]
    fn slice_keeps_request_order_and_aux_columns() {
        let pack = pack_with_aux();
        let frame = pack.frame().slice(vec![1usize, 0]).unwrap();
        assert_eq!(
            frame.column_names(),
            vec![ID_LEFT, TEXT_LEFT, ID_RIGHT, TEXT_RIGHT, "score"]
        );
        assert_eq!(
            frame.column(TEXT_RIGHT).unwrap(),
            &[Value::from("a"), Value::from("b")]
        );
        assert_eq!(frame.get(0, "score"), Some(&Value::Float(0.25)));
    }

    #[test]
    fn slice_with_no_rows_keeps_columns() {
        let pack = pack_with_aux();
        let frame = pack.frame().slice(Vec::<usize>::new()).unwrap();
        assert!(frame.is_empty());
        assert_eq!(frame.width(), 5);
    }

    #[test]
    fn dangling_id_is_structural_error() {
        let pack = pack_with_aux();
        let broken = DataPack::new(
            pack.relation().clone(),
            pack.left().clone(),
            pack.right().loc(&["d1".into()]).unwrap(),
        );
        let err = broken.frame().full().unwrap_err();
        assert!(matches!(err, Error::KeyNotFound { ref key, .. } if key == "d2"));
    }

    #[test]
    fn unpack_without_label_keeps_every_column() {
        let unpacked = pack_with_aux().unpack().unwrap();
        assert!(unpacked.labels.is_none());
        assert_eq!(unpacked.features.len(), 5);
        assert_eq!(unpacked.features["score"].len(), 2);
    }
}
