use std::collections::HashSet;
use std::convert::Infallible;

use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::index::Selection;
use super::keyed::KeyedFrame;
use super::model::{Frame, Value};
use super::progress::{LogProgress, NoProgress, Progress};
use super::text::{text_length, Rename, TextMode};
use super::view::{FrameView, Unpacked};
use crate::error::{Error, Result};

pub const ID_LEFT: &str = "id_left";
pub const ID_RIGHT: &str = "id_right";
pub const TEXT_LEFT: &str = "text_left";
pub const TEXT_RIGHT: &str = "text_right";
pub const LABEL: &str = "label";
pub const LENGTH_LEFT: &str = "length_left";
pub const LENGTH_RIGHT: &str = "length_right";

// ---------------------------------------------------------------------------
// DataPack – left entities, right entities and the relation between them
// ---------------------------------------------------------------------------

/// Compact storage for matching data.
///
/// `relation` holds one row per (left, right) pair with the two identifiers
/// in `id_left` / `id_right` plus an optional `label` and any auxiliary
/// columns. Row order of `relation` is the pack's order. `left` and `right`
/// hold each entity once, keyed by its identifier.
///
/// Nothing is checked at construction; [`DataPack::validate`] checks
/// referential integrity on demand.
///
/// Mutating operations take an `inplace` flag: `true` changes `self` and
/// returns `None`, `false` leaves `self` untouched and returns the changed
/// copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPack {
    relation: Frame,
    left: KeyedFrame,
    right: KeyedFrame,
}

#[derive(Debug, Clone, Copy)]
enum Side {
    Left,
    Right,
}

impl Side {
    fn text_column(self) -> &'static str {
        match self {
            Side::Left => TEXT_LEFT,
            Side::Right => TEXT_RIGHT,
        }
    }
}

impl DataPack {
    pub fn new(relation: Frame, left: KeyedFrame, right: KeyedFrame) -> Self {
        DataPack {
            relation,
            left,
            right,
        }
    }

    /// Number of relation rows.
    pub fn len(&self) -> usize {
        self.relation.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relation.is_empty()
    }

    /// Whether `relation` carries a `label` column.
    pub fn has_label(&self) -> bool {
        self.relation.has_column(LABEL)
    }

    pub fn relation(&self) -> &Frame {
        &self.relation
    }

    pub fn left(&self) -> &KeyedFrame {
        &self.left
    }

    pub fn right(&self) -> &KeyedFrame {
        &self.right
    }

    /// Joined view over the current content of this pack.
    pub fn frame(&self) -> FrameView<'_> {
        FrameView::new(self)
    }

    /// Features and labels of the full joined frame.
    pub fn unpack(&self) -> Result<Unpacked> {
        self.frame().unpack()
    }

    /// Independent sub-pack holding the relation rows at `index`, with
    /// `left` / `right` cut down to the entities those rows reference.
    pub fn select(&self, index: impl Into<Selection>) -> Result<DataPack> {
        let positions = index.into().resolve(self.len())?;
        let relation = self.relation.take(&positions)?;
        let left = self
            .left
            .loc(&unique_in_order(relation.column(ID_LEFT)?))?;
        let right = self
            .right
            .loc(&unique_in_order(relation.column(ID_RIGHT)?))?;
        debug!(
            "selected {} of {} relation rows ({} left, {} right)",
            relation.len(),
            self.len(),
            left.len(),
            right.len()
        );
        Ok(DataPack::new(relation, left, right))
    }

    /// Deep copy of all three tables.
    pub fn copy(&self) -> DataPack {
        self.clone()
    }

    /// Check that ids are unique per entity table and that every relation
    /// row points at existing entities.
    pub fn validate(&self) -> Result<()> {
        for table in [&self.left, &self.right] {
            if let Some(key) = table.duplicate_key() {
                return Err(Error::duplicate_key(table.key_name(), key));
            }
        }
        self.left.locate(self.relation.column(ID_LEFT)?)?;
        self.right.locate(self.relation.column(ID_RIGHT)?)?;
        Ok(())
    }

    /// Run `op` on `self` or on a fresh copy, per `inplace`.
    fn optional_inplace<E, F>(
        &mut self,
        inplace: bool,
        op: F,
    ) -> std::result::Result<Option<DataPack>, E>
    where
        F: FnOnce(&mut DataPack) -> std::result::Result<(), E>,
    {
        if inplace {
            op(self)?;
            Ok(None)
        } else {
            let mut target = self.copy();
            op(&mut target)?;
            Ok(Some(target))
        }
    }

    /// Randomly reorder the relation rows using the thread RNG.
    pub fn shuffle(&mut self, inplace: bool) -> Option<DataPack> {
        self.shuffle_with(&mut rand::thread_rng(), inplace)
    }

    /// Randomly reorder the relation rows using `rng`.
    pub fn shuffle_with<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        inplace: bool,
    ) -> Option<DataPack> {
        let shuffled = self.optional_inplace(inplace, |pack| {
            pack.relation.shuffle_rows(rng);
            debug!("shuffled {} relation rows", pack.len());
            Ok::<(), Infallible>(())
        });
        match shuffled {
            Ok(out) => out,
            Err(never) => match never {},
        }
    }

    /// Remove the `label` column; fails if there is none.
    pub fn drop_label(&mut self, inplace: bool) -> Result<Option<DataPack>> {
        self.optional_inplace(inplace, |pack| {
            pack.relation.drop_column(LABEL)?;
            debug!("dropped `{LABEL}` column");
            Ok(())
        })
    }

    /// Add `length_left` / `length_right` computed from the text columns.
    pub fn append_text_length(&mut self, inplace: bool) -> Result<Option<DataPack>> {
        self.optional_inplace(inplace, |pack| {
            pack.apply_on_text(
                text_length,
                TextMode::Both,
                Some(Rename::pair(LENGTH_LEFT, LENGTH_RIGHT)),
                true,
                true,
            )?;
            Ok(())
        })
    }

    /// Apply `func` to `text_left`, `text_right` or both.
    ///
    /// Results overwrite the text column unless `rename` names a new column:
    /// [`Rename::Single`] for `Left`/`Right`, [`Rename::Pair`] for `Both`.
    /// With `verbose`, progress is logged per row.
    pub fn apply_on_text<F>(
        &mut self,
        func: F,
        mode: TextMode,
        rename: Option<Rename>,
        verbose: bool,
        inplace: bool,
    ) -> Result<Option<DataPack>>
    where
        F: FnMut(&Value) -> Value,
    {
        if verbose {
            self.apply_on_text_with(func, mode, rename, &mut LogProgress::default(), inplace)
        } else {
            self.apply_on_text_with(func, mode, rename, &mut NoProgress, inplace)
        }
    }

    /// [`apply_on_text`](Self::apply_on_text) reporting to a caller-supplied
    /// progress observer.
    pub fn apply_on_text_with<F>(
        &mut self,
        mut func: F,
        mode: TextMode,
        rename: Option<Rename>,
        progress: &mut dyn Progress,
        inplace: bool,
    ) -> Result<Option<DataPack>>
    where
        F: FnMut(&Value) -> Value,
    {
        let targets = match (mode, rename) {
            (TextMode::Left, None) => vec![(Side::Left, TEXT_LEFT.to_string())],
            (TextMode::Right, None) => vec![(Side::Right, TEXT_RIGHT.to_string())],
            (TextMode::Left, Some(Rename::Single(name))) => vec![(Side::Left, name)],
            (TextMode::Right, Some(Rename::Single(name))) => vec![(Side::Right, name)],
            (TextMode::Both, None) => vec![
                (Side::Left, TEXT_LEFT.to_string()),
                (Side::Right, TEXT_RIGHT.to_string()),
            ],
            (TextMode::Both, Some(Rename::Pair(left, right))) => {
                vec![(Side::Left, left), (Side::Right, right)]
            }
            (TextMode::Both, Some(Rename::Single(_))) => {
                return Err(Error::invalid_rename(
                    mode.to_string(),
                    "expected a (left, right) pair of names",
                ));
            }
            (_, Some(Rename::Pair(..))) => {
                return Err(Error::invalid_rename(mode.to_string(), "expected a single name"));
            }
        };

        self.optional_inplace(inplace, |pack| {
            for (side, name) in targets {
                pack.apply_on_side(side, &mut func, &name, progress)?;
            }
            Ok(())
        })
    }

    fn apply_on_side(
        &mut self,
        side: Side,
        func: &mut dyn FnMut(&Value) -> Value,
        name: &str,
        progress: &mut dyn Progress,
    ) -> Result<()> {
        let table = match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        };
        let source = table.frame().column(side.text_column())?;

        progress.begin(&format!("Processing {name}"), source.len());
        let mut values = Vec::with_capacity(source.len());
        for value in source {
            values.push(func(value));
            progress.tick();
        }
        progress.finish();

        table.frame_mut().set_column(name, values)
    }
}

/// Distinct values in first-occurrence order.
fn unique_in_order(values: &[Value]) -> Vec<Value> {
    let mut seen = HashSet::new();
    values
        .iter()
        .filter(|v| seen.insert(*v))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::data::model::Column;

    fn toy() -> DataPack {
        let relation = Frame::from_columns(vec![
            Column::new(ID_LEFT, vec!["q1".into(), "q2".into(), "q1".into()]),
            Column::new(ID_RIGHT, vec!["d1".into(), "d2".into(), "d3".into()]),
            Column::new(LABEL, vec![1i64.into(), 0i64.into(), 1i64.into()]),
        ])
        .unwrap();
        let left = KeyedFrame::new(
            ID_LEFT,
            vec!["q1".into(), "q2".into()],
            Frame::from_columns(vec![Column::new(
                TEXT_LEFT,
                vec!["how to bake".into(), "rust traits".into()],
            )])
            .unwrap(),
        )
        .unwrap();
        let right = KeyedFrame::new(
            ID_RIGHT,
            vec!["d1".into(), "d2".into(), "d3".into()],
            Frame::from_columns(vec![Column::new(
                TEXT_RIGHT,
                vec!["bread".into(), "trait objects".into(), "oven".into()],
            )])
            .unwrap(),
        )
        .unwrap();
        DataPack::new(relation, left, right)
    }

    #[test]
    fn select_restricts_entities_to_referenced_ids() {
        let sub = toy().select(vec![2usize, 0]).unwrap();
        assert_eq!(sub.len(), 2);
        assert_eq!(sub.left().keys(), &[Value::from("q1")]);
        assert_eq!(sub.right().keys(), &[Value::from("d3"), Value::from("d1")]);
        assert_eq!(
            sub.relation().column(ID_RIGHT).unwrap(),
            &[Value::from("d3"), Value::from("d1")]
        );
    }

    #[test]
    fn select_out_of_range_fails() {
        let err = toy().select(7usize).unwrap_err();
        assert!(err.is_lookup());
    }

    #[test]
    fn select_slice_is_bounded_by_length() {
        assert_eq!(toy().select(1usize..50).unwrap().len(), 2);
    }

    #[test]
    fn validate_reports_dangling_relation_ids() {
        let pack = toy();
        assert!(pack.validate().is_ok());

        let relation = Frame::from_columns(vec![
            Column::new(ID_LEFT, vec!["q9".into()]),
            Column::new(ID_RIGHT, vec!["d1".into()]),
        ])
        .unwrap();
        let broken = DataPack::new(relation, pack.left().clone(), pack.right().clone());
        assert!(matches!(
            broken.validate(),
            Err(Error::KeyNotFound { ref key, .. }) if key == "q9"
        ));
    }

    #[test]
    fn shuffle_copy_keeps_original_order() {
        let mut pack = toy();
        let before = pack.clone();
        let mut rng = StdRng::seed_from_u64(7);
        let shuffled = pack.shuffle_with(&mut rng, false).unwrap();
        assert_eq!(pack, before);
        assert_eq!(shuffled.len(), pack.len());
        assert_eq!(shuffled.left(), pack.left());

        let mut rows: Vec<_> = shuffled.relation().column(ID_RIGHT).unwrap().to_vec();
        rows.sort();
        assert_eq!(rows, vec![Value::from("d1"), Value::from("d2"), Value::from("d3")]);
    }

    #[test]
    fn shuffle_inplace_returns_nothing() {
        let mut pack = toy();
        assert!(pack.shuffle(true).is_none());
        assert_eq!(pack.len(), 3);
    }

    #[test]
    fn drop_label_twice_fails() {
        let mut pack = toy();
        assert!(pack.drop_label(true).unwrap().is_none());
        assert!(!pack.has_label());
        assert!(matches!(
            pack.drop_label(true),
            Err(Error::MissingColumn(ref c)) if c == LABEL
        ));
    }

    #[test]
    fn failed_copy_leaves_receiver_untouched() {
        let mut pack = toy();
        pack.drop_label(true).unwrap();
        let before = pack.clone();
        assert!(pack.drop_label(false).is_err());
        assert_eq!(pack, before);
    }

    #[test]
    fn rename_shape_checked_before_mutation() {
        let mut pack = toy();
        let before = pack.clone();
        let err = pack
            .apply_on_text(
                text_length,
                TextMode::Both,
                Some(Rename::single("len")),
                false,
                true,
            )
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRename { .. }));
        assert_eq!(pack, before);

        let err = pack
            .apply_on_text(
                text_length,
                TextMode::Left,
                Some(Rename::pair("a", "b")),
                false,
                true,
            )
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRename { .. }));
    }

    #[test]
    fn apply_left_overwrites_text_by_default() {
        let mut pack = toy();
        pack.apply_on_text(
            |v| Value::from(v.to_string().to_uppercase()),
            TextMode::Left,
            None,
            false,
            true,
        )
        .unwrap();
        assert_eq!(
            pack.left().frame().column(TEXT_LEFT).unwrap()[0],
            Value::from("HOW TO BAKE")
        );
        assert_eq!(pack.left().frame().width(), 1);
        assert_eq!(
            pack.right().frame().column(TEXT_RIGHT).unwrap()[0],
            Value::from("bread")
        );
    }

    #[test]
    fn verbose_apply_matches_quiet_apply() {
        let mut pack = toy();
        let quiet = pack
            .apply_on_text(text_length, TextMode::Both, None, false, false)
            .unwrap()
            .unwrap();
        let verbose = pack
            .apply_on_text(text_length, TextMode::Both, None, true, false)
            .unwrap()
            .unwrap();
        assert_eq!(verbose, quiet);
        assert_eq!(pack, toy());
    }

    #[test]
    fn progress_ticks_once_per_row() {
        #[derive(Default)]
        struct Counter {
            begun: Vec<(String, usize)>,
            ticks: usize,
        }
        impl Progress for Counter {
            fn begin(&mut self, desc: &str, total: usize) {
                self.begun.push((desc.to_string(), total));
            }
            fn tick(&mut self) {
                self.ticks += 1;
            }
            fn finish(&mut self) {}
        }

        let mut pack = toy();
        let mut counter = Counter::default();
        let out = pack
            .apply_on_text_with(text_length, TextMode::Both, None, &mut counter, false)
            .unwrap()
            .unwrap();
        assert_eq!(counter.ticks, 5);
        assert_eq!(
            counter.begun,
            vec![
                ("Processing text_left".to_string(), 2),
                ("Processing text_right".to_string(), 3)
            ]
        );
        assert_eq!(
            out.right().frame().column(TEXT_RIGHT).unwrap()[1],
            Value::Integer(13)
        );
    }
}
