use std::collections::HashSet;
use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Value – a single cell in a table column
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common Pandas dtypes.
/// Identifiers are hashed and compared, so `Value` must be `Eq + Hash + Ord`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// Sequence results, e.g. tokenized text.
    List(Vec<Value>),
    Null,
}

// -- Manual Eq/Ord/Hash so Value can key maps and sets --
//
// Equality is `cmp == Equal`, so floats compare by `total_cmp`: NaN equals
// itself and 0.0 differs from -0.0. Hashing `to_bits` agrees with that.

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use Value::*;
        fn discriminant(v: &Value) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
                List(_) => 5,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            (List(a), List(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::String(s) => s.hash(state),
            Value::Integer(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Bool(b) => b.hash(state),
            Value::List(items) => items.hash(state),
            Value::Null => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{s}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Null => write!(f, "<null>"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl Value {
    /// Try to interpret the value as an `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Borrow the text of a `String` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

// ---------------------------------------------------------------------------
// Column – a named run of values
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Column {
            name: name.into(),
            values,
        }
    }

    /// Gather values at `positions`; callers check bounds first.
    fn gather(&self, positions: &[usize]) -> Column {
        Column {
            name: self.name.clone(),
            values: positions.iter().map(|&p| self.values[p].clone()).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Frame – an ordered set of equal-length columns
// ---------------------------------------------------------------------------

/// A column-oriented table with a positional row index `0..len`.
///
/// Column order is preserved and column names are unique. A frame may have
/// rows but no columns, so the row count is stored separately.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Frame {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Frame {
    /// A frame with `n_rows` rows and no columns.
    pub fn with_rows(n_rows: usize) -> Self {
        Frame {
            columns: Vec::new(),
            n_rows,
        }
    }

    /// Build a frame from columns of equal length with unique names.
    pub fn from_columns(columns: Vec<Column>) -> Result<Self> {
        let n_rows = columns.first().map_or(0, |c| c.values.len());
        let mut frame = Frame::with_rows(n_rows);
        for column in columns {
            frame.push_column(column)?;
        }
        Ok(frame)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.n_rows
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn into_columns(self) -> Vec<Column> {
        self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// Values of the named column.
    pub fn column(&self, name: &str) -> Result<&[Value]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
            .ok_or_else(|| Error::missing_column(name))
    }

    /// Cell at (`row`, `column`), if both exist.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        self.column(column).ok().and_then(|values| values.get(row))
    }

    /// Append a new column; the name must not be taken yet.
    pub fn push_column(&mut self, column: Column) -> Result<()> {
        if self.has_column(&column.name) {
            return Err(Error::DuplicateColumn(column.name));
        }
        if column.values.len() != self.n_rows {
            return Err(Error::length_mismatch(
                column.name,
                self.n_rows,
                column.values.len(),
            ));
        }
        self.columns.push(column);
        Ok(())
    }

    /// Overwrite the named column in place, or append it when absent.
    pub fn set_column(&mut self, name: &str, values: Vec<Value>) -> Result<()> {
        if values.len() != self.n_rows {
            return Err(Error::length_mismatch(name, self.n_rows, values.len()));
        }
        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(existing) => existing.values = values,
            None => self.columns.push(Column::new(name, values)),
        }
        Ok(())
    }

    /// Remove the named column, failing if it does not exist.
    pub fn drop_column(&mut self, name: &str) -> Result<Column> {
        let pos = self
            .columns
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| Error::missing_column(name))?;
        Ok(self.columns.remove(pos))
    }

    /// Append every column of `other` to the right of this frame.
    pub fn append_columns(&mut self, other: Frame) -> Result<()> {
        if other.n_rows != self.n_rows {
            return Err(Error::length_mismatch(
                other.column_names().join(","),
                self.n_rows,
                other.n_rows,
            ));
        }
        for column in other.columns {
            self.push_column(column)?;
        }
        Ok(())
    }

    /// New frame holding the rows at `positions`, in that order, indexed
    /// from zero. Positions may repeat.
    pub fn take(&self, positions: &[usize]) -> Result<Frame> {
        self.check_positions(positions)?;
        Ok(Frame {
            columns: self.columns.iter().map(|c| c.gather(positions)).collect(),
            n_rows: positions.len(),
        })
    }

    /// Randomly permute the rows; the row index restarts at zero.
    pub fn shuffle_rows<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let mut order: Vec<usize> = (0..self.n_rows).collect();
        order.shuffle(rng);
        for column in &mut self.columns {
            *column = column.gather(&order);
        }
    }

    /// Columns restricted to `names`, in the order given.
    pub fn select_columns(&self, names: &[&str]) -> Result<Frame> {
        let mut frame = Frame::with_rows(self.n_rows);
        for name in names {
            let values = self.column(name)?.to_vec();
            frame.push_column(Column::new(*name, values))?;
        }
        Ok(frame)
    }

    /// Index of the first row for every distinct value in `column`, in
    /// first-occurrence order.
    pub fn first_occurrences(&self, column: &str) -> Result<Vec<usize>> {
        let values = self.column(column)?;
        let mut seen = HashSet::new();
        Ok(values
            .iter()
            .enumerate()
            .filter(|(_, v)| seen.insert(*v))
            .map(|(i, _)| i)
            .collect())
    }

    pub(crate) fn check_positions(&self, positions: &[usize]) -> Result<()> {
        match positions.iter().find(|&&p| p >= self.n_rows) {
            Some(&position) => Err(Error::PositionOutOfRange {
                position,
                len: self.n_rows,
            }),
            None => Ok(()),
        }
    }
}
