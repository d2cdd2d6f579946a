use std::fmt;
use std::str::FromStr;

use super::model::Value;
use crate::error::{Error, Result};

/// Which side's text column a transform targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextMode {
    Left,
    Right,
    Both,
}

impl FromStr for TextMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "left" => Ok(TextMode::Left),
            "right" => Ok(TextMode::Right),
            "both" => Ok(TextMode::Both),
            other => Err(Error::InvalidMode(other.to_string())),
        }
    }
}

impl fmt::Display for TextMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextMode::Left => write!(f, "left"),
            TextMode::Right => write!(f, "right"),
            TextMode::Both => write!(f, "both"),
        }
    }
}

/// Destination column name(s) for a transform result.
///
/// `Single` goes with `Left`/`Right`, `Pair` (left name, right name) with
/// `Both`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rename {
    Single(String),
    Pair(String, String),
}

impl Rename {
    pub fn single(name: impl Into<String>) -> Self {
        Rename::Single(name.into())
    }

    pub fn pair(left: impl Into<String>, right: impl Into<String>) -> Self {
        Rename::Pair(left.into(), right.into())
    }
}

/// Length of a text or list cell: characters for strings, items for lists.
/// Other values have no length and map to `Null`.
pub fn text_length(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::Integer(s.chars().count() as i64),
        Value::List(items) => Value::Integer(items.len() as i64),
        _ => Value::Null,
    }
}
