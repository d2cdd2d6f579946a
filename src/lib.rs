//! Relation-table data packs for text-matching models.
//!
//! A [`DataPack`] stores left entities (e.g. queries), right entities
//! (e.g. documents) and the relation rows pairing them. Its
//! [`FrameView`] joins the three into one flat training table on demand.

pub mod data;
pub mod error;

pub use data::index::{Selection, SliceSpec};
pub use data::keyed::KeyedFrame;
pub use data::model::{Column, Frame, Value};
pub use data::pack::DataPack;
pub use data::packing::pack;
pub use data::persist::{load_data_pack, DATA_FILENAME};
pub use data::progress::{LogProgress, NoProgress, Progress};
pub use data::text::{text_length, Rename, TextMode};
pub use data::view::{FrameView, Unpacked};
pub use error::{Error, Result};
