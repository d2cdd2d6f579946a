/// Data layer: tables, the data pack, its joined view, and file I/O.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → flat Frame
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  packing  │  flat Frame → DataPack (relation, left, right)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐        ┌──────────┐
///   │   pack    │ ◀────▶ │ persist  │  data.json per pack directory
///   └──────────┘        └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │   view    │  re-join on every access → Frame / Unpacked
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  writer   │  Frame → .csv / .json / .parquet, pretty tables
///   └──────────┘
/// ```

pub mod index;
pub mod keyed;
pub mod loader;
pub mod model;
pub mod pack;
pub mod packing;
pub mod persist;
pub mod progress;
pub mod text;
pub mod view;
pub mod writer;
