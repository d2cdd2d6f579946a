use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use log::info;

use super::model::{Frame, Value};
use super::pack::DataPack;
use crate::error::{Error, Result};

/// File written inside a pack directory.
pub const DATA_FILENAME: &str = "data.json";

impl DataPack {
    /// Write the pack to `dirpath/data.json`, creating `dirpath` if needed.
    ///
    /// Fails with [`Error::AlreadyExists`] instead of overwriting an
    /// existing data file, and with [`Error::Serialization`] before touching
    /// the disk when a cell holds NaN or an infinity, which JSON cannot
    /// represent.
    pub fn save(&self, dirpath: impl AsRef<Path>) -> Result<()> {
        let dirpath = dirpath.as_ref();
        let data_file_path = dirpath.join(DATA_FILENAME);

        self.check_finite()?;
        fs::create_dir_all(dirpath)?;

        let file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&data_file_path)
        {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                return Err(Error::AlreadyExists(data_file_path));
            }
            Err(err) => return Err(err.into()),
        };

        let mut writer = BufWriter::new(file);
        let written = serde_json::to_writer(&mut writer, self)
            .map_err(Error::from)
            .and_then(|()| writer.flush().map_err(Error::from));
        if let Err(err) = written {
            drop(writer);
            // Leave no partial file behind.
            let _ = fs::remove_file(&data_file_path);
            return Err(err);
        }

        info!(
            "saved data pack ({} rows) to {}",
            self.len(),
            data_file_path.display()
        );
        Ok(())
    }

    fn check_finite(&self) -> Result<()> {
        let tables = [
            ("relation", self.relation()),
            ("left", self.left().frame()),
            ("right", self.right().frame()),
        ];
        for (table, frame) in tables {
            check_frame_finite(table, frame)?;
        }
        for (table, keyed) in [("left", self.left()), ("right", self.right())] {
            if keyed.keys().iter().any(|v| !is_finite(v)) {
                return Err(non_finite(table, keyed.key_name()));
            }
        }
        Ok(())
    }
}

fn check_frame_finite(table: &str, frame: &Frame) -> Result<()> {
    for column in frame.columns() {
        if column.values.iter().any(|v| !is_finite(v)) {
            return Err(non_finite(table, &column.name));
        }
    }
    Ok(())
}

fn is_finite(value: &Value) -> bool {
    match value {
        Value::Float(f) => f.is_finite(),
        Value::List(items) => items.iter().all(is_finite),
        _ => true,
    }
}

fn non_finite(table: &str, column: &str) -> Error {
    Error::Serialization(format!(
        "column `{column}` in `{table}` holds a non-finite float, which JSON cannot store"
    ))
}

/// Read a pack written by [`DataPack::save`].
pub fn load_data_pack(dirpath: impl AsRef<Path>) -> Result<DataPack> {
    let data_file_path = dirpath.as_ref().join(DATA_FILENAME);
    let reader = BufReader::new(File::open(&data_file_path)?);
    let pack: DataPack = serde_json::from_reader(reader)?;
    info!(
        "loaded data pack ({} rows) from {}",
        pack.len(),
        data_file_path.display()
    );
    Ok(pack)
}
