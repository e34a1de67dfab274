#![allow(dead_code)]

use std::io::{Error, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use vendomat::application::engine::VendingEngine;
use vendomat::infrastructure::json_file::JsonFileStore;

/// Writes a command script with the standard header followed by `rows`.
pub fn write_script(rows: &[&str]) -> Result<NamedTempFile, Error> {
    let mut file = NamedTempFile::new()?;
    writeln!(file, "op, item, value, amount, change")?;
    for row in rows {
        writeln!(file, "{row}")?;
    }
    file.flush()?;
    Ok(file)
}

/// An engine backed by a JSON state file at `path`.
pub fn file_engine(path: &Path) -> VendingEngine {
    VendingEngine::new(Box::new(JsonFileStore::new(path)))
}
