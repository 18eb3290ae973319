//! JSON and CSV export of listing entries.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{CoreError, CoreResult};
use crate::fs::entry::Entry;

/// Output encoding for [`export_entries`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

impl ExportFormat {
    pub fn label(self) -> &'static str {
        match self {
            Self::Json => "JSON",
            Self::Csv => "CSV",
        }
    }

    /// The other format, for cycling in the export dialog.
    pub fn next(self) -> Self {
        match self {
            Self::Json => Self::Csv,
            Self::Csv => Self::Json,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }

    /// `<dir>/mole_export.<ext>`
    pub fn default_destination(self, dir: &Path) -> PathBuf {
        dir.join(format!("mole_export.{}", self.extension()))
    }
}

/// One exported row. Pending sizes are written as `-1`.
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    name: &'a str,
    path: String,
    size: i64,
    is_dir: bool,
}

impl<'a> From<&'a Entry> for ExportRow<'a> {
    fn from(entry: &'a Entry) -> Self {
        Self {
            name: entry.name(),
            path: entry.path().to_string_lossy().into_owned(),
            size: entry
                .size()
                .map_or(-1, |s| i64::try_from(s).unwrap_or(i64::MAX)),
            is_dir: entry.is_dir(),
        }
    }
}

/// Writes `entries` to `dest` in the given format, replacing any existing file.
///
/// JSON is a pretty-printed array of `{name, path, size, is_dir}`. CSV has
/// the header `name,path,size,is_dir` and writes booleans as `true`/`false`.
pub fn export_entries(entries: &[Entry], format: ExportFormat, dest: &Path) -> CoreResult<()> {
    let rows: Vec<ExportRow<'_>> = entries.iter().map(ExportRow::from).collect();
    match format {
        ExportFormat::Json => {
            let json = serde_json::to_string_pretty(&rows)
                .map_err(|e| CoreError::Export(e.to_string()))?;
            std::fs::write(dest, json).map_err(|e| CoreError::from_io(dest, e))
        }
        ExportFormat::Csv => {
            let mut writer =
                csv::Writer::from_path(dest).map_err(|e| CoreError::Export(e.to_string()))?;
            // Header comes from the row struct's field names.
            for row in &rows {
                writer
                    .serialize(row)
                    .map_err(|e| CoreError::Export(e.to_string()))?;
            }
            if rows.is_empty() {
                writer
                    .write_record(["name", "path", "size", "is_dir"])
                    .map_err(|e| CoreError::Export(e.to_string()))?;
            }
            writer.flush().map_err(|e| CoreError::from_io(dest, e))
        }
    }
}
