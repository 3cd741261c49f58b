use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use thiserror::Error;
use tracing::info;

pub const ACCEPTED_EXTENSIONS: &[&str] = &["csv", "json", "pdf"];

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("unsupported file type: {0:?}")]
    UnsupportedExtension(String),
    #[error("failed to store raw file")]
    Storage(#[from] io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub path: PathBuf,
    pub bytes: u64,
}

/// Lower-cased extension after the last dot, or `None` when the name has no dot.
pub fn file_extension(file_name: &str) -> Option<String> {
    let (_, ext) = file_name.rsplit_once('.')?;
    Some(ext.to_ascii_lowercase())
}

pub fn is_accepted(file_name: &str) -> bool {
    file_extension(file_name).is_some_and(|ext| ACCEPTED_EXTENSIONS.contains(&ext.as_str()))
}

/// `YYYYmmdd_HHMMSS_<name>`.
pub fn stamped_name(at: NaiveDateTime, file_name: &str) -> String {
    format!("{}_{file_name}", at.format("%Y%m%d_%H%M%S"))
}

/// Copy an uploaded file into the Bronze directory under a timestamped name.
///
/// Only the extension is checked; contents are stored as-is.
pub fn store_raw_file<R: Read>(
    bronze_dir: &Path,
    file_name: &str,
    mut contents: R,
) -> Result<StoredFile, IngestError> {
    let base_name = Path::new(file_name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    if !is_accepted(base_name) {
        return Err(IngestError::UnsupportedExtension(
            file_extension(base_name).unwrap_or_default(),
        ));
    }

    fs::create_dir_all(bronze_dir)?;
    let path = bronze_dir.join(stamped_name(Local::now().naive_local(), base_name));
    let mut out = File::create(&path)?;
    let bytes = io::copy(&mut contents, &mut out)?;

    info!(path = %path.display(), bytes, "stored raw file");
    Ok(StoredFile { path, bytes })
}
