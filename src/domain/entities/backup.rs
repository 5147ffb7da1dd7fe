//! Backup entity
//!
//! A backup is an immutable archive of the state directory. Its file name
//! carries everything the descriptor needs except the size.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::domain::value_objects::{BackupTimestamp, TIMESTAMP_LEN};

/// Extension of every backup archive.
pub const ARCHIVE_EXTENSION: &str = "tar.gz";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Backup {
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: BackupTimestamp,
    pub label: Option<String>,
    pub path: PathBuf,
    pub size: u64,
}

impl Backup {
    /// Build a descriptor from an archive path, or `None` if the file name
    /// does not follow the backup naming scheme.
    pub fn from_path(path: &Path, size: u64) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?;
        let (label, timestamp) = parse_file_name(file_name)?;
        Some(Self {
            timestamp,
            label,
            path: path.to_path_buf(),
            size,
        })
    }

    pub fn file_name(&self) -> String {
        file_name(self.label.as_deref(), self.timestamp)
    }
}

fn serialize_timestamp<S>(ts: &BackupTimestamp, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_str(ts)
}

/// `<label->YYYYMMDD-HHMMSS.tar.gz`
pub fn file_name(label: Option<&str>, timestamp: BackupTimestamp) -> String {
    match label {
        Some(label) => format!("{label}-{timestamp}.{ARCHIVE_EXTENSION}"),
        None => format!("{timestamp}.{ARCHIVE_EXTENSION}"),
    }
}

/// Inverse of [`file_name`].
pub fn parse_file_name(file_name: &str) -> Option<(Option<String>, BackupTimestamp)> {
    let stem = file_name.strip_suffix(&format!(".{ARCHIVE_EXTENSION}"))?;
    if stem.len() < TIMESTAMP_LEN || !stem.is_char_boundary(stem.len() - TIMESTAMP_LEN) {
        return None;
    }
    let (prefix, ts) = stem.split_at(stem.len() - TIMESTAMP_LEN);
    let timestamp = BackupTimestamp::parse(ts)?;

    let label = match prefix {
        "" => None,
        p => Some(p.strip_suffix('-')?.to_string()).filter(|l| !l.is_empty()),
    };
    if !prefix.is_empty() && label.is_none() {
        return None;
    }
    Some((label, timestamp))
}
