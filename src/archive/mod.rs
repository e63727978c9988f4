//! Reproducible archives of the staged schema tree.
//!
//! Every entry carries fixed permission bits (directories `0o755`, files
//! `0o644`) and a fixed modification time, and entries are written in file
//! name order, so the same tree always yields the same bytes.

mod tar_archive;
mod zip_archive;

use crate::error::Error;
use crate::result::Result;
use crate::utils;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use time::OffsetDateTime;
use time::macros::datetime;
use tracing::{debug, info};

pub const DIR_MODE: u32 = 0o755;
pub const FILE_MODE: u32 = 0o644;

/// Earliest instant a zip header can represent.
pub const ZIP_EPOCH: OffsetDateTime = datetime!(1980-01-01 0:00 UTC);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ArchiveFormat {
    #[default]
    #[serde(rename = "zip")]
    Zip,
    #[serde(rename = "tar.gz")]
    TarGz,
}

impl ArchiveFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ArchiveFormat::Zip => "zip",
            ArchiveFormat::TarGz => "tar.gz",
        }
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ArchiveFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zip" => Ok(ArchiveFormat::Zip),
            "tar.gz" | "tgz" | "targz" => Ok(ArchiveFormat::TarGz),
            other => Err(Error::UnknownFormat(other.to_string())),
        }
    }
}

/// Modification time stamped on every archive entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp(OffsetDateTime);

impl Timestamp {
    /// Build from a `SOURCE_DATE_EPOCH` value; instants before 1980 clamp to
    /// [`ZIP_EPOCH`].
    pub fn from_unix(secs: i64) -> Result<Self> {
        let at = OffsetDateTime::from_unix_timestamp(secs)
            .map_err(|e| Error::custom(format!("Invalid source date epoch {}: {}", secs, e)))?;
        Ok(Timestamp(at.max(ZIP_EPOCH)))
    }

    pub fn unix(&self) -> u64 {
        self.0.unix_timestamp() as u64
    }

    pub fn to_zip(&self) -> Result<::zip::DateTime> {
        let at = self.0;
        ::zip::DateTime::from_date_and_time(
            at.year() as u16,
            u8::from(at.month()),
            at.day(),
            at.hour(),
            at.minute(),
            at.second(),
        )
        .map_err(|_| Error::custom(format!("{} cannot be stored in a zip header", at)))
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Timestamp(ZIP_EPOCH)
    }
}

/// Compress `source_dir` into `target` and return the entry names written.
///
/// The archive is written next to `target` and only renamed into place once
/// complete; on failure whatever was at `target` before is left untouched.
pub fn create(
    format: ArchiveFormat,
    source_dir: &Path,
    target: &Path,
    mtime: Timestamp,
) -> Result<Vec<String>> {
    if let Some(parent) = target.parent() {
        utils::ensure_dir(parent)?;
    }

    if !source_dir.is_dir() {
        return Err(Error::Archive(format!(
            "{} is not a directory",
            source_dir.display()
        )));
    }

    let partial = partial_path(target);
    debug!(partial = %partial.display(), %format, "writing archive");

    let written = match format {
        ArchiveFormat::Zip => zip_archive::write(source_dir, &partial, mtime),
        ArchiveFormat::TarGz => tar_archive::write(source_dir, &partial, mtime),
    };

    match written {
        Ok(entries) => {
            fs::rename(&partial, target).map_err(|e| Error::io_at("publishing", target, e))?;
            info!(archive = %target.display(), entries = entries.len(), "archive created");
            Ok(entries)
        }
        Err(e) => {
            let _ = fs::remove_file(&partial);
            Err(e)
        }
    }
}

fn partial_path(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".partial");
    target.with_file_name(name)
}

/// Archive entry name for `path`: relative to `root`, `/`-separated.
fn entry_name(root: &Path, path: &Path) -> Result<String> {
    let relative = path
        .strip_prefix(root)
        .map_err(|_| Error::custom(format!("{} is outside {}", path.display(), root.display())))?;

    let mut parts = Vec::new();
    for component in relative.components() {
        let part = component.as_os_str().to_str().ok_or_else(|| {
            Error::custom(format!("Non UTF-8 file name: {}", path.display()))
        })?;
        parts.push(part);
    }
    Ok(parts.join("/"))
}
