use crate::archive::ArchiveFormat;
use crate::bundle::BundleSpec;
use crate::error::Error;
use crate::result::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Record of the archive registered as the build's primary output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRecord {
    pub name: String,
    pub version: String,
    pub format: ArchiveFormat,
    pub path: PathBuf,
    pub entries: Vec<String>,
}

impl ArtifactRecord {
    /// `<archive>.artifact.toml`
    pub fn record_path(archive: &Path) -> PathBuf {
        let mut name = archive
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".artifact.toml");
        archive.with_file_name(name)
    }

    pub fn load(archive: &Path) -> Result<Self> {
        let path = Self::record_path(archive);
        let content = fs::read_to_string(&path).map_err(|e| Error::io_at("reading", &path, e))?;
        Ok(toml::from_str(&content)?)
    }
}

/// Register the finished archive: write its record next to it
pub fn register(spec: &BundleSpec, entries: Vec<String>) -> Result<ArtifactRecord> {
    if !spec.target.is_file() {
        return Err(Error::Archive(format!(
            "{} was not produced",
            spec.target.display()
        )));
    }

    let record = ArtifactRecord {
        name: spec.name.clone(),
        version: spec.version.clone(),
        format: spec.format,
        path: spec.target.clone(),
        entries,
    };

    let record_path = ArtifactRecord::record_path(&spec.target);
    let content = toml::to_string(&record)?;
    fs::write(&record_path, content).map_err(|e| Error::io_at("writing", &record_path, e))?;

    info!(
        artifact = %record.path.display(),
        name = %record.name,
        version = %record.version,
        "artifact registered"
    );
    Ok(record)
}
