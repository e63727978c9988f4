use crate::error::Error;
use crate::result::Result;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Find Cargo.toml in the current directory or specified path
pub fn find_manifest(path: Option<&Path>) -> Result<PathBuf> {
    let base_path = match path {
        Some(p) => p.to_path_buf(),
        None => std::env::current_dir()?,
    };

    let manifest_path = if base_path.is_file()
        && base_path.file_name().is_some_and(|n| n == "Cargo.toml")
    {
        base_path
    } else {
        base_path.join("Cargo.toml")
    };

    if !manifest_path.exists() {
        return Err(Error::ManifestNotFound(manifest_path.display().to_string()));
    }

    Ok(manifest_path)
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(|e| Error::io_at("creating", path, e))?;
    }
    Ok(())
}

/// Create `path` if missing and remove everything inside it
pub fn reset_dir(path: &Path) -> Result<()> {
    ensure_dir(path)?;

    for entry in fs::read_dir(path).map_err(|e| Error::io_at("reading", path, e))? {
        let entry = entry?;
        let entry_path = entry.path();
        let removed = if entry.file_type()?.is_dir() {
            fs::remove_dir_all(&entry_path)
        } else {
            fs::remove_file(&entry_path)
        };
        removed.map_err(|e| Error::io_at("cleaning", &entry_path, e))?;
    }

    Ok(())
}

/// Copy a single file, creating the destination's parent directory
pub fn copy_file(source: &Path, destination: &Path) -> Result<()> {
    if let Some(parent) = destination.parent() {
        ensure_dir(parent)?;
    }
    fs::copy(source, destination).map_err(|e| {
        Error::io_at(&format!("copying {} to", source.display()), destination, e)
    })?;
    Ok(())
}

/// Resolve `.` and `..` lexically, without touching the filesystem
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
