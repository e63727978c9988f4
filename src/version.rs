use crate::error::Error;
use crate::result::Result;
use std::fmt;
use std::path::Path;

/// The `<major>.<minor>` part of a project version, used as file name suffix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortVersion(String);

impl ShortVersion {
    /// Keep the first two dot-separated components of `version` verbatim
    pub fn from_version(version: &str) -> Result<Self> {
        let mut parts = version.trim().split('.');
        match (parts.next(), parts.next()) {
            (Some(major), Some(minor)) if !major.is_empty() && !minor.is_empty() => {
                Ok(ShortVersion(format!("{}.{}", major, minor)))
            }
            _ => Err(Error::InvalidVersion(version.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShortVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Insert `-<version>` before the trailing extension of `file_name`.
///
/// Only the final extension is touched, so `xsdTypes.xsd` becomes
/// `xsdTypes-1.3.xsd`. Without a version the name is returned as is.
pub fn versioned_file_name(file_name: &str, version: Option<&ShortVersion>) -> String {
    let Some(version) = version else {
        return file_name.to_string();
    };

    let path = Path::new(file_name);
    match (
        path.file_stem().and_then(|s| s.to_str()),
        path.extension().and_then(|e| e.to_str()),
    ) {
        (Some(stem), Some(ext)) => format!("{}-{}.{}", stem, version, ext),
        _ => format!("{}-{}", file_name, version),
    }
}
