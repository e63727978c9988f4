use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Custom(String),

    #[error("Cargo.toml not found at {0}")]
    ManifestNotFound(String),

    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    #[error("Invalid project version '{0}': expected at least <major>.<minor>")]
    InvalidVersion(String),

    #[error("Unknown archive format '{0}' (expected zip or tar.gz)")]
    UnknownFormat(String),

    #[error("{destination} would be written by both {first} and {second}")]
    DuplicateSchema {
        destination: PathBuf,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("{context}: {source}")]
    Path {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Exception while creating archive: {0}")]
    Archive(String),

    #[error("Exception while creating archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),

    #[error(transparent)]
    TomlSer(#[from] toml::ser::Error),

    #[error(transparent)]
    Walk(#[from] walkdir::Error),

    #[error(transparent)]
    Pattern(#[from] glob::PatternError),

    #[error(transparent)]
    Glob(#[from] glob::GlobError),
}

impl Error {
    pub fn custom<T: Into<String>>(msg: T) -> Self {
        Error::Custom(msg.into())
    }

    /// Attach the path an I/O operation was working on.
    pub fn io_at(action: &str, path: &Path, source: std::io::Error) -> Self {
        Error::Path {
            context: format!("{} {}", action, path.display()),
            source,
        }
    }
}

impl From<&str> for Error {
    fn from(err: &str) -> Self {
        Error::Custom(err.to_string())
    }
}

impl From<String> for Error {
    fn from(err: String) -> Self {
        Error::Custom(err)
    }
}
