use crate::archive::ArchiveFormat;
use std::path::PathBuf;

/// Per-invocation settings shared by every build step
#[derive(Clone, Debug)]
pub struct Context {
    /// Stream command output and per-file progress
    pub verbose: bool,

    /// Path to the Cargo.toml manifest
    pub manifest_path: PathBuf,

    /// Directory containing Cargo.toml; relative manifest paths resolve here
    pub project_dir: PathBuf,

    /// Active build profiles (e.g. `skipVersion`)
    pub profiles: Vec<String>,

    /// Archive format requested on the command line
    pub format: Option<ArchiveFormat>,
}

impl Context {
    pub fn new(manifest_path: PathBuf, verbose: bool) -> Self {
        let project_dir = manifest_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        Self {
            verbose,
            manifest_path,
            project_dir,
            profiles: Vec::new(),
            format: None,
        }
    }

    pub fn with_profiles<I, S>(mut self, profiles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.profiles = profiles.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_format(mut self, format: Option<ArchiveFormat>) -> Self {
        self.format = format;
        self
    }

    pub fn is_profile_active(&self, id: &str) -> bool {
        self.profiles.iter().any(|p| p == id)
    }
}
