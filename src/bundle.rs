//! Staging of schema files into the working tree.
//!
//! Files are picked up from the base directory with three glob patterns and
//! copied into the root, `modules` and `common` working directories, renamed
//! with the `<major>.<minor>` suffix unless the skip-version profile is on.

use crate::archive::{ArchiveFormat, Timestamp};
use crate::context::Context;
use crate::error::Error;
use crate::manifest::{Manifest, Patterns};
use crate::result::Result;
use crate::utils;
use crate::version::{ShortVersion, versioned_file_name};
use glob::{MatchOptions, Pattern};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Working directory a schema file is staged into
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Category {
    Root,
    Modules,
    Common,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Root => "root",
            Category::Modules => "modules",
            Category::Common => "common",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything one bundling run needs, fixed before any file is touched
#[derive(Debug, Clone)]
pub struct BundleSpec {
    pub name: String,
    pub version: String,
    pub short_version: ShortVersion,
    pub skip_version: bool,
    pub base_dir: PathBuf,
    pub work_dir: PathBuf,
    pub modules_dir: PathBuf,
    pub common_dir: PathBuf,
    pub patterns: Patterns,
    pub target: PathBuf,
    pub format: ArchiveFormat,
    pub mtime: Timestamp,
}

impl BundleSpec {
    pub fn new(ctx: &Context, manifest: &Manifest, mtime: Timestamp) -> Self {
        let skip_version = ctx.is_profile_active(&manifest.skip_version_profile);
        if skip_version {
            info!(profile = %manifest.skip_version_profile, "version suffix disabled");
        }

        Self {
            name: manifest.name.clone(),
            version: manifest.version.clone(),
            short_version: manifest.short_version.clone(),
            skip_version,
            base_dir: manifest.base_dir.clone(),
            work_dir: manifest.work_dir.clone(),
            modules_dir: manifest.modules_dir.clone(),
            common_dir: manifest.common_dir.clone(),
            patterns: manifest.patterns.clone(),
            target: manifest.target.clone(),
            format: manifest.format,
            mtime,
        }
    }

    /// The archive must not be written into the tree it is built from
    pub fn validate(&self) -> Result<()> {
        if utils::normalize(&self.target).starts_with(utils::normalize(&self.work_dir)) {
            return Err(Error::InvalidManifest(format!(
                "target {} must not be inside work-dir {}",
                self.target.display(),
                self.work_dir.display()
            )));
        }
        Ok(())
    }

    pub fn dir_for(&self, category: Category) -> &Path {
        match category {
            Category::Root => &self.work_dir,
            Category::Modules => &self.modules_dir,
            Category::Common => &self.common_dir,
        }
    }

    pub fn pattern_for(&self, category: Category) -> &str {
        match category {
            Category::Root => &self.patterns.root,
            Category::Modules => &self.patterns.modules,
            Category::Common => &self.patterns.common,
        }
    }

    /// Suffix applied to staged file names, `None` when versioning is skipped
    pub fn suffix(&self) -> Option<&ShortVersion> {
        (!self.skip_version).then_some(&self.short_version)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    pub source: PathBuf,
    pub category: Category,
    pub destination: PathBuf,
}

/// Recreate the working tree: clear the top-level working directory and
/// create the nested ones.
pub fn prepare_working_directory(spec: &BundleSpec) -> Result<()> {
    utils::reset_dir(&spec.work_dir)?;
    utils::ensure_dir(&spec.modules_dir)?;
    utils::ensure_dir(&spec.common_dir)?;
    debug!(work_dir = %spec.work_dir.display(), "working directory prepared");
    Ok(())
}

/// Resolve the patterns into a copy plan.
///
/// `modules` and `common` are matched before `root`, and a source claimed by
/// one category is never staged by another.
pub fn collect(spec: &BundleSpec) -> Result<Vec<StagedFile>> {
    let mut claimed = BTreeSet::new();
    let mut destinations: BTreeMap<PathBuf, PathBuf> = BTreeMap::new();
    let mut staged = Vec::new();

    for category in [Category::Modules, Category::Common, Category::Root] {
        for source in find(&spec.base_dir, spec.pattern_for(category))? {
            if !claimed.insert(source.clone()) {
                debug!(source = %source.display(), %category, "already staged, skipping");
                continue;
            }

            let file_name = source
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| Error::custom(format!("Invalid file name: {}", source.display())))?;
            let destination = spec
                .dir_for(category)
                .join(versioned_file_name(file_name, spec.suffix()));

            if let Some(first) = destinations.insert(destination.clone(), source.clone()) {
                return Err(Error::DuplicateSchema {
                    destination,
                    first,
                    second: source,
                });
            }

            staged.push(StagedFile {
                source,
                category,
                destination,
            });
        }
    }

    if staged.is_empty() {
        warn!(base_dir = %spec.base_dir.display(), "no schema files matched");
    }

    Ok(staged)
}

/// Prepare the working tree and copy every matched schema into it
pub fn stage(spec: &BundleSpec) -> Result<Vec<StagedFile>> {
    prepare_working_directory(spec)?;

    let staged = collect(spec)?;
    for file in &staged {
        debug!(
            source = %file.source.display(),
            destination = %file.destination.display(),
            category = %file.category,
            "staging schema"
        );
        utils::copy_file(&file.source, &file.destination)?;
    }

    info!(files = staged.len(), "schemas staged");
    Ok(staged)
}

/// Regular files under `base_dir` matching `pattern`, sorted.
fn find(base_dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let base = base_dir
        .to_str()
        .ok_or_else(|| Error::custom(format!("Non UTF-8 base directory: {}", base_dir.display())))?;
    let full = format!(
        "{}/{}",
        Pattern::escape(base.trim_end_matches(['/', '\\'])),
        pattern.trim_start_matches('/')
    );

    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: true,
    };

    let mut found = Vec::new();
    for entry in glob::glob_with(&full, options)? {
        let path = entry?;
        if path.is_file() {
            found.push(path);
        }
    }
    found.sort();
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn spec_for(root: &Path, skip_version: bool) -> BundleSpec {
        let work_dir = root.join("target").join("schema");
        BundleSpec {
            name: "qcadoo-schema".to_string(),
            version: "1.3.7".to_string(),
            short_version: ShortVersion::from_version("1.3.7").unwrap(),
            skip_version,
            base_dir: root.join("src"),
            modules_dir: work_dir.join("modules"),
            common_dir: work_dir.join("common"),
            work_dir,
            patterns: Patterns::default(),
            target: root.join("target").join("qcadoo-schema.zip"),
            format: ArchiveFormat::Zip,
            mtime: Timestamp::default(),
        }
    }

    fn fixture() -> tempfile::TempDir {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("src");
        write(&src.join("view/resources/qcadoo/view.xsd"), "<view/>");
        write(&src.join("model/resources/qcadoo/model.xsd"), "<model/>");
        write(&src.join("view/resources/qcadoo/modules/menu.xsd"), "<menu/>");
        write(&src.join("model/resources/qcadoo/common/types.xsd"), "<types/>");
        write(&src.join("model/resources/qcadoo/notes.txt"), "not a schema");
        tmp
    }

    fn names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap())
            .filter(|e| e.file_type().unwrap().is_file())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_files_land_in_their_category() {
        let tmp = fixture();
        let spec = spec_for(tmp.path(), false);

        let staged = stage(&spec).unwrap();
        assert_eq!(staged.len(), 4);

        assert_eq!(names(&spec.work_dir), vec!["model-1.3.xsd", "view-1.3.xsd"]);
        assert_eq!(names(&spec.modules_dir), vec!["menu-1.3.xsd"]);
        assert_eq!(names(&spec.common_dir), vec!["types-1.3.xsd"]);
        assert_eq!(
            fs::read_to_string(spec.modules_dir.join("menu-1.3.xsd")).unwrap(),
            "<menu/>"
        );
    }

    #[test]
    fn test_skip_version_keeps_names() {
        let tmp = fixture();
        let spec = spec_for(tmp.path(), true);

        stage(&spec).unwrap();
        assert_eq!(names(&spec.work_dir), vec!["model.xsd", "view.xsd"]);
        assert_eq!(names(&spec.modules_dir), vec!["menu.xsd"]);
    }

    #[test]
    fn test_stale_content_is_removed() {
        let tmp = fixture();
        let spec = spec_for(tmp.path(), false);
        write(&spec.work_dir.join("old-1.2.xsd"), "stale");
        write(&spec.common_dir.join("old-1.2.xsd"), "stale");

        stage(&spec).unwrap();
        assert!(!spec.work_dir.join("old-1.2.xsd").exists());
        assert!(!spec.common_dir.join("old-1.2.xsd").exists());
    }

    #[test]
    fn test_overlapping_patterns_do_not_duplicate() {
        let tmp = fixture();
        let mut spec = spec_for(tmp.path(), false);
        spec.patterns.root = "*/resources/qcadoo/**/*.xsd".to_string();

        let staged = collect(&spec).unwrap();
        assert_eq!(staged.len(), 4);

        let menu: Vec<_> = staged
            .iter()
            .filter(|f| f.source.ends_with("menu.xsd"))
            .collect();
        assert_eq!(menu.len(), 1);
        assert_eq!(menu[0].category, Category::Modules);
    }

    #[test]
    fn test_name_collision_is_an_error() {
        let tmp = fixture();
        write(
            &tmp.path().join("src/other/resources/qcadoo/view.xsd"),
            "<other/>",
        );
        let spec = spec_for(tmp.path(), false);

        assert!(matches!(
            collect(&spec),
            Err(Error::DuplicateSchema { .. })
        ));
    }

    #[test]
    fn test_target_inside_work_dir_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let mut spec = spec_for(tmp.path(), false);
        assert!(spec.validate().is_ok());
        spec.target = spec.work_dir.join("bundle.zip");
        assert!(matches!(spec.validate(), Err(Error::InvalidManifest(_))));
        spec.target = spec.work_dir.join("../bundle.zip");
        assert!(spec.validate().is_ok());
        spec.target = spec.work_dir.join("..").join("schema").join("bundle.zip");
        assert!(matches!(spec.validate(), Err(Error::InvalidManifest(_))));
    }

    #[test]
    fn test_empty_match_is_not_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let spec = spec_for(tmp.path(), false);
        assert!(stage(&spec).unwrap().is_empty());
        assert!(spec.modules_dir.is_dir());
        assert!(spec.common_dir.is_dir());
    }
}
