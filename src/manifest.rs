use crate::archive::ArchiveFormat;
use crate::context::Context;
use crate::error::Error;
use crate::result::Result;
use crate::tpl::Tpl;
use crate::version::ShortVersion;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};

pub const DEFAULT_SKIP_VERSION_PROFILE: &str = "skipVersion";

#[derive(Debug, Deserialize, Serialize)]
pub struct CargoToml {
    pub package: Package,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Package {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct Metadata {
    #[serde(default)]
    pub schema: Option<SchemaConfig>,
}

/// `[package.metadata.schema]`; every key is optional
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SchemaConfig {
    #[serde(default)]
    pub base_dir: Option<String>,

    #[serde(default)]
    pub work_dir: Option<String>,

    #[serde(default)]
    pub modules_dir: Option<String>,

    #[serde(default)]
    pub common_dir: Option<String>,

    #[serde(default)]
    pub patterns: Patterns,

    #[serde(default)]
    pub target: Option<String>,

    #[serde(default)]
    pub format: Option<ArchiveFormat>,

    #[serde(default)]
    pub skip_version_profile: Option<String>,

    #[serde(default)]
    pub build: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct Patterns {
    pub root: String,
    pub modules: String,
    pub common: String,
}

impl Default for Patterns {
    fn default() -> Self {
        Self {
            root: "*/resources/*/*.xsd".to_string(),
            modules: "*/resources/*/modules/*.xsd".to_string(),
            common: "*/resources/*/common/*.xsd".to_string(),
        }
    }
}

/// Resolved manifest: template variables expanded, paths absolute to the
/// project directory
#[derive(Debug, Clone)]
pub struct Manifest {
    pub name: String,
    pub version: String,
    pub short_version: ShortVersion,
    pub base_dir: PathBuf,
    pub work_dir: PathBuf,
    pub modules_dir: PathBuf,
    pub common_dir: PathBuf,
    pub patterns: Patterns,
    pub target: PathBuf,
    pub format: ArchiveFormat,
    pub skip_version_profile: String,
    pub build_commands: Vec<String>,
}

impl Manifest {
    /// Load configuration from `[package.metadata.schema]` in Cargo.toml
    pub fn load(ctx: &Context) -> Result<Self> {
        let cargo_toml = read_cargo_toml(&ctx.manifest_path)?;
        let config = cargo_toml
            .package
            .metadata
            .as_ref()
            .and_then(|m| m.schema.clone())
            .unwrap_or_default();

        Self::resolve(ctx, &cargo_toml.package, config)
    }

    /// Load configuration from a standalone TOML file holding the
    /// `[package.metadata.schema]` keys at top level. Name and version still
    /// come from Cargo.toml.
    pub fn load_with_schema_manifest(ctx: &Context, schema_manifest: &Path) -> Result<Self> {
        let cargo_toml = read_cargo_toml(&ctx.manifest_path)?;

        let path = if schema_manifest.is_absolute() {
            schema_manifest.to_path_buf()
        } else {
            ctx.project_dir.join(schema_manifest)
        };
        let content = fs::read_to_string(&path).map_err(|e| Error::io_at("reading", &path, e))?;
        let config: SchemaConfig = toml::from_str(&content)?;

        Self::resolve(ctx, &cargo_toml.package, config)
    }

    fn resolve(ctx: &Context, package: &Package, config: SchemaConfig) -> Result<Self> {
        if package.name.trim().is_empty() {
            return Err(Error::InvalidManifest("package name is empty".to_string()));
        }

        let short_version = ShortVersion::from_version(&package.version)?;

        let mut tpl = Tpl::new();
        tpl.register("NAME", &package.name);
        tpl.register("VERSION", &package.version);
        tpl.register("SHORT_VERSION", short_version.as_str());

        let format = ctx.format.or(config.format).unwrap_or_default();
        let project_path = |value: Option<&String>, default: &str| -> PathBuf {
            ctx.project_dir
                .join(tpl.parse_path(value.map(String::as_str).unwrap_or(default)))
        };

        let base_dir = project_path(config.base_dir.as_ref(), "..");
        let work_dir = project_path(config.work_dir.as_ref(), "target/schema");
        let modules_dir = work_dir.join(nested_dir(
            "modules-dir",
            tpl.parse_path(config.modules_dir.as_deref().unwrap_or("modules")),
        )?);
        let common_dir = work_dir.join(nested_dir(
            "common-dir",
            tpl.parse_path(config.common_dir.as_deref().unwrap_or("common")),
        )?);

        let default_target = format!("target/$NAME.{}", format.extension());
        let target = project_path(config.target.as_ref(), &default_target);

        let patterns = Patterns {
            root: tpl.parse(&config.patterns.root),
            modules: tpl.parse(&config.patterns.modules),
            common: tpl.parse(&config.patterns.common),
        };

        Ok(Manifest {
            name: package.name.clone(),
            version: package.version.clone(),
            short_version,
            base_dir,
            work_dir,
            modules_dir,
            common_dir,
            patterns,
            target,
            format,
            skip_version_profile: config
                .skip_version_profile
                .unwrap_or_else(|| DEFAULT_SKIP_VERSION_PROFILE.to_string()),
            build_commands: tpl.parse_vec(&config.build),
        })
    }
}

/// A subdirectory of `work-dir`: relative, without `..`, and not empty
fn nested_dir(key: &str, path: PathBuf) -> Result<PathBuf> {
    let mut normal = false;
    for component in path.components() {
        match component {
            Component::Normal(_) => normal = true,
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(Error::InvalidManifest(format!(
                    "{} '{}' must be a subdirectory of work-dir",
                    key,
                    path.display()
                )));
            }
        }
    }
    if !normal {
        return Err(Error::InvalidManifest(format!(
            "{} '{}' must name a subdirectory of work-dir",
            key,
            path.display()
        )));
    }
    Ok(path)
}

fn read_cargo_toml(path: &Path) -> Result<CargoToml> {
    let content = fs::read_to_string(path).map_err(|e| Error::io_at("reading", path, e))?;
    Ok(toml::from_str(&content)?)
}
