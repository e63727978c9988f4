use cargo_schema::archive::ArchiveFormat;
use clap::{Arg, ArgAction, Command, value_parser};
use std::path::PathBuf;

/// Command-line arguments for `cargo schema`
#[derive(Debug)]
pub struct Args {
    pub verbose: bool,

    /// Skip the manifest's build commands
    pub no_build: bool,

    /// Path to Cargo.toml or directory containing it
    pub path: Option<PathBuf>,

    /// Alternative file holding the schema configuration
    pub manifest: Option<PathBuf>,

    /// Active profiles, e.g. `skipVersion`
    pub profiles: Vec<String>,

    pub format: Option<ArchiveFormat>,

    /// Modification time stamped on archive entries
    pub source_date_epoch: Option<i64>,
}

impl Args {
    pub fn parse() -> Self {
        Self::from_matches(Self::command().get_matches_from(cargo_args(std::env::args_os())))
    }

    fn command() -> Command {
        Command::new("cargo-schema")
            .bin_name("cargo schema")
            .version(env!("CARGO_PKG_VERSION"))
            .about("Bundle versioned XML schema files into a reproducible archive")
            .arg(
                Arg::new("path")
                    .short('p')
                    .long("path")
                    .value_name("PATH")
                    .help("Path to Cargo.toml or directory containing it")
            )
            .arg(
                Arg::new("manifest")
                    .short('m')
                    .long("manifest")
                    .value_name("FILE")
                    .help("Path to alternative manifest file (e.g., SCHEMA.toml) for schema configuration")
            )
            .arg(
                Arg::new("verbose")
                    .short('v')
                    .long("verbose")
                    .action(ArgAction::SetTrue)
                    .help("Enable verbose output")
            )
            .arg(
                Arg::new("profile")
                    .short('P')
                    .long("profile")
                    .value_name("ID")
                    .env("SCHEMA_PROFILES")
                    .value_delimiter(',')
                    .action(ArgAction::Append)
                    .help("Activate build profiles (e.g. skipVersion to keep original file names)")
            )
            .arg(
                Arg::new("format")
                    .short('f')
                    .long("format")
                    .value_name("FORMAT")
                    .value_parser(|s: &str| s.parse::<ArchiveFormat>().map_err(|e| e.to_string()))
                    .help("Archive format: zip or tar.gz (overrides the manifest)")
            )
            .arg(
                Arg::new("no-build")
                    .long("no-build")
                    .action(ArgAction::SetTrue)
                    .help("Skip build commands")
            )
            .arg(
                Arg::new("source-date-epoch")
                    .long("source-date-epoch")
                    .value_name("SECONDS")
                    .env("SOURCE_DATE_EPOCH")
                    .value_parser(value_parser!(i64))
                    .help("Unix time stamped on archive entries (default 1980-01-01)")
            )
    }

    fn from_matches(matches: clap::ArgMatches) -> Self {
        Self {
            verbose: matches.get_flag("verbose"),
            no_build: matches.get_flag("no-build"),
            path: matches.get_one::<String>("path").map(PathBuf::from),
            manifest: matches.get_one::<String>("manifest").map(PathBuf::from),
            profiles: matches
                .get_many::<String>("profile")
                .map(|values| {
                    values
                        .map(|p| p.trim().to_string())
                        .filter(|p| !p.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            format: matches.get_one::<ArchiveFormat>("format").copied(),
            source_date_epoch: matches.get_one::<i64>("source-date-epoch").copied(),
        }
    }
}

/// Drop the `schema` argument cargo inserts when run as `cargo schema`
fn cargo_args<I: IntoIterator<Item = std::ffi::OsString>>(args: I) -> Vec<std::ffi::OsString> {
    let mut args: Vec<_> = args.into_iter().collect();
    if args.get(1).is_some_and(|a| a == "schema") {
        args.remove(1);
    }
    args
}
