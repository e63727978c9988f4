mod args;

use args::Args;
use cargo_schema::BuildEvent;
use cargo_schema::archive::Timestamp;
use cargo_schema::bundle::BundleSpec;
use cargo_schema::context::Context;
use cargo_schema::manifest::Manifest;
use cargo_schema::result::Result;
use cargo_schema::{cmd, utils};
use cliclack::ProgressBar;
use tracing_subscriber::EnvFilter;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr so spinners on stdout stay intact; `RUST_LOG` wins over
/// `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose { "cargo_schema=debug,cmd=debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr)
        .try_init();
}

fn run() -> Result<()> {
    let Args {
        verbose,
        no_build,
        path,
        manifest: schema_manifest,
        profiles,
        format,
        source_date_epoch,
    } = Args::parse();

    init_logging(verbose);

    let manifest_path = utils::find_manifest(path.as_deref())?;
    let ctx = Context::new(manifest_path, verbose)
        .with_profiles(profiles)
        .with_format(format);

    cliclack::intro("schema")?;

    let manifest = {
        let spinner = cliclack::spinner();
        spinner.start("Loading manifest...");
        let result = match &schema_manifest {
            Some(path) => Manifest::load_with_schema_manifest(&ctx, path),
            None => Manifest::load(&ctx),
        };
        match result {
            Ok(m) => {
                spinner.stop(format!("Loaded manifest for {} {}", m.name, m.version));
                m
            }
            Err(e) => {
                spinner.error("Failed to load manifest");
                return Err(e);
            }
        }
    };

    // The package phase runs before schemas are bundled
    if !no_build && !manifest.build_commands.is_empty() {
        let spinner = cliclack::spinner();
        spinner.start("Building project...");
        for command in &manifest.build_commands {
            if let Err(e) = cmd::execute_line(&ctx, command) {
                spinner.error(format!("Failed: {}", command));
                return Err(e);
            }
        }
        spinner.stop("Build completed");
    }

    let mtime = match source_date_epoch {
        Some(secs) => Timestamp::from_unix(secs)?,
        None => Timestamp::default(),
    };
    let spec = BundleSpec::new(&ctx, &manifest, mtime);

    // The spinner for the step in progress, so a failure can mark it
    let mut current: Option<(ProgressBar, &str)> = None;
    let result = cargo_schema::build_with(&spec, |event| match event {
        BuildEvent::Staging => {
            let spinner = cliclack::spinner();
            spinner.start("Staging schemas...");
            current = Some((spinner, "Failed to stage schemas"));
        }
        BuildEvent::Staged(staged) => {
            let suffix = spec
                .suffix()
                .map(|v| format!(" as -{}", v))
                .unwrap_or_else(|| " without version suffix".to_string());
            if let Some((spinner, _)) = current.take() {
                spinner.stop(format!("Staged {} schema files{}", staged.len(), suffix));
            }
        }
        BuildEvent::Archiving(format) => {
            let spinner = cliclack::spinner();
            spinner.start(format!("Creating {} archive...", format));
            current = Some((spinner, "Failed to create archive"));
        }
        BuildEvent::Registered(record) => {
            if let Some((spinner, _)) = current.take() {
                spinner.stop(format!("Archive created: {}", record.path.display()));
            }
        }
    });

    if let Err(e) = result {
        if let Some((spinner, message)) = current.take() {
            spinner.error(message);
        }
        return Err(e);
    }

    cliclack::outro("Schema archive created successfully!")?;
    Ok(())
}
