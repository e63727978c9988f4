use crate::context::Context;
use crate::error::Error;
use crate::result::Result;
use std::io::{BufRead, BufReader};
use std::process::{Command, Stdio};
use tracing::{debug, warn};

/// Run a pre-bundle build command in the project directory.
///
/// Output is forwarded to the log in verbose mode and drained otherwise.
pub fn execute(ctx: &Context, program: &str, args: &[&str]) -> Result<()> {
    debug!(program, args = %args.join(" "), "executing");

    let mut child = Command::new(program)
        .args(args)
        .current_dir(&ctx.project_dir)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| Error::CommandFailed(format!("{}: {}", program, e)))?;

    let stderr = child.stderr.take();
    let verbose = ctx.verbose;
    let stderr_reader = std::thread::spawn(move || {
        if let Some(stderr) = stderr {
            for line in BufReader::new(stderr).lines().map_while(|l| l.ok()) {
                if verbose {
                    warn!(target: "cmd", "{}", line);
                }
            }
        }
    });

    if let Some(stdout) = child.stdout.take() {
        for line in BufReader::new(stdout).lines().map_while(|l| l.ok()) {
            if verbose {
                debug!(target: "cmd", "{}", line);
            }
        }
    }

    let _ = stderr_reader.join();
    let status = child.wait()?;

    if !status.success() {
        return Err(Error::CommandFailed(format!(
            "{} {} failed with exit code: {}",
            program,
            args.join(" "),
            status.code().unwrap_or(-1)
        )));
    }

    Ok(())
}

/// Split a manifest `build` entry and run it
pub fn execute_line(ctx: &Context, command: &str) -> Result<()> {
    let parts: Vec<&str> = command.split_whitespace().collect();
    match parts.split_first() {
        Some((program, args)) => execute(ctx, program, args),
        None => Ok(()),
    }
}
