//! Runs external programs, used by `--commitmsg` to read the staged diff.

use crate::error::{GenieError, GenieResult};
use std::path::Path;
use std::process::{Command, Output};
use tracing::{error, info};

/// Trait for running system processes.
///
/// This abstraction enables testing without spawning real processes.
pub trait ProcessRunner: Send + Sync {
    /// Executes a command in `dir` and returns its output.
    fn run(&self, dir: &Path, program: &str, args: &[&str]) -> std::io::Result<Output>;

    /// Checks if a program exists in PATH.
    fn program_exists(&self, program: &str) -> bool;
}

/// Default process runner using std::process::Command.
pub struct SystemProcessRunner;

impl ProcessRunner for SystemProcessRunner {
    fn run(&self, dir: &Path, program: &str, args: &[&str]) -> std::io::Result<Output> {
        Command::new(program).args(args).current_dir(dir).output()
    }

    fn program_exists(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}

/// Returns the output of `git diff --cached` run inside `dir`.
///
/// # Errors
///
/// - [`GenieError::UserInput`] when git is missing or the working directory
///   is not a repository
/// - [`GenieError::LocalIo`] when git cannot be spawned
pub fn staged_diff(runner: &dyn ProcessRunner, dir: &Path) -> GenieResult<String> {
    if !runner.program_exists("git") {
        return Err(GenieError::UserInput(
            "git is not installed or not in PATH".to_string(),
        ));
    }

    info!("Reading staged changes in {}", dir.display());
    let output = runner
        .run(dir, "git", &["diff", "--cached"])
        .map_err(|e| GenieError::io("Failed to run git", e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        error!("git diff failed with status: {}", output.status);
        if stderr.to_lowercase().contains("not a git repository") {
            return Err(GenieError::UserInput("Not a git repository".to_string()));
        }
        return Err(GenieError::UserInput(format!("git diff failed: {}", stderr)));
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}
