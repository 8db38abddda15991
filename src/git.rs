use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, warn};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GitError {
  #[error("failed to run git: {0}")]
  Spawn(#[from] std::io::Error),

  #[error("git exited with status {status}: {stderr}")]
  NonZeroExit { status: i32, stderr: String }
}

/// Staged-diff access through the external `git` command.
#[derive(Debug, Clone)]
pub struct Git {
  workdir: PathBuf
}

impl Git {
  pub fn new() -> Self {
    Self::with_workdir(".")
  }

  pub fn with_workdir(path: impl AsRef<Path>) -> Self {
    Self { workdir: path.as_ref().to_path_buf() }
  }

  /// Returns the requested diff, or an empty string when git cannot be run.
  /// A hook must not break the commit because the diff was unavailable.
  pub fn diff(&self, staged: bool, stat: bool) -> String {
    match self.diff_output(staged, stat) {
      Ok(diff) => diff,
      Err(err) => {
        warn!("git diff failed, continuing with an empty diff: {err}");
        String::new()
      }
    }
  }

  fn diff_output(&self, staged: bool, stat: bool) -> Result<String, GitError> {
    let mut args = vec!["diff"];
    if staged {
      args.push("--staged");
    }
    if stat {
      args.push("--stat");
    }

    let output = Command::new("git").args(&args).current_dir(&self.workdir).output()?;

    if !output.status.success() {
      return Err(GitError::NonZeroExit {
        status: output.status.code().unwrap_or(-1),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string()
      });
    }

    let diff = String::from_utf8_lossy(&output.stdout).trim().to_string();
    debug!("git {}: {} chars", args.join(" "), diff.len());
    Ok(diff)
  }
}

impl Default for Git {
  fn default() -> Self {
    Self::new()
  }
}
