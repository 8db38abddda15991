use std::path::{Path, PathBuf};
use std::{env, fs};
use std::os::unix::fs::symlink;

use anyhow::{bail, Context, Result};
use git2::{Repository, RepositoryOpenFlags as Flags};

const HOOK_BIN: &str = "gpt-commit-hook";
const HOOK_NAME: &str = "prepare-commit-msg";

/// Paths involved in wiring the hook binary into the local repository.
#[derive(Debug, Clone)]
pub struct Filesystem {
  hook_bin_path:  PathBuf,
  git_hooks_path: PathBuf
}

impl Filesystem {
  /// Locates the hook binary next to the running executable and the hooks
  /// directory of the repository containing the current directory.
  pub fn new() -> Result<Self> {
    let current_dir = env::current_dir().context("Failed to get current directory")?;
    let exe_path = env::current_exe().context("Failed to get current executable")?;

    let repo = Repository::open_ext(&current_dir, Flags::empty(), Vec::<&Path>::new())
      .with_context(|| format!("Failed to open repository at {}", current_dir.display()))?;

    let mut git_path = repo.path().to_path_buf();
    if git_path.is_relative() {
      git_path = current_dir.join(git_path);
    }

    let hook_bin_path = exe_path
      .parent()
      .with_context(|| format!("Failed to get parent directory of {}", exe_path.display()))?
      .join(HOOK_BIN);

    if !hook_bin_path.exists() {
      bail!("Hook binary not found at {}", hook_bin_path.display());
    }

    Ok(Self { hook_bin_path, git_hooks_path: git_path.join("hooks") })
  }

  pub fn hook_bin_path(&self) -> &Path {
    &self.hook_bin_path
  }

  pub fn prepare_commit_msg_path(&self) -> PathBuf {
    self.git_hooks_path.join(HOOK_NAME)
  }

  pub fn ensure_hooks_dir(&self) -> Result<()> {
    if !self.git_hooks_path.exists() {
      fs::create_dir_all(&self.git_hooks_path)
        .with_context(|| format!("Failed to create directory at {}", self.git_hooks_path.display()))?;
    }
    Ok(())
  }

  pub fn symlink_hook(&self) -> Result<()> {
    let hook_file = self.prepare_commit_msg_path();
    log::debug!("Symlinking {} to {}", self.hook_bin_path.display(), hook_file.display());
    symlink(&self.hook_bin_path, &hook_file)
      .with_context(|| format!("Failed to symlink {} to {}", self.hook_bin_path.display(), hook_file.display()))
  }
}
