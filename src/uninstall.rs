use std::path::{Path, PathBuf};
use std::{env, fs};

use anyhow::{bail, Context, Result};
use git2::{Repository, RepositoryOpenFlags as Flags};

pub fn run() -> Result<()> {
  let current_dir = env::current_dir().context("Failed to get current directory")?;
  let repo = Repository::open_ext(&current_dir, Flags::empty(), Vec::<&Path>::new())
    .context("Failed to open repository")?;

  let hook_file = PathBuf::from(repo.path()).join("hooks").join("prepare-commit-msg");

  if !hook_file.exists() {
    bail!("Hook does not exist: {:?}", hook_file);
  }

  fs::remove_file(&hook_file).with_context(|| format!("Failed to remove file: {:?}", hook_file))?;
  println!("Hook uninstalled successfully from {:?}", hook_file);

  Ok(())
}
