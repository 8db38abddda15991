use anyhow::{bail, Result};
use colored::Colorize;
use console::Emoji;
use gpt_commit::filesystem::Filesystem;

const EMOJI: Emoji<'static, 'static> = Emoji("🔗", "");

pub fn run() -> Result<()> {
  let fs = Filesystem::new()?;
  fs.ensure_hooks_dir()?;

  let hook_file = fs.prepare_commit_msg_path();
  if hook_file.exists() {
    bail!(
      "Hook already exists at {}, please run 'gpt-commit uninstall' first",
      hook_file.display().to_string().italic()
    );
  }

  fs.symlink_hook()?;

  println!("{EMOJI} Hook symlinked successfully to {}", hook_file.display().to_string().italic());

  Ok(())
}
