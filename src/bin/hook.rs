// Hook: prepare-commit-msg

use anyhow::{Context, Result};
use gpt_commit::hook::{self, Args};
use indicatif::{ProgressBar, ProgressStyle};
use structopt::StructOpt;
use tokio::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::from_args();

  env_logger::Builder::new()
    .filter_level(args.log_level)
    .parse_default_env()
    .init();

  // Loading bar to indicate that the hook is running
  let style = ProgressStyle::default_spinner()
    .tick_strings(&["-", "\\", "|", "/"])
    .template("{spinner:.blue} {msg}")
    .context("Failed to create progress bar style")?;

  let pb = ProgressBar::new_spinner();
  pb.set_style(style);
  pb.set_message("Generating commit message...");
  pb.enable_steady_tick(Duration::from_millis(150));

  let result = hook::run(&args).await;
  pb.finish_and_clear();

  result.context("Sorry, something went wrong")
}
