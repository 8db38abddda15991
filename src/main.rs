mod install;
mod uninstall;

use anyhow::Result;
use dotenv::dotenv;
use structopt::StructOpt;

#[derive(StructOpt, Debug)]
#[structopt(name = "gpt-commit", about = "A git extension that writes ChatGPT generated commit messages")]
enum Cli {
  /// Symlinks the hook binary as .git/hooks/prepare-commit-msg
  Install,
  /// Removes the hook from .git/hooks
  Uninstall
}

fn main() -> Result<()> {
  env_logger::init();
  dotenv().ok();

  match Cli::from_args() {
    Cli::Install => install::run(),
    Cli::Uninstall => uninstall::run()
  }
}
