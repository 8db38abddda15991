use std::fs::File;
use std::io::{Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use log::{debug, log_enabled, warn, Level};
use structopt::StructOpt;

use crate::commit::{self, PromptConfig};
use crate::config::Settings;
use crate::git::Git;
use crate::model::Model;

/// Marker tokens the user can put anywhere in their message to opt out of
/// generation for one commit.
pub const SKIP_MARKERS: [&str; 8] = [
  "#no-ai",
  "#no-openai",
  "#no-chatgpt",
  "#no-gpt",
  "#skip-ai",
  "#skip-openai",
  "#skip-chatgpt",
  "#skip-gpt"
];

/// The only prepare-commit-msg source whose file content is user-authored
/// free text. Merge, squash and template sources carry generated content.
const MESSAGE_SOURCE: &str = "message";

// CLI Arguments, positionals mirroring git's prepare-commit-msg contract
#[derive(StructOpt, Debug)]
#[structopt(name = "gpt-commit-hook", about = "Writes a ChatGPT generated commit message on the prepare-commit-msg event.")]
pub struct Args {
  /// Path to the commit message file handed over by git
  pub commit_msg_filename: PathBuf,

  /// Source of the commit message (message, template, merge, squash or commit)
  pub prepare_commit_message_source: Option<String>,

  /// Commit object name, set when amending
  pub commit_object_name: Option<String>,

  /// Diffs longer than this many characters are sent as a --stat summary
  #[structopt(long, default_value = "10000")]
  pub max_char_count: usize,

  /// Preface the commit message with a GitMoji
  #[structopt(long)]
  pub emoji: bool,

  #[structopt(long, conflicts_with = "emoji", hidden = true)]
  pub no_emoji: bool,

  /// Add a short rationale body below the summary line
  #[structopt(long)]
  pub description: bool,

  #[structopt(long, conflicts_with = "description", hidden = true)]
  pub no_description: bool,

  /// Log filter applied on top of RUST_LOG
  #[structopt(long, default_value = "warn")]
  pub log_level: log::LevelFilter,

  /// Namespace for the OPENAI_* environment variables (PFX__OPENAI_API_KEY)
  #[structopt(long)]
  pub env_prefix: Option<String>,

  #[structopt(long, hidden = true)]
  pub openai_api_key: Option<String>,

  /// Chat model to request
  #[structopt(long)]
  pub openai_model: Option<Model>,

  /// Completion budget for the generated message
  #[structopt(long)]
  pub openai_max_tokens: Option<u16>,

  /// Alternative API endpoint, e.g. a compatible gateway
  #[structopt(long)]
  pub openai_api_base: Option<String>,

  #[structopt(long, hidden = true)]
  pub openai_organization: Option<String>,

  /// HTTP(S) proxy for the API call
  #[structopt(long)]
  pub openai_proxy: Option<String>
}

impl Args {
  pub fn prompt_config(&self) -> PromptConfig {
    PromptConfig {
      emoji:          self.emoji && !self.no_emoji,
      description:    self.description && !self.no_description,
      max_char_count: self.max_char_count
    }
  }

  /// Environment-resolved settings with CLI flags layered on top.
  pub fn settings(&self) -> Result<Settings> {
    let mut settings = Settings::load(self.env_prefix.as_deref())?;

    if let Some(api_key) = &self.openai_api_key {
      settings.openai_api_key = Some(api_key.clone());
    }
    if let Some(model) = &self.openai_model {
      settings.openai_model = model.to_string();
    }
    if let Some(max_tokens) = self.openai_max_tokens {
      settings.openai_max_tokens = max_tokens;
    }
    if let Some(api_base) = &self.openai_api_base {
      settings.openai_api_base = Some(api_base.clone());
    }
    if let Some(organization) = &self.openai_organization {
      settings.openai_organization = Some(organization.clone());
    }
    if let Some(proxy) = &self.openai_proxy {
      settings.openai_proxy = Some(proxy.clone());
    }

    Ok(settings)
  }
}

// File operations traits
pub trait FilePath {
  fn read(&self) -> Result<String>;
  fn write(&self, msg: String) -> Result<()>;
}

impl FilePath for PathBuf {
  fn read(&self) -> Result<String> {
    let mut contents = String::new();
    File::open(self)?.read_to_string(&mut contents)?;
    Ok(contents)
  }

  fn write(&self, msg: String) -> Result<()> {
    File::create(self)?
      .write_all(msg.as_bytes())
      .map_err(Into::into)
  }
}

/// Reads the user's own commit message from the commit-message file, minus
/// comment and blank lines. Returns `None` when the source indicates the
/// file is not user-authored free text, or nothing survives the filter.
pub fn extract_user_message(commit_msg_file: &PathBuf, source: Option<&str>) -> Result<Option<String>> {
  debug!("prepare commit message source: {source:?}");

  match source {
    None => {}
    Some(source) if source.is_empty() || source == MESSAGE_SOURCE => {}
    Some(other) => {
      debug!("source {other:?} carries generated content, skipping extraction");
      return Ok(None);
    }
  }

  let content = commit_msg_file
    .read()
    .with_context(|| format!("Failed to read commit message file {:?}", commit_msg_file))?;

  let lines: Vec<&str> = content
    .lines()
    .filter(|line| !line.starts_with('#') && !line.trim().is_empty())
    .collect();
  debug!("user commit message lines: {lines:?}");

  if lines.is_empty() {
    return Ok(None);
  }

  Ok(Some(lines.join("\n").trim().to_string()))
}

/// Case-insensitive substring scan over the opt-out markers.
pub fn has_skip_directive(message: &str) -> bool {
  let haystack = message.to_lowercase();
  SKIP_MARKERS.iter().any(|marker| haystack.contains(marker))
}

/// Collects the staged diff, falling back to a stat summary when the full
/// diff exceeds `max_char_count` characters.
pub fn collect_diff(git: &Git, max_char_count: usize) -> String {
  let diff = git.diff(true, false);
  if diff.chars().count() > max_char_count {
    debug!("diff exceeds {max_char_count} chars, collecting stat summary instead");
    git.diff(true, true)
  } else {
    diff
  }
}

/// Prepends the generated message to whatever is already in the
/// commit-message file, separated by a blank line.
pub fn write_commit_message(commit_msg_file: &PathBuf, generated: &str) -> Result<()> {
  let existing = commit_msg_file
    .read()
    .with_context(|| format!("Failed to read commit message file {:?}", commit_msg_file))?;

  commit_msg_file
    .write(format!("{}\n\n{}", generated, existing.trim()))
    .with_context(|| format!("Failed to write commit message file {:?}", commit_msg_file))
}

/// The whole hook pipeline: extract, maybe skip, collect, assemble, call,
/// write. Returning Ok without writing means the user opted out.
pub async fn run(args: &Args) -> Result<()> {
  let settings = args.settings()?;
  settings.api_key()?;

  let user_message = extract_user_message(&args.commit_msg_filename, args.prepare_commit_message_source.as_deref())?;
  debug!("user commit message: {user_message:?}");

  if let Some(message) = &user_message {
    if has_skip_directive(message) {
      debug!("skip directive found, leaving the commit message untouched");
      return Ok(());
    }
  }

  let diff = collect_diff(&Git::new(), args.max_char_count);
  let messages = commit::assemble(&diff, user_message.as_deref(), &args.prompt_config());

  if log_enabled!(Level::Debug) {
    let model = Model::from(settings.openai_model.clone());
    match model.count_message_tokens(&messages) {
      Ok(tokens) => debug!("prompt weighs {tokens} tokens for {model}"),
      // Diagnostic only: an unknown model must not fail the commit
      Err(err) => warn!("token estimate unavailable: {err}")
    }
  }

  let generated = commit::generate(&settings, messages).await?;
  write_commit_message(&args.commit_msg_filename, &generated)
}
