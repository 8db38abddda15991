use anyhow::{Context, Result};
use colored::Colorize;
use config::{Config, Environment};
use serde::Deserialize;

// Defaults matching the chat API's cheapest general model
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_MAX_TOKENS: i64 = 1024;

/// OpenAI connection settings for one invocation. Resolved once from the
/// environment (CLI flags may override individual fields afterwards) and
/// passed around as an immutable value; there is no ambient client state.
#[derive(Debug, Default, Clone, Deserialize, PartialEq, Eq)]
pub struct Settings {
  pub openai_api_key:       Option<String>,
  pub openai_model:         String,
  pub openai_max_tokens:    u16,
  pub openai_api_base:      Option<String>,
  pub openai_organization:  Option<String>,
  pub openai_proxy:         Option<String>
}

impl Settings {
  /// Reads `OPENAI_*` variables from the environment, or `PFX__OPENAI_*`
  /// when an env prefix is given.
  pub fn load(env_prefix: Option<&str>) -> Result<Self> {
    dotenv::dotenv().ok();

    let env = match env_prefix {
      Some(prefix) if !prefix.is_empty() =>
        Environment::default()
          .prefix(&prefix.to_uppercase())
          .prefix_separator("__")
          .try_parsing(true),
      _ => Environment::default().try_parsing(true)
    };

    let config = Config::builder()
      .add_source(env)
      .set_default("openai_model", DEFAULT_MODEL)?
      .set_default("openai_max_tokens", DEFAULT_MAX_TOKENS)?
      .build()?;

    config
      .try_deserialize()
      .context("Failed to read OpenAI settings from the environment")
  }

  /// The API key is required before any other work starts.
  pub fn api_key(&self) -> Result<&str> {
    self
      .openai_api_key
      .as_deref()
      .filter(|key| !key.is_empty())
      .with_context(|| {
        format!(
          "{} OPENAI_API_KEY is not set.\n    Export it or pass {}",
          "ERROR:".bold().bright_red(),
          "--openai-api-key <your-key>".yellow()
        )
      })
  }
}
