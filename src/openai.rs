use async_openai::config::OpenAIConfig;
use async_openai::error::OpenAIError;
use async_openai::types::{
  ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
  ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs
};
use async_openai::Client;
use anyhow::{anyhow, Context, Result};
use colored::*;

use crate::config::Settings;
use crate::model::{ChatMessage, Role};

// Deterministic sampling: the same diff should keep producing the same
// commit message.
const TEMPERATURE: f32 = 0.0;
const TOP_P: f32 = 0.1;

/// Performs one synchronous chat completion round trip and returns the first
/// choice's message content.
pub async fn call(settings: &Settings, messages: Vec<ChatMessage>) -> Result<String> {
  let api_key = settings.api_key()?;

  let mut config = OpenAIConfig::new().with_api_key(api_key);
  if let Some(api_base) = &settings.openai_api_base {
    config = config.with_api_base(api_base);
  }
  if let Some(organization) = &settings.openai_organization {
    config = config.with_org_id(organization);
  }

  let client = match &settings.openai_proxy {
    Some(proxy) => {
      let http_client = reqwest::Client::builder()
        .proxy(reqwest::Proxy::all(proxy.as_str()).with_context(|| format!("Invalid proxy URL: {proxy}"))?)
        .build()
        .context("Failed to build HTTP client")?;
      Client::with_config(config).with_http_client(http_client)
    }
    None => Client::with_config(config)
  };

  let request = CreateChatCompletionRequestArgs::default()
    .model(settings.openai_model.clone())
    .max_tokens(u32::from(settings.openai_max_tokens))
    .temperature(TEMPERATURE)
    .top_p(TOP_P)
    .messages(
      messages
        .into_iter()
        .map(to_request_message)
        .collect::<Result<Vec<_>, OpenAIError>>()?
    )
    .build()?;

  let response = match client.chat().create(request).await {
    Ok(response) => response,
    Err(err) => {
      let error_msg = match err {
        OpenAIError::ApiError(e) =>
          format!(
            "{} {}\n    {}\n\nSuggested Actions:\n    1. {}\n    2. {}",
            "ERROR:".bold().bright_red(),
            "OpenAI API error:".bright_white(),
            e.message.dimmed(),
            "Ensure your OpenAI API key is valid".yellow(),
            "Check your account credits".yellow()
          ),
        OpenAIError::Reqwest(e) =>
          format!(
            "{} {}\n    {}\n\nSuggested Actions:\n    1. {}\n    2. {}",
            "ERROR:".bold().bright_red(),
            "Network error:".bright_white(),
            e.to_string().dimmed(),
            "Check your internet connection".yellow(),
            "Verify OpenAI service availability".yellow()
          ),
        _ =>
          format!(
            "{} {}\n    {}",
            "ERROR:".bold().bright_red(),
            "Unexpected error:".bright_white(),
            err.to_string().dimmed()
          ),
      };
      return Err(anyhow!(error_msg));
    }
  };

  response
    .choices
    .first()
    .context("No choices returned")?
    .message
    .content
    .clone()
    .context("No content returned")
}

fn to_request_message(message: ChatMessage) -> Result<ChatCompletionRequestMessage, OpenAIError> {
  Ok(match message.role {
    Role::System =>
      ChatCompletionRequestSystemMessageArgs::default()
        .content(message.content)
        .build()?
        .into(),
    Role::User =>
      ChatCompletionRequestUserMessageArgs::default()
        .content(message.content)
        .build()?
        .into(),
    Role::Assistant =>
      ChatCompletionRequestAssistantMessageArgs::default()
        .content(message.content)
        .build()?
        .into()
  })
}
