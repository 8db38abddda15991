use anyhow::Result;

use crate::config::Settings;
use crate::model::ChatMessage;
use crate::openai;

/// Marker separating the staged diff from the user's own message in the
/// user-role prompt.
pub const USER_MESSAGE_MARKER: &str = "USER-MESSAGE: ";

/// Feature flags for one prompt, frozen for the duration of an invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptConfig {
  /// Preface the commit message with a GitMoji
  pub emoji:          bool,
  /// Ask for a rationale body below the summary line
  pub description:    bool,
  /// Diffs longer than this many characters are collected as a stat summary
  pub max_char_count: usize
}

impl Default for PromptConfig {
  fn default() -> Self {
    Self { emoji: false, description: false, max_char_count: 10000 }
  }
}

/// Builds the two-message prompt, system role first. Assembly is fully
/// deterministic: identical inputs yield byte-identical messages.
pub fn assemble(diff: &str, user_message: Option<&str>, config: &PromptConfig) -> Vec<ChatMessage> {
  let mut system = vec![
    "You are a software engineer assistant to write a 'Commit message with scope'.",
    "You aim to suggest a clean commit message in the 'Conventional Commits' convention.",
    "You will get an output from the 'git diff --staged' or 'git diff --staged --stat' command, and you will suggest a commit message.",
  ];

  if config.emoji {
    system.push("Use the 'GitMoji convention' to preface the commit with the UNICODE characters format.");
    system.push("Do not use shortcode representation.");
  } else {
    system.push("Do not preface the commit message with anything.");
  }

  if config.description {
    system.push("Add a short description to the commit message in the body section of why these changes were made.");
    system.push("Omit \"This commit\" at the beginning - briefly describe changes.");
    system.push("Each sentence of the description should be in new line.");
  } else {
    system.push("Do not describe changes; just simply output without any explanation - the final commit message MUST have only one line!");
  }

  if user_message.is_some() {
    system.push("The user has already specified the commit message; please consider it as a suggestion if applicable.");
    system.push("Do not include user message itself in the final commit message and do not put any note why.");
    system.push("The user's message starts after the 'USER-MESSAGE:' marker.");
  }

  system.push("Use the present tense.");
  system.push("Lines must be at most 72 characters.");

  let mut user = diff.to_string();
  if let Some(message) = user_message {
    user.push_str("\n\n");
    user.push_str(USER_MESSAGE_MARKER);
    user.push_str(message);
  }

  vec![ChatMessage::system(system.join(" ")), ChatMessage::user(user)]
}

/// Sends the assembled prompt to the chat API and returns the suggested
/// commit message.
pub async fn generate(settings: &Settings, messages: Vec<ChatMessage>) -> Result<String> {
  openai::call(settings, messages).await
}
