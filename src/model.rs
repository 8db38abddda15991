use std::fmt::{self, Display};
use std::str::FromStr;

use anyhow::Result;
use thiserror::Error;
use tiktoken_rs::{cl100k_base, get_bpe_from_model, CoreBPE};

// Model identifiers
const MODEL_GPT35_TURBO: &str = "gpt-3.5-turbo";
const MODEL_GPT35_TURBO_0301: &str = "gpt-3.5-turbo-0301";
const MODEL_GPT4: &str = "gpt-4";
const MODEL_GPT4_0314: &str = "gpt-4-0314";

// Every reply is primed with <|start|>assistant<|message|>
const REPLY_PRIMING_TOKENS: i64 = 3;

#[derive(Error, Debug)]
pub enum ModelError {
  #[error("token counting is not implemented for model {0}")]
  UnsupportedModel(String),

  #[error(transparent)]
  Tokenizer(#[from] anyhow::Error)
}

/// Message role as the chat completion API understands it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
  System,
  User,
  Assistant
}

impl Role {
  pub fn as_str(&self) -> &'static str {
    match self {
      Role::System => "system",
      Role::User => "user",
      Role::Assistant => "assistant"
    }
  }
}

impl Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A single role-tagged message. Content is never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
  pub role:    Role,
  pub content: String,
  pub name:    Option<String>
}

impl ChatMessage {
  pub fn system(content: impl Into<String>) -> Self {
    Self { role: Role::System, content: content.into(), name: None }
  }

  pub fn user(content: impl Into<String>) -> Self {
    Self { role: Role::User, content: content.into(), name: None }
  }
}

/// Chat models the hook knows how to size prompts for. Anything else is kept
/// verbatim in `Custom` and passed straight through to the API.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Model {
  /// Rolling alias, sized as the 0301 snapshot
  #[default]
  Gpt35Turbo,
  /// Pinned gpt-3.5-turbo-0301 snapshot
  Gpt35Turbo0301,
  /// Rolling alias, sized as the 0314 snapshot
  Gpt4,
  /// Pinned gpt-4-0314 snapshot
  Gpt40314,
  /// Any other model identifier
  Custom(String)
}

impl Model {
  pub fn as_str(&self) -> &str {
    match self {
      Model::Gpt35Turbo => MODEL_GPT35_TURBO,
      Model::Gpt35Turbo0301 => MODEL_GPT35_TURBO_0301,
      Model::Gpt4 => MODEL_GPT4,
      Model::Gpt40314 => MODEL_GPT4_0314,
      Model::Custom(other) => other
    }
  }

  /// Rolling aliases may silently move to a newer snapshot, so token counts
  /// are always taken against the dated variant.
  fn pinned(&self) -> Model {
    match self {
      Model::Gpt35Turbo => Model::Gpt35Turbo0301,
      Model::Gpt4 => Model::Gpt40314,
      other => other.clone()
    }
  }

  fn encoding(&self) -> Result<CoreBPE> {
    get_bpe_from_model(self.as_str()).or_else(|_| cl100k_base())
  }

  /// Counts the tokens the chat API will charge for `messages`, including the
  /// per-message framing overhead and the reply priming.
  pub fn count_message_tokens(&self, messages: &[ChatMessage]) -> Result<usize, ModelError> {
    let pinned = self.pinned();

    // <|start|>{role/name}\n{content}<|end|>\n costs 4 tokens on the 0301
    // snapshot, where a name replaces the role (hence -1), and 3 tokens on
    // the 0314 snapshot, where a name is charged on top.
    let (tokens_per_message, tokens_per_name): (i64, i64) = match pinned {
      Model::Gpt35Turbo0301 => (4, -1),
      Model::Gpt40314 => (3, 1),
      other => return Err(ModelError::UnsupportedModel(other.to_string()))
    };

    let encoding = pinned.encoding()?;
    let mut num_tokens: i64 = 0;

    for message in messages {
      num_tokens += tokens_per_message;
      num_tokens += encoding.encode_ordinary(message.role.as_str()).len() as i64;
      num_tokens += encoding.encode_ordinary(&message.content).len() as i64;

      if let Some(name) = &message.name {
        num_tokens += encoding.encode_ordinary(name).len() as i64;
        num_tokens += tokens_per_name;
      }
    }

    num_tokens += REPLY_PRIMING_TOKENS;
    Ok(num_tokens.max(0) as usize)
  }
}

impl From<&Model> for String {
  fn from(model: &Model) -> Self {
    model.as_str().to_string()
  }
}

impl FromStr for Model {
  type Err = anyhow::Error;

  fn from_str(s: &str) -> Result<Self> {
    Ok(match s.trim() {
      s if s.eq_ignore_ascii_case(MODEL_GPT35_TURBO) => Model::Gpt35Turbo,
      s if s.eq_ignore_ascii_case(MODEL_GPT35_TURBO_0301) => Model::Gpt35Turbo0301,
      s if s.eq_ignore_ascii_case(MODEL_GPT4) => Model::Gpt4,
      s if s.eq_ignore_ascii_case(MODEL_GPT4_0314) => Model::Gpt40314,
      other => Model::Custom(other.to_string())
    })
  }
}

impl Display for Model {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl From<&str> for Model {
  fn from(s: &str) -> Self {
    s.parse().unwrap_or_default()
  }
}

impl From<String> for Model {
  fn from(s: String) -> Self {
    s.as_str().into()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn prompt() -> Vec<ChatMessage> {
    vec![
      ChatMessage::system("You are a software engineer assistant."),
      ChatMessage::user("diff --git a/foo.rs b/foo.rs\n+fn foo() {}"),
    ]
  }

  #[test]
  fn test_counting_is_deterministic() {
    let model = Model::Gpt35Turbo;
    let messages = prompt();

    let first = model.count_message_tokens(&messages).unwrap();
    for _ in 0..5 {
      assert_eq!(model.count_message_tokens(&messages).unwrap(), first);
    }
  }

  #[test]
  fn test_aliases_match_pinned_variants() {
    let messages = prompt();

    assert_eq!(
      Model::Gpt35Turbo.count_message_tokens(&messages).unwrap(),
      Model::Gpt35Turbo0301.count_message_tokens(&messages).unwrap()
    );
    assert_eq!(
      Model::Gpt4.count_message_tokens(&messages).unwrap(),
      Model::Gpt40314.count_message_tokens(&messages).unwrap()
    );
  }

  #[test]
  fn test_framing_overhead_differs_per_snapshot() {
    // 4 tokens per message on 0301 vs 3 on 0314, same encoding otherwise
    let messages = prompt();
    let gpt35 = Model::Gpt35Turbo.count_message_tokens(&messages).unwrap();
    let gpt4 = Model::Gpt4.count_message_tokens(&messages).unwrap();

    assert_eq!(gpt35, gpt4 + messages.len());
  }

  #[test]
  fn test_empty_message_list_charges_reply_priming() {
    assert_eq!(Model::Gpt4.count_message_tokens(&[]).unwrap(), 3);
  }

  #[test]
  fn test_name_field_adjusts_framing() {
    let unnamed = prompt();
    let mut named = prompt();
    named[0].name = Some("bot".to_string());

    let gpt4_unnamed = Model::Gpt40314.count_message_tokens(&unnamed).unwrap();
    let gpt4_named = Model::Gpt40314.count_message_tokens(&named).unwrap();
    let gpt35_unnamed = Model::Gpt35Turbo0301.count_message_tokens(&unnamed).unwrap();
    let gpt35_named = Model::Gpt35Turbo0301.count_message_tokens(&named).unwrap();

    let name_tokens = Model::Gpt40314.encoding().unwrap().encode_ordinary("bot").len() as i64;
    assert_eq!(gpt4_named as i64, gpt4_unnamed as i64 + name_tokens + 1);
    assert_eq!(gpt35_named as i64, gpt35_unnamed as i64 + name_tokens - 1);
  }

  #[test]
  fn test_unknown_model_is_unsupported() {
    let model = Model::from("gpt-4o-mini");
    assert!(matches!(model, Model::Custom(_)));

    let err = model.count_message_tokens(&prompt()).unwrap_err();
    assert!(matches!(err, ModelError::UnsupportedModel(_)));
  }

  #[test]
  fn test_model_round_trip() {
    for name in [MODEL_GPT35_TURBO, MODEL_GPT35_TURBO_0301, MODEL_GPT4, MODEL_GPT4_0314] {
      let model: Model = name.into();
      assert_eq!(model.to_string(), name);
    }
  }
}
