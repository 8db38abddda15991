use gpt_commit::commit::{assemble, PromptConfig};
use gpt_commit::model::{ChatMessage, Model, ModelError};

fn synthetic_prompt() -> Vec<ChatMessage> {
  let diff = "diff --git a/src/lib.rs b/src/lib.rs\n\
              index 83db48f..bf269f4 100644\n\
              --- a/src/lib.rs\n\
              +++ b/src/lib.rs\n\
              +pub fn greet(name: &str) -> String {\n\
              +  format!(\"Hello, {name}!\")\n\
              +}";
  assemble(diff, Some("greeting helper"), &PromptConfig::default())
}

#[test]
fn test_estimation_is_deterministic_for_pinned_models() {
  let messages = synthetic_prompt();

  for model in [Model::Gpt35Turbo0301, Model::Gpt40314] {
    let first = model.count_message_tokens(&messages).unwrap();
    for _ in 0..3 {
      assert_eq!(model.count_message_tokens(&messages).unwrap(), first);
    }
    assert!(first > 0);
  }
}

#[test]
fn test_rolling_aliases_resolve_to_pinned_variants() {
  let messages = synthetic_prompt();

  assert_eq!(
    Model::from("gpt-3.5-turbo").count_message_tokens(&messages).unwrap(),
    Model::from("gpt-3.5-turbo-0301").count_message_tokens(&messages).unwrap()
  );
  assert_eq!(
    Model::from("gpt-4").count_message_tokens(&messages).unwrap(),
    Model::from("gpt-4-0314").count_message_tokens(&messages).unwrap()
  );
}

#[test]
fn test_framing_costs_one_extra_token_per_message_on_0301() {
  let messages = synthetic_prompt();

  let gpt35 = Model::Gpt35Turbo.count_message_tokens(&messages).unwrap();
  let gpt4 = Model::Gpt4.count_message_tokens(&messages).unwrap();
  assert_eq!(gpt35 - gpt4, messages.len());
}

#[test]
fn test_longer_content_costs_more_tokens() {
  let short = assemble("diff --git a/x b/x", None, &PromptConfig::default());
  let long = synthetic_prompt();

  let model = Model::Gpt4;
  assert!(model.count_message_tokens(&long).unwrap() > model.count_message_tokens(&short).unwrap());
}

#[test]
fn test_unsupported_model_reports_its_identifier() {
  let err = Model::from("text-davinci-003")
    .count_message_tokens(&synthetic_prompt())
    .unwrap_err();

  match err {
    ModelError::UnsupportedModel(name) => assert_eq!(name, "text-davinci-003"),
    other => panic!("expected UnsupportedModel, got {other}")
  }
}
