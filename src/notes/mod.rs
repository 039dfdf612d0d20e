//! Notes generation for Notat.
//!
//! Sends transcript text to the chat completion endpoint with a fixed
//! instructional prompt, then parses the reply into display sections.

mod parser;

pub use parser::parse_reply;

use crate::config::{NotesSettings, Prompts};
use crate::error::{NotatError, Result};
use crate::openai::{api_key_from_env, create_client};
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info, instrument};

/// Structured notes produced from a transcript, or the raw reply when the
/// model's section formatting was not recognized.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Notes {
    Structured {
        summary: String,
        notes: Vec<String>,
        takeaways: Vec<String>,
    },
    Unparsed(String),
}

/// Generates structured notes from transcript text.
pub struct NotesGenerator {
    api_key: Option<String>,
    model: String,
    temperature: f32,
    max_transcript_chars: usize,
    prompts: Prompts,
}

impl NotesGenerator {
    pub fn new(settings: &NotesSettings) -> Self {
        Self {
            api_key: api_key_from_env(),
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_transcript_chars: settings.max_transcript_chars,
            prompts: Prompts::default(),
        }
    }

    /// Set custom prompts.
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Override the API key (used in tests).
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    /// Generate notes for a transcript.
    ///
    /// The transcript is truncated to the configured character budget
    /// before submission; the budget bounds cost and latency.
    #[instrument(skip(self, transcript), fields(chars = transcript.len()))]
    pub async fn generate(&self, transcript: &str) -> Result<Notes> {
        if self.api_key.is_none() {
            return Err(NotatError::Generation(
                "OPENAI_API_KEY is not set. Set it with: export OPENAI_API_KEY='sk-...'"
                    .to_string(),
            ));
        }

        let excerpt = truncate_chars(transcript, self.max_transcript_chars);

        let mut vars = HashMap::new();
        vars.insert("transcript".to_string(), excerpt.to_string());
        let user_prompt = Prompts::render(&self.prompts.notes.user, &vars);

        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(self.prompts.notes.system.clone())
                .build()
                .map_err(|e| NotatError::Generation(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_prompt)
                .build()
                .map_err(|e| NotatError::Generation(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .build()
            .map_err(|e| NotatError::Generation(e.to_string()))?;

        info!(model = %self.model, "Requesting notes");

        let response = create_client().chat().create(request).await.map_err(|e| {
            NotatError::Generation(format!("Completion request failed: {e}"))
        })?;

        let reply = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| NotatError::Generation("Empty response from model".to_string()))?;

        debug!(chars = reply.len(), "Model reply received");

        Ok(parse_reply(reply))
    }
}

/// Truncate to at most `max` characters without splitting a code point.
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_short_input_untouched() {
        assert_eq!(truncate_chars("hello", 8000), "hello");
        assert_eq!(truncate_chars("", 10), "");
    }

    #[test]
    fn test_truncate_chars_cuts_at_budget() {
        let text = "a".repeat(20);
        assert_eq!(truncate_chars(&text, 10).len(), 10);
    }

    #[test]
    fn test_truncate_chars_respects_char_boundaries() {
        let text = "æøå".repeat(5);
        let cut = truncate_chars(&text, 4);
        assert_eq!(cut.chars().count(), 4);
        assert_eq!(cut, "æøåæ");
    }

    #[tokio::test]
    async fn test_missing_api_key_short_circuits() {
        let generator =
            NotesGenerator::new(&NotesSettings::default()).with_api_key(None);

        // Fails before any network call is attempted
        let err = generator.generate("some transcript").await.unwrap_err();
        assert!(matches!(err, NotatError::Generation(_)));
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }
}
