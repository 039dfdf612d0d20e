//! Prompt templates for Notat.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub notes: NotesPrompts,
}


/// Prompts for notes generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotesPrompts {
    pub system: String,
    pub user: String,
}

impl Default for NotesPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are an expert note taker. You turn video transcripts into clear, well-structured notes with concise bullet points, and you highlight the key takeaways."#.to_string(),

            user: r#"Create structured notes for the following transcript. Respond with exactly three labeled sections:

Summary: 3-6 sentences describing what the video covers.

Notes:
- 5-10 bullet points capturing the substantive content.

Key Takeaways:
- 3-5 bullet points a viewer should remember.

Transcript:
{{transcript}}"#.to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from defaults, with an optional custom directory override.
    pub fn load(custom_dir: Option<&str>) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let notes_path = custom_path.join("notes.toml");
            if notes_path.exists() {
                let content = std::fs::read_to_string(&notes_path)?;
                prompts.notes = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }
}
