//! Configuration settings for Notat.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub transcript: TranscriptSettings,
    pub transcription: TranscriptionSettings,
    pub notes: NotesSettings,
    pub prompts: PromptSettings,
}


/// Transcript acquisition settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptSettings {
    /// Preferred caption languages, in priority order. A bare tag matches
    /// regional variants ("en" matches "en-US").
    pub languages: Vec<String>,
}

impl Default for TranscriptSettings {
    fn default() -> Self {
        Self {
            languages: vec!["en".to_string()],
        }
    }
}

/// Speech-to-text settings for the audio fallback.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionSettings {
    /// Whisper model to use.
    pub model: String,
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            model: "whisper-1".to_string(),
        }
    }
}

/// Notes generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotesSettings {
    /// Chat model used for notes generation.
    pub model: String,
    /// Sampling temperature for the completion request.
    pub temperature: f32,
    /// Transcript character budget submitted to the model. Bounds cost
    /// and latency; longer transcripts are truncated, not rejected.
    pub max_transcript_chars: usize,
}

impl Default for NotesSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.3,
            max_transcript_chars: 8000,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
}


impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("notat")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.transcript.languages, vec!["en"]);
        assert_eq!(settings.transcription.model, "whisper-1");
        assert_eq!(settings.notes.model, "gpt-4o-mini");
        assert_eq!(settings.notes.max_transcript_chars, 8000);
        assert!(settings.prompts.custom_dir.is_none());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [transcript]
            languages = ["no", "en"]

            [notes]
            model = "gpt-4o"
            "#,
        )
        .unwrap();

        assert_eq!(settings.transcript.languages, vec!["no", "en"]);
        assert_eq!(settings.notes.model, "gpt-4o");
        // Untouched sections fall back to defaults
        assert_eq!(settings.notes.max_transcript_chars, 8000);
        assert_eq!(settings.transcription.model, "whisper-1");
    }

    #[test]
    fn test_load_from_missing_file_uses_defaults() {
        let path = PathBuf::from("/nonexistent/notat/config.toml");
        let settings = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(settings.notes.model, "gpt-4o-mini");
    }
}
