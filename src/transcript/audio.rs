//! Audio transcription fallback.
//!
//! Downloads the audio-only stream with yt-dlp into a scoped temporary
//! directory and submits it to the Whisper transcription endpoint. The
//! temporary directory is removed on every exit path, including errors.

use super::{TranscriptSegment, TranscriptSource};
use crate::error::{NotatError, Result};
use crate::openai::create_client;
use crate::video::VideoId;
use async_openai::types::{AudioResponseFormat, CreateTranscriptionRequestArgs};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, instrument};

/// Speech-to-text transcript source, used when no captions exist.
pub struct AudioTranscription {
    model: String,
}

impl AudioTranscription {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
        }
    }

    /// Download the audio-only stream for a video as MP3.
    #[instrument(skip(self, output_dir), fields(video = %video))]
    async fn download_audio(&self, video: &VideoId, output_dir: &Path) -> Result<PathBuf> {
        let target = output_dir.join(format!("{}.mp3", video.as_str()));
        let template = output_dir.join(format!("{}.%(ext)s", video.as_str()));

        info!("Downloading audio stream");

        let result = Command::new("yt-dlp")
            .arg("--extract-audio")
            .arg("--audio-format").arg("mp3")
            .arg("--format").arg("bestaudio/best")
            .arg("--output").arg(template.to_str().unwrap_or_default())
            .arg("--no-playlist")
            .arg("--quiet")
            .arg("--no-warnings")
            .arg(video.watch_url())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await;

        let output = match result {
            Ok(o) => o,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(NotatError::ToolNotFound("yt-dlp".into()));
            }
            Err(e) => {
                return Err(NotatError::AudioDownload(format!(
                    "yt-dlp execution failed: {e}"
                )));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(NotatError::AudioDownload(format!("yt-dlp failed: {stderr}")));
        }

        if target.exists() {
            return Ok(target);
        }

        // yt-dlp may keep the original container when re-encoding was skipped
        find_audio_file(output_dir, video.as_str())
    }

    /// Submit an audio file to the transcription endpoint.
    #[instrument(skip(self, audio_path), fields(audio_path = %audio_path.display()))]
    async fn transcribe(
        &self,
        audio_path: &Path,
        language: Option<&str>,
    ) -> Result<Vec<TranscriptSegment>> {
        debug!("Transcribing audio file");

        let file_bytes = tokio::fs::read(audio_path).await?;

        let mut request_builder = CreateTranscriptionRequestArgs::default();
        request_builder
            .file(async_openai::types::AudioInput::from_vec_u8(
                audio_path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("audio.mp3")
                    .to_string(),
                file_bytes,
            ))
            .model(&self.model)
            .response_format(AudioResponseFormat::VerboseJson);

        if let Some(lang) = language {
            request_builder.language(lang);
        }

        let request = request_builder
            .build()
            .map_err(|e| NotatError::Transcription(format!("Failed to build request: {e}")))?;

        let response = create_client()
            .audio()
            .transcribe_verbose_json(request)
            .await
            .map_err(|e| NotatError::OpenAI(format!("Whisper API error: {e}")))?;

        let segments: Vec<TranscriptSegment> = response
            .segments
            .map(|segs| {
                segs.iter()
                    .map(|s| {
                        TranscriptSegment::timed(
                            s.text.trim().to_string(),
                            s.start as f64,
                            (s.end - s.start) as f64,
                        )
                    })
                    .collect()
            })
            .unwrap_or_else(|| {
                // Fallback: single segment from the full text
                vec![TranscriptSegment::new(response.text.trim().to_string())]
            });

        debug!("Transcribed {} segments", segments.len());
        Ok(segments)
    }
}

#[async_trait]
impl TranscriptSource for AudioTranscription {
    fn name(&self) -> &'static str {
        "audio-transcription"
    }

    async fn fetch(
        &self,
        video: &VideoId,
        languages: &[String],
    ) -> Result<Vec<TranscriptSegment>> {
        // TempDir removes the downloaded audio on every exit path,
        // including the early returns below
        let temp_dir = tempfile::tempdir()?;

        let audio_path = self.download_audio(video, temp_dir.path()).await?;
        let language = languages.first().map(|l| primary_subtag(l));
        let segments = self.transcribe(&audio_path, language).await?;

        drop(temp_dir);
        Ok(segments)
    }
}

/// Reduce a language tag to its primary subtag ("en-US" -> "en"), which is
/// what the transcription endpoint accepts.
fn primary_subtag(tag: &str) -> &str {
    tag.split('-').next().unwrap_or(tag)
}

/// Locate a downloaded audio file by video ID.
fn find_audio_file(dir: &Path, video_id: &str) -> Result<PathBuf> {
    // Common audio formats that yt-dlp may produce
    for ext in &["mp3", "opus", "m4a", "webm", "ogg"] {
        let candidate = dir.join(format!("{video_id}.{ext}"));
        if candidate.exists() {
            return Ok(candidate);
        }
    }

    Err(NotatError::AudioDownload(
        "Audio file not found after download".into(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_subtag() {
        assert_eq!(primary_subtag("en-US"), "en");
        assert_eq!(primary_subtag("en"), "en");
        assert_eq!(primary_subtag("pt-BR"), "pt");
    }

    #[test]
    fn test_find_audio_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dQw4w9WgXcQ.m4a");
        std::fs::write(&path, b"not really audio").unwrap();

        let found = find_audio_file(dir.path(), "dQw4w9WgXcQ").unwrap();
        assert_eq!(found, path);

        assert!(find_audio_file(dir.path(), "missingvideo").is_err());
    }
}
