//! Pipeline orchestrator for Notat.
//!
//! Coordinates the entire process from URL resolution to rendered notes:
//! resolve the video ID, acquire a transcript through the fallback chain,
//! generate notes, and decorate the result with the video title.

use crate::config::{Prompts, Settings};
use crate::error::Result;
use crate::notes::{Notes, NotesGenerator};
use crate::transcript::TranscriptFetcher;
use crate::video::{self, VideoId};
use serde::Serialize;
use tracing::{info, instrument};

/// Result of a full notes run.
#[derive(Debug, Clone, Serialize)]
pub struct VideoNotes {
    pub video_id: String,
    pub url: String,
    pub title: String,
    pub notes: Notes,
}

/// The main orchestrator for the Notat pipeline.
pub struct Orchestrator {
    fetcher: TranscriptFetcher,
    generator: NotesGenerator,
    http: reqwest::Client,
}

impl Orchestrator {
    /// Create a new orchestrator from settings.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(settings.prompts.custom_dir.as_deref())?;

        let fetcher = TranscriptFetcher::new(&settings);
        let generator = NotesGenerator::new(&settings.notes).with_prompts(prompts);

        Ok(Self {
            fetcher,
            generator,
            http: reqwest::Client::new(),
        })
    }

    /// Fetch a transcript for a raw URL without generating notes.
    pub async fn transcript(&self, raw_url: &str) -> Result<String> {
        let video = VideoId::resolve(raw_url)?;
        info!(video = %video, "Resolved video");

        self.fetcher.acquire(&video).await
    }

    /// Run the full pipeline: resolve, acquire, generate.
    #[instrument(skip(self))]
    pub async fn notes(&self, raw_url: &str) -> Result<VideoNotes> {
        let video = VideoId::resolve(raw_url)?;
        info!(video = %video, "Resolved video");

        let transcript = self.fetcher.acquire(&video).await?;
        let notes = self.generator.generate(&transcript).await?;

        let title = video::fetch_title(&self.http, &video)
            .await
            .unwrap_or_else(|| "Unknown Title".to_string());

        Ok(VideoNotes {
            video_id: video.as_str().to_string(),
            url: video.watch_url(),
            title,
            notes,
        })
    }
}
