//! Transcript acquisition for Notat.
//!
//! Provides a trait-based fallback chain over transcript sources. Sources
//! are tried in priority order: manually authored captions, auto-generated
//! captions, captions translated into the primary preferred language, and
//! finally audio download plus speech-to-text. The first source yielding a
//! non-empty transcript wins; exhausting the chain is the only way to fail.

mod audio;
mod captions;

pub use audio::AudioTranscription;
pub use captions::{
    CaptionTrack, CaptionsClient, GeneratedCaptions, ManualCaptions, TrackList,
    TranslatedCaptions,
};

use crate::config::Settings;
use crate::error::{NotatError, Result};
use crate::video::VideoId;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A single timed text segment emitted by a transcript source.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptSegment {
    pub text: String,
    /// Start offset in seconds, when the source provides timing.
    pub start: Option<f64>,
    /// Duration in seconds, when the source provides timing.
    pub duration: Option<f64>,
}

impl TranscriptSegment {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            start: None,
            duration: None,
        }
    }

    pub fn timed(text: impl Into<String>, start: f64, duration: f64) -> Self {
        Self {
            text: text.into(),
            start: Some(start),
            duration: Some(duration),
        }
    }
}

/// Trait for transcript providers tried in fallback order.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Fetch transcript segments for a video, honoring the preferred
    /// language order where the source supports languages at all.
    async fn fetch(&self, video: &VideoId, languages: &[String])
        -> Result<Vec<TranscriptSegment>>;
}

/// Join segment texts into a single transcript string.
///
/// Embedded newlines become spaces, empty and whitespace-only segments are
/// dropped, and segments are joined with single spaces.
pub fn join_segments(segments: &[TranscriptSegment]) -> String {
    let parts: Vec<String> = segments
        .iter()
        .map(|s| s.text.replace(['\n', '\r'], " ").trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();

    parts.join(" ")
}

/// Runs transcript sources in fallback order until one yields text.
pub struct TranscriptFetcher {
    sources: Vec<Box<dyn TranscriptSource>>,
    languages: Vec<String>,
}

impl TranscriptFetcher {
    /// Build the default chain: manual, generated, translated, audio.
    pub fn new(settings: &Settings) -> Self {
        let captions = Arc::new(CaptionsClient::new());

        let sources: Vec<Box<dyn TranscriptSource>> = vec![
            Box::new(ManualCaptions::new(Arc::clone(&captions))),
            Box::new(GeneratedCaptions::new(Arc::clone(&captions))),
            Box::new(TranslatedCaptions::new(Arc::clone(&captions))),
            Box::new(AudioTranscription::new(settings.transcription.model.clone())),
        ];

        Self {
            sources,
            languages: settings.transcript.languages.clone(),
        }
    }

    /// Build a fetcher over an explicit source chain.
    pub fn with_sources(sources: Vec<Box<dyn TranscriptSource>>, languages: Vec<String>) -> Self {
        Self { sources, languages }
    }

    /// Acquire a transcript, trying each source in order.
    ///
    /// A source failure or an empty result moves on to the next source;
    /// only exhaustion of the whole chain is an error.
    pub async fn acquire(&self, video: &VideoId) -> Result<String> {
        for source in &self.sources {
            debug!(source = source.name(), video = %video, "Trying transcript source");

            match source.fetch(video, &self.languages).await {
                Ok(segments) => {
                    let text = join_segments(&segments);
                    if text.is_empty() {
                        warn!(source = source.name(), "Source returned an empty transcript");
                        continue;
                    }
                    info!(
                        source = source.name(),
                        chars = text.len(),
                        "Transcript acquired"
                    );
                    return Ok(text);
                }
                Err(e) => {
                    warn!(source = source.name(), error = %e, "Transcript source failed");
                }
            }
        }

        Err(NotatError::TranscriptUnavailable(format!(
            "no transcript could be obtained for video {video}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn seg(text: &str) -> TranscriptSegment {
        TranscriptSegment::new(text)
    }

    #[test]
    fn test_join_segments_single_space() {
        let segments = vec![seg("Hello "), seg(" world")];
        assert_eq!(join_segments(&segments), "Hello world");
    }

    #[test]
    fn test_join_segments_strips_newlines() {
        let segments = vec![seg("line one\nline two"), seg("three")];
        assert_eq!(join_segments(&segments), "line one line two three");
    }

    #[test]
    fn test_join_segments_drops_empty() {
        let segments = vec![seg(""), seg("   "), seg("kept"), seg("\n")];
        assert_eq!(join_segments(&segments), "kept");
    }

    #[test]
    fn test_join_segments_empty_input() {
        assert_eq!(join_segments(&[]), "");
    }

    /// Source returning a fixed result and counting invocations.
    struct StaticSource {
        name: &'static str,
        segments: Option<Vec<TranscriptSegment>>,
        calls: Arc<AtomicUsize>,
    }

    impl StaticSource {
        fn new(name: &'static str, segments: Option<Vec<TranscriptSegment>>) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    name,
                    segments,
                    calls: Arc::clone(&calls),
                },
                calls,
            )
        }
    }

    #[async_trait]
    impl TranscriptSource for StaticSource {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn fetch(
            &self,
            _video: &VideoId,
            _languages: &[String],
        ) -> Result<Vec<TranscriptSegment>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.segments {
                Some(segments) => Ok(segments.clone()),
                None => Err(NotatError::CaptionFetch("source down".to_string())),
            }
        }
    }

    fn video() -> VideoId {
        VideoId::new("dQw4w9WgXcQ").unwrap()
    }

    #[tokio::test]
    async fn test_first_source_wins() {
        let (first, _) = StaticSource::new("first", Some(vec![seg("manual text")]));
        let (second, second_calls) = StaticSource::new("second", Some(vec![seg("generated text")]));

        let fetcher = TranscriptFetcher::with_sources(
            vec![Box::new(first), Box::new(second)],
            vec!["en".to_string()],
        );

        let text = fetcher.acquire(&video()).await.unwrap();
        assert_eq!(text, "manual text");
        // The chain stops at the first success
        assert_eq!(second_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failure_falls_through() {
        let (first, first_calls) = StaticSource::new("first", None);
        let (second, _) = StaticSource::new("second", Some(vec![seg("fallback text")]));

        let fetcher = TranscriptFetcher::with_sources(
            vec![Box::new(first), Box::new(second)],
            vec!["en".to_string()],
        );

        let text = fetcher.acquire(&video()).await.unwrap();
        assert_eq!(text, "fallback text");
        assert_eq!(first_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_result_treated_as_failure() {
        let (first, _) = StaticSource::new("first", Some(vec![seg("  "), seg("")]));
        let (second, _) = StaticSource::new("second", Some(vec![seg("real text")]));

        let fetcher = TranscriptFetcher::with_sources(
            vec![Box::new(first), Box::new(second)],
            vec!["en".to_string()],
        );

        let text = fetcher.acquire(&video()).await.unwrap();
        assert_eq!(text, "real text");
    }

    #[tokio::test]
    async fn test_exhausted_chain_is_unavailable() {
        let (first, _) = StaticSource::new("first", None);
        let (second, second_calls) = StaticSource::new("second", None);

        let fetcher = TranscriptFetcher::with_sources(
            vec![Box::new(first), Box::new(second)],
            vec!["en".to_string()],
        );

        let err = fetcher.acquire(&video()).await.unwrap_err();
        assert!(matches!(err, NotatError::TranscriptUnavailable(_)));
        // Every source was given a chance before giving up
        assert_eq!(second_calls.load(Ordering::SeqCst), 1);
    }
}
