//! YouTube caption track listing and retrieval.
//!
//! Talks to the innertube player API the same way the watch page does:
//! fetch the page HTML, pull out the `INNERTUBE_API_KEY`, ask the player
//! endpoint for the caption track list, then fetch and decode timedtext
//! XML for the selected track.

use super::{TranscriptSegment, TranscriptSource};
use crate::error::{NotatError, Result};
use crate::video::VideoId;
use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument};

const INNERTUBE_URL: &str = "https://www.youtube.com/youtubei/v1/player?key=";

/// One caption track advertised by the player response.
#[derive(Debug, Clone)]
pub struct CaptionTrack {
    pub language_code: String,
    pub base_url: String,
    pub is_generated: bool,
    pub is_translatable: bool,
}

/// All caption tracks for a video, split by origin.
#[derive(Debug, Clone, Default)]
pub struct TrackList {
    pub manual: Vec<CaptionTrack>,
    pub generated: Vec<CaptionTrack>,
}

impl TrackList {
    /// Find a track whose language matches one of the preferences, exactly
    /// or by prefix ("en" matches "en-US"). Preferences are tried in order.
    pub fn find<'a>(tracks: &'a [CaptionTrack], languages: &[String]) -> Option<&'a CaptionTrack> {
        for lang in languages {
            if let Some(track) = tracks
                .iter()
                .find(|t| language_matches(&t.language_code, lang))
            {
                return Some(track);
            }
        }
        None
    }

    /// First track flagged translatable, searching manual tracks first.
    pub fn first_translatable(&self) -> Option<&CaptionTrack> {
        self.manual
            .iter()
            .chain(self.generated.iter())
            .find(|t| t.is_translatable)
    }
}

fn language_matches(track_lang: &str, preferred: &str) -> bool {
    let track = track_lang.to_ascii_lowercase();
    let pref = preferred.to_ascii_lowercase();
    track == pref || track.starts_with(&format!("{pref}-"))
}

/// HTTP client for YouTube's caption endpoints.
pub struct CaptionsClient {
    client: reqwest::Client,
    api_key_regex: Regex,
}

impl CaptionsClient {
    pub fn new() -> Self {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            reqwest::header::HeaderValue::from_static("en-US,en;q=0.9"),
        );

        let api_key_regex = Regex::new(r#""INNERTUBE_API_KEY":\s*"([a-zA-Z0-9_-]+)""#)
            .expect("Invalid regex");

        Self {
            client: reqwest::Client::builder()
                .cookie_store(true)
                .default_headers(headers)
                .build()
                .expect("Failed to create HTTP client"),
            api_key_regex,
        }
    }

    /// List all caption tracks for a video.
    #[instrument(skip(self), fields(video = %video))]
    pub async fn list_tracks(&self, video: &VideoId) -> Result<TrackList> {
        let html = self
            .client
            .get(video.watch_url())
            .send()
            .await?
            .text()
            .await?;

        let api_key = self
            .api_key_regex
            .captures(&html)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| {
                NotatError::CaptionFetch(format!(
                    "could not locate the player API key for video {video}"
                ))
            })?;

        let body = serde_json::json!({
            "context": {
                "client": {
                    "clientName": "ANDROID",
                    "clientVersion": "20.10.38"
                }
            },
            "videoId": video.as_str()
        });

        let player: Value = self
            .client
            .post(format!("{INNERTUBE_URL}{api_key}"))
            .json(&body)
            .send()
            .await?
            .json()
            .await?;

        extract_tracks(video, &player)
    }

    /// Fetch a caption track and decode it into segments.
    ///
    /// `translate_to` requests server-side translation of a translatable
    /// track into the given language.
    #[instrument(skip(self, track), fields(lang = %track.language_code))]
    pub async fn fetch_track(
        &self,
        track: &CaptionTrack,
        translate_to: Option<&str>,
    ) -> Result<Vec<TranscriptSegment>> {
        let mut url = track.base_url.clone();
        if let Some(target) = translate_to {
            url = format!("{url}&tlang={target}");
        }

        let xml = self.client.get(&url).send().await?.text().await?;

        let segments = parse_timedtext(&xml)?;
        debug!(segments = segments.len(), "Decoded caption track");
        Ok(segments)
    }
}

impl Default for CaptionsClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Pull the caption track list out of an innertube player response.
fn extract_tracks(video: &VideoId, player: &Value) -> Result<TrackList> {
    // An unplayable video never carries captions; surface the reason
    if let Some(status) = player.pointer("/playabilityStatus/status").and_then(|s| s.as_str()) {
        if status != "OK" {
            let reason = player
                .pointer("/playabilityStatus/reason")
                .and_then(|r| r.as_str())
                .unwrap_or(status);
            return Err(NotatError::CaptionFetch(format!(
                "video {video} is not playable: {reason}"
            )));
        }
    }

    let tracks = player
        .pointer("/captions/playerCaptionsTracklistRenderer/captionTracks")
        .and_then(|t| t.as_array())
        .ok_or_else(|| {
            NotatError::CaptionFetch(format!("video {video} has no caption tracks"))
        })?;

    let mut list = TrackList::default();

    for track in tracks {
        let language_code = match track.get("languageCode").and_then(|l| l.as_str()) {
            Some(code) => code.to_string(),
            None => continue,
        };

        let base_url = match track.get("baseUrl").and_then(|u| u.as_str()) {
            Some(url) => url.replace("&fmt=srv3", ""),
            None => continue,
        };

        let is_generated = track
            .get("kind")
            .and_then(|k| k.as_str())
            .map(|k| k == "asr")
            .unwrap_or(false);

        let is_translatable = track
            .get("isTranslatable")
            .and_then(|t| t.as_bool())
            .unwrap_or(false);

        let caption_track = CaptionTrack {
            language_code,
            base_url,
            is_generated,
            is_translatable,
        };

        if is_generated {
            list.generated.push(caption_track);
        } else {
            list.manual.push(caption_track);
        }
    }

    if list.manual.is_empty() && list.generated.is_empty() {
        return Err(NotatError::CaptionFetch(format!(
            "video {video} has no usable caption tracks"
        )));
    }

    Ok(list)
}

/// Decode timedtext XML into transcript segments.
fn parse_timedtext(xml: &str) -> Result<Vec<TranscriptSegment>> {
    let mut reader = Reader::from_str(xml);

    let mut segments = Vec::new();
    let mut pending: Option<(Option<f64>, Option<f64>)> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"text" => {
                let mut start = None;
                let mut duration = None;
                for attr in e.attributes().flatten() {
                    let value = String::from_utf8_lossy(&attr.value).to_string();
                    match attr.key.as_ref() {
                        b"start" => start = value.parse::<f64>().ok(),
                        b"dur" => duration = value.parse::<f64>().ok(),
                        _ => {}
                    }
                }
                pending = Some((start, duration));
            }
            Ok(Event::Text(t)) => {
                if let Some((start, duration)) = pending.take() {
                    let unescaped = t.unescape().map_err(|e| {
                        NotatError::CaptionFetch(format!("bad caption XML text: {e}"))
                    })?;
                    segments.push(TranscriptSegment {
                        text: decode_entities(&unescaped),
                        start,
                        duration,
                    });
                }
            }
            Ok(Event::End(_)) => {
                pending = None;
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(NotatError::CaptionFetch(format!(
                    "caption XML error: {e}"
                )))
            }
            _ => {}
        }
    }

    Ok(segments)
}

/// Timedtext escapes entities twice; handle the leftovers after XML unescape.
fn decode_entities(text: &str) -> String {
    text.replace("&#39;", "'")
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
}

/// Manually authored caption tracks in a preferred language.
pub struct ManualCaptions {
    client: Arc<CaptionsClient>,
}

impl ManualCaptions {
    pub fn new(client: Arc<CaptionsClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TranscriptSource for ManualCaptions {
    fn name(&self) -> &'static str {
        "manual-captions"
    }

    async fn fetch(
        &self,
        video: &VideoId,
        languages: &[String],
    ) -> Result<Vec<TranscriptSegment>> {
        let tracks = self.client.list_tracks(video).await?;
        let track = TrackList::find(&tracks.manual, languages).ok_or_else(|| {
            NotatError::CaptionFetch(format!(
                "no manual captions in {languages:?} for video {video}"
            ))
        })?;
        self.client.fetch_track(track, None).await
    }
}

/// Auto-generated (ASR) caption tracks in a preferred language.
pub struct GeneratedCaptions {
    client: Arc<CaptionsClient>,
}

impl GeneratedCaptions {
    pub fn new(client: Arc<CaptionsClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TranscriptSource for GeneratedCaptions {
    fn name(&self) -> &'static str {
        "generated-captions"
    }

    async fn fetch(
        &self,
        video: &VideoId,
        languages: &[String],
    ) -> Result<Vec<TranscriptSegment>> {
        let tracks = self.client.list_tracks(video).await?;
        let track = TrackList::find(&tracks.generated, languages).ok_or_else(|| {
            NotatError::CaptionFetch(format!(
                "no auto-generated captions in {languages:?} for video {video}"
            ))
        })?;
        self.client.fetch_track(track, None).await
    }
}

/// Any translatable caption track, translated into the primary preferred
/// language.
pub struct TranslatedCaptions {
    client: Arc<CaptionsClient>,
}

impl TranslatedCaptions {
    pub fn new(client: Arc<CaptionsClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TranscriptSource for TranslatedCaptions {
    fn name(&self) -> &'static str {
        "translated-captions"
    }

    async fn fetch(
        &self,
        video: &VideoId,
        languages: &[String],
    ) -> Result<Vec<TranscriptSegment>> {
        let target = languages.first().ok_or_else(|| {
            NotatError::CaptionFetch("no preferred language to translate into".to_string())
        })?;

        let tracks = self.client.list_tracks(video).await?;
        let track = tracks.first_translatable().ok_or_else(|| {
            NotatError::CaptionFetch(format!("no translatable captions for video {video}"))
        })?;

        self.client.fetch_track(track, Some(target)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(lang: &str, generated: bool, translatable: bool) -> CaptionTrack {
        CaptionTrack {
            language_code: lang.to_string(),
            base_url: format!("https://example.com/{lang}"),
            is_generated: generated,
            is_translatable: translatable,
        }
    }

    #[test]
    fn test_language_matches_exact_and_prefix() {
        assert!(language_matches("en", "en"));
        assert!(language_matches("en-US", "en"));
        assert!(language_matches("EN-GB", "en"));
        assert!(!language_matches("eng", "en"));
        assert!(!language_matches("no", "en"));
    }

    #[test]
    fn test_find_honors_preference_order() {
        let tracks = vec![track("de", false, false), track("en-US", false, false)];

        let found = TrackList::find(&tracks, &["en".to_string(), "de".to_string()]).unwrap();
        assert_eq!(found.language_code, "en-US");

        let found = TrackList::find(&tracks, &["de".to_string(), "en".to_string()]).unwrap();
        assert_eq!(found.language_code, "de");

        assert!(TrackList::find(&tracks, &["fr".to_string()]).is_none());
    }

    #[test]
    fn test_first_translatable_prefers_manual() {
        let list = TrackList {
            manual: vec![track("de", false, true)],
            generated: vec![track("en", true, true)],
        };
        assert_eq!(list.first_translatable().unwrap().language_code, "de");

        let list = TrackList {
            manual: vec![track("de", false, false)],
            generated: vec![track("en", true, true)],
        };
        assert_eq!(list.first_translatable().unwrap().language_code, "en");

        let list = TrackList {
            manual: vec![track("de", false, false)],
            generated: vec![],
        };
        assert!(list.first_translatable().is_none());
    }

    fn video() -> VideoId {
        VideoId::new("dQw4w9WgXcQ").unwrap()
    }

    #[test]
    fn test_extract_tracks_splits_manual_and_generated() {
        let player = serde_json::json!({
            "playabilityStatus": { "status": "OK" },
            "captions": {
                "playerCaptionsTracklistRenderer": {
                    "captionTracks": [
                        {
                            "languageCode": "en",
                            "baseUrl": "https://example.com/en&fmt=srv3",
                            "isTranslatable": true
                        },
                        {
                            "languageCode": "en-US",
                            "baseUrl": "https://example.com/asr",
                            "kind": "asr",
                            "isTranslatable": false
                        }
                    ]
                }
            }
        });

        let list = extract_tracks(&video(), &player).unwrap();
        assert_eq!(list.manual.len(), 1);
        assert_eq!(list.generated.len(), 1);
        assert_eq!(list.manual[0].language_code, "en");
        // The srv3 format marker is stripped from the fetch URL
        assert_eq!(list.manual[0].base_url, "https://example.com/en");
        assert!(list.manual[0].is_translatable);
        assert!(list.generated[0].is_generated);
    }

    #[test]
    fn test_extract_tracks_no_captions() {
        let player = serde_json::json!({
            "playabilityStatus": { "status": "OK" }
        });
        let err = extract_tracks(&video(), &player).unwrap_err();
        assert!(matches!(err, NotatError::CaptionFetch(_)));
    }

    #[test]
    fn test_extract_tracks_unplayable_video() {
        let player = serde_json::json!({
            "playabilityStatus": { "status": "ERROR", "reason": "Video unavailable" }
        });
        let err = extract_tracks(&video(), &player).unwrap_err();
        assert!(err.to_string().contains("Video unavailable"));
    }

    #[test]
    fn test_parse_timedtext() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<transcript>
  <text start="0.5" dur="2.1">Hello </text>
  <text start="2.6" dur="1.4"> world</text>
  <text start="4.0" dur="1.0">it&amp;#39;s fine</text>
</transcript>"#;

        let segments = parse_timedtext(xml).unwrap();
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].text, "Hello ");
        assert_eq!(segments[0].start, Some(0.5));
        assert_eq!(segments[0].duration, Some(2.1));
        assert_eq!(segments[1].text, " world");
        // Double-escaped apostrophe is fully decoded
        assert_eq!(segments[2].text, "it's fine");
    }

    #[test]
    fn test_parse_timedtext_empty_document() {
        let segments = parse_timedtext("<transcript></transcript>").unwrap();
        assert!(segments.is_empty());
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("it&#39;s"), "it's");
        assert_eq!(decode_entities("&quot;hi&quot;"), "\"hi\"");
        assert_eq!(decode_entities("a &amp; b"), "a & b");
    }
}
