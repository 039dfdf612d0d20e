//! YouTube video identification.
//!
//! Extracts video IDs from the URL shapes YouTube uses in the wild
//! (watch, youtu.be, shorts, embed) and looks up video titles via the
//! oEmbed endpoint.

use crate::error::{NotatError, Result};
use serde::Deserialize;
use url::Url;

/// A validated 11-character YouTube video identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoId(String);

impl VideoId {
    /// Length of every YouTube video identifier.
    const LEN: usize = 11;

    /// Validate a raw candidate string as a video ID.
    pub fn new(candidate: &str) -> Result<Self> {
        if is_valid_id(candidate) {
            Ok(Self(candidate.to_string()))
        } else {
            Err(NotatError::InvalidUrl(format!(
                "{candidate:?} is not an 11-character YouTube video ID"
            )))
        }
    }

    /// Extract a video ID from any supported YouTube URL shape.
    ///
    /// Supported shapes, in priority order:
    /// 1. `youtu.be/<id>` - first path segment
    /// 2. `youtube.com/watch?v=<id>`, `/shorts/<id>`, `/embed/<id>`
    /// 3. any other youtube URL carrying an 11-character path segment
    ///
    /// Surrounding whitespace, a missing scheme, and trailing path or
    /// query noise after the identifier are all tolerated. Anything else
    /// is rejected, never normalized.
    pub fn resolve(raw: &str) -> Result<Self> {
        let input = raw.trim();
        if input.is_empty() {
            return Err(NotatError::InvalidUrl("empty URL".to_string()));
        }

        // Accept scheme-less URLs the way browsers do
        let with_scheme = if input.starts_with("http://") || input.starts_with("https://") {
            input.to_string()
        } else {
            format!("https://{input}")
        };

        let url = Url::parse(&with_scheme)
            .map_err(|_| NotatError::InvalidUrl(format!("cannot parse {input:?}")))?;

        let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
        let segments: Vec<&str> = url
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).collect())
            .unwrap_or_default();

        if host == "youtu.be" {
            if let Some(first) = segments.first() {
                if let Ok(id) = Self::new(first) {
                    return Ok(id);
                }
            }
        } else if host.contains("youtube") {
            if url.path() == "/watch" {
                let v = url
                    .query_pairs()
                    .find_map(|(k, v)| (k == "v").then(|| v.into_owned()));
                if let Some(candidate) = v {
                    if let Ok(id) = Self::new(&candidate) {
                        return Ok(id);
                    }
                }
            }

            match segments.as_slice() {
                ["shorts", id, ..] | ["embed", id, ..] => {
                    if let Ok(id) = Self::new(id) {
                        return Ok(id);
                    }
                }
                _ => {}
            }
        } else {
            return Err(NotatError::InvalidUrl(format!(
                "{input:?} is not a YouTube URL"
            )));
        }

        // Fallback: first path segment that looks like a video ID
        for segment in &segments {
            if is_valid_id(segment) {
                return Ok(Self(segment.to_string()));
            }
        }

        Err(NotatError::InvalidUrl(format!(
            "no video ID found in {input:?}"
        )))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Canonical watch URL for this video.
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.0)
    }
}

impl std::fmt::Display for VideoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn is_valid_id(s: &str) -> bool {
    s.len() == VideoId::LEN
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[derive(Debug, Deserialize)]
struct OembedResponse {
    title: String,
}

/// Fetch the video title via YouTube's oEmbed endpoint.
///
/// Title lookup is cosmetic; any failure maps to `None`.
pub async fn fetch_title(client: &reqwest::Client, video: &VideoId) -> Option<String> {
    let oembed_url = format!(
        "https://www.youtube.com/oembed?url={}&format=json",
        video.watch_url()
    );

    let response = client.get(&oembed_url).send().await.ok()?;
    if !response.status().is_success() {
        return None;
    }

    response
        .json::<OembedResponse>()
        .await
        .ok()
        .map(|o| o.title)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "dQw4w9WgXcQ";

    #[test]
    fn test_resolve_watch_url() {
        assert_eq!(
            VideoId::resolve("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
                .unwrap()
                .as_str(),
            ID
        );
    }

    #[test]
    fn test_resolve_watch_url_with_extra_params() {
        assert_eq!(
            VideoId::resolve("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42s&list=PLx")
                .unwrap()
                .as_str(),
            ID
        );
    }

    #[test]
    fn test_resolve_short_url() {
        assert_eq!(
            VideoId::resolve("https://youtu.be/dQw4w9WgXcQ").unwrap().as_str(),
            ID
        );
    }

    #[test]
    fn test_resolve_short_url_with_query() {
        assert_eq!(
            VideoId::resolve("https://youtu.be/dQw4w9WgXcQ?si=VSFea_rMwtaiR8Q7")
                .unwrap()
                .as_str(),
            ID
        );
    }

    #[test]
    fn test_resolve_shorts_url() {
        assert_eq!(
            VideoId::resolve("https://www.youtube.com/shorts/dQw4w9WgXcQ")
                .unwrap()
                .as_str(),
            ID
        );
    }

    #[test]
    fn test_resolve_embed_url() {
        assert_eq!(
            VideoId::resolve("https://youtube.com/embed/dQw4w9WgXcQ")
                .unwrap()
                .as_str(),
            ID
        );
    }

    #[test]
    fn test_resolve_without_scheme() {
        assert_eq!(
            VideoId::resolve("www.youtube.com/watch?v=dQw4w9WgXcQ")
                .unwrap()
                .as_str(),
            ID
        );
    }

    #[test]
    fn test_resolve_surrounding_whitespace() {
        assert_eq!(
            VideoId::resolve("  https://youtu.be/dQw4w9WgXcQ \n").unwrap().as_str(),
            ID
        );
    }

    #[test]
    fn test_resolve_path_segment_fallback() {
        // /live/ is not in the explicit rules but carries an ID segment
        assert_eq!(
            VideoId::resolve("https://www.youtube.com/live/dQw4w9WgXcQ?feature=share")
                .unwrap()
                .as_str(),
            ID
        );
    }

    #[test]
    fn test_resolve_rejects_wrong_host() {
        assert!(VideoId::resolve("https://example.com/watch?v=dQw4w9WgXcQ").is_err());
        assert!(VideoId::resolve("https://vimeo.com/12345").is_err());
    }

    #[test]
    fn test_resolve_rejects_missing_id() {
        assert!(VideoId::resolve("https://www.youtube.com/watch").is_err());
        assert!(VideoId::resolve("https://www.youtube.com/").is_err());
        assert!(VideoId::resolve("https://youtu.be/").is_err());
        assert!(VideoId::resolve("").is_err());
    }

    #[test]
    fn test_resolve_rejects_wrong_length_id() {
        assert!(VideoId::resolve("https://www.youtube.com/watch?v=short").is_err());
        assert!(VideoId::resolve("https://youtu.be/waytoolongvideoid").is_err());
    }

    #[test]
    fn test_new_validates_charset() {
        assert!(VideoId::new("dQw4w9WgXcQ").is_ok());
        assert!(VideoId::new("dQw4w9Wg_-Q").is_ok());
        assert!(VideoId::new("dQw4w9Wg!cQ").is_err());
        assert!(VideoId::new("tooshort").is_err());
    }

    #[test]
    fn test_watch_url() {
        let id = VideoId::new(ID).unwrap();
        assert_eq!(id.watch_url(), "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
    }
}
