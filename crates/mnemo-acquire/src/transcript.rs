//! Video transcript acquisition.
//!
//! Extracts a canonical video identifier from known URL shapes, then runs an
//! ordered provider chain: a hosted transcript API, the video page's own
//! embedded caption track, and a third-party mirror as last resort. Caption
//! tracks come in two formats: a structured timed-text JSON body and a
//! legacy tag-delimited body that needs its markup stripped.

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use mnemo_core::defaults::{ACQUIRE_USER_AGENT, MIRROR_MIN_LENGTH};
use mnemo_core::{Error, Result};

use crate::strategy::TextSource;

/// Extract the canonical 11-character video identifier from a URL.
///
/// Recognizes watch, short-link, and embed URL shapes; a bare identifier of
/// the expected length and alphabet is accepted as-is.
pub fn parse_video_id(input: &str) -> Option<String> {
    let url_pattern =
        Regex::new(r"(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/)([A-Za-z0-9_-]{11})")
            .unwrap();
    if let Some(captures) = url_pattern.captures(input) {
        return Some(captures[1].to_string());
    }

    let bare_pattern = Regex::new(r"^[A-Za-z0-9_-]{11}$").unwrap();
    if bare_pattern.is_match(input) {
        return Some(input.to_string());
    }

    None
}

/// Strip tag-delimited caption markup and collapse whitespace.
fn strip_caption_markup(content: &str) -> String {
    let tags = Regex::new(r"<[^>]+>").unwrap();
    let text = tags.replace_all(content, " ");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// =============================================================================
// STRUCTURED TIMED-TEXT FORMAT
// =============================================================================

#[derive(Debug, Deserialize)]
struct TimedTextTrack {
    #[serde(default)]
    events: Vec<TimedTextEvent>,
}

#[derive(Debug, Deserialize)]
struct TimedTextEvent {
    #[serde(default)]
    segs: Vec<TimedTextSeg>,
}

#[derive(Debug, Deserialize)]
struct TimedTextSeg {
    #[serde(default)]
    utf8: String,
}

/// Parse a caption track body, structured format first, legacy fallback.
fn parse_caption_track(body: &str) -> String {
    match serde_json::from_str::<TimedTextTrack>(body) {
        Ok(track) => {
            let mut out = String::new();
            for event in track.events {
                for seg in event.segs {
                    if !seg.utf8.is_empty() && seg.utf8 != "\n" {
                        out.push_str(&seg.utf8);
                    }
                }
            }
            out.trim().to_string()
        }
        Err(_) => strip_caption_markup(body),
    }
}

// =============================================================================
// PROVIDERS
// =============================================================================

/// Hosted transcript API returning plain text directly.
pub struct HostedTranscript<'a> {
    client: &'a Client,
    base_url: &'a str,
    video_id: &'a str,
}

impl<'a> HostedTranscript<'a> {
    pub fn new(client: &'a Client, base_url: &'a str, video_id: &'a str) -> Self {
        Self {
            client,
            base_url,
            video_id,
        }
    }
}

#[derive(Debug, Deserialize)]
struct HostedTranscriptResponse {
    #[serde(default)]
    content: String,
}

#[async_trait]
impl TextSource for HostedTranscript<'_> {
    fn name(&self) -> &str {
        "hosted_transcript"
    }

    async fn try_acquire(&self, _cancel: &CancellationToken) -> Result<String> {
        let url = format!("{}?videoId={}&text=true", self.base_url, self.video_id);
        debug!(url = %url, "Fetching hosted transcript");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Upstream {
                status: status.as_u16(),
                message: "hosted transcript API".to_string(),
            });
        }

        let body = response.text().await?;
        match serde_json::from_str::<HostedTranscriptResponse>(&body) {
            Ok(parsed) if !parsed.content.is_empty() => Ok(parsed.content),
            Ok(_) => Err(Error::NoCaptions(self.video_id.to_string())),
            // Some deployments answer with bare plain text.
            Err(_) => Ok(body.trim().to_string()),
        }
    }
}

/// Direct retrieval of the video page to locate its embedded caption track.
pub struct PageCaptions<'a> {
    client: &'a Client,
    page_base_url: &'a str,
    video_id: &'a str,
}

impl<'a> PageCaptions<'a> {
    pub fn new(client: &'a Client, page_base_url: &'a str, video_id: &'a str) -> Self {
        Self {
            client,
            page_base_url,
            video_id,
        }
    }

    /// Find the caption track URL embedded in the video page markup.
    /// The URL sits inside a JSON string, so its ampersands are escaped.
    fn extract_caption_url(html: &str) -> Option<String> {
        let pattern = Regex::new(r#""captionTracks":\[.*?"baseUrl":"([^"]+)""#).unwrap();
        pattern
            .captures(html)
            .map(|captures| captures[1].replace("\\u0026", "&"))
    }

    async fn fetch_caption_track(&self, caption_url: &str) -> Result<String> {
        // The structured format is easier to parse; ask for it explicitly.
        let url = if caption_url.contains("fmt=") {
            caption_url.to_string()
        } else if caption_url.contains('?') {
            format!("{}&fmt=json3", caption_url)
        } else {
            format!("{}?fmt=json3", caption_url)
        };

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Upstream {
                status: status.as_u16(),
                message: "caption track fetch".to_string(),
            });
        }

        let body = response.text().await?;
        Ok(parse_caption_track(&body))
    }
}

#[async_trait]
impl TextSource for PageCaptions<'_> {
    fn name(&self) -> &str {
        "page_captions"
    }

    async fn try_acquire(&self, _cancel: &CancellationToken) -> Result<String> {
        let page_url = format!("{}?v={}", self.page_base_url, self.video_id);
        let response = self
            .client
            .get(&page_url)
            .header("User-Agent", ACQUIRE_USER_AGENT)
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Upstream {
                status: status.as_u16(),
                message: "video page fetch".to_string(),
            });
        }

        let html = response.text().await?;
        let caption_url = Self::extract_caption_url(&html)
            .ok_or_else(|| Error::NoCaptions(self.video_id.to_string()))?;

        debug!(video_id = self.video_id, "Found embedded caption track");
        self.fetch_caption_track(&caption_url).await
    }
}

/// Third-party transcript mirror, last resort.
pub struct TranscriptMirror<'a> {
    client: &'a Client,
    base_url: &'a str,
    video_id: &'a str,
}

impl<'a> TranscriptMirror<'a> {
    pub fn new(client: &'a Client, base_url: &'a str, video_id: &'a str) -> Self {
        Self {
            client,
            base_url,
            video_id,
        }
    }
}

#[async_trait]
impl TextSource for TranscriptMirror<'_> {
    fn name(&self) -> &str {
        "transcript_mirror"
    }

    async fn try_acquire(&self, _cancel: &CancellationToken) -> Result<String> {
        let url = format!(
            "{}/?server_vid2={}",
            self.base_url.trim_end_matches('/'),
            self.video_id
        );

        let response = self
            .client
            .get(&url)
            .header("User-Agent", "Mozilla/5.0")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Upstream {
                status: status.as_u16(),
                message: "transcript mirror".to_string(),
            });
        }

        let body = response.text().await?;
        let text = strip_caption_markup(&body);
        if text.len() < MIRROR_MIN_LENGTH {
            return Err(Error::NoCaptions(self.video_id.to_string()));
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_video_id_watch_url() {
        assert_eq!(
            parse_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_parse_video_id_short_url() {
        assert_eq!(
            parse_video_id("https://youtu.be/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_parse_video_id_embed_url() {
        assert_eq!(
            parse_video_id("https://www.youtube.com/embed/dQw4w9WgXcQ?autoplay=1"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_parse_video_id_bare_id() {
        assert_eq!(
            parse_video_id("dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_parse_video_id_rejects_plain_urls() {
        assert_eq!(parse_video_id("https://example.com/article"), None);
        assert_eq!(parse_video_id("not-an-id"), None);
        assert_eq!(parse_video_id("https://youtube.com/watch?v=short"), None);
    }

    #[test]
    fn test_extract_caption_url_unescapes_ampersands() {
        let html =
            r#"..."captionTracks":[{"baseUrl":"https://example.com/api/timedtext?v=abc\u0026lang=en","name":...]"#;
        let url = PageCaptions::extract_caption_url(html).unwrap();
        assert_eq!(url, "https://example.com/api/timedtext?v=abc&lang=en");
    }

    #[test]
    fn test_extract_caption_url_missing() {
        assert!(PageCaptions::extract_caption_url("<html>no captions here</html>").is_none());
    }

    #[test]
    fn test_parse_caption_track_structured() {
        let body = r#"{"events":[{"segs":[{"utf8":"Hello "},{"utf8":"\n"},{"utf8":"world"}]},{"segs":[{"utf8":"."}]}]}"#;
        assert_eq!(parse_caption_track(body), "Hello world.");
    }

    #[test]
    fn test_parse_caption_track_legacy_markup() {
        let body = "<transcript><text start=\"0.1\">Hello</text>\n<text start=\"1.2\">world</text></transcript>";
        assert_eq!(parse_caption_track(body), "Hello world");
    }

    #[test]
    fn test_strip_caption_markup_collapses_whitespace() {
        assert_eq!(
            strip_caption_markup("<p>a</p>   <b>b</b>\n\nc"),
            "a b c"
        );
    }

    #[test]
    fn test_hosted_response_deserialization() {
        let parsed: HostedTranscriptResponse =
            serde_json::from_str(r#"{"content": "a transcript"}"#).unwrap();
        assert_eq!(parsed.content, "a transcript");

        let empty: HostedTranscriptResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert!(empty.content.is_empty());
    }
}
