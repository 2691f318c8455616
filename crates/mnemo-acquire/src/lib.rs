//! # mnemo-acquire
//!
//! Content acquisition for the mnemo study engine.
//!
//! Turns a [`SourceDescriptor`] into a plain-text corpus using
//! source-specific multi-tier fallback strategies:
//!
//! - **Web links**: static markup extraction, then a rendering reader
//!   service for script-heavy pages
//! - **Video links**: hosted transcript API, embedded caption track, then a
//!   transcript mirror
//! - **Images**: verbatim transcription through a vision model
//! - **Raw text**: identity
//!
//! Fallbacks are tried cheapest-first, sequentially, and short-circuit on
//! the first result above the minimum content length; there is no parallel
//! racing of sources.

pub mod image;
pub mod strategy;
pub mod transcript;
pub mod web;

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use mnemo_core::defaults;
use mnemo_core::{ChatBackend, Error, Result, SourceDescriptor};

pub use strategy::{run_chain, TextSource};
pub use transcript::parse_video_id;

/// Configuration for the acquirer.
#[derive(Debug, Clone)]
pub struct AcquireConfig {
    /// Base URL of the rendering reader service.
    pub reader_base_url: String,
    /// Base URL of the hosted transcript API.
    pub hosted_transcript_url: String,
    /// Base URL of the video watch page.
    pub video_page_url: String,
    /// Base URL of the transcript mirror service.
    pub transcript_mirror_url: String,
    /// Minimum corpus length for a strategy result to be accepted.
    pub min_content_length: usize,
    /// Maximum corpus length taken from the rendering reader.
    pub reader_max_length: usize,
    /// Timeout for page fetches in seconds.
    pub timeout_secs: u64,
    /// Timeout for transcript provider requests in seconds.
    pub transcript_timeout_secs: u64,
}

impl Default for AcquireConfig {
    fn default() -> Self {
        Self {
            reader_base_url: defaults::READER_BASE_URL.to_string(),
            hosted_transcript_url: defaults::HOSTED_TRANSCRIPT_URL.to_string(),
            video_page_url: defaults::VIDEO_PAGE_URL.to_string(),
            transcript_mirror_url: defaults::TRANSCRIPT_MIRROR_URL.to_string(),
            min_content_length: defaults::MIN_CONTENT_LENGTH,
            reader_max_length: defaults::READER_MAX_LENGTH,
            timeout_secs: defaults::ACQUIRE_TIMEOUT_SECS,
            transcript_timeout_secs: defaults::TRANSCRIPT_TIMEOUT_SECS,
        }
    }
}

/// Acquires a plain-text corpus from a source descriptor.
pub struct Acquirer {
    client: Client,
    transcript_client: Client,
    backend: Arc<dyn ChatBackend>,
    config: AcquireConfig,
}

impl Acquirer {
    /// Create a new acquirer. The chat backend serves image transcription.
    pub fn new(config: AcquireConfig, backend: Arc<dyn ChatBackend>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;
        let transcript_client = Client::builder()
            .timeout(Duration::from_secs(config.transcript_timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            transcript_client,
            backend,
            config,
        })
    }

    /// Acquire a corpus for the given source.
    ///
    /// A link matching a recognized video URL shape goes through the
    /// transcript chain; any other link goes through the web-page chain.
    #[instrument(skip(self, source, cancel), fields(kind = %source.kind()))]
    pub async fn acquire(
        &self,
        source: &SourceDescriptor,
        cancel: &CancellationToken,
    ) -> Result<String> {
        match source {
            SourceDescriptor::Link { url } => match parse_video_id(url) {
                Some(video_id) => self.acquire_transcript(&video_id, cancel).await,
                None => self.acquire_page(url, cancel).await,
            },
            SourceDescriptor::Image { data, mime_type } => {
                image::extract_image_text(self.backend.as_ref(), data, mime_type, cancel).await
            }
            SourceDescriptor::RawText { text } => {
                if text.trim().is_empty() {
                    return Err(Error::InvalidInput("raw text source is empty".to_string()));
                }
                Ok(text.clone())
            }
        }
    }

    /// Run the web-page strategy chain for a non-video link.
    async fn acquire_page(&self, url: &str, cancel: &CancellationToken) -> Result<String> {
        let static_page = web::StaticPage::new(&self.client, url);
        let reader = web::RenderingReader::new(
            &self.client,
            &self.config.reader_base_url,
            url,
            self.config.reader_max_length,
        );

        let corpus = run_chain(
            &[&static_page as &dyn TextSource, &reader],
            self.config.min_content_length,
            cancel,
        )
        .await?;

        info!(content_len = corpus.len(), "Acquired page content");
        Ok(corpus)
    }

    /// Run the transcript provider chain for a video link.
    async fn acquire_transcript(
        &self,
        video_id: &str,
        cancel: &CancellationToken,
    ) -> Result<String> {
        let hosted = transcript::HostedTranscript::new(
            &self.transcript_client,
            &self.config.hosted_transcript_url,
            video_id,
        );
        let page = transcript::PageCaptions::new(
            &self.transcript_client,
            &self.config.video_page_url,
            video_id,
        );
        let mirror = transcript::TranscriptMirror::new(
            &self.transcript_client,
            &self.config.transcript_mirror_url,
            video_id,
        );

        let corpus = run_chain(
            &[&hosted as &dyn TextSource, &page, &mirror],
            self.config.min_content_length,
            cancel,
        )
        .await
        .map_err(|e| match e {
            Error::AcquisitionExhausted(_) => Error::NoCaptions(video_id.to_string()),
            other => other,
        })?;

        info!(video_id, content_len = corpus.len(), "Acquired transcript");
        Ok(corpus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mnemo_inference::MockChatBackend;

    fn acquirer_with(backend: MockChatBackend) -> Acquirer {
        Acquirer::new(AcquireConfig::default(), Arc::new(backend)).unwrap()
    }

    #[tokio::test]
    async fn test_raw_text_is_identity() {
        let acquirer = acquirer_with(MockChatBackend::new());
        let cancel = CancellationToken::new();
        let source = SourceDescriptor::RawText {
            text: "My own study notes.".to_string(),
        };

        let corpus = acquirer.acquire(&source, &cancel).await.unwrap();
        assert_eq!(corpus, "My own study notes.");
    }

    #[tokio::test]
    async fn test_empty_raw_text_rejected() {
        let acquirer = acquirer_with(MockChatBackend::new());
        let cancel = CancellationToken::new();
        let source = SourceDescriptor::RawText {
            text: "   \n ".to_string(),
        };

        let err = acquirer.acquire(&source, &cancel).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_image_source_uses_vision_backend() {
        let backend = MockChatBackend::new().with_response("Page text from a photo.");
        let acquirer = acquirer_with(backend.clone());
        let cancel = CancellationToken::new();
        let source = SourceDescriptor::Image {
            data: vec![0xFF, 0xD8, 0xFF],
            mime_type: "image/jpeg".to_string(),
        };

        let corpus = acquirer.acquire(&source, &cancel).await.unwrap();
        assert_eq!(corpus, "Page text from a photo.");
        assert_eq!(backend.vision_call_count(), 1);
    }

    #[test]
    fn test_video_links_route_to_transcript_chain() {
        // Dispatch decision only; the chain itself is network-bound.
        assert!(parse_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ").is_some());
        assert!(parse_video_id("https://example.com/blog/post").is_none());
    }
}
