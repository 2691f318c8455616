//! Text extraction from photographed pages via a vision model.

use tokio_util::sync::CancellationToken;
use tracing::debug;

use mnemo_core::{ChatBackend, Error, Result};

/// Instructs the vision model to transcribe, not describe.
const EXTRACTION_PROMPT: &str = "Transcribe ALL text in this image exactly as it is written, \
keeping the original structure, headings, and formatting. \
Describe any diagrams or charts briefly in brackets, e.g. [Diagram: water cycle]. \
Transcribe handwriting as accurately as you can. \
Return only the transcribed text, with no commentary or extra formatting.";

/// Extract a verbatim text corpus from an image payload.
///
/// The model's answer is the corpus as-is; no cleanup pass runs on it.
pub async fn extract_image_text(
    backend: &dyn ChatBackend,
    image_data: &[u8],
    mime_type: &str,
    cancel: &CancellationToken,
) -> Result<String> {
    if image_data.is_empty() {
        return Err(Error::InvalidInput(
            "image source requires a non-empty payload".to_string(),
        ));
    }

    debug!(image_bytes = image_data.len(), mime_type, "Extracting text from image");

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Error::Cancelled),
        res = backend.complete_with_image(EXTRACTION_PROMPT, image_data, mime_type) => res,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mnemo_inference::MockChatBackend;

    #[tokio::test]
    async fn test_returns_model_output_verbatim() {
        let backend =
            MockChatBackend::new().with_response("  Chapter 1\n[Diagram: a cell]\nMitochondria  ");
        let cancel = CancellationToken::new();

        let text = extract_image_text(&backend, &[1, 2, 3], "image/jpeg", &cancel)
            .await
            .unwrap();
        // Mock trims nothing; whatever the backend returned is the corpus.
        assert_eq!(text, "  Chapter 1\n[Diagram: a cell]\nMitochondria  ");
        assert_eq!(backend.vision_call_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_payload_is_precondition_failure() {
        let backend = MockChatBackend::new();
        let cancel = CancellationToken::new();

        let err = extract_image_text(&backend, &[], "image/png", &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_before_call() {
        let backend = MockChatBackend::new();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = extract_image_text(&backend, &[1], "image/png", &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Cancelled));
    }
}
