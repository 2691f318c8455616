//! Domain models for the mnemo study engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A unit of learning content as supplied by the caller, before acquisition.
///
/// Constructed once by the caller and consumed once by the acquirer.
#[derive(Debug, Clone)]
pub enum SourceDescriptor {
    /// A web page or video URL to fetch and extract text from.
    Link { url: String },
    /// A photographed page to transcribe via a vision model.
    Image { data: Vec<u8>, mime_type: String },
    /// Text supplied directly; used verbatim.
    RawText { text: String },
}

impl SourceDescriptor {
    /// The persisted kind label for this source.
    pub fn kind(&self) -> SourceKind {
        match self {
            SourceDescriptor::Link { .. } => SourceKind::Link,
            SourceDescriptor::Image { .. } => SourceKind::Image,
            SourceDescriptor::RawText { .. } => SourceKind::Text,
        }
    }
}

/// Kind label stored alongside a material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SourceKind {
    Link,
    Image,
    Text,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Link => write!(f, "LINK"),
            SourceKind::Image => write!(f, "IMAGE"),
            SourceKind::Text => write!(f, "TEXT"),
        }
    }
}

/// A question/answer pair as emitted by the generative service, before it
/// is persisted as a [`Flashcard`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDraft {
    pub question: String,
    pub answer: String,
}

/// Aggregate output of study-material generation for one corpus.
#[derive(Debug, Clone, Default)]
pub struct StudyDraft {
    /// Best-effort material title; `None` when no chunk produced one.
    pub title: Option<String>,
    /// Union of tags across all successful chunks, first-seen order.
    pub tags: Vec<String>,
    /// Deduplicated flashcards across all successful chunks.
    pub cards: Vec<CardDraft>,
}

/// A persisted flashcard with its review-scheduling state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flashcard {
    pub id: String,
    pub question: String,
    pub answer: String,
    /// Repetition stage, clamped to `[0, SRS_MAX_STAGE]`.
    pub stage: i32,
    pub next_review_at: DateTime<Utc>,
}

/// Outcome of a single review, ephemeral input to the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewOutcome {
    Pass,
    Fail,
}

/// Stored content of a material, as returned by the persistence collaborator.
#[derive(Debug, Clone)]
pub struct MaterialContent {
    pub title: String,
    pub content: String,
    pub summary: Option<String>,
}

/// Result of adding a material: what was created, for the caller's response.
#[derive(Debug, Clone)]
pub struct MaterialReceipt {
    pub material_id: String,
    pub title: Option<String>,
    pub tags: Vec<String>,
    pub card_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_descriptor_kind() {
        let link = SourceDescriptor::Link {
            url: "https://example.com".to_string(),
        };
        assert_eq!(link.kind(), SourceKind::Link);

        let image = SourceDescriptor::Image {
            data: vec![0xFF, 0xD8],
            mime_type: "image/jpeg".to_string(),
        };
        assert_eq!(image.kind(), SourceKind::Image);

        let text = SourceDescriptor::RawText {
            text: "notes".to_string(),
        };
        assert_eq!(text.kind(), SourceKind::Text);
    }

    #[test]
    fn test_source_kind_display() {
        assert_eq!(SourceKind::Link.to_string(), "LINK");
        assert_eq!(SourceKind::Image.to_string(), "IMAGE");
        assert_eq!(SourceKind::Text.to_string(), "TEXT");
    }

    #[test]
    fn test_source_kind_serde_roundtrip() {
        let json = serde_json::to_string(&SourceKind::Image).unwrap();
        assert_eq!(json, "\"IMAGE\"");
        let back: SourceKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, SourceKind::Image);
    }

    #[test]
    fn test_card_draft_deserialization() {
        let json = r#"{"question": "What is entropy?", "answer": "A measure of disorder."}"#;
        let card: CardDraft = serde_json::from_str(json).unwrap();
        assert_eq!(card.question, "What is entropy?");
        assert_eq!(card.answer, "A measure of disorder.");
    }

    #[test]
    fn test_study_draft_default_is_empty() {
        let draft = StudyDraft::default();
        assert!(draft.title.is_none());
        assert!(draft.tags.is_empty());
        assert!(draft.cards.is_empty());
    }
}
