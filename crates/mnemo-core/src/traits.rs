//! Core traits for mnemo abstractions.
//!
//! These traits define the interfaces that concrete implementations must
//! satisfy, enabling pluggable backends and testability. The generative
//! service and the persistence layer are both consumed through these narrow
//! contracts; nothing in the engine touches a wire protocol or a schema
//! directly.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{CardDraft, Flashcard, MaterialContent, SourceKind};

// =============================================================================
// GENERATIVE SERVICE
// =============================================================================

/// Backend for text and vision completion against a generative service.
///
/// The engine sends a prompt (optionally with an image) and receives
/// free-form text; any structure it expects is parsed out of that text by
/// the caller.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send a plain-text prompt to the text model.
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Send a prompt plus an image payload to the vision model.
    async fn complete_with_image(
        &self,
        prompt: &str,
        image_data: &[u8],
        mime_type: &str,
    ) -> Result<String>;

    /// Model used for text completion.
    fn text_model(&self) -> &str;

    /// Model used for vision completion.
    fn vision_model(&self) -> &str;
}

// =============================================================================
// PERSISTENCE
// =============================================================================

/// Persistence collaborator for materials, tags, and flashcards.
///
/// Entities are keyed by opaque string identifiers; schema and transactions
/// belong to the implementation.
#[async_trait]
pub trait StudyStore: Send + Sync {
    /// Persist a new material, returning its identifier.
    async fn create_material(
        &self,
        user_id: &str,
        kind: SourceKind,
        content: &str,
        title: &str,
    ) -> Result<String>;

    /// Fetch a material's stored content, title, and summary.
    async fn material_content(&self, user_id: &str, material_id: &str) -> Result<MaterialContent>;

    /// Attach or replace a material's summary.
    async fn update_material_summary(&self, material_id: &str, summary: &str) -> Result<()>;

    /// Create a tag for a user if it does not exist, returning its identifier.
    async fn create_tag(&self, user_id: &str, name: &str) -> Result<String>;

    /// Link tags to a material.
    async fn link_material_tags(&self, material_id: &str, tag_ids: &[String]) -> Result<()>;

    /// List a user's tag names.
    async fn list_tags(&self, user_id: &str) -> Result<Vec<String>>;

    /// Persist generated flashcards for a material.
    async fn create_flashcards(&self, material_id: &str, cards: &[CardDraft]) -> Result<()>;

    /// Fetch a single flashcard.
    async fn flashcard(&self, flashcard_id: &str) -> Result<Flashcard>;

    /// Update a flashcard's review schedule.
    async fn update_flashcard_schedule(
        &self,
        flashcard_id: &str,
        stage: i32,
        next_review_at: DateTime<Utc>,
    ) -> Result<()>;

    /// Flashcards of a material that are due for review.
    async fn due_flashcards(&self, user_id: &str, material_id: &str) -> Result<Vec<Flashcard>>;
}
