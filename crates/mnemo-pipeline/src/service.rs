//! Orchestration of the full ingestion flow against the persistence trait.
//!
//! `add_material` is the write path: acquire a corpus, generate flashcards
//! and a summary concurrently, then persist. Flashcard generation and the
//! primary material/flashcard writes are fatal on failure; the summary and
//! tag side effects are logged and absorbed so a usable material is never
//! lost to a decorative write.

use std::sync::Arc;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use mnemo_acquire::Acquirer;
use mnemo_core::srs;
use mnemo_core::{
    Error, Flashcard, MaterialReceipt, NextReview, Result, ReviewOutcome, SourceDescriptor,
    StudyStore,
};

use crate::chunker::split_text;
use crate::generate::Generator;

/// Drives acquisition, generation, scheduling, and persistence.
pub struct LearningService {
    store: Arc<dyn StudyStore>,
    acquirer: Arc<Acquirer>,
    generator: Arc<Generator>,
}

impl LearningService {
    pub fn new(
        store: Arc<dyn StudyStore>,
        acquirer: Arc<Acquirer>,
        generator: Arc<Generator>,
    ) -> Self {
        Self {
            store,
            acquirer,
            generator,
        }
    }

    /// Ingest a source and persist the generated study material.
    ///
    /// The authenticated `user_id` is a precondition supplied by the caller;
    /// no verification happens here.
    #[instrument(skip(self, source, cancel), fields(kind = %source.kind()))]
    pub async fn add_material(
        &self,
        user_id: &str,
        source: SourceDescriptor,
        cancel: &CancellationToken,
    ) -> Result<MaterialReceipt> {
        let corpus = self.acquirer.acquire(&source, cancel).await?;
        if corpus.trim().is_empty() {
            return Err(Error::InvalidInput("acquired corpus is empty".to_string()));
        }
        info!(content_len = corpus.len(), "Corpus acquired");

        // Existing tags give the model a vocabulary to reuse; losing them
        // only degrades tag quality.
        let existing_tags = match self.store.list_tags(user_id).await {
            Ok(tags) => tags,
            Err(e) => {
                warn!(error = %e, "Failed to fetch existing tags, continuing without");
                Vec::new()
            }
        };

        let config = self.generator.config();
        let chunks = split_text(&corpus, config.max_chunk_size, config.chunk_overlap);

        // Flashcards and summary are independent calls over the same corpus;
        // run them concurrently and join before persisting anything.
        let (draft_result, summary_result) = tokio::join!(
            self.generator.generate(&chunks, &existing_tags, cancel),
            self.generator.summarize(&corpus, cancel),
        );

        let draft = draft_result?;

        let material_id = self
            .store
            .create_material(
                user_id,
                source.kind(),
                &corpus,
                draft.title.as_deref().unwrap_or_default(),
            )
            .await?;

        match summary_result {
            Ok(summary) if !summary.is_empty() => {
                if let Err(e) = self
                    .store
                    .update_material_summary(&material_id, &summary)
                    .await
                {
                    warn!(material_id, error = %e, "Failed to save summary");
                }
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "Summary generation failed, continuing without"),
        }

        let mut tag_ids = Vec::new();
        for tag in &draft.tags {
            match self.store.create_tag(user_id, tag).await {
                Ok(id) => tag_ids.push(id),
                Err(e) => warn!(tag, error = %e, "Failed to create tag"),
            }
        }
        if !tag_ids.is_empty() {
            if let Err(e) = self.store.link_material_tags(&material_id, &tag_ids).await {
                warn!(material_id, error = %e, "Failed to link tags");
            }
        }

        if !draft.cards.is_empty() {
            self.store
                .create_flashcards(&material_id, &draft.cards)
                .await?;
        }

        info!(
            material_id,
            card_count = draft.cards.len(),
            "Material ingested"
        );
        Ok(MaterialReceipt {
            material_id,
            title: draft.title,
            tags: draft.tags,
            card_count: draft.cards.len(),
        })
    }

    /// Return a material's summary and title, generating and saving the
    /// summary on first request.
    pub async fn material_summary(
        &self,
        user_id: &str,
        material_id: &str,
        cancel: &CancellationToken,
    ) -> Result<(String, String)> {
        let content = self.store.material_content(user_id, material_id).await?;

        if let Some(summary) = content.summary {
            if !summary.is_empty() {
                return Ok((summary, content.title));
            }
        }

        let summary = self.generator.summarize(&content.content, cancel).await?;
        if let Err(e) = self
            .store
            .update_material_summary(material_id, &summary)
            .await
        {
            // The generated summary is still useful to the caller.
            warn!(material_id, error = %e, "Failed to save generated summary");
        }

        Ok((summary, content.title))
    }

    /// Apply one review outcome to a flashcard's schedule.
    #[instrument(skip(self))]
    pub async fn record_review(
        &self,
        flashcard_id: &str,
        outcome: ReviewOutcome,
    ) -> Result<NextReview> {
        let card = self.store.flashcard(flashcard_id).await?;
        let next = srs::advance(card.stage, outcome, Utc::now());

        self.store
            .update_flashcard_schedule(flashcard_id, next.stage, next.next_review_at)
            .await?;

        info!(
            flashcard_id,
            from_stage = card.stage,
            to_stage = next.stage,
            "Review recorded"
        );
        Ok(next)
    }

    /// Flashcards of a material currently due for review.
    pub async fn due_flashcards(
        &self,
        user_id: &str,
        material_id: &str,
    ) -> Result<Vec<Flashcard>> {
        self.store.due_flashcards(user_id, material_id).await
    }
}
