//! Study-material generation over one or many chunks.
//!
//! A single chunk is one direct generation call. Multiple chunks fan out
//! under a fixed concurrency budget, each call independently retried, and
//! partial failure is tolerated: as long as one chunk succeeds the caller
//! gets the union of everything that did. Chunk results arrive in
//! completion order and nothing here assumes otherwise.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use mnemo_core::defaults::{
    CHUNK_OVERLAP, CHUNK_SIZE, DEDUP_PREFIX_LEN, GEN_MAX_CONCURRENT, SUMMARY_MAX_INPUT,
};
use mnemo_core::{CardDraft, ChatBackend, Error, Result, StudyDraft};

use crate::chunker::Chunk;
use crate::retry::{with_retry, RetryPolicy};

/// Tunables for chunking and generation fan-out.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Maximum characters per chunk.
    pub max_chunk_size: usize,
    /// Overlap characters between adjacent chunks.
    pub chunk_overlap: usize,
    /// Concurrency budget for the chunk fan-out; independent of chunk count.
    pub max_concurrent: usize,
    /// Maximum characters of corpus fed to summary generation.
    pub summary_max_input: usize,
    /// Retry policy for generation calls.
    pub retry: RetryPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: CHUNK_SIZE,
            chunk_overlap: CHUNK_OVERLAP,
            max_concurrent: GEN_MAX_CONCURRENT,
            summary_max_input: SUMMARY_MAX_INPUT,
            retry: RetryPolicy::default(),
        }
    }
}

/// Structured shape expected inside a generation response.
///
/// Fields are optional so a model that omits or nulls one does not sink the
/// whole chunk.
#[derive(Debug, Default, Deserialize)]
struct GenerationAnswer {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    tags: Option<Vec<String>>,
    #[serde(default)]
    flashcards: Option<Vec<CardDraft>>,
}

/// Drives generation calls against the chat backend.
pub struct Generator {
    backend: Arc<dyn ChatBackend>,
    config: PipelineConfig,
}

impl Generator {
    pub fn new(backend: Arc<dyn ChatBackend>, config: PipelineConfig) -> Self {
        Self { backend, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Generate title, tags, and flashcards for an ordered set of chunks.
    ///
    /// With multiple chunks, the overall title is the first non-empty title
    /// in *completion* order; which chunk wins depends on scheduling and is
    /// deliberately left non-deterministic. Tags are unioned case-sensitively
    /// and flashcards concatenated then deduplicated by question prefix.
    #[instrument(skip(self, chunks, existing_tags, cancel), fields(chunk_count = chunks.len()))]
    pub async fn generate(
        &self,
        chunks: &[Chunk],
        existing_tags: &[String],
        cancel: &CancellationToken,
    ) -> Result<StudyDraft> {
        match chunks {
            [] => Err(Error::InvalidInput("no chunks to process".to_string())),
            [only] => {
                let answer = with_retry(&self.config.retry, cancel, "generate", || {
                    generate_chunk(self.backend.as_ref(), &only.text, existing_tags)
                })
                .await?;
                Ok(draft_from_answers(vec![answer]))
            }
            many => self.generate_fan_out(many, existing_tags, cancel).await,
        }
    }

    /// Fan out one generation call per chunk under the concurrency budget.
    async fn generate_fan_out(
        &self,
        chunks: &[Chunk],
        existing_tags: &[String],
        cancel: &CancellationToken,
    ) -> Result<StudyDraft> {
        info!(
            chunk_count = chunks.len(),
            max_concurrent = self.config.max_concurrent,
            "Processing chunks concurrently"
        );

        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent));
        let mut tasks = JoinSet::new();

        for chunk in chunks {
            let backend = self.backend.clone();
            let semaphore = semaphore.clone();
            let cancel = cancel.clone();
            let retry = self.config.retry.clone();
            let text = chunk.text.clone();
            let tags = existing_tags.to_vec();
            let index = chunk.index;

            tasks.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        return Err(Error::Internal("fan-out gate closed".to_string()));
                    }
                };

                let operation = format!("generate_chunk_{}", index);
                let result = with_retry(&retry, &cancel, &operation, || {
                    generate_chunk(backend.as_ref(), &text, &tags)
                })
                .await;

                if let Err(ref e) = result {
                    warn!(chunk = index, error = %e, "Chunk generation failed");
                }
                result
            });
        }

        // Collect in completion order; a panicked task counts as a failure.
        let mut outcomes = Vec::with_capacity(chunks.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    error!(error = %e, "Chunk task panicked");
                    outcomes.push(Err(Error::Internal(format!("chunk task failed: {}", e))));
                }
            }
        }

        let failures = outcomes.iter().filter(|o| o.is_err()).count();
        if failures == outcomes.len() {
            let first_error = outcomes
                .into_iter()
                .find_map(|o| o.err())
                .unwrap_or_else(|| Error::Generation("no chunk produced output".to_string()));
            return Err(first_error);
        }
        if failures > 0 {
            warn!(failures, total = chunks.len(), "Tolerating partial chunk failure");
        }

        let draft = draft_from_answers(outcomes.into_iter().filter_map(|o| o.ok()).collect());
        info!(
            card_count = draft.cards.len(),
            tag_count = draft.tags.len(),
            "Aggregated chunk results"
        );
        Ok(draft)
    }

    /// Generate a review summary for the corpus.
    ///
    /// Input is truncated to stay inside the model's budget. Not retried;
    /// callers treat summary failure as non-fatal.
    #[instrument(skip(self, corpus, cancel), fields(corpus_len = corpus.len()))]
    pub async fn summarize(&self, corpus: &str, cancel: &CancellationToken) -> Result<String> {
        if corpus.trim().is_empty() {
            return Err(Error::InvalidInput("cannot summarize an empty corpus".to_string()));
        }

        let mut input = corpus;
        if input.len() > self.config.summary_max_input {
            let mut cut = self.config.summary_max_input;
            while !input.is_char_boundary(cut) {
                cut -= 1;
            }
            debug!(from = input.len(), to = cut, "Truncating summary input");
            input = &input[..cut];
        }

        let prompt = summary_prompt(input);
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(Error::Cancelled),
            res = self.backend.complete(&prompt) => res,
        }
    }
}

/// One generation call for one chunk, parsed.
async fn generate_chunk(
    backend: &dyn ChatBackend,
    content: &str,
    existing_tags: &[String],
) -> Result<GenerationAnswer> {
    let prompt = flashcard_prompt(content, existing_tags);
    let raw = backend.complete(&prompt).await?;
    parse_generation(&raw)
}

fn flashcard_prompt(content: &str, existing_tags: &[String]) -> String {
    format!(
        "You are a study assistant that turns text into flashcards.\n\
         Read the text below and produce:\n\
         1. A short, descriptive title for the material.\n\
         2. A list of 3-5 relevant tags (categories).\n\
         3. 5 to 10 high-quality flashcards (question and answer pairs).\n\
         \n\
         Existing tags worth reusing when they fit: {}\n\
         \n\
         Respond with ONLY a raw JSON object of this shape:\n\
         {{\n\
         \x20 \"title\": \"String\",\n\
         \x20 \"tags\": [\"String\"],\n\
         \x20 \"flashcards\": [\n\
         \x20   {{\"question\": \"String\", \"answer\": \"String\"}}\n\
         \x20 ]\n\
         }}\n\
         Do not wrap the JSON in markdown fences. Do not add any other text.\n\
         \n\
         Text:\n{}",
        existing_tags.join(", "),
        content
    )
}

fn summary_prompt(content: &str) -> String {
    format!(
        "You are a study assistant that writes concise review summaries.\n\
         Summarize the text below so a student can review its key concepts\n\
         quickly. The summary should:\n\
         - be 3-5 paragraphs\n\
         - highlight the main concepts and key points\n\
         - be easy to scan, with bullet points where they help\n\
         \n\
         Respond with ONLY the summary text, no extra formatting or metadata.\n\
         \n\
         Text:\n{}",
        content
    )
}

/// Strip a markdown code fence wrapped around a JSON payload.
fn strip_code_fences(raw: &str) -> &str {
    let s = raw.trim();
    let s = s.strip_prefix("```json").unwrap_or(s);
    let s = s.strip_prefix("```").unwrap_or(s);
    let s = s.strip_suffix("```").unwrap_or(s);
    s.trim()
}

fn parse_generation(raw: &str) -> Result<GenerationAnswer> {
    let cleaned = strip_code_fences(raw);
    serde_json::from_str(cleaned)
        .map_err(|e| Error::Parse(format!("generation response was not valid JSON: {}", e)))
}

/// Fold chunk answers (in completion order) into one draft.
fn draft_from_answers(answers: Vec<GenerationAnswer>) -> StudyDraft {
    let mut title: Option<String> = None;
    let mut tags: Vec<String> = Vec::new();
    let mut seen_tags: HashSet<String> = HashSet::new();
    let mut cards: Vec<CardDraft> = Vec::new();

    for answer in answers {
        if title.is_none() {
            if let Some(t) = answer.title {
                let t = t.trim().to_string();
                if !t.is_empty() {
                    title = Some(t);
                }
            }
        }
        for tag in answer.tags.unwrap_or_default() {
            if seen_tags.insert(tag.clone()) {
                tags.push(tag);
            }
        }
        cards.extend(answer.flashcards.unwrap_or_default());
    }

    StudyDraft {
        title,
        tags,
        cards: dedup_cards(cards),
    }
}

/// Drop flashcards whose normalized question prefix repeats an earlier one.
///
/// Cheap approximate dedup: case-insensitive, whitespace-trimmed, first 50
/// characters. Favors missed duplicates over dropping distinct cards.
fn dedup_cards(cards: Vec<CardDraft>) -> Vec<CardDraft> {
    let mut seen = HashSet::new();
    let mut unique = Vec::new();

    for card in cards {
        let key: String = card
            .question
            .trim()
            .to_lowercase()
            .chars()
            .take(DEDUP_PREFIX_LEN)
            .collect();
        if seen.insert(key) {
            unique.push(card);
        }
    }

    unique
}
