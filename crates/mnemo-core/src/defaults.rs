//! Centralized default constants for the mnemo study engine.
//!
//! **This module is the single source of truth** for all shared default
//! values. All crates should reference these constants instead of defining
//! their own magic numbers.
//!
//! Organized by domain area. When adding new constants, place them in the
//! appropriate section and document the rationale for the chosen value.

// =============================================================================
// ACQUISITION
// =============================================================================

/// Minimum corpus length (characters) for an acquisition strategy's result
/// to be accepted; shorter results fall through to the next strategy.
pub const MIN_CONTENT_LENGTH: usize = 100;

/// Maximum corpus length returned by the rendering reader service, to bound
/// downstream generation cost.
pub const READER_MAX_LENGTH: usize = 15_000;

/// Minimum text length per extracted element inside a content container.
pub const CONTAINER_ELEMENT_MIN_LENGTH: usize = 20;

/// Minimum text length per paragraph in the all-paragraphs fallback.
pub const PARAGRAPH_MIN_LENGTH: usize = 30;

/// Minimum transcript length for the mirror provider specifically; shorter
/// responses are usually an error page rather than captions.
pub const MIRROR_MIN_LENGTH: usize = 50;

/// Timeout for acquisition HTTP requests in seconds.
pub const ACQUIRE_TIMEOUT_SECS: u64 = 60;

/// Timeout for transcript provider requests in seconds.
pub const TRANSCRIPT_TIMEOUT_SECS: u64 = 30;

/// Default base URL for the rendering reader service.
pub const READER_BASE_URL: &str = "https://r.jina.ai";

/// Default base URL for the hosted transcript API.
pub const HOSTED_TRANSCRIPT_URL: &str = "https://api.supadata.ai/v1/youtube/transcript";

/// Default base URL for the video page provider.
pub const VIDEO_PAGE_URL: &str = "https://www.youtube.com/watch";

/// Default base URL for the transcript mirror service.
pub const TRANSCRIPT_MIRROR_URL: &str = "https://youtubetranscript.com";

/// Browser-like User-Agent sent to acquisition sources that reject
/// unadorned clients.
pub const ACQUIRE_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

// =============================================================================
// CHUNKING
// =============================================================================

/// Maximum characters per chunk for text splitting (~750 tokens).
pub const CHUNK_SIZE: usize = 3000;

/// Overlap characters between adjacent chunks for context preservation.
pub const CHUNK_OVERLAP: usize = 200;

/// How far back from a window's end to look for a sentence boundary.
pub const CHUNK_BOUNDARY_LOOKBACK: usize = 100;

// =============================================================================
// GENERATION
// =============================================================================

/// Maximum concurrent in-flight generation calls during chunk fan-out.
pub const GEN_MAX_CONCURRENT: usize = 3;

/// Maximum characters of corpus fed to summary generation.
pub const SUMMARY_MAX_INPUT: usize = 8000;

/// Question-prefix length (characters) used for flashcard deduplication.
pub const DEDUP_PREFIX_LEN: usize = 50;

/// Timeout for generation requests in seconds.
pub const GEN_TIMEOUT_SECS: u64 = 60;

/// Default OpenAI-compatible chat completions endpoint.
pub const INFERENCE_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Default text generation model.
pub const TEXT_MODEL: &str = "openai/gpt-oss-120b";

/// Default vision model for image transcription.
pub const VISION_MODEL: &str = "meta-llama/llama-4-scout-17b-16e-instruct";

// =============================================================================
// RETRY
// =============================================================================

/// Maximum attempts for a retried remote operation.
pub const RETRY_MAX_ATTEMPTS: u32 = 3;

/// Base delay in seconds before the first retry; doubles per attempt.
pub const RETRY_BASE_DELAY_SECS: u64 = 2;

// =============================================================================
// REVIEW SCHEDULING
// =============================================================================

/// Highest repetition stage; a ceiling, not a terminal state.
pub const SRS_MAX_STAGE: i32 = 5;

/// Review interval in days per stage (index = stage). Stage 0 is the
/// newly-created state and is never a *next* stage after a pass, but keeps
/// the table indexable by stage directly.
pub const SRS_INTERVAL_DAYS: [i64; 6] = [1, 1, 3, 7, 15, 30];

/// Fixed restart interval in days applied after a failed review.
pub const SRS_FAIL_INTERVAL_DAYS: i64 = 1;
