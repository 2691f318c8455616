//! Structured logging field name constants for mnemo.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation tools can query by standardized names across every
//! subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Operation completions, lifecycle events |
//! | DEBUG | Decision points, intermediate values |
//! | TRACE | Per-item iteration (chunks, providers) |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "acquire", "inference", "pipeline", "service"
pub const SUBSYSTEM: &str = "subsystem";

/// Logical operation name.
/// Examples: "acquire", "generate", "summarize", "record_review"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Material identifier being operated on.
pub const MATERIAL_ID: &str = "material_id";

/// Flashcard identifier being operated on.
pub const FLASHCARD_ID: &str = "flashcard_id";

/// Acquisition strategy or transcript provider name.
pub const STRATEGY: &str = "strategy";

/// Model name used for a generation call.
pub const MODEL: &str = "model";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of chunks processed in a fan-out.
pub const CHUNK_COUNT: &str = "chunk_count";

/// Character length of an acquired corpus or model response.
pub const CONTENT_LEN: &str = "content_len";

/// Number of flashcards after aggregation/dedup.
pub const CARD_COUNT: &str = "card_count";

/// Retry attempt number (0-indexed).
pub const ATTEMPT: &str = "attempt";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
