//! # mnemo-pipeline
//!
//! Chunking, resilient generation, and orchestration for the mnemo study
//! engine.
//!
//! This crate provides:
//! - Sentence-aware overlapping chunking of oversized corpora
//! - Retry with exponential backoff, jitter, and cancellation
//! - Bounded-concurrency generation fan-out with partial-failure-tolerant
//!   aggregation and flashcard deduplication
//! - The [`LearningService`] orchestration layer tying acquisition,
//!   generation, review scheduling, and persistence together

pub mod chunker;
pub mod generate;
pub mod retry;
pub mod service;

// Re-export core types
pub use mnemo_core::*;

pub use chunker::{split_text, Chunk};
pub use generate::{Generator, PipelineConfig};
pub use retry::{with_retry, RetryPolicy};
pub use service::LearningService;
