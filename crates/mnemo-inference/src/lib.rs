//! # mnemo-inference
//!
//! Generative service backend abstraction for mnemo.
//!
//! This crate provides:
//! - An OpenAI-compatible chat-completions backend implementing
//!   [`mnemo_core::ChatBackend`] for both text and vision calls
//! - Configuration with environment-based construction
//! - A mock backend with a scripted response queue for deterministic tests
//!
//! # Example
//!
//! ```rust,no_run
//! use mnemo_inference::{InferenceConfig, OpenAiChatBackend};
//! use mnemo_core::ChatBackend;
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = OpenAiChatBackend::new(InferenceConfig::from_env()).unwrap();
//!     let text = backend.complete("Say hello.").await.unwrap();
//!     println!("{text}");
//! }
//! ```

pub mod chat;
pub mod config;
pub mod mock;

// Re-export core types
pub use mnemo_core::*;

pub use chat::OpenAiChatBackend;
pub use config::InferenceConfig;
pub use mock::MockChatBackend;
