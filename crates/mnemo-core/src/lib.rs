//! # mnemo-core
//!
//! Core types, traits, and abstractions for the mnemo study engine.
//!
//! This crate provides the foundational data structures and trait definitions
//! that the other mnemo crates depend on: the error taxonomy, domain models
//! for materials and flashcards, centralized default constants, the
//! persistence and generation capability traits, and the spaced-repetition
//! scheduler.

pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod srs;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use srs::{advance, interval_days, NextReview};
pub use traits::*;
