//! Spaced-repetition review scheduling.
//!
//! A pure state machine: given a flashcard's current stage and a review
//! outcome, compute the next stage and the next-eligible-review timestamp.
//! It holds no state of its own and never touches storage; the two persisted
//! fields (`stage`, `next_review_at`) are its entire memory.

use chrono::{DateTime, Duration, Utc};

use crate::defaults::{SRS_FAIL_INTERVAL_DAYS, SRS_INTERVAL_DAYS, SRS_MAX_STAGE};
use crate::models::ReviewOutcome;

/// The scheduling result of one review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextReview {
    pub stage: i32,
    pub next_review_at: DateTime<Utc>,
}

/// Review interval in days for a given stage, clamped to the table ceiling.
pub fn interval_days(stage: i32) -> i64 {
    let idx = stage.clamp(0, SRS_MAX_STAGE) as usize;
    SRS_INTERVAL_DAYS[idx]
}

/// Advance a flashcard's schedule by one review outcome.
///
/// On a pass the stage increments (capped at [`SRS_MAX_STAGE`]) and the next
/// review lands after that stage's interval. On a fail the stage decrements
/// (floored at 0) and the next review is the fixed one-day restart interval
/// regardless of the resulting stage. Stage 5 is a ceiling, not an exit;
/// cards are reviewed indefinitely.
pub fn advance(current_stage: i32, outcome: ReviewOutcome, now: DateTime<Utc>) -> NextReview {
    let current = current_stage.clamp(0, SRS_MAX_STAGE);
    match outcome {
        ReviewOutcome::Pass => {
            let stage = (current + 1).min(SRS_MAX_STAGE);
            NextReview {
                stage,
                next_review_at: now + Duration::days(interval_days(stage)),
            }
        }
        ReviewOutcome::Fail => {
            let stage = (current - 1).max(0);
            NextReview {
                stage,
                next_review_at: now + Duration::days(SRS_FAIL_INTERVAL_DAYS),
            }
        }
    }
}
