//! Sentence-aware overlapping text splitting.
//!
//! Slides a fixed-size window across the corpus, preferring to cut at the
//! nearest sentence boundary inside a small trailing lookback so chunks do
//! not end mid-sentence. Consecutive windows overlap so model context is
//! preserved across chunk seams.

use tracing::debug;

use mnemo_core::defaults::CHUNK_BOUNDARY_LOOKBACK;

/// A bounded slice of a corpus, the unit of generation work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Position of this chunk in corpus order.
    pub index: usize,
    pub text: String,
}

/// Find a UTF-8 boundary at or before `pos`.
fn find_char_boundary_before(text: &str, mut pos: usize) -> usize {
    while pos > 0 && !text.is_char_boundary(pos) {
        pos -= 1;
    }
    pos
}

/// Split `text` into overlapping chunks of at most `max_size` bytes.
///
/// A corpus that already fits yields exactly one trimmed chunk. `overlap`
/// must be strictly less than `max_size`; equal or larger overlap would
/// stop the window from advancing.
pub fn split_text(text: &str, max_size: usize, overlap: usize) -> Vec<Chunk> {
    assert!(
        overlap < max_size,
        "chunk overlap ({}) must be strictly less than chunk size ({})",
        overlap,
        max_size
    );

    if text.len() <= max_size {
        return vec![Chunk {
            index: 0,
            text: text.trim().to_string(),
        }];
    }

    let mut chunks = Vec::new();
    let mut start = 0usize;

    while start < text.len() {
        let mut end = find_char_boundary_before(text, (start + max_size).min(text.len()));

        // Prefer a sentence boundary in the window's tail.
        if end < text.len() {
            let search_start =
                find_char_boundary_before(text, end.saturating_sub(CHUNK_BOUNDARY_LOOKBACK))
                    .max(start);
            if let Some(pos) = text[search_start..end].rfind(". ") {
                if pos > 0 {
                    end = search_start + pos + 2;
                }
            }
        }

        let piece = text[start..end].trim();
        if !piece.is_empty() {
            chunks.push(Chunk {
                index: chunks.len(),
                text: piece.to_string(),
            });
        }

        if end >= text.len() {
            break;
        }

        let next_start = find_char_boundary_before(text, end.saturating_sub(overlap));
        // A boundary cut very close to the window start could stall the
        // window; give up the overlap rather than loop.
        start = if next_start > start { next_start } else { end };
    }

    debug!(chunk_count = chunks.len(), corpus_len = text.len(), "Split corpus");
    chunks
}
