//! Ordered fallback chains over polymorphic text sources.
//!
//! Every acquisition path (static page, rendering reader, transcript
//! providers) implements [`TextSource`]; [`run_chain`] owns the shared
//! try / length-check / fall-through control shape so no source duplicates
//! it. Sources are tried strictly in order and the first result at or above
//! the minimum length wins; per-source failures are absorbed and logged.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use mnemo_core::{Error, Result};

/// A single acquisition strategy that may yield a text corpus.
#[async_trait]
pub trait TextSource: Send + Sync {
    /// Strategy name for logging.
    fn name(&self) -> &str;

    /// Attempt to acquire text. Length gating belongs to the chain driver,
    /// not the source; a source returns whatever it found.
    async fn try_acquire(&self, cancel: &CancellationToken) -> Result<String>;
}

/// Run an ordered chain of sources, returning the first result whose length
/// reaches `min_length`.
///
/// Cancellation is observed between sources and during each source's
/// in-flight work. Exhaustion yields [`Error::AcquisitionExhausted`];
/// callers with a more specific vocabulary (the transcript chain) remap it.
pub async fn run_chain(
    sources: &[&dyn TextSource],
    min_length: usize,
    cancel: &CancellationToken,
) -> Result<String> {
    for source in sources {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            res = source.try_acquire(cancel) => res,
        };

        match outcome {
            Ok(text) if text.len() >= min_length => {
                debug!(
                    strategy = source.name(),
                    content_len = text.len(),
                    "Strategy produced sufficient content"
                );
                return Ok(text);
            }
            Ok(text) => {
                warn!(
                    strategy = source.name(),
                    content_len = text.len(),
                    min_length,
                    "Content below minimum length, falling through"
                );
            }
            Err(Error::Cancelled) => return Err(Error::Cancelled),
            Err(e) => {
                warn!(
                    strategy = source.name(),
                    error = %e,
                    "Strategy failed, falling through"
                );
            }
        }
    }

    Err(Error::AcquisitionExhausted(format!(
        "all {} strategies failed or returned insufficient content",
        sources.len()
    )))
}
