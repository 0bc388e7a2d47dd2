//! The evidence provider port.
//!
//! A provider wraps one observability or configuration system and answers a
//! single question: "within this window, did you observe anything suggesting
//! that `source_id` depends on `target_id`?"
//!
//! # Contract
//!
//! - `Ok(Some(evidence))` — the provider found a signal. Confidence is the
//!   provider's own judgement; the caller applies the source reliability
//!   weight on top.
//! - `Ok(None)` — the provider looked and found nothing. This is a normal
//!   outcome, not an error.
//! - `Err(_)` — the backing system failed. Callers recover by omitting the
//!   source; a provider error must never fail a verification.
//!
//! Implementations must be cancellation-safe: the caller may drop the
//! `gather` future at any time (timeout or request cancellation) and no
//! partial state may leak.

use crate::error::ProviderResult;
use crate::evidence::{Evidence, EvidenceSource};
use crate::window::EvidenceWindow;
use async_trait::async_trait;

/// Port implemented by each evidence source.
///
/// Implementations must be `Send + Sync` so the aggregator can fan out to
/// all providers concurrently from async tasks.
#[async_trait]
pub trait EvidenceProvider: Send + Sync {
    /// The source class of this provider, which fixes its reliability weight.
    fn source(&self) -> EvidenceSource;

    /// Look for a signal that `source_id` depends on `target_id` within the
    /// given observation window.
    ///
    /// Resource identifiers are passed as plain strings: this crate is
    /// deliberately ignorant of the engine's resource model so providers can
    /// be written against it without pulling in the whole engine.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::ProviderError`] when the backing system is
    /// unreachable or misbehaves. Callers treat any error as "no evidence
    /// from this source".
    async fn gather(
        &self,
        source_id: &str,
        target_id: &str,
        window: EvidenceWindow,
    ) -> ProviderResult<Option<Evidence>>;
}
