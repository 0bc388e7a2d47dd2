//! Error types for evidence providers.
//!
//! Provider failures are **recoverable by contract**: the aggregator that
//! dispatches to providers treats any of these errors as "this source found
//! nothing" and omits the evidence. They exist as distinct variants so the
//! omission can be logged with a meaningful cause.

use thiserror::Error;

/// Errors that an evidence provider may report.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider did not respond within its allotted time.
    #[error("provider timed out after {elapsed_ms}ms")]
    Timeout {
        /// Milliseconds elapsed before the call was abandoned.
        elapsed_ms: u64,
    },

    /// The backing system (metrics store, trace store, config inspector)
    /// is unreachable or rejected the request.
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    /// The backing system responded but the response could not be used.
    #[error("provider backend error: {0}")]
    Backend(String),
}

/// Result type for evidence-provider operations.
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;
