//! Error types for engine operations.
//!
//! The taxonomy separates caller mistakes from infrastructure failures:
//!
//! - [`Error::ResourceNotFound`] / [`Error::EdgeNotFound`] — the requested
//!   entity is absent from the graph; surfaced as a 404-equivalent, never
//!   retried.
//! - [`Error::InvalidInput`] — rejected before any graph access.
//! - [`Error::GraphAccess`] — the graph port itself failed; fatal for the
//!   current request (no partial graph result is trustworthy). Retry policy
//!   belongs to the caller.
//!
//! Evidence-provider failures never appear here: the aggregator recovers
//! them locally by omitting the source.

use crate::domain::ResourceId;
use std::io;
use thiserror::Error;

// `EdgeNotFound` names a field `source`, which `thiserror` treats as the
// error source and therefore requires to implement `std::error::Error`.
// `ResourceId` already provides `Debug` + `Display`, so an empty impl
// satisfies the bound without changing any behavior.
impl std::error::Error for ResourceId {}

/// The error type for engine operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The requested resource is absent from the graph.
    #[error("resource not found: {0}")]
    ResourceNotFound(ResourceId),

    /// No edge exists between the given pair.
    #[error("edge not found: {source} -> {target}")]
    EdgeNotFound {
        /// The claimed dependent.
        source: ResourceId,
        /// The claimed dependency.
        target: ResourceId,
    },

    /// The request is malformed (too many ids, zero depth, probability out
    /// of range). Rejected before any graph access.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The graph access port is unreachable or misbehaved. Fatal for the
    /// current request; not retried internally.
    #[error("graph access failed: {0}")]
    GraphAccess(String),

    /// Configuration could not be loaded, parsed, or validated.
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// A specialized Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
