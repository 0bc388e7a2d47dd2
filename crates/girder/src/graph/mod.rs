//! Graph access port.
//!
//! The engine never assumes a particular graph store or query language; it
//! consumes a graph through the [`GraphAccess`] trait and requires only the
//! capabilities below. The [`in_memory`] backend is the reference
//! implementation of the contract, used for tests and embedding.
//!
//! # Edge Direction Convention
//!
//! Edges point from **dependent to dependency**: `source -> target` means
//! *source depends on target*.
//!
//! - "What does X depend on?" — outgoing edges of X
//! - "What depends on X?" (dependents, blast radius) — incoming edges of X
//!
//! # Concurrency
//!
//! Reads must be safe under concurrent access. The only write the engine
//! issues is [`GraphAccess::upsert_edge`], which must be idempotent and
//! convergent: applying the same upsert twice, or two racing upserts with
//! last-write-wins, leaves the graph in an acceptable state.

pub mod in_memory;

pub use in_memory::InMemoryGraph;

use crate::domain::{DependencyEdge, EdgeKind, Resource, ResourceId};
use crate::error::Result;
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Which edges of a resource to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EdgeDirection {
    /// Edges where the resource is the dependent (its dependencies).
    Outgoing,

    /// Edges where the resource is the dependency (its dependents).
    Incoming,

    /// Both directions.
    Both,
}

/// Read (plus one idempotent write) interface over the resource graph.
///
/// Implementations must be `Send + Sync`; the trait is object-safe and the
/// engine holds it as `Arc<dyn GraphAccess>`.
///
/// # Errors
///
/// Implementations map lookups of absent resources to
/// [`crate::Error::ResourceNotFound`] and infrastructure failures to
/// [`crate::Error::GraphAccess`]. The engine treats the latter as fatal for
/// the current request and never retries internally.
#[async_trait]
pub trait GraphAccess: Send + Sync {
    /// Fetch a resource by id.
    ///
    /// # Errors
    ///
    /// Returns `Error::ResourceNotFound` if the id is absent.
    async fn get_resource(&self, id: &ResourceId) -> Result<Resource>;

    /// Fetch the edges touching a resource in the given direction.
    ///
    /// Returns an empty vector for a resource with no edges; absence of the
    /// resource itself is `Error::ResourceNotFound`.
    async fn get_edges(&self, id: &ResourceId, direction: EdgeDirection)
        -> Result<Vec<DependencyEdge>>;

    /// Insert or overwrite the edge identified by
    /// `(source_id, target_id, kind)`.
    ///
    /// Must be idempotent: re-applying the same edge is a no-op apart from
    /// refreshed fields, and concurrent upserts converge (last write wins).
    ///
    /// # Errors
    ///
    /// Returns `Error::ResourceNotFound` if either endpoint is absent.
    async fn upsert_edge(&self, edge: DependencyEdge) -> Result<()>;

    /// Paths from `id` outward along edges of `kind`, up to `max_depth`
    /// hops. Each returned path starts at `id` and ends at a reachable
    /// resource; every reachable resource appears in exactly one path (the
    /// first discovered, i.e. a shortest one).
    async fn find_reachable(
        &self,
        id: &ResourceId,
        kind: EdgeKind,
        max_depth: u32,
    ) -> Result<Vec<Vec<ResourceId>>>;

    /// All resource ids currently in the graph.
    ///
    /// Needed by graph-wide analyses (unscoped cycle detection); stores
    /// with very large graphs may bound this however they document.
    async fn list_resources(&self) -> Result<Vec<ResourceId>>;
}
