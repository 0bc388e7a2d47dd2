//! In-memory graph backend using HashMap and petgraph.
//!
//! A fast, **ephemeral** implementation of [`crate::graph::GraphAccess`]
//! where the whole graph is held in RAM. It is suitable for:
//!
//! - Testing the engine against known topologies
//! - Embedding the engine in a process that already holds a graph snapshot
//! - Serving as the reference implementation of the port contract
//!
//! # Architecture
//!
//! - `HashMap<ResourceId, Resource>` for O(1) resource lookups
//! - `petgraph::DiGraph` holding one node per resource and one edge per
//!   `(source, target, kind)` triple
//! - `HashMap<ResourceId, NodeIndex>` mapping ids to graph nodes
//!
//! Edge direction follows the engine-wide convention: source (dependent)
//! -> target (dependency). Upserts locate an existing edge of the same kind
//! between the pair and overwrite its weight in place, so re-verification
//! can never produce parallel duplicate edges.
//!
//! # Ingestion
//!
//! [`InMemoryGraph::insert_resource`] runs the tag-rule inference
//! (`domain::tag_rules`) before storing, so environment/criticality are
//! typed attributes by the time any analysis reads them.
//!
//! # Thread Safety
//!
//! State lives in `Arc<Mutex<_>>`; all port operations lock for the
//! duration of the call. Cloning the handle shares the same graph.

mod inner;
mod trait_impl;

use crate::domain::{tag_rules, DependencyEdge, Resource};
use crate::error::Result;
use inner::InMemoryGraphInner;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handle to an in-memory resource graph.
///
/// Cheap to clone; clones share the same underlying graph.
#[derive(Clone)]
pub struct InMemoryGraph {
    inner: Arc<Mutex<InMemoryGraphInner>>,
}

impl InMemoryGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(InMemoryGraphInner::new())),
        }
    }

    /// Insert (or replace) a resource, running tag-rule attribute inference
    /// first.
    ///
    /// Replacing an existing resource keeps its edges.
    pub async fn insert_resource(&self, mut resource: Resource) {
        tag_rules::apply(&resource.tags, &mut resource.attributes);
        let mut inner = self.inner.lock().await;
        inner.insert_resource(resource);
    }

    /// Insert several resources at once.
    pub async fn insert_resources(&self, resources: impl IntoIterator<Item = Resource>) {
        let mut inner = self.inner.lock().await;
        for mut resource in resources {
            tag_rules::apply(&resource.tags, &mut resource.attributes);
            inner.insert_resource(resource);
        }
    }

    /// Insert or overwrite an edge. Exposed for seeding; the port's
    /// `upsert_edge` goes through the same code path.
    ///
    /// # Errors
    ///
    /// Returns `Error::ResourceNotFound` if either endpoint is absent.
    pub async fn insert_edge(&self, edge: DependencyEdge) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner.upsert_edge(edge)
    }

    /// Number of resources currently in the graph.
    pub async fn resource_count(&self) -> usize {
        self.inner.lock().await.resource_count()
    }

    pub(crate) async fn lock(&self) -> tokio::sync::MutexGuard<'_, InMemoryGraphInner> {
        self.inner.lock().await
    }
}

impl Default for InMemoryGraph {
    fn default() -> Self {
        Self::new()
    }
}
