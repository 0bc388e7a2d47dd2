//! Pure graph algorithms over the dependency graph.
//!
//! The analyzer owns no state beyond a handle to the graph port; every
//! operation is a pure function of the graph snapshot it reads. Operations:
//!
//! - [`DependencyAnalyzer::detect_cycles`] — simple-cycle enumeration with
//!   canonical deduplication
//! - [`DependencyAnalyzer::blast_radius`] — downstream impact traversal
//! - [`DependencyAnalyzer::is_spof`] — single-point-of-failure detection
//! - [`DependencyAnalyzer::health`] — composite dependency health score

mod cycles;
mod health;
mod impact;

pub use cycles::Cycle;
pub use health::{DependencyHealth, HealthDeduction, HealthFactor, HealthLevel};
pub use impact::{AffectedResource, ImpactAnalysis, ImpactSeverity};

use crate::config::ImpactConfig;
use crate::domain::{EdgeKind, ResourceId};
use crate::error::{Error, Result};
use crate::graph::{EdgeDirection, GraphAccess};
use std::sync::Arc;

/// Bound on dependency-tree depth probes. Deeper chains are reported as
/// this depth; real graphs never approach it.
const MAX_TREE_DEPTH_PROBE: u32 = 25;

/// Graph analyses over the [`GraphAccess`] port.
pub struct DependencyAnalyzer {
    graph: Arc<dyn GraphAccess>,
    impact: ImpactConfig,
}

impl DependencyAnalyzer {
    /// Create an analyzer with default impact configuration.
    #[must_use]
    pub fn new(graph: Arc<dyn GraphAccess>) -> Self {
        Self {
            graph,
            impact: ImpactConfig::default(),
        }
    }

    /// Create an analyzer with an explicit impact configuration.
    #[must_use]
    pub fn with_impact_config(graph: Arc<dyn GraphAccess>, impact: ImpactConfig) -> Self {
        Self { graph, impact }
    }

    /// Enumerate simple dependency cycles.
    ///
    /// With a scope id, only cycles containing that resource are returned
    /// (and the resource must exist); without one, the whole graph is
    /// searched. Each cycle is canonicalized by rotation to its
    /// lexicographically smallest member and the set is deduplicated, so
    /// repeated runs on an unchanged graph return identical results.
    ///
    /// # Errors
    ///
    /// Returns `Error::ResourceNotFound` for an unknown scope id.
    pub async fn detect_cycles(&self, scope: Option<&ResourceId>) -> Result<Vec<Cycle>> {
        if let Some(id) = scope {
            // Validate the scope before doing graph-wide work.
            self.graph.get_resource(id).await?;
        }
        let mut found = cycles::enumerate(self.graph.as_ref()).await?;
        if let Some(id) = scope {
            found.retain(|cycle| cycle.contains(id));
        }
        Ok(found)
    }

    /// Downstream impact of this resource failing, to `max_depth` hops
    /// (engine default when `None`).
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` for a zero depth and
    /// `Error::ResourceNotFound` for an unknown id.
    pub async fn blast_radius(
        &self,
        id: &ResourceId,
        max_depth: Option<u32>,
    ) -> Result<ImpactAnalysis> {
        let depth = max_depth.unwrap_or(self.impact.default_max_depth);
        if depth == 0 {
            return Err(Error::InvalidInput(
                "blast radius depth must be at least 1".to_string(),
            ));
        }
        let depth = depth.min(self.impact.max_depth_limit);
        impact::blast_radius(self.graph.as_ref(), id, depth).await
    }

    /// Whether this resource is a single point of failure: it has at least
    /// one dependent and no redundancy relation.
    ///
    /// # Errors
    ///
    /// Returns `Error::ResourceNotFound` for an unknown id.
    pub async fn is_spof(&self, id: &ResourceId) -> Result<bool> {
        let incoming = self.graph.get_edges(id, EdgeDirection::Incoming).await?;
        let has_dependents = incoming.iter().any(|e| e.kind == EdgeKind::DependsOn);
        if !has_dependents {
            return Ok(false);
        }

        let all = self.graph.get_edges(id, EdgeDirection::Both).await?;
        let has_redundancy = all.iter().any(|e| e.kind == EdgeKind::RedundantWith);
        Ok(!has_redundancy)
    }

    /// Composite dependency-health score for this resource.
    ///
    /// # Errors
    ///
    /// Returns `Error::ResourceNotFound` for an unknown id.
    pub async fn health(&self, id: &ResourceId) -> Result<DependencyHealth> {
        self.graph.get_resource(id).await?;

        let outgoing = self.graph.get_edges(id, EdgeDirection::Outgoing).await?;
        let dependencies: Vec<ResourceId> = outgoing
            .iter()
            .filter(|e| e.kind == EdgeKind::DependsOn)
            .map(|e| e.target_id.clone())
            .collect();

        let cycle_count = self.detect_cycles(Some(id)).await?.len();

        // One batched pass over the dependency set; no per-dependency
        // round trips beyond the edge fetch itself.
        let mut spof_dependencies = 0usize;
        for dep in &dependencies {
            if self.is_spof(dep).await? {
                spof_dependencies += 1;
            }
        }

        let max_depth = self.dependency_tree_depth(id).await?;

        Ok(health::score(
            id.clone(),
            dependencies.len(),
            cycle_count,
            spof_dependencies,
            max_depth,
        ))
    }

    /// Depth of the dependency tree below `id` (0 for a leaf).
    ///
    /// # Errors
    ///
    /// Returns `Error::ResourceNotFound` for an unknown id.
    pub async fn dependency_tree_depth(&self, id: &ResourceId) -> Result<u32> {
        let paths = self
            .graph
            .find_reachable(id, EdgeKind::DependsOn, MAX_TREE_DEPTH_PROBE)
            .await?;
        Ok(paths
            .iter()
            .map(|p| (p.len().saturating_sub(1)) as u32)
            .max()
            .unwrap_or(0))
    }
}
