//! Cascading-failure modeling.
//!
//! A deliberately simple, explainable model: level k of the cascade carries
//! probability `initial × factor^k` (geometric decay, the factor modeling
//! circuit breakers, retries, and fallbacks), and the affected set at level
//! k is the unvisited dependents of level k−1. No randomness is involved —
//! results are deterministic and reproducible for identical graph
//! snapshots.

use crate::config::CascadeConfig;
use crate::domain::{EdgeKind, ResourceId, ResourceRef};
use crate::error::{Error, Result};
use crate::graph::{EdgeDirection, GraphAccess};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// Why the cascade stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// Level probability fell below the configured floor.
    ProbabilityFloor,

    /// The depth limit was reached.
    MaxDepth,

    /// No unvisited dependents remained.
    Exhausted,
}

/// One level of failure propagation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CascadeLevel {
    /// Distance from the initially failing resource (1 = direct dependents).
    pub level: u32,

    /// Failure probability at this level, in `[0, 1]`.
    pub probability: f64,

    /// Resources reached at this level.
    pub affected: Vec<ResourceRef>,
}

/// Result of a cascading-failure simulation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CascadeResult {
    /// The initially failing resource.
    pub resource_id: ResourceId,

    /// Probability assigned to the initial failure.
    pub initial_probability: f64,

    /// Per-level propagation factor used.
    pub propagation_factor: f64,

    /// Ordered cascade levels (may be empty when nothing depends on the
    /// resource).
    pub levels: Vec<CascadeLevel>,

    /// `Σ probability_k × |affected_k|` over all levels.
    pub expected_failures: f64,

    /// Why the cascade stopped.
    pub terminated_by: TerminationReason,
}

/// Cascading-failure modeling over the graph port.
pub struct CascadeModeler {
    graph: Arc<dyn GraphAccess>,
    config: CascadeConfig,
}

impl CascadeModeler {
    /// Create a modeler with default cascade configuration.
    #[must_use]
    pub fn new(graph: Arc<dyn GraphAccess>) -> Self {
        Self {
            graph,
            config: CascadeConfig::default(),
        }
    }

    /// Create a modeler with an explicit cascade configuration.
    #[must_use]
    pub fn with_config(graph: Arc<dyn GraphAccess>, config: CascadeConfig) -> Self {
        Self { graph, config }
    }

    /// Model the failure cascade from `id`.
    ///
    /// `initial_probability` defaults to 1.0 (the resource has failed);
    /// `max_depth` defaults to the configured depth.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` for a probability outside `[0, 1]` or
    /// a zero depth, `Error::ResourceNotFound` for an unknown id.
    pub async fn cascade(
        &self,
        id: &ResourceId,
        initial_probability: Option<f64>,
        max_depth: Option<u32>,
    ) -> Result<CascadeResult> {
        let initial = initial_probability.unwrap_or(1.0);
        if initial.is_nan() || !(0.0..=1.0).contains(&initial) {
            return Err(Error::InvalidInput(format!(
                "initial probability must be in [0, 1], got {initial}"
            )));
        }
        let max_depth = max_depth.unwrap_or(self.config.max_depth);
        if max_depth == 0 {
            return Err(Error::InvalidInput("cascade depth must be at least 1".to_string()));
        }

        self.graph.get_resource(id).await?;

        let factor = self.config.propagation_factor;
        let mut visited: HashSet<ResourceId> = HashSet::from([id.clone()]);
        let mut frontier = self.dependents_of(id, &mut visited).await?;

        let mut levels = Vec::new();
        let mut expected_failures = 0.0;
        let mut terminated_by = TerminationReason::MaxDepth;

        for level in 1..=max_depth {
            if frontier.is_empty() {
                terminated_by = TerminationReason::Exhausted;
                break;
            }
            let probability = initial * factor.powi(level as i32);
            if probability < self.config.min_probability {
                terminated_by = TerminationReason::ProbabilityFloor;
                break;
            }

            let mut affected = Vec::with_capacity(frontier.len());
            for affected_id in &frontier {
                let resource = self.graph.get_resource(affected_id).await?;
                affected.push(ResourceRef::of(&resource));
            }
            expected_failures += probability * affected.len() as f64;
            levels.push(CascadeLevel {
                level,
                probability,
                affected,
            });

            let mut next = Vec::new();
            for current in &frontier {
                next.extend(self.dependents_of(current, &mut visited).await?);
            }
            frontier = next;
        }

        Ok(CascadeResult {
            resource_id: id.clone(),
            initial_probability: initial,
            propagation_factor: factor,
            levels,
            expected_failures,
            terminated_by,
        })
    }

    /// Unvisited direct dependents of `id`, marking them visited.
    async fn dependents_of(
        &self,
        id: &ResourceId,
        visited: &mut HashSet<ResourceId>,
    ) -> Result<Vec<ResourceId>> {
        let edges = self.graph.get_edges(id, EdgeDirection::Incoming).await?;
        Ok(edges
            .into_iter()
            .filter(|e| e.kind == EdgeKind::DependsOn)
            .map(|e| e.source_id)
            .filter(|dependent| visited.insert(dependent.clone()))
            .collect())
    }
}
