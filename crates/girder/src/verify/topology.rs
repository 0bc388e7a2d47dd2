//! Built-in topology evidence from the graph itself.
//!
//! The graph is a prior claim about the topology, so it participates in
//! verification as the network/topology source: a recorded edge (with its
//! decayed strength) is evidence, and a short indirect path is weaker
//! evidence of shared infrastructure. This is what keeps the aggregator's
//! contract intact when no external providers are configured.

use crate::domain::{DecayPolicy, EdgeKind, ResourceId};
use crate::graph::{EdgeDirection, GraphAccess};
use async_trait::async_trait;
use chrono::Utc;
use girder_evidence::{
    Evidence, EvidenceKind, EvidenceProvider, EvidenceSource, EvidenceWindow, ProviderError,
    ProviderResult,
};
use std::sync::Arc;

/// Confidence floor for a recorded direct edge.
const DIRECT_EDGE_BASE: f64 = 0.5;

/// Additional confidence for a full-strength direct edge.
const DIRECT_EDGE_SPAN: f64 = 0.4;

/// Confidence for an indirect (shared-infrastructure) path.
const INDIRECT_CONFIDENCE: f64 = 0.3;

/// Hop limit when looking for indirect paths.
const INDIRECT_MAX_DEPTH: u32 = 2;

/// Evidence provider backed by the graph port.
pub struct TopologyEvidenceProvider {
    graph: Arc<dyn GraphAccess>,
    decay: DecayPolicy,
}

impl TopologyEvidenceProvider {
    /// Create a provider over the given graph.
    #[must_use]
    pub fn new(graph: Arc<dyn GraphAccess>, decay: DecayPolicy) -> Self {
        Self { graph, decay }
    }
}

#[async_trait]
impl EvidenceProvider for TopologyEvidenceProvider {
    fn source(&self) -> EvidenceSource {
        EvidenceSource::NetworkTopology
    }

    async fn gather(
        &self,
        source_id: &str,
        target_id: &str,
        _window: EvidenceWindow,
    ) -> ProviderResult<Option<Evidence>> {
        let source = ResourceId::from(source_id);
        let target = ResourceId::from(target_id);

        let edges = self
            .graph
            .get_edges(&source, EdgeDirection::Outgoing)
            .await
            .map_err(|e| ProviderError::Backend(e.to_string()))?;

        if let Some(edge) = edges
            .iter()
            .find(|e| e.kind == EdgeKind::DependsOn && e.target_id == target)
        {
            let strength = edge.strength_at(Utc::now(), &self.decay);
            let confidence = DIRECT_EDGE_BASE + DIRECT_EDGE_SPAN * strength;
            let evidence = Evidence::new(
                EvidenceSource::NetworkTopology,
                EvidenceKind::TopologyLink,
                confidence,
            )
            .with_item(format!(
                "dependency edge on record ({:?}), last confirmed {}",
                edge.discovered_method,
                edge.last_confirmed_at.format("%Y-%m-%d")
            ))
            .with_metadata("effective_strength", serde_json::json!(strength));
            return Ok(Some(evidence));
        }

        // No direct edge: a short dependency path still suggests shared
        // infrastructure between the pair.
        let paths = self
            .graph
            .find_reachable(&source, EdgeKind::DependsOn, INDIRECT_MAX_DEPTH)
            .await
            .map_err(|e| ProviderError::Backend(e.to_string()))?;

        if let Some(path) = paths.iter().find(|p| p.last() == Some(&target)) {
            let hops = path.len() - 1;
            let described: Vec<String> = path.iter().map(ToString::to_string).collect();
            let evidence = Evidence::new(
                EvidenceSource::NetworkTopology,
                EvidenceKind::SharedInfrastructure,
                INDIRECT_CONFIDENCE,
            )
            .with_item(format!(
                "indirect dependency path ({} hops): {}",
                hops,
                described.join(" -> ")
            ));
            return Ok(Some(evidence));
        }

        Ok(None)
    }
}
