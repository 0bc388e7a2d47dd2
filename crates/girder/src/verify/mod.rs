//! Evidence aggregation: is a claimed dependency real?
//!
//! The aggregator fans a gather request out to every registered evidence
//! provider concurrently, each call wrapped in its own timeout, and scores
//! whatever comes back. Providers that error, time out, or find nothing are
//! simply omitted — the evidence count (and with it the score) drops, but a
//! verification request never fails because a provider did.
//!
//! # Scoring
//!
//! - At most one evidence item is kept per source class (the most
//!   confident), so the count tier `base(n)` is over independent sources:
//!   `{0: 0.0, 1: 0.50, 2: 0.70, 3: 0.85, 4: 1.0}`.
//! - `overall_confidence` is the reliability-weighted mean of the kept
//!   evidence confidences.
//! - `verification_score = base(n) × overall_confidence`, and the edge
//!   counts as verified at or above the configured threshold (0.6).
//!
//! A built-in topology provider reading the graph port always participates,
//! so an aggregator with zero external providers still produces a degraded
//! but non-empty result.
//!
//! # Side effects
//!
//! Verification is read/compute only, with one exception: a *verified*
//! outcome confirms the edge through an idempotent upsert (strength =
//! verification score, decay clock re-anchored). Cancelling the `verify`
//! future cancels all outstanding provider calls; nothing partial is kept.

mod topology;

pub use topology::TopologyEvidenceProvider;

use crate::config::VerificationConfig;
use crate::domain::{
    DecayPolicy, DependencyEdge, DiscoveryMethod, EdgeKind, ResourceId,
};
use crate::error::{Error, Result};
use crate::graph::{EdgeDirection, GraphAccess};
use chrono::Utc;
use futures::future::join_all;
use girder_evidence::{Evidence, EvidenceProvider, EvidenceSource, EvidenceWindow};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

/// Outcome of verifying one candidate dependency edge.
///
/// Derived and recomputed on demand; only the confirmation upsert (on a
/// verified outcome) outlives the call.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VerificationResult {
    /// The claimed dependent.
    pub source_id: ResourceId,

    /// The claimed dependency.
    pub target_id: ResourceId,

    /// Whether the verification score met the threshold.
    pub is_verified: bool,

    /// Reliability-weighted mean confidence over the kept evidence,
    /// in `[0, 1]`.
    pub overall_confidence: f64,

    /// `base(n) × overall_confidence`, in `[0, 1]`.
    pub verification_score: f64,

    /// The kept evidence, most reliable source first.
    pub evidence: Vec<Evidence>,

    /// Why confidence is what it is, and what would raise it.
    pub recommendations: Vec<String>,
}

/// Multi-source evidence aggregation over the graph port.
pub struct EvidenceAggregator {
    graph: Arc<dyn GraphAccess>,
    providers: Vec<Arc<dyn EvidenceProvider>>,
    config: VerificationConfig,
}

impl EvidenceAggregator {
    /// Create an aggregator with the built-in topology provider registered.
    #[must_use]
    pub fn new(graph: Arc<dyn GraphAccess>, config: VerificationConfig, decay: DecayPolicy) -> Self {
        let topology: Arc<dyn EvidenceProvider> =
            Arc::new(TopologyEvidenceProvider::new(Arc::clone(&graph), decay));
        Self {
            graph,
            providers: vec![topology],
            config,
        }
    }

    /// Register an additional evidence provider.
    #[must_use]
    pub fn with_provider(mut self, provider: Arc<dyn EvidenceProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Number of registered providers (including the built-in one).
    #[must_use]
    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }

    /// Verify the claimed dependency `source -> target`.
    ///
    /// # Errors
    ///
    /// Returns `Error::ResourceNotFound` if either endpoint is absent and
    /// `Error::InvalidInput` if source and target are the same resource.
    /// Provider failures are recovered, never surfaced.
    pub async fn verify(
        &self,
        source_id: &ResourceId,
        target_id: &ResourceId,
        window: Option<EvidenceWindow>,
    ) -> Result<VerificationResult> {
        if source_id == target_id {
            return Err(Error::InvalidInput(
                "a resource cannot depend on itself".to_string(),
            ));
        }
        self.graph.get_resource(source_id).await?;
        self.graph.get_resource(target_id).await?;

        let window =
            window.unwrap_or_else(|| EvidenceWindow::hours(self.config.default_window_hours));
        let gathered = self.gather_all(source_id, target_id, window).await;
        let evidence = keep_best_per_source(gathered);

        let overall_confidence = combined_confidence(&evidence);
        let verification_score = base_score(evidence.len()) * overall_confidence;
        let is_verified = verification_score >= self.config.verified_threshold;

        let recommendations = build_recommendations(&evidence, verification_score, is_verified);

        if is_verified {
            self.confirm_edge(source_id, target_id, verification_score)
                .await?;
        }

        Ok(VerificationResult {
            source_id: source_id.clone(),
            target_id: target_id.clone(),
            is_verified,
            overall_confidence,
            verification_score,
            evidence,
            recommendations,
        })
    }

    /// Scatter the gather request across all providers, each with its own
    /// timeout, and collect whatever returns.
    async fn gather_all(
        &self,
        source_id: &ResourceId,
        target_id: &ResourceId,
        window: EvidenceWindow,
    ) -> Vec<Evidence> {
        let budget = Duration::from_secs(self.config.provider_timeout_secs);

        let calls = self.providers.iter().map(|provider| {
            let provider = Arc::clone(provider);
            let source = source_id.as_str().to_string();
            let target = target_id.as_str().to_string();
            async move {
                let class = provider.source();
                let outcome = timeout(budget, provider.gather(&source, &target, window)).await;
                (class, outcome)
            }
        });

        let mut evidence = Vec::new();
        for (class, outcome) in join_all(calls).await {
            match outcome {
                Ok(Ok(Some(found))) => evidence.push(found),
                Ok(Ok(None)) => {
                    tracing::debug!(source = class.display_name(), "provider found no evidence");
                }
                Ok(Err(error)) => {
                    tracing::warn!(
                        source = class.display_name(),
                        %error,
                        "evidence provider failed; omitting source"
                    );
                }
                Err(_) => {
                    tracing::warn!(
                        source = class.display_name(),
                        timeout_secs = self.config.provider_timeout_secs,
                        "evidence provider timed out; omitting source"
                    );
                }
            }
        }
        evidence
    }

    /// Confirm a verified edge with an idempotent upsert. An existing
    /// DEPENDS_ON edge keeps its category and dependency type; a new edge
    /// is recorded as discovered by verification.
    async fn confirm_edge(
        &self,
        source_id: &ResourceId,
        target_id: &ResourceId,
        verification_score: f64,
    ) -> Result<()> {
        let existing = self
            .graph
            .get_edges(source_id, EdgeDirection::Outgoing)
            .await?
            .into_iter()
            .find(|e| e.kind == EdgeKind::DependsOn && &e.target_id == target_id);

        let edge = match existing {
            Some(mut edge) => {
                edge.strength = verification_score;
                edge.discovered_method = DiscoveryMethod::Verification;
                edge.last_confirmed_at = Utc::now();
                edge
            }
            None => DependencyEdge::depends_on(source_id.clone(), target_id.clone(), verification_score)
                .with_discovered_method(DiscoveryMethod::Verification),
        };
        self.graph.upsert_edge(edge).await
    }
}

/// Evidence-source count tier.
///
/// One source alone can never verify an edge (0.5 × any confidence is
/// below the 0.6 threshold); four independent sources count as full
/// corroboration.
fn base_score(source_count: usize) -> f64 {
    match source_count {
        0 => 0.0,
        1 => 0.50,
        2 => 0.70,
        3 => 0.85,
        _ => 1.0,
    }
}

/// Keep the most confident evidence per source class, ordered most
/// reliable source first.
fn keep_best_per_source(gathered: Vec<Evidence>) -> Vec<Evidence> {
    let mut best: HashMap<EvidenceSource, Evidence> = HashMap::new();
    for evidence in gathered {
        match best.get(&evidence.source) {
            Some(kept) if kept.confidence >= evidence.confidence => {}
            _ => {
                best.insert(evidence.source, evidence);
            }
        }
    }
    let mut kept: Vec<Evidence> = best.into_values().collect();
    kept.sort_by(|a, b| {
        b.weight()
            .partial_cmp(&a.weight())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    kept
}

/// Reliability-weighted mean confidence; zero for no evidence.
fn combined_confidence(evidence: &[Evidence]) -> f64 {
    let weight_sum: f64 = evidence.iter().map(Evidence::weight).sum();
    if weight_sum <= 0.0 {
        return 0.0;
    }
    let weighted: f64 = evidence.iter().map(|e| e.confidence * e.weight()).sum();
    (weighted / weight_sum).clamp(0.0, 1.0)
}

fn build_recommendations(
    evidence: &[Evidence],
    verification_score: f64,
    is_verified: bool,
) -> Vec<String> {
    let mut recommendations = Vec::new();

    if evidence.is_empty() {
        recommendations.push(
            "no supporting evidence found in any source; confirm the dependency manually"
                .to_string(),
        );
    }
    for source in EvidenceSource::ALL {
        if !evidence.iter().any(|e| e.source == source) {
            recommendations.push(format!(
                "no {} evidence available; wiring up that source would raise confidence",
                source.display_name()
            ));
        }
    }
    if is_verified {
        recommendations.push(format!(
            "dependency corroborated by {} independent source(s)",
            evidence.len()
        ));
    } else if !evidence.is_empty() {
        recommendations.push(format!(
            "verification score {verification_score:.2} is below the threshold; treat the dependency as unconfirmed"
        ));
    }

    recommendations
}
