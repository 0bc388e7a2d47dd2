//! The evidence value object and its source/kind vocabulary.
//!
//! A single [`Evidence`] is one independent signal supporting (or weakly
//! supporting) a claimed dependency between two resources. Evidence is
//! immutable once constructed and is never persisted on its own — only the
//! aggregated verification result that carries it is retained.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which class of system produced a piece of evidence.
///
/// Each source carries a fixed reliability weight reflecting how strongly a
/// positive signal from that source class correlates with a real dependency.
/// Weights are part of the public contract and are documented per variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceSource {
    /// Network/topology inspection (routing tables, backend pools, security
    /// group references). Weight 0.90.
    NetworkTopology,

    /// Distributed-trace analysis (spans crossing the pair). Weight 0.85.
    Trace,

    /// Deployment/configuration inspection (connection strings, environment
    /// references). Weight 0.80.
    Configuration,

    /// Traffic-metrics correlation (request volume between the pair).
    /// Weight 0.75.
    Metrics,
}

impl EvidenceSource {
    /// All source classes, in descending reliability order.
    pub const ALL: [EvidenceSource; 4] = [
        Self::NetworkTopology,
        Self::Trace,
        Self::Configuration,
        Self::Metrics,
    ];

    /// Fixed reliability weight for this source class.
    ///
    /// Used when combining confidence across sources; it never influences
    /// the evidence-count tier of the verification score.
    #[must_use]
    pub fn reliability_weight(self) -> f64 {
        match self {
            Self::NetworkTopology => 0.90,
            Self::Trace => 0.85,
            Self::Configuration => 0.80,
            Self::Metrics => 0.75,
        }
    }

    /// Human-readable name used in recommendations.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::NetworkTopology => "network topology",
            Self::Trace => "distributed trace",
            Self::Configuration => "configuration",
            Self::Metrics => "traffic metrics",
        }
    }
}

/// What a piece of evidence demonstrates about the candidate edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceKind {
    /// A network-level link exists (address in a backend pool, open route).
    TopologyLink,

    /// Observed traffic flows between the pair.
    TrafficFlow,

    /// Source configuration references the target.
    ConfigReference,

    /// Trace spans cross from source to target.
    TraceSpan,

    /// The pair shares infrastructure implying a dependency.
    SharedInfrastructure,
}

/// One independent signal about a claimed dependency edge.
///
/// `confidence` is clamped into `[0, 1]` at construction; `items` holds
/// human-readable descriptions of what was matched (for explainability
/// only — items never influence scoring).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Evidence {
    /// The source class that produced this signal.
    pub source: EvidenceSource,

    /// What the signal demonstrates.
    pub kind: EvidenceKind,

    /// Provider-reported confidence in `[0, 1]`.
    pub confidence: f64,

    /// Human-readable descriptions of what was matched,
    /// e.g. `"target IP found in source's backend pool"`.
    pub items: Vec<String>,

    /// Provider-specific details (span counts, sampled windows, ...).
    pub metadata: BTreeMap<String, serde_json::Value>,

    /// When the underlying observation was made.
    pub observed_at: DateTime<Utc>,
}

impl Evidence {
    /// Create evidence with the given source, kind, and confidence.
    ///
    /// Confidence is clamped into `[0, 1]`; NaN is treated as zero.
    #[must_use]
    pub fn new(source: EvidenceSource, kind: EvidenceKind, confidence: f64) -> Self {
        Self {
            source,
            kind,
            confidence: clamp_unit(confidence),
            items: Vec::new(),
            metadata: BTreeMap::new(),
            observed_at: Utc::now(),
        }
    }

    /// Append a matched-item description.
    #[must_use]
    pub fn with_item(mut self, item: impl Into<String>) -> Self {
        self.items.push(item.into());
        self
    }

    /// Attach a provider-specific metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Override the observation timestamp (providers reporting historical
    /// observations).
    #[must_use]
    pub fn observed_at(mut self, at: DateTime<Utc>) -> Self {
        self.observed_at = at;
        self
    }

    /// This evidence's contribution weight when combining confidence.
    #[must_use]
    pub fn weight(&self) -> f64 {
        self.source.reliability_weight()
    }
}

/// Clamp a raw confidence value into `[0, 1]`, mapping NaN to zero.
fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
