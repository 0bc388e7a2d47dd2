//! Composite risk scoring.
//!
//! The risk score combines graph shape (dependency count), resource
//! metadata (criticality, historical failure rate), and maintenance signals
//! (recency of last change, test coverage) into a single `[0, 100]` number.
//! Each factor is normalized to `[0, 100]` independently before weighting;
//! a missing factor contributes zero, never an error.

use crate::analyzer::DependencyAnalyzer;
use crate::domain::{Criticality, EdgeKind, Resource, ResourceId};
use crate::error::{Error, Result};
use crate::graph::{EdgeDirection, GraphAccess};
use chrono::Utc;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Factor weights. Positive factors raise risk; recency-of-change and test
/// coverage are mitigating and subtract.
const WEIGHT_DEPENDENCY_COUNT: f64 = 0.25;
const WEIGHT_CRITICALITY: f64 = 0.30;
const WEIGHT_FAILURE_RATE: f64 = 0.20;
const WEIGHT_CHANGE_RECENCY: f64 = 0.10;
const WEIGHT_TEST_COVERAGE: f64 = 0.15;

/// Dependency count at which the normalized factor saturates.
const DEPENDENCY_SATURATION: usize = 20;

/// A change older than this many days contributes no recency mitigation.
const RECENCY_HORIZON_DAYS: f64 = 90.0;

/// Maximum ids accepted by [`RiskScorer::compare`].
pub const MAX_COMPARE_IDS: usize = 50;

/// Qualitative risk tier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    /// Score below 25.
    Low,

    /// Score 25-54.
    Medium,

    /// Score 55-79.
    High,

    /// Score 80 and above.
    Critical,
}

impl RiskLevel {
    /// Tier for a score in `[0, 100]`.
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Self::Critical
        } else if score >= 55.0 {
            Self::High
        } else if score >= 25.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// Risk assessment for one resource. Recomputed per query, never cached
/// across graph mutations.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RiskAssessment {
    /// The assessed resource.
    pub resource_id: ResourceId,

    /// Composite risk score in `[0, 100]`.
    pub risk_score: f64,

    /// Qualitative tier.
    pub risk_level: RiskLevel,

    /// Whether the resource is a single point of failure.
    pub is_spof: bool,

    /// Direct dependencies (outgoing DEPENDS_ON edges).
    pub dependency_count: usize,

    /// Direct dependents (incoming DEPENDS_ON edges).
    pub dependent_count: usize,

    /// Resources transitively affected by this resource failing.
    pub blast_radius: usize,

    /// Why the score is what it is, and what would lower it.
    pub recommendations: Vec<String>,
}

/// One-pass summary over up to [`MAX_COMPARE_IDS`] assessments.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RiskComparison {
    /// Number of resources compared.
    pub count: usize,

    /// Lowest risk score seen.
    pub min_score: f64,

    /// Highest risk score seen.
    pub max_score: f64,

    /// Mean risk score.
    pub average_score: f64,

    /// Resource with the highest score.
    pub highest: ResourceId,

    /// Resource with the lowest score.
    pub lowest: ResourceId,

    /// Count of resources per risk tier.
    pub histogram: BTreeMap<RiskLevel, usize>,
}

/// Composite risk scoring over the graph port.
pub struct RiskScorer {
    graph: Arc<dyn GraphAccess>,
    analyzer: DependencyAnalyzer,
}

impl RiskScorer {
    /// Create a scorer over the given graph.
    #[must_use]
    pub fn new(graph: Arc<dyn GraphAccess>) -> Self {
        let analyzer = DependencyAnalyzer::new(Arc::clone(&graph));
        Self { graph, analyzer }
    }

    /// Assess the risk of one resource.
    ///
    /// # Errors
    ///
    /// Returns `Error::ResourceNotFound` for an unknown id.
    pub async fn score(&self, id: &ResourceId) -> Result<RiskAssessment> {
        let resource = self.graph.get_resource(id).await?;

        let outgoing = self.graph.get_edges(id, EdgeDirection::Outgoing).await?;
        let incoming = self.graph.get_edges(id, EdgeDirection::Incoming).await?;
        let dependency_count = outgoing.iter().filter(|e| e.kind == EdgeKind::DependsOn).count();
        let dependent_count = incoming.iter().filter(|e| e.kind == EdgeKind::DependsOn).count();

        let is_spof = self.analyzer.is_spof(id).await?;
        let impact = self.analyzer.blast_radius(id, None).await?;

        let factors = Factors::of(&resource, dependency_count);
        let risk_score = factors.weighted_score();
        let risk_level = RiskLevel::from_score(risk_score);

        let recommendations =
            build_recommendations(&resource, &factors, is_spof, dependent_count, dependency_count);

        Ok(RiskAssessment {
            resource_id: id.clone(),
            risk_score,
            risk_level,
            is_spof,
            dependency_count,
            dependent_count,
            blast_radius: impact.total_affected,
            recommendations,
        })
    }

    /// Compare risk across up to [`MAX_COMPARE_IDS`] resources in one pass.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` for an empty list or more than
    /// [`MAX_COMPARE_IDS`] ids, before any graph access.
    pub async fn compare(&self, ids: &[ResourceId]) -> Result<RiskComparison> {
        if ids.is_empty() {
            return Err(Error::InvalidInput("no resource ids supplied".to_string()));
        }
        if ids.len() > MAX_COMPARE_IDS {
            return Err(Error::InvalidInput(format!(
                "at most {MAX_COMPARE_IDS} resources may be compared, got {}",
                ids.len()
            )));
        }

        let mut min_score = f64::MAX;
        let mut max_score = f64::MIN;
        let mut sum = 0.0;
        let mut highest = ids[0].clone();
        let mut lowest = ids[0].clone();
        let mut histogram: BTreeMap<RiskLevel, usize> = BTreeMap::new();

        for id in ids {
            let assessment = self.score(id).await?;
            sum += assessment.risk_score;
            *histogram.entry(assessment.risk_level).or_insert(0) += 1;
            if assessment.risk_score < min_score {
                min_score = assessment.risk_score;
                lowest = id.clone();
            }
            if assessment.risk_score > max_score {
                max_score = assessment.risk_score;
                highest = id.clone();
            }
        }

        Ok(RiskComparison {
            count: ids.len(),
            min_score,
            max_score,
            average_score: sum / ids.len() as f64,
            highest,
            lowest,
            histogram,
        })
    }
}

/// Normalized factor values, each in `[0, 100]`, zero when missing.
struct Factors {
    dependency_count: f64,
    criticality: f64,
    failure_rate: f64,
    change_recency: f64,
    test_coverage: f64,
    has_coverage_data: bool,
    has_failure_data: bool,
}

impl Factors {
    fn of(resource: &Resource, dependency_count: usize) -> Self {
        let dep_norm = (dependency_count.min(DEPENDENCY_SATURATION) as f64
            / DEPENDENCY_SATURATION as f64)
            * 100.0;

        let criticality = resource
            .attributes
            .criticality
            .map_or(0.0, Criticality::as_score);

        let failure_rate = resource
            .attributes
            .historical_failure_rate
            .map_or(0.0, |r| clamp_score(r * 100.0));

        // A recently reviewed/changed resource earns mitigation that fades
        // to nothing over the horizon.
        let change_recency = resource.attributes.last_change_at.map_or(0.0, |at| {
            let age_days = (Utc::now() - at).num_seconds() as f64 / 86_400.0;
            clamp_score(100.0 * (1.0 - age_days / RECENCY_HORIZON_DAYS))
        });

        let test_coverage = resource
            .attributes
            .test_coverage
            .map_or(0.0, |c| clamp_score(c * 100.0));

        Self {
            dependency_count: dep_norm,
            criticality,
            failure_rate,
            change_recency,
            test_coverage,
            has_coverage_data: resource.attributes.test_coverage.is_some(),
            has_failure_data: resource.attributes.historical_failure_rate.is_some(),
        }
    }

    fn weighted_score(&self) -> f64 {
        clamp_score(
            WEIGHT_DEPENDENCY_COUNT * self.dependency_count
                + WEIGHT_CRITICALITY * self.criticality
                + WEIGHT_FAILURE_RATE * self.failure_rate
                - WEIGHT_CHANGE_RECENCY * self.change_recency
                - WEIGHT_TEST_COVERAGE * self.test_coverage,
        )
    }
}

fn build_recommendations(
    resource: &Resource,
    factors: &Factors,
    is_spof: bool,
    dependent_count: usize,
    dependency_count: usize,
) -> Vec<String> {
    let mut recommendations = Vec::new();

    if is_spof {
        recommendations.push(format!(
            "{} has {} dependent(s) and no redundancy relation; add a redundant replica",
            resource.name, dependent_count
        ));
    }
    if factors.criticality >= Criticality::High.as_score() {
        recommendations.push(
            "flagged business-critical; review failover and backup coverage".to_string(),
        );
    }
    if dependency_count > 10 {
        recommendations.push(format!(
            "high coupling: {dependency_count} direct dependencies; consider consolidating"
        ));
    }
    if !factors.has_failure_data {
        recommendations
            .push("no historical failure data; risk may be understated".to_string());
    }
    if !factors.has_coverage_data {
        recommendations.push("no test coverage data; risk may be understated".to_string());
    }

    recommendations
}

/// Clamp a score into `[0, 100]`, mapping NaN to zero.
fn clamp_score(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}
