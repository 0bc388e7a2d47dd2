//! Dependency health scoring.
//!
//! Health starts at 100 and is reduced by itemized deductions: excessive
//! coupling, dependency cycles, SPOFs among direct dependencies, and deep
//! dependency chains. The floor is 0 and every deduction is reported, so a
//! caller can see exactly why a score dropped.

use crate::domain::ResourceId;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Coupling deduction starts above this many direct dependencies.
const COUPLING_THRESHOLD: usize = 10;

/// Coupling deduction cap.
const COUPLING_CAP: f64 = 30.0;

/// Points deducted per dependency cycle.
const CYCLE_PENALTY: f64 = 20.0;

/// Cycle deduction cap.
const CYCLE_CAP: f64 = 40.0;

/// Maximum deduction when every dependency is a SPOF.
const SPOF_PENALTY_MAX: f64 = 25.0;

/// Depth deduction starts beyond this dependency-tree depth.
const DEPTH_THRESHOLD: u32 = 5;

/// Points deducted per level beyond the depth threshold.
const DEPTH_PENALTY_PER_LEVEL: f64 = 5.0;

/// Depth deduction cap.
const DEPTH_CAP: f64 = 15.0;

/// Which rule produced a health deduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum HealthFactor {
    /// More direct dependencies than a service should carry.
    ExcessiveCoupling,

    /// The resource participates in dependency cycles.
    CircularDependencies,

    /// Direct dependencies with no redundancy.
    SpofDependencies,

    /// The dependency tree is deeper than operable.
    DeepDependencyChain,
}

/// One itemized health deduction.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HealthDeduction {
    /// The rule that fired.
    pub factor: HealthFactor,

    /// Points removed from the score.
    pub points: f64,

    /// Human-readable explanation.
    pub detail: String,
}

/// Qualitative tier for a health score.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum HealthLevel {
    /// 0-19.
    Critical,

    /// 20-39.
    Poor,

    /// 40-59.
    Fair,

    /// 60-79.
    Good,

    /// 80-100.
    Excellent,
}

impl HealthLevel {
    /// Tier for a score in `[0, 100]`.
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Self::Excellent
        } else if score >= 60.0 {
            Self::Good
        } else if score >= 40.0 {
            Self::Fair
        } else if score >= 20.0 {
            Self::Poor
        } else {
            Self::Critical
        }
    }
}

/// Dependency health of one resource.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DependencyHealth {
    /// The assessed resource.
    pub resource_id: ResourceId,

    /// Health score in `[0, 100]`.
    pub score: f64,

    /// Qualitative tier.
    pub level: HealthLevel,

    /// Every deduction that fired, with points and explanation.
    pub deductions: Vec<HealthDeduction>,

    /// Direct dependency count.
    pub dependency_count: usize,

    /// Cycles passing through this resource.
    pub cycle_count: usize,

    /// Direct dependencies that are SPOFs.
    pub spof_dependencies: usize,

    /// Dependency-tree depth below this resource.
    pub max_depth: u32,
}

/// Compute the health score from pre-gathered graph facts.
pub(super) fn score(
    resource_id: ResourceId,
    dependency_count: usize,
    cycle_count: usize,
    spof_dependencies: usize,
    max_depth: u32,
) -> DependencyHealth {
    let mut deductions = Vec::new();

    if dependency_count > COUPLING_THRESHOLD {
        let points =
            (((dependency_count - COUPLING_THRESHOLD) * 2) as f64).min(COUPLING_CAP);
        deductions.push(HealthDeduction {
            factor: HealthFactor::ExcessiveCoupling,
            points,
            detail: format!("{dependency_count} direct dependencies (threshold {COUPLING_THRESHOLD})"),
        });
    }

    if cycle_count > 0 {
        let points = (CYCLE_PENALTY * cycle_count as f64).min(CYCLE_CAP);
        deductions.push(HealthDeduction {
            factor: HealthFactor::CircularDependencies,
            points,
            detail: format!("{cycle_count} dependency cycle(s)"),
        });
    }

    if spof_dependencies > 0 && dependency_count > 0 {
        let ratio = spof_dependencies as f64 / dependency_count as f64;
        let points = SPOF_PENALTY_MAX * ratio;
        deductions.push(HealthDeduction {
            factor: HealthFactor::SpofDependencies,
            points,
            detail: format!(
                "{spof_dependencies} of {dependency_count} dependencies lack redundancy"
            ),
        });
    }

    if max_depth > DEPTH_THRESHOLD {
        let points =
            (DEPTH_PENALTY_PER_LEVEL * f64::from(max_depth - DEPTH_THRESHOLD)).min(DEPTH_CAP);
        deductions.push(HealthDeduction {
            factor: HealthFactor::DeepDependencyChain,
            points,
            detail: format!("dependency tree depth {max_depth} (threshold {DEPTH_THRESHOLD})"),
        });
    }

    let total: f64 = deductions.iter().map(|d| d.points).sum();
    let score = (100.0 - total).max(0.0);

    DependencyHealth {
        resource_id,
        score,
        level: HealthLevel::from_score(score),
        deductions,
        dependency_count,
        cycle_count,
        spof_dependencies,
        max_depth,
    }
}
