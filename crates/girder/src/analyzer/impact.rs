//! Blast-radius (downstream impact) traversal.
//!
//! BFS outward along **incoming** DEPENDS_ON edges: the dependents of the
//! failing resource, then their dependents, up to the depth limit. Each
//! visited resource is bucketed into a service category and flagged
//! critical per category + relationship rules.

use crate::domain::{
    DependencyType, EdgeKind, ResourceId, ResourceRef, ServiceCategory,
};
use crate::error::Result;
use crate::graph::{EdgeDirection, GraphAccess};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

/// Severity of a failure's downstream impact.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ImpactSeverity {
    /// Nothing is affected.
    Minimal,

    /// 1-5 affected, none critical.
    Low,

    /// 6-10 affected, none critical.
    Medium,

    /// More than 10 affected, none critical.
    High,

    /// At least one critical service is affected.
    Severe,
}

impl ImpactSeverity {
    /// Apply the documented thresholds.
    #[must_use]
    pub fn from_counts(total_affected: usize, critical_count: usize) -> Self {
        if critical_count > 0 {
            Self::Severe
        } else if total_affected == 0 {
            Self::Minimal
        } else if total_affected <= 5 {
            Self::Low
        } else if total_affected <= 10 {
            Self::Medium
        } else {
            Self::High
        }
    }
}

/// One resource reached by the impact traversal.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AffectedResource {
    /// The affected resource.
    pub resource: ResourceRef,

    /// Hops from the failing resource (1 = direct dependent).
    pub depth: u32,

    /// Whether the dependency edge reaching this resource is load-bearing.
    pub dependency_type: DependencyType,

    /// Whether this resource is flagged critical for severity purposes.
    pub is_critical: bool,
}

/// Result of a blast-radius traversal.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ImpactAnalysis {
    /// The resource whose failure was analyzed.
    pub resource_id: ResourceId,

    /// Overall severity per the documented thresholds.
    pub severity: ImpactSeverity,

    /// Every affected resource, in BFS discovery order.
    pub affected: Vec<AffectedResource>,

    /// Total number of affected resources.
    pub total_affected: usize,

    /// Affected-resource counts per service category.
    pub by_category: BTreeMap<ServiceCategory, usize>,

    /// Number of affected resources flagged critical.
    pub critical_count: usize,

    /// Deepest level actually reached (<= the requested depth).
    pub max_depth_reached: u32,
}

/// Whether an affected dependent counts as critical.
///
/// Rules, in order:
/// - the dependent itself is flagged high criticality;
/// - a required edge into a data store (losing the store takes the
///   dependent down with no graceful degradation);
/// - a required edge from a user-facing service (end users see the outage).
fn is_critical_dependent(
    dependent_category: ServiceCategory,
    dependent_high_criticality: bool,
    dependency_type: DependencyType,
    failed_category: ServiceCategory,
) -> bool {
    if dependent_high_criticality {
        return true;
    }
    if dependency_type == DependencyType::Required {
        return failed_category == ServiceCategory::DataStore
            || dependent_category == ServiceCategory::UserFacing;
    }
    false
}

/// BFS over incoming DEPENDS_ON edges up to `max_depth`.
pub(super) async fn blast_radius(
    graph: &dyn GraphAccess,
    id: &ResourceId,
    max_depth: u32,
) -> Result<ImpactAnalysis> {
    let root = graph.get_resource(id).await?;

    let mut affected = Vec::new();
    let mut by_category: BTreeMap<ServiceCategory, usize> = BTreeMap::new();
    let mut critical_count = 0usize;
    let mut max_depth_reached = 0u32;

    // Category of every visited resource, so criticality rules can look at
    // the failed side of each edge without refetching.
    let mut categories: HashMap<ResourceId, ServiceCategory> =
        HashMap::from([(id.clone(), root.category())]);
    let mut visited: HashSet<ResourceId> = HashSet::from([id.clone()]);
    let mut queue: VecDeque<(ResourceId, u32)> = VecDeque::from([(id.clone(), 0)]);

    while let Some((current, depth)) = queue.pop_front() {
        if depth >= max_depth {
            continue;
        }
        let failed_category = categories[&current];

        for edge in graph.get_edges(&current, EdgeDirection::Incoming).await? {
            if edge.kind != EdgeKind::DependsOn {
                continue;
            }
            let dependent_id = edge.source_id.clone();
            if !visited.insert(dependent_id.clone()) {
                continue;
            }

            let dependent = graph.get_resource(&dependent_id).await?;
            let category = dependent.category();
            let is_critical = is_critical_dependent(
                category,
                dependent.is_high_criticality(),
                edge.dependency_type,
                failed_category,
            );

            let next_depth = depth + 1;
            max_depth_reached = max_depth_reached.max(next_depth);
            *by_category.entry(category).or_insert(0) += 1;
            if is_critical {
                critical_count += 1;
            }
            affected.push(AffectedResource {
                resource: ResourceRef::of(&dependent),
                depth: next_depth,
                dependency_type: edge.dependency_type,
                is_critical,
            });

            categories.insert(dependent_id.clone(), category);
            queue.push_back((dependent_id, next_depth));
        }
    }

    let total_affected = affected.len();
    Ok(ImpactAnalysis {
        resource_id: id.clone(),
        severity: ImpactSeverity::from_counts(total_affected, critical_count),
        affected,
        total_affected,
        by_category,
        critical_count,
        max_depth_reached,
    })
}
