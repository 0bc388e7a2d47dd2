//! Simple-cycle enumeration with canonical deduplication.
//!
//! The graph is projected into a local petgraph snapshot (DEPENDS_ON edges
//! only), strongly connected components are found first, and simple cycles
//! are enumerated inside each nontrivial component by DFS rooted at the
//! component's lexicographically smallest member. Rooting the search at the
//! smallest member makes every emitted cycle already canonical — a rotation
//! is O(n) but rooting avoids even that in the common case.

use crate::domain::{EdgeKind, ResourceId};
use crate::error::Result;
use crate::graph::{EdgeDirection, GraphAccess};
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Upper bound on enumerated cycles; beyond this the graph is pathological
/// and more examples add no information.
const MAX_CYCLES: usize = 64;

/// Upper bound on the length of an enumerated cycle.
const MAX_CYCLE_LEN: usize = 16;

/// One simple dependency cycle, canonicalized.
///
/// `members` starts at the lexicographically smallest resource id in the
/// cycle and follows edge direction; the closing edge back to the first
/// member is implicit. Any nonempty cycle set is a critical finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Cycle {
    /// The resources forming the cycle, in edge order, smallest id first.
    pub members: Vec<ResourceId>,
}

impl Cycle {
    /// Canonicalize a raw member sequence by rotating the smallest id to
    /// the front (O(n), no re-sort).
    #[must_use]
    pub fn canonical(mut members: Vec<ResourceId>) -> Self {
        if let Some(min_pos) = members
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.cmp(b))
            .map(|(i, _)| i)
        {
            members.rotate_left(min_pos);
        }
        Self { members }
    }

    /// Number of resources in the cycle.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the cycle has no members (never produced by enumeration).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Whether the cycle passes through the given resource.
    #[must_use]
    pub fn contains(&self, id: &ResourceId) -> bool {
        self.members.contains(id)
    }
}

/// Enumerate all simple DEPENDS_ON cycles in the graph.
pub(super) async fn enumerate(graph: &dyn GraphAccess) -> Result<Vec<Cycle>> {
    let snapshot = load_snapshot(graph).await?;

    let mut cycles = Vec::new();
    let mut seen: HashSet<Vec<ResourceId>> = HashSet::new();

    for component in tarjan_scc(&snapshot) {
        let nontrivial = component.len() > 1
            || component
                .first()
                .is_some_and(|&n| snapshot.find_edge(n, n).is_some());
        if !nontrivial {
            continue;
        }

        let members: HashSet<NodeIndex> = component.iter().copied().collect();
        enumerate_in_component(&snapshot, &members, &mut cycles, &mut seen);

        if cycles.len() >= MAX_CYCLES {
            tracing::warn!(
                limit = MAX_CYCLES,
                "cycle enumeration truncated; graph has further cycles"
            );
            break;
        }
    }

    Ok(cycles)
}

/// Project the DEPENDS_ON edges into a local petgraph snapshot.
async fn load_snapshot(graph: &dyn GraphAccess) -> Result<DiGraph<ResourceId, ()>> {
    let ids = graph.list_resources().await?;

    let mut snapshot = DiGraph::new();
    let mut node_map = HashMap::with_capacity(ids.len());
    for id in &ids {
        let node = snapshot.add_node(id.clone());
        node_map.insert(id.clone(), node);
    }

    for id in &ids {
        let edges = graph.get_edges(id, EdgeDirection::Outgoing).await?;
        for edge in edges {
            if edge.kind != EdgeKind::DependsOn {
                continue;
            }
            let (Some(&from), Some(&to)) =
                (node_map.get(&edge.source_id), node_map.get(&edge.target_id))
            else {
                continue;
            };
            snapshot.add_edge(from, to, ());
        }
    }

    Ok(snapshot)
}

/// Enumerate simple cycles inside one strongly connected component.
///
/// DFS is rooted at each member in ascending id order; a path may only
/// visit nodes whose id is >= the root's, which yields each cycle exactly
/// once, already rotated to start at its smallest member.
fn enumerate_in_component(
    snapshot: &DiGraph<ResourceId, ()>,
    members: &HashSet<NodeIndex>,
    cycles: &mut Vec<Cycle>,
    seen: &mut HashSet<Vec<ResourceId>>,
) {
    let mut roots: Vec<NodeIndex> = members.iter().copied().collect();
    roots.sort_by(|a, b| snapshot[*a].cmp(&snapshot[*b]));

    for &root in &roots {
        let mut path = vec![root];
        let mut on_path: HashSet<NodeIndex> = HashSet::from([root]);
        dfs(snapshot, members, root, root, &mut path, &mut on_path, cycles, seen);
        if cycles.len() >= MAX_CYCLES {
            return;
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn dfs(
    snapshot: &DiGraph<ResourceId, ()>,
    members: &HashSet<NodeIndex>,
    root: NodeIndex,
    current: NodeIndex,
    path: &mut Vec<NodeIndex>,
    on_path: &mut HashSet<NodeIndex>,
    cycles: &mut Vec<Cycle>,
    seen: &mut HashSet<Vec<ResourceId>>,
) {
    if cycles.len() >= MAX_CYCLES || path.len() > MAX_CYCLE_LEN {
        return;
    }

    for next in snapshot.neighbors(current) {
        if next == root {
            let cycle = Cycle::canonical(path.iter().map(|&n| snapshot[n].clone()).collect());
            if seen.insert(cycle.members.clone()) {
                cycles.push(cycle);
            }
            continue;
        }
        // Restrict to this component, and to ids above the root so each
        // cycle is discovered from its smallest member only.
        if !members.contains(&next) || snapshot[next] <= snapshot[root] {
            continue;
        }
        if on_path.contains(&next) {
            continue;
        }

        path.push(next);
        on_path.insert(next);
        dfs(snapshot, members, root, next, path, on_path, cycles, seen);
        path.pop();
        on_path.remove(&next);
    }
}
