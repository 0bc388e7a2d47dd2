//! Core in-memory graph data structures.
//!
//! This module contains the inner structure that holds all data and is
//! wrapped in `Arc<Mutex<_>>` by the public handle.

use crate::domain::{DependencyEdge, EdgeKind, Resource, ResourceId};
use crate::error::{Error, Result};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::{HashMap, HashSet, VecDeque};

/// Inner graph structure (not thread-safe).
///
/// Nodes carry `ResourceId` values, edge weights carry the full
/// [`DependencyEdge`]. Edge direction: source (dependent) -> target
/// (dependency). Every resource in `resources` has a corresponding entry in
/// `node_map`.
pub(crate) struct InMemoryGraphInner {
    /// Resources indexed by id for O(1) lookups.
    resources: HashMap<ResourceId, Resource>,

    /// The dependency graph.
    graph: DiGraph<ResourceId, DependencyEdge>,

    /// Mapping from ResourceId to graph NodeIndex.
    node_map: HashMap<ResourceId, NodeIndex>,
}

impl InMemoryGraphInner {
    /// Create an empty graph.
    pub(crate) fn new() -> Self {
        Self {
            resources: HashMap::new(),
            graph: DiGraph::new(),
            node_map: HashMap::new(),
        }
    }

    pub(crate) fn resource_count(&self) -> usize {
        self.resources.len()
    }

    /// Insert or replace a resource, creating its graph node on first
    /// insert.
    pub(crate) fn insert_resource(&mut self, resource: Resource) {
        let id = resource.id.clone();
        if !self.node_map.contains_key(&id) {
            let node = self.graph.add_node(id.clone());
            self.node_map.insert(id.clone(), node);
        }
        self.resources.insert(id, resource);
    }

    pub(crate) fn get_resource(&self, id: &ResourceId) -> Result<Resource> {
        self.resources
            .get(id)
            .cloned()
            .ok_or_else(|| Error::ResourceNotFound(id.clone()))
    }

    fn node(&self, id: &ResourceId) -> Result<NodeIndex> {
        self.node_map
            .get(id)
            .copied()
            .ok_or_else(|| Error::ResourceNotFound(id.clone()))
    }

    /// Edges where `id` is the dependent (its dependencies).
    pub(crate) fn outgoing_edges(&self, id: &ResourceId) -> Result<Vec<DependencyEdge>> {
        let node = self.node(id)?;
        Ok(self
            .graph
            .edges_directed(node, Direction::Outgoing)
            .map(|e| e.weight().clone())
            .collect())
    }

    /// Edges where `id` is the dependency (its dependents).
    pub(crate) fn incoming_edges(&self, id: &ResourceId) -> Result<Vec<DependencyEdge>> {
        let node = self.node(id)?;
        Ok(self
            .graph
            .edges_directed(node, Direction::Incoming)
            .map(|e| e.weight().clone())
            .collect())
    }

    /// Insert or overwrite the edge identified by
    /// `(source, target, kind)`.
    pub(crate) fn upsert_edge(&mut self, edge: DependencyEdge) -> Result<()> {
        let source = self.node(&edge.source_id)?;
        let target = self.node(&edge.target_id)?;

        let existing = self
            .graph
            .edges_directed(source, Direction::Outgoing)
            .find(|e| e.target() == target && e.weight().kind == edge.kind)
            .map(|e| e.id());

        match existing {
            Some(edge_idx) => {
                // Overwrite in place: upsert, never append.
                if let Some(weight) = self.graph.edge_weight_mut(edge_idx) {
                    *weight = edge;
                }
            }
            None => {
                self.graph.add_edge(source, target, edge);
            }
        }
        Ok(())
    }

    /// BFS outward along edges of `kind`, collecting one (shortest) path
    /// per reachable resource, up to `max_depth` hops.
    pub(crate) fn find_reachable(
        &self,
        id: &ResourceId,
        kind: EdgeKind,
        max_depth: u32,
    ) -> Result<Vec<Vec<ResourceId>>> {
        let start = self.node(id)?;

        let mut paths = Vec::new();
        let mut visited: HashSet<NodeIndex> = HashSet::from([start]);
        let mut queue: VecDeque<(NodeIndex, Vec<ResourceId>, u32)> =
            VecDeque::from([(start, vec![id.clone()], 0)]);

        while let Some((node, path, depth)) = queue.pop_front() {
            if depth >= max_depth {
                continue;
            }
            for edge in self.graph.edges_directed(node, Direction::Outgoing) {
                if edge.weight().kind != kind {
                    continue;
                }
                let next = edge.target();
                if visited.insert(next) {
                    let mut next_path = path.clone();
                    next_path.push(self.graph[next].clone());
                    paths.push(next_path.clone());
                    queue.push_back((next, next_path, depth + 1));
                }
            }
        }

        Ok(paths)
    }

    pub(crate) fn list_resources(&self) -> Vec<ResourceId> {
        self.resources.keys().cloned().collect()
    }
}
