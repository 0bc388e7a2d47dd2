//! GraphAccess trait implementation for the in-memory backend.

use super::InMemoryGraph;
use crate::domain::{DependencyEdge, EdgeKind, Resource, ResourceId};
use crate::error::Result;
use crate::graph::{EdgeDirection, GraphAccess};
use async_trait::async_trait;

#[async_trait]
impl GraphAccess for InMemoryGraph {
    async fn get_resource(&self, id: &ResourceId) -> Result<Resource> {
        let inner = self.lock().await;
        inner.get_resource(id)
    }

    async fn get_edges(
        &self,
        id: &ResourceId,
        direction: EdgeDirection,
    ) -> Result<Vec<DependencyEdge>> {
        let inner = self.lock().await;
        match direction {
            EdgeDirection::Outgoing => inner.outgoing_edges(id),
            EdgeDirection::Incoming => inner.incoming_edges(id),
            EdgeDirection::Both => {
                let mut edges = inner.outgoing_edges(id)?;
                edges.extend(inner.incoming_edges(id)?);
                Ok(edges)
            }
        }
    }

    async fn upsert_edge(&self, edge: DependencyEdge) -> Result<()> {
        let mut inner = self.lock().await;
        inner.upsert_edge(edge)
    }

    async fn find_reachable(
        &self,
        id: &ResourceId,
        kind: EdgeKind,
        max_depth: u32,
    ) -> Result<Vec<Vec<ResourceId>>> {
        let inner = self.lock().await;
        inner.find_reachable(id, kind, max_depth)
    }

    async fn list_resources(&self) -> Result<Vec<ResourceId>> {
        let inner = self.lock().await;
        Ok(inner.list_resources())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DiscoveryMethod, Resource};
    use crate::error::Error;
    use chrono::Utc;

    async fn seeded() -> InMemoryGraph {
        let graph = InMemoryGraph::new();
        graph
            .insert_resources([
                Resource::new("web", "Web Frontend", "azure.web_app"),
                Resource::new("api", "Orders API", "internal.api"),
                Resource::new("db", "Orders DB", "azure.sql_database"),
            ])
            .await;
        graph
            .insert_edge(DependencyEdge::depends_on("web", "api", 0.8))
            .await
            .unwrap();
        graph
            .insert_edge(DependencyEdge::depends_on("api", "db", 0.9))
            .await
            .unwrap();
        graph
    }

    #[tokio::test]
    async fn get_resource_returns_not_found_for_unknown_id() {
        let graph = seeded().await;
        let result = graph.get_resource(&ResourceId::from("ghost")).await;
        assert!(matches!(result, Err(Error::ResourceNotFound(_))));
    }

    #[tokio::test]
    async fn edge_directions_are_respected() {
        let graph = seeded().await;
        let api = ResourceId::from("api");

        let out = graph.get_edges(&api, EdgeDirection::Outgoing).await.unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].target_id.as_str(), "db");

        let inc = graph.get_edges(&api, EdgeDirection::Incoming).await.unwrap();
        assert_eq!(inc.len(), 1);
        assert_eq!(inc[0].source_id.as_str(), "web");

        let both = graph.get_edges(&api, EdgeDirection::Both).await.unwrap();
        assert_eq!(both.len(), 2);
    }

    #[tokio::test]
    async fn upsert_overwrites_instead_of_appending() {
        let graph = seeded().await;
        let web = ResourceId::from("web");

        let updated = DependencyEdge::depends_on("web", "api", 0.95)
            .with_discovered_method(DiscoveryMethod::Verification)
            .confirmed_at(Utc::now());
        graph.upsert_edge(updated.clone()).await.unwrap();
        // Idempotent: applying the same upsert again converges.
        graph.upsert_edge(updated).await.unwrap();

        let out = graph.get_edges(&web, EdgeDirection::Outgoing).await.unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].strength, 0.95);
        assert_eq!(out[0].discovered_method, DiscoveryMethod::Verification);
    }

    #[tokio::test]
    async fn upsert_rejects_unknown_endpoints() {
        let graph = seeded().await;
        let result = graph
            .upsert_edge(DependencyEdge::depends_on("web", "ghost", 0.5))
            .await;
        assert!(matches!(result, Err(Error::ResourceNotFound(_))));
    }

    #[tokio::test]
    async fn find_reachable_returns_shortest_paths() {
        let graph = seeded().await;
        let paths = graph
            .find_reachable(&ResourceId::from("web"), EdgeKind::DependsOn, 5)
            .await
            .unwrap();

        assert_eq!(paths.len(), 2);
        assert!(paths.iter().any(|p| p.len() == 2 && p[1].as_str() == "api"));
        assert!(paths.iter().any(|p| p.len() == 3 && p[2].as_str() == "db"));
    }

    #[tokio::test]
    async fn find_reachable_honors_max_depth() {
        let graph = seeded().await;
        let paths = graph
            .find_reachable(&ResourceId::from("web"), EdgeKind::DependsOn, 1)
            .await
            .unwrap();

        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0][1].as_str(), "api");
    }

    #[tokio::test]
    async fn tag_inference_runs_at_ingestion() {
        let graph = InMemoryGraph::new();
        let mut resource = Resource::new("pay", "Payments", "internal.api");
        resource
            .tags
            .insert("env".to_string(), "production".to_string());
        resource
            .tags
            .insert("tier".to_string(), "critical".to_string());
        graph.insert_resource(resource).await;

        let stored = graph.get_resource(&ResourceId::from("pay")).await.unwrap();
        assert!(stored.is_high_criticality());
        assert_eq!(
            stored.attributes.environment,
            Some(crate::domain::Environment::Production)
        );
    }
}
