//! Common test fixtures shared across integration tests.

use girder::domain::{DependencyEdge, DependencyType, Resource, ResourceId};
use girder::graph::InMemoryGraph;
use std::sync::Arc;

/// Initialize test tracing once; repeated calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// Build a plain backend-service resource.
pub fn service(id: &str, name: &str) -> Resource {
    Resource::new(id, name, "internal.api")
}

/// Shorthand for a `ResourceId`.
pub fn rid(id: &str) -> ResourceId {
    ResourceId::from(id)
}

/// A three-tier stack:
///
/// ```text
/// web -> api -> db
///         \
///          -> cache
/// ```
pub async fn three_tier() -> Arc<InMemoryGraph> {
    let graph = Arc::new(InMemoryGraph::new());
    graph
        .insert_resources([
            Resource::new("web", "Storefront", "azure.web_app"),
            Resource::new("api", "Orders API", "internal.api"),
            Resource::new("db", "Orders DB", "azure.sql_database"),
            Resource::new("cache", "Session Cache", "azure.redis_cache"),
        ])
        .await;
    for edge in [
        DependencyEdge::depends_on("web", "api", 0.9),
        DependencyEdge::depends_on("api", "db", 0.9),
        DependencyEdge::depends_on("api", "cache", 0.7)
            .with_dependency_type(DependencyType::Optional),
    ] {
        graph.insert_edge(edge).await.unwrap();
    }
    graph
}

/// A circular dependency:
///
/// ```text
/// a -> b -> c -> a
/// ```
pub async fn cycle_graph() -> Arc<InMemoryGraph> {
    let graph = Arc::new(InMemoryGraph::new());
    graph
        .insert_resources([
            service("a", "Service A"),
            service("b", "Service B"),
            service("c", "Service C"),
        ])
        .await;
    for edge in [
        DependencyEdge::depends_on("a", "b", 0.8),
        DependencyEdge::depends_on("b", "c", 0.8),
        DependencyEdge::depends_on("c", "a", 0.8),
    ] {
        graph.insert_edge(edge).await.unwrap();
    }
    graph
}

/// The same chain without the closing edge (`a -> b -> c`), for comparing
/// analyses with and without the cycle.
pub async fn chain_graph() -> Arc<InMemoryGraph> {
    let graph = Arc::new(InMemoryGraph::new());
    graph
        .insert_resources([
            service("a", "Service A"),
            service("b", "Service B"),
            service("c", "Service C"),
        ])
        .await;
    for edge in [
        DependencyEdge::depends_on("a", "b", 0.8),
        DependencyEdge::depends_on("b", "c", 0.8),
    ] {
        graph.insert_edge(edge).await.unwrap();
    }
    graph
}

/// A hub with `count` dependents and no redundancy:
///
/// ```text
/// dep-1 ... dep-N -> hub
/// ```
pub async fn star_graph(count: usize) -> Arc<InMemoryGraph> {
    let graph = Arc::new(InMemoryGraph::new());
    graph.insert_resource(service("hub", "Hub Service")).await;
    for i in 1..=count {
        let id = format!("dep-{i}");
        graph
            .insert_resource(service(&id, &format!("Dependent {i}")))
            .await;
        graph
            .insert_edge(DependencyEdge::depends_on(id, "hub", 0.8))
            .await
            .unwrap();
    }
    graph
}

/// A linear chain of dependents below `root`:
///
/// ```text
/// level-N -> ... -> level-1 -> root
/// ```
pub async fn dependent_chain(depth: usize) -> Arc<InMemoryGraph> {
    let graph = Arc::new(InMemoryGraph::new());
    graph.insert_resource(service("root", "Root Service")).await;
    let mut below = "root".to_string();
    for i in 1..=depth {
        let id = format!("level-{i}");
        graph
            .insert_resource(service(&id, &format!("Level {i}")))
            .await;
        graph
            .insert_edge(DependencyEdge::depends_on(id.clone(), below.clone(), 0.8))
            .await
            .unwrap();
        below = id;
    }
    graph
}
