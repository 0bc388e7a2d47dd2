//! Integration tests for the dependency graph analyzer.
//!
//! Covers cycle detection with canonical deduplication, SPOF detection,
//! blast-radius severity, and dependency health through the public API.

mod common;

use common::{chain_graph, cycle_graph, dependent_chain, rid, service, star_graph, three_tier};
use girder::analyzer::{DependencyAnalyzer, HealthFactor, ImpactSeverity};
use girder::domain::{Criticality, DependencyEdge, Resource, ResourceId};
use girder::Error;
use std::sync::Arc;

#[tokio::test]
async fn cycle_is_found_and_canonicalized() {
    let graph = cycle_graph().await;
    let analyzer = DependencyAnalyzer::new(graph);

    let cycles = analyzer.detect_cycles(Some(&rid("a"))).await.unwrap();

    assert_eq!(cycles.len(), 1);
    assert_eq!(
        cycles[0].members,
        vec![rid("a"), rid("b"), rid("c")],
        "cycle must start at its lexicographically smallest member"
    );
}

#[tokio::test]
async fn cycle_detection_is_idempotent() {
    let graph = cycle_graph().await;
    let analyzer = DependencyAnalyzer::new(graph);

    let first = analyzer.detect_cycles(None).await.unwrap();
    let second = analyzer.detect_cycles(None).await.unwrap();

    assert_eq!(first.len(), 1);
    assert_eq!(first, second);
}

#[tokio::test]
async fn scoping_to_an_uninvolved_resource_returns_nothing() {
    let graph = cycle_graph().await;
    graph.insert_resource(service("bystander", "Bystander")).await;
    let analyzer = DependencyAnalyzer::new(graph);

    let cycles = analyzer.detect_cycles(Some(&rid("bystander"))).await.unwrap();
    assert!(cycles.is_empty());
}

#[tokio::test]
async fn acyclic_graph_has_no_cycles() {
    let graph = three_tier().await;
    let analyzer = DependencyAnalyzer::new(graph);

    let cycles = analyzer.detect_cycles(None).await.unwrap();
    assert!(cycles.is_empty());
}

#[tokio::test]
async fn unknown_scope_is_an_error() {
    let graph = cycle_graph().await;
    let analyzer = DependencyAnalyzer::new(graph);

    let result = analyzer.detect_cycles(Some(&rid("ghost"))).await;
    assert!(matches!(result, Err(Error::ResourceNotFound(_))));
}

#[tokio::test]
async fn two_cycles_are_both_reported() {
    let graph = cycle_graph().await;
    // Add a second, disjoint cycle: x -> y -> x.
    graph
        .insert_resources([service("x", "Service X"), service("y", "Service Y")])
        .await;
    graph
        .insert_edge(DependencyEdge::depends_on("x", "y", 0.8))
        .await
        .unwrap();
    graph
        .insert_edge(DependencyEdge::depends_on("y", "x", 0.8))
        .await
        .unwrap();

    let analyzer = DependencyAnalyzer::new(graph);
    let cycles = analyzer.detect_cycles(None).await.unwrap();
    assert_eq!(cycles.len(), 2);
}

#[tokio::test]
async fn hub_without_redundancy_is_a_spof() {
    let graph = star_graph(4).await;
    let analyzer = DependencyAnalyzer::new(graph);

    assert!(analyzer.is_spof(&rid("hub")).await.unwrap());
    // A leaf with no dependents is not a SPOF by definition.
    assert!(!analyzer.is_spof(&rid("dep-1")).await.unwrap());
}

#[tokio::test]
async fn redundancy_relation_clears_spof() {
    let graph = star_graph(4).await;
    graph.insert_resource(service("hub-b", "Hub Replica")).await;
    graph
        .insert_edge(DependencyEdge::redundant_with("hub", "hub-b"))
        .await
        .unwrap();

    let analyzer = DependencyAnalyzer::new(graph);
    assert!(!analyzer.is_spof(&rid("hub")).await.unwrap());
}

/// Four non-critical dependents land in the 1-5 band.
#[tokio::test]
async fn blast_radius_of_four_dependents_is_low() {
    let graph = star_graph(4).await;
    let analyzer = DependencyAnalyzer::new(graph);

    let impact = analyzer.blast_radius(&rid("hub"), Some(3)).await.unwrap();

    assert_eq!(impact.total_affected, 4);
    assert_eq!(impact.critical_count, 0);
    assert_eq!(impact.severity, ImpactSeverity::Low);
}

#[tokio::test]
async fn blast_radius_of_seven_dependents_is_medium() {
    let graph = star_graph(7).await;
    let analyzer = DependencyAnalyzer::new(graph);

    let impact = analyzer.blast_radius(&rid("hub"), Some(3)).await.unwrap();
    assert_eq!(impact.total_affected, 7);
    assert_eq!(impact.severity, ImpactSeverity::Medium);
}

#[tokio::test]
async fn critical_dependent_escalates_to_severe() {
    let graph = star_graph(2).await;
    let mut vip = service("vip", "Payments Core");
    vip.attributes.criticality = Some(Criticality::High);
    graph.insert_resource(vip).await;
    graph
        .insert_edge(DependencyEdge::depends_on("vip", "hub", 0.9))
        .await
        .unwrap();

    let analyzer = DependencyAnalyzer::new(graph);
    let impact = analyzer.blast_radius(&rid("hub"), Some(3)).await.unwrap();

    assert_eq!(impact.total_affected, 3);
    assert_eq!(impact.critical_count, 1);
    assert_eq!(impact.severity, ImpactSeverity::Severe);
}

#[tokio::test]
async fn data_store_failure_marks_required_dependents_critical() {
    let graph = three_tier().await;
    let analyzer = DependencyAnalyzer::new(graph);

    let impact = analyzer.blast_radius(&rid("db"), Some(3)).await.unwrap();

    // api -> db is required and db is a data store.
    let api = impact
        .affected
        .iter()
        .find(|a| a.resource.id == rid("api"))
        .unwrap();
    assert!(api.is_critical);
    assert_eq!(impact.severity, ImpactSeverity::Severe);
}

#[tokio::test]
async fn blast_radius_respects_depth_limit() {
    let graph = dependent_chain(6).await;
    let analyzer = DependencyAnalyzer::new(graph);

    let impact = analyzer.blast_radius(&rid("root"), Some(2)).await.unwrap();
    assert_eq!(impact.total_affected, 2);
    assert_eq!(impact.max_depth_reached, 2);
}

#[tokio::test]
async fn zero_depth_is_rejected() {
    let graph = three_tier().await;
    let analyzer = DependencyAnalyzer::new(graph);

    let result = analyzer.blast_radius(&rid("web"), Some(0)).await;
    assert!(matches!(result, Err(Error::InvalidInput(_))));
}

#[tokio::test]
async fn empty_blast_radius_is_minimal() {
    let graph = three_tier().await;
    let analyzer = DependencyAnalyzer::new(graph);

    // Nothing depends on web.
    let impact = analyzer.blast_radius(&rid("web"), None).await.unwrap();
    assert_eq!(impact.total_affected, 0);
    assert_eq!(impact.severity, ImpactSeverity::Minimal);
}

/// The cycle costs exactly 20 points versus the same graph without the
/// closing edge, and the health tier drops.
#[tokio::test]
async fn cycle_penalty_drops_health_a_tier() {
    let with_cycle = DependencyAnalyzer::new(cycle_graph().await)
        .health(&rid("a"))
        .await
        .unwrap();
    let without_cycle = DependencyAnalyzer::new(chain_graph().await)
        .health(&rid("a"))
        .await
        .unwrap();

    assert_eq!(without_cycle.score - with_cycle.score, 20.0);
    assert!(with_cycle.level < without_cycle.level);
    assert!(with_cycle
        .deductions
        .iter()
        .any(|d| d.factor == HealthFactor::CircularDependencies && d.points == 20.0));
}

#[tokio::test]
async fn health_counts_spof_dependencies() {
    let graph = three_tier().await;
    let analyzer = DependencyAnalyzer::new(graph);

    // api depends on db and cache, both of which are unreplicated SPOFs.
    let health = analyzer.health(&rid("api")).await.unwrap();
    assert_eq!(health.dependency_count, 2);
    assert_eq!(health.spof_dependencies, 2);
    assert!(health
        .deductions
        .iter()
        .any(|d| d.factor == HealthFactor::SpofDependencies));
}

#[tokio::test]
async fn health_of_a_leaf_is_perfect() {
    let graph = three_tier().await;
    let analyzer = DependencyAnalyzer::new(graph);

    let health = analyzer.health(&rid("db")).await.unwrap();
    assert_eq!(health.score, 100.0);
    assert!(health.deductions.is_empty());
}

#[tokio::test]
async fn excessive_coupling_is_deducted() {
    let graph = Arc::new(girder::graph::InMemoryGraph::new());
    graph.insert_resource(service("fan", "Fan-out Service")).await;
    for i in 1..=14 {
        let id = format!("svc-{i}");
        graph
            .insert_resource(Resource::new(id.clone(), format!("Service {i}"), "internal.api"))
            .await;
        graph
            .insert_edge(DependencyEdge::depends_on("fan", id, 0.8))
            .await
            .unwrap();
    }

    let analyzer = DependencyAnalyzer::new(graph);
    let health = analyzer.health(&ResourceId::from("fan")).await.unwrap();

    let coupling = health
        .deductions
        .iter()
        .find(|d| d.factor == HealthFactor::ExcessiveCoupling)
        .expect("coupling deduction expected");
    assert_eq!(coupling.points, 8.0, "(14 - 10) x 2");
}
