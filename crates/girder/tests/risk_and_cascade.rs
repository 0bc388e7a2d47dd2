//! Integration tests for the risk scorer and cascade modeler.

mod common;

use chrono::Utc;
use common::{dependent_chain, rid, service, star_graph, three_tier};
use girder::cascade::{CascadeModeler, TerminationReason};
use girder::config::CascadeConfig;
use girder::domain::{Criticality, ResourceId};
use girder::risk::{RiskLevel, RiskScorer, MAX_COMPARE_IDS};
use girder::Error;

/// The documented decay scenario: a 3-deep dependent chain with factor
/// 0.30 produces level probabilities exactly 0.3, 0.09, 0.027.
#[tokio::test]
async fn cascade_probabilities_decay_geometrically() {
    let graph = dependent_chain(3).await;
    let modeler = CascadeModeler::new(graph);

    let result = modeler.cascade(&rid("root"), Some(1.0), None).await.unwrap();

    let probabilities: Vec<f64> = result.levels.iter().map(|l| l.probability).collect();
    assert_eq!(probabilities.len(), 3);
    assert!((probabilities[0] - 0.3).abs() < 1e-12);
    assert!((probabilities[1] - 0.09).abs() < 1e-12);
    assert!((probabilities[2] - 0.027).abs() < 1e-12);

    // One resource per level: expected failures is the plain sum.
    let expected = 0.3 + 0.09 + 0.027;
    assert!((result.expected_failures - expected).abs() < 1e-12);
    assert_eq!(result.terminated_by, TerminationReason::Exhausted);
}

#[tokio::test]
async fn cascade_stops_at_probability_floor() {
    let graph = dependent_chain(8).await;
    let modeler = CascadeModeler::new(graph);

    let result = modeler.cascade(&rid("root"), Some(1.0), Some(8)).await.unwrap();

    // 0.3^4 = 0.0081 < 0.01, so exactly three levels survive.
    assert_eq!(result.levels.len(), 3);
    assert_eq!(result.terminated_by, TerminationReason::ProbabilityFloor);
    assert!(result.levels.iter().all(|l| l.probability >= 0.01));
}

#[tokio::test]
async fn cascade_stops_at_max_depth() {
    let graph = dependent_chain(8).await;
    let modeler = CascadeModeler::new(graph);

    let result = modeler.cascade(&rid("root"), Some(1.0), Some(2)).await.unwrap();

    assert_eq!(result.levels.len(), 2);
    assert_eq!(result.terminated_by, TerminationReason::MaxDepth);
}

#[tokio::test]
async fn cascade_with_no_dependents_is_empty() {
    let graph = three_tier().await;
    let modeler = CascadeModeler::new(graph);

    // Nothing depends on web.
    let result = modeler.cascade(&rid("web"), None, None).await.unwrap();

    assert!(result.levels.is_empty());
    assert_eq!(result.expected_failures, 0.0);
    assert_eq!(result.terminated_by, TerminationReason::Exhausted);
}

#[tokio::test]
async fn cascade_expected_failures_weights_level_sizes() {
    let graph = star_graph(4).await;
    let modeler = CascadeModeler::new(graph);

    let result = modeler.cascade(&rid("hub"), Some(1.0), None).await.unwrap();

    assert_eq!(result.levels.len(), 1);
    assert_eq!(result.levels[0].affected.len(), 4);
    assert!((result.expected_failures - 0.3 * 4.0).abs() < 1e-12);
}

#[tokio::test]
async fn cascade_rejects_bad_probability() {
    let graph = three_tier().await;
    let modeler = CascadeModeler::new(graph);

    for bad in [-0.1, 1.5, f64::NAN] {
        let result = modeler.cascade(&rid("web"), Some(bad), None).await;
        assert!(matches!(result, Err(Error::InvalidInput(_))), "{bad} accepted");
    }
}

#[tokio::test]
async fn cascade_rejects_zero_depth() {
    let graph = three_tier().await;
    let modeler = CascadeModeler::new(graph);

    let result = modeler.cascade(&rid("web"), None, Some(0)).await;
    assert!(matches!(result, Err(Error::InvalidInput(_))));
}

#[tokio::test]
async fn custom_propagation_factor_is_honored() {
    let graph = dependent_chain(2).await;
    let config = CascadeConfig {
        propagation_factor: 0.5,
        ..CascadeConfig::default()
    };
    let modeler = CascadeModeler::with_config(graph, config);

    let result = modeler.cascade(&rid("root"), Some(1.0), None).await.unwrap();
    assert!((result.levels[0].probability - 0.5).abs() < 1e-12);
    assert!((result.levels[1].probability - 0.25).abs() < 1e-12);
}

#[tokio::test]
async fn bare_resource_scores_zero_risk() {
    let graph = three_tier().await;
    let scorer = RiskScorer::new(graph);

    // db carries no attributes and has no dependencies of its own.
    let assessment = scorer.score(&rid("db")).await.unwrap();

    assert!(assessment.risk_score >= 0.0 && assessment.risk_score <= 100.0);
    assert_eq!(assessment.dependency_count, 0);
    assert_eq!(assessment.risk_level, RiskLevel::Low);
}

#[tokio::test]
async fn spof_hub_is_flagged_with_recommendation() {
    let graph = star_graph(4).await;
    let scorer = RiskScorer::new(graph);

    let assessment = scorer.score(&rid("hub")).await.unwrap();

    assert!(assessment.is_spof);
    assert_eq!(assessment.dependent_count, 4);
    assert_eq!(assessment.blast_radius, 4);
    assert!(assessment
        .recommendations
        .iter()
        .any(|r| r.contains("redundant replica")));
}

#[tokio::test]
async fn criticality_raises_the_score() {
    let graph = star_graph(2).await;
    let mut critical = service("crit", "Critical Service");
    critical.attributes.criticality = Some(Criticality::High);
    graph.insert_resource(critical).await;

    let scorer = RiskScorer::new(graph);
    let hub = scorer.score(&rid("hub")).await.unwrap();
    let crit = scorer.score(&rid("crit")).await.unwrap();

    assert!(crit.risk_score > hub.risk_score);
    assert!(crit.risk_score >= 29.9, "criticality term alone contributes 30");
}

#[tokio::test]
async fn extreme_attribute_values_stay_in_bounds() {
    let graph = three_tier().await;
    let mut weird = service("weird", "Weird Service");
    weird.attributes.historical_failure_rate = Some(42.0);
    weird.attributes.test_coverage = Some(-3.0);
    weird.attributes.last_change_at = Some(Utc::now());
    graph.insert_resource(weird).await;

    let scorer = RiskScorer::new(graph);
    let assessment = scorer.score(&rid("weird")).await.unwrap();

    assert!(assessment.risk_score >= 0.0);
    assert!(assessment.risk_score <= 100.0);
    assert!(!assessment.risk_score.is_nan());
}

#[tokio::test]
async fn compare_summarizes_in_one_pass() {
    let graph = three_tier().await;
    let scorer = RiskScorer::new(graph);

    let ids = vec![rid("web"), rid("api"), rid("db"), rid("cache")];
    let comparison = scorer.compare(&ids).await.unwrap();

    assert_eq!(comparison.count, 4);
    assert!(comparison.min_score <= comparison.average_score);
    assert!(comparison.average_score <= comparison.max_score);
    let histogram_total: usize = comparison.histogram.values().sum();
    assert_eq!(histogram_total, 4);
}

#[tokio::test]
async fn compare_rejects_oversized_requests_before_graph_access() {
    let graph = three_tier().await;
    let scorer = RiskScorer::new(graph);

    // 51 nonexistent ids: the size check must fire before any lookup.
    let ids: Vec<ResourceId> = (0..=MAX_COMPARE_IDS)
        .map(|i| ResourceId::from(format!("ghost-{i}").as_str()))
        .collect();
    let result = scorer.compare(&ids).await;

    assert!(matches!(result, Err(Error::InvalidInput(_))));
}

#[tokio::test]
async fn compare_rejects_empty_requests() {
    let graph = three_tier().await;
    let scorer = RiskScorer::new(graph);

    let result = scorer.compare(&[]).await;
    assert!(matches!(result, Err(Error::InvalidInput(_))));
}

#[tokio::test]
async fn unknown_resource_is_an_error() {
    let graph = three_tier().await;
    let scorer = RiskScorer::new(graph);

    let result = scorer.score(&rid("ghost")).await;
    assert!(matches!(result, Err(Error::ResourceNotFound(_))));
}
