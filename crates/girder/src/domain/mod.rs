//! Domain types for the resource dependency graph.
//!
//! Resources and edges are owned by the external discovery layer; from the
//! engine's viewpoint a [`Resource`] is immutable and a [`DependencyEdge`]
//! is only touched through the idempotent confirmation upsert performed
//! after verification.

pub mod tag_rules;

use chrono::{DateTime, Duration, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Unique identifier for a resource.
///
/// Identity is globally unique and stable across rediscovery; it is
/// assigned by the external discovery layer, never generated here.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub struct ResourceId(pub String);

impl ResourceId {
    /// Create a new resource ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ResourceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ResourceId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Which cloud (or on-premises estate) a resource lives in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum CloudProvider {
    /// Microsoft Azure.
    Azure,

    /// Amazon Web Services.
    Aws,

    /// Google Cloud Platform.
    Gcp,

    /// Self-hosted / on-premises.
    OnPrem,

    /// Anything else (SaaS vendors, unknown estates).
    #[default]
    Other,
}

/// Coarse service category, derived from a resource's type string.
///
/// Used to bucket affected resources during impact analysis and to apply
/// criticality rules.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ServiceCategory {
    /// Directly serves end users (web apps, CDNs, gateways).
    UserFacing,

    /// Internal services and APIs.
    BackendService,

    /// Databases, caches, object storage.
    DataStore,

    /// Networks, clusters, DNS, load balancers.
    Infrastructure,

    /// Queues, topics, event buses, third-party integrations.
    Integration,

    /// Mobile or desktop client applications.
    ClientApp,
}

impl ServiceCategory {
    /// Derive the category from a free-form resource type string.
    ///
    /// The mapping is substring-based over the lowercased type and errs
    /// toward [`ServiceCategory::BackendService`] for unknown types.
    #[must_use]
    pub fn classify(resource_type: &str) -> Self {
        let ty = resource_type.to_lowercase();

        const DATA_STORE: &[&str] = &[
            "sql", "database", "cosmos", "dynamo", "storage", "cache", "redis", "blob", "bucket",
        ];
        const USER_FACING: &[&str] = &["web", "frontend", "cdn", "gateway", "portal", "site"];
        const INFRASTRUCTURE: &[&str] = &[
            "vnet", "subnet", "network", "load_balancer", "loadbalancer", "dns", "firewall",
            "cluster", "node_pool",
        ];
        const INTEGRATION: &[&str] = &["queue", "topic", "event", "bus", "webhook", "connector"];
        const CLIENT_APP: &[&str] = &["mobile", "desktop", "client_app"];

        let matches = |needles: &[&str]| needles.iter().any(|n| ty.contains(n));

        if matches(DATA_STORE) {
            Self::DataStore
        } else if matches(INFRASTRUCTURE) {
            Self::Infrastructure
        } else if matches(INTEGRATION) {
            Self::Integration
        } else if matches(CLIENT_APP) {
            Self::ClientApp
        } else if matches(USER_FACING) {
            Self::UserFacing
        } else {
            Self::BackendService
        }
    }
}

/// Business criticality of a resource, inferred from tags or set by the
/// discovery layer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Criticality {
    /// Failure is an inconvenience.
    Low,

    /// Failure degrades service.
    Medium,

    /// Failure is an outage.
    High,
}

impl Criticality {
    /// Normalized contribution to the risk score, in `[0, 100]`.
    #[must_use]
    pub fn as_score(self) -> f64 {
        match self {
            Self::Low => 20.0,
            Self::Medium => 60.0,
            Self::High => 100.0,
        }
    }
}

/// Deployment environment of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    /// Serving real traffic.
    Production,

    /// Pre-production validation.
    Staging,

    /// Development and experimentation.
    Development,
}

/// Attributes inferred once at ingestion (tag rules) or supplied by the
/// discovery layer, consumed read-only by the scorers.
///
/// Every field is optional: a missing factor contributes zero to any score,
/// never an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct InferredAttributes {
    /// Deployment environment, inferred from tags.
    pub environment: Option<Environment>,

    /// Business criticality, inferred from tags.
    pub criticality: Option<Criticality>,

    /// Fraction of time windows with incidents, in `[0, 1]`.
    pub historical_failure_rate: Option<f64>,

    /// When the resource configuration last changed.
    pub last_change_at: Option<DateTime<Utc>>,

    /// Test coverage fraction for the deployed artifact, in `[0, 1]`.
    pub test_coverage: Option<f64>,
}

/// Typed property schemas for the resource kinds the engine reads, plus an
/// opaque bag for provider-specific extras.
///
/// The analyzer only ever reads typed fields; nothing in the engine
/// inspects the `Custom` map.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "schema", rename_all = "snake_case")]
pub enum ResourceProperties {
    /// Compute workloads (VMs, containers, functions).
    Compute {
        /// Instance size / SKU, if known.
        size: Option<String>,
        /// Number of instances behind this resource.
        instance_count: Option<u32>,
    },

    /// Databases, caches, and storage accounts.
    DataStore {
        /// Database engine or storage kind.
        engine: Option<String>,
        /// Whether the store is replicated across failure domains.
        replicated: bool,
    },

    /// Load balancers and traffic managers.
    LoadBalancer {
        /// Number of backends in the pool.
        backend_count: u32,
    },

    /// Queues, topics, and event hubs.
    Messaging {
        /// Maximum queue depth before backpressure, if bounded.
        queue_depth_limit: Option<u64>,
    },

    /// Provider-specific attributes the engine does not interpret.
    Custom(BTreeMap<String, serde_json::Value>),
}

impl Default for ResourceProperties {
    fn default() -> Self {
        Self::Custom(BTreeMap::new())
    }
}

/// An infrastructure resource: one node in the dependency graph.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Resource {
    /// Unique, stable identifier.
    pub id: ResourceId,

    /// Display name.
    pub name: String,

    /// Free-form type string from the discovery layer
    /// (e.g. `"azure.web_app"`, `"aws.rds_instance"`).
    pub resource_type: String,

    /// Cloud estate the resource lives in.
    pub provider: CloudProvider,

    /// Region, if the resource is regional.
    pub region: Option<String>,

    /// Free-form tags from the discovery layer.
    pub tags: BTreeMap<String, String>,

    /// Typed properties for the schemas the engine reads.
    pub properties: ResourceProperties,

    /// Attributes inferred at ingestion.
    pub attributes: InferredAttributes,
}

impl Resource {
    /// Create a resource with the given identity and type; all optional
    /// data starts empty.
    pub fn new(id: impl Into<ResourceId>, name: impl Into<String>, resource_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            resource_type: resource_type.into(),
            provider: CloudProvider::default(),
            region: None,
            tags: BTreeMap::new(),
            properties: ResourceProperties::default(),
            attributes: InferredAttributes::default(),
        }
    }

    /// The coarse service category of this resource.
    #[must_use]
    pub fn category(&self) -> ServiceCategory {
        ServiceCategory::classify(&self.resource_type)
    }

    /// Whether the resource is flagged business-critical.
    #[must_use]
    pub fn is_high_criticality(&self) -> bool {
        self.attributes.criticality == Some(Criticality::High)
    }
}

/// Kind of relationship an edge expresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Source depends on target. The relationship all analyses traverse.
    DependsOn,

    /// Source and target are redundant replicas of one another. Consulted
    /// only by SPOF detection.
    RedundantWith,
}

/// What layer a dependency operates at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EdgeCategory {
    /// Network reachability (routes, peering, load-balancer pools).
    Network,

    /// Data flow (reads/writes to a store).
    Data,

    /// Configuration reference (connection strings, app settings).
    Configuration,

    /// Shared compute (same host, cluster, runtime).
    Compute,
}

/// Whether the dependency is load-bearing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DependencyType {
    /// Source cannot function without target.
    Required,

    /// Source degrades gracefully without target.
    Optional,
}

/// How an edge entered the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryMethod {
    /// Asserted by an operator.
    Manual,

    /// Found by network/topology scanning.
    TopologyScan,

    /// Found by configuration inspection.
    ConfigInspection,

    /// Found by distributed-trace analysis.
    TraceAnalysis,

    /// Found by traffic-metrics correlation.
    MetricsCorrelation,

    /// Confirmed by the evidence aggregator.
    Verification,
}

/// A directed dependency edge: `source_id` depends on `target_id`.
///
/// At most one edge exists per `(source, target, kind)` triple — edges are
/// upserted, never appended. Re-verification overwrites `strength`,
/// `discovered_method`, and `last_confirmed_at`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DependencyEdge {
    /// The dependent resource.
    pub source_id: ResourceId,

    /// The resource being depended upon.
    pub target_id: ResourceId,

    /// Relationship kind.
    pub kind: EdgeKind,

    /// Layer the dependency operates at.
    pub category: EdgeCategory,

    /// Whether the dependency is load-bearing.
    pub dependency_type: DependencyType,

    /// Confidence that the edge is real, in `[0, 1]`, as stored at the last
    /// confirmation. Read through [`DependencyEdge::strength_at`] to apply
    /// decay.
    pub strength: f64,

    /// How the edge entered the graph.
    pub discovered_method: DiscoveryMethod,

    /// When the edge was last confirmed by any method.
    pub last_confirmed_at: DateTime<Utc>,
}

impl DependencyEdge {
    /// Create a required, network-category `DependsOn` edge with the given
    /// strength, confirmed now.
    pub fn depends_on(
        source: impl Into<ResourceId>,
        target: impl Into<ResourceId>,
        strength: f64,
    ) -> Self {
        Self {
            source_id: source.into(),
            target_id: target.into(),
            kind: EdgeKind::DependsOn,
            category: EdgeCategory::Network,
            dependency_type: DependencyType::Required,
            strength: clamp_unit(strength),
            discovered_method: DiscoveryMethod::Manual,
            last_confirmed_at: Utc::now(),
        }
    }

    /// Create a `RedundantWith` edge between two replicas.
    pub fn redundant_with(source: impl Into<ResourceId>, target: impl Into<ResourceId>) -> Self {
        Self {
            source_id: source.into(),
            target_id: target.into(),
            kind: EdgeKind::RedundantWith,
            category: EdgeCategory::Compute,
            dependency_type: DependencyType::Optional,
            strength: 1.0,
            discovered_method: DiscoveryMethod::Manual,
            last_confirmed_at: Utc::now(),
        }
    }

    /// Set the edge category.
    #[must_use]
    pub fn with_category(mut self, category: EdgeCategory) -> Self {
        self.category = category;
        self
    }

    /// Set the dependency type.
    #[must_use]
    pub fn with_dependency_type(mut self, dependency_type: DependencyType) -> Self {
        self.dependency_type = dependency_type;
        self
    }

    /// Set the discovery method.
    #[must_use]
    pub fn with_discovered_method(mut self, method: DiscoveryMethod) -> Self {
        self.discovered_method = method;
        self
    }

    /// Set the confirmation timestamp.
    #[must_use]
    pub fn confirmed_at(mut self, at: DateTime<Utc>) -> Self {
        self.last_confirmed_at = at;
        self
    }

    /// Effective strength at `now`, with exponential decay applied.
    ///
    /// An edge that has not been reconfirmed within the decay half-life
    /// loses strength rather than being deleted, which keeps "stale"
    /// distinguishable from "never existed". Decay never pushes the result
    /// below the policy floor, and the floor never lifts an edge above its
    /// stored strength.
    #[must_use]
    pub fn strength_at(&self, now: DateTime<Utc>, policy: &DecayPolicy) -> f64 {
        let stored = clamp_unit(self.strength);
        let age = now - self.last_confirmed_at;
        if age <= Duration::zero() {
            return stored;
        }
        let half_lives = age.num_seconds() as f64 / policy.half_life.num_seconds() as f64;
        let decayed = stored * 0.5_f64.powf(half_lives);
        decayed.max(policy.strength_floor.min(stored))
    }
}

/// Exponential decay policy for unconfirmed edges.
///
/// Decay is computed on read; the stored strength is only rewritten when an
/// edge is reconfirmed, which re-anchors the decay clock.
#[derive(Debug, Clone)]
pub struct DecayPolicy {
    /// Time for an unconfirmed edge to lose half its strength.
    pub half_life: Duration,

    /// Effective strength never decays below this floor.
    pub strength_floor: f64,
}

impl Default for DecayPolicy {
    fn default() -> Self {
        Self {
            half_life: Duration::days(14),
            strength_floor: 0.05,
        }
    }
}

/// Clamp a raw score into `[0, 1]`, mapping NaN to zero.
pub(crate) fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// A lightweight reference to a resource, carried inside analysis results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ResourceRef {
    /// Resource identifier.
    pub id: ResourceId,

    /// Display name at analysis time.
    pub name: String,

    /// Service category at analysis time.
    pub category: ServiceCategory,
}

impl ResourceRef {
    /// Snapshot a reference from a resource.
    #[must_use]
    pub fn of(resource: &Resource) -> Self {
        Self {
            id: resource.id.clone(),
            name: resource.name.clone(),
            category: resource.category(),
        }
    }
}
