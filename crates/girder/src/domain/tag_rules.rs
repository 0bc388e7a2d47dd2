//! Tag-based attribute inference.
//!
//! Discovery layers attach free-form tags (`env=prod`, `tier: critical`,
//! `costcenter=1234`). Environment and criticality are inferred from those
//! tags **once at ingestion** through an explicit rule table, so the
//! scorers stay pure functions of already-typed attributes and no tag
//! parsing happens at analysis time.
//!
//! Rules match case-insensitively against each tag rendered as
//! `"key=value"`. The first matching rule per attribute wins; rules are
//! ordered most-specific first.

use super::{Criticality, Environment, InferredAttributes};
use std::collections::BTreeMap;

/// The attribute a rule infers when its pattern matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InferredValue {
    /// Sets `attributes.environment`.
    Environment(Environment),

    /// Sets `attributes.criticality`.
    Criticality(Criticality),
}

/// One inference rule: a lowercase substring pattern over `"key=value"`.
#[derive(Debug, Clone, Copy)]
pub struct TagRule {
    /// Lowercase substring to search for.
    pub pattern: &'static str,

    /// Attribute value inferred on match.
    pub value: InferredValue,
}

/// The default rule table, ordered most-specific first.
pub const DEFAULT_RULES: &[TagRule] = &[
    // Environment
    TagRule { pattern: "env=prod", value: InferredValue::Environment(Environment::Production) },
    TagRule { pattern: "environment=prod", value: InferredValue::Environment(Environment::Production) },
    TagRule { pattern: "env=stag", value: InferredValue::Environment(Environment::Staging) },
    TagRule { pattern: "environment=stag", value: InferredValue::Environment(Environment::Staging) },
    TagRule { pattern: "env=dev", value: InferredValue::Environment(Environment::Development) },
    TagRule { pattern: "environment=dev", value: InferredValue::Environment(Environment::Development) },
    // Criticality
    TagRule { pattern: "tier=critical", value: InferredValue::Criticality(Criticality::High) },
    TagRule { pattern: "criticality=high", value: InferredValue::Criticality(Criticality::High) },
    TagRule { pattern: "tier=1", value: InferredValue::Criticality(Criticality::High) },
    TagRule { pattern: "criticality=medium", value: InferredValue::Criticality(Criticality::Medium) },
    TagRule { pattern: "tier=2", value: InferredValue::Criticality(Criticality::Medium) },
    TagRule { pattern: "criticality=low", value: InferredValue::Criticality(Criticality::Low) },
    TagRule { pattern: "tier=3", value: InferredValue::Criticality(Criticality::Low) },
];

/// Infer environment and criticality from tags using the default rules.
///
/// Already-set attributes are preserved: inference only fills gaps, so a
/// discovery layer that supplies explicit attributes always wins.
pub fn apply(tags: &BTreeMap<String, String>, attributes: &mut InferredAttributes) {
    apply_rules(DEFAULT_RULES, tags, attributes);
}

/// Infer attributes using a caller-supplied rule table.
pub fn apply_rules(
    rules: &[TagRule],
    tags: &BTreeMap<String, String>,
    attributes: &mut InferredAttributes,
) {
    let rendered: Vec<String> = tags
        .iter()
        .map(|(k, v)| format!("{}={}", k.to_lowercase(), v.to_lowercase()))
        .collect();

    for rule in rules {
        match rule.value {
            InferredValue::Environment(env) => {
                if attributes.environment.is_none()
                    && rendered.iter().any(|t| t.contains(rule.pattern))
                {
                    attributes.environment = Some(env);
                }
            }
            InferredValue::Criticality(level) => {
                if attributes.criticality.is_none()
                    && rendered.iter().any(|t| t.contains(rule.pattern))
                {
                    attributes.criticality = Some(level);
                }
            }
        }
    }
}
