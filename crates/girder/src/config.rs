//! Engine configuration.
//!
//! All tunables live in one [`EngineConfig`] loaded from a YAML file (or
//! built in code via `Default`). Defaults are the documented contract
//! values; `validate()` rejects out-of-range tunables before any engine
//! component sees them.

use crate::domain::DecayPolicy;
use crate::error::{Error, Result};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

/// Evidence-gathering and scoring tunables.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VerificationConfig {
    /// Per-provider timeout in seconds; an expired provider is treated as
    /// absent, never as a failure.
    #[serde(default = "default_provider_timeout_secs")]
    pub provider_timeout_secs: u64,

    /// Observation window applied when the caller does not supply one.
    #[serde(default = "default_window_hours")]
    pub default_window_hours: u32,

    /// Verification-score threshold at which an edge counts as verified.
    #[serde(default = "default_verified_threshold")]
    pub verified_threshold: f64,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            provider_timeout_secs: default_provider_timeout_secs(),
            default_window_hours: default_window_hours(),
            verified_threshold: default_verified_threshold(),
        }
    }
}

/// Edge strength decay tunables.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DecayConfig {
    /// Days for an unconfirmed edge to lose half its strength.
    #[serde(default = "default_half_life_days")]
    pub half_life_days: u32,

    /// Effective strength never decays below this floor.
    #[serde(default = "default_strength_floor")]
    pub strength_floor: f64,
}

impl DecayConfig {
    /// The decay policy this configuration describes.
    #[must_use]
    pub fn policy(&self) -> DecayPolicy {
        DecayPolicy {
            half_life: Duration::days(i64::from(self.half_life_days)),
            strength_floor: self.strength_floor,
        }
    }
}

impl Default for DecayConfig {
    fn default() -> Self {
        Self {
            half_life_days: default_half_life_days(),
            strength_floor: default_strength_floor(),
        }
    }
}

/// Cascading-failure model tunables.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CascadeConfig {
    /// Per-level failure propagation factor in `(0, 1)`, modeling circuit
    /// breakers, retries, and fallbacks.
    #[serde(default = "default_propagation_factor")]
    pub propagation_factor: f64,

    /// The cascade stops once level probability falls below this.
    #[serde(default = "default_min_probability")]
    pub min_probability: f64,

    /// Maximum number of cascade levels.
    #[serde(default = "default_cascade_max_depth")]
    pub max_depth: u32,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            propagation_factor: default_propagation_factor(),
            min_probability: default_min_probability(),
            max_depth: default_cascade_max_depth(),
        }
    }
}

/// Blast-radius traversal tunables.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImpactConfig {
    /// Depth applied when the caller does not supply one.
    #[serde(default = "default_impact_depth")]
    pub default_max_depth: u32,

    /// Hard ceiling on caller-supplied depth.
    #[serde(default = "default_impact_depth_limit")]
    pub max_depth_limit: u32,
}

impl Default for ImpactConfig {
    fn default() -> Self {
        Self {
            default_max_depth: default_impact_depth(),
            max_depth_limit: default_impact_depth_limit(),
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    /// Evidence-gathering and scoring tunables.
    #[serde(default)]
    pub verification: VerificationConfig,

    /// Edge strength decay tunables.
    #[serde(default)]
    pub decay: DecayConfig,

    /// Cascading-failure model tunables.
    #[serde(default)]
    pub cascade: CascadeConfig,

    /// Blast-radius traversal tunables.
    #[serde(default)]
    pub impact: ImpactConfig,
}

impl EngineConfig {
    /// Load and validate configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be read, `Error::Config` if
    /// it cannot be parsed or fails validation.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        let config: Self =
            serde_yaml::from_str(&content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to a YAML file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` on serialization failure, `Error::Io` on
    /// write failure.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content =
            serde_yaml::to_string(self).map_err(|e| Error::Config(format!("YAML error: {e}")))?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// Check that every tunable is in its legal range.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` naming the offending field.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.verification.verified_threshold) {
            return Err(Error::Config(format!(
                "verified_threshold must be in [0, 1], got {}",
                self.verification.verified_threshold
            )));
        }
        if self.verification.provider_timeout_secs == 0 {
            return Err(Error::Config(
                "provider_timeout_secs must be at least 1".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.cascade.propagation_factor)
            || self.cascade.propagation_factor == 0.0
        {
            return Err(Error::Config(format!(
                "propagation_factor must be in (0, 1), got {}",
                self.cascade.propagation_factor
            )));
        }
        if !(0.0..=1.0).contains(&self.cascade.min_probability) {
            return Err(Error::Config(format!(
                "min_probability must be in [0, 1], got {}",
                self.cascade.min_probability
            )));
        }
        if self.cascade.max_depth == 0 {
            return Err(Error::Config("cascade max_depth must be at least 1".to_string()));
        }
        if self.decay.half_life_days == 0 {
            return Err(Error::Config("half_life_days must be at least 1".to_string()));
        }
        if !(0.0..=1.0).contains(&self.decay.strength_floor) {
            return Err(Error::Config(format!(
                "strength_floor must be in [0, 1], got {}",
                self.decay.strength_floor
            )));
        }
        if self.impact.default_max_depth == 0 || self.impact.max_depth_limit == 0 {
            return Err(Error::Config("impact depths must be at least 1".to_string()));
        }
        Ok(())
    }
}

fn default_provider_timeout_secs() -> u64 {
    10
}

fn default_window_hours() -> u32 {
    24
}

fn default_verified_threshold() -> f64 {
    0.6
}

fn default_half_life_days() -> u32 {
    14
}

fn default_strength_floor() -> f64 {
    0.05
}

fn default_propagation_factor() -> f64 {
    0.30
}

fn default_min_probability() -> f64 {
    0.01
}

fn default_cascade_max_depth() -> u32 {
    5
}

fn default_impact_depth() -> u32 {
    3
}

fn default_impact_depth_limit() -> u32 {
    10
}
