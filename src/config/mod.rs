//! Typed Configuration
//!
//! Strongly-typed hyperparameter and lifecycle configuration, validated at
//! load time so invalid combinations fail fast at startup instead of
//! mid-training.
//!
//! # Example
//!
//! ```
//! use promover::config::{ForecasterParams, MaxDepth};
//!
//! let yaml = "n_estimators: 200\nmax_depth: unbounded\nmin_samples_split: 4\nrandom_state: 7\n";
//! let params: ForecasterParams = serde_yaml::from_str(yaml).expect("valid YAML");
//! params.validate().expect("valid params");
//! assert_eq!(params.max_depth, MaxDepth::Unbounded);
//! ```

#[cfg(test)]
mod tests;

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Configuration errors, raised at load time.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid n_estimators: {0} (must be > 0)")]
    InvalidNEstimators(u32),

    #[error("invalid max_depth: {0} (must be > 0 or \"unbounded\")")]
    InvalidMaxDepth(u32),

    #[error("invalid min_samples_split: {0} (must be >= 2)")]
    InvalidMinSamplesSplit(u32),

    #[error("invalid regression_tolerance: {0} (must be a finite value >= 0.0)")]
    InvalidRegressionTolerance(f64),

    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse config file: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type for configuration loading and validation.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Maximum tree depth: a positive bound, or unbounded growth.
///
/// Serialized as an integer or the literal string `"unbounded"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxDepth {
    /// Grow trees to at most this depth.
    Bounded(u32),
    /// No depth limit.
    Unbounded,
}

impl Serialize for MaxDepth {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            MaxDepth::Bounded(depth) => serializer.serialize_u32(*depth),
            MaxDepth::Unbounded => serializer.serialize_str("unbounded"),
        }
    }
}

impl<'de> Deserialize<'de> for MaxDepth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct MaxDepthVisitor;

        impl Visitor<'_> for MaxDepthVisitor {
            type Value = MaxDepth;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a positive integer or the string \"unbounded\"")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<MaxDepth, E> {
                u32::try_from(v)
                    .map(MaxDepth::Bounded)
                    .map_err(|_| E::custom(format!("max_depth {v} out of range")))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<MaxDepth, E> {
                u32::try_from(v)
                    .map(MaxDepth::Bounded)
                    .map_err(|_| E::custom(format!("max_depth {v} out of range")))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<MaxDepth, E> {
                if v == "unbounded" {
                    Ok(MaxDepth::Unbounded)
                } else {
                    Err(E::custom(format!("unrecognized max_depth keyword: {v:?}")))
                }
            }
        }

        deserializer.deserialize_any(MaxDepthVisitor)
    }
}

impl fmt::Display for MaxDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaxDepth::Bounded(depth) => write!(f, "{depth}"),
            MaxDepth::Unbounded => f.write_str("unbounded"),
        }
    }
}

/// Hyperparameters for the tabular forecaster, recorded on every registered
/// artifact for reproducibility and audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ForecasterParams {
    /// Number of trees in the ensemble.
    #[serde(default = "default_n_estimators")]
    pub n_estimators: u32,
    /// Maximum tree depth.
    #[serde(default = "default_max_depth")]
    pub max_depth: MaxDepth,
    /// Minimum samples required to split an internal node.
    #[serde(default = "default_min_samples_split")]
    pub min_samples_split: u32,
    /// Seed for deterministic training.
    #[serde(default = "default_random_state")]
    pub random_state: u64,
}

fn default_n_estimators() -> u32 {
    100
}

fn default_max_depth() -> MaxDepth {
    MaxDepth::Unbounded
}

fn default_min_samples_split() -> u32 {
    2
}

fn default_random_state() -> u64 {
    42
}

impl Default for ForecasterParams {
    fn default() -> Self {
        Self {
            n_estimators: default_n_estimators(),
            max_depth: default_max_depth(),
            min_samples_split: default_min_samples_split(),
            random_state: default_random_state(),
        }
    }
}

impl ForecasterParams {
    /// Validate all fields.
    ///
    /// # Errors
    ///
    /// Returns the first failing field check.
    pub fn validate(&self) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(ConfigError::InvalidNEstimators(self.n_estimators));
        }
        if let MaxDepth::Bounded(depth) = self.max_depth {
            if depth == 0 {
                return Err(ConfigError::InvalidMaxDepth(depth));
            }
        }
        if self.min_samples_split < 2 {
            return Err(ConfigError::InvalidMinSamplesSplit(self.min_samples_split));
        }
        Ok(())
    }
}

/// Thresholds consulted by the promotion gate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PromotionThresholds {
    /// Tolerated fractional RMSE regression. Zero means the candidate must
    /// not be worse than the baseline.
    #[serde(default)]
    pub regression_tolerance: f64,
}

impl Default for PromotionThresholds {
    fn default() -> Self {
        Self { regression_tolerance: 0.0 }
    }
}

impl PromotionThresholds {
    /// Validate the tolerance.
    pub fn validate(&self) -> Result<()> {
        if !self.regression_tolerance.is_finite() || self.regression_tolerance < 0.0 {
            return Err(ConfigError::InvalidRegressionTolerance(self.regression_tolerance));
        }
        Ok(())
    }
}

/// Top-level configuration for the operator CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LifecycleConfig {
    /// Directory holding one registry document per model name.
    #[serde(default = "default_registry_dir")]
    pub registry_dir: PathBuf,
    /// JSON-lines audit log destination; `None` disables the file sink.
    #[serde(default)]
    pub audit_log: Option<PathBuf>,
    /// Promotion gate thresholds.
    #[serde(default)]
    pub thresholds: PromotionThresholds,
    /// Bounded wait for the per-model exclusive section, in milliseconds.
    #[serde(default = "default_lock_wait_ms")]
    pub lock_wait_ms: u64,
}

fn default_registry_dir() -> PathBuf {
    PathBuf::from("registry")
}

fn default_lock_wait_ms() -> u64 {
    5000
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            registry_dir: default_registry_dir(),
            audit_log: None,
            thresholds: PromotionThresholds::default(),
            lock_wait_ms: default_lock_wait_ms(),
        }
    }
}

impl LifecycleConfig {
    /// Bounded lock wait as a [`Duration`].
    #[must_use]
    pub fn lock_wait(&self) -> Duration {
        Duration::from_millis(self.lock_wait_ms)
    }

    /// Validate nested thresholds.
    pub fn validate(&self) -> Result<()> {
        self.thresholds.validate()
    }
}

/// Load and validate forecaster hyperparameters from a YAML file.
pub fn load_params(path: impl AsRef<Path>) -> Result<ForecasterParams> {
    let text = std::fs::read_to_string(path)?;
    let params: ForecasterParams = serde_yaml::from_str(&text)?;
    params.validate()?;
    Ok(params)
}

/// Load and validate the lifecycle configuration from a YAML file.
pub fn load_lifecycle_config(path: impl AsRef<Path>) -> Result<LifecycleConfig> {
    let text = std::fs::read_to_string(path)?;
    let config: LifecycleConfig = serde_yaml::from_str(&text)?;
    config.validate()?;
    Ok(config)
}
