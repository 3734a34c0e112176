//! Policy and simulation configuration
//!
//! Loaded from TOML; every field has a default so an empty file is valid.
//!
//! ```toml
//! tick_interval_ms = 1000
//! advance_probability = 0.3
//! prune_probability = 0.1
//! spawn_probability = 0.15
//! seed = 42
//! kill_switch = false
//!
//! [policy]
//! approval_threshold = 10000
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default auto-approval threshold
pub const DEFAULT_APPROVAL_THRESHOLD: i64 = 10_000;

/// Guardrail applied in the decision stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyConfig {
    /// Amounts strictly below this auto-approve.
    ///
    /// Missing or non-numeric values deserialize to 0, which sends every
    /// case to manual review.
    #[serde(default, deserialize_with = "lenient_amount", alias = "approval_threshold")]
    pub approval_threshold: i64,
}

impl PolicyConfig {
    #[inline]
    #[must_use]
    pub const fn new(approval_threshold: i64) -> Self {
        Self { approval_threshold }
    }

    /// Strict less-than: an amount equal to the threshold goes to review
    #[inline]
    #[must_use]
    pub const fn auto_approves(&self, amount: i64) -> bool {
        amount < self.approval_threshold
    }

    #[must_use]
    pub const fn risk_level(&self) -> RiskLevel {
        if self.approval_threshold < 5_000 {
            RiskLevel::Conservative
        } else if self.approval_threshold < 20_000 {
            RiskLevel::Balanced
        } else {
            RiskLevel::Aggressive
        }
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self::new(DEFAULT_APPROVAL_THRESHOLD)
    }
}

/// How much the current threshold lets through unattended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Conservative,
    Balanced,
    Aggressive,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            RiskLevel::Conservative => "CONSERVATIVE",
            RiskLevel::Balanced => "BALANCED",
            RiskLevel::Aggressive => "AGGRESSIVE",
        })
    }
}

/// Accept integers, floats and numeric strings; anything else is 0.
///
/// Fractional thresholds round up: amounts are whole, so `amount < ceil(t)`
/// holds exactly when `amount < t`.
fn lenient_amount<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde_json::Value;

    let amount = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(ceil_amount)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(ceil_amount))
        }
        _ => None,
    };
    Ok(amount.unwrap_or(0))
}

/// NaN maps to 0; infinities saturate
#[allow(clippy::cast_possible_truncation)]
fn ceil_amount(value: f64) -> i64 {
    value.ceil() as i64
}

/// Orchestration loop settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Milliseconds between ticks
    pub tick_interval_ms: u64,
    /// Per-tick chance an active record advances
    pub advance_probability: f64,
    /// Per-tick chance a completed record is dropped
    pub prune_probability: f64,
    /// Per-tick chance a new signal appears
    pub spawn_probability: f64,
    /// Seed for a reproducible session; random when absent
    pub seed: Option<u64>,
    /// Kill switch state at start
    pub kill_switch: bool,
    pub policy: PolicyConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            advance_probability: 0.3,
            prune_probability: 0.1,
            spawn_probability: 0.15,
            seed: None,
            kill_switch: false,
            policy: PolicyConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Parse and validate TOML
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&input)
    }

    /// Reject probabilities outside `[0, 1]` and a zero interval
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("advance_probability", self.advance_probability),
            ("prune_probability", self.prune_probability),
            ("spawn_probability", self.spawn_probability),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidProbability { field, value });
            }
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::InvalidInterval);
        }
        Ok(())
    }

    #[inline]
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[must_use]
    pub fn with_threshold(mut self, approval_threshold: i64) -> Self {
        self.policy = PolicyConfig::new(approval_threshold);
        self
    }

    #[must_use]
    pub fn with_kill_switch(mut self, active: bool) -> Self {
        self.kill_switch = active;
        self
    }
}
