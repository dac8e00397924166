//! Simulation knobs, loaded from TOML.
//!
//! ```toml
//! messages = 200
//! loss_prob = 0.2
//! corrupt_prob = 0.1
//! mean_interarrival_ms = 10000
//! seed = 7
//!
//! [protocol]
//! window_size = 6
//! rtt_ms = 16000
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use selrep_transport::config::{ProtocolConfig, ProtocolConfigInput};
use selrep_transport::error::ConfigError;

pub const DEFAULT_MESSAGES: u64 = 100;
pub const DEFAULT_MEAN_INTERARRIVAL: Duration = Duration::from_secs(10);
pub const DEFAULT_SEED: u64 = 1;
/// Hard stop for runs that cannot finish, e.g. a channel that drops
/// everything.
pub const DEFAULT_MAX_TIME: Duration = Duration::from_secs(1_000_000);

#[derive(Debug, Error)]
pub enum SimConfigError {
    #[error("invalid simulation TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error(transparent)]
    Protocol(#[from] ConfigError),
    #[error("{name} must be within [0, 1], got {value}")]
    Probability { name: &'static str, value: f64 },
    #[error("max_time_ms must be positive")]
    ZeroMaxTime,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SimConfigInput {
    pub protocol: ProtocolConfigInput,
    pub messages: Option<u64>,
    pub loss_prob: Option<f64>,
    pub corrupt_prob: Option<f64>,
    pub mean_interarrival_ms: Option<u64>,
    pub seed: Option<u64>,
    pub max_time_ms: Option<u64>,
}

/// Resolved simulation parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    pub protocol: ProtocolConfig,
    /// Application messages to generate at peer A.
    pub messages: u64,
    /// Per-packet loss probability, each direction.
    pub loss_prob: f64,
    /// Per-packet corruption probability, each direction.
    pub corrupt_prob: f64,
    /// λ: interarrival gaps are uniform in `[0, 2λ]`.
    pub mean_interarrival: Duration,
    pub seed: u64,
    pub max_time: Duration,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            protocol: ProtocolConfig::default(),
            messages: DEFAULT_MESSAGES,
            loss_prob: 0.0,
            corrupt_prob: 0.0,
            mean_interarrival: DEFAULT_MEAN_INTERARRIVAL,
            seed: DEFAULT_SEED,
            max_time: DEFAULT_MAX_TIME,
        }
    }
}

impl SimConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, SimConfigError> {
        SimConfigInput::from_toml_str(input)?.resolve()
    }

    /// Flat view for reports.
    pub fn echo(&self) -> ConfigEcho {
        ConfigEcho {
            window_size: self.protocol.window_size,
            seq_space: self.protocol.seq_space().size(),
            rtt_ms: self.protocol.rtt.as_millis() as u64,
            messages: self.messages,
            loss_prob: self.loss_prob,
            corrupt_prob: self.corrupt_prob,
            mean_interarrival_ms: self.mean_interarrival.as_millis() as u64,
            seed: self.seed,
            max_time_ms: self.max_time.as_millis() as u64,
        }
    }
}

impl SimConfigInput {
    pub fn from_toml_str(input: &str) -> Result<Self, SimConfigError> {
        if input.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(toml::from_str(input)?)
    }

    pub fn resolve(self) -> Result<SimConfig, SimConfigError> {
        let defaults = SimConfig::default();
        let loss_prob = probability("loss_prob", self.loss_prob.unwrap_or(defaults.loss_prob))?;
        let corrupt_prob = probability(
            "corrupt_prob",
            self.corrupt_prob.unwrap_or(defaults.corrupt_prob),
        )?;
        let max_time = self
            .max_time_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.max_time);
        if max_time.is_zero() {
            return Err(SimConfigError::ZeroMaxTime);
        }

        Ok(SimConfig {
            protocol: self.protocol.resolve()?,
            messages: self.messages.unwrap_or(defaults.messages),
            loss_prob,
            corrupt_prob,
            mean_interarrival: self
                .mean_interarrival_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.mean_interarrival),
            seed: self.seed.unwrap_or(defaults.seed),
            max_time,
        })
    }
}

fn probability(name: &'static str, value: f64) -> Result<f64, SimConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(SimConfigError::Probability { name, value })
    }
}

/// The resolved configuration as it appears in a JSON report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigEcho {
    pub window_size: usize,
    pub seq_space: i32,
    pub rtt_ms: u64,
    pub messages: u64,
    pub loss_prob: f64,
    pub corrupt_prob: f64,
    pub mean_interarrival_ms: u64,
    pub seed: u64,
    pub max_time_ms: u64,
}
