//! # Protocol Configuration
//!
//! Window size and retransmission timeout shared by both peers, with TOML
//! input resolved through [`ProtocolConfigInput::resolve`].

use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::seq::SeqSpace;

/// Largest accepted window. Keeps `2 × window` well inside the `i32`
/// header fields.
pub const MAX_WINDOW_SIZE: usize = 1 << 15;

pub const DEFAULT_WINDOW_SIZE: usize = 6;
pub const DEFAULT_RTT: Duration = Duration::from_secs(16);

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProtocolConfigInput {
    pub window_size: Option<usize>,
    pub rtt_ms: Option<u64>,
}

/// Protocol constants shared by both peers.
///
/// The sequence space is not configurable: it is always twice the window,
/// the minimum at which Selective Repeat stays unambiguous.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolConfig {
    /// Maximum unacknowledged packets at the sender, and receive window size.
    pub window_size: usize,
    /// Fixed retransmission timeout.
    pub rtt: Duration,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            rtt: DEFAULT_RTT,
        }
    }
}

impl ProtocolConfig {
    /// Validated constructor.
    pub fn new(window_size: usize, rtt: Duration) -> Result<Self, ConfigError> {
        if window_size == 0 || window_size > MAX_WINDOW_SIZE {
            return Err(ConfigError::WindowSize {
                got: window_size,
                max: MAX_WINDOW_SIZE,
            });
        }
        if rtt.is_zero() {
            return Err(ConfigError::ZeroRtt);
        }
        Ok(Self { window_size, rtt })
    }

    pub fn seq_space(&self) -> SeqSpace {
        SeqSpace::for_window(self.window_size)
    }

    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        if input.trim().is_empty() {
            return Ok(ProtocolConfig::default());
        }
        let parsed: ProtocolConfigInput = toml::from_str(input)?;
        parsed.resolve()
    }
}

impl ProtocolConfigInput {
    pub fn resolve(self) -> Result<ProtocolConfig, ConfigError> {
        let defaults = ProtocolConfig::default();
        let window_size = self.window_size.unwrap_or(defaults.window_size);
        let rtt = self.rtt_ms.map(Duration::from_millis).unwrap_or(defaults.rtt);
        ProtocolConfig::new(window_size, rtt)
    }
}
