//! Error types for the transport core.
//!
//! Protocol-level anomalies (corruption, stale ACKs, out-of-window packets)
//! are not errors; they are counted in [`crate::stats`] and discarded.

use thiserror::Error;

// ── Submit ──────────────────────────────────────────────────────────

/// Refusal of an application submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitError {
    /// Every window slot holds an unacknowledged packet. The message was not
    /// queued; the application must wait for an ACK to free a slot.
    #[error("send window full ({in_flight} packets awaiting ACK)")]
    WindowFull { in_flight: usize },
}

// ── Wire ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WireError {
    #[error("frame truncated: need {needed} bytes, have {available}")]
    Truncated { needed: usize, available: usize },
}

// ── Config ──────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("window size must be between 1 and {max}, got {got}")]
    WindowSize { got: usize, max: usize },
    #[error("RTT must be positive")]
    ZeroRtt,
}
