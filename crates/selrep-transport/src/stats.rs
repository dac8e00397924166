//! # Protocol Statistics
//!
//! Observational counters for each peer. Read-only to the harness and never
//! consulted by the protocol logic. Serializable for JSON reports.

use serde::Serialize;

// ─── Sender Stats ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SenderStats {
    /// Original data packets transmitted (excludes timeout resends).
    pub packets_sent: u64,
    /// Submits refused because the window was full.
    pub window_full: u64,
    /// Uncorrupted ACKs received, new or not.
    pub acks_received: u64,
    /// ACKs that marked a previously unacknowledged packet.
    pub new_acks: u64,
    /// ACKs outside the outstanding range or already recorded.
    pub duplicate_acks: u64,
    /// ACKs discarded on checksum mismatch.
    pub corrupted_acks: u64,
    /// Packets resent on timer expiry.
    pub packets_resent: u64,
}

impl SenderStats {
    /// Resends per original transmission.
    pub fn retransmit_ratio(&self) -> f64 {
        if self.packets_sent == 0 {
            0.0
        } else {
            self.packets_resent as f64 / self.packets_sent as f64
        }
    }
}

// ─── Receiver Stats ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReceiverStats {
    /// Uncorrupted packets received, including duplicates.
    pub packets_received: u64,
    /// Packets discarded on checksum mismatch.
    pub corrupted: u64,
    /// ACKs emitted.
    pub acks_sent: u64,
    /// Payloads handed to the application.
    pub delivered: u64,
    /// Packets already buffered or already delivered (re-ACKed only).
    pub duplicates: u64,
    /// Packets outside both the current and the previous window.
    pub out_of_window: u64,
}

impl ReceiverStats {
    /// Fraction of received packets that were new deliveries.
    pub fn goodput_ratio(&self) -> f64 {
        if self.packets_received == 0 {
            0.0
        } else {
            self.delivered as f64 / self.packets_received as f64
        }
    }
}
