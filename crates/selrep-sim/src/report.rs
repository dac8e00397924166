//! End-of-run summary.

use std::fmt;

use serde::Serialize;

use selrep_transport::stats::{ReceiverStats, SenderStats};

use crate::channel::ChannelStats;
use crate::config::ConfigEcho;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimReport {
    pub config: ConfigEcho,
    pub sender: SenderStats,
    pub receiver: ReceiverStats,
    pub messages_generated: u64,
    pub messages_accepted: u64,
    /// Submits refused by a full window and dropped.
    pub messages_refused: u64,
    pub delivered: u64,
    /// Data direction, A to B.
    pub a_to_b: ChannelStats,
    /// ACK direction, B to A.
    pub b_to_a: ChannelStats,
    /// Virtual time of the last processed event, in seconds.
    pub final_time_s: f64,
    /// The run hit `max_time` with events still pending.
    pub timed_out: bool,
    /// Delivered payloads are exactly a prefix of the accepted ones, in
    /// submit order.
    pub in_order: bool,
}

impl SimReport {
    /// Every accepted message reached B, in order.
    pub fn is_complete(&self) -> bool {
        self.in_order && self.delivered == self.messages_accepted
    }
}

impl fmt::Display for SimReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "window {} / seq space {}, loss {:.3}, corrupt {:.3}, seed {}",
            self.config.window_size,
            self.config.seq_space,
            self.config.loss_prob,
            self.config.corrupt_prob,
            self.config.seed
        )?;
        writeln!(
            f,
            "messages: {} generated, {} accepted, {} refused, {} delivered",
            self.messages_generated, self.messages_accepted, self.messages_refused, self.delivered
        )?;
        writeln!(
            f,
            "sender: {} sent, {} resent ({:.2}), {} new acks, {} duplicate, {} corrupted",
            self.sender.packets_sent,
            self.sender.packets_resent,
            self.sender.retransmit_ratio(),
            self.sender.new_acks,
            self.sender.duplicate_acks,
            self.sender.corrupted_acks
        )?;
        writeln!(
            f,
            "receiver: {} received, {} duplicates, {} corrupted, {} acks sent",
            self.receiver.packets_received,
            self.receiver.duplicates,
            self.receiver.corrupted,
            self.receiver.acks_sent
        )?;
        writeln!(
            f,
            "channel A->B: {} sent, {} lost, {} corrupted; B->A: {} sent, {} lost, {} corrupted",
            self.a_to_b.sent,
            self.a_to_b.lost,
            self.a_to_b.corrupted,
            self.b_to_a.sent,
            self.b_to_a.lost,
            self.b_to_a.corrupted
        )?;
        write!(
            f,
            "finished at t={:.1}{}, in order: {}",
            self.final_time_s,
            if self.timed_out { " (timed out)" } else { "" },
            self.in_order
        )
    }
}
