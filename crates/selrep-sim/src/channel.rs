//! One direction of the simulated medium.
//!
//! Packets travel as encoded frames so that corruption happens to bytes on
//! the wire, exactly as a receiver would see it. Delivery is FIFO: a packet
//! never overtakes one sent earlier in the same direction.

use std::time::Duration;

use bytes::{BufMut, Bytes};
use rand::RngExt as _;
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::debug;

use selrep_transport::wire::{Packet, OFF_ACK, OFF_PAYLOAD, OFF_SEQ};

/// Value written over a header field by a corrupting channel.
pub const CORRUPT_FIELD: i32 = 999_999;

/// Per-direction counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChannelStats {
    pub sent: u64,
    pub lost: u64,
    pub corrupted: u64,
}

/// What the channel decided for one packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fate {
    Lost,
    Arrives { at: Duration, frame: Bytes },
}

#[derive(Debug)]
pub struct Channel {
    loss_prob: f64,
    corrupt_prob: f64,
    /// Arrival time of the latest packet scheduled in this direction.
    last_arrival: Duration,
    stats: ChannelStats,
}

impl Channel {
    pub fn new(loss_prob: f64, corrupt_prob: f64) -> Self {
        Self {
            loss_prob,
            corrupt_prob,
            last_arrival: Duration::ZERO,
            stats: ChannelStats::default(),
        }
    }

    /// Put `packet` on the medium at `now`.
    ///
    /// Draws from `rng` in a fixed order (loss, corruption, corruption kind,
    /// delay) so that a seed reproduces a run.
    pub fn send(&mut self, now: Duration, packet: &Packet, rng: &mut StdRng) -> Fate {
        self.stats.sent += 1;

        if rng.random::<f64>() < self.loss_prob {
            self.stats.lost += 1;
            debug!(seq = packet.seqnum(), ack = packet.acknum(), "channel: packet lost");
            return Fate::Lost;
        }

        let mut frame = packet.encode();
        if rng.random::<f64>() < self.corrupt_prob {
            self.stats.corrupted += 1;
            let kind = rng.random::<f64>();
            if kind < 0.75 {
                frame[OFF_PAYLOAD] = b'Z';
            } else if kind < 0.875 {
                (&mut frame[OFF_SEQ..OFF_SEQ + 4]).put_i32(CORRUPT_FIELD);
            } else {
                (&mut frame[OFF_ACK..OFF_ACK + 4]).put_i32(CORRUPT_FIELD);
            }
            debug!(seq = packet.seqnum(), ack = packet.acknum(), "channel: packet corrupted");
        }

        let delay = Duration::from_secs_f64(1.0 + 9.0 * rng.random::<f64>());
        let at = now.max(self.last_arrival) + delay;
        self.last_arrival = at;

        Fate::Arrives {
            at,
            frame: frame.freeze(),
        }
    }

    pub fn stats(&self) -> &ChannelStats {
        &self.stats
    }
}
