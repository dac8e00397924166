//! # Sender State Machine
//!
//! Pure logic, no I/O. Accepts application messages, assigns sequence
//! numbers, keeps every unacknowledged packet in a fixed circular buffer,
//! records selective ACKs per sequence number, and drives the single
//! retransmission timer.
//!
//! ## Window layout
//!
//! ```text
//!  buffer (WINDOWSIZE slots, circular)
//!  ┌────┬────┬────┬────┬────┬────┐
//!  │    │ s3 │ s4 │ s5 │ s6 │    │      s3 = base (window_first)
//!  └────┴────┴────┴────┴────┴────┘      s6 = newest (window_last)
//!         ▲ first          ▲ last        window_count = 4
//!
//!  acked[SEQSPACE]: one flag per sequence number
//! ```
//!
//! An ACK marks its own slot only. The window slides past a contiguous run
//! of acknowledged packets starting at the base, so an out-of-order ACK
//! never frees the base early.
//!
//! ## Retransmission policy
//!
//! On timer expiry only the oldest unacknowledged packet is resent and the
//! timer is re-armed. Later losses are caught by subsequent expiries.

use std::collections::vec_deque::Drain;
use std::collections::VecDeque;

use tracing::{debug, trace};

use crate::checksum::is_corrupted;
use crate::config::ProtocolConfig;
use crate::error::SubmitError;
use crate::event::{Command, Endpoint, Event};
use crate::seq::{SeqNum, SeqSpace};
use crate::stats::SenderStats;
use crate::timer::RetransmitTimer;
use crate::wire::{Message, Packet};

// ─── Sender ─────────────────────────────────────────────────────────────────

/// Send-side window manager for one session.
pub struct Sender {
    config: ProtocolConfig,
    space: SeqSpace,
    /// Circular buffer of unacknowledged packets, `window_size` slots.
    buffer: Box<[Packet]>,
    /// Slot of the oldest unacknowledged packet.
    window_first: usize,
    /// Slot of the newest packet.
    window_last: usize,
    /// Packets currently awaiting an ACK.
    window_count: usize,
    /// Sequence number for the next fresh packet.
    next_seq: SeqNum,
    /// Per-sequence ACK flags, one per sequence number.
    acked: Box<[bool]>,
    timer: RetransmitTimer,
    commands: VecDeque<Command>,
    stats: SenderStats,
}

impl Sender {
    pub fn new(config: ProtocolConfig) -> Self {
        let space = config.seq_space();
        let window = config.window_size;
        Sender {
            config,
            space,
            buffer: vec![Packet::default(); window].into_boxed_slice(),
            window_first: 0,
            // The first insert advances to slot 0.
            window_last: window - 1,
            window_count: 0,
            next_seq: 0,
            acked: vec![false; space.size() as usize].into_boxed_slice(),
            timer: RetransmitTimer::new(config.rtt),
            commands: VecDeque::new(),
            stats: SenderStats::default(),
        }
    }

    /// Accept one application message for transmission.
    ///
    /// Returns the sequence number assigned, or [`SubmitError::WindowFull`]
    /// when `window_size` packets are already unacknowledged. A refused
    /// message is not queued anywhere.
    pub fn submit(&mut self, message: Message) -> Result<SeqNum, SubmitError> {
        if !self.can_submit() {
            self.stats.window_full += 1;
            debug!(
                window_count = self.window_count,
                "new message arrives, send window is full"
            );
            return Err(SubmitError::WindowFull {
                in_flight: self.window_count,
            });
        }

        let seq = self.next_seq;
        let packet = Packet::data(seq, message.data);

        self.window_last = (self.window_last + 1) % self.buffer.len();
        self.buffer[self.window_last] = packet;
        self.window_count += 1;

        debug!(seq, "sending packet");
        self.commands.push_back(Command::Transmit(packet));
        self.stats.packets_sent += 1;

        self.acked[self.flag(seq)] = false;

        if self.window_count == 1 {
            let start = self.timer.start();
            self.commands.push_back(start);
        }

        self.next_seq = self.space.next(seq);
        Ok(seq)
    }

    /// Process a packet from the receiver. Always an ACK in this simplex
    /// configuration.
    pub fn receive(&mut self, packet: Packet) {
        if is_corrupted(&packet) {
            self.stats.corrupted_acks += 1;
            debug!("corrupted ACK received, ignoring");
            return;
        }

        let ack = packet.acknum();
        self.stats.acks_received += 1;
        debug!(ack, "uncorrupted ACK received");

        if !self.is_new_ack(ack) {
            self.stats.duplicate_acks += 1;
            debug!(ack, "duplicate or stale ACK, ignoring");
            return;
        }

        self.stats.new_acks += 1;
        debug!(ack, "ACK is not a duplicate");
        let slot = self.flag(ack);
        self.acked[slot] = true;

        let base_acked = self.acked[self.flag(self.base_seq())];
        if base_acked {
            let stop = self.timer.stop();
            self.commands.push_back(stop);
        }

        while self.window_count > 0 && self.acked[self.flag(self.base_seq())] {
            self.window_first = (self.window_first + 1) % self.buffer.len();
            self.window_count -= 1;
            trace!(
                window_first = self.window_first,
                window_last = self.window_last,
                window_count = self.window_count,
                "window slid"
            );
        }

        if base_acked && self.window_count > 0 {
            let start = self.timer.start();
            self.commands.push_back(start);
        }
    }

    /// The retransmission timer went off: resend the oldest unacknowledged
    /// packet and re-arm.
    pub fn on_timeout(&mut self) {
        self.timer.on_expired();

        if self.window_count == 0 {
            debug!("timer expired with nothing outstanding, ignoring");
            return;
        }

        let packet = self.buffer[self.window_first];
        debug!(seq = packet.seqnum(), "timeout, resending packet");
        self.commands.push_back(Command::Transmit(packet));
        self.stats.packets_resent += 1;

        let start = self.timer.start();
        self.commands.push_back(start);
    }

    /// `acknum` names an outstanding packet not yet acknowledged.
    fn is_new_ack(&self, acknum: SeqNum) -> bool {
        self.window_count > 0
            && self
                .space
                .contains(self.base_seq(), self.window_count, acknum)
            && !self.acked[self.flag(acknum)]
    }

    fn base_seq(&self) -> SeqNum {
        self.buffer[self.window_first].seqnum()
    }

    /// Index into `acked` for a sequence number already proven valid.
    fn flag(&self, seq: SeqNum) -> usize {
        debug_assert!(self.space.is_valid(seq), "sequence {seq} outside space");
        seq as usize
    }

    // ─── Accessors ──────────────────────────────────────────────────────

    /// Whether a submit would be accepted right now.
    pub fn can_submit(&self) -> bool {
        self.window_count < self.buffer.len()
    }

    /// Packets awaiting acknowledgment.
    pub fn window_count(&self) -> usize {
        self.window_count
    }

    /// Oldest unacknowledged sequence number, if any.
    pub fn base(&self) -> Option<SeqNum> {
        (self.window_count > 0).then(|| self.base_seq())
    }

    /// Sequence number the next submit will use.
    pub fn next_seq(&self) -> SeqNum {
        self.next_seq
    }

    /// Whether `seq` has been individually acknowledged since it was last sent.
    pub fn is_acked(&self, seq: SeqNum) -> bool {
        self.space
            .slot(seq)
            .is_some_and(|slot| self.acked[slot])
    }

    /// Buffered packets from oldest to newest.
    pub fn outstanding(&self) -> impl Iterator<Item = &Packet> + '_ {
        (0..self.window_count).map(move |i| &self.buffer[(self.window_first + i) % self.buffer.len()])
    }

    pub fn timer_armed(&self) -> bool {
        self.timer.is_armed()
    }

    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    pub fn stats(&self) -> &SenderStats {
        &self.stats
    }
}

impl Endpoint for Sender {
    fn handle(&mut self, event: Event) {
        match event {
            Event::ApplicationSubmit(message) => {
                if let Err(err) = self.submit(message) {
                    trace!(%err, "message dropped at sender");
                }
            }
            Event::PacketArrived(packet) => self.receive(packet),
            Event::TimerExpired => self.on_timeout(),
        }
    }

    fn drain_commands(&mut self) -> Drain<'_, Command> {
        self.commands.drain(..)
    }
}
