//! # Receiver State Machine
//!
//! Pure logic, no I/O. Validates arriving data packets, acknowledges each
//! one selectively, buffers out-of-order payloads, and delivers in-order
//! runs to the application.
//!
//! ## Acceptance
//!
//! ```text
//!        previous window            current window
//!   ┌───────────────────────┬───────────────────────┐
//!   │ expected-W … expected-1│ expected … last_window │   (mod SEQSPACE)
//!   └───────────────────────┴───────────────────────┘
//!        ACK again only          ACK, buffer, deliver
//! ```
//!
//! Packets from the previous window were already delivered but the sender
//! may not know it (its ACK was lost), so they are acknowledged again.
//! Anything outside both windows gets no ACK at all.

use std::collections::vec_deque::Drain;
use std::collections::VecDeque;

use tracing::{debug, trace};

use crate::checksum::is_corrupted;
use crate::config::ProtocolConfig;
use crate::event::{Command, Endpoint, Event};
use crate::seq::{SeqNum, SeqSpace};
use crate::stats::ReceiverStats;
use crate::wire::{Packet, Payload, PAYLOAD_LEN};

/// Where an arriving sequence number falls relative to the receive window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acceptance {
    /// Inside `[expected, last_window]`: acknowledge and buffer.
    Current,
    /// Inside the `WINDOWSIZE` numbers before `expected`: acknowledge only.
    Previous,
    /// Neither: drop silently.
    Outside,
}

// ─── Receiver ───────────────────────────────────────────────────────────────

/// Receive-side window manager for one session.
pub struct Receiver {
    config: ProtocolConfig,
    space: SeqSpace,
    /// Payload slot per sequence number.
    recv_buffer: Box<[Payload]>,
    /// Whether the slot holds a payload not yet delivered.
    received: Box<[bool]>,
    /// Oldest sequence number not yet delivered in order.
    expected_seq: SeqNum,
    /// Newest sequence number currently acceptable.
    last_window_seq: SeqNum,
    /// Sequence field for outgoing ACKs, alternating 0/1.
    ack_seq: SeqNum,
    commands: VecDeque<Command>,
    stats: ReceiverStats,
}

impl Receiver {
    pub fn new(config: ProtocolConfig) -> Self {
        let space = config.seq_space();
        let slots = space.size() as usize;
        Receiver {
            config,
            space,
            recv_buffer: vec![[0u8; PAYLOAD_LEN]; slots].into_boxed_slice(),
            received: vec![false; slots].into_boxed_slice(),
            expected_seq: 0,
            last_window_seq: space.add(0, config.window_size as i64 - 1),
            // The first ACK carries 0, not -1; the field only alternates.
            ack_seq: 0,
            commands: VecDeque::new(),
            stats: ReceiverStats::default(),
        }
    }

    /// Process a data packet from the sender.
    pub fn receive(&mut self, packet: Packet) {
        if is_corrupted(&packet) {
            self.stats.corrupted += 1;
            debug!("corrupted packet received, ignoring");
            return;
        }
        self.stats.packets_received += 1;

        let seq = packet.seqnum();
        let acceptance = self.classify(seq);
        if acceptance == Acceptance::Outside {
            self.stats.out_of_window += 1;
            debug!(seq, expected = self.expected_seq, "packet outside window, dropping");
            return;
        }

        self.send_ack(seq);

        let slot = match (acceptance, self.space.slot(seq)) {
            (Acceptance::Current, Some(slot)) => slot,
            _ => {
                self.stats.duplicates += 1;
                debug!(seq, "packet already delivered, re-acknowledged");
                return;
            }
        };

        if self.received[slot] {
            self.stats.duplicates += 1;
            debug!(seq, "duplicate packet, already buffered");
            return;
        }

        self.recv_buffer[slot] = *packet.payload();
        self.received[slot] = true;
        trace!(seq, "packet buffered");

        if seq == self.expected_seq {
            self.deliver_in_order();
        }
    }

    /// Classify `seq` against the current and previous windows.
    pub fn classify(&self, seq: SeqNum) -> Acceptance {
        let window = self.config.window_size;
        if self.space.contains(self.expected_seq, window, seq) {
            Acceptance::Current
        } else if self.space.contains(self.previous_window_base(), window, seq) {
            Acceptance::Previous
        } else {
            Acceptance::Outside
        }
    }

    fn previous_window_base(&self) -> SeqNum {
        self.space
            .add(self.expected_seq, -(self.config.window_size as i64))
    }

    fn send_ack(&mut self, acknum: SeqNum) {
        let ack = Packet::ack(self.ack_seq, acknum);
        self.ack_seq = (self.ack_seq + 1) % 2;
        debug!(ack = acknum, "packet correctly received, sending ACK");
        self.commands.push_back(Command::Transmit(ack));
        self.stats.acks_sent += 1;
    }

    /// Hand every contiguous buffered payload from `expected_seq` onwards to
    /// the application, advancing the window one slot per delivery.
    fn deliver_in_order(&mut self) {
        loop {
            let slot = self.expected_seq as usize;
            if !self.received[slot] {
                break;
            }
            debug!(seq = self.expected_seq, "delivering payload in order");
            self.commands.push_back(Command::Deliver(self.recv_buffer[slot]));
            self.stats.delivered += 1;

            // The delivered slot leaves the trailing edge; it re-enters the
            // window WINDOWSIZE advances later and must start out empty.
            self.received[slot] = false;
            self.expected_seq = self.space.next(self.expected_seq);
            self.last_window_seq = self.space.next(self.last_window_seq);
        }
    }

    // ─── Accessors ──────────────────────────────────────────────────────

    pub fn expected_seq(&self) -> SeqNum {
        self.expected_seq
    }

    pub fn last_window_seq(&self) -> SeqNum {
        self.last_window_seq
    }

    /// Whether `seq` is buffered and waiting for an earlier gap to fill.
    pub fn is_buffered(&self, seq: SeqNum) -> bool {
        self.space
            .slot(seq)
            .is_some_and(|slot| self.received[slot])
    }

    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    pub fn stats(&self) -> &ReceiverStats {
        &self.stats
    }
}

impl Endpoint for Receiver {
    fn handle(&mut self, event: Event) {
        match event {
            Event::PacketArrived(packet) => self.receive(packet),
            // Simplex: the receiver neither sends data nor runs a timer.
            Event::ApplicationSubmit(_) => debug!("receiver has no send path, ignoring message"),
            Event::TimerExpired => debug!("receiver has no timer, ignoring expiry"),
        }
    }

    fn drain_commands(&mut self) -> Drain<'_, Command> {
        self.commands.drain(..)
    }
}
