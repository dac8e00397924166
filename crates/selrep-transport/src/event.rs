//! # Events and Commands
//!
//! The closed vocabulary between a peer and the harness that drives it.
//!
//! ```text
//!            Event                         Command
//!  harness ─────────▶ Endpoint::handle ─────────▶ drain_commands ──▶ harness
//!   ApplicationSubmit                    Transmit(Packet)
//!   PacketArrived                        Deliver(Payload)
//!   TimerExpired                         StartTimer(Duration) / StopTimer
//! ```
//!
//! Each event is processed to completion before the next one; commands
//! come out in the order they were issued.

use std::collections::vec_deque::Drain;
use std::time::Duration;

use crate::wire::{Message, Packet, Payload};

/// Input to a peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The application hands over one outbound message.
    ApplicationSubmit(Message),
    /// The channel delivered a packet (possibly corrupted).
    PacketArrived(Packet),
    /// The peer's single timer went off.
    TimerExpired,
}

/// Output of a peer, to be executed by the harness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Hand a packet to the channel for the other peer.
    Transmit(Packet),
    /// Hand an in-order payload to the local application.
    Deliver(Payload),
    /// Arm the peer's timer, superseding any pending expiry.
    StartTimer(Duration),
    /// Disarm the peer's timer.
    StopTimer,
}

/// A protocol peer driven by events.
pub trait Endpoint {
    /// Process one event to completion.
    fn handle(&mut self, event: Event);

    /// Take every command issued since the last drain, oldest first.
    fn drain_commands(&mut self) -> Drain<'_, Command>;
}
