//! # Discrete-event harness
//!
//! Drives a [`Sender`] at peer A and a [`Receiver`] at peer B over two
//! [`Channel`]s with a virtual clock. Every occurrence (message generation,
//! packet arrival, timer expiry) sits in a min-heap keyed by
//! `(time, insertion order)`, so equal-time events run in the order they
//! were scheduled and a seed fully determines the run.
//!
//! After each event the affected peer's commands are drained and executed:
//! transmits go through the channel, deliveries are recorded, timer
//! commands re-schedule or cancel that peer's expiry.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::time::Duration;

use bytes::Bytes;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, trace, warn};

use selrep_transport::event::{Command, Endpoint, Event};
use selrep_transport::receiver::Receiver;
use selrep_transport::sender::Sender;
use selrep_transport::wire::{Packet, Payload};

use crate::channel::{Channel, Fate};
use crate::config::SimConfig;
use crate::report::SimReport;
use crate::workload;

/// The two ends of the link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeerId {
    /// Hosts the sender.
    A,
    /// Hosts the receiver.
    B,
}

impl PeerId {
    pub fn other(self) -> PeerId {
        match self {
            PeerId::A => PeerId::B,
            PeerId::B => PeerId::A,
        }
    }

    fn index(self) -> usize {
        match self {
            PeerId::A => 0,
            PeerId::B => 1,
        }
    }
}

// ─── Event Queue ────────────────────────────────────────────────────────────

#[derive(Debug)]
enum Occurrence {
    /// Peer A's application produces its next message.
    Generate,
    /// A frame reaches `to`.
    Arrival { to: PeerId, frame: Bytes },
    /// `peer`'s timer fires, unless superseded since it was armed.
    Expiry { peer: PeerId, generation: u64 },
}

#[derive(Debug)]
struct Scheduled {
    at: Duration,
    order: u64,
    what: Occurrence,
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        (self.at, self.order) == (other.at, other.order)
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.at, self.order).cmp(&(other.at, other.order))
    }
}

// ─── Timers ─────────────────────────────────────────────────────────────────

/// One peer's timer. Starting or stopping bumps the generation, which
/// invalidates any expiry already in the queue.
#[derive(Debug, Default, Clone, Copy)]
struct TimerSlot {
    generation: u64,
    armed: bool,
}

impl TimerSlot {
    fn start(&mut self, peer: PeerId) -> u64 {
        if self.armed {
            warn!(?peer, "timer started while already running");
        }
        self.armed = true;
        self.generation += 1;
        self.generation
    }

    fn stop(&mut self, peer: PeerId) {
        if !self.armed {
            warn!(?peer, "timer stopped while not running");
        }
        self.armed = false;
        self.generation += 1;
    }

    /// Consume an expiry; true if it is the live one.
    fn fire(&mut self, generation: u64) -> bool {
        if self.armed && self.generation == generation {
            self.armed = false;
            true
        } else {
            false
        }
    }
}

// ─── Simulation ─────────────────────────────────────────────────────────────

pub struct Simulation {
    config: SimConfig,
    rng: StdRng,
    now: Duration,
    queue: BinaryHeap<Reverse<Scheduled>>,
    next_order: u64,
    sender: Sender,
    receiver: Receiver,
    a_to_b: Channel,
    b_to_a: Channel,
    timers: [TimerSlot; 2],
    generated: u64,
    refused: u64,
    accepted: Vec<Payload>,
    delivered: Vec<Payload>,
    timed_out: bool,
}

impl Simulation {
    pub fn new(config: SimConfig) -> Self {
        let mut sim = Simulation {
            rng: StdRng::seed_from_u64(config.seed),
            now: Duration::ZERO,
            queue: BinaryHeap::new(),
            next_order: 0,
            sender: Sender::new(config.protocol),
            receiver: Receiver::new(config.protocol),
            a_to_b: Channel::new(config.loss_prob, config.corrupt_prob),
            b_to_a: Channel::new(config.loss_prob, config.corrupt_prob),
            timers: [TimerSlot::default(); 2],
            generated: 0,
            refused: 0,
            accepted: Vec::new(),
            delivered: Vec::new(),
            timed_out: false,
            config,
        };
        if sim.config.messages > 0 {
            let gap = workload::interarrival(sim.config.mean_interarrival, &mut sim.rng);
            sim.schedule(gap, Occurrence::Generate);
        }
        sim
    }

    /// Run to completion and summarize.
    pub fn run(mut self) -> SimReport {
        info!(
            messages = self.config.messages,
            window = self.config.protocol.window_size,
            loss = self.config.loss_prob,
            corrupt = self.config.corrupt_prob,
            seed = self.config.seed,
            "simulation starting"
        );
        while self.step() {}
        let report = self.report();
        info!(
            delivered = report.delivered,
            t = report.final_time_s,
            timed_out = report.timed_out,
            "simulation finished"
        );
        report
    }

    /// Process the next event. Returns false once the run is over.
    pub fn step(&mut self) -> bool {
        let Some(Reverse(next)) = self.queue.pop() else {
            return false;
        };
        if next.at > self.config.max_time {
            self.now = self.config.max_time;
            self.timed_out = true;
            warn!(pending = self.queue.len() + 1, "max simulated time reached");
            return false;
        }
        self.now = next.at;

        match next.what {
            Occurrence::Generate => self.generate(),
            Occurrence::Arrival { to, mut frame } => match Packet::decode(&mut frame) {
                Ok(packet) => self.dispatch(to, Event::PacketArrived(packet)),
                Err(err) => warn!(?to, %err, "undecodable frame dropped"),
            },
            Occurrence::Expiry { peer, generation } => {
                if self.timers[peer.index()].fire(generation) {
                    debug!(?peer, t = self.now.as_secs_f64(), "timer expired");
                    self.dispatch(peer, Event::TimerExpired);
                } else {
                    trace!(?peer, generation, "stale expiry skipped");
                }
            }
        }
        true
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn sender(&self) -> &Sender {
        &self.sender
    }

    pub fn receiver(&self) -> &Receiver {
        &self.receiver
    }

    /// Payloads delivered at B so far, in delivery order.
    pub fn delivered(&self) -> &[Payload] {
        &self.delivered
    }

    pub fn report(&self) -> SimReport {
        let in_order = self.delivered.len() <= self.accepted.len()
            && self.delivered[..] == self.accepted[..self.delivered.len()];
        SimReport {
            config: self.config.echo(),
            sender: self.sender.stats().clone(),
            receiver: self.receiver.stats().clone(),
            messages_generated: self.generated,
            messages_accepted: self.accepted.len() as u64,
            messages_refused: self.refused,
            delivered: self.delivered.len() as u64,
            a_to_b: self.a_to_b.stats().clone(),
            b_to_a: self.b_to_a.stats().clone(),
            final_time_s: self.now.as_secs_f64(),
            timed_out: self.timed_out,
            in_order,
        }
    }

    // ─── Event Handlers ─────────────────────────────────────────────────

    fn generate(&mut self) {
        let message = workload::message(self.generated);
        self.generated += 1;

        match self.sender.submit(message) {
            Ok(seq) => {
                self.accepted.push(message.data);
                debug!(seq, t = self.now.as_secs_f64(), "message submitted");
            }
            Err(err) => {
                self.refused += 1;
                debug!(%err, t = self.now.as_secs_f64(), "message refused, dropped");
            }
        }
        self.execute(PeerId::A);

        if self.generated < self.config.messages {
            let gap = workload::interarrival(self.config.mean_interarrival, &mut self.rng);
            self.schedule(self.now + gap, Occurrence::Generate);
        }
    }

    fn dispatch(&mut self, peer: PeerId, event: Event) {
        self.endpoint(peer).handle(event);
        self.execute(peer);
    }

    fn endpoint(&mut self, peer: PeerId) -> &mut dyn Endpoint {
        match peer {
            PeerId::A => &mut self.sender,
            PeerId::B => &mut self.receiver,
        }
    }

    /// Carry out everything `peer` asked for, in issue order.
    fn execute(&mut self, peer: PeerId) {
        let commands: Vec<Command> = self.endpoint(peer).drain_commands().collect();
        for command in commands {
            match command {
                Command::Transmit(packet) => self.transmit(peer, packet),
                Command::Deliver(payload) => {
                    trace!(?peer, first = payload[0], "delivered to application");
                    self.delivered.push(payload);
                }
                Command::StartTimer(interval) => {
                    let generation = self.timers[peer.index()].start(peer);
                    self.schedule(self.now + interval, Occurrence::Expiry { peer, generation });
                }
                Command::StopTimer => self.timers[peer.index()].stop(peer),
            }
        }
    }

    fn transmit(&mut self, from: PeerId, packet: Packet) {
        let channel = match from {
            PeerId::A => &mut self.a_to_b,
            PeerId::B => &mut self.b_to_a,
        };
        if let Fate::Arrives { at, frame } = channel.send(self.now, &packet, &mut self.rng) {
            self.schedule(
                at,
                Occurrence::Arrival {
                    to: from.other(),
                    frame,
                },
            );
        }
    }

    fn schedule(&mut self, at: Duration, what: Occurrence) {
        let order = self.next_order;
        self.next_order += 1;
        self.queue.push(Reverse(Scheduled { at, order, what }));
    }
}
