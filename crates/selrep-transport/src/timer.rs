//! # Retransmission Timer
//!
//! One logical timer per sender, tracking the deadline of the oldest
//! unacknowledged packet. It is not a timer per packet.
//!
//! The timer does not run anything itself: arming and disarming produce
//! [`Command`]s for the harness, and the harness reports expiry back as
//! [`crate::event::Event::TimerExpired`]. Starting or stopping supersedes
//! any pending expiry.

use std::time::Duration;

use tracing::warn;

use crate::event::Command;

#[derive(Debug, Clone)]
pub struct RetransmitTimer {
    interval: Duration,
    armed: bool,
}

impl RetransmitTimer {
    pub fn new(interval: Duration) -> Self {
        RetransmitTimer {
            interval,
            armed: false,
        }
    }

    /// Arm for the fixed interval.
    ///
    /// The sender only calls this from an idle timer; re-arming an armed
    /// timer is not a defined input for the harness, so it is logged.
    pub fn start(&mut self) -> Command {
        if self.armed {
            warn!("retransmit timer started while already armed");
        }
        self.armed = true;
        Command::StartTimer(self.interval)
    }

    pub fn stop(&mut self) -> Command {
        if !self.armed {
            warn!("retransmit timer stopped while idle");
        }
        self.armed = false;
        Command::StopTimer
    }

    /// The harness fired the timer; it is idle until started again.
    pub fn on_expired(&mut self) {
        self.armed = false;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}
