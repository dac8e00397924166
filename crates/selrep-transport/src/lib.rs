//! # selrep-transport
//!
//! Selective-Repeat reliable delivery over an unreliable, simulated
//! point-to-point channel.
//!
//! Both peers are pure state machines: they react to application submits,
//! packet arrivals and timer expiries, and answer with [`event::Command`]s
//! (transmit, deliver, start/stop timer) that the surrounding harness
//! executes. Nothing in this crate performs I/O or reads a clock.
//!
//! ## Crate structure
//!
//! - [`seq`]: Modular sequence-space arithmetic and range checks
//! - [`wire`]: Packet and message layout, fixed 32-byte frame codec
//! - [`checksum`]: Additive checksum and corruption detection
//! - [`timer`]: Single logical retransmission timer
//! - [`sender`]: Send-side window manager
//! - [`receiver`]: Receive-side window manager
//! - [`event`]: Event/command vocabulary and the `Endpoint` dispatch trait
//! - [`stats`]: Diagnostic counters
//! - [`config`]: Protocol constants (window size, RTT) and TOML loading
//! - [`error`]: Error types

pub mod checksum;
pub mod config;
pub mod error;
pub mod event;
pub mod receiver;
pub mod sender;
pub mod seq;
pub mod stats;
pub mod timer;
pub mod wire;
