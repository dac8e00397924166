//! Lossy-channel simulation for the Selective-Repeat core.
//!
//! Hosts a sender at peer A and a receiver at peer B, connects them with a
//! pair of impaired one-way channels, and runs the whole exchange on a
//! virtual clock. Runs are deterministic for a given seed.

pub mod channel;
pub mod config;
pub mod harness;
pub mod report;
pub mod workload;

pub use config::{SimConfig, SimConfigError, SimConfigInput};
pub use harness::{PeerId, Simulation};
pub use report::SimReport;
