//! # Checksum
//!
//! Additive checksum shared by both peers: `seqnum + acknum + Σ payload`,
//! payload bytes taken as unsigned values. Weak by construction; a
//! corruption that happens to reproduce the same sum goes unnoticed.

use crate::seq::SeqNum;
use crate::wire::{Packet, Payload};

/// Checksum over raw header fields and payload.
pub fn checksum_fields(seqnum: SeqNum, acknum: SeqNum, payload: &Payload) -> i32 {
    payload
        .iter()
        .fold(seqnum.wrapping_add(acknum), |sum, &b| {
            sum.wrapping_add(i32::from(b))
        })
}

/// Recompute the checksum a packet's current contents should carry.
pub fn compute_checksum(packet: &Packet) -> i32 {
    checksum_fields(packet.seqnum(), packet.acknum(), packet.payload())
}

/// `true` iff the stored checksum disagrees with the contents.
pub fn is_corrupted(packet: &Packet) -> bool {
    packet.checksum() != compute_checksum(packet)
}
