//! # Wire Format
//!
//! Packet and message definitions plus a fixed-size frame codec.
//!
//! ## Frame layout (32 bytes, big-endian)
//!
//! ```text
//!  0       4       8       12                            32
//!  +-------+-------+-------+-----------------------------+
//!  | seq   | ack   | csum  | payload (20 bytes)          |
//!  +-------+-------+-------+-----------------------------+
//! ```
//!
//! The codec is purely structural: [`Packet::decode`] reproduces whatever
//! bytes the channel delivered, corrupted or not. Deciding that a packet is
//! damaged is the job of [`crate::checksum::is_corrupted`].

use bytes::{Buf, BufMut, BytesMut};

use crate::checksum;
use crate::error::WireError;
use crate::seq::SeqNum;

// ─── Constants ──────────────────────────────────────────────────────────────

/// Fixed application payload size in bytes.
pub const PAYLOAD_LEN: usize = 20;

/// Placeholder for header fields that carry no meaning (e.g. `acknum` on
/// data packets).
pub const NOT_IN_USE: SeqNum = -1;

/// Fill byte for ACK payloads, which carry no data.
pub const ACK_FILL: u8 = b'0';

/// Byte offset of the sequence number within a frame.
pub const OFF_SEQ: usize = 0;
/// Byte offset of the acknowledgment number within a frame.
pub const OFF_ACK: usize = 4;
/// Byte offset of the checksum within a frame.
pub const OFF_CHECKSUM: usize = 8;
/// Byte offset of the payload within a frame.
pub const OFF_PAYLOAD: usize = 12;

/// Total encoded frame length.
pub const FRAME_LEN: usize = OFF_PAYLOAD + PAYLOAD_LEN;

/// A fixed-size application payload.
pub type Payload = [u8; PAYLOAD_LEN];

// ─── Message ────────────────────────────────────────────────────────────────

/// One outbound application message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Message {
    pub data: Payload,
}

impl Message {
    pub fn new(data: Payload) -> Self {
        Message { data }
    }

    /// Build a message from arbitrary bytes: truncated to [`PAYLOAD_LEN`],
    /// zero-padded when shorter.
    pub fn from_slice(bytes: &[u8]) -> Self {
        let mut data = [0u8; PAYLOAD_LEN];
        let n = bytes.len().min(PAYLOAD_LEN);
        data[..n].copy_from_slice(&bytes[..n]);
        Message { data }
    }
}

impl From<Payload> for Message {
    fn from(data: Payload) -> Self {
        Message::new(data)
    }
}

// ─── Packet ─────────────────────────────────────────────────────────────────

/// A protocol data unit: data packet from the sender, or ACK from the
/// receiver. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Packet {
    seqnum: SeqNum,
    acknum: SeqNum,
    checksum: i32,
    payload: Payload,
}

impl Packet {
    /// A data packet carrying `payload`, checksum filled in.
    pub fn data(seqnum: SeqNum, payload: Payload) -> Self {
        Self::sealed(seqnum, NOT_IN_USE, payload)
    }

    /// A selective ACK for `acknum`. The payload is filler.
    pub fn ack(seqnum: SeqNum, acknum: SeqNum) -> Self {
        Self::sealed(seqnum, acknum, [ACK_FILL; PAYLOAD_LEN])
    }

    /// Assemble a packet from raw field values without touching the checksum.
    ///
    /// Used by the decoder; the result may well be corrupted.
    pub fn from_parts(seqnum: SeqNum, acknum: SeqNum, checksum: i32, payload: Payload) -> Self {
        Packet {
            seqnum,
            acknum,
            checksum,
            payload,
        }
    }

    fn sealed(seqnum: SeqNum, acknum: SeqNum, payload: Payload) -> Self {
        let checksum = checksum::checksum_fields(seqnum, acknum, &payload);
        Packet {
            seqnum,
            acknum,
            checksum,
            payload,
        }
    }

    pub fn seqnum(&self) -> SeqNum {
        self.seqnum
    }

    pub fn acknum(&self) -> SeqNum {
        self.acknum
    }

    pub fn checksum(&self) -> i32 {
        self.checksum
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Serialize into a new 32-byte frame.
    pub fn encode(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(FRAME_LEN);
        self.encode_into(&mut buf);
        buf
    }

    /// Append the frame to `buf`.
    pub fn encode_into(&self, buf: &mut impl BufMut) {
        buf.put_i32(self.seqnum);
        buf.put_i32(self.acknum);
        buf.put_i32(self.checksum);
        buf.put_slice(&self.payload);
    }

    /// Decode one frame from the front of `buf`.
    pub fn decode(buf: &mut impl Buf) -> Result<Self, WireError> {
        if buf.remaining() < FRAME_LEN {
            return Err(WireError::Truncated {
                needed: FRAME_LEN,
                available: buf.remaining(),
            });
        }
        let seqnum = buf.get_i32();
        let acknum = buf.get_i32();
        let checksum = buf.get_i32();
        let mut payload = [0u8; PAYLOAD_LEN];
        buf.copy_to_slice(&mut payload);
        Ok(Packet::from_parts(seqnum, acknum, checksum, payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn frame_len_is_32() {
        assert_eq!(FRAME_LEN, 32);
        assert_eq!(Packet::data(0, [b'a'; PAYLOAD_LEN]).encode().len(), FRAME_LEN);
    }

    #[test]
    fn data_packet_marks_ack_unused() {
        let pkt = Packet::data(3, [b'c'; PAYLOAD_LEN]);
        assert_eq!(pkt.seqnum(), 3);
        assert_eq!(pkt.acknum(), NOT_IN_USE);
        assert_eq!(pkt.payload(), &[b'c'; PAYLOAD_LEN]);
    }

    #[test]
    fn ack_packet_fills_payload() {
        let pkt = Packet::ack(1, 7);
        assert_eq!(pkt.acknum(), 7);
        assert!(pkt.payload().iter().all(|&b| b == ACK_FILL));
    }

    #[test]
    fn header_fields_are_big_endian() {
        let pkt = Packet::from_parts(0x0102_0304, -1, 0x0A0B_0C0D, [0; PAYLOAD_LEN]);
        let bytes = pkt.encode();
        assert_eq!(&bytes[OFF_SEQ..OFF_SEQ + 4], &[0x01, 0x02, 0x03, 0x04]);
        assert_eq!(&bytes[OFF_ACK..OFF_ACK + 4], &[0xFF, 0xFF, 0xFF, 0xFF]);
        assert_eq!(&bytes[OFF_CHECKSUM..OFF_CHECKSUM + 4], &[0x0A, 0x0B, 0x0C, 0x0D]);
    }

    #[test]
    fn decode_preserves_corrupted_fields() {
        let mut bytes = Packet::data(2, [b'b'; PAYLOAD_LEN]).encode();
        bytes[OFF_PAYLOAD] = b'Z';
        let pkt = Packet::decode(&mut bytes.freeze()).unwrap();
        assert_eq!(pkt.payload()[0], b'Z');
        assert_eq!(pkt.seqnum(), 2);
    }

    #[test]
    fn decode_short_frame_fails() {
        let mut short = Bytes::from_static(&[0u8; FRAME_LEN - 1]);
        assert_eq!(
            Packet::decode(&mut short),
            Err(WireError::Truncated {
                needed: FRAME_LEN,
                available: FRAME_LEN - 1
            })
        );
    }

    #[test]
    fn decode_consumes_exactly_one_frame() {
        let mut buf = BytesMut::new();
        Packet::data(0, [b'a'; PAYLOAD_LEN]).encode_into(&mut buf);
        Packet::ack(1, 0).encode_into(&mut buf);
        let mut readable = buf.freeze();
        assert_eq!(Packet::decode(&mut readable).unwrap().seqnum(), 0);
        assert_eq!(Packet::decode(&mut readable).unwrap().acknum(), 0);
        assert_eq!(readable.remaining(), 0);
    }

    #[test]
    fn message_from_slice_pads_and_truncates() {
        let short = Message::from_slice(b"hi");
        assert_eq!(&short.data[..2], b"hi");
        assert!(short.data[2..].iter().all(|&b| b == 0));

        let long = Message::from_slice(&[b'x'; 40]);
        assert_eq!(long.data, [b'x'; PAYLOAD_LEN]);
    }
}
