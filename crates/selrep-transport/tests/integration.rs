//! # Integration tests: Sender ↔ Receiver through the wire format
//!
//! No harness crate here. The "channel" is the test body, which moves
//! encoded frames between the two peers and injects loss, corruption and
//! reordering by hand.

use std::time::Duration;

use selrep_transport::checksum::is_corrupted;
use selrep_transport::config::ProtocolConfig;
use selrep_transport::error::SubmitError;
use selrep_transport::event::{Command, Endpoint, Event};
use selrep_transport::receiver::Receiver;
use selrep_transport::sender::Sender;
use selrep_transport::seq::SeqNum;
use selrep_transport::wire::{Message, Packet, Payload, OFF_PAYLOAD, PAYLOAD_LEN};

// ─── Helpers ────────────────────────────────────────────────────────────────

const RTT: Duration = Duration::from_secs(16);

fn config(window: usize) -> ProtocolConfig {
    ProtocolConfig::new(window, RTT).unwrap()
}

fn msg(i: usize) -> Message {
    let mut data = [b'a' + (i % 26) as u8; PAYLOAD_LEN];
    data[1] = (i / 26) as u8;
    Message::new(data)
}

/// Split drained commands into transmitted packets, deliveries, and timer ops.
#[derive(Debug, Default)]
struct Drained {
    packets: Vec<Packet>,
    delivered: Vec<Payload>,
    timer: Vec<Command>,
}

fn drain(peer: &mut impl Endpoint) -> Drained {
    let mut out = Drained::default();
    for c in peer.drain_commands() {
        match c {
            Command::Transmit(p) => out.packets.push(p),
            Command::Deliver(d) => out.delivered.push(d),
            t @ (Command::StartTimer(_) | Command::StopTimer) => out.timer.push(t),
        }
    }
    out
}

/// Encode and decode, as a clean channel would.
fn over_wire(pkt: &Packet) -> Packet {
    Packet::decode(&mut pkt.encode().freeze()).unwrap()
}

/// Overwrite the first payload byte in transit without fixing the checksum.
fn corrupted(pkt: &Packet) -> Packet {
    let mut frame = pkt.encode();
    frame[OFF_PAYLOAD] = b'Z';
    Packet::decode(&mut frame.freeze()).unwrap()
}

fn seqs(packets: &[Packet]) -> Vec<SeqNum> {
    packets.iter().map(Packet::seqnum).collect()
}

fn acknums(packets: &[Packet]) -> Vec<SeqNum> {
    packets.iter().map(Packet::acknum).collect()
}

// ─── Scenario 1: window fills ──────────────────────────────────────────────

#[test]
fn six_submits_fill_window_until_first_ack() {
    let mut tx = Sender::new(config(6));
    let mut rx = Receiver::new(config(6));

    for i in 0..6 {
        tx.submit(msg(i)).unwrap();
    }
    let out = drain(&mut tx);
    assert_eq!(seqs(&out.packets), vec![0, 1, 2, 3, 4, 5]);
    assert_eq!(out.timer, vec![Command::StartTimer(RTT)]);

    assert_eq!(tx.submit(msg(6)), Err(SubmitError::WindowFull { in_flight: 6 }));
    assert_eq!(tx.stats().window_full, 1);

    // Only packet 0 gets through; its ACK frees exactly one slot.
    rx.receive(over_wire(&out.packets[0]));
    let acks = drain(&mut rx).packets;
    tx.receive(over_wire(&acks[0]));

    assert_eq!(tx.submit(msg(6)), Ok(6));
    assert_eq!(tx.submit(msg(7)), Err(SubmitError::WindowFull { in_flight: 6 }));
}

// ─── Scenario 2: corruption and single-packet timeout resend ───────────────

#[test]
fn corrupted_packet_resent_alone_after_timeout() {
    let mut tx = Sender::new(config(6));
    let mut rx = Receiver::new(config(6));

    for i in 0..6 {
        tx.submit(msg(i)).unwrap();
    }
    let first = drain(&mut tx);

    for pkt in &first.packets {
        let arriving = if pkt.seqnum() == 2 {
            corrupted(pkt)
        } else {
            over_wire(pkt)
        };
        assert_eq!(is_corrupted(&arriving), pkt.seqnum() == 2);
        rx.receive(arriving);
    }
    let rx_out = drain(&mut rx);
    assert_eq!(acknums(&rx_out.packets), vec![0, 1, 3, 4, 5], "no ACK for 2");
    assert_eq!(rx_out.delivered.len(), 2);

    for ack in &rx_out.packets {
        tx.receive(over_wire(ack));
    }
    assert_eq!(tx.base(), Some(2));
    assert_eq!(tx.window_count(), 4);
    drain(&mut tx);

    // RTT elapses.
    tx.handle(Event::TimerExpired);
    let resend = drain(&mut tx);
    assert_eq!(seqs(&resend.packets), vec![2], "only the oldest is resent");
    assert_eq!(resend.timer, vec![Command::StartTimer(RTT)]);
    assert_eq!(tx.stats().packets_resent, 1);

    rx.receive(over_wire(&resend.packets[0]));
    let rx_out = drain(&mut rx);
    assert_eq!(acknums(&rx_out.packets), vec![2]);
    assert_eq!(
        rx_out.delivered.iter().map(|d| d[0]).collect::<Vec<_>>(),
        vec![b'c', b'd', b'e', b'f']
    );

    tx.receive(over_wire(&rx_out.packets[0]));
    assert_eq!(tx.window_count(), 0);
    assert_eq!(drain(&mut tx).timer, vec![Command::StopTimer]);
}

// ─── Scenario 3: out-of-order ACKs ─────────────────────────────────────────

#[test]
fn out_of_order_acks_slide_only_when_contiguous() {
    let mut tx = Sender::new(config(6));
    for i in 0..5 {
        tx.submit(msg(i)).unwrap();
    }
    tx.receive(Packet::ack(0, 0));
    assert_eq!(tx.base(), Some(1));

    tx.receive(Packet::ack(1, 3));
    assert!(tx.is_acked(3));
    assert_eq!(tx.base(), Some(1), "3 alone must not slide");

    tx.receive(Packet::ack(0, 2));
    assert!(tx.is_acked(2));
    assert_eq!(tx.base(), Some(1), "1 is still missing");

    tx.receive(Packet::ack(1, 1));
    assert_eq!(tx.base(), Some(4), "slides past 1, 2 and 3 at once");
    assert_eq!(tx.window_count(), 1);
    assert_eq!(tx.stats().new_acks, 4);
}

// ─── Lost ACK ──────────────────────────────────────────────────────────────

#[test]
fn lost_ack_recovered_by_reack_from_previous_window() {
    let mut tx = Sender::new(config(4));
    let mut rx = Receiver::new(config(4));

    tx.submit(msg(0)).unwrap();
    let data = drain(&mut tx).packets;
    rx.receive(over_wire(&data[0]));
    let lost = drain(&mut rx);
    assert_eq!(lost.delivered.len(), 1);
    // ACK lost: the sender never sees it.

    tx.on_timeout();
    let resend = drain(&mut tx).packets;
    assert_eq!(seqs(&resend), vec![0]);

    rx.receive(over_wire(&resend[0]));
    let again = drain(&mut rx);
    assert_eq!(acknums(&again.packets), vec![0]);
    assert!(again.delivered.is_empty(), "no duplicate delivery");

    tx.receive(over_wire(&again.packets[0]));
    assert_eq!(tx.window_count(), 0);
}

// ─── Reordering ────────────────────────────────────────────────────────────

#[test]
fn reordered_window_delivered_in_order() {
    let mut tx = Sender::new(config(6));
    let mut rx = Receiver::new(config(6));

    for i in 0..6 {
        tx.submit(msg(i)).unwrap();
    }
    let mut packets = drain(&mut tx).packets;
    packets.reverse();
    for pkt in &packets {
        rx.receive(over_wire(pkt));
    }
    let out = drain(&mut rx);
    assert_eq!(acknums(&out.packets), vec![5, 4, 3, 2, 1, 0]);
    let firsts: Vec<u8> = out.delivered.iter().map(|d| d[0]).collect();
    assert_eq!(firsts, b"abcdef".to_vec());
}

// ─── Wrap boundary ─────────────────────────────────────────────────────────

#[test]
fn long_transfer_wraps_sequence_space_repeatedly() {
    let mut tx = Sender::new(config(6));
    let mut rx = Receiver::new(config(6));
    let total = 100usize;
    let mut next = 0usize;
    let mut delivered = Vec::new();
    let mut round = 0usize;

    while delivered.len() < total {
        while next < total && tx.can_submit() {
            tx.submit(msg(next)).unwrap();
            next += 1;
        }
        let out = drain(&mut tx);
        let mut data = out.packets;
        // Every third round, swap the first two packets in flight.
        if round % 3 == 0 && data.len() >= 2 {
            data.swap(0, 1);
        }
        for pkt in &data {
            rx.receive(over_wire(pkt));
        }
        let rx_out = drain(&mut rx);
        delivered.extend(rx_out.delivered);
        for ack in &rx_out.packets {
            tx.receive(over_wire(ack));
        }
        drain(&mut tx);
        round += 1;
        assert!(round < 1_000, "transfer stalled");
    }

    let expected: Vec<Payload> = (0..total).map(|i| msg(i).data).collect();
    assert_eq!(delivered, expected);
    assert_eq!(tx.window_count(), 0);
    assert_eq!(rx.stats().delivered, total as u64);
}

#[test]
fn window_of_one_behaves_as_alternating_bit() {
    let mut tx = Sender::new(config(1));
    let mut rx = Receiver::new(config(1));
    let mut delivered = Vec::new();

    for i in 0..5 {
        assert_eq!(tx.submit(msg(i)), Ok((i % 2) as SeqNum));
        let data = drain(&mut tx).packets;
        rx.receive(over_wire(&data[0]));
        let out = drain(&mut rx);
        delivered.extend(out.delivered);
        tx.receive(over_wire(&out.packets[0]));
        assert!(tx.can_submit());
    }
    assert_eq!(delivered.len(), 5);
}
