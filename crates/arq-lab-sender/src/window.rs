use arq_lab_abstract::Packet;
use std::collections::VecDeque;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WindowError {
    #[error("window is full ({capacity} packets in flight)")]
    Full { capacity: u32 },
    #[error("sequence number space exhausted")]
    SequenceExhausted,
}

/// Bounded buffer of in-flight, unacknowledged packets.
///
/// Holds exactly the packets with sequence numbers in `[base, next_seq)`,
/// oldest first, with `base <= next_seq <= base + capacity` after every
/// operation. The buffer is an append-only deque trimmed from the front as
/// acknowledgments arrive, so position `i` always corresponds to sequence
/// number `base + i`.
#[derive(Debug)]
pub struct TxWindow {
    base: u32,
    next_seq: u32,
    capacity: u32,
    in_flight: VecDeque<Packet>,
}

impl TxWindow {
    pub fn new(capacity: u32) -> Self {
        assert!(capacity > 0, "window capacity must be at least 1");
        Self {
            base: 0,
            next_seq: 0,
            capacity,
            in_flight: VecDeque::with_capacity(capacity as usize),
        }
    }

    /// Oldest unacknowledged sequence number.
    pub fn base(&self) -> u32 {
        self.base
    }

    /// Sequence number the next submitted packet must carry.
    pub fn next_seq(&self) -> u32 {
        self.next_seq
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.base == self.next_seq
    }

    pub fn is_full(&self) -> bool {
        self.next_seq - self.base == self.capacity
    }

    pub fn in_flight_count(&self) -> u32 {
        self.next_seq - self.base
    }

    /// Append a packet carrying `next_seq` and advance `next_seq`.
    ///
    /// Rejects the packet when the window is full or the 32-bit sequence
    /// space is exhausted; the caller decides what to do with the refused
    /// message (the senders drop it).
    pub fn push(&mut self, packet: Packet) -> Result<(), WindowError> {
        if self.is_full() {
            return Err(WindowError::Full {
                capacity: self.capacity,
            });
        }
        if self.next_seq == u32::MAX {
            return Err(WindowError::SequenceExhausted);
        }
        debug_assert_eq!(
            packet.header.seq_num, self.next_seq,
            "packet must carry the window's next sequence number"
        );
        self.in_flight.push_back(packet);
        self.next_seq += 1;
        debug_assert!(self.invariant_holds());
        Ok(())
    }

    /// Apply a cumulative acknowledgment: `seq` confirms every sequence
    /// number at or below it, so `base` becomes `seq + 1`.
    ///
    /// The new base is clamped to `[base, next_seq]`: a stale ack (below the
    /// current base) is a no-op, and an ack for a never-sent sequence cannot
    /// push `base` past `next_seq`. `base` never moves backward.
    pub fn ack_through(&mut self, seq: u32) {
        let new_base = seq.saturating_add(1).clamp(self.base, self.next_seq);
        if new_base == self.base {
            debug!(seq, base = self.base, "stale cumulative ack absorbed");
            return;
        }
        while self.base < new_base {
            self.in_flight.pop_front();
            self.base += 1;
        }
        debug_assert!(self.invariant_holds());
    }

    /// In-flight packets in ascending sequence order, for a full resend.
    pub fn iter_in_flight(&self) -> impl Iterator<Item = &Packet> {
        self.in_flight.iter()
    }

    fn invariant_holds(&self) -> bool {
        self.base <= self.next_seq
            && self.next_seq - self.base <= self.capacity
            && self.in_flight.len() as u32 == self.next_seq - self.base
    }
}

#[cfg(test)]
mod tests {
    use super::{TxWindow, WindowError};
    use arq_lab_abstract::{AckField, Packet};

    fn packet(seq: u32) -> Packet {
        Packet::data(seq, AckField::Placeholder, vec![seq as u8])
    }

    fn filled(capacity: u32, count: u32) -> TxWindow {
        let mut window = TxWindow::new(capacity);
        for seq in 0..count {
            window.push(packet(seq)).unwrap();
        }
        window
    }

    #[test]
    fn push_advances_next_seq_and_keeps_order() {
        let window = filled(8, 3);
        assert_eq!(window.base(), 0);
        assert_eq!(window.next_seq(), 3);
        assert_eq!(window.in_flight_count(), 3);

        let seqs: Vec<u32> = window.iter_in_flight().map(|p| p.header.seq_num).collect();
        assert_eq!(seqs, vec![0, 1, 2]);
    }

    #[test]
    fn push_into_full_window_is_rejected() {
        let mut window = filled(2, 2);
        assert!(window.is_full());
        let err = window.push(packet(2)).unwrap_err();
        assert_eq!(err, WindowError::Full { capacity: 2 });
        assert_eq!(window.next_seq(), 2);
    }

    #[test]
    fn cumulative_ack_trims_everything_at_or_below() {
        let mut window = filled(8, 3);
        window.ack_through(1);
        assert_eq!(window.base(), 2);
        assert_eq!(window.in_flight_count(), 1);
        let seqs: Vec<u32> = window.iter_in_flight().map(|p| p.header.seq_num).collect();
        assert_eq!(seqs, vec![2]);
    }

    #[test]
    fn stale_ack_never_moves_base_backward() {
        let mut window = filled(8, 4);
        window.ack_through(2);
        assert_eq!(window.base(), 3);

        window.ack_through(0);
        window.ack_through(2);
        assert_eq!(window.base(), 3);
        assert_eq!(window.in_flight_count(), 1);
    }

    #[test]
    fn ack_for_unsent_sequence_is_clamped_to_next_seq() {
        let mut window = filled(8, 2);
        window.ack_through(100);
        assert_eq!(window.base(), 2);
        assert!(window.is_empty());
    }

    #[test]
    fn ack_emptying_the_window_reopens_it() {
        let mut window = filled(2, 2);
        window.ack_through(1);
        assert!(window.is_empty());
        assert!(!window.is_full());
        window.push(packet(2)).unwrap();
        assert_eq!(window.base(), 2);
        assert_eq!(window.next_seq(), 3);
    }

    #[test]
    fn invariant_holds_after_interleaved_pushes_and_acks() {
        let mut window = TxWindow::new(4);
        let mut next = 0u32;
        for round in 0..10u32 {
            while !window.is_full() {
                window.push(packet(next)).unwrap();
                next += 1;
            }
            window.ack_through(window.base() + (round % 4));
            assert!(window.base() <= window.next_seq());
            assert!(window.next_seq() - window.base() <= window.capacity());
        }
    }
}
