//! # Sequence Space
//!
//! Sequence numbers live in `[0, SEQSPACE)` and are used cyclically, with
//! `SEQSPACE = 2 × WINDOWSIZE`. Every "is this inside the window" question
//! on either peer goes through [`SeqSpace::contains`], so the wraparound
//! rule exists in exactly one place.

/// A sequence number as carried in the packet header.
///
/// Signed because the header reuses the same field width for the
/// [`crate::wire::NOT_IN_USE`] marker (`-1`).
pub type SeqNum = i32;

/// A cyclic sequence space of fixed size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeqSpace {
    size: i32,
}

impl SeqSpace {
    /// Create a sequence space of `size` numbers.
    ///
    /// # Panics
    ///
    /// Panics if `size` is not positive.
    pub fn new(size: i32) -> Self {
        assert!(size > 0, "sequence space must be non-empty");
        SeqSpace { size }
    }

    /// The minimal Selective-Repeat space for a window: twice its size.
    pub fn for_window(window_size: usize) -> Self {
        let size = window_size
            .checked_mul(2)
            .and_then(|s| i32::try_from(s).ok())
            .unwrap_or(i32::MAX);
        Self::new(size)
    }

    /// Number of distinct sequence numbers.
    pub fn size(self) -> i32 {
        self.size
    }

    /// Whether `seq` is a member of this space at all.
    ///
    /// Corrupted or placeholder header fields (`-1`, `999999`) are not.
    pub fn is_valid(self, seq: SeqNum) -> bool {
        (0..self.size).contains(&seq)
    }

    /// Array slot for a valid sequence number.
    pub fn slot(self, seq: SeqNum) -> Option<usize> {
        if self.is_valid(seq) {
            usize::try_from(seq).ok()
        } else {
            None
        }
    }

    /// `seq + n`, wrapped into the space. `n` may be negative.
    pub fn add(self, seq: SeqNum, n: i64) -> SeqNum {
        let wrapped = (i64::from(seq) + n).rem_euclid(i64::from(self.size));
        // rem_euclid keeps the value in [0, size), which always fits.
        wrapped as SeqNum
    }

    /// The successor of `seq`.
    pub fn next(self, seq: SeqNum) -> SeqNum {
        self.add(seq, 1)
    }

    /// Forward distance from `from` to `to`, in `[0, size)`.
    pub fn distance(self, from: SeqNum, to: SeqNum) -> i32 {
        self.add(to, -i64::from(from))
    }

    /// Whether `value` lies in the `span` sequence numbers starting at `base`.
    ///
    /// The range `[base, base + span - 1]` is taken modulo the space. When it
    /// does not wrap, `value` must lie between the two bounds inclusive; when
    /// it wraps, `value` must be at or above `base` or at or below the upper
    /// bound. An empty span contains nothing; a span covering the whole space
    /// contains every valid number.
    pub fn contains(self, base: SeqNum, span: usize, value: SeqNum) -> bool {
        if span == 0 || !self.is_valid(base) || !self.is_valid(value) {
            return false;
        }
        let span = match i64::try_from(span) {
            Ok(s) if s < i64::from(self.size) => s,
            _ => return true,
        };
        let last = self.add(base, span - 1);
        if base <= last {
            value >= base && value <= last
        } else {
            value >= base || value <= last
        }
    }
}
