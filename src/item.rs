use std::fmt;

use rand::Rng;

/// Exclusive upper bound of the random suffix; it always renders as 5 digits.
pub const SUFFIX_RANGE: u32 = 100_000;

/// A produced string, tagged with its producer and a random suffix.
///
/// Displays as `"<producer>-<suffix>"`, e.g. `2-04817`. The sequence number
/// is the permit the producer claimed and is not part of the rendering.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Item {
    producer: usize,
    seq: usize,
    suffix: u32,
}

impl Item {
    /// # Panics
    ///
    /// Panics if `suffix` does not fit in 5 digits.
    pub fn new(producer: usize, seq: usize, suffix: u32) -> Self {
        assert!(
            suffix < SUFFIX_RANGE,
            "suffix {suffix} does not fit in 5 digits"
        );
        Self {
            producer,
            seq,
            suffix,
        }
    }

    pub fn random<R: Rng + ?Sized>(producer: usize, seq: usize, rng: &mut R) -> Self {
        Self::new(producer, seq, rng.gen_range(0..SUFFIX_RANGE))
    }

    pub fn producer(&self) -> usize {
        self.producer
    }

    pub fn seq(&self) -> usize {
        self.seq
    }

    pub fn suffix(&self) -> u32 {
        self.suffix
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:05}", self.producer, self.suffix)
    }
}
