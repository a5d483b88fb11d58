//! Injected randomness for turn delays and watchdog speaker picks.
//!
//! Production code uses [`ThreadRandom`]; tests supply a [`SequenceRandom`]
//! so delays and picks are deterministic.

use std::collections::VecDeque;
use std::ops::Range;
use std::sync::Mutex;

use rand::Rng;

pub trait RandomSource: Send + Sync {
    /// A value drawn uniformly from `range` (half-open).
    ///
    /// An empty range yields `range.start`.
    fn below(&self, range: Range<u64>) -> u64;

    /// An index drawn uniformly from `0..len`. `len` must be non-zero.
    fn pick(&self, len: usize) -> usize {
        self.below(0..len as u64) as usize
    }
}

/// Thread-local RNG backed source.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn below(&self, range: Range<u64>) -> u64 {
        if range.is_empty() {
            return range.start;
        }
        rand::rng().random_range(range)
    }
}

/// Replays a fixed sequence of raw values, cycling when exhausted.
///
/// Each raw value is reduced into the requested range with
/// `start + value % len`, so a test can write the exact delays or indexes it
/// expects as long as they already fall inside the range.
#[derive(Debug)]
pub struct SequenceRandom {
    values: Mutex<VecDeque<u64>>,
}

impl SequenceRandom {
    pub fn new(values: impl IntoIterator<Item = u64>) -> Self {
        Self {
            values: Mutex::new(values.into_iter().collect()),
        }
    }

    fn next_raw(&self) -> u64 {
        let mut values = match self.values.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        match values.pop_front() {
            Some(v) => {
                values.push_back(v);
                v
            }
            None => 0,
        }
    }
}

impl RandomSource for SequenceRandom {
    fn below(&self, range: Range<u64>) -> u64 {
        if range.is_empty() {
            return range.start;
        }
        let raw = self.next_raw();
        if range.contains(&raw) {
            raw
        } else {
            range.start + raw % (range.end - range.start)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thread_random_stays_in_range() {
        let rng = ThreadRandom;
        for _ in 0..200 {
            let v = rng.below(1000..4000);
            assert!((1000..4000).contains(&v));
        }
    }

    #[test]
    fn sequence_replays_in_range_values_verbatim() {
        let rng = SequenceRandom::new([1500, 3999]);
        assert_eq!(rng.below(1000..4000), 1500);
        assert_eq!(rng.below(1000..4000), 3999);
        assert_eq!(rng.below(1000..4000), 1500);
    }

    #[test]
    fn sequence_reduces_out_of_range_values() {
        let rng = SequenceRandom::new([5]);
        assert_eq!(rng.pick(3), 2);
    }

    #[test]
    fn empty_range_yields_start() {
        assert_eq!(ThreadRandom.below(7..7), 7);
        assert_eq!(SequenceRandom::new([]).below(3..3), 3);
    }
}
