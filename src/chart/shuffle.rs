//! Random sources for lane shuffling.
//!
//! Shuffling only needs a bounded integer generator, so the chart takes any
//! [`LaneRng`]. With the `rand` feature, [`RandRng`] adapts any [`rand::Rng`].

use std::ops::RangeInclusive;

/// Generates integers for lane shuffling.
pub trait LaneRng {
    /// Generates an integer within `range`.
    fn generate(&mut self, range: RangeInclusive<u64>) -> u64;
}

/// A deterministic generator which replays the given numbers in a loop.
///
/// Numbers out of the requested range are wrapped into it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SequenceRng(pub Vec<u64>);

impl LaneRng for SequenceRng {
    fn generate(&mut self, range: RangeInclusive<u64>) -> u64 {
        let Some(first) = self.0.first().copied() else {
            return *range.start();
        };
        self.0.rotate_left(1);
        wrap_into(first, range)
    }
}

/// Adapts a [`rand::Rng`] to [`LaneRng`].
#[cfg(feature = "rand")]
#[derive(Debug, Clone)]
pub struct RandRng<R>(pub R);

#[cfg(feature = "rand")]
impl<R: rand::Rng> LaneRng for RandRng<R> {
    fn generate(&mut self, range: RangeInclusive<u64>) -> u64 {
        sample_uniform(range, || self.0.next_u64())
    }
}

/// Draws uniformly from `range`, rejecting the values of the incomplete last block so
/// that the remainder is not biased towards small numbers.
#[cfg(any(feature = "rand", test))]
fn sample_uniform(range: RangeInclusive<u64>, mut next: impl FnMut() -> u64) -> u64 {
    let start = *range.start();
    let width = range.end().wrapping_sub(start).wrapping_add(1);
    if width == 0 {
        return next();
    }
    let leftover = (u64::MAX % width + 1) % width;
    let limit = u64::MAX - leftover;
    loop {
        let value = next();
        if value <= limit {
            return start + value % width;
        }
    }
}

fn wrap_into(value: u64, range: RangeInclusive<u64>) -> u64 {
    let start = *range.start();
    let width = range.end().wrapping_sub(start).wrapping_add(1);
    if width == 0 {
        value
    } else {
        start + value % width
    }
}

/// Fisher-Yates shuffle driven by a [`LaneRng`].
pub(crate) fn shuffle<T>(items: &mut [T], rng: &mut impl LaneRng) {
    for index in (1..items.len()).rev() {
        let other = rng.generate(0..=index as u64) as usize;
        items.swap(index, other);
    }
}
