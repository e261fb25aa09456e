//! Galloping search over time-sorted streams.
//!
//! Every stream the playback walks over (timing points, lane toggles and chart objects)
//! is sorted by time and queried with a time that usually moves forward by a few
//! milliseconds per frame. The search here starts from the previous answer, steps
//! outward with a doubling stride until the target is bracketed and then binary searches
//! inside the bracket, so sequential access stays O(1) while random seeks stay
//! O(log n).

use std::ops::Range;

use crate::MapTime;

/// Items which are placed on the chart timeline.
pub trait Timed {
    /// The time at which the item starts.
    fn time(&self) -> MapTime;
}

/// Returns the partition point of `items` under `pred`, searching outward from `hint`.
///
/// `pred` must hold for a (possibly empty) prefix of `items` and fail for the rest. The
/// result is the index of the first item for which `pred` is `false`, or `items.len()`
/// if there is none. It is the same value [`slice::partition_point`] returns.
pub fn gallop_partition<T>(items: &[T], hint: usize, mut pred: impl FnMut(&T) -> bool) -> usize {
    let len = items.len();
    let hint = hint.min(len);

    if hint < len && pred(&items[hint]) {
        // The answer lies in (hint, len].
        let mut lo = hint + 1;
        let mut stride = 1;
        let hi = loop {
            let candidate = hint + stride;
            if candidate >= len {
                break len;
            }
            if !pred(&items[candidate]) {
                break candidate;
            }
            lo = candidate + 1;
            stride *= 2;
        };
        lo + items[lo..hi].partition_point(|item| pred(item))
    } else {
        // The answer lies in [0, hint].
        let mut hi = hint;
        let mut stride = 1;
        let lo = loop {
            if stride > hint {
                break 0;
            }
            let candidate = hint - stride;
            if pred(&items[candidate]) {
                break candidate + 1;
            }
            hi = candidate;
            stride *= 2;
        };
        lo + items[lo..hi].partition_point(|item| pred(item))
    }
}

/// Number of items whose time is at or before `time`.
#[must_use]
pub fn count_at_or_before<T: Timed>(items: &[T], time: MapTime, hint: usize) -> usize {
    gallop_partition(items, hint, |item| item.time() <= time)
}

/// Number of items whose time is strictly before `time`.
#[must_use]
pub fn count_before<T: Timed>(items: &[T], time: MapTime, hint: usize) -> usize {
    gallop_partition(items, hint, |item| item.time() < time)
}

/// A forward-only position into a sorted stream.
///
/// The position is the number of items already passed. Only [`StreamCursor::reset`]
/// moves it back to the start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct StreamCursor {
    position: usize,
}

impl StreamCursor {
    /// Create a cursor at the start of a stream.
    #[must_use]
    pub const fn new() -> Self {
        Self { position: 0 }
    }

    /// Number of items the cursor has passed.
    #[must_use]
    pub const fn position(self) -> usize {
        self.position
    }

    /// Move back to the start of the stream.
    pub const fn reset(&mut self) {
        self.position = 0;
    }

    /// Advance past every item with time strictly before `time`.
    ///
    /// Returns the range of items passed by this call, which is empty if the cursor
    /// did not move.
    pub fn advance_before<T: Timed>(&mut self, items: &[T], time: MapTime) -> Range<usize> {
        let next = count_before(items, time, self.position);
        self.move_to(next)
    }

    /// Advance past every item with time at or before `time`.
    ///
    /// Returns the range of items passed by this call.
    pub fn advance_at_or_before<T: Timed>(&mut self, items: &[T], time: MapTime) -> Range<usize> {
        let next = count_at_or_before(items, time, self.position);
        self.move_to(next)
    }

    fn move_to(&mut self, next: usize) -> Range<usize> {
        let next = next.max(self.position);
        let passed = self.position..next;
        self.position = next;
        passed
    }
}
