//! Piecewise linear graphs driving the continuous camera effects.

use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Unbounded};

use strict_num_extended::FinF64;

use crate::MapTime;

/// A point of a [`LineGraph`].
///
/// A point whose `before` and `after` values differ is a slam, an instant jump of the
/// value at that time.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GraphPoint {
    /// Value approached from earlier times.
    pub before: f64,
    /// Value held from this time on.
    pub after: f64,
}

impl GraphPoint {
    /// A point without a jump.
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Self {
            before: value,
            after: value,
        }
    }

    /// A point jumping from `before` to `after`.
    #[must_use]
    pub const fn slam(before: f64, after: f64) -> Self {
        Self { before, after }
    }

    /// Whether the value jumps at this point.
    #[must_use]
    pub fn is_slam(&self) -> bool {
        self.before != self.after
    }
}

/// A sparse mapping from time to value, linearly interpolated between points.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineGraph {
    points: BTreeMap<MapTime, GraphPoint>,
    default: f64,
}

impl Default for LineGraph {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl LineGraph {
    /// Create an empty graph which reads as `default` everywhere.
    #[must_use]
    pub const fn new(default: f64) -> Self {
        Self {
            points: BTreeMap::new(),
            default,
        }
    }

    /// Value of the graph while it has no points.
    #[must_use]
    pub const fn default_value(&self) -> f64 {
        self.default
    }

    /// Whether the graph has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Iterate over the points in time order.
    pub fn points(&self) -> impl Iterator<Item = (MapTime, &GraphPoint)> {
        self.points.iter().map(|(&time, point)| (time, point))
    }

    /// The first point strictly after `time`.
    #[must_use]
    pub fn first_point_after(&self, time: MapTime) -> Option<(MapTime, &GraphPoint)> {
        self.points
            .range((Excluded(time), Unbounded))
            .next()
            .map(|(&time, point)| (time, point))
    }

    /// Insert a value at `time`.
    ///
    /// If a point already exists there, only its `after` value is replaced, which turns
    /// it into a slam from the old value to the new one.
    pub fn insert(&mut self, time: MapTime, value: f64) {
        self.points
            .entry(time)
            .and_modify(|point| point.after = value)
            .or_insert(GraphPoint::new(value));
    }

    /// Insert a point at `time`.
    ///
    /// If a point already exists there, only its `after` value is replaced.
    pub fn insert_point(&mut self, time: MapTime, point: GraphPoint) {
        self.points
            .entry(time)
            .and_modify(|existing| existing.after = point.after)
            .or_insert(point);
    }

    /// Insert a value written as `"value"` or `"before;after"`.
    ///
    /// Text that does not parse to finite numbers is ignored.
    pub fn insert_str(&mut self, time: MapTime, text: &str) {
        match text.split_once(';') {
            None => {
                if let Some(value) = parse_value(text) {
                    self.insert(time, value);
                }
            }
            Some((before, after)) => {
                if let (Some(before), Some(after)) = (parse_value(before), parse_value(after)) {
                    self.insert_point(time, GraphPoint::slam(before, after));
                }
            }
        }
    }

    /// Pin the current value at `time` by inserting a point there.
    ///
    /// Returns the pinned value. If a point already exists at `time`, the graph is left
    /// untouched and the point's `before` value is returned.
    pub fn extend(&mut self, time: MapTime) -> f64 {
        if let Some(point) = self.points.get(&time) {
            return point.before;
        }
        let value = self.value_at(time);
        self.insert(time, value);
        value
    }

    /// Value of the graph at `time`.
    ///
    /// Before the first point the graph holds that point's `before` value, after the last
    /// point it holds that point's `after` value. Curves are not supported; every
    /// segment is a straight line.
    #[must_use]
    pub fn value_at(&self, time: MapTime) -> f64 {
        let first = self.points.range(..=time).next_back();
        let second = self.points.range((Excluded(time), Unbounded)).next();

        match (first, second) {
            (None, None) => self.default,
            (None, Some((_, next))) => next.before,
            (Some((_, prev)), None) => prev.after,
            (Some((&prev_time, prev)), Some((&next_time, next))) => {
                if prev_time == next_time {
                    return next.before;
                }
                let rate = (f64::from(time) - f64::from(prev_time))
                    / (f64::from(next_time) - f64::from(prev_time));
                prev.after + (next.before - prev.after) * rate
            }
        }
    }

    /// The point at `time` written back as text.
    ///
    /// Slams are written as `"before;after"`. Trailing zeros are trimmed. Returns an
    /// empty string if there is no point at `time`.
    #[must_use]
    pub fn string_value_at(&self, time: MapTime) -> String {
        match self.points.get(&time) {
            None => String::new(),
            Some(point) if point.is_slam() => {
                format!("{};{}", format_value(point.before), format_value(point.after))
            }
            Some(point) => format_value(point.before),
        }
    }
}

fn parse_value(text: &str) -> Option<f64> {
    let value = text.trim().parse::<f64>().ok()?;
    FinF64::new(value).ok().map(|value| value.as_f64())
}

fn format_value(value: f64) -> String {
    let text = format!("{value:.6}");
    text.trim_end_matches('0').trim_end_matches('.').to_owned()
}
