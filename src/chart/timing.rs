//! Tempo regimes and the conversions between time and measures.

use itertools::Itertools;
use log::debug;
use num::ToPrimitive;

use super::ChartError;
use crate::MapTime;
use crate::cursor::{Timed, count_at_or_before};

/// Tolerance under which a tempo regime is considered to hold a whole number of bars.
pub const MEASURE_EPSILON: f64 = 0.005;

/// Start of a tempo and time signature regime.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimingPoint {
    /// Time at which the regime starts.
    pub time: MapTime,
    /// Length of one beat in milliseconds.
    pub beat_duration: f64,
    /// Beats per bar.
    pub numerator: u8,
    /// Note value of one beat.
    pub denominator: u8,
}

impl Default for TimingPoint {
    /// 120 BPM in 4/4, starting at time 0.
    fn default() -> Self {
        Self::new(0, 500.0, 4, 4)
    }
}

impl TimingPoint {
    /// Create a new timing point.
    #[must_use]
    pub const fn new(time: MapTime, beat_duration: f64, numerator: u8, denominator: u8) -> Self {
        Self {
            time,
            beat_duration,
            numerator,
            denominator,
        }
    }

    /// Length of a whole note in milliseconds.
    #[must_use]
    pub fn whole_note_length(&self) -> f64 {
        self.beat_duration * 4.0
    }

    /// Length of one bar in milliseconds.
    #[must_use]
    pub fn bar_duration(&self) -> f64 {
        self.whole_note_length() * f64::from(self.numerator) / f64::from(self.denominator)
    }

    /// Tempo in beats per minute.
    #[must_use]
    pub fn bpm(&self) -> f64 {
        60_000.0 / self.beat_duration
    }

    fn is_valid(&self) -> bool {
        self.beat_duration.is_finite()
            && self.beat_duration > 0.0
            && self.numerator > 0
            && self.denominator > 0
    }
}

impl Timed for TimingPoint {
    fn time(&self) -> MapTime {
        self.time
    }
}

/// A point where the visibility of the lanes is toggled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LaneTogglePoint {
    /// Time of the toggle.
    pub time: MapTime,
    /// Length of the hide/show animation.
    pub duration: MapTime,
}

impl Timed for LaneTogglePoint {
    fn time(&self) -> MapTime {
        self.time
    }
}

/// Tempo statistics of a chart, in beats per minute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BpmSummary {
    /// Tempo of the first timing point.
    pub first: f64,
    /// Lowest tempo.
    pub min: f64,
    /// Highest tempo.
    pub max: f64,
    /// Tempo which lasts the longest over the chart.
    pub mode: f64,
}

/// Time-sorted, non-empty list of timing points.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TimingPoints(Vec<TimingPoint>);

impl Default for TimingPoints {
    fn default() -> Self {
        Self(vec![TimingPoint::default()])
    }
}

impl AsRef<[TimingPoint]> for TimingPoints {
    fn as_ref(&self) -> &[TimingPoint] {
        &self.0
    }
}

impl TimingPoints {
    /// Validate a list of timing points.
    ///
    /// An empty list becomes a single 120 BPM 4/4 point at time 0.
    ///
    /// # Errors
    ///
    /// - [`ChartError::UnsortedTimingPoints`] if the times are not strictly increasing.
    /// - [`ChartError::InvalidTimingPoint`] if a beat duration is not positive or the
    ///   signature has a zero in it.
    pub fn new(points: Vec<TimingPoint>) -> Result<Self, ChartError> {
        if points.is_empty() {
            return Ok(Self::default());
        }
        if let Some(point) = points.iter().find(|point| !point.is_valid()) {
            return Err(ChartError::InvalidTimingPoint { time: point.time });
        }
        if let Some((_, later)) = points
            .iter()
            .tuple_windows()
            .find(|(prev, next)| next.time <= prev.time)
        {
            return Err(ChartError::UnsortedTimingPoints { time: later.time });
        }
        Ok(Self(points))
    }

    /// All timing points in order.
    #[must_use]
    pub fn as_slice(&self) -> &[TimingPoint] {
        &self.0
    }

    /// Number of timing points. Never zero.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`, kept for symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The first timing point.
    #[must_use]
    pub fn first(&self) -> &TimingPoint {
        match self.0.first() {
            Some(point) => point,
            None => unreachable!("timing points are never empty"),
        }
    }

    /// The timing point at `index`, clamped to the last one.
    #[must_use]
    pub fn get(&self, index: usize) -> &TimingPoint {
        &self.0[index.min(self.0.len() - 1)]
    }

    /// Iterate over the timing points.
    pub fn iter(&self) -> std::slice::Iter<'_, TimingPoint> {
        self.0.iter()
    }

    /// Index of the regime containing `time`, searched from `hint`.
    ///
    /// Times before the first point resolve to the first point. When `forward_only` is
    /// set and the hinted point already lies after `time`, the hint is returned as is,
    /// which keeps a playback cursor from moving backward.
    #[must_use]
    pub fn find(&self, time: MapTime, hint: usize, forward_only: bool) -> usize {
        let hint = hint.min(self.0.len() - 1);
        if forward_only && self.0[hint].time > time {
            return hint;
        }
        count_at_or_before(&self.0, time, hint + 1).saturating_sub(1)
    }

    /// The timing point whose regime contains `time`.
    #[must_use]
    pub fn at(&self, time: MapTime) -> &TimingPoint {
        &self.0[self.find(time, 0, false)]
    }

    /// Index of the measure containing `time`.
    #[must_use]
    pub fn measure_index_from_time(&self, time: MapTime) -> i32 {
        if time <= 0 {
            return 0;
        }

        let mut measure = 0;
        for (index, point) in self.0.iter().enumerate() {
            if let Some(next) = self.0.get(index + 1) {
                if next.time <= time {
                    measure += bar_count(point, next);
                    continue;
                }
            }
            let bars = MEASURE_EPSILON + (f64::from(time) - f64::from(point.time)) / point.bar_duration();
            return measure + saturating_i32(bars);
        }

        unreachable!("timing points are never empty")
    }

    /// Start time of the measure with the given index.
    #[must_use]
    pub fn time_from_measure_index(&self, measure: i32) -> MapTime {
        if measure < 0 {
            return 0;
        }

        let mut current = 0;
        for (index, point) in self.0.iter().enumerate() {
            let in_regime = match self.0.get(index + 1) {
                None => true,
                Some(_) if measure <= current => true,
                Some(next) => {
                    let bars = bar_count(point, next);
                    if measure < current + bars {
                        true
                    } else {
                        current += bars;
                        false
                    }
                }
            };
            if in_regime {
                let offset = point.bar_duration() * f64::from(measure - current);
                return saturating_i32(f64::from(point.time) + offset);
            }
        }

        unreachable!("timing points are never empty")
    }

    /// Tempo statistics over the chart.
    ///
    /// The time between `offset` and the first point is counted under no tempo at all,
    /// and the last regime extends until `last_object_time`. On equal total durations
    /// the tempo seen first wins.
    #[must_use]
    pub fn bpm_summary(&self, offset: MapTime, last_object_time: MapTime) -> BpmSummary {
        let first = self.first().bpm();
        let mut min = first;
        let mut max = first;

        // `None` is the lead-in before the first timing point.
        let mut durations: Vec<(Option<f64>, i64)> = Vec::new();
        let mut add = |bpm: Option<f64>, span: i64| -> i64 {
            let slot = match durations.iter().position(|(seen, _)| *seen == bpm) {
                Some(slot) => slot,
                None => {
                    durations.push((bpm, 0));
                    durations.len() - 1
                }
            };
            durations[slot].1 += span;
            durations[slot].1
        };

        let mut largest = -1;
        let mut mode = None;
        let mut last_time = offset;
        let mut last_bpm = None;

        for point in &self.0 {
            let bpm = point.bpm();
            min = min.min(bpm);
            max = max.max(bpm);

            let total = add(last_bpm, i64::from(point.time) - i64::from(last_time));
            if total > largest {
                mode = last_bpm;
                largest = total;
            }
            last_time = point.time;
            last_bpm = Some(bpm);
        }

        let total = add(last_bpm, i64::from(last_object_time) - i64::from(last_time));
        if total > largest {
            mode = last_bpm;
        }

        BpmSummary {
            first,
            min,
            max,
            mode: mode.unwrap_or(first),
        }
    }
}

/// Number of whole bars between two timing points.
///
/// The ratio is rounded half up. When the regime does not hold a whole number of bars,
/// a partial bar at the end counts as a full one.
fn bar_count(point: &TimingPoint, next: &TimingPoint) -> i32 {
    let ratio = (f64::from(next.time) - f64::from(point.time)) / point.bar_duration();
    let mut count = saturating_i32(ratio + 0.5);

    if (ratio - f64::from(count)).abs() >= MEASURE_EPSILON {
        debug!(
            "timing point at {} contains a non-integer number of bars: {ratio}",
            point.time
        );
        if ratio > f64::from(count) {
            count += 1;
        }
    }

    count
}

/// Truncates toward zero, saturating at the bounds of `i32`.
pub(crate) fn saturating_i32(value: f64) -> i32 {
    value.to_i32().unwrap_or(if value.is_sign_negative() {
        i32::MIN
    } else {
        i32::MAX
    })
}
