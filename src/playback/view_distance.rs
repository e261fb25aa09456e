//! Conversion between time and distance on the track.
//!
//! Distances are measured in beats, so an object two beats away is drawn at the same
//! place whatever the tempo is. An interval crossing a tempo change is split at every
//! timing point and each part is measured in its own regime.

use super::BeatmapPlayback;
use crate::MapTime;
use crate::chart::timing::saturating_i32;

/// Milliseconds per unit of distance while scrolling at a constant speed.
pub const CONSTANT_SPEED_SCALE: f64 = 480_000.0;

impl BeatmapPlayback {
    /// Distance covered by `duration` from the current time.
    #[must_use]
    pub fn duration_to_view_distance(&self, duration: MapTime) -> f64 {
        self.duration_to_view_distance_at_time(self.playback_time, duration)
    }

    /// Distance covered by `duration` from `time`. Negative durations look backward and
    /// give negative distances.
    #[must_use]
    pub fn duration_to_view_distance_at_time(&self, time: MapTime, duration: MapTime) -> f64 {
        if self.config.constant_speed {
            return f64::from(duration) / CONSTANT_SPEED_SCALE;
        }

        let direction = f64::from(duration.signum());
        let (start, end_time) = {
            let time = i64::from(time);
            let duration = i64::from(duration);
            if duration < 0 {
                (time + duration, time)
            } else {
                (time, time + duration)
            }
        };
        let mut remaining = end_time - start;

        if let Some(calibration) = &self.calibration {
            return remaining as f64 / calibration.timing().beat_duration * direction;
        }

        let timing_points = self.chart.timing_points();
        let first = MapTime::try_from(start).unwrap_or(MapTime::MIN);
        let mut index = timing_points.find(first, self.timing_index, false);
        let mut current = start;
        let mut beats = 0.0;
        while let Some(next) = timing_points.as_slice().get(index + 1)
            && i64::from(next.time) < end_time
        {
            let span = i64::from(next.time) - current;
            beats += span as f64 / timing_points.get(index).beat_duration;
            remaining -= span;
            current = i64::from(next.time);
            index += 1;
        }
        beats += remaining as f64 / timing_points.get(index).beat_duration;

        beats * direction
    }

    /// Time it takes to cover `distance` from the current time.
    #[must_use]
    pub fn view_distance_to_duration(&self, distance: f64) -> MapTime {
        if self.config.constant_speed {
            return saturating_i32((distance * CONSTANT_SPEED_SCALE).round());
        }
        if let Some(calibration) = &self.calibration {
            return saturating_i32((distance * calibration.timing().beat_duration).round());
        }

        let timing_points = self.chart.timing_points();
        let mut index = timing_points.find(self.playback_time, self.timing_index, false);
        let mut current = i64::from(self.playback_time);
        let mut remaining = distance;
        let mut duration = 0.0;
        loop {
            let point = timing_points.get(index);
            if let Some(next) = timing_points.as_slice().get(index + 1) {
                let span = (i64::from(next.time) - current) as f64;
                let max_distance = span / point.beat_duration;
                if max_distance < remaining {
                    duration += span;
                    remaining -= max_distance;
                    current = i64::from(next.time);
                    index += 1;
                    continue;
                }
            }
            duration += remaining * point.beat_duration;
            break;
        }

        saturating_i32(duration.round())
    }

    /// Distance from the current time to `time`.
    #[must_use]
    pub fn time_to_view_distance(&self, time: MapTime) -> f64 {
        let duration = time.saturating_sub(self.playback_time);
        self.duration_to_view_distance_at_time(self.playback_time, duration)
    }
}
