//! Calibration mode, used to measure the input and audio latency of the player.
//!
//! A calibration playback plays a fixed chart of evenly spaced taps at 120 BPM instead
//! of a real chart. It only tracks the beat phase and never reports events.

use std::sync::Arc;

use super::{BeatmapPlayback, PlaybackConfig, PlaybackState};
use crate::MapTime;
use crate::chart::{Chart, ChartObject, TimingPoint};

/// Number of taps in the calibration chart.
pub const CALIBRATION_OBJECTS: usize = 50;

/// Time between two calibration taps.
pub const CALIBRATION_INTERVAL: MapTime = 500;

/// The synthetic chart of a calibration playback.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Calibration {
    objects: Vec<ChartObject>,
    timing: TimingPoint,
}

impl Calibration {
    pub(crate) fn new() -> Self {
        let objects = (0..CALIBRATION_OBJECTS)
            .map(|index| {
                ChartObject::tap(index as MapTime * CALIBRATION_INTERVAL, (index % 4) as u8)
            })
            .collect();
        Self {
            objects,
            timing: TimingPoint::new(0, f64::from(CALIBRATION_INTERVAL), 4, 4),
        }
    }

    pub(crate) fn objects(&self) -> &[ChartObject] {
        &self.objects
    }

    pub(crate) const fn timing(&self) -> &TimingPoint {
        &self.timing
    }
}

impl BeatmapPlayback {
    /// Create a playback of the calibration chart.
    #[must_use]
    pub fn calibration(config: PlaybackConfig) -> Self {
        let mut playback = Self::new(Arc::new(Chart::default()), config);
        playback.make_calibration_playback();
        playback
    }

    /// Switch to the calibration chart. The chart given at creation is no longer played.
    pub fn make_calibration_playback(&mut self) {
        self.calibration = Some(Calibration::new());
        self.state = PlaybackState::Ready;
    }
}
