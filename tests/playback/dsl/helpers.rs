//! Helper functions for building charts and reading events in tests.

use std::sync::Arc;

use beatmap_playback::chart::{Chart, ChartObject, ChartSettings, ObjectId, TimingPoint};
use beatmap_playback::playback::{BeatmapPlayback, PlaybackConfig, PlaybackEvent};

/// A chart with default settings.
pub fn chart(objects: Vec<ChartObject>, timing_points: Vec<TimingPoint>) -> Arc<Chart> {
    Arc::new(
        Chart::new(objects, timing_points, ChartSettings::default())
            .expect("chart should be valid"),
    )
}

/// A playback of `chart`, not reset yet.
pub fn playback(chart: Arc<Chart>, config: PlaybackConfig) -> BeatmapPlayback {
    BeatmapPlayback::new(chart, config)
}

/// A config where objects enter exactly at their time and leave exactly at their end.
pub fn tight_config() -> PlaybackConfig {
    PlaybackConfig {
        hit_object_enter: 0,
        hit_object_leave: 0,
        laser_enter: 0,
        alert_laser_threshold: 0,
        ..PlaybackConfig::default()
    }
}

/// Objects entering the window, in order.
pub fn entered(events: &[PlaybackEvent]) -> Vec<ObjectId> {
    events
        .iter()
        .filter_map(|event| match event {
            PlaybackEvent::ObjectEntered(id) => Some(*id),
            _ => None,
        })
        .collect()
}

/// Objects leaving the window, in order.
pub fn left(events: &[PlaybackEvent]) -> Vec<ObjectId> {
    events
        .iter()
        .filter_map(|event| match event {
            PlaybackEvent::ObjectLeft(id) => Some(*id),
            _ => None,
        })
        .collect()
}
