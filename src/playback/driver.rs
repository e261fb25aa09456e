//! Drives a playback from the wall clock.
//!
//! The game loop hands over [`TimeStamp`]s; the driver turns the time elapsed since the
//! start of play into chart time and forwards it to the playback. Seeking restarts the
//! playback at a new position.

use gametime::{TimeSpan, TimeStamp};
use num::ToPrimitive;

use super::{BeatmapPlayback, PlaybackError, PlaybackEvent};
use crate::MapTime;

/// A [`BeatmapPlayback`] bound to the wall clock.
#[derive(Clone)]
pub struct PlaybackDriver {
    playback: BeatmapPlayback,
    started_at: Option<TimeStamp>,
    init_time: MapTime,
    range_start: MapTime,
}

impl PlaybackDriver {
    /// Wrap a playback. Nothing plays until [`PlaybackDriver::start_play`].
    #[must_use]
    pub const fn new(playback: BeatmapPlayback) -> Self {
        Self {
            playback,
            started_at: None,
            init_time: 0,
            range_start: 0,
        }
    }

    /// Only play objects from `start` on.
    #[must_use]
    pub fn with_range_start(mut self, start: MapTime) -> Self {
        self.range_start = start;
        self
    }

    /// The driven playback.
    #[must_use]
    pub const fn playback(&self) -> &BeatmapPlayback {
        &self.playback
    }

    /// Mutable access to the driven playback.
    pub const fn playback_mut(&mut self) -> &mut BeatmapPlayback {
        &mut self.playback
    }

    /// When the current run of play started.
    #[must_use]
    pub const fn started_at(&self) -> Option<TimeStamp> {
        self.started_at
    }

    /// Start playing at `now`, with the chart clock at `init_time`.
    ///
    /// # Errors
    ///
    /// Whatever [`BeatmapPlayback::reset`] fails with. The driver stays stopped then.
    pub fn start_play(&mut self, now: TimeStamp, init_time: MapTime) -> Result<(), PlaybackError> {
        self.started_at = None;
        self.playback.reset(init_time, self.range_start)?;
        self.started_at = Some(now);
        self.init_time = init_time;
        Ok(())
    }

    /// Jump to `time`, restarting the playback there.
    ///
    /// # Errors
    ///
    /// Whatever [`BeatmapPlayback::reset`] fails with.
    pub fn seek(&mut self, now: TimeStamp, time: MapTime) -> Result<(), PlaybackError> {
        self.start_play(now, time)
    }

    /// Chart time at `now`, or `None` before the start of play.
    #[must_use]
    pub fn map_time(&self, now: TimeStamp) -> Option<MapTime> {
        let started_at = self.started_at?;
        let elapsed = now
            .checked_elapsed_since(started_at)
            .unwrap_or(TimeSpan::ZERO);
        let millis = (elapsed.as_nanos().max(0) / 1_000_000)
            .to_i32()
            .unwrap_or(MapTime::MAX);
        Some(self.init_time.saturating_add(millis))
    }

    /// Advance the playback to the chart time at `now`.
    pub fn update(&mut self, now: TimeStamp) -> Vec<PlaybackEvent> {
        match self.map_time(now) {
            Some(time) => self.playback.update(time),
            None => Vec::new(),
        }
    }
}
