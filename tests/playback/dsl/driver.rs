//! Test playback driver implementation

use beatmap_playback::MapTime;
use beatmap_playback::playback::BeatmapPlayback;

use super::time_step::{TimeStep, TimeStepBuilder};

/// Test playback driver
///
/// Resets the playback, then advances its clock step by step, running the assertions
/// attached to each step right after the update of that step.
pub struct TestPlaybackDriver {
    /// Playback instance
    playback: Option<BeatmapPlayback>,
    /// Clock value at reset
    init_time: MapTime,
    /// Start of the play range
    range_start: MapTime,
    /// End of the play range
    range_end: Option<MapTime>,
    /// List of time advancement steps
    pub(crate) time_steps: Vec<TimeStep>,
}

impl TestPlaybackDriver {
    /// Creates a new test driver starting at time 0 with the whole chart playable.
    pub const fn new(playback: BeatmapPlayback) -> Self {
        Self {
            playback: Some(playback),
            init_time: 0,
            range_start: 0,
            range_end: None,
            time_steps: Vec::new(),
        }
    }

    /// Sets the clock value at reset.
    #[must_use]
    pub const fn start_at(mut self, init_time: MapTime) -> Self {
        self.init_time = init_time;
        self
    }

    /// Restricts the playable part of the chart.
    #[must_use]
    pub const fn play_range(mut self, start: MapTime, end: Option<MapTime>) -> Self {
        self.range_start = start;
        self.range_end = end;
        self
    }

    /// Advances the clock by `duration` milliseconds.
    pub fn past(&mut self, duration: MapTime) -> TimeStepBuilder<'_> {
        self.time_steps.push(TimeStep::new(duration));
        TimeStepBuilder::new(self)
    }

    /// Checks the playback state without advancing the clock.
    #[must_use]
    pub fn check<F>(mut self, check: F) -> Self
    where
        F: Fn(&BeatmapPlayback) + 'static,
    {
        let _ = self.past(0).view(check);
        self
    }

    /// Runs the test
    ///
    /// # Panics
    ///
    /// - Panics if the playback fails to reset
    /// - Panics if any assertion fails
    pub fn run(mut self) {
        self.run_mut();
    }

    pub(crate) fn run_mut(&mut self) {
        let mut playback = self.playback.take().expect("playback not set");
        playback
            .reset(self.init_time, self.range_start)
            .expect("playback should reset");
        if let Some(end) = self.range_end {
            playback.set_play_range_end(end);
        }

        let mut current_time = self.init_time;
        for step in &mut self.time_steps {
            for action in std::mem::take(&mut step.control_actions) {
                action(&mut playback);
            }

            current_time += step.duration;
            let events = playback.update(current_time);

            for assertion in &step.state_assertions {
                assertion(&playback);
            }
            for assertion in &step.event_assertions {
                assertion(&events);
            }
        }
    }
}
