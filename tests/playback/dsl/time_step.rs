//! Time step and builder implementation

use beatmap_playback::MapTime;
use beatmap_playback::playback::{BeatmapPlayback, PlaybackEvent};

use super::driver::TestPlaybackDriver;

type StateAssertion = Box<dyn Fn(&BeatmapPlayback)>;

type EventAssertion = Box<dyn Fn(&[PlaybackEvent])>;

type ControlAction = Box<dyn FnOnce(&mut BeatmapPlayback)>;

pub struct TimeStep {
    pub duration: MapTime,
    pub state_assertions: Vec<StateAssertion>,
    pub event_assertions: Vec<EventAssertion>,
    pub control_actions: Vec<ControlAction>,
}

impl TimeStep {
    pub fn new(duration: MapTime) -> Self {
        Self {
            duration,
            state_assertions: Vec::new(),
            event_assertions: Vec::new(),
            control_actions: Vec::new(),
        }
    }
}

pub struct TimeStepBuilder<'a> {
    driver: &'a mut TestPlaybackDriver,
}

impl<'a> TimeStepBuilder<'a> {
    pub(super) const fn new(driver: &'a mut TestPlaybackDriver) -> Self {
        Self { driver }
    }

    /// Asserts on the playback after this step's update.
    #[must_use]
    pub fn view<F>(self, assertion: F) -> Self
    where
        F: Fn(&BeatmapPlayback) + 'static,
    {
        if let Some(step) = self.driver.time_steps.last_mut() {
            step.state_assertions.push(Box::new(assertion));
        }
        self
    }

    /// Asserts on the events returned by this step's update.
    #[must_use]
    pub fn events<F>(self, assertion: F) -> Self
    where
        F: Fn(&[PlaybackEvent]) + 'static,
    {
        if let Some(step) = self.driver.time_steps.last_mut() {
            step.event_assertions.push(Box::new(assertion));
        }
        self
    }

    /// Runs `action` on the playback before this step's update.
    #[must_use]
    pub fn act<F>(self, action: F) -> Self
    where
        F: FnOnce(&mut BeatmapPlayback) + 'static,
    {
        if let Some(step) = self.driver.time_steps.last_mut() {
            step.control_actions.push(Box::new(action));
        }
        self
    }

    #[must_use]
    pub fn past(self, duration: MapTime) -> Self {
        self.driver.past(duration)
    }

    pub fn run(self) {
        self.driver.run_mut();
    }
}
