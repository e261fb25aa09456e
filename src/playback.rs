//! The playback scheduler.
//!
//! [`BeatmapPlayback`] walks a [`Chart`] as the game clock moves forward. Each call to
//! [`BeatmapPlayback::update`] advances the cursors over the timing points, the lane
//! toggles and the objects, maintains the window of active objects, and returns what
//! happened during the tick as [`PlaybackEvent`]s.
//!
//! Within one tick the events are ordered by the stage producing them, not by their
//! time:
//!
//! 1. the initial effect state, once per [`BeatmapPlayback::reset`],
//! 2. timing point change,
//! 3. lane toggle change,
//! 4. objects entering the hit window, then lasers entering, then laser alerts,
//! 5. objects leaving the window,
//! 6. effect begin and end of held FX buttons.

pub mod calibration;
pub mod driver;
pub mod view_distance;

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use log::{debug, trace};
use thiserror::Error;

use self::calibration::Calibration;
use crate::MapTime;
use crate::chart::{
    Chart, ChartObject, EffectType, EventData, EventKey, GraphType, ObjectId, TimingPoint,
    TrackRollBehaviour,
};
use crate::cursor::{StreamCursor, count_at_or_before};

/// Lead by which event objects leave the window before their nominal time.
///
/// Events are handled when they leave, so this makes them fire slightly before they are
/// needed.
pub const EVENT_PRE_TRIGGER_LEAD: MapTime = 2;

/// How far before the end of a hold its effect stops being started.
pub const EFFECT_BEGIN_LEAD: MapTime = 100;

/// Tunables of a [`BeatmapPlayback`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PlaybackConfig {
    /// Offset added to the clock when matching hold effects against the audio.
    pub audio_offset: MapTime,
    /// Scroll at a constant speed, ignoring the tempo.
    pub constant_speed: bool,
    /// How early buttons and events enter the window.
    pub hit_object_enter: MapTime,
    /// How long objects stay in the window after they end.
    pub hit_object_leave: MapTime,
    /// How early lasers enter the window.
    pub laser_enter: MapTime,
    /// How early a new laser is announced.
    pub alert_laser_threshold: MapTime,
    /// How far behind the clock objects are still returned as visible.
    pub early_visibility: MapTime,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            audio_offset: 0,
            constant_speed: false,
            hit_object_enter: 250,
            hit_object_leave: 100,
            laser_enter: 1000,
            alert_laser_threshold: 1500,
            early_visibility: 200,
        }
    }
}

/// The part of the chart which may be played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayRange {
    /// First playable time.
    pub begin: MapTime,
    /// End of the playable part, exclusive. `None` plays until the end of the chart.
    pub end: Option<MapTime>,
}

impl Default for PlayRange {
    fn default() -> Self {
        Self::from_start(0)
    }
}

impl PlayRange {
    /// A range from `start` to the end of the chart.
    ///
    /// A non-positive start means the whole chart.
    #[must_use]
    pub const fn from_start(start: MapTime) -> Self {
        Self {
            begin: if start <= 0 { MapTime::MIN } else { start },
            end: None,
        }
    }

    /// Whether `time` lies in `[begin, end)`.
    #[must_use]
    pub fn includes(&self, time: MapTime) -> bool {
        self.begin <= time && self.end.is_none_or(|end| time < end)
    }

    /// Whether `time` lies in `[begin, end]`.
    #[must_use]
    pub fn includes_end(&self, time: MapTime) -> bool {
        self.begin <= time && self.end.is_none_or(|end| time <= end)
    }

    /// Whether the whole object lies in the range.
    fn admits(&self, object: &ChartObject) -> bool {
        if !self.includes(object.time()) {
            return false;
        }
        match object {
            ChartObject::Hold(_) | ChartObject::Laser(_) => self.includes_end(object.end_time()),
            ChartObject::Tap(_) | ChartObject::Event(_) => true,
        }
    }
}

/// Something that happened during a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PlaybackEvent {
    /// A new timing point took effect. Holds its index in the chart timing points.
    TimingPointChanged(usize),
    /// A lane toggle was passed. Holds its index in the chart lane toggles.
    LaneToggleChanged(usize),
    /// An object entered the window of active objects.
    ObjectEntered(ObjectId),
    /// An object left the window of active objects.
    ObjectLeft(ObjectId),
    /// The first segment of a laser is coming up.
    LaserAlertEntered(ObjectId),
    /// A chart event fired, or the initial value of a setting was announced.
    EventChanged(EventKey, EventData),
    /// The effect of a held FX button should start.
    EffectBegin(ObjectId),
    /// The effect of a held FX button should stop.
    EffectEnd(ObjectId),
}

/// Lifecycle of a [`BeatmapPlayback`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PlaybackState {
    /// Not reset yet, or the last reset failed.
    #[default]
    Uninitialized,
    /// Reset, waiting for the first update.
    Ready,
    /// Updated at least once since the last reset.
    Running,
}

/// An error occurred when resetting a [`BeatmapPlayback`].
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
pub enum PlaybackError {
    /// The chart has no object to play.
    #[error("the chart has no object to play")]
    EmptyChart,
}

/// Time-ordered multimap of active objects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct ActiveWindow(BTreeMap<MapTime, Vec<ObjectId>>);

impl ActiveWindow {
    fn insert(&mut self, time: MapTime, id: ObjectId) {
        self.0.entry(time).or_default().push(id);
    }

    fn remove(&mut self, time: MapTime, id: ObjectId) {
        if let Some(ids) = self.0.get_mut(&time) {
            if let Some(position) = ids.iter().position(|&other| other == id) {
                ids.remove(position);
            }
            if ids.is_empty() {
                self.0.remove(&time);
            }
        }
    }

    /// Remove and return every entry keyed strictly before `time`.
    fn pop_before(&mut self, time: MapTime) -> Vec<ObjectId> {
        let rest = self.0.split_off(&time);
        let passed = std::mem::replace(&mut self.0, rest);
        passed.into_values().flatten().collect()
    }

    fn ids(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.0.values().flatten().copied()
    }

    fn clear(&mut self) {
        self.0.clear();
    }
}

/// Plays a chart against a forward-moving clock.
#[derive(Debug, Clone)]
pub struct BeatmapPlayback {
    chart: Arc<Chart>,
    config: PlaybackConfig,
    calibration: Option<Calibration>,
    state: PlaybackState,

    playback_time: MapTime,
    play_range: PlayRange,

    object_cursor: StreamCursor,
    laser_cursor: StreamCursor,
    alert_cursor: StreamCursor,
    lane_toggle_index: usize,
    timing_index: usize,

    objects_by_time: ActiveWindow,
    objects_by_leave_time: ActiveWindow,
    effect_objects: BTreeSet<ObjectId>,
    event_mapping: HashMap<EventKey, EventData>,

    current_track_roll_behaviour: TrackRollBehaviour,
    last_track_roll_behaviour_change: MapTime,

    bar_time: f64,
    beat_time: f64,
    initial_effect_state_sent: bool,
}

impl BeatmapPlayback {
    /// Create a playback of `chart`. Call [`BeatmapPlayback::reset`] before updating it.
    #[must_use]
    pub fn new(chart: Arc<Chart>, config: PlaybackConfig) -> Self {
        Self {
            chart,
            config,
            calibration: None,
            state: PlaybackState::Uninitialized,
            playback_time: 0,
            play_range: PlayRange::default(),
            object_cursor: StreamCursor::new(),
            laser_cursor: StreamCursor::new(),
            alert_cursor: StreamCursor::new(),
            lane_toggle_index: 0,
            timing_index: 0,
            objects_by_time: ActiveWindow::default(),
            objects_by_leave_time: ActiveWindow::default(),
            effect_objects: BTreeSet::new(),
            event_mapping: HashMap::new(),
            current_track_roll_behaviour: TrackRollBehaviour::Normal,
            last_track_roll_behaviour_change: 0,
            bar_time: 0.0,
            beat_time: 0.0,
            initial_effect_state_sent: false,
        }
    }

    /// The chart being played.
    #[must_use]
    pub const fn chart(&self) -> &Arc<Chart> {
        &self.chart
    }

    /// The tunables of this playback.
    #[must_use]
    pub const fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    /// Lifecycle state.
    #[must_use]
    pub const fn state(&self) -> PlaybackState {
        self.state
    }

    /// Whether this is a calibration playback.
    #[must_use]
    pub const fn is_calibration(&self) -> bool {
        self.calibration.is_some()
    }

    /// Time of the last update.
    #[must_use]
    pub const fn playback_time(&self) -> MapTime {
        self.playback_time
    }

    /// The playable part of the chart.
    #[must_use]
    pub const fn play_range(&self) -> PlayRange {
        self.play_range
    }

    /// Objects being played, which are the calibration objects in calibration mode.
    #[must_use]
    pub fn objects(&self) -> &[ChartObject] {
        match &self.calibration {
            Some(calibration) => calibration.objects(),
            None => self.chart.objects(),
        }
    }

    /// The object with the given id.
    #[must_use]
    pub fn object(&self, id: ObjectId) -> Option<&ChartObject> {
        self.objects().get(id.value())
    }

    /// Restart the playback at `init_time`, playing objects from `start` on.
    ///
    /// A non-positive `start` plays the whole chart.
    ///
    /// # Errors
    ///
    /// [`PlaybackError::EmptyChart`] if there is nothing to play. The playback must not
    /// be updated until a reset succeeds.
    pub fn reset(&mut self, init_time: MapTime, start: MapTime) -> Result<(), PlaybackError> {
        self.effect_objects.clear();
        if self.objects().is_empty() {
            self.state = PlaybackState::Uninitialized;
            return Err(PlaybackError::EmptyChart);
        }

        debug!("resetting playback, init time = {init_time}, start = {start}");
        self.playback_time = init_time;
        self.play_range = PlayRange::from_start(start);

        self.object_cursor.reset();
        self.laser_cursor.reset();
        self.alert_cursor.reset();
        self.lane_toggle_index = 0;
        self.timing_index = 0;

        self.current_track_roll_behaviour = TrackRollBehaviour::Normal;
        self.last_track_roll_behaviour_change = 0;

        self.objects_by_time.clear();
        self.objects_by_leave_time.clear();
        self.event_mapping.clear();

        self.bar_time = 0.0;
        self.beat_time = 0.0;
        self.initial_effect_state_sent = false;
        self.state = PlaybackState::Ready;

        Ok(())
    }

    /// Stop admitting objects at `end`. A value not after the range begin removes the
    /// end.
    pub fn set_play_range_end(&mut self, end: MapTime) {
        self.play_range.end = (end > self.play_range.begin).then_some(end);
    }

    /// Advance the playback to `new_time` and return what happened.
    ///
    /// Times before the last update are ignored; use [`BeatmapPlayback::reset`] to seek
    /// backward. Updating a playback which was never reset does nothing.
    pub fn update(&mut self, new_time: MapTime) -> Vec<PlaybackEvent> {
        if let Some(calibration) = &self.calibration {
            let timing = *calibration.timing();
            self.update_phase(&timing, new_time);
            self.playback_time = new_time;
            return Vec::new();
        }

        if self.state == PlaybackState::Uninitialized || new_time < self.playback_time {
            return Vec::new();
        }
        self.state = PlaybackState::Running;

        let chart = Arc::clone(&self.chart);
        let mut events = Vec::new();

        if !self.initial_effect_state_sent {
            self.send_initial_effect_state(&chart, &mut events);
        }

        self.playback_time = new_time;
        self.advance_timing(&chart, &mut events);
        let timing = *self.current_timing_point();
        self.update_phase(&timing, new_time);
        self.advance_lane_toggles(&chart, &mut events);
        self.advance_objects(&chart, &mut events);
        self.sweep_passed_objects(&chart, &mut events);
        self.process_hold_effects(&chart, &mut events);

        events
    }

    fn send_initial_effect_state(&mut self, chart: &Chart, events: &mut Vec<PlaybackEvent>) {
        let settings = chart.settings();
        for (key, data) in [
            (
                EventKey::LaserEffectMix,
                EventData::Float(settings.laser_effect_mix),
            ),
            (
                EventKey::LaserEffectType,
                EventData::Effect(settings.laser_effect_type),
            ),
            (EventKey::SlamVolume, EventData::Float(settings.slam_volume)),
        ] {
            self.event_mapping.insert(key, data);
            events.push(PlaybackEvent::EventChanged(key, data));
        }
        self.initial_effect_state_sent = true;
    }

    fn update_phase(&mut self, timing: &TimingPoint, time: MapTime) {
        let elapsed = f64::from(time) - f64::from(timing.time);
        self.bar_time = (elapsed / (timing.beat_duration * f64::from(timing.numerator)))
            .rem_euclid(1.0);
        self.beat_time = (elapsed / timing.beat_duration).rem_euclid(1.0);
    }

    fn advance_timing(&mut self, chart: &Chart, events: &mut Vec<PlaybackEvent>) {
        let index = chart
            .timing_points()
            .find(self.playback_time, self.timing_index, true);
        if index != self.timing_index {
            self.timing_index = index;
            trace!(
                "timing point changed to #{index} at {}",
                self.playback_time
            );
            events.push(PlaybackEvent::TimingPointChanged(index));
        }
    }

    /// Moves to the last toggle at or before the clock. Like the timing index, the
    /// index rests on the first toggle until a later one is reached.
    fn advance_lane_toggles(&mut self, chart: &Chart, events: &mut Vec<PlaybackEvent>) {
        let passed = count_at_or_before(
            chart.lane_toggles(),
            self.playback_time,
            self.lane_toggle_index,
        );
        let index = passed.saturating_sub(1).max(self.lane_toggle_index);
        if index != self.lane_toggle_index {
            self.lane_toggle_index = index;
            trace!("lane toggle changed to #{index} at {}", self.playback_time);
            events.push(PlaybackEvent::LaneToggleChanged(index));
        }
    }

    fn advance_objects(&mut self, chart: &Chart, events: &mut Vec<PlaybackEvent>) {
        let objects = chart.objects();
        let now = self.playback_time;
        let leave = self.config.hit_object_leave;

        let entered = self
            .object_cursor
            .advance_before(objects, now.saturating_add(self.config.hit_object_enter));
        for index in entered {
            let object = &objects[index];
            if matches!(object, ChartObject::Laser(_)) || !self.play_range.admits(object) {
                continue;
            }
            let duration = match object {
                ChartObject::Event(_) => -EVENT_PRE_TRIGGER_LEAD,
                _ => object.duration(),
            };
            let stay = duration.saturating_add(leave);
            self.enter(ObjectId::new(index), object.time(), stay, events);
        }

        let entered = self
            .laser_cursor
            .advance_before(objects, now.saturating_add(self.config.laser_enter));
        for index in entered {
            let object = &objects[index];
            if !matches!(object, ChartObject::Laser(_)) || !self.play_range.admits(object) {
                continue;
            }
            let stay = object.duration().saturating_add(leave);
            self.enter(ObjectId::new(index), object.time(), stay, events);
        }

        let alerted = self
            .alert_cursor
            .advance_before(objects, now.saturating_add(self.config.alert_laser_threshold));
        for index in alerted {
            let object = &objects[index];
            if !self.play_range.includes(object.time()) {
                continue;
            }
            if let ChartObject::Laser(laser) = object
                && laser.prev.is_none()
            {
                events.push(PlaybackEvent::LaserAlertEntered(ObjectId::new(index)));
            }
        }
    }

    fn enter(
        &mut self,
        id: ObjectId,
        time: MapTime,
        stay: MapTime,
        events: &mut Vec<PlaybackEvent>,
    ) {
        self.objects_by_time.insert(time, id);
        self.objects_by_leave_time.insert(time.saturating_add(stay), id);
        events.push(PlaybackEvent::ObjectEntered(id));
    }

    fn sweep_passed_objects(&mut self, chart: &Chart, events: &mut Vec<PlaybackEvent>) {
        for id in self.objects_by_leave_time.pop_before(self.playback_time) {
            let Some(object) = chart.object(id) else {
                unreachable!("active object {id:?} is not in the chart");
            };
            self.objects_by_time.remove(object.time(), id);

            match object {
                ChartObject::Hold(_) => {
                    events.push(PlaybackEvent::ObjectLeft(id));
                    if self.effect_objects.remove(&id) {
                        events.push(PlaybackEvent::EffectEnd(id));
                    }
                }
                ChartObject::Tap(_) | ChartObject::Laser(_) => {
                    events.push(PlaybackEvent::ObjectLeft(id));
                }
                ChartObject::Event(event) => {
                    if let (EventKey::TrackRollBehaviour, EventData::Roll(behaviour)) =
                        (event.key, event.data)
                        && behaviour != self.current_track_roll_behaviour
                    {
                        self.current_track_roll_behaviour = behaviour;
                        self.last_track_roll_behaviour_change = event.time;
                    }
                    self.event_mapping.insert(event.key, event.data);
                    events.push(PlaybackEvent::EventChanged(event.key, event.data));
                }
            }
        }
    }

    fn process_hold_effects(&mut self, chart: &Chart, events: &mut Vec<PlaybackEvent>) {
        let audio_time = self.playback_time.saturating_add(self.config.audio_offset);

        for id in self.objects_by_time.ids() {
            let Some(ChartObject::Hold(hold)) = chart.object(id) else {
                continue;
            };
            if hold.effect_type == EffectType::None {
                continue;
            }

            let end_time = hold.end_time();
            let in_effect_window = hold.time.saturating_sub(EFFECT_BEGIN_LEAD) <= audio_time
                && audio_time <= end_time.saturating_sub(EFFECT_BEGIN_LEAD);
            if in_effect_window && self.effect_objects.insert(id) {
                events.push(PlaybackEvent::EffectBegin(id));
            }
            if end_time < audio_time && self.effect_objects.remove(&id) {
                events.push(PlaybackEvent::EffectEnd(id));
            }
        }
    }

    /// Objects to draw this frame.
    ///
    /// Returns the active objects followed by the upcoming objects starting within
    /// `range` of the clock, or slightly behind it. Both are clipped to the play range.
    #[must_use]
    pub fn get_visible_objects(&self, range: MapTime) -> Vec<ObjectId> {
        let now = self.playback_time;
        let mut begin = now.saturating_sub(self.config.early_visibility);
        let mut end = now.saturating_add(range);

        if let Some(calibration) = &self.calibration {
            return calibration
                .objects()
                .iter()
                .enumerate()
                .skip_while(|(_, object)| object.time() < begin)
                .take_while(|(_, object)| object.time() <= end)
                .map(|(index, _)| ObjectId::new(index))
                .collect();
        }

        begin = begin.max(self.play_range.begin);
        if let Some(range_end) = self.play_range.end {
            end = end.min(range_end);
        }

        let mut visible: Vec<ObjectId> = self.objects_by_time.ids().collect();
        let active: HashSet<ObjectId> = visible.iter().copied().collect();

        let objects = self.chart.objects();
        let upcoming = objects
            .iter()
            .enumerate()
            .skip(self.object_cursor.position())
            .filter(|(_, object)| object.time() >= begin)
            .take_while(|(_, object)| object.time() < end)
            .map(|(index, _)| ObjectId::new(index))
            .filter(|id| !active.contains(id));
        visible.extend(upcoming);
        visible
    }

    /// Ids of the objects in the active window, ordered by their start time.
    pub fn active_objects(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.objects_by_time.ids()
    }

    /// Whether the effect of the hold `id` is running.
    #[must_use]
    pub fn is_effect_active(&self, id: ObjectId) -> bool {
        self.effect_objects.contains(&id)
    }

    /// The timing point in effect at the last update.
    #[must_use]
    pub fn current_timing_point(&self) -> &TimingPoint {
        match &self.calibration {
            Some(calibration) => calibration.timing(),
            None => self.chart.timing_points().get(self.timing_index),
        }
    }

    /// The timing point in effect at `time`.
    #[must_use]
    pub fn timing_point_at(&self, time: MapTime) -> &TimingPoint {
        match &self.calibration {
            Some(calibration) => calibration.timing(),
            None => {
                let timing_points = self.chart.timing_points();
                timing_points.get(timing_points.find(time, self.timing_index, false))
            }
        }
    }

    /// Count the beat boundaries crossed in `[start, start + range)`.
    ///
    /// Beats are measured in the current timing point and subdivided by `multiplier`.
    /// Returns the number of beats and the position within the bar of the first beat
    /// after `start`. The position keeps the sign of the beat number, so it is negative
    /// for beats before the timing point.
    #[must_use]
    pub fn count_beats(&self, start: MapTime, range: MapTime, multiplier: u32) -> (u32, i32) {
        let timing = self.current_timing_point();
        let delta = f64::from(start) - f64::from(timing.time);
        let beat = timing.whole_note_length()
            / f64::from(timing.denominator)
            / f64::from(multiplier.max(1));

        let beat_start = (delta / beat).floor();
        let beat_end = ((delta + f64::from(range)) / beat).floor();
        let start_index = (beat_start as i32)
            .wrapping_add(1)
            .checked_rem(i32::from(timing.numerator))
            .unwrap_or(0);
        let count = (beat_end - beat_start).max(0.0) as u32;
        (count, start_index)
    }

    /// Position within the current bar, in `[0, 1)`.
    #[must_use]
    pub const fn bar_time(&self) -> f64 {
        self.bar_time
    }

    /// Position within the current beat, in `[0, 1)`.
    #[must_use]
    pub const fn beat_time(&self) -> f64 {
        self.beat_time
    }

    /// Value of a base effect graph at the current time.
    #[must_use]
    pub fn graph_value(&self, graph_type: GraphType) -> f64 {
        self.chart
            .graph_value_at(graph_type, self.playback_time, None)
    }

    /// Value of the center split graph at the current time.
    #[must_use]
    pub fn center_split_value(&self) -> f64 {
        self.chart.center_split_value_at(self.playback_time)
    }

    /// Whether a manual tilt slam has been reached since the roll behaviour last changed.
    ///
    /// Always `false` unless the roll behaviour is [`TrackRollBehaviour::Manual`].
    #[must_use]
    pub fn check_if_manual_tilt_instant(&self) -> bool {
        self.current_track_roll_behaviour == TrackRollBehaviour::Manual
            && self.chart.check_if_manual_tilt_instant(
                self.last_track_roll_behaviour_change,
                self.playback_time,
                None,
            )
    }

    /// Current track roll behaviour.
    #[must_use]
    pub const fn track_roll_behaviour(&self) -> TrackRollBehaviour {
        self.current_track_roll_behaviour
    }

    /// The last value announced for `key`.
    #[must_use]
    pub fn event_value(&self, key: EventKey) -> Option<EventData> {
        self.event_mapping.get(&key).copied()
    }
}
