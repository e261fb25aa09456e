//! The chart handed over by a chart loader.
//!
//! A [`Chart`] owns every object of a song map in one time-sorted sequence, the tempo
//! regimes in [`TimingPoints`], lane visibility toggles, and the effect layers. It is
//! built once, optionally transformed by [`Chart::shuffle`], and then only read while it
//! is played.
//!
//! Objects refer to each other by [`ObjectId`], which is their index in
//! [`Chart::objects`]. [`Chart::new`] sorts the objects stably by time and rewrites the
//! laser links so that they keep pointing at the same segments.

pub mod effect;
pub mod line_graph;
pub mod object;
pub mod settings;
pub mod shuffle;
pub mod timing;

use thiserror::Error;

use self::shuffle::LaneRng;
use crate::MapTime;

pub use self::effect::{ChartStop, EffectTimeline, GraphType};
pub use self::line_graph::{GraphPoint, LineGraph};
pub use self::object::{
    ChartObject, EffectType, EventData, EventKey, EventObject, HoldObject, LaserSegment,
    ObjectId, ObjectKind, TapObject, TrackRollBehaviour,
};
pub use self::settings::ChartSettings;
pub use self::timing::{BpmSummary, LaneTogglePoint, TimingPoint, TimingPoints};

/// Number of button lanes a shuffle permutes, four BT lanes followed by two FX lanes.
pub const BUTTON_LANES: usize = 6;

/// Lane permutation of a mirrored chart.
pub const MIRROR_SWAPS: [u8; BUTTON_LANES] = [3, 2, 1, 0, 5, 4];

/// An error occurred when building a [`Chart`].
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
pub enum ChartError {
    /// Timing points must be sorted by strictly increasing time.
    #[error("timing point at {time} is not after the previous one")]
    UnsortedTimingPoints {
        /// Time of the offending timing point.
        time: MapTime,
    },
    /// A timing point has a non-positive beat duration or a zero in its signature.
    #[error("timing point at {time} has an invalid beat duration or signature")]
    InvalidTimingPoint {
        /// Time of the offending timing point.
        time: MapTime,
    },
    /// A laser segment links to an object which does not exist.
    #[error("laser segment links to object {id}, but there are only {len} objects")]
    DanglingLaserLink {
        /// The linked index.
        id: usize,
        /// Number of objects in the chart.
        len: usize,
    },
}

/// A song map ready to be played.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Chart {
    objects: Vec<ChartObject>,
    timing_points: TimingPoints,
    lane_toggles: Vec<LaneTogglePoint>,
    base_effects: EffectTimeline,
    aux_effects: Vec<EffectTimeline>,
    center_split: LineGraph,
    settings: ChartSettings,
}

impl Default for Chart {
    fn default() -> Self {
        Self {
            objects: Vec::new(),
            timing_points: TimingPoints::default(),
            lane_toggles: Vec::new(),
            base_effects: EffectTimeline::default(),
            aux_effects: Vec::new(),
            center_split: LineGraph::default(),
            settings: ChartSettings::default(),
        }
    }
}

impl Chart {
    /// Build a chart from objects in any order.
    ///
    /// Laser links in `objects` are indices into the given vector. Objects with equal
    /// times keep their given order.
    ///
    /// # Errors
    ///
    /// - [`ChartError::UnsortedTimingPoints`] or [`ChartError::InvalidTimingPoint`] if
    ///   the timing points are malformed.
    /// - [`ChartError::DanglingLaserLink`] if a laser links past the end of `objects`.
    pub fn new(
        objects: Vec<ChartObject>,
        timing_points: Vec<TimingPoint>,
        settings: ChartSettings,
    ) -> Result<Self, ChartError> {
        let timing_points = TimingPoints::new(timing_points)?;
        let objects = sort_objects(objects)?;
        Ok(Self {
            objects,
            timing_points,
            settings,
            ..Self::default()
        })
    }

    /// Attach lane toggle points. They are sorted by time.
    #[must_use]
    pub fn with_lane_toggles(mut self, mut lane_toggles: Vec<LaneTogglePoint>) -> Self {
        lane_toggles.sort_by_key(|point| point.time);
        self.lane_toggles = lane_toggles;
        self
    }

    /// Replace the base effect layer.
    #[must_use]
    pub fn with_base_effects(mut self, base_effects: EffectTimeline) -> Self {
        self.base_effects = base_effects;
        self
    }

    /// Replace the auxiliary effect layers.
    #[must_use]
    pub fn with_aux_effects(mut self, aux_effects: Vec<EffectTimeline>) -> Self {
        self.aux_effects = aux_effects;
        self
    }

    /// Replace the graph splitting the track at its center.
    #[must_use]
    pub fn with_center_split(mut self, center_split: LineGraph) -> Self {
        self.center_split = center_split;
        self
    }

    /// Every object, sorted by time.
    #[must_use]
    pub fn objects(&self) -> &[ChartObject] {
        &self.objects
    }

    /// The object with the given id.
    #[must_use]
    pub fn object(&self, id: ObjectId) -> Option<&ChartObject> {
        self.objects.get(id.value())
    }

    /// Whether the chart has any object to play.
    #[must_use]
    pub fn has_objects(&self) -> bool {
        !self.objects.is_empty()
    }

    /// Tempo regimes of the chart.
    #[must_use]
    pub const fn timing_points(&self) -> &TimingPoints {
        &self.timing_points
    }

    /// Lane visibility toggles, sorted by time.
    #[must_use]
    pub fn lane_toggles(&self) -> &[LaneTogglePoint] {
        &self.lane_toggles
    }

    /// The base effect layer.
    #[must_use]
    pub const fn base_effects(&self) -> &EffectTimeline {
        &self.base_effects
    }

    /// The auxiliary effect layers.
    #[must_use]
    pub fn aux_effects(&self) -> &[EffectTimeline] {
        &self.aux_effects
    }

    /// Chart-wide settings.
    #[must_use]
    pub const fn settings(&self) -> &ChartSettings {
        &self.settings
    }

    /// Time of the first non-event object at or after `lower_bound`.
    ///
    /// Returns `lower_bound` if there is none.
    #[must_use]
    pub fn first_object_time(&self, lower_bound: MapTime) -> MapTime {
        self.objects
            .iter()
            .filter(|object| object.kind() != ObjectKind::Event)
            .map(ChartObject::time)
            .find(|&time| time >= lower_bound)
            .unwrap_or(lower_bound)
    }

    /// End time of the last non-event object, or 0 if there is none.
    #[must_use]
    pub fn last_object_time(&self) -> MapTime {
        self.objects
            .iter()
            .rev()
            .find(|object| object.kind() != ObjectKind::Event)
            .map_or(0, ChartObject::end_time)
    }

    /// Start time of the last object of any kind, or 0 if there is none.
    #[must_use]
    pub fn last_object_time_including_events(&self) -> MapTime {
        self.objects.last().map_or(0, ChartObject::time)
    }

    /// Index of the measure containing `time`.
    #[must_use]
    pub fn measure_index_from_time(&self, time: MapTime) -> i32 {
        self.timing_points.measure_index_from_time(time)
    }

    /// Start time of the measure with the given index.
    #[must_use]
    pub fn time_from_measure_index(&self, measure: i32) -> MapTime {
        self.timing_points.time_from_measure_index(measure)
    }

    /// Tempo statistics, counted from the chart offset until the last object ends.
    #[must_use]
    pub fn bpm_summary(&self) -> BpmSummary {
        self.timing_points
            .bpm_summary(self.settings.offset, self.last_object_time())
    }

    /// The tempo which lasts the longest over the chart.
    #[must_use]
    pub fn mode_bpm(&self) -> f64 {
        self.bpm_summary().mode
    }

    /// Value of a graph at `time`, with the auxiliary layer `aux` added if it exists.
    #[must_use]
    pub fn graph_value_at(&self, graph_type: GraphType, time: MapTime, aux: Option<usize>) -> f64 {
        let base = self.base_effects.graph(graph_type).value_at(time);
        let extra = aux
            .and_then(|aux| self.aux_effects.get(aux))
            .map_or(0.0, |layer| layer.graph(graph_type).value_at(time));
        base + extra
    }

    /// Whether the first rotation point after `bound` is a slam reached by `time`.
    ///
    /// The base layer is checked first, then the auxiliary layer `aux` if it exists.
    #[must_use]
    pub fn check_if_manual_tilt_instant(
        &self,
        bound: MapTime,
        time: MapTime,
        aux: Option<usize>,
    ) -> bool {
        self.base_effects.has_manual_tilt_slam(bound, time)
            || aux
                .and_then(|aux| self.aux_effects.get(aux))
                .is_some_and(|layer| layer.has_manual_tilt_slam(bound, time))
    }

    /// Value of the center split graph at `time`.
    #[must_use]
    pub fn center_split_value_at(&self, time: MapTime) -> f64 {
        self.center_split.value_at(time)
    }

    /// Rearrange the button lanes, mirroring the chart and shuffling it at random.
    ///
    /// With `random`, the BT lanes and the FX lanes are shuffled separately. If the BT
    /// lanes come out in their original order, the FX lanes are swapped so that the
    /// layout always changes. With `mirror`, the result is mirrored and the lasers are
    /// flipped.
    pub fn shuffle(&mut self, rng: &mut impl LaneRng, random: bool, mirror: bool) {
        if !random {
            if mirror {
                self.apply_shuffle(MIRROR_SWAPS, true);
            }
            return;
        }

        let mut swaps: [u8; BUTTON_LANES] = [0, 1, 2, 3, 4, 5];
        shuffle::shuffle(&mut swaps[..4], rng);
        shuffle::shuffle(&mut swaps[4..], rng);
        if swaps[..4] == [0, 1, 2, 3] {
            swaps.swap(4, 5);
        }
        if mirror {
            swaps = swaps.map(|lane| MIRROR_SWAPS[usize::from(lane)]);
        }
        self.apply_shuffle(swaps, mirror);
    }

    /// Move every button object from lane `i` to lane `swaps[i]`.
    ///
    /// With `flip_laser`, lasers swap sides and their positions are mirrored. Lanes out
    /// of the permutation are left alone.
    pub fn apply_shuffle(&mut self, swaps: [u8; BUTTON_LANES], flip_laser: bool) {
        let remap = |lane: &mut u8| {
            if let Some(&to) = swaps.get(usize::from(*lane)) {
                *lane = to;
            }
        };
        for object in &mut self.objects {
            match object {
                ChartObject::Tap(tap) => remap(&mut tap.lane),
                ChartObject::Hold(hold) => remap(&mut hold.lane),
                ChartObject::Laser(laser) if flip_laser => {
                    laser.index = (laser.index + 1) % 2;
                    laser.points = laser.points.map(|point| (point - 1.0).abs());
                }
                ChartObject::Laser(_) | ChartObject::Event(_) => {}
            }
        }
    }
}

/// Stable sort by time, keeping laser links on the same segments.
fn sort_objects(objects: Vec<ChartObject>) -> Result<Vec<ChartObject>, ChartError> {
    let len = objects.len();
    let mut order: Vec<usize> = (0..len).collect();
    order.sort_by_key(|&index| objects[index].time());

    let mut new_index = vec![0; len];
    for (new, &old) in order.iter().enumerate() {
        new_index[old] = new;
    }
    let relink = |link: Option<ObjectId>| -> Result<Option<ObjectId>, ChartError> {
        link.map(|id| {
            new_index
                .get(id.value())
                .map(|&index| ObjectId::new(index))
                .ok_or(ChartError::DanglingLaserLink { id: id.value(), len })
        })
        .transpose()
    };

    order
        .iter()
        .map(|&old| {
            let mut object = objects[old];
            if let ChartObject::Laser(laser) = &mut object {
                laser.prev = relink(laser.prev)?;
                laser.next = relink(laser.next)?;
            }
            Ok(object)
        })
        .collect()
}
