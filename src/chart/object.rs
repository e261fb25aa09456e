//! Objects placed on the chart timeline.

use crate::MapTime;
use crate::cursor::Timed;

/// Identifier of an object, which is its index in [`super::Chart::objects`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjectId(pub usize);

impl AsRef<usize> for ObjectId {
    fn as_ref(&self) -> &usize {
        &self.0
    }
}

impl ObjectId {
    /// Create a new `ObjectId`
    #[must_use]
    pub const fn new(id: usize) -> Self {
        Self(id)
    }

    /// Returns the contained index.
    #[must_use]
    pub const fn value(self) -> usize {
        self.0
    }
}

impl From<usize> for ObjectId {
    fn from(value: usize) -> Self {
        Self(value)
    }
}

impl From<ObjectId> for usize {
    fn from(id: ObjectId) -> Self {
        id.0
    }
}

/// Audio effect attached to a hold or used as the laser filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectType {
    /// No effect.
    #[default]
    None,
    /// Retrigger.
    Retrigger,
    /// Flanger.
    Flanger,
    /// Phaser.
    Phaser,
    /// Gate.
    Gate,
    /// Tape stop.
    TapeStop,
    /// Bit crusher.
    BitCrush,
    /// Wobble.
    Wobble,
    /// Side chain.
    SideChain,
    /// Echo.
    Echo,
    /// Panning.
    Panning,
    /// Pitch shift.
    PitchShift,
    /// Low pass filter.
    LowPassFilter,
    /// High pass filter.
    HighPassFilter,
    /// Peaking filter, the default laser effect.
    PeakingFilter,
    /// An effect defined by the chart itself, by its slot.
    UserDefined(u16),
}

/// How the track is rolled while lasers are held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TrackRollBehaviour {
    /// No roll.
    Zero,
    /// Regular roll.
    #[default]
    Normal,
    /// Bigger roll.
    Bigger,
    /// Biggest roll.
    Biggest,
    /// The roll is driven by the rotation graph of the effect timeline.
    Manual,
}

/// Key of a chart event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EventKey {
    /// Volume of laser slams.
    SlamVolume,
    /// Effect applied while a laser is held.
    LaserEffectType,
    /// Mix of the laser effect.
    LaserEffectMix,
    /// Track roll behaviour.
    TrackRollBehaviour,
    /// The end of the chart.
    ChartEnd,
}

/// Value carried by a chart event.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EventData {
    /// A plain number.
    Float(f32),
    /// An integer.
    Int(i32),
    /// An audio effect.
    Effect(EffectType),
    /// A track roll behaviour.
    Roll(TrackRollBehaviour),
}

/// A single button press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TapObject {
    /// Start time.
    pub time: MapTime,
    /// Button lane, 0-3 for BT and 4-5 for FX.
    pub lane: u8,
}

/// A held button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HoldObject {
    /// Start time.
    pub time: MapTime,
    /// Button lane.
    pub lane: u8,
    /// Length of the hold.
    pub duration: MapTime,
    /// Audio effect applied while the hold is active.
    pub effect_type: EffectType,
}

impl HoldObject {
    /// Time at which the hold ends.
    #[must_use]
    pub const fn end_time(&self) -> MapTime {
        self.time.saturating_add(self.duration)
    }
}

/// One straight segment of a laser.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LaserSegment {
    /// Start time.
    pub time: MapTime,
    /// Laser index, 0 for left and 1 for right.
    pub index: u8,
    /// Length of the segment. Zero for slams.
    pub duration: MapTime,
    /// Horizontal position at the start and at the end of the segment, in `[0, 1]`.
    pub points: [f32; 2],
    /// Previous segment of the same laser.
    pub prev: Option<ObjectId>,
    /// Next segment of the same laser.
    pub next: Option<ObjectId>,
}

/// A change of a chart-wide setting.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EventObject {
    /// Time at which the change takes effect.
    pub time: MapTime,
    /// Which setting changes.
    pub key: EventKey,
    /// The new value.
    pub data: EventData,
}

/// Discriminant of [`ChartObject`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// [`ChartObject::Tap`]
    Tap,
    /// [`ChartObject::Hold`]
    Hold,
    /// [`ChartObject::Laser`]
    Laser,
    /// [`ChartObject::Event`]
    Event,
}

/// Any object placed on the chart.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChartObject {
    /// A button press.
    Tap(TapObject),
    /// A held button.
    Hold(HoldObject),
    /// A laser segment.
    Laser(LaserSegment),
    /// A setting change.
    Event(EventObject),
}

impl ChartObject {
    /// Shorthand for a [`TapObject`].
    #[must_use]
    pub const fn tap(time: MapTime, lane: u8) -> Self {
        Self::Tap(TapObject { time, lane })
    }

    /// Shorthand for a [`HoldObject`].
    #[must_use]
    pub const fn hold(time: MapTime, lane: u8, duration: MapTime, effect_type: EffectType) -> Self {
        Self::Hold(HoldObject {
            time,
            lane,
            duration,
            effect_type,
        })
    }

    /// Shorthand for an unlinked [`LaserSegment`].
    #[must_use]
    pub const fn laser(time: MapTime, index: u8, duration: MapTime, points: [f32; 2]) -> Self {
        Self::Laser(LaserSegment {
            time,
            index,
            duration,
            points,
            prev: None,
            next: None,
        })
    }

    /// Shorthand for an [`EventObject`].
    #[must_use]
    pub const fn event(time: MapTime, key: EventKey, data: EventData) -> Self {
        Self::Event(EventObject { time, key, data })
    }

    /// Start time of the object.
    #[must_use]
    pub const fn time(&self) -> MapTime {
        match self {
            Self::Tap(tap) => tap.time,
            Self::Hold(hold) => hold.time,
            Self::Laser(laser) => laser.time,
            Self::Event(event) => event.time,
        }
    }

    /// Length of the object. Taps and events have none.
    #[must_use]
    pub const fn duration(&self) -> MapTime {
        match self {
            Self::Hold(hold) => hold.duration,
            Self::Laser(laser) => laser.duration,
            Self::Tap(_) | Self::Event(_) => 0,
        }
    }

    /// Time at which the object ends.
    #[must_use]
    pub const fn end_time(&self) -> MapTime {
        self.time().saturating_add(self.duration())
    }

    /// The discriminant of this object.
    #[must_use]
    pub const fn kind(&self) -> ObjectKind {
        match self {
            Self::Tap(_) => ObjectKind::Tap,
            Self::Hold(_) => ObjectKind::Hold,
            Self::Laser(_) => ObjectKind::Laser,
            Self::Event(_) => ObjectKind::Event,
        }
    }
}

impl Timed for ChartObject {
    fn time(&self) -> MapTime {
        ChartObject::time(self)
    }
}
