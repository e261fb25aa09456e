//! Prelude module for this crate.
//!
//! Re-exports the types needed to build a chart and play it.

pub use crate::MapTime;
pub use crate::chart::shuffle::{LaneRng, SequenceRng};
#[cfg(feature = "rand")]
pub use crate::chart::shuffle::RandRng;
pub use crate::chart::{
    BpmSummary, Chart, ChartError, ChartObject, ChartSettings, ChartStop, EffectTimeline,
    EffectType, EventData, EventKey, EventObject, GraphPoint, GraphType, HoldObject,
    LaneTogglePoint, LaserSegment, LineGraph, ObjectId, ObjectKind, TapObject, TimingPoint,
    TimingPoints, TrackRollBehaviour,
};
pub use crate::cursor::{StreamCursor, Timed};
pub use crate::playback::driver::PlaybackDriver;
pub use crate::playback::{
    BeatmapPlayback, PlayRange, PlaybackConfig, PlaybackError, PlaybackEvent, PlaybackState,
};
