//! The timing and playback core of a lane-based rhythm game.
//!
//! A [`chart::Chart`] is produced once by an external loader and never mutated while it
//! is being played. A [`playback::BeatmapPlayback`] walks the chart as the game clock
//! advances, keeps track of the objects that are inside their hit window, and reports
//! everything that happened during a tick as a list of [`playback::PlaybackEvent`]s.
//!
//! Continuous camera parameters live in [`chart::EffectTimeline`]s built from
//! [`chart::LineGraph`]s, and the conversion between time and on-screen distance is
//! done by the playback, which knows about every tempo change in the chart.
//!
//! ```
//! use beatmap_playback::prelude::*;
//! use std::sync::Arc;
//!
//! let chart = Chart::new(
//!     vec![ChartObject::tap(2000, 0)],
//!     vec![TimingPoint::new(0, 500.0, 4, 4)],
//!     ChartSettings::default(),
//! )
//! .unwrap();
//! let mut playback = BeatmapPlayback::new(Arc::new(chart), PlaybackConfig::default());
//! playback.reset(0, 0).unwrap();
//!
//! let events = playback.update(2000);
//! assert!(events.contains(&PlaybackEvent::ObjectEntered(ObjectId::new(0))));
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod chart;
pub mod cursor;
pub mod playback;
pub mod prelude;

/// Chart time in milliseconds, relative to the start of the audio.
pub type MapTime = i32;
