//! Test DSL for driving a playback through a sequence of ticks.
//!
//! # Core Types
//!
//! - [`TestPlaybackDriver`] - owns the playback and the list of ticks
//! - [`TimeStepBuilder`] - attaches assertions and actions to the latest tick
//!
//! # Usage Examples
//!
//! ```ignore
//! TestPlaybackDriver::new(playback)
//!     .past(1999)
//!         .events(|evs| assert!(evs.is_empty()))
//!     .past(2)
//!         .view(|p| assert_eq!(p.playback_time(), 2001))
//!     .run();
//! ```

mod driver;
mod helpers;
mod time_step;

pub use driver::TestPlaybackDriver;
pub use helpers::{chart, entered, left, playback, tight_config};
