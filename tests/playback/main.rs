//! Tests for `beatmap_playback::playback`.
//!
//! Distances are compared with [`assert_distance_close`], every other value exactly.

mod config;
mod dsl;
mod invariants;
mod view_distance;

/// Allowed error of a view distance, in beats.
pub(crate) const DISTANCE_EPSILON: f64 = 1e-9;

/// Assert that two view distances are equal within [`DISTANCE_EPSILON`].
#[track_caller]
fn assert_distance_close(expected: f64, actual: f64, msg: &str) {
    let diff = (expected - actual).abs();
    assert!(
        diff < DISTANCE_EPSILON,
        "{msg}: expected {expected:.9}, got {actual:.9}, diff {diff:e}",
    );
}
