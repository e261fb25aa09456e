//! Distances on the track across tempo changes.

use beatmap_playback::chart::{ChartObject, TimingPoint};
use beatmap_playback::playback::PlaybackConfig;
use pretty_assertions::assert_eq;

use super::assert_distance_close;
use super::dsl::{TestPlaybackDriver, chart, playback, tight_config};

fn two_tempos() -> Vec<TimingPoint> {
    vec![
        TimingPoint::new(0, 500.0, 4, 4),
        TimingPoint::new(1000, 250.0, 4, 4),
    ]
}

#[test]
fn test_distance_splits_at_tempo_change() {
    let chart = chart(vec![ChartObject::tap(3000, 0)], two_tempos());

    TestPlaybackDriver::new(playback(chart, tight_config()))
        .past(500)
        .view(|p| {
            assert_distance_close(3.0, p.duration_to_view_distance(1000), "across the change");
            assert_distance_close(1.0, p.duration_to_view_distance(500), "up to the change");
            assert_distance_close(-1.0, p.duration_to_view_distance(-500), "backward");
            assert_distance_close(3.0, p.time_to_view_distance(1500), "to a time");
            assert_distance_close(
                200.0 / 500.0 + 200.0 / 250.0,
                p.duration_to_view_distance_at_time(800, 400),
                "straddling the change",
            );
        })
        .past(1000)
        .view(|p| {
            assert_distance_close(2.0, p.duration_to_view_distance(500), "after the change");
            assert_distance_close(
                3.0,
                p.duration_to_view_distance_at_time(500, 1000),
                "from an earlier time",
            );
        })
        .run();
}

#[test]
fn test_duration_inverts_distance() {
    let chart = chart(vec![ChartObject::tap(3000, 0)], two_tempos());

    TestPlaybackDriver::new(playback(chart, tight_config()))
        .past(500)
        .view(|p| {
            assert_eq!(p.view_distance_to_duration(3.0), 1000);
            assert_eq!(p.view_distance_to_duration(0.5), 250);
            for duration in [1, 250, 499, 500, 501, 1234] {
                let distance = p.duration_to_view_distance(duration);
                assert_eq!(p.view_distance_to_duration(distance), duration);
            }
        })
        .run();
}

#[test]
fn test_constant_speed_ignores_tempo() {
    let config = PlaybackConfig {
        constant_speed: true,
        ..tight_config()
    };
    let chart = chart(vec![ChartObject::tap(3000, 0)], two_tempos());

    TestPlaybackDriver::new(playback(chart, config))
        .past(500)
        .view(|p| {
            assert_distance_close(
                1000.0 / 480_000.0,
                p.duration_to_view_distance(1000),
                "constant speed",
            );
            assert_eq!(p.view_distance_to_duration(1.0), 480_000);
        })
        .run();
}

#[test]
fn test_distance_grows_with_time() {
    let chart = chart(vec![ChartObject::tap(3000, 0)], two_tempos());

    TestPlaybackDriver::new(playback(chart, tight_config()))
        .past(200)
        .view(|p| {
            let distances: Vec<f64> = (0..3000)
                .step_by(50)
                .map(|time| p.time_to_view_distance(time))
                .collect();
            assert!(distances.windows(2).all(|pair| pair[0] < pair[1]));
        })
        .run();
}
