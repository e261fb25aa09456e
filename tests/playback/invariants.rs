//! Properties holding for any sequence of forward updates.

use std::collections::HashMap;
use std::sync::Arc;

use beatmap_playback::chart::{
    Chart, ChartObject, ChartSettings, EffectType, EventData, EventKey, LaneTogglePoint,
    ObjectId, TimingPoint,
};
use beatmap_playback::playback::{BeatmapPlayback, PlaybackConfig, PlaybackEvent};
use pretty_assertions::assert_eq;

use super::dsl::{chart, playback};

fn dense_objects() -> Vec<ChartObject> {
    let mut objects = Vec::new();
    for step in 0..40 {
        let time = 250 * step;
        objects.push(ChartObject::tap(time, (step % 4) as u8));
        if step % 5 == 0 {
            objects.push(ChartObject::hold(time, 4 + (step % 2) as u8, 400, EffectType::Flanger));
        }
        if step % 7 == 0 {
            objects.push(ChartObject::laser(time, (step % 2) as u8, 300, [0.0, 1.0]));
        }
        if step % 9 == 0 {
            objects.push(ChartObject::event(
                time,
                EventKey::LaserEffectMix,
                EventData::Float(0.25),
            ));
        }
    }
    objects
}

fn timing() -> Vec<TimingPoint> {
    vec![
        TimingPoint::new(0, 500.0, 4, 4),
        TimingPoint::new(3000, 400.0, 4, 4),
        TimingPoint::new(6000, 600.0, 3, 4),
    ]
}

/// Irregular frame lengths, repeating.
const FRAME_LENGTHS: [i32; 7] = [16, 17, 1, 33, 0, 120, 7];

#[derive(Debug, Default)]
struct Lifecycle {
    entered: Vec<i32>,
    left: Vec<i32>,
}

fn run(playback: &mut BeatmapPlayback, until: i32) -> HashMap<ObjectId, Lifecycle> {
    let mut lifecycles: HashMap<ObjectId, Lifecycle> = HashMap::new();
    let mut time = 0;
    for length in FRAME_LENGTHS.iter().cycle() {
        if time > until {
            break;
        }
        for event in playback.update(time) {
            match event {
                PlaybackEvent::ObjectEntered(id) => {
                    lifecycles.entry(id).or_default().entered.push(time);
                }
                PlaybackEvent::ObjectLeft(id) => lifecycles.entry(id).or_default().left.push(time),
                _ => {}
            }
        }
        time += length;
    }
    lifecycles
}

#[test]
fn test_objects_enter_once_and_leave_after_entering() {
    let chart = chart(dense_objects(), timing());
    let mut playback = playback(chart, PlaybackConfig::default());
    playback.reset(0, 0).unwrap();

    let lifecycles = run(&mut playback, 12_000);
    for (id, lifecycle) in &lifecycles {
        assert_eq!(lifecycle.entered.len(), 1, "{id:?} entered {:?}", lifecycle.entered);
        assert!(lifecycle.left.len() <= 1, "{id:?} left {:?}", lifecycle.left);
        if let Some(left) = lifecycle.left.first() {
            assert!(lifecycle.entered[0] <= *left, "{id:?} left before entering");
        }
    }

    let playable = playback
        .objects()
        .iter()
        .filter(|object| !matches!(object, ChartObject::Event(_)))
        .count();
    let entered = lifecycles
        .keys()
        .filter(|id| !matches!(playback.object(**id), Some(ChartObject::Event(_))))
        .count();
    assert_eq!(entered, playable);
    assert_eq!(playback.active_objects().count(), 0);
}

#[test]
fn test_objects_outside_play_range_never_show_up() {
    let chart = chart(dense_objects(), timing());
    let mut playback = playback(chart, PlaybackConfig::default());
    playback.reset(0, 3000).unwrap();
    playback.set_play_range_end(6000);

    let lifecycles = run(&mut playback, 12_000);
    assert!(!lifecycles.is_empty());
    for id in lifecycles.keys() {
        let object = playback.object(*id).unwrap();
        assert!(
            (3000..6000).contains(&object.time()),
            "{object:?} is outside the play range"
        );
        assert!(object.end_time() <= 6000, "{object:?} ends after the play range");
    }
}

#[test]
fn test_timing_changes_are_reported_in_order() {
    let chart = chart(dense_objects(), timing());
    let mut playback = playback(chart, PlaybackConfig::default());
    playback.reset(0, 0).unwrap();

    let mut changes = Vec::new();
    let mut time = 0;
    while time <= 8000 {
        changes.extend(playback.update(time).into_iter().filter_map(|event| match event {
            PlaybackEvent::TimingPointChanged(index) => Some(index),
            _ => None,
        }));
        time += 37;
    }
    assert_eq!(changes, vec![1, 2]);
    assert_eq!(playback.current_timing_point().numerator, 3);
}

#[test]
fn test_lane_toggles_report_moves_past_the_first() {
    let toggle = |time| LaneTogglePoint { time, duration: 0 };
    let chart = Chart::new(dense_objects(), timing(), ChartSettings::default())
        .unwrap()
        .with_lane_toggles(vec![toggle(4000), toggle(1000), toggle(1200)]);
    let mut playback = playback(Arc::new(chart), PlaybackConfig::default());
    playback.reset(0, 0).unwrap();

    let toggles = |events: Vec<PlaybackEvent>| -> Vec<usize> {
        events
            .into_iter()
            .filter_map(|event| match event {
                PlaybackEvent::LaneToggleChanged(index) => Some(index),
                _ => None,
            })
            .collect()
    };
    assert!(toggles(playback.update(500)).is_empty());
    assert!(toggles(playback.update(1100)).is_empty());
    assert_eq!(toggles(playback.update(1500)), vec![1]);
    assert!(toggles(playback.update(3999)).is_empty());
    assert_eq!(toggles(playback.update(4000)), vec![2]);
}
