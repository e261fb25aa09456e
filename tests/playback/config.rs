//! Serialized form of the playback tunables and chart settings.

#![cfg(feature = "serde")]

use beatmap_playback::chart::{ChartSettings, EffectType};
use beatmap_playback::playback::PlaybackConfig;
use pretty_assertions::assert_eq;

#[test]
fn test_config_round_trips_through_json() {
    let config = PlaybackConfig {
        audio_offset: -12,
        constant_speed: true,
        ..PlaybackConfig::default()
    };
    let json = serde_json::to_string(&config).unwrap();
    let restored: PlaybackConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, config);
}

#[test]
fn test_missing_config_fields_take_defaults() {
    let config: PlaybackConfig =
        serde_json::from_str(r#"{ "hit_object_enter": 300 }"#).unwrap();
    assert_eq!(
        config,
        PlaybackConfig {
            hit_object_enter: 300,
            ..PlaybackConfig::default()
        }
    );
}

#[test]
fn test_settings_fill_in_defaults() {
    let settings: ChartSettings =
        serde_json::from_str(r#"{ "title": "Demo", "offset": 40 }"#).unwrap();
    assert_eq!(settings.title, "Demo");
    assert_eq!(settings.offset, 40);
    assert_eq!(settings.laser_effect_type, EffectType::PeakingFilter);
    assert_eq!(settings.music_volume, 1.0);
}
