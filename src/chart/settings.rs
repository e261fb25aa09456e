//! Chart-wide settings read by the playback.

use super::object::EffectType;
use crate::MapTime;

/// Settings of a chart which are not tied to a point on the timeline.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ChartSettings {
    /// Title of the song.
    pub title: String,
    /// Artist of the song.
    pub artist: String,
    /// Tempo range shown to the player, as written by the chart author.
    pub bpm: String,
    /// Time of the first beat in the audio.
    pub offset: MapTime,
    /// Start of the song preview.
    pub preview_offset: MapTime,
    /// Length of the song preview.
    pub preview_duration: MapTime,
    /// Initial volume of laser slams.
    pub slam_volume: f32,
    /// Initial mix of the laser effect.
    pub laser_effect_mix: f32,
    /// Initial volume of the music.
    pub music_volume: f32,
    /// Initial laser effect.
    pub laser_effect_type: EffectType,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            title: String::new(),
            artist: String::new(),
            bpm: String::new(),
            offset: 0,
            preview_offset: 0,
            preview_duration: 0,
            slam_volume: 1.0,
            laser_effect_mix: 1.0,
            music_volume: 1.0,
            laser_effect_type: EffectType::PeakingFilter,
        }
    }
}
