#[cfg(feature = "audio")]
pub mod engine;
#[cfg(test)]
pub(crate) mod fake;

#[cfg(feature = "audio")]
pub use engine::RodioEngine;

use crate::error::ShellResult;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Extensions the catalog picks up, matched case-insensitively.
pub const SUPPORTED_EXTENSIONS: [&str; 5] = ["mp3", "ogg", "flac", "wav", "aiff"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStatus {
    Playing,
    Paused,
    Stopped,
}

/// Everything the shell needs from an audio backend. Volume is a percentage
/// (0..=100), offsets and durations are wall-clock positions in the track.
pub trait AudioEngine {
    /// Load a track, replacing whatever was loaded. Does not start playback.
    fn open(&mut self, path: &Path) -> ShellResult<()>;
    fn play(&mut self);
    fn pause(&mut self);
    fn stop(&mut self);

    fn set_volume(&mut self, percent: f32);
    fn volume(&self) -> f32;

    fn is_looping(&self) -> bool;
    fn set_looping(&mut self, looping: bool);

    fn playing_offset(&self) -> Duration;
    fn set_playing_offset(&mut self, offset: Duration);
    fn duration(&self) -> Duration;

    /// Current status. Takes `&mut self` because a looping track is re-armed here.
    fn status(&mut self) -> PlaybackStatus;

    /// Open `path` on a throwaway decoder just to learn its length.
    fn probe_duration(&self, path: &Path) -> ShellResult<Duration>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    pub volume: f32, // 0.0 to 100.0
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self { volume: 100.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Mp3,
    Ogg,
    Flac,
    Wav,
    Aiff,
    Unknown,
}

impl AudioFormat {
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "mp3" => AudioFormat::Mp3,
            "ogg" => AudioFormat::Ogg,
            "flac" => AudioFormat::Flac,
            "wav" => AudioFormat::Wav,
            "aiff" => AudioFormat::Aiff,
            _ => AudioFormat::Unknown,
        }
    }

    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(AudioFormat::from_extension)
            .unwrap_or(AudioFormat::Unknown)
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, AudioFormat::Unknown)
    }
}
