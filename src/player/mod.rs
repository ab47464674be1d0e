// Playback state machine: single tracks, playlist traversal, repeats and
// song-completion handling on top of an AudioEngine.

pub mod playlist;
pub mod time;

pub use playlist::Playlist;

use crate::audio::{AudioEngine, PlaybackStatus};
use crate::error::{ShellError, ShellResult};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Idle,
    PlayingSingle,
    PlayingPlaylist,
    Paused,
}

/// What a completion check did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Nothing,
    Repeated(String),
    Advanced(String),
    Finished,
}

pub struct Player {
    engine: Box<dyn AudioEngine>,
    playlist: Playlist,
    current_track: Option<String>,
    repeats: u32,
    in_playlist: bool,
    end_threshold: Duration,
}

impl Player {
    pub fn new(engine: Box<dyn AudioEngine>, end_threshold: Duration) -> Self {
        Self {
            engine,
            playlist: Playlist::new(),
            current_track: None,
            repeats: 0,
            in_playlist: false,
            end_threshold,
        }
    }

    pub fn state(&mut self) -> PlayerState {
        match self.engine.status() {
            PlaybackStatus::Stopped => PlayerState::Idle,
            PlaybackStatus::Paused => PlayerState::Paused,
            PlaybackStatus::Playing if self.in_playlist => PlayerState::PlayingPlaylist,
            PlaybackStatus::Playing => PlayerState::PlayingSingle,
        }
    }

    pub fn current_track(&self) -> Option<&str> {
        self.current_track.as_deref()
    }

    pub fn in_playlist_mode(&self) -> bool {
        self.in_playlist
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn playlist_mut(&mut self) -> &mut Playlist {
        &mut self.playlist
    }

    pub fn engine(&self) -> &dyn AudioEngine {
        self.engine.as_ref()
    }

    pub fn repeats(&self) -> u32 {
        self.repeats
    }

    pub fn set_repeats(&mut self, repeats: u32) -> ShellResult<()> {
        if self.current_track.is_none() {
            return Err(ShellError::NothingPlaying);
        }
        self.repeats = repeats;
        Ok(())
    }

    fn start(&mut self, music_dir: &Path, track: &str) -> ShellResult<()> {
        self.engine.open(&music_dir.join(track))?;
        self.engine.play();
        self.current_track = Some(track.to_string());
        info!("Playing {}", track);
        Ok(())
    }

    /// Play one track outside of the playlist.
    pub fn play_track(&mut self, music_dir: &Path, track: &str) -> ShellResult<()> {
        self.start(music_dir, track)?;
        self.repeats = 0;
        self.in_playlist = false;
        Ok(())
    }

    /// Start the track under the playlist cursor and move the cursor on.
    /// Wraps to the beginning whenever the cursor sits past the end.
    pub fn playlist_advance(&mut self, music_dir: &Path) -> ShellResult<String> {
        if self.playlist.active().is_empty() {
            return Err(ShellError::PlaylistEmpty);
        }
        if self.playlist.index >= self.playlist.active().len() {
            self.playlist.index = 0;
        }
        self.in_playlist = true;
        self.repeats = 0;

        let track = self.playlist.active()[self.playlist.index].clone();
        self.playlist.index += 1;
        self.start(music_dir, &track)?;
        Ok(track)
    }

    /// Skip forward. Unlike `playlist_advance`, refuses to wrap unless the
    /// playlist is looping.
    pub fn next(&mut self, music_dir: &Path) -> ShellResult<String> {
        if !self.in_playlist {
            return Err(ShellError::NotInPlaylistMode);
        }
        if self.playlist.at_end() && !self.playlist.is_looping {
            return Err(ShellError::EndOfPlaylist);
        }
        self.playlist_advance(music_dir)
    }

    /// Go back one track. Never wraps.
    pub fn previous(&mut self, music_dir: &Path) -> ShellResult<String> {
        if !self.in_playlist {
            return Err(ShellError::NotInPlaylistMode);
        }
        if self.playlist.index <= 1 {
            return Err(ShellError::StartOfPlaylist);
        }
        self.playlist.index -= 2;
        self.playlist_advance(music_dir)
    }

    pub fn stop(&mut self) -> ShellResult<()> {
        if self.engine.status() == PlaybackStatus::Stopped {
            return Err(ShellError::NothingPlaying);
        }
        self.halt();
        Ok(())
    }

    fn halt(&mut self) {
        self.engine.stop();
        self.current_track = None;
        self.in_playlist = false;
    }

    /// Follow a song file being renamed on disk.
    pub fn rename_track(&mut self, from: &str, to: &str) {
        self.playlist.rename(from, to);
        if self.current_track.as_deref() == Some(from) {
            self.current_track = Some(to.to_string());
        }
    }

    /// Drop a song whose file is gone, stopping it if it is playing.
    pub fn forget_track(&mut self, track: &str) {
        if self.current_track.as_deref() == Some(track) {
            self.halt();
        }
        self.playlist.remove(track);
    }

    pub fn toggle_pause(&mut self) -> ShellResult<PlaybackStatus> {
        match self.engine.status() {
            PlaybackStatus::Playing => self.engine.pause(),
            PlaybackStatus::Paused => self.engine.play(),
            PlaybackStatus::Stopped => return Err(ShellError::NothingPlaying),
        }
        Ok(self.engine.status())
    }

    pub fn set_volume(&mut self, percent: f32) -> ShellResult<()> {
        if !(0.0..=100.0).contains(&percent) {
            return Err(ShellError::out_of_range("Volume", 0.0, 100.0));
        }
        self.engine.set_volume(percent);
        Ok(())
    }

    pub fn volume(&self) -> f32 {
        self.engine.volume()
    }

    /// Flip single-track looping, returning the new setting.
    pub fn toggle_loop(&mut self) -> bool {
        let looping = !self.engine.is_looping();
        self.engine.set_looping(looping);
        looping
    }

    pub fn toggle_shuffle(&mut self) -> bool {
        let shuffled = !self.playlist.is_shuffled();
        self.playlist.set_shuffled(shuffled, &mut rand::thread_rng());
        shuffled
    }

    /// Elapsed and total seconds of the loaded track.
    pub fn position(&mut self) -> ShellResult<(u64, u64)> {
        if self.engine.status() == PlaybackStatus::Stopped {
            return Err(ShellError::NothingPlaying);
        }
        Ok((
            self.engine.playing_offset().as_secs(),
            self.engine.duration().as_secs(),
        ))
    }

    /// Jump to an absolute position. Landing on or past the end stops playback.
    pub fn seek(&mut self, seconds: u64) -> ShellResult<()> {
        if self.engine.status() == PlaybackStatus::Stopped {
            return Err(ShellError::NothingPlaying);
        }
        let target = Duration::from_secs(seconds);
        let duration = self.engine.duration();
        if !duration.is_zero() && target >= duration {
            debug!("Seek to {}s is past the end, stopping", seconds);
            self.halt();
            return Ok(());
        }
        self.engine.set_playing_offset(target);
        Ok(())
    }

    pub fn forward(&mut self, seconds: u64) -> ShellResult<()> {
        let (elapsed, duration) = self.position()?;
        let target = elapsed.saturating_add(seconds);
        self.seek(if duration > 0 { target.min(duration) } else { target })
    }

    pub fn rewind(&mut self, seconds: u64) -> ShellResult<()> {
        let (elapsed, _) = self.position()?;
        self.seek(elapsed.saturating_sub(seconds))
    }

    /// Polled song-completion check. A pending repeat wins over moving the
    /// playlist on; the cursor is untouched when a track repeats.
    pub fn tick(&mut self, music_dir: &Path) -> TickOutcome {
        let Some(track) = self.current_track.clone() else {
            return TickOutcome::Nothing;
        };
        if self.engine.is_looping() {
            return TickOutcome::Nothing;
        }
        // a track that is still current but stopped ran out on its own
        let drained = match self.engine.status() {
            PlaybackStatus::Paused => return TickOutcome::Nothing,
            PlaybackStatus::Stopped => true,
            PlaybackStatus::Playing => false,
        };
        if !drained && !self.near_end() {
            return TickOutcome::Nothing;
        }

        if self.repeats > 0 {
            self.repeats -= 1;
            self.engine.set_playing_offset(Duration::ZERO);
            self.engine.play();
            debug!("Repeating {} ({} left)", track, self.repeats);
            return TickOutcome::Repeated(track);
        }

        if self.in_playlist && (!self.playlist.at_end() || self.playlist.is_looping) {
            return match self.playlist_advance(music_dir) {
                Ok(next) => TickOutcome::Advanced(next),
                Err(e) => {
                    warn!("Playlist could not advance past {}: {}", track, e);
                    self.halt();
                    TickOutcome::Finished
                }
            };
        }

        self.current_track = None;
        self.in_playlist = false;
        TickOutcome::Finished
    }

    /// Within the end threshold of a track whose length is known. Tracks the
    /// decoder can't measure only complete by draining.
    fn near_end(&self) -> bool {
        let duration = self.engine.duration();
        if duration.is_zero() {
            return false;
        }
        let offset = self.engine.playing_offset();
        !offset.is_zero() && duration.saturating_sub(offset) <= self.end_threshold
    }
}
