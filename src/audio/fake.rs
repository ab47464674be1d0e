// Scripted engine for tests: records what the player asked for and lets the
// test move the playhead around.

use super::{AudioEngine, AudioFormat, PlaybackStatus};
use crate::error::{ShellError, ShellResult};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

#[derive(Debug)]
pub(crate) struct FakeState {
    pub loaded: Option<PathBuf>,
    pub opened: Vec<PathBuf>,
    pub plays: usize,
    pub status: PlaybackStatus,
    pub volume: f32,
    pub looping: bool,
    pub offset: Duration,
    pub durations: HashMap<String, Duration>,
    pub probes: usize,
}

pub(crate) struct FakeEngine {
    state: Rc<RefCell<FakeState>>,
}

impl FakeEngine {
    pub fn new() -> (Self, Rc<RefCell<FakeState>>) {
        let state = Rc::new(RefCell::new(FakeState {
            loaded: None,
            opened: Vec::new(),
            plays: 0,
            status: PlaybackStatus::Stopped,
            volume: 100.0,
            looping: false,
            offset: Duration::ZERO,
            durations: HashMap::new(),
            probes: 0,
        }));
        (Self { state: Rc::clone(&state) }, state)
    }

    fn length_of(state: &FakeState, path: &Path) -> Duration {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        state
            .durations
            .get(name)
            .copied()
            .unwrap_or(Duration::from_secs(180))
    }
}

// aiff is catalogued but, like the real decoder, refuses to open
fn decodable(path: &Path) -> bool {
    !matches!(AudioFormat::from_path(path), AudioFormat::Unknown | AudioFormat::Aiff)
}

impl FakeState {
    /// Put the playhead just before the end of the loaded track.
    pub fn near_end(&mut self) {
        let length = self
            .loaded
            .as_deref()
            .map(|p| FakeEngine::length_of(self, p))
            .unwrap_or_default();
        self.offset = length.saturating_sub(Duration::from_millis(5));
    }

    /// The track ran out: stopped, playhead left where it was.
    pub fn drain(&mut self) {
        self.status = PlaybackStatus::Stopped;
    }

    pub fn loaded_name(&self) -> Option<String> {
        self.loaded
            .as_ref()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .map(str::to_string)
    }
}

impl AudioEngine for FakeEngine {
    fn open(&mut self, path: &Path) -> ShellResult<()> {
        let mut state = self.state.borrow_mut();
        state.opened.push(path.to_path_buf());
        if !decodable(path) {
            return Err(ShellError::UnsupportedFormat(path.display().to_string()));
        }
        state.loaded = Some(path.to_path_buf());
        state.offset = Duration::ZERO;
        state.status = PlaybackStatus::Stopped;
        Ok(())
    }

    fn play(&mut self) {
        let mut state = self.state.borrow_mut();
        if state.loaded.is_some() {
            state.plays += 1;
            state.status = PlaybackStatus::Playing;
        }
    }

    fn pause(&mut self) {
        self.state.borrow_mut().status = PlaybackStatus::Paused;
    }

    fn stop(&mut self) {
        let mut state = self.state.borrow_mut();
        state.status = PlaybackStatus::Stopped;
        state.offset = Duration::ZERO;
    }

    fn set_volume(&mut self, percent: f32) {
        self.state.borrow_mut().volume = percent;
    }

    fn volume(&self) -> f32 {
        self.state.borrow().volume
    }

    fn is_looping(&self) -> bool {
        self.state.borrow().looping
    }

    fn set_looping(&mut self, looping: bool) {
        self.state.borrow_mut().looping = looping;
    }

    fn playing_offset(&self) -> Duration {
        self.state.borrow().offset
    }

    fn set_playing_offset(&mut self, offset: Duration) {
        self.state.borrow_mut().offset = offset;
    }

    fn duration(&self) -> Duration {
        let state = self.state.borrow();
        state
            .loaded
            .as_deref()
            .map(|p| FakeEngine::length_of(&state, p))
            .unwrap_or_default()
    }

    fn status(&mut self) -> PlaybackStatus {
        self.state.borrow().status
    }

    fn probe_duration(&self, path: &Path) -> ShellResult<Duration> {
        let mut state = self.state.borrow_mut();
        state.probes += 1;
        if !decodable(path) {
            return Err(ShellError::UnsupportedFormat(path.display().to_string()));
        }
        Ok(FakeEngine::length_of(&state, path))
    }
}
