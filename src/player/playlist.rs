use rand::seq::SliceRandom;
use rand::Rng;
use tracing::info;

/// The in-memory playlist: insertion order plus an optional shuffled order.
///
/// `index` always points one past the track that was last started, so it
/// ranges over `0..=active().len()`.
#[derive(Debug, Clone, Default)]
pub struct Playlist {
    tracks: Vec<String>,
    shuffled: Vec<String>,
    is_shuffled: bool,
    pub is_looping: bool,
    pub index: usize,
}

impl Playlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// The traversal order currently in effect.
    pub fn active(&self) -> &[String] {
        if self.is_shuffled {
            &self.shuffled
        } else {
            &self.tracks
        }
    }

    /// Insertion order, regardless of shuffle.
    pub fn tracks(&self) -> &[String] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn contains(&self, track: &str) -> bool {
        self.tracks.iter().any(|t| t == track)
    }

    pub fn is_shuffled(&self) -> bool {
        self.is_shuffled
    }

    /// Replace the contents, e.g. after loading a playlist file. Resets the index.
    pub fn replace(&mut self, tracks: Vec<String>) {
        self.tracks = tracks;
        self.shuffled = self.tracks.clone();
        if self.is_shuffled {
            self.shuffled.shuffle(&mut rand::thread_rng());
        }
        self.index = 0;
    }

    /// Append a track; returns false when it is already present.
    pub fn add(&mut self, track: String) -> bool {
        if self.contains(&track) {
            return false;
        }
        self.shuffled.push(track.clone());
        self.tracks.push(track);
        true
    }

    /// Remove a track from both orders; returns whether it was present.
    pub fn remove(&mut self, track: &str) -> bool {
        let before = self.tracks.len();
        self.tracks.retain(|t| t != track);
        self.shuffled.retain(|t| t != track);
        self.index = self.index.min(self.active().len());
        before != self.tracks.len()
    }

    /// Rename a track in both orders.
    pub fn rename(&mut self, from: &str, to: &str) {
        for slot in self.tracks.iter_mut().chain(self.shuffled.iter_mut()) {
            if slot == from {
                *slot = to.to_string();
            }
        }
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
        self.shuffled.clear();
        self.index = 0;
    }

    /// Turn shuffle on or off. Turning it on draws a fresh permutation every
    /// time. The index is left as-is in both directions.
    pub fn set_shuffled<R: Rng + ?Sized>(&mut self, shuffled: bool, rng: &mut R) {
        if shuffled {
            self.shuffled = self.tracks.clone();
            self.shuffled.shuffle(rng);
        }
        self.is_shuffled = shuffled;
        info!("Playlist shuffle {}", if shuffled { "enabled" } else { "disabled" });
    }

    /// Track that was started last, if any.
    pub fn current(&self) -> Option<&str> {
        self.index
            .checked_sub(1)
            .and_then(|i| self.active().get(i))
            .map(String::as_str)
    }

    pub fn previous_track(&self) -> Option<&str> {
        self.index
            .checked_sub(2)
            .and_then(|i| self.active().get(i))
            .map(String::as_str)
    }

    pub fn next_track(&self) -> Option<&str> {
        self.active().get(self.index).map(String::as_str)
    }

    pub fn at_end(&self) -> bool {
        self.index >= self.active().len()
    }
}
