// Track-length cache so playlist totals don't have to reopen every file.
// Stored as `filename:seconds` lines; entries stay in insertion order.

use crate::audio::AudioEngine;
use indexmap::IndexMap;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const DEFAULT_CAPACITY: usize = 1000;

#[derive(Debug)]
pub struct DurationCache {
    entries: IndexMap<String, u64>,
    path: PathBuf,
    capacity: usize,
}

impl DurationCache {
    /// Empty cache that will persist to `path`.
    pub fn new(path: PathBuf, capacity: usize) -> Self {
        Self {
            entries: IndexMap::new(),
            path,
            capacity,
        }
    }

    /// Read the cache file, creating an empty one (and its directory) when missing.
    pub fn load(path: PathBuf, capacity: usize) -> io::Result<Self> {
        let mut cache = Self::new(path, capacity);

        if !cache.path.exists() {
            if let Some(parent) = cache.path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&cache.path, "")?;
            info!("Created duration cache at {}", cache.path.display());
            return Ok(cache);
        }

        let content = fs::read_to_string(&cache.path)?;
        for line in content.lines().filter(|l| !l.trim().is_empty()) {
            match parse_line(line) {
                Some((name, seconds)) => {
                    cache.entries.insert(name.to_string(), seconds);
                }
                None => warn!("Skipping malformed cache line: {:?}", line),
            }
        }

        info!("Loaded {} cached durations from {}", cache.entries.len(), cache.path.display());
        Ok(cache)
    }

    pub fn get(&self, track: &str) -> Option<u64> {
        self.entries.get(track).copied()
    }

    pub fn insert(&mut self, track: String, seconds: u64) {
        self.entries.insert(track, seconds);
    }

    /// Look the track up, probing it through the engine when it isn't cached.
    /// A track that can't be opened stays absent.
    pub fn ensure(&mut self, track: &str, music_dir: &Path, engine: &dyn AudioEngine) -> Option<u64> {
        if let Some(seconds) = self.get(track) {
            return Some(seconds);
        }
        match engine.probe_duration(&music_dir.join(track)) {
            Ok(duration) => {
                let seconds = duration.as_secs();
                self.entries.insert(track.to_string(), seconds);
                debug!("Learned duration of {}: {}s", track, seconds);
                Some(seconds)
            }
            Err(e) => {
                debug!("No duration for {}: {}", track, e);
                None
            }
        }
    }

    /// Re-key an entry, keeping its place in the save order. An existing
    /// entry for `to` wins.
    pub fn rename(&mut self, from: &str, to: &str) {
        let Some((index, _, seconds)) = self.entries.shift_remove_full(from) else {
            return;
        };
        if !self.entries.contains_key(to) {
            self.entries.shift_insert(index, to.to_string(), seconds);
        }
    }

    pub fn remove(&mut self, track: &str) {
        self.entries.shift_remove(track);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write at most `capacity` entries, oldest first. Anything past that is
    /// dropped from the file but kept in memory.
    pub fn save(&self) -> io::Result<usize> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = BufWriter::new(fs::File::create(&self.path)?);
        let mut written = 0;
        for (name, seconds) in self.entries.iter().take(self.capacity) {
            writeln!(out, "{}:{}", name, seconds)?;
            written += 1;
        }
        out.flush()?;

        if self.entries.len() > written {
            debug!("Cache truncated to {} of {} entries", written, self.entries.len());
        }
        info!("Saved {} durations to {}", written, self.path.display());
        Ok(written)
    }
}

// Filenames may contain ':' themselves; the duration is after the last one.
fn parse_line(line: &str) -> Option<(&str, u64)> {
    let (name, seconds) = line.rsplit_once(':')?;
    if name.is_empty() {
        return None;
    }
    Some((name, seconds.trim().parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::fake::FakeEngine;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn test_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache");

        let mut cache = DurationCache::new(path.clone(), DEFAULT_CAPACITY);
        for i in 0..250 {
            cache.insert(format!("track {i}: live.mp3"), i * 3);
        }
        assert_eq!(cache.save().unwrap(), 250);

        let reloaded = DurationCache::load(path, DEFAULT_CAPACITY).unwrap();
        assert_eq!(reloaded.len(), 250);
        for i in 0..250 {
            assert_eq!(reloaded.get(&format!("track {i}: live.mp3")), Some(i * 3));
        }
    }

    #[test]
    fn test_save_keeps_first_entries_only() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache");

        let mut cache = DurationCache::new(path.clone(), DEFAULT_CAPACITY);
        for i in 0..1500u64 {
            cache.insert(format!("{i:04}.ogg"), i);
        }
        assert_eq!(cache.save().unwrap(), 1000);
        assert_eq!(cache.len(), 1500);

        let reloaded = DurationCache::load(path, DEFAULT_CAPACITY).unwrap();
        assert_eq!(reloaded.len(), 1000);
        assert_eq!(reloaded.get("0999.ogg"), Some(999));
        assert_eq!(reloaded.get("1000.ogg"), None);
    }

    #[test]
    fn test_load_creates_missing_file_and_skips_junk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("cache");
        let cache = DurationCache::load(path.clone(), DEFAULT_CAPACITY).unwrap();
        assert!(cache.is_empty());
        assert!(path.exists());

        fs::write(&path, "good.mp3:12\nnot a line\n:5\nbad.mp3:x\n").unwrap();
        let cache = DurationCache::load(path, DEFAULT_CAPACITY).unwrap();
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("good.mp3"), Some(12));
    }

    #[test]
    fn test_ensure_probes_once_and_tolerates_failure() {
        let (engine, state) = FakeEngine::new();
        state.borrow_mut().durations.insert("a.mp3".into(), Duration::from_secs(61));
        let mut cache = DurationCache::new(PathBuf::from("unused"), DEFAULT_CAPACITY);

        assert_eq!(cache.ensure("a.mp3", Path::new("/music"), &engine), Some(61));
        assert_eq!(cache.ensure("a.mp3", Path::new("/music"), &engine), Some(61));
        assert_eq!(state.borrow().probes, 1);

        assert_eq!(cache.ensure("b.aiff", Path::new("/music"), &engine), None);
        assert_eq!(cache.get("b.aiff"), None);
    }

    #[test]
    fn test_rename_moves_entry() {
        let mut cache = DurationCache::new(PathBuf::from("unused"), DEFAULT_CAPACITY);
        cache.insert("old.mp3".into(), 10);
        cache.rename("old.mp3", "new.mp3");
        assert_eq!(cache.get("old.mp3"), None);
        assert_eq!(cache.get("new.mp3"), Some(10));
        cache.remove("new.mp3");
        assert!(cache.is_empty());
    }

    #[test]
    fn test_rename_keeps_save_position() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache");
        let mut cache = DurationCache::new(path.clone(), 2);
        cache.insert("a.mp3".into(), 1);
        cache.insert("b.mp3".into(), 2);
        cache.insert("c.mp3".into(), 3);

        cache.rename("a.mp3", "z.mp3");
        assert_eq!(cache.save().unwrap(), 2);
        assert_eq!(fs::read_to_string(&path).unwrap(), "z.mp3:1\nb.mp3:2\n");
    }
}
