// Catalogs of what can be named at the prompt: songs, playlists and scripts.
// Each is a flat directory listing; the watcher refreshes them in the background.

pub mod playlist_file;

pub use playlist_file::PlaylistStore;

use crate::audio::AudioFormat;
use crate::error::{ShellError, ShellResult};
use crate::matcher;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, warn};
use walkdir::WalkDir;

pub type SharedCatalog = Arc<RwLock<Catalog>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogKind {
    Songs,
    Playlists,
    Scripts,
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub music_dir: PathBuf,
    pub playlist_dir: PathBuf,
    pub script_dir: PathBuf,
    songs: Vec<String>,
    playlists: Vec<String>,
    scripts: Vec<String>,
}

impl Catalog {
    pub fn new(music_dir: PathBuf, playlist_dir: PathBuf, script_dir: PathBuf) -> Self {
        Self {
            music_dir,
            playlist_dir,
            script_dir,
            ..Default::default()
        }
    }

    /// Build a catalog and list all three directories.
    pub fn scan(music_dir: PathBuf, playlist_dir: PathBuf, script_dir: PathBuf) -> Self {
        let mut catalog = Self::new(music_dir, playlist_dir, script_dir);
        catalog.refresh(CatalogKind::Songs);
        catalog.refresh(CatalogKind::Playlists);
        catalog.refresh(CatalogKind::Scripts);
        catalog
    }

    pub fn into_shared(self) -> SharedCatalog {
        Arc::new(RwLock::new(self))
    }

    pub fn dir(&self, kind: CatalogKind) -> &Path {
        match kind {
            CatalogKind::Songs => &self.music_dir,
            CatalogKind::Playlists => &self.playlist_dir,
            CatalogKind::Scripts => &self.script_dir,
        }
    }

    /// Re-list one directory. A missing directory yields an empty listing.
    pub fn refresh(&mut self, kind: CatalogKind) {
        let dir = self.dir(kind).to_path_buf();
        let listing = match kind {
            CatalogKind::Songs => list_files(&dir, |p| AudioFormat::from_path(p).is_supported()),
            CatalogKind::Playlists | CatalogKind::Scripts => list_files(&dir, |_| true),
        };
        let names = listing.unwrap_or_else(|e| {
            warn!("Could not list {}: {}", dir.display(), e);
            Vec::new()
        });
        debug!("{:?} catalog: {} entries in {}", kind, names.len(), dir.display());

        match kind {
            CatalogKind::Songs => self.songs = names,
            CatalogKind::Playlists => self.playlists = names,
            CatalogKind::Scripts => self.scripts = names,
        }
    }

    /// Point a catalog at another directory and re-list it.
    pub fn set_dir(&mut self, kind: CatalogKind, dir: PathBuf) -> ShellResult<()> {
        if !dir.is_dir() {
            return Err(ShellError::PathNotFound(dir));
        }
        match kind {
            CatalogKind::Songs => self.music_dir = dir,
            CatalogKind::Playlists => self.playlist_dir = dir,
            CatalogKind::Scripts => self.script_dir = dir,
        }
        self.refresh(kind);
        Ok(())
    }

    pub fn songs(&self) -> &[String] {
        &self.songs
    }

    pub fn playlists(&self) -> &[String] {
        &self.playlists
    }

    pub fn scripts(&self) -> &[String] {
        &self.scripts
    }

    pub fn has_song(&self, name: &str) -> bool {
        self.songs.iter().any(|s| s == name)
    }

    /// Song filename for a full name or unambiguous prefix.
    pub fn resolve_song(&self, name: &str) -> ShellResult<String> {
        if self.has_song(name) {
            return Ok(name.to_string());
        }
        matcher::resolve(&self.songs, name)
            .into_result(|| ShellError::SongNotFound(name.to_string()), stem)
    }

    pub fn resolve_playlist(&self, name: &str) -> ShellResult<String> {
        if self.playlists.iter().any(|p| p == name) {
            return Ok(name.to_string());
        }
        matcher::resolve(&self.playlists, name)
            .into_result(|| ShellError::PlaylistNotFound(name.to_string()), str::to_string)
    }

    /// Scripts go straight through the matcher: a full name that is also the
    /// prefix of another script is ambiguous.
    pub fn resolve_script(&self, name: &str) -> ShellResult<String> {
        matcher::resolve(&self.scripts, name)
            .into_result(|| ShellError::ScriptNotFound(name.to_string()), str::to_string)
    }

    /// Stems of every song starting with `prefix`, in catalog order.
    pub fn find(&self, prefix: &str) -> Vec<String> {
        self.songs
            .iter()
            .filter(|s| s.starts_with(prefix))
            .map(|s| stem(s))
            .collect()
    }
}

/// Shared read access; a poisoned lock still holds a usable listing.
pub fn read(catalog: &SharedCatalog) -> RwLockReadGuard<'_, Catalog> {
    catalog.read().unwrap_or_else(PoisonError::into_inner)
}

pub fn write(catalog: &SharedCatalog) -> RwLockWriteGuard<'_, Catalog> {
    catalog.write().unwrap_or_else(PoisonError::into_inner)
}

/// Filename without its extension, for display.
pub fn stem(name: &str) -> String {
    Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name)
        .to_string()
}

/// Regular files directly under `dir` (no recursion, no dotfiles), sorted.
fn list_files<F>(dir: &Path, keep: F) -> io::Result<Vec<String>>
where
    F: Fn(&Path) -> bool,
{
    if !dir.is_dir() {
        return Err(io::Error::new(io::ErrorKind::NotFound, "directory does not exist"));
    }

    let mut names: Vec<String> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| keep(entry.path()))
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .filter(|name| !name.starts_with('.'))
        .collect();

    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"x").unwrap();
    }

    #[test]
    fn test_scan_filters_and_sorts() {
        let music = tempdir().unwrap();
        for name in ["b.ogg", "a.mp3", "cover.jpg", "c.FLAC", ".hidden.mp3", "d.aiff"] {
            touch(music.path(), name);
        }
        fs::create_dir(music.path().join("sub.mp3")).unwrap();
        touch(&music.path().join("sub.mp3"), "nested.mp3");

        let lists = tempdir().unwrap();
        touch(lists.path(), "road.csv");

        let catalog = Catalog::scan(
            music.path().to_path_buf(),
            lists.path().to_path_buf(),
            music.path().join("missing"),
        );
        assert_eq!(catalog.songs(), ["a.mp3", "b.ogg", "c.FLAC", "d.aiff"]);
        assert_eq!(catalog.playlists(), ["road.csv"]);
        assert!(catalog.scripts().is_empty());
    }

    #[test]
    fn test_resolve_song() {
        let music = tempdir().unwrap();
        for name in ["intro.mp3", "interlude.mp3", "outro.mp3", "out.mp3"] {
            touch(music.path(), name);
        }
        let catalog = Catalog::scan(music.path().to_path_buf(), PathBuf::new(), PathBuf::new());

        assert_eq!(catalog.resolve_song("intr").unwrap(), "intro.mp3");
        assert_eq!(catalog.resolve_song("out.mp3").unwrap(), "out.mp3");
        assert!(matches!(catalog.resolve_song("zzz"), Err(ShellError::SongNotFound(_))));
        match catalog.resolve_song("inte") {
            Ok(song) => assert_eq!(song, "interlude.mp3"),
            Err(e) => panic!("unexpected {e}"),
        }
        match catalog.resolve_song("ou") {
            Err(ShellError::Ambiguous(list)) => assert_eq!(list, vec!["out", "outro"]),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(catalog.find("in"), vec!["interlude", "intro"]);
    }

    #[test]
    fn test_set_dir_requires_existing_directory() {
        let music = tempdir().unwrap();
        let mut catalog = Catalog::new(PathBuf::new(), PathBuf::new(), PathBuf::new());
        let missing = music.path().join("nope");
        assert!(matches!(
            catalog.set_dir(CatalogKind::Songs, missing),
            Err(ShellError::PathNotFound(_))
        ));

        touch(music.path(), "x.wav");
        catalog.set_dir(CatalogKind::Songs, music.path().to_path_buf()).unwrap();
        assert_eq!(catalog.songs(), ["x.wav"]);
    }
}
