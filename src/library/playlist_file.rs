use crate::error::{ShellError, ShellResult};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Playlist files live flat in one directory. Each file is a single
/// comma-separated line of song filenames terminated by LF (CRLF accepted).
#[derive(Debug, Clone)]
pub struct PlaylistStore {
    dir: PathBuf,
}

impl PlaylistStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Where `save` puts a playlist called `name`: `<name>.csv` unless an
    /// extension was given.
    pub fn path_for(&self, name: &str) -> PathBuf {
        if Path::new(name).extension().is_some() {
            self.dir.join(name)
        } else {
            self.dir.join(format!("{}.csv", name))
        }
    }

    pub fn load(&self, file_name: &str) -> ShellResult<Vec<String>> {
        read(&self.dir.join(file_name))
    }

    pub fn save(&self, name: &str, tracks: &[String], overwrite: bool) -> ShellResult<PathBuf> {
        let path = self.path_for(name);
        if path.exists() && !overwrite {
            return Err(ShellError::TargetExists(path));
        }
        write(&path, tracks)?;
        info!("Saved playlist {} ({} tracks)", path.display(), tracks.len());
        Ok(path)
    }

    /// Apply `edit` to every playlist file, rewriting the ones it changes.
    /// Files that fail to parse are skipped.
    pub fn rewrite_all<F>(&self, mut edit: F) -> io::Result<usize>
    where
        F: FnMut(&mut Vec<String>) -> bool,
    {
        let mut rewritten = 0;
        if !self.dir.is_dir() {
            return Ok(rewritten);
        }
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let mut tracks = match read(&path) {
                Ok(tracks) => tracks,
                Err(e) => {
                    warn!("Leaving {} untouched: {}", path.display(), e);
                    continue;
                }
            };
            if edit(&mut tracks) {
                write(&path, &tracks)?;
                rewritten += 1;
            }
        }
        Ok(rewritten)
    }
}

pub fn parse(content: &str, path: &Path) -> ShellResult<Vec<String>> {
    let parse_error = |reason: &str| ShellError::PlaylistParse {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };

    let line = content
        .strip_suffix("\r\n")
        .or_else(|| content.strip_suffix('\n'))
        .ok_or_else(|| parse_error("unknown line ending"))?;
    if line.contains(['\n', '\r']) {
        return Err(parse_error("expected a single line"));
    }

    Ok(line
        .split(',')
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect())
}

pub fn read(path: &Path) -> ShellResult<Vec<String>> {
    let content = fs::read_to_string(path)?;
    parse(&content, path)
}

pub fn write(path: &Path, tracks: &[String]) -> io::Result<()> {
    fs::write(path, format!("{}\n", tracks.join(",")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_line_endings() {
        let path = Path::new("p.csv");
        assert_eq!(parse("a.mp3,b.ogg\n", path).unwrap(), vec!["a.mp3", "b.ogg"]);
        assert_eq!(parse("a.mp3,b.ogg\r\n", path).unwrap(), vec!["a.mp3", "b.ogg"]);
        assert!(parse("\n", path).unwrap().is_empty());

        for bad in ["a.mp3,b.ogg", "a.mp3\r", "a.mp3\nb.mp3\n", ""] {
            assert!(
                matches!(parse(bad, path), Err(ShellError::PlaylistParse { .. })),
                "{bad:?} should not parse"
            );
        }
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let store = PlaylistStore::new(dir.path().to_path_buf());
        let tracks = vec!["one.mp3".to_string(), "two live.flac".to_string()];

        let path = store.save("mix", &tracks, false).unwrap();
        assert_eq!(path, dir.path().join("mix.csv"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "one.mp3,two live.flac\n");
        assert_eq!(store.load("mix.csv").unwrap(), tracks);

        assert!(matches!(store.save("mix", &tracks, false), Err(ShellError::TargetExists(_))));
        store.save("mix", &tracks[..1], true).unwrap();
        assert_eq!(store.load("mix.csv").unwrap(), vec!["one.mp3"]);
    }

    #[test]
    fn test_rewrite_all_touches_only_changed_files() {
        let dir = tempdir().unwrap();
        let store = PlaylistStore::new(dir.path().to_path_buf());
        fs::write(dir.path().join("a.csv"), "x.mp3,y.mp3\n").unwrap();
        fs::write(dir.path().join("b.csv"), "y.mp3\n").unwrap();
        fs::write(dir.path().join("broken.csv"), "x.mp3").unwrap();

        let rewritten = store
            .rewrite_all(|tracks| {
                let before = tracks.len();
                tracks.retain(|t| t != "x.mp3");
                before != tracks.len()
            })
            .unwrap();

        assert_eq!(rewritten, 1);
        assert_eq!(store.load("a.csv").unwrap(), vec!["y.mp3"]);
        assert_eq!(fs::read_to_string(dir.path().join("broken.csv")).unwrap(), "x.mp3");
    }
}
