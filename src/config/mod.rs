// Configuration for lyre
// Loaded from TOML, written out with defaults the first time it's missing

use crate::audio::AudioConfig;
use crate::cache::DEFAULT_CAPACITY;
use anyhow::{Context, Result};
use dirs::{cache_dir, config_dir};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub music_dir: PathBuf,
    pub playlist_dir: PathBuf,
    pub script_dir: PathBuf,
    pub cache_path: PathBuf,
    pub prompt: String,
    pub audio: AudioConfig,
    pub cache: CacheConfig,
    pub runtime: RuntimeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Entries persisted on exit.
    pub capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub tick_ms: u64,
    pub watch_interval_secs: u64,
    pub end_threshold_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        let music_dir = dirs::audio_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join("Music")))
            .unwrap_or_else(|| PathBuf::from("Music"));
        let state_dir = config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lyre");
        let cache_path = cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lyre")
            .join("cache");

        Self {
            playlist_dir: music_dir.join("playlists"),
            music_dir,
            script_dir: state_dir,
            cache_path,
            prompt: "> ".to_string(),
            audio: AudioConfig::default(),
            cache: CacheConfig::default(),
            runtime: RuntimeConfig::default(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            tick_ms: 10,
            watch_interval_secs: 5,
            end_threshold_ms: 20,
        }
    }
}

impl RuntimeConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }

    pub fn watch_interval(&self) -> Duration {
        Duration::from_secs(self.watch_interval_secs.max(1))
    }

    pub fn end_threshold(&self) -> Duration {
        Duration::from_millis(self.end_threshold_ms)
    }
}

impl Config {
    /// Load from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("parsing {}", path.display()))?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(path)?;
            info!("Wrote default config to {}", path.display());
            Ok(config)
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;

        Ok(())
    }

    /// Make sure every directory the shell reads or writes exists.
    pub fn create_dirs(&self) -> Result<()> {
        let cache_parent = self.cache_path.parent().unwrap_or(Path::new("."));
        for dir in [&self.music_dir, &self.playlist_dir, &self.script_dir]
            .into_iter()
            .map(PathBuf::as_path)
            .chain([cache_parent])
        {
            fs::create_dir_all(dir)
                .with_context(|| format!("could not create {}", dir.display()))?;
        }
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join("lyre");

        Ok(config_dir.join("config.toml"))
    }
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix('~') {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest.trim_start_matches('/'));
        }
    }
    PathBuf::from(path)
}
