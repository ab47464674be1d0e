// lyre library - everything behind the interactive prompt
// The binary only wires config, logging and the audio device together

pub mod audio;    // audio engine trait + rodio backend
pub mod cache;    // track-length cache
pub mod command;  // parsing, registry, the commands themselves
pub mod config;   // settings
pub mod error;    // user-facing error kinds
pub mod library;  // song / playlist / script catalogs
pub mod matcher;  // prefix resolution
pub mod player;   // playback state machine
pub mod runtime;  // input, dispatch and watcher workers
pub mod shell;    // session state + dispatcher boundary

pub use audio::{AudioEngine, PlaybackStatus};
pub use cache::DurationCache;
pub use config::Config;
pub use error::{ShellError, ShellResult};
pub use library::Catalog;
pub use player::Player;
pub use runtime::Runtime;
pub use shell::Shell;
