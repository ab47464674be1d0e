// Error kinds surfaced by command handlers
// Every variant renders as the message the user sees at the prompt

use std::path::PathBuf;
use thiserror::Error;

pub type ShellResult<T> = Result<T, ShellError>;

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("Command '{0}' not found.")]
    CommandNotFound(String),

    #[error("Multiple matches found, could be one of {}.", .0.join(", "))]
    Ambiguous(Vec<String>),

    #[error("Expected another argument.")]
    EmptyArguments,

    #[error("'{0}' is not a valid number.")]
    InvalidNumber(String),

    #[error("{what} must be between {min} and {max}.")]
    OutOfRange {
        what: &'static str,
        min: f64,
        max: f64,
    },

    #[error("{0} is in an unsupported format.")]
    UnsupportedFormat(String),

    #[error("Cannot run a script while executing another script.")]
    ScriptAlreadyRunning,

    #[error("{} does not exist.", .0.display())]
    PathNotFound(PathBuf),

    #[error("Song not found: {0}")]
    SongNotFound(String),

    #[error("Playlist not found: {0}")]
    PlaylistNotFound(String),

    #[error("Script not found: {0}")]
    ScriptNotFound(String),

    #[error("No help found for '{0}'.")]
    NoHelp(String),

    #[error("Nothing playing.")]
    NothingPlaying,

    #[error("Not playing a playlist.")]
    NotInPlaylistMode,

    #[error("Playlist is empty.")]
    PlaylistEmpty,

    #[error("Already at the end of the playlist.")]
    EndOfPlaylist,

    #[error("Already at the start of the playlist.")]
    StartOfPlaylist,

    #[error("Invalid duration or timestamp '{0}'. See `help timestamp` for more.")]
    InvalidTimestamp(String),

    #[error("Could not parse playlist {}: {reason}", .path.display())]
    PlaylistParse { path: PathBuf, reason: String },

    #[error("'{0}' is not a valid song name.")]
    InvalidName(String),

    #[error("{0} is already in the playlist.")]
    AlreadyInPlaylist(String),

    #[error("{} already exists.", .0.display())]
    TargetExists(PathBuf),

    /// Wrong argument shape; the dispatcher prints the named help topic instead.
    #[error("Usage: see `help {0}`.")]
    Usage(&'static str),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ShellError {
    pub fn out_of_range(what: &'static str, min: f64, max: f64) -> Self {
        ShellError::OutOfRange { what, min, max }
    }
}
