// Help topics for the main commands and the playlist sub-commands.

use crate::error::{ShellError, ShellResult};
use crate::matcher;
use std::collections::BTreeMap;

pub const HELP_PROMPT: &str = "?> ";

pub const WELCOME: &str = "Welcome to lyre's interactive help utility.
Type `commands` to see the list of commands.
Type `quit` or CTRL-D to return to lyre.";

const COMMANDS: &str = "delete
exit
find
forward
help
list
loop
pause
play
playlist
queue
rename
repeat
rewind
run
seek
set-music
set-playlist
set-prompt
stop
time
volume";

const MAIN_TOPICS: &[(&str, &str)] = &[
    ("autocomplete", "Songs, playlists, scripts, commands and help topics can all be shortened to
any prefix that names exactly one of them. `li` means `list`, while `l`
could be `list` or `loop` and is rejected with both suggestions."),
    ("commands", COMMANDS),
    ("defaults", "Without a config file lyre looks for songs in ~/Music and for playlists in
~/Music/playlists. Scripts live next to config.toml in the lyre config
directory. Change the directories with `set-music` and `set-playlist`, or
put those commands in the startup script to make them stick."),
    ("delete", "Usage: delete <songs>
Deletes each song from the music directory and removes it from every playlist."),
    ("exit", "Exits lyre."),
    ("find", "Usage: find <prefixes>
For each prefix, lists every song whose name starts with it."),
    ("formats", "Supported formats:
mp3
ogg
flac
wav
aiff"),
    ("forward", "Usage: forward <duration/timestamp>
Skips ahead by the given amount. See `help timestamp`."),
    ("help", "Usage: help [topic]
With a topic, shows help for it. Without one, enters help mode, where every
line is looked up as a topic until `quit` or CTRL-D."),
    ("list", "Lists all songs in the music directory."),
    ("loop", "Toggles whether the current song starts over when it reaches the end."),
    ("pause", "Toggles between paused and playing."),
    ("play", "Usage: play <song>
Plays a song from the music directory. The name may be shortened to any
unambiguous prefix (see `help autocomplete`)."),
    ("playlist", "Usage: playlist [subcommand] [arguments]
Without a subcommand, shows the songs in the playlist in play order.
`playlist commands` lists the subcommands and `help playlist <subcommand>`
explains one of them. `queue` is an alias."),
    ("queue", "Alias of `playlist`."),
    ("rename", "Usage: rename <old> <new> [<old> <new>...]
Renames songs in the music directory, keeping their extension, and updates
every playlist that contains them. An existing file is never overwritten."),
    ("repeat", "Usage: repeat [count]
Plays the current song again `count` more times (default 1) before moving on.
Repeats take priority over advancing the playlist."),
    ("rewind", "Usage: rewind <duration/timestamp>
Goes back by the given amount, stopping at the start of the song."),
    ("run", "Usage: run <scripts>
Executes each script from the script directory. Scripts hold one command line
per line; lines starting with `#` are comments. The script named `startup`
runs every time lyre starts. A script cannot run another script."),
    ("seek", "Usage: seek <duration/timestamp>
Jumps to a position in the current song. Seeking past the end stops playback."),
    ("set-music", "Usage: set-music [directory]
Shows or changes the directory songs are read from."),
    ("set-playlist", "Usage: set-playlist [directory]
Shows or changes the directory playlists are read from and saved to."),
    ("set-prompt", "Usage: set-prompt <prompt>
Changes the prompt. Quote it to keep spaces, e.g. set-prompt \"lyre> \".
Help mode always uses `?> `."),
    ("stop", "Stops the current song and leaves the playlist."),
    ("time", "Shows how much of the current song has played and how much is left."),
    ("timestamp", "Durations are either whole seconds (`90`) or a timestamp: `m:ss`, `mm:ss`
or `h:mm:ss`. Minutes and seconds must be below 60."),
    ("volume", "Usage: volume [percent]
Shows the volume, or sets it to a value between 0 and 100."),
];

const PLAYLIST_COMMANDS: &str = "add
clear
load
loop
next
play
previous
remove
save
shuffle
status";

const PLAYLIST_TOPICS: &[(&str, &str)] = &[
    ("add", "Usage: playlist add <song>
Appends a song to the playlist. A song can only be in the playlist once."),
    ("clear", "Empties the playlist."),
    ("commands", PLAYLIST_COMMANDS),
    ("load", "Usage: playlist load <name>
Replaces the playlist with a saved one. Songs that no longer exist are skipped."),
    ("loop", "Toggles whether the playlist starts over after its last song."),
    ("next", "Skips to the next song. Stops at the last song unless the playlist loops."),
    ("play", "Starts the playlist from its current position, wrapping to the first song
after the last."),
    ("previous", "Goes back to the song before the current one."),
    ("remove", "Usage: playlist remove <song>
Removes a song from the playlist."),
    ("save", "Usage: playlist save <name>
Saves the playlist as <name>.csv in the playlist directory. End the name with
`!` to overwrite an existing playlist."),
    ("shuffle", "Toggles shuffling. Every time shuffling is turned on a new order is drawn."),
    ("status", "Shows the current, previous and next songs, the total length of the
playlist and how far into it playback is."),
];

/// A set of topics looked up by name or unambiguous prefix.
#[derive(Debug)]
pub struct Topics {
    entries: BTreeMap<&'static str, &'static str>,
}

impl Topics {
    fn new(entries: &[(&'static str, &'static str)]) -> Self {
        Self {
            entries: entries.iter().copied().collect(),
        }
    }

    /// Topic name for an unambiguous prefix. A full name shared as a prefix
    /// (`play`, `playlist`) is ambiguous.
    pub fn resolve(&self, topic: &str) -> ShellResult<&'static str> {
        let found = matcher::resolve(self.entries.keys().copied(), topic)
            .into_result(|| ShellError::NoHelp(topic.to_string()), str::to_string)?;
        self.entries
            .keys()
            .copied()
            .find(|name| *name == found)
            .ok_or_else(|| ShellError::NoHelp(topic.to_string()))
    }

    pub fn lookup(&self, topic: &str) -> ShellResult<&'static str> {
        let name = self.resolve(topic)?;
        self.get(name)
    }

    /// Text of the topic with exactly this name.
    pub fn get(&self, name: &str) -> ShellResult<&'static str> {
        self.entries
            .get(name)
            .copied()
            .ok_or_else(|| ShellError::NoHelp(name.to_string()))
    }
}

#[derive(Debug)]
pub struct HelpBook {
    main: Topics,
    playlist: Topics,
}

impl Default for HelpBook {
    fn default() -> Self {
        Self::new()
    }
}

impl HelpBook {
    pub fn new() -> Self {
        Self {
            main: Topics::new(MAIN_TOPICS),
            playlist: Topics::new(PLAYLIST_TOPICS),
        }
    }

    /// A main topic by its full name, as named in usage errors.
    pub fn topic(&self, name: &str) -> ShellResult<&'static str> {
        self.main.get(name)
    }

    /// Look up `words`: the first names a topic; after `playlist` or `queue`
    /// a second word selects a playlist sub-topic.
    pub fn lookup(&self, words: &[String]) -> ShellResult<&'static str> {
        let Some(first) = words.first() else {
            return self.main.get("help");
        };
        let name = self.main.resolve(first)?;
        match words.get(1) {
            Some(sub) if name == "playlist" || name == "queue" => self.playlist.lookup(sub),
            _ => self.main.get(name),
        }
    }
}
