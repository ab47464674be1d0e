// Session state and the dispatcher boundary. Everything typed at the prompt,
// read from a script or handed over on the command line goes through
// `Shell::execute_line`.

pub mod script;

pub use script::{ensure_startup_script, STARTUP_SCRIPT};

use crate::cache::DurationCache;
use crate::command::help::{HelpBook, HELP_PROMPT, WELCOME};
use crate::command::{self, parse_line, playlist, Command, Registry};
use crate::error::{ShellError, ShellResult};
use crate::library::{self, Catalog, PlaylistStore, SharedCatalog};
use crate::player::{Player, TickOutcome};
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLockReadGuard};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Help,
    ScriptExecution,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub mode: Mode,
    pub prompt: String,
}

/// Where user-facing messages go.
#[derive(Debug)]
pub enum Console {
    Stdout,
    Captured(Vec<String>),
}

impl Console {
    pub fn say(&mut self, message: &str) {
        match self {
            Console::Stdout => println!("{}", message),
            Console::Captured(lines) => lines.push(message.to_string()),
        }
    }

    /// Drain captured output. Always empty for stdout.
    pub fn take(&mut self) -> Vec<String> {
        match self {
            Console::Stdout => Vec::new(),
            Console::Captured(lines) => std::mem::take(lines),
        }
    }
}

pub struct Shell {
    pub session: Session,
    pub player: Player,
    pub durations: DurationCache,
    pub catalog: SharedCatalog,
    pub console: Console,
    pub help: HelpBook,
    commands: Rc<Registry>,
    playlist_commands: Rc<Registry>,
    running: Arc<AtomicBool>,
}

impl Shell {
    pub fn new(player: Player, durations: DurationCache, catalog: SharedCatalog, prompt: String) -> Self {
        Self {
            session: Session {
                mode: Mode::Normal,
                prompt,
            },
            player,
            durations,
            catalog,
            console: Console::Stdout,
            help: HelpBook::new(),
            commands: Rc::new(command::default_registry()),
            playlist_commands: Rc::new(playlist::registry()),
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn with_console(mut self, console: Console) -> Self {
        self.console = console;
        self
    }

    /// The flag every worker checks before its next iteration.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn request_exit(&mut self) {
        info!("Exit requested");
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn mode(&self) -> Mode {
        self.session.mode
    }

    pub fn prompt(&self) -> String {
        match self.session.mode {
            Mode::Help => HELP_PROMPT.to_string(),
            _ => self.session.prompt.clone(),
        }
    }

    pub fn say(&mut self, message: impl AsRef<str>) {
        self.console.say(message.as_ref());
    }

    pub fn catalog(&self) -> RwLockReadGuard<'_, Catalog> {
        library::read(&self.catalog)
    }

    pub fn music_dir(&self) -> PathBuf {
        self.catalog().music_dir.clone()
    }

    pub fn playlist_store(&self) -> PlaylistStore {
        PlaylistStore::new(self.catalog().playlist_dir.clone())
    }

    /// Run every command on the line in order. The mode is checked again
    /// before each one, so `help; list` enters help mode and then looks up
    /// `list` as a topic.
    pub fn execute_line(&mut self, line: &str) {
        debug!("Executing line: {:?}", line);
        for cmd in parse_line(line) {
            if !self.is_running() {
                break;
            }
            match self.session.mode {
                Mode::Help => self.help_mode_line(cmd),
                Mode::Normal | Mode::ScriptExecution => self.dispatch(cmd),
            }
        }
    }

    /// Run one command, turning any failure into a message.
    pub fn dispatch(&mut self, mut cmd: Command) {
        if let Err(err) = self.run_command(&mut cmd) {
            debug!("{} failed: {:?}", cmd.name(), err);
            self.report(err);
        }
    }

    pub fn run_command(&mut self, cmd: &mut Command) -> ShellResult<()> {
        let commands = Rc::clone(&self.commands);
        let (name, handler) = commands.resolve(cmd.name())?;
        debug!("Resolved {:?} to {}", cmd.name(), name);
        handler.call(self, cmd)
    }

    /// Run `cmd` (already shifted onto its sub-command name) against the
    /// playlist table.
    pub fn run_playlist_command(&mut self, cmd: &mut Command) -> ShellResult<()> {
        let commands = Rc::clone(&self.playlist_commands);
        let (_, handler) = commands.resolve(cmd.name())?;
        handler.call(self, cmd)
    }

    pub fn enter_help(&mut self) {
        self.session.mode = Mode::Help;
        self.say(WELCOME);
    }

    fn help_mode_line(&mut self, mut cmd: Command) {
        if cmd.name() == "quit" {
            self.session.mode = Mode::Normal;
            return;
        }
        let mut words = vec![cmd.name().to_string()];
        words.extend(cmd.remaining());
        match self.help.lookup(&words) {
            Ok(text) => self.say(text),
            Err(err) => self.report(err),
        }
    }

    pub fn report(&mut self, err: ShellError) {
        match err {
            ShellError::Usage(topic) => match self.help.topic(topic) {
                Ok(text) => self.say(text),
                Err(e) => self.say(e.to_string()),
            },
            ShellError::Io(e) => {
                warn!("I/O error in command: {}", e);
                self.say(format!("Error: {}", e));
            }
            other => self.say(other.to_string()),
        }
    }

    /// End of input at the prompt. Leaves help mode if in it, otherwise
    /// shuts the shell down. Returns whether to keep reading.
    pub fn end_of_input(&mut self) -> bool {
        if self.session.mode == Mode::Help {
            self.session.mode = Mode::Normal;
            return true;
        }
        self.request_exit();
        false
    }

    /// One song-completion check.
    pub fn tick(&mut self) -> TickOutcome {
        let dir = self.music_dir();
        let outcome = self.player.tick(&dir);
        match &outcome {
            TickOutcome::Nothing => {}
            TickOutcome::Repeated(track) => debug!("Repeated {}", track),
            TickOutcome::Advanced(track) => {
                info!("Playlist advanced to {}", track);
                self.durations.ensure(track, &dir, self.player.engine());
            }
            TickOutcome::Finished => debug!("Playback finished"),
        }
        outcome
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::audio::fake::{FakeEngine, FakeState};
    use crate::cache::DEFAULT_CAPACITY;
    use std::cell::RefCell;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    pub(crate) struct Fixture {
        pub shell: Shell,
        pub engine: Rc<RefCell<FakeState>>,
        pub dir: TempDir,
    }

    /// A shell over a temporary music directory holding `songs`, with
    /// `playlists/` and `scripts/` next to it.
    pub(crate) fn fixture(songs: &[&str]) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let music = dir.path().join("music");
        let playlists = dir.path().join("playlists");
        let scripts = dir.path().join("scripts");
        for d in [&music, &playlists, &scripts] {
            fs::create_dir_all(d).unwrap();
        }
        for song in songs {
            fs::write(music.join(song), b"").unwrap();
        }

        let (engine, state) = FakeEngine::new();
        let player = Player::new(Box::new(engine), Duration::from_millis(20));
        let durations = DurationCache::new(dir.path().join("cache"), DEFAULT_CAPACITY);
        let catalog = Catalog::scan(music, playlists, scripts).into_shared();
        let shell = Shell::new(player, durations, catalog, "> ".to_string())
            .with_console(Console::Captured(Vec::new()));

        Fixture {
            shell,
            engine: state,
            dir,
        }
    }

    impl Fixture {
        /// Execute a line and return what it printed.
        pub fn run(&mut self, line: &str) -> Vec<String> {
            self.shell.execute_line(line);
            self.shell.console.take()
        }

        pub fn music(&self) -> PathBuf {
            self.dir.path().join("music")
        }

        pub fn playlists(&self) -> PathBuf {
            self.dir.path().join("playlists")
        }

        pub fn scripts(&self) -> PathBuf {
            self.dir.path().join("scripts")
        }

        pub fn write_script(&mut self, name: &str, content: &str) {
            fs::write(self.scripts().join(name), content).unwrap();
            library::write(&self.shell.catalog).refresh(library::CatalogKind::Scripts);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::fixture;
    use super::*;

    #[test]
    fn test_unknown_and_ambiguous_commands_are_reported() {
        let mut fx = fixture(&[]);
        assert_eq!(fx.run("frobnicate"), vec!["Command 'frobnicate' not found."]);
        assert_eq!(fx.run("l"), vec!["Multiple matches found, could be one of list, loop."]);
        assert!(fx.shell.is_running());
    }

    #[test]
    fn test_help_mode_is_reread_between_commands() {
        let mut fx = fixture(&[]);
        let out = fx.run("help; list; quit; volume");
        assert_eq!(fx.shell.mode(), Mode::Normal);
        assert_eq!(out[0], WELCOME);
        assert_eq!(out[1], fx.shell.help.topic("list").unwrap());
        assert_eq!(out[2], "Volume: 100.0%");
    }

    #[test]
    fn test_help_mode_prompt_and_unknown_topic() {
        let mut fx = fixture(&[]);
        fx.run("help");
        assert_eq!(fx.shell.prompt(), "?> ");
        assert_eq!(fx.run("zebra"), vec!["No help found for 'zebra'."]);
        assert_eq!(fx.shell.mode(), Mode::Help);
        fx.run("quit");
        assert_eq!(fx.shell.prompt(), "> ");
    }

    #[test]
    fn test_end_of_input() {
        let mut fx = fixture(&[]);
        fx.run("help");
        assert!(fx.shell.end_of_input());
        assert_eq!(fx.shell.mode(), Mode::Normal);
        assert!(fx.shell.is_running());

        assert!(!fx.shell.end_of_input());
        assert!(!fx.shell.is_running());
    }

    #[test]
    fn test_exit_stops_the_rest_of_the_line() {
        let mut fx = fixture(&[]);
        let out = fx.run("exit; volume");
        assert!(out.is_empty());
        assert!(!fx.shell.is_running());
    }

    #[test]
    fn test_missing_argument_is_not_fatal() {
        let mut fx = fixture(&[]);
        assert_eq!(fx.run("seek"), vec!["Expected another argument."]);
        assert!(fx.shell.is_running());
    }
}
