// Script execution: files of command lines run through the dispatcher one
// line at a time. Scripts do not nest.

use super::{Mode, Shell};
use crate::error::{ShellError, ShellResult};
use crate::library;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Runs once at startup, before the first prompt.
pub const STARTUP_SCRIPT: &str = "startup";

const STARTUP_HEADER: &str = "# Any commands entered below will be executed when lyre starts\n";

/// Create the startup script in `script_dir` if it isn't there yet.
pub fn ensure_startup_script(script_dir: &Path) -> io::Result<PathBuf> {
    let path = script_dir.join(STARTUP_SCRIPT);
    if !path.exists() {
        fs::create_dir_all(script_dir)?;
        fs::write(&path, STARTUP_HEADER)?;
        info!("Created startup script at {}", path.display());
    }
    Ok(path)
}

impl Shell {
    /// Run a script from the script catalog, by full name or prefix.
    pub fn run_script(&mut self, name: &str) -> ShellResult<()> {
        if self.session.mode == Mode::ScriptExecution {
            return Err(ShellError::ScriptAlreadyRunning);
        }
        let path = {
            let catalog = self.catalog();
            catalog.script_dir.join(catalog.resolve_script(name)?)
        };
        self.run_script_file(&path)
    }

    /// Run the script at `path`.
    pub fn run_script_file(&mut self, path: &Path) -> ShellResult<()> {
        if self.session.mode == Mode::ScriptExecution {
            return Err(ShellError::ScriptAlreadyRunning);
        }
        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ShellError::PathNotFound(path.to_path_buf()),
            _ => ShellError::Io(e),
        })?;

        info!("Running script {}", path.display());
        let previous = std::mem::replace(&mut self.session.mode, Mode::ScriptExecution);
        for line in content.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if !self.is_running() {
                debug!("Shell stopped, abandoning {}", path.display());
                break;
            }
            self.execute_line(line);
        }
        self.session.mode = previous;
        Ok(())
    }

    /// A script named on the command line: an existing file is run from its
    /// path, anything else is looked up in the script catalog.
    pub fn run_script_arg(&mut self, arg: &str) -> ShellResult<()> {
        let path = Path::new(arg);
        if path.is_file() {
            self.run_script_file(path)
        } else {
            self.run_script(arg)
        }
    }

    /// The startup script, if it exists. A missing one is not an error.
    pub fn run_startup(&mut self) -> ShellResult<()> {
        let path = self.catalog().script_dir.join(STARTUP_SCRIPT);
        if !path.is_file() {
            debug!("No startup script at {}", path.display());
            return Ok(());
        }
        self.run_script_file(&path)
    }

    /// Re-list the script directory, e.g. after creating the startup script.
    pub fn refresh_scripts(&mut self) {
        library::write(&self.catalog).refresh(library::CatalogKind::Scripts);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::testing::fixture;

    #[test]
    fn test_script_runs_lines_and_skips_comments() {
        let mut fx = fixture(&["a.mp3"]);
        fx.write_script("setup", "# comment\n\nvolume 40\n  # indented comment\nset-prompt \"$ \"\n");

        let out = fx.run("run setup");
        assert!(out.is_empty(), "{out:?}");
        assert_eq!(fx.shell.player.volume(), 40.0);
        assert_eq!(fx.shell.prompt(), "$ ");
        assert_eq!(fx.shell.mode(), Mode::Normal);
    }

    #[test]
    fn test_nested_run_fails_and_script_continues() {
        let mut fx = fixture(&[]);
        fx.write_script("a", "volume 10\nrun b\nvolume 20\n");
        fx.write_script("b", "volume 90\n");

        let out = fx.run("run a");
        assert_eq!(out, vec![ShellError::ScriptAlreadyRunning.to_string()]);
        assert_eq!(fx.shell.player.volume(), 20.0);
        assert_eq!(fx.shell.mode(), Mode::Normal);
    }

    #[test]
    fn test_direct_reentrancy_is_refused() {
        let mut fx = fixture(&[]);
        fx.write_script("a", "volume 10\n");
        fx.shell.session.mode = Mode::ScriptExecution;
        assert!(matches!(fx.shell.run_script("a"), Err(ShellError::ScriptAlreadyRunning)));
        assert_eq!(fx.shell.player.volume(), 100.0);
    }

    #[test]
    fn test_run_resolves_prefixes_and_reports_each() {
        let mut fx = fixture(&[]);
        fx.write_script("quiet", "volume 5\n");
        fx.write_script("party", "volume 95\n");
        fx.write_script("pause-all", "stop\n");

        let out = fx.run("run q nothing pa");
        assert_eq!(
            out,
            vec![
                "Script not found: nothing".to_string(),
                "Multiple matches found, could be one of party, pause-all.".to_string(),
            ]
        );
        assert_eq!(fx.shell.player.volume(), 5.0);
    }

    #[test]
    fn test_full_script_name_shared_as_prefix_is_ambiguous() {
        let mut fx = fixture(&[]);
        fx.write_script("party", "volume 95\n");
        fx.write_script("party-all", "volume 5\n");

        assert_eq!(
            fx.run("run party"),
            vec!["Multiple matches found, could be one of party, party-all."]
        );
        assert_eq!(fx.shell.player.volume(), 100.0);

        fx.run("run party-");
        assert_eq!(fx.shell.player.volume(), 5.0);
    }

    #[test]
    fn test_exit_inside_a_script_stops_it() {
        let mut fx = fixture(&[]);
        fx.write_script("bye", "volume 30\nexit\nvolume 60\n");
        fx.run("run bye");
        assert!(!fx.shell.is_running());
        assert_eq!(fx.shell.player.volume(), 30.0);
    }

    #[test]
    fn test_help_in_a_script_does_not_enter_help_mode() {
        let mut fx = fixture(&[]);
        fx.write_script("h", "help\nvolume 70\n");
        fx.run("run h");
        assert_eq!(fx.shell.mode(), Mode::Normal);
        assert_eq!(fx.shell.player.volume(), 70.0);
    }

    #[test]
    fn test_startup_script_is_created_once() {
        let mut fx = fixture(&[]);
        let path = ensure_startup_script(&fx.scripts()).unwrap();
        assert!(fs::read_to_string(&path).unwrap().starts_with("# Any commands"));

        fs::write(&path, "volume 55\n").unwrap();
        ensure_startup_script(&fx.scripts()).unwrap();
        fx.shell.run_startup().unwrap();
        assert_eq!(fx.shell.player.volume(), 55.0);
    }

    #[test]
    fn test_script_argument_by_path() {
        let mut fx = fixture(&[]);
        let outside = fx.dir.path().join("elsewhere.lyre");
        fs::write(&outside, "volume 12\n").unwrap();
        fx.shell.run_script_arg(outside.to_str().unwrap()).unwrap();
        assert_eq!(fx.shell.player.volume(), 12.0);

        assert!(matches!(
            fx.shell.run_script_arg("missing"),
            Err(ShellError::ScriptNotFound(_))
        ));
    }
}
