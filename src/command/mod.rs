// Command lines, the handler registry and name resolution.
//
// A raw line splits into commands on `;` and into words on whitespace;
// double quotes suspend both.

pub mod builtins;
pub mod help;
pub mod library;
pub mod playlist;

use crate::error::{ShellError, ShellResult};
use crate::matcher;
use crate::shell::Shell;
use std::collections::{BTreeMap, VecDeque};
use std::fmt;

/// One parsed command: a lowercased name and an argument cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    name: String,
    args: VecDeque<String>,
}

impl Command {
    pub fn new<I, S>(name: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.to_lowercase(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Take the next argument.
    pub fn next_arg(&mut self) -> ShellResult<String> {
        self.args.pop_front().ok_or(ShellError::EmptyArguments)
    }

    pub fn arg_count(&self) -> usize {
        self.args.len()
    }

    pub fn has_args(&self) -> bool {
        !self.args.is_empty()
    }

    /// Everything not consumed yet.
    pub fn remaining(&mut self) -> Vec<String> {
        self.args.drain(..).collect()
    }

    /// Make the next argument the command name, for sub-commands.
    pub fn shift(&mut self) -> ShellResult<()> {
        let next = self.next_arg()?;
        self.name = next.to_lowercase();
        Ok(())
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Split a raw line into commands. Empty commands are dropped.
pub fn parse_line(line: &str) -> Vec<Command> {
    let mut commands = Vec::new();
    let mut words: Vec<String> = Vec::new();
    let mut word = String::new();
    let mut in_word = false;
    let mut quoted = false;

    for c in line.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                in_word = true;
            }
            c if quoted => word.push(c),
            ';' => {
                finish_word(&mut word, &mut in_word, &mut words);
                push_command(&mut commands, &mut words);
            }
            c if c.is_whitespace() => finish_word(&mut word, &mut in_word, &mut words),
            c => {
                word.push(c);
                in_word = true;
            }
        }
    }
    finish_word(&mut word, &mut in_word, &mut words);
    push_command(&mut commands, &mut words);

    commands
}

fn finish_word(word: &mut String, in_word: &mut bool, words: &mut Vec<String>) {
    if *in_word {
        words.push(std::mem::take(word));
        *in_word = false;
    }
}

fn push_command(commands: &mut Vec<Command>, words: &mut Vec<String>) {
    let mut drained = words.drain(..);
    if let Some(name) = drained.next() {
        commands.push(Command::new(&name, drained));
    }
}

/// Something a command name can be bound to.
pub trait Handler {
    fn call(&self, shell: &mut Shell, cmd: &mut Command) -> ShellResult<()>;
}

impl<F> Handler for F
where
    F: Fn(&mut Shell, &mut Command) -> ShellResult<()>,
{
    fn call(&self, shell: &mut Shell, cmd: &mut Command) -> ShellResult<()> {
        self(shell, cmd)
    }
}

/// Name to handler table. Built once, then only read.
#[derive(Default)]
pub struct Registry {
    handlers: BTreeMap<&'static str, Box<dyn Handler>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<H>(mut self, name: &'static str, handler: H) -> Self
    where
        H: Handler + 'static,
    {
        self.handlers.insert(name, Box::new(handler));
        self
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.handlers.keys().copied()
    }

    /// Exact name first, then an unambiguous prefix.
    pub fn resolve(&self, name: &str) -> ShellResult<(&'static str, &dyn Handler)> {
        let key = match self.handlers.get_key_value(name) {
            Some((key, _)) => *key,
            None => {
                let found = matcher::resolve(self.names(), name)
                    .into_result(|| ShellError::CommandNotFound(name.to_string()), str::to_string)?;
                self.names()
                    .find(|key| *key == found)
                    .ok_or_else(|| ShellError::CommandNotFound(name.to_string()))?
            }
        };
        let handler = self
            .handlers
            .get(key)
            .ok_or_else(|| ShellError::CommandNotFound(name.to_string()))?;
        Ok((key, handler.as_ref()))
    }
}

/// The top-level command table.
pub fn default_registry() -> Registry {
    Registry::new()
        .with("delete", library::delete)
        .with("exit", builtins::exit)
        .with("find", builtins::find)
        .with("forward", builtins::forward)
        .with("help", builtins::help)
        .with("list", builtins::list)
        .with("loop", builtins::toggle_loop)
        .with("pause", builtins::pause)
        .with("play", builtins::play)
        .with("playlist", playlist::playlist)
        .with("queue", playlist::playlist)
        .with("rename", library::rename)
        .with("repeat", builtins::repeat)
        .with("rewind", builtins::rewind)
        .with("run", builtins::run)
        .with("seek", builtins::seek)
        .with("set-music", library::set_music)
        .with("set-playlist", library::set_playlist)
        .with("set-prompt", builtins::set_prompt)
        .with("stop", builtins::stop)
        .with("time", builtins::time)
        .with("volume", builtins::volume)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(cmd: &Command) -> Vec<String> {
        let mut cmd = cmd.clone();
        let mut out = vec![cmd.name().to_string()];
        out.extend(cmd.remaining());
        out
    }

    #[test]
    fn test_parse_splits_commands_and_words() {
        let parsed = parse_line("  play intro ;volume   50;;stop ");
        let all: Vec<Vec<String>> = parsed.iter().map(words).collect();
        assert_eq!(all, vec![vec!["play", "intro"], vec!["volume", "50"], vec!["stop"]]);
    }

    #[test]
    fn test_quotes_suspend_splitting() {
        let parsed = parse_line(r#"set-prompt "lyre; > " ; play "two words""#);
        assert_eq!(parsed.len(), 2);
        assert_eq!(words(&parsed[0]), vec!["set-prompt", "lyre; > "]);
        assert_eq!(words(&parsed[1]), vec!["play", "two words"]);

        let parsed = parse_line(r#"play "" x"#);
        assert_eq!(words(&parsed[0]), vec!["play", "", "x"]);
    }

    #[test]
    fn test_name_is_lowercased_args_are_not() {
        let mut cmd = parse_line("PLAY Intro").remove(0);
        assert_eq!(cmd.name(), "play");
        assert_eq!(cmd.next_arg().unwrap(), "Intro");
        assert!(matches!(cmd.next_arg(), Err(ShellError::EmptyArguments)));
    }

    #[test]
    fn test_shift_for_subcommands() {
        let mut cmd = Command::new("playlist", ["Load", "road trip"]);
        cmd.shift().unwrap();
        assert_eq!(cmd.name(), "load");
        assert_eq!(cmd.arg_count(), 1);
        assert_eq!(cmd.to_string(), "load road trip");
    }

    #[test]
    fn test_registry_resolution() {
        let registry = default_registry();
        assert_eq!(registry.resolve("stop").unwrap().0, "stop");
        assert_eq!(registry.resolve("li").unwrap().0, "list");
        // exact name wins even though "playlist" shares the prefix
        assert_eq!(registry.resolve("play").unwrap().0, "play");

        match registry.resolve("l") {
            Err(ShellError::Ambiguous(names)) => assert_eq!(names, vec!["list", "loop"]),
            other => panic!("unexpected {:?}", other.map(|(name, _)| name)),
        }
        assert!(matches!(registry.resolve("zz"), Err(ShellError::CommandNotFound(_))));
    }
}
