// Playback and session commands.

use super::Command;
use crate::audio::PlaybackStatus;
use crate::error::{ShellError, ShellResult};
use crate::library::stem;
use crate::player::time::{format_timestamp, parse_duration};
use crate::shell::{Mode, Shell};
use tracing::debug;

pub fn play(shell: &mut Shell, cmd: &mut Command) -> ShellResult<()> {
    if cmd.arg_count() != 1 {
        return Err(ShellError::Usage("play"));
    }
    let query = cmd.next_arg()?;
    let (dir, song) = {
        let catalog = shell.catalog();
        (catalog.music_dir.clone(), catalog.resolve_song(&query)?)
    };
    shell.player.play_track(&dir, &song)?;
    shell.say(format!("Playing {}.", stem(&song)));
    Ok(())
}

pub fn list(shell: &mut Shell, _cmd: &mut Command) -> ShellResult<()> {
    let line = {
        let catalog = shell.catalog();
        if catalog.songs().is_empty() {
            format!("No songs in {}.", catalog.music_dir.display())
        } else {
            catalog.songs().iter().map(|s| stem(s)).collect::<Vec<_>>().join(", ")
        }
    };
    shell.say(line);
    Ok(())
}

pub fn find(shell: &mut Shell, cmd: &mut Command) -> ShellResult<()> {
    let mut prefixes = vec![cmd.next_arg()?];
    prefixes.extend(cmd.remaining());

    let lines: Vec<String> = {
        let catalog = shell.catalog();
        prefixes
            .iter()
            .map(|prefix| {
                let found = catalog.find(prefix);
                if found.is_empty() {
                    format!("{}: no matches", prefix)
                } else {
                    format!("{}: {}", prefix, found.join(", "))
                }
            })
            .collect()
    };
    for line in lines {
        shell.say(line);
    }
    Ok(())
}

pub fn stop(shell: &mut Shell, _cmd: &mut Command) -> ShellResult<()> {
    shell.player.stop()
}

pub fn pause(shell: &mut Shell, _cmd: &mut Command) -> ShellResult<()> {
    match shell.player.toggle_pause() {
        Ok(PlaybackStatus::Paused) => shell.say("Paused."),
        Ok(_) => shell.say("Resumed."),
        Err(ShellError::NothingPlaying) => {
            shell.say("Cannot pause or unpause while music is stopped.")
        }
        Err(e) => return Err(e),
    }
    Ok(())
}

pub fn exit(shell: &mut Shell, _cmd: &mut Command) -> ShellResult<()> {
    shell.request_exit();
    Ok(())
}

pub fn volume(shell: &mut Shell, cmd: &mut Command) -> ShellResult<()> {
    match cmd.arg_count() {
        0 => {
            let volume = shell.player.volume();
            shell.say(format!("Volume: {:.1}%", volume));
            Ok(())
        }
        1 => {
            let raw = cmd.next_arg()?;
            let percent: f32 = raw
                .parse()
                .map_err(|_| ShellError::InvalidNumber(raw.clone()))?;
            if !percent.is_finite() {
                return Err(ShellError::InvalidNumber(raw));
            }
            shell.player.set_volume(percent)
        }
        _ => Err(ShellError::Usage("volume")),
    }
}

pub fn time(shell: &mut Shell, _cmd: &mut Command) -> ShellResult<()> {
    let (elapsed, total) = shell.player.position()?;
    shell.say(format!(
        "{} elapsed, {} remaining.",
        format_timestamp(elapsed),
        format_timestamp(total.saturating_sub(elapsed))
    ));
    Ok(())
}

pub fn toggle_loop(shell: &mut Shell, _cmd: &mut Command) -> ShellResult<()> {
    let looping = shell.player.toggle_loop();
    shell.say(format!("Looping: {}.", if looping { "enabled" } else { "disabled" }));
    Ok(())
}

pub fn repeat(shell: &mut Shell, cmd: &mut Command) -> ShellResult<()> {
    let Some(track) = shell.player.current_track().map(stem) else {
        return Err(ShellError::NothingPlaying);
    };
    let raw = if cmd.has_args() {
        cmd.next_arg()?
    } else {
        "1".to_string()
    };
    let count: u32 = match raw.parse() {
        Ok(count) => count,
        Err(_) => {
            shell.player.set_repeats(0)?;
            return Err(ShellError::InvalidNumber(raw));
        }
    };
    shell.player.set_repeats(count)?;
    shell.say(format!(
        "{} will be repeated {} time{}.",
        track,
        count,
        if count == 1 { "" } else { "s" }
    ));
    Ok(())
}

pub fn seek(shell: &mut Shell, cmd: &mut Command) -> ShellResult<()> {
    let seconds = parse_duration(&cmd.next_arg()?)?;
    shell.player.seek(seconds)
}

pub fn forward(shell: &mut Shell, cmd: &mut Command) -> ShellResult<()> {
    let seconds = parse_duration(&cmd.next_arg()?)?;
    shell.player.forward(seconds)
}

pub fn rewind(shell: &mut Shell, cmd: &mut Command) -> ShellResult<()> {
    let seconds = parse_duration(&cmd.next_arg()?)?;
    shell.player.rewind(seconds)
}

pub fn help(shell: &mut Shell, cmd: &mut Command) -> ShellResult<()> {
    if !cmd.has_args() {
        if shell.mode() == Mode::ScriptExecution {
            debug!("Ignoring interactive help inside a script");
            return Ok(());
        }
        shell.enter_help();
        return Ok(());
    }
    let words = cmd.remaining();
    let text = shell.help.lookup(&words)?;
    shell.say(text);
    Ok(())
}

pub fn set_prompt(shell: &mut Shell, cmd: &mut Command) -> ShellResult<()> {
    if cmd.arg_count() != 1 {
        return Err(ShellError::Usage("set-prompt"));
    }
    shell.session.prompt = cmd.next_arg()?;
    Ok(())
}

/// Each script is resolved and run on its own; a failure is reported and
/// the next one still runs.
pub fn run(shell: &mut Shell, cmd: &mut Command) -> ShellResult<()> {
    let mut names = vec![cmd.next_arg()?];
    names.extend(cmd.remaining());
    for name in names {
        if let Err(err) = shell.run_script(&name) {
            shell.report(err);
        }
    }
    Ok(())
}
