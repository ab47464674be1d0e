// `playlist` (and its alias `queue`) with its sub-commands.

use super::{Command, Registry};
use crate::error::{ShellError, ShellResult};
use crate::library::{self, stem, CatalogKind};
use crate::matcher;
use crate::player::time::format_timestamp;
use crate::shell::Shell;
use tracing::{debug, info};

pub fn registry() -> Registry {
    Registry::new()
        .with("add", add)
        .with("clear", clear)
        .with("load", load)
        .with("loop", toggle_loop)
        .with("next", next)
        .with("play", play)
        .with("previous", previous)
        .with("remove", remove)
        .with("save", save)
        .with("shuffle", shuffle)
        .with("status", status)
}

/// Without a sub-command, shows the playlist in play order.
pub fn playlist(shell: &mut Shell, cmd: &mut Command) -> ShellResult<()> {
    if !cmd.has_args() {
        show(shell);
        return Ok(());
    }
    cmd.shift()?;
    shell.run_playlist_command(cmd)
}

fn show(shell: &mut Shell) {
    let lines: Vec<String> = {
        let playlist = shell.player.playlist();
        if playlist.is_empty() {
            vec![ShellError::PlaylistEmpty.to_string()]
        } else {
            playlist
                .active()
                .iter()
                .enumerate()
                .map(|(i, track)| format!("{}. {}", i + 1, stem(track)))
                .collect()
        }
    };
    for line in lines {
        shell.say(line);
    }
}

fn single_arg(cmd: &mut Command, usage: &'static str) -> ShellResult<String> {
    if cmd.arg_count() != 1 {
        return Err(ShellError::Usage(usage));
    }
    cmd.next_arg()
}

fn add(shell: &mut Shell, cmd: &mut Command) -> ShellResult<()> {
    let query = single_arg(cmd, "playlist")?;
    let (dir, song) = {
        let catalog = shell.catalog();
        (catalog.music_dir.clone(), catalog.resolve_song(&query)?)
    };
    if !shell.player.playlist_mut().add(song.clone()) {
        return Err(ShellError::AlreadyInPlaylist(stem(&song)));
    }
    shell.durations.ensure(&song, &dir, shell.player.engine());
    shell.say(format!("Added {}.", stem(&song)));
    Ok(())
}

fn remove(shell: &mut Shell, cmd: &mut Command) -> ShellResult<()> {
    let query = single_arg(cmd, "playlist")?;
    let song = {
        let tracks = shell.player.playlist().tracks();
        if tracks.iter().any(|t| *t == query) {
            query.clone()
        } else {
            matcher::resolve(tracks, &query)
                .into_result(|| ShellError::SongNotFound(query.clone()), stem)?
        }
    };
    shell.player.playlist_mut().remove(&song);
    shell.say(format!("Removed {}.", stem(&song)));
    Ok(())
}

fn clear(shell: &mut Shell, _cmd: &mut Command) -> ShellResult<()> {
    shell.player.playlist_mut().clear();
    shell.say("Playlist cleared.");
    Ok(())
}

fn load(shell: &mut Shell, cmd: &mut Command) -> ShellResult<()> {
    let query = single_arg(cmd, "playlist")?;
    let (file, entries) = {
        let catalog = shell.catalog();
        let file = catalog.resolve_playlist(&query)?;
        let entries = library::PlaylistStore::new(catalog.playlist_dir.clone()).load(&file)?;
        (file, entries)
    };

    let dir = shell.music_dir();
    let mut tracks = Vec::with_capacity(entries.len());
    for entry in entries {
        let known = shell.catalog().has_song(&entry);
        if !known {
            shell.say(format!("Song not found: {}", entry));
            continue;
        }
        if tracks.contains(&entry) {
            debug!("Skipping duplicate {} in {}", entry, file);
            continue;
        }
        shell.durations.ensure(&entry, &dir, shell.player.engine());
        tracks.push(entry);
    }

    let count = tracks.len();
    shell.player.playlist_mut().replace(tracks);
    info!("Loaded playlist {} ({} tracks)", file, count);
    shell.say(format!(
        "Loaded {} song{} from {}.",
        count,
        if count == 1 { "" } else { "s" },
        stem(&file)
    ));
    Ok(())
}

fn save(shell: &mut Shell, cmd: &mut Command) -> ShellResult<()> {
    let raw = single_arg(cmd, "playlist")?;
    let overwrite = raw.ends_with('!');
    let name = raw.trim_end_matches('!');
    if name.is_empty() {
        return Err(ShellError::Usage("playlist"));
    }

    let tracks = shell.player.playlist().tracks().to_vec();
    let path = shell.playlist_store().save(name, &tracks, overwrite)?;
    library::write(&shell.catalog).refresh(CatalogKind::Playlists);
    shell.say(format!("Saved playlist to {}.", path.display()));
    Ok(())
}

fn toggle_loop(shell: &mut Shell, _cmd: &mut Command) -> ShellResult<()> {
    let playlist = shell.player.playlist_mut();
    playlist.is_looping = !playlist.is_looping;
    let looping = playlist.is_looping;
    shell.say(format!("Playlist looping: {}.", if looping { "enabled" } else { "disabled" }));
    Ok(())
}

fn shuffle(shell: &mut Shell, _cmd: &mut Command) -> ShellResult<()> {
    let shuffled = shell.player.toggle_shuffle();
    shell.say(format!("Shuffle: {}.", if shuffled { "enabled" } else { "disabled" }));
    Ok(())
}

fn play(shell: &mut Shell, _cmd: &mut Command) -> ShellResult<()> {
    let dir = shell.music_dir();
    let track = shell.player.playlist_advance(&dir)?;
    shell.say(format!("Playing {}.", stem(&track)));
    Ok(())
}

fn next(shell: &mut Shell, _cmd: &mut Command) -> ShellResult<()> {
    let dir = shell.music_dir();
    let track = shell.player.next(&dir)?;
    shell.say(format!("Playing {}.", stem(&track)));
    Ok(())
}

fn previous(shell: &mut Shell, _cmd: &mut Command) -> ShellResult<()> {
    let dir = shell.music_dir();
    let track = shell.player.previous(&dir)?;
    shell.say(format!("Playing {}.", stem(&track)));
    Ok(())
}

/// Where playback is in the playlist. Songs without a known duration count
/// as zero towards the totals.
fn status(shell: &mut Shell, _cmd: &mut Command) -> ShellResult<()> {
    if !shell.player.in_playlist_mode() {
        return Err(ShellError::NotInPlaylistMode);
    }
    let dir = shell.music_dir();
    let active = shell.player.playlist().active().to_vec();
    let index = shell.player.playlist().index;
    let looping = shell.player.playlist().is_looping;

    let mut lengths = Vec::with_capacity(active.len());
    for track in &active {
        lengths.push(shell.durations.ensure(track, &dir, shell.player.engine()).unwrap_or(0));
    }

    let name_at = |i: Option<usize>| {
        i.and_then(|i| active.get(i))
            .map(|t| stem(t))
            .unwrap_or_else(|| "N/A".to_string())
    };
    let previous = name_at(index.checked_sub(2));
    let upcoming = if index < active.len() {
        Some(index)
    } else if looping {
        Some(0)
    } else {
        None
    };
    let next = name_at(upcoming);
    let current = name_at(index.checked_sub(1));

    let (offset, _) = shell.player.position().unwrap_or((0, 0));
    let total: u64 = lengths.iter().sum();
    let elapsed: u64 = lengths.iter().take(index.saturating_sub(1)).sum::<u64>() + offset;
    let percent = if total > 0 {
        elapsed as f64 / total as f64 * 100.0
    } else {
        0.0
    };

    shell.say(format!("Previous song: {}, next song: {}", previous, next));
    shell.say(format!("Currently playing {} ({}/{})", current, index, active.len()));
    shell.say(format!("Total length of playlist: {}", format_timestamp(total)));
    shell.say(format!(
        "Total time elapsed: {} ({:.1}%)",
        format_timestamp(elapsed),
        percent
    ));
    Ok(())
}
