// Commands that change the music library on disk or where it is read from.

use super::Command;
use crate::config::expand_home;
use crate::error::{ShellError, ShellResult};
use crate::library::{self, stem, CatalogKind};
use crate::shell::Shell;
use std::fs;
use std::path::Path;
use tracing::info;

/// `rename old new [old new ...]`. Each pair is handled on its own.
pub fn rename(shell: &mut Shell, cmd: &mut Command) -> ShellResult<()> {
    if cmd.arg_count() == 0 || cmd.arg_count() % 2 != 0 {
        return Err(ShellError::Usage("rename"));
    }
    while cmd.has_args() {
        let old = cmd.next_arg()?;
        let new = cmd.next_arg()?;
        if let Err(err) = rename_song(shell, &old, &new) {
            shell.report(err);
        }
    }
    Ok(())
}

fn rename_song(shell: &mut Shell, query: &str, new_stem: &str) -> ShellResult<()> {
    if !valid_stem(new_stem) {
        return Err(ShellError::InvalidName(new_stem.to_string()));
    }
    let (dir, old) = {
        let catalog = shell.catalog();
        (catalog.music_dir.clone(), catalog.resolve_song(query)?)
    };
    let new = match Path::new(&old).extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}.{}", new_stem, ext),
        None => new_stem.to_string(),
    };
    if new == old {
        return Ok(());
    }

    let target = dir.join(&new);
    if target.exists() {
        return Err(ShellError::TargetExists(target));
    }
    fs::rename(dir.join(&old), &target)?;

    shell.durations.rename(&old, &new);
    shell.player.rename_track(&old, &new);
    let rewritten = shell.playlist_store().rewrite_all(|tracks| {
        let mut changed = false;
        for track in tracks.iter_mut().filter(|t| **t == old) {
            *track = new.clone();
            changed = true;
        }
        changed
    })?;
    library::write(&shell.catalog).refresh(CatalogKind::Songs);

    info!("Renamed {} to {} ({} playlists updated)", old, new, rewritten);
    shell.say(format!("Renamed {} to {}.", stem(&old), stem(&new)));
    Ok(())
}

// a bare file name: renames never leave the music directory
fn valid_stem(stem: &str) -> bool {
    !stem.trim().is_empty()
        && stem != "."
        && stem != ".."
        && !stem.contains(['/', '\\'])
        && !stem.contains(std::path::MAIN_SEPARATOR)
}

pub fn delete(shell: &mut Shell, cmd: &mut Command) -> ShellResult<()> {
    let mut queries = vec![cmd.next_arg()?];
    queries.extend(cmd.remaining());
    for query in queries {
        if let Err(err) = delete_song(shell, &query) {
            shell.report(err);
        }
    }
    Ok(())
}

fn delete_song(shell: &mut Shell, query: &str) -> ShellResult<()> {
    let (dir, song) = {
        let catalog = shell.catalog();
        (catalog.music_dir.clone(), catalog.resolve_song(query)?)
    };
    fs::remove_file(dir.join(&song))?;

    shell.durations.remove(&song);
    shell.player.forget_track(&song);
    let rewritten = shell.playlist_store().rewrite_all(|tracks| {
        let before = tracks.len();
        tracks.retain(|t| *t != song);
        tracks.len() != before
    })?;
    library::write(&shell.catalog).refresh(CatalogKind::Songs);

    info!("Deleted {} ({} playlists updated)", song, rewritten);
    shell.say(format!("Deleted {}.", stem(&song)));
    Ok(())
}

pub fn set_music(shell: &mut Shell, cmd: &mut Command) -> ShellResult<()> {
    set_dir(shell, cmd, CatalogKind::Songs, "set-music")
}

pub fn set_playlist(shell: &mut Shell, cmd: &mut Command) -> ShellResult<()> {
    set_dir(shell, cmd, CatalogKind::Playlists, "set-playlist")
}

fn set_dir(
    shell: &mut Shell,
    cmd: &mut Command,
    kind: CatalogKind,
    usage: &'static str,
) -> ShellResult<()> {
    let label = match kind {
        CatalogKind::Songs => "Music",
        CatalogKind::Playlists => "Playlist",
        CatalogKind::Scripts => "Script",
    };
    match cmd.arg_count() {
        0 => {
            let dir = shell.catalog().dir(kind).display().to_string();
            shell.say(format!("{} directory: {}", label, dir));
            Ok(())
        }
        1 => {
            let dir = expand_home(&cmd.next_arg()?);
            library::write(&shell.catalog).set_dir(kind, dir.clone())?;
            info!("{} directory set to {}", label, dir.display());
            shell.say(format!("{} directory set to {}.", label, dir.display()));
            Ok(())
        }
        _ => Err(ShellError::Usage(usage)),
    }
}
