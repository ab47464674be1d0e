// lyre - a command-driven music shell
// Loads the settings, opens the audio device, runs startup scripts, then
// hands the terminal over to the interactive loop.

use anyhow::{Context, Result};
use clap::Parser;
use lyre::shell::script::ensure_startup_script;
use lyre::{AudioEngine, Catalog, Config, DurationCache, Player, Runtime, Shell};
use lyre::runtime::RustylineEditor;
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lyre")]
#[command(about = "An interactive, command-driven music player for the terminal")]
struct Args {
    /// Scripts to run after the startup script, by name or path
    scripts: Vec<String>,

    /// Enable developer logging (debug output for everything)
    #[arg(long)]
    dev: bool,

    /// Read settings from this file instead of the default location
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn init_logging(dev: bool) -> Result<WorkerGuard> {
    let log_dir = dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("lyre")
        .join("logs");
    std::fs::create_dir_all(&log_dir)?;

    // Daily rotating file appender; the terminal belongs to the prompt
    let file_appender = tracing_appender::rolling::daily(&log_dir, "lyre.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let default_filter = if dev { "debug" } else { "info,lyre=debug" };
    let base_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let subscriber = tracing_subscriber::fmt()
        .with_writer(file_writer)
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .with_env_filter(base_filter)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    Ok(guard)
}

#[cfg(feature = "audio")]
fn open_engine(config: &Config) -> Result<Box<dyn AudioEngine>> {
    let engine = lyre::audio::RodioEngine::new(config.audio.clone())
        .context("Could not open the audio output device")?;
    Ok(Box::new(engine))
}

#[cfg(not(feature = "audio"))]
fn open_engine(_config: &Config) -> Result<Box<dyn AudioEngine>> {
    anyhow::bail!("lyre was built without the `audio` feature, nothing can play")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let _guard = init_logging(args.dev)?;
    info!("lyre starting");

    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    config.create_dirs()?;
    ensure_startup_script(&config.script_dir).with_context(|| {
        format!("Could not create the startup script in {}", config.script_dir.display())
    })?;

    let catalog = Catalog::scan(
        config.music_dir.clone(),
        config.playlist_dir.clone(),
        config.script_dir.clone(),
    )
    .into_shared();
    let durations = DurationCache::load(config.cache_path.clone(), config.cache.capacity)
        .with_context(|| format!("Could not read {}", config.cache_path.display()))?;

    let player = Player::new(open_engine(&config)?, config.runtime.end_threshold());
    let mut shell = Shell::new(player, durations, catalog, config.prompt.clone());

    if let Err(err) = shell.run_startup() {
        shell.report(err);
    }
    for script in &args.scripts {
        if !shell.is_running() {
            break;
        }
        if let Err(err) = shell.run_script_arg(script) {
            shell.report(err);
        }
    }

    if shell.is_running() {
        let editor = RustylineEditor::new()?;
        if let Err(e) = Runtime::new(&config.runtime).run(&mut shell, editor).await {
            error!("Interactive loop failed: {:#}", e);
        }
    }

    match shell.durations.save() {
        Ok(saved) => info!("Saved {} cached durations", saved),
        Err(e) => warn!("Could not save duration cache: {}", e),
    }
    info!("lyre shutting down");
    Ok(())
}
