// The interactive loop. Dispatch runs on the calling task and owns the
// shell; input lives on its own thread and the watcher on a detached task.
// A line is fully executed before the input thread is allowed to prompt again.

pub mod input;
pub mod watcher;

pub use input::{LineEditor, RustylineEditor};

use crate::config::RuntimeConfig;
use crate::shell::Shell;
use anyhow::Result;
use input::{Ack, InputEvent};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

pub struct Runtime {
    tick: Duration,
    watch_interval: Duration,
}

impl Runtime {
    pub fn new(config: &RuntimeConfig) -> Self {
        Self {
            tick: config.tick(),
            watch_interval: config.watch_interval(),
        }
    }

    pub fn with_intervals(tick: Duration, watch_interval: Duration) -> Self {
        Self {
            tick,
            watch_interval,
        }
    }

    /// Run until the shell stops: `exit`, or end of input outside help mode.
    pub async fn run<E>(&self, shell: &mut Shell, editor: E) -> Result<()>
    where
        E: LineEditor + Send + 'static,
    {
        let running = shell.running_flag();
        watcher::spawn(Arc::clone(&shell.catalog), Arc::clone(&running), self.watch_interval);

        let mut worker = input::spawn(editor, shell.prompt(), Arc::clone(&running))?;
        let mut ticker = time::interval(self.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!("Interactive loop started");

        while shell.is_running() {
            tokio::select! {
                biased;

                _ = ticker.tick() => {
                    shell.tick();
                }
                event = worker.events.recv() => {
                    // completion is checked before every line, not only on idle ticks
                    shell.tick();
                    let keep_reading = match event {
                        Some(InputEvent::Line(line)) => {
                            shell.execute_line(&line);
                            shell.is_running()
                        }
                        Some(InputEvent::EndOfInput) => shell.end_of_input(),
                        None => {
                            warn!("Input worker went away");
                            shell.request_exit();
                            false
                        }
                    };
                    let ack = if keep_reading {
                        Ack::Prompt(shell.prompt())
                    } else {
                        Ack::Shutdown
                    };
                    if worker.acks.send(ack).is_err() {
                        debug!("Input worker already gone");
                    }
                }
            }
        }

        // the input thread is parked on its ack at this point
        let _ = worker.acks.send(Ack::Shutdown);
        if worker.thread.join().is_err() {
            warn!("Input thread panicked");
        }
        info!("Interactive loop finished");
        Ok(())
    }
}
