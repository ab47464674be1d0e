// Input worker: owns the line editor on its own thread and hands lines to
// the dispatch loop one at a time. After each line it waits for an ack that
// carries the next prompt, so it never reads ahead of dispatch.

use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error};

/// Reads lines from the user.
pub trait LineEditor {
    /// `Ok(None)` on end of input.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;
    fn add_history(&mut self, line: &str);
}

pub struct RustylineEditor {
    editor: Editor<(), DefaultHistory>,
}

impl RustylineEditor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            editor: Editor::<(), DefaultHistory>::new()?,
        })
    }
}

impl LineEditor for RustylineEditor {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(Some(line)),
            Err(ReadlineError::Eof) => Ok(None),
            // CTRL-C abandons the current line
            Err(ReadlineError::Interrupted) => Ok(Some(String::new())),
            Err(e) => Err(e.into()),
        }
    }

    fn add_history(&mut self, line: &str) {
        if let Err(e) = self.editor.add_history_entry(line) {
            debug!("Could not add history entry: {}", e);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Line(String),
    EndOfInput,
}

/// Dispatch's answer once a line has been fully handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ack {
    Prompt(String),
    Shutdown,
}

pub struct InputWorker {
    pub events: UnboundedReceiver<InputEvent>,
    pub acks: UnboundedSender<Ack>,
    pub thread: JoinHandle<()>,
}

pub fn spawn<E>(editor: E, prompt: String, running: Arc<AtomicBool>) -> Result<InputWorker>
where
    E: LineEditor + Send + 'static,
{
    let (event_tx, events) = mpsc::unbounded_channel();
    let (acks, ack_rx) = mpsc::unbounded_channel();

    let thread = thread::Builder::new()
        .name("lyre-input".to_string())
        .spawn(move || input_loop(editor, prompt, running, event_tx, ack_rx))?;

    Ok(InputWorker {
        events,
        acks,
        thread,
    })
}

fn input_loop<E: LineEditor>(
    mut editor: E,
    mut prompt: String,
    running: Arc<AtomicBool>,
    events: UnboundedSender<InputEvent>,
    mut acks: UnboundedReceiver<Ack>,
) {
    let mut last_entry: Option<String> = None;

    while running.load(Ordering::SeqCst) {
        let event = match editor.read_line(&prompt) {
            Ok(Some(line)) => {
                if !line.trim().is_empty() && last_entry.as_deref() != Some(line.as_str()) {
                    editor.add_history(&line);
                    last_entry = Some(line.clone());
                }
                InputEvent::Line(line)
            }
            Ok(None) => InputEvent::EndOfInput,
            Err(e) => {
                error!("Line editor failed: {:#}", e);
                InputEvent::EndOfInput
            }
        };

        if events.send(event).is_err() {
            break;
        }
        match acks.blocking_recv() {
            Some(Ack::Prompt(next)) => prompt = next,
            Some(Ack::Shutdown) | None => break,
        }
    }
    debug!("Input worker finished");
}
