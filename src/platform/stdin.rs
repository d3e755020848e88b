//=========================================================================
// Stdin Input
//
// Line-oriented terminal input.
//
// Reading stdin blocks, so a background thread owns it and forwards each
// decoded line over a channel. The game loop then polls that channel with
// a timeout like any other `ChannelInput`. The thread is started on the
// first poll, so building an app (or a test) never touches stdin.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::io::{self, BufRead};
use std::thread;
use std::time::Duration;

use crossbeam_channel::{unbounded, Sender};
use log::{debug, error};

//=== Internal Dependencies ===============================================

use super::event_collector::ChannelInput;
use super::input_processor::InputProcessor;
use crate::core::input::{InputEvent, InputSource};

//=== StdinInput ==========================================================

/// Input source reading lines from standard input.
#[derive(Default)]
pub struct StdinInput {
    channel: Option<ChannelInput>,
}

impl StdinInput {
    /// Creates the source. Nothing is read until the first poll.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true once the reader thread has been started.
    pub fn is_started(&self) -> bool {
        self.channel.is_some()
    }

    fn spawn_reader() -> ChannelInput {
        let (tx, rx) = unbounded();

        let spawned = thread::Builder::new()
            .name("stdin-reader".into())
            .spawn(move || read_lines(io::stdin().lock(), &tx));

        if let Err(e) = spawned {
            // The sender was moved into the closure and dropped with it, so
            // the channel reports `Closed` on the next poll.
            error!("Failed to start stdin reader thread: {}", e);
        }

        ChannelInput::new(rx)
    }
}

impl InputSource for StdinInput {
    fn poll(&mut self, timeout: Duration, max_events: usize, out: &mut Vec<InputEvent>) {
        self.channel
            .get_or_insert_with(Self::spawn_reader)
            .poll(timeout, max_events, out);
    }
}

//=== Reader Loop =========================================================

/// Forwards every line of `reader` until end of input or until the
/// receiving side goes away.
fn read_lines<R: BufRead>(mut reader: R, tx: &Sender<InputEvent>) {
    let mut buffer = String::new();

    loop {
        buffer.clear();
        match reader.read_line(&mut buffer) {
            Ok(0) => {
                debug!("stdin reached end of input");
                break;
            }
            Ok(_) => {
                if tx.send(InputProcessor::process_line(&buffer)).is_err() {
                    // App is gone; nobody is listening anymore.
                    return;
                }
            }
            Err(e) => {
                error!("Failed to read stdin: {}", e);
                break;
            }
        }
    }

    let _ = tx.send(InputEvent::Closed);
}

//=========================================================================
// Unit Tests
//=========================================================================
