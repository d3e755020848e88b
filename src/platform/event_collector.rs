//=========================================================================
// Event Collector
//=========================================================================
//
// Channel-backed input source with bounded polling and shutdown detection.
//
// Architecture:
//   Sender<InputEvent> ──> Receiver<InputEvent> → poll() → events for this tick
//
// The first event may be waited for (up to the tick's remaining budget);
// everything already queued is then drained without waiting. Draining is
// bounded to prevent one flood of input from starving the tick.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, TryRecvError};
use log::{debug, warn};

//=== Internal Dependencies ===============================================

use crate::core::input::{InputEvent, InputSource};

//=== ChannelInput ========================================================

/// Input source reading from a crossbeam channel.
///
/// When every sender is gone, or a sender passes [`InputEvent::Closed`]
/// itself, the source reports a single `Closed` and stays silent
/// afterwards.
pub struct ChannelInput {
    receiver: Receiver<InputEvent>,
    closed: bool,
}

impl ChannelInput {
    /// Wraps the receiving end of an input channel.
    pub fn new(receiver: Receiver<InputEvent>) -> Self {
        Self {
            receiver,
            closed: false,
        }
    }

    /// Returns true once the channel disconnect has been reported.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn first_event(&self, timeout: Duration) -> Result<Option<InputEvent>, ()> {
        if timeout.is_zero() {
            match self.receiver.try_recv() {
                Ok(event) => Ok(Some(event)),
                Err(TryRecvError::Empty) => Ok(None),
                Err(TryRecvError::Disconnected) => Err(()),
            }
        } else {
            match self.receiver.recv_timeout(timeout) {
                Ok(event) => Ok(Some(event)),
                Err(RecvTimeoutError::Timeout) => Ok(None),
                Err(RecvTimeoutError::Disconnected) => Err(()),
            }
        }
    }

    /// Pushes `event`; returns false once the sender has signalled the end
    /// of input, after which the later disconnect is not reported again.
    fn accept(&mut self, event: InputEvent, out: &mut Vec<InputEvent>) -> bool {
        let closed = event == InputEvent::Closed;
        out.push(event);
        if closed {
            debug!("Input source sent end of input");
            self.closed = true;
        }
        !closed
    }

    fn report_closed(&mut self, out: &mut Vec<InputEvent>) {
        debug!("Input channel disconnected");
        self.closed = true;
        out.push(InputEvent::Closed);
    }
}

impl InputSource for ChannelInput {
    fn poll(&mut self, timeout: Duration, max_events: usize, out: &mut Vec<InputEvent>) {
        if self.closed || max_events == 0 {
            return;
        }

        //--- Wait for at least one event this tick ------------------------
        match self.first_event(timeout) {
            Ok(Some(event)) => {
                if !self.accept(event, out) {
                    return;
                }
            }
            Ok(None) => return,
            Err(()) => return self.report_closed(out),
        }

        //--- Drain additional events queued during this tick -------------
        let mut drained = 1;
        while drained < max_events {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if !self.accept(event, out) {
                        return;
                    }
                    drained += 1;
                }
                Err(TryRecvError::Empty) => return,
                Err(TryRecvError::Disconnected) => return self.report_closed(out),
            }
        }

        if !self.receiver.is_empty() {
            warn!("Input backlog: drained {} events this tick, more pending", drained);
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
