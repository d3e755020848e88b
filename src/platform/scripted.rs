//=========================================================================
// Scripted Input
//
// Deterministic input for tests and demos: one batch of events per tick.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::VecDeque;
use std::time::Duration;

//=== Internal Dependencies ===============================================

use crate::core::input::{InputEvent, InputSource};

//=== ScriptedInput =======================================================

/// Input source replaying prepared batches, one batch per poll.
///
/// Once every batch has been delivered the source yields nothing. It never
/// waits, regardless of the timeout passed to `poll`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    batches: VecDeque<Vec<InputEvent>>,
}

impl ScriptedInput {
    /// Source that never produces events.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Source replaying `batches` in order.
    pub fn new<I>(batches: I) -> Self
    where
        I: IntoIterator<Item = Vec<InputEvent>>,
    {
        Self {
            batches: batches.into_iter().collect(),
        }
    }

    /// Source delivering one text line per tick.
    pub fn lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(lines.into_iter().map(|line| vec![InputEvent::line(line)]))
    }

    /// Appends a batch delivered after all existing ones.
    pub fn then(mut self, batch: Vec<InputEvent>) -> Self {
        self.batches.push_back(batch);
        self
    }

    /// Appends a tick without input.
    pub fn then_idle(self) -> Self {
        self.then(Vec::new())
    }

    /// Number of batches not yet delivered.
    pub fn remaining(&self) -> usize {
        self.batches.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.batches.is_empty()
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self, _timeout: Duration, max_events: usize, out: &mut Vec<InputEvent>) {
        let Some(mut batch) = self.batches.pop_front() else {
            return;
        };

        if batch.len() > max_events {
            // Deliver the overflow on the next tick, like a real backlog.
            let rest = batch.split_off(max_events);
            self.batches.push_front(rest);
        }

        out.extend(batch);
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
