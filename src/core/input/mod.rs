//=========================================================================
// Input
//
// Input events as seen by scenes, and the source trait the game loop
// polls once per tick.
//
// Responsibilities:
// - Define `InputEvent` / `KeyCode`
// - Define `InputSource`, the contract every input backend implements
//
// Backends (stdin, channels, scripted batches) live in `platform`.
//
//=========================================================================

//=== Submodules ==========================================================

pub mod event;

//=== External Dependencies ===============================================

use std::time::Duration;

//=== Public API ==========================================================

pub use event::{InputEvent, KeyCode};

//=== InputSource =========================================================

/// Producer of input events, polled by the game loop once per tick.
///
/// Implementations must return within roughly `timeout` and must never
/// block indefinitely. A zero timeout means "only what is already
/// pending".
pub trait InputSource {
    /// Appends at most `max_events` pending events to `out`.
    ///
    /// May wait up to `timeout` for the first event to arrive.
    fn poll(&mut self, timeout: Duration, max_events: usize, out: &mut Vec<InputEvent>);

    /// Hands back whatever polling acquired (such as a raw terminal
    /// mode). Called when a run ends; a later poll may acquire it again.
    fn release(&mut self) {}
}

impl<T: InputSource + ?Sized> InputSource for Box<T> {
    fn poll(&mut self, timeout: Duration, max_events: usize, out: &mut Vec<InputEvent>) {
        (**self).poll(timeout, max_events, out)
    }

    fn release(&mut self) {
        (**self).release()
    }
}
