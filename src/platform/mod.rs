//=========================================================================
// Platform Subsystem
//
// Terminal-facing side of the engine: where input comes from and where
// rendered text goes.
//
// Architecture:
// ```text
//  Reader Thread:                   Game Loop (caller's thread):
//  ┌──────────────────────────┐    ┌──────────────────────────┐
//  │  stdin.read_line()       │    │  InputSource::poll()     │
//  │   ↓                      │    │   ↓                      │
//  │  InputProcessor          │    │  Scene::handle_input     │
//  │   └─ escape → KeyCode    │    │  Scene::update           │
//  │   ↓                      │    │  Scene::render           │
//  │  Channel ────────────────┼───>│   ↓                      │
//  └──────────────────────────┘    │  Screen (stdout/memory)  │
//                                  └──────────────────────────┘
// ```
//
// Key Design Decisions:
// - **Polling with a timeout**: the loop never blocks on input for longer
//   than the remaining frame budget, so animation keeps running while the
//   player is idle
// - **Lazy reader**: stdin is only touched on the first poll
// - **Opt-in raw mode**: `RawInput` reads single keys through crossterm
//   and falls back to line input when stdin is not a terminal
// - **End of input is an event**: EOF and disconnects surface as
//   `InputEvent::Closed`, which the loop turns into a clean stop
//
//=========================================================================

//=== Submodules ==========================================================

mod event_collector;
mod input_processor;
mod raw;
mod screen;
mod scripted;
mod stdin;

//=== Public API ==========================================================

pub use event_collector::ChannelInput;
pub use raw::RawInput;
pub use screen::{MemoryScreen, Screen, TerminalScreen};
pub use scripted::ScriptedInput;
pub use stdin::StdinInput;
