//=========================================================================
// Core Systems
//
// Everything the game loop drives, independent of where input comes from
// or where output goes.
//
// Responsibilities:
// - Scene trait, scene stack and deferred stack transitions
// - Game objects and component-based entities owned by scenes
// - Input event model and the input source contract
// - Frame timing (clamped delta)
// - Shared run state and the per-hook scene context
// - Error types
//
// Notes:
// Everything here runs on the thread that called `GameApp::run`. The only
// state shared across threads is the app's `running` flag, reached
// through `AppHandle`.
//
//=========================================================================

//=== Internal Modules ====================================================

pub mod error;
pub mod globals;
pub mod input;
pub mod object;
pub mod scene;
pub mod time;

//=== TickControl =========================================================
//
// Outcome of a single loop iteration: keep ticking or leave the loop.
//
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickControl {
    Continue,
    Exit,
}
