//=========================================================================
// Lantern Engine: Library Root
//
// This crate defines the public API surface of the Lantern Engine, a
// small engine for games played in a terminal.
//
// Responsibilities:
// - Expose the game app (`GameApp`) and its builder
// - Expose the scene model (`Scene`, `SceneBase`, `TextScene`) and
//   game objects (`GameObject`, `Entity`, `Component`)
// - Keep terminal plumbing (`platform`) private, re-exporting only the
//   screen and input types games need to configure an app or test it
//
// Typical usage:
// ```no_run
// use lantern_engine::prelude::*;
//
// let mut app = GameApp::new();
// app.push_scene(TitleScene::new())?;
// app.run()?;
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` contains the engine systems (scenes, objects, input model,
// timing, errors). It is public for engine-level extensibility; games
// mostly need the prelude.
//
pub mod core;
pub mod logging;
pub mod prelude;

//--- Internal Modules ----------------------------------------------------
//
// `platform` holds the terminal side (stdin reader thread, screens,
// escape sequence decoding) and is kept private.
//
// `engine` defines the game app and its builder.
//
mod engine;
mod platform;

//--- Public Exports ------------------------------------------------------

pub use engine::{GameApp, GameAppBuilder, INTERRUPTED_MESSAGE};
pub use platform::{ChannelInput, MemoryScreen, RawInput, Screen, ScriptedInput, StdinInput, TerminalScreen};
