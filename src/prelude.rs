//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use lantern_engine::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Engine core
pub use crate::engine::{GameApp, GameAppBuilder};
pub use crate::core::TickControl;

// Errors
pub use crate::core::error::{EngineError, EngineResult, SceneError};

// App handles and hook context
pub use crate::core::globals::{AppHandle, AppId, SceneContext};

// Input
pub use crate::core::input::{InputEvent, InputSource, KeyCode};

// Scene system
pub use crate::core::scene::{Scene, SceneBase, TextGame, TextScene};

// Game objects
pub use crate::core::object::{Component, Entity, GameObject, ObjectId};

// Terminal I/O
pub use crate::platform::{MemoryScreen, Screen, ScriptedInput, TerminalScreen};
