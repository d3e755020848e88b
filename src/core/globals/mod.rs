//=========================================================================
// App Globals
//=========================================================================
//
// Pieces of the host app that scenes can reach.
//
// Architecture:
//   AppState:     id + running flag (owned by GameApp, shared via Arc)
//   AppHandle:    weak back-reference stored in each attached scene
//   SceneContext: per-hook view (handle + screen + transition queue)
//
//=========================================================================

//=== Module Declarations =================================================

mod app_state;
mod scene_context;

//=== Public API ==========================================================

pub(crate) use app_state::AppState;
pub use app_state::{AppHandle, AppId};
pub use scene_context::SceneContext;
