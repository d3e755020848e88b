//=========================================================================
// Engine Errors
//=========================================================================
//
// Two families:
// - SceneError:  stack-discipline violations (caller bugs)
// - EngineError: everything that can end `GameApp::run` abnormally
//
// An empty stack after a pop is not an error; it is how the loop ends.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::io;

use thiserror::Error;

//=== Internal Dependencies ===============================================

use crate::core::globals::AppId;

//=== SceneError ==========================================================

/// Violation of the scene stack rules.
///
/// These signal a bug in the calling code. The operation that fails
/// changes nothing itself. When it was queued by a scene hook, transitions
/// applied before it (including the operation whose hook queued it) stay
/// in effect and the rest of the queue is dropped.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SceneError {
    /// `pop_scene` / `replace_scene` with nothing on the stack.
    #[error("{operation}: the scene stack is empty")]
    EmptyStack { operation: &'static str },

    /// The scene already belongs to a stack.
    #[error("{operation}: scene '{scene}' is already attached to {app}")]
    AlreadyAttached {
        operation: &'static str,
        scene: String,
        app: AppId,
    },
}

//=== EngineError =========================================================

/// Failure surfaced by [`GameApp::run`](crate::GameApp::run) or
/// [`GameApp::tick`](crate::GameApp::tick).
#[derive(Debug, Error)]
pub enum EngineError {
    /// `run` was called before any scene was pushed.
    #[error("no scenes have been pushed onto the app")]
    NoScenes,

    /// A stack operation requested by a scene was invalid.
    #[error(transparent)]
    Scene(#[from] SceneError),

    /// The output sink failed.
    #[error("screen output failed: {0}")]
    Screen(#[from] io::Error),
}

/// Result alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::globals::AppState;

    #[test]
    fn empty_stack_message_names_operation() {
        let err = SceneError::EmptyStack { operation: "pop_scene" };
        assert_eq!(err.to_string(), "pop_scene: the scene stack is empty");
    }

    #[test]
    fn already_attached_message_names_scene_and_app() {
        let state = AppState::new();
        let err = SceneError::AlreadyAttached {
            operation: "push_scene",
            scene: "Menu".to_string(),
            app: state.id(),
        };

        let message = err.to_string();
        assert!(message.starts_with("push_scene: scene 'Menu' is already attached to app#"));
    }

    #[test]
    fn scene_error_converts_transparently() {
        let err: EngineError = SceneError::EmptyStack { operation: "pop_scene" }.into();
        assert!(matches!(err, EngineError::Scene(_)));
        assert_eq!(err.to_string(), "pop_scene: the scene stack is empty");
    }

    #[test]
    fn io_error_converts_to_screen_error() {
        let err: EngineError = io::Error::new(io::ErrorKind::BrokenPipe, "closed").into();
        assert_eq!(err.to_string(), "screen output failed: closed");
    }
}
