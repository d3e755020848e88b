//=========================================================================
// App State & Handles
//=========================================================================
//
// Shared run state of a GameApp and the non-owning handle scenes keep
// back to their host.
//
// Architecture:
//   GameApp ──owns──> Arc<AppState { id, running }>
//                         ↑ (weak)
//   Scene ──SceneBase──> AppHandle
//
// The handle never keeps the app alive. Once the app is dropped every
// handle reports `is_alive() == false` and `stop()` becomes a no-op.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

//=== AppId ===============================================================

/// Process-unique identifier of a [`GameApp`](crate::GameApp) instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AppId(u64);

impl AppId {
    fn next() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw numeric value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "app#{}", self.0)
    }
}

//=== AppState ============================================================

/// Run state shared between the app and its handles.
#[derive(Debug)]
pub(crate) struct AppState {
    id: AppId,
    running: AtomicBool,
}

impl AppState {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            id: AppId::next(),
            running: AtomicBool::new(false),
        })
    }

    pub(crate) fn id(&self) -> AppId {
        self.id
    }

    pub(crate) fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub(crate) fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::Release);
    }
}

//=== AppHandle ===========================================================

/// Non-owning handle to a running [`GameApp`](crate::GameApp).
///
/// Scenes receive one when they are attached to an app; it is removed
/// again when they are detached. The handle is `Send + Sync`, so it can
/// also be given to another thread that needs to stop the loop.
#[derive(Clone)]
pub struct AppHandle {
    id: AppId,
    state: Weak<AppState>,
}

impl AppHandle {
    pub(crate) fn new(state: &Arc<AppState>) -> Self {
        Self {
            id: state.id(),
            state: Arc::downgrade(state),
        }
    }

    /// Identifier of the app this handle points to.
    pub fn id(&self) -> AppId {
        self.id
    }

    /// Returns `true` while the app itself still exists.
    pub fn is_alive(&self) -> bool {
        self.state.strong_count() > 0
    }

    /// Returns `true` if the app exists and its loop is running.
    pub fn is_running(&self) -> bool {
        self.state.upgrade().is_some_and(|state| state.is_running())
    }

    /// Asks the app to stop at its next tick boundary.
    ///
    /// Returns `false` if the app no longer exists.
    pub fn stop(&self) -> bool {
        match self.state.upgrade() {
            Some(state) => {
                state.set_running(false);
                true
            }
            None => false,
        }
    }
}

impl PartialEq for AppHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for AppHandle {}

impl fmt::Debug for AppHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppHandle")
            .field("id", &self.id)
            .field("alive", &self.is_alive())
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
