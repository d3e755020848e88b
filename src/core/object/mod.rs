//=========================================================================
// Game Objects
//=========================================================================
//
// Entities that live inside a single scene and take part in its
// update/render flow.
//
// Ownership:
//   SceneBase ──owns──> Box<dyn GameObject> (one scene only)
//   Entity    ──owns──> ComponentStore ──> Box<dyn Component> per type
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

//=== Internal Dependencies ===============================================

use crate::platform::Screen;

//=== Module Declarations =================================================

mod component_store;
mod entity;

//=== Public API ==========================================================

pub use component_store::{Component, ComponentStore};
pub use entity::Entity;

//=== ObjectId ============================================================

/// Process-unique identity of a game object inside its scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u64);

impl ObjectId {
    pub(crate) fn next() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw numeric value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "object#{}", self.0)
    }
}

//=== AsAny ===============================================================

/// Downcasting support for boxed trait objects.
///
/// Implemented automatically for every `'static` type.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

//=== GameObject ==========================================================

/// Something a scene updates and renders every tick.
///
/// All hooks default to no-ops; implement the ones the object needs.
/// Inactive objects stay in their scene but are skipped by the default
/// scene update/render.
pub trait GameObject: AsAny {
    /// Display name, used in logs.
    fn name(&self) -> &str {
        "GameObject"
    }

    /// Whether the owning scene should update and render this object.
    fn is_active(&self) -> bool {
        true
    }

    /// Called right after the object was added to the scene named `scene`.
    fn on_added(&mut self, _scene: &str) {}

    /// Called right after the object was removed from the scene named `scene`.
    fn on_removed(&mut self, _scene: &str) {}

    /// Advances the object by `dt` seconds.
    fn update(&mut self, _dt: f64) {}

    /// Draws the object.
    fn render(&self, _screen: &mut dyn Screen) {}
}

//=========================================================================
// Unit Tests
//=========================================================================
