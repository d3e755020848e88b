//=========================================================================
// Scene System
//=========================================================================
//
// Scenes and the stack that decides which one is active.
//
// Architecture:
//   GameApp
//     └─ SceneManager
//          ├─ stack: Vec<Box<dyn Scene>>   (top = active scene)
//          └─ transitions: TransitionQueue (requests made from hooks)
//
// Lifecycle of a scene:
//   not attached ──push──> active ──push other──> covered ──pop other──> active
//        ↑                    │
//        └──────── pop ───────┘   (on_exit, then detached)
//
// Flow per tick:
//   handle_input() → update() → render()   (top scene only)
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;

use log::trace;

//=== Internal Dependencies ===============================================

use crate::core::globals::{AppHandle, SceneContext};
use crate::core::input::InputEvent;
use crate::core::object::{AsAny, GameObject, ObjectId};
use crate::platform::Screen;

//=== Module Declarations =================================================

mod scene_manager;
mod text_scene;
mod transition_queue;

//=== Public API ==========================================================

pub(crate) use scene_manager::SceneManager;
pub use text_scene::{TextGame, TextScene};
pub use transition_queue::{SceneTransition, TransitionQueue};

//=== Scene Trait =========================================================

/// A unit of game state the app can put on its stack.
///
/// Only [`base`](Scene::base) and [`base_mut`](Scene::base_mut) are
/// required. Every hook has a default: lifecycle and input hooks do
/// nothing, `update` and `render` forward to the scene's active objects.
///
/// Hooks receive a [`SceneContext`]. Stack changes requested through it
/// are applied as soon as the hook returns.
///
/// # Minimal Implementation
///
/// ```rust
/// # use lantern_engine::prelude::*;
/// struct Pause(SceneBase);
///
/// impl Scene for Pause {
///     fn base(&self) -> &SceneBase { &self.0 }
///     fn base_mut(&mut self) -> &mut SceneBase { &mut self.0 }
///
///     fn handle_input(&mut self, event: &InputEvent, ctx: &mut SceneContext<'_>) -> bool {
///         if event.as_line() == Some("resume") {
///             ctx.pop_scene();
///         }
///         false
///     }
/// }
/// ```
pub trait Scene: AsAny {
    /// Shared scene state.
    fn base(&self) -> &SceneBase;

    /// Shared scene state, mutably.
    fn base_mut(&mut self) -> &mut SceneBase;

    /// Name used in logs and errors.
    fn name(&self) -> &str {
        self.base().name()
    }

    /// Handle of the app this scene is stacked in, if any.
    fn app(&self) -> Option<&AppHandle> {
        self.base().app()
    }

    /// Called right after the scene was put on the stack.
    fn on_enter(&mut self, _ctx: &mut SceneContext<'_>) {}

    /// Called right after the scene was taken off the stack.
    fn on_exit(&mut self, _ctx: &mut SceneContext<'_>) {}

    /// Handles one input event while this scene is on top.
    ///
    /// Returning `false` skips this tick's `update`. Rendering still
    /// happens.
    fn handle_input(&mut self, _event: &InputEvent, _ctx: &mut SceneContext<'_>) -> bool {
        true
    }

    /// Advances the scene by `dt` seconds.
    fn update(&mut self, dt: f64, _ctx: &mut SceneContext<'_>) {
        self.base_mut().update_objects(dt);
    }

    /// Draws the scene.
    fn render(&mut self, ctx: &mut SceneContext<'_>) {
        self.base().render_objects(ctx.screen());
    }
}

impl fmt::Debug for dyn Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.base(), f)
    }
}

//=== SceneBase ===========================================================

/// State every scene carries: its name, the link to its host app, and the
/// game objects it owns.
pub struct SceneBase {
    name: String,
    app: Option<AppHandle>,
    objects: Vec<(ObjectId, Box<dyn GameObject>)>,
}

impl SceneBase {
    //--- Construction -----------------------------------------------------

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            app: None,
            objects: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    //--- App Link ---------------------------------------------------------

    /// Host app handle. Set exactly while the scene is on a stack.
    pub fn app(&self) -> Option<&AppHandle> {
        self.app.as_ref()
    }

    pub fn is_attached(&self) -> bool {
        self.app.is_some()
    }

    pub(crate) fn attach(&mut self, app: AppHandle) {
        self.app = Some(app);
    }

    pub(crate) fn detach(&mut self) -> Option<AppHandle> {
        self.app.take()
    }

    //--- Object Management ------------------------------------------------

    /// Takes ownership of `object`, notifies it, and returns its new id.
    pub fn add_object<O: GameObject>(&mut self, object: O) -> ObjectId {
        self.add_boxed_object(Box::new(object))
    }

    /// Boxed variant of [`add_object`](Self::add_object).
    pub fn add_boxed_object(&mut self, mut object: Box<dyn GameObject>) -> ObjectId {
        let id = ObjectId::next();
        object.on_added(&self.name);
        trace!("Scene '{}' added {} ({})", self.name, object.name(), id);
        self.objects.push((id, object));
        id
    }

    /// Adds every object in order and returns their ids.
    pub fn add_objects<I>(&mut self, objects: I) -> Vec<ObjectId>
    where
        I: IntoIterator<Item = Box<dyn GameObject>>,
    {
        objects
            .into_iter()
            .map(|object| self.add_boxed_object(object))
            .collect()
    }

    /// Removes an object, notifies it, and hands it back.
    ///
    /// Returns `None` if the scene does not own `id`.
    pub fn remove_object(&mut self, id: ObjectId) -> Option<Box<dyn GameObject>> {
        let index = self.objects.iter().position(|(oid, _)| *oid == id)?;
        let (_, mut object) = self.objects.remove(index);
        object.on_removed(&self.name);
        trace!("Scene '{}' removed {} ({})", self.name, object.name(), id);
        Some(object)
    }

    /// Removes every object, in insertion order.
    pub fn clear_objects(&mut self) {
        for (_, mut object) in self.objects.drain(..) {
            object.on_removed(&self.name);
        }
    }

    pub fn object(&self, id: ObjectId) -> Option<&(dyn GameObject + 'static)> {
        self.objects
            .iter()
            .find(|(oid, _)| *oid == id)
            .map(|(_, object)| object.as_ref())
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut (dyn GameObject + 'static)> {
        match self.objects.iter_mut().find(|(oid, _)| *oid == id) {
            Some((_, object)) => Some(object.as_mut()),
            None => None,
        }
    }

    /// Typed access to an object.
    pub fn object_as<O: GameObject>(&self, id: ObjectId) -> Option<&O> {
        self.object(id)?.as_any().downcast_ref::<O>()
    }

    /// Typed mutable access to an object.
    pub fn object_as_mut<O: GameObject>(&mut self, id: ObjectId) -> Option<&mut O> {
        self.object_mut(id)?.as_any_mut().downcast_mut::<O>()
    }

    /// Owned objects in insertion order.
    pub fn objects(&self) -> impl Iterator<Item = (ObjectId, &(dyn GameObject + 'static))> {
        self.objects
            .iter()
            .map(|(id, object)| (*id, object.as_ref()))
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    //--- Per-Tick Forwarding ----------------------------------------------

    /// Updates every active object in insertion order.
    pub fn update_objects(&mut self, dt: f64) {
        for (_, object) in &mut self.objects {
            if object.is_active() {
                object.update(dt);
            }
        }
    }

    /// Renders every active object in insertion order.
    pub fn render_objects(&self, screen: &mut dyn Screen) {
        for (_, object) in &self.objects {
            if object.is_active() {
                object.render(screen);
            }
        }
    }
}

impl fmt::Debug for SceneBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneBase")
            .field("name", &self.name)
            .field("app", &self.app.as_ref().map(AppHandle::id))
            .field("objects", &self.objects.len())
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
