//=========================================================================
// Entity
//=========================================================================
//
// Game object built from components.
//
// Scene attachment is tracked by scene name. Components are notified
// whenever the entity joins or leaves a scene, and when they are added
// to or removed from an entity that is already attached.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::trace;

//=== Internal Dependencies ===============================================

use super::{Component, ComponentStore, GameObject};

//=== Entity ==============================================================

/// A [`GameObject`] composed of at most one [`Component`] per type.
pub struct Entity {
    name: String,
    active: bool,
    scene: Option<String>,
    components: ComponentStore,
}

impl Entity {
    /// Creates an active, unattached entity without components.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            active: true,
            scene: None,
            components: ComponentStore::new(),
        }
    }

    //--- State ------------------------------------------------------------

    /// Name of the scene this entity is attached to.
    pub fn scene(&self) -> Option<&str> {
        self.scene.as_deref()
    }

    /// Enables or disables the entity without removing it from its scene.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    //--- Components -------------------------------------------------------

    /// Adds `component`, replacing (and returning) one of the same type.
    pub fn add_component<C: Component>(&mut self, mut component: C) -> Option<C> {
        if let Some(scene) = &self.scene {
            component.on_added_to_scene(scene);
        }

        let mut previous = self.components.insert(component);
        if self.scene.is_some() {
            if let Some(old) = previous.as_mut() {
                old.on_removed_from_scene();
            }
        }
        previous
    }

    /// Removes and returns the component of type `C`.
    pub fn remove_component<C: Component>(&mut self) -> Option<C> {
        let mut component = self.components.remove::<C>()?;
        if self.scene.is_some() {
            component.on_removed_from_scene();
        }
        Some(component)
    }

    /// Returns true if a component of type `C` is attached.
    pub fn has_component<C: Component>(&self) -> bool {
        self.components.contains::<C>()
    }

    /// Returns the component of type `C`.
    pub fn get_component<C: Component>(&self) -> Option<&C> {
        self.components.get::<C>()
    }

    /// Returns the component of type `C` mutably.
    pub fn get_component_mut<C: Component>(&mut self) -> Option<&mut C> {
        self.components.get_mut::<C>()
    }

    /// Number of attached components.
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    //--- Scene Attachment -------------------------------------------------

    /// Attaches the entity to `scene` and notifies all components.
    ///
    /// Attaching to the scene it already belongs to does nothing.
    pub fn attach_to_scene(&mut self, scene: &str) {
        if self.scene.as_deref() == Some(scene) {
            return;
        }

        trace!("Entity '{}' attached to scene '{}'", self.name, scene);
        self.scene = Some(scene.to_string());
        for component in self.components.iter_mut() {
            component.on_added_to_scene(scene);
        }
    }

    /// Detaches the entity from its scene and notifies all components.
    ///
    /// Does nothing if the entity is not attached.
    pub fn detach_from_scene(&mut self) {
        if self.scene.is_none() {
            return;
        }

        trace!("Entity '{}' detached from its scene", self.name);
        for component in self.components.iter_mut() {
            component.on_removed_from_scene();
        }
        self.scene = None;
    }
}

//--- GameObject ----------------------------------------------------------

impl GameObject for Entity {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn on_added(&mut self, scene: &str) {
        self.attach_to_scene(scene);
    }

    fn on_removed(&mut self, _scene: &str) {
        self.detach_from_scene();
    }

    fn update(&mut self, dt: f64) {
        for component in self.components.iter_mut() {
            component.update(dt);
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
