//=========================================================================
// Component Store
//=========================================================================
//
// Type-keyed storage for entity components.
//
// Architecture:
//   add(C) ──> HashMap<TypeId, Box<dyn Component>> ──> get::<C>() / remove::<C>()
//                                         ↓
//                      downcast through AsAny on the way out
//
// At most one component per concrete type; adding a second one replaces
// the first.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::TypeId;
use std::collections::HashMap;

//=== Internal Dependencies ===============================================

use super::AsAny;

//=== Component ===========================================================

/// Behavior attached to an [`Entity`](super::Entity).
pub trait Component: AsAny {
    /// The owning entity was attached to the scene named `scene`.
    fn on_added_to_scene(&mut self, _scene: &str) {}

    /// The owning entity was detached from its scene.
    fn on_removed_from_scene(&mut self) {}

    /// Advances the component by `dt` seconds.
    fn update(&mut self, _dt: f64) {}
}

//=== ComponentStore ======================================================

/// Components of one entity, keyed by concrete type.
#[derive(Default)]
pub struct ComponentStore {
    components: HashMap<TypeId, Box<dyn Component>>,
}

impl ComponentStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            components: HashMap::new(),
        }
    }

    //--- Storage ----------------------------------------------------------

    /// Stores `component`, returning the previous one of the same type.
    pub fn insert<C: Component>(&mut self, component: C) -> Option<C> {
        self.components
            .insert(TypeId::of::<C>(), Box::new(component))
            .and_then(|old| old.into_any().downcast::<C>().ok())
            .map(|old| *old)
    }

    /// Removes and returns the component of type `C`.
    pub fn remove<C: Component>(&mut self) -> Option<C> {
        self.components
            .remove(&TypeId::of::<C>())
            .and_then(|boxed| boxed.into_any().downcast::<C>().ok())
            .map(|boxed| *boxed)
    }

    //--- Query API --------------------------------------------------------

    /// Returns the component of type `C`, if any.
    pub fn get<C: Component>(&self) -> Option<&C> {
        self.components
            .get(&TypeId::of::<C>())
            .and_then(|boxed| (**boxed).as_any().downcast_ref::<C>())
    }

    /// Returns the component of type `C` mutably, if any.
    pub fn get_mut<C: Component>(&mut self) -> Option<&mut C> {
        self.components
            .get_mut(&TypeId::of::<C>())
            .and_then(|boxed| (**boxed).as_any_mut().downcast_mut::<C>())
    }

    /// Returns true if a component of type `C` is stored.
    pub fn contains<C: Component>(&self) -> bool {
        self.components.contains_key(&TypeId::of::<C>())
    }

    /// Number of stored components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns true if no components are stored.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Iterates over all components mutably, in no particular order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut (dyn Component + 'static)> {
        self.components.values_mut().map(|boxed| &mut **boxed)
    }
}

//=========================================================================
// Tests
//=========================================================================
