//=========================================================================
// Transition Queue
//=========================================================================
//
// Queue for scene stack changes requested from inside scene hooks.
//
// Scenes queue transitions here while a hook runs. The scene manager
// drains the queue as soon as that hook returns, so the scene whose hook
// is executing is never removed from under itself.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;

//=== Internal Dependencies ===============================================

use super::Scene;

//=== Scene Transition ====================================================

/// A deferred scene stack operation.
pub enum SceneTransition {
    /// Attach a scene and put it on top of the stack.
    Push(Box<dyn Scene>),

    /// Detach the top scene.
    Pop,

    /// Detach the top scene, then attach the given one in its place.
    Replace(Box<dyn Scene>),

    /// Detach every scene, top to bottom.
    Clear,
}

impl SceneTransition {
    /// Short operation name used in logs and diagnostics.
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Push(_) => "push_scene",
            Self::Pop => "pop_scene",
            Self::Replace(_) => "replace_scene",
            Self::Clear => "clear_scenes",
        }
    }
}

impl fmt::Debug for SceneTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Push(scene) => f.debug_tuple("Push").field(&scene.name()).finish(),
            Self::Pop => f.write_str("Pop"),
            Self::Replace(scene) => f.debug_tuple("Replace").field(&scene.name()).finish(),
            Self::Clear => f.write_str("Clear"),
        }
    }
}

//=== Transition Queue ====================================================

/// FIFO of pending [`SceneTransition`]s.
#[derive(Debug, Default)]
pub struct TransitionQueue {
    queue: Vec<SceneTransition>,
}

impl TransitionQueue {
    /// Creates a new empty transition queue.
    pub fn new() -> Self {
        Self { queue: Vec::new() }
    }

    /// Queues a transition to be applied at the next hook boundary.
    pub fn push(&mut self, transition: SceneTransition) {
        self.queue.push(transition);
    }

    /// Returns an iterator over the queued transitions.
    pub fn iter(&self) -> impl Iterator<Item = &SceneTransition> {
        self.queue.iter()
    }

    /// Returns true if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Returns the number of queued transitions.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Drops all queued transitions.
    pub fn clear(&mut self) {
        self.queue.clear()
    }

    /// Takes all transitions from the queue, leaving it empty.
    pub fn take(&mut self) -> Vec<SceneTransition> {
        std::mem::take(&mut self.queue)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scene::SceneBase;

    struct Named(SceneBase);

    impl Scene for Named {
        fn base(&self) -> &SceneBase {
            &self.0
        }

        fn base_mut(&mut self) -> &mut SceneBase {
            &mut self.0
        }
    }

    fn named(name: &str) -> Box<dyn Scene> {
        Box::new(Named(SceneBase::new(name)))
    }

    #[test]
    fn new_queue_is_empty() {
        let queue = TransitionQueue::new();
        assert!(queue.is_empty());
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn take_preserves_fifo_order_and_empties_queue() {
        let mut queue = TransitionQueue::new();
        queue.push(SceneTransition::Push(named("menu")));
        queue.push(SceneTransition::Pop);
        queue.push(SceneTransition::Replace(named("play")));

        let taken = queue.take();
        let ops: Vec<_> = taken.iter().map(SceneTransition::operation).collect();

        assert_eq!(ops, ["push_scene", "pop_scene", "replace_scene"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn debug_shows_scene_names() {
        let shown = format!("{:?}", SceneTransition::Push(named("menu")));
        assert_eq!(shown, "Push(\"menu\")");
        assert_eq!(format!("{:?}", SceneTransition::Clear), "Clear");
    }

    #[test]
    fn clear_drops_pending_transitions() {
        let mut queue = TransitionQueue::new();
        queue.push(SceneTransition::Pop);
        queue.push(SceneTransition::Clear);

        queue.clear();

        assert!(queue.is_empty());
        assert_eq!(queue.iter().count(), 0);
    }
}
