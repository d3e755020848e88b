//=========================================================================
// Scene Context
//=========================================================================
//
// What a scene can reach while one of its hooks runs:
// - the host app (stop, identity)
// - the screen (drawing)
// - the transition queue (push / pop / replace / clear)
//
// Stack changes requested here are deferred until the hook returns.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use super::AppHandle;
use crate::core::scene::{Scene, SceneTransition, TransitionQueue};
use crate::platform::Screen;

//=== SceneContext ========================================================

/// Per-hook access to the hosting app.
///
/// Every scene hook receives a `&mut SceneContext`. It is only valid for
/// the duration of the call.
pub struct SceneContext<'a> {
    app: &'a AppHandle,
    screen: &'a mut dyn Screen,
    transitions: &'a mut TransitionQueue,
    newly_active: bool,
}

impl<'a> SceneContext<'a> {
    pub(crate) fn new(
        app: &'a AppHandle,
        screen: &'a mut dyn Screen,
        transitions: &'a mut TransitionQueue,
    ) -> Self {
        Self {
            app,
            screen,
            transitions,
            newly_active: false,
        }
    }

    pub(crate) fn newly_active(mut self, newly_active: bool) -> Self {
        self.newly_active = newly_active;
        self
    }

    //--- App --------------------------------------------------------------

    /// Handle of the app running this hook.
    pub fn app(&self) -> &AppHandle {
        self.app
    }

    /// Requests the loop to stop at the end of the current tick.
    pub fn stop(&mut self) {
        self.app.stop();
    }

    /// Returns whether the app's loop is still set to run.
    pub fn is_running(&self) -> bool {
        self.app.is_running()
    }

    //--- Scene Stack ------------------------------------------------------

    /// Pushes `scene` once the current hook returns.
    pub fn push_scene<S: Scene + 'static>(&mut self, scene: S) {
        self.push_boxed(Box::new(scene));
    }

    /// Boxed variant of [`push_scene`](Self::push_scene).
    pub fn push_boxed(&mut self, scene: Box<dyn Scene>) {
        self.transitions.push(SceneTransition::Push(scene));
    }

    /// Pops the top scene once the current hook returns.
    pub fn pop_scene(&mut self) {
        self.transitions.push(SceneTransition::Pop);
    }

    /// Replaces the top scene with `scene` once the current hook returns.
    pub fn replace_scene<S: Scene + 'static>(&mut self, scene: S) {
        self.replace_boxed(Box::new(scene));
    }

    /// Boxed variant of [`replace_scene`](Self::replace_scene).
    pub fn replace_boxed(&mut self, scene: Box<dyn Scene>) {
        self.transitions.push(SceneTransition::Replace(scene));
    }

    /// Removes every scene once the current hook returns, ending the loop.
    pub fn clear_scenes(&mut self) {
        self.transitions.push(SceneTransition::Clear);
    }

    /// Number of stack changes requested so far during this hook.
    pub fn pending_transitions(&self) -> usize {
        self.transitions.len()
    }

    //--- Output -----------------------------------------------------------

    /// Writes one message to the screen.
    pub fn display(&mut self, message: &str) {
        self.screen.show(message);
    }

    /// Clears the screen.
    pub fn clear_screen(&mut self) {
        self.screen.clear();
    }

    /// Direct access to the output sink.
    pub fn screen(&mut self) -> &mut (dyn Screen + 'a) {
        &mut *self.screen
    }

    /// `true` during the first render after this scene became the top of
    /// the stack (pushed, or uncovered by a pop).
    pub fn is_newly_active(&self) -> bool {
        self.newly_active
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::globals::AppState;
    use crate::core::scene::SceneBase;
    use crate::platform::MemoryScreen;

    struct Blank(SceneBase);

    impl Scene for Blank {
        fn base(&self) -> &SceneBase {
            &self.0
        }

        fn base_mut(&mut self) -> &mut SceneBase {
            &mut self.0
        }
    }

    #[test]
    fn stack_requests_are_queued_in_order() {
        let state = AppState::new();
        let handle = AppHandle::new(&state);
        let mut screen = MemoryScreen::new();
        let mut queue = TransitionQueue::new();

        {
            let mut ctx = SceneContext::new(&handle, &mut screen, &mut queue);
            ctx.push_scene(Blank(SceneBase::new("a")));
            ctx.pop_scene();
            ctx.replace_scene(Blank(SceneBase::new("b")));
            ctx.clear_scenes();
            assert_eq!(ctx.pending_transitions(), 4);
        }

        let ops: Vec<_> = queue.iter().map(SceneTransition::operation).collect();
        assert_eq!(ops, ["push_scene", "pop_scene", "replace_scene", "clear_scenes"]);
    }

    #[test]
    fn stop_clears_running_flag() {
        let state = AppState::new();
        state.set_running(true);
        let handle = AppHandle::new(&state);
        let mut screen = MemoryScreen::new();
        let mut queue = TransitionQueue::new();

        let mut ctx = SceneContext::new(&handle, &mut screen, &mut queue);
        assert!(ctx.is_running());
        ctx.stop();

        assert!(!state.is_running());
    }

    #[test]
    fn display_writes_to_screen() {
        let state = AppState::new();
        let handle = AppHandle::new(&state);
        let mut screen = MemoryScreen::new();
        let mut queue = TransitionQueue::new();

        {
            let mut ctx = SceneContext::new(&handle, &mut screen, &mut queue);
            ctx.display("hello");
            ctx.clear_screen();
            ctx.display("again");
        }

        assert_eq!(screen.lines(), ["hello", "again"]);
        assert_eq!(screen.clear_count(), 1);
    }

    #[test]
    fn newly_active_defaults_to_false() {
        let state = AppState::new();
        let handle = AppHandle::new(&state);
        let mut screen = MemoryScreen::new();
        let mut queue = TransitionQueue::new();

        let ctx = SceneContext::new(&handle, &mut screen, &mut queue);
        assert!(!ctx.is_newly_active());
        assert!(ctx.newly_active(true).is_newly_active());
    }
}
