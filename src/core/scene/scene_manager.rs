//=========================================================================
// Scene Manager
//=========================================================================
//
// Owns the scene stack and keeps hook calls and app links in step with
// stack membership.
//
// Every stack change goes through here:
//   push    → attach, append, on_enter
//   pop     → remove top, on_exit, detach
//   replace → pop old top, push new scene (nothing runs in between)
//   clear   → pop until empty
//
// Transitions that scenes request from inside a hook are applied right
// after that hook returns. Transitions requested while one of those is
// being applied run next, before the rest of the queue (depth-first).
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::VecDeque;

use log::{debug, error, warn};

//=== Internal Dependencies ===============================================

use super::{Scene, SceneTransition, TransitionQueue};
use crate::core::error::SceneError;
use crate::core::globals::{AppHandle, SceneContext};
use crate::core::input::InputEvent;
use crate::platform::Screen;

//=== Operation Names =====================================================

const PUSH: &str = "push_scene";
const POP: &str = "pop_scene";
const REPLACE: &str = "replace_scene";
const CLEAR: &str = "clear_scenes";

//=== Scene Manager =======================================================

/// Stack of boxed scenes; the last one is the active scene.
#[derive(Default)]
pub(crate) struct SceneManager {
    stack: Vec<Box<dyn Scene>>,
    transitions: TransitionQueue,

    /// Set whenever the top of the stack changes; consumed by the next
    /// render.
    focus_changed: bool,
}

impl SceneManager {
    //--- Construction -----------------------------------------------------

    pub(crate) fn new() -> Self {
        Self::default()
    }

    //--- Queries ----------------------------------------------------------

    pub(crate) fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.stack.len()
    }

    pub(crate) fn top(&self) -> Option<&(dyn Scene + 'static)> {
        self.stack.last().map(|scene| scene.as_ref())
    }

    pub(crate) fn top_mut(&mut self) -> Option<&mut (dyn Scene + 'static)> {
        match self.stack.last_mut() {
            Some(scene) => Some(scene.as_mut()),
            None => None,
        }
    }

    /// Scene names from bottom to top.
    pub(crate) fn names(&self) -> Vec<String> {
        self.stack.iter().map(|scene| scene.name().to_string()).collect()
    }

    //--- Direct Stack Operations ------------------------------------------

    /// Attaches `scene`, puts it on top and enters it.
    pub(crate) fn push(
        &mut self,
        scene: Box<dyn Scene>,
        app: &AppHandle,
        screen: &mut dyn Screen,
    ) -> Result<(), SceneError> {
        self.push_internal(scene, app, screen, PUSH)?;
        self.process_transitions(app, screen)
    }

    /// Removes the top scene, exits it and hands it back detached.
    pub(crate) fn pop(
        &mut self,
        app: &AppHandle,
        screen: &mut dyn Screen,
    ) -> Result<Box<dyn Scene>, SceneError> {
        let scene = self.pop_internal(app, screen, POP)?;
        self.process_transitions(app, screen)?;
        Ok(scene)
    }

    /// Swaps the top scene for `scene` and hands the old one back.
    pub(crate) fn replace(
        &mut self,
        scene: Box<dyn Scene>,
        app: &AppHandle,
        screen: &mut dyn Screen,
    ) -> Result<Box<dyn Scene>, SceneError> {
        let old = self.replace_internal(scene, app, screen)?;
        self.process_transitions(app, screen)?;
        Ok(old)
    }

    /// Pops every scene, top to bottom.
    pub(crate) fn clear(&mut self, app: &AppHandle, screen: &mut dyn Screen) -> Result<(), SceneError> {
        self.clear_internal(app, screen);
        self.process_transitions(app, screen)
    }

    /// Shutdown variant of [`clear`](Self::clear).
    ///
    /// Transitions requested from the final `on_exit` calls are dropped:
    /// the loop is over and nothing would ever run them.
    pub(crate) fn close_all(&mut self, app: &AppHandle, screen: &mut dyn Screen) {
        self.clear_internal(app, screen);

        let dropped = self.transitions.take();
        if !dropped.is_empty() {
            warn!(
                "Discarding {} scene transition(s) requested during shutdown: {:?}",
                dropped.len(),
                dropped
            );
        }
    }

    //--- Per-Tick Dispatch ------------------------------------------------

    /// Hands `event` to the top scene. Returns `false` if the scene asked
    /// to skip this tick's update.
    pub(crate) fn dispatch_input(
        &mut self,
        event: &InputEvent,
        app: &AppHandle,
        screen: &mut dyn Screen,
    ) -> Result<bool, SceneError> {
        let Some(scene) = self.stack.last_mut() else {
            return Ok(true);
        };

        let keep_updating = {
            let mut ctx = SceneContext::new(app, screen, &mut self.transitions);
            scene.handle_input(event, &mut ctx)
        };

        self.process_transitions(app, screen)?;
        Ok(keep_updating)
    }

    pub(crate) fn update_top(
        &mut self,
        dt: f64,
        app: &AppHandle,
        screen: &mut dyn Screen,
    ) -> Result<(), SceneError> {
        let Some(scene) = self.stack.last_mut() else {
            return Ok(());
        };

        {
            let mut ctx = SceneContext::new(app, screen, &mut self.transitions);
            scene.update(dt, &mut ctx);
        }

        self.process_transitions(app, screen)
    }

    pub(crate) fn render_top(&mut self, app: &AppHandle, screen: &mut dyn Screen) -> Result<(), SceneError> {
        let Some(scene) = self.stack.last_mut() else {
            return Ok(());
        };

        let newly_active = std::mem::take(&mut self.focus_changed);
        {
            let mut ctx = SceneContext::new(app, screen, &mut self.transitions).newly_active(newly_active);
            scene.render(&mut ctx);
        }

        self.process_transitions(app, screen)
    }

    //--- Transition Processing --------------------------------------------

    /// Applies every queued transition.
    ///
    /// On the first failing transition the rest of the queue is dropped
    /// and the error is returned.
    pub(crate) fn process_transitions(
        &mut self,
        app: &AppHandle,
        screen: &mut dyn Screen,
    ) -> Result<(), SceneError> {
        if self.transitions.is_empty() {
            return Ok(());
        }

        let mut pending: VecDeque<SceneTransition> = self.transitions.take().into();

        while let Some(transition) = pending.pop_front() {
            debug!("Applying queued transition {:?}", transition);

            if let Err(e) = self.apply(transition, app, screen) {
                let dropped = pending.len() + self.transitions.len();
                if dropped > 0 {
                    warn!("Dropping {} queued transition(s) after failed transition", dropped);
                }
                self.transitions.clear();
                return Err(e);
            }

            // Transitions requested by the hooks that just ran go first.
            for nested in self.transitions.take().into_iter().rev() {
                pending.push_front(nested);
            }
        }

        Ok(())
    }

    fn apply(
        &mut self,
        transition: SceneTransition,
        app: &AppHandle,
        screen: &mut dyn Screen,
    ) -> Result<(), SceneError> {
        match transition {
            SceneTransition::Push(scene) => self.push_internal(scene, app, screen, PUSH),
            SceneTransition::Pop => self.pop_internal(app, screen, POP).map(drop),
            SceneTransition::Replace(scene) => self.replace_internal(scene, app, screen).map(drop),
            SceneTransition::Clear => {
                self.clear_internal(app, screen);
                Ok(())
            }
        }
    }

    //--- Internal Helpers -------------------------------------------------

    fn check_detached(scene: &dyn Scene, operation: &'static str) -> Result<(), SceneError> {
        match scene.app() {
            Some(owner) => {
                error!(
                    "{}: scene '{}' is already attached to {}",
                    operation,
                    scene.name(),
                    owner.id()
                );
                Err(SceneError::AlreadyAttached {
                    operation,
                    scene: scene.name().to_string(),
                    app: owner.id(),
                })
            }
            None => Ok(()),
        }
    }

    fn check_not_empty(&self, operation: &'static str) -> Result<(), SceneError> {
        if self.stack.is_empty() {
            error!("{}: the scene stack is empty", operation);
            Err(SceneError::EmptyStack { operation })
        } else {
            Ok(())
        }
    }

    fn push_internal(
        &mut self,
        mut scene: Box<dyn Scene>,
        app: &AppHandle,
        screen: &mut dyn Screen,
        operation: &'static str,
    ) -> Result<(), SceneError> {
        Self::check_detached(scene.as_ref(), operation)?;

        debug!("{}: '{}' onto stack at depth {}", operation, scene.name(), self.stack.len());
        scene.base_mut().attach(app.clone());
        self.stack.push(scene);
        self.focus_changed = true;

        if let Some(top) = self.stack.last_mut() {
            let mut ctx = SceneContext::new(app, screen, &mut self.transitions);
            top.on_enter(&mut ctx);
        }

        Ok(())
    }

    fn pop_internal(
        &mut self,
        app: &AppHandle,
        screen: &mut dyn Screen,
        operation: &'static str,
    ) -> Result<Box<dyn Scene>, SceneError> {
        let Some(scene) = self.stack.pop() else {
            error!("{}: the scene stack is empty", operation);
            return Err(SceneError::EmptyStack { operation });
        };

        Ok(self.exit_and_detach(scene, app, screen, operation))
    }

    fn exit_and_detach(
        &mut self,
        mut scene: Box<dyn Scene>,
        app: &AppHandle,
        screen: &mut dyn Screen,
        operation: &'static str,
    ) -> Box<dyn Scene> {
        debug!("{}: '{}' off stack, {} left", operation, scene.name(), self.stack.len());
        self.focus_changed = true;

        {
            let mut ctx = SceneContext::new(app, screen, &mut self.transitions);
            scene.on_exit(&mut ctx);
        }
        scene.base_mut().detach();

        scene
    }

    fn replace_internal(
        &mut self,
        scene: Box<dyn Scene>,
        app: &AppHandle,
        screen: &mut dyn Screen,
    ) -> Result<Box<dyn Scene>, SceneError> {
        // Both checks run before anything changes.
        self.check_not_empty(REPLACE)?;
        Self::check_detached(scene.as_ref(), REPLACE)?;

        let old = self.pop_internal(app, screen, REPLACE)?;
        self.push_internal(scene, app, screen, REPLACE)?;
        Ok(old)
    }

    fn clear_internal(&mut self, app: &AppHandle, screen: &mut dyn Screen) {
        if self.stack.is_empty() {
            return;
        }

        debug!("Clearing {} scene(s) from stack", self.stack.len());
        while let Some(scene) = self.stack.pop() {
            self.exit_and_detach(scene, app, screen, CLEAR);
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::Arc;

    use proptest::prelude::*;

    use super::*;
    use crate::core::globals::AppState;
    use crate::core::scene::SceneBase;
    use crate::platform::MemoryScreen;

    //--- Test Fixtures ----------------------------------------------------

    type Journal = Rc<RefCell<Vec<String>>>;

    /// Scene that records its hooks and can run a scripted action from
    /// `on_enter`.
    struct Recorder {
        base: SceneBase,
        journal: Journal,
        on_enter: Option<Box<dyn FnMut(&mut SceneContext<'_>)>>,
    }

    impl Recorder {
        fn new(name: &str, journal: &Journal) -> Box<Self> {
            Box::new(Self {
                base: SceneBase::new(name),
                journal: Rc::clone(journal),
                on_enter: None,
            })
        }

        fn entering(mut self: Box<Self>, action: impl FnMut(&mut SceneContext<'_>) + 'static) -> Box<Self> {
            self.on_enter = Some(Box::new(action));
            self
        }

        fn log(&self, hook: &str) {
            self.journal.borrow_mut().push(format!("{}.{hook}", self.base.name()));
        }
    }

    impl Scene for Recorder {
        fn base(&self) -> &SceneBase {
            &self.base
        }

        fn base_mut(&mut self) -> &mut SceneBase {
            &mut self.base
        }

        fn on_enter(&mut self, ctx: &mut SceneContext<'_>) {
            self.log("enter");
            if let Some(action) = self.on_enter.as_mut() {
                action(ctx);
            }
        }

        fn on_exit(&mut self, _ctx: &mut SceneContext<'_>) {
            self.log("exit");
        }
    }

    struct Fixture {
        state: Arc<AppState>,
        handle: AppHandle,
        screen: MemoryScreen,
        manager: SceneManager,
        journal: Journal,
    }

    impl Fixture {
        fn new() -> Self {
            let state = AppState::new();
            let handle = AppHandle::new(&state);
            Self {
                state,
                handle,
                screen: MemoryScreen::new(),
                manager: SceneManager::new(),
                journal: Journal::default(),
            }
        }

        fn scene(&self, name: &str) -> Box<Recorder> {
            Recorder::new(name, &self.journal)
        }

        fn push(&mut self, scene: Box<dyn Scene>) -> Result<(), SceneError> {
            self.manager.push(scene, &self.handle, &mut self.screen)
        }

        fn pop(&mut self) -> Result<Box<dyn Scene>, SceneError> {
            self.manager.pop(&self.handle, &mut self.screen)
        }

        fn replace(&mut self, scene: Box<dyn Scene>) -> Result<Box<dyn Scene>, SceneError> {
            self.manager.replace(scene, &self.handle, &mut self.screen)
        }

        fn journal(&self) -> Vec<String> {
            self.journal.borrow().clone()
        }
    }

    //--- Push / Pop -------------------------------------------------------

    #[test]
    fn push_attaches_then_enters() {
        let mut fx = Fixture::new();
        let scene = fx.scene("menu");
        fx.push(scene).unwrap();

        assert_eq!(fx.manager.names(), ["menu"]);
        assert_eq!(fx.journal(), ["menu.enter"]);
        let top = fx.manager.top().unwrap();
        assert_eq!(top.app().map(AppHandle::id), Some(fx.state.id()));
    }

    #[test]
    fn push_does_not_notify_previous_top() {
        let mut fx = Fixture::new();
        let a = fx.scene("a");
        let b = fx.scene("b");
        fx.push(a).unwrap();
        fx.push(b).unwrap();

        assert_eq!(fx.journal(), ["a.enter", "b.enter"]);
        assert_eq!(fx.manager.names(), ["a", "b"]);
    }

    #[test]
    fn pop_exits_and_detaches() {
        let mut fx = Fixture::new();
        let a = fx.scene("a");
        fx.push(a).unwrap();

        let popped = fx.pop().unwrap();

        assert!(fx.manager.is_empty());
        assert!(popped.app().is_none());
        assert_eq!(fx.journal(), ["a.enter", "a.exit"]);
    }

    #[test]
    fn pop_on_empty_stack_is_an_error() {
        let mut fx = Fixture::new();

        let err = fx.pop().unwrap_err();

        assert_eq!(err, SceneError::EmptyStack { operation: "pop_scene" });
        assert!(fx.journal().is_empty());
    }

    #[test]
    fn pushing_an_attached_scene_is_rejected() {
        let mut fx = Fixture::new();
        let other = AppState::new();
        let mut scene = fx.scene("stray");
        scene.base_mut().attach(AppHandle::new(&other));

        let err = fx.push(scene).unwrap_err();

        assert!(matches!(
            err,
            SceneError::AlreadyAttached { operation: "push_scene", ref scene, app }
                if scene == "stray" && app == other.id()
        ));
        assert!(fx.manager.is_empty());
        assert!(fx.journal().is_empty());
    }

    //--- Replace ----------------------------------------------------------

    #[test]
    fn replace_exits_old_before_entering_new() {
        let mut fx = Fixture::new();
        let a = fx.scene("a");
        let b = fx.scene("b");
        let c = fx.scene("c");
        fx.push(a).unwrap();
        fx.push(b).unwrap();

        let old = fx.replace(c).unwrap();

        assert_eq!(old.name(), "b");
        assert!(old.app().is_none());
        assert_eq!(fx.manager.names(), ["a", "c"]);
        assert_eq!(fx.journal(), ["a.enter", "b.enter", "b.exit", "c.enter"]);
    }

    #[test]
    fn replace_on_empty_stack_leaves_scene_untouched() {
        let mut fx = Fixture::new();
        let scene = fx.scene("lonely");

        let err = fx.replace(scene).unwrap_err();

        assert_eq!(err, SceneError::EmptyStack { operation: "replace_scene" });
        assert!(fx.manager.is_empty());
        assert!(fx.journal().is_empty());
    }

    #[test]
    fn replace_with_attached_scene_keeps_current_top() {
        let mut fx = Fixture::new();
        let a = fx.scene("a");
        fx.push(a).unwrap();

        let other = AppState::new();
        let mut stray = fx.scene("stray");
        stray.base_mut().attach(AppHandle::new(&other));

        assert!(fx.replace(stray).is_err());
        assert_eq!(fx.manager.names(), ["a"]);
        assert_eq!(fx.journal(), ["a.enter"]);
    }

    //--- Clear ------------------------------------------------------------

    #[test]
    fn clear_exits_top_to_bottom() {
        let mut fx = Fixture::new();
        for name in ["a", "b", "c"] {
            let scene = fx.scene(name);
            fx.push(scene).unwrap();
        }

        fx.manager.clear(&fx.handle, &mut fx.screen).unwrap();

        assert!(fx.manager.is_empty());
        assert_eq!(
            fx.journal()[3..],
            ["c.exit".to_string(), "b.exit".to_string(), "a.exit".to_string()]
        );
    }

    //--- Queued Transitions -----------------------------------------------

    #[test]
    fn transitions_from_on_enter_apply_after_the_hook() {
        let mut fx = Fixture::new();
        let journal = Rc::clone(&fx.journal);
        let loader = fx.scene("loader").entering(move |ctx| {
            ctx.replace_scene(*Recorder::new("title", &journal));
        });

        fx.push(loader).unwrap();

        assert_eq!(fx.manager.names(), ["title"]);
        assert_eq!(fx.journal(), ["loader.enter", "loader.exit", "title.enter"]);
    }

    #[test]
    fn nested_transitions_run_depth_first() {
        let mut fx = Fixture::new();
        let j = Rc::clone(&fx.journal);

        // root.on_enter queues [push(a), push(c)]; a.on_enter queues push(b).
        let root = fx.scene("root").entering(move |ctx| {
            let jb = Rc::clone(&j);
            let a = Recorder::new("a", &j).entering(move |ctx| {
                ctx.push_boxed(Recorder::new("b", &jb));
            });
            ctx.push_boxed(a);
            ctx.push_boxed(Recorder::new("c", &j));
        });

        fx.push(root).unwrap();

        assert_eq!(fx.manager.names(), ["root", "a", "b", "c"]);
        assert_eq!(fx.journal(), ["root.enter", "a.enter", "b.enter", "c.enter"]);
    }

    #[test]
    fn failed_transition_drops_the_rest_of_the_queue() {
        let mut fx = Fixture::new();
        let j = Rc::clone(&fx.journal);
        let root = fx.scene("root").entering(move |ctx| {
            ctx.pop_scene();
            ctx.pop_scene();
            ctx.push_boxed(Recorder::new("never", &j));
        });

        let err = fx.push(root).unwrap_err();

        assert_eq!(err, SceneError::EmptyStack { operation: "pop_scene" });
        assert!(fx.manager.is_empty());
        assert_eq!(fx.journal(), ["root.enter", "root.exit"]);
        assert!(fx.manager.transitions.is_empty());
    }

    #[test]
    fn failed_nested_transition_keeps_earlier_changes() {
        let mut fx = Fixture::new();
        let menu = fx.scene("menu");
        fx.push(menu).unwrap();
        let j = Rc::clone(&fx.journal);
        let loader = fx.scene("loader").entering(move |ctx| {
            ctx.pop_scene();
            ctx.pop_scene();
            ctx.pop_scene();
            ctx.push_boxed(Recorder::new("never", &j));
        });

        let err = fx.push(loader).unwrap_err();

        assert_eq!(err, SceneError::EmptyStack { operation: "pop_scene" });
        assert!(fx.manager.is_empty());
        assert_eq!(fx.journal(), ["menu.enter", "loader.enter", "loader.exit", "menu.exit"]);
        assert!(fx.manager.transitions.is_empty());
    }

    #[test]
    fn close_all_discards_late_transitions() {
        struct Clingy(SceneBase);

        impl Scene for Clingy {
            fn base(&self) -> &SceneBase {
                &self.0
            }

            fn base_mut(&mut self) -> &mut SceneBase {
                &mut self.0
            }

            fn on_exit(&mut self, ctx: &mut SceneContext<'_>) {
                ctx.push_scene(Clingy(SceneBase::new("again")));
            }
        }

        let mut fx = Fixture::new();
        fx.push(Box::new(Clingy(SceneBase::new("clingy")))).unwrap();

        fx.manager.close_all(&fx.handle, &mut fx.screen);

        assert!(fx.manager.is_empty());
        assert!(fx.manager.transitions.is_empty());
    }

    //--- Focus Tracking ---------------------------------------------------

    #[test]
    fn render_sees_newly_active_once() {
        struct Watcher {
            base: SceneBase,
            seen: Rc<RefCell<Vec<bool>>>,
        }

        impl Scene for Watcher {
            fn base(&self) -> &SceneBase {
                &self.base
            }

            fn base_mut(&mut self) -> &mut SceneBase {
                &mut self.base
            }

            fn render(&mut self, ctx: &mut SceneContext<'_>) {
                self.seen.borrow_mut().push(ctx.is_newly_active());
            }
        }

        let mut fx = Fixture::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        fx.push(Box::new(Watcher {
            base: SceneBase::new("w"),
            seen: Rc::clone(&seen),
        }))
        .unwrap();

        fx.manager.render_top(&fx.handle, &mut fx.screen).unwrap();
        fx.manager.render_top(&fx.handle, &mut fx.screen).unwrap();

        let overlay = fx.scene("overlay");
        fx.push(overlay).unwrap();
        fx.pop().unwrap();
        fx.manager.render_top(&fx.handle, &mut fx.screen).unwrap();

        assert_eq!(*seen.borrow(), [true, false, true]);
    }

    //--- Enter / Exit Pairing ---------------------------------------------

    #[derive(Debug, Clone)]
    enum Op {
        Push,
        Pop,
        Replace,
        Clear,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => Just(Op::Push),
            2 => Just(Op::Pop),
            2 => Just(Op::Replace),
            1 => Just(Op::Clear),
        ]
    }

    proptest! {
        #[test]
        fn enter_and_exit_stay_paired(ops in proptest::collection::vec(op(), 0..40)) {
            let mut fx = Fixture::new();
            let mut detached: Vec<Box<dyn Scene>> = Vec::new();

            for (i, op) in ops.iter().enumerate() {
                let name = format!("s{i}");
                match op {
                    Op::Push => {
                        let scene = fx.scene(&name);
                        fx.push(scene).unwrap();
                    }
                    Op::Pop => match fx.pop() {
                        Ok(scene) => detached.push(scene),
                        Err(e) => {
                            prop_assert_eq!(e, SceneError::EmptyStack { operation: POP });
                        }
                    },
                    Op::Replace => {
                        let scene = fx.scene(&name);
                        match fx.replace(scene) {
                            Ok(old) => detached.push(old),
                            Err(e) => {
                                prop_assert_eq!(e, SceneError::EmptyStack { operation: REPLACE });
                            }
                        }
                    }
                    Op::Clear => fx.manager.clear(&fx.handle, &mut fx.screen).unwrap(),
                }
            }

            let journal = fx.journal();
            let stacked = fx.manager.names();

            for i in 0..ops.len() {
                let name = format!("s{i}");
                let enters = journal.iter().filter(|e| **e == format!("{name}.enter")).count();
                let exits = journal.iter().filter(|e| **e == format!("{name}.exit")).count();
                let on_stack = stacked.contains(&name);

                prop_assert!(enters <= 1);
                prop_assert_eq!(enters, exits + usize::from(on_stack));
            }

            for scene in &fx.manager.stack {
                prop_assert!(scene.app().is_some());
            }
            for scene in &detached {
                prop_assert!(scene.app().is_none());
            }
        }
    }
}
