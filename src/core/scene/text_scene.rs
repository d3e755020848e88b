//=========================================================================
// Text Scene
//=========================================================================
//
// Ready-made scene for turn-based text games.
//
// The game supplies what to show and how to react to a command; the
// scene handles drawing:
//   - clear the screen first (auto_clear)
//   - optional ANSI color around the text
//   - the prompt line
//
// A paced loop renders many times per second, but a text game only
// changes when the player does something. The scene therefore redraws
// only when its content is dirty (after entering, after any input, after
// an update that reports a change, or when marked) or when it has just
// become the top scene again.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use super::{Scene, SceneBase};
use crate::core::globals::SceneContext;
use crate::core::input::{InputEvent, KeyCode};

//=== Constants ===========================================================

const DEFAULT_PROMPT: &str = "> ";
const ANSI_RESET: &str = "\x1b[0m";

//=== TextGame Trait ======================================================

/// Game logic driven by a [`TextScene`].
pub trait TextGame: 'static {
    /// Full text shown to the player on each redraw.
    fn display_text(&self) -> String;

    /// Reacts to one command line typed by the player.
    fn process_command(&mut self, command: &str, ctx: &mut SceneContext<'_>);

    /// Reacts to a special key. Ignored by default.
    fn process_key(&mut self, _key: KeyCode, _ctx: &mut SceneContext<'_>) {}

    fn on_enter(&mut self, _ctx: &mut SceneContext<'_>) {}

    fn on_exit(&mut self, _ctx: &mut SceneContext<'_>) {}

    /// Advances time-based state. Returns true when the text changed and
    /// the scene should redraw.
    fn update(&mut self, _dt: f64, _ctx: &mut SceneContext<'_>) -> bool {
        false
    }
}

//=== TextScene ===========================================================

/// Scene that renders a [`TextGame`] and feeds it player commands.
pub struct TextScene<G: TextGame> {
    base: SceneBase,
    game: G,
    prompt: String,
    auto_clear: bool,
    color: Option<String>,
    dirty: bool,
}

impl<G: TextGame> TextScene<G> {
    //--- Construction -----------------------------------------------------

    /// Scene named `name` with the default `"> "` prompt and auto clear.
    pub fn new(name: impl Into<String>, game: G) -> Self {
        Self {
            base: SceneBase::new(name),
            game,
            prompt: DEFAULT_PROMPT.to_string(),
            auto_clear: true,
            color: None,
            dirty: true,
        }
    }

    /// Text shown after the game text. An empty prompt is not drawn.
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Whether the screen is cleared before each redraw.
    pub fn with_auto_clear(mut self, auto_clear: bool) -> Self {
        self.auto_clear = auto_clear;
        self
    }

    /// Wraps the text in an SGR color sequence, e.g. `"36"` for cyan.
    pub fn with_color(mut self, sgr: impl Into<String>) -> Self {
        self.color = Some(sgr.into());
        self
    }

    //--- Accessors --------------------------------------------------------

    pub fn game(&self) -> &G {
        &self.game
    }

    /// Mutable game access. Marks the scene dirty.
    pub fn game_mut(&mut self) -> &mut G {
        self.dirty = true;
        &mut self.game
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn auto_clear(&self) -> bool {
        self.auto_clear
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Forces a redraw on the next render.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    fn styled(&self, text: String) -> String {
        match &self.color {
            Some(sgr) => format!("\x1b[{sgr}m{text}{ANSI_RESET}"),
            None => text,
        }
    }
}

impl<G: TextGame> Scene for TextScene<G> {
    fn base(&self) -> &SceneBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut SceneBase {
        &mut self.base
    }

    fn on_enter(&mut self, ctx: &mut SceneContext<'_>) {
        self.dirty = true;
        self.game.on_enter(ctx);
    }

    fn on_exit(&mut self, ctx: &mut SceneContext<'_>) {
        self.game.on_exit(ctx);
    }

    fn handle_input(&mut self, event: &InputEvent, ctx: &mut SceneContext<'_>) -> bool {
        match event {
            InputEvent::Line(command) => self.game.process_command(command, ctx),
            InputEvent::Key(key) => self.game.process_key(*key, ctx),
            InputEvent::Closed => return true,
        }
        self.dirty = true;
        true
    }

    fn update(&mut self, dt: f64, ctx: &mut SceneContext<'_>) {
        if self.game.update(dt, ctx) {
            self.dirty = true;
        }
        self.base.update_objects(dt);
    }

    fn render(&mut self, ctx: &mut SceneContext<'_>) {
        if !self.dirty && !ctx.is_newly_active() {
            return;
        }

        if self.auto_clear {
            ctx.clear_screen();
        }

        let text = self.styled(self.game.display_text());
        ctx.display(&text);
        self.base.render_objects(ctx.screen());

        if !self.prompt.is_empty() {
            ctx.display(&self.prompt);
        }

        self.dirty = false;
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::globals::{AppHandle, AppState};
    use crate::core::scene::TransitionQueue;
    use crate::platform::MemoryScreen;

    #[derive(Default)]
    struct Echo {
        last: String,
        keys: Vec<KeyCode>,
        entered: usize,
        elapsed: f64,
    }

    impl TextGame for Echo {
        fn display_text(&self) -> String {
            format!("last: {}", self.last)
        }

        fn process_command(&mut self, command: &str, ctx: &mut SceneContext<'_>) {
            if command == "quit" {
                ctx.stop();
            }
            self.last = command.to_string();
        }

        fn process_key(&mut self, key: KeyCode, _ctx: &mut SceneContext<'_>) {
            self.keys.push(key);
        }

        fn on_enter(&mut self, _ctx: &mut SceneContext<'_>) {
            self.entered += 1;
        }

        fn update(&mut self, dt: f64, _ctx: &mut SceneContext<'_>) -> bool {
            let before = self.elapsed.floor();
            self.elapsed += dt;
            self.elapsed.floor() > before
        }
    }

    struct Harness {
        state: std::sync::Arc<AppState>,
        handle: AppHandle,
        screen: MemoryScreen,
        queue: TransitionQueue,
    }

    impl Harness {
        fn new() -> Self {
            let state = AppState::new();
            let handle = AppHandle::new(&state);
            Self {
                state,
                handle,
                screen: MemoryScreen::new(),
                queue: TransitionQueue::new(),
            }
        }

        fn with_ctx<R>(&mut self, newly_active: bool, f: impl FnOnce(&mut SceneContext<'_>) -> R) -> R {
            let mut ctx = SceneContext::new(&self.handle, &mut self.screen, &mut self.queue)
                .newly_active(newly_active);
            f(&mut ctx)
        }
    }

    #[test]
    fn first_render_draws_text_and_prompt() {
        let mut h = Harness::new();
        let mut scene = TextScene::new("echo", Echo::default());

        h.with_ctx(false, |ctx| scene.on_enter(ctx));
        h.with_ctx(true, |ctx| scene.render(ctx));

        assert_eq!(h.screen.lines(), ["last: ", "> "]);
        assert_eq!(h.screen.clear_count(), 1);
        assert_eq!(scene.game().entered, 1);
        assert!(!scene.is_dirty());
    }

    #[test]
    fn clean_scene_is_not_redrawn() {
        let mut h = Harness::new();
        let mut scene = TextScene::new("echo", Echo::default());

        h.with_ctx(true, |ctx| scene.render(ctx));
        h.screen.reset();
        h.with_ctx(false, |ctx| scene.render(ctx));

        assert!(h.screen.lines().is_empty());
    }

    #[test]
    fn input_marks_dirty_and_reaches_game() {
        let mut h = Harness::new();
        let mut scene = TextScene::new("echo", Echo::default()).with_prompt("");
        h.with_ctx(true, |ctx| scene.render(ctx));
        h.screen.reset();

        let keep = h.with_ctx(false, |ctx| scene.handle_input(&InputEvent::line("north"), ctx));
        h.with_ctx(false, |ctx| scene.handle_input(&InputEvent::Key(KeyCode::ArrowUp), ctx));
        h.with_ctx(false, |ctx| scene.render(ctx));

        assert!(keep);
        assert_eq!(h.screen.lines(), ["last: north"]);
        assert_eq!(scene.game().keys, [KeyCode::ArrowUp]);
    }

    #[test]
    fn newly_active_forces_redraw() {
        let mut h = Harness::new();
        let mut scene = TextScene::new("echo", Echo::default()).with_auto_clear(false);
        h.with_ctx(true, |ctx| scene.render(ctx));
        h.screen.reset();

        h.with_ctx(true, |ctx| scene.render(ctx));

        assert_eq!(h.screen.lines(), ["last: ", "> "]);
        assert_eq!(h.screen.clear_count(), 0);
    }

    #[test]
    fn color_wraps_text_only() {
        let mut h = Harness::new();
        let mut scene = TextScene::new("echo", Echo::default()).with_color("36");

        h.with_ctx(true, |ctx| scene.render(ctx));

        assert_eq!(h.screen.lines(), ["\x1b[36mlast: \x1b[0m", "> "]);
    }

    #[test]
    fn game_can_stop_the_app() {
        let mut h = Harness::new();
        h.state.set_running(true);
        let mut scene = TextScene::new("echo", Echo::default());

        h.with_ctx(false, |ctx| scene.handle_input(&InputEvent::line("quit"), ctx));

        assert!(!h.state.is_running());
    }

    #[test]
    fn update_reporting_change_forces_redraw() {
        let mut h = Harness::new();
        let mut scene = TextScene::new("echo", Echo::default());
        h.with_ctx(true, |ctx| scene.render(ctx));

        h.with_ctx(false, |ctx| scene.update(0.5, ctx));
        assert!(!scene.is_dirty());

        h.with_ctx(false, |ctx| scene.update(0.5, ctx));
        assert!(scene.is_dirty());
    }
}
