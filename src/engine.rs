//=========================================================================
// Lantern Engine
//
// Main entry point: the game app and its builder.
//
// Architecture:
// ```text
//     GameAppBuilder  ──build()──>  GameApp  ──run()──>  [Game Loop]
//         │                           │
//         ├─ with_target_fps()        ├─ push_scene() / pop_scene() / replace_scene()
//         ├─ with_max_delta()         └─ loop: input → update → render
//         ├─ with_screen()                  until stopped or no scene is left
//         ├─ with_input()
//         └─ with_raw_input()
// ```
//
// The loop runs on the caller's thread. Input is polled with a timeout
// equal to what is left of the frame budget, so an idle player does not
// stall the loop and a busy one is answered without waiting for the
// next frame.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, error, info, trace};

//=== Internal Dependencies ===============================================

use crate::core::error::{EngineError, EngineResult, SceneError};
use crate::core::globals::{AppHandle, AppId, AppState};
use crate::core::input::{InputEvent, InputSource};
use crate::core::scene::{Scene, SceneManager};
use crate::core::time::{FrameClock, DEFAULT_MAX_DELTA};
use crate::core::TickControl;
use crate::platform::{RawInput, Screen, StdinInput, TerminalScreen};

//=== Constants ===========================================================

const DEFAULT_TARGET_FPS: f64 = 30.0;
const DEFAULT_MAX_EVENTS_PER_TICK: usize = 64;

/// Shown when the input source runs dry (EOF, closed channel).
pub const INTERRUPTED_MESSAGE: &str = "Game interrupted by user.";

//=== GameAppBuilder ======================================================

/// Builder for configuring and constructing a [`GameApp`].
///
/// # Default Values
///
/// - **Target FPS**: 30.0 (`0.0` runs unpaced)
/// - **Max delta**: 250 ms
/// - **Max events per tick**: 64
/// - **Render on start**: enabled
/// - **Screen**: [`TerminalScreen`] on stdout
/// - **Input**: [`StdinInput`] ([`RawInput`] with `with_raw_input(true)`)
///
/// # Examples
///
/// ```no_run
/// use lantern_engine::GameAppBuilder;
///
/// let app = GameAppBuilder::new()
///     .with_target_fps(60.0)
///     .without_delta_clamp()
///     .build();
/// ```
pub struct GameAppBuilder {
    target_fps: f64,
    max_delta: Option<Duration>,
    max_events_per_tick: usize,
    render_on_start: bool,
    raw_input: bool,
    screen: Option<Box<dyn Screen>>,
    input: Option<Box<dyn InputSource>>,
}

impl GameAppBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            target_fps: DEFAULT_TARGET_FPS,
            max_delta: Some(DEFAULT_MAX_DELTA),
            max_events_per_tick: DEFAULT_MAX_EVENTS_PER_TICK,
            render_on_start: true,
            raw_input: false,
            screen: None,
            input: None,
        }
    }

    /// Sets how many ticks per second the loop aims for.
    ///
    /// `0.0` disables pacing: ticks run back to back and input is polled
    /// without waiting.
    ///
    /// Default: 30.0
    ///
    /// # Panics
    ///
    /// Panics if `fps` is negative or not finite.
    pub fn with_target_fps(mut self, fps: f64) -> Self {
        assert!(
            fps.is_finite() && fps >= 0.0,
            "Target FPS must be finite and non-negative, got {}",
            fps
        );
        self.target_fps = fps;
        self
    }

    /// Sets the ceiling for the `dt` handed to `update`.
    ///
    /// Default: 250 ms
    ///
    /// # Panics
    ///
    /// Panics if `max_delta` is zero.
    pub fn with_max_delta(mut self, max_delta: Duration) -> Self {
        assert!(!max_delta.is_zero(), "Max delta must be positive");
        self.max_delta = Some(max_delta);
        self
    }

    /// Hands `update` the raw elapsed time, however long it is.
    pub fn without_delta_clamp(mut self) -> Self {
        self.max_delta = None;
        self
    }

    /// Bounds how many input events are dispatched in one tick.
    ///
    /// Default: 64
    ///
    /// # Panics
    ///
    /// Panics if `max == 0`.
    pub fn with_max_events_per_tick(mut self, max: usize) -> Self {
        assert!(max > 0, "Max events per tick must be positive");
        self.max_events_per_tick = max;
        self
    }

    /// Whether the top scene is rendered once before the first tick.
    ///
    /// Default: true
    pub fn with_render_on_start(mut self, render_on_start: bool) -> Self {
        self.render_on_start = render_on_start;
        self
    }

    /// Reads single key presses from the terminal instead of whole lines.
    ///
    /// Arrow keys then reach scenes without Enter. Falls back to line
    /// input when stdin is not a terminal. Ignored when an input source is
    /// set with [`with_input`](Self::with_input).
    ///
    /// Default: false
    pub fn with_raw_input(mut self, raw_input: bool) -> Self {
        self.raw_input = raw_input;
        self
    }

    /// Sets the output sink.
    pub fn with_screen<S: Screen + 'static>(mut self, screen: S) -> Self {
        self.screen = Some(Box::new(screen));
        self
    }

    /// Sets the input source.
    pub fn with_input<I: InputSource + 'static>(mut self, input: I) -> Self {
        self.input = Some(Box::new(input));
        self
    }

    /// Builds the app with an empty scene stack.
    pub fn build(self) -> GameApp {
        let state = AppState::new();
        let handle = AppHandle::new(&state);

        info!(
            "Building {} (target FPS: {}, max delta: {:?}, events/tick: {})",
            state.id(),
            self.target_fps,
            self.max_delta,
            self.max_events_per_tick
        );

        if self.raw_input && self.input.is_some() {
            debug!("Raw input requested but a custom input source is set; keeping it");
        }
        let raw_input = self.raw_input;

        let frame_budget = (self.target_fps > 0.0).then(|| Duration::from_secs_f64(1.0 / self.target_fps));

        GameApp {
            state,
            handle,
            scenes: SceneManager::new(),
            clock: FrameClock::new(self.max_delta),
            screen: self.screen.unwrap_or_else(|| Box::new(TerminalScreen::stdout())),
            input: self.input.unwrap_or_else(|| default_input(raw_input)),
            frame_budget,
            max_events_per_tick: self.max_events_per_tick,
            render_on_start: self.render_on_start,
        }
    }
}

fn default_input(raw_input: bool) -> Box<dyn InputSource> {
    if raw_input {
        Box::new(RawInput::new())
    } else {
        Box::new(StdinInput::new())
    }
}

impl Default for GameAppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//=== GameApp =============================================================

/// Owns the scene stack and drives the game loop.
///
/// Only the top scene is active: it alone receives input, updates and
/// renders. Scenes below it keep their state until they are uncovered.
///
/// # Examples
///
/// ```no_run
/// use lantern_engine::prelude::*;
///
/// struct Hello(SceneBase);
///
/// impl Scene for Hello {
///     fn base(&self) -> &SceneBase { &self.0 }
///     fn base_mut(&mut self) -> &mut SceneBase { &mut self.0 }
///
///     fn render(&mut self, ctx: &mut SceneContext<'_>) {
///         ctx.display("Hello!");
///         ctx.stop();
///     }
/// }
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut app = GameApp::new();
/// app.push_scene(Hello(SceneBase::new("hello")))?;
/// app.run()?;
/// # Ok(())
/// # }
/// ```
pub struct GameApp {
    state: Arc<AppState>,
    handle: AppHandle,
    scenes: SceneManager,
    clock: FrameClock,
    screen: Box<dyn Screen>,
    input: Box<dyn InputSource>,
    frame_budget: Option<Duration>,
    max_events_per_tick: usize,
    render_on_start: bool,
}

impl GameApp {
    //--- Construction -----------------------------------------------------

    /// App with default settings (stdin / stdout).
    pub fn new() -> Self {
        GameAppBuilder::new().build()
    }

    pub fn builder() -> GameAppBuilder {
        GameAppBuilder::new()
    }

    //--- Identity & Run State ---------------------------------------------

    pub fn id(&self) -> AppId {
        self.state.id()
    }

    /// Non-owning handle; can stop the loop from any thread.
    pub fn handle(&self) -> AppHandle {
        self.handle.clone()
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    /// Ends the loop at the end of the current tick.
    pub fn stop(&self) {
        debug!("{} stop requested", self.state.id());
        self.state.set_running(false);
    }

    //--- Scene Stack ------------------------------------------------------

    /// Attaches `scene`, puts it on top of the stack and calls its
    /// `on_enter`. The previous top scene is not notified.
    ///
    /// # Errors
    ///
    /// [`SceneError::AlreadyAttached`] if the scene is on a stack already.
    pub fn push_scene<S: Scene + 'static>(&mut self, scene: S) -> Result<(), SceneError> {
        self.push_boxed(Box::new(scene))
    }

    /// Boxed variant of [`push_scene`](Self::push_scene).
    pub fn push_boxed(&mut self, scene: Box<dyn Scene>) -> Result<(), SceneError> {
        self.scenes.push(scene, &self.handle, self.screen.as_mut())
    }

    /// Removes the top scene, calls its `on_exit` and returns it detached.
    ///
    /// # Errors
    ///
    /// [`SceneError::EmptyStack`] if there is nothing to pop; nothing
    /// changes in that case.
    pub fn pop_scene(&mut self) -> Result<Box<dyn Scene>, SceneError> {
        self.scenes.pop(&self.handle, self.screen.as_mut())
    }

    /// Exits and detaches the top scene, then attaches and enters `scene`
    /// in its place. Returns the old top scene.
    ///
    /// # Errors
    ///
    /// [`SceneError::EmptyStack`] on an empty stack and
    /// [`SceneError::AlreadyAttached`] for an attached `scene`. Both are
    /// checked before anything changes.
    pub fn replace_scene<S: Scene + 'static>(&mut self, scene: S) -> Result<Box<dyn Scene>, SceneError> {
        self.replace_boxed(Box::new(scene))
    }

    /// Boxed variant of [`replace_scene`](Self::replace_scene).
    pub fn replace_boxed(&mut self, scene: Box<dyn Scene>) -> Result<Box<dyn Scene>, SceneError> {
        self.scenes.replace(scene, &self.handle, self.screen.as_mut())
    }

    /// Pops every scene, top to bottom.
    pub fn clear_scenes(&mut self) -> Result<(), SceneError> {
        self.scenes.clear(&self.handle, self.screen.as_mut())
    }

    /// The active (top) scene.
    pub fn current_scene(&self) -> Option<&(dyn Scene + 'static)> {
        self.scenes.top()
    }

    pub fn current_scene_mut(&mut self) -> Option<&mut (dyn Scene + 'static)> {
        self.scenes.top_mut()
    }

    /// The active scene, if it is an `S`.
    pub fn current_scene_as<S: Scene>(&self) -> Option<&S> {
        self.scenes.top()?.as_any().downcast_ref::<S>()
    }

    pub fn scene_count(&self) -> usize {
        self.scenes.len()
    }

    /// Scene names from bottom to top.
    pub fn scene_names(&self) -> Vec<String> {
        self.scenes.names()
    }

    //--- Output -----------------------------------------------------------

    pub fn screen(&self) -> &dyn Screen {
        self.screen.as_ref()
    }

    pub fn screen_mut(&mut self) -> &mut dyn Screen {
        self.screen.as_mut()
    }

    /// Writes one message to the screen.
    pub fn display(&mut self, message: &str) {
        self.screen.show(message);
    }

    //--- Execution --------------------------------------------------------

    /// Runs the loop until the app is stopped or no scene is left.
    ///
    /// # Lifecycle
    ///
    /// 1. [`start`](Self::start): mark running, reset the clock, initial render
    /// 2. [`tick`](Self::tick) until it reports [`TickControl::Exit`]
    /// 3. [`shutdown`](Self::shutdown): `on_exit` for every remaining scene,
    ///    top to bottom
    ///
    /// Shutdown also runs when a tick fails. Panics raised by scene hooks
    /// are not caught.
    ///
    /// # Errors
    ///
    /// - [`EngineError::NoScenes`] if the stack is empty
    /// - [`EngineError::Scene`] if a transition requested by a scene is invalid
    /// - [`EngineError::Screen`] if writing output fails
    pub fn run(&mut self) -> EngineResult<()> {
        let result = self.start().and_then(|()| self.run_loop());
        self.shutdown();

        match &result {
            Ok(()) => info!("{} finished", self.state.id()),
            Err(e) => error!("{} aborted: {}", self.state.id(), e),
        }
        result
    }

    /// Prepares the loop: marks the app running, resets the frame clock
    /// and renders the top scene once (unless disabled).
    ///
    /// # Errors
    ///
    /// [`EngineError::NoScenes`] on an empty stack.
    pub fn start(&mut self) -> EngineResult<()> {
        if self.scenes.is_empty() {
            error!("{} cannot start: no scenes have been pushed", self.state.id());
            return Err(EngineError::NoScenes);
        }

        info!(
            "{} starting with {} scene(s): {:?}",
            self.state.id(),
            self.scenes.len(),
            self.scenes.names()
        );

        self.state.set_running(true);
        self.clock.reset(Instant::now());

        if self.render_on_start {
            self.scenes.render_top(&self.handle, self.screen.as_mut())?;
            self.check_screen()?;
        }

        Ok(())
    }

    /// Runs one loop iteration.
    ///
    /// Order within a tick:
    /// 1. measure the clamped `dt`
    /// 2. poll input and dispatch it to the top scene
    /// 3. `update(dt)`, unless a `handle_input` returned `false`
    /// 4. `render()`
    /// 5. sleep out the rest of the frame budget
    ///
    /// Steps 3 and 4 are skipped when the stack became empty during input.
    /// Returns [`TickControl::Exit`] when the app is no longer running or
    /// its stack is empty.
    pub fn tick(&mut self) -> EngineResult<TickControl> {
        let frame_start = Instant::now();

        //--- Step 1: Frame timing -----------------------------------------
        let dt = self.clock.advance(frame_start);

        //--- Step 2: Input -------------------------------------------------
        let timeout = self
            .frame_budget
            .map_or(Duration::ZERO, |budget| budget.saturating_sub(frame_start.elapsed()));

        let mut events = Vec::new();
        self.input.poll(timeout, self.max_events_per_tick, &mut events);

        let mut skip_update = false;
        for event in &events {
            if self.scenes.is_empty() {
                debug!("Stack empty, dropping remaining input");
                break;
            }

            if *event == InputEvent::Closed {
                self.handle_input_closed();
                break;
            }

            if !self.scenes.dispatch_input(event, &self.handle, self.screen.as_mut())? {
                skip_update = true;
            }
        }

        //--- Step 3 & 4: Update and render ---------------------------------
        if self.scenes.is_empty() {
            trace!("Stack emptied during input, skipping update and render");
        } else {
            if skip_update {
                trace!("Update skipped by handle_input");
            } else {
                self.scenes.update_top(dt, &self.handle, self.screen.as_mut())?;
            }

            self.scenes.render_top(&self.handle, self.screen.as_mut())?;
        }

        self.check_screen()?;

        //--- Step 5: Pacing & exit check -----------------------------------
        if !self.state.is_running() || self.scenes.is_empty() {
            return Ok(TickControl::Exit);
        }

        if let Some(budget) = self.frame_budget {
            let elapsed = frame_start.elapsed();
            if elapsed < budget {
                thread::sleep(budget - elapsed);
            }
        }

        Ok(TickControl::Continue)
    }

    /// Ends a run: clears the running flag, then exits and detaches every
    /// remaining scene from top to bottom.
    pub fn shutdown(&mut self) {
        self.state.set_running(false);

        if !self.scenes.is_empty() {
            debug!("{} closing {} remaining scene(s)", self.state.id(), self.scenes.len());
        }
        self.scenes.close_all(&self.handle, self.screen.as_mut());
        self.input.release();
    }

    //--- Internal Helpers -------------------------------------------------

    fn run_loop(&mut self) -> EngineResult<()> {
        loop {
            if let TickControl::Exit = self.tick()? {
                return Ok(());
            }
        }
    }

    fn handle_input_closed(&mut self) {
        info!("{} input closed, stopping", self.state.id());
        self.screen.show(INTERRUPTED_MESSAGE);
        self.state.set_running(false);
    }

    fn check_screen(&mut self) -> EngineResult<()> {
        match self.screen.take_error() {
            Some(e) => Err(EngineError::Screen(e)),
            None => Ok(()),
        }
    }
}

impl Default for GameApp {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
