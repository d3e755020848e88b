//=========================================================================
// Engine Showcase
//
// Terminal demo for the Lantern Engine: a live dashboard that keeps
// animating between commands, with pause and summary scenes stacked on
// top of it.
//
// Scenes:
// - Title: replaced by the dashboard, or stops the app
// - Dashboard: spinner driven by `update`; boost/slow, pause, finish
// - Paused: pushed over the dashboard; popping it resumes the animation
// - Summary: replaces the dashboard; restart or back to the title
//
// Run:
//   engine-showcase --fps 12
//   engine-showcase --no-raw-input
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::VecDeque;
use std::fmt::Write as _;

use anyhow::{ensure, Context};
use clap::Parser;
use log::{debug, info};

use lantern_engine::logging::{init_logging, LoggingConfig};
use lantern_engine::prelude::*;

//=== Command Line ========================================================

#[derive(Debug, Parser)]
#[command(name = "engine-showcase", version, about = "Live dashboard showing scene transitions and real-time updates")]
struct Args {
    /// Loop pacing in frames per second (0 = unpaced)
    #[arg(long, default_value_t = 12.0)]
    fps: f64,

    /// Read whole lines instead of single key presses
    #[arg(long)]
    no_raw_input: bool,

    /// Log filter, e.g. `debug` or `lantern_engine=trace` (defaults to RUST_LOG)
    #[arg(long)]
    log: Option<String>,
}

/// Options shared by every scene of the showcase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Settings {
    raw_input: bool,
}

fn normalize(command: &str) -> String {
    command.trim().to_ascii_lowercase()
}

//=== Title Scene =========================================================

struct Title {
    settings: Settings,
    message: String,
}

impl Title {
    fn new(settings: Settings) -> Self {
        Self {
            settings,
            message: "Type 'start' to open the dashboard or 'quit' to exit.".to_string(),
        }
    }
}

impl TextGame for Title {
    fn display_text(&self) -> String {
        let mut text = String::new();
        text.push_str("=== ENGINE SHOWCASE ===\n\n");
        text.push_str("Welcome to the engine showcase!\n\n");
        text.push_str("This demo walks through scene stack transitions,\n");
        text.push_str("real-time updates between commands and optional raw input.\n\n");
        text.push_str("Commands:\n");
        text.push_str("  start  - switch to the live dashboard\n");
        text.push_str("  quit   - leave the showcase");
        if self.settings.raw_input {
            text.push_str("\n\nTip: raw input is on, so arrow keys respond instantly.");
        }
        text.push('\n');
        text.push_str(&self.message);
        text
    }

    fn process_command(&mut self, command: &str, ctx: &mut SceneContext<'_>) {
        match normalize(command).as_str() {
            "" | "start" | "s" => {
                info!("opening the dashboard");
                ctx.replace_scene(dashboard_scene(self.settings));
            }
            "quit" | "q" | "exit" => ctx.stop(),
            _ => self.message = "Unknown command. Type 'start' or 'quit'.".to_string(),
        }
    }

    fn process_key(&mut self, key: KeyCode, ctx: &mut SceneContext<'_>) {
        if key == KeyCode::Escape {
            ctx.stop();
        }
    }
}

fn title_scene(settings: Settings) -> TextScene<Title> {
    TextScene::new("Engine Showcase", Title::new(settings))
        .with_prompt("Start? ")
        .with_color("94")
}

//=== Dashboard Scene =====================================================

const HISTORY_SIZE: usize = 5;
const SPINNER_FRAMES: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
const FRAME_TIME: f64 = 0.35;
const MIN_BOOST: u32 = 1;
const MAX_BOOST: u32 = 5;

/// Figures handed from the dashboard to the summary.
#[derive(Debug, Clone, PartialEq)]
struct ShowcaseSummary {
    total_ticks: u64,
    boost: u32,
    raw_input: bool,
    recent_actions: Vec<String>,
    elapsed: f64,
}

/// Animated dashboard. Time spent under the pause scene does not count.
struct Dashboard {
    settings: Settings,
    frame: usize,
    frame_elapsed: f64,
    runtime: f64,
    wall: f64,
    ticks: u64,
    boost: u32,
    history: VecDeque<String>,
    paused: bool,
    message: String,
}

impl Dashboard {
    fn new(settings: Settings) -> Self {
        Self {
            settings,
            frame: 0,
            frame_elapsed: 0.0,
            runtime: 0.0,
            wall: 0.0,
            ticks: 0,
            boost: MIN_BOOST,
            history: VecDeque::with_capacity(HISTORY_SIZE + 1),
            paused: false,
            message: "Use boost/slow, pause, finish, or quit.".to_string(),
        }
    }

    /// Adds a stamped entry and keeps only the newest few.
    fn record_action(&mut self, entry: &str) {
        self.history.push_back(format!("[{:>7.2}s] {entry}", self.wall));
        while self.history.len() > HISTORY_SIZE {
            self.history.pop_front();
        }
    }

    fn spinner(&self) -> char {
        SPINNER_FRAMES[self.frame]
    }

    fn set_boost(&mut self, delta: i32) {
        let boost = self.boost.saturating_add_signed(delta).clamp(MIN_BOOST, MAX_BOOST);
        if boost != self.boost {
            self.boost = boost;
            self.record_action(&format!("Boost changed to x{boost}."));
            debug!("boost now x{}", boost);
        }
    }

    /// Advances the animation. Returns true when the spinner moved.
    fn advance(&mut self, dt: f64) -> bool {
        let scaled = dt * f64::from(self.boost);
        self.wall += dt;
        self.runtime += scaled;
        self.frame_elapsed += scaled;

        let mut moved = false;
        while self.frame_elapsed >= FRAME_TIME {
            self.frame_elapsed -= FRAME_TIME;
            self.frame = (self.frame + 1) % SPINNER_FRAMES.len();
            self.ticks += 1;
            moved = true;
        }
        moved
    }

    fn summary(&self) -> ShowcaseSummary {
        ShowcaseSummary {
            total_ticks: self.ticks,
            boost: self.boost,
            raw_input: self.settings.raw_input,
            recent_actions: self.history.iter().cloned().collect(),
            elapsed: self.wall,
        }
    }
}

impl TextGame for Dashboard {
    fn display_text(&self) -> String {
        let mut text = String::new();
        text.push_str("=== LIVE DASHBOARD ===\n\n");
        let _ = writeln!(text, "Spinner: {}", self.spinner());
        let _ = writeln!(text, "Ticks:   {}", self.ticks);
        let _ = writeln!(text, "Boost:   x{}", self.boost);
        let _ = writeln!(text, "Runtime: {:05.2} s", self.runtime);
        text.push_str("\nRecent actions:\n");
        if self.history.is_empty() {
            text.push_str("  (no actions recorded yet)\n");
        }
        for entry in &self.history {
            text.push_str(entry);
            text.push('\n');
        }
        text.push_str("\nCommands:\n");
        text.push_str("  boost / + / Up     speed up the animation\n");
        text.push_str("  slow  / - / Down   slow the animation down\n");
        text.push_str("  pause              push a pause scene onto the stack\n");
        text.push_str("  finish             jump to the summary\n");
        text.push_str("  quit               stop the showcase\n");
        text.push_str(&self.message);
        text
    }

    fn process_command(&mut self, command: &str, ctx: &mut SceneContext<'_>) {
        match normalize(command).as_str() {
            "" => {
                self.record_action("Tick acknowledged.");
                self.message = "Animation continues. Try 'boost' or 'pause'.".to_string();
            }
            "boost" | "+" => {
                self.set_boost(1);
                self.message = "Boost increased.".to_string();
            }
            "slow" | "-" => {
                self.set_boost(-1);
                self.message = "Boost decreased.".to_string();
            }
            "pause" | "p" => {
                self.paused = true;
                ctx.push_scene(pause_scene(self.ticks, self.boost));
            }
            "finish" | "f" => {
                let summary = self.summary();
                info!("dashboard finished after {} ticks", summary.total_ticks);
                ctx.replace_scene(summary_scene(summary, self.settings));
            }
            "quit" | "q" | "exit" => ctx.stop(),
            _ => self.message = "Unknown command. Try boost, slow, pause, finish, or quit.".to_string(),
        }
    }

    fn process_key(&mut self, key: KeyCode, ctx: &mut SceneContext<'_>) {
        match key {
            KeyCode::ArrowUp => self.process_command("boost", ctx),
            KeyCode::ArrowDown => self.process_command("slow", ctx),
            KeyCode::Escape => self.process_command("pause", ctx),
            _ => {}
        }
    }

    fn on_enter(&mut self, _ctx: &mut SceneContext<'_>) {
        self.record_action("Dashboard initialised.");
    }

    fn on_exit(&mut self, _ctx: &mut SceneContext<'_>) {
        self.record_action("Dashboard closed.");
    }

    // Only the top scene is updated, so the first update after a pause
    // means the pause scene has been popped.
    fn update(&mut self, dt: f64, _ctx: &mut SceneContext<'_>) -> bool {
        let mut changed = false;
        if self.paused {
            self.paused = false;
            self.record_action("Resumed from pause scene.");
            self.message = "Resumed from pause.".to_string();
            changed = true;
        }
        self.advance(dt) || changed
    }
}

fn dashboard_scene(settings: Settings) -> TextScene<Dashboard> {
    TextScene::new("Live Dashboard", Dashboard::new(settings))
        .with_prompt("Command: ")
        .with_color("92")
}

//=== Pause Scene =========================================================

struct Paused {
    ticks: u64,
    boost: u32,
    message: String,
}

impl TextGame for Paused {
    fn display_text(&self) -> String {
        let mut text = String::new();
        text.push_str("=== PAUSED ===\n\n");
        text.push_str("The dashboard is waiting underneath this scene.\n");
        let _ = writeln!(text, "Ticks so far: {}", self.ticks);
        let _ = writeln!(text, "Boost level:  x{}", self.boost);
        text.push_str("\nPress Enter or type 'resume' to continue, 'quit' to exit.");
        if !self.message.is_empty() {
            text.push('\n');
            text.push_str(&self.message);
        }
        text
    }

    fn process_command(&mut self, command: &str, ctx: &mut SceneContext<'_>) {
        match normalize(command).as_str() {
            "" | "resume" | "r" | "continue" => ctx.pop_scene(),
            "quit" | "q" | "exit" => ctx.stop(),
            _ => self.message = "Unknown command. Type 'resume' or 'quit'.".to_string(),
        }
    }

    fn process_key(&mut self, key: KeyCode, ctx: &mut SceneContext<'_>) {
        if key == KeyCode::Escape {
            ctx.pop_scene();
        }
    }
}

fn pause_scene(ticks: u64, boost: u32) -> TextScene<Paused> {
    let paused = Paused {
        ticks,
        boost,
        message: String::new(),
    };
    TextScene::new("Paused", paused).with_prompt("Paused> ").with_color("93")
}

//=== Summary Scene =======================================================

struct Summary {
    summary: ShowcaseSummary,
    settings: Settings,
    message: String,
}

impl TextGame for Summary {
    fn display_text(&self) -> String {
        let s = &self.summary;
        let mut text = String::new();
        text.push_str("=== SHOWCASE SUMMARY ===\n\n");
        let _ = writeln!(text, "Total ticks: {}", s.total_ticks);
        let _ = writeln!(text, "Final boost: x{}", s.boost);
        let _ = writeln!(text, "Raw input:   {}", if s.raw_input { "yes" } else { "no" });
        let _ = writeln!(text, "Elapsed:     {:.2} s", s.elapsed);
        text.push_str("\nRecent actions:\n");
        if s.recent_actions.is_empty() {
            text.push_str("  (none)\n");
        }
        for entry in &s.recent_actions {
            text.push_str(entry);
            text.push('\n');
        }
        text.push_str("\nType 'restart' for another run, 'menu' for the title, or 'quit'.");
        if !self.message.is_empty() {
            text.push('\n');
            text.push_str(&self.message);
        }
        text
    }

    fn process_command(&mut self, command: &str, ctx: &mut SceneContext<'_>) {
        match normalize(command).as_str() {
            "restart" | "r" => ctx.replace_scene(dashboard_scene(self.settings)),
            "menu" | "m" => ctx.replace_scene(title_scene(self.settings)),
            "quit" | "q" | "exit" => ctx.stop(),
            _ => self.message = "Unknown command. Type 'restart', 'menu' or 'quit'.".to_string(),
        }
    }
}

fn summary_scene(summary: ShowcaseSummary, settings: Settings) -> TextScene<Summary> {
    let summary = Summary {
        summary,
        settings,
        message: String::new(),
    };
    TextScene::new("Showcase Summary", summary)
        .with_prompt("Summary> ")
        .with_color("95")
}

//=== Entry Point =========================================================

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_logging(args.log.clone().map_or_else(LoggingConfig::default, LoggingConfig::with_filter));

    ensure!(
        args.fps.is_finite() && args.fps >= 0.0,
        "--fps must be a non-negative number, got {}",
        args.fps
    );

    let settings = Settings {
        raw_input: !args.no_raw_input,
    };
    let mut app = GameApp::builder()
        .with_target_fps(args.fps)
        .with_raw_input(settings.raw_input)
        .build();
    app.push_scene(title_scene(settings))?;

    info!("engine showcase starting (raw input: {})", settings.raw_input);
    app.run().context("game loop failed")?;

    Ok(())
}

//=========================================================================
// Unit Tests
//=========================================================================
