//=========================================================================
// Crystal Collector
//
// Terminal demo for the Lantern Engine: walk a small grid, pick up every
// crystal before the energy runs out, and avoid the hazards.
//
// Scenes:
// - Title: pushes a fresh game, or stops the app
// - CrystalCollector: the board itself; `Q` pops back to the title
//
// Run:
//   crystal-collector --width 8 --height 6 --crystals 7 --seed 42
//   crystal-collector --raw
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashSet;
use std::fmt::Write as _;

use anyhow::{ensure, Context};
use clap::Parser;
use log::{debug, info};
use thiserror::Error;

use lantern_engine::logging::{init_logging, LoggingConfig};
use lantern_engine::prelude::*;

//=== Command Line ========================================================

#[derive(Debug, Parser)]
#[command(name = "crystal-collector", version, about = "Collect every crystal before your energy runs out")]
struct Args {
    /// Board width in tiles (at least 3)
    #[arg(long, default_value_t = 6)]
    width: usize,

    /// Board height in tiles (at least 3)
    #[arg(long, default_value_t = 6)]
    height: usize,

    /// Number of crystals placed on the board
    #[arg(long, default_value_t = 5)]
    crystals: usize,

    /// Starting energy; every move costs one
    #[arg(long, default_value_t = 18)]
    energy: u32,

    /// Move with single key presses (arrow keys included) instead of lines
    #[arg(long)]
    raw: bool,

    /// Seed for reproducible boards
    #[arg(long)]
    seed: Option<u64>,

    /// Loop pacing in frames per second (0 = unpaced)
    #[arg(long, default_value_t = 30.0)]
    fps: f64,

    /// Log filter, e.g. `debug` or `lantern_engine=trace` (defaults to RUST_LOG)
    #[arg(long)]
    log: Option<String>,
}

//=== Board Configuration =================================================

const MIN_SIDE: usize = 3;

#[derive(Debug, Error, PartialEq, Eq)]
enum BoardError {
    #[error("board must be at least 3x3, got {width}x{height}")]
    TooSmall { width: usize, height: usize },

    #[error("board of {width}x{height} tiles is too large")]
    TooLarge { width: usize, height: usize },

    #[error("crystal count must be between 1 and {max}, got {crystals}")]
    CrystalCount { crystals: usize, max: usize },
}

/// Validated board parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BoardConfig {
    width: usize,
    height: usize,
    crystals: usize,
    energy: u32,
}

impl BoardConfig {
    fn new(width: usize, height: usize, crystals: usize, energy: u32) -> Result<Self, BoardError> {
        if width < MIN_SIDE || height < MIN_SIDE {
            return Err(BoardError::TooSmall { width, height });
        }

        let tiles = width
            .checked_mul(height)
            .ok_or(BoardError::TooLarge { width, height })?;

        // One tile always stays free for the player.
        let max = tiles - 1;
        if crystals == 0 || crystals > max {
            return Err(BoardError::CrystalCount { crystals, max });
        }

        Ok(Self {
            width,
            height,
            crystals,
            energy: energy.max(1),
        })
    }

    /// Cannot overflow: `new` has checked the product.
    fn tiles(&self) -> usize {
        self.width * self.height
    }

    /// Half as many hazards as crystals (at least one), limited by the
    /// tiles left after the player and the crystals.
    fn hazards(&self) -> usize {
        let free = self.tiles() - 1 - self.crystals;
        (self.crystals / 2).max(1).min(free)
    }

    fn center(&self) -> Pos {
        (self.width / 2, self.height / 2)
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            width: 6,
            height: 6,
            crystals: 5,
            energy: 18,
        }
    }
}

//=== Title Scene =========================================================

/// Title screen: starts runs and quits the app.
struct Title {
    config: BoardConfig,
    rng: fastrand::Rng,
    runs: u32,
    message: String,
}

impl Title {
    fn new(config: BoardConfig, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };

        Self {
            config,
            rng,
            runs: 0,
            message: String::new(),
        }
    }

    fn start_run(&mut self, ctx: &mut SceneContext<'_>) {
        self.runs += 1;
        let game = CrystalCollector::new(self.config, fastrand::Rng::with_seed(self.rng.u64(..)));
        info!("starting run {}", self.runs);
        ctx.push_scene(TextScene::new("CrystalCollector", game).with_color("1"));
    }
}

impl TextGame for Title {
    fn display_text(&self) -> String {
        let mut text = String::new();
        text.push_str("=== CRYSTAL COLLECTOR ===\n\n");
        let _ = writeln!(
            text,
            "Board {}x{}, {} crystals, {} energy.",
            self.config.width, self.config.height, self.config.crystals, self.config.energy
        );
        if self.runs > 0 {
            let _ = writeln!(text, "Runs so far: {}", self.runs);
        }
        text.push_str("\nPress Enter or P to play, Q to quit.");
        if !self.message.is_empty() {
            text.push('\n');
            text.push_str(&self.message);
        }
        text
    }

    fn process_command(&mut self, command: &str, ctx: &mut SceneContext<'_>) {
        self.message.clear();
        match command.trim().to_ascii_lowercase().as_str() {
            "" | "p" | "play" => self.start_run(ctx),
            "q" | "quit" | "exit" => {
                info!("player quit from the title screen");
                ctx.stop();
            }
            other => self.message = format!("Unknown command '{other}'."),
        }
    }

    fn process_key(&mut self, key: KeyCode, ctx: &mut SceneContext<'_>) {
        if key == KeyCode::Escape {
            ctx.stop();
        }
    }
}

//=== Crystal Collector ===================================================

type Pos = (usize, usize);

const ENCOURAGEMENTS: [&str; 4] = [
    "Nice find!",
    "Shiny!",
    "Another one for the collection.",
    "The crystals hum as you pick them up.",
];

const CONTROLS: &str = "Controls: W/A/S/D to move, R to restart, Q to quit.";
const LEGEND: &str = "Legend: P=Player, *=Crystal, X=Hazard";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Playing,
    Won,
    Lost,
}

/// What the scene should do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Stay,
    ReturnToTitle,
}

/// The board game played inside a [`TextScene`].
struct CrystalCollector {
    config: BoardConfig,
    rng: fastrand::Rng,
    player: Pos,
    crystals: HashSet<Pos>,
    hazards: HashSet<Pos>,
    energy: u32,
    moves: u32,
    state: RunState,
    message: String,
}

impl CrystalCollector {
    fn new(config: BoardConfig, rng: fastrand::Rng) -> Self {
        let mut game = Self {
            config,
            rng,
            player: config.center(),
            crystals: HashSet::new(),
            hazards: HashSet::new(),
            energy: config.energy,
            moves: 0,
            state: RunState::Playing,
            message: String::new(),
        };
        game.reset();
        game
    }

    //--- Board Setup -------------------------------------------------------

    fn reset(&mut self) {
        self.player = self.config.center();
        self.energy = self.config.energy;
        self.moves = 0;
        self.state = RunState::Playing;

        let mut taken = HashSet::from([self.player]);
        self.crystals = self.scatter(self.config.crystals, &mut taken);
        self.hazards = self.scatter(self.config.hazards(), &mut taken);
        self.message = "Collect every crystal before your energy runs out.".to_string();

        debug!(
            "board reset: {} crystals, {} hazards",
            self.crystals.len(),
            self.hazards.len()
        );
    }

    /// Picks `count` distinct free tiles and marks them taken.
    fn scatter(&mut self, count: usize, taken: &mut HashSet<Pos>) -> HashSet<Pos> {
        let mut free: Vec<Pos> = (0..self.config.height)
            .flat_map(|y| (0..self.config.width).map(move |x| (x, y)))
            .filter(|pos| !taken.contains(pos))
            .collect();
        self.rng.shuffle(&mut free);
        free.truncate(count);

        taken.extend(free.iter().copied());
        free.into_iter().collect()
    }

    //--- Commands ----------------------------------------------------------

    fn step(&mut self, command: &str) -> Command {
        let command = command.trim().to_ascii_lowercase();

        match command.as_str() {
            "" => {
                self.message = "Type a direction (W/A/S/D) and press Enter.".to_string();
                return Command::Stay;
            }
            "q" | "quit" | "exit" => return Command::ReturnToTitle,
            "r" | "restart" => {
                self.reset();
                self.message = "A new board appears.".to_string();
                return Command::Stay;
            }
            _ => {}
        }

        if self.state != RunState::Playing {
            self.message = "This run is over. Press R to restart or Q to return to the title.".to_string();
            return Command::Stay;
        }

        let delta = match command.chars().next() {
            Some('w') => (0, -1),
            Some('s') => (0, 1),
            Some('a') => (-1, 0),
            Some('d') => (1, 0),
            _ => {
                self.message = format!("Unknown command '{command}'. Use W/A/S/D, R or Q.");
                return Command::Stay;
            }
        };

        self.move_player(delta);
        Command::Stay
    }

    fn move_player(&mut self, (dx, dy): (isize, isize)) {
        let target = (
            clamp_axis(self.player.0, dx, self.config.width),
            clamp_axis(self.player.1, dy, self.config.height),
        );

        self.moves += 1;
        self.energy = self.energy.saturating_sub(1);

        if target == self.player {
            self.message = "You bump into the edge of the world.".to_string();
        } else {
            self.player = target;
            self.message.clear();
        }

        if self.hazards.contains(&self.player) {
            self.state = RunState::Lost;
            self.message = "Oh no! You stepped on a hazard. Game over.".to_string();
            info!("run lost on a hazard after {} moves", self.moves);
            return;
        }

        if self.crystals.remove(&self.player) {
            if self.crystals.is_empty() {
                self.state = RunState::Won;
                self.message = format!("You collected all the crystals in {} moves!", self.moves);
                info!("run won in {} moves", self.moves);
                return;
            }
            self.message = ENCOURAGEMENTS[self.rng.usize(..ENCOURAGEMENTS.len())].to_string();
        }

        if self.energy == 0 {
            self.state = RunState::Lost;
            self.message = "You ran out of energy. Game over.".to_string();
            info!("run lost to exhaustion after {} moves", self.moves);
        }
    }

    //--- Rendering ---------------------------------------------------------

    fn tile(&self, pos: Pos) -> char {
        if pos == self.player {
            'P'
        } else if self.crystals.contains(&pos) {
            '*'
        } else if self.hazards.contains(&pos) {
            'X'
        } else {
            '.'
        }
    }

    fn board(&self) -> String {
        let border = format!("+{}+", "-".repeat(self.config.width));
        let mut out = String::new();
        out.push_str(&border);
        out.push('\n');
        for y in 0..self.config.height {
            out.push('|');
            out.extend((0..self.config.width).map(|x| self.tile((x, y))));
            out.push_str("|\n");
        }
        out.push_str(&border);
        out
    }
}

fn clamp_axis(value: usize, delta: isize, len: usize) -> usize {
    value.saturating_add_signed(delta).min(len - 1)
}

impl TextGame for CrystalCollector {
    fn display_text(&self) -> String {
        let mut text = self.board();
        let _ = write!(
            text,
            "\nEnergy: {:>2}   Crystals left: {:>2}   Moves: {}",
            self.energy,
            self.crystals.len(),
            self.moves
        );
        if !self.message.is_empty() {
            text.push('\n');
            text.push_str(&self.message);
        }
        text.push('\n');
        text.push_str(CONTROLS);
        text.push('\n');
        text.push_str(LEGEND);
        text
    }

    fn process_command(&mut self, command: &str, ctx: &mut SceneContext<'_>) {
        if self.step(command) == Command::ReturnToTitle {
            info!("returning to the title after {} moves", self.moves);
            ctx.pop_scene();
        }
    }

    fn process_key(&mut self, key: KeyCode, ctx: &mut SceneContext<'_>) {
        let command = match key {
            KeyCode::ArrowUp => "w",
            KeyCode::ArrowDown => "s",
            KeyCode::ArrowLeft => "a",
            KeyCode::ArrowRight => "d",
            KeyCode::Escape => "q",
            _ => return,
        };
        self.process_command(command, ctx);
    }
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
    let config = BoardConfig::new(args.width, args.height, args.crystals, args.energy)
        .context("invalid board settings")?;

    let mut app = GameApp::builder()
        .with_target_fps(args.fps)
        .with_raw_input(args.raw)
        .build();
    app.push_scene(TextScene::new("Title", Title::new(config, args.seed)))?;

    info!("crystal collector starting ({}x{})", config.width, config.height);
    app.run().context("game loop failed")?;

    Ok(())
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn game(config: BoardConfig) -> CrystalCollector {
        CrystalCollector::new(config, fastrand::Rng::with_seed(7))
    }

    /// 3x3 board with the player in the middle and a hand-placed layout.
    fn fixed(crystals: &[Pos], hazards: &[Pos], energy: u32) -> CrystalCollector {
        let config = BoardConfig::new(3, 3, crystals.len().max(1), energy).unwrap();
        let mut g = game(config);
        g.crystals = crystals.iter().copied().collect();
        g.hazards = hazards.iter().copied().collect();
        g
    }

    #[test]
    fn board_validation() {
        assert_eq!(
            BoardConfig::new(2, 5, 1, 10),
            Err(BoardError::TooSmall { width: 2, height: 5 })
        );
        assert_eq!(
            BoardConfig::new(3, 3, 0, 10),
            Err(BoardError::CrystalCount { crystals: 0, max: 8 })
        );
        assert_eq!(
            BoardConfig::new(3, 3, 9, 10),
            Err(BoardError::CrystalCount { crystals: 9, max: 8 })
        );
        assert_eq!(BoardConfig::new(3, 3, 2, 0).unwrap().energy, 1);
    }

    #[test]
    fn oversized_board_is_rejected() {
        assert_eq!(
            BoardConfig::new(usize::MAX, 3, 1, 10),
            Err(BoardError::TooLarge { width: usize::MAX, height: 3 })
        );
        assert_eq!(
            BoardConfig::new(3, usize::MAX / 2, 1, 10),
            Err(BoardError::TooLarge { width: 3, height: usize::MAX / 2 })
        );
    }

    #[test]
    fn hazard_count_follows_crystals_and_space() {
        assert_eq!(BoardConfig::default().hazards(), 2);
        assert_eq!(BoardConfig::new(4, 4, 1, 5).unwrap().hazards(), 1);
        assert_eq!(BoardConfig::new(3, 3, 7, 5).unwrap().hazards(), 1);
        assert_eq!(BoardConfig::new(3, 3, 8, 5).unwrap().hazards(), 0);
    }

    #[test]
    fn dense_board_fills_every_other_tile() {
        let g = game(BoardConfig::new(3, 3, 8, 5).unwrap());

        assert_eq!(g.player, (1, 1));
        assert_eq!(g.crystals.len(), 8);
        assert!(g.hazards.is_empty());
        assert!(!g.crystals.contains(&g.player));
    }

    #[test]
    fn layout_never_overlaps() {
        for seed in 0..50 {
            let g = CrystalCollector::new(BoardConfig::default(), fastrand::Rng::with_seed(seed));
            assert_eq!(g.crystals.len(), 5);
            assert_eq!(g.hazards.len(), 2);
            assert!(g.crystals.is_disjoint(&g.hazards));
            assert!(!g.crystals.contains(&g.player));
            assert!(!g.hazards.contains(&g.player));
        }
    }

    #[test]
    fn same_seed_same_board() {
        let a = CrystalCollector::new(BoardConfig::default(), fastrand::Rng::with_seed(42));
        let b = CrystalCollector::new(BoardConfig::default(), fastrand::Rng::with_seed(42));
        assert_eq!(a.board(), b.board());
    }

    #[test]
    fn moves_cost_energy_and_bump_at_edges() {
        let mut g = fixed(&[(2, 2)], &[], 10);

        g.step("w");
        assert_eq!(g.player, (1, 0));
        g.step("w");
        assert_eq!(g.player, (1, 0));
        assert_eq!(g.message, "You bump into the edge of the world.");
        assert_eq!(g.energy, 8);
        assert_eq!(g.moves, 2);
    }

    #[test]
    fn collecting_the_last_crystal_wins() {
        let mut g = fixed(&[(2, 1), (2, 2)], &[], 10);

        g.step("d");
        assert_eq!(g.crystals.len(), 1);
        assert!(ENCOURAGEMENTS.contains(&g.message.as_str()));

        g.step("s");
        assert_eq!(g.state, RunState::Won);
        assert_eq!(g.message, "You collected all the crystals in 2 moves!");
    }

    #[test]
    fn hazard_ends_the_run() {
        let mut g = fixed(&[(2, 2)], &[(0, 1)], 10);

        g.step("a");
        assert_eq!(g.state, RunState::Lost);

        g.step("d");
        assert_eq!(g.player, (0, 1));
        assert!(g.message.starts_with("This run is over."));
    }

    #[test]
    fn running_out_of_energy_ends_the_run() {
        let mut g = fixed(&[(2, 2)], &[], 1);

        g.step("w");

        assert_eq!(g.state, RunState::Lost);
        assert_eq!(g.message, "You ran out of energy. Game over.");
    }

    #[test]
    fn commands() {
        let mut g = fixed(&[(2, 2)], &[], 10);

        assert_eq!(g.step("   "), Command::Stay);
        assert!(g.message.contains("W/A/S/D"));
        assert_eq!(g.step("jump"), Command::Stay);
        assert!(g.message.starts_with("Unknown command 'jump'"));
        assert_eq!(g.moves, 0);
        assert_eq!(g.step("QUIT"), Command::ReturnToTitle);

        g.step("d");
        g.step("restart");
        assert_eq!(g.moves, 0);
        assert_eq!(g.player, (1, 1));
    }

    #[test]
    fn display_shows_board_and_status() {
        let g = fixed(&[(0, 0)], &[(2, 2)], 9);
        let text = g.display_text();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(&lines[..5], ["+---+", "|*..|", "|.P.|", "|..X|", "+---+"]);
        assert_eq!(lines[5], "Energy:  9   Crystals left:  1   Moves: 0");
        assert!(text.ends_with(LEGEND));
    }

    #[test]
    fn title_plays_returns_and_quits() {
        let screen = MemoryScreen::new();
        let config = BoardConfig::new(3, 3, 1, 10).unwrap();
        let input = ScriptedInput::lines(["p", "q", "q"]);
        let mut app = GameApp::builder()
            .with_target_fps(0.0)
            .with_screen(screen.clone())
            .with_input(input)
            .build();
        app.push_scene(TextScene::new("Title", Title::new(config, Some(3))))
            .unwrap();

        app.start().unwrap();
        assert_eq!(app.tick().unwrap(), TickControl::Continue);
        assert_eq!(app.scene_names(), ["Title", "CrystalCollector"]);
        assert!(screen.lines().iter().any(|line| line.contains("Crystals left")));

        assert_eq!(app.tick().unwrap(), TickControl::Continue);
        assert_eq!(app.scene_names(), ["Title"]);
        let title = app.current_scene_as::<TextScene<Title>>().unwrap();
        assert_eq!(title.game().runs, 1);

        assert_eq!(app.tick().unwrap(), TickControl::Exit);
        app.shutdown();
        assert_eq!(app.scene_count(), 0);
    }
}
