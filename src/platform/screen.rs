//=========================================================================
// Screen
//
// Output sink scenes draw into.
//
// Responsibilities:
// - Accept whole messages and screen clears from scenes
// - Hide the terminal details (ANSI clear vs. newline fallback)
// - Hold on to the first I/O failure so the game loop can abort the run
//   at the end of the tick instead of failing mid-frame
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::cell::RefCell;
use std::io::{self, IsTerminal, Write};
use std::rc::Rc;

//=== External Crates =====================================================

use crossterm::terminal;
use log::error;

//=== Constants ===========================================================

/// ANSI "erase display" followed by "cursor home".
const ANSI_CLEAR: &str = "\x1b[2J\x1b[H";

/// Lines pushed out when the output is not a terminal.
const FALLBACK_CLEAR_LINES: usize = 5;

//=== Screen Trait ========================================================

/// Output sink for rendering.
pub trait Screen {
    /// Writes `message` followed by a line break.
    fn show(&mut self, message: &str);

    /// Clears whatever is currently visible.
    fn clear(&mut self);

    /// Returns (and forgets) the first output failure since the last call.
    fn take_error(&mut self) -> Option<io::Error> {
        None
    }
}

//=== TerminalScreen ======================================================

/// Writes to a terminal (stdout by default) or any other writer.
pub struct TerminalScreen<W: Write = io::Stdout> {
    out: W,
    ansi: bool,

    /// `Some` forces the line ending; `None` uses `\r\n` only while the
    /// terminal is in raw mode.
    crlf: Option<bool>,
    error: Option<io::Error>,
}

impl TerminalScreen {
    /// Screen on stdout; ANSI clears are used only when stdout is a tty.
    pub fn stdout() -> Self {
        let out = io::stdout();
        let ansi = out.is_terminal();
        Self {
            crlf: None,
            ..Self::new(out, ansi)
        }
    }
}

impl<W: Write> TerminalScreen<W> {
    /// Wraps `out`. With `ansi == false` clears fall back to blank lines.
    pub fn new(out: W, ansi: bool) -> Self {
        Self {
            out,
            ansi,
            crlf: Some(false),
            error: None,
        }
    }

    /// Ends lines with `\r\n` instead of `\n`, as a terminal in raw mode
    /// needs.
    pub fn with_crlf(mut self, crlf: bool) -> Self {
        self.crlf = Some(crlf);
        self
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_text(&mut self, text: &str) {
        if self.error.is_some() {
            return;
        }

        let result = self
            .out
            .write_all(text.as_bytes())
            .and_then(|()| self.out.flush());

        if let Err(e) = result {
            error!("Screen write failed: {}", e);
            self.error = Some(e);
        }
    }
}

impl<W: Write> Screen for TerminalScreen<W> {
    fn show(&mut self, message: &str) {
        let crlf = self
            .crlf
            .unwrap_or_else(|| terminal::is_raw_mode_enabled().unwrap_or(false));

        if crlf {
            self.write_text(&format!("{}\r\n", message.replace('\n', "\r\n")));
        } else {
            self.write_text(&format!("{message}\n"));
        }
    }

    fn clear(&mut self) {
        if self.ansi {
            self.write_text(ANSI_CLEAR);
        } else {
            self.write_text(&"\n".repeat(FALLBACK_CLEAR_LINES));
        }
    }

    fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }
}

//=== MemoryScreen ========================================================

/// In-memory screen for tests and headless runs.
///
/// Clones share the same buffer, so one clone can be handed to the app
/// while another is kept for inspection.
#[derive(Debug, Clone, Default)]
pub struct MemoryScreen {
    log: Rc<RefCell<ScreenLog>>,
}

#[derive(Debug, Default)]
struct ScreenLog {
    lines: Vec<String>,
    clears: usize,
}

impl MemoryScreen {
    /// Creates an empty screen.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every message shown so far, in order.
    pub fn lines(&self) -> Vec<String> {
        self.log.borrow().lines.clone()
    }

    /// Number of times the screen was cleared.
    pub fn clear_count(&self) -> usize {
        self.log.borrow().clears
    }

    /// Returns true if any shown message equals `message`.
    pub fn contains(&self, message: &str) -> bool {
        self.log.borrow().lines.iter().any(|line| line == message)
    }

    /// Forgets everything shown so far.
    pub fn reset(&self) {
        let mut log = self.log.borrow_mut();
        log.lines.clear();
        log.clears = 0;
    }
}

impl Screen for MemoryScreen {
    fn show(&mut self, message: &str) {
        self.log.borrow_mut().lines.push(message.to_string());
    }

    fn clear(&mut self) {
        self.log.borrow_mut().clears += 1;
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
