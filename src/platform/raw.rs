//=========================================================================
// Raw Terminal Input
//
// Key-at-a-time input for games that want arrow keys and shortcuts to
// react without waiting for Enter.
//
// Architecture:
//   crossterm event::poll / event::read → LineEditor → InputEvent
//
// The terminal is switched into raw mode on the first poll and restored
// on `release` (or drop). Typed characters are echoed by the editor and
// still assemble into `Line` events on Enter; special keys become `Key`
// events immediately. When stdin is not a terminal, or raw mode cannot be
// enabled, the source falls back to line input from `StdinInput`.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::io::{self, IsTerminal, Write};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode as TermKey, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use log::{debug, error, info, warn};

//=== Internal Dependencies ===============================================

use super::stdin::StdinInput;
use crate::core::input::{InputEvent, InputSource, KeyCode};

//=== LineEditor ==========================================================

/// Turns single key presses into engine events.
///
/// Printable characters collect in a buffer until Enter submits it as a
/// [`InputEvent::Line`]. Arrows, navigation keys and Escape are reported
/// at once and leave the buffer untouched. Ctrl-C and Ctrl-D end input.
#[derive(Debug, Default)]
pub(crate) struct LineEditor {
    buffer: String,
}

impl LineEditor {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Text typed since the last submitted line.
    #[cfg(test)]
    pub(crate) fn pending(&self) -> &str {
        &self.buffer
    }

    /// Handles one key event. Whatever the terminal should show in
    /// response is appended to `echo`.
    pub(crate) fn handle(&mut self, key: &KeyEvent, echo: &mut String) -> Option<InputEvent> {
        if key.kind == KeyEventKind::Release {
            return None;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                TermKey::Char('c') | TermKey::Char('d') => {
                    echo.push_str("\r\n");
                    Some(InputEvent::Closed)
                }
                _ => None,
            };
        }

        match key.code {
            TermKey::Enter => {
                echo.push_str("\r\n");
                Some(InputEvent::Line(std::mem::take(&mut self.buffer)))
            }
            TermKey::Backspace => {
                if self.buffer.pop().is_some() {
                    echo.push_str("\x08 \x08");
                }
                None
            }
            TermKey::Char(c) => {
                self.buffer.push(c);
                echo.push(c);
                None
            }
            TermKey::Up => Some(InputEvent::Key(KeyCode::ArrowUp)),
            TermKey::Down => Some(InputEvent::Key(KeyCode::ArrowDown)),
            TermKey::Left => Some(InputEvent::Key(KeyCode::ArrowLeft)),
            TermKey::Right => Some(InputEvent::Key(KeyCode::ArrowRight)),
            TermKey::Home => Some(InputEvent::Key(KeyCode::Home)),
            TermKey::End => Some(InputEvent::Key(KeyCode::End)),
            TermKey::Delete => Some(InputEvent::Key(KeyCode::Delete)),
            TermKey::Esc => Some(InputEvent::Key(KeyCode::Escape)),
            _ => None,
        }
    }
}

//=== RawModeGuard ========================================================

/// Keeps the terminal in raw mode for as long as it lives.
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        debug!("Terminal switched to raw mode");
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        match terminal::disable_raw_mode() {
            Ok(()) => debug!("Terminal restored from raw mode"),
            Err(e) => error!("Failed to restore terminal mode: {}", e),
        }
    }
}

//=== RawInput ============================================================

enum Backend {
    /// Nothing acquired yet; decided on the next poll.
    Pending,
    Raw(RawModeGuard),
    Lines(StdinInput),
}

/// Input source reading single key presses from the terminal.
///
/// Enable it through
/// [`GameAppBuilder::with_raw_input`](crate::GameAppBuilder::with_raw_input)
/// or pass it to `with_input` directly.
pub struct RawInput {
    backend: Backend,
    editor: LineEditor,
    closed: bool,
}

impl RawInput {
    /// Creates the source. The terminal is left alone until the first poll.
    pub fn new() -> Self {
        Self {
            backend: Backend::Pending,
            editor: LineEditor::new(),
            closed: false,
        }
    }

    /// Returns true while the terminal is in raw mode for this source.
    pub fn is_raw(&self) -> bool {
        matches!(self.backend, Backend::Raw(_))
    }

    fn acquire() -> Backend {
        if !io::stdin().is_terminal() {
            info!("stdin is not a terminal, using line input");
            return Backend::Lines(StdinInput::new());
        }

        match RawModeGuard::enable() {
            Ok(guard) => Backend::Raw(guard),
            Err(e) => {
                warn!("Raw input unavailable ({}), using line input", e);
                Backend::Lines(StdinInput::new())
            }
        }
    }

    fn poll_terminal(&mut self, timeout: Duration, max_events: usize, out: &mut Vec<InputEvent>) {
        let mut wait = timeout;
        let mut produced = 0;
        let mut echo = String::new();

        while produced < max_events {
            match event::poll(wait) {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => {
                    error!("Failed to poll terminal events: {}", e);
                    self.finish(out);
                    break;
                }
            }
            wait = Duration::ZERO;

            let key = match event::read() {
                Ok(Event::Key(key)) => key,
                Ok(_) => continue,
                Err(e) => {
                    error!("Failed to read terminal event: {}", e);
                    self.finish(out);
                    break;
                }
            };

            if let Some(input) = self.editor.handle(&key, &mut echo) {
                if input == InputEvent::Closed {
                    self.finish(out);
                    break;
                }
                out.push(input);
                produced += 1;
            }
        }

        if !echo.is_empty() {
            let mut stdout = io::stdout();
            if let Err(e) = stdout.write_all(echo.as_bytes()).and_then(|()| stdout.flush()) {
                debug!("Failed to echo input: {}", e);
            }
        }
    }

    fn finish(&mut self, out: &mut Vec<InputEvent>) {
        self.closed = true;
        out.push(InputEvent::Closed);
    }
}

impl Default for RawInput {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSource for RawInput {
    fn poll(&mut self, timeout: Duration, max_events: usize, out: &mut Vec<InputEvent>) {
        if self.closed || max_events == 0 {
            return;
        }

        if let Backend::Pending = self.backend {
            self.backend = Self::acquire();
        }

        if let Backend::Lines(lines) = &mut self.backend {
            return lines.poll(timeout, max_events, out);
        }

        if self.is_raw() {
            self.poll_terminal(timeout, max_events, out);
        }
    }

    fn release(&mut self) {
        if self.is_raw() {
            self.backend = Backend::Pending;
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: TermKey) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(TermKey::Char(c), KeyModifiers::CONTROL)
    }

    fn feed(editor: &mut LineEditor, keys: &[KeyEvent]) -> (Vec<InputEvent>, String) {
        let mut echo = String::new();
        let events = keys.iter().filter_map(|key| editor.handle(key, &mut echo)).collect();
        (events, echo)
    }

    #[test]
    fn typed_characters_submit_on_enter() {
        let mut editor = LineEditor::new();
        let keys = [
            press(TermKey::Char('g')),
            press(TermKey::Char('o')),
            press(TermKey::Enter),
        ];

        let (events, echo) = feed(&mut editor, &keys);

        assert_eq!(events, [InputEvent::line("go")]);
        assert_eq!(echo, "go\r\n");
        assert_eq!(editor.pending(), "");
    }

    #[test]
    fn backspace_erases_last_character() {
        let mut editor = LineEditor::new();
        let keys = [
            press(TermKey::Backspace),
            press(TermKey::Char('a')),
            press(TermKey::Char('x')),
            press(TermKey::Backspace),
            press(TermKey::Enter),
        ];

        let (events, echo) = feed(&mut editor, &keys);

        assert_eq!(events, [InputEvent::line("a")]);
        assert_eq!(echo, "ax\x08 \x08\r\n");
    }

    #[test]
    fn arrows_are_reported_without_enter() {
        let mut editor = LineEditor::new();
        let keys = [
            press(TermKey::Char('w')),
            press(TermKey::Up),
            press(TermKey::Left),
            press(TermKey::Esc),
        ];

        let (events, _) = feed(&mut editor, &keys);

        assert_eq!(
            events,
            [
                InputEvent::Key(KeyCode::ArrowUp),
                InputEvent::Key(KeyCode::ArrowLeft),
                InputEvent::Key(KeyCode::Escape),
            ]
        );
        assert_eq!(editor.pending(), "w");
    }

    #[test]
    fn ctrl_c_and_ctrl_d_end_input() {
        let mut editor = LineEditor::new();
        assert_eq!(feed(&mut editor, &[ctrl('c')]).0, [InputEvent::Closed]);
        assert_eq!(feed(&mut editor, &[ctrl('d')]).0, [InputEvent::Closed]);
        assert!(feed(&mut editor, &[ctrl('x')]).0.is_empty());
    }

    #[test]
    fn key_releases_are_ignored() {
        let mut editor = LineEditor::new();
        let release = KeyEvent::new_with_kind(TermKey::Char('a'), KeyModifiers::NONE, KeyEventKind::Release);

        let (events, echo) = feed(&mut editor, &[release]);

        assert!(events.is_empty());
        assert!(echo.is_empty());
        assert_eq!(editor.pending(), "");
    }

    #[test]
    fn terminal_is_untouched_before_first_poll() {
        let mut input = RawInput::new();
        assert!(!input.is_raw());

        input.release();
        assert!(!input.is_raw());
    }
}
