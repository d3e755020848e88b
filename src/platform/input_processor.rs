//=========================================================================
// Input Processor
//=========================================================================
//
// Converts raw terminal lines into engine InputEvents.
//
// Architecture:
//   stdin line → InputProcessor → InputEvent (engine type) → channel
//
// Lines are stripped of their terminator. A line made only of an ANSI
// escape sequence (what a cooked terminal delivers when an arrow key is
// pressed and then Enter) becomes a `Key` event; everything else is a
// `Line` event.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::core::input::{InputEvent, KeyCode};

//=== Constants ===========================================================

const ESC: char = '\x1b';

//=== InputProcessor ======================================================

/// Stateless line → event converter.
pub(crate) struct InputProcessor;

impl InputProcessor {
    /// Converts one raw line (terminator optional) into an event.
    pub(crate) fn process_line(raw: &str) -> InputEvent {
        let line = raw.trim_end_matches(&['\r', '\n'][..]);

        if line.starts_with(ESC) {
            InputEvent::Key(Self::decode_escape(line))
        } else {
            InputEvent::Line(line.to_string())
        }
    }

    //--- Internal Helpers -------------------------------------------------

    /// Decodes CSI (`ESC [`) and SS3 (`ESC O`) key sequences.
    fn decode_escape(sequence: &str) -> KeyCode {
        let body = &sequence[ESC.len_utf8()..];
        if body.is_empty() {
            return KeyCode::Escape;
        }

        let Some(code) = body.strip_prefix('[').or_else(|| body.strip_prefix('O')) else {
            return KeyCode::Unidentified;
        };

        match code {
            "A" => KeyCode::ArrowUp,
            "B" => KeyCode::ArrowDown,
            "C" => KeyCode::ArrowRight,
            "D" => KeyCode::ArrowLeft,
            "H" | "1~" => KeyCode::Home,
            "F" | "4~" => KeyCode::End,
            "3~" => KeyCode::Delete,
            _ => KeyCode::Unidentified,
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_line_without_terminator() {
        assert_eq!(InputProcessor::process_line("north\r\n"), InputEvent::line("north"));
        assert_eq!(InputProcessor::process_line("north"), InputEvent::line("north"));
    }

    #[test]
    fn empty_line_is_empty_command() {
        assert_eq!(InputProcessor::process_line("\n"), InputEvent::line(""));
    }

    #[test]
    fn csi_arrow_keys() {
        assert_eq!(InputProcessor::process_line("\x1b[A\n"), InputEvent::Key(KeyCode::ArrowUp));
        assert_eq!(InputProcessor::process_line("\x1b[B"), InputEvent::Key(KeyCode::ArrowDown));
        assert_eq!(InputProcessor::process_line("\x1b[C"), InputEvent::Key(KeyCode::ArrowRight));
        assert_eq!(InputProcessor::process_line("\x1b[D"), InputEvent::Key(KeyCode::ArrowLeft));
    }

    #[test]
    fn ss3_arrow_keys() {
        assert_eq!(InputProcessor::process_line("\x1bOA"), InputEvent::Key(KeyCode::ArrowUp));
    }

    #[test]
    fn navigation_keys() {
        assert_eq!(InputProcessor::process_line("\x1b[H"), InputEvent::Key(KeyCode::Home));
        assert_eq!(InputProcessor::process_line("\x1b[4~"), InputEvent::Key(KeyCode::End));
        assert_eq!(InputProcessor::process_line("\x1b[3~"), InputEvent::Key(KeyCode::Delete));
    }

    #[test]
    fn lone_escape() {
        assert_eq!(InputProcessor::process_line("\x1b\n"), InputEvent::Key(KeyCode::Escape));
    }

    #[test]
    fn unknown_sequence_is_unidentified() {
        assert_eq!(InputProcessor::process_line("\x1b[99~"), InputEvent::Key(KeyCode::Unidentified));
        assert_eq!(InputProcessor::process_line("\x1bxyz"), InputEvent::Key(KeyCode::Unidentified));
    }
}
