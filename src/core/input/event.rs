//=========================================================================
// Input Event Types
//
// Engine-side representation of terminal input.
//
// The terminal delivers whole lines. A line is either a command typed by
// the player or, when it consists of an ANSI escape sequence, a special
// key (arrows, escape, ...). The platform layer performs that decoding;
// scenes only ever see `InputEvent`s.
//
// Event Flow:
// ```text
// stdin line / scripted batch
//         ↓
//    InputProcessor (platform)
//         ↓
//    InputEvent (this module)
//         ↓
//    GameApp → Scene::handle_input
// ```
//
//=========================================================================

//=== KeyCode =============================================================

/// Special key recognized from an escape sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    //--- Arrow Keys -------------------------------------------------------
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,

    //--- Navigation -------------------------------------------------------
    Home,
    End,
    Delete,

    /// Escape pressed on its own.
    Escape,

    /// Escape sequence the decoder does not know.
    Unidentified,
}

//=== InputEvent ==========================================================

/// One discrete input event delivered to the active scene.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InputEvent {
    /// A submitted line of text, without its line terminator.
    Line(String),

    /// A special key.
    Key(KeyCode),

    /// The input source is exhausted (end of file, closed channel).
    ///
    /// Handled by the engine itself, which stops the app. Scenes never
    /// receive it.
    Closed,
}

impl InputEvent {
    /// Convenience constructor for [`InputEvent::Line`].
    pub fn line(text: impl Into<String>) -> Self {
        Self::Line(text.into())
    }

    /// Returns the text of a `Line` event.
    pub fn as_line(&self) -> Option<&str> {
        match self {
            Self::Line(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the key of a `Key` event.
    pub fn as_key(&self) -> Option<KeyCode> {
        match self {
            Self::Key(key) => Some(*key),
            _ => None,
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
