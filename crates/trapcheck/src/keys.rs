//! Keyboard input sent to the page under test.

use serde::{Deserialize, Serialize};

/// Keys the focus harness presses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// Tab key
    Tab,
    /// Escape key
    Escape,
}

impl Key {
    /// DOM `KeyboardEvent.key` value
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Tab => "Tab",
            Self::Escape => "Escape",
        }
    }

    /// DOM `KeyboardEvent.code` value
    #[must_use]
    pub const fn code(self) -> &'static str {
        self.name()
    }

    /// Windows virtual key code (used by CDP key dispatch)
    #[must_use]
    pub const fn virtual_key_code(self) -> i64 {
        match self {
            Self::Tab => 9,
            Self::Escape => 27,
        }
    }
}

/// A key pressed together with optional modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyChord {
    /// Main key
    pub key: Key,
    /// Shift held while pressing
    pub shift: bool,
}

impl KeyChord {
    /// Plain Tab
    pub const TAB: Self = Self {
        key: Key::Tab,
        shift: false,
    };

    /// Shift+Tab
    pub const SHIFT_TAB: Self = Self {
        key: Key::Tab,
        shift: true,
    };

    /// Plain Escape
    pub const ESCAPE: Self = Self {
        key: Key::Escape,
        shift: false,
    };

    /// CDP modifier bitmask (Alt=1, Ctrl=2, Meta=4, Shift=8)
    #[must_use]
    pub const fn modifiers(self) -> i64 {
        if self.shift {
            8
        } else {
            0
        }
    }
}

impl std::fmt::Display for KeyChord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.shift {
            write!(f, "Shift+{}", self.key.name())
        } else {
            f.write_str(self.key.name())
        }
    }
}

/// Direction of focus traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Tab
    Forward,
    /// Shift+Tab
    Backward,
}

impl Direction {
    /// Chord that moves focus in this direction
    #[must_use]
    pub const fn chord(self) -> KeyChord {
        match self {
            Self::Forward => KeyChord::TAB,
            Self::Backward => KeyChord::SHIFT_TAB,
        }
    }

    /// Noun used in assertion messages
    #[must_use]
    pub const fn press_noun(self) -> &'static str {
        match self {
            Self::Forward => "tabs",
            Self::Backward => "shift tabs",
        }
    }
}

/// Where a key event is delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyTarget<'a> {
    /// Whatever element currently has focus
    Active,
    /// The element resolved from a CSS locator (focused first)
    Selector(&'a str),
}
