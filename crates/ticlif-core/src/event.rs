#![forbid(unsafe_code)]

//! Canonical input/event types.
//!
//! The [`InputParser`](crate::input_parser::InputParser) decodes raw bytes
//! into [`Key`] tokens. A token is either a printable character or one of the
//! logical [`Command`]s. When a token has to reach the element tree, it is
//! wrapped in an [`Event`] carrying the position it was dispatched at.

use std::fmt;

use crate::geometry::Point;

/// A logical command decoded from control bytes or escape sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Move the cursor one row up.
    Up,
    /// Move the cursor one row down.
    Down,
    /// Move the cursor one column left.
    Left,
    /// Move the cursor one column right.
    Right,
    /// Escape: request graceful termination.
    Back,
    /// Advance focus to the next element.
    Next,
    /// Rotate to the next root.
    Switch,
    /// Confirm / activate the element under the cursor.
    Ok,
    /// Delete forward (application defined).
    Delete,
    /// Delete the character before the caret (application defined).
    DeleteBefore,
    /// Unconditional interrupt (Ctrl+C).
    Interrupt,
}

impl Command {
    /// Stable lowercase name, used in diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
            Self::Back => "back",
            Self::Next => "next",
            Self::Switch => "switch",
            Self::Ok => "ok",
            Self::Delete => "delete",
            Self::DeleteBefore => "delete_before",
            Self::Interrupt => "interrupt",
        }
    }

    /// Whether this command moves the cursor.
    #[must_use]
    pub const fn is_direction(self) -> bool {
        matches!(self, Self::Up | Self::Down | Self::Left | Self::Right)
    }

    /// Unit step for directional commands, `None` otherwise.
    #[must_use]
    pub const fn step(self) -> Option<Point> {
        match self {
            Self::Up => Some(Point::new(0, -1)),
            Self::Down => Some(Point::new(0, 1)),
            Self::Left => Some(Point::new(-1, 0)),
            Self::Right => Some(Point::new(1, 0)),
            _ => None,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A decoded input token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// A printable ASCII character.
    Char(char),
    /// A logical command.
    Command(Command),
}

impl Key {
    /// Check if this is a specific character key.
    #[must_use]
    pub fn is_char(&self, c: char) -> bool {
        matches!(self, Self::Char(ch) if *ch == c)
    }

    /// The command carried by this token, if any.
    #[must_use]
    pub const fn command(&self) -> Option<Command> {
        match self {
            Self::Command(cmd) => Some(*cmd),
            Self::Char(_) => None,
        }
    }

    /// Whether the token edits text: a character, `DeleteBefore`, or `Delete`.
    #[must_use]
    pub const fn is_edit(&self) -> bool {
        matches!(
            self,
            Self::Char(_) | Self::Command(Command::DeleteBefore | Command::Delete)
        )
    }
}

impl From<Command> for Key {
    fn from(cmd: Command) -> Self {
        Self::Command(cmd)
    }
}

impl From<char> for Key {
    fn from(c: char) -> Self {
        Self::Char(c)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Char(c) => write!(f, "{c:?}"),
            Self::Command(cmd) => write!(f, "{cmd}"),
        }
    }
}

/// Origin of an [`Event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EventKind {
    /// Synthesized without a known origin.
    #[default]
    Unknown,
    /// Produced by a key the user pressed.
    UserInput,
}

/// An action routed through the element tree.
///
/// `pos` is relative to the element currently handling the event; it is
/// translated into child coordinates as the event descends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    /// Where the event came from.
    pub kind: EventKind,
    /// Position relative to the receiving element.
    pub pos: Point,
    /// The token that triggered the event, if any.
    pub key: Option<Key>,
}

impl Event {
    /// Create an event of the given kind at the origin.
    #[must_use]
    pub const fn new(kind: EventKind) -> Self {
        Self {
            kind,
            pos: Point::ZERO,
            key: None,
        }
    }

    /// Create a user-input event for `key` at `pos`.
    #[must_use]
    pub const fn user_input(key: Key, pos: Point) -> Self {
        Self {
            kind: EventKind::UserInput,
            pos,
            key: Some(key),
        }
    }

    /// Place the event at the given position.
    #[must_use]
    pub const fn at_position(mut self, x: i32, y: i32) -> Self {
        self.pos = Point::new(x, y);
        self
    }

    /// Attach the triggering key.
    #[must_use]
    pub const fn with_key(mut self, key: Key) -> Self {
        self.key = Some(key);
        self
    }

    /// Check if the event was triggered by the given command.
    #[must_use]
    pub fn is_command(&self, cmd: Command) -> bool {
        self.key == Some(Key::Command(cmd))
    }
}

impl Default for Event {
    fn default() -> Self {
        Self::new(EventKind::Unknown)
    }
}
