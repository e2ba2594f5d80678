#![forbid(unsafe_code)]

//! Window size, cursor, and a property bag owned by the controller.
//!
//! The cursor always lies inside the window: it is clamped whenever either
//! the cursor or the window size changes. An axis with zero extent pins the
//! cursor to 0 on that axis.

use std::collections::BTreeMap;
use std::fmt;

use ticlif_core::geometry::Point;

/// Property key of the frame counter.
pub const FRAME_PROPERTY: &str = "frame";

/// A value stored in the [`State`] property bag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Property {
    Int(i64),
    Text(String),
    Flag(bool),
}

impl Property {
    /// Integer value, if this is an [`Int`](Self::Int).
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
            Self::Flag(b) => write!(f, "{b}"),
        }
    }
}

impl From<i64> for Property {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<&str> for Property {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for Property {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for Property {
    fn from(b: bool) -> Self {
        Self::Flag(b)
    }
}

/// Controller state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct State {
    window_size: Point,
    cursor: Point,
    properties: BTreeMap<String, Property>,
}

impl State {
    /// Empty window, cursor at the origin, no properties.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current window size.
    #[must_use]
    pub const fn window_size(&self) -> Point {
        self.window_size
    }

    /// Store a new window size and pull the cursor back inside it.
    /// Negative components are treated as zero.
    pub fn set_window_size(&mut self, size: Point) {
        self.window_size = size.max(Point::ZERO);
        self.cursor = self.cursor.clamp_within(self.window_size);
    }

    /// Cursor position.
    #[must_use]
    pub const fn cursor(&self) -> Point {
        self.cursor
    }

    /// Place the cursor, clamped to the window.
    pub fn set_cursor(&mut self, pos: Point) {
        self.cursor = pos.clamp_within(self.window_size);
    }

    /// Move the cursor by `step`, clamped to the window.
    pub fn move_cursor(&mut self, step: Point) {
        self.set_cursor(self.cursor + step);
    }

    /// Look up a property.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.get(name)
    }

    /// Set a property, returning the previous value.
    pub fn set_property(
        &mut self,
        name: impl Into<String>,
        value: impl Into<Property>,
    ) -> Option<Property> {
        self.properties.insert(name.into(), value.into())
    }

    /// Remove a property.
    pub fn remove_property(&mut self, name: &str) -> Option<Property> {
        self.properties.remove(name)
    }

    /// All properties in key order.
    pub fn properties(&self) -> impl Iterator<Item = (&str, &Property)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Increment an integer property, starting from 0 when it is missing or
    /// not an integer. Returns the new value.
    pub fn increment(&mut self, name: &str) -> i64 {
        let next = self
            .property(name)
            .and_then(Property::as_int)
            .unwrap_or(0)
            .saturating_add(1);
        self.properties.insert(name.to_owned(), Property::Int(next));
        next
    }

    /// Number of frames drawn so far.
    #[must_use]
    pub fn frame(&self) -> i64 {
        self.property(FRAME_PROPERTY)
            .and_then(Property::as_int)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shrinking_window_clamps_cursor() {
        let mut state = State::new();
        state.set_window_size(Point::new(10, 10));
        state.set_cursor(Point::new(9, 7));
        state.set_window_size(Point::new(5, 20));
        assert_eq!(state.cursor(), Point::new(4, 7));
    }

    #[test]
    fn zero_extent_pins_cursor() {
        let mut state = State::new();
        state.set_window_size(Point::new(0, 3));
        state.move_cursor(Point::new(5, 5));
        assert_eq!(state.cursor(), Point::new(0, 2));
        state.set_window_size(Point::new(-3, -3));
        assert_eq!(state.window_size(), Point::ZERO);
        assert_eq!(state.cursor(), Point::ZERO);
    }

    #[test]
    fn cursor_moves_are_clamped() {
        let mut state = State::new();
        state.set_window_size(Point::new(3, 2));
        state.move_cursor(Point::new(-1, 0));
        assert_eq!(state.cursor(), Point::ZERO);
        for _ in 0..5 {
            state.move_cursor(Point::new(1, 1));
        }
        assert_eq!(state.cursor(), Point::new(2, 1));
    }

    #[test]
    fn frame_counter() {
        let mut state = State::new();
        assert_eq!(state.frame(), 0);
        assert_eq!(state.increment(FRAME_PROPERTY), 1);
        assert_eq!(state.increment(FRAME_PROPERTY), 2);
        assert_eq!(state.frame(), 2);
    }

    #[test]
    fn increment_replaces_non_integers() {
        let mut state = State::new();
        state.set_property("n", "text");
        assert_eq!(state.increment("n"), 1);
        assert_eq!(state.property("n"), Some(&Property::Int(1)));
    }

    #[test]
    fn properties_are_ordered() {
        let mut state = State::new();
        state.set_property("b", true);
        state.set_property("a", 3i64);
        let keys: Vec<&str> = state.properties().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(state.property("b").unwrap().to_string(), "true");
        assert_eq!(state.remove_property("a"), Some(Property::Int(3)));
    }
}
