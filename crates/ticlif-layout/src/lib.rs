#![forbid(unsafe_code)]

//! Element tree: layout, rendering, and hit-testing.
//!
//! This crate provides the layout layer of ticlif:
//!
//! - [`Element`] - owned fluent builder describing a subtree
//! - [`ElementTree`] - arena holding mounted elements, addressed by [`ElementId`]
//! - [`ContentValue`] / [`ContentProvider`] - pull-based element content
//! - [`EventHandler`] - explicit action handlers
//! - [`text`] - text flowing into fixed-width rows
//! - [`widgets`] - ready-made elements
//!
//! # Layout rule
//!
//! Children split their parent's primary axis evenly. When separators are
//! enabled, one cell is reserved between each pair of adjacent children. The
//! last child absorbs the division remainder:
//!
//! ```
//! use ticlif_core::geometry::Point;
//! use ticlif_layout::{Element, ElementTree};
//!
//! let mut tree = ElementTree::new();
//! let root = tree.mount(
//!     Element::new()
//!         .with_separate(false)
//!         .with_child(Element::new())
//!         .with_child(Element::new())
//!         .with_child(Element::new()),
//! );
//! tree.resize(root, Point::new(4, 10)).unwrap();
//!
//! let heights: Vec<i32> = tree
//!     .children(root)
//!     .unwrap()
//!     .iter()
//!     .map(|&c| tree.size(c).unwrap().y)
//!     .collect();
//! assert_eq!(heights, vec![3, 3, 4]);
//! ```

pub mod element;
pub mod text;
pub mod tree;
pub mod widgets;

use std::fmt;
use std::str::FromStr;

pub use element::{ContentProvider, ContentValue, Element, ElementKind, EventHandler};
pub use ticlif_core::geometry::Point;
pub use tree::{ControllerId, ElementId, ElementMut, ElementTree, Node};

/// The direction to lay out children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    /// Top to bottom; the primary axis is rows.
    #[default]
    Vertical,
    /// Left to right; the primary axis is columns.
    Horizontal,
}

impl Direction {
    /// Lowercase name as accepted by [`FromStr`].
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Vertical => "vertical",
            Self::Horizontal => "horizontal",
        }
    }

    /// Separator glyph used when none is configured.
    #[must_use]
    pub const fn default_separator(self) -> char {
        match self {
            Self::Vertical => '-',
            Self::Horizontal => '|',
        }
    }

    /// Component of `p` along this axis.
    #[inline]
    #[must_use]
    pub const fn primary(self, p: Point) -> i32 {
        match self {
            Self::Vertical => p.y,
            Self::Horizontal => p.x,
        }
    }

    /// Component of `p` across this axis.
    #[inline]
    #[must_use]
    pub const fn secondary(self, p: Point) -> i32 {
        match self {
            Self::Vertical => p.x,
            Self::Horizontal => p.y,
        }
    }

    /// Build a point from primary and secondary components.
    #[inline]
    #[must_use]
    pub const fn compose(self, primary: i32, secondary: i32) -> Point {
        match self {
            Self::Vertical => Point::new(secondary, primary),
            Self::Horizontal => Point::new(primary, secondary),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Direction {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vertical" => Ok(Self::Vertical),
            "horizontal" => Ok(Self::Horizontal),
            _ => Err(LayoutError::UnknownDirection { name: s.to_owned() }),
        }
    }
}

/// Errors raised while building or querying an element tree.
///
/// `UnknownDirection` is a configuration error surfaced at construction time.
/// The others signal an inconsistent tree or cursor state and are meant to be
/// propagated to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// A direction name other than `horizontal` / `vertical`.
    UnknownDirection { name: String },
    /// A hit-test position outside the element's current size.
    OutOfBounds {
        element: ElementId,
        pos: Point,
        size: Point,
    },
    /// `child` is not a direct child of `parent`.
    NotAChild { parent: ElementId, child: ElementId },
    /// A child index past the end of the child list.
    ChildIndexOutOfRange {
        parent: ElementId,
        index: usize,
        len: usize,
    },
    /// No element with this id is mounted.
    MissingElement { id: ElementId },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownDirection { name } => write!(
                f,
                "unknown layout direction {name:?} (expected \"horizontal\" or \"vertical\")"
            ),
            Self::OutOfBounds { element, pos, size } => write!(
                f,
                "position {pos} is outside element {element} of size {size}"
            ),
            Self::NotAChild { parent, child } => {
                write!(f, "element {child} is not a child of element {parent}")
            }
            Self::ChildIndexOutOfRange { parent, index, len } => write!(
                f,
                "child index {index} out of range for element {parent} with {len} children"
            ),
            Self::MissingElement { id } => write!(f, "element {id} is not mounted"),
        }
    }
}

impl std::error::Error for LayoutError {}
