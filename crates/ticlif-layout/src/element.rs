#![forbid(unsafe_code)]

//! Element builder, content values, and event handlers.
//!
//! An [`Element`] is an owned description of a subtree. It is assembled with
//! consuming `with_*` methods and becomes addressable once it is mounted into
//! an [`ElementTree`](crate::tree::ElementTree).
//!
//! ```
//! use ticlif_layout::{Direction, Element, ElementTree};
//!
//! let mut tree = ElementTree::new();
//! let root = tree.mount(
//!     Element::new()
//!         .with_id("root")
//!         .with_direction(Direction::Horizontal)
//!         .with_child(Element::new().with_content("left"))
//!         .with_child(Element::new().with_content("right").with_border('#')),
//! );
//! assert_eq!(tree.children(root).unwrap().len(), 2);
//! ```

use std::fmt;

use ticlif_core::event::Event;
use ticlif_core::geometry::Point;

use crate::tree::ElementMut;
use crate::{Direction, LayoutError};

/// Resolved content of an element.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ContentValue {
    /// Nothing set.
    #[default]
    None,
    /// A single text block, possibly containing line breaks.
    Text(String),
    /// One entry per line.
    Lines(Vec<String>),
}

impl ContentValue {
    /// Whether no content is set.
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Whether a leaf with this content shows the `?` placeholder: nothing
    /// set, an empty text, or no lines.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::None => true,
            Self::Text(text) => text.is_empty(),
            Self::Lines(lines) => lines.is_empty(),
        }
    }

    /// The content as one text block; lines are joined with `'\n'`.
    #[must_use]
    pub fn to_text(&self) -> Option<String> {
        match self {
            Self::None => None,
            Self::Text(text) => Some(text.clone()),
            Self::Lines(lines) => Some(lines.join("\n")),
        }
    }
}

impl From<&str> for ContentValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for ContentValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&String> for ContentValue {
    fn from(text: &String) -> Self {
        Self::Text(text.clone())
    }
}

impl From<Vec<String>> for ContentValue {
    fn from(lines: Vec<String>) -> Self {
        Self::Lines(lines)
    }
}

impl From<Vec<&str>> for ContentValue {
    fn from(lines: Vec<&str>) -> Self {
        Self::Lines(lines.into_iter().map(str::to_owned).collect())
    }
}

impl From<&[String]> for ContentValue {
    fn from(lines: &[String]) -> Self {
        Self::Lines(lines.to_vec())
    }
}

impl<T: Into<ContentValue>> From<Option<T>> for ContentValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::None, Into::into)
    }
}

impl From<Point> for ContentValue {
    fn from(p: Point) -> Self {
        Self::Text(p.to_string())
    }
}

macro_rules! content_from_display {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for ContentValue {
                fn from(value: $ty) -> Self {
                    Self::Text(value.to_string())
                }
            }
        )*
    };
}

content_from_display!(char, i32, i64, u16, u32, u64, usize);

/// A source of content, re-evaluated on every update tick.
///
/// Any `FnMut() -> T` where `T: Into<ContentValue>` is a provider.
pub trait ContentProvider {
    /// Produce the current content.
    fn fetch(&mut self) -> ContentValue;
}

impl<F, T> ContentProvider for F
where
    F: FnMut() -> T,
    T: Into<ContentValue>,
{
    fn fetch(&mut self) -> ContentValue {
        self().into()
    }
}

/// Where an element's content comes from.
pub(crate) enum ContentSource {
    Static(ContentValue),
    Dynamic(Box<dyn ContentProvider>),
}

impl ContentSource {
    pub(crate) fn resolve(&mut self) -> ContentValue {
        match self {
            Self::Static(value) => value.clone(),
            Self::Dynamic(provider) => provider.fetch(),
        }
    }

    pub(crate) const fn is_dynamic(&self) -> bool {
        matches!(self, Self::Dynamic(_))
    }
}

impl Default for ContentSource {
    fn default() -> Self {
        Self::Static(ContentValue::None)
    }
}

/// Receives action events addressed to an element.
///
/// An element with a handler consumes every action that reaches it; elements
/// without one forward the action to the child under the event position.
pub trait EventHandler {
    /// Handle `event`. `element` grants mutable access to the receiving
    /// element and, through it, the rest of the tree.
    fn handle(&mut self, element: ElementMut<'_>, event: &Event);
}

/// Adapter turning a closure into an [`EventHandler`].
pub struct FnHandler<F>(pub F);

impl<F> EventHandler for FnHandler<F>
where
    F: FnMut(ElementMut<'_>, &Event),
{
    fn handle(&mut self, element: ElementMut<'_>, event: &Event) {
        (self.0)(element, event);
    }
}

impl<F> fmt::Debug for FnHandler<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnHandler(..)")
    }
}

/// What kind of node an element is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// Regular node: renders content as a leaf, lays out children otherwise.
    Panel,
    /// One-cell frame of `glyph` around exactly one child.
    Border { glyph: char },
}

/// Owned builder for an element subtree.
pub struct Element {
    pub(crate) label: Option<String>,
    pub(crate) kind: ElementKind,
    pub(crate) direction: Direction,
    pub(crate) separate: bool,
    pub(crate) separator: Option<char>,
    pub(crate) min_size: Point,
    pub(crate) source: ContentSource,
    pub(crate) content: ContentValue,
    pub(crate) handler: Option<Box<dyn EventHandler>>,
    pub(crate) children: Vec<Element>,
}

impl Element {
    /// An empty vertical panel with separators enabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            label: None,
            kind: ElementKind::Panel,
            direction: Direction::Vertical,
            separate: true,
            separator: None,
            min_size: Point::ZERO,
            source: ContentSource::default(),
            content: ContentValue::None,
            handler: None,
            children: Vec::new(),
        }
    }

    /// Set the diagnostic label.
    #[must_use]
    pub fn with_id(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Append a child. On a border the child goes to the wrapped element.
    #[must_use]
    pub fn with_child(mut self, child: Element) -> Self {
        self.min_size += child.min_size;
        if matches!(self.kind, ElementKind::Border { .. })
            && let Some(inner) = self.children.pop()
        {
            self.children.push(inner.with_child(child));
            return self;
        }
        self.children.push(child);
        self
    }

    /// Set constant content.
    #[must_use]
    pub fn with_content(mut self, content: impl Into<ContentValue>) -> Self {
        let value = content.into();
        self.content = value.clone();
        self.source = ContentSource::Static(value);
        self
    }

    /// Set a content provider, evaluated on every update.
    #[must_use]
    pub fn with_content_fn(mut self, provider: impl ContentProvider + 'static) -> Self {
        self.source = ContentSource::Dynamic(Box::new(provider));
        self
    }

    /// Evaluate the content provider right away instead of waiting for the
    /// first update.
    #[must_use]
    pub fn update_now(mut self) -> Self {
        self.content = self.source.resolve();
        self
    }

    /// Set the layout direction for children.
    #[must_use]
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Set the layout direction by name (`"horizontal"` or `"vertical"`,
    /// case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::UnknownDirection`] for any other name.
    pub fn with_direction_named(self, name: &str) -> Result<Self, LayoutError> {
        Ok(self.with_direction(name.parse()?))
    }

    /// Enable or disable separator cells between children.
    #[must_use]
    pub fn with_separate(mut self, separate: bool) -> Self {
        self.separate = separate;
        self
    }

    /// Override the separator glyph.
    #[must_use]
    pub fn with_separator(mut self, glyph: char) -> Self {
        self.separator = Some(glyph);
        self
    }

    /// Seed the advisory minimum size.
    #[must_use]
    pub fn with_min_size(mut self, min_size: Point) -> Self {
        self.min_size = min_size;
        self
    }

    /// Install a closure as the action handler.
    #[must_use]
    pub fn with_handler<F>(self, handler: F) -> Self
    where
        F: FnMut(ElementMut<'_>, &Event) + 'static,
    {
        self.with_event_handler(FnHandler(handler))
    }

    /// Install an [`EventHandler`].
    #[must_use]
    pub fn with_event_handler(mut self, handler: impl EventHandler + 'static) -> Self {
        self.handler = Some(Box::new(handler));
        self
    }

    /// Wrap this element in a one-cell frame of `glyph`.
    #[must_use]
    pub fn with_border(self, glyph: char) -> Self {
        let direction = self.direction;
        let min_size = self.min_size + 2;
        Self {
            kind: ElementKind::Border { glyph },
            direction,
            min_size,
            children: vec![self],
            ..Self::new()
        }
    }

    /// The diagnostic label, if set.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Advisory minimum size.
    #[must_use]
    pub const fn min_size(&self) -> Point {
        self.min_size
    }

    /// Node kind.
    #[must_use]
    pub const fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Content resolved so far (set by `with_content` or `update_now`).
    #[must_use]
    pub const fn content(&self) -> &ContentValue {
        &self.content
    }

    /// Children in layout order.
    #[must_use]
    pub fn children(&self) -> &[Element] {
        &self.children
    }
}

impl Default for Element {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("label", &self.label)
            .field("kind", &self.kind)
            .field("direction", &self.direction)
            .field("separate", &self.separate)
            .field("separator", &self.separator)
            .field("min_size", &self.min_size)
            .field("dynamic_content", &self.source.is_dynamic())
            .field("has_handler", &self.handler.is_some())
            .field("children", &self.children)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_size_sums_children() {
        let e = Element::new()
            .with_child(Element::new().with_min_size(Point::new(2, 1)))
            .with_child(Element::new().with_min_size(Point::new(3, 4)));
        assert_eq!(e.min_size(), Point::new(5, 5));
    }

    #[test]
    fn border_adds_frame_to_min_size() {
        let e = Element::new()
            .with_min_size(Point::new(3, 1))
            .with_border('#');
        assert_eq!(e.min_size(), Point::new(5, 3));
        assert_eq!(e.kind(), ElementKind::Border { glyph: '#' });
        assert_eq!(e.children().len(), 1);
    }

    #[test]
    fn border_forwards_children_to_inner_element() {
        let e = Element::new()
            .with_id("inner")
            .with_border('*')
            .with_child(Element::new().with_min_size(Point::new(1, 1)))
            .with_child(Element::new());
        assert_eq!(e.children().len(), 1);
        assert_eq!(e.children()[0].label(), Some("inner"));
        assert_eq!(e.children()[0].children().len(), 2);
        assert_eq!(e.min_size(), Point::new(3, 3));
    }

    #[test]
    fn direction_by_name() {
        let e = Element::new().with_direction_named(" HORIZONTAL").unwrap();
        assert_eq!(e.direction, Direction::Horizontal);
        assert!(matches!(
            Element::new().with_direction_named("sideways"),
            Err(LayoutError::UnknownDirection { .. })
        ));
    }

    #[test]
    fn update_now_evaluates_provider() {
        let e = Element::new().with_content_fn(|| 42);
        assert!(e.content().is_none());
        let e = e.update_now();
        assert_eq!(e.content(), &ContentValue::Text("42".into()));
    }

    #[test]
    fn content_conversions() {
        assert_eq!(ContentValue::from("x"), ContentValue::Text("x".into()));
        assert_eq!(
            ContentValue::from(vec!["a", "b"]).to_text().as_deref(),
            Some("a\nb")
        );
        assert_eq!(ContentValue::from(None::<String>), ContentValue::None);
        assert_eq!(
            ContentValue::from(Point::new(1, 2)),
            ContentValue::Text("(1,2)".into())
        );
        assert_eq!(ContentValue::from(7usize), ContentValue::Text("7".into()));
    }

    #[test]
    fn debug_output_omits_closures() {
        let e = Element::new().with_handler(|_, _| {}).with_content_fn(|| "x");
        let s = format!("{e:?}");
        assert!(s.contains("has_handler: true"));
        assert!(s.contains("dynamic_content: true"));
    }
}
