#![forbid(unsafe_code)]

//! Element arena.
//!
//! Mounted elements live in a [`BTreeMap`] keyed by [`ElementId`]. Parent and
//! child links are plain ids, so every query that walks the tree goes through
//! [`ElementTree`] and reports a dangling id as
//! [`LayoutError::MissingElement`].
//!
//! Positions passed to the hit-test queries are relative to the element
//! being queried. Sizes are assigned by [`ElementTree::resize`] and stay
//! valid until the next resize.

use std::collections::BTreeMap;
use std::fmt;

use ticlif_core::event::Event;
use ticlif_core::geometry::Point;

use crate::element::{ContentProvider, ContentSource, ContentValue, Element, ElementKind, EventHandler};
use crate::text::{fit_width, flow_text};
use crate::{Direction, LayoutError};

/// Stable handle of a mounted element.
///
/// `0` is never allocated, so ids are always non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(u64);

impl ElementId {
    /// Lowest id handed out by a tree.
    pub const MIN: Self = Self(1);

    /// Raw numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "element#{}", self.0)
    }
}

/// Handle identifying the controller a root is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ControllerId(u64);

impl ControllerId {
    /// Raw numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ControllerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "controller#{}", self.0)
    }
}

/// A mounted element.
pub struct Node {
    label: Option<String>,
    kind: ElementKind,
    direction: Direction,
    separate: bool,
    separator: Option<char>,
    min_size: Point,
    size: Point,
    source: ContentSource,
    content: ContentValue,
    handler: Option<Box<dyn EventHandler>>,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    controller: Option<ControllerId>,
}

impl Node {
    /// Diagnostic label.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Node kind.
    #[must_use]
    pub const fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Layout direction for children.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Whether separator cells are reserved between children.
    #[must_use]
    pub const fn separate(&self) -> bool {
        self.separate
    }

    /// Effective separator glyph.
    #[must_use]
    pub fn separator(&self) -> char {
        self.separator
            .unwrap_or_else(|| self.direction.default_separator())
    }

    /// Advisory minimum size.
    #[must_use]
    pub const fn min_size(&self) -> Point {
        self.min_size
    }

    /// Size assigned by the last resize.
    #[must_use]
    pub const fn size(&self) -> Point {
        self.size
    }

    /// Content resolved by the last update.
    #[must_use]
    pub const fn content(&self) -> &ContentValue {
        &self.content
    }

    /// Whether the node has an action handler.
    #[must_use]
    pub const fn has_handler(&self) -> bool {
        self.handler.is_some()
    }

    /// Parent element, `None` for roots.
    #[must_use]
    pub const fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    /// Children in layout order.
    #[must_use]
    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    /// Controller bound directly to this node (not inherited).
    #[must_use]
    pub const fn controller_binding(&self) -> Option<ControllerId> {
        self.controller
    }

    fn blank_row(&self) -> String {
        " ".repeat(width_of(self.size))
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("label", &self.label)
            .field("kind", &self.kind)
            .field("direction", &self.direction)
            .field("separate", &self.separate)
            .field("size", &self.size)
            .field("min_size", &self.min_size)
            .field("content", &self.content)
            .field("has_handler", &self.handler.is_some())
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("controller", &self.controller)
            .finish()
    }
}

fn width_of(size: Point) -> usize {
    usize::try_from(size.x).unwrap_or(0)
}

fn len_i32(len: usize) -> i32 {
    i32::try_from(len).unwrap_or(i32::MAX)
}

/// Arena of mounted elements.
#[derive(Debug)]
pub struct ElementTree {
    nodes: BTreeMap<ElementId, Node>,
    roots: Vec<ElementId>,
    next_id: ElementId,
    next_controller: u64,
    layout_dirty: bool,
}

impl Default for ElementTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementTree {
    /// An empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
            roots: Vec::new(),
            next_id: ElementId::MIN,
            next_controller: 1,
            layout_dirty: false,
        }
    }

    /// Number of mounted elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether nothing is mounted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Mount `element` as a new root and return its id.
    pub fn mount(&mut self, element: Element) -> ElementId {
        let id = self.insert(element, None);
        self.roots.push(id);
        self.layout_dirty = true;
        ticlif_core::debug!(root = id.get(), elements = self.nodes.len(), "mounted root");
        id
    }

    /// Mount `element` as the last child of `parent`.
    ///
    /// On a border the element is attached to the wrapped child instead.
    /// Ancestors' minimum sizes grow by the new child's minimum size. The
    /// new child has size zero until the next resize.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::MissingElement`] if `parent` is not mounted.
    pub fn append_child(
        &mut self,
        parent: ElementId,
        element: Element,
    ) -> Result<ElementId, LayoutError> {
        let node = self.node(parent)?;
        let parent = match (node.kind, node.children.first()) {
            (ElementKind::Border { .. }, Some(&inner)) => inner,
            _ => parent,
        };

        let min_size = element.min_size;
        let child = self.insert(element, Some(parent));
        self.node_mut(parent)?.children.push(child);

        let mut cursor = Some(parent);
        while let Some(id) = cursor {
            let node = self.node_mut(id)?;
            node.min_size += min_size;
            cursor = node.parent;
        }
        self.layout_dirty = true;
        Ok(child)
    }

    /// Whether elements were mounted since the last call, clearing the flag.
    ///
    /// Newly mounted elements have size zero until their root is resized.
    pub fn take_layout_dirty(&mut self) -> bool {
        std::mem::take(&mut self.layout_dirty)
    }

    fn insert(&mut self, element: Element, parent: Option<ElementId>) -> ElementId {
        let id = self.next_id;
        self.next_id = ElementId(id.0 + 1);

        let Element {
            label,
            kind,
            direction,
            separate,
            separator,
            min_size,
            source,
            content,
            handler,
            children,
        } = element;

        self.nodes.insert(
            id,
            Node {
                label,
                kind,
                direction,
                separate,
                separator,
                min_size,
                size: Point::ZERO,
                source,
                content,
                handler,
                parent,
                children: Vec::with_capacity(children.len()),
                controller: None,
            },
        );

        let child_ids: Vec<ElementId> = children
            .into_iter()
            .map(|child| self.insert(child, Some(id)))
            .collect();
        if let Some(node) = self.nodes.get_mut(&id) {
            node.children = child_ids;
        }
        id
    }

    /// Look up a node.
    #[must_use]
    pub fn get(&self, id: ElementId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    fn node(&self, id: ElementId) -> Result<&Node, LayoutError> {
        self.nodes.get(&id).ok_or(LayoutError::MissingElement { id })
    }

    fn node_mut(&mut self, id: ElementId) -> Result<&mut Node, LayoutError> {
        self.nodes
            .get_mut(&id)
            .ok_or(LayoutError::MissingElement { id })
    }

    /// Mounted roots in mount order.
    #[must_use]
    pub fn roots(&self) -> &[ElementId] {
        &self.roots
    }

    /// Size assigned by the last resize.
    pub fn size(&self, id: ElementId) -> Result<Point, LayoutError> {
        Ok(self.node(id)?.size)
    }

    /// Parent of `id`, `None` for roots.
    pub fn parent(&self, id: ElementId) -> Result<Option<ElementId>, LayoutError> {
        Ok(self.node(id)?.parent)
    }

    /// Children of `id` in layout order.
    pub fn children(&self, id: ElementId) -> Result<&[ElementId], LayoutError> {
        Ok(&self.node(id)?.children)
    }

    /// Label of `id`, or its id when unlabeled.
    #[must_use]
    pub fn name(&self, id: ElementId) -> String {
        self.get(id)
            .and_then(Node::label)
            .map_or_else(|| id.to_string(), str::to_owned)
    }

    /// First element labeled `label`, depth-first over the roots in mount
    /// order.
    #[must_use]
    pub fn find_by_id(&self, label: &str) -> Option<ElementId> {
        let mut stack: Vec<ElementId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let node = self.nodes.get(&id)?;
            if node.label.as_deref() == Some(label) {
                return Some(id);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        None
    }

    /// Topmost ancestor of `id` (itself for roots).
    pub fn root_of(&self, id: ElementId) -> Result<ElementId, LayoutError> {
        let mut current = id;
        while let Some(parent) = self.node(current)?.parent {
            current = parent;
        }
        Ok(current)
    }

    /// Hand out a fresh controller handle.
    pub fn allocate_controller_id(&mut self) -> ControllerId {
        let id = ControllerId(self.next_controller);
        self.next_controller += 1;
        id
    }

    /// Bind `id` (and, by inheritance, its subtree) to `controller`.
    pub fn bind_controller(
        &mut self,
        id: ElementId,
        controller: ControllerId,
    ) -> Result<(), LayoutError> {
        self.node_mut(id)?.controller = Some(controller);
        Ok(())
    }

    /// Controller `id` belongs to: its own binding, else the nearest bound
    /// ancestor's.
    pub fn controller_of(&self, id: ElementId) -> Result<Option<ControllerId>, LayoutError> {
        let mut current = Some(id);
        while let Some(id) = current {
            let node = self.node(id)?;
            if node.controller.is_some() {
                return Ok(node.controller);
            }
            current = node.parent;
        }
        Ok(None)
    }

    /// Assign `size` to `id` and split it among the subtree.
    ///
    /// Negative components are clamped to zero. Children share the primary
    /// axis evenly after separator cells are taken out; the last child also
    /// receives the remainder. Every child gets the full secondary extent.
    /// A border's child gets the size minus the frame.
    pub fn resize(&mut self, id: ElementId, size: Point) -> Result<(), LayoutError> {
        let size = size.max(Point::ZERO);
        let node = self.node_mut(id)?;
        node.size = size;
        if node.children.is_empty() {
            return Ok(());
        }
        let children = node.children.clone();
        let (kind, direction, separate) = (node.kind, node.direction, node.separate);

        if let ElementKind::Border { .. } = kind {
            for child in children {
                self.resize(child, size - 2)?;
            }
            return Ok(());
        }

        let count = len_i32(children.len());
        let mut space = direction.primary(size);
        if separate {
            space -= count - 1;
        }
        let space = space.max(0);
        let base = space / count;
        let remainder = space % count;
        let secondary = direction.secondary(size);

        let last = children.len() - 1;
        for (i, child) in children.into_iter().enumerate() {
            let primary = if i == last { base + remainder } else { base };
            self.resize(child, direction.compose(primary, secondary))?;
        }
        Ok(())
    }

    /// Re-evaluate content for every element of the subtree at `id`.
    pub fn update(&mut self, id: ElementId) -> Result<(), LayoutError> {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let node = self.node_mut(current)?;
            node.content = node.source.resolve();
            stack.extend(node.children.iter().rev().copied());
        }
        Ok(())
    }

    /// Replace the content of `id` with a constant.
    pub fn set_content(
        &mut self,
        id: ElementId,
        content: impl Into<ContentValue>,
    ) -> Result<(), LayoutError> {
        let node = self.node_mut(id)?;
        let value = content.into();
        node.content = value.clone();
        node.source = ContentSource::Static(value);
        Ok(())
    }

    /// Replace the content of `id` with a provider. The provider runs on the
    /// next update.
    pub fn set_content_fn(
        &mut self,
        id: ElementId,
        provider: impl ContentProvider + 'static,
    ) -> Result<(), LayoutError> {
        self.node_mut(id)?.source = ContentSource::Dynamic(Box::new(provider));
        Ok(())
    }

    /// Render one row of `id`.
    ///
    /// The result is exactly as wide as the element and never contains line
    /// breaks or tabs. Rows outside the element are blank.
    pub fn content_row(&self, id: ElementId, row: i32) -> Result<String, LayoutError> {
        let node = self.node(id)?;
        let width = width_of(node.size);
        if row < 0 || row >= node.size.y {
            return Ok(node.blank_row());
        }

        let line = match node.kind {
            ElementKind::Border { glyph } => {
                if row == 0 || row == node.size.y - 1 || width < 2 {
                    glyph.to_string().repeat(width)
                } else {
                    let inner = match node.children.first() {
                        Some(&child) => self.content_row(child, row - 1)?,
                        None => " ".repeat(width - 2),
                    };
                    format!("{glyph}{inner}{glyph}")
                }
            }
            ElementKind::Panel if node.children.is_empty() => match node.content.to_text() {
                Some(text) if !node.content.is_blank() => flow_text(&text, width)
                    .into_iter()
                    .nth(usize::try_from(row).unwrap_or(usize::MAX))
                    .unwrap_or_else(|| node.blank_row()),
                _ => "?".repeat(width),
            },
            ElementKind::Panel => match node.direction {
                Direction::Vertical => self.vertical_row(node, row)?,
                Direction::Horizontal => {
                    let joiner = if node.separate {
                        node.separator().to_string()
                    } else {
                        String::new()
                    };
                    let parts = node
                        .children
                        .iter()
                        .map(|&child| self.content_row(child, row))
                        .collect::<Result<Vec<_>, _>>()?;
                    parts.join(&joiner)
                }
            },
        };
        Ok(fit_width(&line, width))
    }

    fn vertical_row(&self, node: &Node, row: i32) -> Result<String, LayoutError> {
        let last = node.children.len().saturating_sub(1);
        let mut start = 0;
        for (i, &child) in node.children.iter().enumerate() {
            let after = start + self.node(child)?.size.y;
            if row < after {
                return self.content_row(child, row - start);
            }
            if node.separate {
                if row == after && i != last {
                    return Ok(node.separator().to_string().repeat(width_of(node.size)));
                }
                start = after + 1;
            } else {
                start = after;
            }
        }
        Ok(node.blank_row())
    }

    /// Render every row of `id`, joined by `'\n'`.
    pub fn render(&self, id: ElementId) -> Result<String, LayoutError> {
        let height = self.node(id)?.size.y;
        let rows = (0..height)
            .map(|row| self.content_row(id, row))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows.join("\n"))
    }

    /// Direct child of `id` occupying `pos`.
    ///
    /// Returns `None` for leaves, separator cells, and border frames.
    ///
    /// # Errors
    ///
    /// [`LayoutError::OutOfBounds`] when `pos` lies outside the element.
    pub fn child_at(&self, id: ElementId, pos: Point) -> Result<Option<ElementId>, LayoutError> {
        let node = self.node(id)?;
        if !pos.is_within(node.size) {
            return Err(LayoutError::OutOfBounds {
                element: id,
                pos,
                size: node.size,
            });
        }
        if node.children.is_empty() {
            return Ok(None);
        }

        if let ElementKind::Border { .. } = node.kind {
            let on_frame = pos.x == 0
                || pos.y == 0
                || pos.x == node.size.x - 1
                || pos.y == node.size.y - 1;
            return Ok(if on_frame {
                None
            } else {
                node.children.first().copied()
            });
        }

        let p = node.direction.primary(pos);
        let last = node.children.len() - 1;
        let mut start = 0;
        for (i, &child) in node.children.iter().enumerate() {
            let after = start + node.direction.primary(self.node(child)?.size);
            if p < after {
                return Ok(Some(child));
            }
            if node.separate {
                if p == after && i != last {
                    return Ok(None);
                }
                start = after + 1;
            } else {
                start = after;
            }
        }
        Ok(node.children.last().copied())
    }

    /// Deepest element of the subtree at `id` occupying `pos`.
    ///
    /// Returns `id` itself when no child owns the position.
    pub fn element_at(&self, id: ElementId, pos: Point) -> Result<ElementId, LayoutError> {
        let mut current = id;
        let mut pos = pos;
        while let Some(child) = self.child_at(current, pos)? {
            pos -= self.pos_of_child(current, child)?;
            current = child;
            if !pos.is_within(self.node(current)?.size) {
                break;
            }
        }
        Ok(current)
    }

    /// Offset of `child` inside `parent`.
    ///
    /// # Errors
    ///
    /// [`LayoutError::NotAChild`] when `child` is not a direct child.
    pub fn pos_of_child(&self, parent: ElementId, child: ElementId) -> Result<Point, LayoutError> {
        let index = self
            .node(parent)?
            .children
            .iter()
            .position(|&c| c == child)
            .ok_or(LayoutError::NotAChild { parent, child })?;
        self.pos_of_child_index(parent, index)
    }

    /// Offset of the child at `index` inside `parent`.
    pub fn pos_of_child_index(&self, parent: ElementId, index: usize) -> Result<Point, LayoutError> {
        let node = self.node(parent)?;
        if index >= node.children.len() {
            return Err(LayoutError::ChildIndexOutOfRange {
                parent,
                index,
                len: node.children.len(),
            });
        }
        if let ElementKind::Border { .. } = node.kind {
            return Ok(Point::new(1, 1));
        }

        let mut offset = 0;
        for &child in &node.children[..index] {
            offset += node.direction.primary(self.node(child)?.size);
            if node.separate {
                offset += 1;
            }
        }
        Ok(node.direction.compose(offset, 0))
    }

    /// Sibling immediately after `id`.
    pub fn next_sibling(&self, id: ElementId) -> Result<Option<ElementId>, LayoutError> {
        let Some(parent) = self.node(id)?.parent else {
            return Ok(None);
        };
        let siblings = &self.node(parent)?.children;
        let index = siblings
            .iter()
            .position(|&c| c == id)
            .ok_or(LayoutError::NotAChild { parent, child: id })?;
        Ok(siblings.get(index + 1).copied())
    }

    /// Element after `child` in `parent`: the next sibling, or, for the last
    /// child, the element after `parent` in its own parent.
    pub fn next_child(
        &self,
        parent: ElementId,
        child: ElementId,
    ) -> Result<Option<ElementId>, LayoutError> {
        let mut parent = parent;
        let mut child = child;
        loop {
            let node = self.node(parent)?;
            let index = node
                .children
                .iter()
                .position(|&c| c == child)
                .ok_or(LayoutError::NotAChild { parent, child })?;
            if let Some(&next) = node.children.get(index + 1) {
                return Ok(Some(next));
            }
            match node.parent {
                Some(grandparent) => {
                    child = parent;
                    parent = grandparent;
                }
                None => return Ok(None),
            }
        }
    }

    /// Element that follows `id` in focus order. Roots have none.
    pub fn next_element(&self, id: ElementId) -> Result<Option<ElementId>, LayoutError> {
        match self.node(id)?.parent {
            Some(parent) => self.next_child(parent, id),
            None => Ok(None),
        }
    }

    /// Position of `id` relative to its root.
    pub fn absolute_position(&self, id: ElementId) -> Result<Point, LayoutError> {
        let mut pos = Point::ZERO;
        let mut current = id;
        while let Some(parent) = self.node(current)?.parent {
            pos += self.pos_of_child(parent, current)?;
            current = parent;
        }
        Ok(pos)
    }

    /// Route an action event into the subtree at `id`.
    ///
    /// The first element on the way down that has a handler receives the
    /// event. Without a handler the event moves to the child under its
    /// position, translated into that child's coordinates. The event is
    /// dropped when it lands on a separator, frame, or handler-less leaf.
    pub fn action(&mut self, id: ElementId, event: Event) -> Result<(), LayoutError> {
        let mut current = id;
        let mut event = event;
        loop {
            if let Some(mut handler) = self.node_mut(current)?.handler.take() {
                ticlif_core::trace!(
                    element = current.get(),
                    pos = %event.pos,
                    "dispatching action to handler"
                );
                handler.handle(ElementMut { tree: self, id: current }, &event);
                if let Some(node) = self.nodes.get_mut(&current)
                    && node.handler.is_none()
                {
                    node.handler = Some(handler);
                }
                return Ok(());
            }
            match self.child_at(current, event.pos)? {
                Some(child) => {
                    event.pos -= self.pos_of_child(current, child)?;
                    current = child;
                }
                None => {
                    ticlif_core::trace!(element = current.get(), "action not handled");
                    return Ok(());
                }
            }
        }
    }
}

/// Mutable view of one element, handed to [`EventHandler`]s.
pub struct ElementMut<'a> {
    tree: &'a mut ElementTree,
    id: ElementId,
}

impl<'a> ElementMut<'a> {
    /// View `id` inside `tree`.
    pub fn new(tree: &'a mut ElementTree, id: ElementId) -> Self {
        Self { tree, id }
    }

    /// Id of the viewed element.
    #[must_use]
    pub const fn id(&self) -> ElementId {
        self.id
    }

    /// Label, or id when unlabeled.
    #[must_use]
    pub fn name(&self) -> String {
        self.tree.name(self.id)
    }

    /// The underlying node.
    #[must_use]
    pub fn node(&self) -> Option<&Node> {
        self.tree.get(self.id)
    }

    /// Current size.
    pub fn size(&self) -> Result<Point, LayoutError> {
        self.tree.size(self.id)
    }

    /// Replace the content with a constant.
    pub fn set_content(&mut self, content: impl Into<ContentValue>) -> Result<(), LayoutError> {
        self.tree.set_content(self.id, content)
    }

    /// Re-evaluate content of this element's subtree now.
    pub fn update_now(&mut self) -> Result<(), LayoutError> {
        self.tree.update(self.id)
    }

    /// Mount a new child under this element.
    pub fn append_child(&mut self, element: Element) -> Result<ElementId, LayoutError> {
        self.tree.append_child(self.id, element)
    }

    /// Shared access to the whole tree.
    #[must_use]
    pub fn tree(&self) -> &ElementTree {
        &*self.tree
    }

    /// Mutable access to the whole tree.
    pub fn tree_mut(&mut self) -> &mut ElementTree {
        &mut *self.tree
    }
}

impl fmt::Debug for ElementMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementMut").field("id", &self.id).finish()
    }
}
