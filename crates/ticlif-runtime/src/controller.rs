#![forbid(unsafe_code)]

//! Cursor, roots, and input dispatch.
//!
//! A [`Controller`] owns the [`ElementTree`], the [`State`], and an ordered
//! collection of roots. The collection is kept in most-recently-used order:
//! the active root is the last entry, and [`Controller::switch_to_next_root`]
//! rotates the last entry to the front.
//!
//! ```
//! use ticlif_core::event::{Command, Key};
//! use ticlif_core::geometry::Point;
//! use ticlif_layout::Element;
//! use ticlif_runtime::{Controller, Flow};
//!
//! let mut controller = Controller::new();
//! let root = controller.mount(Element::new().with_content("hello"));
//! controller.activate_root(root).unwrap();
//! controller.update(Point::new(10, 3)).unwrap();
//!
//! let flow = controller.process_input(Key::Command(Command::Down)).unwrap();
//! assert_eq!(flow, Flow::Continue);
//! assert_eq!(controller.state().cursor(), Point::new(0, 1));
//! ```

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use ticlif_core::event::{Command, Event, Key};
use ticlif_core::geometry::Point;
use ticlif_layout::{ControllerId, Element, ElementId, ElementTree, LayoutError};
use tracing::{debug, debug_span, info, trace};

use crate::debug_info::{DebugInfo, SharedDebugInfo};
use crate::debug_ring::DebugRing;
use crate::state::{FRAME_PROPERTY, State};

/// Default number of recent inputs kept for diagnostics.
pub const DEFAULT_DEBUG_CAPACITY: usize = 10;

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExitReason {
    /// Graceful termination (Back). The exit hook runs.
    Requested,
    /// Unconditional interrupt (Ctrl+C). The exit hook is skipped.
    Interrupted,
}

/// Outcome of processing one input token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flow {
    /// Keep running.
    Continue,
    /// Stop the loop.
    Exit(ExitReason),
}

/// Owns the element tree, cursor state, and root ordering.
#[derive(Debug)]
pub struct Controller {
    id: ControllerId,
    tree: ElementTree,
    state: State,
    roots: VecDeque<ElementId>,
    recent_inputs: DebugRing<Key>,
    debug_info: SharedDebugInfo,
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller {
    /// Controller over an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::with_tree(ElementTree::new())
    }

    /// Controller over an existing tree. No root is registered yet.
    #[must_use]
    pub fn with_tree(mut tree: ElementTree) -> Self {
        let id = tree.allocate_controller_id();
        Self {
            id,
            tree,
            state: State::new(),
            roots: VecDeque::new(),
            recent_inputs: DebugRing::new(DEFAULT_DEBUG_CAPACITY),
            debug_info: Rc::new(RefCell::new(DebugInfo::default())),
        }
    }

    /// Keep the last `capacity` inputs for diagnostics.
    #[must_use]
    pub fn with_debug_capacity(mut self, capacity: usize) -> Self {
        self.recent_inputs = DebugRing::new(capacity);
        self
    }

    /// This controller's handle.
    #[must_use]
    pub const fn id(&self) -> ControllerId {
        self.id
    }

    #[must_use]
    pub const fn tree(&self) -> &ElementTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut ElementTree {
        &mut self.tree
    }

    #[must_use]
    pub const fn state(&self) -> &State {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut State {
        &mut self.state
    }

    /// Recently processed input tokens.
    #[must_use]
    pub const fn recent_inputs(&self) -> &DebugRing<Key> {
        &self.recent_inputs
    }

    /// Shared diagnostics snapshot, refreshed by [`update`](Self::update).
    #[must_use]
    pub fn debug_info(&self) -> SharedDebugInfo {
        Rc::clone(&self.debug_info)
    }

    /// Mount `element` into the tree without registering it as a root.
    pub fn mount(&mut self, element: Element) -> ElementId {
        self.tree.mount(element)
    }

    /// Registered roots, least recently used first. The last one is active.
    pub fn roots(&self) -> impl ExactSizeIterator<Item = ElementId> + '_ {
        self.roots.iter().copied()
    }

    /// The active root.
    #[must_use]
    pub fn active_root(&self) -> Option<ElementId> {
        self.roots.back().copied()
    }

    /// Register `root` at the least-recently-used end. It only becomes active
    /// when no other root is registered.
    pub fn add_root(&mut self, root: ElementId) -> Result<(), LayoutError> {
        self.tree.bind_controller(root, self.id)?;
        if !self.roots.contains(&root) {
            self.roots.push_front(root);
            debug!(root = %self.tree.name(root), roots = self.roots.len(), "root added");
        }
        Ok(())
    }

    /// Make `root` the active root, registering it if needed.
    pub fn activate_root(&mut self, root: ElementId) -> Result<(), LayoutError> {
        self.tree.bind_controller(root, self.id)?;
        self.roots.retain(|&r| r != root);
        self.roots.push_back(root);
        debug!(root = %self.tree.name(root), "root activated");
        Ok(())
    }

    /// Rotate the active root to the least-recently-used end.
    pub fn switch_to_next_root(&mut self) {
        if let Some(active) = self.roots.pop_back() {
            self.roots.push_front(active);
            info!(
                from = %self.tree.name(active),
                to = ?self.active_root().map(|r| self.tree.name(r)),
                "switched root"
            );
        }
    }

    /// Unregister the active root.
    pub fn remove_active(&mut self) -> Option<ElementId> {
        self.roots.pop_back()
    }

    /// Unregister `root`. Unknown roots are ignored.
    pub fn remove_root(&mut self, root: ElementId) {
        self.roots.retain(|&r| r != root);
    }

    /// Bring every root up to date for a window of `window_size`.
    ///
    /// Roots are resized when the window changed, when elements were mounted
    /// since the last update, or when a root was registered at another size.
    /// The diagnostics snapshot is refreshed next, then every root's content
    /// is re-evaluated.
    pub fn update(&mut self, window_size: Point) -> Result<(), LayoutError> {
        let _span = debug_span!("ticlif.controller.update").entered();

        let window_size = window_size.max(Point::ZERO);
        let resized = window_size != self.state.window_size();
        if resized {
            debug!(
                from = %self.state.window_size(),
                to = %window_size,
                "window resized"
            );
            self.state.set_window_size(window_size);
        }
        let relayout = self.tree.take_layout_dirty() || resized;
        for &root in &self.roots {
            if relayout || self.tree.size(root)? != window_size {
                self.tree.resize(root, window_size)?;
            }
        }

        self.refresh_debug_info()?;

        for &root in &self.roots {
            self.tree.update(root)?;
        }
        Ok(())
    }

    fn refresh_debug_info(&mut self) -> Result<(), LayoutError> {
        let cursor = self.state.cursor();
        let mut info = DebugInfo {
            window_size: self.state.window_size(),
            cursor,
            frame: self.state.frame(),
            recent_inputs: self.recent_inputs.iter().map(ToString::to_string).collect(),
            ..DebugInfo::default()
        };

        if let Some(root) = self.active_root() {
            info.active_root = Some(self.tree.name(root));
            if let Some(under) = self.element_under_cursor()? {
                info.element_under_cursor = Some(self.tree.name(under));
            }
            if cursor.is_within(self.tree.size(root)?) {
                info.first_child_under_cursor = self
                    .tree
                    .child_at(root, cursor)?
                    .map(|child| self.tree.name(child));
            }
            let count = self.tree.children(root)?.len();
            info.child_offsets = (0..count)
                .map(|i| self.tree.pos_of_child_index(root, i))
                .collect::<Result<_, _>>()?;
        }

        *self.debug_info.borrow_mut() = info;
        Ok(())
    }

    /// Handle one decoded input token.
    ///
    /// | token | effect |
    /// |-------|--------|
    /// | arrows | move the cursor one cell, clamped to the window |
    /// | Switch | [`switch_to_next_root`](Self::switch_to_next_root) |
    /// | Next | move the cursor to the element after the one under it |
    /// | Ok | action at the cursor on the active root |
    /// | characters, Delete, DeleteBefore | action on the element under the cursor |
    /// | Back | [`Flow::Exit`] with [`ExitReason::Requested`] |
    /// | Interrupt | [`Flow::Exit`] with [`ExitReason::Interrupted`] |
    ///
    /// Every token is recorded in [`recent_inputs`](Self::recent_inputs).
    pub fn process_input(&mut self, key: Key) -> Result<Flow, LayoutError> {
        trace!(%key, cursor = %self.state.cursor(), "input");
        self.recent_inputs.push(key);

        match key {
            Key::Command(Command::Interrupt) => {
                return Ok(Flow::Exit(ExitReason::Interrupted));
            }
            Key::Command(Command::Back) => return Ok(Flow::Exit(ExitReason::Requested)),
            Key::Command(cmd) if cmd.is_direction() => {
                if let Some(step) = cmd.step() {
                    self.state.move_cursor(step);
                }
            }
            Key::Command(Command::Switch) => self.switch_to_next_root(),
            Key::Command(Command::Next) => self.move_cursor_to_next()?,
            Key::Command(Command::Ok) => {
                let cursor = self.state.cursor();
                if let Some(root) = self.active_root()
                    && cursor.is_within(self.tree.size(root)?)
                {
                    self.tree.action(root, Event::user_input(key, cursor))?;
                }
            }
            _ if key.is_edit() => {
                if let Some(target) = self.element_under_cursor()? {
                    let pos = self.state.cursor() - self.tree.absolute_position(target)?;
                    self.tree.action(target, Event::user_input(key, pos))?;
                }
            }
            Key::Command(_) | Key::Char(_) => {}
        }
        Ok(Flow::Continue)
    }

    /// Deepest element of the active root under the cursor.
    ///
    /// Returns the root itself when the cursor lies outside it (for instance
    /// before the first resize).
    pub fn element_under_cursor(&self) -> Result<Option<ElementId>, LayoutError> {
        let Some(root) = self.active_root() else {
            return Ok(None);
        };
        let cursor = self.state.cursor();
        if !cursor.is_within(self.tree.size(root)?) {
            return Ok(Some(root));
        }
        self.tree.element_at(root, cursor).map(Some)
    }

    /// Element focused after `element`: its next element, or the active
    /// root once the end of the tree is reached.
    pub fn element_after(&self, element: ElementId) -> Result<ElementId, LayoutError> {
        Ok(match self.tree.next_element(element)? {
            Some(next) => next,
            None => self.active_root().unwrap_or(element),
        })
    }

    /// Place the cursor on the top-left cell of `element`.
    pub fn move_cursor_to(&mut self, element: ElementId) -> Result<(), LayoutError> {
        let pos = self.tree.absolute_position(element)?;
        self.state.set_cursor(pos);
        trace!(element = %self.tree.name(element), %pos, "cursor moved to element");
        Ok(())
    }

    /// Move the cursor to the element after the one under it.
    pub fn move_cursor_to_next(&mut self) -> Result<(), LayoutError> {
        let Some(current) = self.element_under_cursor()? else {
            return Ok(());
        };
        let next = self.element_after(current)?;
        self.move_cursor_to(next)
    }

    /// Render the active root as `height` rows with `cursor_glyph` drawn at
    /// the cursor, and bump the frame counter.
    ///
    /// Without an active root the frame is blank.
    pub fn render(&mut self, height: i32, cursor_glyph: char) -> Result<String, LayoutError> {
        let frame = self.state.increment(FRAME_PROPERTY);
        trace!(frame, height, "rendering frame");

        let width = usize::try_from(self.state.window_size().x).unwrap_or(0);
        let cursor = self.state.cursor();
        let mut rows = Vec::with_capacity(usize::try_from(height).unwrap_or(0));
        for row in 0..height {
            let mut line = match self.active_root() {
                Some(root) => self.tree.content_row(root, row)?,
                None => " ".repeat(width),
            };
            if row == cursor.y {
                line = overlay_glyph(&line, cursor.x, cursor_glyph);
            }
            rows.push(line);
        }
        Ok(rows.join("\n"))
    }
}

/// Replace the char at `column` with `glyph`; append when the line is
/// shorter.
fn overlay_glyph(line: &str, column: i32, glyph: char) -> String {
    let column = usize::try_from(column).unwrap_or(0);
    let mut out: String = line.chars().take(column).collect();
    out.push(glyph);
    out.extend(line.chars().skip(column + 1));
    out
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use ticlif_layout::Direction;

    use super::*;

    fn leaf(label: &str) -> Element {
        Element::new().with_id(label)
    }

    fn three_roots() -> (Controller, [ElementId; 3]) {
        let mut c = Controller::new();
        let a = c.mount(leaf("a"));
        let b = c.mount(leaf("b"));
        let d = c.mount(leaf("d"));
        c.add_root(a).unwrap();
        c.add_root(b).unwrap();
        c.add_root(d).unwrap();
        (c, [a, b, d])
    }

    #[test]
    fn add_root_only_activates_first() {
        let (c, [a, b, d]) = three_roots();
        assert_eq!(c.active_root(), Some(a));
        assert_eq!(c.roots().collect::<Vec<_>>(), vec![d, b, a]);
        assert_eq!(c.tree().controller_of(b).unwrap(), Some(c.id()));
    }

    #[test]
    fn add_root_twice_is_idempotent() {
        let (mut c, [a, ..]) = three_roots();
        c.add_root(a).unwrap();
        assert_eq!(c.roots().len(), 3);
        assert_eq!(c.active_root(), Some(a));
    }

    #[test]
    fn activate_moves_root_to_tail() {
        let (mut c, [a, b, d]) = three_roots();
        c.activate_root(b).unwrap();
        assert_eq!(c.roots().collect::<Vec<_>>(), vec![d, a, b]);
        assert_eq!(c.active_root(), Some(b));
    }

    #[test]
    fn switch_rotates_and_cycles_back() {
        let (mut c, [a, b, d]) = three_roots();
        c.switch_to_next_root();
        assert_eq!(c.active_root(), Some(b));
        assert_eq!(c.roots().collect::<Vec<_>>(), vec![a, d, b]);
        c.switch_to_next_root();
        c.switch_to_next_root();
        assert_eq!(c.active_root(), Some(a));
        assert_eq!(c.roots().collect::<Vec<_>>(), vec![d, b, a]);
    }

    #[test]
    fn switch_and_remove_on_empty_are_noops() {
        let mut c = Controller::new();
        c.switch_to_next_root();
        assert_eq!(c.remove_active(), None);
        c.remove_root(ElementId::MIN);
        assert_eq!(c.active_root(), None);
    }

    #[test]
    fn remove_root_and_active() {
        let (mut c, [a, b, d]) = three_roots();
        c.remove_root(b);
        assert_eq!(c.roots().collect::<Vec<_>>(), vec![d, a]);
        assert_eq!(c.remove_active(), Some(a));
        assert_eq!(c.active_root(), Some(d));
    }

    #[test]
    fn update_resizes_all_roots_and_refreshes_content() {
        let value = Rc::new(Cell::new(0));
        let source = Rc::clone(&value);
        let (mut c, [a, b, _]) = three_roots();
        c.tree_mut()
            .set_content_fn(b, move || source.get())
            .unwrap();
        c.update(Point::new(4, 2)).unwrap();
        assert_eq!(c.tree().size(a).unwrap(), Point::new(4, 2));
        assert_eq!(c.tree().size(b).unwrap(), Point::new(4, 2));
        value.set(9);
        c.update(Point::new(4, 2)).unwrap();
        assert_eq!(c.tree().content_row(b, 0).unwrap(), "9   ");
    }

    #[test]
    fn update_lays_out_children_appended_later() {
        let mut c = Controller::new();
        let root = c.mount(Element::new());
        c.activate_root(root).unwrap();
        c.update(Point::new(6, 5)).unwrap();
        let child = c.tree_mut().append_child(root, leaf("late")).unwrap();
        c.update(Point::new(6, 5)).unwrap();
        assert_eq!(c.tree().size(child).unwrap(), Point::new(6, 5));
    }

    #[test]
    fn arrows_move_cursor_within_window() {
        let mut c = Controller::new();
        let root = c.mount(leaf("r"));
        c.activate_root(root).unwrap();
        c.update(Point::new(3, 2)).unwrap();
        for key in [
            Command::Right,
            Command::Right,
            Command::Right,
            Command::Down,
            Command::Down,
        ] {
            c.process_input(Key::Command(key)).unwrap();
        }
        assert_eq!(c.state().cursor(), Point::new(2, 1));
        c.process_input(Key::Command(Command::Up)).unwrap();
        c.process_input(Key::Command(Command::Left)).unwrap();
        assert_eq!(c.state().cursor(), Point::new(1, 0));
    }

    #[test]
    fn back_and_interrupt_exit() {
        let mut c = Controller::new();
        assert_eq!(
            c.process_input(Key::Command(Command::Back)).unwrap(),
            Flow::Exit(ExitReason::Requested)
        );
        assert_eq!(
            c.process_input(Key::Command(Command::Interrupt)).unwrap(),
            Flow::Exit(ExitReason::Interrupted)
        );
    }

    #[test]
    fn confirm_without_root_is_noop() {
        let mut c = Controller::new();
        assert_eq!(
            c.process_input(Key::Command(Command::Ok)).unwrap(),
            Flow::Continue
        );
    }

    #[test]
    fn confirm_on_zero_height_window_is_noop() {
        let hits = Rc::new(Cell::new(0));
        let seen = Rc::clone(&hits);
        let mut c = Controller::new();
        let root = c.mount(
            Element::new()
                .with_direction(Direction::Horizontal)
                .with_child(leaf("left").with_handler(move |_, _| seen.set(seen.get() + 1)))
                .with_child(leaf("right")),
        );
        c.activate_root(root).unwrap();
        c.update(Point::new(10, 0)).unwrap();
        assert_eq!(c.state().cursor(), Point::ZERO);
        assert_eq!(
            c.process_input(Key::Command(Command::Ok)).unwrap(),
            Flow::Continue
        );
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn confirm_dispatches_at_cursor() {
        let hits = Rc::new(Cell::new(0));
        let seen = Rc::clone(&hits);
        let mut c = Controller::new();
        let root = c.mount(
            Element::new()
                .with_direction(Direction::Horizontal)
                .with_child(leaf("left"))
                .with_child(leaf("right").with_handler(move |_, ev| {
                    assert_eq!(ev.pos, Point::new(1, 0));
                    seen.set(seen.get() + 1);
                })),
        );
        c.activate_root(root).unwrap();
        c.update(Point::new(11, 2)).unwrap();
        c.state_mut().set_cursor(Point::new(7, 0));
        c.process_input(Key::Command(Command::Ok)).unwrap();
        assert_eq!(hits.get(), 1);
        // Cursor on the separator: nobody handles it.
        c.state_mut().set_cursor(Point::new(5, 0));
        c.process_input(Key::Command(Command::Ok)).unwrap();
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn edits_go_to_element_under_cursor_past_root_handler() {
        let root_hits = Rc::new(Cell::new(0));
        let root_seen = Rc::clone(&root_hits);
        let typed = Rc::new(RefCell::new(String::new()));
        let sink = Rc::clone(&typed);

        let mut c = Controller::new();
        let root = c.mount(
            Element::new()
                .with_handler(move |_, _| root_seen.set(root_seen.get() + 1))
                .with_child(leaf("top"))
                .with_child(leaf("input").with_handler(move |_, ev| {
                    if let Some(Key::Char(ch)) = ev.key {
                        sink.borrow_mut().push(ch);
                    }
                })),
        );
        c.activate_root(root).unwrap();
        c.update(Point::new(4, 5)).unwrap();
        c.state_mut().set_cursor(Point::new(1, 4));
        c.process_input(Key::Char('o')).unwrap();
        c.process_input(Key::Char('k')).unwrap();
        assert_eq!(typed.borrow().as_str(), "ok");
        assert_eq!(root_hits.get(), 0);

        c.process_input(Key::Command(Command::Ok)).unwrap();
        assert_eq!(root_hits.get(), 1);
    }

    #[test]
    fn next_walks_elements_and_wraps_to_root() {
        let mut c = Controller::new();
        let root = c.mount(
            Element::new()
                .with_child(leaf("A").with_child(leaf("A0")).with_child(leaf("A1")))
                .with_child(leaf("B")),
        );
        c.activate_root(root).unwrap();
        c.update(Point::new(4, 11)).unwrap();
        let find = |c: &Controller, label: &str| c.tree().find_by_id(label).unwrap();

        // Wrapping to the root puts the cursor on the origin, inside A0.
        let mut visited = Vec::new();
        for _ in 0..4 {
            c.process_input(Key::Command(Command::Next)).unwrap();
            visited.push(c.element_under_cursor().unwrap().unwrap());
        }
        assert_eq!(
            visited,
            vec![find(&c, "A1"), find(&c, "B"), find(&c, "A0"), find(&c, "A1")]
        );
        assert_eq!(c.element_after(find(&c, "B")).unwrap(), root);
    }

    #[test]
    fn render_overlays_cursor_and_counts_frames() {
        let mut c = Controller::new();
        let root = c.mount(Element::new().with_content("abc\ndef"));
        c.activate_root(root).unwrap();
        c.update(Point::new(3, 2)).unwrap();
        c.state_mut().set_cursor(Point::new(1, 1));
        assert_eq!(c.render(2, '$').unwrap(), "abc\nd$f");
        assert_eq!(c.state().frame(), 1);
        c.render(2, '$').unwrap();
        assert_eq!(c.state().frame(), 2);
    }

    #[test]
    fn render_without_root_is_blank() {
        let mut c = Controller::new();
        c.update(Point::new(2, 2)).unwrap();
        c.state_mut().set_cursor(Point::new(1, 1));
        assert_eq!(c.render(2, '@').unwrap(), "  \n @");
    }

    #[test]
    fn debug_info_tracks_cursor_and_inputs() {
        let mut c = Controller::new().with_debug_capacity(2);
        let root = c.mount(
            Element::new()
                .with_id(".")
                .with_direction(Direction::Horizontal)
                .with_child(leaf(".0"))
                .with_child(leaf(".1")),
        );
        c.activate_root(root).unwrap();
        c.update(Point::new(11, 3)).unwrap();
        for key in [Command::Right; 7] {
            c.process_input(Key::Command(key)).unwrap();
        }
        c.update(Point::new(11, 3)).unwrap();

        let info = c.debug_info().borrow().clone();
        assert_eq!(info.cursor, Point::new(7, 0));
        assert_eq!(info.element_under_cursor.as_deref(), Some(".1"));
        assert_eq!(info.first_child_under_cursor.as_deref(), Some(".1"));
        assert_eq!(info.active_root.as_deref(), Some("."));
        assert_eq!(info.child_offsets, vec![Point::ZERO, Point::new(6, 0)]);
        assert_eq!(info.recent_inputs, vec!["right", "right"]);
    }

    #[test]
    fn overlay_appends_past_end() {
        assert_eq!(overlay_glyph("", 0, '$'), "$");
        assert_eq!(overlay_glyph("ab", 0, '$'), "$b");
        assert_eq!(overlay_glyph("ab", 5, '$'), "ab$");
    }
}
