#![forbid(unsafe_code)]

//! Per-tick diagnostics snapshot.
//!
//! The controller refreshes a shared [`DebugInfo`] during every update,
//! before content providers run, so an element can display it:
//!
//! ```
//! use ticlif_layout::Element;
//! use ticlif_runtime::{Controller, debug_info};
//!
//! let mut controller = Controller::new();
//! let pane = Element::new()
//!     .with_id("debug")
//!     .with_content_fn(debug_info::provider(controller.debug_info(), "debug".into()));
//! let root = controller.mount(pane);
//! controller.activate_root(root).unwrap();
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use ticlif_core::geometry::Point;

/// Shared handle to a [`DebugInfo`] snapshot.
pub type SharedDebugInfo = Rc<RefCell<DebugInfo>>;

/// What the controller saw during the last update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DebugInfo {
    /// Window size.
    pub window_size: Point,
    /// Cursor position.
    pub cursor: Point,
    /// Active root, by name.
    pub active_root: Option<String>,
    /// Deepest element under the cursor, by name.
    pub element_under_cursor: Option<String>,
    /// Direct child of the active root under the cursor, by name.
    pub first_child_under_cursor: Option<String>,
    /// Offsets of the active root's children.
    pub child_offsets: Vec<Point>,
    /// Frames drawn so far.
    pub frame: i64,
    /// Recently received input tokens, oldest first.
    pub recent_inputs: Vec<String>,
}

fn or_none(name: Option<&String>) -> &str {
    name.map_or("none", String::as_str)
}

impl DebugInfo {
    /// Human-readable lines, as shown by `this` element.
    #[must_use]
    pub fn lines(&self, this: &str) -> Vec<String> {
        vec![
            format!("this element: {this}"),
            format!("absolute cursor position: {}", self.cursor),
            format!(
                "elem under cursor: {}",
                or_none(self.element_under_cursor.as_ref())
            ),
            format!(
                "first child under cursor: {}",
                or_none(self.first_child_under_cursor.as_ref())
            ),
            format!("frame: {}", self.frame),
            format!("debug: [{}]", self.recent_inputs.join(", ")),
        ]
    }
}

/// Content provider rendering `info` as seen by the element named `this`.
pub fn provider(info: SharedDebugInfo, this: String) -> impl FnMut() -> Vec<String> {
    move || info.borrow().lines(&this)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_describe_snapshot() {
        let info = DebugInfo {
            cursor: Point::new(3, 4),
            element_under_cursor: Some(".1.2".into()),
            frame: 7,
            recent_inputs: vec!["up".into(), "'a'".into()],
            ..DebugInfo::default()
        };
        let lines = info.lines(".0");
        assert_eq!(lines[0], "this element: .0");
        assert_eq!(lines[1], "absolute cursor position: (3,4)");
        assert_eq!(lines[2], "elem under cursor: .1.2");
        assert_eq!(lines[3], "first child under cursor: none");
        assert_eq!(lines[4], "frame: 7");
        assert_eq!(lines[5], "debug: [up, 'a']");
    }

    #[test]
    fn provider_reads_latest_snapshot() {
        let shared: SharedDebugInfo = Rc::default();
        let mut fetch = provider(Rc::clone(&shared), "pane".into());
        assert_eq!(fetch()[4], "frame: 0");
        shared.borrow_mut().frame = 3;
        assert_eq!(fetch()[4], "frame: 3");
    }
}
