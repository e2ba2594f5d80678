#![forbid(unsafe_code)]

//! Ready-made elements.

use std::cell::RefCell;
use std::rc::Rc;

use ticlif_core::event::{Command, Event, Key};

use crate::element::{Element, EventHandler};
use crate::tree::ElementMut;

/// Single-line text entry backed by a shared buffer.
///
/// Printable characters are appended, `DeleteBefore` removes the last
/// character and `Delete` clears the buffer. Other events are ignored.
#[derive(Debug, Clone)]
pub struct TextInput {
    buffer: Rc<RefCell<String>>,
}

impl TextInput {
    /// Edit `buffer`.
    #[must_use]
    pub fn new(buffer: Rc<RefCell<String>>) -> Self {
        Self { buffer }
    }

    /// Apply `key` to the buffer. Returns whether the buffer changed.
    pub fn apply(&self, key: Key) -> bool {
        let mut buffer = self.buffer.borrow_mut();
        match key {
            Key::Char(c) => {
                buffer.push(c);
                true
            }
            Key::Command(Command::DeleteBefore) => buffer.pop().is_some(),
            Key::Command(Command::Delete) => {
                let changed = !buffer.is_empty();
                buffer.clear();
                changed
            }
            Key::Command(_) => false,
        }
    }
}

impl EventHandler for TextInput {
    fn handle(&mut self, mut element: ElementMut<'_>, event: &Event) {
        let Some(key) = event.key else {
            return;
        };
        if self.apply(key) {
            ticlif_core::trace!(element = element.id().get(), "text input edited");
            if let Err(err) = element.update_now() {
                ticlif_core::debug!(
                    element = element.id().get(),
                    error = %err,
                    "text input refresh failed"
                );
            }
        }
    }
}

/// A leaf showing `buffer` and editing it through [`TextInput`].
#[must_use]
pub fn text_input(buffer: Rc<RefCell<String>>) -> Element {
    let shown = Rc::clone(&buffer);
    Element::new()
        .with_content_fn(move || shown.borrow().clone())
        .update_now()
        .with_event_handler(TextInput::new(buffer))
}
