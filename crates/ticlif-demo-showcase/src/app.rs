#![forbid(unsafe_code)]

//! The demo's element trees.
//!
//! Two roots are mounted:
//!
//! - **main** (`.`): a horizontal split. The left pane (`.0`) shows the
//!   controller's debug info. The right pane (`.1`) stacks the cursor
//!   position, the offset of the root's second child, a bordered click
//!   counter, and a text input. Any event reaching the root bumps the
//!   counter.
//! - **fruit**: a list of fruit above its length. Activating the length
//!   adds another fruit.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use ticlif_core::event::Event;
use ticlif_layout::widgets::text_input;
use ticlif_layout::{Direction, Element, ElementId, ElementMut, LayoutError};
use ticlif_runtime::{Controller, debug_info};
use tracing::debug;

/// Fruit the basket starts with.
pub const INITIAL_FRUIT: [&str; 3] = ["Apple", "Peach", "Banana"];

/// Fruit added on every activation of the basket count.
pub const ADDED_FRUIT: &str = "Ananas";

/// Handles to the mounted demo and the state its handlers share.
#[derive(Debug, Clone)]
pub struct Demo {
    pub main: ElementId,
    pub fruit: ElementId,
    pub counter: Rc<Cell<i64>>,
    pub fruits: Rc<RefCell<Vec<String>>>,
    pub name: Rc<RefCell<String>>,
}

impl Demo {
    /// Mount both roots on `controller` and make main the active one.
    pub fn mount(controller: &mut Controller) -> Result<Self, LayoutError> {
        let counter = Rc::new(Cell::new(0));
        let fruits = Rc::new(RefCell::new(
            INITIAL_FRUIT.iter().map(|f| (*f).to_owned()).collect::<Vec<_>>(),
        ));
        let name = Rc::new(RefCell::new(String::new()));

        let fruit = controller.mount(fruit_basket(&fruits));
        let view = main_view(controller, &counter, &name);
        let main = controller.mount(view);

        controller.add_root(fruit)?;
        controller.activate_root(main)?;
        debug!(%main, %fruit, "demo mounted");

        Ok(Self {
            main,
            fruit,
            counter,
            fruits,
            name,
        })
    }

    /// Root to start on, 1-indexed in the order main, fruit. Out-of-range
    /// indices fall back to main.
    #[must_use]
    pub fn start_root(&self, index: u16) -> ElementId {
        match index {
            2 => self.fruit,
            _ => self.main,
        }
    }
}

fn count_clicks(counter: &Rc<Cell<i64>>) -> impl FnMut(ElementMut<'_>, &Event) + 'static {
    let counter = Rc::clone(counter);
    move |element: ElementMut<'_>, _event: &Event| {
        counter.set(counter.get() + 1);
        debug!(element = %element.name(), clicks = counter.get(), "click");
    }
}

fn main_view(
    controller: &Controller,
    counter: &Rc<Cell<i64>>,
    name: &Rc<RefCell<String>>,
) -> Element {
    let info = controller.debug_info();

    let cursor = {
        let info = Rc::clone(&info);
        move || info.borrow().cursor
    };
    let second_child_offset = {
        let info = Rc::clone(&info);
        move || info.borrow().child_offsets.get(1).map(ToString::to_string)
    };
    let clicks = {
        let counter = Rc::clone(counter);
        move || format!("counter: {}", counter.get())
    };

    Element::new()
        .with_id(".")
        .with_direction(Direction::Horizontal)
        .with_handler(count_clicks(counter))
        .with_child(
            Element::new()
                .with_id(".0")
                .with_content_fn(debug_info::provider(info, ".0".into())),
        )
        .with_child(
            Element::new()
                .with_id(".1")
                .with_child(Element::new().with_id(".1.0").with_content_fn(cursor))
                .with_child(
                    Element::new()
                        .with_id(".1.1")
                        .with_content_fn(second_child_offset),
                )
                .with_child(
                    Element::new()
                        .with_id(".1.2:Counter")
                        .with_content_fn(clicks)
                        .with_handler(count_clicks(counter))
                        .with_border('#'),
                )
                .with_child(text_input(Rc::clone(name)).with_id(".1.3:Name")),
        )
}

fn fruit_basket(fruits: &Rc<RefCell<Vec<String>>>) -> Element {
    let list = {
        let fruits = Rc::clone(fruits);
        move || fruits.borrow().clone()
    };
    let count = {
        let fruits = Rc::clone(fruits);
        move || fruits.borrow().len()
    };
    let add = {
        let fruits = Rc::clone(fruits);
        move |element: ElementMut<'_>, _: &Event| {
            fruits.borrow_mut().push(ADDED_FRUIT.to_owned());
            debug!(element = %element.name(), len = fruits.borrow().len(), "fruit added");
        }
    };

    Element::new()
        .with_id("fruit")
        .with_child(Element::new().with_id("fruit.list").with_content_fn(list))
        .with_child(
            Element::new()
                .with_id("fruit.count")
                .with_content_fn(count)
                .with_handler(add),
        )
}

#[cfg(test)]
mod tests {
    use ticlif_core::geometry::Point;

    use super::*;

    #[test]
    fn mount_activates_main_and_keeps_fruit_in_rotation() {
        let mut controller = Controller::new();
        let demo = Demo::mount(&mut controller).unwrap();
        assert_eq!(controller.active_root(), Some(demo.main));
        assert_eq!(controller.roots().len(), 2);
        controller.switch_to_next_root();
        assert_eq!(controller.active_root(), Some(demo.fruit));
    }

    #[test]
    fn start_root_indices() {
        let mut controller = Controller::new();
        let demo = Demo::mount(&mut controller).unwrap();
        assert_eq!(demo.start_root(1), demo.main);
        assert_eq!(demo.start_root(2), demo.fruit);
        assert_eq!(demo.start_root(9), demo.main);
    }

    #[test]
    fn labels_are_findable() {
        let mut controller = Controller::new();
        Demo::mount(&mut controller).unwrap();
        for label in [".", ".0", ".1", ".1.0", ".1.1", ".1.2:Counter", ".1.3:Name", "fruit.count"] {
            assert!(controller.tree().find_by_id(label).is_some(), "{label} missing");
        }
    }

    #[test]
    fn second_child_offset_shows_after_update() {
        let mut controller = Controller::new();
        Demo::mount(&mut controller).unwrap();
        controller.update(Point::new(21, 12)).unwrap();
        let tree = controller.tree();
        let pane = tree.find_by_id(".1.1").unwrap();
        let shown = tree.get(pane).unwrap().content().to_text();
        assert_eq!(shown.as_deref(), Some("(11,0)"));
    }
}
