//! End-to-end layout scenarios through the public API.

use std::cell::Cell;
use std::rc::Rc;

use ticlif_core::event::{Command, Event, Key};
use ticlif_core::geometry::Point;
use ticlif_layout::{Direction, Element, ElementTree, LayoutError};

#[test]
fn three_children_split_ten_rows_as_three_three_four() {
    let mut tree = ElementTree::new();
    let root = tree.mount(
        Element::new()
            .with_separate(false)
            .with_child(Element::new())
            .with_child(Element::new())
            .with_child(Element::new()),
    );
    tree.resize(root, Point::new(1, 10)).unwrap();
    let heights: Vec<i32> = tree
        .children(root)
        .unwrap()
        .iter()
        .map(|&c| tree.size(c).unwrap().y)
        .collect();
    assert_eq!(heights, vec![3, 3, 4]);
}

#[test]
fn horizontal_separator_column_belongs_to_no_child() {
    let mut tree = ElementTree::new();
    let root = tree.mount(
        Element::new()
            .with_direction_named("horizontal")
            .unwrap()
            .with_child(Element::new().with_id("left"))
            .with_child(Element::new().with_id("right")),
    );
    tree.resize(root, Point::new(11, 4)).unwrap();
    let left = tree.find_by_id("left").unwrap();
    let right = tree.find_by_id("right").unwrap();

    assert_eq!(tree.child_at(root, Point::new(4, 0)).unwrap(), Some(left));
    assert_eq!(tree.child_at(root, Point::new(5, 0)).unwrap(), None);
    assert_eq!(tree.child_at(root, Point::new(6, 0)).unwrap(), Some(right));
    assert_eq!(tree.absolute_position(right).unwrap(), Point::new(6, 0));
}

#[test]
fn next_element_leaves_nested_subtree() {
    let mut tree = ElementTree::new();
    let root = tree.mount(
        Element::new()
            .with_child(
                Element::new()
                    .with_id("A")
                    .with_child(Element::new().with_id("A0"))
                    .with_child(Element::new().with_id("A1")),
            )
            .with_child(Element::new().with_id("B")),
    );
    let a1 = tree.find_by_id("A1").unwrap();
    let b = tree.find_by_id("B").unwrap();
    assert_eq!(tree.next_element(a1).unwrap(), Some(b));
    assert_eq!(tree.root_of(a1).unwrap(), root);
}

#[test]
fn dashboard_renders_expected_frame() {
    let mut tree = ElementTree::new();
    let root = tree.mount(
        Element::new()
            .with_direction(Direction::Horizontal)
            .with_child(Element::new().with_content("left\tpane"))
            .with_child(
                Element::new()
                    .with_child(Element::new().with_content(vec!["a", "b"]))
                    .with_child(Element::new().with_content("ctr").with_border('#')),
            ),
    );
    tree.resize(root, Point::new(11, 6)).unwrap();
    tree.update(root).unwrap();

    let frame = tree.render(root).unwrap();
    let expected = [
        "left |a    ",
        " pane|b    ",
        "     |-----",
        "     |#####",
        "     |#ctr#",
        "     |#####",
    ]
    .join("\n");
    assert_eq!(frame, expected);
}

#[test]
fn counter_handler_updates_content_on_confirm() {
    let counter = Rc::new(Cell::new(0));
    let shown = Rc::clone(&counter);
    let bumped = Rc::clone(&counter);

    let mut tree = ElementTree::new();
    let root = tree.mount(
        Element::new()
            .with_child(Element::new().with_content("static"))
            .with_child(
                Element::new()
                    .with_id("counter")
                    .with_content_fn(move || format!("counter: {}", shown.get()))
                    .with_handler(move |_, event| {
                        if event.is_command(Command::Ok) {
                            bumped.set(bumped.get() + 1);
                        }
                    }),
            ),
    );
    tree.resize(root, Point::new(12, 3)).unwrap();
    tree.update(root).unwrap();
    assert_eq!(tree.content_row(root, 2).unwrap(), "counter: 0  ");

    let confirm = Event::user_input(Key::Command(Command::Ok), Point::new(3, 2));
    tree.action(root, confirm).unwrap();
    tree.action(root, confirm).unwrap();
    tree.update(root).unwrap();
    assert_eq!(tree.content_row(root, 2).unwrap(), "counter: 2  ");
}

#[test]
fn action_outside_the_root_is_an_error() {
    let mut tree = ElementTree::new();
    let root = tree.mount(Element::new().with_child(Element::new()));
    tree.resize(root, Point::new(2, 2)).unwrap();
    let err = tree
        .action(root, Event::default().at_position(5, 5))
        .unwrap_err();
    assert!(matches!(err, LayoutError::OutOfBounds { .. }));
    assert!(err.to_string().contains("(5,5)"));
}
