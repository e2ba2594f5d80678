#![forbid(unsafe_code)]

//! ticlif public facade crate.
//!
//! This crate provides the stable, ergonomic surface area for users. It
//! re-exports common types from internal crates and offers a lightweight
//! prelude for day-to-day usage.
//!
//! ```
//! use ticlif::prelude::*;
//!
//! let mut controller = Controller::new();
//! let root = controller.mount(
//!     Element::new()
//!         .with_direction(Direction::Horizontal)
//!         .with_child(Element::new().with_content("left"))
//!         .with_child(Element::new().with_content("right")),
//! );
//! controller.activate_root(root)?;
//! controller.update(Point::new(11, 1))?;
//! assert_eq!(controller.render(1, '$')?, "$eft |right");
//! # Ok::<(), ticlif::Error>(())
//! ```

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use ticlif_core::backend::TerminalBackend;
pub use ticlif_core::event::{Command, Event, EventKind, Key};
pub use ticlif_core::geometry::Point;
pub use ticlif_core::input_parser::InputParser;
#[cfg(not(target_arch = "wasm32"))]
pub use ticlif_core::terminal_session::{SessionOptions, TerminalSession};

// --- Layout re-exports -----------------------------------------------------

pub use ticlif_layout::widgets::{TextInput, text_input};
pub use ticlif_layout::{
    ContentProvider, ContentValue, Direction, Element, ElementId, ElementKind, ElementMut,
    ElementTree, EventHandler, LayoutError,
};

// --- Runtime re-exports ----------------------------------------------------

#[cfg(feature = "runtime")]
pub use ticlif_runtime::{
    Controller, DebugInfo, ExitReason, Flow, Program, ProgramConfig, ProgramError, Property,
    State,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for ticlif apps.
#[derive(Debug)]
pub enum Error {
    /// I/O failure during terminal operations.
    Io(std::io::Error),
    /// The element tree rejected an operation.
    Layout(LayoutError),
    /// Terminal or runtime error with message.
    Terminal(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::Layout(err) => write!(f, "{err}"),
            Self::Terminal(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Layout(err) => Some(err),
            Self::Terminal(_) => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<LayoutError> for Error {
    fn from(err: LayoutError) -> Self {
        Self::Layout(err)
    }
}

#[cfg(feature = "runtime")]
impl From<ProgramError> for Error {
    fn from(err: ProgramError) -> Self {
        match err {
            ProgramError::Io(err) => Self::Io(err),
            ProgramError::Layout(err) => Self::Layout(err),
        }
    }
}

/// Standard result type for ticlif APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Command, ContentValue, Direction, Element, ElementId, ElementMut, Error, Event, Key,
        Point, Result,
    };

    #[cfg(feature = "runtime")]
    pub use crate::{Controller, ExitReason, Program, ProgramConfig};

    pub use crate::{core, layout};

    #[cfg(feature = "runtime")]
    pub use crate::runtime;
}

pub use ticlif_core as core;
pub use ticlif_layout as layout;
#[cfg(feature = "runtime")]
pub use ticlif_runtime as runtime;

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn layout_errors_keep_their_source() {
        let err: Error = LayoutError::MissingElement { id: ElementId::MIN }.into();
        assert!(matches!(err, Error::Layout(_)));
        assert!(err.source().is_some());
        assert!(err.to_string().contains("not mounted"));
    }

    #[test]
    fn terminal_errors_are_plain_messages() {
        let err = Error::Terminal("no tty".into());
        assert_eq!(err.to_string(), "no tty");
        assert!(err.source().is_none());
    }

    #[cfg(feature = "runtime")]
    #[test]
    fn program_errors_flatten() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "done");
        let err: Error = ProgramError::Io(io).into();
        assert!(matches!(err, Error::Io(ref e) if e.kind() == std::io::ErrorKind::UnexpectedEof));
    }
}
