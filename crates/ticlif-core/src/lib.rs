#![forbid(unsafe_code)]

//! Core: geometry, input decoding, events, and the terminal backend seam.

pub mod backend;
pub mod event;
pub mod geometry;
pub mod input_parser;
pub mod logging;
#[cfg(not(target_arch = "wasm32"))]
pub mod terminal_session;

pub use backend::TerminalBackend;
pub use event::{Command, Event, EventKind, Key};
pub use geometry::Point;
pub use input_parser::InputParser;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, debug_span, info, trace, trace_span, warn};
