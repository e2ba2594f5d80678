#![forbid(unsafe_code)]

//! Terminal backend seam.
//!
//! The runtime never touches the terminal directly. Everything it needs is
//! expressed by [`TerminalBackend`]: one byte of input at a time, the current
//! size in character cells, and a "clear + write" pair for frames.
//! [`TerminalSession`](crate::terminal_session::TerminalSession) implements it
//! on top of crossterm; tests use a scripted in-memory implementation.

use std::io;
use std::time::Duration;

/// The terminal operations the runtime loop requires.
pub trait TerminalBackend {
    /// Read one raw byte.
    ///
    /// `None` timeout blocks until a byte arrives. Returns `Ok(None)` when the
    /// timeout elapses without input, which is a normal condition.
    fn read_byte(&mut self, timeout: Option<Duration>) -> io::Result<Option<u8>>;

    /// Current terminal size as `(columns, rows)`.
    fn size(&self) -> io::Result<(u16, u16)>;

    /// Clear the visible screen.
    fn clear(&mut self) -> io::Result<()>;

    /// Write a rendered frame: rows separated by `'\n'`, drawn from the top
    /// left corner.
    fn write_frame(&mut self, frame: &str) -> io::Result<()>;
}

impl<B: TerminalBackend + ?Sized> TerminalBackend for &mut B {
    fn read_byte(&mut self, timeout: Option<Duration>) -> io::Result<Option<u8>> {
        (**self).read_byte(timeout)
    }

    fn size(&self) -> io::Result<(u16, u16)> {
        (**self).size()
    }

    fn clear(&mut self) -> io::Result<()> {
        (**self).clear()
    }

    fn write_frame(&mut self, frame: &str) -> io::Result<()> {
        (**self).write_frame(frame)
    }
}

impl<B: TerminalBackend + ?Sized> TerminalBackend for Box<B> {
    fn read_byte(&mut self, timeout: Option<Duration>) -> io::Result<Option<u8>> {
        (**self).read_byte(timeout)
    }

    fn size(&self) -> io::Result<(u16, u16)> {
        (**self).size()
    }

    fn clear(&mut self) -> io::Result<()> {
        (**self).clear()
    }

    fn write_frame(&mut self, frame: &str) -> io::Result<()> {
        (**self).write_frame(frame)
    }
}
