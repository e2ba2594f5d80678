#![forbid(unsafe_code)]

//! Deterministic terminal backend for testing.
//!
//! [`ScriptedBackend`] replays a fixed input script and records every frame,
//! so a [`Program`](crate::program::Program) can be driven end to end without
//! a terminal.
//!
//! # Example
//!
//! ```
//! use ticlif_core::backend::TerminalBackend;
//! use ticlif_runtime::simulator::ScriptedBackend;
//!
//! let mut backend = ScriptedBackend::new(80, 24).with_input(b"ab").with_idle(1);
//! assert_eq!(backend.read_byte(None).unwrap(), Some(b'a'));
//! assert_eq!(backend.read_byte(None).unwrap(), Some(b'b'));
//! assert_eq!(backend.read_byte(None).unwrap(), None);
//! assert!(backend.read_byte(None).is_err());
//! ```

use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use ticlif_core::backend::TerminalBackend;

/// One scripted read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptStep {
    /// Deliver a byte.
    Byte(u8),
    /// Report that the poll timed out.
    Idle,
    /// Change the reported terminal size, then report a timeout.
    Resize { columns: u16, rows: u16 },
}

/// In-memory [`TerminalBackend`] driven by a script.
///
/// Once the script is exhausted, reads fail with
/// [`io::ErrorKind::UnexpectedEof`] so runaway loops end.
#[derive(Debug, Clone)]
pub struct ScriptedBackend {
    script: VecDeque<ScriptStep>,
    size: (u16, u16),
    frames: Vec<String>,
    clears: usize,
    timeouts: Vec<Option<Duration>>,
}

impl ScriptedBackend {
    /// Backend reporting a terminal of `columns` x `rows` with an empty
    /// script.
    #[must_use]
    pub fn new(columns: u16, rows: u16) -> Self {
        Self {
            script: VecDeque::new(),
            size: (columns, rows),
            frames: Vec::new(),
            clears: 0,
            timeouts: Vec::new(),
        }
    }

    /// Append bytes to the script.
    #[must_use]
    pub fn with_input(mut self, bytes: &[u8]) -> Self {
        self.push_input(bytes);
        self
    }

    /// Append `count` timed-out reads to the script.
    #[must_use]
    pub fn with_idle(mut self, count: usize) -> Self {
        self.script
            .extend(std::iter::repeat_n(ScriptStep::Idle, count));
        self
    }

    /// Append a terminal resize to the script.
    #[must_use]
    pub fn with_resize(mut self, columns: u16, rows: u16) -> Self {
        self.script.push_back(ScriptStep::Resize { columns, rows });
        self
    }

    /// Append bytes to the script.
    pub fn push_input(&mut self, bytes: &[u8]) {
        self.script
            .extend(bytes.iter().copied().map(ScriptStep::Byte));
    }

    /// Change the reported terminal size immediately.
    pub fn set_size(&mut self, columns: u16, rows: u16) {
        self.size = (columns, rows);
    }

    /// Script steps not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.script.len()
    }

    /// Every frame written so far.
    #[must_use]
    pub fn frames(&self) -> &[String] {
        &self.frames
    }

    /// The most recent frame.
    #[must_use]
    pub fn last_frame(&self) -> Option<&str> {
        self.frames.last().map(String::as_str)
    }

    /// How often the screen was cleared.
    #[must_use]
    pub const fn clear_count(&self) -> usize {
        self.clears
    }

    /// Timeouts passed to each read, in order.
    #[must_use]
    pub fn timeouts(&self) -> &[Option<Duration>] {
        &self.timeouts
    }
}

impl TerminalBackend for ScriptedBackend {
    fn read_byte(&mut self, timeout: Option<Duration>) -> io::Result<Option<u8>> {
        self.timeouts.push(timeout);
        match self.script.pop_front() {
            Some(ScriptStep::Byte(byte)) => Ok(Some(byte)),
            Some(ScriptStep::Idle) => Ok(None),
            Some(ScriptStep::Resize { columns, rows }) => {
                self.size = (columns, rows);
                Ok(None)
            }
            None => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input script exhausted",
            )),
        }
    }

    fn size(&self) -> io::Result<(u16, u16)> {
        Ok(self.size)
    }

    fn clear(&mut self) -> io::Result<()> {
        self.clears += 1;
        Ok(())
    }

    fn write_frame(&mut self, frame: &str) -> io::Result<()> {
        self.frames.push(frame.to_owned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_step_changes_size() {
        let mut backend = ScriptedBackend::new(10, 5).with_resize(20, 8);
        assert_eq!(backend.size().unwrap(), (10, 5));
        assert_eq!(backend.read_byte(None).unwrap(), None);
        assert_eq!(backend.size().unwrap(), (20, 8));
    }

    #[test]
    fn records_frames_clears_and_timeouts() {
        let mut backend = ScriptedBackend::new(1, 1).with_input(b"x");
        backend.clear().unwrap();
        backend.write_frame("a").unwrap();
        backend.write_frame("b").unwrap();
        backend
            .read_byte(Some(Duration::from_millis(5)))
            .unwrap();
        assert_eq!(backend.frames(), ["a".to_string(), "b".to_string()]);
        assert_eq!(backend.last_frame(), Some("b"));
        assert_eq!(backend.clear_count(), 1);
        assert_eq!(backend.timeouts(), [Some(Duration::from_millis(5))]);
        assert_eq!(backend.remaining(), 0);
    }

    #[test]
    fn exhausted_script_is_eof() {
        let mut backend = ScriptedBackend::new(1, 1);
        let err = backend.read_byte(None).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
