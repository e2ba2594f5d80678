#![forbid(unsafe_code)]

//! Terminal session lifecycle guard.
//!
//! [`TerminalSession`] owns raw-mode entry/exit and implements
//! [`TerminalBackend`] with crossterm. Cleanup runs on drop, from a panic
//! hook, and (on Unix) when SIGINT/SIGTERM arrive.
//!
//! # Cleanup Order
//!
//! On drop, cleanup happens in reverse order of enabling:
//! 1. Show cursor (always)
//! 2. Leave alternate screen (if enabled)
//! 3. Exit raw mode (always)
//! 4. Flush stdout
//!
//! # Input encoding
//!
//! crossterm delivers structured key events. The session re-encodes them into
//! the byte protocol understood by
//! [`InputParser`](crate::input_parser::InputParser), so the runtime sees the
//! same stream regardless of platform. Multi-byte encodings are queued and
//! handed out one byte per [`read_byte`](TerminalBackend::read_byte) call.
//!
//! ```no_run
//! use ticlif_core::terminal_session::{SessionOptions, TerminalSession};
//!
//! let session = TerminalSession::new(SessionOptions {
//!     alternate_screen: true,
//!     ..Default::default()
//! })?;
//! // Terminal is now in raw mode on the alternate screen.
//! drop(session);
//! # Ok::<(), std::io::Error>(())
//! ```

use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::OnceLock;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::backend::TerminalBackend;
use crate::event::Command;
use crate::input_parser::{INTERRUPT_BYTE, encode_command};

#[cfg(unix)]
use signal_hook::consts::signal::{SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

/// Terminal session configuration options.
///
/// All options default to `false` for maximum portability.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Enable alternate screen buffer (`CSI ? 1049 h`).
    ///
    /// Preserves the original scrollback; the screen is restored on exit.
    pub alternate_screen: bool,

    /// Hide the terminal's own cursor while the session is active.
    ///
    /// The runtime draws its own cursor marker into every frame.
    pub hide_cursor: bool,
}

/// A terminal session that manages raw mode and cleanup.
///
/// Only one `TerminalSession` should exist at a time.
#[derive(Debug)]
pub struct TerminalSession {
    options: SessionOptions,
    alternate_screen_enabled: bool,
    cursor_hidden: bool,
    /// Encoded bytes not yet handed to the caller.
    pending: VecDeque<u8>,
    #[cfg(unix)]
    signal_guard: Option<SignalGuard>,
}

impl TerminalSession {
    /// Enter raw mode and optionally enable additional features.
    ///
    /// # Errors
    ///
    /// Returns an error if raw mode cannot be enabled.
    pub fn new(options: SessionOptions) -> io::Result<Self> {
        install_panic_hook();

        crossterm::terminal::enable_raw_mode()?;
        #[cfg(feature = "tracing")]
        tracing::info!("terminal raw mode enabled");

        let mut session = Self {
            options: options.clone(),
            alternate_screen_enabled: false,
            cursor_hidden: false,
            pending: VecDeque::new(),
            #[cfg(unix)]
            signal_guard: Some(SignalGuard::new()?),
        };

        let mut stdout = io::stdout();

        if options.alternate_screen {
            crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;
            session.alternate_screen_enabled = true;
            #[cfg(feature = "tracing")]
            tracing::info!("alternate screen enabled");
        }

        if options.hide_cursor {
            crossterm::execute!(stdout, crossterm::cursor::Hide)?;
            session.cursor_hidden = true;
        }

        Ok(session)
    }

    /// Create a minimal session (raw mode only).
    pub fn minimal() -> io::Result<Self> {
        Self::new(SessionOptions::default())
    }

    /// Get the session options.
    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    fn next_pending(&mut self) -> Option<u8> {
        self.pending.pop_front()
    }

    fn cleanup(&mut self) {
        #[cfg(unix)]
        let _ = self.signal_guard.take();

        let mut stdout = io::stdout();

        let _ = crossterm::execute!(stdout, crossterm::cursor::Show);
        self.cursor_hidden = false;

        if self.alternate_screen_enabled {
            let _ = crossterm::execute!(stdout, crossterm::terminal::LeaveAlternateScreen);
            self.alternate_screen_enabled = false;
            #[cfg(feature = "tracing")]
            tracing::info!("alternate screen disabled");
        }

        let _ = crossterm::terminal::disable_raw_mode();
        #[cfg(feature = "tracing")]
        tracing::info!("terminal raw mode disabled");

        let _ = stdout.flush();
    }
}

impl TerminalBackend for TerminalSession {
    fn read_byte(&mut self, timeout: Option<Duration>) -> io::Result<Option<u8>> {
        if let Some(byte) = self.next_pending() {
            return Ok(Some(byte));
        }

        loop {
            if let Some(timeout) = timeout
                && !crossterm::event::poll(timeout)?
            {
                return Ok(None);
            }

            match crossterm::event::read()? {
                crossterm::event::Event::Key(key) if key.kind != KeyEventKind::Release => {
                    self.pending.extend(encode_key_event(key));
                    if let Some(byte) = self.next_pending() {
                        return Ok(Some(byte));
                    }
                }
                // Let the loop redraw at the new size right away.
                crossterm::event::Event::Resize(_, _) => return Ok(None),
                _ => {}
            }

            if timeout.is_some() {
                return Ok(None);
            }
        }
    }

    fn size(&self) -> io::Result<(u16, u16)> {
        crossterm::terminal::size()
    }

    fn clear(&mut self) -> io::Result<()> {
        crossterm::execute!(
            io::stdout(),
            crossterm::terminal::Clear(crossterm::terminal::ClearType::All),
            crossterm::cursor::MoveTo(0, 0)
        )
    }

    fn write_frame(&mut self, frame: &str) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        for (row, line) in frame.split('\n').enumerate() {
            let row = u16::try_from(row).unwrap_or(u16::MAX);
            crossterm::queue!(
                stdout,
                crossterm::cursor::MoveTo(0, row),
                crossterm::style::Print(line)
            )?;
        }
        stdout.flush()
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// Encode a crossterm key event into parser bytes.
///
/// Keys without an encoding (function keys, non-ASCII characters) produce an
/// empty vector.
#[must_use]
pub fn encode_key_event(event: KeyEvent) -> Vec<u8> {
    let command = match event.code {
        KeyCode::Char('c') | KeyCode::Char('C')
            if event.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            return vec![INTERRUPT_BYTE];
        }
        KeyCode::Char(c) if c.is_ascii() && !c.is_ascii_control() => {
            return vec![c as u8];
        }
        KeyCode::Enter => Command::Ok,
        KeyCode::Tab => Command::Next,
        KeyCode::Backspace => Command::DeleteBefore,
        KeyCode::Esc => Command::Back,
        KeyCode::Up => Command::Up,
        KeyCode::Down => Command::Down,
        KeyCode::Left => Command::Left,
        KeyCode::Right => Command::Right,
        KeyCode::Delete => Command::Delete,
        _ => return Vec::new(),
    };
    encode_command(command).to_vec()
}

fn install_panic_hook() {
    static HOOK: OnceLock<()> = OnceLock::new();
    HOOK.get_or_init(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            best_effort_cleanup();
            previous(info);
        }));
    });
}

fn best_effort_cleanup() {
    let mut stdout = io::stdout();

    let _ = crossterm::execute!(stdout, crossterm::cursor::Show);
    let _ = crossterm::execute!(stdout, crossterm::terminal::LeaveAlternateScreen);
    let _ = crossterm::terminal::disable_raw_mode();
    let _ = stdout.flush();
}

#[cfg(unix)]
#[derive(Debug)]
struct SignalGuard {
    handle: signal_hook::iterator::Handle,
    thread: Option<std::thread::JoinHandle<()>>,
}

#[cfg(unix)]
impl SignalGuard {
    fn new() -> io::Result<Self> {
        let mut signals = Signals::new([SIGINT, SIGTERM]).map_err(io::Error::other)?;
        let handle = signals.handle();
        let thread = std::thread::spawn(move || {
            for signal in signals.forever() {
                if signal == SIGINT || signal == SIGTERM {
                    #[cfg(feature = "tracing")]
                    tracing::warn!("termination signal received, cleaning up");
                    best_effort_cleanup();
                    std::process::exit(128 + signal);
                }
            }
        });
        Ok(Self {
            handle,
            thread: Some(thread),
        })
    }
}

#[cfg(unix)]
impl Drop for SignalGuard {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
