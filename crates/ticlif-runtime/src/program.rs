#![forbid(unsafe_code)]

//! Poll-driven program loop.
//!
//! [`Program`] ties a [`Controller`] to a [`TerminalBackend`]. Each tick:
//!
//! 1. query the terminal size and subtract [`ProgramConfig::reserved_rows`]
//! 2. [`Controller::update`]
//! 3. render the active root with the cursor glyph, clear, write
//! 4. read one byte (waiting at most [`ProgramConfig::poll_timeout`])
//! 5. decode it and process every complete token
//!
//! Back ends the loop gracefully: the exit hook runs and
//! [`ExitReason::Requested`] is returned. Interrupt ends it immediately with
//! [`ExitReason::Interrupted`] and skips the hook.
//!
//! # Example
//!
//! ```
//! use ticlif_layout::Element;
//! use ticlif_runtime::simulator::ScriptedBackend;
//! use ticlif_runtime::{Controller, ExitReason, Program, ProgramConfig};
//!
//! let backend = ScriptedBackend::new(6, 3).with_input(b"\x1b");
//! let mut program = Program::new(backend, Controller::new(), ProgramConfig::default());
//! let root = program.controller_mut().mount(Element::new().with_content("hi"));
//!
//! let reason = program.run_with_root(root).unwrap();
//! assert_eq!(reason, ExitReason::Requested);
//! assert_eq!(program.backend().last_frame(), Some("$i    \n      "));
//! ```

use std::fmt;
use std::io;
use std::time::Duration;

use ticlif_core::backend::TerminalBackend;
use ticlif_core::geometry::Point;
use ticlif_core::input_parser::InputParser;
use ticlif_layout::{ElementId, LayoutError};
use tracing::{debug, debug_span, info, trace};

use crate::controller::{Controller, DEFAULT_DEBUG_CAPACITY, ExitReason, Flow};

/// Environment variable: poll timeout in milliseconds (`0` blocks).
pub const ENV_REFRESH_MS: &str = "TICLIF_REFRESH_MS";
/// Environment variable: cursor glyph (first character).
pub const ENV_CURSOR_GLYPH: &str = "TICLIF_CURSOR_GLYPH";
/// Environment variable: rows kept free below the frame.
pub const ENV_RESERVED_ROWS: &str = "TICLIF_RESERVED_ROWS";
/// Environment variable: number of recent inputs kept for diagnostics.
pub const ENV_DEBUG_CAPACITY: &str = "TICLIF_DEBUG_CAPACITY";
/// Environment variable: use the alternate screen (`1`/`true`/`yes`/`on`).
pub const ENV_ALT_SCREEN: &str = "TICLIF_ALT_SCREEN";

/// Program configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramConfig {
    /// How long to wait for input before redrawing. `None` blocks.
    pub poll_timeout: Option<Duration>,
    /// Glyph drawn at the cursor cell.
    pub cursor_glyph: char,
    /// Terminal rows left unused below the frame.
    pub reserved_rows: u16,
    /// Number of recent inputs kept for diagnostics.
    pub debug_capacity: usize,
    /// Draw on the alternate screen.
    pub alternate_screen: bool,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            poll_timeout: Some(Duration::from_millis(250)),
            cursor_glyph: '$',
            reserved_rows: 1,
            debug_capacity: DEFAULT_DEBUG_CAPACITY,
            alternate_screen: false,
        }
    }
}

impl ProgramConfig {
    /// Defaults overlaid with the `TICLIF_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_env_lookup(|key| std::env::var(key).ok())
    }

    /// Overlay settings found through `lookup`. Unparseable values are
    /// ignored.
    #[must_use]
    pub fn with_env_lookup(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(ms) = lookup(ENV_REFRESH_MS).and_then(|v| v.trim().parse::<u64>().ok()) {
            self.poll_timeout = (ms > 0).then(|| Duration::from_millis(ms));
        }
        if let Some(glyph) = lookup(ENV_CURSOR_GLYPH).and_then(|v| v.chars().next()) {
            self.cursor_glyph = glyph;
        }
        if let Some(rows) = lookup(ENV_RESERVED_ROWS).and_then(|v| v.trim().parse().ok()) {
            self.reserved_rows = rows;
        }
        if let Some(cap) = lookup(ENV_DEBUG_CAPACITY).and_then(|v| v.trim().parse().ok()) {
            self.debug_capacity = cap;
        }
        if let Some(flag) = lookup(ENV_ALT_SCREEN).and_then(|v| parse_flag(&v)) {
            self.alternate_screen = flag;
        }
        self
    }

    /// Set the poll timeout (`None` blocks).
    #[must_use]
    pub fn with_poll_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.poll_timeout = timeout;
        self
    }

    /// Set the cursor glyph.
    #[must_use]
    pub fn with_cursor_glyph(mut self, glyph: char) -> Self {
        self.cursor_glyph = glyph;
        self
    }

    /// Set the number of rows left free below the frame.
    #[must_use]
    pub fn with_reserved_rows(mut self, rows: u16) -> Self {
        self.reserved_rows = rows;
        self
    }

    /// Set the diagnostics input history length.
    #[must_use]
    pub fn with_debug_capacity(mut self, capacity: usize) -> Self {
        self.debug_capacity = capacity;
        self
    }

    /// Enable or disable the alternate screen.
    #[must_use]
    pub fn with_alternate_screen(mut self, enabled: bool) -> Self {
        self.alternate_screen = enabled;
        self
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Errors that end the program loop.
#[derive(Debug)]
pub enum ProgramError {
    /// Terminal I/O failed.
    Io(io::Error),
    /// The element tree rejected a query.
    Layout(LayoutError),
}

impl fmt::Display for ProgramError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "terminal I/O error: {e}"),
            Self::Layout(e) => write!(f, "layout error: {e}"),
        }
    }
}

impl std::error::Error for ProgramError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Layout(e) => Some(e),
        }
    }
}

impl From<io::Error> for ProgramError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<LayoutError> for ProgramError {
    fn from(e: LayoutError) -> Self {
        Self::Layout(e)
    }
}

type ExitHook = Box<dyn FnMut(&mut Controller)>;

/// The program loop.
pub struct Program<B: TerminalBackend> {
    controller: Controller,
    parser: InputParser,
    backend: B,
    config: ProgramConfig,
    exit_hook: Option<ExitHook>,
}

impl<B: TerminalBackend> Program<B> {
    /// Program drawing to `backend`. The controller's diagnostics history is
    /// resized to `config.debug_capacity`.
    pub fn new(backend: B, controller: Controller, config: ProgramConfig) -> Self {
        let controller = controller.with_debug_capacity(config.debug_capacity);
        Self {
            controller,
            parser: InputParser::new(),
            backend,
            config,
            exit_hook: None,
        }
    }

    /// Run `hook` when the loop ends through Back.
    #[must_use]
    pub fn with_exit_hook(mut self, hook: impl FnMut(&mut Controller) + 'static) -> Self {
        self.exit_hook = Some(Box::new(hook));
        self
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut Controller {
        &mut self.controller
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn config(&self) -> &ProgramConfig {
        &self.config
    }

    /// Consume the program, returning the backend.
    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Usable window size: the terminal size minus the reserved rows.
    pub fn window_size(&self) -> io::Result<Point> {
        let (columns, rows) = self.backend.size()?;
        Ok(Point::from_cells(
            columns,
            rows.saturating_sub(self.config.reserved_rows),
        ))
    }

    /// Make `root` the active root.
    pub fn set_root(&mut self, root: ElementId) -> Result<(), ProgramError> {
        self.controller.activate_root(root)?;
        Ok(())
    }

    /// Update and draw one frame, activating `root` first when given.
    pub fn draw(&mut self, root: Option<ElementId>) -> Result<(), ProgramError> {
        if let Some(root) = root {
            self.set_root(root)?;
        }
        let size = self.window_size()?;
        self.controller.update(size)?;
        let frame = self.controller.render(size.y, self.config.cursor_glyph)?;
        self.backend.clear()?;
        self.backend.write_frame(&frame)?;
        Ok(())
    }

    /// One loop iteration: draw, then read and process input.
    pub fn tick(&mut self) -> Result<Flow, ProgramError> {
        self.draw(None)?;

        let Some(byte) = self.backend.read_byte(self.config.poll_timeout)? else {
            return Ok(Flow::Continue);
        };
        trace!(byte, "read input byte");
        self.parser.push_byte(byte);

        while let Some(key) = self.parser.next_key() {
            if let Flow::Exit(reason) = self.controller.process_input(key)? {
                return Ok(Flow::Exit(reason));
            }
        }
        Ok(Flow::Continue)
    }

    /// Run until Back or Interrupt.
    pub fn run(&mut self) -> Result<ExitReason, ProgramError> {
        let _span = debug_span!("ticlif.program.run").entered();
        info!(config = ?self.config, "program loop starting");

        let reason = loop {
            if let Flow::Exit(reason) = self.tick()? {
                break reason;
            }
        };

        info!(?reason, frames = self.controller.state().frame(), "program loop finished");
        if reason == ExitReason::Requested
            && let Some(hook) = self.exit_hook.as_mut()
        {
            debug!("running exit hook");
            hook(&mut self.controller);
        }
        Ok(reason)
    }

    /// Activate `root`, then [`run`](Self::run).
    pub fn run_with_root(&mut self, root: ElementId) -> Result<ExitReason, ProgramError> {
        self.set_root(root)?;
        self.run()
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Program<ticlif_core::terminal_session::TerminalSession> {
    /// Program on the real terminal: raw mode, hidden cursor, and the
    /// alternate screen when configured.
    pub fn with_terminal(controller: Controller, config: ProgramConfig) -> io::Result<Self> {
        let session = ticlif_core::terminal_session::TerminalSession::new(
            ticlif_core::terminal_session::SessionOptions {
                alternate_screen: config.alternate_screen,
                hide_cursor: true,
            },
        )?;
        Ok(Self::new(session, controller, config))
    }
}

impl<B: TerminalBackend + fmt::Debug> fmt::Debug for Program<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Program")
            .field("controller", &self.controller)
            .field("parser", &self.parser)
            .field("backend", &self.backend)
            .field("config", &self.config)
            .field("has_exit_hook", &self.exit_hook.is_some())
            .finish()
    }
}
