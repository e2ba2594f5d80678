#![forbid(unsafe_code)]

//! Command-line argument parsing for the demo showcase.
//!
//! Parses args manually (no external dependencies) to keep the binary lean.
//! Supports environment variable overrides via the `TICLIF_DEMO_*` prefix.

use std::env;
use std::fmt;
use std::process;
use std::time::Duration;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const HELP_TEXT: &str = "\
ticlif Demo Showcase

USAGE:
    ticlif-demo-showcase [OPTIONS]

OPTIONS:
    --refresh-ms=N       Redraw at least every N milliseconds, 0 waits for input (default: 250)
    --inline             Draw in the normal screen instead of the alternate screen
    --start=N            Start on root N, 1-indexed (default: 1)
    --help, -h           Show this help message
    --version, -V        Show version

ROOTS:
    1  Main             Debug info, cursor, child offset, counter, text input
    2  Fruit basket     A list and a button that adds to it

KEYBINDINGS:
    Arrow keys      Move the cursor
    Tab             Jump to the next element
    Enter           Activate (counts clicks, adds fruit)
    `               Switch to the other root
    Esc             Quit
    Ctrl+C          Quit immediately

ENVIRONMENT VARIABLES:
    TICLIF_DEMO_REFRESH_MS    Override --refresh-ms
    TICLIF_DEMO_START         Override --start
    TICLIF_DEMO_SCREEN_MODE   'alt' (default) or 'inline'
    TICLIF_LOG                Write logs to this file
    TICLIF_LOG_LEVEL          Log filter (default: info)";

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opts {
    /// Redraw interval in milliseconds (0 = wait for input).
    pub refresh_ms: u64,
    /// Whether to draw on the alternate screen.
    pub alt_screen: bool,
    /// Starting root (1-indexed).
    pub start_root: u16,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            refresh_ms: 250,
            alt_screen: true,
            start_root: 1,
        }
    }
}

/// What the command line asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Run(Opts),
    Help,
    Version,
}

/// A rejected command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliError {
    /// A flag value failed to parse.
    InvalidValue { flag: &'static str, value: String },
    /// An argument nobody recognizes.
    UnknownArgument(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidValue { flag, value } => write!(f, "Invalid {flag} value: {value}"),
            Self::UnknownArgument(arg) => write!(f, "Unknown argument: {arg}"),
        }
    }
}

impl std::error::Error for CliError {}

impl Opts {
    /// Parse the process arguments and environment, exiting on `--help`,
    /// `--version`, or bad input.
    pub fn parse() -> Self {
        let args: Vec<String> = env::args().skip(1).collect();
        match parse_from(&args, |key| env::var(key).ok()) {
            Ok(Action::Run(opts)) => opts,
            Ok(Action::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Ok(Action::Version) => {
                println!("ticlif-demo-showcase {VERSION}");
                process::exit(0);
            }
            Err(e) => {
                eprintln!("{e}");
                eprintln!("Run with --help for usage information.");
                process::exit(1);
            }
        }
    }

    /// The poll timeout for the program loop.
    #[must_use]
    pub fn poll_timeout(&self) -> Option<Duration> {
        (self.refresh_ms > 0).then(|| Duration::from_millis(self.refresh_ms))
    }
}

/// Parse `args` (without the program name) on top of the environment seen
/// through `lookup`.
///
/// Environment variables take precedence over defaults but are overridden
/// by explicit command-line flags.
pub fn parse_from(
    args: &[String],
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Action, CliError> {
    let mut opts = Opts::default();

    // Apply environment variable defaults first
    if let Some(val) = lookup("TICLIF_DEMO_REFRESH_MS")
        && let Ok(n) = val.trim().parse()
    {
        opts.refresh_ms = n;
    }
    if let Some(val) = lookup("TICLIF_DEMO_START")
        && let Ok(n) = val.trim().parse()
    {
        opts.start_root = n;
    }
    if let Some(val) = lookup("TICLIF_DEMO_SCREEN_MODE") {
        opts.alt_screen = val.trim() != "inline";
    }

    // Parse command-line args (override env vars)
    for arg in args {
        match arg.as_str() {
            "--help" | "-h" => return Ok(Action::Help),
            "--version" | "-V" => return Ok(Action::Version),
            "--inline" => opts.alt_screen = false,
            other => {
                if let Some(val) = other.strip_prefix("--refresh-ms=") {
                    opts.refresh_ms = parse_value("--refresh-ms", val)?;
                } else if let Some(val) = other.strip_prefix("--start=") {
                    opts.start_root = parse_value("--start", val)?;
                } else {
                    return Err(CliError::UnknownArgument(other.to_owned()));
                }
            }
        }
    }

    Ok(Action::Run(opts))
}

fn parse_value<T: std::str::FromStr>(flag: &'static str, value: &str) -> Result<T, CliError> {
    value.parse().map_err(|_| CliError::InvalidValue {
        flag,
        value: value.to_owned(),
    })
}
