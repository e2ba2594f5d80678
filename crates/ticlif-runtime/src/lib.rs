#![forbid(unsafe_code)]

//! ticlif runtime
//!
//! This crate provides the runtime components that tie the element tree to a
//! terminal.
//!
//! # Key Components
//!
//! - [`Controller`] - cursor, multi-root management, and input dispatch
//! - [`State`] - window size, cursor, and property bag
//! - [`Program`] - poll-driven update / render / input loop
//! - [`ProgramConfig`] - loop settings, overridable from the environment
//! - [`DebugInfo`] - per-tick diagnostics snapshot for display
//! - [`simulator::ScriptedBackend`] - in-memory terminal for tests
//!
//! # How it fits in the system
//! `ticlif-core` decodes input and talks to the terminal, `ticlif-layout`
//! lays out and renders elements, and this crate drives both once per tick.

pub mod controller;
pub mod debug_info;
pub mod debug_ring;
pub mod program;
pub mod simulator;
pub mod state;

pub use controller::{Controller, DEFAULT_DEBUG_CAPACITY, ExitReason, Flow};
pub use debug_info::{DebugInfo, SharedDebugInfo};
pub use debug_ring::DebugRing;
pub use program::{Program, ProgramConfig, ProgramError};
pub use state::{FRAME_PROPERTY, Property, State};
