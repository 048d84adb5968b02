//! Terminal UI for Rally
//!
//! A thin shell over [`rally_app::Driver`] that provides terminal-specific
//! I/O. All orchestration logic lives in the generic [`rally_app::Runtime`].
//!
//! This crate only handles terminal input, rendering, command-line
//! configuration and log output.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod cli;
pub mod logging;
pub mod terminal;
pub mod ui;

pub use cli::Args;
pub use rally_app::{App, AppAction, AppEvent, Bridge, Driver, KeyInput, Runtime};
pub use terminal::{TerminalDriver, TerminalError};
