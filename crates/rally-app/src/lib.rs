//! Application layer for Rally
//!
//! Pure state machines and generic runtime for UI and session orchestration,
//! enabling deterministic simulation testing with the same code that runs in
//! production.
//!
//! # Components
//!
//! - [`App`]: UI state machine (input handling, lobby cursor, status)
//! - [`Bridge`]: protocol bridge (translates App actions to session events)
//! - [`Driver`]: trait for platform-specific I/O abstraction
//! - [`Runtime`]: generic orchestration loop using Driver
//! - [`render()`]: the court drawing contract over any [`Surface`]

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod app;
mod bridge;
mod driver;
mod event;
mod input;
pub mod render;
mod runtime;
mod state;

pub use action::AppAction;
pub use app::App;
pub use bridge::{Bridge, LinkCommand};
pub use driver::{ChannelEvent, Driver};
pub use event::AppEvent;
pub use input::{Intent, KeyInput, intent};
pub use render::{RecordingSurface, Shape, Surface, render};
pub use runtime::{IDLE_INTERVAL, Runtime};
pub use state::Selection;
