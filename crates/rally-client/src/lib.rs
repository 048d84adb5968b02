//! Client
//!
//! Action-based session state machine for the Rally protocol. Tracks the
//! session phase, the local player id, the lobby roster and the current match
//! snapshot, and decides which envelopes may be sent or accepted when.
//!
//! # Architecture
//!
//! The session follows the same Sans-IO and action-based patterns as
//! [`rally_core`]. It receives events ([`SessionEvent`]), processes them
//! through pure state machine logic, and returns actions ([`SessionAction`])
//! for the caller to execute.
//!
//! # Components
//!
//! - [`Session`]: phase table, outgoing gates and reconnect handling
//! - [`SessionView`]: immutable read model for rendering and input
//! - [`SessionEvent`]: events fed into the session
//! - [`SessionAction`]: actions produced by the session
//! - [`ClientConfig`]: endpoint and reconnect policy
//!
//! # Transport (optional)
//!
//! With the `transport` feature enabled, this crate also provides:
//! - [`transport::ConnectedClient`]: WebSocket channel handle
//! - [`transport::connect`]: connect to a server

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod config;
mod error;
mod event;
mod session;
mod view;

#[cfg(feature = "transport")]
pub mod transport;

pub use config::{ClientConfig, DEFAULT_HOST, DEFAULT_PATH, DEFAULT_PORT, endpoint_url};
pub use error::SessionError;
pub use event::{LogLevel, SessionAction, SessionEvent};
pub use rally_core::{Environment, LinkConfig};
pub use session::Session;
pub use view::{SessionPhase, SessionView};
