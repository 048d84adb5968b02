//! Rally core
//!
//! I/O-free building blocks shared by the client and application layers:
//!
//! - [`env`]: time and sleep abstraction so the same code runs against the
//!   system clock in production and a virtual clock in simulation
//! - [`link`]: channel lifecycle state machine (connect, welcome deadline,
//!   bounded exponential reconnect backoff, terminal failure)
//! - [`error`]: link errors

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod env;
pub mod error;
pub mod link;

pub use env::{Environment, SystemEnv, Timestamp};
pub use error::LinkError;
pub use link::{Link, LinkAction, LinkConfig, LinkState};
