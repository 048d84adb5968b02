//! Rally wire protocol
//!
//! Every exchange between a Rally client and the game server is one
//! [`Envelope`]: a JSON object `{"type": <tag>, "content": <payload>}` carried
//! in a single text frame. The payload shape is fixed by the tag.
//!
//! # Components
//!
//! - [`Envelope`]: sum type with one variant per tag
//! - [`MessageKind`]: the tag set, with direction and wire names
//! - [`PlayerId`], [`GameSnapshot`], [`MoveDirection`]: payload types
//! - [`ProtocolError`]: decode/encode failures
//!
//! # Invariants
//!
//! - Decoding never panics. Malformed frames, unknown tags and payloads of the
//!   wrong shape all come back as [`ProtocolError`] so the caller can drop the
//!   frame and keep reading.
//! - `Envelope::decode(Envelope::encode(e)) == e` for every envelope whose
//!   numeric fields are finite.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod envelope;
pub mod errors;
pub mod payloads;

pub use envelope::{Direction, Envelope, MAX_FRAME_SIZE, MessageKind};
pub use errors::{ProtocolError, Result};
pub use payloads::{GameSnapshot, MoveDirection, PlayerId};
