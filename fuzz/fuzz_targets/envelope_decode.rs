//! Fuzz target for inbound envelope decoding
//!
//! Tests that `Envelope::decode` never panics on arbitrary input. Every frame
//! must either decode or return a `ProtocolError`.
//!
//! # Invariants
//!
//! - Decoded envelopes re-encode to a frame that decodes to an equal value
//! - Frames over `MAX_FRAME_SIZE` are always rejected

#![no_main]

use libfuzzer_sys::fuzz_target;
use rally_proto::{Envelope, MAX_FRAME_SIZE};

fuzz_target!(|data: &[u8]| {
    let Ok(envelope) = Envelope::decode(data) else {
        return;
    };

    assert!(data.len() <= MAX_FRAME_SIZE, "oversized frame decoded");

    let encoded = envelope.encode().expect("decoded envelope must encode");
    let decoded = Envelope::decode_str(&encoded).expect("re-encoded envelope must decode");
    assert_eq!(decoded, envelope, "re-encoded envelope changed");
});
