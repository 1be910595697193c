//! Fuzzer for the frame decoder.
//!
//! Invariants:
//! 1. Decoding arbitrary bytes never panics.
//! 2. A frame that decodes re-encodes to bytes that decode to the same
//!    frame.

#![no_main]

use libfuzzer_sys::fuzz_target;
use pavane_proto::Frame;

fuzz_target!(|data: &[u8]| {
    let Ok(frame) = Frame::decode(data) else {
        return; // structured rejection is fine
    };

    let mut wire = Vec::new();
    frame.encode(&mut wire).expect("decoded frame must re-encode");

    let round_trip = Frame::decode(&wire).expect("re-encoded frame must decode");
    assert_eq!(frame, round_trip);
});
