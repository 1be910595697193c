//! Fuzzer for the tagged-value decoder.
//!
//! Invariants:
//! 1. Decoding arbitrary bytes never panics; it either yields values or a
//!    structured error.
//! 2. Values that do decode re-encode into a stream that decodes to the
//!    same values (decode/encode/decode fixpoint).

#![no_main]

use bytes::BytesMut;
use libfuzzer_sys::fuzz_target;
use pavane_proto::{TagStructReader, TagStructWriter};

fuzz_target!(|data: &[u8]| {
    let mut ts = TagStructReader::new(data);
    let mut values = Vec::new();
    while !ts.is_empty() {
        match ts.read_value() {
            Ok(value) => values.push(value),
            Err(_) => return, // structured rejection is fine
        }
    }

    let mut buf = BytesMut::new();
    {
        let mut w = TagStructWriter::new(&mut buf);
        for value in &values {
            w.put_value(value);
        }
    }

    let mut ts = TagStructReader::new(&buf);
    let mut round_trip = Vec::new();
    while !ts.is_empty() {
        round_trip.push(ts.read_value().expect("re-encoded stream must decode"));
    }
    assert_eq!(values, round_trip);
});
