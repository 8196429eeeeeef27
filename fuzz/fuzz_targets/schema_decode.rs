//! Fuzz target for `decode_schema`.
//!
//! Arbitrary bytes through the schema (CBOR) decode path should never panic,
//! only return `Err` for malformed envelopes or bodies.

#![no_main]

use hamlink_proto::decode_schema;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = decode_schema(data);
});
