//! Fuzz target for `decode_fixed`.
//!
//! Exercises envelope parsing, discriminator lookup, and the hand-rolled
//! per-message `FixedCodec` decode for every opcode the catalog knows,
//! against arbitrary bytes. Should never panic or overread.

#![no_main]

use hamlink_proto::decode_fixed;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = decode_fixed(data);
});
