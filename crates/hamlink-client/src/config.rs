//! Session-level configuration.

use std::time::Duration;

use hamlink_proto::Encoding;

/// Configuration for a [`crate::Client::connect`] call.
///
/// Per spec Design Notes §9: "the two codecs overlap in message catalog but
/// differ in on-wire layout... a conforming implementation should negotiate
/// one at Connect time and refuse the other." This workspace resolves that
/// by having the caller pick the encoding up front rather than negotiating
/// it live; the session then uses only that encoding for its lifetime.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Which wire encoding this session uses for every call.
    pub encoding: Encoding,
    /// How long to wait for a single call's round trip before failing it
    /// with [`hamlink_core::NetworkError::Timeout`].
    pub call_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { encoding: Encoding::Schema, call_timeout: Duration::from_secs(10) }
    }
}

impl ClientConfig {
    /// Start from the defaults with the fixed (4-byte-aligned) encoding
    /// instead of the schema (CBOR) encoding.
    #[must_use]
    pub fn with_fixed_encoding() -> Self {
        Self { encoding: Encoding::Fixed, ..Self::default() }
    }
}
