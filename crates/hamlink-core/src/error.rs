//! The unified error taxonomy surfaced to callers of the operation surface.
//!
//! Four kinds, matching the four places a call can fail: the transport, the
//! codec, the server's own status code, and local resource exhaustion. None
//! of them are retried by this layer.

use hamlink_proto::ProtocolError;
use thiserror::Error;

/// Engine status code returned verbatim from a non-zero server reply.
///
/// Values below 0 mirror the source engine's negative status space; this
/// type only distinguishes the handful of codes the client needs to reason
/// about (`KEY_NOT_FOUND` drives scenario S4's cursor-exhaustion check,
/// `DUPLICATE_KEY` is asserted by insert-without-overwrite tests) — any
/// other non-zero value still round-trips through the tuple field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusCode(pub i32);

impl StatusCode {
    /// Success.
    pub const SUCCESS: Self = Self(0);
    /// No matching key.
    pub const KEY_NOT_FOUND: Self = Self(-9);
    /// Key already exists and overwrite/duplicate was not requested.
    pub const DUPLICATE_KEY: Self = Self(-10);
    /// A parameter value was invalid for the operation.
    pub const INVALID_PARAMETER: Self = Self(-11);
    /// Write attempted against a read-only transaction or database.
    pub const WRITE_PROTECTED: Self = Self(-12);
    /// Cursor has no current position (e.g. moved past the end).
    pub const CURSOR_IS_NIL: Self = Self(-13);

    /// Whether this code represents success.
    #[must_use]
    pub const fn is_success(self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::SUCCESS => write!(f, "success"),
            Self::KEY_NOT_FOUND => write!(f, "key not found"),
            Self::DUPLICATE_KEY => write!(f, "duplicate key"),
            Self::INVALID_PARAMETER => write!(f, "invalid parameter"),
            Self::WRITE_PROTECTED => write!(f, "write protected"),
            Self::CURSOR_IS_NIL => write!(f, "cursor has no current position"),
            Self(other) => write!(f, "status {other}"),
        }
    }
}

/// Transport-level failure: the request or reply frame never made it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NetworkError {
    /// The transport's connect/open call failed.
    #[error("connection failed: {0}")]
    ConnectFailed(String),

    /// The round trip did not complete in time.
    #[error("transport timed out")]
    Timeout,

    /// The transport closed or errored mid-call.
    #[error("transport closed: {0}")]
    Closed(String),

    /// The reply frame was shorter than the envelope declared.
    #[error("truncated reply: expected {expected} bytes, got {actual}")]
    TruncatedReply {
        /// Bytes the envelope declared.
        expected: usize,
        /// Bytes actually read.
        actual: usize,
    },
}

/// Unified error type returned by every `hamlink-client` operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HamError {
    /// Transport-level failure. The session's handles remain valid; the
    /// call itself had no effect.
    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    /// Framing or codec failure. The session should be closed; the wire
    /// position can no longer be trusted.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Non-zero status returned by the server. Out-parameters are
    /// untouched.
    #[error("engine error: {0}")]
    Engine(StatusCode),

    /// Local allocation or arena resize failure.
    #[error("resource exhausted")]
    ResourceExhaustion,

    /// The operation is recognized but not implemented on the wire side
    /// (e.g. `cursor_get_record_size`).
    #[error("not implemented: {0}")]
    NotImplemented(&'static str),
}

/// Convenience alias for the operation surface.
pub type Result<T> = std::result::Result<T, HamError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_code_display_names_known_codes() {
        assert_eq!(StatusCode::KEY_NOT_FOUND.to_string(), "key not found");
        assert_eq!(StatusCode(-999).to_string(), "status -999");
    }

    #[test]
    fn success_status_is_not_an_error_condition() {
        assert!(StatusCode::SUCCESS.is_success());
        assert!(!StatusCode::KEY_NOT_FOUND.is_success());
    }
}
