//! Error types for the client.
//!
//! This module layers the client-level taxonomy over the wire-format
//! errors of `pavane-proto`: transport failures, protocol violations,
//! server-side errors, authentication failures, lifecycle conditions and
//! timeouts each get their own variant so callers can react to them
//! without string matching.

use std::{io, path::PathBuf};

use pavane_proto::{Command, ProtocolError, ServerErrorCode};
use thiserror::Error;

fn describe_code(code: &u32) -> String {
    ServerErrorCode::describe(*code)
}

/// Errors surfaced by client operations and the connection lifecycle.
#[derive(Debug, Error)]
pub enum ClientError {
    // Transport
    /// The endpoint could not be dialed
    #[error("could not dial pulseaudio server {addr}: {source}")]
    Dial {
        /// The address that was dialed
        addr: String,
        /// The underlying I/O failure
        #[source]
        source: io::Error,
    },

    /// Socket read or write failure, including remote close mid-frame
    #[error("transport error: {0}")]
    Transport(#[from] io::Error),

    // Protocol
    /// The peer sent bytes the wire format rejects
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A reply arrived for a tag with no pending request
    #[error("no pending request for tag {tag} (command {code})")]
    UnknownReplyTag {
        /// The orphaned request tag
        tag: u32,
        /// The response command code
        code: u32,
    },

    /// A response command other than REPLY or ERROR
    #[error("expected reply (2) or error (0) but got: {code}")]
    UnexpectedCommand {
        /// The offending command code
        code: u32,
    },

    // Server-side
    /// The server answered a request with an ERROR frame
    #[error("pulse audio error: {command} -> {}", describe_code(.code))]
    Server {
        /// The command the request carried
        command: Command,
        /// The server's error code
        code: u32,
    },

    // Auth
    /// The cookie file could not be read
    #[error("could not read cookie file {}: {source}", .path.display())]
    CookieRead {
        /// Cookie path that was tried
        path: PathBuf,
        /// The underlying I/O failure
        #[source]
        source: io::Error,
    },

    /// The cookie file does not hold exactly 256 bytes
    #[error("cookie file {} has incorrect length {len}: expected {expected}", .path.display())]
    CookieLength {
        /// Cookie path that was read
        path: PathBuf,
        /// Observed length
        len: usize,
        /// Required length
        expected: usize,
    },

    /// The server speaks a protocol version older than ours
    #[error("pulseaudio server supports version {server} but minimum required is {required}")]
    ServerVersion {
        /// Version the server announced
        server: u32,
        /// Minimum version this client requires
        required: u32,
    },

    // Lifecycle
    /// The client was closed while the operation was in flight
    #[error("pulseaudio client was closed")]
    Closed,

    /// The bounded submission queue was full at the instant of submission
    #[error("could not send request: submission queue is full")]
    QueueFull,

    /// An outgoing request was shorter than the fixed prefix allows
    #[error("request too short: {len} bytes, minimum is {min}")]
    RequestTooShort {
        /// Submitted frame length
        len: usize,
        /// Required minimum
        min: usize,
    },

    // Timeout
    /// The per-request deadline or the handshake deadline elapsed
    #[error("request timed out")]
    Timeout,

    // Operations
    /// The default sink did not appear in the sink list
    #[error("sink {0} not found")]
    SinkNotFound(String),

    /// The pactl fallback exited unsuccessfully
    #[error("error executing pactl: {0}")]
    Pactl(String),

    /// The pactl fallback produced text the parser rejects
    #[error("could not parse pactl output: {0}")]
    PactlParse(String),
}

impl ClientError {
    /// Returns true if this error is transient and the operation may
    /// succeed on retry.
    ///
    /// Transient conditions are backpressure, timeouts and connection
    /// lifecycle races. Protocol violations and server-side rejections
    /// are never transient.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ClientError::Dial { .. }
                | ClientError::Closed
                | ClientError::QueueFull
                | ClientError::Timeout
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_error_names_are_mapped() {
        let err = ClientError::Server { command: Command::SetSinkVolume, code: 1 };
        assert_eq!(err.to_string(), "pulse audio error: SetSinkVolume -> Access denied");

        let err = ClientError::Server { command: Command::Auth, code: 99 };
        assert_eq!(err.to_string(), "pulse audio error: Auth -> error code 99");
    }

    #[test]
    fn lifecycle_errors_are_transient() {
        assert!(ClientError::Closed.is_transient());
        assert!(ClientError::QueueFull.is_transient());
        assert!(ClientError::Timeout.is_transient());
    }

    #[test]
    fn protocol_violations_are_fatal() {
        assert!(!ClientError::UnknownReplyTag { tag: 7, code: 2 }.is_transient());
        assert!(!ClientError::UnexpectedCommand { code: 61 }.is_transient());
        assert!(!ClientError::Server { command: Command::Subscribe, code: 3 }.is_transient());
        assert!(
            !ClientError::ServerVersion { server: 31, required: 32 }.is_transient()
        );
    }
}
