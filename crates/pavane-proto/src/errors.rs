//! Error types for the wire format.
//!
//! All errors are structured, testable, and carry the information needed to
//! pinpoint a malformed stream.

use thiserror::Error;

fn tag_char(byte: &u8) -> char {
    char::from(*byte)
}

/// Protocol-level errors that can occur while encoding or decoding frames
/// and tagged values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    // Tagged codec errors
    /// The next tag byte on the wire did not match the caller's expectation
    #[error("tag mismatch: expected '{}', got '{}'", tag_char(.expected), tag_char(.actual))]
    TagMismatch {
        /// Tag byte the caller asked for
        expected: u8,
        /// Tag byte found on the wire
        actual: u8,
    },

    /// A tag byte that is not part of the protocol's tag table
    #[error("unknown type tag {0:#04x}")]
    UnknownTag(u8),

    /// The body ended in the middle of a value
    #[error("truncated value: needed {needed} more bytes, {available} available")]
    Truncated {
        /// Bytes the current value still requires
        needed: usize,
        /// Bytes left in the body
        available: usize,
    },

    /// A wire string is missing its NUL terminator
    #[error("string is missing its NUL terminator")]
    UnterminatedString,

    /// A wire string is not valid UTF-8
    #[error("string is not valid UTF-8")]
    InvalidUtf8,

    // Frame layer errors
    /// Frame is shorter than the 20-byte descriptor
    #[error("frame too short: expected at least {expected} bytes, got {actual}")]
    FrameTooShort {
        /// Expected minimum size in bytes
        expected: usize,
        /// Actual size received
        actual: usize,
    },

    /// Body exceeds the maximum allowed size
    #[error("payload too large: {size} bytes exceeds maximum {max}")]
    PayloadTooLarge {
        /// Actual body size
        size: usize,
        /// Maximum allowed size
        max: usize,
    },

    /// Frame is truncated (descriptor claims more data than available)
    #[error(
        "frame truncated: descriptor claims {expected} payload bytes, but only {actual} available"
    )]
    FrameTruncated {
        /// Expected body size from the descriptor
        expected: usize,
        /// Actual bytes available
        actual: usize,
    },

    // Registry errors
    /// A command code outside the canonical registry
    #[error("unknown command code: {0}")]
    UnknownCommand(u32),
}

/// Convenient Result type alias for wire-format operations
pub type Result<T> = std::result::Result<T, ProtocolError>;
