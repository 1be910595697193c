//! Frame type combining descriptor and body.
//!
//! A `Frame` is the transport-layer packet: a 20-byte raw binary
//! descriptor (Big Endian) followed by a variable-length tagstruct body.
//! This is a pure data holder; the tagged decoding of the body is the job
//! of [`crate::tagstruct`].

use bytes::{BufMut, Bytes};

use crate::{
    Descriptor,
    errors::{ProtocolError, Result},
};

/// Complete protocol frame (transport layer).
///
/// Layout on the wire:
/// `[Descriptor: 20 bytes, raw binary] + [body: variable bytes]`
///
/// # Invariants
///
/// - **Size Consistency**: `payload.len()` MUST match
///   `descriptor.length()`. This invariant is enforced by [`Frame::new`]
///   and verified by [`Frame::decode`].
///
/// - **Size Limit**: `payload.len()` MUST NOT exceed
///   [`Descriptor::MAX_PAYLOAD_SIZE`] (16 MB). Violations are rejected
///   during encoding and decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Frame descriptor (20 bytes)
    pub descriptor: Descriptor,

    /// Raw body bytes (a tagstruct for control frames)
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame with automatic length calculation.
    ///
    /// The descriptor's `length` field is set to the actual body length,
    /// ensuring consistency.
    #[must_use]
    pub fn new(mut descriptor: Descriptor, payload: impl Into<Bytes>) -> Self {
        let payload = payload.into();

        #[allow(clippy::cast_possible_truncation)]
        {
            descriptor.length = (payload.len() as u32).to_be_bytes();
        }

        Self { descriptor, payload }
    }

    /// Create a control frame around the given body.
    #[must_use]
    pub fn control(payload: impl Into<Bytes>) -> Self {
        Self::new(Descriptor::control(), payload)
    }

    /// Encode frame into a buffer.
    ///
    /// Writes: `[descriptor (20 bytes)] + [body (variable)]`
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::PayloadTooLarge`] if the body exceeds
    /// [`Descriptor::MAX_PAYLOAD_SIZE`]. This is the enforcement point for
    /// the 16 MB limit on the write side.
    pub fn encode(&self, dst: &mut impl BufMut) -> Result<()> {
        if self.payload.len() > Descriptor::MAX_PAYLOAD_SIZE as usize {
            return Err(ProtocolError::PayloadTooLarge {
                size: self.payload.len(),
                max: Descriptor::MAX_PAYLOAD_SIZE as usize,
            });
        }

        dst.put_slice(&self.descriptor.to_bytes());
        dst.put_slice(&self.payload);

        Ok(())
    }

    /// Decode a frame from wire bytes.
    ///
    /// All validation happens before allocating memory for the body:
    /// malformed or oversize descriptors are rejected without copying
    /// data, and exactly `length` body bytes are read (trailing data is
    /// ignored).
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Descriptor parsing fails (short buffer or oversize length)
    /// - The body is truncated (fewer bytes than the descriptor claims)
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let descriptor = Descriptor::from_bytes(bytes)?;

        let length = descriptor.length() as usize;
        let total = Descriptor::SIZE + length;

        if bytes.len() < total {
            return Err(ProtocolError::FrameTruncated {
                expected: length,
                actual: bytes.len().saturating_sub(Descriptor::SIZE),
            });
        }

        let payload = Bytes::copy_from_slice(&bytes[Descriptor::SIZE..total]);

        Ok(Self { descriptor: *descriptor, payload })
    }
}
