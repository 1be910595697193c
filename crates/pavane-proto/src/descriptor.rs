//! Frame descriptor with zero-copy parsing.
//!
//! Every message on the wire starts with a fixed 20-byte descriptor,
//! serialized as raw binary (Big Endian). Control messages use the
//! reserved channel `0xFFFF_FFFF` and zero offsets and flags; the other
//! fields only carry meaning for the streaming half of the protocol,
//! which this client does not speak.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::errors::{ProtocolError, Result};

/// Fixed 20-byte frame descriptor (Big Endian network byte order).
///
/// Fields are stored as raw byte arrays so the struct can be safely cast
/// from untrusted network bytes: all bit patterns are valid, and
/// validation happens explicitly in [`Descriptor::from_bytes`].
///
/// # Layout
///
/// | Offset | Size | Field |
/// |--------|------|-------|
/// | 0 | 4 | body length (bytes after this descriptor) |
/// | 4 | 4 | channel (`0xFFFF_FFFF` for control) |
/// | 8 | 4 | offset high |
/// | 12 | 4 | offset low |
/// | 16 | 4 | flags |
#[repr(C)]
#[derive(Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable, PartialEq, Eq)]
pub struct Descriptor {
    pub(crate) length: [u8; 4],
    channel: [u8; 4],
    offset_high: [u8; 4],
    offset_low: [u8; 4],
    flags: [u8; 4],
}

impl Descriptor {
    /// Size of the serialized descriptor (20 bytes)
    pub const SIZE: usize = 20;

    /// Maximum body size (16 MB). Frames declaring more are rejected
    /// before any payload memory is allocated.
    pub const MAX_PAYLOAD_SIZE: u32 = 16 * 1024 * 1024;

    /// Channel value marking a control (non-stream) frame
    pub const CHANNEL_CONTROL: u32 = 0xFFFF_FFFF;

    /// Create a control-frame descriptor: control channel, zero offsets
    /// and flags, body length zero (set later from the actual body).
    #[must_use]
    pub fn control() -> Self {
        Self {
            length: [0; 4],
            channel: Self::CHANNEL_CONTROL.to_be_bytes(),
            offset_high: [0; 4],
            offset_low: [0; 4],
            flags: [0; 4],
        }
    }

    /// Parse a descriptor from network bytes (zero-copy).
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The buffer is shorter than 20 bytes
    /// - The declared body length exceeds [`Self::MAX_PAYLOAD_SIZE`]
    pub fn from_bytes(bytes: &[u8]) -> Result<&Self> {
        let descriptor = Self::ref_from_prefix(bytes)
            .map_err(|_| ProtocolError::FrameTooShort {
                expected: Self::SIZE,
                actual: bytes.len(),
            })?
            .0;

        let length = u32::from_be_bytes(descriptor.length);
        if length > Self::MAX_PAYLOAD_SIZE {
            return Err(ProtocolError::PayloadTooLarge {
                size: length as usize,
                max: Self::MAX_PAYLOAD_SIZE as usize,
            });
        }

        Ok(descriptor)
    }

    /// Serialize the descriptor to bytes.
    #[must_use]
    #[allow(clippy::wrong_self_convention)] // Common serialization pattern
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let bytes = IntoBytes::as_bytes(self);
        let mut arr = [0u8; Self::SIZE];
        arr.copy_from_slice(bytes);
        arr
    }

    /// Get the declared body length
    #[must_use]
    pub fn length(&self) -> u32 {
        u32::from_be_bytes(self.length)
    }

    /// Get the channel
    #[must_use]
    pub fn channel(&self) -> u32 {
        u32::from_be_bytes(self.channel)
    }

    /// Whether this is a control frame
    #[must_use]
    pub fn is_control(&self) -> bool {
        self.channel() == Self::CHANNEL_CONTROL
    }

    /// Get the high half of the stream offset
    #[must_use]
    pub fn offset_high(&self) -> u32 {
        u32::from_be_bytes(self.offset_high)
    }

    /// Get the low half of the stream offset
    #[must_use]
    pub fn offset_low(&self) -> u32 {
        u32::from_be_bytes(self.offset_low)
    }

    /// Get the flags
    #[must_use]
    pub fn flags(&self) -> u32 {
        u32::from_be_bytes(self.flags)
    }
}

impl std::fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Descriptor")
            .field("length", &self.length())
            .field("channel", &format!("{:#010x}", self.channel()))
            .field("offset_high", &self.offset_high())
            .field("offset_low", &self.offset_low())
            .field("flags", &self.flags())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    impl Arbitrary for Descriptor {
        type Parameters = ();
        type Strategy = BoxedStrategy<Self>;

        fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
            (0u32..=Descriptor::MAX_PAYLOAD_SIZE, any::<u32>(), any::<u32>(), any::<u32>(), any::<u32>())
                .prop_map(|(length, channel, high, low, flags)| Descriptor {
                    length: length.to_be_bytes(),
                    channel: channel.to_be_bytes(),
                    offset_high: high.to_be_bytes(),
                    offset_low: low.to_be_bytes(),
                    flags: flags.to_be_bytes(),
                })
                .boxed()
        }
    }

    #[test]
    fn descriptor_size() {
        assert_eq!(std::mem::size_of::<Descriptor>(), Descriptor::SIZE);
        assert_eq!(Descriptor::SIZE, 20);
    }

    #[test]
    fn control_descriptor_layout() {
        let descriptor = Descriptor::control();
        let bytes = descriptor.to_bytes();

        assert_eq!(&bytes[0..4], &[0, 0, 0, 0]);
        assert_eq!(&bytes[4..8], &[0xFF, 0xFF, 0xFF, 0xFF]);
        assert_eq!(&bytes[8..20], &[0; 12]);
        assert!(descriptor.is_control());
    }

    proptest! {
        #[test]
        fn descriptor_round_trip(descriptor in any::<Descriptor>()) {
            let bytes = descriptor.to_bytes();
            let parsed = Descriptor::from_bytes(&bytes).expect("should parse");
            prop_assert_eq!(&descriptor, parsed);
        }
    }

    #[test]
    fn reject_short_buffer() {
        let short = [0u8; 12];
        let result = Descriptor::from_bytes(&short);
        assert_eq!(result, Err(ProtocolError::FrameTooShort { expected: 20, actual: 12 }));
    }

    #[test]
    fn reject_oversize_length() {
        let mut bytes = [0u8; 20];
        bytes[0..4].copy_from_slice(&(Descriptor::MAX_PAYLOAD_SIZE + 1).to_be_bytes());

        let result = Descriptor::from_bytes(&bytes);
        assert!(matches!(result, Err(ProtocolError::PayloadTooLarge { .. })));
    }

    #[test]
    fn boundary_length_is_accepted() {
        let mut bytes = [0u8; 20];
        bytes[0..4].copy_from_slice(&Descriptor::MAX_PAYLOAD_SIZE.to_be_bytes());

        let descriptor = Descriptor::from_bytes(&bytes).expect("16 MiB exactly is allowed");
        assert_eq!(descriptor.length(), Descriptor::MAX_PAYLOAD_SIZE);
    }
}
