//! Subscription event mask.
//!
//! SUBSCRIBE takes a bitmask selecting which server-object categories the
//! client wants change events for. This client subscribes to everything;
//! the events themselves carry no payload in our model.

use bitflags::bitflags;

bitflags! {
    /// Event categories a client can subscribe to (one bit each).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SubscriptionMask: u32 {
        /// Sink changes
        const SINK = 0x0001;

        /// Source changes
        const SOURCE = 0x0002;

        /// Sink input changes
        const SINK_INPUT = 0x0004;

        /// Source output changes
        const SOURCE_OUTPUT = 0x0008;

        /// Module load/unload
        const MODULE = 0x0010;

        /// Client connect/disconnect
        const CLIENT = 0x0020;

        /// Sample cache changes
        const SAMPLE_CACHE = 0x0040;

        /// Global server changes (defaults, etc.)
        const SERVER = 0x0080;

        /// Autoload table changes (obsolete, bit still reserved)
        const AUTOLOAD = 0x0100;

        /// Card changes
        const CARD = 0x0200;

        /// Every category
        const ALL = 0x02FF;
    }
}

impl SubscriptionMask {
    /// Create a mask from the raw wire value, preserving unknown bits.
    #[must_use]
    pub const fn from_bits_wire(value: u32) -> Self {
        Self::from_bits_retain(value)
    }
}

impl Default for SubscriptionMask {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_covers_every_category() {
        assert_eq!(SubscriptionMask::ALL.bits(), 0x02FF);

        let union = SubscriptionMask::SINK
            | SubscriptionMask::SOURCE
            | SubscriptionMask::SINK_INPUT
            | SubscriptionMask::SOURCE_OUTPUT
            | SubscriptionMask::MODULE
            | SubscriptionMask::CLIENT
            | SubscriptionMask::SAMPLE_CACHE
            | SubscriptionMask::SERVER
            | SubscriptionMask::AUTOLOAD
            | SubscriptionMask::CARD;
        assert_eq!(union, SubscriptionMask::ALL);
    }

    #[test]
    fn mask_round_trip() {
        let mask = SubscriptionMask::SINK | SubscriptionMask::CARD;
        assert_eq!(SubscriptionMask::from_bits_wire(mask.bits()), mask);
    }
}
