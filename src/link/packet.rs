//! Reading payload codec
//!
//! A reading is a 10-bit sample carried in a fixed two byte payload:
//! `[high, low]` with the top two bits reserved and zero on the wire.

/// Payload length on the air, in bytes
pub const PAYLOAD_LEN: usize = 2;

/// Largest value a [`Reading`] can carry
pub const READING_MAX: u16 = 0x03FF;

/// 10-bit sensor reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reading(u16);

impl Reading {
    /// Returns `None` if `value` does not fit in 10 bits.
    pub const fn new(value: u16) -> Option<Self> {
        if value > READING_MAX {
            None
        } else {
            Some(Self(value))
        }
    }

    pub const fn value(self) -> u16 {
        self.0
    }

    pub const fn encode(self) -> [u8; PAYLOAD_LEN] {
        [(self.0 >> 8) as u8, (self.0 & 0xFF) as u8]
    }

    /// Decodes a received payload. Reserved high bits are ignored.
    pub const fn decode(payload: [u8; PAYLOAD_LEN]) -> Self {
        Self((((payload[0] as u16) << 8) | payload[1] as u16) & READING_MAX)
    }
}

impl From<Reading> for u16 {
    fn from(reading: Reading) -> Self {
        reading.0
    }
}
