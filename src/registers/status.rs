//! Status registers
//!
//! Read-only registers in 0x30..=0x3D. They share their addresses with the
//! command strobes and are only reachable with the burst bit set, which
//! [`Device::read_single`](crate::Device::read_single) takes care of.

use core::convert::Infallible;

use regiface::{register, FromByteArray, ReadableRegister};

/// Part number (address: 0x30). Reads 0x80 on a CC2500.
#[register(0x30u8)]
#[derive(Debug, Clone, Copy, ReadableRegister)]
pub struct PartNumber {
    pub value: u8,
}

/// Expected [`PartNumber`] value
pub const CC2500_PARTNUM: u8 = 0x80;

/// Chip version (address: 0x31)
#[register(0x31u8)]
#[derive(Debug, Clone, Copy, ReadableRegister)]
pub struct Version {
    pub value: u8,
}

/// Main radio control state machine state (address: 0x35)
///
/// Finer grained than the three state bits of the status byte; useful in
/// diagnostics. 0x01 is IDLE, 0x0D is RX, 0x13 is TX.
#[register(0x35u8)]
#[derive(Debug, Clone, Copy, ReadableRegister)]
pub struct MarcState {
    pub state: u8,
}

/// TX FIFO status (address: 0x3A)
#[register(0x3Au8)]
#[derive(Debug, Clone, Copy, ReadableRegister)]
pub struct TxBytes {
    /// TX FIFO underflowed
    pub underflow: bool,
    /// Bytes in the TX FIFO
    pub count: u8,
}

/// RX FIFO status (address: 0x3B)
///
/// # Important Notes
/// - The count is read while the FIFO may still be filling; read it after the
///   completion signal, not during reception.
/// - With CRC auto-flush enabled a packet failing its CRC is removed before
///   the completion edge, so the count reads zero.
#[register(0x3Bu8)]
#[derive(Debug, Clone, Copy, ReadableRegister)]
pub struct RxBytes {
    /// RX FIFO overflowed
    pub overflow: bool,
    /// Bytes in the RX FIFO
    pub count: u8,
}

impl FromByteArray for PartNumber {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self { value: bytes[0] })
    }
}

impl FromByteArray for Version {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self { value: bytes[0] })
    }
}

impl FromByteArray for MarcState {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            state: bytes[0] & 0x1F,
        })
    }
}

impl FromByteArray for TxBytes {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            underflow: bytes[0] & 0x80 != 0,
            count: bytes[0] & 0x7F,
        })
    }
}

impl FromByteArray for RxBytes {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            overflow: bytes[0] & 0x80 != 0,
            count: bytes[0] & 0x7F,
        })
    }
}
