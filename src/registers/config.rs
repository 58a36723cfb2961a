//! Configuration registers
//!
//! Typed views of the configuration registers the driver touches after the
//! bulk profile load: GDO0 function, packet handling, device address, channel,
//! sync/modem settings and the PA table. The remaining registers are only ever
//! written as part of a [`Profile`](crate::profile::Profile).

use bitflags::bitflags;
use core::convert::Infallible;

use regiface::{register, FromByteArray, ReadableRegister, ToByteArray, WritableRegister};

/// A register field held a reserved encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidFieldValue(pub u8);

/// Signal routed to a GDO pin (IOCFGx bits 5:0)
///
/// Only the functions relevant to packet operation are listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GdoSignal {
    /// Asserts when the RX FIFO is filled at or above the threshold
    RxFifoThreshold = 0x00,
    /// As above, or when the end of packet is reached
    RxFifoThresholdOrEnd = 0x01,
    /// Asserts when the TX FIFO is filled at or above the threshold
    TxFifoThreshold = 0x02,
    /// Asserts when the TX FIFO is full
    TxFifoFull = 0x03,
    /// Asserts when the RX FIFO has overflowed
    RxFifoOverflow = 0x04,
    /// Asserts when the TX FIFO has underflowed
    TxFifoUnderflow = 0x05,
    /// Asserts when sync word has been sent/received, deasserts at the end of
    /// the packet. In RX it also deasserts when a packet is discarded.
    SyncWord = 0x06,
    /// Asserts when a packet with a valid CRC has been received
    PacketCrcOk = 0x07,
    /// Preamble quality reached
    PreambleQuality = 0x08,
    /// Clear channel assessment
    ClearChannel = 0x09,
    /// CHIP_RDYn
    ChipReadyN = 0x29,
    /// High impedance (3-state)
    HighImpedance = 0x2E,
}

impl GdoSignal {
    pub fn from_byte(value: u8) -> Result<Self, InvalidFieldValue> {
        match value & 0x3F {
            0x00 => Ok(Self::RxFifoThreshold),
            0x01 => Ok(Self::RxFifoThresholdOrEnd),
            0x02 => Ok(Self::TxFifoThreshold),
            0x03 => Ok(Self::TxFifoFull),
            0x04 => Ok(Self::RxFifoOverflow),
            0x05 => Ok(Self::TxFifoUnderflow),
            0x06 => Ok(Self::SyncWord),
            0x07 => Ok(Self::PacketCrcOk),
            0x08 => Ok(Self::PreambleQuality),
            0x09 => Ok(Self::ClearChannel),
            0x29 => Ok(Self::ChipReadyN),
            0x2E => Ok(Self::HighImpedance),
            invalid => Err(InvalidFieldValue(invalid)),
        }
    }
}

/// GDO0 output pin configuration (address: 0x02)
///
/// GDO0 carries the completion signal. With [`GdoSignal::SyncWord`] the pin
/// rises on sync and falls at the end of the packet, so a falling edge marks
/// the end of both an RX and a TX operation.
#[register(0x02u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct Iocfg0 {
    /// Invert output (active low)
    pub inverted: bool,
    /// Routed signal
    pub signal: GdoSignal,
}

impl Default for Iocfg0 {
    fn default() -> Self {
        Self {
            inverted: false,
            signal: GdoSignal::SyncWord,
        }
    }
}

/// Packet length register (address: 0x06)
///
/// Payload length in fixed-length mode, maximum accepted length in
/// variable-length mode.
#[register(0x06u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct PacketLength {
    pub length: u8,
}

bitflags! {
    /// Single-bit options in PKTCTRL1
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PacketFlags: u8 {
        /// Flush the RX FIFO automatically when the CRC is not OK
        const CRC_AUTOFLUSH = 1 << 3;
        /// Append RSSI and LQI/CRC_OK status bytes to the payload
        const APPEND_STATUS = 1 << 2;
    }
}

/// Address check performed on received packets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AddressCheck {
    None = 0,
    Address = 1,
    AddressAndBroadcast = 2,
    AddressAndBothBroadcasts = 3,
}

/// Packet automation control 1 (address: 0x07)
#[register(0x07u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct PacketControl1 {
    /// Preamble quality threshold, bits 7:5
    pub preamble_quality: u8,
    pub flags: PacketFlags,
    pub address_check: AddressCheck,
}

/// Packet length configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LengthConfig {
    /// Length taken from PKTLEN
    Fixed = 0,
    /// Length taken from the first byte after the sync word
    Variable = 1,
    /// Infinite packet length
    Infinite = 2,
}

/// Packet automation control 0 (address: 0x08)
#[register(0x08u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct PacketControl0 {
    /// Data whitening
    pub whitening: bool,
    /// CRC calculation in TX and CRC check in RX
    pub crc_enabled: bool,
    pub length: LengthConfig,
}

/// Device address (address: 0x09)
#[register(0x09u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct DeviceAddress {
    pub address: u8,
}

/// Channel number (address: 0x0A)
///
/// Multiplied by the channel spacing and added to the base frequency.
#[register(0x0Au8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct Channel {
    pub number: u8,
}

/// Modulation format (MDMCFG2 bits 6:4)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Modulation {
    Fsk2 = 0,
    Gfsk = 1,
    Ook = 3,
    Msk = 7,
}

/// Sync word qualifier mode (MDMCFG2 bits 2:0)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SyncMode {
    None = 0,
    Bits15Of16 = 1,
    Bits16Of16 = 2,
    Bits30Of32 = 3,
    CarrierSense = 4,
    CarrierSense15Of16 = 5,
    CarrierSense16Of16 = 6,
    CarrierSense30Of32 = 7,
}

impl SyncMode {
    fn from_bits(bits: u8) -> Self {
        match bits & 0x07 {
            0 => Self::None,
            1 => Self::Bits15Of16,
            2 => Self::Bits16Of16,
            3 => Self::Bits30Of32,
            4 => Self::CarrierSense,
            5 => Self::CarrierSense15Of16,
            6 => Self::CarrierSense16Of16,
            _ => Self::CarrierSense30Of32,
        }
    }
}

/// Modem configuration 2 (address: 0x12)
#[register(0x12u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct ModemConfig2 {
    /// Disable the digital DC blocking filter before the demodulator
    pub dc_filter_off: bool,
    pub modulation: Modulation,
    pub manchester: bool,
    pub sync_mode: SyncMode,
}

/// Modem configuration 1 (address: 0x13)
#[register(0x13u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct ModemConfig1 {
    /// Minimum preamble bytes, encoded 0..=7 for 2, 3, 4, 6, 8, 12, 16, 24
    pub num_preamble: u8,
    /// Channel spacing exponent, bits 1:0
    pub channel_spacing_exponent: u8,
}

/// PA power setting, first PATABLE entry (address: 0x3E)
#[register(0x3Eu8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct PaTable {
    pub value: u8,
}

impl FromByteArray for Iocfg0 {
    type Error = InvalidFieldValue;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            inverted: bytes[0] & 0x40 != 0,
            signal: GdoSignal::from_byte(bytes[0])?,
        })
    }
}

impl ToByteArray for Iocfg0 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        let inv = if self.inverted { 0x40 } else { 0x00 };
        Ok([inv | self.signal as u8])
    }
}

impl FromByteArray for PacketLength {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self { length: bytes[0] })
    }
}

impl ToByteArray for PacketLength {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.length])
    }
}

impl FromByteArray for PacketControl1 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        let address_check = match bytes[0] & 0x03 {
            0 => AddressCheck::None,
            1 => AddressCheck::Address,
            2 => AddressCheck::AddressAndBroadcast,
            _ => AddressCheck::AddressAndBothBroadcasts,
        };
        Ok(Self {
            preamble_quality: bytes[0] >> 5,
            flags: PacketFlags::from_bits_truncate(bytes[0]),
            address_check,
        })
    }
}

impl ToByteArray for PacketControl1 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([(self.preamble_quality & 0x07) << 5 | self.flags.bits() | self.address_check as u8])
    }
}

impl FromByteArray for PacketControl0 {
    type Error = InvalidFieldValue;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        let length = match bytes[0] & 0x03 {
            0 => LengthConfig::Fixed,
            1 => LengthConfig::Variable,
            2 => LengthConfig::Infinite,
            invalid => return Err(InvalidFieldValue(invalid)),
        };
        Ok(Self {
            whitening: bytes[0] & 0x40 != 0,
            crc_enabled: bytes[0] & 0x04 != 0,
            length,
        })
    }
}

impl ToByteArray for PacketControl0 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        let white = if self.whitening { 0x40 } else { 0x00 };
        let crc = if self.crc_enabled { 0x04 } else { 0x00 };
        Ok([white | crc | self.length as u8])
    }
}

impl FromByteArray for DeviceAddress {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self { address: bytes[0] })
    }
}

impl ToByteArray for DeviceAddress {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.address])
    }
}

impl FromByteArray for Channel {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self { number: bytes[0] })
    }
}

impl ToByteArray for Channel {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.number])
    }
}

impl FromByteArray for ModemConfig2 {
    type Error = InvalidFieldValue;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        let modulation = match (bytes[0] >> 4) & 0x07 {
            0 => Modulation::Fsk2,
            1 => Modulation::Gfsk,
            3 => Modulation::Ook,
            7 => Modulation::Msk,
            invalid => return Err(InvalidFieldValue(invalid)),
        };
        Ok(Self {
            dc_filter_off: bytes[0] & 0x80 != 0,
            modulation,
            manchester: bytes[0] & 0x08 != 0,
            sync_mode: SyncMode::from_bits(bytes[0]),
        })
    }
}

impl ToByteArray for ModemConfig2 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        let dc = if self.dc_filter_off { 0x80 } else { 0x00 };
        let manchester = if self.manchester { 0x08 } else { 0x00 };
        Ok([dc | (self.modulation as u8) << 4 | manchester | self.sync_mode as u8])
    }
}

impl FromByteArray for ModemConfig1 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            num_preamble: (bytes[0] >> 4) & 0x07,
            channel_spacing_exponent: bytes[0] & 0x03,
        })
    }
}

impl ToByteArray for ModemConfig1 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([(self.num_preamble & 0x07) << 4 | (self.channel_spacing_exponent & 0x03)])
    }
}

impl FromByteArray for PaTable {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self { value: bytes[0] })
    }
}

impl ToByteArray for PaTable {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.value])
    }
}
