//! Error taxonomy
//!
//! Every fallible operation in the crate returns [`Error`]. HAL errors are
//! collapsed into [`Error::Bus`] at the boundary; everything else carries
//! enough detail for the control loop to pick a retry-versus-halt policy
//! (see [`Error::is_transient`]).

use core::fmt;

use crate::link::Direction;
use crate::status::ChipState;

/// Which bounded wait expired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeoutSource {
    /// The SO line never went low after chip-select was asserted, or after a
    /// reset strobe.
    ReadyLine,
    /// No completion edge arrived while an RX or TX operation was outstanding.
    Completion,
}

/// Invalid input detected before any bus traffic was generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Profile id is not in the profile table
    UnknownProfile(u8),
    /// A profile asset does not hold exactly 47 register values
    ProfileLength(usize),
    /// No calibrated PATABLE entry exists for this output power (dBm)
    UnknownTxPower(i8),
    /// Register address above 0x3F
    AddressOutOfRange(u8),
    /// Write attempted on a status register (0x30..=0x3D)
    ReadOnlyRegister(u8),
    /// Burst access longer than the FIFO depth, or empty
    BurstLength(usize),
    /// Payload length is zero or exceeds the FIFO
    PayloadLength(u8),
    /// CRC check or CRC auto-flush is disabled in the loaded configuration
    CrcFilterDisabled,
    /// Completion timeout or poll interval is zero
    InvalidTimeout,
}

/// The transceiver did something the link protocol does not allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Violation {
    /// Status byte reported a state the current phase cannot be in
    UnexpectedState(ChipState),
    /// RXBYTES reported the RX FIFO overflowed
    RxOverflow,
    /// TXBYTES reported the TX FIFO underflowed
    TxUnderflow,
    /// RX FIFO count does not describe a whole packet
    FifoCount(u8),
    /// Completion wake carried a different direction than the one armed
    UnexpectedWake {
        expected: Direction,
        actual: Direction,
    },
    /// Sampler returned a value wider than 10 bits
    ReadingOutOfRange(u16),
    /// PARTNUM did not identify a CC2500
    UnknownPart(u8),
    /// Status byte had CHIP_RDYn set while the SO line reported ready
    ChipNotReady,
}

/// Driver error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// SPI bus or GPIO failure reported by the HAL
    Bus,
    /// A bounded wait expired
    HardwareTimeout(TimeoutSource),
    /// Invalid configuration or argument
    Configuration(ConfigError),
    /// Unexpected chip state or FIFO contents
    ProtocolViolation(Violation),
    /// A typed register could not be converted to or from its raw bytes
    RegisterEncoding,
    /// The analog sampler failed
    Sampler,
    /// The host link failed to accept forwarded bytes
    HostLink,
}

impl Error {
    /// Whether the link loop may retry after this error.
    ///
    /// A missed completion edge and a protocol violation (after resync) are
    /// part of normal operation on a lossy channel. Everything else points at
    /// wiring, configuration or a collaborator and halts the loop.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::HardwareTimeout(TimeoutSource::Completion) | Error::ProtocolViolation(_)
        )
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Configuration(e)
    }
}

impl From<Violation> for Error {
    fn from(v: Violation) -> Self {
        Self::ProtocolViolation(v)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Bus => f.write_str("SPI bus error"),
            Error::HardwareTimeout(TimeoutSource::ReadyLine) => {
                f.write_str("timed out waiting for the transceiver ready line")
            }
            Error::HardwareTimeout(TimeoutSource::Completion) => {
                f.write_str("timed out waiting for radio completion")
            }
            Error::Configuration(e) => write!(f, "configuration error: {:?}", e),
            Error::ProtocolViolation(v) => write!(f, "protocol violation: {:?}", v),
            Error::RegisterEncoding => f.write_str("failed to convert register value"),
            Error::Sampler => f.write_str("sampler error"),
            Error::HostLink => f.write_str("host link error"),
        }
    }
}
