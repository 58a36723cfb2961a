//! Link configuration
//!
//! [`LinkConfig`] gathers everything a node needs to bring the link up. It is
//! validated once, in [`Link::new`](super::Link::new), before any bus traffic.

use crate::error::ConfigError;
use crate::profile::{PacketConfig, Profile, ProfileId, TxPower};

use super::{Role, PAYLOAD_LEN};

/// Channel used when none is configured
pub const DEFAULT_CHANNEL: u8 = 0x83;

/// Bounds on the completion wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timeouts {
    /// Longest time an RX or TX operation may stay outstanding
    pub completion_us: u32,
    /// Sleep between checks for the completion wake
    pub poll_us: u32,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            completion_us: 1_500_000,
            poll_us: 1_000,
        }
    }
}

/// Link session configuration
///
/// Everything here is checked by [`validate`](Self::validate) before the
/// first bus transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkConfig {
    pub role: Role,
    pub profile: ProfileId,
    pub tx_power: TxPower,
    pub channel: u8,
    pub packet: PacketConfig,
    pub timeouts: Timeouts,
    /// BASE refuses to start unless CRC check and CRC auto-flush read back
    /// enabled after configuration.
    pub require_crc_filter: bool,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            role: Role::Base,
            profile: ProfileId::FSK_1K2,
            tx_power: TxPower::default(),
            channel: DEFAULT_CHANNEL,
            packet: PacketConfig::default(),
            timeouts: Timeouts::default(),
            require_crc_filter: true,
        }
    }
}

impl LinkConfig {
    pub fn base() -> Self {
        Self::default()
    }

    pub fn remote() -> Self {
        Self {
            role: Role::Remote,
            ..Self::default()
        }
    }

    /// # Errors
    /// * [`ConfigError::UnknownProfile`] - profile id not in the table
    /// * [`ConfigError::PayloadLength`] - payload length is not the reading size
    /// * [`ConfigError::CrcFilterDisabled`] - BASE configured without CRC
    ///   auto-flush while the filter is required
    /// * [`ConfigError::InvalidTimeout`] - zero completion timeout or poll
    ///   interval
    pub fn validate(&self) -> Result<(), ConfigError> {
        Profile::lookup(self.profile)?;
        if self.timeouts.completion_us == 0 || self.timeouts.poll_us == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        self.packet.validate()?;
        if usize::from(self.packet.payload_len) != PAYLOAD_LEN {
            return Err(ConfigError::PayloadLength(self.packet.payload_len));
        }
        if self.role == Role::Base && self.require_crc_filter && !self.packet.crc_autoflush {
            return Err(ConfigError::CrcFilterDisabled);
        }
        Ok(())
    }
}
