//! RF configuration
//!
//! Configuration is applied in layers:
//!
//! 1. [`Device::load_profile`] resets the chip and bulk-writes one of the
//!    precomputed register sets in [`PROFILES`].
//! 2. [`Device::setup_packet_mode`] overrides the packet handling registers
//!    (length, CRC, sync, GDO0 function) with a [`PacketConfig`].
//! 3. [`Device::set_channel`] and [`Device::set_tx_power`] pick the channel and
//!    PA level.
//!
//! Profiles are exported from SmartRF Studio as 47 values for registers
//! 0x00..=0x2E. They are stored as plain byte slices and checked for length
//! when loaded.

use crate::error::{ConfigError, Error};
use crate::registers::{
    address, Channel, DeviceAddress, Iocfg0, LengthConfig, ModemConfig1, ModemConfig2,
    PaTable, PacketControl0, PacketControl1, PacketFlags, PacketLength, SyncMode,
    AddressCheck, CONFIG_REGISTER_COUNT, FIFO_SIZE,
};
use crate::transport::Transport;
use crate::Device;

/// Number of values in a profile
pub const PROFILE_LEN: usize = CONFIG_REGISTER_COUNT;

/// 1.2 kBaud, 28 kHz deviation, 2-FSK, 203 kHz RX filter bandwidth
pub const FSK_1K2: [u8; PROFILE_LEN] = [
    0x29, // IOCFG2
    0x2E, // IOCFG1
    0x06, // IOCFG0
    0x07, // FIFOTHR
    0xD3, // SYNC1
    0x91, // SYNC0
    0x20, // PKTLEN
    0x08, // PKTCTRL1
    0x04, // PKTCTRL0
    0x00, // ADDR
    0x80, // CHANNR
    0x08, // FSCTRL1
    0x00, // FSCTRL0
    0x5C, // FREQ2
    0x58, // FREQ1
    0x9D, // FREQ0
    0x85, // MDMCFG4
    0x83, // MDMCFG3
    0x03, // MDMCFG2
    0x22, // MDMCFG1
    0xF8, // MDMCFG0
    0x44, // DEVIATN
    0x07, // MCSM2
    0x30, // MCSM1
    0x18, // MCSM0
    0x16, // FOCCFG
    0x6C, // BSCFG
    0x03, // AGCCTRL2
    0x40, // AGCCTRL1
    0x91, // AGCCTRL0
    0x87, // WOREVT1
    0x6B, // WOREVT0
    0xF8, // WORCTRL
    0x56, // FREND1
    0x10, // FREND0
    0xA9, // FSCAL3
    0x0A, // FSCAL2
    0x00, // FSCAL1
    0x11, // FSCAL0
    0x41, // RCCTRL1
    0x00, // RCCTRL0
    0x59, // FSTEST
    0x7F, // PTEST
    0x3F, // AGCTEST
    0x88, // TEST2
    0x31, // TEST1
    0x0B, // TEST0
];

/// Profile table, indexed by [`ProfileId`]
pub static PROFILES: [&[u8]; 1] = [&FSK_1K2];

/// Index into [`PROFILES`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProfileId(pub u8);

impl ProfileId {
    pub const FSK_1K2: ProfileId = ProfileId(0);
}

impl Default for ProfileId {
    fn default() -> Self {
        Self::FSK_1K2
    }
}

/// A validated register set for 0x00..=0x2E
#[derive(Debug, Clone, Copy)]
pub struct Profile<'a> {
    values: &'a [u8],
}

impl<'a> Profile<'a> {
    /// Looks up and validates a profile from [`PROFILES`].
    pub fn lookup(id: ProfileId) -> Result<Self, ConfigError> {
        let values = PROFILES
            .get(usize::from(id.0))
            .ok_or(ConfigError::UnknownProfile(id.0))?;
        Profile::try_from(*values)
    }

    pub fn values(&self) -> &'a [u8] {
        self.values
    }
}

impl<'a> TryFrom<&'a [u8]> for Profile<'a> {
    type Error = ConfigError;

    fn try_from(values: &'a [u8]) -> Result<Self, Self::Error> {
        if values.len() != PROFILE_LEN {
            return Err(ConfigError::ProfileLength(values.len()));
        }
        Ok(Self { values })
    }
}

/// Calibrated output power levels and their PATABLE values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TxPower {
    Pos1Dbm,
    ZeroDbm,
    Neg2Dbm,
    Neg4Dbm,
    Neg6Dbm,
    Neg8Dbm,
    Neg10Dbm,
    Neg12Dbm,
    Neg14Dbm,
    Neg16Dbm,
    Neg18Dbm,
    Neg20Dbm,
    Neg22Dbm,
    Neg24Dbm,
    Neg26Dbm,
    Neg28Dbm,
    Neg30Dbm,
}

impl TxPower {
    /// Selects a level by its dBm value.
    ///
    /// # Errors
    /// * [`ConfigError::UnknownTxPower`] - no calibrated entry for `dbm`
    pub fn from_dbm(dbm: i8) -> Result<Self, ConfigError> {
        Ok(match dbm {
            1 => Self::Pos1Dbm,
            0 => Self::ZeroDbm,
            -2 => Self::Neg2Dbm,
            -4 => Self::Neg4Dbm,
            -6 => Self::Neg6Dbm,
            -8 => Self::Neg8Dbm,
            -10 => Self::Neg10Dbm,
            -12 => Self::Neg12Dbm,
            -14 => Self::Neg14Dbm,
            -16 => Self::Neg16Dbm,
            -18 => Self::Neg18Dbm,
            -20 => Self::Neg20Dbm,
            -22 => Self::Neg22Dbm,
            -24 => Self::Neg24Dbm,
            -26 => Self::Neg26Dbm,
            -28 => Self::Neg28Dbm,
            -30 => Self::Neg30Dbm,
            other => return Err(ConfigError::UnknownTxPower(other)),
        })
    }

    pub fn dbm(self) -> i8 {
        match self {
            Self::Pos1Dbm => 1,
            Self::ZeroDbm => 0,
            other => -2 * (other as i8 - 1),
        }
    }

    /// PATABLE calibration byte
    pub fn patable(self) -> u8 {
        match self {
            Self::Pos1Dbm => 0xFF,
            Self::ZeroDbm => 0xFE,
            Self::Neg2Dbm => 0xBB,
            Self::Neg4Dbm => 0xA9,
            Self::Neg6Dbm => 0x7F,
            Self::Neg8Dbm => 0x6E,
            Self::Neg10Dbm => 0x97,
            Self::Neg12Dbm => 0xC6,
            Self::Neg14Dbm => 0x8D,
            Self::Neg16Dbm => 0x55,
            Self::Neg18Dbm => 0x93,
            Self::Neg20Dbm => 0x46,
            Self::Neg22Dbm => 0x81,
            Self::Neg24Dbm => 0x84,
            Self::Neg26Dbm => 0xC0,
            Self::Neg28Dbm => 0x44,
            Self::Neg30Dbm => 0x50,
        }
    }
}

impl Default for TxPower {
    fn default() -> Self {
        Self::Pos1Dbm
    }
}

/// Packet handling layer applied after the bulk profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PacketConfig {
    /// Fixed payload length in bytes
    pub payload_len: u8,
    /// Drop packets failing CRC in hardware before the completion edge
    pub crc_autoflush: bool,
    pub whitening: bool,
    pub sync_mode: SyncMode,
    /// MDMCFG1 NUM_PREAMBLE encoding
    pub num_preamble: u8,
    pub address: u8,
}

impl Default for PacketConfig {
    fn default() -> Self {
        Self {
            payload_len: crate::link::PAYLOAD_LEN as u8,
            crc_autoflush: true,
            whitening: false,
            sync_mode: SyncMode::Bits30Of32,
            num_preamble: 2,
            address: 0x00,
        }
    }
}

impl PacketConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.payload_len == 0 || usize::from(self.payload_len) > FIFO_SIZE {
            return Err(ConfigError::PayloadLength(self.payload_len));
        }
        Ok(())
    }
}

impl<T> Device<T>
where
    T: Transport,
{
    /// Resets the chip and loads profile `id`.
    ///
    /// The id and the profile asset are validated before the first
    /// transaction; an invalid id generates no bus traffic.
    ///
    /// # Errors
    /// * [`ConfigError::UnknownProfile`] - `id` is outside [`PROFILES`]
    /// * [`ConfigError::ProfileLength`] - the asset is not 47 bytes long
    pub fn load_profile(&mut self, id: ProfileId) -> Result<(), Error> {
        let profile = Profile::lookup(id)?;

        self.reset()?;
        self.burst_write(address::IOCFG2, profile.values())?;

        info!("loaded RF profile {}", id.0);
        Ok(())
    }

    /// Writes the PA level into the first PATABLE entry.
    pub fn set_tx_power(&mut self, power: TxPower) -> Result<(), Error> {
        self.write_register(PaTable {
            value: power.patable(),
        })?;
        debug!("tx power {} dBm", power.dbm());
        Ok(())
    }

    /// Selects the RF channel.
    pub fn set_channel(&mut self, channel: u8) -> Result<(), Error> {
        self.write_register(Channel { number: channel })?;
        Ok(())
    }

    /// Applies the packet handling layer.
    ///
    /// Uses fixed-length packets with CRC enabled, routes end-of-packet to
    /// GDO0 and keeps the profile's modulation while replacing its sync mode.
    pub fn setup_packet_mode(&mut self, config: &PacketConfig) -> Result<(), Error> {
        config.validate()?;

        self.write_register(ModemConfig1 {
            num_preamble: config.num_preamble,
            channel_spacing_exponent: 0,
        })?;

        let mut mdmcfg2: ModemConfig2 = self.read_register()?;
        mdmcfg2.sync_mode = config.sync_mode;
        self.write_register(mdmcfg2)?;

        self.write_register(PacketControl0 {
            whitening: config.whitening,
            crc_enabled: true,
            length: LengthConfig::Fixed,
        })?;

        let mut flags = PacketFlags::empty();
        flags.set(PacketFlags::CRC_AUTOFLUSH, config.crc_autoflush);
        self.write_register(PacketControl1 {
            preamble_quality: 0,
            flags,
            address_check: AddressCheck::None,
        })?;

        self.write_register(Iocfg0::default())?;
        self.write_register(DeviceAddress {
            address: config.address,
        })?;
        self.write_register(PacketLength {
            length: config.payload_len,
        })?;

        debug!("packet mode: {} byte payload", config.payload_len);
        Ok(())
    }

    /// Whether received packets failing CRC are dropped by the chip.
    ///
    /// Reads back CRC_EN and CRC_AUTOFLUSH. When either is clear a non-zero
    /// RXBYTES count does not imply a valid packet.
    pub fn crc_filter_enabled(&mut self) -> Result<bool, Error> {
        let ctrl0: PacketControl0 = self.read_register()?;
        let ctrl1: PacketControl1 = self.read_register()?;
        Ok(ctrl0.crc_enabled && ctrl1.flags.contains(PacketFlags::CRC_AUTOFLUSH))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_table_entry_is_a_valid_profile() {
        for id in 0..PROFILES.len() as u8 {
            let profile = Profile::lookup(ProfileId(id)).unwrap();
            assert_eq!(profile.values().len(), 47);
        }
    }

    #[test]
    fn lookup_rejects_ids_past_the_table() {
        let id = PROFILES.len() as u8;
        assert_eq!(
            Profile::lookup(ProfileId(id)).unwrap_err(),
            ConfigError::UnknownProfile(id)
        );
    }

    #[test]
    fn short_asset_is_rejected() {
        let short = [0u8; 46];
        assert_eq!(
            Profile::try_from(&short[..]).unwrap_err(),
            ConfigError::ProfileLength(46)
        );
    }

    #[test]
    fn tx_power_levels_round_trip_through_dbm() {
        for dbm in [1i8, 0, -2, -10, -16, -30] {
            assert_eq!(TxPower::from_dbm(dbm).unwrap().dbm(), dbm);
        }
        assert_eq!(TxPower::from_dbm(-16).unwrap().patable(), 0x55);
        assert_eq!(TxPower::default().patable(), 0xFF);
    }

    #[test]
    fn uncalibrated_tx_power_is_rejected() {
        assert_eq!(TxPower::from_dbm(-3), Err(ConfigError::UnknownTxPower(-3)));
        assert_eq!(TxPower::from_dbm(5), Err(ConfigError::UnknownTxPower(5)));
    }

    #[test]
    fn packet_config_bounds() {
        assert!(PacketConfig::default().validate().is_ok());
        let zero = PacketConfig {
            payload_len: 0,
            ..Default::default()
        };
        assert_eq!(zero.validate(), Err(ConfigError::PayloadLength(0)));
        let huge = PacketConfig {
            payload_len: 65,
            ..Default::default()
        };
        assert_eq!(huge.validate(), Err(ConfigError::PayloadLength(65)));
    }
}
