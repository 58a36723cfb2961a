//! Register definitions for the CC2500
//!
//! The address space is six bits wide:
//!
//! | Range     | Contents                                          |
//! |-----------|---------------------------------------------------|
//! | 0x00-0x2E | Configuration registers, read/write               |
//! | 0x30-0x3D | Status registers (burst bit set) or strobes       |
//! | 0x3E      | PATABLE                                           |
//! | 0x3F      | FIFO: RX FIFO when read, TX FIFO when written     |
//!
//! Typed registers used by the driver are re-exported here; [`address`] lists
//! every address for raw access.

mod config;
mod status;

pub use config::*;
pub use status::*;

/// Raw register addresses
pub mod address {
    pub const IOCFG2: u8 = 0x00;
    pub const IOCFG1: u8 = 0x01;
    pub const IOCFG0: u8 = 0x02;
    pub const FIFOTHR: u8 = 0x03;
    pub const SYNC1: u8 = 0x04;
    pub const SYNC0: u8 = 0x05;
    pub const PKTLEN: u8 = 0x06;
    pub const PKTCTRL1: u8 = 0x07;
    pub const PKTCTRL0: u8 = 0x08;
    pub const ADDR: u8 = 0x09;
    pub const CHANNR: u8 = 0x0A;
    pub const FSCTRL1: u8 = 0x0B;
    pub const FSCTRL0: u8 = 0x0C;
    pub const FREQ2: u8 = 0x0D;
    pub const FREQ1: u8 = 0x0E;
    pub const FREQ0: u8 = 0x0F;
    pub const MDMCFG4: u8 = 0x10;
    pub const MDMCFG3: u8 = 0x11;
    pub const MDMCFG2: u8 = 0x12;
    pub const MDMCFG1: u8 = 0x13;
    pub const MDMCFG0: u8 = 0x14;
    pub const DEVIATN: u8 = 0x15;
    pub const MCSM2: u8 = 0x16;
    pub const MCSM1: u8 = 0x17;
    pub const MCSM0: u8 = 0x18;
    pub const FOCCFG: u8 = 0x19;
    pub const BSCFG: u8 = 0x1A;
    pub const AGCCTRL2: u8 = 0x1B;
    pub const AGCCTRL1: u8 = 0x1C;
    pub const AGCCTRL0: u8 = 0x1D;
    pub const WOREVT1: u8 = 0x1E;
    pub const WOREVT0: u8 = 0x1F;
    pub const WORCTRL: u8 = 0x20;
    pub const FREND1: u8 = 0x21;
    pub const FREND0: u8 = 0x22;
    pub const FSCAL3: u8 = 0x23;
    pub const FSCAL2: u8 = 0x24;
    pub const FSCAL1: u8 = 0x25;
    pub const FSCAL0: u8 = 0x26;
    pub const RCCTRL1: u8 = 0x27;
    pub const RCCTRL0: u8 = 0x28;
    pub const FSTEST: u8 = 0x29;
    pub const PTEST: u8 = 0x2A;
    pub const AGCTEST: u8 = 0x2B;
    pub const TEST2: u8 = 0x2C;
    pub const TEST1: u8 = 0x2D;
    pub const TEST0: u8 = 0x2E;

    pub const PARTNUM: u8 = 0x30;
    pub const VERSION: u8 = 0x31;
    pub const FREQEST: u8 = 0x32;
    pub const LQI: u8 = 0x33;
    pub const RSSI: u8 = 0x34;
    pub const MARCSTATE: u8 = 0x35;
    pub const WORTIME1: u8 = 0x36;
    pub const WORTIME0: u8 = 0x37;
    pub const PKTSTATUS: u8 = 0x38;
    pub const VCO_VC_DAC: u8 = 0x39;
    pub const TXBYTES: u8 = 0x3A;
    pub const RXBYTES: u8 = 0x3B;
    pub const RCCTRL1_STATUS: u8 = 0x3C;
    pub const RCCTRL0_STATUS: u8 = 0x3D;

    pub const PATABLE: u8 = 0x3E;
    pub const FIFO: u8 = 0x3F;

    /// Last configuration register
    pub const LAST_CONFIG: u8 = TEST0;

    /// Whether `addr` is a read-only status register
    pub fn is_status(addr: u8) -> bool {
        (PARTNUM..=RCCTRL0_STATUS).contains(&addr)
    }
}

/// Number of configuration registers (0x00..=0x2E)
pub const CONFIG_REGISTER_COUNT: usize = address::LAST_CONFIG as usize + 1;

/// Depth of each of the RX and TX FIFOs
pub const FIFO_SIZE: usize = 64;

/// Header bit selecting a read access
pub const READ: u8 = 0x80;

/// Header bit selecting burst access
pub const BURST: u8 = 0x40;
