//! Command strobes
//!
//! A strobe is a single header byte in the 0x30..=0x3D address range with no
//! payload. The transceiver acts on it as soon as the header has been clocked
//! in and returns the status byte in the same slot.
//!
//! # Important Notes
//! - [`Strobe::FlushRx`] and [`Strobe::FlushTx`] are only honoured in IDLE or
//!   in the matching FIFO error state; issue [`Strobe::Idle`] first when the
//!   radio may still be in RX or TX.
//! - [`Strobe::Reset`] leaves SO high until the crystal has restarted. Wait
//!   for the ready line before the next transaction.
//! - [`Strobe::Rx`] and [`Strobe::Tx`] start an operation whose end is
//!   reported on GDO0; only one may be outstanding.

/// Command strobe addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Strobe {
    /// SRES: reset chip
    Reset = 0x30,
    /// SFSTXON: enable and calibrate the frequency synthesizer
    FsTxOn = 0x31,
    /// SXOFF: turn off the crystal oscillator
    CrystalOff = 0x32,
    /// SCAL: calibrate the frequency synthesizer and turn it off
    Calibrate = 0x33,
    /// SRX: enable RX
    Rx = 0x34,
    /// STX: enable TX
    Tx = 0x35,
    /// SIDLE: exit RX/TX, turn off the frequency synthesizer
    Idle = 0x36,
    /// SWOR: start automatic RX polling (wake-on-radio)
    WakeOnRadio = 0x38,
    /// SPWD: enter power down when chip-select goes high
    PowerDown = 0x39,
    /// SFRX: flush the RX FIFO
    FlushRx = 0x3A,
    /// SFTX: flush the TX FIFO
    FlushTx = 0x3B,
    /// SWORRST: reset the real time clock
    WakeOnRadioReset = 0x3C,
    /// SNOP: no operation, used to sample the status byte
    Nop = 0x3D,
}

impl Strobe {
    /// Strobe address without access bits
    pub fn addr(self) -> u8 {
        self as u8
    }
}
