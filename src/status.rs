//! Chip status byte
//!
//! The first byte clocked out of the CC2500 in every SPI transaction is the
//! status byte:
//!
//! | Bits | Field                                   |
//! |------|-----------------------------------------|
//! | 7    | CHIP_RDYn, low once the crystal is up   |
//! | 6:4  | Main radio state machine state          |
//! | 3:0  | FIFO_BYTES_AVAILABLE                    |
//!
//! The FIFO count refers to the RX FIFO when the header had the read bit set
//! and to free space in the TX FIFO otherwise. It saturates at 15.

/// Main radio state machine state, bits 6:4 of the status byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChipState {
    Idle = 0,
    Rx = 1,
    Tx = 2,
    FstxOn = 3,
    Calibrate = 4,
    Settling = 5,
    RxOverflow = 6,
    TxUnderflow = 7,
}

impl ChipState {
    /// Decode the three state bits. All eight encodings are defined.
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x07 {
            0 => Self::Idle,
            1 => Self::Rx,
            2 => Self::Tx,
            3 => Self::FstxOn,
            4 => Self::Calibrate,
            5 => Self::Settling,
            6 => Self::RxOverflow,
            _ => Self::TxUnderflow,
        }
    }

    /// FIFO error states that require a flush before the radio can be used
    pub fn is_fifo_error(self) -> bool {
        matches!(self, Self::RxOverflow | Self::TxUnderflow)
    }
}

/// Status byte returned by every transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusByte(pub u8);

impl StatusByte {
    /// `false` while power and crystal are still stabilizing
    pub fn chip_ready(self) -> bool {
        self.0 & 0x80 == 0
    }

    pub fn state(self) -> ChipState {
        ChipState::from_bits(self.0 >> 4)
    }

    /// FIFO_BYTES_AVAILABLE. Only meaningful when sampled through
    /// [`Device::read_status`](crate::Device::read_status) or
    /// [`Device::write_status`](crate::Device::write_status).
    pub fn fifo_bytes(self) -> u8 {
        self.0 & 0x0F
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_every_state() {
        let states = [
            ChipState::Idle,
            ChipState::Rx,
            ChipState::Tx,
            ChipState::FstxOn,
            ChipState::Calibrate,
            ChipState::Settling,
            ChipState::RxOverflow,
            ChipState::TxUnderflow,
        ];
        for (bits, expected) in states.iter().enumerate() {
            let status = StatusByte((bits as u8) << 4 | 0x05);
            assert_eq!(status.state(), *expected);
            assert_eq!(status.fifo_bytes(), 5);
            assert!(status.chip_ready());
        }
    }

    #[test]
    fn chip_not_ready_bit() {
        assert!(!StatusByte(0x80).chip_ready());
        assert_eq!(StatusByte(0x8F).state(), ChipState::Idle);
    }

    #[test]
    fn fifo_error_states() {
        assert!(ChipState::RxOverflow.is_fifo_error());
        assert!(ChipState::TxUnderflow.is_fifo_error());
        assert!(!ChipState::Rx.is_fifo_error());
    }
}
