//! CC2500 register interface
//!
//! This module layers the transceiver's addressing conventions on top of a
//! [`Transport`]. Every access is one chip-select frame that starts with a
//! header byte:
//!
//! | Bit | Meaning                              |
//! |-----|--------------------------------------|
//! | 7   | R/W: 1 = read, 0 = write             |
//! | 6   | Burst: access consecutive addresses  |
//! | 5:0 | Register address or strobe           |
//!
//! While the header is clocked out the chip clocks back its status byte, so
//! every operation returns a [`StatusByte`].
//!
//! # Example
//! ```no_run
//! use cc2500::{Device, SpiTransport, Strobe, Error};
//! # fn run<SPI, CS, RDY, D>(spi: SPI, cs: CS, so: RDY, delay: D) -> Result<(), Error>
//! # where SPI: embedded_hal::spi::SpiBus, CS: embedded_hal::digital::OutputPin,
//! #       RDY: embedded_hal::digital::InputPin, D: embedded_hal::delay::DelayNs {
//! let mut transport = SpiTransport::new(spi, cs, so, delay);
//! transport.init()?;
//! let mut device = Device::new(transport);
//!
//! let status = device.strobe(Strobe::Idle)?;
//! let (_, channel) = device.read_single(cc2500::registers::address::CHANNR)?;
//! # let _ = (status, channel);
//! # Ok(())
//! # }
//! ```

use regiface::{ByteArray, ReadableRegister, WritableRegister};

use crate::commands::Strobe;
use crate::error::{ConfigError, Error};
use crate::registers::{
    address, MarcState, PartNumber, RxBytes, TxBytes, Version, BURST, FIFO_SIZE, READ,
};
use crate::status::StatusByte;
use crate::transport::Transport;

/// Main device interface for the CC2500.
///
/// Wraps a [`Transport`] and exposes single, burst and strobe access. Every
/// method issues exactly one select/deselect pair; chip-select is released even
/// when the exchange fails.
pub struct Device<T> {
    transport: T,
}

impl<T> Device<T> {
    /// Creates a new Device instance wrapping the provided transport.
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Releases the underlying transport.
    pub fn release(self) -> T {
        self.transport
    }
}

fn check_address(addr: u8) -> Result<(), Error> {
    if addr > address::FIFO {
        return Err(ConfigError::AddressOutOfRange(addr).into());
    }
    Ok(())
}

fn check_writable(addr: u8) -> Result<(), Error> {
    check_address(addr)?;
    if address::is_status(addr) {
        return Err(ConfigError::ReadOnlyRegister(addr).into());
    }
    Ok(())
}

/// A burst stays inside the configuration block, reads a single status
/// register, or moves at most [`FIFO_SIZE`] bytes through PATABLE or the FIFO.
fn check_burst(addr: u8, len: usize) -> Result<(), Error> {
    if len == 0 || len > FIFO_SIZE {
        return Err(ConfigError::BurstLength(len).into());
    }
    let last = usize::from(addr) + len - 1;
    let spills = if addr <= address::LAST_CONFIG {
        last > usize::from(address::LAST_CONFIG)
    } else {
        addr < address::PATABLE && len > 1
    };
    if spills {
        return Err(ConfigError::BurstLength(len).into());
    }
    Ok(())
}

impl<T> Device<T>
where
    T: Transport,
{
    fn transaction<R>(
        &mut self,
        f: impl FnOnce(&mut T) -> Result<R, Error>,
    ) -> Result<R, Error> {
        self.transport.select()?;
        let result = f(&mut self.transport);
        let released = self.transport.deselect();
        let value = result?;
        released?;
        Ok(value)
    }

    /// Reads one register.
    ///
    /// Status registers (0x30..=0x3D) are read with the burst bit set, the only
    /// framing the chip does not interpret as a strobe.
    ///
    /// # Errors
    /// * [`ConfigError::AddressOutOfRange`] - `addr` above 0x3F
    pub fn read_single(&mut self, addr: u8) -> Result<(StatusByte, u8), Error> {
        check_address(addr)?;
        let header = if address::is_status(addr) {
            addr | READ | BURST
        } else {
            addr | READ
        };

        let mut frame = [header, 0x00];
        self.transaction(|t| t.exchange(&mut frame))?;

        trace!("read {:#x} = {:#x}", addr, frame[1]);
        Ok((StatusByte(frame[0]), frame[1]))
    }

    /// Reads `values.len()` consecutive registers starting at `addr`.
    ///
    /// At the FIFO address every byte is popped from the RX FIFO.
    ///
    /// # Errors
    /// * [`ConfigError::BurstLength`] - empty, longer than the FIFO, or
    ///   running past TEST0 or over a status register
    pub fn burst_read(&mut self, addr: u8, values: &mut [u8]) -> Result<StatusByte, Error> {
        check_address(addr)?;
        check_burst(addr, values.len())?;

        let len = values.len();
        let mut header = [addr | READ | BURST];
        values.fill(0);
        self.transaction(|t| {
            t.exchange(&mut header)?;
            t.exchange(values)
        })?;

        trace!("burst read {:#x} x{}", addr, len);
        Ok(StatusByte(header[0]))
    }

    /// Writes one register.
    ///
    /// # Errors
    /// * [`ConfigError::AddressOutOfRange`] - `addr` above 0x3F
    /// * [`ConfigError::ReadOnlyRegister`] - `addr` is a status register
    pub fn write_single(&mut self, addr: u8, value: u8) -> Result<StatusByte, Error> {
        check_writable(addr)?;

        let mut frame = [addr, value];
        self.transaction(|t| t.exchange(&mut frame))?;

        trace!("write {:#x} <- {:#x}", addr, value);
        Ok(StatusByte(frame[0]))
    }

    /// Writes consecutive registers starting at `addr`.
    ///
    /// At the FIFO address every byte is pushed into the TX FIFO.
    pub fn burst_write(&mut self, addr: u8, values: &[u8]) -> Result<StatusByte, Error> {
        check_writable(addr)?;
        check_burst(addr, values.len())?;

        let mut header = [addr | BURST];
        self.transaction(|t| {
            t.exchange(&mut header)?;
            t.write(values)
        })?;

        trace!("burst write {:#x} x{}", addr, values.len());
        Ok(StatusByte(header[0]))
    }

    /// Issues a command strobe.
    pub fn strobe(&mut self, strobe: Strobe) -> Result<StatusByte, Error> {
        let mut header = [strobe.addr() | READ];
        self.transaction(|t| t.exchange(&mut header))?;

        trace!("strobe {:?} -> {:#x}", strobe, header[0]);
        Ok(StatusByte(header[0]))
    }

    /// Samples the status byte with the RX FIFO count.
    pub fn read_status(&mut self) -> Result<StatusByte, Error> {
        self.strobe(Strobe::Nop)
    }

    /// Samples the status byte with the TX FIFO free-space count.
    pub fn write_status(&mut self) -> Result<StatusByte, Error> {
        let mut header = [Strobe::Nop.addr()];
        self.transaction(|t| t.exchange(&mut header))?;
        Ok(StatusByte(header[0]))
    }

    /// Issues SRES and holds chip-select until the chip reports ready again.
    pub fn reset(&mut self) -> Result<StatusByte, Error> {
        let mut header = [Strobe::Reset.addr() | READ];
        self.transaction(|t| {
            t.exchange(&mut header)?;
            t.wait_ready()
        })?;

        debug!("transceiver reset");
        Ok(StatusByte(header[0]))
    }

    /// Reads a typed register value from the device.
    ///
    /// # Errors
    /// * [`Error::RegisterEncoding`] - the raw value holds a reserved encoding
    pub fn read_register<R>(&mut self) -> Result<R, Error>
    where
        R: ReadableRegister<IdType = u8>,
    {
        let mut raw = R::Array::new();
        let bytes = raw.as_mut();
        if bytes.len() == 1 {
            bytes[0] = self.read_single(R::id())?.1;
        } else {
            self.burst_read(R::id(), bytes)?;
        }

        R::from_bytes(raw).map_err(|_| Error::RegisterEncoding)
    }

    /// Writes a typed register value to the device.
    pub fn write_register<R>(&mut self, register: R) -> Result<StatusByte, Error>
    where
        R: WritableRegister<IdType = u8>,
    {
        let raw = register.to_bytes().map_err(|_| Error::RegisterEncoding)?;
        let bytes = raw.as_ref();
        if bytes.len() == 1 {
            self.write_single(R::id(), bytes[0])
        } else {
            self.burst_write(R::id(), bytes)
        }
    }

    /// Pops `bytes.len()` bytes from the RX FIFO.
    pub fn read_fifo(&mut self, bytes: &mut [u8]) -> Result<StatusByte, Error> {
        self.burst_read(address::FIFO, bytes)
    }

    /// Pushes `bytes` into the TX FIFO.
    pub fn write_fifo(&mut self, bytes: &[u8]) -> Result<StatusByte, Error> {
        self.burst_write(address::FIFO, bytes)
    }

    pub fn rx_bytes(&mut self) -> Result<RxBytes, Error> {
        self.read_register()
    }

    pub fn tx_bytes(&mut self) -> Result<TxBytes, Error> {
        self.read_register()
    }

    /// Reads MARCSTATE.
    pub fn marc_state(&mut self) -> Result<MarcState, Error> {
        self.read_register()
    }

    /// Reads PARTNUM and VERSION.
    pub fn part_info(&mut self) -> Result<(PartNumber, Version), Error> {
        Ok((self.read_register()?, self.read_register()?))
    }

    /// Blocks on the transport's delay provider.
    pub fn delay_us(&mut self, us: u32) {
        self.transport.delay_us(us);
    }
}
