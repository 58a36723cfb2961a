//! SPI transport
//!
//! The CC2500 needs more than an [`SpiDevice`](embedded_hal::spi::SpiDevice)
//! offers: after chip-select goes low the host must watch the SO line (shared
//! with MISO) and wait until the chip pulls it low before clocking the header.
//! The same line signals the end of a reset. The transport therefore owns the
//! raw [`SpiBus`], the chip-select pin and a readable copy of SO, and runs the
//! select/exchange/deselect sequence itself.
//!
//! Every wait on the ready line is bounded; an expired wait deasserts
//! chip-select and surfaces [`Error::HardwareTimeout`].

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::{Mode, SpiBus, MODE_0};

use crate::error::{Error, TimeoutSource};

/// SPI mode expected by the transceiver: CPOL = 0, CPHA = 0, MSB first
pub const SPI_MODE: Mode = MODE_0;

/// Highest SCLK frequency valid for burst access
pub const MAX_SPI_FREQUENCY_HZ: u32 = 6_500_000;

/// Default bound on a ready-line wait. Covers crystal start-up after a reset.
pub const DEFAULT_READY_TIMEOUT_US: u32 = 2_000;

const READY_POLL_US: u32 = 10;

/// Number of sleeps of `poll_us` that cover `timeout_us`. A zero interval
/// still yields a finite count.
pub(crate) fn poll_budget(timeout_us: u32, poll_us: u32) -> u32 {
    timeout_us.div_ceil(poll_us.max(1))
}

/// Byte-level access to the transceiver.
///
/// Callers bracket every exchange with exactly one [`select`](Transport::select)
/// / [`deselect`](Transport::deselect) pair.
pub trait Transport {
    /// Assert chip-select and wait for the chip to signal readiness.
    fn select(&mut self) -> Result<(), Error>;

    /// Release chip-select.
    fn deselect(&mut self) -> Result<(), Error>;

    /// Full-duplex exchange in place. Each byte is replaced by the byte
    /// clocked in while it was sent.
    fn exchange(&mut self, bytes: &mut [u8]) -> Result<(), Error>;

    /// Exchange discarding the received bytes.
    fn write(&mut self, bytes: &[u8]) -> Result<(), Error>;

    /// Wait for the ready line while selected.
    fn wait_ready(&mut self) -> Result<(), Error>;

    /// Block for `us` microseconds. Boards that sleep between polls do it here.
    fn delay_us(&mut self, us: u32);
}

/// [`Transport`] over embedded-hal bus, pin and delay traits.
pub struct SpiTransport<SPI, CS, RDY, D> {
    spi: SPI,
    cs: CS,
    ready: RDY,
    delay: D,
    ready_timeout_us: u32,
}

impl<SPI, CS, RDY, D> SpiTransport<SPI, CS, RDY, D> {
    /// Creates a transport. `ready` must read the SO/MISO line.
    pub fn new(spi: SPI, cs: CS, ready: RDY, delay: D) -> Self {
        Self {
            spi,
            cs,
            ready,
            delay,
            ready_timeout_us: DEFAULT_READY_TIMEOUT_US,
        }
    }

    /// Overrides the ready-line bound.
    pub fn with_ready_timeout(mut self, timeout_us: u32) -> Self {
        self.ready_timeout_us = timeout_us;
        self
    }

    /// Releases the bus, pins and delay provider.
    pub fn release(self) -> (SPI, CS, RDY, D) {
        (self.spi, self.cs, self.ready, self.delay)
    }
}

impl<SPI, CS, RDY, D> SpiTransport<SPI, CS, RDY, D>
where
    CS: OutputPin,
{
    /// Puts the chip-select line into its idle (deasserted) state.
    ///
    /// Bus mode and clock divider belong to the HAL; configure the bus with
    /// [`SPI_MODE`] and at most [`MAX_SPI_FREQUENCY_HZ`] before calling this.
    pub fn init(&mut self) -> Result<(), Error> {
        self.cs.set_high().map_err(|_| Error::Bus)
    }
}

impl<SPI, CS, RDY, D> Transport for SpiTransport<SPI, CS, RDY, D>
where
    SPI: SpiBus,
    CS: OutputPin,
    RDY: InputPin,
    D: DelayNs,
{
    fn select(&mut self) -> Result<(), Error> {
        self.cs.set_low().map_err(|_| Error::Bus)?;

        if let Err(e) = self.wait_ready() {
            warn!("ready line stuck high, releasing chip-select");
            // The timeout is reported over any pin error here.
            let _ = self.cs.set_high();
            return Err(e);
        }
        Ok(())
    }

    fn deselect(&mut self) -> Result<(), Error> {
        self.spi.flush().map_err(|_| Error::Bus)?;
        self.cs.set_high().map_err(|_| Error::Bus)
    }

    fn exchange(&mut self, bytes: &mut [u8]) -> Result<(), Error> {
        self.spi.transfer_in_place(bytes).map_err(|_| Error::Bus)
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.spi.write(bytes).map_err(|_| Error::Bus)
    }

    fn wait_ready(&mut self) -> Result<(), Error> {
        let mut polls = poll_budget(self.ready_timeout_us, READY_POLL_US);
        loop {
            if self.ready.is_low().map_err(|_| Error::Bus)? {
                return Ok(());
            }
            if polls == 0 {
                return Err(Error::HardwareTimeout(TimeoutSource::ReadyLine));
            }
            polls -= 1;
            self.delay.delay_us(READY_POLL_US);
        }
    }

    fn delay_us(&mut self, us: u32) {
        self.delay.delay_us(us);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use core::cell::Cell;
    use core::convert::Infallible;

    /// Echoes every byte back inverted and records what was sent.
    #[derive(Default)]
    struct InvertingBus {
        sent: Vec<u8>,
        flushes: usize,
    }

    impl embedded_hal::spi::ErrorType for InvertingBus {
        type Error = Infallible;
    }

    impl SpiBus for InvertingBus {
        fn read(&mut self, words: &mut [u8]) -> Result<(), Infallible> {
            for w in words.iter_mut() {
                self.sent.push(0);
                *w = 0xFF;
            }
            Ok(())
        }

        fn write(&mut self, words: &[u8]) -> Result<(), Infallible> {
            self.sent.extend_from_slice(words);
            Ok(())
        }

        fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Infallible> {
            for (i, w) in write.iter().enumerate() {
                self.sent.push(*w);
                if let Some(r) = read.get_mut(i) {
                    *r = !*w;
                }
            }
            Ok(())
        }

        fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), Infallible> {
            for w in words.iter_mut() {
                self.sent.push(*w);
                *w = !*w;
            }
            Ok(())
        }

        fn flush(&mut self) -> Result<(), Infallible> {
            self.flushes += 1;
            Ok(())
        }
    }

    struct Pin<'a>(&'a Cell<bool>);

    impl embedded_hal::digital::ErrorType for Pin<'_> {
        type Error = Infallible;
    }

    impl OutputPin for Pin<'_> {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.0.set(false);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.0.set(true);
            Ok(())
        }
    }

    /// Reads high for the first `busy` polls.
    struct ReadyLine {
        busy: usize,
    }

    impl embedded_hal::digital::ErrorType for ReadyLine {
        type Error = Infallible;
    }

    impl InputPin for ReadyLine {
        fn is_high(&mut self) -> Result<bool, Infallible> {
            if self.busy > 0 {
                self.busy -= 1;
                Ok(true)
            } else {
                Ok(false)
            }
        }

        fn is_low(&mut self) -> Result<bool, Infallible> {
            self.is_high().map(|high| !high)
        }
    }

    #[derive(Default)]
    struct CountingDelay {
        ns: u64,
    }

    impl DelayNs for CountingDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.ns += u64::from(ns);
        }
    }

    #[test]
    fn select_waits_for_ready_then_exchanges_full_duplex() {
        let cs = Cell::new(false);
        let mut transport = SpiTransport::new(
            InvertingBus::default(),
            Pin(&cs),
            ReadyLine { busy: 3 },
            CountingDelay::default(),
        );
        transport.init().unwrap();
        assert!(cs.get());

        transport.select().unwrap();
        assert!(!cs.get());

        let mut bytes = [0x30, 0x0F];
        transport.exchange(&mut bytes).unwrap();
        assert_eq!(bytes, [0xCF, 0xF0]);

        transport.deselect().unwrap();
        assert!(cs.get());

        let (bus, _, _, delay) = transport.release();
        assert_eq!(bus.sent, [0x30, 0x0F]);
        assert_eq!(bus.flushes, 1);
        assert_eq!(delay.ns, 3 * u64::from(READY_POLL_US) * 1_000);
    }

    #[test]
    fn stuck_ready_line_times_out_and_releases_chip_select() {
        let cs = Cell::new(true);
        let mut transport = SpiTransport::new(
            InvertingBus::default(),
            Pin(&cs),
            ReadyLine { busy: usize::MAX },
            CountingDelay::default(),
        )
        .with_ready_timeout(100);

        assert_eq!(
            transport.select(),
            Err(Error::HardwareTimeout(TimeoutSource::ReadyLine))
        );
        assert!(cs.get());

        let (bus, _, _, _) = transport.release();
        assert!(bus.sent.is_empty());
    }

    #[test]
    fn poll_budget_is_finite_for_any_timeout() {
        assert_eq!(poll_budget(u32::MAX, READY_POLL_US), 429_496_730);
        assert_eq!(poll_budget(u32::MAX, 0), u32::MAX);
        assert_eq!(poll_budget(25, READY_POLL_US), 3);
        assert_eq!(poll_budget(0, READY_POLL_US), 0);
    }

    #[test]
    fn ready_wait_rounds_a_partial_poll_up() {
        let cs = Cell::new(true);
        let mut transport = SpiTransport::new(
            InvertingBus::default(),
            Pin(&cs),
            ReadyLine { busy: usize::MAX },
            CountingDelay::default(),
        )
        .with_ready_timeout(25);

        assert_eq!(
            transport.select(),
            Err(Error::HardwareTimeout(TimeoutSource::ReadyLine))
        );

        let (_, _, _, delay) = transport.release();
        assert_eq!(delay.ns, 30_000);
    }
}
