//! Link protocol
//!
//! One-way telemetry between two identical nodes. The REMOTE node samples a
//! 10-bit reading, transmits it and sleeps for one period; the BASE node
//! listens, and forwards every valid payload byte-for-byte to its host link.
//!
//! Both roles share the same sequence around a radio operation:
//!
//! 1. flush the FIFO for the direction about to be used
//! 2. [`arm`](CompletionSignal::arm) the completion signal with that direction
//! 3. strobe SRX / STX
//! 4. sleep until the GDO0 edge wakes the loop, bounded by
//!    [`Timeouts::completion_us`]
//!
//! A missed edge idles the radio and surfaces as
//! [`Error::HardwareTimeout`]; an inconsistent FIFO resynchronizes the chip
//! (SIDLE, SFRX, SFTX) and surfaces as [`Error::ProtocolViolation`]. Both are
//! retried by [`Link::run`].

mod config;
mod packet;
mod signal;

pub use config::{LinkConfig, Timeouts, DEFAULT_CHANNEL};
pub use packet::{Reading, PAYLOAD_LEN, READING_MAX};
pub use signal::{forward_edge, CompletionSignal};

use core::convert::Infallible;

use embedded_hal::delay::DelayNs;

use crate::commands::Strobe;
use crate::device::Device;
use crate::error::{ConfigError, Error, TimeoutSource, Violation};
use crate::registers::CC2500_PARTNUM;
use crate::status::{ChipState, StatusByte};
use crate::transport::Transport;

/// Node role, chosen at start-up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Role {
    /// Receives readings and forwards them to the host
    Base,
    /// Samples and transmits readings
    Remote,
}

/// Direction of the outstanding radio operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Rx,
    Tx,
}

impl Direction {
    pub(crate) const fn to_raw(self) -> u8 {
        match self {
            Direction::Rx => 1,
            Direction::Tx => 2,
        }
    }

    pub(crate) const fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            1 => Some(Direction::Rx),
            2 => Some(Direction::Tx),
            _ => None,
        }
    }
}

/// Where the control loop currently is within a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    Idle,
    FlushRx,
    ArmRx,
    WaitRx,
    DrainFifo,
    Forward,
    Sample,
    FlushTx,
    Transmit,
    WaitTx,
    Resync,
}

/// Outcome of a successful step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// BASE forwarded a payload to the host
    Delivered(Reading),
    /// BASE woke with an empty FIFO. The packet failed CRC and was flushed by
    /// the chip.
    Empty,
    /// REMOTE transmitted a reading
    Transmitted(Reading),
}

/// Running counters for one link session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkStats {
    pub delivered: u32,
    pub transmitted: u32,
    pub empty: u32,
    pub timeouts: u32,
    pub resyncs: u32,
}

/// Source of readings for the REMOTE role
pub trait Sampler {
    type Error;

    /// Takes one reading. Values above [`READING_MAX`] are rejected by the
    /// link.
    fn sample(&mut self) -> Result<u16, Self::Error>;
}

/// Pacing between REMOTE transmissions
pub trait Cadence {
    fn wait_period(&mut self);
}

/// [`Cadence`] of a fixed period on a [`DelayNs`]
pub struct Periodic<D> {
    delay: D,
    period_ms: u32,
}

impl<D> Periodic<D> {
    pub fn new(delay: D, period_ms: u32) -> Self {
        Self { delay, period_ms }
    }
}

impl<D: DelayNs> Cadence for Periodic<D> {
    fn wait_period(&mut self) {
        self.delay.delay_ms(self.period_ms);
    }
}

/// Placeholder for the collaborators a role does not use
///
/// BASE never samples and REMOTE never forwards, so either can pass
/// `&mut Unused` in the other slot of [`Link::step`] and [`Link::run`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Unused;

/// Error returned by the [`Sampler`] impl of [`Unused`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoSampler;

impl Sampler for Unused {
    type Error = NoSampler;

    fn sample(&mut self) -> Result<u16, NoSampler> {
        Err(NoSampler)
    }
}

impl Cadence for Unused {
    fn wait_period(&mut self) {}
}

impl embedded_io::ErrorType for Unused {
    type Error = Infallible;
}

impl embedded_io::Write for Unused {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Infallible> {
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Infallible> {
        Ok(())
    }
}

/// Link session: a configured transceiver plus the role's control loop
pub struct Link<'a, T> {
    device: Device<T>,
    signal: &'a CompletionSignal,
    config: LinkConfig,
    phase: Phase,
    stats: LinkStats,
}

impl<'a, T> Link<'a, T> {
    /// Validates `config`. No bus traffic is generated.
    ///
    /// # Errors
    /// * [`Error::Configuration`] - see [`LinkConfig::validate`]
    pub fn new(
        device: Device<T>,
        signal: &'a CompletionSignal,
        config: LinkConfig,
    ) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self {
            device,
            signal,
            config,
            phase: Phase::Idle,
            stats: LinkStats::default(),
        })
    }

    pub fn role(&self) -> Role {
        self.config.role
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn stats(&self) -> LinkStats {
        self.stats
    }

    pub fn device(&mut self) -> &mut Device<T> {
        &mut self.device
    }

    pub fn release(self) -> Device<T> {
        self.device
    }
}

impl<'a, T> Link<'a, T>
where
    T: Transport,
{
    /// Brings the transceiver up for the configured role.
    ///
    /// Checks the part number, loads the profile, applies the packet layer,
    /// channel and output power, then idles the radio with both FIFOs empty.
    ///
    /// # Errors
    /// * [`Violation::UnknownPart`] - PARTNUM is not a CC2500
    /// * [`ConfigError::CrcFilterDisabled`] - BASE only, the CRC filter did
    ///   not read back enabled and [`LinkConfig::require_crc_filter`] is set
    pub fn start(&mut self) -> Result<(), Error> {
        let (part, version) = self.device.part_info()?;
        if part.value != CC2500_PARTNUM {
            error!("unexpected part number {:#x}", part.value);
            return Err(Violation::UnknownPart(part.value).into());
        }
        debug!("CC2500 version {:#x}", version.value);

        self.device.load_profile(self.config.profile)?;
        self.device.setup_packet_mode(&self.config.packet)?;
        self.device.set_channel(self.config.channel)?;
        self.device.set_tx_power(self.config.tx_power)?;

        self.device.strobe(Strobe::Idle)?;
        self.device.strobe(Strobe::FlushRx)?;
        self.device.strobe(Strobe::FlushTx)?;

        if self.config.role == Role::Base && !self.device.crc_filter_enabled()? {
            if self.config.require_crc_filter {
                error!("CRC filter disabled, refusing to start");
                return Err(ConfigError::CrcFilterDisabled.into());
            }
            warn!("CRC filter disabled, received payloads are unchecked");
        }

        self.phase = Phase::Idle;
        info!("link started as {:?}", self.config.role);
        Ok(())
    }

    /// Runs one iteration of the role's loop.
    ///
    /// Recovery has already happened when a transient error is returned:
    /// after a completion timeout the radio is idle, after a protocol
    /// violation it is idle with both FIFOs flushed.
    pub fn step<S, H>(&mut self, sampler: &mut S, host: &mut H) -> Result<Event, Error>
    where
        S: Sampler,
        H: embedded_io::Write,
    {
        let result = match self.config.role {
            Role::Base => self.receive(host),
            Role::Remote => self.transmit(sampler),
        };

        match result {
            Ok(event) => {
                self.phase = Phase::Idle;
                Ok(event)
            }
            Err(e) => Err(self.recover(e)),
        }
    }

    /// Runs the role's loop until a non-transient error.
    ///
    /// REMOTE waits one `cadence` period after every attempt, successful or
    /// not. BASE re-arms immediately and ignores `cadence`.
    pub fn run<S, H, C>(&mut self, sampler: &mut S, host: &mut H, cadence: &mut C) -> Error
    where
        S: Sampler,
        H: embedded_io::Write,
        C: Cadence,
    {
        loop {
            match self.step(sampler, host) {
                Ok(event) => trace!("{:?}", event),
                Err(e) if e.is_transient() => warn!("link step failed: {:?}", e),
                Err(e) => {
                    error!("link halted: {:?}", e);
                    return e;
                }
            }

            if self.config.role == Role::Remote {
                cadence.wait_period();
            }
        }
    }

    /// Forces the radio to IDLE and empties both FIFOs.
    pub fn resync(&mut self) -> Result<(), Error> {
        self.phase = Phase::Resync;
        self.signal.disarm();
        self.device.strobe(Strobe::Idle)?;
        self.device.strobe(Strobe::FlushRx)?;
        self.device.strobe(Strobe::FlushTx)?;
        self.stats.resyncs += 1;
        self.phase = Phase::Idle;
        Ok(())
    }

    fn receive<H>(&mut self, host: &mut H) -> Result<Event, Error>
    where
        H: embedded_io::Write,
    {
        self.phase = Phase::FlushRx;
        self.device.strobe(Strobe::FlushRx)?;

        self.phase = Phase::ArmRx;
        self.signal.arm(Direction::Rx);
        let status = self.device.strobe(Strobe::Rx)?;
        check_state(status)?;

        self.phase = Phase::WaitRx;
        self.wait_completion(Direction::Rx)?;

        self.phase = Phase::DrainFifo;
        let rx = self.device.rx_bytes()?;
        if rx.overflow {
            return Err(Violation::RxOverflow.into());
        }
        match usize::from(rx.count) {
            0 => {
                debug!("woke with an empty RX FIFO");
                self.stats.empty += 1;
                return Ok(Event::Empty);
            }
            PAYLOAD_LEN => {}
            _ => return Err(Violation::FifoCount(rx.count).into()),
        }

        let mut payload = [0u8; PAYLOAD_LEN];
        self.device.read_fifo(&mut payload)?;

        self.phase = Phase::Forward;
        host.write_all(&payload).map_err(|_| Error::HostLink)?;
        host.flush().map_err(|_| Error::HostLink)?;

        let reading = Reading::decode(payload);
        self.stats.delivered += 1;
        Ok(Event::Delivered(reading))
    }

    fn transmit<S>(&mut self, sampler: &mut S) -> Result<Event, Error>
    where
        S: Sampler,
    {
        self.phase = Phase::Sample;
        let raw = sampler.sample().map_err(|_| Error::Sampler)?;
        let reading = Reading::new(raw).ok_or(Violation::ReadingOutOfRange(raw))?;

        self.phase = Phase::FlushTx;
        self.device.strobe(Strobe::FlushTx)?;

        self.phase = Phase::Transmit;
        self.device.write_fifo(&reading.encode())?;
        self.signal.arm(Direction::Tx);
        let status = self.device.strobe(Strobe::Tx)?;
        check_state(status)?;

        self.phase = Phase::WaitTx;
        self.wait_completion(Direction::Tx)?;

        let tx = self.device.tx_bytes()?;
        if tx.underflow {
            return Err(Violation::TxUnderflow.into());
        }

        self.stats.transmitted += 1;
        Ok(Event::Transmitted(reading))
    }

    fn wait_completion(&mut self, expected: Direction) -> Result<(), Error> {
        let Timeouts {
            completion_us,
            poll_us,
        } = self.config.timeouts;
        let device = &mut self.device;
        self.signal
            .wait_blocking(expected, completion_us, poll_us, |us| device.delay_us(us))
    }

    /// Idles the radio after a missed completion edge.
    fn cancel(&mut self) -> Result<(), Error> {
        let marc = self.device.marc_state()?;
        warn!(
            "no completion edge in {:?}, MARCSTATE {:#x}",
            self.phase,
            marc.state
        );
        self.device.strobe(Strobe::Idle)?;
        Ok(())
    }

    /// Brings the radio back to a known state after a failed step and hands
    /// the error back to the caller.
    fn recover(&mut self, e: Error) -> Error {
        self.signal.disarm();
        let restored = match e {
            Error::HardwareTimeout(TimeoutSource::Completion) => {
                self.stats.timeouts += 1;
                self.cancel()
            }
            Error::ProtocolViolation(v) => {
                warn!("protocol violation in {:?}: {:?}", self.phase, v);
                self.resync()
            }
            _ => Ok(()),
        };
        self.phase = Phase::Idle;

        match restored {
            Ok(()) => e,
            Err(fatal) => fatal,
        }
    }
}

/// SRX and STX are only issued from IDLE. The status byte answering them is
/// sampled before the strobe takes effect.
fn check_state(status: StatusByte) -> Result<(), Error> {
    if !status.chip_ready() {
        return Err(Violation::ChipNotReady.into());
    }
    match status.state() {
        ChipState::Idle | ChipState::Calibrate | ChipState::Settling => Ok(()),
        state => Err(Violation::UnexpectedState(state).into()),
    }
}
