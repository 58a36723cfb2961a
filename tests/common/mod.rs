//! Simulated CC2500 behind embedded-hal bus, pin and delay traits.
//!
//! The chip decodes header bytes the way the silicon does, keeps both FIFOs,
//! and completes RX/TX operations as simulated time advances through the
//! delay provider. Two chips sharing one [`Air`] queue talk to each other.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;

use cc2500::link::CompletionSignal;
use cc2500::{Device, SpiTransport};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{self, InputPin, OutputPin};
use embedded_hal::spi::{self, SpiBus};

pub const IDLE: u8 = 0;
pub const RX: u8 = 1;
pub const TX: u8 = 2;
pub const RX_OVERFLOW: u8 = 6;
pub const TX_UNDERFLOW: u8 = 7;

const PKTLEN: usize = 0x06;
const PKTCTRL1: usize = 0x07;
const CRC_AUTOFLUSH: u8 = 1 << 3;
const FIFO_DEPTH: usize = 64;

/// A packet in flight
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AirPacket {
    pub bytes: Vec<u8>,
    pub crc_ok: bool,
}

impl AirPacket {
    pub fn good(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
            crc_ok: true,
        }
    }

    pub fn corrupt(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
            crc_ok: false,
        }
    }
}

pub type Air = Rc<RefCell<VecDeque<AirPacket>>>;

pub fn air() -> Air {
    Rc::new(RefCell::new(VecDeque::new()))
}

#[derive(Debug, Clone, Copy)]
struct Access {
    addr: u8,
    read: bool,
    burst: bool,
}

#[derive(Debug, Clone, Copy)]
enum Pending {
    Rx,
    Tx { remaining_us: u32 },
}

pub struct Chip {
    pub regs: [u8; 0x2F],
    pub patable: u8,
    pub state: u8,
    pub rx_fifo: VecDeque<u8>,
    pub tx_fifo: VecDeque<u8>,
    pub partnum: u8,
    pub version: u8,
    /// Bits forced low on write, per configuration register
    pub stuck_low: [u8; 0x2F],
    /// Every completed chip-select frame, MOSI side
    pub frames: Vec<Vec<u8>>,
    /// Ready line stays high after select
    pub so_stuck: bool,
    /// Status bytes carry CHIP_RDYn
    pub status_not_ready: bool,
    /// Ready line reads high this many times after the next select
    pub select_busy_polls: u32,
    pub air_time_us: u32,
    pub elapsed_us: u64,
    pub edges: u32,
    pub cs_low: bool,
    air: Air,
    frame: Vec<u8>,
    access: Option<Access>,
    busy_left: u32,
    pending: Option<Pending>,
}

impl Chip {
    fn new(air: Air) -> Self {
        Self {
            regs: [0; 0x2F],
            patable: 0xC6,
            state: IDLE,
            rx_fifo: VecDeque::new(),
            tx_fifo: VecDeque::new(),
            partnum: 0x80,
            version: 0x03,
            stuck_low: [0; 0x2F],
            frames: Vec::new(),
            so_stuck: false,
            status_not_ready: false,
            select_busy_polls: 0,
            air_time_us: 20_000,
            elapsed_us: 0,
            edges: 0,
            cs_low: false,
            air,
            frame: Vec::new(),
            access: None,
            busy_left: 0,
            pending: None,
        }
    }

    pub fn take_frames(&mut self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.frames)
    }

    fn status(&self, read: bool) -> u8 {
        let fifo = if read {
            self.rx_fifo.len()
        } else {
            FIFO_DEPTH - self.tx_fifo.len()
        };
        let not_ready = if self.status_not_ready { 0x80 } else { 0 };
        not_ready | (self.state << 4) | fifo.min(15) as u8
    }

    fn select(&mut self) {
        self.cs_low = true;
        self.busy_left = self.select_busy_polls;
        self.frame.clear();
        self.access = None;
    }

    fn deselect(&mut self) {
        if self.cs_low {
            self.frames.push(std::mem::take(&mut self.frame));
        }
        self.cs_low = false;
        self.access = None;
    }

    fn so_high(&mut self) -> bool {
        if self.so_stuck {
            return true;
        }
        if self.busy_left > 0 {
            self.busy_left -= 1;
            return true;
        }
        false
    }

    fn clock(&mut self, mosi: u8) -> u8 {
        self.frame.push(mosi);

        let Some(access) = self.access else {
            let addr = mosi & 0x3F;
            let read = mosi & 0x80 != 0;
            let burst = mosi & 0x40 != 0;
            let status = self.status(read);
            if (0x30..=0x3D).contains(&addr) && !burst {
                self.execute_strobe(addr);
            } else {
                self.access = Some(Access { addr, read, burst });
            }
            return status;
        };

        let miso = if access.read {
            self.read_addr(access.addr)
        } else {
            self.write_addr(access.addr, mosi);
            self.status(false)
        };

        if access.burst {
            if access.addr < 0x2E {
                self.access = Some(Access {
                    addr: access.addr + 1,
                    ..access
                });
            }
        } else {
            self.access = None;
        }
        miso
    }

    fn read_addr(&mut self, addr: u8) -> u8 {
        match addr {
            0x00..=0x2E => self.regs[addr as usize],
            0x30 => self.partnum,
            0x31 => self.version,
            0x35 => match self.state {
                RX => 0x0D,
                TX => 0x13,
                _ => 0x01,
            },
            0x3A => {
                let underflow = if self.state == TX_UNDERFLOW { 0x80 } else { 0 };
                underflow | self.tx_fifo.len() as u8
            }
            0x3B => {
                let overflow = if self.state == RX_OVERFLOW { 0x80 } else { 0 };
                overflow | self.rx_fifo.len() as u8
            }
            0x3E => self.patable,
            0x3F => self.rx_fifo.pop_front().unwrap_or(0),
            _ => 0,
        }
    }

    fn write_addr(&mut self, addr: u8, value: u8) {
        match addr {
            0x00..=0x2E => {
                let i = addr as usize;
                self.regs[i] = value & !self.stuck_low[i];
            }
            0x3E => self.patable = value,
            0x3F => {
                if self.tx_fifo.len() < FIFO_DEPTH {
                    self.tx_fifo.push_back(value);
                }
            }
            _ => {}
        }
    }

    fn execute_strobe(&mut self, addr: u8) {
        match addr {
            // SRES
            0x30 => {
                self.regs = [0; 0x2F];
                self.patable = 0xC6;
                self.state = IDLE;
                self.rx_fifo.clear();
                self.tx_fifo.clear();
                self.pending = None;
                self.busy_left = 3;
            }
            // SRX
            0x34 if self.state == IDLE => {
                self.state = RX;
                self.pending = Some(Pending::Rx);
            }
            // STX
            0x35 if self.state == IDLE => {
                self.state = TX;
                self.pending = Some(Pending::Tx {
                    remaining_us: self.air_time_us,
                });
            }
            // SIDLE
            0x36 => {
                if self.state == RX || self.state == TX {
                    self.state = IDLE;
                    self.pending = None;
                }
            }
            // SFRX
            0x3A if self.state == IDLE || self.state == RX_OVERFLOW => {
                self.rx_fifo.clear();
                self.state = IDLE;
            }
            // SFTX
            0x3B if self.state == IDLE || self.state == TX_UNDERFLOW => {
                self.tx_fifo.clear();
                self.state = IDLE;
            }
            _ => {}
        }
    }

    /// Advances simulated time. Returns true if GDO0 fell.
    fn advance(&mut self, us: u32) -> bool {
        self.elapsed_us += u64::from(us);

        let edge = match self.pending {
            Some(Pending::Rx) => {
                let Some(packet) = self.air.borrow_mut().pop_front() else {
                    return false;
                };
                self.receive(packet);
                true
            }
            Some(Pending::Tx { remaining_us }) if remaining_us > us => {
                self.pending = Some(Pending::Tx {
                    remaining_us: remaining_us - us,
                });
                false
            }
            Some(Pending::Tx { .. }) => {
                self.finish_tx();
                true
            }
            None => false,
        };

        if edge {
            self.edges += 1;
        }
        edge
    }

    fn receive(&mut self, packet: AirPacket) {
        self.pending = None;
        self.state = IDLE;

        let autoflush = self.regs[PKTCTRL1] & CRC_AUTOFLUSH != 0;
        if !packet.crc_ok && autoflush {
            return;
        }
        for byte in packet.bytes {
            if self.rx_fifo.len() == FIFO_DEPTH {
                self.state = RX_OVERFLOW;
                break;
            }
            self.rx_fifo.push_back(byte);
        }
    }

    fn finish_tx(&mut self) {
        self.pending = None;
        let len = usize::from(self.regs[PKTLEN]);
        if self.tx_fifo.len() < len {
            self.state = TX_UNDERFLOW;
            return;
        }
        let bytes: Vec<u8> = self.tx_fifo.drain(..len).collect();
        self.air.borrow_mut().push_back(AirPacket::good(&bytes));
        self.state = IDLE;
    }
}

pub type Handle = Rc<RefCell<Chip>>;

pub struct SimBus(Handle);

impl spi::ErrorType for SimBus {
    type Error = Infallible;
}

impl SpiBus for SimBus {
    fn read(&mut self, words: &mut [u8]) -> Result<(), Infallible> {
        let mut chip = self.0.borrow_mut();
        for word in words.iter_mut() {
            *word = chip.clock(0x00);
        }
        Ok(())
    }

    fn write(&mut self, words: &[u8]) -> Result<(), Infallible> {
        let mut chip = self.0.borrow_mut();
        for &word in words {
            chip.clock(word);
        }
        Ok(())
    }

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Infallible> {
        let mut chip = self.0.borrow_mut();
        for i in 0..read.len().max(write.len()) {
            let miso = chip.clock(write.get(i).copied().unwrap_or(0));
            if let Some(slot) = read.get_mut(i) {
                *slot = miso;
            }
        }
        Ok(())
    }

    fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), Infallible> {
        let mut chip = self.0.borrow_mut();
        for word in words.iter_mut() {
            *word = chip.clock(*word);
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Infallible> {
        Ok(())
    }
}

pub struct SimCs(Handle);

impl digital::ErrorType for SimCs {
    type Error = Infallible;
}

impl OutputPin for SimCs {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.0.borrow_mut().select();
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.0.borrow_mut().deselect();
        Ok(())
    }
}

pub struct SimSo(Handle);

impl digital::ErrorType for SimSo {
    type Error = Infallible;
}

impl InputPin for SimSo {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.0.borrow_mut().so_high())
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(!self.0.borrow_mut().so_high())
    }
}

/// Advances the chip and delivers GDO0 edges to the completion signal.
pub struct SimDelay<'s> {
    chip: Handle,
    signal: &'s CompletionSignal,
}

impl DelayNs for SimDelay<'_> {
    fn delay_ns(&mut self, ns: u32) {
        let edge = self.chip.borrow_mut().advance(ns.div_ceil(1_000));
        if edge {
            self.signal.on_edge();
        }
    }
}

pub type SimTransport<'s> = SpiTransport<SimBus, SimCs, SimSo, SimDelay<'s>>;

/// A simulated node: the driver side and a handle on the chip.
pub fn node<'s>(signal: &'s CompletionSignal, air: &Air) -> (Device<SimTransport<'s>>, Handle) {
    let chip = Rc::new(RefCell::new(Chip::new(air.clone())));
    let mut transport = SpiTransport::new(
        SimBus(chip.clone()),
        SimCs(chip.clone()),
        SimSo(chip.clone()),
        SimDelay {
            chip: chip.clone(),
            signal,
        },
    );
    transport.init().unwrap();
    chip.borrow_mut().take_frames();
    (Device::new(transport), chip)
}

/// Host link capturing forwarded bytes
#[derive(Default)]
pub struct HostSink {
    pub bytes: Vec<u8>,
    pub flushes: u32,
    pub fail: bool,
}

#[derive(Debug)]
pub struct HostDown;

impl embedded_io::Error for HostDown {
    fn kind(&self) -> embedded_io::ErrorKind {
        embedded_io::ErrorKind::BrokenPipe
    }
}

impl embedded_io::ErrorType for HostSink {
    type Error = HostDown;
}

impl embedded_io::Write for HostSink {
    fn write(&mut self, buf: &[u8]) -> Result<usize, HostDown> {
        if self.fail {
            return Err(HostDown);
        }
        self.bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), HostDown> {
        self.flushes += 1;
        Ok(())
    }
}

/// Sampler replaying a fixed list, then failing
pub struct Script(pub VecDeque<u16>);

impl Script {
    pub fn new(values: &[u16]) -> Self {
        Self(values.iter().copied().collect())
    }
}

#[derive(Debug)]
pub struct Exhausted;

impl cc2500::Sampler for Script {
    type Error = Exhausted;

    fn sample(&mut self) -> Result<u16, Exhausted> {
        self.0.pop_front().ok_or(Exhausted)
    }
}

/// Cadence counting periods instead of sleeping
#[derive(Default)]
pub struct CountingCadence(pub u32);

impl cc2500::link::Cadence for CountingCadence {
    fn wait_period(&mut self) {
        self.0 += 1;
    }
}
