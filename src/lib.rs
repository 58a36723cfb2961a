#![cfg_attr(not(test), no_std)]
//! CC2500 Telemetry Link
//!
//! This crate drives a TI CC2500 2.4 GHz transceiver over SPI and runs a
//! one-way telemetry link on top of it: a REMOTE node periodically samples a
//! 10-bit reading and transmits it, a BASE node receives it and forwards the
//! raw payload to a host link.
//!
//! # Features
//! - Register-level access with the chip's header byte framing
//!   (single, burst, strobe and status-register reads)
//! - Chip-select gating with a bounded wait on the SO ready line
//! - Bulk RF profile loading plus a typed packet-handling layer
//! - Interrupt or async driven completion signal on GDO0
//! - Optional `defmt` or `log` output
//!
//! # Architecture
//! The driver is organized into several layers:
//!
//! - [`transport`]: CS-gated SPI exchanges over an [`embedded_hal::spi::SpiBus`]
//!   - [`SpiTransport`] owns the bus, chip-select, ready line and a delay
//!
//! - [`device`]: header byte framing and register access
//!   - [`registers`]: typed configuration and status registers
//!   - [`commands`]: command strobes
//!   - [`status`]: the status byte returned by every transaction
//!
//! - [`profile`]: RF profile table, output power and packet mode
//!
//! - [`link`]: the BASE/REMOTE control loop
//!   - [`link::CompletionSignal`]: wake-up channel from the GDO0 edge
//!
//! # Usage
//! Configuration follows a specific sequence:
//!
//! 1. Wrap the SPI bus and pins in a [`SpiTransport`] and call `init`
//! 2. Create a [`Device`] and a [`Link`] with a [`LinkConfig`]
//! 3. [`Link::start`] checks the part number, loads the profile and applies
//!    the packet layer
//! 4. Route the GDO0 falling edge to [`CompletionSignal::on_edge`]
//! 5. Call [`Link::run`], or [`Link::step`] from your own loop
//!
//! # Important Notes
//! - The SPI bus must run in mode 0 at no more than 6.5 MHz
//! - Addresses 0x30..=0x3D are strobes on a plain access; status registers
//!   are only readable with the burst bit set
//! - Only one RX or TX operation is outstanding at a time
//!
//! # Example
//! ```no_run
//! use embedded_hal::delay::DelayNs;
//! use embedded_hal::digital::{InputPin, OutputPin};
//! use embedded_hal::spi::SpiBus;
//! use cc2500::{CompletionSignal, Device, Error, Link, LinkConfig, SpiTransport, Unused};
//!
//! static SIGNAL: CompletionSignal = CompletionSignal::new();
//!
//! fn base<SPI, CS, RDY, D, H>(spi: SPI, cs: CS, so: RDY, delay: D, host: &mut H) -> Error
//! where
//!     SPI: SpiBus,
//!     CS: OutputPin,
//!     RDY: InputPin,
//!     D: DelayNs,
//!     H: embedded_io::Write,
//! {
//!     let mut transport = SpiTransport::new(spi, cs, so, delay);
//!     if let Err(e) = transport.init() {
//!         return e;
//!     }
//!
//!     let mut link = match Link::new(Device::new(transport), &SIGNAL, LinkConfig::base()) {
//!         Ok(link) => link,
//!         Err(e) => return e,
//!     };
//!     if let Err(e) = link.start() {
//!         return e;
//!     }
//!
//!     // The GDO0 interrupt handler calls `SIGNAL.on_edge()`.
//!     link.run(&mut Unused, host, &mut Unused)
//! }
//! ```

mod fmt;

pub mod commands;
pub mod device;
pub mod error;
pub mod link;
pub mod profile;
pub mod registers;
pub mod status;
pub mod transport;

pub use commands::Strobe;
pub use device::Device;
pub use error::{ConfigError, Error, TimeoutSource, Violation};
pub use link::{
    CompletionSignal, Direction, Event, Link, LinkConfig, LinkStats, Reading, Role, Sampler,
    Unused,
};
pub use profile::{PacketConfig, ProfileId, TxPower};
pub use status::{ChipState, StatusByte};
pub use transport::{SpiTransport, Transport};
