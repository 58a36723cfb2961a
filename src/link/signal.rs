//! Completion signal
//!
//! GDO0 falls at the end of every RX and TX operation. The edge handler
//! (an interrupt, or an async task driving [`forward_edge`]) calls
//! [`CompletionSignal::on_edge`]; the control loop waits for the wake.
//!
//! The expected direction is the only state shared between the two sides:
//!
//! - the loop stores it in [`arm`](CompletionSignal::arm) before issuing the
//!   strobe, and clears it in [`disarm`](CompletionSignal::disarm) after the
//!   wait ends;
//! - the handler only reads it. An edge while disarmed is dropped, so a late
//!   edge from a cancelled operation cannot wake the next wait.
//!
//! The wake itself goes through a single-slot [`Signal`], which holds at most
//! one pending wake.

use core::sync::atomic::{AtomicU8, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embedded_hal_async::digital::Wait;

use super::Direction;
use crate::error::{Error, TimeoutSource, Violation};
use crate::transport::poll_budget;

const DISARMED: u8 = 0;

/// Wake-up channel between the GDO0 edge handler and the control loop
pub struct CompletionSignal {
    armed: AtomicU8,
    wake: Signal<CriticalSectionRawMutex, Direction>,
}

impl Default for CompletionSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl CompletionSignal {
    pub const fn new() -> Self {
        Self {
            armed: AtomicU8::new(DISARMED),
            wake: Signal::new(),
        }
    }

    /// Records the direction of the operation about to start.
    ///
    /// Must be called before the RX/TX strobe. Any stale wake is discarded.
    pub fn arm(&self, direction: Direction) {
        self.wake.reset();
        self.armed.store(direction.to_raw(), Ordering::Release);
    }

    pub fn disarm(&self) {
        self.armed.store(DISARMED, Ordering::Release);
    }

    /// Direction currently armed, if any
    pub fn armed(&self) -> Option<Direction> {
        Direction::from_raw(self.armed.load(Ordering::Acquire))
    }

    /// Edge handler. Wakes the waiting loop if a direction is armed.
    ///
    /// Safe to call from interrupt context.
    pub fn on_edge(&self) -> Option<Direction> {
        let direction = self.armed()?;
        self.wake.signal(direction);
        Some(direction)
    }

    /// Takes a pending wake without blocking.
    pub fn try_take(&self) -> Option<Direction> {
        self.wake.try_take()
    }

    /// Polls for the wake, sleeping `poll_us` between polls, for at most
    /// `timeout_us`. Disarms before returning.
    ///
    /// The number of sleeps is fixed up front, so a zero `poll_us` still
    /// ends.
    ///
    /// # Errors
    /// * [`Error::HardwareTimeout`] - no wake within `timeout_us`
    /// * [`Violation::UnexpectedWake`] - woken for the other direction
    pub fn wait_blocking(
        &self,
        expected: Direction,
        timeout_us: u32,
        poll_us: u32,
        mut sleep: impl FnMut(u32),
    ) -> Result<(), Error> {
        let mut polls = poll_budget(timeout_us, poll_us);
        let outcome = loop {
            if let Some(actual) = self.try_take() {
                break Ok(actual);
            }
            if polls == 0 {
                break Err(Error::HardwareTimeout(TimeoutSource::Completion));
            }
            polls -= 1;
            sleep(poll_us);
        };
        self.disarm();

        check_direction(expected, outcome?)
    }

    /// Waits for the wake on an async executor and disarms.
    ///
    /// Has no deadline of its own; race it against the executor's timer.
    ///
    /// # Errors
    /// * [`Violation::UnexpectedWake`] - woken for the other direction
    pub async fn wait_async(&self, expected: Direction) -> Result<(), Error> {
        let actual = self.wake.wait().await;
        self.disarm();
        check_direction(expected, actual)
    }
}

fn check_direction(expected: Direction, actual: Direction) -> Result<(), Error> {
    if actual == expected {
        Ok(())
    } else {
        Err(Violation::UnexpectedWake { expected, actual }.into())
    }
}

/// Waits for one falling edge on `gdo0` and forwards it to `signal`.
///
/// Returns the direction that was woken, or `None` if the edge arrived while
/// disarmed. Run it in a loop on a task dedicated to the pin.
pub async fn forward_edge<P>(
    gdo0: &mut P,
    signal: &CompletionSignal,
) -> Result<Option<Direction>, P::Error>
where
    P: Wait,
{
    gdo0.wait_for_falling_edge().await?;
    Ok(signal.on_edge())
}
