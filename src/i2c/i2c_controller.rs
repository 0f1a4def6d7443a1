// Licensed under the Apache-2.0 license

//! Interrupt-driven I2C controller.
//!
//! [`I2cController`] owns the transaction context behind a critical-section mutex so a
//! single instance can be placed in a `static` and shared between the interrupt vector,
//! which calls [`I2cController::on_interrupt`], and foreground code, which calls the
//! blocking [`write`](I2cController::write) and [`read`](I2cController::read).
//!
//! `BoardI2c` below stands for the board's [`I2cHardware`] implementation and `Responder`
//! for its [`SlaveCallbacks`] implementation.
//!
//! ```rust,ignore
//! static I2C: I2cController<BoardI2c, Responder> =
//!     I2cController::new(BoardI2c::new(), NoOpLogger, I2cConfigBuilder::new().build());
//!
//! #[interrupt]
//! fn I2C() {
//!     I2C.on_interrupt();
//! }
//!
//! fn main() -> ! {
//!     I2C.register_slave(Responder::default());
//!     I2C.init(0x21)?;
//!     I2C.write(0x40, &[0xE3], true, true, &mut delay)?;
//!     let mut raw = [0u8; 3];
//!     let count = I2C.read(0x40, &mut raw, true, 100.millis().into(), &mut delay)?;
//!     // ...
//! }
//! ```

use core::cell::RefCell;

use critical_section::Mutex;
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::SevenBitAddress;
use fugit::MillisDurationU32;

use crate::common::{Logger, NoOpLogger};
use crate::i2c::common::{ControllerState, I2cConfig, Timeout};
use crate::i2c::context::TransactionContext;
use crate::i2c::error::I2cError;
use crate::i2c::traits::{I2cHardware, NoSlave, SlaveCallbacks};

pub struct I2cController<H, S = NoSlave, L = NoOpLogger> {
    shared: Mutex<RefCell<TransactionContext<H, S, L>>>,
}

impl<H, S, L> I2cController<H, S, L> {
    pub const fn new(hardware: H, logger: L, config: I2cConfig) -> Self {
        Self {
            shared: Mutex::new(RefCell::new(TransactionContext::new(
                hardware, logger, config,
            ))),
        }
    }

    /// Install the slave handler, returning the previous one.
    ///
    /// Meant to be called once before bus activity; swapping during a slave transfer
    /// hands the rest of that transfer to the new handler.
    pub fn register_slave(&self, callbacks: S) -> Option<S> {
        critical_section::with(|cs| self.shared.borrow_ref_mut(cs).slave.replace(callbacks))
    }

    pub fn unregister_slave(&self) -> Option<S> {
        critical_section::with(|cs| self.shared.borrow_ref_mut(cs).slave.take())
    }

    #[must_use]
    pub fn state(&self) -> ControllerState {
        critical_section::with(|cs| self.shared.borrow_ref(cs).state)
    }

    /// Error latched by the last master transaction, if any.
    #[must_use]
    pub fn last_error(&self) -> Option<I2cError> {
        critical_section::with(|cs| self.shared.borrow_ref(cs).error)
    }

    /// True while the bus is held after a transfer that ended without a stop.
    #[must_use]
    pub fn in_repeated_start(&self) -> bool {
        critical_section::with(|cs| self.shared.borrow_ref(cs).in_repeated_start)
    }

    /// Run `f` with exclusive access to the hardware, e.g. for bus recovery.
    pub fn with_hardware<R>(&self, f: impl FnOnce(&mut H) -> R) -> R {
        critical_section::with(|cs| f(&mut self.shared.borrow_ref_mut(cs).hardware))
    }

    /// Completion of a transfer started with `wait == false`.
    pub fn poll_complete(&self) -> nb::Result<(), I2cError> {
        critical_section::with(|cs| {
            let ctx = self.shared.borrow_ref(cs);
            if ctx.state.is_master() {
                Err(nb::Error::WouldBlock)
            } else if let Some(error) = ctx.error {
                Err(nb::Error::Other(error))
            } else {
                Ok(())
            }
        })
    }

    fn poll_interval(&self) -> MillisDurationU32 {
        critical_section::with(|cs| self.shared.borrow_ref(cs).config.poll_interval)
    }

    /// Poll until the controller leaves `active`. Returns false if `timeout` ran out first.
    fn wait_while<D: DelayNs>(
        &self,
        active: ControllerState,
        timeout: Timeout,
        delay: &mut D,
    ) -> bool {
        let interval = self.poll_interval();
        let mut waited = MillisDurationU32::from_ticks(0);
        loop {
            if self.state() != active {
                return true;
            }
            if let Timeout::After(limit) = timeout {
                if waited >= limit {
                    return false;
                }
            }
            delay.delay_ms(interval.ticks());
            waited =
                MillisDurationU32::from_ticks(waited.ticks().saturating_add(interval.ticks()));
        }
    }
}

impl<H: I2cHardware, S: SlaveCallbacks, L: Logger> I2cController<H, S, L> {
    /// Configure the peripheral with `own_address` as slave address and start taking
    /// interrupts.
    pub fn init(&self, own_address: SevenBitAddress) -> Result<(), I2cError> {
        if own_address > 0x7F {
            return Err(I2cError::InvalidAddress);
        }
        critical_section::with(|cs| self.shared.borrow_ref_mut(cs).init(own_address));
        Ok(())
    }

    /// Interrupt entry point. Handles one hardware event.
    pub fn on_interrupt(&self) {
        critical_section::with(|cs| {
            let mut ctx = self.shared.borrow_ref_mut(cs);
            let event = ctx.hardware.last_event();
            if !event.is_empty() {
                ctx.dispatch(event);
            }
        });
    }

    /// Write `data` to the device at `address`.
    ///
    /// With `wait`, returns once the transfer completed and reports its outcome. Without,
    /// returns as soon as the start is issued; use [`poll_complete`](Self::poll_complete)
    /// before starting another transfer. With `send_stop == false` the bus is held and the
    /// next `write` or `read` continues with a repeated start.
    ///
    /// # Errors
    ///
    /// `OutOfCapacity`, `WrongState` and `InvalidAddress` before any bus activity; with
    /// `wait`, whatever the interrupt handler latched during the transfer.
    pub fn write<D: DelayNs>(
        &self,
        address: SevenBitAddress,
        data: &[u8],
        wait: bool,
        send_stop: bool,
        delay: &mut D,
    ) -> Result<(), I2cError> {
        let armed = critical_section::with(|cs| {
            self.shared
                .borrow_ref_mut(cs)
                .begin_write(address, data, send_stop)
        })?;
        if !armed || !wait {
            return Ok(());
        }

        self.wait_while(ControllerState::MasterTransmitting, Timeout::Forever, delay);
        match self.last_error() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Read `buffer.len()` bytes from the device at `address`.
    ///
    /// Returns the number of bytes received. If `timeout` runs out first, the bytes captured
    /// so far are returned; the transfer itself keeps running and the controller reports
    /// `WrongState` until it ends.
    ///
    /// # Errors
    ///
    /// `OutOfCapacity`, `WrongState` and `InvalidAddress` before any bus activity; for a
    /// transfer that completed, whatever the interrupt handler latched.
    pub fn read<D: DelayNs>(
        &self,
        address: SevenBitAddress,
        buffer: &mut [u8],
        send_stop: bool,
        timeout: Timeout,
        delay: &mut D,
    ) -> Result<usize, I2cError> {
        let armed = critical_section::with(|cs| {
            self.shared
                .borrow_ref_mut(cs)
                .begin_read(address, buffer.len(), send_stop)
        })?;
        if !armed {
            return Ok(0);
        }

        let completed = self.wait_while(ControllerState::MasterReceiving, timeout, delay);

        critical_section::with(|cs| {
            let ctx = self.shared.borrow_ref(cs);
            if completed {
                if let Some(error) = ctx.error {
                    return Err(error);
                }
            }
            let received = ctx.master.filled();
            let count = received.len().min(buffer.len());
            if let (Some(dst), Some(src)) = (buffer.get_mut(..count), received.get(..count)) {
                dst.copy_from_slice(src);
            }
            Ok(count)
        })
    }
}
