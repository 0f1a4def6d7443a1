// Licensed under the Apache-2.0 license

//! # I2C driver seams
//!
//! Two traits separate the protocol state machine from everything around it:
//!
//! ```text
//! I2cHardware     (register-level primitives, implemented per chip or by a mock)
//! SlaveCallbacks  (application data source/sink for slave transfers)
//! ```
//!
//! The controller owns one implementation of each and calls them from the interrupt
//! handler, so neither may block.

use crate::i2c::common::I2cConfig;
use crate::i2c::event::Event;

/// Register-level operations of an interrupt-driven I2C peripheral.
///
/// Every method maps to one or two register accesses. Sequencing is the controller's job.
pub trait I2cHardware {
    /// Program clock, duty cycle and own address, and enable the peripheral.
    ///
    /// Implementations also apply `general_call`, `smbus_alert` and `smbus_timeout` from
    /// `config`; the controller never reads those fields itself.
    ///
    /// Interrupt delivery stays off until [`enable_interrupts`](Self::enable_interrupts).
    fn init(&mut self, config: &I2cConfig, own_address: u8);

    /// Snapshot of the status registers as an event bitset.
    ///
    /// Reading the status is what acknowledges the address-matched condition on most
    /// parts, so the controller calls this exactly once per interrupt.
    fn last_event(&mut self) -> Event;

    /// Write the data register.
    fn send_byte(&mut self, byte: u8);

    /// Read the data register.
    fn receive_byte(&mut self) -> u8;

    /// Request a (repeated) start condition.
    fn generate_start(&mut self);

    /// Request a stop condition, or withdraw a pending request when `enable` is false.
    fn generate_stop(&mut self, enable: bool);

    /// Choose whether the next received byte is acknowledged.
    ///
    /// The hardware commits the decision before the byte arrives.
    fn set_acknowledge(&mut self, enable: bool);

    /// Clear sticky status flags.
    fn clear_flags(&mut self, flags: Event);

    /// Enable buffer, event and error interrupts.
    fn enable_interrupts(&mut self);

    /// Disable buffer, event and error interrupts.
    fn disable_interrupts(&mut self);

    /// Byte-transfer-finished flag, polled when the address of a repeated start is written
    /// from the foreground.
    fn byte_transfer_finished(&mut self) -> bool;
}

/// Application side of slave-mode transfers.
///
/// Both methods run inside the interrupt handler: they must return promptly and must not
/// block or allocate.
pub trait SlaveCallbacks {
    /// A remote master addressed us for reading. Fill `buffer` and return how many bytes
    /// are valid; the controller sends `0xFF` once they run out.
    fn on_transmit(&mut self, buffer: &mut [u8]) -> usize;

    /// A remote master finished writing to us. `data` holds every byte received since the
    /// address match.
    fn on_receive(&mut self, data: &[u8]);
}

/// Placeholder used when no slave handler is registered.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSlave;

impl SlaveCallbacks for NoSlave {
    fn on_transmit(&mut self, _buffer: &mut [u8]) -> usize {
        0
    }

    fn on_receive(&mut self, _data: &[u8]) {}
}
