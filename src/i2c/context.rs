// Licensed under the Apache-2.0 license

//! Transaction state shared between the interrupt handler and foreground calls.
//!
//! The controller keeps exactly one [`TransactionContext`] behind a critical-section
//! mutex. Whoever holds the borrow owns the buffers; the `state` field says which side is
//! expected to make progress next.

use crate::common::Logger;
use crate::i2c::buffer::TransactionBuffer;
use crate::i2c::common::{ControllerState, I2cConfig, BUFFER_LENGTH};
use crate::i2c::error::I2cError;
use crate::i2c::traits::I2cHardware;

const READ_BIT: u8 = 0x01;
const WRITE_BIT: u8 = 0x00;

pub struct TransactionContext<H, S, L> {
    pub(crate) hardware: H,
    pub(crate) slave: Option<S>,
    pub(crate) logger: L,
    pub(crate) config: I2cConfig,
    pub(crate) state: ControllerState,
    /// Address byte sent after the next start condition.
    pub(crate) pending_address: u8,
    pub(crate) send_stop: bool,
    /// Previous transfer ended with a start instead of a stop; the bus is still ours.
    pub(crate) in_repeated_start: bool,
    /// Not-acknowledge for the final byte of a master read has been committed.
    pub(crate) final_nack_pending: bool,
    /// Address phase of the current master read completed.
    pub(crate) address_acked: bool,
    pub(crate) master: TransactionBuffer,
    pub(crate) slave_tx: TransactionBuffer,
    pub(crate) slave_rx: TransactionBuffer,
    pub(crate) error: Option<I2cError>,
}

impl<H, S, L> TransactionContext<H, S, L> {
    pub(crate) const fn new(hardware: H, logger: L, config: I2cConfig) -> Self {
        Self {
            hardware,
            slave: None,
            logger,
            config,
            state: ControllerState::Ready,
            pending_address: 0,
            send_stop: true,
            in_repeated_start: false,
            final_nack_pending: false,
            address_acked: false,
            master: TransactionBuffer::new(),
            slave_tx: TransactionBuffer::new(),
            slave_rx: TransactionBuffer::new(),
            error: None,
        }
    }
}

impl<H: I2cHardware, S, L: Logger> TransactionContext<H, S, L> {
    pub(crate) fn init(&mut self, own_address: u8) {
        self.state = ControllerState::Ready;
        self.send_stop = true;
        self.in_repeated_start = false;
        self.final_nack_pending = false;
        self.error = None;
        self.hardware.init(&self.config, own_address);
        self.hardware.set_acknowledge(true);
        self.hardware.enable_interrupts();
        self.logger
            .debug(format_args!("init, own address {own_address:#04x}"));
    }

    /// Arm a master write. Returns `Ok(false)` for an empty transfer, which never touches
    /// the bus.
    pub(crate) fn begin_write(
        &mut self,
        address: u8,
        data: &[u8],
        send_stop: bool,
    ) -> Result<bool, I2cError> {
        Self::check_preconditions(self.state, address, data.len())?;
        if data.is_empty() {
            return Ok(false);
        }
        self.master.load(data)?;
        self.arm(
            ControllerState::MasterTransmitting,
            address << 1 | WRITE_BIT,
            send_stop,
        );
        Ok(true)
    }

    /// Arm a master read of `length` bytes. Returns `Ok(false)` for an empty transfer.
    pub(crate) fn begin_read(
        &mut self,
        address: u8,
        length: usize,
        send_stop: bool,
    ) -> Result<bool, I2cError> {
        Self::check_preconditions(self.state, address, length)?;
        if length == 0 {
            return Ok(false);
        }
        self.master.arm(length);
        self.arm(
            ControllerState::MasterReceiving,
            address << 1 | READ_BIT,
            send_stop,
        );
        Ok(true)
    }

    fn check_preconditions(
        state: ControllerState,
        address: u8,
        length: usize,
    ) -> Result<(), I2cError> {
        if length > BUFFER_LENGTH {
            return Err(I2cError::OutOfCapacity);
        }
        if state != ControllerState::Ready {
            return Err(I2cError::WrongState);
        }
        if address > 0x7F {
            return Err(I2cError::InvalidAddress);
        }
        Ok(())
    }

    fn arm(&mut self, state: ControllerState, address_byte: u8, send_stop: bool) {
        self.state = state;
        self.send_stop = send_stop;
        self.error = None;
        self.final_nack_pending = false;
        self.address_acked = false;
        self.pending_address = address_byte;

        self.hardware.generate_stop(false);

        if self.in_repeated_start {
            self.in_repeated_start = false;
            // The start was already issued by the interrupt handler, which masked
            // interrupts so that it would not consume the start-sent event itself.
            loop {
                self.hardware.send_byte(address_byte);
                if !self.hardware.byte_transfer_finished() {
                    break;
                }
            }
            self.hardware.enable_interrupts();
            self.logger
                .debug(format_args!("repeated start, address {address_byte:#04x}"));
        } else {
            self.hardware.generate_start();
        }
    }
}
