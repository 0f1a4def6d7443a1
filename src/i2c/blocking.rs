// Licensed under the Apache-2.0 license

//! `embedded-hal` view of the controller.
//!
//! [`BlockingI2c`] borrows an [`I2cController`] together with a delay provider, so sensor
//! drivers written against `embedded_hal::i2c::I2c` can run on the interrupt-driven
//! controller unchanged.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{ErrorType, I2c, Operation, SevenBitAddress};
use heapless::Vec;

use crate::common::Logger;
use crate::i2c::common::{Timeout, BUFFER_LENGTH};
use crate::i2c::error::I2cError;
use crate::i2c::i2c_controller::I2cController;
use crate::i2c::traits::{I2cHardware, SlaveCallbacks};

pub struct BlockingI2c<'a, H, S, L, D> {
    controller: &'a I2cController<H, S, L>,
    delay: D,
    timeout: Timeout,
}

impl<'a, H, S, L, D> BlockingI2c<'a, H, S, L, D> {
    /// `timeout` bounds every read; writes wait until the transfer ends.
    pub fn new(controller: &'a I2cController<H, S, L>, delay: D, timeout: Timeout) -> Self {
        Self {
            controller,
            delay,
            timeout,
        }
    }

    pub fn release(self) -> D {
        self.delay
    }
}

impl<H, S, L, D> ErrorType for BlockingI2c<'_, H, S, L, D> {
    type Error = I2cError;
}

impl<H, S, L, D> BlockingI2c<'_, H, S, L, D>
where
    H: I2cHardware,
    S: SlaveCallbacks,
    L: Logger,
    D: DelayNs,
{
    fn write_group(
        &mut self,
        address: SevenBitAddress,
        group: &[Operation<'_>],
        send_stop: bool,
    ) -> Result<(), I2cError> {
        let mut bytes: Vec<u8, BUFFER_LENGTH> = Vec::new();
        for operation in group {
            if let Operation::Write(chunk) = operation {
                bytes
                    .extend_from_slice(chunk)
                    .map_err(|()| I2cError::OutOfCapacity)?;
            }
        }
        self.controller
            .write(address, &bytes, true, send_stop, &mut self.delay)
    }

    fn read_group(
        &mut self,
        address: SevenBitAddress,
        group: &mut [Operation<'_>],
        send_stop: bool,
    ) -> Result<(), I2cError> {
        let total: usize = group
            .iter()
            .map(|operation| match operation {
                Operation::Read(buffer) => buffer.len(),
                Operation::Write(_) => 0,
            })
            .sum();

        let mut scratch = [0u8; BUFFER_LENGTH];
        let window = scratch.get_mut(..total).ok_or(I2cError::OutOfCapacity)?;
        let count =
            self.controller
                .read(address, window, send_stop, self.timeout, &mut self.delay)?;
        if count < total {
            return Err(I2cError::Incomplete);
        }

        let mut offset = 0;
        for operation in group.iter_mut() {
            if let Operation::Read(buffer) = operation {
                let end = offset + buffer.len();
                let source = scratch.get(offset..end).ok_or(I2cError::OutOfCapacity)?;
                buffer.copy_from_slice(source);
                offset = end;
            }
        }
        Ok(())
    }
}

impl<H, S, L, D> I2c for BlockingI2c<'_, H, S, L, D>
where
    H: I2cHardware,
    S: SlaveCallbacks,
    L: Logger,
    D: DelayNs,
{
    /// Adjacent operations of the same direction share one transfer; direction changes are
    /// separated by repeated starts and the last transfer ends with a stop.
    fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let mut start = 0;
        while let Some(first) = operations.get(start) {
            let reading = matches!(first, Operation::Read(_));
            let end = operations
                .iter()
                .skip(start)
                .position(|operation| matches!(operation, Operation::Read(_)) != reading)
                .map_or(operations.len(), |offset| start + offset);
            let send_stop = end == operations.len();

            let group = operations.get_mut(start..end).unwrap_or_default();
            if reading {
                self.read_group(address, group, send_stop)?;
            } else {
                self.write_group(address, group, send_stop)?;
            }
            start = end;
        }
        Ok(())
    }
}
