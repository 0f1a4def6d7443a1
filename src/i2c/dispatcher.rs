// Licensed under the Apache-2.0 license

//! Interrupt-time state machine.
//!
//! One call to [`TransactionContext::dispatch`] handles one hardware event bitset. Role
//! handling runs first, then the error flags are checked whatever the role.

use crate::common::Logger;
use crate::i2c::common::{ControllerState, BUFFER_LENGTH, SLAVE_FILLER_BYTE};
use crate::i2c::context::TransactionContext;
use crate::i2c::error::I2cError;
use crate::i2c::event::Event;
use crate::i2c::traits::{I2cHardware, SlaveCallbacks};

impl<H: I2cHardware, S: SlaveCallbacks, L: Logger> TransactionContext<H, S, L> {
    pub(crate) fn dispatch(&mut self, event: Event) {
        if event.contains(Event::MASTER) {
            if event.contains(Event::START_SENT) {
                self.hardware.send_byte(self.pending_address);
                self.logger.debug(format_args!(
                    "start sent, address {:#04x}",
                    self.pending_address
                ));
            }
            if event.contains(Event::TRANSMITTER) {
                self.master_transmit(event);
            } else {
                self.master_receive(event);
            }
        } else {
            self.slave_event(event);
        }

        self.error_flags(event);
    }

    fn master_transmit(&mut self, event: Event) {
        if self.state != ControllerState::MasterTransmitting {
            return;
        }

        if event.contains(Event::ACK_FAILURE) {
            self.hardware.clear_flags(Event::ACK_FAILURE);
            self.latch(I2cError::AddressNacked);
            self.state = ControllerState::Ready;
            self.hardware.generate_stop(true);
            self.logger.debug(format_args!("nack received, stop"));
            return;
        }

        if event.intersects(Event::MASTER_TX_READY) {
            if let Some(byte) = self.master.next_byte() {
                self.hardware.send_byte(byte);
                self.logger.debug(format_args!("send ({byte:#04x})"));
            } else {
                // Last byte is on the wire: end or chain the transfer right away.
                self.finish_master();
            }
        }
    }

    fn master_receive(&mut self, event: Event) {
        if self.state != ControllerState::MasterReceiving {
            return;
        }

        if event.contains(Event::ADDRESS_MATCHED) {
            self.address_acked = true;
            // The decision applies to the byte about to arrive.
            if self.master.len() > 1 {
                self.hardware.set_acknowledge(true);
                self.logger.debug(format_args!("address sent, ack next"));
            } else {
                self.hardware.set_acknowledge(false);
                self.final_nack_pending = true;
                self.logger.debug(format_args!("address sent, nack next"));
            }
        }

        if event.contains(Event::RX_NOT_EMPTY) {
            let byte = self.hardware.receive_byte();
            self.master.push(byte);
            self.logger.debug(format_args!("received ({byte:#04x})"));

            if self.master.remaining() > 1 {
                self.hardware.set_acknowledge(true);
            } else {
                self.hardware.set_acknowledge(false);
                // The not-acknowledge goes out with the byte after the one that set it,
                // so termination waits for that byte's event.
                if self.final_nack_pending {
                    self.final_nack_pending = false;
                    self.finish_master();
                } else {
                    self.final_nack_pending = true;
                }
            }
        }

        if event.contains(Event::ACK_FAILURE) {
            self.hardware.clear_flags(Event::ACK_FAILURE);
            if !self.address_acked {
                self.latch(I2cError::AddressNacked);
                self.state = ControllerState::Ready;
                self.hardware.generate_stop(true);
                self.logger.debug(format_args!("address nacked, stop"));
                return;
            }
            let byte = self.hardware.receive_byte();
            self.master.push(byte);
            self.final_nack_pending = false;
            self.finish_master();
        }
    }

    /// End the current master transfer with a stop, or hold the bus with a new start.
    fn finish_master(&mut self) {
        if self.send_stop {
            self.state = ControllerState::Ready;
            self.hardware.generate_stop(true);
            self.logger.debug(format_args!("stop"));
        } else {
            self.in_repeated_start = true;
            // The next foreground call writes the address itself; keep the start-sent
            // event away from this handler until then.
            self.hardware.disable_interrupts();
            self.hardware.generate_start();
            self.state = ControllerState::Ready;
            self.logger.debug(format_args!("restart"));
        }
    }

    fn slave_event(&mut self, event: Event) {
        if event.contains(Event::ADDRESS_MATCHED) {
            if event.intersects(Event::TRANSMITTER | Event::TX_EMPTY) {
                self.state = ControllerState::SlaveTransmitting;
                self.slave_tx.reset();
                let length = match self.slave.as_mut() {
                    Some(callbacks) => callbacks.on_transmit(self.slave_tx.storage_mut()),
                    None => 0,
                };
                self.slave_tx.arm(length);
                self.logger
                    .debug(format_args!("slave transmitter, {length} bytes ready"));
            } else {
                self.state = ControllerState::SlaveReceiving;
                self.slave_rx.arm(BUFFER_LENGTH);
                if event.contains(Event::GENERAL_CALL) {
                    self.logger.debug(format_args!("general call"));
                } else if event.contains(Event::DUAL_ADDRESS) {
                    self.logger.debug(format_args!("dual address matched"));
                }
                self.logger.debug(format_args!("slave receiver"));
            }
        }

        match self.state {
            ControllerState::SlaveTransmitting => self.slave_transmit(event),
            ControllerState::SlaveReceiving => self.slave_receive(event),
            _ => {
                // Tail of a session that already ended, e.g. the stop after a slave read.
                if event.contains(Event::STOP_DETECTED) {
                    self.hardware.clear_flags(Event::STOP_DETECTED);
                }
                if event.contains(Event::ACK_FAILURE) {
                    self.hardware.clear_flags(Event::ACK_FAILURE);
                    self.hardware.set_acknowledge(true);
                }
            }
        }
    }

    fn slave_transmit(&mut self, event: Event) {
        self.hardware.set_acknowledge(true);

        if event.contains(Event::ACK_FAILURE) {
            // Remote master is done reading.
            self.hardware.clear_flags(Event::ACK_FAILURE);
            self.state = ControllerState::Ready;
            self.logger.debug(format_args!("slave transmit done"));
            return;
        }

        if event.intersects(Event::SLAVE_TX_READY) {
            match self.slave_tx.next_byte() {
                Some(byte) => {
                    self.hardware.send_byte(byte);
                    self.logger.debug(format_args!("slave send ({byte:#04x})"));
                }
                None => {
                    self.hardware.send_byte(SLAVE_FILLER_BYTE);
                    self.logger.debug(format_args!("no more data, send 0xff"));
                }
            }
        }
    }

    fn slave_receive(&mut self, event: Event) {
        if event.contains(Event::RX_NOT_EMPTY) {
            let byte = self.hardware.receive_byte();
            if self.slave_rx.push(byte) {
                self.hardware.set_acknowledge(true);
                self.logger.debug(format_args!("slave received ({byte:#04x})"));
            } else {
                self.hardware.set_acknowledge(false);
                self.logger
                    .debug(format_args!("slave buffer full, dropped {byte:#04x}"));
            }
        }

        if event.contains(Event::STOP_DETECTED) {
            self.hardware.clear_flags(Event::STOP_DETECTED);
            if let Some(callbacks) = self.slave.as_mut() {
                callbacks.on_receive(self.slave_rx.filled());
            }
            self.logger.debug(format_args!(
                "slave stop, {} bytes received",
                self.slave_rx.cursor()
            ));
            self.slave_rx.reset();
            self.hardware.set_acknowledge(true);
            self.state = ControllerState::Ready;
        }

        if event.contains(Event::ACK_FAILURE) {
            self.hardware.clear_flags(Event::ACK_FAILURE);
            self.hardware.set_acknowledge(true);
        }
    }

    fn error_flags(&mut self, event: Event) {
        if event.contains(Event::BUS_ERROR) {
            self.hardware.clear_flags(Event::BUS_ERROR);
            self.hardware.generate_stop(true);
            self.latch(I2cError::BusError);
            self.state = ControllerState::Ready;
        }

        if event.contains(Event::ARBITRATION_LOST) {
            // The hardware has already released the bus.
            self.hardware.clear_flags(Event::ARBITRATION_LOST);
            self.latch(I2cError::ArbitrationLost);
            if self.state.is_master() {
                self.state = ControllerState::Ready;
            }
        }

        let latched = [
            (Event::OVERRUN, I2cError::Overrun),
            (Event::PEC_ERROR, I2cError::ProtocolCheckFailed),
            (Event::TIMEOUT, I2cError::Timeout),
            (Event::SMBUS_ALERT, I2cError::AlertAsserted),
        ];
        for (flag, error) in latched {
            if event.contains(flag) {
                self.hardware.clear_flags(flag);
                self.latch(error);
            }
        }
    }

    fn latch(&mut self, error: I2cError) {
        self.error = Some(error);
        self.logger.error(format_args!("{error} ({error:?})"));
    }
}
