// Licensed under the Apache-2.0 license

//! Interrupt-driven I2C master/slave driver.
//!
//! The controller runs a byte-level protocol state machine from the peripheral's event
//! interrupt. Foreground code issues blocking master transfers; slave transfers are
//! served entirely from the interrupt through [`SlaveCallbacks`].

pub mod blocking;
pub mod buffer;
pub mod common;
pub(crate) mod context;
pub(crate) mod dispatcher;
pub mod error;
pub mod event;
pub mod i2c_controller;
pub mod traits;

pub use blocking::BlockingI2c;
pub use buffer::TransactionBuffer;
pub use common::{
    ControllerState, DutyCycle, I2cConfig, I2cConfigBuilder, I2cSpeed, Timeout, BUFFER_LENGTH,
    SLAVE_FILLER_BYTE,
};
pub use error::I2cError;
pub use event::Event;
pub use i2c_controller::I2cController;
pub use traits::{I2cHardware, NoSlave, SlaveCallbacks};
