// Licensed under the Apache-2.0 license

//! Common types for the I2C driver: configuration, controller state and timeouts.

use fugit::MillisDurationU32;

/// Capacity of every transaction buffer (master, slave transmit, slave receive).
pub const BUFFER_LENGTH: usize = 32;

/// Byte clocked out by a slave transmitter once the application's data is exhausted.
pub const SLAVE_FILLER_BYTE: u8 = 0xFF;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum I2cSpeed {
    Standard = 100_000,
    Fast = 400_000,
}

impl I2cSpeed {
    #[must_use]
    pub const fn hz(self) -> u32 {
        self as u32
    }
}

/// SCL low/high ratio in fast mode.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DutyCycle {
    Ratio2To1,
    Ratio16To9,
}

/// Which role, if any, the controller is currently playing on the bus.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ControllerState {
    Ready,
    MasterTransmitting,
    MasterReceiving,
    SlaveTransmitting,
    SlaveReceiving,
}

impl ControllerState {
    #[must_use]
    pub const fn is_master(self) -> bool {
        matches!(self, Self::MasterTransmitting | Self::MasterReceiving)
    }
}

/// Upper bound on how long a blocking call waits for the bus.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Timeout {
    Forever,
    After(MillisDurationU32),
}

impl From<MillisDurationU32> for Timeout {
    fn from(duration: MillisDurationU32) -> Self {
        Self::After(duration)
    }
}

/// Controller configuration.
///
/// Only `poll_interval` is used by the controller itself. The bus timing and SMBus fields
/// are handed to [`I2cHardware::init`](crate::i2c::I2cHardware::init), which programs them
/// into the peripheral.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct I2cConfig {
    pub speed: I2cSpeed,
    pub duty_cycle: DutyCycle,
    /// Answer the general call address (0x00) in slave mode.
    pub general_call: bool,
    /// Drive and monitor the SMBus alert line.
    pub smbus_alert: bool,
    /// Detect SMBus clock-low timeouts.
    pub smbus_timeout: bool,
    /// Granularity of the foreground wait loops.
    pub poll_interval: MillisDurationU32,
}

impl Default for I2cConfig {
    fn default() -> Self {
        I2cConfigBuilder::new().build()
    }
}

pub struct I2cConfigBuilder {
    speed: I2cSpeed,
    duty_cycle: DutyCycle,
    general_call: bool,
    smbus_alert: bool,
    smbus_timeout: bool,
    poll_interval: MillisDurationU32,
}

impl Default for I2cConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl I2cConfigBuilder {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            speed: I2cSpeed::Fast,
            duty_cycle: DutyCycle::Ratio16To9,
            general_call: false,
            smbus_alert: false,
            smbus_timeout: false,
            poll_interval: MillisDurationU32::from_ticks(1),
        }
    }
    #[must_use]
    pub const fn speed(mut self, speed: I2cSpeed) -> Self {
        self.speed = speed;
        self
    }
    #[must_use]
    pub const fn duty_cycle(mut self, duty_cycle: DutyCycle) -> Self {
        self.duty_cycle = duty_cycle;
        self
    }
    #[must_use]
    pub const fn general_call(mut self, enabled: bool) -> Self {
        self.general_call = enabled;
        self
    }
    #[must_use]
    pub const fn smbus_alert(mut self, enabled: bool) -> Self {
        self.smbus_alert = enabled;
        self
    }
    #[must_use]
    pub const fn smbus_timeout(mut self, enabled: bool) -> Self {
        self.smbus_timeout = enabled;
        self
    }
    /// Zero is rounded up to one millisecond so that wait loops always make progress.
    #[must_use]
    pub const fn poll_interval(mut self, interval: MillisDurationU32) -> Self {
        self.poll_interval = if interval.ticks() == 0 {
            MillisDurationU32::from_ticks(1)
        } else {
            interval
        };
        self
    }
    #[must_use]
    pub const fn build(self) -> I2cConfig {
        I2cConfig {
            speed: self.speed,
            duty_cycle: self.duty_cycle,
            general_call: self.general_call,
            smbus_alert: self.smbus_alert,
            smbus_timeout: self.smbus_timeout,
            poll_interval: self.poll_interval,
        }
    }
}
