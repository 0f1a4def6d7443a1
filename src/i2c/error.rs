// Licensed under the Apache-2.0 license

use core::fmt;
use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};

/// Failures reported by the I2C driver.
///
/// `OutOfCapacity`, `WrongState` and `InvalidAddress` are detected before any bus activity.
/// The remaining variants are latched by the interrupt handler while a transfer runs.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum I2cError {
    /// The transfer does not fit in the transaction buffer.
    OutOfCapacity,
    /// A transaction is already in flight.
    WrongState,
    /// The target address does not fit in seven bits.
    InvalidAddress,
    /// The remote device did not acknowledge.
    AddressNacked,
    BusError,
    ArbitrationLost,
    Overrun,
    /// SMBus packet error check mismatch.
    ProtocolCheckFailed,
    /// SMBus clock-low timeout.
    Timeout,
    /// SMBus alert line asserted.
    AlertAsserted,
    /// A blocking transfer gave up waiting before every byte arrived.
    Incomplete,
}

impl embedded_hal::i2c::Error for I2cError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::AddressNacked => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Unknown),
            Self::BusError => ErrorKind::Bus,
            Self::ArbitrationLost => ErrorKind::ArbitrationLoss,
            Self::Overrun => ErrorKind::Overrun,
            Self::OutOfCapacity
            | Self::WrongState
            | Self::InvalidAddress
            | Self::ProtocolCheckFailed
            | Self::Timeout
            | Self::AlertAsserted
            | Self::Incomplete => ErrorKind::Other,
        }
    }
}

impl fmt::Display for I2cError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::OutOfCapacity => "transfer exceeds buffer capacity",
            Self::WrongState => "controller busy",
            Self::InvalidAddress => "address is not a 7-bit address",
            Self::AddressNacked => "not acknowledged",
            Self::BusError => "bus error",
            Self::ArbitrationLost => "arbitration lost",
            Self::Overrun => "overrun",
            Self::ProtocolCheckFailed => "packet error check failed",
            Self::Timeout => "bus timeout",
            Self::AlertAsserted => "smbus alert",
            Self::Incomplete => "transfer incomplete before timeout",
        };
        f.write_str(text)
    }
}

impl core::error::Error for I2cError {}
