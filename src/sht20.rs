// Licensed under the Apache-2.0 license

//! SHT20 temperature/humidity sensor on top of the interrupt-driven controller.
//!
//! Uses hold-master measurements: the command is written with a stop, the conversion time
//! is waited out, then three bytes (MSB, LSB, CRC) are read back.

use core::fmt;

use embedded_hal::delay::DelayNs;
use fugit::MillisDurationU32;

use crate::common::Logger;
use crate::i2c::{I2cController, I2cError, I2cHardware, SlaveCallbacks, Timeout};

pub const SHT20_ADDRESS: u8 = 0x40;

const TRIGGER_TEMPERATURE_HOLD: u8 = 0xE3;
const TRIGGER_HUMIDITY_HOLD: u8 = 0xE5;

const TEMPERATURE_CONVERSION_MS: u32 = 85;
const HUMIDITY_CONVERSION_MS: u32 = 29;
const READ_TIMEOUT: MillisDurationU32 = MillisDurationU32::from_ticks(100);

/// Low two bits of a raw sample carry status, not data.
const STATUS_MASK: u16 = 0x0003;

const CRC_POLYNOMIAL: u8 = 0x31;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Sht20Error {
    Bus(I2cError),
    /// Fewer than three bytes arrived before the read timed out.
    ShortRead(usize),
    Checksum,
}

impl From<I2cError> for Sht20Error {
    fn from(error: I2cError) -> Self {
        Self::Bus(error)
    }
}

impl fmt::Display for Sht20Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus(error) => write!(f, "sht20 bus error: {error}"),
            Self::ShortRead(count) => write!(f, "sht20 short read: {count} of 3 bytes"),
            Self::Checksum => f.write_str("sht20 crc mismatch"),
        }
    }
}

impl core::error::Error for Sht20Error {}

/// One temperature and humidity sample.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Measurement {
    /// Hundredths of a degree Celsius.
    pub centi_celsius: i16,
    /// Hundredths of a percent relative humidity.
    pub centi_percent_rh: i16,
}

/// CRC-8 as used by the sensor: polynomial x^8 + x^5 + x^4 + 1, initial value 0.
#[must_use]
pub fn crc8(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |crc, &byte| {
        (0..8).fold(crc ^ byte, |crc, _| {
            if crc & 0x80 != 0 {
                (crc << 1) ^ CRC_POLYNOMIAL
            } else {
                crc << 1
            }
        })
    })
}

#[must_use]
pub fn temperature_from_raw(raw: u16) -> i16 {
    let raw = i32::from(raw & !STATUS_MASK);
    // Fits: raw * 17572 < 2^31 and the result lies in -4685..=12887.
    ((raw * 17572 >> 16) - 4685) as i16
}

#[must_use]
pub fn humidity_from_raw(raw: u16) -> i16 {
    let raw = i32::from(raw & !STATUS_MASK);
    ((raw * 12500 >> 16) - 600) as i16
}

pub struct Sht20<'a, H, S, L> {
    controller: &'a I2cController<H, S, L>,
}

impl<'a, H, S, L> Sht20<'a, H, S, L>
where
    H: I2cHardware,
    S: SlaveCallbacks,
    L: Logger,
{
    pub fn new(controller: &'a I2cController<H, S, L>) -> Self {
        Self { controller }
    }

    /// Temperature in hundredths of a degree Celsius.
    pub fn read_temperature<D: DelayNs>(&self, delay: &mut D) -> Result<i16, Sht20Error> {
        let raw = self.sample(TRIGGER_TEMPERATURE_HOLD, TEMPERATURE_CONVERSION_MS, delay)?;
        Ok(temperature_from_raw(raw))
    }

    /// Relative humidity in hundredths of a percent.
    pub fn read_humidity<D: DelayNs>(&self, delay: &mut D) -> Result<i16, Sht20Error> {
        let raw = self.sample(TRIGGER_HUMIDITY_HOLD, HUMIDITY_CONVERSION_MS, delay)?;
        Ok(humidity_from_raw(raw))
    }

    pub fn measure<D: DelayNs>(&self, delay: &mut D) -> Result<Measurement, Sht20Error> {
        Ok(Measurement {
            centi_celsius: self.read_temperature(delay)?,
            centi_percent_rh: self.read_humidity(delay)?,
        })
    }

    fn sample<D: DelayNs>(
        &self,
        command: u8,
        conversion_ms: u32,
        delay: &mut D,
    ) -> Result<u16, Sht20Error> {
        self.controller
            .write(SHT20_ADDRESS, &[command], true, true, delay)?;
        delay.delay_ms(conversion_ms);

        let mut frame = [0u8; 3];
        let count = self.controller.read(
            SHT20_ADDRESS,
            &mut frame,
            true,
            Timeout::After(READ_TIMEOUT),
            delay,
        )?;
        if count != frame.len() {
            return Err(Sht20Error::ShortRead(count));
        }

        let [msb, lsb, checksum] = frame;
        if crc8(&[msb, lsb]) != checksum {
            return Err(Sht20Error::Checksum);
        }
        Ok(u16::from_be_bytes([msb, lsb]))
    }
}
