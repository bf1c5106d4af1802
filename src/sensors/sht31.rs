//! Sensirion SHT31 temperature / humidity sensor (I²C).
//!
//! Single-shot, high-repeatability measurement without clock stretching:
//! write command `0x2400`, wait for the conversion, read six bytes
//! (`T_msb T_lsb CRC RH_msb RH_lsb CRC`).  Each 16-bit word is protected
//! by a CRC-8 (poly 0x31, init 0xFF).

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::debug;

use super::Reading;
use crate::error::SensorError;

/// Single shot, high repeatability, clock stretching disabled.
const CMD_MEASURE_HIGH_REPEATABILITY: [u8; 2] = [0x24, 0x00];
/// Datasheet maximum for high repeatability is 15.5 ms.
const MEASUREMENT_DURATION_MS: u32 = 16;

const CRC_POLYNOMIAL: u8 = 0x31;
const CRC_INIT: u8 = 0xFF;

pub struct Sht31<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
}

impl<I2C: I2c, D: DelayNs> Sht31<I2C, D> {
    pub fn new(i2c: I2C, delay: D, address: u8) -> Self {
        Self { i2c, delay, address }
    }

    /// Trigger one measurement and wait for the result.
    pub fn measure(&mut self) -> Result<Reading, SensorError> {
        self.i2c
            .write(self.address, &CMD_MEASURE_HIGH_REPEATABILITY)
            .map_err(|e| {
                debug!("SHT31 @0x{:02x}: command write failed: {:?}", self.address, e);
                SensorError::BusFailed
            })?;

        self.delay.delay_ms(MEASUREMENT_DURATION_MS);

        let mut buf = [0u8; 6];
        self.i2c.read(self.address, &mut buf).map_err(|e| {
            debug!("SHT31 @0x{:02x}: result read failed: {:?}", self.address, e);
            SensorError::BusFailed
        })?;

        let t_raw = checked_word(&buf[0..3])?;
        let rh_raw = checked_word(&buf[3..6])?;

        Ok(Reading::new(
            Some(raw_to_celsius(t_raw)),
            Some(raw_to_humidity(rh_raw)),
        ))
    }
}

/// CRC-8 as used by Sensirion sensors.
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc = CRC_INIT;
    for &byte in data {
        crc ^= byte;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ CRC_POLYNOMIAL
            } else {
                crc << 1
            };
        }
    }
    crc
}

fn checked_word(chunk: &[u8]) -> Result<u16, SensorError> {
    if crc8(&chunk[..2]) != chunk[2] {
        return Err(SensorError::CrcMismatch);
    }
    Ok(u16::from_be_bytes([chunk[0], chunk[1]]))
}

fn raw_to_celsius(raw: u16) -> f32 {
    -45.0 + 175.0 * f32::from(raw) / 65535.0
}

fn raw_to_humidity(raw: u16) -> f32 {
    100.0 * f32::from(raw) / 65535.0
}
