//! DHT11 / DHT22 single-wire driver.
//!
//! The host holds the data line low to request a sample, then releases it.
//! The sensor answers with an 80 µs low / 80 µs high preamble and 40 data
//! bits.  Each bit is a ~50 µs low followed by a high pulse whose width
//! encodes the value (~27 µs for `0`, ~70 µs for `1`).  The fifth byte is
//! the wrapping sum of the first four.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use log::debug;

use super::Reading;
use crate::config::SensorKind;
use crate::error::SensorError;

/// Longest any single phase of the reply may last (µs).
const PHASE_TIMEOUT_US: u32 = 100;

/// High pulses longer than this carry a `1`.
const ONE_BIT_THRESHOLD_US: u32 = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DhtModel {
    Dht11,
    Dht22,
}

impl DhtModel {
    pub fn for_kind(kind: SensorKind) -> Option<Self> {
        match kind {
            SensorKind::Dht11 => Some(Self::Dht11),
            SensorKind::Dht22 => Some(Self::Dht22),
            _ => None,
        }
    }

    /// How long the host holds the line low to wake the sensor.
    fn start_pulse_ms(self) -> u32 {
        match self {
            Self::Dht11 => 18,
            Self::Dht22 => 1,
        }
    }

    fn decode(self, data: [u8; 4]) -> Reading {
        let (humidity, temperature) = match self {
            // Integer and tenths bytes; bit 7 of the tenths byte is the sign.
            Self::Dht11 => {
                let t = f32::from(data[2]) + f32::from(data[3] & 0x7F) / 10.0;
                (
                    f32::from(data[0]) + f32::from(data[1]) / 10.0,
                    if data[3] & 0x80 != 0 { -t } else { t },
                )
            }
            // Big-endian tenths; bit 15 of the temperature is the sign.
            Self::Dht22 => {
                let t = f32::from(u16::from_be_bytes([data[2] & 0x7F, data[3]])) / 10.0;
                (
                    f32::from(u16::from_be_bytes([data[0], data[1]])) / 10.0,
                    if data[2] & 0x80 != 0 { -t } else { t },
                )
            }
        };
        Reading::new(Some(temperature), Some(humidity))
    }
}

/// One transaction on a DHT data line.
pub struct Dht<'a, P, D> {
    line: &'a mut P,
    delay: &'a mut D,
    model: DhtModel,
}

impl<'a, P, D> Dht<'a, P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    pub fn new(line: &'a mut P, delay: &'a mut D, model: DhtModel) -> Self {
        Self { line, delay, model }
    }

    pub fn measure(&mut self) -> Result<Reading, SensorError> {
        let frame = self.read_frame()?;
        let sum = frame[..4].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
        if sum != frame[4] {
            debug!("{:?}: checksum {:#04x}, expected {:#04x}", self.model, frame[4], sum);
            return Err(SensorError::ChecksumMismatch);
        }
        Ok(self.model.decode([frame[0], frame[1], frame[2], frame[3]]))
    }

    fn read_frame(&mut self) -> Result<[u8; 5], SensorError> {
        self.line.set_low().map_err(|_| SensorError::BusFailed)?;
        self.delay.delay_ms(self.model.start_pulse_ms());
        self.line.set_high().map_err(|_| SensorError::BusFailed)?;

        // Host release, then the sensor's preamble.
        self.wait_while(true)?;
        self.wait_while(false)?;
        self.wait_while(true)?;

        let mut frame = [0u8; 5];
        for bit in 0..40usize {
            self.wait_while(false)?;
            if self.wait_while(true)? > ONE_BIT_THRESHOLD_US {
                frame[bit / 8] |= 0x80 >> (bit % 8);
            }
        }
        Ok(frame)
    }

    /// Poll until the line leaves `high`, returning how long it stayed (µs).
    fn wait_while(&mut self, high: bool) -> Result<u32, SensorError> {
        let mut elapsed = 0;
        while self.line.is_high().map_err(|_| SensorError::BusFailed)? == high {
            if elapsed >= PHASE_TIMEOUT_US {
                return Err(SensorError::Timeout);
            }
            self.delay.delay_us(1);
            elapsed += 1;
        }
        Ok(elapsed)
    }
}
