//! Sensor subsystem — drivers, derived quantities and the [`SensorHub`].
//!
//! The hub owns the I²C bus and, for DHT sensors, the single-wire data
//! line.  It produces a [`Reading`] for whichever sensor kind the module
//! options select.  Driver failures never escape the hub:
//! they are logged and turned into an absent reading.

pub mod dht;
pub mod psychrometrics;
pub mod sht31;

use bme280::i2c::BME280;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::i2c::I2c;
use log::{debug, warn};
use serde::Serialize;

use crate::config::SensorKind;
use crate::error::SensorError;
use crate::pins::{self, PinId};
use dht::{Dht, DhtModel};
use sht31::Sht31;

pub use psychrometrics::DerivedMetrics;

/// One temperature / humidity sample.  Either value is `None` when the
/// sensor could not provide it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Reading {
    pub temperature_c: Option<f32>,
    pub humidity_pct: Option<f32>,
}

impl Reading {
    pub fn new(temperature_c: Option<f32>, humidity_pct: Option<f32>) -> Self {
        Self {
            temperature_c,
            humidity_pct,
        }
    }

    /// A failed acquisition.
    pub fn absent() -> Self {
        Self::default()
    }
}

const MIN_PLAUSIBLE_C: f32 = -40.0;
const MAX_PLAUSIBLE_C: f32 = 125.0;

/// Owns the sensor bus and dispatches reads by [`SensorKind`].
pub struct SensorHub<I2C, D, W> {
    bus: I2C,
    delay: D,
    /// Address override from the module options.
    i2c_address: Option<u8>,
    /// DHT data line and the pin it was claimed for.
    wire: Option<(PinId, W)>,
}

impl<I2C, D, W> SensorHub<I2C, D, W>
where
    I2C: I2c,
    D: DelayNs,
    W: InputPin + OutputPin,
{
    pub fn new(bus: I2C, delay: D, i2c_address: Option<u8>) -> Self {
        Self {
            bus,
            delay,
            i2c_address,
            wire: None,
        }
    }

    /// Attach the data line used by single-wire sensors.
    pub fn with_wire(mut self, pin: PinId, line: W) -> Self {
        self.wire = Some((pin, line));
        self
    }

    /// Read the selected sensor.  Failures are logged and yield
    /// [`Reading::absent`].
    pub fn read(&mut self, kind: SensorKind, input_pin: Option<PinId>) -> Reading {
        match self.try_read(kind, input_pin) {
            Ok(reading) => reading,
            Err(e) => {
                warn!("sensor {}: {}", kind, e);
                Reading::absent()
            }
        }
    }

    pub fn try_read(
        &mut self,
        kind: SensorKind,
        input_pin: Option<PinId>,
    ) -> Result<Reading, SensorError> {
        let address = self.i2c_address.or(kind.default_i2c_address());
        let reading = match (kind, address) {
            (SensorKind::None, _) => return Err(SensorError::NotConfigured),
            (SensorKind::Sht31, Some(address)) => {
                Sht31::new(&mut self.bus, &mut self.delay, address).measure()?
            }
            (SensorKind::Bme280I2c, Some(address)) => self.read_bme280(address)?,
            (SensorKind::Dht22 | SensorKind::Dht11, _) => self.read_dht(kind, input_pin)?,
            (other, _) => {
                debug!("no driver for {} (input pin {:?})", other, input_pin);
                return Err(SensorError::Unsupported(other));
            }
        };
        check_plausible(&reading)?;
        Ok(reading)
    }

    fn read_bme280(&mut self, address: u8) -> Result<Reading, SensorError> {
        let mut bme = if address == pins::BME280_SECONDARY_I2C_ADDRESS {
            BME280::new_secondary(&mut self.bus)
        } else {
            BME280::new_primary(&mut self.bus)
        };
        bme.init(&mut self.delay).map_err(|e| {
            debug!("BME280 @0x{:02x}: init failed: {:?}", address, e);
            SensorError::BusFailed
        })?;
        let m = bme.measure(&mut self.delay).map_err(|e| {
            debug!("BME280 @0x{:02x}: measure failed: {:?}", address, e);
            SensorError::BusFailed
        })?;
        Ok(Reading::new(Some(m.temperature), Some(m.humidity)))
    }

    fn read_dht(
        &mut self,
        kind: SensorKind,
        input_pin: Option<PinId>,
    ) -> Result<Reading, SensorError> {
        let model = DhtModel::for_kind(kind).ok_or(SensorError::Unsupported(kind))?;
        match (&mut self.wire, input_pin) {
            (Some((claimed, line)), Some(pin)) if *claimed == pin => {
                Dht::new(line, &mut self.delay, model).measure()
            }
            _ => Err(SensorError::NoInputPin),
        }
    }
}

fn check_plausible(reading: &Reading) -> Result<(), SensorError> {
    let t_ok = reading
        .temperature_c
        .is_none_or(|t| (MIN_PLAUSIBLE_C..=MAX_PLAUSIBLE_C).contains(&t));
    let rh_ok = reading
        .humidity_pct
        .is_none_or(|rh| (0.0..=100.0).contains(&rh));
    if t_ok && rh_ok {
        Ok(())
    } else {
        Err(SensorError::OutOfRange)
    }
}
