//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns the [`SensorHub`] and the heater [`RelayDriver`], exposing them
//! through [`SensorPort`] and [`RelayPort`].  This is the only module in
//! the system that touches actual hardware.  Without the `linux` feature
//! the peripherals are the in-memory stand-ins from
//! [`drivers::sim`](crate::drivers::sim).

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::i2c::I2c;
use log::{info, warn};

use crate::app::ports::{RelayPort, SensorPort};
use crate::config::{DewHeaterConfig, SensorKind};
use crate::drivers::relay::RelayDriver;
use crate::drivers::sim::{DetachedBus, SimDelay, SimPin};
use crate::error::RelayError;
use crate::pins::PinId;
use crate::sensors::{Reading, SensorHub};

/// Concrete adapter that combines all hardware behind port traits.
///
/// `P` is the GPIO line type, shared by the heater relay and the DHT data
/// line.
pub struct HardwareAdapter<I2C, D, P> {
    sensor_hub: SensorHub<I2C, D, P>,
    /// The one pin this process claimed for the heater.
    relay: Option<(PinId, RelayDriver<P>)>,
}

impl<I2C, D, P> HardwareAdapter<I2C, D, P>
where
    I2C: I2c,
    D: DelayNs,
    P: InputPin + OutputPin,
{
    pub fn new(sensor_hub: SensorHub<I2C, D, P>, relay: Option<(PinId, RelayDriver<P>)>) -> Self {
        Self { sensor_hub, relay }
    }

    /// Hub for the configured sensor, with a data line when a DHT needs one.
    fn hub_for(
        config: &DewHeaterConfig,
        bus: I2C,
        delay: D,
        line: impl FnOnce(PinId) -> P,
    ) -> SensorHub<I2C, D, P> {
        let hub = SensorHub::new(bus, delay, config.resolved_i2c_address());
        match config.single_wire_pin() {
            Some(pin) => hub.with_wire(pin, line(pin)),
            None => hub,
        }
    }

    pub fn relay(&self) -> Option<&RelayDriver<P>> {
        self.relay.as_ref().map(|(_, driver)| driver)
    }

    fn drive(&mut self, pin: PinId, active: bool, inverted: bool) -> Result<(), RelayError> {
        match &mut self.relay {
            Some((claimed, driver)) if *claimed == pin => driver.set(active, inverted),
            _ => Err(RelayError::PinNotClaimed(pin)),
        }
    }
}

impl HardwareAdapter<DetachedBus, SimDelay, SimPin> {
    /// Peripherals that exist only in memory.  Sensor reads fail, relay
    /// writes are remembered.
    pub fn simulated(config: &DewHeaterConfig) -> Self {
        info!("HardwareAdapter: simulation backend");
        Self::new(
            Self::hub_for(config, DetachedBus, SimDelay, |_| SimPin::new()),
            config
                .heater_pin
                .map(|pin| (pin, RelayDriver::new(SimPin::new()))),
        )
    }
}

#[cfg(feature = "linux")]
impl
    HardwareAdapter<
        crate::drivers::linux::LazyI2cdev,
        linux_embedded_hal::Delay,
        crate::drivers::linux::SysfsLine,
    >
{
    /// Bind the I²C bus device and the sysfs GPIO lines.
    ///
    /// Nothing is opened here.  The bus is opened by the first transaction,
    /// which only the I²C sensor kinds issue.  The heater line is exported
    /// by the first relay command and the DHT line by the first read.
    pub fn open_linux(config: &DewHeaterConfig, i2c_bus: &str) -> Self {
        use crate::drivers::linux::{LazyI2cdev, SysfsLine};
        use linux_embedded_hal::Delay;

        info!("HardwareAdapter: linux backend on {}", i2c_bus);
        Self::new(
            Self::hub_for(config, LazyI2cdev::new(i2c_bus), Delay, SysfsLine::new),
            config
                .heater_pin
                .map(|pin| (pin, RelayDriver::new(SysfsLine::new(pin)))),
        )
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<I2C, D, P> SensorPort for HardwareAdapter<I2C, D, P>
where
    I2C: I2c,
    D: DelayNs,
    P: InputPin + OutputPin,
{
    fn read(&mut self, kind: SensorKind, input_pin: Option<PinId>) -> Reading {
        self.sensor_hub.read(kind, input_pin)
    }
}

// ── RelayPort implementation ──────────────────────────────────

impl<I2C, D, P> RelayPort for HardwareAdapter<I2C, D, P>
where
    I2C: I2c,
    D: DelayNs,
    P: InputPin + OutputPin,
{
    fn set_pin(&mut self, pin: PinId, active: bool, inverted: bool) {
        if let Err(e) = self.drive(pin, active, inverted) {
            warn!("relay {}: {}", pin, e);
        }
    }
}
