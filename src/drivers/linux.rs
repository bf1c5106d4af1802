//! sysfs GPIO lines and `/dev/i2c-N` for Linux hosts.
//!
//! Both are claimed on first use, not at construction.  An invocation that
//! never reads the sensor or commands the relay leaves the line and the bus
//! exactly as the previous invocation left them.

use embedded_hal::digital::{self, InputPin, OutputPin};
use embedded_hal::i2c::{self, Error as _, ErrorKind, Operation};
use linux_embedded_hal::I2cdev;
use linux_embedded_hal::sysfs_gpio::{self, Direction, Pin};
use log::{debug, warn};

use crate::pins::PinId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Unclaimed,
    Output,
    Input,
}

/// A GPIO line exported through sysfs on first access.
///
/// The first write switches the line to output with the requested level in
/// a single `direction` write (`high` / `low`), so it is never driven to the
/// opposite level on the way.
pub struct SysfsLine {
    id: PinId,
    pin: Pin,
    mode: Mode,
}

#[derive(Debug)]
pub struct LineError(sysfs_gpio::Error);

impl digital::Error for LineError {
    fn kind(&self) -> digital::ErrorKind {
        digital::ErrorKind::Other
    }
}

impl SysfsLine {
    pub fn new(id: PinId) -> Self {
        Self {
            id,
            pin: Pin::new(u64::from(id.number())),
            mode: Mode::Unclaimed,
        }
    }

    fn drive(&mut self, high: bool) -> Result<(), LineError> {
        if self.mode == Mode::Output {
            return self.pin.set_value(u8::from(high)).map_err(LineError);
        }
        self.claim()?;
        let direction = if high { Direction::High } else { Direction::Low };
        self.pin.set_direction(direction).map_err(LineError)?;
        self.mode = Mode::Output;
        Ok(())
    }

    fn sample(&mut self) -> Result<bool, LineError> {
        if self.mode != Mode::Input {
            self.claim()?;
            self.pin.set_direction(Direction::In).map_err(LineError)?;
            self.mode = Mode::Input;
        }
        Ok(self.pin.get_value().map_err(LineError)? != 0)
    }

    fn claim(&mut self) -> Result<(), LineError> {
        if self.mode == Mode::Unclaimed {
            debug!("gpio: exporting {}", self.id);
            self.pin.export().map_err(LineError)?;
        }
        Ok(())
    }
}

impl digital::ErrorType for SysfsLine {
    type Error = LineError;
}

impl OutputPin for SysfsLine {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.drive(false)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.drive(true)
    }
}

impl InputPin for SysfsLine {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        self.sample()
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.sample().map(|high| !high)
    }
}

/// An I²C bus device opened on the first transaction.
pub struct LazyI2cdev {
    path: String,
    dev: Option<I2cdev>,
}

impl LazyI2cdev {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            dev: None,
        }
    }
}

impl i2c::ErrorType for LazyI2cdev {
    type Error = ErrorKind;
}

impl i2c::I2c for LazyI2cdev {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if self.dev.is_none() {
            let dev = I2cdev::new(&self.path).map_err(|e| {
                warn!("i2c: cannot open {}: {}", self.path, e);
                ErrorKind::Other
            })?;
            debug!("i2c: opened {}", self.path);
            self.dev = Some(dev);
        }
        let Some(dev) = self.dev.as_mut() else {
            return Err(ErrorKind::Other);
        };
        dev.transaction(address, operations).map_err(|e| e.kind())
    }
}
