//! In-memory stand-ins for the embedded-hal peripherals.
//!
//! Used when the crate is built without the `linux` feature (host tests,
//! dry runs on a development machine).  Pins track their level in memory;
//! the bus behaves as if no device answers.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{self, InputPin, OutputPin, PinState};
use embedded_hal::i2c::{self, ErrorKind, NoAcknowledgeSource, Operation};
use log::debug;

/// An I²C bus with nothing attached: every transaction is NACKed.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedBus;

impl i2c::ErrorType for DetachedBus {
    type Error = ErrorKind;
}

impl i2c::I2c for DetachedBus {
    fn transaction(
        &mut self,
        address: u8,
        _operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        debug!("i2c(sim): no device at 0x{:02x}", address);
        Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address))
    }
}

/// Delay that returns immediately.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimDelay;

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

/// Pin that only remembers its last driven level.  Reads back that level,
/// or the pulled-up idle level before the first write.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimPin {
    level: Option<PinState>,
}

impl SimPin {
    pub fn new() -> Self {
        Self { level: None }
    }

    /// Last driven level, `None` before the first write.
    pub fn level(&self) -> Option<PinState> {
        self.level
    }
}

impl digital::ErrorType for SimPin {
    type Error = core::convert::Infallible;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.level = Some(PinState::Low);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.level = Some(PinState::High);
        Ok(())
    }
}

impl InputPin for SimPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.level != Some(PinState::Low))
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(self.level == Some(PinState::Low))
    }
}
