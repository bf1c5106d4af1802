//! Heater relay driver.
//!
//! A single digital output wired to a relay module coil.  Most relay
//! boards energise on a high level; opto-isolated boards often energise on
//! low, which the caller selects with `inverted`.
//!
//! ## Safety contract
//!
//! This driver is a dumb actuator.  Deciding when the heater may run is
//! the dew heater service's job.

use embedded_hal::digital::{OutputPin, PinState};
use log::info;

use crate::error::RelayError;

/// Electrical level that realises `active` for the given polarity.
pub fn level_for(active: bool, inverted: bool) -> PinState {
    PinState::from(active != inverted)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    /// Never driven since the process started.
    Unknown,
    Energised,
    Released,
}

pub struct RelayDriver<P> {
    pin: P,
    state: RelayState,
}

impl<P: OutputPin> RelayDriver<P> {
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            state: RelayState::Unknown,
        }
    }

    pub fn set(&mut self, active: bool, inverted: bool) -> Result<(), RelayError> {
        self.pin
            .set_state(level_for(active, inverted))
            .map_err(|_| RelayError::GpioWriteFailed)?;

        self.state = if active {
            RelayState::Energised
        } else {
            RelayState::Released
        };
        info!("Turning heater {}", if active { "on" } else { "off" });
        Ok(())
    }

    pub fn state(&self) -> RelayState {
        self.state
    }

    pub fn is_energised(&self) -> bool {
        matches!(self.state, RelayState::Energised)
    }

    /// Give the pin back (e.g. to inspect a simulated level).
    pub fn release(self) -> P {
        self.pin
    }
}
