//! Application core — module logic behind port traits.
//!
//! The dew heater decision and the sky classifier live here.  All
//! interaction with hardware, storage and the network happens through the
//! **port traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod classifier;
pub mod events;
pub mod marker;
pub mod output;
pub mod ports;
pub mod service;
