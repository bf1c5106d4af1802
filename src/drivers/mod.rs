//! Actuator drivers and peripheral bindings.

#[cfg(feature = "linux")]
pub mod linux;
pub mod relay;
pub mod sim;
