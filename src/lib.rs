//! Allsky pipeline modules: dew heater control and AllSkyAI sky
//! classification.
//!
//! Exposes the pure-logic modules for integration testing and for hosts
//! that embed the modules directly.  Real peripherals are only bound with
//! the `linux` feature; otherwise the hardware adapter runs on in-memory
//! stand-ins.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod drivers;
pub mod error;
pub mod modules;
pub mod pins;
pub mod sensors;

pub use app::output::{ModuleOutput, Status};
pub use error::{Error, Result};
pub use modules::ModuleKind;
