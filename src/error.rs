//! Unified error types for the allsky modules.
//!
//! A single `Error` enum that every subsystem converts into, so the binary
//! edge and the module runners handle failures uniformly.  Nothing here is
//! fatal to the host pipeline: runners turn these into an error status.

use core::fmt;

use crate::app::ports::{ConfigError, StorageError};
use crate::config::SensorKind;
use crate::pins::PinId;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the crate funnels into this type.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Module options are invalid.
    Config(ConfigError),
    /// The key-value store failed.
    Storage(StorageError),
    /// The process environment lacks something the module needs.
    Init(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Storage(e) => write!(f, "storage: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// No sensor type selected in the module options.
    NotConfigured,
    /// The selected sensor kind has no driver in this build.
    Unsupported(SensorKind),
    /// Bus transaction or data-line access failed.
    BusFailed,
    /// A measurement word failed its CRC check.
    CrcMismatch,
    /// A single-wire frame failed its checksum.
    ChecksumMismatch,
    /// A single-wire sensor stopped answering mid-frame.
    Timeout,
    /// A single-wire sensor was selected without a usable input pin.
    NoInputPin,
    /// Reading is outside the physically plausible range.
    OutOfRange,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConfigured => write!(f, "no sensor type defined"),
            Self::Unsupported(kind) => write!(f, "sensor type {kind} not supported"),
            Self::BusFailed => write!(f, "bus transaction failed"),
            Self::CrcMismatch => write!(f, "CRC mismatch"),
            Self::ChecksumMismatch => write!(f, "checksum mismatch"),
            Self::Timeout => write!(f, "no response on the data line"),
            Self::NoInputPin => write!(f, "input pin not defined or invalid"),
            Self::OutOfRange => write!(f, "reading out of range"),
        }
    }
}

// ---------------------------------------------------------------------------
// Relay errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayError {
    /// GPIO set failed.
    GpioWriteFailed,
    /// The requested pin was never claimed as an output.
    PinNotClaimed(PinId),
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GpioWriteFailed => write!(f, "GPIO write failed"),
            Self::PinNotClaimed(pin) => write!(f, "{pin} not claimed as output"),
        }
    }
}

// ---------------------------------------------------------------------------
// Port error conversions
// ---------------------------------------------------------------------------

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
