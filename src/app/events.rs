//! Outbound application events.
//!
//! The module services emit these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other side
//! decide what to do with them; the shipped one writes them to the log.

use crate::config::{HeaterState, SensorKind};
use crate::pins::PinId;
use crate::sensors::{DerivedMetrics, Reading};

use super::classifier::Classification;
use super::ports::StorageError;

/// Structured events emitted by the module services.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Heater pin option is blank, zero or not a number.
    HeaterPinInvalid,

    /// No run marker existed; the startup state is being applied.
    FirstRun { state: HeaterState },

    /// The run marker could not be written.
    MarkerWriteFailed(StorageError),

    /// A complete or partial sensor sample was obtained.
    SensorRead {
        kind: SensorKind,
        reading: Reading,
        metrics: Option<DerivedMetrics>,
    },

    /// The sensor produced no usable temperature (or humidity when needed).
    SensorFailed { kind: SensorKind },

    /// The heater relay was commanded.
    HeaterCommanded {
        pin: PinId,
        state: HeaterState,
        inverted: bool,
    },

    /// The classification endpoint returned a result.
    Classified(Classification),

    /// The classification could not be obtained.
    ClassifierFailed(String),
}
