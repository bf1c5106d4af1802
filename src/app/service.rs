//! Dew heater service — the hexagonal core of the dew heater module.
//!
//! [`DewHeaterService`] owns the module options and runs one control cycle
//! per host invocation.  All I/O flows through port traits injected at call
//! sites, making the service testable with mock adapters.
//!
//! ```text
//!  SensorPort ──▶ ┌────────────────────────┐ ──▶ EventSink
//!                 │   DewHeaterService     │
//!   RelayPort ◀── │  marker · force · dew  │ ◀─▶ StoragePort
//!                 └────────────────────────┘
//! ```
//!
//! The decision itself ([`evaluate`] / [`decide`]) is pure; the service
//! only sequences the marker write, the relay command and event emission
//! around it.

use log::info;

use crate::config::{DewHeaterConfig, HeaterState};
use crate::sensors::{DerivedMetrics, Reading};

use super::events::AppEvent;
use super::marker;
use super::output::ModuleOutput;
use super::ports::{ClockPort, EventSink, RelayPort, SensorPort, StoragePort};

/// Error status for a missing or unusable heater pin.
pub const PIN_INVALID_MESSAGE: &str = "heater pin not defined or invalid";

pub const EXPORT_AMBIENT: &str = "AS_DEWCONTROLAMBIENT";
pub const EXPORT_HUMIDITY: &str = "AS_DEWCONTROLHUMIDITY";
pub const EXPORT_DEW_POINT: &str = "AS_DEWCONTROLDEW";
pub const EXPORT_HEAT_INDEX: &str = "AS_DEWCONTROLHEATINDEX";
pub const EXPORT_HEATER: &str = "AS_DEWCONTROLHEATER";

/// Every variable the dew heater may publish.
pub const EXPORTS: [&str; 5] = [
    EXPORT_AMBIENT,
    EXPORT_HUMIDITY,
    EXPORT_DEW_POINT,
    EXPORT_HEAT_INDEX,
    EXPORT_HEATER,
];

// ───────────────────────────────────────────────────────────────
// Decision
// ───────────────────────────────────────────────────────────────

/// Outcome of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decision {
    /// Heater pin unusable: nothing is touched.
    InvalidPin,
    /// First run: apply the configured startup state without reading.
    Startup(HeaterState),
    /// No temperature, or no humidity when the dew comparison needs it.
    SensorUnavailable { reading: Reading },
    /// At or below the forced threshold.
    ForcedOn { reading: Reading, force_c: f32 },
    /// Within `limit_c` of the dew point.
    WithinLimit {
        reading: Reading,
        metrics: DerivedMetrics,
        limit_c: f32,
    },
    /// Comfortably above the dew point.
    OutsideLimit {
        reading: Reading,
        metrics: DerivedMetrics,
        limit_c: f32,
    },
}

impl Decision {
    /// Heater state to command, `None` for no relay action.
    pub fn heater(&self) -> Option<HeaterState> {
        match self {
            Self::InvalidPin | Self::SensorUnavailable { .. } => None,
            Self::Startup(state) => Some(*state),
            Self::ForcedOn { .. } | Self::WithinLimit { .. } => Some(HeaterState::On),
            Self::OutsideLimit { .. } => Some(HeaterState::Off),
        }
    }

    /// The sample the decision was based on, if one was taken.
    pub fn reading(&self) -> Option<&Reading> {
        match self {
            Self::InvalidPin | Self::Startup(_) => None,
            Self::SensorUnavailable { reading }
            | Self::ForcedOn { reading, .. }
            | Self::WithinLimit { reading, .. }
            | Self::OutsideLimit { reading, .. } => Some(reading),
        }
    }

    /// Host-facing status and published variables.
    pub fn to_output(&self) -> ModuleOutput {
        let mut out = match self {
            Self::InvalidPin => return ModuleOutput::error(PIN_INVALID_MESSAGE),
            Self::Startup(_) | Self::SensorUnavailable { .. } => ModuleOutput::silent(),
            Self::ForcedOn { force_c, .. } => {
                ModuleOutput::info(format!("Temperature below forced level {}", force_c))
            }
            Self::WithinLimit {
                reading,
                metrics,
                limit_c,
            } => ModuleOutput::info(format!(
                "Temperature within limit temperature {:.1}, limit {}, dewPoint {:.1}",
                reading.temperature_c.unwrap_or_default(),
                limit_c,
                metrics.dew_point_c
            )),
            Self::OutsideLimit {
                reading,
                metrics,
                limit_c,
            } => ModuleOutput::info(format!(
                "Temperature outside limit temperature {:.1}, limit {}, dewPoint {:.1}",
                reading.temperature_c.unwrap_or_default(),
                limit_c,
                metrics.dew_point_c
            )),
        };

        if let Some(reading) = self.reading() {
            if let Some(t) = reading.temperature_c {
                out.export(EXPORT_AMBIENT, format!("{:.1}", t));
            }
            if let Some(rh) = reading.humidity_pct {
                out.export(EXPORT_HUMIDITY, format!("{:.1}", rh));
            }
            if let Some(m) = DerivedMetrics::from_reading(reading) {
                out.export(EXPORT_DEW_POINT, format!("{:.1}", m.dew_point_c));
                out.export(EXPORT_HEAT_INDEX, format!("{:.1}", m.heat_index_c));
            }
        }
        if let Some(state) = self.heater() {
            out.export(EXPORT_HEATER, state.label());
        }
        out
    }
}

/// `(temperature − limit) ≤ dew point`, inclusive.
pub fn within_limit(temperature_c: f32, dew_point_c: f32, limit_c: f32) -> bool {
    temperature_c - limit_c <= dew_point_c
}

/// Decide what to do this invocation.
///
/// The sensor is only consulted in steady state (pin valid, has run before).
pub fn evaluate(
    config: &DewHeaterConfig,
    has_run_before: bool,
    sensor: &mut impl SensorPort,
) -> Decision {
    if config.heater_pin.is_none() {
        return Decision::InvalidPin;
    }
    if !has_run_before {
        return Decision::Startup(config.startup_state);
    }
    let reading = sensor.read(config.sensor_kind, config.input_pin);
    decide(config, reading)
}

/// Steady-state decision for a given sample.
///
/// The forced threshold is checked first and short-circuits the dew-point
/// comparison.
pub fn decide(config: &DewHeaterConfig, reading: Reading) -> Decision {
    let Some(temperature) = reading.temperature_c else {
        return Decision::SensorUnavailable { reading };
    };

    if config.force_enabled() && temperature <= config.force_c {
        return Decision::ForcedOn {
            reading,
            force_c: config.force_c,
        };
    }

    let Some(metrics) = DerivedMetrics::from_reading(&reading) else {
        return Decision::SensorUnavailable { reading };
    };

    if within_limit(temperature, metrics.dew_point_c, config.limit_c) {
        Decision::WithinLimit {
            reading,
            metrics,
            limit_c: config.limit_c,
        }
    } else {
        Decision::OutsideLimit {
            reading,
            metrics,
            limit_c: config.limit_c,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// DewHeaterService
// ───────────────────────────────────────────────────────────────

/// Runs the dew heater module against injected ports.
pub struct DewHeaterService {
    config: DewHeaterConfig,
}

impl DewHeaterService {
    pub fn new(config: DewHeaterConfig) -> Self {
        Self { config }
    }

    /// Run one control cycle: marker → sensor → decision → relay.
    ///
    /// The `hw` parameter satisfies **both** [`SensorPort`] and
    /// [`RelayPort`].
    pub fn run(
        &self,
        hw: &mut (impl SensorPort + RelayPort),
        store: &mut impl StoragePort,
        clock: &impl ClockPort,
        sink: &mut impl EventSink,
    ) -> ModuleOutput {
        let Some(pin) = self.config.heater_pin else {
            sink.emit(&AppEvent::HeaterPinInvalid);
            return Decision::InvalidPin.to_output();
        };

        let has_run_before = marker::exists(store);
        if !has_run_before {
            sink.emit(&AppEvent::FirstRun {
                state: self.config.startup_state,
            });
            if let Err(e) = marker::record(store, clock.unix_secs()) {
                sink.emit(&AppEvent::MarkerWriteFailed(e));
            }
        }

        let decision = evaluate(&self.config, has_run_before, hw);

        if let Some(reading) = decision.reading() {
            let metrics = DerivedMetrics::from_reading(reading);
            if matches!(decision, Decision::SensorUnavailable { .. }) {
                sink.emit(&AppEvent::SensorFailed {
                    kind: self.config.sensor_kind,
                });
            } else {
                sink.emit(&AppEvent::SensorRead {
                    kind: self.config.sensor_kind,
                    reading: *reading,
                    metrics,
                });
            }
        }

        if let Some(state) = decision.heater() {
            hw.set_pin(pin, state.is_on(), self.config.invert_relay);
            sink.emit(&AppEvent::HeaterCommanded {
                pin,
                state,
                inverted: self.config.invert_relay,
            });
        }

        let out = decision.to_output();
        if !out.message().is_empty() {
            info!("{}", out.message());
        }
        out
    }
}
