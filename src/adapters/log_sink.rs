//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the process logger, which the host captures alongside its own output.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::HeaterPinInvalid => {
                warn!("HEATER | pin not defined or invalid, nothing switched");
            }
            AppEvent::FirstRun { state } => {
                info!(
                    "HEATER | no last run info so assuming startup, state={}",
                    state.label()
                );
            }
            AppEvent::MarkerWriteFailed(e) => {
                warn!("HEATER | could not persist run marker: {}", e);
            }
            AppEvent::SensorRead {
                kind,
                reading,
                metrics,
            } => {
                let fmt = |v: Option<f32>| match v {
                    Some(v) => format!("{:.1}", v),
                    None => "-".to_string(),
                };
                info!(
                    "SENSOR | {} | T={}\u{00b0}C RH={}% dew={}\u{00b0}C hi={}\u{00b0}C",
                    kind,
                    fmt(reading.temperature_c),
                    fmt(reading.humidity_pct),
                    fmt(metrics.map(|m| m.dew_point_c)),
                    fmt(metrics.map(|m| m.heat_index_c)),
                );
            }
            AppEvent::SensorFailed { kind } => {
                warn!("SENSOR | {} | no usable reading, heater left as is", kind);
            }
            AppEvent::HeaterCommanded {
                pin,
                state,
                inverted,
            } => {
                info!("HEATER | {} -> {} (inverted={})", pin, state.label(), inverted);
            }
            AppEvent::Classified(c) => {
                info!(
                    "AI | {} | confidence={:.1}% inference={:.3}s",
                    c.classification, c.confidence, c.inference
                );
            }
            AppEvent::ClassifierFailed(msg) => {
                warn!("AI | {}", msg);
            }
        }
    }
}
