//! Derived humidity quantities: dew point and heat index.
//!
//! Dew point uses the Magnus form with Sonntag's coefficients, switching to
//! the over-ice set below 0 °C:
//!
//! ```text
//! γ(T,RH) = ln(RH/100) + (a × T)/(b + T)
//! Td      = (b × γ)/(a − γ)
//! ```
//!
//! Heat index follows the NWS procedure: Steadman's simple estimate, and the
//! Rothfusz regression (with its low/high humidity adjustments) once the
//! averaged estimate reaches 80 °F.

use serde::Serialize;

use super::Reading;

const MAGNUS_A_WATER: f32 = 17.62;
const MAGNUS_B_WATER: f32 = 243.12;
const MAGNUS_A_ICE: f32 = 22.46;
const MAGNUS_B_ICE: f32 = 272.62;

/// Lower bound applied to humidity before taking its logarithm.
const MIN_HUMIDITY_PCT: f32 = 0.1;

/// Quantities computed from a complete [`Reading`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedMetrics {
    pub dew_point_c: f32,
    pub heat_index_c: f32,
}

impl DerivedMetrics {
    /// `Some` iff both temperature and humidity are present.
    pub fn from_reading(reading: &Reading) -> Option<Self> {
        let (t, rh) = (reading.temperature_c?, reading.humidity_pct?);
        Some(Self {
            dew_point_c: dew_point(t, rh),
            heat_index_c: heat_index(t, rh),
        })
    }
}

/// Dew point (°C) for air temperature `t_c` (°C) and relative humidity `rh` (%).
///
/// Humidity is clamped to 0.1–100 %.
pub fn dew_point(t_c: f32, rh: f32) -> f32 {
    let rh = rh.clamp(MIN_HUMIDITY_PCT, 100.0);
    let (a, b) = if t_c >= 0.0 {
        (MAGNUS_A_WATER, MAGNUS_B_WATER)
    } else {
        (MAGNUS_A_ICE, MAGNUS_B_ICE)
    };
    let gamma = (rh / 100.0).ln() + (a * t_c) / (b + t_c);
    (b * gamma) / (a - gamma)
}

/// Apparent temperature (°C) combining air temperature and humidity.
pub fn heat_index(t_c: f32, rh: f32) -> f32 {
    let rh = rh.clamp(0.0, 100.0);
    let t = celsius_to_fahrenheit(t_c);

    let simple = 0.5 * (t + 61.0 + (t - 68.0) * 1.2 + rh * 0.094);
    if (simple + t) / 2.0 < 80.0 {
        return fahrenheit_to_celsius(simple);
    }

    let mut hi = -42.379 + 2.049_015_2 * t + 10.143_331 * rh
        - 0.224_755_4 * t * rh
        - 0.006_837_83 * t * t
        - 0.054_817_17 * rh * rh
        + 0.001_228_74 * t * t * rh
        + 0.000_852_82 * t * rh * rh
        - 0.000_001_99 * t * t * rh * rh;

    if rh < 13.0 && (80.0..=112.0).contains(&t) {
        hi -= ((13.0 - rh) / 4.0) * ((17.0 - (t - 95.0).abs()) / 17.0).sqrt();
    } else if rh > 85.0 && (80.0..=87.0).contains(&t) {
        hi += ((rh - 85.0) / 10.0) * ((87.0 - t) / 5.0);
    }

    fahrenheit_to_celsius(hi)
}

fn celsius_to_fahrenheit(c: f32) -> f32 {
    c * 9.0 / 5.0 + 32.0
}

fn fahrenheit_to_celsius(f: f32) -> f32 {
    (f - 32.0) * 5.0 / 9.0
}
