//! Module configuration.
//!
//! The host hands every module a flat mapping of option name to value on
//! each invocation.  This module turns that mapping into typed configs.
//! A bad option never stops the module: it is logged and the default
//! stands in for it.

use core::fmt;
use std::collections::BTreeMap;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;
use crate::pins::{self, PinId};

// ---------------------------------------------------------------------------
// Raw host parameters
// ---------------------------------------------------------------------------

/// Flat option mapping as supplied by the host.
///
/// The host stores every option as a string, but JSON numbers and booleans
/// are accepted too and normalised to their textual form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(BTreeMap<String, String>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON object of options.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let map: BTreeMap<String, serde_json::Value> =
            serde_json::from_str(raw).map_err(|e| ConfigError::Malformed(e.to_string()))?;
        Ok(map
            .into_iter()
            .map(|(k, v)| {
                let v = match v {
                    serde_json::Value::String(s) => s,
                    serde_json::Value::Null => String::new(),
                    other => other.to_string(),
                };
                (k, v)
            })
            .collect())
    }

    pub fn get(&self, option: &str) -> Option<&str> {
        self.0.get(option).map(String::as_str)
    }

    pub fn insert(&mut self, option: impl Into<String>, value: impl Into<String>) {
        self.0.insert(option.into(), value.into());
    }

    /// Trimmed value, with blank treated as absent.
    fn value(&self, option: &str) -> Option<&str> {
        self.get(option).map(str::trim).filter(|v| !v.is_empty())
    }

    fn number(&self, option: &'static str, default: f32) -> Result<f32, ConfigError> {
        match self.value(option) {
            None => Ok(default),
            Some(raw) => raw
                .parse::<f32>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| ConfigError::Unparsable {
                    option,
                    value: raw.to_string(),
                }),
        }
    }

    fn seconds(&self, option: &'static str) -> Result<u32, ConfigError> {
        match self.value(option) {
            None => Ok(0),
            Some(raw) => raw.parse::<u32>().map_err(|_| ConfigError::Unparsable {
                option,
                value: raw.to_string(),
            }),
        }
    }

    fn flag(&self, option: &'static str) -> Result<bool, ConfigError> {
        match self.value(option).map(str::to_ascii_lowercase).as_deref() {
            None | Some("false" | "0" | "no" | "off") => Ok(false),
            Some("true" | "1" | "yes" | "on") => Ok(true),
            Some(other) => Err(ConfigError::Unparsable {
                option,
                value: other.to_string(),
            }),
        }
    }
}

/// Parsed value, or `default` with a warning.
fn or_default<T: fmt::Display>(parsed: Result<T, ConfigError>, default: T) -> T {
    parsed.unwrap_or_else(|e| {
        warn!("{}, using {}", e, default);
        default
    })
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

// ---------------------------------------------------------------------------
// Dew heater
// ---------------------------------------------------------------------------

/// Temperature / humidity sensor models the host can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SensorKind {
    #[default]
    None,
    Sht31,
    Dht22,
    Dht11,
    Bme280I2c,
    Bme280Spi,
}

impl SensorKind {
    pub const ALL: [Self; 6] = [
        Self::None,
        Self::Sht31,
        Self::Dht22,
        Self::Dht11,
        Self::Bme280I2c,
        Self::Bme280Spi,
    ];

    /// The label the host uses in its select box.
    pub fn label(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Sht31 => "SHT31",
            Self::Dht22 => "DHT22",
            Self::Dht11 => "DHT11",
            Self::Bme280I2c => "BME280-I2C",
            Self::Bme280Spi => "BME280-SPI",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(Self::None);
        }
        Self::ALL
            .into_iter()
            .find(|k| k.label().eq_ignore_ascii_case(raw))
            .ok_or_else(|| ConfigError::UnknownSensor(raw.to_string()))
    }

    /// DHT sensors talk over a single GPIO line given by `inputpin`.
    pub fn is_single_wire(self) -> bool {
        matches!(self, Self::Dht22 | Self::Dht11)
    }

    /// Default bus address for I²C sensors.
    pub fn default_i2c_address(self) -> Option<u8> {
        match self {
            Self::Sht31 => Some(pins::SHT31_DEFAULT_I2C_ADDRESS),
            Self::Bme280I2c => Some(pins::BME280_PRIMARY_I2C_ADDRESS),
            _ => None,
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Logical heater state, independent of relay polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HeaterState {
    On,
    #[default]
    Off,
}

impl HeaterState {
    pub fn is_on(self) -> bool {
        matches!(self, Self::On)
    }

    /// `On` / `Off`, as published to the pipeline.
    pub fn label(self) -> &'static str {
        match self {
            Self::On => "On",
            Self::Off => "Off",
        }
    }
}

impl From<bool> for HeaterState {
    fn from(on: bool) -> Self {
        if on { Self::On } else { Self::Off }
    }
}

/// Default proximity to the dew point (°C) that enables the heater.
pub const DEFAULT_LIMIT_C: f32 = 10.0;

/// Dew heater options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DewHeaterConfig {
    // --- Sensor ---
    pub sensor_kind: SensorKind,
    /// Data pin for single-wire / SPI sensors (unused by I²C sensors).
    pub input_pin: Option<PinId>,
    /// Overrides the sensor's default I²C address.
    pub i2c_address: Option<u8>,

    // --- Heater ---
    /// `None` when the option is blank, zero or not a number.
    pub heater_pin: Option<PinId>,
    /// Applied once, when no run marker exists yet.
    pub startup_state: HeaterState,
    /// Relay energises on a low GPIO level.
    pub invert_relay: bool,

    // --- Dew control ---
    /// Delay between sensor reads (seconds).  Accepted but not enforced.
    pub frequency_secs: u32,
    /// Heater turns on when the temperature is within this many degrees of the dew point.
    pub limit_c: f32,
    /// Heater is forced on at or below this temperature.  Zero disables.
    pub force_c: f32,
    /// Maximum continuous heater-on time (seconds).  Accepted but not enforced.
    pub max_heater_secs: u32,
}

impl Default for DewHeaterConfig {
    fn default() -> Self {
        Self {
            sensor_kind: SensorKind::None,
            input_pin: None,
            i2c_address: None,
            heater_pin: None,
            startup_state: HeaterState::Off,
            invert_relay: false,
            frequency_secs: 0,
            limit_c: DEFAULT_LIMIT_C,
            force_c: 0.0,
            max_heater_secs: 0,
        }
    }
}

impl DewHeaterConfig {
    /// Build from host options.  Missing options take their defaults.
    ///
    /// The heater pin is resolved first: without one the module does
    /// nothing, so the remaining options are not even looked at.  Any other
    /// unusable option is logged and replaced by its default, and values
    /// outside the host's spinner ranges are kept with a warning.
    pub fn from_params(params: &Params) -> Self {
        let Some(heater_pin) = params.get("heaterpin").and_then(PinId::parse) else {
            return Self::default();
        };

        let sensor_kind = SensorKind::parse(params.get("type").unwrap_or_default())
            .unwrap_or_else(|e| {
                warn!("{}, no sensor will be read", e);
                SensorKind::None
            });

        let i2c_address = params.value("i2caddress").and_then(|raw| {
            let address = pins::parse_i2c_address(raw);
            if address.is_none() {
                warn!("i2caddress {:?} is not usable, using the sensor default", raw);
            }
            address
        });

        let startup_state = HeaterState::from(
            params
                .value("heaterstartupstate")
                .is_some_and(|raw| raw.eq_ignore_ascii_case("on")),
        );

        let config = Self {
            sensor_kind,
            input_pin: params.get("inputpin").and_then(PinId::parse),
            i2c_address,
            heater_pin: Some(heater_pin),
            startup_state,
            invert_relay: or_default(params.flag("invertrelay"), false),
            frequency_secs: or_default(params.seconds("frequency"), 0),
            limit_c: or_default(params.number("limit", DEFAULT_LIMIT_C), DEFAULT_LIMIT_C),
            force_c: or_default(params.number("force", 0.0), 0.0),
            max_heater_secs: or_default(params.seconds("max"), 0),
        };
        if let Err(e) = config.validate() {
            warn!("{}, using it anyway", e);
        }
        config
    }

    /// Range-check every numeric option against the host's spinner limits.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(-60.0..=50.0).contains(&self.limit_c) {
            return Err(ConfigError::ValidationFailed("limit outside -60..50"));
        }
        if !(-60.0..=50.0).contains(&self.force_c) {
            return Err(ConfigError::ValidationFailed("force outside -60..50"));
        }
        if self.frequency_secs > 1000 {
            return Err(ConfigError::ValidationFailed("frequency outside 0..1000"));
        }
        if self.max_heater_secs > 86_400 {
            return Err(ConfigError::ValidationFailed("max outside 0..86400"));
        }
        Ok(())
    }

    /// Data line for single-wire sensors, when one is both needed and set.
    pub fn single_wire_pin(&self) -> Option<PinId> {
        self.input_pin.filter(|_| self.sensor_kind.is_single_wire())
    }

    /// Whether the forced-on threshold is active.
    pub fn force_enabled(&self) -> bool {
        self.force_c != 0.0
    }

    /// The address the sensor hub should talk to.
    pub fn resolved_i2c_address(&self) -> Option<u8> {
        self.i2c_address.or(self.sensor_kind.default_i2c_address())
    }
}

// ---------------------------------------------------------------------------
// Sky classifier
// ---------------------------------------------------------------------------

/// Where the classification comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassifierSource {
    /// Public AllSkyAI service, classifying an image at a public URL.
    Online { image_url: String },
    /// Self-hosted AllSkyAI classify endpoint.
    Local { service_url: String },
}

impl ClassifierSource {
    pub fn online_from_params(params: &Params) -> Self {
        Self::Online {
            image_url: params.value("imageurl").unwrap_or_default().to_string(),
        }
    }

    pub fn local_from_params(params: &Params) -> Self {
        Self::Local {
            service_url: params.value("allskyaiurl").unwrap_or_default().to_string(),
        }
    }
}
