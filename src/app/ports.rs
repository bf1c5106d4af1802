//! Port traits — the hexagonal boundary between module logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ DewHeaterService / classifier (domain)
//! ```
//!
//! Driven adapters (sensors, relays, storage, HTTP, event sinks) implement
//! these traits.  The services consume them via generics, so the domain core
//! never touches hardware or the network directly.

use crate::config::SensorKind;
use crate::pins::PinId;
use crate::sensors::Reading;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this to obtain a temperature/humidity pair.
pub trait SensorPort {
    /// Read the sensor of the given kind.
    ///
    /// Never fails: any hardware or driver error yields a [`Reading`] with
    /// the affected values absent.  Absence is the failure signal.
    fn read(&mut self, kind: SensorKind, input_pin: Option<PinId>) -> Reading;
}

// ───────────────────────────────────────────────────────────────
// Relay port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to switch the heater relay.
pub trait RelayPort {
    /// Drive `pin` to its active (`true`) or inactive level.
    ///
    /// With `inverted`, active means electrical low.  Idempotent; failures
    /// are the adapter's to log.
    fn set_pin(&mut self, pin: PinId, active: bool, inverted: bool);
}

// ───────────────────────────────────────────────────────────────
// Storage port (driven adapter: domain ↔ persistent key-value store)
// ───────────────────────────────────────────────────────────────

/// Persistent key-value storage shared by all modules.
///
/// Keys are namespaced per module to prevent collisions.  A write is
/// visible to the next invocation of the host process.
pub trait StoragePort {
    /// Read a value.
    fn read(&self, namespace: &str, key: &str) -> Result<Vec<u8>, StorageError>;

    /// Write a value, replacing any previous one.
    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Delete a key.  Returns `Ok(())` even if the key didn't exist.
    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError>;

    /// Check whether a key exists without reading it.
    fn exists(&self, namespace: &str, key: &str) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Wall-clock source for timestamps written to storage.
pub trait ClockPort {
    /// Seconds since the Unix epoch.
    fn unix_secs(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Classifier transport (driven adapter: domain → HTTP)
// ───────────────────────────────────────────────────────────────

/// Raw HTTP reply handed back to the classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

/// Performs a single blocking GET.
pub trait ClassifierTransport {
    /// `query` pairs are URL-encoded and appended to `url`.
    ///
    /// Non-2xx statuses are returned as an [`HttpReply`], not an error;
    /// only transport-level failures are errors.
    fn get(&mut self, url: &str, query: &[(&str, &str)]) -> Result<HttpReply, ClassifierError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from parsing module options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The option mapping itself is not a JSON object.
    Malformed(String),
    /// An option value could not be parsed.
    Unparsable { option: &'static str, value: String },
    /// A parsed value failed range validation.
    ValidationFailed(&'static str),
    /// The sensor type is not one the host offers.
    UnknownSensor(String),
    /// No module with this name.
    UnknownModule(String),
}

/// Errors from [`StoragePort`] operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Requested key does not exist.
    NotFound,
    /// Stored blob failed to decode.
    Corrupted,
    /// Generic I/O error from the backing file.
    IoError(String),
}

/// Errors from [`ClassifierTransport`] and response decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifierError {
    /// Connection, DNS, TLS or timeout failure.
    Transport(String),
    /// Response body is not the expected JSON.
    Decode(String),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Malformed(msg) => write!(f, "malformed options: {}", msg),
            Self::Unparsable { option, value } => {
                write!(f, "invalid value '{}' for option {}", value, option)
            }
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::UnknownSensor(name) => write!(f, "unknown sensor type '{}'", name),
            Self::UnknownModule(name) => write!(f, "unknown module '{}'", name),
        }
    }
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "key not found"),
            Self::Corrupted => write!(f, "stored value corrupted"),
            Self::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl core::fmt::Display for ClassifierError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Transport(msg) | Self::Decode(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for ConfigError {}
impl std::error::Error for StorageError {}
impl std::error::Error for ClassifierError {}
