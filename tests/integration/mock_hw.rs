//! Mock adapters for integration tests.
//!
//! Records every relay call and sensor read so tests can assert on the
//! full command history without touching real GPIO or I²C.

use std::collections::HashMap;

use allsky_modules::app::events::AppEvent;
use allsky_modules::app::ports::{
    ClassifierError, ClassifierTransport, ClockPort, EventSink, HttpReply, RelayPort, SensorPort,
    StorageError, StoragePort,
};
use allsky_modules::config::SensorKind;
use allsky_modules::pins::PinId;
use allsky_modules::sensors::Reading;

// ── Relay call record ─────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayCall {
    pub pin: PinId,
    pub active: bool,
    pub inverted: bool,
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    /// What every sensor read returns.
    pub reading: Reading,
    pub reads: Vec<SensorKind>,
    pub calls: Vec<RelayCall>,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new(reading: Reading) -> Self {
        Self {
            reading,
            reads: Vec::new(),
            calls: Vec::new(),
        }
    }

    pub fn reading(temperature_c: f32, humidity_pct: f32) -> Self {
        Self::new(Reading::new(Some(temperature_c), Some(humidity_pct)))
    }

    pub fn last_call(&self) -> Option<&RelayCall> {
        self.calls.last()
    }

    pub fn heater_on(&self) -> Option<bool> {
        self.last_call().map(|c| c.active)
    }
}

impl SensorPort for MockHardware {
    fn read(&mut self, kind: SensorKind, _input_pin: Option<PinId>) -> Reading {
        self.reads.push(kind);
        self.reading
    }
}

impl RelayPort for MockHardware {
    fn set_pin(&mut self, pin: PinId, active: bool, inverted: bool) {
        self.calls.push(RelayCall {
            pin,
            active,
            inverted,
        });
    }
}

// ── MockStore ─────────────────────────────────────────────────

#[derive(Default)]
pub struct MockStore {
    store: HashMap<String, Vec<u8>>,
    /// Make every write fail with an I/O error.
    pub fail_writes: bool,
    pub writes: usize,
}

#[allow(dead_code)]
impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }
}

impl StoragePort for MockStore {
    fn read(&self, namespace: &str, key: &str) -> Result<Vec<u8>, StorageError> {
        self.store
            .get(&format!("{}::{}", namespace, key))
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::IoError("read-only filesystem".into()));
        }
        self.writes += 1;
        self.store.insert(format!("{}::{}", namespace, key), data.to_vec());
        Ok(())
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError> {
        self.store.remove(&format!("{}::{}", namespace, key));
        Ok(())
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        self.store.contains_key(&format!("{}::{}", namespace, key))
    }
}

// ── FixedClock ────────────────────────────────────────────────

pub struct FixedClock(pub u64);

impl ClockPort for FixedClock {
    fn unix_secs(&self) -> u64 {
        self.0
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── MockTransport ─────────────────────────────────────────────

pub struct MockTransport {
    reply: Result<HttpReply, ClassifierError>,
    pub requests: Vec<(String, Vec<(String, String)>)>,
}

#[allow(dead_code)]
impl MockTransport {
    pub fn replying(status: u16, body: &str) -> Self {
        Self {
            reply: Ok(HttpReply {
                status,
                body: body.to_string(),
            }),
            requests: Vec::new(),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(ClassifierError::Transport(message.to_string())),
            requests: Vec::new(),
        }
    }
}

impl ClassifierTransport for MockTransport {
    fn get(&mut self, url: &str, query: &[(&str, &str)]) -> Result<HttpReply, ClassifierError> {
        self.requests.push((
            url.to_string(),
            query
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        ));
        self.reply.clone()
    }
}
