//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements          | Connects to                   |
//! |------------|---------------------|-------------------------------|
//! | `hardware` | SensorPort          | SHT31, BME280 (I²C), DHT GPIO |
//! |            | RelayPort           | GPIO heater relay             |
//! | `http`     | ClassifierTransport | AllSkyAI over HTTPS (ureq)    |
//! | `log_sink` | EventSink           | Process log output            |
//! | `store`    | StoragePort         | JSON file / in-memory store   |
//! | `time`     | ClockPort           | System wall clock             |

pub mod hardware;
pub mod http;
pub mod log_sink;
pub mod store;
pub mod time;
