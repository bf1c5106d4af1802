//! What a module hands back to the host after one invocation.
//!
//! Replaces the process-wide environment variables the pipeline used as an
//! output channel: the host receives the status line and the variables to
//! publish, and decides itself how to expose them.

use std::collections::BTreeMap;

use serde::Serialize;

/// One-line outcome of an invocation, doubling as its log message.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "level", content = "message", rename_all = "lowercase")]
pub enum Status {
    /// Nothing worth reporting (startup bootstrap, sensor miss).
    #[default]
    Silent,
    Info(String),
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ModuleOutput {
    pub status: Status,
    /// Pipeline variables to publish, e.g. `AS_SKYSTATE`.
    pub exports: BTreeMap<String, String>,
}

impl ModuleOutput {
    pub fn silent() -> Self {
        Self::default()
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            status: Status::Info(message.into()),
            exports: BTreeMap::new(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error(message.into()),
            exports: BTreeMap::new(),
        }
    }

    pub fn export(&mut self, name: &str, value: impl Into<String>) {
        self.exports.insert(name.to_string(), value.into());
    }

    pub fn with_export(mut self, name: &str, value: impl Into<String>) -> Self {
        self.export(name, value);
        self
    }

    /// The status text, empty when silent.
    pub fn message(&self) -> &str {
        match &self.status {
            Status::Silent => "",
            Status::Info(m) | Status::Error(m) => m,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.status, Status::Error(_))
    }
}
