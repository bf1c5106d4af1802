//! AllSkyAI sky classification.
//!
//! One blocking GET per invocation, against either the public live endpoint
//! or a self-hosted classify service.  The classification is mapped onto
//! the pipeline's sky-state and rain variables.

use std::path::Path;

use log::{error, info};
use serde::{Deserialize, Serialize};

use crate::config::ClassifierSource;

use super::events::AppEvent;
use super::output::ModuleOutput;
use super::ports::{ClassifierError, ClassifierTransport, EventSink};

pub const ALLSKYAI_LIVE_ENDPOINT: &str = "https://allskyai.com/tfapi/v1/live";

pub const EXPORT_CLASSIFICATION: &str = "AS_AICLASSIFICATION";
pub const EXPORT_CONFIDENCE: &str = "AS_AICONFIDENCE";
pub const EXPORT_INFERENCE: &str = "AS_AIINFERENCE";
pub const EXPORT_SKY_STATE: &str = "AS_SKYSTATE";
pub const EXPORT_RAIN_FLAG: &str = "AS_ALLSKYRAINFLAG";

/// Variables removed when either classifier module is cleaned up.
pub const CLASSIFIER_VARIABLES: [&str; 5] = [
    EXPORT_SKY_STATE,
    EXPORT_RAIN_FLAG,
    EXPORT_CLASSIFICATION,
    EXPORT_CONFIDENCE,
    EXPORT_INFERENCE,
];

/// Body of a successful classification reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub classification: String,
    /// Percent.
    pub confidence: f64,
    /// Seconds spent in the model.
    pub inference: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utc: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,
}

impl Classification {
    pub fn from_json(body: &str) -> Result<Self, ClassifierError> {
        serde_json::from_str(body).map_err(|e| ClassifierError::Decode(e.to_string()))
    }

    pub fn is_clear(&self) -> bool {
        matches!(self.classification.as_str(), "clear" | "light_clouds")
    }

    pub fn is_raining(&self) -> bool {
        self.classification == "precipitation"
    }

    pub fn sky_state(&self) -> &'static str {
        if self.is_clear() { "Clear" } else { "NOT Clear" }
    }

    fn export_into(&self, out: &mut ModuleOutput) {
        out.export(EXPORT_CLASSIFICATION, self.classification.as_str());
        out.export(EXPORT_CONFIDENCE, self.confidence.to_string());
        out.export(EXPORT_INFERENCE, self.inference.to_string());
        out.export(EXPORT_SKY_STATE, self.sky_state());
        out.export(
            EXPORT_RAIN_FLAG,
            if self.is_raining() { "True" } else { "False" },
        );
    }
}

/// Fetch and publish one classification.
///
/// `allsky_home` must be set for the module to run at all, mirroring the
/// rest of the pipeline.  Every failure ends up as an error status; nothing
/// is exported unless the reply decoded.
pub fn run(
    source: &ClassifierSource,
    allsky_home: Option<&Path>,
    transport: &mut impl ClassifierTransport,
    sink: &mut impl EventSink,
) -> ModuleOutput {
    let (url, query, missing) = match source {
        ClassifierSource::Online { image_url } => (
            ALLSKYAI_LIVE_ENDPOINT,
            Some(image_url.as_str()),
            image_url.trim().is_empty().then_some("Missing public image url"),
        ),
        ClassifierSource::Local { service_url } => (
            service_url.as_str(),
            None,
            service_url
                .trim()
                .is_empty()
                .then_some("Missing AllskyAI local service url"),
        ),
    };

    if let Some(message) = missing {
        return fail(message.to_string(), sink);
    }
    if allsky_home.is_none() {
        return fail("Cannot find ALLSKY_HOME Environment variable".into(), sink);
    }

    let query: Vec<(&str, &str)> = query.map(|u| ("url", u)).into_iter().collect();
    let reply = match transport.get(url, &query) {
        Ok(reply) => reply,
        Err(e) => return fail(e.to_string(), sink),
    };
    if reply.status != 200 {
        return fail(
            format!(
                "Got error from AllSkyAI API. Response code {}",
                reply.status
            ),
            sink,
        );
    }

    let data = match Classification::from_json(&reply.body) {
        Ok(data) => data,
        Err(e) => return fail(e.to_string(), sink),
    };

    let mut out = ModuleOutput::info(format!(
        "Data acquired, classification: {}",
        data.classification
    ));
    data.export_into(&mut out);
    info!("{}", out.message());
    sink.emit(&AppEvent::Classified(data));
    out
}

fn fail(message: String, sink: &mut impl EventSink) -> ModuleOutput {
    error!("{}", message);
    sink.emit(&AppEvent::ClassifierFailed(message.clone()));
    ModuleOutput::error(message)
}
