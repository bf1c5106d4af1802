//! Fuzz target: AllSkyAI reply decoding
//!
//! Serves arbitrary bytes as a 200 reply body and checks that the module
//! either publishes all five variables or none.
//!
//! Invariants checked:
//! - No panics under any byte sequence
//! - Success exports exactly the classifier variables
//! - Failure exports nothing and reports an error status
//!
//! cargo fuzz run fuzz_classifier_reply

#![no_main]

use std::path::Path;

use allsky_modules::app::classifier::{self, CLASSIFIER_VARIABLES};
use allsky_modules::app::events::AppEvent;
use allsky_modules::app::ports::{ClassifierError, ClassifierTransport, EventSink, HttpReply};
use allsky_modules::config::ClassifierSource;
use libfuzzer_sys::fuzz_target;

struct Body(String);

impl ClassifierTransport for Body {
    fn get(&mut self, _url: &str, _query: &[(&str, &str)]) -> Result<HttpReply, ClassifierError> {
        Ok(HttpReply {
            status: 200,
            body: self.0.clone(),
        })
    }
}

struct Discard;

impl EventSink for Discard {
    fn emit(&mut self, _event: &AppEvent) {}
}

fuzz_target!(|data: &[u8]| {
    let mut transport = Body(String::from_utf8_lossy(data).into_owned());
    let source = ClassifierSource::Local {
        service_url: "http://localhost/classify".into(),
    };
    let out = classifier::run(&source, Some(Path::new("/")), &mut transport, &mut Discard);

    if out.is_error() {
        assert!(out.exports.is_empty());
    } else {
        assert_eq!(out.exports.len(), CLASSIFIER_VARIABLES.len());
        for name in CLASSIFIER_VARIABLES {
            assert!(out.exports.contains_key(name));
        }
    }
});
