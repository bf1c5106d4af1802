//! AllSkyAI modules end to end through the module entry point.

use std::path::Path;

use allsky_modules::app::classifier::{
    ALLSKYAI_LIVE_ENDPOINT, EXPORT_CLASSIFICATION, EXPORT_INFERENCE, EXPORT_RAIN_FLAG,
    EXPORT_SKY_STATE,
};
use allsky_modules::app::events::AppEvent;
use allsky_modules::config::Params;
use allsky_modules::modules::{ModuleKind, run_classifier};
use allsky_modules::Status;

use super::mock_hw::{MockTransport, RecordingSink};

const HOME: &str = "/home/pi/allsky";

fn reply(classification: &str) -> String {
    format!(
        r#"{{"classification": "{}", "confidence": 91.5, "utc": 1697142569, "inference": 0.043, "img": "a.jpg"}}"#,
        classification
    )
}

fn online(url: &str) -> Params {
    [("imageurl", url)].into_iter().collect()
}

fn local(url: &str) -> Params {
    [("allskyaiurl", url)].into_iter().collect()
}

#[test]
fn sky_state_mapping() {
    let cases = [
        ("clear", "Clear", "False"),
        ("light_clouds", "Clear", "False"),
        ("heavy_clouds", "NOT Clear", "False"),
        ("precipitation", "NOT Clear", "True"),
    ];
    for (classification, sky, rain) in cases {
        let mut http = MockTransport::replying(200, &reply(classification));
        let mut sink = RecordingSink::new();
        let out = run_classifier(
            ModuleKind::AllSkyAiLocal,
            &local("http://allskyai.local:8090/classify"),
            Some(Path::new(HOME)),
            &mut http,
            &mut sink,
        )
        .unwrap();

        assert_eq!(
            out.status,
            Status::Info(format!("Data acquired, classification: {}", classification))
        );
        assert_eq!(out.exports[EXPORT_CLASSIFICATION], classification);
        assert_eq!(out.exports[EXPORT_SKY_STATE], sky, "{}", classification);
        assert_eq!(out.exports[EXPORT_RAIN_FLAG], rain, "{}", classification);
        assert_eq!(out.exports[EXPORT_INFERENCE], "0.043");
    }
}

#[test]
fn local_service_url_is_used_verbatim() {
    let url = "http://allskyai.local:8090/classify?model=v2";
    let mut http = MockTransport::replying(200, &reply("clear"));
    let mut sink = RecordingSink::new();
    run_classifier(
        ModuleKind::AllSkyAiLocal,
        &local(url),
        Some(Path::new(HOME)),
        &mut http,
        &mut sink,
    );
    assert_eq!(http.requests, vec![(url.to_string(), Vec::new())]);
}

#[test]
fn online_image_url_goes_in_the_query() {
    let image = "https://example.org/current/image.jpg?t=1&x=2";
    let mut http = MockTransport::replying(200, &reply("clear"));
    let mut sink = RecordingSink::new();
    run_classifier(
        ModuleKind::AllSkyAiOnline,
        &online(image),
        Some(Path::new(HOME)),
        &mut http,
        &mut sink,
    );
    assert_eq!(http.requests.len(), 1);
    assert_eq!(http.requests[0].0, ALLSKYAI_LIVE_ENDPOINT);
    assert_eq!(
        http.requests[0].1,
        vec![("url".to_string(), image.to_string())]
    );
}

#[test]
fn missing_parameters_produce_exact_errors() {
    let mut http = MockTransport::replying(200, &reply("clear"));
    let mut sink = RecordingSink::new();

    let out = run_classifier(
        ModuleKind::AllSkyAiOnline,
        &Params::new(),
        Some(Path::new(HOME)),
        &mut http,
        &mut sink,
    )
    .unwrap();
    assert_eq!(out.status, Status::Error("Missing public image url".into()));

    let out = run_classifier(
        ModuleKind::AllSkyAiLocal,
        &local(""),
        Some(Path::new(HOME)),
        &mut http,
        &mut sink,
    )
    .unwrap();
    assert_eq!(
        out.status,
        Status::Error("Missing AllskyAI local service url".into())
    );

    let out = run_classifier(
        ModuleKind::AllSkyAiOnline,
        &online("https://example.org/image.jpg"),
        None,
        &mut http,
        &mut sink,
    )
    .unwrap();
    assert_eq!(
        out.status,
        Status::Error("Cannot find ALLSKY_HOME Environment variable".into())
    );

    assert!(http.requests.is_empty());
}

#[test]
fn http_error_reports_response_code() {
    let mut http = MockTransport::replying(404, "not found");
    let mut sink = RecordingSink::new();
    let out = run_classifier(
        ModuleKind::AllSkyAiOnline,
        &online("https://example.org/image.jpg"),
        Some(Path::new(HOME)),
        &mut http,
        &mut sink,
    )
    .unwrap();
    assert_eq!(
        out.status,
        Status::Error("Got error from AllSkyAI API. Response code 404".into())
    );
    assert!(out.exports.is_empty());
}

#[test]
fn bad_json_and_transport_failures_become_error_status() {
    let mut sink = RecordingSink::new();

    let mut http = MockTransport::replying(200, "<html>");
    let out = run_classifier(
        ModuleKind::AllSkyAiLocal,
        &local("http://localhost/classify"),
        Some(Path::new(HOME)),
        &mut http,
        &mut sink,
    )
    .unwrap();
    assert!(out.is_error());
    assert!(out.exports.is_empty());

    let mut http = MockTransport::failing("Connection refused");
    let out = run_classifier(
        ModuleKind::AllSkyAiLocal,
        &local("http://localhost/classify"),
        Some(Path::new(HOME)),
        &mut http,
        &mut sink,
    )
    .unwrap();
    assert_eq!(out.status, Status::Error("Connection refused".into()));
    assert!(matches!(
        sink.events.last(),
        Some(AppEvent::ClassifierFailed(msg)) if msg == "Connection refused"
    ));
}

#[test]
fn dewheater_is_not_a_classifier() {
    let mut http = MockTransport::replying(200, &reply("clear"));
    let mut sink = RecordingSink::new();
    assert!(
        run_classifier(
            ModuleKind::DewHeater,
            &Params::new(),
            Some(Path::new(HOME)),
            &mut http,
            &mut sink,
        )
        .is_none()
    );
}
