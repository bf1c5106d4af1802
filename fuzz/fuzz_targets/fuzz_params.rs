//! Fuzz target: host options → `DewHeaterConfig` → decision
//!
//! Feeds arbitrary bytes as the option JSON and, when they parse, runs the
//! steady-state decision against a sample carved from the same input.
//!
//! Invariants checked:
//! - No panics under any byte sequence
//! - Options without a usable heater pin yield the default config
//! - The steady-state decision never reports an invalid pin
//!
//! cargo fuzz run fuzz_params

#![no_main]

use allsky_modules::app::service::{Decision, decide};
use allsky_modules::config::{DewHeaterConfig, Params};
use allsky_modules::sensors::Reading;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() < 8 {
        return;
    }
    let (sample, json) = data.split_at(8);
    let Ok(json) = std::str::from_utf8(json) else {
        return;
    };
    let Ok(params) = Params::from_json(json) else {
        return;
    };
    let config = DewHeaterConfig::from_params(&params);
    if config.heater_pin.is_none() {
        assert_eq!(config, DewHeaterConfig::default());
    }

    let t = f32::from_le_bytes([sample[0], sample[1], sample[2], sample[3]]);
    let rh = f32::from_le_bytes([sample[4], sample[5], sample[6], sample[7]]);
    let reading = Reading::new(
        t.is_finite().then_some(t.clamp(-40.0, 125.0)),
        rh.is_finite().then_some(rh.clamp(0.0, 100.0)),
    );

    let decision = decide(&config, reading);
    let _ = decision.to_output();
    assert!(!matches!(decision, Decision::InvalidPin));
});
