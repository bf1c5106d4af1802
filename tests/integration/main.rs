//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a module end to end
//! against mock adapters.  All tests run on the host with no real hardware
//! or network required.

mod classifier_tests;
mod dew_heater_tests;
mod mock_hw;
