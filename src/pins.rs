//! GPIO / bus identifiers used by the dew heater module.
//!
//! Single source of truth: the config parser, the hardware adapter and the
//! sensor hub all reference this module rather than hard-coding addresses.
//!
//! Pin numbers follow the kernel (BCM / sysfs) numbering that the host's
//! GPIO picker stores in the module options.

use core::fmt;
use core::num::NonZeroU32;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Pin identifiers
// ---------------------------------------------------------------------------

/// A resolved GPIO line.  Zero is never a valid line, so an option that
/// parses to `0` is treated the same as a missing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PinId(NonZeroU32);

impl PinId {
    pub fn new(number: u32) -> Option<Self> {
        NonZeroU32::new(number).map(Self)
    }

    /// Parse a host option value.  Blank, non-numeric and zero values all
    /// resolve to `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        raw.trim().parse::<u32>().ok().and_then(Self::new)
    }

    pub fn number(self) -> u32 {
        self.0.get()
    }
}

impl fmt::Display for PinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GPIO{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// I²C bus
// ---------------------------------------------------------------------------

/// Default I²C character device on a Raspberry Pi.
pub const DEFAULT_I2C_BUS: &str = "/dev/i2c-1";

/// SHT31 with ADDR pin tied low.
pub const SHT31_DEFAULT_I2C_ADDRESS: u8 = 0x44;
/// SHT31 with ADDR pin tied high.
pub const SHT31_ALT_I2C_ADDRESS: u8 = 0x45;

/// BME280 with SDO tied low.
pub const BME280_PRIMARY_I2C_ADDRESS: u8 = 0x76;
/// BME280 with SDO tied high.
pub const BME280_SECONDARY_I2C_ADDRESS: u8 = 0x77;

/// Parse a 7-bit I²C address written either as hex (`0x45`) or decimal.
pub fn parse_i2c_address(raw: &str) -> Option<u8> {
    let raw = raw.trim();
    let value = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16).ok()?,
        None => raw.parse::<u8>().ok()?,
    };
    (0x08..=0x77).contains(&value).then_some(value)
}
