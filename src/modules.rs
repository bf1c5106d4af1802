//! Module registry: names, metadata and per-invocation entry points.
//!
//! Each module is invoked by the host once per captured frame with a flat
//! option mapping.

use core::fmt;
use core::str::FromStr;
use std::path::Path;

use serde::Serialize;

use crate::app::classifier::{self, CLASSIFIER_VARIABLES};
use crate::app::output::ModuleOutput;
use crate::app::ports::{ClassifierTransport, ConfigError, EventSink};
use crate::app::service;
use crate::config::{ClassifierSource, Params, SensorKind};
use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleKind {
    DewHeater,
    AllSkyAiOnline,
    AllSkyAiLocal,
}

impl ModuleKind {
    pub const ALL: [Self; 3] = [Self::DewHeater, Self::AllSkyAiOnline, Self::AllSkyAiLocal];

    /// Short name used on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Self::DewHeater => "dewheater",
            Self::AllSkyAiOnline => "allskyaionline",
            Self::AllSkyAiLocal => "allskyailocal",
        }
    }

    /// Pipeline variables to unset when the module is removed.
    pub fn cleanup_variables(self) -> &'static [&'static str] {
        match self {
            Self::DewHeater => &service::EXPORTS,
            Self::AllSkyAiOnline | Self::AllSkyAiLocal => &CLASSIFIER_VARIABLES,
        }
    }

    pub fn meta(self) -> ModuleMeta {
        match self {
            Self::DewHeater => dewheater_meta(),
            Self::AllSkyAiOnline => ModuleMeta {
                name: "AllSkyAI Online",
                description: "Gets results from the AllSkyAI service",
                module: "allsky_allskyaionline",
                version: "v1.0.0",
                experimental: true,
                events: &["day", "night"],
                arguments: vec![ArgumentMeta::text(
                    "imageurl",
                    "",
                    true,
                    "Image public URL",
                    "URL of current AllSky image available from internet",
                )],
            },
            Self::AllSkyAiLocal => ModuleMeta {
                name: "AllSkyAI Local",
                description: "Gets results from the AllSkyAI local service",
                module: "allsky_allskyailocal",
                version: "v1.0.0",
                experimental: true,
                events: &["day", "night"],
                arguments: vec![ArgumentMeta::text(
                    "allskyaiurl",
                    "",
                    true,
                    "URL to Classify endpoint",
                    "URL to Classify endpoint for local AllskyAI service",
                )],
            },
        }
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModuleKind {
    type Err = Error;

    /// Accepts the short name or the host's `allsky_`-prefixed module name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        let short = name.strip_prefix("allsky_").unwrap_or(&name);
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == short)
            .ok_or_else(|| ConfigError::UnknownModule(s.to_string()).into())
    }
}

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

/// What the host's module manager shows for a module.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleMeta {
    pub name: &'static str,
    pub description: &'static str,
    pub module: &'static str,
    pub version: &'static str,
    pub experimental: bool,
    pub events: &'static [&'static str],
    pub arguments: Vec<ArgumentMeta>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Select { values: Vec<&'static str> },
    Gpio,
    Checkbox,
    Spinner { min: i32, max: i32, step: i32 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArgumentMeta {
    pub option: &'static str,
    pub default: &'static str,
    pub required: bool,
    pub description: &'static str,
    pub help: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tab: Option<&'static str>,
    pub field: FieldType,
}

impl ArgumentMeta {
    fn text(
        option: &'static str,
        default: &'static str,
        required: bool,
        description: &'static str,
        help: &'static str,
    ) -> Self {
        Self {
            option,
            default,
            required,
            description,
            help,
            tab: None,
            field: FieldType::Text,
        }
    }

    fn on_tab(mut self, tab: &'static str, field: FieldType) -> Self {
        self.tab = Some(tab);
        self.field = field;
        self
    }
}

fn dewheater_meta() -> ModuleMeta {
    let spinner = |min, max| FieldType::Spinner { min, max, step: 1 };
    ModuleMeta {
        name: "Sky Dew Heater Control",
        description: "Controls a dew heater via a temperature and humidity sensor",
        module: "allsky_dewheater",
        version: "v1.0.0",
        experimental: true,
        events: &["day", "night"],
        arguments: vec![
            ArgumentMeta::text(
                "type",
                "None",
                false,
                "Sensor Type",
                "The type of sensor that is being used.",
            )
            .on_tab(
                "Sensor",
                FieldType::Select {
                    values: SensorKind::ALL.iter().map(|k| k.label()).collect(),
                },
            ),
            ArgumentMeta::text(
                "inputpin",
                "",
                true,
                "Input Pin",
                "The input pin for DHT/SPI type sensors, not required for i2c devices",
            )
            .on_tab("Sensor", FieldType::Gpio),
            ArgumentMeta::text(
                "i2caddress",
                "",
                true,
                "I2C Address",
                "Override the standard i2c address for a device",
            )
            .on_tab("Sensor", FieldType::Text),
            ArgumentMeta::text(
                "heaterpin",
                "",
                true,
                "Heater Pin",
                "The pin the heater control relay is connected to",
            )
            .on_tab("Heater", FieldType::Gpio),
            ArgumentMeta::text(
                "heaterstartupstate",
                "OFF",
                false,
                "heater Startup State",
                "The initial state of the dew heater when allsky is started. \
                 This is only used if there is no previous status",
            )
            .on_tab(
                "Heater",
                FieldType::Select {
                    values: vec!["ON", "OFF"],
                },
            ),
            ArgumentMeta::text(
                "invertrelay",
                "False",
                false,
                "Invert Relay",
                "Normally a GPIO pin will go high to enable a relay. Selecting this option \
                 if the relay is wired to activate on the GPIO pin going Low",
            )
            .on_tab("Heater", FieldType::Checkbox),
            ArgumentMeta::text(
                "frequency",
                "0",
                true,
                "Delay",
                "The delay between sensor reads in seconds. Zero will disable this and run \
                 the check after every frame",
            )
            .on_tab("Dew Control", spinner(0, 1000)),
            ArgumentMeta::text(
                "limit",
                "10",
                true,
                "Limit",
                "If the temperature is within this many degrees of the dew point the heater \
                 will be enabled or disabled",
            )
            .on_tab("Dew Control", spinner(-60, 50)),
            ArgumentMeta::text(
                "force",
                "0",
                true,
                "Forced Temperature",
                "Always enable the heater when the ambient temperature is below this value, \
                 zero will disable this.",
            )
            .on_tab("Dew Control", spinner(-60, 50)),
            ArgumentMeta::text(
                "max",
                "0",
                true,
                "Max Heater Time",
                "The maximum time in seconds for the heater to be on. Zero will disable this.",
            )
            .on_tab("Dew Control", spinner(0, 86_400)),
        ],
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// One classifier invocation for either AllSkyAI module.
///
/// Returns `None` for [`ModuleKind::DewHeater`], which the binary runs
/// through [`DewHeaterService`](crate::app::service::DewHeaterService)
/// against the hardware it claims.
pub fn run_classifier(
    kind: ModuleKind,
    params: &Params,
    allsky_home: Option<&Path>,
    transport: &mut impl ClassifierTransport,
    sink: &mut impl EventSink,
) -> Option<ModuleOutput> {
    let source = match kind {
        ModuleKind::DewHeater => return None,
        ModuleKind::AllSkyAiOnline => ClassifierSource::online_from_params(params),
        ModuleKind::AllSkyAiLocal => ClassifierSource::local_from_params(params),
    };
    Some(classifier::run(&source, allsky_home, transport, sink))
}
