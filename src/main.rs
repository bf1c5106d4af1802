//! `allsky-module` — runs one allsky pipeline module per invocation.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                     │
//! │                                                              │
//! │  HardwareAdapter    LogEventSink   KvStore     SystemClock   │
//! │  (Sensor+Relay)     (EventSink)    (Storage)   (Clock)       │
//! │  UreqTransport                                               │
//! │  (ClassifierTransport)                                       │
//! │                                                              │
//! │  ──────────────── Port Trait Boundary ───────────────────    │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │   DewHeaterService · classifier::run (pure logic)      │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The host passes the module options as a JSON object and reads the
//! resulting [`ModuleOutput`] as JSON from stdout.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{error, info};
use serde::Serialize;

use allsky_modules::ModuleKind;
use allsky_modules::ModuleOutput;
use allsky_modules::adapters::hardware::HardwareAdapter;
use allsky_modules::adapters::http::UreqTransport;
use allsky_modules::adapters::log_sink::LogEventSink;
use allsky_modules::adapters::store::KvStore;
use allsky_modules::adapters::time::SystemClock;
use allsky_modules::app::service::DewHeaterService;
use allsky_modules::config::{DewHeaterConfig, Params};
use allsky_modules::modules;
use allsky_modules::pins;

/// Store file name under `$ALLSKY_HOME/config` when `--store` is not given.
const DEFAULT_STORE_FILE: &str = "modules_state.json";

#[derive(Debug, Parser)]
#[command(name = "allsky-module", version, about = "Allsky pipeline modules")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run a module once and print its output as JSON.
    Run {
        /// dewheater, allskyaionline or allskyailocal.
        module: ModuleKind,

        /// Module options as a JSON object.
        #[arg(long, default_value = "{}", conflicts_with = "params_file")]
        params: String,

        /// Read the module options from a JSON file instead.
        #[arg(long)]
        params_file: Option<PathBuf>,

        /// Persistent key-value store shared between invocations.
        #[arg(long, env = "ALLSKY_MODULES_STORE")]
        store: Option<PathBuf>,

        /// Allsky installation directory.
        #[arg(long, env = "ALLSKY_HOME")]
        allsky_home: Option<PathBuf>,

        /// I²C bus device used by the sensor (linux builds).
        #[arg(long, default_value = pins::DEFAULT_I2C_BUS)]
        i2c_bus: String,
    },
    /// Print a module's metadata as JSON.
    Describe { module: ModuleKind },
    /// Print the pipeline variables a module's removal should unset.
    Cleanup { module: ModuleKind },
}

#[derive(Serialize)]
struct CleanupReport {
    module: &'static str,
    env: &'static [&'static str],
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    match Cli::parse().command {
        Command::Run {
            module,
            params,
            params_file,
            store,
            allsky_home,
            i2c_bus,
        } => {
            let raw = match params_file {
                Some(path) => fs::read_to_string(&path)
                    .with_context(|| format!("reading {}", path.display()))?,
                None => params,
            };
            let output = match Params::from_json(&raw) {
                Ok(params) => run(module, &params, store, allsky_home.as_deref(), &i2c_bus),
                Err(e) => ModuleOutput::error(e.to_string()),
            };
            print_json(&output)
        }
        Command::Describe { module } => print_json(&module.meta()),
        Command::Cleanup { module } => print_json(&CleanupReport {
            module: module.name(),
            env: module.cleanup_variables(),
        }),
    }
}

fn run(
    module: ModuleKind,
    params: &Params,
    store: Option<PathBuf>,
    allsky_home: Option<&Path>,
    i2c_bus: &str,
) -> ModuleOutput {
    info!("running {}", module);
    let mut sink = LogEventSink::new();

    if module != ModuleKind::DewHeater {
        let mut transport = UreqTransport::default();
        return modules::run_classifier(module, params, allsky_home, &mut transport, &mut sink)
            .unwrap_or_default();
    }

    let mut store = match open_store(store, allsky_home) {
        Ok(store) => store,
        Err(e) => {
            error!("{}", e);
            return ModuleOutput::error(e.to_string());
        }
    };

    let config = DewHeaterConfig::from_params(params);

    #[cfg(feature = "linux")]
    let mut hw = HardwareAdapter::open_linux(&config, i2c_bus);
    #[cfg(not(feature = "linux"))]
    let mut hw = {
        log::warn!("built without the linux feature, {} is not used", i2c_bus);
        HardwareAdapter::simulated(&config)
    };

    DewHeaterService::new(config).run(&mut hw, &mut store, &SystemClock, &mut sink)
}

/// Store named by `--store`, else `$ALLSKY_HOME/config/modules_state.json`.
/// Having neither is an error: the run marker would not outlive the process.
fn open_store(
    explicit: Option<PathBuf>,
    allsky_home: Option<&Path>,
) -> allsky_modules::Result<KvStore> {
    let path = explicit
        .or_else(|| allsky_home.map(|h| h.join("config").join(DEFAULT_STORE_FILE)))
        .ok_or_else(|| {
            allsky_modules::Error::Init("no store path, pass --store or set ALLSKY_HOME".into())
        })?;
    Ok(KvStore::open(path)?)
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
