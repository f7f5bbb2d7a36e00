//! asset-health - vibration history scoring from the command line
//!
//! # Usage
//!
//! ```bash
//! # Score a reading log (JSON array of readings)
//! asset-health aggregate readings.json
//!
//! # Same, ranked by risk, reading from stdin
//! cat readings.json | asset-health aggregate - --ranked
//!
//! # Validate a reading form before submission
//! asset-health validate reading submission.json
//!
//! # Maintenance plan, using equipment types from the store
//! asset-health plan readings.json --registry
//!
//! # Data quality report
//! asset-health quality readings.json
//!
//! # Manage the persisted equipment list
//! asset-health store put pump.json
//! asset-health store list
//! ```
//!
//! # Environment Variables
//!
//! - `ASSET_HEALTH_CONFIG`: Path to the TOML config (default: ./asset_health.toml)
//! - `RUST_LOG`: Logging level (default: info)
//!
//! Results go to stdout as pretty JSON; logs go to stderr.

use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{info, warn};

use asset_health::config::validation::validate_physical_ranges;
use asset_health::processing::{
    assess_data_quality, parse_reading_log, plan_maintenance, EquipmentCategory, FleetOverview,
    MaintenanceSchedule, QualityOptions,
};
use asset_health::reliability::{
    assess_risk, pareto_analysis, pfmea_worksheet, FailureFrequency, FailureMode, RiskFactors,
};
use asset_health::{
    aggregate_json, rank_by_risk, validate_enhanced_required_fields, validate_equipment_reading,
    validate_field, validate_required_fields, EquipmentReading, EquipmentRecord, EquipmentRegistry,
    FieldValue, HealthConfig, ReadingForm, SledStore,
};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "asset-health")]
#[command(about = "Equipment vibration health scoring and sensor validation")]
#[command(version)]
struct CliArgs {
    /// Config file (overrides ASSET_HEALTH_CONFIG and ./asset_health.toml)
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: SubCommand,
}

#[derive(clap::Subcommand, Debug)]
enum SubCommand {
    /// Aggregate a vibration reading log into per-equipment summaries
    Aggregate {
        /// JSON file holding an array of readings ("-" for stdin)
        input: String,
        /// Order summaries by risk score, highest first
        #[arg(long, conflicts_with = "overview")]
        ranked: bool,
        /// Print fleet counts instead of the summaries
        #[arg(long)]
        overview: bool,
    },

    /// Maintenance schedule from a reading log, highest priority first
    Plan {
        /// JSON file holding an array of readings ("-" for stdin)
        input: String,
        /// Take equipment categories from the persisted equipment list
        #[arg(long)]
        registry: bool,
    },

    /// Data quality report over a reading log
    Quality {
        /// JSON file holding an array of readings ("-" for stdin)
        input: String,
        /// Equipment with fewer readings is flagged as sparse
        #[arg(long, default_value_t = 10)]
        min_readings: usize,
        /// Anomaly threshold in standard deviations
        #[arg(long, default_value_t = 3.0)]
        sigma: f64,
    },

    /// Validate sensor input
    #[command(subcommand)]
    Validate(ValidateCommand),

    /// Load, validate and print the effective configuration
    CheckConfig {
        /// Print the effective config as TOML
        #[arg(long)]
        print: bool,
    },

    /// Manage the persisted equipment list
    #[command(subcommand)]
    Store(StoreCommand),

    /// Reliability worksheets
    #[command(subcommand)]
    Reliability(ReliabilityCommand),
}

#[derive(clap::Subcommand, Debug)]
enum ValidateCommand {
    /// A complete equipment reading (pump/motor/compressor + operational)
    Reading {
        input: String,
    },
    /// Form header fields (date, equipment selection, pump number)
    Form {
        input: String,
        /// Also require at least one selected equipment item
        #[arg(long)]
        enhanced: bool,
    },
    /// A single field value
    Field {
        field: String,
        value: String,
    },
}

#[derive(clap::Subcommand, Debug)]
enum StoreCommand {
    /// List all registered equipment
    List,
    /// Show one record
    Get { id: String },
    /// Insert or replace records from a JSON file (one record or an array)
    Put { input: String },
    /// Remove a record
    Remove { id: String },
}

#[derive(clap::Subcommand, Debug)]
enum ReliabilityCommand {
    /// Weighted risk assessment from a JSON factor set
    Risk {
        #[arg(long)]
        equipment: String,
        input: String,
    },
    /// PFMEA worksheet from a JSON array of failure modes
    Pfmea {
        #[arg(long)]
        equipment: String,
        input: String,
    },
    /// Pareto analysis from a JSON array of {mode, frequency}
    Pareto { input: String },
}

// ============================================================================
// Helpers
// ============================================================================

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(path: Option<&Path>) -> Result<HealthConfig> {
    match path {
        Some(p) => {
            let config = HealthConfig::load_from_file(p)
                .with_context(|| format!("Failed to load config {}", p.display()))?;
            info!(path = %p.display(), "Loaded health config");
            Ok(config)
        }
        None => Ok(HealthConfig::load()),
    }
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(input).with_context(|| format!("Failed to read {input}"))
    }
}

fn read_json<T: serde::de::DeserializeOwned>(input: &str) -> Result<T> {
    let raw = read_input(input)?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid JSON in {input}"))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Numbers parse as numbers, anything else is kept as text
fn parse_field_value(raw: &str) -> FieldValue {
    raw.trim()
        .parse::<f64>()
        .map_or_else(|_| FieldValue::Text(raw.to_string()), FieldValue::Number)
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

// ============================================================================
// Subcommands
// ============================================================================

fn run_aggregate(input: &str, ranked: bool, overview: bool, config: &HealthConfig) -> Result<()> {
    let log: serde_json::Value = read_json(input)?;
    if !log.is_array() {
        warn!(input, "Reading log is not a JSON array, nothing to aggregate");
    }
    let summaries = aggregate_json(&log, config).context("Malformed reading in log")?;

    if overview {
        print_json(&FleetOverview::from_summaries(&summaries))
    } else if ranked {
        print_json(&rank_by_risk(&summaries))
    } else {
        print_json(&summaries)
    }
}

fn run_plan(input: &str, use_registry: bool, config: &HealthConfig) -> Result<()> {
    let log: serde_json::Value = read_json(input)?;
    let summaries = aggregate_json(&log, config).context("Malformed reading in log")?;

    let categories: HashMap<String, EquipmentCategory> = if use_registry {
        let store = SledStore::open(&config.storage.path)
            .with_context(|| format!("Failed to open store at {}", config.storage.path.display()))?;
        EquipmentRegistry::with_key(store, config.storage.equipment_key.clone())
            .list()?
            .into_iter()
            .filter_map(|r| {
                let category = r.equipment_type.as_deref()?.parse().ok()?;
                Some((r.id, category))
            })
            .collect()
    } else {
        HashMap::new()
    };

    let plans = plan_maintenance(&summaries, chrono::Utc::now(), |s| {
        categories.get(&s.id).copied().unwrap_or_default()
    });
    let schedule = MaintenanceSchedule::new(plans);
    info!(
        jobs = schedule.plans.len(),
        total_hours = schedule.total_hours,
        total_cost = schedule.total_cost,
        "Planned maintenance"
    );
    print_json(&schedule)
}

fn run_quality(input: &str, min_readings: usize, sigma: f64) -> Result<()> {
    let log: serde_json::Value = read_json(input)?;
    let readings = parse_reading_log(&log).context("Malformed reading in log")?;
    let options = QualityOptions {
        anomaly_sigma: sigma,
        min_readings,
        ..QualityOptions::default()
    };
    let report = assess_data_quality(&readings, &options, chrono::Utc::now());
    if report.has_anomalies() {
        warn!(quality_score = report.quality_score, "Anomalies detected in reading log");
    }
    print_json(&report)
}

/// Returns whether the input passed
fn run_validate(command: ValidateCommand) -> Result<bool> {
    match command {
        ValidateCommand::Reading { input } => {
            let reading: EquipmentReading = read_json(&input)?;
            let result = validate_equipment_reading(&reading);
            print_json(&result)?;
            Ok(result.is_valid)
        }
        ValidateCommand::Form { input, enhanced } => {
            let form: ReadingForm = read_json(&input)?;
            let result = if enhanced {
                validate_enhanced_required_fields(&form)
            } else {
                validate_required_fields(&form)
            };
            print_json(&result)?;
            Ok(result.is_valid)
        }
        ValidateCommand::Field { field, value } => {
            let check = validate_field(&field, &parse_field_value(&value));
            print_json(&check)?;
            Ok(check.is_valid)
        }
    }
}

fn run_check_config(path: Option<&Path>, print: bool) -> Result<()> {
    // Unlike the other subcommands, a broken discovered file is an error here.
    let config = match path {
        Some(p) => load_config(Some(p))?,
        None => match HealthConfig::load_strict().context("Config failed to load")? {
            (config, Some(found)) => {
                info!(path = %found.display(), "Loaded health config");
                config
            }
            (config, None) => {
                info!("No config file found, checking built-in defaults");
                config
            }
        },
    };
    config.validate().context("Config failed validation")?;

    let (_, warnings) = validate_physical_ranges(&config);
    for w in &warnings {
        warn!("{}", w);
    }

    if print {
        print!("{}", config.to_toml()?);
    }
    info!(warnings = warnings.len(), "Config OK");
    Ok(())
}

fn run_store(command: StoreCommand, config: &HealthConfig) -> Result<()> {
    let store = SledStore::open(&config.storage.path)
        .with_context(|| format!("Failed to open store at {}", config.storage.path.display()))?;
    let registry = EquipmentRegistry::with_key(store, config.storage.equipment_key.clone());

    match command {
        StoreCommand::List => print_json(&registry.list()?)?,
        StoreCommand::Get { id } => match registry.get(&id)? {
            Some(record) => print_json(&record)?,
            None => bail!("No equipment with id '{id}'"),
        },
        StoreCommand::Put { input } => {
            let records = match read_json::<OneOrMany<EquipmentRecord>>(&input)? {
                OneOrMany::Many(records) => records,
                OneOrMany::One(record) => vec![record],
            };
            for record in records {
                let id = record.id.clone();
                let replaced = registry.upsert(record)?;
                info!(id = %id, replaced, "Stored equipment");
            }
        }
        StoreCommand::Remove { id } => {
            if !registry.remove(&id)? {
                warn!(id = %id, "No equipment with that id");
            }
        }
    }

    registry.store().flush().context("Failed to flush store")?;
    Ok(())
}

fn run_reliability(command: ReliabilityCommand) -> Result<()> {
    match command {
        ReliabilityCommand::Risk { equipment, input } => {
            let factors: RiskFactors = read_json(&input)?;
            print_json(&assess_risk(&equipment, &factors)?)
        }
        ReliabilityCommand::Pfmea { equipment, input } => {
            let modes: Vec<FailureMode> = read_json(&input)?;
            print_json(&pfmea_worksheet(&equipment, modes)?)
        }
        ReliabilityCommand::Pareto { input } => {
            let modes: Vec<FailureFrequency> = read_json(&input)?;
            print_json(&pareto_analysis(&modes)?)
        }
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(args.json_logs);

    let config_path = args.config.as_deref();

    match args.command {
        SubCommand::Aggregate { input, ranked, overview } => {
            let config = load_config(config_path)?;
            run_aggregate(&input, ranked, overview, &config)
        }
        SubCommand::Plan { input, registry } => {
            let config = load_config(config_path)?;
            run_plan(&input, registry, &config)
        }
        SubCommand::Quality { input, min_readings, sigma } => run_quality(&input, min_readings, sigma),
        SubCommand::Validate(command) => {
            if !run_validate(command)? {
                std::process::exit(1);
            }
            Ok(())
        }
        SubCommand::CheckConfig { print } => run_check_config(config_path, print),
        SubCommand::Store(command) => {
            let config = load_config(config_path)?;
            run_store(command, &config)
        }
        SubCommand::Reliability(command) => run_reliability(command),
    }
}
