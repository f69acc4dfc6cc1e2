//! AquaCore: command-line front end.
//!
//! Runs the tank core over JSON files, for checking a species selection,
//! previewing a rule against recorded history, or replaying a whole rule
//! set through the service with dry-run actuators.
//!
//! ```text
//! aquacore reconcile --catalog species.json --select goldfish,betta
//! aquacore severity  --catalog species.json --select goldfish,betta --metric ph --value 7.9
//! aquacore simulate  --rules rules.json --history history.json --rule r1 --from 0 --to 86400
//! aquacore replay    --rules rules.json --history history.json --catalog species.json --select betta
//! ```
//!
//! Set `RUST_LOG=debug` for engine decisions on stderr.

#![deny(unused_must_use)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use log::info;
use serde::Serialize;
use serde::de::DeserializeOwned;

use aquacore::adapters::dry_run::DryRunActuators;
use aquacore::adapters::log_sink::LogEventSink;
use aquacore::app::commands::AppCommand;
use aquacore::app::service::TankService;
use aquacore::config::EngineConfig;
use aquacore::rules::{Rule, RuleEngine, Window};
use aquacore::snapshot::MetricSnapshot;
use aquacore::species::{Metric, SpeciesCatalog, TankProfile};

// ── Arguments ─────────────────────────────────────────────────

/// AquaCore - aquarium automation and species reconciliation
#[derive(Parser, Debug)]
#[command(name = "aquacore")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Engine configuration (JSON); defaults apply when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Merge the selected species into one tank profile
    Reconcile {
        /// Species catalog (JSON array of profiles)
        #[arg(long)]
        catalog: PathBuf,
        /// Selected species ids, comma separated
        #[arg(long, value_delimiter = ',')]
        select: Vec<String>,
    },

    /// Classify one reading
    Severity {
        #[arg(long)]
        catalog: PathBuf,
        #[arg(long, value_delimiter = ',')]
        select: Vec<String>,
        /// ph, temp, do, tds or ntu
        #[arg(long)]
        metric: String,
        #[arg(long)]
        value: f64,
        /// Judge against this species alone instead of the merged selection
        #[arg(long)]
        species: Option<String>,
    },

    /// Replay one rule over recorded history
    Simulate {
        /// Rule set (JSON array of rules)
        #[arg(long)]
        rules: PathBuf,
        /// History (JSON array of snapshots)
        #[arg(long)]
        history: PathBuf,
        #[arg(long)]
        rule: String,
        #[arg(long)]
        from: u64,
        #[arg(long)]
        to: u64,
        /// Start the window with the device on
        #[arg(long)]
        initially_on: bool,
    },

    /// Drive the full service over history with dry-run actuators
    Replay {
        #[arg(long)]
        rules: PathBuf,
        #[arg(long)]
        history: PathBuf,
        #[arg(long)]
        catalog: Option<PathBuf>,
        #[arg(long, value_delimiter = ',')]
        select: Vec<String>,
    },
}

// ── Entry point ───────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => read_json::<EngineConfig>(path)?,
        None => EngineConfig::default(),
    };
    config.validate().map_err(|e| anyhow!("{e}"))?;

    match cli.command {
        Command::Reconcile { catalog, select } => {
            let catalog = Arc::new(load_catalog(&catalog)?);
            print_json(&TankProfile::compute(&catalog, &select))
        }
        Command::Severity {
            catalog,
            select,
            metric,
            value,
            species,
        } => {
            let catalog = Arc::new(load_catalog(&catalog)?);
            let metric: Metric = metric.parse()?;
            let profile = TankProfile::compute(&catalog, &select);
            let severity = profile.severity(Some(value), metric, species.as_deref());
            print_json(&severity)
        }
        Command::Simulate {
            rules,
            history,
            rule,
            from,
            to,
            initially_on,
        } => {
            let mut engine = RuleEngine::new(config);
            for r in read_json::<Vec<Rule>>(&rules)? {
                let id = r.id.clone();
                engine.upsert(r).with_context(|| format!("rule {id}"))?;
            }
            let series = read_json::<Vec<MetricSnapshot>>(&history)?;
            let steps = engine.simulate_from(&rule, Window::new(from, to), &series, initially_on)?;
            print_json(&steps)
        }
        Command::Replay {
            rules,
            history,
            catalog,
            select,
        } => {
            let catalog = match catalog {
                Some(path) => load_catalog(&path)?,
                None => SpeciesCatalog::default(),
            };
            let mut sink = LogEventSink::new();
            let mut service = TankService::new(config, Arc::new(catalog))?;
            service.handle_command(AppCommand::SelectSpecies(select), &mut sink)?;
            for r in read_json::<Vec<Rule>>(&rules)? {
                service.handle_command(AppCommand::UpsertRule(r), &mut sink)?;
            }

            let mut series = read_json::<Vec<MetricSnapshot>>(&history)?;
            series.sort_by_key(|s| s.ts);
            let mut hw = DryRunActuators::new();
            for snap in &series {
                service.tick(snap, &mut hw, &mut sink);
            }
            info!("replayed {} ticks", service.tick_count());
            print_json(&hw.into_ledger())
        }
    }
}

// ── Helpers ───────────────────────────────────────────────────

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn load_catalog(path: &Path) -> Result<SpeciesCatalog> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    SpeciesCatalog::from_json(&text).with_context(|| format!("loading {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
