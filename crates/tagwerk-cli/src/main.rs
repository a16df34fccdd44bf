//! CLI for tagwerk.
//!
//! Replays exported day records and policy rules through the whole pipeline
//! (state build, clustering, value estimation, rule backtest) and prints the
//! results as JSON. Nothing is written back anywhere.

mod config;
mod source;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::EngineConfig;
use serde::Serialize;
use source::{load_projects, JsonRules, JsonlRecords};
use std::path::PathBuf;
use tagwerk_core::{assemble_transitions, Computed, Lookback, RecordSource, Transition};
use tagwerk_policy::{
    action_stats, component_stats, evaluate_rules, exploration_ratio, suggest_action,
    weekly_audit, ActionStats, AuditInput, ComponentStats, EvaluatedRule, RuleSource,
};
use tagwerk_regimes::{
    cluster_states, estimate_values, td_errors, ClusterCatalogue, RegimeTable, RegimeTransition,
    ValueEstimate,
};
use time::{macros::format_description, Date, Duration};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Engine configuration (JSON); defaults apply when absent
    #[arg(long, env = "TAGWERK_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Log level for stderr output (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline and print a JSON report
    Report {
        #[command(flatten)]
        inputs: Inputs,

        /// Reference date for the lookback window and active rules (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        today: Date,
    },
    /// Print the deterministic audit of one week
    Audit {
        #[command(flatten)]
        inputs: Inputs,

        /// First day of the audited week (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        week_start: Date,
    },
    /// Print the active regime table
    Regimes,
}

#[derive(clap::Args)]
struct Inputs {
    /// Day records, one JSON object per line
    #[arg(long)]
    records: PathBuf,

    /// Policy rules as a JSON array
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Project portfolio as a JSON array
    #[arg(long)]
    projects: Option<PathBuf>,
}

fn parse_date(value: &str) -> std::result::Result<Date, String> {
    Date::parse(value.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

#[derive(Serialize)]
struct Report {
    today: Date,
    window_start: Date,
    records_read: usize,
    transitions: Vec<RegimeTransition>,
    clusters: Computed<ClusterCatalogue>,
    values: Computed<Vec<ValueEstimate>>,
    rules: Vec<EvaluatedRule>,
    suggestion: Option<Suggestion>,
    action_stats: Vec<ActionStats>,
    exploration_ratio: Option<f64>,
    component_stats: Vec<ComponentStats>,
}

#[derive(Serialize)]
struct Suggestion {
    rule_id: String,
    rule_name: String,
    action: tagwerk_core::ActionTag,
    avg_reward_when_followed: Option<f64>,
}

struct Loaded {
    records_read: usize,
    transitions: Vec<Transition>,
    rules: Vec<tagwerk_policy::PolicyRule>,
}

fn load(inputs: &Inputs, config: &EngineConfig, window: &Lookback) -> Result<Loaded> {
    let records = JsonlRecords::new(&inputs.records)
        .records(window)
        .context("Failed to read day records")?;
    let projects =
        load_projects(inputs.projects.as_deref()).context("Failed to read projects")?;
    let rules = JsonRules::new(inputs.rules.clone())
        .rules()
        .context("Failed to read rules")?;

    let transitions = assemble_transitions(&records, &projects, &config.reward);
    info!(
        records = records.len(),
        transitions = transitions.len(),
        rules = rules.len(),
        "loaded history"
    );
    Ok(Loaded {
        records_read: records.len(),
        transitions,
        rules,
    })
}

/// Transitions with their regime, and TD errors once values exist.
fn label_transitions(
    transitions: &[Transition],
    table: &RegimeTable,
    values: &Computed<Vec<ValueEstimate>>,
    config: &EngineConfig,
) -> Vec<RegimeTransition> {
    let enriched = match values {
        Computed::Ready(estimates) => {
            td_errors(transitions, table, estimates, &config.value).ready()
        }
        Computed::InsufficientHistory { .. } => None,
    };
    enriched.unwrap_or_else(|| {
        transitions
            .iter()
            .map(|t| RegimeTransition {
                transition: t.clone(),
                regime: table.label(table.assign(&t.state)).unwrap_or_default().to_string(),
            })
            .collect()
    })
}

fn run_report(inputs: &Inputs, today: Date, config: &EngineConfig) -> Result<Report> {
    let window = Lookback::new(today, config.lookback_days);
    let loaded = load(inputs, config, &window)?;
    let transitions = &loaded.transitions;
    let table = &config.regimes;

    let values = estimate_values(transitions, table, &config.value);
    let clusters = cluster_states(transitions, table, &config.value);
    let rules = evaluate_rules(&loaded.rules, transitions, today, &config.policy);
    let suggestion = transitions
        .iter()
        .rev()
        .find(|t| t.date <= today)
        .and_then(|latest| suggest_action(&latest.state, &rules))
        .map(|e| Suggestion {
            rule_id: e.rule.id.clone(),
            rule_name: e.rule.name.clone(),
            action: e.rule.action,
            avg_reward_when_followed: e.avg_reward_when_followed,
        });
    if let Computed::InsufficientHistory { available, required } = &values {
        info!(available, required, "not enough history for value estimates");
    }

    Ok(Report {
        today,
        window_start: window.start(),
        records_read: loaded.records_read,
        transitions: label_transitions(transitions, table, &values, config),
        clusters,
        values,
        rules,
        suggestion,
        action_stats: action_stats(transitions),
        exploration_ratio: exploration_ratio(transitions),
        component_stats: component_stats(transitions),
    })
}

fn run_audit(
    inputs: &Inputs,
    week_start: Date,
    config: &EngineConfig,
) -> Result<tagwerk_policy::WeeklyAudit> {
    let week_end = week_start
        .checked_add(Duration::days(6))
        .context("Week start out of range")?;
    let window = Lookback::new(week_end, config.lookback_days);
    let loaded = load(inputs, config, &window)?;
    Ok(weekly_audit(&AuditInput {
        week_start,
        transitions: &loaded.transitions,
        rules: &loaded.rules,
        table: &config.regimes,
        value_params: &config.value,
        policy_params: &config.policy,
    }))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{out}");
    Ok(())
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let config = EngineConfig::load(cli.config.as_deref())?;
    debug!(lookback_days = config.lookback_days, "configuration loaded");

    match &cli.command {
        Commands::Report { inputs, today } => print_json(&run_report(inputs, *today, &config)?),
        Commands::Audit { inputs, week_start } => {
            print_json(&run_audit(inputs, *week_start, &config)?)
        }
        Commands::Regimes => print_json(&config.regimes),
    }
}
