//! u-grouping CLI
//!
//! Usage:
//!   u-grouping --input entities.json [--groups 4] [--group-size 20]
//!              [--threshold-km 30] [--format json]
//!
//! Reads a JSON array of `{"id", "latitude", "longitude"}` objects, splits
//! them into equally sized groups, and prints each group with its travel
//! metrics.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use env_logger::{fmt::Formatter, Builder, Target};
use log::{Level, LevelFilter};
use serde::Serialize;
use u_grouping::evaluation::{GroupMetrics, PartitionReport};
use u_grouping::models::Entity;
use u_grouping::solver::StageStats;
use u_grouping::{GroupingConfig, GroupingOutcome, GroupingSolver, Result};

#[derive(Parser)]
#[command(name = "u-grouping")]
#[command(about = "Split located entities into compact groups of equal size", long_about = None)]
struct Cli {
    /// JSON file with an array of entities
    #[arg(short, long)]
    input: PathBuf,

    /// JSON configuration file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of groups (K)
    #[arg(short = 'k', long)]
    groups: Option<usize>,

    /// Members per group (M); defaults to N / K without a config file
    #[arg(short = 'm', long)]
    group_size: Option<usize>,

    /// Keep entities within this many km in the same group
    #[arg(long)]
    threshold_km: Option<f64>,

    /// Base seed for every randomized stage
    #[arg(long)]
    seed: Option<u64>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Serialize)]
struct Assignment<'a> {
    id: &'a str,
    group: &'a str,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    assignment: Vec<Assignment<'a>>,
    names: &'a [String],
    away_km_before: f64,
    away_km_after: f64,
    report: &'a PartitionReport,
    stats: &'a StageStats,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = init_logger(cli.verbose) {
        eprintln!("failed to initialise logging: {err}");
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_logger(verbose: bool) -> io::Result<()> {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut builder = Builder::new();
    builder
        .filter_level(level)
        .write_style(env_logger::WriteStyle::Never)
        .target(Target::Stderr)
        .format(|buf: &mut Formatter, record| {
            writeln!(buf, "{} {}", level_tag(record.level()), record.args())
        });

    builder.try_init().map_err(io::Error::other)
}

fn level_tag(level: Level) -> &'static str {
    match level {
        Level::Error => "ERROR",
        Level::Warn => "WARN",
        Level::Info => "INFO",
        Level::Debug => "DEBUG",
        Level::Trace => "TRACE",
    }
}

fn run(cli: &Cli) -> Result<()> {
    let entities: Vec<Entity> = serde_json::from_str(&fs::read_to_string(&cli.input)?)?;
    let config = build_config(cli, entities.len())?;

    let outcome = GroupingSolver::new(config).solve(&entities)?;
    match cli.format {
        OutputFormat::Text => print_text(&outcome),
        OutputFormat::Json => print_json(&entities, &outcome)?,
    }
    Ok(())
}

fn build_config(cli: &Cli, num_entities: usize) -> Result<GroupingConfig> {
    let mut config = match &cli.config {
        Some(path) => GroupingConfig::from_json_file(path)?,
        None => GroupingConfig::default(),
    };

    if let Some(k) = cli.groups {
        config.num_groups = k;
    }
    match cli.group_size {
        Some(m) => config.group_size = m,
        None if cli.config.is_none() && config.num_groups > 0 => {
            config.group_size = num_entities / config.num_groups;
        }
        None => {}
    }
    if let Some(t) = cli.threshold_km {
        config = config.with_hard_grouping(t);
    }
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }

    config.validate()?;
    Ok(config)
}

fn print_group(group: &GroupMetrics) {
    println!(
        "\n--- {} ({} members) | avg pair: {:.1} km | max: {:.1} km ---",
        group.name, group.size, group.avg_pair_km, group.max_pair_km
    );
    for id in &group.members {
        println!("  - {id}");
    }
}

fn print_text(outcome: &GroupingOutcome) {
    let report = &outcome.report;

    println!("=== Groups ===");
    for group in &report.groups {
        print_group(group);
    }

    println!("\n=== Travel summary ===");
    if let Some(e) = &report.max_season {
        println!("Largest season total: {} ({}): {:.2} km", e.id, e.group, e.season_km);
    }
    println!("Average away trip per group:");
    for group in &report.groups {
        println!("- {}: {:.2} km", group.name, group.avg_pair_km);
    }
    if let Some(trip) = &report.longest_trip {
        println!(
            "Longest single trip: {} -> {} ({}): {:.2} km",
            trip.from, trip.to, trip.group, trip.km
        );
    }
    println!("Longest trip per group:");
    for group in &report.groups {
        if let Some(trip) = &group.longest_trip {
            println!("- {}: {} -> {} ({:.2} km)", group.name, trip.from, trip.to, trip.km);
        }
    }
    println!(
        "Mean away distance per entity: {:.2} -> {:.2} km",
        outcome.away_km_before, outcome.away_km_after
    );
    if let Some(c) = &outcome.stats.components {
        println!(
            "Hard grouping <= {:.0} km: {} components, {} linked pairs",
            c.threshold_km, c.count, c.linked_pairs
        );
    }
}

fn print_json(entities: &[Entity], outcome: &GroupingOutcome) -> Result<()> {
    let output = JsonOutput {
        assignment: entities
            .iter()
            .enumerate()
            .map(|(i, e)| Assignment {
                id: e.id(),
                group: outcome.group_name(i),
            })
            .collect(),
        names: &outcome.names,
        away_km_before: outcome.away_km_before,
        away_km_after: outcome.away_km_after,
        report: &outcome.report,
        stats: &outcome.stats,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
