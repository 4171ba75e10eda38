/// Offline analyst tool over a dashboard data directory.
///
/// Loads statistics.json, relations.json, bounds.json and formations.json,
/// then prints the requested view as JSON on stdout. Diagnostics go to
/// stderr, filtered by RUST_LOG (default `info`).
use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use ecomap_core::analysis::ThresholdMode;
use ecomap_core::feature::{MapFeature, ScreenPoint};
use ecomap_core::resolver::StaticFeatureSource;
use ecomap_core::{Dashboard, DashboardConfig, Datasets};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

// ── CLI ──────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "ecomap", about = "Ecosystem representativeness figures from the dashboard datasets")]
struct Args {
    /// Directory holding the four dataset files
    #[arg(short, long, default_value = "data")]
    data_dir: PathBuf,

    /// Optional JSON configuration (partial; missing fields keep defaults)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Coverage target in percent (defaults to the configured one)
    #[arg(short, long)]
    threshold: Option<f64>,

    /// Fail if any dataset cannot be loaded
    #[arg(long)]
    strict: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// National benchmark and the aggregate of the searched subset
    Summary {
        #[arg(short, long, default_value = "")]
        search: String,
    },
    /// Filter plan and map commands for a search term
    Filters {
        #[arg(short, long, default_value = "")]
        search: String,
    },
    /// Coverage breakdown of the ecosystem named exactly by the search term
    Breakdown {
        #[arg(short, long)]
        search: String,
    },
    /// Chart rows of the searched subset, highest coverage first
    Chart {
        #[arg(short, long, default_value = "")]
        search: String,
    },
    /// Priority sites in over- or under-represented ecosystems
    Analyze {
        /// OVER or UNDER
        #[arg(short, long, default_value = "UNDER")]
        mode: ThresholdMode,
    },
    /// Formation catalog sorted by code
    Catalog,
    /// Resolve a clicked feature into popup fields
    Label {
        /// JSON file: {"feature": {...}, "point": {...}, "loaded": [...], "rendered": [...]}
        click: PathBuf,
    },
}

/// Input of the `label` subcommand.
#[derive(Deserialize)]
struct ClickFile {
    feature: MapFeature,
    #[serde(default)]
    point: Option<ScreenPoint>,
    #[serde(flatten)]
    features: StaticFeatureSource,
}

#[derive(Serialize)]
struct Summary<'a> {
    search: &'a str,
    threshold: f64,
    ecosystems: usize,
    national: ecomap_core::aggregate::NationalBenchmark,
    subset: ecomap_core::aggregate::CoverageAggregate,
}

// ── Main ─────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut dash = open_dashboard(&args)?;

    let out = match &args.command {
        Command::Summary { search } => {
            dash.set_search_term(search);
            serde_json::to_value(Summary {
                search,
                threshold: dash.threshold(),
                ecosystems: dash.datasets().stats.len(),
                national: dash.national_benchmark(),
                subset: dash.global_aggregate(),
            })?
        }
        Command::Filters { search } => {
            dash.set_search_term(search);
            let plan = dash.filter_plan();
            let commands = plan.commands(dash.config().fit);
            serde_json::json!({ "plan": plan, "commands": commands })
        }
        Command::Breakdown { search } => {
            dash.set_search_term(search);
            let Some(breakdown) = dash.selected_breakdown() else {
                bail!("no ecosystem is named exactly `{search}`");
            };
            serde_json::json!({ "breakdown": breakdown, "slices": dash.coverage_slices() })
        }
        Command::Chart { search } => {
            dash.set_search_term(search);
            serde_json::to_value(dash.chart_rows())?
        }
        Command::Analyze { mode } => serde_json::to_value(dash.analyze(*mode))?,
        Command::Catalog => serde_json::to_value(dash.formation_catalog())?,
        Command::Label { click } => {
            let text = fs::read_to_string(click)
                .with_context(|| format!("reading {}", click.display()))?;
            let input: ClickFile = serde_json::from_str(&text)
                .with_context(|| format!("parsing {}", click.display()))?;
            let label = dash.label_for(&input.feature, &input.features, input.point);
            serde_json::to_value(label)?
        }
    };

    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn open_dashboard(args: &Args) -> Result<Dashboard> {
    let config = match &args.config {
        Some(path) => DashboardConfig::from_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => DashboardConfig::default(),
    };

    let (datasets, errors) = Datasets::load_dir(&args.data_dir, &config.files);
    if args.strict {
        if let Some(first) = errors.into_iter().next() {
            return Err(first).context("dataset load failed (--strict)");
        }
    } else if !errors.is_empty() {
        warn!(failed = errors.len(), "continuing with partial data");
    }
    info!(
        dir = %args.data_dir.display(),
        ecosystems = datasets.stats.len(),
        formations = datasets.formations.len(),
        "data loaded"
    );

    let mut dash = Dashboard::with_datasets(config, datasets);
    if let Some(t) = args.threshold {
        if !(0.0..=100.0).contains(&t) {
            bail!("threshold must be within 0..=100, got {t}");
        }
        dash.set_threshold(t);
    }
    Ok(dash)
}
