//! Dashboard CLI
//!
//! Loads a STAC catalog into the dashboard state, applies a dataset and
//! station selection, and prints the resulting themes, datasets, layers or
//! point series as JSON.

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use dashboard_state::{Dashboard, DashboardConfig};

/// Dashboard state CLI
#[derive(Parser, Debug)]
#[command(name = "dashboard")]
#[command(about = "Load a STAC catalog and print dashboard state as JSON")]
struct Cli {
    /// Root catalog URL (overrides the config file)
    #[arg(long, env = "CATALOG_URL")]
    catalog_url: Option<String>,

    /// YAML configuration file
    #[arg(long, env = "DASHBOARD_CONFIG")]
    config: Option<PathBuf>,

    /// Comma-separated ids of the datasets to select
    #[arg(long)]
    datasets: Option<String>,

    /// Station index used for point series
    #[arg(long)]
    station: Option<u64>,

    /// Recolor a layer after loading: `dataset_id:min:max` (repeatable)
    #[arg(long, value_parser = ReclassifyArg::from_str)]
    reclassify: Vec<ReclassifyArg>,

    /// Log level
    #[arg(long, default_value = "warn", env = "RUST_LOG")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// Theme keywords of the root catalog
    Themes,
    /// Registered datasets and the children that failed to load
    Datasets,
    /// Active map layers
    Layers,
    /// Point series at the selected station
    Series,
}

/// Argument of `--reclassify`.
#[derive(Debug, Clone, PartialEq)]
struct ReclassifyArg {
    dataset_id: String,
    min: f64,
    max: f64,
}

impl FromStr for ReclassifyArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut parts = s.rsplitn(3, ':');
        let (max, min, dataset_id) = match (parts.next(), parts.next(), parts.next()) {
            (Some(max), Some(min), Some(id)) if !id.is_empty() => (max, min, id),
            _ => return Err(format!("expected dataset_id:min:max, got '{}'", s)),
        };
        let min = min
            .parse()
            .map_err(|_| format!("min is not a number: '{}'", min))?;
        let max = max
            .parse()
            .map_err(|_| format!("max is not a number: '{}'", max))?;
        Ok(Self {
            dataset_id: dataset_id.to_string(),
            min,
            max,
        })
    }
}

#[derive(Serialize)]
struct DatasetsOutput {
    datasets: Vec<stac_common::Dataset>,
    failed: Vec<(String, String)>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Logs go to stderr so stdout stays valid JSON
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .json()
        .init();

    let config = load_config(&cli)?;
    info!(catalog_url = %config.catalog_url, "Starting dashboard");

    let dashboard = Dashboard::from_config(config).context("failed to create dashboard")?;

    if let Some(station) = cli.station {
        dashboard.select_location(station).await;
    }
    if let Some(ids) = &cli.datasets {
        dashboard.store_active_dataset_ids(ids.as_str()).await;
    }

    let report = dashboard.load().await.context("failed to load catalog")?;
    info!(
        loaded = report.loaded.len(),
        failed = report.failed.len(),
        "Catalog loaded"
    );

    for arg in &cli.reclassify {
        dashboard
            .reclassify_with_bounds(&arg.dataset_id, arg.min, arg.max)
            .await
            .with_context(|| format!("failed to reclassify {}", arg.dataset_id))?;
    }

    let output = match cli.command {
        Command::Themes => serde_json::to_string_pretty(&dashboard.themes().await)?,
        Command::Datasets => serde_json::to_string_pretty(&DatasetsOutput {
            datasets: dashboard.available_datasets().await,
            failed: report.failed,
        })?,
        Command::Layers => serde_json::to_string_pretty(&dashboard.active_layers().await)?,
        Command::Series => serde_json::to_string_pretty(&dashboard.selected_point_data().await)?,
    };
    println!("{}", output);

    Ok(())
}

fn load_config(cli: &Cli) -> Result<DashboardConfig> {
    let mut config = match &cli.config {
        Some(path) => DashboardConfig::load_from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?
            .with_env_overrides(),
        None => DashboardConfig::from_env(),
    };

    if let Some(url) = &cli.catalog_url {
        config.catalog_url = url.clone();
    }

    config.validate()?;
    Ok(config)
}
