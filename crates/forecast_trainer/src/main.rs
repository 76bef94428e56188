//! eShop forecast trainer CLI
//!
//! Runs with no arguments: trains on `Data/products.stats.csv` and writes
//! `product_month_fastTreeTweedie.zip` in the working directory.

use anyhow::{Context, Result};
use clap::Parser;
use eshop_forecast_trainer::{console, train_and_save_model, TrainerConfig};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "forecast-trainer")]
#[command(author = "eShop Forecast Contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Trains the next-month product sales forecast model", long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Training CSV path
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Output model artifact path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of cross-validation folds
    #[arg(long)]
    folds: Option<usize>,

    /// Seed for fold assignment
    #[arg(long)]
    seed: Option<i64>,

    /// Exit without waiting for a keypress
    #[arg(long)]
    no_pause: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn resolve_config(&self) -> Result<TrainerConfig> {
        let mut config = match &self.config {
            Some(path) => TrainerConfig::load_from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => TrainerConfig::default(),
        };
        config
            .apply_env_overrides()
            .context("Invalid environment override")?;

        if let Some(data) = &self.data {
            config.data_path = data.clone();
        }
        if let Some(output) = &self.output {
            config.model_path = output.clone();
        }
        if let Some(folds) = self.folds {
            config.folds = folds;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if self.no_pause {
            config.pause_on_exit = false;
        }
        Ok(config)
    }
}

fn run(config: &TrainerConfig) -> Result<()> {
    let report = train_and_save_model(config).context("Training failed")?;

    info!("Training complete!");
    info!("  Rows: {}", report.rows);
    info!("  Trees: {}", report.manifest.tree_count);
    info!("  Model: {}", report.model_path.display());
    info!("  Hash: {}", report.manifest.pipeline_hash);
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("eShop Forecast Trainer v{}", env!("CARGO_PKG_VERSION"));

    let mut pause = !args.no_pause;
    let outcome = args.resolve_config().and_then(|config| {
        pause = config.pause_on_exit;
        run(&config)
    });

    if let Err(err) = outcome {
        console::write_exception(&format!("{err:#}"));
    }
    if pause {
        console::press_any_key();
    }
    Ok(())
}
