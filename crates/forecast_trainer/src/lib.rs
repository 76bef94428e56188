//! eShop Forecast Trainer - next-month product sales forecasting
//!
//! Loads the product statistics CSV, cross-validates the forecast pipeline,
//! then fits it on every row and saves the result as a zip artifact.

pub mod cart;
pub mod config;
pub mod console;
pub mod cross_validation;
pub mod dataset;
pub mod deterministic;
pub mod errors;
pub mod objective;
pub mod pipeline;
pub mod trainer;

use eshop_forecast_core::{save_artifact, ArtifactManifest, MetricsSummary, ProductData};
use std::path::PathBuf;
use tracing::{debug, info};

pub use config::{absolute_path, TrainerConfig};
pub use cross_validation::{cross_validate, CrossValidationResult, FoldResult};
pub use dataset::Dataset;
pub use deterministic::{LcgRng, SplitTieBreaker};
pub use errors::{DatasetError, TrainerError};
pub use objective::Objective;
pub use pipeline::TrainingPipeline;
pub use trainer::{GbdtConfig, GbdtTrainer};

/// Outcome of [`train_and_save_model`]
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub rows: usize,
    pub cross_validation: CrossValidationResult,
    pub summary: MetricsSummary,
    pub manifest: ArtifactManifest,
    /// Absolute path of the written artifact
    pub model_path: PathBuf,
}

/// Load data, cross-validate, fit on the full dataset and save the model.
pub fn train_and_save_model(config: &TrainerConfig) -> Result<TrainingReport, TrainerError> {
    config.validate()?;

    let data_path = absolute_path(&config.data_path)?;
    let model_path = absolute_path(&config.model_path)?;

    info!("Loading dataset from: {}", data_path.display());
    let dataset = Dataset::from_csv(&data_path)?;
    info!(
        "Loaded {} rows covering {} products",
        dataset.len(),
        dataset.product_count()
    );
    for (name, min, max) in dataset.column_stats() {
        debug!("  {}: min={}, max={}", name, min, max);
    }
    let frame = dataset.to_frame();

    console::write_header("Training product forecasting");
    let pipeline = TrainingPipeline::product_forecast(config.gbdt.clone());
    let algorithm = pipeline.trainer().describe();

    println!(
        "=============== Cross-validating to get model's accuracy metrics ==============="
    );
    let cross_validation = cross_validate(&pipeline, &frame, config.folds, config.seed)?;
    let summary = cross_validation.summary();
    console::print_regression_folds_average_metrics(&algorithm, &summary);

    info!("Fitting {} on all {} rows", algorithm, dataset.len());
    let trained = pipeline.fit(&frame)?;
    let manifest = save_artifact(&model_path, &trained, &ProductData::schema(), dataset.len())?;

    Ok(TrainingReport {
        rows: dataset.len(),
        cross_validation,
        summary,
        manifest,
        model_path,
    })
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
