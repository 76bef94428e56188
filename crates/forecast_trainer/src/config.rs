//! Trainer run configuration
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! `FORECAST_*` environment variables, then command-line flags (applied by
//! the binary).

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::TrainerError;
use crate::trainer::GbdtConfig;

pub const ENV_DATA_PATH: &str = "FORECAST_DATA_PATH";
pub const ENV_MODEL_PATH: &str = "FORECAST_MODEL_PATH";
pub const ENV_SEED: &str = "FORECAST_SEED";
pub const ENV_FOLDS: &str = "FORECAST_FOLDS";

/// Settings for one training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    /// Training CSV, relative paths resolve against the working directory
    pub data_path: PathBuf,
    /// Output zip artifact
    pub model_path: PathBuf,
    /// Seed for fold assignment
    pub seed: i64,
    pub folds: usize,
    /// Wait for a keypress before the process exits
    pub pause_on_exit: bool,
    pub gbdt: GbdtConfig,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("Data/products.stats.csv"),
            model_path: PathBuf::from("product_month_fastTreeTweedie.zip"),
            seed: 1,
            folds: 6,
            pause_on_exit: true,
            gbdt: GbdtConfig::default(),
        }
    }
}

impl TrainerConfig {
    /// Load configuration from a TOML file; missing keys keep their defaults
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, TrainerError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            TrainerError::Config(format!("failed to read config file {}: {e}", path.display()))
        })?;

        toml::from_str(&content).map_err(|e| {
            TrainerError::Config(format!("failed to parse config file {}: {e}", path.display()))
        })
    }

    /// Apply `FORECAST_*` overrides from the process environment
    pub fn apply_env_overrides(&mut self) -> Result<(), TrainerError> {
        self.apply_overrides_with(|key| env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup
    pub fn apply_overrides_with<F>(&mut self, lookup: F) -> Result<(), TrainerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_DATA_PATH) {
            self.data_path = PathBuf::from(path);
        }
        if let Some(path) = lookup(ENV_MODEL_PATH) {
            self.model_path = PathBuf::from(path);
        }
        if let Some(seed) = lookup(ENV_SEED) {
            self.seed = seed.trim().parse().map_err(|e| {
                TrainerError::Config(format!("{ENV_SEED}={seed:?} is not an integer: {e}"))
            })?;
        }
        if let Some(folds) = lookup(ENV_FOLDS) {
            self.folds = folds.trim().parse().map_err(|e| {
                TrainerError::Config(format!("{ENV_FOLDS}={folds:?} is not a count: {e}"))
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), TrainerError> {
        if self.folds < 2 {
            return Err(TrainerError::Config(format!(
                "folds must be at least 2, got {}",
                self.folds
            )));
        }
        if self.data_path.as_os_str().is_empty() {
            return Err(TrainerError::Config("data_path is empty".into()));
        }
        if self.model_path.as_os_str().is_empty() {
            return Err(TrainerError::Config("model_path is empty".into()));
        }
        self.gbdt.validate()
    }
}

/// Resolve `relative` against the current working directory
pub fn absolute_path(relative: impl AsRef<Path>) -> Result<PathBuf, TrainerError> {
    let relative = relative.as_ref();
    if relative.is_absolute() {
        return Ok(relative.to_path_buf());
    }
    let cwd = env::current_dir().map_err(|e| {
        TrainerError::Config(format!("cannot determine working directory: {e}"))
    })?;
    Ok(cwd.join(relative))
}
