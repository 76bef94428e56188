//! Gradient Boosted Decision Tree (GBDT) trainer
//!
//! Second-order boosting over histogram CART trees. Training is fully
//! deterministic: no sampling, stable iteration order, explicit tie-breaks.

use eshop_forecast_core::{FeatureMatrix, Model};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cart::{BinnedFeatures, CartBuilder, TreeConfig};
use crate::errors::TrainerError;
use crate::objective::Objective;

/// Deepest tree the builder will grow
pub const MAX_TREE_DEPTH: usize = 24;

/// GBDT training configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GbdtConfig {
    pub num_trees: usize,
    pub max_depth: usize,
    pub min_samples_leaf: usize,
    /// Shrinkage applied to every tree
    pub learning_rate: f64,
    /// Upper bound on histogram bins per feature
    pub max_bins: usize,
    pub max_leaf_output: f64,
    pub objective: Objective,
}

impl Default for GbdtConfig {
    fn default() -> Self {
        Self {
            num_trees: 100,
            max_depth: 5,
            min_samples_leaf: 10,
            learning_rate: 0.2,
            max_bins: 255,
            max_leaf_output: 100.0,
            objective: Objective::default(),
        }
    }
}

impl GbdtConfig {
    pub fn validate(&self) -> Result<(), TrainerError> {
        if self.num_trees == 0 {
            return Err(TrainerError::Config("num_trees must be at least 1".into()));
        }
        if self.max_depth == 0 || self.max_depth > MAX_TREE_DEPTH {
            return Err(TrainerError::Config(format!(
                "max_depth must be in 1..={MAX_TREE_DEPTH}, got {}",
                self.max_depth
            )));
        }
        if self.min_samples_leaf == 0 {
            return Err(TrainerError::Config(
                "min_samples_leaf must be at least 1".into(),
            ));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err(TrainerError::Config(format!(
                "learning_rate must be in (0, 1], got {}",
                self.learning_rate
            )));
        }
        if self.max_bins < 2 {
            return Err(TrainerError::Config("max_bins must be at least 2".into()));
        }
        if !(self.max_leaf_output > 0.0) {
            return Err(TrainerError::Config(format!(
                "max_leaf_output must be positive, got {}",
                self.max_leaf_output
            )));
        }
        self.objective.validate()
    }

    fn tree_config(&self) -> TreeConfig {
        TreeConfig {
            max_depth: self.max_depth,
            min_samples_leaf: self.min_samples_leaf,
            max_leaf_output: self.max_leaf_output,
        }
    }
}

/// GBDT trainer
#[derive(Clone, Debug)]
pub struct GbdtTrainer {
    config: GbdtConfig,
}

impl GbdtTrainer {
    pub fn new(config: GbdtConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GbdtConfig {
        &self.config
    }

    /// Short human-readable description used in reports
    pub fn describe(&self) -> String {
        format!(
            "GBDT regression ({} loss, {} trees, depth {}, lr {})",
            self.config.objective.name(),
            self.config.num_trees,
            self.config.max_depth,
            self.config.learning_rate
        )
    }

    /// Train a GBDT model on a feature matrix and its labels
    pub fn train(&self, features: &FeatureMatrix, labels: &[f64]) -> Result<Model, TrainerError> {
        self.config.validate()?;

        let n_samples = features.n_rows;
        if n_samples == 0 {
            return Err(TrainerError::Training("no rows to train on".into()));
        }
        if labels.len() != n_samples {
            return Err(TrainerError::Training(format!(
                "{} feature rows but {} labels",
                n_samples,
                labels.len()
            )));
        }

        let objective = self.config.objective;
        objective.check_labels(labels)?;

        let binned = BinnedFeatures::new(features, self.config.max_bins);
        let bias = objective.base_score(labels);
        let mut raw_scores = vec![bias; n_samples];
        let mut gradients = vec![0.0; n_samples];
        let mut hessians = vec![0.0; n_samples];

        debug!(
            "Boosting {} trees on {} rows x {} features (base score {:.6})",
            self.config.num_trees, n_samples, features.n_features, bias
        );

        let mut trees = Vec::with_capacity(self.config.num_trees);
        for tree_idx in 0..self.config.num_trees {
            objective.compute_gradients(labels, &raw_scores, &mut gradients, &mut hessians);

            let builder = CartBuilder::new(
                &binned,
                &gradients,
                &hessians,
                self.config.tree_config(),
            );
            let mut tree = builder.build();
            tree.weight = self.config.learning_rate;

            for (row, score) in raw_scores.iter_mut().enumerate() {
                *score += tree.weight * tree.evaluate(features.row(row));
            }

            debug!(
                "Tree {}/{}: {} leaves, loss {:.6}",
                tree_idx + 1,
                self.config.num_trees,
                tree.num_leaves(),
                objective.loss(labels, &raw_scores)
            );
            trees.push(tree);
        }

        info!(
            "Trained {} trees on {} rows, final {} loss {:.6}",
            trees.len(),
            n_samples,
            objective.name(),
            objective.loss(labels, &raw_scores)
        );

        let model = Model::new(trees, bias, objective.link(), features.n_features);
        model.validate()?;
        Ok(model)
    }
}
