//! Boosted tree ensemble
//!
//! Scores are accumulated in raw (link) space as
//! `bias + sum(tree.weight * leaf)` and mapped back to label space by the
//! inverse link when predicting.

use serde::{Deserialize, Serialize};

use super::tree::Tree;
use crate::errors::{ForecastError, Result};
use crate::serde_canon::{hash_canonical_hex, to_canonical_json};

/// Current serialized model format version
pub const MODEL_VERSION: i32 = 1;

/// Link between raw ensemble scores and predictions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Link {
    /// Prediction equals the raw score
    Identity,
    /// Prediction is `exp(raw score)`; used by Tweedie and Poisson losses
    Log,
}

impl Link {
    /// Map a raw score to label space
    pub fn inverse(self, raw: f64) -> f64 {
        match self {
            Link::Identity => raw,
            Link::Log => raw.exp(),
        }
    }
}

/// Gradient-boosted regression tree ensemble
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Model {
    /// Model format version
    pub version: i32,

    pub link: Link,

    /// Length of the feature vector the trees were grown on
    pub feature_count: usize,

    /// Initial raw score shared by every row
    pub bias: f64,

    /// Decision trees in the ensemble
    pub trees: Vec<Tree>,
}

impl Model {
    pub fn new(trees: Vec<Tree>, bias: f64, link: Link, feature_count: usize) -> Self {
        Self {
            version: MODEL_VERSION,
            link,
            feature_count,
            bias,
            trees,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.version != MODEL_VERSION {
            return Err(ForecastError::ValidationFailed(format!(
                "Unsupported model version: {}",
                self.version
            )));
        }

        if !self.bias.is_finite() {
            return Err(ForecastError::ValidationFailed(format!(
                "Bias is not finite: {}",
                self.bias
            )));
        }

        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.feature_count).map_err(|e| {
                ForecastError::ValidationFailed(format!("Tree {} validation failed: {}", i, e))
            })?;
        }

        Ok(())
    }

    /// Ensemble output before the inverse link
    pub fn raw_score(&self, features: &[f64]) -> f64 {
        self.trees
            .iter()
            .fold(self.bias, |sum, tree| sum + tree.weight * tree.evaluate(features))
    }

    /// Prediction in label space
    pub fn predict(&self, features: &[f64]) -> f64 {
        self.link.inverse(self.raw_score(features))
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    /// Serialize model to canonical JSON (sorted keys, no whitespace)
    pub fn to_canonical_json(&self) -> Result<String> {
        Ok(to_canonical_json(self)?)
    }

    /// Blake3 hash of the canonical JSON representation, as hex
    pub fn hash_hex(&self) -> Result<String> {
        Ok(hash_canonical_hex(self)?)
    }
}
