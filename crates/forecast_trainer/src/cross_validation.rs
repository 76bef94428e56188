//! K-fold cross-validation of a training pipeline
//!
//! Rows are permuted once with a seeded [`LcgRng`] and dealt round-robin
//! into folds, so fold sizes differ by at most one row. Every fold refits
//! the whole chain (including the one-hot vocabulary) on its training rows.

use eshop_forecast_core::{DataFrame, MetricsSummary, RegressionMetrics};
use serde::Serialize;
use tracing::info;

use crate::deterministic::LcgRng;
use crate::errors::TrainerError;
use crate::pipeline::TrainingPipeline;

/// Outcome of one fold
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoldResult {
    pub fold: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub metrics: RegressionMetrics,
}

/// All fold results of one cross-validation run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossValidationResult {
    pub folds: Vec<FoldResult>,
}

impl CrossValidationResult {
    pub fn summary(&self) -> MetricsSummary {
        let metrics: Vec<RegressionMetrics> = self.folds.iter().map(|f| f.metrics).collect();
        MetricsSummary::from_metrics(&metrics)
    }
}

/// Fold index of every row
pub fn assign_folds(n_rows: usize, folds: usize, seed: i64) -> Vec<usize> {
    let mut assignment = vec![0; n_rows];
    let order = LcgRng::new(seed).permutation(n_rows);
    for (position, row) in order.into_iter().enumerate() {
        assignment[row] = position % folds;
    }
    assignment
}

/// Fit on k-1 folds and score the held-out fold, k times
pub fn cross_validate(
    pipeline: &TrainingPipeline,
    frame: &DataFrame,
    folds: usize,
    seed: i64,
) -> Result<CrossValidationResult, TrainerError> {
    if folds < 2 {
        return Err(TrainerError::Config(format!(
            "cross-validation needs at least 2 folds, got {folds}"
        )));
    }
    if folds > frame.n_rows() {
        return Err(TrainerError::Config(format!(
            "{} folds requested but the dataset has only {} rows",
            folds,
            frame.n_rows()
        )));
    }

    let assignment = assign_folds(frame.n_rows(), folds, seed);
    let mut results = Vec::with_capacity(folds);

    for fold in 0..folds {
        let (test_idx, train_idx): (Vec<usize>, Vec<usize>) =
            (0..frame.n_rows()).partition(|&row| assignment[row] == fold);

        let train = frame.select_rows(&train_idx);
        let test = frame.select_rows(&test_idx);

        let trained = pipeline.fit(&train)?;
        let predictions = trained.predict(&test)?;
        let transformed = trained.transform(&test)?;
        let labels = transformed.scalar(&trained.label_column)?;
        let metrics = RegressionMetrics::evaluate(labels, &predictions)?;

        info!(
            "Fold {}/{}: train={} test={} RMS={:.4} R2={:.4}",
            fold + 1,
            folds,
            train_idx.len(),
            test_idx.len(),
            metrics.root_mean_squared_error,
            metrics.r_squared
        );

        results.push(FoldResult {
            fold,
            train_rows: train_idx.len(),
            test_rows: test_idx.len(),
            metrics,
        });
    }

    Ok(CrossValidationResult { folds: results })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assign_folds_balanced() {
        let assignment = assign_folds(20, 6, 1);
        let mut sizes = [0usize; 6];
        for &f in &assignment {
            sizes[f] += 1;
        }
        assert_eq!(sizes.iter().sum::<usize>(), 20);
        assert!(sizes.iter().all(|&s| s == 3 || s == 4));
    }

    #[test]
    fn test_assign_folds_seeded() {
        assert_eq!(assign_folds(50, 5, 7), assign_folds(50, 5, 7));
        assert_ne!(assign_folds(50, 5, 7), assign_folds(50, 5, 8));
    }
}
