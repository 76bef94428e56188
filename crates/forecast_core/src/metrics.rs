//! Regression quality metrics
//!
//! Mirrors the usual regression report: L1 (mean absolute error), L2 (mean
//! squared error), RMS, the mean training loss and R².

use serde::{Deserialize, Serialize};

use crate::errors::{ForecastError, Result};

/// Metrics of one scored data set
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    pub mean_absolute_error: f64,
    pub mean_squared_error: f64,
    pub root_mean_squared_error: f64,
    /// Mean of the per-row squared loss
    pub loss_function: f64,
    pub r_squared: f64,
}

impl RegressionMetrics {
    /// Compare predictions against labels
    ///
    /// With constant labels R² is 1.0 for a perfect fit and 0.0 otherwise.
    pub fn evaluate(labels: &[f64], predictions: &[f64]) -> Result<Self> {
        if labels.len() != predictions.len() {
            return Err(ForecastError::InvalidMetricInput(format!(
                "{} labels but {} predictions",
                labels.len(),
                predictions.len()
            )));
        }
        if labels.is_empty() {
            return Err(ForecastError::InvalidMetricInput(
                "no rows to evaluate".to_string(),
            ));
        }

        let n = labels.len() as f64;
        let mean_label = labels.iter().sum::<f64>() / n;

        let (abs_sum, sq_sum, total_sq) = labels.iter().zip(predictions).fold(
            (0.0, 0.0, 0.0),
            |(abs_sum, sq_sum, total_sq), (&label, &pred)| {
                let diff = pred - label;
                let centered = label - mean_label;
                (
                    abs_sum + diff.abs(),
                    sq_sum + diff * diff,
                    total_sq + centered * centered,
                )
            },
        );

        let mse = sq_sum / n;
        let r_squared = if total_sq > 0.0 {
            1.0 - sq_sum / total_sq
        } else if sq_sum == 0.0 {
            1.0
        } else {
            0.0
        };

        Ok(Self {
            mean_absolute_error: abs_sum / n,
            mean_squared_error: mse,
            root_mean_squared_error: mse.sqrt(),
            loss_function: mse,
            r_squared,
        })
    }
}

/// Mean and sample standard deviation of one metric across folds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricStatistics {
    pub mean: f64,
    pub std_dev: f64,
}

impl MetricStatistics {
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self {
                mean: 0.0,
                std_dev: 0.0,
            };
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let std_dev = if values.len() > 1 {
            let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
            var.sqrt()
        } else {
            0.0
        };

        Self { mean, std_dev }
    }
}

/// Per-metric statistics over a set of folds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub mean_absolute_error: MetricStatistics,
    pub mean_squared_error: MetricStatistics,
    pub root_mean_squared_error: MetricStatistics,
    pub loss_function: MetricStatistics,
    pub r_squared: MetricStatistics,
}

impl MetricsSummary {
    pub fn from_metrics(metrics: &[RegressionMetrics]) -> Self {
        let stat = |f: fn(&RegressionMetrics) -> f64| {
            MetricStatistics::from_values(&metrics.iter().map(f).collect::<Vec<_>>())
        };

        Self {
            mean_absolute_error: stat(|m| m.mean_absolute_error),
            mean_squared_error: stat(|m| m.mean_squared_error),
            root_mean_squared_error: stat(|m| m.root_mean_squared_error),
            loss_function: stat(|m| m.loss_function),
            r_squared: stat(|m| m.r_squared),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_perfect_prediction() {
        let labels = [1.0, 2.0, 3.0, 4.0];
        let m = RegressionMetrics::evaluate(&labels, &labels).unwrap();

        assert_eq!(m.mean_absolute_error, 0.0);
        assert_eq!(m.root_mean_squared_error, 0.0);
        assert_eq!(m.r_squared, 1.0);
    }

    #[test]
    fn test_known_values() {
        let labels = [1.0, 2.0, 3.0, 4.0];
        let preds = [2.0, 2.0, 3.0, 2.0];
        let m = RegressionMetrics::evaluate(&labels, &preds).unwrap();

        // errors: 1, 0, 0, -2
        assert!((m.mean_absolute_error - 0.75).abs() < 1e-12);
        assert!((m.mean_squared_error - 1.25).abs() < 1e-12);
        assert_eq!(m.loss_function, m.mean_squared_error);
        // SS_tot = 5, SS_res = 5
        assert!(m.r_squared.abs() < 1e-12);
    }

    #[test]
    fn test_constant_labels() {
        let labels = [3.0, 3.0];
        assert_eq!(
            RegressionMetrics::evaluate(&labels, &[3.0, 3.0])
                .unwrap()
                .r_squared,
            1.0
        );
        assert_eq!(
            RegressionMetrics::evaluate(&labels, &[2.0, 3.0])
                .unwrap()
                .r_squared,
            0.0
        );
    }

    #[test]
    fn test_invalid_input() {
        assert!(RegressionMetrics::evaluate(&[], &[]).is_err());
        assert!(RegressionMetrics::evaluate(&[1.0], &[1.0, 2.0]).is_err());
    }

    #[test]
    fn test_statistics() {
        let stats = MetricStatistics::from_values(&[2.0, 4.0, 6.0]);
        assert_eq!(stats.mean, 4.0);
        assert!((stats.std_dev - 2.0).abs() < 1e-12);

        let single = MetricStatistics::from_values(&[5.0]);
        assert_eq!(single.std_dev, 0.0);
    }

    proptest! {
        #[test]
        fn rmse_dominates_mae(
            pairs in proptest::collection::vec((-1e3f64..1e3, -1e3f64..1e3), 1..64)
        ) {
            let (labels, preds): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
            let m = RegressionMetrics::evaluate(&labels, &preds).unwrap();

            prop_assert!(m.mean_absolute_error >= 0.0);
            prop_assert!(m.root_mean_squared_error + 1e-9 >= m.mean_absolute_error);
            prop_assert!((m.root_mean_squared_error.powi(2) - m.mean_squared_error).abs()
                <= 1e-6 * m.mean_squared_error.max(1.0));
            prop_assert!(m.r_squared <= 1.0 + 1e-12);
        }
    }
}
