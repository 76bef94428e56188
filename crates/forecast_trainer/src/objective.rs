//! Boosting objectives: gradients, hessians and base scores
//!
//! Raw scores live in link space. For Tweedie the link is `log`, so the
//! prediction for raw score `F` is `exp(F)` and, with variance power `p`:
//!
//! - Gradient: `-y * exp((1 - p) F) + exp((2 - p) F)`
//! - Hessian: `-y * (1 - p) * exp((1 - p) F) + (2 - p) * exp((2 - p) F)`

use eshop_forecast_core::Link;
use serde::{Deserialize, Serialize};

use crate::errors::TrainerError;

/// Raw scores are clamped to this magnitude before exponentiation.
const MAX_EXP: f64 = 30.0;
const HESS_MIN: f64 = 1e-6;

/// Default Tweedie variance power (compound Poisson-gamma)
pub const DEFAULT_VARIANCE_POWER: f64 = 1.5;

/// Loss minimized by the boosting loop
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Objective {
    /// Squared error, identity link
    SquaredError,
    /// Tweedie deviance, log link, `1 < variance_power < 2`
    Tweedie { variance_power: f64 },
}

impl Default for Objective {
    fn default() -> Self {
        Objective::Tweedie {
            variance_power: DEFAULT_VARIANCE_POWER,
        }
    }
}

impl Objective {
    pub fn name(&self) -> &'static str {
        match self {
            Objective::SquaredError => "squared_error",
            Objective::Tweedie { .. } => "tweedie",
        }
    }

    pub fn link(&self) -> Link {
        match self {
            Objective::SquaredError => Link::Identity,
            Objective::Tweedie { .. } => Link::Log,
        }
    }

    pub fn validate(&self) -> Result<(), TrainerError> {
        match *self {
            Objective::SquaredError => Ok(()),
            Objective::Tweedie { variance_power } => {
                if variance_power > 1.0 && variance_power < 2.0 {
                    Ok(())
                } else {
                    Err(TrainerError::Config(format!(
                        "tweedie variance power must be in (1, 2), got {variance_power}"
                    )))
                }
            }
        }
    }

    /// Reject labels the loss is undefined for
    pub fn check_labels(&self, labels: &[f64]) -> Result<(), TrainerError> {
        if let Some((row, label)) = labels.iter().enumerate().find(|(_, l)| !l.is_finite()) {
            return Err(TrainerError::Training(format!(
                "label at row {row} is not finite: {label}"
            )));
        }
        if let Objective::Tweedie { .. } = self {
            if let Some((row, label)) = labels.iter().enumerate().find(|(_, &l)| l < 0.0) {
                return Err(TrainerError::Training(format!(
                    "tweedie loss needs non-negative labels, row {row} has {label}"
                )));
            }
        }
        Ok(())
    }

    /// Initial raw score for every row
    pub fn base_score(&self, labels: &[f64]) -> f64 {
        if labels.is_empty() {
            return 0.0;
        }
        let mean = labels.iter().sum::<f64>() / labels.len() as f64;

        match self {
            Objective::SquaredError => mean,
            Objective::Tweedie { .. } => mean.max(1e-7).ln(),
        }
    }

    /// Fill per-row gradients and hessians for the current raw scores
    pub fn compute_gradients(
        &self,
        labels: &[f64],
        raw_scores: &[f64],
        gradients: &mut [f64],
        hessians: &mut [f64],
    ) {
        debug_assert_eq!(labels.len(), raw_scores.len());
        debug_assert_eq!(labels.len(), gradients.len());
        debug_assert_eq!(labels.len(), hessians.len());

        match *self {
            Objective::SquaredError => {
                for i in 0..labels.len() {
                    gradients[i] = raw_scores[i] - labels[i];
                    hessians[i] = 1.0;
                }
            }
            Objective::Tweedie { variance_power: p } => {
                for i in 0..labels.len() {
                    let f = raw_scores[i].clamp(-MAX_EXP, MAX_EXP);
                    let a = ((1.0 - p) * f).exp();
                    let b = ((2.0 - p) * f).exp();
                    let y = labels[i];
                    gradients[i] = -y * a + b;
                    hessians[i] = (-y * (1.0 - p) * a + (2.0 - p) * b).max(HESS_MIN);
                }
            }
        }
    }

    /// Mean per-row loss, used for progress logging
    pub fn loss(&self, labels: &[f64], raw_scores: &[f64]) -> f64 {
        if labels.is_empty() {
            return 0.0;
        }

        let total: f64 = match *self {
            Objective::SquaredError => labels
                .iter()
                .zip(raw_scores)
                .map(|(y, f)| 0.5 * (f - y).powi(2))
                .sum(),
            Objective::Tweedie { variance_power: p } => labels
                .iter()
                .zip(raw_scores)
                .map(|(&y, &f)| {
                    let f = f.clamp(-MAX_EXP, MAX_EXP);
                    -y * ((1.0 - p) * f).exp() / (1.0 - p) + ((2.0 - p) * f).exp() / (2.0 - p)
                })
                .sum(),
        };
        total / labels.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_tweedie() {
        let objective = Objective::default();
        assert_eq!(objective.name(), "tweedie");
        assert_eq!(objective.link(), Link::Log);
        assert!(objective.validate().is_ok());
    }

    #[test]
    fn test_variance_power_bounds() {
        for p in [1.0, 2.0, 0.5, 3.0] {
            assert!(Objective::Tweedie { variance_power: p }.validate().is_err());
        }
    }

    #[test]
    fn test_base_score() {
        let labels = [2.0, 4.0, 6.0];
        assert_eq!(Objective::SquaredError.base_score(&labels), 4.0);
        assert!((Objective::default().base_score(&labels) - 4.0f64.ln()).abs() < 1e-12);
        // All-zero labels stay finite.
        assert!(Objective::default().base_score(&[0.0, 0.0]).is_finite());
    }

    #[test]
    fn test_tweedie_gradient_vanishes_at_label() {
        let objective = Objective::default();
        let labels = [5.0];
        let raw = [5.0f64.ln()];
        let mut grad = [0.0];
        let mut hess = [0.0];
        objective.compute_gradients(&labels, &raw, &mut grad, &mut hess);

        assert!(grad[0].abs() < 1e-9, "gradient {}", grad[0]);
        assert!(hess[0] > 0.0);
    }

    #[test]
    fn test_tweedie_gradient_sign() {
        let objective = Objective::default();
        let labels = [10.0, 10.0];
        let raw = [1.0f64.ln(), 100.0f64.ln()];
        let mut grad = [0.0; 2];
        let mut hess = [0.0; 2];
        objective.compute_gradients(&labels, &raw, &mut grad, &mut hess);

        // Under-prediction pulls up, over-prediction pulls down.
        assert!(grad[0] < 0.0);
        assert!(grad[1] > 0.0);
        assert!(hess.iter().all(|&h| h >= HESS_MIN));
    }

    #[test]
    fn test_squared_error_gradients() {
        let mut grad = [0.0; 2];
        let mut hess = [0.0; 2];
        Objective::SquaredError.compute_gradients(&[1.0, 3.0], &[2.0, 2.0], &mut grad, &mut hess);
        assert_eq!(grad, [1.0, -1.0]);
        assert_eq!(hess, [1.0, 1.0]);
    }

    #[test]
    fn test_check_labels() {
        assert!(Objective::default().check_labels(&[0.0, 3.0]).is_ok());
        assert!(Objective::default().check_labels(&[-1.0]).is_err());
        assert!(Objective::SquaredError.check_labels(&[-1.0]).is_ok());
        assert!(Objective::SquaredError.check_labels(&[f64::NAN]).is_err());
    }

    #[test]
    fn test_loss_is_minimized_near_label() {
        let objective = Objective::default();
        let labels = [8.0];
        let at_label = objective.loss(&labels, &[8.0f64.ln()]);
        let below = objective.loss(&labels, &[4.0f64.ln()]);
        let above = objective.loss(&labels, &[16.0f64.ln()]);
        assert!(at_label < below);
        assert!(at_label < above);
    }
}
