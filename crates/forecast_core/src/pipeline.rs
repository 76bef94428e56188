//! Fitted transform chain plus the trained ensemble

use serde::{Deserialize, Serialize};

use crate::errors::{ForecastError, Result};
use crate::frame::DataFrame;
use crate::gbdt::Model;
use crate::schema::ProductData;
use crate::transforms::FittedTransform;

/// Everything needed to turn raw records into forecasts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedPipeline {
    /// Transforms in application order
    pub transforms: Vec<FittedTransform>,
    /// Vector column fed to the model
    pub feature_column: String,
    /// Column the model was trained to predict
    pub label_column: String,
    pub model: Model,
}

impl TrainedPipeline {
    /// Apply every fitted transform to a copy of `frame`
    pub fn transform(&self, frame: &DataFrame) -> Result<DataFrame> {
        let mut out = frame.clone();
        for transform in &self.transforms {
            transform.apply(&mut out)?;
        }
        Ok(out)
    }

    /// Forecast every row of a raw frame
    pub fn predict(&self, frame: &DataFrame) -> Result<Vec<f64>> {
        let transformed = self.transform(frame)?;
        let features = transformed.feature_matrix(&self.feature_column)?;
        if features.n_features != self.model.feature_count {
            return Err(ForecastError::ValidationFailed(format!(
                "feature column '{}' has width {}, model expects {}",
                self.feature_column, features.n_features, self.model.feature_count
            )));
        }

        Ok((0..features.n_rows)
            .map(|row| self.model.predict(features.row(row)))
            .collect())
    }

    /// Forecast a single record
    pub fn predict_one(&self, record: &ProductData) -> Result<f64> {
        let frame = DataFrame::from_products(std::slice::from_ref(record));
        self.predict(&frame)?
            .first()
            .copied()
            .ok_or_else(|| ForecastError::ValidationFailed("no prediction produced".to_string()))
    }

    /// Check the ensemble and the transform chain agree with each other
    pub fn validate(&self) -> Result<()> {
        self.model.validate()?;

        if !self.transforms.iter().any(|t| produces(t, &self.feature_column)) {
            return Err(ForecastError::ValidationFailed(format!(
                "no transform produces feature column '{}'",
                self.feature_column
            )));
        }
        Ok(())
    }
}

fn produces(transform: &FittedTransform, column: &str) -> bool {
    match transform {
        FittedTransform::Concatenate { output, .. }
        | FittedTransform::OneHotEncoding { output, .. }
        | FittedTransform::CopyColumns { output, .. } => output == column,
    }
}
