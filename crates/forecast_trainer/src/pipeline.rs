//! Estimator chain: column transforms followed by the GBDT trainer

use eshop_forecast_core::{DataFrame, ProductData, TrainedPipeline, TransformSpec};
use tracing::debug;

use crate::errors::TrainerError;
use crate::trainer::{GbdtConfig, GbdtTrainer};

pub const NUM_FEATURES_COLUMN: &str = "NumFeatures";
pub const CAT_FEATURES_COLUMN: &str = "CatFeatures";
pub const FEATURES_COLUMN: &str = "Features";
pub const LABEL_COLUMN: &str = "Label";

/// Unfitted pipeline
#[derive(Clone, Debug)]
pub struct TrainingPipeline {
    transforms: Vec<TransformSpec>,
    trainer: GbdtTrainer,
    feature_column: String,
    label_column: String,
}

impl TrainingPipeline {
    /// Empty chain feeding `Features` / `Label` to `trainer`
    pub fn new(trainer: GbdtTrainer) -> Self {
        Self {
            transforms: Vec::new(),
            trainer,
            feature_column: FEATURES_COLUMN.to_string(),
            label_column: LABEL_COLUMN.to_string(),
        }
    }

    pub fn with_columns(mut self, feature_column: impl Into<String>, label_column: impl Into<String>) -> Self {
        self.feature_column = feature_column.into();
        self.label_column = label_column.into();
        self
    }

    pub fn append(mut self, transform: TransformSpec) -> Self {
        self.transforms.push(transform);
        self
    }

    /// Next-month units forecast: numeric features, one-hot product id, Tweedie GBDT
    pub fn product_forecast(config: GbdtConfig) -> Self {
        Self::new(GbdtTrainer::new(config))
            .append(TransformSpec::concatenate(
                NUM_FEATURES_COLUMN,
                ProductData::NUMERIC_FEATURES,
            ))
            .append(TransformSpec::one_hot(
                CAT_FEATURES_COLUMN,
                ProductData::PRODUCT_ID,
            ))
            .append(TransformSpec::concatenate(
                FEATURES_COLUMN,
                [NUM_FEATURES_COLUMN, CAT_FEATURES_COLUMN],
            ))
            .append(TransformSpec::copy(LABEL_COLUMN, ProductData::TARGET))
    }

    pub fn transforms(&self) -> &[TransformSpec] {
        &self.transforms
    }

    pub fn trainer(&self) -> &GbdtTrainer {
        &self.trainer
    }

    /// Fit every transform in order, then train on the resulting columns
    pub fn fit(&self, frame: &DataFrame) -> Result<TrainedPipeline, TrainerError> {
        let mut working = frame.clone();
        let mut fitted = Vec::with_capacity(self.transforms.len());

        for spec in &self.transforms {
            let transform = spec.fit(&working)?;
            transform.apply(&mut working)?;
            debug!("Fitted transform -> '{}'", spec.output());
            fitted.push(transform);
        }

        let features = working.feature_matrix(&self.feature_column)?;
        let labels = working.scalar(&self.label_column)?;
        let model = self.trainer.train(&features, labels)?;

        Ok(TrainedPipeline {
            transforms: fitted,
            feature_column: self.feature_column.clone(),
            label_column: self.label_column.clone(),
            model,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eshop_forecast_core::FittedTransform;

    fn rows() -> Vec<ProductData> {
        (0..30)
            .map(|i| {
                // Pairs of rows share every numeric value; only the product differs.
                let units = 5.0 + ((i / 2) % 6) as f64;
                ProductData {
                    next: if i % 2 == 0 { units * 2.0 } else { units },
                    product_id: if i % 2 == 0 { "988" } else { "1119" }.to_string(),
                    year: 2017.0,
                    month: ((i / 2) % 12 + 1) as f64,
                    units,
                    avg: units / 3.0,
                    count: 3.0,
                    max: units / 2.0,
                    min: 1.0,
                    prev: units - 1.0,
                }
            })
            .collect()
    }

    fn config() -> GbdtConfig {
        GbdtConfig {
            num_trees: 15,
            max_depth: 3,
            min_samples_leaf: 2,
            learning_rate: 0.3,
            ..GbdtConfig::default()
        }
    }

    #[test]
    fn test_product_forecast_chain_shape() {
        let pipeline = TrainingPipeline::product_forecast(config());
        let outputs: Vec<&str> = pipeline.transforms().iter().map(|t| t.output()).collect();
        assert_eq!(outputs, vec!["NumFeatures", "CatFeatures", "Features", "Label"]);
    }

    #[test]
    fn test_fit_builds_feature_vector() {
        let frame = DataFrame::from_products(&rows());
        let trained = TrainingPipeline::product_forecast(config()).fit(&frame).unwrap();

        // 8 numeric columns + 2 products
        assert_eq!(trained.model.feature_count, 10);
        assert_eq!(trained.transforms.len(), 4);
        match &trained.transforms[1] {
            FittedTransform::OneHotEncoding { vocabulary, .. } => {
                assert_eq!(vocabulary, &vec!["988".to_string(), "1119".to_string()]);
            }
            other => panic!("unexpected transform: {other:?}"),
        }

        let transformed = trained.transform(&frame).unwrap();
        assert_eq!(transformed.scalar("Label").unwrap(), frame.scalar("next").unwrap());
    }

    #[test]
    fn test_fit_learns_product_effect() {
        let data = rows();
        let frame = DataFrame::from_products(&data);
        let trained = TrainingPipeline::product_forecast(config()).fit(&frame).unwrap();

        let mut doubled = data[0].clone();
        let mut same = data[0].clone();
        same.product_id = "1119".to_string();
        doubled.product_id = "988".to_string();

        assert!(trained.predict_one(&doubled).unwrap() > trained.predict_one(&same).unwrap());
    }

    #[test]
    fn test_missing_label_column() {
        let frame = DataFrame::from_products(&rows());
        let pipeline = TrainingPipeline::new(GbdtTrainer::new(config()))
            .append(TransformSpec::concatenate(FEATURES_COLUMN, ["units", "prev"]));

        assert!(matches!(
            pipeline.fit(&frame),
            Err(TrainerError::Core(_))
        ));

        let relabeled = pipeline.with_columns(FEATURES_COLUMN, "next");
        assert!(relabeled.fit(&frame).is_ok());
    }
}
