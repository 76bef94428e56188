//! Forecast core for eShop product sales
//!
//! Inference-side building blocks shared by the trainer and by any
//! application that consumes a saved model.
//!
//! Modules:
//! - `schema`: the `ProductData` record and its column schema
//! - `frame`: columnar in-memory table and dense feature matrices
//! - `transforms`: concatenate / one-hot / copy column transforms
//! - `gbdt`: boosted regression tree ensemble
//! - `pipeline`: fitted transform chain plus ensemble
//! - `metrics`: regression metrics and fold summaries
//! - `artifact`: zip model container with hash verification

pub mod artifact;
pub mod errors;
pub mod frame;
pub mod gbdt;
pub mod metrics;
pub mod pipeline;
pub mod schema;
pub mod serde_canon;
pub mod transforms;

pub use artifact::{load_artifact, save_artifact, ArtifactManifest, ModelArtifact};
pub use errors::ForecastError;
pub use frame::{ColumnData, DataFrame, FeatureMatrix};
pub use gbdt::{Link, Model, Node, Tree};
pub use metrics::{MetricStatistics, MetricsSummary, RegressionMetrics};
pub use pipeline::TrainedPipeline;
pub use schema::{ColumnDef, ColumnKind, ProductData, Schema};
pub use transforms::{FittedTransform, TransformSpec};

/// Crate version string recorded in artifact manifests
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
