//! Column transforms: declared specs and their fitted counterparts
//!
//! A [`TransformSpec`] describes what to do; fitting it against a frame
//! yields a [`FittedTransform`] that carries any learned state (the one-hot
//! vocabulary) and can be replayed on new data at inference time.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::errors::{ForecastError, Result};
use crate::frame::{ColumnData, DataFrame};

/// Declared (unfitted) transform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransformSpec {
    /// Join numeric columns row-wise into one vector column
    Concatenate { output: String, inputs: Vec<String> },
    /// Map a text column to an indicator vector over its observed values
    OneHotEncoding { output: String, input: String },
    /// Duplicate a column under another name
    CopyColumns { output: String, input: String },
}

impl TransformSpec {
    pub fn concatenate<S: Into<String>>(output: impl Into<String>, inputs: impl IntoIterator<Item = S>) -> Self {
        TransformSpec::Concatenate {
            output: output.into(),
            inputs: inputs.into_iter().map(Into::into).collect(),
        }
    }

    pub fn one_hot(output: impl Into<String>, input: impl Into<String>) -> Self {
        TransformSpec::OneHotEncoding {
            output: output.into(),
            input: input.into(),
        }
    }

    pub fn copy(output: impl Into<String>, input: impl Into<String>) -> Self {
        TransformSpec::CopyColumns {
            output: output.into(),
            input: input.into(),
        }
    }

    /// Name of the column this transform produces
    pub fn output(&self) -> &str {
        match self {
            TransformSpec::Concatenate { output, .. }
            | TransformSpec::OneHotEncoding { output, .. }
            | TransformSpec::CopyColumns { output, .. } => output,
        }
    }

    /// Learn whatever state the transform needs from `frame`
    pub fn fit(&self, frame: &DataFrame) -> Result<FittedTransform> {
        match self {
            TransformSpec::Concatenate { output, inputs } => {
                for input in inputs {
                    frame.numeric(input)?;
                }
                Ok(FittedTransform::Concatenate {
                    output: output.clone(),
                    inputs: inputs.clone(),
                })
            }
            TransformSpec::OneHotEncoding { output, input } => {
                let values = frame.text(input)?;
                let mut seen = HashMap::new();
                let mut vocabulary = Vec::new();
                for value in values {
                    if !seen.contains_key(value.as_str()) {
                        seen.insert(value.as_str(), vocabulary.len());
                        vocabulary.push(value.clone());
                    }
                }
                if vocabulary.is_empty() {
                    return Err(ForecastError::ValidationFailed(format!(
                        "one-hot column '{input}' has no values to learn from"
                    )));
                }
                tracing::debug!(
                    "One-hot '{}' -> '{}': {} categories",
                    input,
                    output,
                    vocabulary.len()
                );
                Ok(FittedTransform::OneHotEncoding {
                    output: output.clone(),
                    input: input.clone(),
                    vocabulary,
                })
            }
            TransformSpec::CopyColumns { output, input } => {
                frame.column(input)?;
                Ok(FittedTransform::CopyColumns {
                    output: output.clone(),
                    input: input.clone(),
                })
            }
        }
    }
}

/// Transform with learned state, ready to apply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FittedTransform {
    Concatenate {
        output: String,
        inputs: Vec<String>,
    },
    OneHotEncoding {
        output: String,
        input: String,
        /// Categories in order of first occurrence; position = slot in the vector
        vocabulary: Vec<String>,
    },
    CopyColumns {
        output: String,
        input: String,
    },
}

impl FittedTransform {
    /// Add this transform's output column to `frame`
    pub fn apply(&self, frame: &mut DataFrame) -> Result<()> {
        match self {
            FittedTransform::Concatenate { output, inputs } => {
                let columns = inputs
                    .iter()
                    .map(|name| frame.numeric(name))
                    .collect::<Result<Vec<_>>>()?;
                let width: usize = columns.iter().map(|(w, _)| *w).sum();

                let mut values = Vec::with_capacity(frame.n_rows() * width);
                for row in 0..frame.n_rows() {
                    for (w, data) in &columns {
                        values.extend_from_slice(&data[row * w..(row + 1) * w]);
                    }
                }
                frame.insert(output.clone(), ColumnData::Numeric { width, values })
            }
            FittedTransform::OneHotEncoding {
                output,
                input,
                vocabulary,
            } => {
                let index: HashMap<&str, usize> = vocabulary
                    .iter()
                    .enumerate()
                    .map(|(i, v)| (v.as_str(), i))
                    .collect();
                let width = vocabulary.len();

                let column = frame.text(input)?;
                let mut values = vec![0.0; column.len() * width];
                for (row, value) in column.iter().enumerate() {
                    // Unseen categories stay all-zero.
                    if let Some(&slot) = index.get(value.as_str()) {
                        values[row * width + slot] = 1.0;
                    }
                }
                frame.insert(output.clone(), ColumnData::Numeric { width, values })
            }
            FittedTransform::CopyColumns { output, input } => {
                let data = frame.column(input)?.clone();
                frame.insert(output.clone(), data)
            }
        }
    }
}
