//! Columnar in-memory table that transforms read from and write to
//!
//! Numeric columns are stored row-major with a fixed `width`; scalar columns
//! have width 1 and vector columns (such as the concatenated feature vector)
//! have one slot per component.

use crate::errors::{ForecastError, Result};
use crate::schema::ProductData;

/// Values of a single named column
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Text(Vec<String>),
    Numeric { width: usize, values: Vec<f64> },
}

impl ColumnData {
    /// Width-1 numeric column
    pub fn scalar(values: Vec<f64>) -> Self {
        ColumnData::Numeric { width: 1, values }
    }

    /// Number of rows held by this column
    pub fn rows(&self) -> usize {
        match self {
            ColumnData::Text(values) => values.len(),
            ColumnData::Numeric { width, values } => {
                if *width == 0 {
                    0
                } else {
                    values.len() / width
                }
            }
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            ColumnData::Text(_) => "text",
            ColumnData::Numeric { .. } => "numeric",
        }
    }

    fn select_rows(&self, indices: &[usize]) -> Self {
        match self {
            ColumnData::Text(values) => {
                ColumnData::Text(indices.iter().map(|&i| values[i].clone()).collect())
            }
            ColumnData::Numeric { width, values } => {
                let mut selected = Vec::with_capacity(indices.len() * width);
                for &i in indices {
                    selected.extend_from_slice(&values[i * width..(i + 1) * width]);
                }
                ColumnData::Numeric {
                    width: *width,
                    values: selected,
                }
            }
        }
    }
}

/// Dense row-major feature matrix handed to the tree ensemble
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    pub n_rows: usize,
    pub n_features: usize,
    pub values: Vec<f64>,
}

impl FeatureMatrix {
    pub fn new(n_rows: usize, n_features: usize, values: Vec<f64>) -> Self {
        debug_assert_eq!(values.len(), n_rows * n_features);
        Self {
            n_rows,
            n_features,
            values,
        }
    }

    /// Feature vector of one row
    pub fn row(&self, idx: usize) -> &[f64] {
        &self.values[idx * self.n_features..(idx + 1) * self.n_features]
    }

    /// Single feature value
    pub fn get(&self, row: usize, feature: usize) -> f64 {
        self.values[row * self.n_features + feature]
    }
}

/// Named columns sharing one row count
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataFrame {
    n_rows: usize,
    columns: Vec<(String, ColumnData)>,
}

impl DataFrame {
    /// Empty frame with a fixed row count
    pub fn with_rows(n_rows: usize) -> Self {
        Self {
            n_rows,
            columns: Vec::new(),
        }
    }

    /// Build a frame with one column per [`ProductData`] field, in schema order
    pub fn from_products(rows: &[ProductData]) -> Self {
        let mut frame = Self::with_rows(rows.len());

        for name in ProductData::COLUMNS {
            let data = if name == ProductData::PRODUCT_ID {
                ColumnData::Text(rows.iter().map(|r| r.product_id.clone()).collect())
            } else {
                ColumnData::scalar(
                    rows.iter()
                        .map(|r| r.numeric(name).unwrap_or(f64::NAN))
                        .collect(),
                )
            };
            frame.columns.push((name.to_string(), data));
        }

        frame
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    /// Column names in insertion order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Result<&ColumnData> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, data)| data)
            .ok_or_else(|| ForecastError::MissingColumn(name.to_string()))
    }

    /// Add a column, replacing any existing column of the same name
    pub fn insert(&mut self, name: impl Into<String>, data: ColumnData) -> Result<()> {
        let name = name.into();
        if data.rows() != self.n_rows {
            return Err(ForecastError::RowCount {
                column: name,
                expected: self.n_rows,
                actual: data.rows(),
            });
        }

        match self.columns.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = data,
            None => self.columns.push((name, data)),
        }
        Ok(())
    }

    /// Numeric column as `(width, values)`
    pub fn numeric(&self, name: &str) -> Result<(usize, &[f64])> {
        match self.column(name)? {
            ColumnData::Numeric { width, values } => Ok((*width, values.as_slice())),
            other => Err(ForecastError::ColumnType {
                column: format!("{name} ({})", other.kind_name()),
                expected: "numeric",
            }),
        }
    }

    /// Width-1 numeric column
    pub fn scalar(&self, name: &str) -> Result<&[f64]> {
        match self.numeric(name)? {
            (1, values) => Ok(values),
            _ => Err(ForecastError::ColumnType {
                column: name.to_string(),
                expected: "scalar numeric",
            }),
        }
    }

    pub fn text(&self, name: &str) -> Result<&[String]> {
        match self.column(name)? {
            ColumnData::Text(values) => Ok(values.as_slice()),
            other => Err(ForecastError::ColumnType {
                column: format!("{name} ({})", other.kind_name()),
                expected: "text",
            }),
        }
    }

    /// Copy a numeric column out as a feature matrix
    pub fn feature_matrix(&self, name: &str) -> Result<FeatureMatrix> {
        let (width, values) = self.numeric(name)?;
        Ok(FeatureMatrix::new(self.n_rows, width, values.to_vec()))
    }

    /// New frame holding only the given rows, in the given order
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        Self {
            n_rows: indices.len(),
            columns: self
                .columns
                .iter()
                .map(|(name, data)| (name.clone(), data.select_rows(indices)))
                .collect(),
        }
    }
}
