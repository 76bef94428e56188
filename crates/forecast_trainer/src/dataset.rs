//! CSV dataset loading
//!
//! Reads `products.stats.csv` style files: a required header row naming the
//! [`ProductData`] columns in declared order, then one observation per line.

use eshop_forecast_core::{DataFrame, ProductData};
use std::path::Path;

use crate::errors::DatasetError;

/// Training dataset of product observations
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset {
    rows: Vec<ProductData>,
}

impl Dataset {
    /// Wrap records that were produced elsewhere
    pub fn from_records(rows: Vec<ProductData>) -> Self {
        Self { rows }
    }

    /// Load dataset from CSV file
    /// Expected header: next,productId,year,month,units,avg,count,max,min,prev
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|source| DatasetError::Open {
                path: path.to_path_buf(),
                source,
            })?;

        let header: Vec<String> = reader
            .headers()
            .map_err(|err| row_error(&err, 1))?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').to_string())
            .collect();

        let schema = ProductData::schema();
        if !schema.matches_header(&header) {
            return Err(DatasetError::Header {
                expected: schema.names().join(","),
                found: header.join(","),
            });
        }

        let mut rows = Vec::new();
        for (idx, result) in reader.deserialize::<ProductData>().enumerate() {
            let record = result.map_err(|err| row_error(&err, idx as u64 + 2))?;
            rows.push(record);
        }

        if rows.is_empty() {
            return Err(DatasetError::Empty(path.to_path_buf()));
        }

        Ok(Self { rows })
    }

    /// Get number of samples
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if dataset is empty
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[ProductData] {
        &self.rows
    }

    /// Columnar view used by the pipeline
    pub fn to_frame(&self) -> DataFrame {
        DataFrame::from_products(&self.rows)
    }

    /// Number of distinct product identifiers
    pub fn product_count(&self) -> usize {
        let mut ids: Vec<&str> = self.rows.iter().map(|r| r.product_id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        ids.len()
    }

    /// (column, min, max) for every numeric column, in schema order
    pub fn column_stats(&self) -> Vec<(&'static str, f64, f64)> {
        ProductData::COLUMNS
            .iter()
            .filter(|&&name| name != ProductData::PRODUCT_ID)
            .map(|&name| {
                let (min, max) = self
                    .rows
                    .iter()
                    .filter_map(|r| r.numeric(name))
                    .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                        (lo.min(v), hi.max(v))
                    });
                (name, min, max)
            })
            .collect()
    }
}

fn row_error(err: &csv::Error, fallback_line: u64) -> DatasetError {
    let line = err.position().map(|p| p.line()).unwrap_or(fallback_line);
    DatasetError::Row {
        line,
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "next,productId,year,month,units,avg,count,max,min,prev";

    fn create_test_csv(lines: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_csv() {
        let file = create_test_csv(&[
            HEADER,
            "10,988,2017,11,8,2.66,3,4,1,6",
            "12,988,2017,12,10,3.33,3,5,2,8",
            "4,1119,2017,12,3,1.5,2,2,1,5",
        ]);
        let dataset = Dataset::from_csv(file.path()).unwrap();

        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.product_count(), 2);

        let first = &dataset.rows()[0];
        assert_eq!(first.next, 10.0);
        assert_eq!(first.product_id, "988");
        assert_eq!(first.avg, 2.66);
        assert_eq!(first.prev, 6.0);
    }

    #[test]
    fn test_header_must_match_schema_order() {
        let file = create_test_csv(&[
            "productId,next,year,month,units,avg,count,max,min,prev",
            "988,10,2017,11,8,2.66,3,4,1,6",
        ]);

        let err = Dataset::from_csv(file.path()).unwrap_err();
        assert!(matches!(err, DatasetError::Header { .. }), "{err}");
    }

    #[test]
    fn test_malformed_row_reports_line() {
        let file = create_test_csv(&[
            HEADER,
            "10,988,2017,11,8,2.66,3,4,1,6",
            "12,988,2017,twelve,10,3.33,3,5,2,8",
        ]);

        match Dataset::from_csv(file.path()).unwrap_err() {
            DatasetError::Row { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_header_only_is_empty() {
        let file = create_test_csv(&[HEADER]);
        assert!(matches!(
            Dataset::from_csv(file.path()),
            Err(DatasetError::Empty(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            Dataset::from_csv("does/not/exist.csv"),
            Err(DatasetError::Open { .. })
        ));
    }

    #[test]
    fn test_column_stats() {
        let file = create_test_csv(&[
            HEADER,
            "10,988,2017,11,8,2.5,3,4,1,6",
            "12,988,2018,1,10,3.5,3,5,2,8",
        ]);
        let dataset = Dataset::from_csv(file.path()).unwrap();

        let stats = dataset.column_stats();
        assert_eq!(stats.len(), ProductData::COLUMNS.len() - 1);
        assert_eq!(stats[0], ("next", 10.0, 12.0));
        assert_eq!(stats[1], ("year", 2017.0, 2018.0));
        assert_eq!(stats[4], ("avg", 2.5, 3.5));
    }
}
