//! Product sales record and the column schema it is loaded with
//!
//! The CSV column order is fixed; the loader checks the file header against
//! [`ProductData::COLUMNS`] before any row is read.

use serde::{Deserialize, Serialize};

/// One (product, month) observation from `products.stats.csv`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductData {
    /// Units sold in the following month (forecast target)
    pub next: f64,
    #[serde(rename = "productId")]
    pub product_id: String,
    pub year: f64,
    pub month: f64,
    /// Units sold in this month
    pub units: f64,
    /// Rolling average of monthly units
    pub avg: f64,
    /// Number of orders
    pub count: f64,
    pub max: f64,
    pub min: f64,
    /// Units sold in the previous month
    pub prev: f64,
}

impl ProductData {
    /// Column names in declared (and file) order
    pub const COLUMNS: [&'static str; 10] = [
        "next",
        "productId",
        "year",
        "month",
        "units",
        "avg",
        "count",
        "max",
        "min",
        "prev",
    ];

    /// Name of the forecast target column
    pub const TARGET: &'static str = "next";

    /// Name of the categorical product identifier column
    pub const PRODUCT_ID: &'static str = "productId";

    /// Numeric input columns concatenated into the feature vector
    pub const NUMERIC_FEATURES: [&'static str; 8] =
        ["year", "month", "units", "avg", "count", "max", "min", "prev"];

    /// Schema describing the record shape
    pub fn schema() -> Schema {
        Schema::new(
            Self::COLUMNS
                .iter()
                .map(|&name| {
                    let kind = if name == Self::PRODUCT_ID {
                        ColumnKind::Text
                    } else {
                        ColumnKind::Numeric
                    };
                    ColumnDef::new(name, kind)
                })
                .collect(),
        )
    }

    /// Value of a numeric column by name
    pub fn numeric(&self, column: &str) -> Option<f64> {
        match column {
            "next" => Some(self.next),
            "year" => Some(self.year),
            "month" => Some(self.month),
            "units" => Some(self.units),
            "avg" => Some(self.avg),
            "count" => Some(self.count),
            "max" => Some(self.max),
            "min" => Some(self.min),
            "prev" => Some(self.prev),
            _ => None,
        }
    }
}

/// Kind of values a column holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Text,
    Numeric,
}

/// A named, typed column of the input schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    pub kind: ColumnKind,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Ordered set of input columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub columns: Vec<ColumnDef>,
}

impl Schema {
    pub fn new(columns: Vec<ColumnDef>) -> Self {
        Self { columns }
    }

    /// Column names in order
    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Position of a column by name
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Check that a header row names exactly these columns, in order
    pub fn matches_header<S: AsRef<str>>(&self, header: &[S]) -> bool {
        header.len() == self.columns.len()
            && header
                .iter()
                .zip(&self.columns)
                .all(|(h, c)| h.as_ref().trim() == c.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_follows_declared_order() {
        let schema = ProductData::schema();
        assert_eq!(schema.names(), ProductData::COLUMNS.to_vec());
        assert_eq!(schema.columns[1].kind, ColumnKind::Text);
        assert!(schema
            .columns
            .iter()
            .filter(|c| c.name != ProductData::PRODUCT_ID)
            .all(|c| c.kind == ColumnKind::Numeric));
    }

    #[test]
    fn test_matches_header() {
        let schema = ProductData::schema();
        assert!(schema.matches_header(&ProductData::COLUMNS));

        let mut swapped = ProductData::COLUMNS;
        swapped.swap(2, 3);
        assert!(!schema.matches_header(&swapped));
        assert!(!schema.matches_header(&ProductData::COLUMNS[..9]));
    }

    #[test]
    fn test_numeric_lookup() {
        let row = ProductData {
            next: 10.0,
            product_id: "988".to_string(),
            year: 2017.0,
            month: 4.0,
            units: 8.0,
            avg: 2.0,
            count: 4.0,
            max: 3.0,
            min: 1.0,
            prev: 6.0,
        };

        assert_eq!(row.numeric("next"), Some(10.0));
        assert_eq!(row.numeric("prev"), Some(6.0));
        assert_eq!(row.numeric("productId"), None);
        for name in ProductData::NUMERIC_FEATURES {
            assert!(row.numeric(name).is_some(), "{name} should be numeric");
        }
    }
}
