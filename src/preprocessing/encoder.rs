//! Categorical encoding to dense integer codes

use crate::error::{CleanError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use super::{int_values, str_values};

/// Bijective `category -> code` table for one column.
///
/// Codes are assigned in first-seen order and are dense in `0..len()`.
/// Nulls are never encoded and stay null through both directions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryEncoder {
    column: String,
    mapping: HashMap<String, i64>,
    categories: Vec<String>,
    is_fitted: bool,
}

impl CategoryEncoder {
    /// Create an unfitted encoder for `column`
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            mapping: HashMap::new(),
            categories: Vec::new(),
            is_fitted: false,
        }
    }

    /// Fit the mapping on a single table
    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        self.fit_joint(&[df])
    }

    /// Fit one mapping across several tables, earlier tables first
    pub fn fit_joint(&mut self, tables: &[&DataFrame]) -> Result<&mut Self> {
        self.mapping.clear();
        self.categories.clear();

        for df in tables {
            let values = str_values(df, &self.column)?;
            for value in values.into_iter().flatten() {
                if !self.mapping.contains_key(value) {
                    self.mapping
                        .insert(value.to_string(), self.categories.len() as i64);
                    self.categories.push(value.to_string());
                }
            }
        }

        self.is_fitted = true;
        debug!(column = %self.column, categories = self.categories.len(), "Fitted category encoder");
        Ok(self)
    }

    /// Replace every category by its code
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(CleanError::EncoderNotFitted);
        }

        let values = str_values(df, &self.column)?;
        let codes = values
            .into_iter()
            .map(|v| match v {
                Some(category) => self.code(category).map(Some),
                None => Ok(None),
            })
            .collect::<Result<Vec<Option<i64>>>>()?;

        let mut result = df.clone();
        result.with_column(Series::new(self.column.as_str().into(), codes))?;
        Ok(result)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame) -> Result<DataFrame> {
        self.fit(df)?;
        self.transform(df)
    }

    /// Map codes back to the original categories
    pub fn inverse_transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(CleanError::EncoderNotFitted);
        }

        let codes = int_values(df, &self.column)?;
        let categories = codes
            .into_iter()
            .map(|c| match c {
                Some(code) => self.category(code).map(|s| Some(s.to_string())),
                None => Ok(None),
            })
            .collect::<Result<Vec<Option<String>>>>()?;

        let mut result = df.clone();
        result.with_column(Series::new(self.column.as_str().into(), categories))?;
        Ok(result)
    }

    /// Code for a category, unmapped categories are an error
    pub fn code(&self, category: &str) -> Result<i64> {
        self.mapping
            .get(category)
            .copied()
            .ok_or_else(|| CleanError::UnmappedCategory {
                column: self.column.clone(),
                value: category.to_string(),
            })
    }

    /// Category for a code
    pub fn category(&self, code: i64) -> Result<&str> {
        usize::try_from(code)
            .ok()
            .and_then(|i| self.categories.get(i))
            .map(String::as_str)
            .ok_or_else(|| CleanError::UnmappedCategory {
                column: self.column.clone(),
                value: code.to_string(),
            })
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    /// Categories ordered by code
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }
}

/// Encode `unit` on the primary table, and on the hold-out table with the
/// same mapping when one is given.
pub fn unit_to_int(
    primary: &DataFrame,
    holdout: Option<&DataFrame>,
) -> Result<(DataFrame, Option<DataFrame>)> {
    let mut encoder = CategoryEncoder::new("unit");
    let primary = encoder.fit_transform(primary)?;
    let holdout = holdout.map(|df| encoder.transform(df)).transpose()?;
    Ok((primary, holdout))
}

/// Encode an arbitrary string column in place
pub fn col_to_int(df: &DataFrame, column: &str) -> Result<DataFrame> {
    CategoryEncoder::new(column).fit_transform(df)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(df: &DataFrame, name: &str) -> Vec<Option<i64>> {
        df.column(name).unwrap().i64().unwrap().into_iter().collect()
    }

    #[test]
    fn test_first_seen_order() {
        let df = df!("unit" => &["b", "a", "b", "c"]).unwrap();
        let mut encoder = CategoryEncoder::new("unit");
        let out = encoder.fit_transform(&df).unwrap();

        assert_eq!(codes(&out, "unit"), vec![Some(0), Some(1), Some(0), Some(2)]);
        assert_eq!(encoder.categories(), &["b", "a", "c"]);
    }

    #[test]
    fn test_bijection_and_inverse() {
        let units = ["U3", "U1", "U3", "U2", "U1"];
        let df = df!("unit" => &units).unwrap();
        let mut encoder = CategoryEncoder::new("unit");
        let encoded = encoder.fit_transform(&df).unwrap();

        assert_eq!(encoder.len(), 3);
        let decoded = encoder.inverse_transform(&encoded).unwrap();
        let back: Vec<&str> = decoded
            .column("unit")
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(back, units);
    }

    #[test]
    fn test_nulls_stay_null() {
        let df = df!("kc" => &[Some("x"), None, Some("x")]).unwrap();
        let out = col_to_int(&df, "kc").unwrap();
        assert_eq!(codes(&out, "kc"), vec![Some(0), None, Some(0)]);
    }

    #[test]
    fn test_holdout_unseen_unit_is_error() {
        let train = df!("unit" => &["U1", "U2"]).unwrap();
        let test = df!("unit" => &["U2", "U9"]).unwrap();

        let err = unit_to_int(&train, Some(&test)).unwrap_err();
        assert!(matches!(
            err,
            CleanError::UnmappedCategory { ref value, .. } if value == "U9"
        ));
    }

    #[test]
    fn test_holdout_shares_mapping() {
        let train = df!("unit" => &["U1", "U2"]).unwrap();
        let test = df!("unit" => &["U2", "U1"]).unwrap();

        let (train, test) = unit_to_int(&train, Some(&test)).unwrap();
        assert_eq!(codes(&train, "unit"), vec![Some(0), Some(1)]);
        assert_eq!(codes(&test.unwrap(), "unit"), vec![Some(1), Some(0)]);
    }

    #[test]
    fn test_joint_fit_covers_both_tables() {
        let train = df!("unit" => &["U1"]).unwrap();
        let test = df!("unit" => &["U9", "U1"]).unwrap();

        let mut encoder = CategoryEncoder::new("unit");
        encoder.fit_joint(&[&train, &test]).unwrap();
        assert_eq!(encoder.categories(), &["U1", "U9"]);
        assert_eq!(codes(&encoder.transform(&test).unwrap(), "unit"), vec![Some(1), Some(0)]);
    }

    #[test]
    fn test_transform_requires_fit() {
        let df = df!("unit" => &["U1"]).unwrap();
        let encoder = CategoryEncoder::new("unit");
        assert!(matches!(encoder.transform(&df), Err(CleanError::EncoderNotFitted)));
    }

    #[test]
    fn test_non_text_column_is_type_error() {
        let df = df!("unit" => &[1i64, 2]).unwrap();
        assert!(matches!(
            col_to_int(&df, "unit"),
            Err(CleanError::TypeMismatch { .. })
        ));
    }
}
