//! Null accounting per column
//!
//! Used before and after cleaning to show which columns still carry
//! missing values and how many.

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Which columns a null report lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NullFilter {
    /// Only columns with at least one null
    OnlyNull,
    /// Every column
    All,
}

/// Null count of one column
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnNulls {
    pub column: String,
    pub dtype: String,
    pub null_count: usize,
    /// 1 - null_count / num_rows
    pub completeness: f64,
}

/// Null counts of a table, in column order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NullReport {
    pub num_rows: usize,
    pub per_column: Vec<ColumnNulls>,
}

impl NullReport {
    /// Total nulls across listed columns
    pub fn total_nulls(&self) -> usize {
        self.per_column.iter().map(|c| c.null_count).sum()
    }

    /// Columns whose completeness is below `threshold`
    pub fn high_missingness(&self, threshold: f64) -> Vec<&ColumnNulls> {
        self.per_column
            .iter()
            .filter(|c| c.completeness < threshold)
            .collect()
    }

    pub fn get(&self, column: &str) -> Option<&ColumnNulls> {
        self.per_column.iter().find(|c| c.column == column)
    }
}

/// Count nulls per column and log each listed entry.
pub fn null_report(df: &DataFrame, filter: NullFilter) -> NullReport {
    let num_rows = df.height();

    let per_column: Vec<ColumnNulls> = df
        .get_columns()
        .iter()
        .filter(|col| filter == NullFilter::All || col.null_count() > 0)
        .map(|col| {
            let null_count = col.null_count();
            let completeness = if num_rows > 0 {
                1.0 - null_count as f64 / num_rows as f64
            } else {
                1.0
            };
            ColumnNulls {
                column: col.name().to_string(),
                dtype: col.dtype().to_string(),
                null_count,
                completeness,
            }
        })
        .collect();

    for entry in &per_column {
        info!(column = %entry.column, nulls = entry.null_count, "Null count");
    }

    NullReport { num_rows, per_column }
}
