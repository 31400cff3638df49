//! Domain null repair
//!
//! Three kinds of missing values in the step logs carry meaning and are
//! filled rather than imputed:
//! - `error_step_duration` is null when the step was solved correctly
//! - a missing KC label gets a per-unit placeholder (`null_<unit>`)
//! - a missing opportunity count is rebuilt as a running count per
//!   (KC, student) in row order
//!
//! All repairs address rows by position and require a contiguous index.

use crate::error::Result;
use polars::prelude::*;
use std::collections::HashMap;
use tracing::{info, warn};

use super::{ensure_contiguous_index, float_values, int_values, str_values, text_values};

const ERROR_STEP_DURATION: &str = "error_step_duration";
const CORRECT_FIRST_ATTEMPT: &str = "correct_first_attempt";
const STUDENT_ID: &str = "student_id";
const UNIT: &str = "unit";

/// Row ids whose error duration is a valid null (step solved correctly).
pub fn valid_error_step_duration(df: &DataFrame) -> Result<Vec<usize>> {
    ensure_contiguous_index(df)?;

    let durations = float_values(df, ERROR_STEP_DURATION)?;
    let first_attempt = int_values(df, CORRECT_FIRST_ATTEMPT)?;

    Ok(durations
        .into_iter()
        .zip(first_attempt.into_iter())
        .enumerate()
        .filter(|(_, (duration, cfa))| duration.is_none() && *cfa == Some(1))
        .map(|(row, _)| row)
        .collect())
}

/// Write `sentinel` into every valid-null error duration.
///
/// Nulls on incorrect steps are true missing data and stay null.
pub fn fill_error_step_duration(df: &DataFrame, sentinel: f64) -> Result<DataFrame> {
    let rows = valid_error_step_duration(df)?;

    let mut values: Vec<Option<f64>> = float_values(df, ERROR_STEP_DURATION)?
        .into_iter()
        .collect();
    for &row in &rows {
        values[row] = Some(sentinel);
    }

    let mut result = df.clone();
    result.with_column(Series::new(ERROR_STEP_DURATION.into(), values))?;

    info!(filled = rows.len(), sentinel, "Repaired valid-null error step durations");
    Ok(result)
}

/// Replace null KC labels with `null_<unit>` of the same row.
pub fn fill_kc_null(df: &DataFrame, column: &str) -> Result<DataFrame> {
    ensure_contiguous_index(df)?;

    let labels = str_values(df, column)?;
    let units = text_values(df, UNIT)?;

    let mut filled = 0usize;
    let mut unresolved = 0usize;
    let values: Vec<Option<String>> = labels
        .into_iter()
        .zip(units.into_iter())
        .map(|(label, unit)| match (label, unit) {
            (Some(label), _) => Some(label.to_string()),
            (None, Some(unit)) => {
                filled += 1;
                Some(format!("null_{unit}"))
            }
            (None, None) => {
                unresolved += 1;
                None
            }
        })
        .collect();

    if unresolved > 0 {
        warn!(column, unresolved, "KC labels left null, unit is missing");
    }

    let mut result = df.clone();
    result.with_column(Series::new(column.into(), values))?;

    info!(column, filled, "Filled null KC labels");
    Ok(result)
}

/// Rebuild null opportunity counts as 1-based running counts per
/// (KC value, student), in row order. The column comes back as text.
pub fn fill_kc_op_null(df: &DataFrame, kc_column: &str, opportunity_column: &str) -> Result<DataFrame> {
    ensure_contiguous_index(df)?;

    let opportunities = text_values(df, opportunity_column)?;
    let skills = str_values(df, kc_column)?;
    let students = str_values(df, STUDENT_ID)?;

    let mut counters: HashMap<(&str, &str), u64> = HashMap::new();
    let mut filled = 0usize;
    let mut ungrouped = 0usize;

    let values: Vec<Option<String>> = opportunities
        .into_iter()
        .zip(skills.into_iter().zip(students.into_iter()))
        .map(|(opportunity, group)| match (opportunity, group) {
            (Some(existing), _) => Some(existing.to_string()),
            (None, (Some(skill), Some(student))) => {
                let count = counters.entry((skill, student)).or_insert(0);
                *count += 1;
                filled += 1;
                Some(count.to_string())
            }
            (None, _) => {
                ungrouped += 1;
                None
            }
        })
        .collect();

    if ungrouped > 0 {
        warn!(
            column = opportunity_column,
            ungrouped,
            "Opportunity counts left null, KC or student is missing"
        );
    }

    let mut result = df.clone();
    result.with_column(Series::new(opportunity_column.into(), values))?;

    info!(
        column = opportunity_column,
        groups = counters.len(),
        filled,
        "Filled null opportunity counts"
    );
    Ok(result)
}
