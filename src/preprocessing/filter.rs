//! Multiplicity filter over `step_id`

use crate::error::{CleanError, Result};
use polars::prelude::*;
use std::collections::HashMap;
use tracing::info;

use super::{ensure_contiguous_index, str_values, INDEX_COLUMN};

/// Row ids of every step that occurs on more than one row, ascending.
///
/// Rows without a `step_id` belong to no step and are never returned.
pub fn multiple_instance_steps(df: &DataFrame) -> Result<Vec<usize>> {
    ensure_contiguous_index(df)?;

    let steps = str_values(df, "step_id")?;
    let mut groups: HashMap<&str, Vec<usize>> = HashMap::new();
    for (row, step) in steps.into_iter().enumerate() {
        if let Some(step) = step {
            groups.entry(step).or_default().push(row);
        }
    }

    let total_steps = groups.len();
    let mut rows: Vec<usize> = groups
        .into_values()
        .filter(|members| members.len() > 1)
        .flatten()
        .collect();
    rows.sort_unstable();

    info!(total_steps, rows = rows.len(), "Selected rows of repeated steps");
    Ok(rows)
}

/// Keep only `rows`, in the given order.
///
/// The index column is carried along, so it is no longer contiguous until
/// the next `reset_index`.
pub fn retain_rows(df: &DataFrame, rows: &[usize]) -> Result<DataFrame> {
    let height = df.height();
    let mut ids: Vec<IdxSize> = Vec::with_capacity(rows.len());
    for &row in rows {
        if row >= height {
            return Err(CleanError::DataError(format!(
                "row {row} out of bounds for table of height {height}"
            )));
        }
        ids.push(row as IdxSize);
    }

    let taken = df.take(&IdxCa::from_vec(INDEX_COLUMN.into(), ids))?;
    Ok(taken)
}
