//! Composite problem and step identifiers
//!
//! Parts are concatenated without a separator, so `("1", "2x")` and
//! `("12", "x")` collide.

use crate::error::Result;
use polars::prelude::*;
use tracing::debug;

use super::text_values;

/// Concatenate the text form of `parts` row-wise into `target`.
///
/// A null in any part makes the identifier null.
fn concat_columns(df: &DataFrame, parts: &[&str], target: &str) -> Result<DataFrame> {
    let columns = parts
        .iter()
        .map(|name| text_values(df, name))
        .collect::<Result<Vec<StringChunked>>>()?;

    let ids: Vec<Option<String>> = (0..df.height())
        .map(|row| {
            let mut id = String::new();
            for column in &columns {
                id.push_str(column.get(row)?);
            }
            Some(id)
        })
        .collect();

    let mut result = df.clone();
    result.with_column(Series::new(target.into(), ids))?;

    debug!(column = target, ?parts, "Built composite identifier");
    Ok(result)
}

/// `problem_id = unit ⧺ problem_name`
pub fn create_unique_problem_id(df: &DataFrame) -> Result<DataFrame> {
    concat_columns(df, &["unit", "problem_name"], "problem_id")
}

/// `step_id = problem_id ⧺ step_name`
pub fn create_unique_step_id(df: &DataFrame) -> Result<DataFrame> {
    concat_columns(df, &["problem_id", "step_name"], "step_id")
}
