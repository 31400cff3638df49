//! Label recoding

use crate::error::Result;
use polars::prelude::*;
use tracing::{debug, warn};

use super::int_values;

/// Copy `correct_first_attempt` into `y_one_negative_one` with `0 -> -1`.
///
/// Values other than 0 and 1 are copied unchanged.
pub fn create_target_to_one_negative_one(df: &DataFrame) -> Result<DataFrame> {
    let labels = int_values(df, "correct_first_attempt")?;

    let mut out_of_domain = 0usize;
    let recoded: Vec<Option<i64>> = labels
        .into_iter()
        .map(|label| match label {
            Some(0) => Some(-1),
            Some(1) => Some(1),
            Some(other) => {
                out_of_domain += 1;
                Some(other)
            }
            None => None,
        })
        .collect();

    if out_of_domain > 0 {
        warn!(out_of_domain, "Labels outside {{0,1}} copied unchanged");
    }

    let mut result = df.clone();
    result.with_column(Series::new("y_one_negative_one".into(), recoded))?;

    debug!(rows = result.height(), "Recoded target");
    Ok(result)
}
