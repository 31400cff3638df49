//! Step-log cleaning stages
//!
//! Every stage takes the whole table by reference and returns a new one:
//! - Schema normalization (raw headers to canonical names)
//! - Problem hierarchy splitting (unit / section)
//! - Categorical encoding (unit and arbitrary string columns)
//! - Null repair (valid-null durations, KC labels, opportunity counters)
//! - Identifier building (problem_id, step_id)
//! - Text encoding normalization
//! - Target recoding ({0,1} to {-1,1})
//! - Multiplicity filtering (steps seen more than once)
//!
//! Row identity lives in an explicit [`INDEX_COLUMN`]. Stages that address
//! rows by id call [`ensure_contiguous_index`] before doing any work.

mod config;
mod encoder;
mod pipeline;
pub mod filter;
pub mod hierarchy;
pub mod identifiers;
pub mod quality;
pub mod repair;
pub mod schema;
pub mod target;
pub mod text;

pub use config::{CleaningConfig, EncodingScope, KcPair, SectionAlignment};
pub use encoder::{col_to_int, unit_to_int, CategoryEncoder};
pub use filter::{multiple_instance_steps, retain_rows};
pub use hierarchy::split_problem_hierarchy;
pub use identifiers::{create_unique_problem_id, create_unique_step_id};
pub use pipeline::{CleaningPipeline, CleaningReport, StageTiming};
pub use quality::{null_report, NullFilter, NullReport};
pub use repair::{fill_error_step_duration, fill_kc_null, fill_kc_op_null, valid_error_step_duration};
pub use schema::{rename_columns, validate_raw_headers, ColumnSpec};
pub use target::create_target_to_one_negative_one;
pub use text::{change_encoding, detect_encoding, DecodePolicy};

use crate::error::{CleanError, Result};
use polars::prelude::*;

/// Name of the contiguous row-id column
pub const INDEX_COLUMN: &str = "index";

/// Rewrite the row index as `0..height`.
///
/// The column is inserted first when absent, replaced in place otherwise.
pub fn reset_index(df: &DataFrame) -> Result<DataFrame> {
    let ids: Vec<i64> = (0..df.height() as i64).collect();
    let index = Series::new(INDEX_COLUMN.into(), ids);

    let mut result = df.clone();
    if df.get_column_index(INDEX_COLUMN).is_some() {
        result.with_column(index)?;
    } else {
        result.insert_column(0, index)?;
    }
    Ok(result)
}

/// Fail unless the row index exists and equals `0..height`.
pub fn ensure_contiguous_index(df: &DataFrame) -> Result<()> {
    let column = df
        .column(INDEX_COLUMN)
        .map_err(|_| CleanError::IndexMissing)?;
    let series = column.as_materialized_series();
    let ids = series
        .i64()
        .map_err(|_| CleanError::type_mismatch(INDEX_COLUMN, "Int64", series.dtype()))?;

    for (position, found) in ids.into_iter().enumerate() {
        if found != Some(position as i64) {
            return Err(CleanError::IndexNotContiguous { position, found });
        }
    }
    Ok(())
}

pub(crate) fn series<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    df.column(name)
        .map(|c| c.as_materialized_series())
        .map_err(|_| CleanError::ColumnNotFound(name.to_string()))
}

/// Borrow a text column, rejecting any other dtype.
pub(crate) fn str_values<'a>(df: &'a DataFrame, name: &str) -> Result<&'a StringChunked> {
    let s = series(df, name)?;
    s.str()
        .map_err(|_| CleanError::type_mismatch(name, "String", s.dtype()))
}

/// Integer column widened to Int64.
pub(crate) fn int_values(df: &DataFrame, name: &str) -> Result<Int64Chunked> {
    let s = series(df, name)?;
    if !s.dtype().is_integer() {
        return Err(CleanError::type_mismatch(name, "integer", s.dtype()));
    }
    let widened = s.cast(&DataType::Int64)?;
    Ok(widened.i64()?.clone())
}

/// Numeric column widened to Float64.
pub(crate) fn float_values(df: &DataFrame, name: &str) -> Result<Float64Chunked> {
    let s = series(df, name)?;
    let dtype = s.dtype();
    if !(dtype.is_float() || dtype.is_integer()) {
        return Err(CleanError::type_mismatch(name, "numeric", dtype));
    }
    let widened = s.cast(&DataType::Float64)?;
    Ok(widened.f64()?.clone())
}

/// Text rendering of a scalar column (`3` -> `"3"`), nulls preserved.
pub(crate) fn text_values(df: &DataFrame, name: &str) -> Result<StringChunked> {
    let s = series(df, name)?;
    let dtype = s.dtype();
    match dtype {
        DataType::String => Ok(s.str()?.clone()),
        d if d.is_integer() || d.is_float() || matches!(d, DataType::Boolean) => {
            let rendered = s.cast(&DataType::String)?;
            Ok(rendered.str()?.clone())
        }
        other => Err(CleanError::type_mismatch(name, "scalar", other)),
    }
}
