//! Text encoding normalization
//!
//! The raw export mixes encodings in `Problem Name` / `Step Name`. The loader
//! decodes lossily, leaving U+FFFD where bytes were not valid UTF-8; binary
//! columns still hold the original bytes. [`DecodePolicy`] decides what
//! happens to those spots.

use crate::error::{CleanError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::series;

const REPLACEMENT: char = char::REPLACEMENT_CHARACTER;

/// What to do with undecodable input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecodePolicy {
    /// Fail with [`CleanError::DecodeError`]
    Reject,
    /// Keep U+FFFD in place of the bad bytes
    Substitute,
    /// Remove the bad bytes
    Drop,
}

impl DecodePolicy {
    fn apply_bytes(&self, column: &str, row: usize, bytes: &[u8]) -> Result<String> {
        match std::str::from_utf8(bytes) {
            Ok(text) => Ok(text.to_string()),
            Err(_) => match self {
                DecodePolicy::Reject => Err(decode_error(column, row)),
                DecodePolicy::Substitute => Ok(String::from_utf8_lossy(bytes).into_owned()),
                DecodePolicy::Drop => Ok(bytes.utf8_chunks().map(|chunk| chunk.valid()).collect()),
            },
        }
    }

    fn apply_text(&self, column: &str, row: usize, text: &str) -> Result<String> {
        if !text.contains(REPLACEMENT) {
            return Ok(text.to_string());
        }
        match self {
            DecodePolicy::Reject => Err(decode_error(column, row)),
            DecodePolicy::Substitute => Ok(text.to_string()),
            DecodePolicy::Drop => Ok(text.chars().filter(|&c| c != REPLACEMENT).collect()),
        }
    }
}

fn decode_error(column: &str, row: usize) -> CleanError {
    CleanError::DecodeError {
        column: column.to_string(),
        row,
    }
}

/// Force `column` into canonical UTF-8 text under `policy`.
///
/// Binary columns are decoded; text columns have their replacement
/// characters handled. The result is always a `String` column.
pub fn change_encoding(df: &DataFrame, column: &str, policy: DecodePolicy) -> Result<DataFrame> {
    let s = series(df, column)?;

    let values: Vec<Option<String>> = match s.dtype() {
        DataType::String => s
            .str()?
            .into_iter()
            .enumerate()
            .map(|(row, v)| v.map(|text| policy.apply_text(column, row, text)).transpose())
            .collect::<Result<_>>()?,
        DataType::Binary => s
            .binary()?
            .into_iter()
            .enumerate()
            .map(|(row, v)| v.map(|bytes| policy.apply_bytes(column, row, bytes)).transpose())
            .collect::<Result<_>>()?,
        other => return Err(CleanError::type_mismatch(column, "String or Binary", other)),
    };

    let mut result = df.clone();
    result.with_column(Series::new(column.into(), values))?;

    info!(column, ?policy, "Normalized text encoding");
    Ok(result)
}

/// Add `ENC_<column>` with the detected encoding of each value:
/// `"ascii"`, `"utf-8"`, or null when the value did not decode cleanly.
pub fn detect_encoding(df: &DataFrame, column: &str) -> Result<DataFrame> {
    let s = series(df, column)?;

    let labels: Vec<Option<&'static str>> = match s.dtype() {
        DataType::String => s
            .str()?
            .into_iter()
            .map(|v| v.and_then(classify_text))
            .collect(),
        DataType::Binary => s
            .binary()?
            .into_iter()
            .map(|v| v.and_then(|bytes| std::str::from_utf8(bytes).ok()).and_then(classify_text))
            .collect(),
        other => return Err(CleanError::type_mismatch(column, "String or Binary", other)),
    };

    let name = format!("ENC_{column}");
    let mut result = df.clone();
    result.with_column(Series::new(name.as_str().into(), labels))?;

    debug!(column, "Detected text encodings");
    Ok(result)
}

fn classify_text(text: &str) -> Option<&'static str> {
    if text.contains(REPLACEMENT) {
        None
    } else if text.is_ascii() {
        Some("ascii")
    } else {
        Some("utf-8")
    }
}
