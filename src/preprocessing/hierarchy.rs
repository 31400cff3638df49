//! Problem hierarchy splitting
//!
//! `"Unit CTA1_01, Section CTA1_01-1"` becomes `unit = "Unit CTA1_01"` and
//! `section = " Section CTA1_01-1"`. Segments are kept verbatim, whitespace
//! included.

use crate::error::{CleanError, Result};
use polars::prelude::*;
use tracing::debug;

use super::schema::HIERARCHY_COLUMN;
use super::{str_values, SectionAlignment};

/// Split the hierarchy column into `unit` and `section` and drop it.
pub fn split_problem_hierarchy(df: &DataFrame, alignment: SectionAlignment) -> Result<DataFrame> {
    let hierarchy = str_values(df, HIERARCHY_COLUMN)?;

    let mut units: Vec<String> = Vec::with_capacity(hierarchy.len());
    let mut sections: Vec<Option<String>> = Vec::with_capacity(hierarchy.len());

    for (row, value) in hierarchy.into_iter().enumerate() {
        let value = value.ok_or_else(|| malformed(row, "hierarchy is null"))?;
        let mut segments = value.split(',');

        // `split` always yields a first segment; the second is what may be absent
        let unit = segments.next().unwrap_or_default();
        let section = segments
            .next()
            .ok_or_else(|| malformed(row, &format!("expected 'unit,section', got {value:?}")))?;

        units.push(unit.to_string());
        sections.push(Some(section.to_string()));
    }

    if alignment == SectionAlignment::LegacyShifted {
        if let Some(first) = sections.first_mut() {
            *first = None;
        }
    }

    let mut result = df.drop(HIERARCHY_COLUMN)?;
    result.with_column(Series::new("unit".into(), units))?;
    result.with_column(Series::new("section".into(), sections))?;

    debug!(rows = result.height(), ?alignment, "Split problem hierarchy");
    Ok(result)
}

fn malformed(row: usize, reason: &str) -> CleanError {
    CleanError::MalformedInput {
        column: HIERARCHY_COLUMN.to_string(),
        row,
        reason: reason.to_string(),
    }
}
