//! Fixed column catalog of the Algebra step logs
//!
//! The raw export carries human-readable headers ("Anon Student Id",
//! "KC(SubSkills)", ...). Everything downstream works on the canonical
//! snake_case names. Both the raw and the cleaned files are read with a
//! fixed type map so nothing depends on schema inference.

use crate::error::{CleanError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Raw header consumed by the hierarchy splitter
pub const HIERARCHY_COLUMN: &str = "Problem Hierarchy";

/// Declared storage type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    Integer,
    Float,
    Text,
}

impl ColumnKind {
    pub fn dtype(&self) -> DataType {
        match self {
            ColumnKind::Integer => DataType::Int64,
            ColumnKind::Float => DataType::Float64,
            ColumnKind::Text => DataType::String,
        }
    }
}

/// One entry of the raw-to-canonical lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub raw: &'static str,
    pub canonical: &'static str,
    pub kind: ColumnKind,
}

const fn spec(raw: &'static str, canonical: &'static str, kind: ColumnKind) -> ColumnSpec {
    ColumnSpec { raw, canonical, kind }
}

/// Renamable raw columns, in export order
pub const RAW_COLUMNS: [ColumnSpec; 22] = [
    spec("Row", "row", ColumnKind::Integer),
    spec("Anon Student Id", "student_id", ColumnKind::Text),
    spec("Problem Name", "problem_name", ColumnKind::Text),
    spec("Problem View", "view", ColumnKind::Float),
    spec("Step Name", "step_name", ColumnKind::Text),
    spec("Step Start Time", "start_time", ColumnKind::Text),
    spec("First Transaction Time", "first_trans_time", ColumnKind::Text),
    spec("Correct Transaction Time", "correct_trans_time", ColumnKind::Text),
    spec("Step End Time", "end_time", ColumnKind::Text),
    spec("Step Duration (sec)", "step_duration", ColumnKind::Float),
    spec("Correct Step Duration (sec)", "correct_step_duration", ColumnKind::Float),
    spec("Error Step Duration (sec)", "error_step_duration", ColumnKind::Float),
    spec("Correct First Attempt", "correct_first_attempt", ColumnKind::Integer),
    spec("Incorrects", "incorrects", ColumnKind::Integer),
    spec("Hints", "hints", ColumnKind::Integer),
    spec("Corrects", "corrects", ColumnKind::Integer),
    spec("KC(SubSkills)", "kc_subskills", ColumnKind::Text),
    spec("Opportunity(SubSkills)", "opp_subskills", ColumnKind::Text),
    spec("KC(KTracedSkills)", "k_traced_skills", ColumnKind::Text),
    spec("Opportunity(KTracedSkills)", "opp_k_traced", ColumnKind::Text),
    spec("KC(Rules)", "kc_rules", ColumnKind::Text),
    spec("Opportunity(Rules)", "opp_rules", ColumnKind::Text),
];

/// Columns produced by the pipeline on top of the renamed ones
pub const DERIVED_COLUMNS: [(&str, ColumnKind); 6] = [
    ("unit", ColumnKind::Integer),
    ("section", ColumnKind::Text),
    ("problem_id", ColumnKind::Text),
    ("step_id", ColumnKind::Text),
    ("y_one_negative_one", ColumnKind::Integer),
    (super::INDEX_COLUMN, ColumnKind::Integer),
];

/// Canonical name for a raw header, if it is one of ours
pub fn canonical_name(raw: &str) -> Option<&'static str> {
    RAW_COLUMNS
        .iter()
        .find(|spec| spec.raw == raw)
        .map(|spec| spec.canonical)
}

/// Declared kind of a raw header
pub fn raw_kind(raw: &str) -> Option<ColumnKind> {
    if raw == HIERARCHY_COLUMN {
        return Some(ColumnKind::Text);
    }
    RAW_COLUMNS.iter().find(|spec| spec.raw == raw).map(|spec| spec.kind)
}

/// Declared kind of a cleaned-table column
pub fn canonical_kind(name: &str) -> Option<ColumnKind> {
    RAW_COLUMNS
        .iter()
        .find(|spec| spec.canonical == name)
        .map(|spec| spec.kind)
        .or_else(|| {
            DERIVED_COLUMNS
                .iter()
                .find(|(derived, _)| *derived == name)
                .map(|(_, kind)| *kind)
        })
}

/// Override schema for the headers we know, unknown headers left to the reader
pub fn schema_for_headers<F>(headers: &[String], kind_of: F) -> Schema
where
    F: Fn(&str) -> Option<ColumnKind>,
{
    let mut schema = Schema::with_capacity(headers.len());
    for header in headers {
        if let Some(kind) = kind_of(header) {
            schema.with_column(header.as_str().into(), kind.dtype());
        }
    }
    schema
}

/// Rename raw headers to canonical names. Unknown headers pass through.
pub fn rename_columns(df: &DataFrame) -> Result<DataFrame> {
    let mut result = df.clone();
    let mut renamed = 0usize;

    for spec in RAW_COLUMNS.iter() {
        if df.get_column_index(spec.raw).is_some() {
            result.rename(spec.raw, spec.canonical.into())?;
            renamed += 1;
        }
    }

    debug!(renamed, width = result.width(), "Normalized column names");
    Ok(result)
}

/// Check that every raw header the pipeline needs is present.
pub fn validate_raw_headers(df: &DataFrame) -> Result<()> {
    let missing: Vec<&str> = RAW_COLUMNS
        .iter()
        .map(|spec| spec.raw)
        .chain(std::iter::once(HIERARCHY_COLUMN))
        .filter(|raw| df.get_column_index(raw).is_none())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(CleanError::ConfigError(format!(
            "missing raw columns: {}",
            missing.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rename_known_and_passthrough() {
        let df = df!(
            "Anon Student Id" => &["s1"],
            "KC(Rules)" => &["r"],
            "extra" => &[1i64]
        )
        .unwrap();

        let renamed = rename_columns(&df).unwrap();
        let names: Vec<String> = renamed
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names, vec!["student_id", "kc_rules", "extra"]);
    }

    #[test]
    fn test_validate_reports_missing() {
        let df = df!("Row" => &[1i64]).unwrap();
        let err = validate_raw_headers(&df).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Anon Student Id"));
        assert!(msg.contains(HIERARCHY_COLUMN));
        assert!(!msg.contains("Row,"));
    }

    #[test]
    fn test_canonical_kinds() {
        assert_eq!(canonical_kind("unit"), Some(ColumnKind::Integer));
        assert_eq!(canonical_kind("opp_rules"), Some(ColumnKind::Text));
        assert_eq!(canonical_kind("error_step_duration"), Some(ColumnKind::Float));
        assert_eq!(canonical_kind("nope"), None);
        assert_eq!(raw_kind(HIERARCHY_COLUMN), Some(ColumnKind::Text));
    }

    #[test]
    fn test_schema_skips_unknown_headers() {
        let headers = vec!["Row".to_string(), "Mystery".to_string()];
        let schema = schema_for_headers(&headers, raw_kind);
        assert_eq!(schema.len(), 1);
        assert_eq!(schema.get("Row"), Some(&DataType::Int64));
    }
}
