//! Cleaning configuration

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use super::DecodePolicy;

/// How the `section` column lines up with `unit` after splitting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SectionAlignment {
    /// Every row keeps its own section
    Aligned,
    /// The first row's section is left null, matching older cleaned files
    LegacyShifted,
}

/// Which tables the unit mapping is fitted on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EncodingScope {
    /// Fit on the primary table; unseen hold-out units are an error
    Primary,
    /// Fit on primary and hold-out together, primary values first
    Joint,
}

/// A knowledge-component column and its opportunity counter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KcPair {
    pub kc: String,
    pub opportunity: String,
}

impl KcPair {
    pub fn new(kc: impl Into<String>, opportunity: impl Into<String>) -> Self {
        Self {
            kc: kc.into(),
            opportunity: opportunity.into(),
        }
    }
}

/// Configuration for the cleaning pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    /// Field separator for both input and output files
    pub separator: u8,

    /// Alignment of `section` against `unit`
    pub section_alignment: SectionAlignment,

    /// Tables the unit encoding is fitted on
    pub encoding_scope: EncodingScope,

    /// Handling of undecodable bytes in text columns
    pub decode_policy: DecodePolicy,

    /// Columns forced into canonical text
    pub text_columns: Vec<String>,

    /// KC taxonomies to repair, in order
    pub kc_pairs: Vec<KcPair>,

    /// Value written into valid-null error durations
    pub duration_sentinel: f64,

    /// Keep only rows of steps attempted more than once
    pub drop_single_attempt_steps: bool,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            separator: b'\t',
            section_alignment: SectionAlignment::Aligned,
            encoding_scope: EncodingScope::Primary,
            decode_policy: DecodePolicy::Drop,
            text_columns: vec!["problem_name".to_string(), "step_name".to_string()],
            kc_pairs: vec![
                KcPair::new("kc_subskills", "opp_subskills"),
                KcPair::new("k_traced_skills", "opp_k_traced"),
                KcPair::new("kc_rules", "opp_rules"),
            ],
            duration_sentinel: -1.0,
            drop_single_attempt_steps: false,
        }
    }
}

impl CleaningConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a JSON configuration; missing fields take their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn with_section_alignment(mut self, alignment: SectionAlignment) -> Self {
        self.section_alignment = alignment;
        self
    }

    pub fn with_encoding_scope(mut self, scope: EncodingScope) -> Self {
        self.encoding_scope = scope;
        self
    }

    pub fn with_decode_policy(mut self, policy: DecodePolicy) -> Self {
        self.decode_policy = policy;
        self
    }

    /// Builder method to enable the multiplicity filter
    pub fn with_drop_single_attempt_steps(mut self, enabled: bool) -> Self {
        self.drop_single_attempt_steps = enabled;
        self
    }

    pub fn with_separator(mut self, separator: u8) -> Self {
        self.separator = separator;
        self
    }
}
