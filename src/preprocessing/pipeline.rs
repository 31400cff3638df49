//! Step-log cleaning pipeline
//!
//! Runs the stages in their fixed order:
//!
//! ```text
//! rename → split hierarchy → encode unit → problem_id → step_id
//!   → [keep repeated steps] → reset_index
//!   → error duration → KC labels → opportunity counts
//!   → text encoding → target
//! ```

use crate::error::{CleanError, Result};
use super::{
    config::{CleaningConfig, EncodingScope},
    encoder::CategoryEncoder,
    filter::{multiple_instance_steps, retain_rows},
    hierarchy::split_problem_hierarchy,
    identifiers::{create_unique_problem_id, create_unique_step_id},
    quality::{null_report, NullFilter},
    repair::{fill_error_step_duration, fill_kc_null, fill_kc_op_null},
    reset_index,
    schema::{rename_columns, validate_raw_headers},
    target::create_target_to_one_negative_one,
    text::change_encoding,
};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Wall time of one stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageTiming {
    pub stage: String,
    pub secs: f64,
}

/// Summary of the last run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleaningReport {
    pub rows_in: usize,
    pub rows_out: usize,
    pub holdout_rows: Option<usize>,
    pub units: usize,
    pub nulls_before: usize,
    pub nulls_after: usize,
    pub stages: Vec<StageTiming>,
    pub total_secs: f64,
}

#[derive(Default)]
struct StageClock {
    timings: Vec<StageTiming>,
}

impl StageClock {
    fn time<T>(&mut self, stage: impl Into<String>, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let start = Instant::now();
        let out = f()?;
        self.timings.push(StageTiming {
            stage: stage.into(),
            secs: start.elapsed().as_secs_f64(),
        });
        Ok(out)
    }
}

/// Cleaning pipeline over raw step-log tables
#[derive(Debug, Clone)]
pub struct CleaningPipeline {
    config: CleaningConfig,
    unit_encoder: Option<CategoryEncoder>,
    report: Option<CleaningReport>,
}

impl CleaningPipeline {
    /// Create a new pipeline with default configuration
    pub fn new() -> Self {
        Self::with_config(CleaningConfig::default())
    }

    /// Create a new pipeline with custom configuration
    pub fn with_config(config: CleaningConfig) -> Self {
        Self {
            config,
            unit_encoder: None,
            report: None,
        }
    }

    /// Clean a single raw table
    pub fn run(&mut self, raw: &DataFrame) -> Result<DataFrame> {
        let start = Instant::now();
        let mut clock = StageClock::default();
        let nulls_before = null_report(raw, NullFilter::OnlyNull).total_nulls();

        let split = self.prepare(raw, "", &mut clock)?;

        let mut encoder = CategoryEncoder::new("unit");
        clock.time("fit unit encoder", || encoder.fit(&split).map(|_| ()))?;

        let cleaned = self.finish(&split, &encoder, "", &mut clock)?;

        self.report = Some(CleaningReport {
            rows_in: raw.height(),
            rows_out: cleaned.height(),
            holdout_rows: None,
            units: encoder.len(),
            nulls_before,
            nulls_after: null_report(&cleaned, NullFilter::OnlyNull).total_nulls(),
            stages: clock.timings,
            total_secs: start.elapsed().as_secs_f64(),
        });
        self.unit_encoder = Some(encoder);

        info!(rows = cleaned.height(), cols = cleaned.width(), "Cleaning finished");
        Ok(cleaned)
    }

    /// Clean a primary table and a hold-out table with a shared unit mapping.
    ///
    /// With [`EncodingScope::Primary`] a hold-out unit missing from the
    /// primary table fails the run; [`EncodingScope::Joint`] fits on both.
    pub fn run_with_holdout(
        &mut self,
        primary: &DataFrame,
        holdout: &DataFrame,
    ) -> Result<(DataFrame, DataFrame)> {
        let start = Instant::now();
        let mut clock = StageClock::default();
        let nulls_before = null_report(primary, NullFilter::OnlyNull).total_nulls();

        let primary_split = self.prepare(primary, "", &mut clock)?;
        let holdout_split = self.prepare(holdout, "holdout ", &mut clock)?;

        let mut encoder = CategoryEncoder::new("unit");
        clock.time("fit unit encoder", || match self.config.encoding_scope {
            EncodingScope::Primary => encoder.fit(&primary_split).map(|_| ()),
            EncodingScope::Joint => encoder.fit_joint(&[&primary_split, &holdout_split]).map(|_| ()),
        })?;

        let primary_clean = self.finish(&primary_split, &encoder, "", &mut clock)?;
        let holdout_clean = self.finish(&holdout_split, &encoder, "holdout ", &mut clock)?;

        self.report = Some(CleaningReport {
            rows_in: primary.height(),
            rows_out: primary_clean.height(),
            holdout_rows: Some(holdout_clean.height()),
            units: encoder.len(),
            nulls_before,
            nulls_after: null_report(&primary_clean, NullFilter::OnlyNull).total_nulls(),
            stages: clock.timings,
            total_secs: start.elapsed().as_secs_f64(),
        });
        self.unit_encoder = Some(encoder);

        info!(
            rows = primary_clean.height(),
            holdout_rows = holdout_clean.height(),
            "Cleaning finished"
        );
        Ok((primary_clean, holdout_clean))
    }

    /// Header check, rename and hierarchy split
    fn prepare(&self, raw: &DataFrame, label: &str, clock: &mut StageClock) -> Result<DataFrame> {
        clock.time(format!("{label}validate headers"), || validate_raw_headers(raw))?;
        let df = clock.time(format!("{label}attach index"), || reset_index(raw))?;
        let df = clock.time(format!("{label}rename columns"), || rename_columns(&df))?;
        clock.time(format!("{label}split hierarchy"), || {
            split_problem_hierarchy(&df, self.config.section_alignment)
        })
    }

    /// Everything after the unit mapping is known
    fn finish(
        &self,
        df: &DataFrame,
        encoder: &CategoryEncoder,
        label: &str,
        clock: &mut StageClock,
    ) -> Result<DataFrame> {
        let config = &self.config;

        let mut df = clock.time(format!("{label}encode unit"), || encoder.transform(df))?;
        df = clock.time(format!("{label}problem id"), || create_unique_problem_id(&df))?;
        df = clock.time(format!("{label}step id"), || create_unique_step_id(&df))?;

        if config.drop_single_attempt_steps {
            df = clock.time(format!("{label}keep repeated steps"), || {
                let rows = multiple_instance_steps(&df)?;
                retain_rows(&df, &rows)
            })?;
        }

        df = clock.time(format!("{label}reset index"), || reset_index(&df))?;

        df = clock.time(format!("{label}error step duration"), || {
            fill_error_step_duration(&df, config.duration_sentinel)
        })?;

        for pair in &config.kc_pairs {
            df = clock.time(format!("{label}kc {}", pair.kc), || fill_kc_null(&df, &pair.kc))?;
        }
        for pair in &config.kc_pairs {
            df = clock.time(format!("{label}opportunity {}", pair.opportunity), || {
                fill_kc_op_null(&df, &pair.kc, &pair.opportunity)
            })?;
        }

        for column in &config.text_columns {
            df = clock.time(format!("{label}encoding {column}"), || {
                change_encoding(&df, column, config.decode_policy)
            })?;
        }

        clock.time(format!("{label}target"), || create_target_to_one_negative_one(&df))
    }

    pub fn config(&self) -> &CleaningConfig {
        &self.config
    }

    /// Unit mapping of the last run
    pub fn unit_encoder(&self) -> Option<&CategoryEncoder> {
        self.unit_encoder.as_ref()
    }

    /// Report of the last run
    pub fn report(&self) -> Option<&CleaningReport> {
        self.report.as_ref()
    }

    /// Save the unit mapping of the last run as JSON
    pub fn save_unit_mapping(&self, path: impl AsRef<Path>) -> Result<()> {
        let encoder = self.unit_encoder.as_ref().ok_or(CleanError::EncoderNotFitted)?;
        let json = serde_json::to_string_pretty(encoder)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load a unit mapping saved by [`save_unit_mapping`](Self::save_unit_mapping)
    pub fn load_unit_mapping(path: impl AsRef<Path>) -> Result<CategoryEncoder> {
        let json = std::fs::read_to_string(path)?;
        let encoder: CategoryEncoder = serde_json::from_str(&json)?;
        Ok(encoder)
    }
}

impl Default for CleaningPipeline {
    fn default() -> Self {
        Self::new()
    }
}
