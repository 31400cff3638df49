//! kdd-clean - Step-log cleaning for the KDD Cup Algebra data
//!
//! Turns the raw tab-separated tutor export into a canonical table:
//! normalized column names, the problem hierarchy split into `unit` and
//! `section`, integer-coded units, repaired nulls in durations and
//! knowledge-component columns, unique problem and step identifiers, and a
//! `{-1, 1}` target.
//!
//! # Modules
//!
//! - [`preprocessing`] - Cleaning stages and the pipeline that runs them
//! - [`utils`] - TSV loading and saving
//! - [`cli`] - Command-line interface
//! - [`error`] - Error type shared by all of the above
//!
//! # Example
//!
//! ```no_run
//! use kdd_clean::prelude::*;
//!
//! let raw = DataLoader::new().load_raw("algebra_2008_2009_train.txt")?;
//! let mut pipeline = CleaningPipeline::new();
//! let mut cleaned = pipeline.run(&raw)?;
//! DataSaver::save_tsv(&mut cleaned, "train_clean.tsv")?;
//! # Ok::<(), kdd_clean::CleanError>(())
//! ```

pub mod error;
pub mod preprocessing;
pub mod utils;
pub mod cli;

pub use error::{CleanError, Result};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{CleanError, Result};
    pub use crate::preprocessing::{
        CategoryEncoder, CleaningConfig, CleaningPipeline, CleaningReport, DecodePolicy,
        EncodingScope, NullFilter, SectionAlignment, INDEX_COLUMN,
    };
    pub use crate::utils::{DataLoader, DataSaver};
}
