//! Step-log file loading and saving
//!
//! Both the raw export and the cleaned output are tab-separated with a
//! header row. Columns we know are read with their declared type, empty
//! fields become null, and invalid UTF-8 is decoded lossily so that the
//! text normalization stage decides what to do with it.

use crate::error::{CleanError, Result};
use crate::preprocessing::schema::{canonical_kind, raw_kind, schema_for_headers, ColumnKind};
use crate::preprocessing::reset_index;
use polars::prelude::*;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Loader for step-log TSV files
pub struct DataLoader {
    separator: u8,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    /// Create a new tab-separated loader
    pub fn new() -> Self {
        Self { separator: b'\t' }
    }

    /// Set the field separator
    pub fn with_separator(mut self, separator: u8) -> Self {
        self.separator = separator;
        self
    }

    /// Read the header row only
    pub fn read_header(&self, path: impl AsRef<Path>) -> Result<Vec<String>> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mut lines = BufReader::new(file).lines();

        let header = lines
            .next()
            .transpose()?
            .ok_or_else(|| CleanError::DataError(format!("{} is empty", path.display())))?;

        let separator = char::from(self.separator);
        Ok(header
            .trim_end_matches(['\r', '\n'])
            .split(separator)
            .map(|s| s.to_string())
            .collect())
    }

    /// Load a raw export with the raw type map and attach a row index
    pub fn load_raw(&self, path: impl AsRef<Path>) -> Result<DataFrame> {
        let df = self.load_typed(path.as_ref(), raw_kind)?;
        reset_index(&df)
    }

    /// Load a cleaned file with the canonical type map
    pub fn load_cleaned(&self, path: impl AsRef<Path>) -> Result<DataFrame> {
        self.load_typed(path.as_ref(), canonical_kind)
    }

    fn load_typed<F>(&self, path: &Path, kind_of: F) -> Result<DataFrame>
    where
        F: Fn(&str) -> Option<ColumnKind>,
    {
        let start = Instant::now();
        let headers = self.read_header(path)?;
        let schema = schema_for_headers(&headers, kind_of);

        let parse_opts = CsvParseOptions::default()
            .with_separator(self.separator)
            .with_encoding(CsvEncoding::LossyUtf8)
            .with_missing_is_null(true);

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .with_schema_overwrite(Some(Arc::new(schema)))
            .with_parse_options(parse_opts)
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()?;

        info!(
            path = %path.display(),
            rows = df.height(),
            cols = df.width(),
            secs = start.elapsed().as_secs_f64(),
            "Loaded table"
        );
        Ok(df)
    }
}

/// Save tables as delimited text
pub struct DataSaver;

impl DataSaver {
    /// Save with a header row using `separator`
    pub fn save_delimited(df: &mut DataFrame, path: impl AsRef<Path>, separator: u8) -> Result<()> {
        let path = path.as_ref();
        let mut file = File::create(path)?;

        CsvWriter::new(&mut file)
            .include_header(true)
            .with_separator(separator)
            .finish(df)?;

        info!(path = %path.display(), rows = df.height(), "Saved table");
        Ok(())
    }

    /// Save as TSV
    pub fn save_tsv(df: &mut DataFrame, path: impl AsRef<Path>) -> Result<()> {
        Self::save_delimited(df, path, b'\t')
    }
}
