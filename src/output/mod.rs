//! Output module for persisting extracted records
//!
//! This module handles:
//! - Writing records as CSV or line-delimited JSON
//! - Rotating to numbered files once a size limit is passed
//! - Aggregating run statistics

mod csv_writer;
mod jsonl_writer;
mod rotation;
pub mod stats;
mod traits;

pub use csv_writer::{CsvWriter, CSV_HEADER};
pub use jsonl_writer::JsonlWriter;
pub use rotation::{rotated_path, DEFAULT_MAX_FILE_SIZE};
pub use stats::{print_statistics, ScrapeStatistics};
pub use traits::{OutputError, OutputResult, RecordSink};

use crate::extract::Record;
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Output encoding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
pub enum OutputFormat {
    /// One header row plus one row per record
    #[default]
    #[serde(rename = "csv")]
    Csv,

    /// One JSON object per line
    #[serde(rename = "jsonl")]
    JsonLines,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::JsonLines => "jsonl",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "jsonl" => Ok(Self::JsonLines),
            other => Err(format!(
                "unknown output format '{}', expected 'csv' or 'jsonl'",
                other
            )),
        }
    }
}

/// Record writer for the format chosen at construction
#[derive(Debug)]
pub enum OutputWriter {
    Csv(CsvWriter),
    JsonLines(JsonlWriter),
}

impl OutputWriter {
    /// Creates a writer for `format` whose first file is `path`
    ///
    /// # Example
    ///
    /// ```no_run
    /// use polite_scraper::output::{OutputFormat, OutputWriter, RecordSink, DEFAULT_MAX_FILE_SIZE};
    /// use std::path::Path;
    ///
    /// let mut writer = OutputWriter::create(Path::new("out.jsonl"), OutputFormat::JsonLines, DEFAULT_MAX_FILE_SIZE).unwrap();
    /// writer.write(&[]).unwrap();
    /// writer.close().unwrap();
    /// ```
    pub fn create(path: &Path, format: OutputFormat, max_file_size: u64) -> OutputResult<Self> {
        let writer = match format {
            OutputFormat::Csv => Self::Csv(CsvWriter::create(path, max_file_size)?),
            OutputFormat::JsonLines => Self::JsonLines(JsonlWriter::create(path, max_file_size)?),
        };
        tracing::debug!("Writing {} output to {}", format, path.display());
        Ok(writer)
    }

    pub fn format(&self) -> OutputFormat {
        match self {
            Self::Csv(_) => OutputFormat::Csv,
            Self::JsonLines(_) => OutputFormat::JsonLines,
        }
    }

    /// Path of the file currently being written
    pub fn current_path(&self) -> &Path {
        match self {
            Self::Csv(writer) => writer.current_path(),
            Self::JsonLines(writer) => writer.current_path(),
        }
    }

    /// Number of files created so far, including the first
    pub fn files_written(&self) -> usize {
        match self {
            Self::Csv(writer) => writer.files_written(),
            Self::JsonLines(writer) => writer.files_written(),
        }
    }
}

impl RecordSink for OutputWriter {
    fn write(&mut self, records: &[Record]) -> OutputResult<()> {
        match self {
            Self::Csv(writer) => writer.write(records),
            Self::JsonLines(writer) => writer.write(records),
        }
    }

    fn close(self) -> OutputResult<()> {
        match self {
            Self::Csv(writer) => writer.close(),
            Self::JsonLines(writer) => writer.close(),
        }
    }
}
