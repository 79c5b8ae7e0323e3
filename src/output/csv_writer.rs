//! Tabular (CSV) record output

use crate::extract::Record;
use crate::output::rotation::Rotation;
use crate::output::traits::{OutputResult, RecordSink};
use std::fs::File;
use std::path::Path;

/// Column header written at the top of every CSV file
pub const CSV_HEADER: [&str; 5] = ["title", "description", "url", "price", "image_url"];

/// Writes records as CSV rows, rotating to numbered files by size
#[derive(Debug)]
pub struct CsvWriter {
    rotation: Rotation,
    writer: csv::Writer<File>,
}

fn start_file(file: File) -> OutputResult<csv::Writer<File>> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
    writer.write_record(CSV_HEADER)?;
    writer.flush()?;
    Ok(writer)
}

impl CsvWriter {
    pub fn create(path: &Path, max_file_size: u64) -> OutputResult<Self> {
        let (rotation, file) = Rotation::open(path, max_file_size)?;
        let writer = start_file(file)?;
        Ok(Self { rotation, writer })
    }

    /// Path of the file currently being written
    pub fn current_path(&self) -> &Path {
        self.rotation.current()
    }

    /// Number of files created so far, including the first
    pub fn files_written(&self) -> usize {
        self.rotation.files_written()
    }
}

impl RecordSink for CsvWriter {
    fn write(&mut self, records: &[Record]) -> OutputResult<()> {
        if records.is_empty() {
            return Ok(());
        }

        if self.rotation.needs_rotation()? {
            self.writer.flush()?;
            let file = self.rotation.advance()?;
            self.writer = start_file(file)?;
        }

        for record in records {
            self.writer.serialize(record)?;
        }
        self.writer.flush()?;

        tracing::debug!("Wrote {} records to CSV file", records.len());
        Ok(())
    }

    fn close(mut self) -> OutputResult<()> {
        self.writer.flush()?;
        tracing::debug!("CSV writer closed");
        Ok(())
    }
}
