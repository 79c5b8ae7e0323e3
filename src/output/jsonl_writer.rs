//! Line-delimited JSON record output

use crate::extract::Record;
use crate::output::rotation::Rotation;
use crate::output::traits::{OutputResult, RecordSink};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes one JSON object per line, rotating to numbered files by size
#[derive(Debug)]
pub struct JsonlWriter {
    rotation: Rotation,
    writer: BufWriter<File>,
}

impl JsonlWriter {
    pub fn create(path: &Path, max_file_size: u64) -> OutputResult<Self> {
        let (rotation, file) = Rotation::open(path, max_file_size)?;
        Ok(Self {
            rotation,
            writer: BufWriter::new(file),
        })
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

impl RecordSink for JsonlWriter {
    fn write(&mut self, records: &[Record]) -> OutputResult<()> {
        if records.is_empty() {
            return Ok(());
        }

        if self.rotation.needs_rotation()? {
            self.writer.flush()?;
            self.writer = BufWriter::new(self.rotation.advance()?);
        }

        for record in records {
            serde_json::to_writer(&mut self.writer, record)?;
            self.writer.write_all(b"\n")?;
        }
        self.writer.flush()?;

        tracing::debug!("Wrote {} records to JSONL file", records.len());
        Ok(())
    }

    fn close(mut self) -> OutputResult<()> {
        self.writer.flush()?;
        tracing::debug!("JSONL writer closed");
        Ok(())
    }
}
