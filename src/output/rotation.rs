//! Size-triggered file rotation shared by the record writers

use crate::output::traits::OutputResult;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// Default size after which a new file is started (10 MiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Returns the path of the `n`th rotated file
///
/// # Example
///
/// ```
/// use polite_scraper::output::rotated_path;
/// use std::path::{Path, PathBuf};
///
/// assert_eq!(rotated_path(Path::new("out/data.csv"), 2), PathBuf::from("out/data_2.csv"));
/// assert_eq!(rotated_path(Path::new("data"), 1), PathBuf::from("data_1"));
/// ```
pub fn rotated_path(base: &Path, n: usize) -> PathBuf {
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let file_name = match base.extension() {
        Some(ext) => format!("{}_{}.{}", stem, n, ext.to_string_lossy()),
        None => format!("{}_{}", stem, n),
    };

    base.with_file_name(file_name)
}

/// Tracks the current output file and when to move on to the next one
#[derive(Debug)]
pub(crate) struct Rotation {
    base: PathBuf,
    current: PathBuf,
    max_file_size: u64,
    files_written: usize,
}

impl Rotation {
    /// Creates the first output file, and its parent directories if needed
    pub(crate) fn open(base: &Path, max_file_size: u64) -> OutputResult<(Self, File)> {
        if let Some(parent) = base.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let file = File::create(base)?;
        tracing::debug!("Created output file: {}", base.display());

        let rotation = Self {
            base: base.to_path_buf(),
            current: base.to_path_buf(),
            max_file_size,
            files_written: 1,
        };
        Ok((rotation, file))
    }

    /// Returns true once the current file has grown past the size limit
    pub(crate) fn needs_rotation(&self) -> OutputResult<bool> {
        let size = fs::metadata(&self.current)?.len();
        Ok(size > self.max_file_size)
    }

    /// Creates the next numbered file and makes it current
    pub(crate) fn advance(&mut self) -> OutputResult<File> {
        let next = rotated_path(&self.base, self.files_written);
        let file = File::create(&next)?;
        tracing::info!("Rotated output file to: {}", next.display());

        self.current = next;
        self.files_written += 1;
        Ok(file)
    }

    pub(crate) fn current(&self) -> &Path {
        &self.current
    }

    pub(crate) fn files_written(&self) -> usize {
        self.files_written
    }
}
