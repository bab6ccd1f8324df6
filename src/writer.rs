//! Report persistence.
//!
//! Writes a rendered document to a timestamped path under the report
//! directory, creating parent directories as needed. Runs once, at run
//! end, after every test has already concluded. A failure here is fatal
//! for the reporting step only and must never disturb the host run.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::info;

/// Default directory for report artifacts, relative to the working
/// directory of the host process.
pub const DEFAULT_OUTPUT_DIR: &str = "custom-report";

/// Errors raised while persisting a report.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    /// The report directory could not be created.
    #[error("failed to create report directory {path}")]
    CreateDir {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The report file could not be written.
    #[error("failed to write report file {path}")]
    Write {
        /// File that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Persists rendered reports under a fixed output directory.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    /// Creates a writer targeting the given directory.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// The directory reports are written into.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Computes the output path for a run stamped at the given time:
    /// `<output_dir>/report-<YYYY-MM-DD_HH-MM-SS>.html`.
    ///
    /// The stamp is UTC, second granularity, and filesystem-safe (no
    /// colons or periods). Two runs landing on the same second overwrite
    /// each other; that collision is accepted.
    pub fn output_path(&self, stamp: DateTime<Utc>) -> PathBuf {
        self.output_dir
            .join(format!("report-{}.html", stamp.format("%Y-%m-%d_%H-%M-%S")))
    }

    /// Writes the document, creating missing parent directories and
    /// overwriting any existing file at the computed path.
    pub fn write(&self, content: &str, stamp: DateTime<Utc>) -> Result<PathBuf, WriteError> {
        std::fs::create_dir_all(&self.output_dir).map_err(|source| WriteError::CreateDir {
            path: self.output_dir.clone(),
            source,
        })?;

        let path = self.output_path(stamp);
        std::fs::write(&path, content).map_err(|source| WriteError::Write {
            path: path.clone(),
            source,
        })?;

        info!("Report written to {}", path.display());
        Ok(path)
    }
}

impl Default for ReportWriter {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_output_path_stamp_is_filesystem_safe() {
        let writer = ReportWriter::new("custom-report");
        let stamp = Utc.with_ymd_and_hms(2024, 5, 3, 14, 30, 5).unwrap();
        let path = writer.output_path(stamp);

        assert_eq!(
            path,
            PathBuf::from("custom-report/report-2024-05-03_14-30-05.html")
        );
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(!name.trim_end_matches(".html").contains('.'));
        assert!(!name.contains(':'));
    }

    #[test]
    fn test_write_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ReportWriter::new(dir.path().join("nested").join("reports"));
        let stamp = Utc.with_ymd_and_hms(2024, 5, 3, 14, 30, 5).unwrap();

        let path = writer.write("<html></html>", stamp).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<html></html>");
    }

    #[test]
    fn test_write_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ReportWriter::new(dir.path());
        let stamp = Utc.with_ymd_and_hms(2024, 5, 3, 14, 30, 5).unwrap();

        writer.write("first", stamp).unwrap();
        let path = writer.write("second", stamp).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
    }

    #[test]
    fn test_unwritable_directory_is_typed_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("taken");
        std::fs::write(&blocker, "file, not a directory").unwrap();

        let writer = ReportWriter::new(&blocker);
        let stamp = Utc.with_ymd_and_hms(2024, 5, 3, 14, 30, 5).unwrap();
        assert!(matches!(
            writer.write("content", stamp),
            Err(WriteError::CreateDir { .. })
        ));
    }
}
