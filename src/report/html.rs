//! Self-contained HTML report generation.
//!
//! [`HtmlReporter`] is the assembly of the three core pieces: a
//! [`RunAggregator`] fed by the lifecycle callbacks, the pure renderer,
//! and a [`ReportWriter`] that persists the document at run end. The
//! report lands at `<output_dir>/report-<timestamp>.html`, stamped from
//! the run-start time so consecutive runs sort chronologically.
//!
//! A write failure is the reporter's failure, never the run's: the
//! trait callback logs it and the run's outcomes stand. Callers that
//! need the error (or the output path) call [`HtmlReporter::finalize`]
//! directly instead of going through the trait.

use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use tracing::error;

use super::Reporter;
use crate::aggregate::RunAggregator;
use crate::model::{TestCase, TestResult};
use crate::render;
use crate::writer::{DEFAULT_OUTPUT_DIR, ReportWriter, WriteError};

/// Reporter that aggregates the run and writes one HTML document at
/// run end.
///
/// # Example
///
/// ```no_run
/// use verdict::model::{TestCase, TestResult, TestStatus};
/// use verdict::report::{HtmlReporter, Reporter};
///
/// # async fn example() {
/// let reporter = HtmlReporter::new();
///
/// reporter.on_run_begin(1).await;
/// let test = TestCase::new("a", "loads the dashboard");
/// reporter.on_test_begin(&test).await;
/// reporter
///     .on_test_end(&test, &TestResult::new(TestStatus::Passed, 840))
///     .await;
/// reporter.on_run_end("passed").await;
/// # }
/// ```
pub struct HtmlReporter {
    state: Mutex<RunAggregator>,
    writer: ReportWriter,
}

impl HtmlReporter {
    /// Creates a reporter writing under the default `custom-report`
    /// directory.
    pub fn new() -> Self {
        Self::with_output_dir(DEFAULT_OUTPUT_DIR)
    }

    /// Creates a reporter writing under the given directory.
    pub fn with_output_dir(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            state: Mutex::new(RunAggregator::new()),
            writer: ReportWriter::new(output_dir),
        }
    }

    /// Finalizes the run, renders the document, and writes it.
    ///
    /// Returns the path of the written report. This is what
    /// [`on_run_end`](Reporter::on_run_end) calls internally; use it
    /// directly when the caller wants the path or the write error.
    pub fn finalize(&self, status: &str) -> Result<PathBuf, WriteError> {
        let mut state = self.state.lock().unwrap();
        let report = state.on_run_end(status);
        // Stamp from run start; a reporter attached mid-run that never
        // saw a begin event falls back to the end time.
        let stamp = state
            .started_at()
            .or(state.ended_at())
            .unwrap_or_else(Utc::now);
        drop(state);

        let html = render::render(&report);
        self.writer.write(&html, stamp)
    }
}

impl Default for HtmlReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Reporter for HtmlReporter {
    async fn on_run_begin(&self, expected_tests: usize) {
        self.state.lock().unwrap().on_run_begin(expected_tests);
    }

    async fn on_test_begin(&self, test: &TestCase) {
        self.state.lock().unwrap().on_test_begin(test);
    }

    async fn on_test_end(&self, test: &TestCase, result: &TestResult) {
        self.state.lock().unwrap().on_test_end(test, result);
    }

    async fn on_run_end(&self, status: &str) {
        if let Err(e) = self.finalize(status) {
            error!("Failed to write HTML report: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TestStatus;

    #[tokio::test]
    async fn test_writes_report_file_at_run_end() {
        let dir = tempfile::tempdir().unwrap();
        let reporter = HtmlReporter::with_output_dir(dir.path());

        reporter.on_run_begin(1).await;
        let test = TestCase::new("a", "loads the dashboard").with_file("tests/dash.spec.ts");
        reporter.on_test_begin(&test).await;
        reporter
            .on_test_end(&test, &TestResult::new(TestStatus::Passed, 840))
            .await;
        reporter.on_run_end("passed").await;

        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);

        let name = entries[0].as_ref().unwrap().file_name();
        let name = name.to_str().unwrap();
        assert!(name.starts_with("report-"));
        assert!(name.ends_with(".html"));

        let html = std::fs::read_to_string(entries[0].as_ref().unwrap().path()).unwrap();
        assert!(html.contains("loads the dashboard"));
        assert!(html.contains("840ms"));
    }

    #[tokio::test]
    async fn test_finalize_surfaces_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("taken");
        std::fs::write(&blocker, "in the way").unwrap();

        let reporter = HtmlReporter::with_output_dir(&blocker);
        reporter.on_run_begin(0).await;
        assert!(reporter.finalize("passed").is_err());
    }

    #[tokio::test]
    async fn test_trait_callback_swallows_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("taken");
        std::fs::write(&blocker, "in the way").unwrap();

        let reporter = HtmlReporter::with_output_dir(&blocker);
        reporter.on_run_begin(0).await;
        // Must not panic: the reporter degrades to "no report file".
        reporter.on_run_end("passed").await;
    }
}
