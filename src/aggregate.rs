//! Run-state aggregation.
//!
//! [`RunAggregator`] is the state machine at the center of the crate: it
//! ingests the host runner's lifecycle events, maintains one
//! [`TestRunEntry`] per test id, and produces the final [`RunReport`]
//! when the run ends.
//!
//! The aggregator owns its map exclusively and performs no I/O of its
//! own apart from the synchronous screenshot read during end-event
//! ingestion. Rendering and persistence are the caller's concern; see
//! [`HtmlReporter`](crate::report::HtmlReporter).
//!
//! # Lifecycle
//!
//! ```
//! use verdict::aggregate::RunAggregator;
//! use verdict::model::{TestCase, TestResult, TestStatus};
//!
//! let mut run = RunAggregator::new();
//! run.on_run_begin(1);
//!
//! let test = TestCase::new("a", "adds numbers");
//! run.on_test_begin(&test);
//! run.on_test_end(&test, &TestResult::new(TestStatus::Passed, 12));
//!
//! let report = run.on_run_end("passed");
//! assert_eq!(report.summary.passed, 1);
//! ```
//!
//! One aggregator describes one run. It is created fresh per run and
//! discarded after the report is written; repeated runs in one process
//! construct repeated aggregators.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use crate::artifact;
use crate::model::{RunReport, RunSummary, TestCase, TestResult, TestRunEntry, TestStatus};

/// Accumulates per-test entries from lifecycle events and derives the
/// run summary at run end.
///
/// Events may interleave arbitrarily across test ids (the host runs
/// tests concurrently); within one id the host delivers begin before
/// end, and the aggregator recovers defensively if it does not.
#[derive(Debug, Default)]
pub struct RunAggregator {
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
    expected_tests: usize,
    entries: HashMap<String, TestRunEntry>,
    /// Test ids in first-observation order. Display order for the report.
    order: Vec<String>,
}

impl RunAggregator {
    /// Creates an empty aggregator for a new run.
    pub fn new() -> Self {
        Self::default()
    }

    /// When the run-begin event was observed.
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// When the run-end event was observed.
    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    /// Test count announced at run begin. Informational only: the
    /// actual entry count may differ and is never validated against it.
    pub fn expected_tests(&self) -> usize {
        self.expected_tests
    }

    /// Number of entries observed so far.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Records the run start time and the announced test count.
    pub fn on_run_begin(&mut self, expected_tests: usize) {
        self.started_at = Some(Utc::now());
        self.expected_tests = expected_tests;
        info!("Run started with {} expected tests", expected_tests);
    }

    /// Creates the `Running` entry for a test.
    ///
    /// A second begin for the same id overwrites the entry (last write
    /// wins; the host is trusted to deliver one begin per test) but
    /// keeps the id's original display position.
    pub fn on_test_begin(&mut self, test: &TestCase) {
        info!("Running: {}", test.title);
        if !self.entries.contains_key(&test.id) {
            self.order.push(test.id.clone());
        }
        self.entries.insert(
            test.id.clone(),
            TestRunEntry::running(&test.title, &test.file, Utc::now()),
        );
    }

    /// Finalizes a test's entry from its terminal result.
    ///
    /// Joins all captured error descriptions with newlines, captures the
    /// failure screenshot when the status calls for one, and replaces
    /// the running placeholder. Never fails: artifact problems degrade
    /// to an empty screenshot field.
    pub fn on_test_end(&mut self, test: &TestCase, result: &TestResult) {
        let ended_at = Utc::now();
        let started_at = match self.entries.get(&test.id) {
            Some(existing) => existing.started_at,
            None => {
                // Host contract violation, recovered with a best-effort
                // start time. WARN so runner misbehavior stays visible.
                warn!(
                    "End event for '{}' arrived without a matching begin; synthesizing start time",
                    test.id
                );
                Some(ended_at)
            }
        };

        let error_message = result
            .errors
            .iter()
            .map(|e| e.describe())
            .collect::<Vec<_>>()
            .join("\n");

        let screenshot = if result.status.is_failure() {
            capture_screenshot(test, result)
        } else {
            String::new()
        };

        if !self.entries.contains_key(&test.id) {
            self.order.push(test.id.clone());
        }
        self.entries.insert(
            test.id.clone(),
            TestRunEntry {
                title: test.title.clone(),
                file: test.file.clone(),
                status: result.status,
                started_at,
                ended_at: Some(ended_at),
                duration_ms: result.duration_ms,
                error_message: error_message.clone(),
                screenshot,
            },
        );

        info!(
            "Finished: {} [{}] ({}ms)",
            test.title, result.status, result.duration_ms
        );
        if result.status.is_failure() {
            let first_line = error_message.lines().next().unwrap_or("");
            error!("FAILED: {}: {}", test.title, first_line);
        }
    }

    /// Records the run end time and derives the final [`RunReport`].
    ///
    /// Entries still `Running` received a begin but never an end; they
    /// count toward `total` and toward no terminal bucket.
    pub fn on_run_end(&mut self, run_status: &str) -> RunReport {
        let ended_at = Utc::now();
        self.ended_at = Some(ended_at);

        let mut summary = RunSummary::empty(run_status);
        summary.started_at = self.started_at;
        summary.ended_at = Some(ended_at);
        summary.duration_ms = self
            .started_at
            .map(|started| (ended_at - started).num_milliseconds().max(0) as u64)
            .unwrap_or(0);
        summary.total = self.entries.len();

        for entry in self.entries.values() {
            match entry.status {
                TestStatus::Passed => summary.passed += 1,
                TestStatus::Failed => summary.failed += 1,
                TestStatus::Skipped => summary.skipped += 1,
                TestStatus::TimedOut => summary.timed_out += 1,
                TestStatus::Interrupted => summary.interrupted += 1,
                TestStatus::Running => summary.running += 1,
            }
        }

        let entries: Vec<TestRunEntry> = self
            .order
            .iter()
            .filter_map(|id| self.entries.get(id).cloned())
            .collect();

        info!(
            "Run finished: {} | Total: {} | Passed: {} | Failed: {} | Skipped: {}",
            run_status, summary.total, summary.passed, summary.failed, summary.skipped
        );

        RunReport { summary, entries }
    }
}

/// Transcodes the first screenshot-convention attachment, degrading to
/// an empty string when none is present or the read fails.
fn capture_screenshot(test: &TestCase, result: &TestResult) -> String {
    let Some(attachment) = result.attachments.iter().find(|a| a.is_screenshot()) else {
        return String::new();
    };

    match artifact::to_data_uri(attachment) {
        Ok(uri) => {
            info!("Screenshot captured for failed test: {}", test.title);
            uri
        }
        Err(e) => {
            error!("Failed to read screenshot for {}: {}", test.title, e);
            String::new()
        }
    }
}
