//! Event payloads and run data model.
//!
//! This module defines the shapes the host test runner delivers to a
//! [`Reporter`](crate::report::Reporter) (test identity, terminal results,
//! captured errors, attachments) and the records the aggregation layer
//! derives from them.
//!
//! # Event flow
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       Host test runner                       │
//! ├──────────────────────────────────────────────────────────────┤
//! │                                                              │
//! │  on_run_begin(expected)                                      │
//! │  on_test_begin(TestCase) ─────────┐  (interleaved across     │
//! │  on_test_end(TestCase, TestResult)┘   concurrent tests)      │
//! │  on_run_end(status)                                          │
//! │                                                              │
//! └──────────────────────────────────────────────────────────────┘
//!          │ aggregation
//!          ▼
//!   TestRunEntry (one per test id)  +  RunSummary  =  RunReport
//! ```
//!
//! # Serialization
//!
//! All types implement `Serialize`/`Deserialize` so events and finished
//! reports can be cached, logged, or transmitted between processes.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Attachment name the host runner uses for failure screenshots.
pub const SCREENSHOT_ATTACHMENT: &str = "screenshot";

/// Sentinel used when a captured error carries neither message nor stack.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Identity of a single test case, as supplied by the host runner.
///
/// Tests are identified by their `id`, which the host guarantees to be
/// unique within one run. Titles are display-only and may repeat; all
/// correlation between begin and end events happens by id.
///
/// # Example
///
/// ```
/// use verdict::model::TestCase;
///
/// let test = TestCase::new("suite.ts::checkout renders", "checkout renders")
///     .with_file("tests/checkout.spec.ts");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    /// Run-scoped unique identifier for this test.
    pub id: String,

    /// Human-readable test name. Not guaranteed unique across a run.
    pub title: String,

    /// Source location of the test definition. Display-only; reports
    /// show only the base file name.
    #[serde(default)]
    pub file: String,
}

impl TestCase {
    /// Creates a test case with the given id and title.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            file: String::new(),
        }
    }

    /// Sets the source file path.
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = file.into();
        self
    }
}

/// Status of a test as observed by the reporting layer.
///
/// `Running` is transient, visible only between a test's begin and end
/// events. Every other status is terminal: once an entry reaches one, it
/// no longer mutates.
///
/// | Status | Terminal | Failure artifacts captured |
/// |--------|----------|----------------------------|
/// | `Running` | no | — |
/// | `Passed` | yes | no |
/// | `Failed` | yes | yes |
/// | `TimedOut` | yes | yes |
/// | `Skipped` | yes | no |
/// | `Interrupted` | yes | no |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TestStatus {
    /// Begin event observed, end event not yet observed.
    Running,

    /// Test completed successfully.
    Passed,

    /// Test completed with a failed assertion or error.
    Failed,

    /// Test exceeded its time budget.
    TimedOut,

    /// Test was not executed.
    Skipped,

    /// The run was interrupted before the test could finish.
    Interrupted,
}

impl TestStatus {
    /// Returns `true` for any status other than `Running`.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TestStatus::Running)
    }

    /// Returns `true` for the failure-class statuses (`Failed`,
    /// `TimedOut`) that trigger error and screenshot capture.
    pub fn is_failure(&self) -> bool {
        matches!(self, TestStatus::Failed | TestStatus::TimedOut)
    }

    /// Stable lowercase-camel name, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            TestStatus::Running => "running",
            TestStatus::Passed => "passed",
            TestStatus::Failed => "failed",
            TestStatus::TimedOut => "timedOut",
            TestStatus::Skipped => "skipped",
            TestStatus::Interrupted => "interrupted",
        }
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One error captured for a failed test.
///
/// Hosts report errors with varying completeness: assertion failures
/// usually carry a message, crashes may only have a stack trace, and
/// some carry neither. [`describe`](Self::describe) collapses the three
/// cases into one displayable string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestError {
    /// Human-readable error message, if the host captured one.
    pub message: Option<String>,

    /// Stack trace text, if the host captured one.
    pub stack: Option<String>,
}

impl TestError {
    /// Creates an error carrying only a message.
    pub fn from_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            stack: None,
        }
    }

    /// Creates an error carrying only a stack trace.
    pub fn from_stack(stack: impl Into<String>) -> Self {
        Self {
            message: None,
            stack: Some(stack.into()),
        }
    }

    /// Best displayable description: message, else stack, else the
    /// [`UNKNOWN_ERROR`] sentinel.
    pub fn describe(&self) -> &str {
        self.message
            .as_deref()
            .or(self.stack.as_deref())
            .unwrap_or(UNKNOWN_ERROR)
    }
}

/// A named, typed binary artifact attached to a test result.
///
/// Attachments carry their content either inline (`body`) or as a path
/// to a file written by the host runner. The transcoder prefers inline
/// bytes and falls back to reading the path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    /// Attachment name declared by the host (e.g. `"screenshot"`).
    pub name: String,

    /// MIME content type (e.g. `"image/png"`).
    pub content_type: String,

    /// Inline content bytes, when the host kept the artifact in memory.
    #[serde(default)]
    pub body: Option<Vec<u8>>,

    /// Filesystem path, when the host wrote the artifact to disk.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Attachment {
    /// Creates an attachment with inline content.
    pub fn inline(
        name: impl Into<String>,
        content_type: impl Into<String>,
        body: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            body: Some(body.into()),
            path: None,
        }
    }

    /// Creates an attachment referencing a file on disk.
    pub fn from_path(
        name: impl Into<String>,
        content_type: impl Into<String>,
        path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            body: None,
            path: Some(path.into()),
        }
    }

    /// Returns `true` if this attachment follows the failure-screenshot
    /// convention: named [`SCREENSHOT_ATTACHMENT`] with an `image/*`
    /// content type.
    pub fn is_screenshot(&self) -> bool {
        self.name == SCREENSHOT_ATTACHMENT && self.content_type.starts_with("image/")
    }
}

/// Terminal payload the host delivers when a test finishes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    /// Terminal status reported by the host.
    pub status: TestStatus,

    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,

    /// Errors captured during execution. Empty for passing tests.
    #[serde(default)]
    pub errors: Vec<TestError>,

    /// Artifacts the host associated with this result.
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl TestResult {
    /// Creates a result with the given status and duration and no
    /// errors or attachments.
    pub fn new(status: TestStatus, duration_ms: u64) -> Self {
        Self {
            status,
            duration_ms,
            errors: Vec::new(),
            attachments: Vec::new(),
        }
    }

    /// Adds a captured error.
    pub fn with_error(mut self, error: TestError) -> Self {
        self.errors.push(error);
        self
    }

    /// Adds an attachment.
    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }
}

/// The aggregator's per-test record.
///
/// One entry exists per observed test id. It is created at the test's
/// begin event with status [`TestStatus::Running`] and fully finalized
/// at its end event; no further mutation occurs after finalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestRunEntry {
    /// Test title, as last reported by the host.
    pub title: String,

    /// Source file of the test definition.
    pub file: String,

    /// Current status. Entries still `Running` at run end never
    /// received an end event.
    pub status: TestStatus,

    /// When the begin event was observed (or synthesized, for an end
    /// event with no matching begin).
    pub started_at: Option<DateTime<Utc>>,

    /// When the end event was observed. Unset while running.
    pub ended_at: Option<DateTime<Utc>>,

    /// Host-reported duration in milliseconds. Zero while running.
    pub duration_ms: u64,

    /// Newline-joined error descriptions. Empty unless the status is a
    /// failure-class status.
    pub error_message: String,

    /// `data:` URI embedding the failure screenshot, or empty when no
    /// screenshot was attached or it could not be read.
    pub screenshot: String,
}

impl TestRunEntry {
    /// Creates the transient entry recorded at a test's begin event.
    pub fn running(title: impl Into<String>, file: impl Into<String>, started_at: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            file: file.into(),
            status: TestStatus::Running,
            started_at: Some(started_at),
            ended_at: None,
            duration_ms: 0,
            error_message: String::new(),
            screenshot: String::new(),
        }
    }
}

/// Aggregate statistics for a completed run.
///
/// Derived by the aggregator at run end, never stored incrementally.
/// Entries still `Running` at run end (begin observed, end never
/// delivered) count toward `total` but toward none of the terminal
/// buckets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Overall run status as reported by the host (e.g. `"passed"`,
    /// `"failed"`). Kept verbatim; the host's vocabulary is not
    /// constrained here.
    pub run_status: String,

    /// Wall-clock time of the run-begin event.
    pub started_at: Option<DateTime<Utc>>,

    /// Wall-clock time of the run-end event.
    pub ended_at: Option<DateTime<Utc>>,

    /// Run duration in milliseconds.
    pub duration_ms: u64,

    /// Number of observed test entries, including still-running ones.
    pub total: usize,

    /// Tests that ended `Passed`.
    pub passed: usize,

    /// Tests that ended `Failed`.
    pub failed: usize,

    /// Tests that ended `Skipped`.
    pub skipped: usize,

    /// Tests that ended `TimedOut`.
    pub timed_out: usize,

    /// Tests that ended `Interrupted`.
    pub interrupted: usize,

    /// Tests whose end event never arrived.
    pub running: usize,
}

impl RunSummary {
    /// Pass rate as a percentage in `[0, 100]`.
    ///
    /// Returns `0.0` for an empty run, never a division fault.
    ///
    /// # Example
    ///
    /// ```
    /// use verdict::model::RunSummary;
    ///
    /// let mut summary = RunSummary::empty("passed");
    /// assert_eq!(summary.pass_rate(), 0.0);
    ///
    /// summary.total = 4;
    /// summary.passed = 3;
    /// assert_eq!(summary.pass_rate(), 75.0);
    /// ```
    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.passed as f64 / self.total as f64 * 100.0
        }
    }

    /// Progress-bar segment widths `(passed, failed, other)` as
    /// percentages of total, where `other` combines skipped, timed out,
    /// and interrupted tests.
    ///
    /// The three widths sum to 100 when every entry is terminal, and to
    /// 0 for an empty run.
    pub fn segment_widths(&self) -> (f64, f64, f64) {
        if self.total == 0 {
            return (0.0, 0.0, 0.0);
        }
        let total = self.total as f64;
        let passed = self.passed as f64 / total * 100.0;
        let failed = self.failed as f64 / total * 100.0;
        let other = (self.skipped + self.timed_out + self.interrupted) as f64 / total * 100.0;
        (passed, failed, other)
    }

    /// An all-zero summary carrying only the host's run status.
    pub fn empty(run_status: impl Into<String>) -> Self {
        Self {
            run_status: run_status.into(),
            started_at: None,
            ended_at: None,
            duration_ms: 0,
            total: 0,
            passed: 0,
            failed: 0,
            skipped: 0,
            timed_out: 0,
            interrupted: 0,
            running: 0,
        }
    }
}

/// Snapshot handed from the aggregator to the renderer: summary plus
/// the entries in insertion (first-begin) order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Aggregate statistics for the run.
    pub summary: RunSummary,

    /// All observed entries, in display order.
    pub entries: Vec<TestRunEntry>,
}
