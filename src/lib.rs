//! verdict: event-driven test run aggregation and reporting.
//!
//! This crate is the reporting core of an end-to-end UI test suite: it
//! consumes run/test lifecycle events from a host test runner it does
//! not control and turns them into a self-contained HTML report, with
//! optional JUnit XML and live console output alongside.
//!
//! # Architecture
//!
//! The main components are:
//!
//! - **Model** ([`model`]): lifecycle event payloads and the derived
//!   per-test records and run summary
//! - **Aggregate** ([`aggregate`]): the state machine ingesting events,
//!   keyed by run-scoped test id
//! - **Artifact** ([`artifact`]): failure screenshots → inline `data:`
//!   URIs
//! - **Render** ([`render`]): pure `RunReport` → HTML transform
//! - **Writer** ([`writer`]): timestamped report persistence
//! - **Report** ([`report`]): the [`Reporter`] trait the host drives,
//!   and its implementations (HTML, JUnit, console, fan-out)
//!
//! # Example
//!
//! ```no_run
//! use verdict::model::{TestCase, TestResult, TestStatus};
//! use verdict::report::{HtmlReporter, Reporter};
//!
//! #[tokio::main]
//! async fn main() {
//!     let reporter = HtmlReporter::new();
//!
//!     reporter.on_run_begin(1).await;
//!     let test = TestCase::new("login.spec.ts::signs in", "signs in")
//!         .with_file("tests/login.spec.ts");
//!     reporter.on_test_begin(&test).await;
//!     reporter
//!         .on_test_end(&test, &TestResult::new(TestStatus::Passed, 950))
//!         .await;
//!     reporter.on_run_end("passed").await;
//! }
//! ```

pub mod aggregate;
pub mod artifact;
pub mod config;
pub mod model;
pub mod render;
pub mod report;
pub mod writer;

// Re-export commonly used types
pub use aggregate::RunAggregator;
pub use config::{Config, ReportConfig, build_reporter, load_config};
pub use model::{
    Attachment, RunReport, RunSummary, TestCase, TestError, TestResult, TestRunEntry, TestStatus,
};
pub use report::{
    ConsoleReporter, HtmlReporter, JUnitReporter, MultiReporter, NullReporter, Reporter,
};
pub use writer::ReportWriter;
