//! Reporters: consumers of the host runner's lifecycle events.
//!
//! The host runner drives a [`Reporter`] through four callbacks (run
//! begin, test begin, test end, run end) delivered in logical order per
//! test id but interleaved arbitrarily across concurrently running
//! tests. Reporters keep whatever state they need behind a mutex so a
//! host that delivers from multiple threads is also safe.
//!
//! | Reporter | Output |
//! |----------|--------|
//! | [`HtmlReporter`] | self-contained HTML report file |
//! | [`JUnitReporter`] | JUnit XML for CI systems |
//! | [`ConsoleReporter`] | live progress bar + run summary |
//! | [`MultiReporter`] | fans events out to any of the above |
//! | [`NullReporter`] | nothing (testing) |

pub mod html;
pub mod junit;

use async_trait::async_trait;

use crate::model::{TestCase, TestResult, TestStatus};

pub use html::HtmlReporter;
pub use junit::JUnitReporter;

/// A test reporter receives lifecycle events during a test run.
#[async_trait]
pub trait Reporter: Send + Sync {
    /// Called once when the run starts, with the host's announced test
    /// count. The count is informational; the actual number of test
    /// events may differ.
    async fn on_run_begin(&self, expected_tests: usize);

    /// Called when a test starts running.
    async fn on_test_begin(&self, test: &TestCase);

    /// Called when a test reaches a terminal status.
    async fn on_test_end(&self, test: &TestCase, result: &TestResult);

    /// Called once when the run ends, with the host's overall status
    /// string (e.g. `"passed"`, `"failed"`).
    async fn on_run_end(&self, status: &str);
}

/// A reporter that does nothing (for testing or when output is not needed).
pub struct NullReporter;

#[async_trait]
impl Reporter for NullReporter {
    async fn on_run_begin(&self, _expected_tests: usize) {}
    async fn on_test_begin(&self, _test: &TestCase) {}
    async fn on_test_end(&self, _test: &TestCase, _result: &TestResult) {}
    async fn on_run_end(&self, _status: &str) {}
}

/// A reporter that fans each event out to multiple reporters, in the
/// order they were added.
pub struct MultiReporter {
    reporters: Vec<Box<dyn Reporter>>,
}

impl MultiReporter {
    /// Create an empty multi-reporter.
    pub fn new() -> Self {
        Self {
            reporters: Vec::new(),
        }
    }

    /// Add a reporter.
    pub fn with_reporter<R: Reporter + 'static>(mut self, reporter: R) -> Self {
        self.reporters.push(Box::new(reporter));
        self
    }

    /// Number of attached reporters.
    pub fn len(&self) -> usize {
        self.reporters.len()
    }

    /// Whether no reporters are attached.
    pub fn is_empty(&self) -> bool {
        self.reporters.is_empty()
    }
}

impl Default for MultiReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Reporter for MultiReporter {
    async fn on_run_begin(&self, expected_tests: usize) {
        for reporter in &self.reporters {
            reporter.on_run_begin(expected_tests).await;
        }
    }

    async fn on_test_begin(&self, test: &TestCase) {
        for reporter in &self.reporters {
            reporter.on_test_begin(test).await;
        }
    }

    async fn on_test_end(&self, test: &TestCase, result: &TestResult) {
        for reporter in &self.reporters {
            reporter.on_test_end(test, result).await;
        }
    }

    async fn on_run_end(&self, status: &str) {
        for reporter in &self.reporters {
            reporter.on_run_end(status).await;
        }
    }
}

#[derive(Default)]
struct ConsoleCounts {
    passed: usize,
    failed: usize,
    timed_out: usize,
    skipped: usize,
    interrupted: usize,
    /// Title and first error line of each failure-class test, for the
    /// run-end digest.
    failures: Vec<(String, String)>,
}

/// Console reporter that shows progress in the terminal.
///
/// The host hands `on_run_end` only a status string, so this reporter
/// maintains its own per-status counters from the test-end events.
pub struct ConsoleReporter {
    progress: std::sync::Mutex<Option<indicatif::ProgressBar>>,
    counts: std::sync::Mutex<ConsoleCounts>,
    verbose: bool,
}

impl ConsoleReporter {
    /// Create a new console reporter. `verbose` prints a line for each
    /// starting test in addition to the completion lines.
    pub fn new(verbose: bool) -> Self {
        Self {
            progress: std::sync::Mutex::new(None),
            counts: std::sync::Mutex::new(ConsoleCounts::default()),
            verbose,
        }
    }
}

#[async_trait]
impl Reporter for ConsoleReporter {
    async fn on_run_begin(&self, expected_tests: usize) {
        println!("Running {} tests", expected_tests);

        let pb = indicatif::ProgressBar::new(expected_tests as u64);
        pb.set_style(
            indicatif::ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
                )
                .unwrap()
                .progress_chars("#>-"),
        );

        *self.progress.lock().unwrap() = Some(pb);
    }

    async fn on_test_begin(&self, test: &TestCase) {
        if self.verbose {
            println!("Running: {}", test.title);
        }
    }

    async fn on_test_end(&self, test: &TestCase, result: &TestResult) {
        {
            let mut counts = self.counts.lock().unwrap();
            match result.status {
                TestStatus::Passed => counts.passed += 1,
                TestStatus::Failed => counts.failed += 1,
                TestStatus::TimedOut => counts.timed_out += 1,
                TestStatus::Skipped => counts.skipped += 1,
                TestStatus::Interrupted => counts.interrupted += 1,
                TestStatus::Running => {}
            }
            if result.status.is_failure() {
                let first_line = result
                    .errors
                    .first()
                    .map(|e| e.describe().lines().next().unwrap_or("").to_string())
                    .unwrap_or_default();
                counts.failures.push((test.title.clone(), first_line));
            }
        }

        if let Some(pb) = self.progress.lock().unwrap().as_ref() {
            pb.inc(1);

            let status = match result.status {
                TestStatus::Passed => console::style("PASS").green(),
                TestStatus::Failed => console::style("FAIL").red(),
                TestStatus::TimedOut => console::style("TIME").yellow().bold(),
                TestStatus::Skipped => console::style("SKIP").yellow(),
                TestStatus::Interrupted => console::style("INT ").red().bold(),
                TestStatus::Running => console::style("    ").dim(),
            };

            if self.verbose || result.status != TestStatus::Passed {
                pb.println(format!("{} {}", status, test.title));
            }
        }
    }

    async fn on_run_end(&self, status: &str) {
        if let Some(pb) = self.progress.lock().unwrap().take() {
            pb.finish_and_clear();
        }

        let counts = self.counts.lock().unwrap();
        let total = counts.passed
            + counts.failed
            + counts.timed_out
            + counts.skipped
            + counts.interrupted;

        println!();
        println!("Test Results:");
        println!("  Total:     {}", total);
        println!("  Passed:    {}", console::style(counts.passed).green());
        println!("  Failed:    {}", console::style(counts.failed).red());
        println!("  Skipped:   {}", console::style(counts.skipped).yellow());

        if counts.timed_out > 0 {
            println!(
                "  Timed Out: {}",
                console::style(counts.timed_out).yellow().bold()
            );
        }
        if counts.interrupted > 0 {
            println!(
                "  Interrupted: {}",
                console::style(counts.interrupted).red().bold()
            );
        }

        println!();
        if counts.failures.is_empty() {
            println!(
                "{}",
                console::style(format!("Run {}.", status)).green().bold()
            );
        } else {
            println!("{}", console::style(format!("Run {}.", status)).red().bold());
            println!();
            println!("Failed tests:");
            for (title, first_line) in &counts.failures {
                println!("  - {}", title);
                if !first_line.is_empty() {
                    println!("    {}", console::style(first_line).dim());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_null_reporter_accepts_all_events() {
        let reporter = NullReporter;
        reporter.on_run_begin(3).await;
        let test = TestCase::new("a", "a");
        reporter.on_test_begin(&test).await;
        reporter
            .on_test_end(&test, &TestResult::new(TestStatus::Passed, 1))
            .await;
        reporter.on_run_end("passed").await;
    }

    #[tokio::test]
    async fn test_multi_reporter_composes() {
        let multi = MultiReporter::new()
            .with_reporter(NullReporter)
            .with_reporter(NullReporter);
        assert_eq!(multi.len(), 2);

        multi.on_run_begin(1).await;
        multi.on_run_end("passed").await;
    }
}
