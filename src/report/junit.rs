//! JUnit XML report generation.
//!
//! Generates JUnit XML format test reports, the de facto standard for
//! CI/CD systems. The output is compatible with Jenkins, GitLab CI,
//! GitHub Actions, CircleCI, and other CI platforms, and sits alongside
//! the HTML report as the machine-readable artifact of a run.
//!
//! # Format
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <testsuites tests="3" failures="1" errors="0" time="4.210">
//!   <testsuite name="ui-suite" tests="3" failures="1" errors="0" skipped="0" time="4.210">
//!     <testcase classname="tests/login.spec.ts" name="logs in" time="1.204"/>
//!     <testcase classname="tests/login.spec.ts" name="rejects bad password" time="0.550">
//!       <failure message="expected error banner" type="AssertionError">
//!         expected error banner
//!       </failure>
//!     </testcase>
//!     <testcase classname="tests/admin.spec.ts" name="admin console" time="0.000">
//!       <skipped/>
//!     </testcase>
//!   </testsuite>
//! </testsuites>
//! ```
//!
//! Status mapping: `failed` and `timedOut` become `<failure>` elements
//! (`timedOut` with type `TimeoutError`), `interrupted` becomes
//! `<error>`, `skipped` becomes `<skipped/>`. Tests that never received
//! an end event are absent; only finalized results are collected.

use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use tracing::{error, info};

use super::Reporter;
use crate::model::{TestCase, TestResult, TestStatus};

/// One finalized test, as collected from an end event.
struct JunitCase {
    title: String,
    file: String,
    status: TestStatus,
    duration_ms: u64,
    error_message: String,
}

/// Reporter that generates a JUnit XML test report.
///
/// Collects finalized results during the run and writes one XML file
/// when the run completes. Parent directories are created automatically;
/// a write failure is logged, never propagated into the host run.
///
/// # Example
///
/// ```
/// use verdict::report::JUnitReporter;
///
/// let reporter = JUnitReporter::new("custom-report/junit.xml".into())
///     .with_testsuite_name("checkout-ui");
/// ```
pub struct JUnitReporter {
    output_path: PathBuf,
    started_at: Mutex<Option<DateTime<Utc>>>,
    cases: Mutex<Vec<JunitCase>>,
    testsuite_name: String,
}

impl JUnitReporter {
    /// Creates a JUnit reporter that writes to the given path.
    pub fn new(output_path: PathBuf) -> Self {
        Self {
            output_path,
            started_at: Mutex::new(None),
            cases: Mutex::new(Vec::new()),
            testsuite_name: "verdict".to_string(),
        }
    }

    /// Sets the test suite name in the XML output. Defaults to
    /// `"verdict"`; set this to your project name for better
    /// identification in CI dashboards.
    pub fn with_testsuite_name(mut self, name: impl Into<String>) -> Self {
        self.testsuite_name = name.into();
        self
    }

    /// Generate JUnit XML content from the collected cases.
    fn generate_xml(&self) -> anyhow::Result<String> {
        let cases = self.cases.lock().unwrap();
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let tests = cases.len();
        let failures = cases.iter().filter(|c| c.status.is_failure()).count();
        let errors = cases
            .iter()
            .filter(|c| c.status == TestStatus::Interrupted)
            .count();
        let skipped = cases
            .iter()
            .filter(|c| c.status == TestStatus::Skipped)
            .count();
        let time = self
            .started_at
            .lock()
            .unwrap()
            .map(|started| (Utc::now() - started).num_milliseconds().max(0) as f64 / 1000.0)
            .unwrap_or(0.0);

        let mut testsuites = BytesStart::new("testsuites");
        testsuites.push_attribute(("tests", tests.to_string().as_str()));
        testsuites.push_attribute(("failures", failures.to_string().as_str()));
        testsuites.push_attribute(("errors", errors.to_string().as_str()));
        testsuites.push_attribute(("time", format!("{:.3}", time).as_str()));
        writer.write_event(Event::Start(testsuites))?;

        let mut testsuite = BytesStart::new("testsuite");
        testsuite.push_attribute(("name", self.testsuite_name.as_str()));
        testsuite.push_attribute(("tests", tests.to_string().as_str()));
        testsuite.push_attribute(("failures", failures.to_string().as_str()));
        testsuite.push_attribute(("errors", errors.to_string().as_str()));
        testsuite.push_attribute(("skipped", skipped.to_string().as_str()));
        testsuite.push_attribute(("time", format!("{:.3}", time).as_str()));
        writer.write_event(Event::Start(testsuite))?;

        for case in cases.iter() {
            write_testcase(&mut writer, case)?;
        }

        writer.write_event(Event::End(BytesEnd::new("testsuite")))?;
        writer.write_event(Event::End(BytesEnd::new("testsuites")))?;

        let xml = String::from_utf8(writer.into_inner())?;
        Ok(xml)
    }
}

#[async_trait]
impl Reporter for JUnitReporter {
    async fn on_run_begin(&self, _expected_tests: usize) {
        *self.started_at.lock().unwrap() = Some(Utc::now());
    }

    async fn on_test_begin(&self, _test: &TestCase) {}

    async fn on_test_end(&self, test: &TestCase, result: &TestResult) {
        let error_message = result
            .errors
            .iter()
            .map(|e| e.describe())
            .collect::<Vec<_>>()
            .join("\n");

        self.cases.lock().unwrap().push(JunitCase {
            title: test.title.clone(),
            file: test.file.clone(),
            status: result.status,
            duration_ms: result.duration_ms,
            error_message,
        });
    }

    async fn on_run_end(&self, _status: &str) {
        match self.generate_xml() {
            Ok(xml) => {
                if let Some(parent) = self.output_path.parent()
                    && !parent.exists()
                    && let Err(e) = std::fs::create_dir_all(parent)
                {
                    error!("Failed to create output directory: {}", e);
                    return;
                }

                if let Err(e) = std::fs::write(&self.output_path, xml) {
                    error!("Failed to write JUnit XML: {}", e);
                } else {
                    info!("JUnit XML written to: {}", self.output_path.display());
                }
            }
            Err(e) => {
                error!("Failed to generate JUnit XML: {}", e);
            }
        }
    }
}

/// Write a single testcase element.
fn write_testcase<W: std::io::Write>(
    writer: &mut Writer<W>,
    case: &JunitCase,
) -> anyhow::Result<()> {
    let mut testcase = BytesStart::new("testcase");
    testcase.push_attribute(("classname", case.file.as_str()));
    testcase.push_attribute(("name", case.title.as_str()));
    testcase.push_attribute((
        "time",
        format!("{:.3}", case.duration_ms as f64 / 1000.0).as_str(),
    ));

    match case.status {
        TestStatus::Passed | TestStatus::Running => {
            writer.write_event(Event::Empty(testcase))?;
        }
        TestStatus::Failed | TestStatus::TimedOut => {
            writer.write_event(Event::Start(testcase))?;

            let mut failure = BytesStart::new("failure");
            let message = sanitize_xml(&case.error_message);
            if !message.is_empty() {
                failure.push_attribute(("message", message.as_str()));
            }
            let failure_type = if case.status == TestStatus::TimedOut {
                "TimeoutError"
            } else {
                "AssertionError"
            };
            failure.push_attribute(("type", failure_type));
            writer.write_event(Event::Start(failure))?;
            writer.write_event(Event::Text(BytesText::new(&message)))?;
            writer.write_event(Event::End(BytesEnd::new("failure")))?;

            writer.write_event(Event::End(BytesEnd::new("testcase")))?;
        }
        TestStatus::Interrupted => {
            writer.write_event(Event::Start(testcase))?;

            let mut err = BytesStart::new("error");
            err.push_attribute(("type", "Interrupted"));
            writer.write_event(Event::Empty(err))?;

            writer.write_event(Event::End(BytesEnd::new("testcase")))?;
        }
        TestStatus::Skipped => {
            writer.write_event(Event::Start(testcase))?;
            writer.write_event(Event::Empty(BytesStart::new("skipped")))?;
            writer.write_event(Event::End(BytesEnd::new("testcase")))?;
        }
    }

    Ok(())
}

/// Strips characters that are invalid in XML 1.0 documents.
///
/// Markup escaping itself is left to quick-xml, which escapes text and
/// attribute values as it writes them.
fn sanitize_xml(s: &str) -> String {
    s.chars()
        .filter(|c| matches!(c, '\t' | '\n' | '\r' | ' '..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TestError;

    fn case(id: &str) -> TestCase {
        TestCase::new(id, format!("test {}", id)).with_file("tests/login.spec.ts")
    }

    async fn collect(results: Vec<(TestCase, TestResult)>) -> JUnitReporter {
        let reporter = JUnitReporter::new(PathBuf::from("unused.xml"));
        reporter.on_run_begin(results.len()).await;
        for (test, result) in &results {
            reporter.on_test_end(test, result).await;
        }
        reporter
    }

    #[tokio::test]
    async fn test_counts_failures_errors_skipped() {
        let reporter = collect(vec![
            (case("a"), TestResult::new(TestStatus::Passed, 100)),
            (case("b"), TestResult::new(TestStatus::Failed, 200)),
            (case("c"), TestResult::new(TestStatus::TimedOut, 300)),
            (case("d"), TestResult::new(TestStatus::Interrupted, 0)),
            (case("e"), TestResult::new(TestStatus::Skipped, 0)),
        ])
        .await;

        let xml = reporter.generate_xml().unwrap();
        assert!(xml.contains("tests=\"5\""));
        assert!(xml.contains("failures=\"2\""));
        assert!(xml.contains("errors=\"1\""));
        assert!(xml.contains("skipped=\"1\""));
        assert!(xml.contains("type=\"TimeoutError\""));
        assert!(xml.contains("<skipped/>"));
    }

    #[tokio::test]
    async fn test_markup_in_messages_is_escaped() {
        let reporter = collect(vec![(
            case("a"),
            TestResult::new(TestStatus::Failed, 10)
                .with_error(TestError::from_message("expected <div> & got \"span\"")),
        )])
        .await;

        let xml = reporter.generate_xml().unwrap();
        assert!(xml.contains("&lt;div&gt;"));
        assert!(xml.contains("&amp;"));
        assert!(!xml.contains("expected <div>"));
    }

    #[tokio::test]
    async fn test_passed_case_is_self_closing() {
        let reporter = collect(vec![(case("a"), TestResult::new(TestStatus::Passed, 1204))]).await;

        let xml = reporter.generate_xml().unwrap();
        assert!(xml.contains("time=\"1.204\"/>"));
        assert!(xml.contains("classname=\"tests/login.spec.ts\""));
        assert!(xml.contains("name=\"test a\""));
    }

    #[tokio::test]
    async fn test_writes_file_with_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("junit.xml");

        let reporter = JUnitReporter::new(path.clone()).with_testsuite_name("ui-suite");
        reporter.on_run_begin(1).await;
        reporter
            .on_test_end(&case("a"), &TestResult::new(TestStatus::Passed, 5))
            .await;
        reporter.on_run_end("passed").await;

        let xml = std::fs::read_to_string(&path).unwrap();
        assert!(xml.contains("name=\"ui-suite\""));
    }

    #[test]
    fn test_sanitize_xml_strips_control_chars() {
        assert_eq!(sanitize_xml("ok\u{0}text\u{8}"), "oktext");
        assert_eq!(sanitize_xml("line\nbreak"), "line\nbreak");
    }
}
