//! HTML report rendering.
//!
//! Pure transform from a [`RunReport`] to a single self-contained HTML
//! document: inline styles, inline base64 screenshots, no external
//! resource fetches, viewable offline straight from disk.
//!
//! Rendering is deterministic for a given report, modulo the footer's
//! "generated at" stamp which reads the wall clock at call time. Every
//! user-controlled string (test titles, file names, error text, the
//! host's run status) passes through [`escape_html`] before it is
//! interpolated; the escape function is the unit under test, not inline
//! string surgery scattered through the template.

use std::path::Path;

use chrono::{DateTime, Local, Utc};

use crate::model::{RunReport, TestRunEntry};

/// Placeholder rendered for timestamps that were never observed.
const PLACEHOLDER: &str = "&mdash;";

/// Renders the full report document.
pub fn render(report: &RunReport) -> String {
    render_at(report, Utc::now())
}

fn render_at(report: &RunReport, generated_at: DateTime<Utc>) -> String {
    let summary = &report.summary;
    let (width_passed, width_failed, width_other) = summary.segment_widths();

    let mut rows = String::with_capacity(report.entries.len() * 512 + 64);
    for (index, entry) in report.entries.iter().enumerate() {
        render_entry(&mut rows, index + 1, entry);
    }

    let run_status = escape_html(&summary.run_status);
    let platform = format!("{} / {}", std::env::consts::OS, std::env::consts::ARCH);

    let mut html = String::with_capacity(STYLE.len() + rows.len() + 8_192);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"UTF-8\" />\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\" />\n");
    html.push_str(&format!(
        "<title>Test Run Report — {}</title>\n",
        format_timestamp(summary.started_at)
    ));
    html.push_str("<style>");
    html.push_str(STYLE);
    html.push_str("</style>\n</head>\n<body>\n");

    html.push_str(&format!(
        r#"<div class="header">
  <h1>Test Run Report</h1>
  <span class="run-status {run_status}">{run_status}</span>
</div>
"#
    ));

    html.push_str(&format!(
        r#"<div class="env-bar">
  <span><strong>Started:</strong> {started}</span>
  <span><strong>Ended:</strong> {ended}</span>
  <span><strong>Duration:</strong> {duration}</span>
  <span><strong>Platform:</strong> {platform}</span>
</div>
"#,
        started = format_timestamp(summary.started_at),
        ended = format_timestamp(summary.ended_at),
        duration = format_duration(summary.duration_ms),
        platform = platform,
    ));

    html.push_str(&format!(
        r#"<div class="progress-container">
  <div class="progress-label">
    <span>Pass Rate</span>
    <span>{rate}%</span>
  </div>
  <div class="progress-bar">
    <div class="segment-passed" style="width: {width_passed}%"></div>
    <div class="segment-failed" style="width: {width_failed}%"></div>
    <div class="segment-other" style="width: {width_other}%"></div>
  </div>
</div>
"#,
        rate = format!("{:.1}", summary.pass_rate()),
    ));

    html.push_str(&format!(
        r#"<div class="summary">
  <div class="card total"><div class="card-value">{total}</div><div class="card-label">Total</div></div>
  <div class="card passed"><div class="card-value">{passed}</div><div class="card-label">Passed</div></div>
  <div class="card failed"><div class="card-value">{failed}</div><div class="card-label">Failed</div></div>
  <div class="card skipped"><div class="card-value">{skipped}</div><div class="card-label">Skipped</div></div>
  <div class="card timed-out"><div class="card-value">{timed_out}</div><div class="card-label">Timed Out</div></div>
  <div class="card duration"><div class="card-value">{duration}</div><div class="card-label">Duration</div></div>
</div>
"#,
        total = summary.total,
        passed = summary.passed,
        failed = summary.failed,
        skipped = summary.skipped,
        timed_out = summary.timed_out,
        duration = format_duration(summary.duration_ms),
    ));

    html.push_str(
        r#"<div class="table-wrapper">
<table>
  <thead>
    <tr>
      <th>#</th>
      <th>Test Name</th>
      <th>File</th>
      <th>Status</th>
      <th>Started At</th>
      <th>Ended At</th>
      <th>Duration</th>
    </tr>
  </thead>
  <tbody>
"#,
    );
    html.push_str(&rows);
    html.push_str("  </tbody>\n</table>\n</div>\n");

    html.push_str(&format!(
        "<div class=\"footer\">Report generated on {}</div>\n</body>\n</html>\n",
        format_timestamp(Some(generated_at))
    ));

    html
}

/// Appends the table row for one entry, plus its collapsible error and
/// screenshot rows when present.
fn render_entry(out: &mut String, index: usize, entry: &TestRunEntry) {
    let status = entry.status.as_str();
    out.push_str(&format!(
        r#"    <tr class="test-row {status}">
      <td class="row-num">{index}</td>
      <td class="test-name">{title}</td>
      <td class="test-file">{file}</td>
      <td class="status-cell"><span class="badge {status}">{badge}</span></td>
      <td class="timestamp">{started}</td>
      <td class="timestamp">{ended}</td>
      <td class="duration">{duration}</td>
    </tr>
"#,
        status = status,
        index = index,
        title = escape_html(&entry.title),
        file = escape_html(base_name(&entry.file)),
        badge = status.to_uppercase(),
        started = format_timestamp(entry.started_at),
        ended = format_timestamp(entry.ended_at),
        duration = format_duration(entry.duration_ms),
    ));

    if !entry.error_message.is_empty() {
        out.push_str(&format!(
            r#"    <tr class="error-row">
      <td colspan="7"><details><summary>Error details</summary><pre class="error-pre">{}</pre></details></td>
    </tr>
"#,
            escape_html(&entry.error_message)
        ));
    }

    if !entry.screenshot.is_empty() {
        out.push_str(&format!(
            r#"    <tr class="error-row screenshot-row">
      <td colspan="7"><details><summary>Failure screenshot</summary><div class="screenshot-container"><img src="{src}" alt="Failure screenshot for {alt}" /></div></details></td>
    </tr>
"#,
            src = entry.screenshot,
            alt = escape_html(&entry.title),
        ));
    }
}

/// Escapes the five HTML-special characters.
///
/// Applied to every user-controlled string before interpolation so test
/// titles and error text can never inject markup into the report.
pub fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Formats a millisecond duration for display.
///
/// | Input | Output |
/// |-------|--------|
/// | `< 1s` | `"999ms"` |
/// | `< 60s` | `"59.99s"` |
/// | otherwise | `"2m 5.3s"` |
///
/// Sub-minute values truncate at centiseconds, so 59999ms renders
/// `"59.99s"` and never rolls over to `"60.00s"`.
pub fn format_duration(ms: u64) -> String {
    if ms < 1_000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        let centis = ms / 10;
        format!("{}.{:02}s", centis / 100, centis % 100)
    } else {
        let minutes = ms / 60_000;
        let decis = (ms % 60_000) / 100;
        format!("{}m {}.{}s", minutes, decis / 10, decis % 10)
    }
}

/// Formats a timestamp in the viewer's local calendar/time form, or the
/// placeholder glyph when the timestamp was never observed.
pub fn format_timestamp(ts: Option<DateTime<Utc>>) -> String {
    match ts {
        Some(ts) => ts
            .with_timezone(&Local)
            .format("%d %b %Y, %I:%M:%S %p")
            .to_string(),
        None => PLACEHOLDER.to_string(),
    }
}

fn base_name(file: &str) -> &str {
    Path::new(file)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(file)
}

const STYLE: &str = r#"
:root {
  --bg: #0f172a;
  --surface: #1e293b;
  --surface-hover: #334155;
  --border: #334155;
  --text: #e2e8f0;
  --text-muted: #94a3b8;
  --accent: #6366f1;
  --green: #22c55e;
  --red: #ef4444;
  --orange: #f97316;
  --yellow: #eab308;
  --blue: #3b82f6;
}

* { margin: 0; padding: 0; box-sizing: border-box; }

body {
  font-family: 'Segoe UI', -apple-system, BlinkMacSystemFont, sans-serif;
  background: var(--bg);
  color: var(--text);
  line-height: 1.6;
  padding: 32px;
  min-height: 100vh;
}

.header {
  background: linear-gradient(135deg, var(--accent) 0%, #8b5cf6 50%, #a855f7 100%);
  border-radius: 16px;
  padding: 32px;
  margin-bottom: 24px;
  display: flex;
  justify-content: space-between;
  align-items: center;
  flex-wrap: wrap;
  gap: 16px;
}
.header h1 { font-size: 28px; font-weight: 700; color: #fff; }
.header .run-status {
  font-size: 14px;
  padding: 6px 16px;
  border-radius: 20px;
  font-weight: 600;
  text-transform: uppercase;
  letter-spacing: 0.5px;
}
.header .run-status.passed { background: rgba(34,197,94,0.25); color: var(--green); }
.header .run-status.failed { background: rgba(239,68,68,0.25); color: var(--red); }

.env-bar {
  display: flex;
  gap: 24px;
  flex-wrap: wrap;
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: 12px;
  padding: 16px 24px;
  margin-bottom: 24px;
  font-size: 13px;
  color: var(--text-muted);
}
.env-bar span { white-space: nowrap; }
.env-bar strong { color: var(--text); }

.progress-container {
  margin-bottom: 24px;
  background: var(--surface);
  border-radius: 12px;
  padding: 20px 24px;
  border: 1px solid var(--border);
}
.progress-label {
  display: flex;
  justify-content: space-between;
  margin-bottom: 10px;
  font-size: 14px;
  font-weight: 600;
}
.progress-bar {
  height: 12px;
  border-radius: 6px;
  background: var(--border);
  overflow: hidden;
  display: flex;
}
.progress-bar .segment-passed { background: var(--green); }
.progress-bar .segment-failed { background: var(--red); }
.progress-bar .segment-other { background: var(--orange); }

.summary {
  display: grid;
  grid-template-columns: repeat(auto-fit, minmax(150px, 1fr));
  gap: 16px;
  margin-bottom: 24px;
}
.card {
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: 12px;
  padding: 20px;
  text-align: center;
  transition: transform 0.2s, border-color 0.2s;
}
.card:hover { transform: translateY(-2px); border-color: var(--accent); }
.card .card-value {
  font-size: 32px;
  font-weight: 700;
  line-height: 1;
  margin-bottom: 4px;
}
.card .card-label {
  font-size: 13px;
  color: var(--text-muted);
  text-transform: uppercase;
  letter-spacing: 0.5px;
}
.card.total .card-value { color: var(--blue); }
.card.passed .card-value { color: var(--green); }
.card.failed .card-value { color: var(--red); }
.card.skipped .card-value { color: var(--orange); }
.card.timed-out .card-value { color: var(--yellow); }
.card.duration .card-value { color: var(--accent); font-size: 24px; }

.table-wrapper {
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: 12px;
  overflow: hidden;
}
table { width: 100%; border-collapse: collapse; }
th {
  background: rgba(99,102,241,0.15);
  padding: 14px 16px;
  text-align: left;
  font-size: 12px;
  text-transform: uppercase;
  letter-spacing: 0.8px;
  color: var(--text-muted);
  border-bottom: 1px solid var(--border);
}
td {
  padding: 12px 16px;
  font-size: 14px;
  border-bottom: 1px solid var(--border);
  vertical-align: top;
}
.test-row:hover { background: var(--surface-hover); }
.row-num { color: var(--text-muted); width: 40px; text-align: center; }
.test-name { font-weight: 500; }
.test-file { color: var(--text-muted); font-size: 13px; }
.timestamp { font-size: 12px; color: var(--text-muted); white-space: nowrap; }
.duration { font-weight: 600; white-space: nowrap; }

.badge {
  display: inline-block;
  padding: 3px 10px;
  border-radius: 12px;
  font-size: 11px;
  font-weight: 700;
  letter-spacing: 0.5px;
}
.badge.passed { background: rgba(34,197,94,0.2); color: var(--green); }
.badge.failed { background: rgba(239,68,68,0.2); color: var(--red); }
.badge.timedOut { background: rgba(234,179,8,0.2); color: var(--yellow); }
.badge.skipped { background: rgba(249,115,22,0.2); color: var(--orange); }
.badge.interrupted { background: rgba(239,68,68,0.2); color: var(--red); }
.badge.running { background: rgba(59,130,246,0.2); color: var(--blue); }

.error-row td { padding: 0 16px 12px 16px; border-bottom: 1px solid var(--border); }
.error-row details {
  background: rgba(239,68,68,0.08);
  border: 1px solid rgba(239,68,68,0.2);
  border-radius: 8px;
  padding: 12px;
}
.error-row summary {
  cursor: pointer;
  font-size: 13px;
  font-weight: 600;
  color: var(--red);
}
.error-pre {
  margin-top: 8px;
  font-size: 12px;
  color: #fca5a5;
  white-space: pre-wrap;
  word-break: break-word;
  max-height: 300px;
  overflow-y: auto;
}

.screenshot-row details {
  background: rgba(99,102,241,0.08);
  border: 1px solid rgba(99,102,241,0.25);
  border-radius: 8px;
  padding: 12px;
}
.screenshot-row summary {
  cursor: pointer;
  font-size: 13px;
  font-weight: 600;
  color: var(--accent);
}
.screenshot-container { margin-top: 10px; }
.screenshot-container img {
  max-width: 100%;
  border-radius: 8px;
  border: 1px solid var(--border);
  box-shadow: 0 4px 12px rgba(0,0,0,0.3);
}

.footer {
  text-align: center;
  margin-top: 24px;
  font-size: 12px;
  color: var(--text-muted);
}

@media (max-width: 768px) {
  body { padding: 16px; }
  .header { padding: 20px; }
  .header h1 { font-size: 20px; }
  .summary { grid-template-columns: repeat(2, 1fr); }
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RunSummary, TestStatus};
    use chrono::TimeZone;

    fn entry(title: &str, status: TestStatus, duration_ms: u64) -> TestRunEntry {
        let started = Utc.with_ymd_and_hms(2024, 5, 3, 10, 0, 0).unwrap();
        TestRunEntry {
            title: title.to_string(),
            file: "tests/checkout.spec.ts".to_string(),
            status,
            started_at: Some(started),
            ended_at: Some(started + chrono::Duration::milliseconds(duration_ms as i64)),
            duration_ms,
            error_message: String::new(),
            screenshot: String::new(),
        }
    }

    fn report(entries: Vec<TestRunEntry>, run_status: &str) -> RunReport {
        let mut summary = RunSummary::empty(run_status);
        summary.total = entries.len();
        for e in &entries {
            match e.status {
                TestStatus::Passed => summary.passed += 1,
                TestStatus::Failed => summary.failed += 1,
                TestStatus::Skipped => summary.skipped += 1,
                TestStatus::TimedOut => summary.timed_out += 1,
                TestStatus::Interrupted => summary.interrupted += 1,
                TestStatus::Running => summary.running += 1,
            }
        }
        RunReport { summary, entries }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a & b"), "a &amp; b");
        assert_eq!(escape_html("<td>"), "&lt;td&gt;");
        assert_eq!(escape_html("\"quoted\""), "&quot;quoted&quot;");
        assert_eq!(escape_html("it's"), "it&#39;s");
        assert_eq!(
            escape_html("<script>alert(1)</script>"),
            "&lt;script&gt;alert(1)&lt;/script&gt;"
        );
    }

    #[test]
    fn test_format_duration_boundaries() {
        assert_eq!(format_duration(0), "0ms");
        assert_eq!(format_duration(500), "500ms");
        assert_eq!(format_duration(999), "999ms");
        assert_eq!(format_duration(1000), "1.00s");
        assert_eq!(format_duration(1200), "1.20s");
        assert_eq!(format_duration(59999), "59.99s");
        assert_eq!(format_duration(60000), "1m 0.0s");
        assert_eq!(format_duration(90550), "1m 30.5s");
        assert_eq!(format_duration(125_000), "2m 5.0s");
    }

    #[test]
    fn test_format_timestamp_placeholder() {
        assert_eq!(format_timestamp(None), "&mdash;");
        assert!(!format_timestamp(Some(Utc::now())).is_empty());
    }

    #[test]
    fn test_title_injection_is_escaped() {
        let mut bad = entry("<script>alert(1)</script>", TestStatus::Passed, 10);
        bad.file = "<img src=x onerror=alert(1)>.ts".to_string();
        let html = render(&report(vec![bad], "passed"));

        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!html.contains("<script>alert(1)"));
        assert!(!html.contains("<img src=x"));
    }

    #[test]
    fn test_scenario_two_tests() {
        let passed = entry("test a", TestStatus::Passed, 1200);
        let mut failed = entry("test b", TestStatus::Failed, 500);
        failed.error_message = "expected true, got false".to_string();

        let html = render(&report(vec![passed, failed], "failed"));

        assert!(html.contains(">50.0%<"));
        assert!(html.contains("1.20s"));
        assert!(html.contains("500ms"));
        assert!(html.contains("expected true, got false"));
        // Exactly one error detail row: test a contributes none.
        assert_eq!(html.matches("Error details").count(), 1);
    }

    #[test]
    fn test_screenshot_row_embeds_data_uri() {
        let mut failed = entry("test b", TestStatus::Failed, 500);
        failed.screenshot = "data:image/png;base64,AQID".to_string();

        let html = render(&report(vec![failed], "failed"));
        assert!(html.contains("src=\"data:image/png;base64,AQID\""));
        assert!(html.contains("Failure screenshot"));
    }

    #[test]
    fn test_empty_report_renders_without_rows() {
        let html = render(&report(Vec::new(), "passed"));
        assert!(html.contains(">0.0%<"));
        assert!(html.contains("width: 0%"));
        assert!(!html.contains("<tr class=\"test-row"));
    }

    #[test]
    fn test_running_entry_renders_placeholder_end() {
        let mut hung = entry("test c", TestStatus::Running, 0);
        hung.ended_at = None;
        hung.duration_ms = 0;

        let html = render(&report(vec![hung], "failed"));
        assert!(html.contains("&mdash;"));
        assert!(html.contains("RUNNING"));
    }

    #[test]
    fn test_row_index_is_one_based() {
        let html = render(&report(
            vec![
                entry("first", TestStatus::Passed, 10),
                entry("second", TestStatus::Passed, 10),
            ],
            "passed",
        ));
        assert!(html.contains("<td class=\"row-num\">1</td>"));
        assert!(html.contains("<td class=\"row-num\">2</td>"));
    }

    #[test]
    fn test_file_path_is_stripped_to_base_name() {
        let html = render(&report(vec![entry("t", TestStatus::Passed, 10)], "passed"));
        assert!(html.contains(">checkout.spec.ts<"));
        assert!(!html.contains(">tests/checkout.spec.ts<"));
    }
}
