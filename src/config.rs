//! Reporter configuration loading.
//!
//! Configuration lives in a `[report]` TOML table and selects which
//! reporters are active and where their artifacts land. Every field has
//! a default, so an empty table (or no file at all) yields a working
//! HTML + console setup.
//!
//! ```toml
//! [report]
//! output_dir = "custom-report"
//! html = true
//! junit = true
//! junit_file = "junit.xml"
//! console = true
//! verbose = false
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::report::{ConsoleReporter, HtmlReporter, JUnitReporter, MultiReporter};
use crate::writer::DEFAULT_OUTPUT_DIR;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Reporting settings (optional, has defaults).
    #[serde(default)]
    pub report: ReportConfig,
}

/// Settings for the reporting pipeline.
///
/// # Defaults
///
/// | Field | Default |
/// |-------|---------|
/// | `output_dir` | `"custom-report"` |
/// | `html` | `true` |
/// | `junit` | `false` |
/// | `junit_file` | `"junit.xml"` |
/// | `console` | `true` |
/// | `verbose` | `false` |
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReportConfig {
    /// Directory for all report artifacts.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Write the self-contained HTML report.
    #[serde(default = "default_true")]
    pub html: bool,

    /// Write a JUnit XML report for CI consumption.
    #[serde(default)]
    pub junit: bool,

    /// JUnit file name, under `output_dir`.
    #[serde(default = "default_junit_file")]
    pub junit_file: String,

    /// Show live progress and a summary on the console.
    #[serde(default = "default_true")]
    pub console: bool,

    /// Print a line for each starting test on the console.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            html: true,
            junit: false,
            junit_file: default_junit_file(),
            console: true,
            verbose: false,
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

fn default_true() -> bool {
    true
}

fn default_junit_file() -> String {
    "junit.xml".to_string()
}

/// Load configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    Ok(config)
}

/// Load configuration from a string.
pub fn load_config_str(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).context("Failed to parse config")?;

    Ok(config)
}

/// Assemble the configured reporter stack.
pub fn build_reporter(config: &ReportConfig) -> MultiReporter {
    let mut multi = MultiReporter::new();

    if config.console {
        multi = multi.with_reporter(ConsoleReporter::new(config.verbose));
    }

    if config.html {
        multi = multi.with_reporter(HtmlReporter::with_output_dir(config.output_dir.clone()));
    }

    if config.junit {
        multi = multi.with_reporter(JUnitReporter::new(config.output_dir.join(&config.junit_file)));
    }

    multi
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_table() {
        let config = load_config_str("[report]\n").unwrap();
        assert_eq!(config.report.output_dir, PathBuf::from("custom-report"));
        assert!(config.report.html);
        assert!(!config.report.junit);
        assert_eq!(config.report.junit_file, "junit.xml");
        assert!(config.report.console);
        assert!(!config.report.verbose);
    }

    #[test]
    fn test_defaults_from_empty_document() {
        let config = load_config_str("").unwrap();
        assert!(config.report.html);
    }

    #[test]
    fn test_parse_full_table() {
        let config = load_config_str(
            r#"
            [report]
            output_dir = "artifacts/reports"
            html = false
            junit = true
            junit_file = "results.xml"
            console = false
            verbose = true
            "#,
        )
        .unwrap();

        assert_eq!(config.report.output_dir, PathBuf::from("artifacts/reports"));
        assert!(!config.report.html);
        assert!(config.report.junit);
        assert_eq!(config.report.junit_file, "results.xml");
        assert!(!config.report.console);
        assert!(config.report.verbose);
    }

    #[test]
    fn test_invalid_toml_is_error() {
        assert!(load_config_str("[report\nhtml = yes").is_err());
    }

    #[test]
    fn test_build_reporter_honors_flags() {
        let mut report = ReportConfig::default();
        report.console = false;
        assert_eq!(build_reporter(&report).len(), 1); // html only

        report.junit = true;
        assert_eq!(build_reporter(&report).len(), 2);

        report.html = false;
        report.junit = false;
        assert!(build_reporter(&report).is_empty());
    }
}
