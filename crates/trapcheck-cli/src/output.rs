//! Report formatting and output

use crate::error::CliResult;
use console::{style, Term};
use serde::{Deserialize, Serialize};
use std::path::Path;
use trapcheck::SuiteReport;

/// Output format for suite reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON output
    Json,
}

/// Render a suite report in the requested format
pub fn render_report(
    report: &SuiteReport,
    format: OutputFormat,
    use_color: bool,
) -> CliResult<String> {
    match format {
        OutputFormat::Json => Ok(report.render_json()? + "\n"),
        OutputFormat::Text => {
            let text = report.render_text();
            if use_color {
                Ok(colorize(&text, report.all_passed()))
            } else {
                Ok(text)
            }
        }
    }
}

fn colorize(text: &str, all_passed: bool) -> String {
    let mut out = String::with_capacity(text.len());
    let lines: Vec<&str> = text.lines().collect();
    let last = lines.len().saturating_sub(1);
    for (i, line) in lines.iter().enumerate() {
        let styled = if let Some(rest) = line.strip_prefix("ok  ") {
            format!("{}{rest}", style("ok  ").green().bold())
        } else if let Some(rest) = line.strip_prefix("FAIL") {
            format!("{}{rest}", style("FAIL").red().bold())
        } else if i == last {
            if all_passed {
                style(*line).green().to_string()
            } else {
                style(*line).red().to_string()
            }
        } else {
            style(*line).dim().to_string()
        };
        out.push_str(&styled);
        out.push('\n');
    }
    out
}

/// Write rendered output to a file, or to stdout when no path is given
pub fn emit(rendered: &str, output: Option<&Path>) -> CliResult<()> {
    match output {
        Some(path) => {
            std::fs::write(path, rendered)?;
            tracing::info!(path = %path.display(), "report written");
        }
        None => Term::stdout().write_str(rendered)?,
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use trapcheck::ScenarioReport;

    fn sample(pass: bool) -> SuiteReport {
        let mut suite = SuiteReport::new("dialog-modal");
        let mut scenario = ScenarioReport::new("aria-modal");
        scenario.plan(1);
        scenario.assert_true(pass, "aria-modal is true");
        suite.push(scenario);
        suite
    }

    mod render_tests {
        use super::*;

        #[test]
        fn test_plain_text_matches_library() {
            let report = sample(true);
            let text = render_report(&report, OutputFormat::Text, false).unwrap();
            assert_eq!(text, report.render_text());
        }

        #[test]
        fn test_colored_text_keeps_content() {
            let report = sample(false);
            let text = render_report(&report, OutputFormat::Text, true).unwrap();
            let plain = console::strip_ansi_codes(&text);
            assert_eq!(plain, report.render_text());
        }

        #[test]
        fn test_json_is_parseable() {
            let text = render_report(&sample(true), OutputFormat::Json, true).unwrap();
            let value: serde_json::Value = serde_json::from_str(&text).unwrap();
            assert_eq!(value["scenarios"][0]["name"], "aria-modal");
        }
    }

    mod emit_tests {
        use super::*;

        #[test]
        fn test_emit_to_file() {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("report.txt");
            emit("ok\n", Some(&path)).unwrap();
            assert_eq!(std::fs::read_to_string(&path).unwrap(), "ok\n");
        }
    }
}
