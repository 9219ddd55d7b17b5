//! Report rendering

use std::fmt::Write;

use eyre::Result;
use matchcheck_core::{Corpus, Finding, Report};
use owo_colors::OwoColorize;

use crate::{Failure, Validation};

const RULE: &str = "============================================================";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

pub fn render_validation(validation: &Validation, format: OutputFormat, color: bool) -> Result<String> {
    match (validation, format) {
        (Validation::Checked(report), OutputFormat::Text) => Ok(render_report(report, color)),
        (Validation::Failed(failure), OutputFormat::Text) => Ok(render_failure(failure, color)),
        (Validation::Checked(report), OutputFormat::Json) => to_json(report),
        (Validation::Failed(failure), OutputFormat::Json) => to_json(failure),
    }
}

fn to_json<'a, T: facet::Facet<'a>>(value: &T) -> Result<String> {
    let mut json = facet_json::to_string_pretty(value)
        .map_err(|e| eyre::eyre!("Failed to serialize report: {}", e))?;
    json.push('\n');
    Ok(json)
}

/// Render a report for a terminal.
pub fn render_report(report: &Report, color: bool) -> String {
    let mut out = String::new();
    header(&mut out, color);

    if report.success {
        let _ = writeln!(
            out,
            "{}",
            paint(color, "PASSED: All tests match implementation", |s| {
                s.green().bold().to_string()
            })
        );
    } else {
        let _ = writeln!(
            out,
            "{}",
            paint(color, "FAILED: Found mismatches", |s| s.red().bold().to_string())
        );
    }
    let _ = writeln!(out, "Test methods found: {}", report.test_methods);

    if !report.errors.is_empty() {
        let title = format!("ERRORS ({}):", report.errors.len());
        let _ = writeln!(out, "\n{}", paint(color, &title, |s| s.red().bold().to_string()));
        for finding in &report.errors {
            finding_line(&mut out, finding, color);
        }
    }

    if !report.warnings.is_empty() {
        let title = format!("WARNINGS ({}):", report.warnings.len());
        let _ = writeln!(
            out,
            "\n{}",
            paint(color, &title, |s| s.yellow().bold().to_string())
        );
        for finding in &report.warnings {
            finding_line(&mut out, finding, color);
        }
    }

    let _ = writeln!(out, "\n{RULE}");
    let _ = writeln!(
        out,
        "Total: {} errors, {} warnings",
        report.error_count, report.warning_count
    );
    let _ = writeln!(out, "{RULE}");
    out
}

/// Render a run that never got as far as a report.
pub fn render_failure(failure: &Failure, color: bool) -> String {
    let mut out = String::new();
    header(&mut out, color);
    let line = format!("FAILED: {}", failure.error);
    let _ = writeln!(out, "{}", paint(color, &line, |s| s.red().bold().to_string()));
    let _ = writeln!(out, "{RULE}");
    out
}

fn header(out: &mut String, color: bool) {
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(
        out,
        "{}",
        paint(color, "TEST-IMPLEMENTATION MATCHER REPORT", |s| {
            s.bold().to_string()
        })
    );
    let _ = writeln!(out, "{RULE}");
}

fn finding_line(out: &mut String, finding: &Finding, color: bool) {
    let _ = write!(out, "  - {}", finding.message);
    if let Some(location) = finding.location {
        let corpus = match location.corpus {
            Corpus::Test => "test",
            Corpus::Implementation => "implementation",
        };
        let at = format!("[{corpus} line {}]", location.line);
        let _ = write!(out, " {}", paint(color, &at, |s| s.dimmed().to_string()));
    }
    if let Some(hint) = &finding.hint {
        let hint = format!("(did you mean '{hint}'?)");
        let _ = write!(out, " {}", paint(color, &hint, |s| s.dimmed().to_string()));
    }
    out.push('\n');
}

fn paint(color: bool, text: &str, style: impl Fn(&str) -> String) -> String {
    if color { style(text) } else { text.to_string() }
}
