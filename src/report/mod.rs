//! Report generation with multiple output formats
//!
//! CDD Principle: Anti-Corruption Layer - Formatters translate domain objects to external formats
//! - ValidationReport, HealthReport and command listings are converted to text, JSON or annotations
//! - Each format encapsulates its own layout rules
//! - Domain logic remains pure while supporting multiple presentation needs

use crate::commands::SlashCommand;
use crate::domain::{LintError, LintResult, Severity, ValidationIssue, ValidationReport};
use crate::health::HealthReport;
use crate::markdown::MarkdownRun;
#[cfg(feature = "colors")]
use colored::Colorize;
use serde_json::Value as JsonValue;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// `[OK]`/`[FAIL]`/`[WARN]` status lines with bulleted issues
    Human,
    /// JSON format for programmatic consumption
    Json,
    /// GitHub Actions workflow annotations
    GitHub,
}

/// Options for customizing report output
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Whether to use colored output (for human format)
    pub use_colors: bool,
    /// Whether to print remediation tips; turned off by `--check-only`
    pub show_suggestions: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            use_colors: true,
            show_suggestions: true,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Tone {
    Ok,
    Fail,
    Warn,
    Dim,
}

#[cfg(feature = "colors")]
fn paint(text: &str, tone: Tone, enabled: bool) -> String {
    if !enabled {
        return text.to_string();
    }
    match tone {
        Tone::Ok => text.green().to_string(),
        Tone::Fail => text.red().bold().to_string(),
        Tone::Warn => text.yellow().to_string(),
        Tone::Dim => text.dimmed().to_string(),
    }
}

#[cfg(not(feature = "colors"))]
fn paint(text: &str, _tone: Tone, _enabled: bool) -> String {
    text.to_string()
}

fn plural(count: usize, noun: &str) -> String {
    format!("{} {}{}", count, noun, if count == 1 { "" } else { "s" })
}

/// Formats lint results for output
#[derive(Debug, Clone, Default)]
pub struct ReportFormatter {
    options: ReportOptions,
}

impl ReportFormatter {
    pub fn new(options: ReportOptions) -> Self {
        Self { options }
    }

    /// Format one validator's report
    pub fn format_report(
        &self,
        report: &ValidationReport,
        format: OutputFormat,
    ) -> LintResult<String> {
        match format {
            OutputFormat::Human => Ok(self.format_human(report)),
            OutputFormat::Json => to_pretty_json(&self.report_json(report)),
            OutputFormat::GitHub => Ok(format_github(&report.issues)),
        }
    }

    /// Format a markdown run, including any typo fixes applied
    pub fn format_markdown_run(&self, run: &MarkdownRun, format: OutputFormat) -> LintResult<String> {
        match format {
            OutputFormat::Human => {
                let mut output = String::new();
                for fix in &run.fixes {
                    output.push_str(&format!(
                        "Fixed {} in {}\n",
                        plural(fix.replacements, "typo"),
                        fix.path.display()
                    ));
                }
                output.push_str(&self.format_human(&run.report));
                if run.files_with_errors() > 0 {
                    output.push_str(&format!(
                        "{} with errors\n",
                        plural(run.files_with_errors(), "file")
                    ));
                }
                Ok(output)
            }
            OutputFormat::Json => {
                let mut json = self.report_json(&run.report);
                json["fixes"] = run
                    .fixes
                    .iter()
                    .map(|fix| {
                        serde_json::json!({
                            "file_path": fix.path.display().to_string(),
                            "replacements": fix.replacements,
                        })
                    })
                    .collect();
                to_pretty_json(&json)
            }
            OutputFormat::GitHub => Ok(format_github(&run.report.issues)),
        }
    }

    /// Format the triad health check
    pub fn format_health(&self, health: &HealthReport, format: OutputFormat) -> LintResult<String> {
        match format {
            OutputFormat::Human => Ok(self.format_health_human(health)),
            OutputFormat::Json => {
                let triads: Vec<JsonValue> = health
                    .triads
                    .iter()
                    .map(|t| {
                        serde_json::json!({
                            "name": t.name,
                            "directory": t.directory.display().to_string(),
                            "files": t.files,
                            "passed": t.passed,
                            "issues": t.report.issues.iter().map(issue_json).collect::<Vec<_>>(),
                        })
                    })
                    .collect();

                to_pretty_json(&serde_json::json!({
                    "passed": health.passed(),
                    "triads": triads,
                    "settings_file": health.settings_file.display().to_string(),
                    "settings": health.settings,
                }))
            }
            OutputFormat::GitHub => {
                let mut output = String::new();
                for triad in &health.triads {
                    output.push_str(&format_github(&triad.report.issues));
                }
                for check in health.failed_settings() {
                    output.push_str(&format!(
                        "::error file={}::{}\n",
                        health.settings_file.display(),
                        check.message
                    ));
                }
                Ok(output)
            }
        }
    }

    /// Format a slash-command listing as `<command>  <file>` lines
    pub fn format_commands(
        &self,
        commands: &[SlashCommand],
        format: OutputFormat,
    ) -> LintResult<String> {
        match format {
            OutputFormat::Json => to_pretty_json(&serde_json::json!({ "commands": commands })),
            OutputFormat::Human | OutputFormat::GitHub => {
                let width = commands.iter().map(|c| c.command.len()).max().unwrap_or(0);
                Ok(commands
                    .iter()
                    .map(|c| format!("{:<width$}  {}\n", c.command, c.file.display()))
                    .collect())
            }
        }
    }

    fn status_label(&self, report: &ValidationReport) -> String {
        if report.has_errors() {
            paint("[FAIL]", Tone::Fail, self.options.use_colors)
        } else if report.has_issues() {
            paint("[WARN]", Tone::Warn, self.options.use_colors)
        } else {
            paint("[OK]", Tone::Ok, self.options.use_colors)
        }
    }

    fn format_human(&self, report: &ValidationReport) -> String {
        let mut output = String::new();
        let files = plural(report.summary.files_checked, "file");

        let counts = if report.has_issues() {
            let mut parts = Vec::new();
            if report.error_count() > 0 {
                parts.push(plural(report.error_count(), "error"));
            }
            if report.warning_count() > 0 {
                parts.push(plural(report.warning_count(), "warning"));
            }
            format!("{} in {}", parts.join(", "), files)
        } else {
            format!("{files} checked")
        };

        output.push_str(&format!(
            "{} {}: {}\n",
            self.status_label(report),
            report.validator,
            counts
        ));
        output.push_str(&self.format_issue_list(&report.issues));
        output
    }

    fn format_issue_list(&self, issues: &[ValidationIssue]) -> String {
        let mut output = String::new();

        for issue in issues {
            let line = format!("  - {}\n", issue.format_display());
            match issue.severity {
                Severity::Error => output.push_str(&line),
                Severity::Warning => output.push_str(&paint(&line, Tone::Warn, self.options.use_colors)),
            }
        }

        if self.options.show_suggestions {
            let mut tips: Vec<&str> = issues
                .iter()
                .filter_map(|i| i.suggested_fix.as_deref())
                .collect();
            tips.sort_unstable();
            tips.dedup();

            for tip in tips {
                let line = format!("    tip: {tip}\n");
                output.push_str(&paint(&line, Tone::Dim, self.options.use_colors));
            }
        }

        output
    }

    fn format_health_human(&self, health: &HealthReport) -> String {
        let mut output = String::new();

        for triad in &health.triads {
            output.push_str(&format!(
                "{} {}: {} in {}\n",
                self.status_label(&triad.report),
                triad.name,
                plural(triad.files, "file"),
                triad.directory.display()
            ));
            output.push_str(&self.format_issue_list(&triad.report.issues));
        }

        for check in &health.settings {
            let label = if check.satisfied {
                paint("[OK]", Tone::Ok, self.options.use_colors)
            } else {
                paint("[FAIL]", Tone::Fail, self.options.use_colors)
            };
            output.push_str(&format!("{} settings: {}\n", label, check.message));
        }

        if !health.passed() && self.options.show_suggestions && health.failed_settings().count() > 0 {
            let tip = format!(
                "    tip: add the missing entries to {}\n",
                health.settings_file.display()
            );
            output.push_str(&paint(&tip, Tone::Dim, self.options.use_colors));
        }

        let overall = if health.passed() {
            paint("[OK]", Tone::Ok, self.options.use_colors)
        } else {
            paint("[FAIL]", Tone::Fail, self.options.use_colors)
        };
        output.push_str(&format!("{overall} health\n"));
        output
    }

    fn report_json(&self, report: &ValidationReport) -> JsonValue {
        serde_json::json!({
            "validator": report.validator,
            "passed": report.passed(),
            "issues": report.issues.iter().map(issue_json).collect::<Vec<_>>(),
            "summary": {
                "files_checked": report.summary.files_checked,
                "issues_by_severity": {
                    "error": report.error_count(),
                    "warning": report.warning_count(),
                },
                "validated_at": report.summary.validated_at.to_rfc3339(),
            },
        })
    }
}

fn issue_json(issue: &ValidationIssue) -> JsonValue {
    serde_json::json!({
        "rule_id": issue.rule_id,
        "severity": issue.severity.as_str(),
        "class": issue.class.as_str(),
        "file_path": issue.file_path.display().to_string(),
        "line_number": issue.line_number,
        "message": issue.message,
        "suggested_fix": issue.suggested_fix,
    })
}

fn to_pretty_json(value: &JsonValue) -> LintResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| LintError::validation(format!("JSON serialization failed: {e}")))
}

/// One `::error`/`::warning` annotation per issue
fn format_github(issues: &[ValidationIssue]) -> String {
    let mut output = String::new();

    for issue in issues {
        let position = issue
            .line_number
            .map(|line| format!(",line={line}"))
            .unwrap_or_default();

        output.push_str(&format!(
            "::{} file={}{},title={}::{}\n",
            issue.severity.as_str(),
            issue.file_path.display(),
            position,
            issue.rule_id,
            issue.message
        ));
    }

    output
}
