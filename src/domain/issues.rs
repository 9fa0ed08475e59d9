//! Core domain models for convention issues and validation results
//!
//! Architecture: Rich Domain Models - Issues carry their own classification and remediation
//! - ValidationIssue is immutable once a validator has produced it
//! - ValidationReport acts as an aggregate root managing the issues of one validator run
//! - Pass/fail is derived from the collected issues, never stored separately

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Severity levels for convention issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Cosmetic findings that are reported but never fail a run
    Warning,
    /// Findings that fail the run and produce a non-zero exit code
    Error,
}

impl Severity {
    /// Whether this severity level should cause validation to fail
    pub fn is_blocking(self) -> bool {
        matches!(self, Self::Error)
    }

    /// Convert to string for display
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// Error taxonomy for issues raised by the validators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "snake_case")]
pub enum IssueClass {
    /// A required layout element is missing or malformed
    Structural,
    /// Disallowed content is present (links, keys, model or tools values)
    ContentPolicy,
    /// Whitespace, heading and line-length findings
    Style,
    /// A typo dictionary match
    Typo,
}

impl IssueClass {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Structural => "structural",
            Self::ContentPolicy => "content_policy",
            Self::Style => "style",
            Self::Typo => "typo",
        }
    }
}

/// A single finding produced while validating one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Identifier of the check that produced this issue
    pub rule_id: String,
    /// Severity level of this issue
    pub severity: Severity,
    /// Taxonomy class of this issue
    pub class: IssueClass,
    /// File the issue was found in
    pub file_path: PathBuf,
    /// Line number (1-indexed) when the check can pin one down
    pub line_number: Option<usize>,
    /// Human-readable description of the issue
    pub message: String,
    /// Remediation tip shown unless output runs in check-only mode
    pub suggested_fix: Option<String>,
}

impl ValidationIssue {
    /// Create a new issue
    pub fn new(
        rule_id: impl Into<String>,
        severity: Severity,
        class: IssueClass,
        file_path: impl Into<PathBuf>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            severity,
            class,
            file_path: file_path.into(),
            line_number: None,
            message: message.into(),
            suggested_fix: None,
        }
    }

    /// A missing or malformed layout element. Always an error.
    pub fn structural(
        rule_id: impl Into<String>,
        file_path: impl Into<PathBuf>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(rule_id, Severity::Error, IssueClass::Structural, file_path, message)
    }

    /// Disallowed content. Always an error.
    pub fn policy(
        rule_id: impl Into<String>,
        file_path: impl Into<PathBuf>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(rule_id, Severity::Error, IssueClass::ContentPolicy, file_path, message)
    }

    /// A style finding with explicit severity
    pub fn style(
        rule_id: impl Into<String>,
        severity: Severity,
        file_path: impl Into<PathBuf>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(rule_id, severity, IssueClass::Style, file_path, message)
    }

    /// A typo dictionary match. Always a warning.
    pub fn typo(file_path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::new("typo", Severity::Warning, IssueClass::Typo, file_path, message)
    }

    /// Set the line number
    pub fn at_line(mut self, line: usize) -> Self {
        self.line_number = Some(line);
        self
    }

    /// Add a remediation tip
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggested_fix = Some(suggestion.into());
        self
    }

    /// Whether this issue fails the run
    pub fn is_blocking(&self) -> bool {
        self.severity.is_blocking()
    }

    /// Format as `<path>: <message>` or `<path>:<line>: <message>`
    pub fn format_display(&self) -> String {
        match self.line_number {
            Some(line) => format!("{}:{}: {}", self.file_path.display(), line, self.message),
            None => format!("{}: {}", self.file_path.display(), self.message),
        }
    }
}

/// Count of issues by severity level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueCounts {
    pub error: usize,
    pub warning: usize,
}

impl IssueCounts {
    /// Total number of issues across all severities
    pub fn total(&self) -> usize {
        self.error + self.warning
    }

    /// Whether there are any blocking issues
    pub fn has_blocking(&self) -> bool {
        self.error > 0
    }

    /// Add an issue to the counts
    pub fn add(&mut self, severity: Severity) {
        match severity {
            Severity::Error => self.error += 1,
            Severity::Warning => self.warning += 1,
        }
    }
}

/// Summary statistics for a validation report
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationSummary {
    /// Number of files the validator looked at
    pub files_checked: usize,
    /// Number of issues by severity level
    pub issues_by_severity: IssueCounts,
    /// Timestamp when validation was performed
    pub validated_at: DateTime<Utc>,
}

/// All issues produced by one validator run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Name of the validator that produced this report
    pub validator: String,
    /// Issues in the order they were found
    pub issues: Vec<ValidationIssue>,
    /// Summary statistics
    pub summary: ValidationSummary,
}

impl ValidationReport {
    /// Create a new empty report for the named validator
    pub fn new(validator: impl Into<String>) -> Self {
        Self {
            validator: validator.into(),
            issues: Vec::new(),
            summary: ValidationSummary {
                validated_at: Utc::now(),
                ..Default::default()
            },
        }
    }

    /// Add an issue to the report
    pub fn add_issue(&mut self, issue: ValidationIssue) {
        self.summary.issues_by_severity.add(issue.severity);
        self.issues.push(issue);
    }

    /// Add several issues, keeping their order
    pub fn extend(&mut self, issues: impl IntoIterator<Item = ValidationIssue>) {
        for issue in issues {
            self.add_issue(issue);
        }
    }

    /// `true` when no error-severity issue was recorded
    pub fn passed(&self) -> bool {
        !self.summary.issues_by_severity.has_blocking()
    }

    /// Whether the report contains any issues at all
    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    /// Whether the report contains blocking issues (errors)
    pub fn has_errors(&self) -> bool {
        self.summary.issues_by_severity.has_blocking()
    }

    /// Get issues of a specific severity
    pub fn issues_by_severity(&self, severity: Severity) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(move |i| i.severity == severity)
    }

    /// Set the number of files checked
    pub fn set_files_checked(&mut self, count: usize) {
        self.summary.files_checked = count;
    }

    pub fn error_count(&self) -> usize {
        self.summary.issues_by_severity.error
    }

    pub fn warning_count(&self) -> usize {
        self.summary.issues_by_severity.warning
    }
}

/// Error types that prevent a validation run from completing
#[derive(Debug, thiserror::Error)]
pub enum LintError {
    /// Configuration file could not be loaded or parsed
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// File could not be read or written
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Glob or regex compilation failed
    #[error("Pattern error: {message}")]
    Pattern { message: String },

    /// Settings document could not be interpreted
    #[error("Settings error: {message}")]
    Settings { message: String },

    /// Validation operation failed
    #[error("Validation error: {message}")]
    Validation { message: String },
}

impl LintError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Wrap an IO error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a pattern error
    pub fn pattern(message: impl Into<String>) -> Self {
        Self::Pattern {
            message: message.into(),
        }
    }

    /// Create a settings error
    pub fn settings(message: impl Into<String>) -> Self {
        Self::Settings {
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

/// Result type for lint operations
pub type LintResult<T> = Result<T, LintError>;
