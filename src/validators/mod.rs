//! Triad validators for instruction, chatmode and prompt files
//!
//! CDD Principle: Domain Services - each validator owns the rules for one file convention
//! - Validators implement FileValidator and never depend on each other's output
//! - Directory discovery is shared; a missing directory yields an empty, passing report
//! - Findings become ValidationIssues; only unreadable files abort a run

pub mod chatmode;
pub mod instruction;
pub mod prompt;

pub use chatmode::ChatmodeValidator;
pub use instruction::InstructionValidator;
pub use prompt::PromptValidator;

use crate::domain::{LintError, LintResult, SourceFile, ValidationIssue, ValidationReport};
use lazy_static::lazy_static;
use regex::Regex;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

lazy_static! {
    /// Schemes that count as external links for instruction and chatmode files
    static ref EXTERNAL_LINK: Regex =
        Regex::new(r"https://|http://|ftp://").expect("static external link regex");
    /// Prompt files only forbid web links
    static ref WEB_LINK: Regex = Regex::new(r"https?://").expect("static web link regex");
    /// Any URI with a scheme separator
    static ref ANY_URI: Regex = Regex::new(r"://[^\s)]+").expect("static uri regex");
}

/// Trait implemented by every triad validator
pub trait FileValidator {
    /// Short name used in reports, e.g. `instructions`
    fn name(&self) -> &'static str;

    /// File-name suffix selecting the files this validator checks
    fn suffix(&self) -> &str;

    /// Check one file and return every issue found
    fn validate(&self, file: &SourceFile) -> Vec<ValidationIssue>;
}

/// Files directly inside `dir` whose names end with `suffix`, sorted by path
pub fn discover_files(dir: &Path, suffix: &str) -> LintResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        tracing::warn!("Directory {} does not exist", dir.display());
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(false) {
        let entry = entry.map_err(|e| {
            LintError::validation(format!("Failed to list {}: {e}", dir.display()))
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        if entry.file_name().to_string_lossy().ends_with(suffix) {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}

/// Run `validator` over every matching file in `dir`
pub fn validate_directory(
    validator: &dyn FileValidator,
    dir: &Path,
) -> LintResult<ValidationReport> {
    let files = discover_files(dir, validator.suffix())?;
    let mut report = ValidationReport::new(validator.name());

    tracing::debug!(
        "Validating {} {} file(s) in {}",
        files.len(),
        validator.name(),
        dir.display()
    );

    for path in &files {
        let file = SourceFile::read(path)?;
        let issues = validator.validate(&file);
        tracing::debug!("{}: {} issue(s)", path.display(), issues.len());
        report.extend(issues);
    }

    report.set_files_checked(files.len());
    Ok(report)
}

pub(crate) fn has_external_link(text: &str) -> bool {
    EXTERNAL_LINK.is_match(text)
}

pub(crate) fn has_web_link(text: &str) -> bool {
    WEB_LINK.is_match(text)
}

pub(crate) fn has_any_uri(text: &str) -> bool {
    ANY_URI.is_match(text)
}
