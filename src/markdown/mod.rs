//! Generic markdown linting independent of the triad front-matter rules
//!
//! CDD Principle: Domain Services - MarkdownLinter applies whitespace, heading, typo and
//! line-length rules to any markdown file
//! - Error-class findings fail a file; warnings are reported but never fail it
//! - Heading rules are suspended inside fenced code and the leading front-matter block
//! - Typo fixing rewrites files atomically before they are linted

pub mod discovery;
pub mod typos;

pub use discovery::MarkdownFilter;
pub use typos::{TypoDictionary, TypoMatch};

use crate::config::MarkdownRules;
use crate::domain::{
    LintError, LintResult, Severity, SourceFile, ValidationIssue, ValidationReport,
};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

const FENCE: &str = "```";

/// Options for one markdown run
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownOptions {
    /// Correct dictionary typos in place before linting
    pub fix_typos: bool,
}

/// Typo replacements applied to one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypoFix {
    pub path: PathBuf,
    pub replacements: usize,
}

/// Outcome of linting a set of markdown files
#[derive(Debug, Clone)]
pub struct MarkdownRun {
    pub report: ValidationReport,
    pub fixes: Vec<TypoFix>,
}

impl MarkdownRun {
    /// Files with at least one error-severity issue
    pub fn files_with_errors(&self) -> usize {
        self.report
            .issues
            .iter()
            .filter(|i| i.is_blocking())
            .map(|i| i.file_path.as_path())
            .collect::<BTreeSet<&Path>>()
            .len()
    }

    pub fn total_replacements(&self) -> usize {
        self.fixes.iter().map(|f| f.replacements).sum()
    }
}

/// Applies the markdown rule set to individual files
#[derive(Debug, Clone)]
pub struct MarkdownLinter {
    max_line_length: usize,
    typos: TypoDictionary,
}

impl MarkdownLinter {
    pub fn new(rules: &MarkdownRules) -> LintResult<Self> {
        Ok(Self {
            max_line_length: rules.max_line_length,
            typos: TypoDictionary::new(&rules.typos)?,
        })
    }

    pub fn typos(&self) -> &TypoDictionary {
        &self.typos
    }

    /// Lint every file in `files`. An empty list is a hard failure.
    pub fn run(&self, files: &[PathBuf], options: MarkdownOptions) -> LintResult<MarkdownRun> {
        if files.is_empty() {
            return Err(LintError::validation("no markdown files found to check"));
        }

        let mut report = ValidationReport::new("markdown");
        let mut fixes = Vec::new();

        for path in files {
            if options.fix_typos {
                let replacements = self.typos.fix_file(path)?;
                if replacements > 0 {
                    fixes.push(TypoFix {
                        path: path.clone(),
                        replacements,
                    });
                }
            }

            let file = SourceFile::read(path)?;
            let issues = self.lint(&file);
            tracing::debug!("{}: {} issue(s)", path.display(), issues.len());
            report.extend(issues);
        }

        report.set_files_checked(files.len());
        Ok(MarkdownRun { report, fixes })
    }

    /// Lint one file
    pub fn lint(&self, file: &SourceFile) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        issues.extend(check_trailing_whitespace(file));
        issues.extend(check_blank_lines(file));
        issues.extend(check_tabs(file));
        issues.extend(self.check_structure(file));
        issues.extend(self.check_typos(file));

        issues
    }

    /// Heading, fence and line-length rules, which share fence and front-matter state
    fn check_structure(&self, file: &SourceFile) -> Vec<ValidationIssue> {
        let lines = file.lines();
        let mut issues = Vec::new();
        let mut long_line: Option<(usize, usize)> = None;

        // Front-matter only counts when the file opens with a delimiter
        let front_matter_end = match lines.first() {
            Some(first) if first == "---" => lines
                .iter()
                .skip(1)
                .position(|l| l == "---")
                .map(|offset| offset + 1),
            _ => None,
        };
        let in_front_matter = |idx: usize| front_matter_end.is_some_and(|end| idx <= end);

        let mut in_fence = false;
        for (idx, line) in lines.iter().enumerate() {
            let line_number = idx + 1;

            if in_front_matter(idx) {
                continue;
            }

            if line.starts_with(FENCE) {
                if !in_fence && line[FENCE.len()..].trim().is_empty() {
                    issues.push(
                        ValidationIssue::style(
                            "fence_language",
                            Severity::Warning,
                            file.path(),
                            "fenced code block has no language",
                        )
                        .at_line(line_number)
                        .with_suggestion("add a language after the opening fence, e.g. ```text"),
                    );
                }
                in_fence = !in_fence;
                continue;
            }

            if in_fence {
                continue;
            }

            if line.starts_with('#') {
                let previous = idx.checked_sub(1).map(|p| (p, lines[p].as_str()));
                issues.extend(check_heading(file, line, line_number, previous, front_matter_end));
            }

            if long_line.is_none() {
                let length = line.chars().count();
                if length > self.max_line_length && !is_table_row(line) && !has_url(line) {
                    long_line = Some((line_number, length));
                }
            }
        }

        if let Some((line_number, length)) = long_line {
            issues.push(
                ValidationIssue::style(
                    "line_length",
                    Severity::Warning,
                    file.path(),
                    format!(
                        "line exceeds {} characters ({} characters)",
                        self.max_line_length, length
                    ),
                )
                .at_line(line_number),
            );
        }

        issues
    }

    fn check_typos(&self, file: &SourceFile) -> Vec<ValidationIssue> {
        self.typos
            .find(file.lines())
            .into_iter()
            .map(|m| {
                let first = m.lines.first().copied().unwrap_or(1);
                ValidationIssue::typo(
                    file.path(),
                    format!(
                        "possible typo {} -> {} on line(s) {}",
                        m.wrong,
                        m.right,
                        join_numbers(&m.lines)
                    ),
                )
                .at_line(first)
                .with_suggestion("run with --fix-typos to correct it in place")
            })
            .collect()
    }
}

fn check_trailing_whitespace(file: &SourceFile) -> Option<ValidationIssue> {
    let offending: Vec<usize> = file
        .lines()
        .iter()
        .enumerate()
        .filter(|(_, line)| {
            let kept = line.trim_end_matches(|c: char| c == ' ' || c == '\t');
            let trailing = &line[kept.len()..];
            // Exactly two spaces is a markdown hard line break
            !trailing.is_empty() && trailing != "  "
        })
        .map(|(idx, _)| idx + 1)
        .collect();

    let first = *offending.first()?;
    Some(
        ValidationIssue::style(
            "trailing_whitespace",
            Severity::Error,
            file.path(),
            format!("trailing whitespace on line(s) {}", join_numbers(&offending)),
        )
        .at_line(first)
        .with_suggestion("strip trailing whitespace; keep exactly two spaces only for line breaks"),
    )
}

fn check_blank_lines(file: &SourceFile) -> Option<ValidationIssue> {
    let lines = file.lines();
    let second_blank = (1..lines.len())
        .find(|&idx| lines[idx].trim().is_empty() && lines[idx - 1].trim().is_empty())?;

    Some(
        ValidationIssue::style(
            "consecutive_blank_lines",
            Severity::Error,
            file.path(),
            "multiple consecutive blank lines",
        )
        .at_line(second_blank + 1),
    )
}

fn check_tabs(file: &SourceFile) -> Option<ValidationIssue> {
    let idx = file.lines().iter().position(|l| l.contains('\t'))?;
    Some(
        ValidationIssue::style("tab", Severity::Error, file.path(), "tab character found")
            .at_line(idx + 1)
            .with_suggestion("indent with spaces"),
    )
}

fn check_heading(
    file: &SourceFile,
    line: &str,
    line_number: usize,
    previous: Option<(usize, &str)>,
    front_matter_end: Option<usize>,
) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let rest = line.trim_start_matches('#');

    if !rest.starts_with(' ') {
        issues.push(
            ValidationIssue::style(
                "heading_space",
                Severity::Error,
                file.path(),
                "no space after # in heading",
            )
            .at_line(line_number),
        );
        return issues;
    }

    if rest.starts_with("  ") {
        issues.push(
            ValidationIssue::style(
                "heading_multiple_spaces",
                Severity::Error,
                file.path(),
                "multiple spaces after #",
            )
            .at_line(line_number),
        );
    }

    if rest.trim_end().ends_with(['.', ',', ';', ':']) {
        issues.push(
            ValidationIssue::style(
                "heading_punctuation",
                Severity::Error,
                file.path(),
                "heading ends with punctuation",
            )
            .at_line(line_number),
        );
    }

    if let Some((prev_idx, prev)) = previous {
        let after_front_matter = front_matter_end == Some(prev_idx);
        if !prev.trim().is_empty() && !after_front_matter && !is_html_comment(prev) {
            issues.push(
                ValidationIssue::style(
                    "heading_blank_lines",
                    Severity::Warning,
                    file.path(),
                    "heading not surrounded by blank lines",
                )
                .at_line(line_number),
            );
        }
    }

    issues
}

fn is_html_comment(line: &str) -> bool {
    let line = line.trim();
    line.starts_with("<!--") || line.ends_with("-->")
}

fn is_table_row(line: &str) -> bool {
    line.trim_start().starts_with('|')
}

fn has_url(line: &str) -> bool {
    line.contains("http://") || line.contains("https://")
}

fn join_numbers(numbers: &[usize]) -> String {
    numbers
        .iter()
        .map(usize::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::fs;
    use tempfile::TempDir;

    fn linter() -> MarkdownLinter {
        MarkdownLinter::new(&MarkdownRules::default()).unwrap()
    }

    fn lint(text: &str) -> Vec<ValidationIssue> {
        linter().lint(&SourceFile::from_text("doc.md", text))
    }

    fn rule_ids(text: &str) -> Vec<String> {
        lint(text).into_iter().map(|i| i.rule_id).collect()
    }

    #[test]
    fn test_clean_document() {
        let text = "---\ntitle: x\n---\n# Title\n\nSome text.  \nNext line.\n\n```rust\nfn main() {}\n```\n";
        assert!(lint(text).is_empty(), "{:?}", lint(text));
    }

    #[rstest]
    #[case::one_space("text \n", true)]
    #[case::two_spaces("text  \n", false)]
    #[case::three_spaces("text   \n", true)]
    #[case::trailing_tab("text\t\n", true)]
    #[case::none("text\n", false)]
    fn test_trailing_whitespace(#[case] text: &str, #[case] expected: bool) {
        let found = rule_ids(text).iter().any(|id| id == "trailing_whitespace");
        assert_eq!(found, expected);
    }

    #[test]
    fn test_trailing_whitespace_reported_once_with_lines() {
        let issues: Vec<_> = lint("a \nb\nc \n")
            .into_iter()
            .filter(|i| i.rule_id == "trailing_whitespace")
            .collect();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].message, "trailing whitespace on line(s) 1, 3");
        assert_eq!(issues[0].severity, Severity::Error);
    }

    #[test]
    fn test_consecutive_blank_lines() {
        let issues: Vec<_> = lint("a\n\n\nb\n\n\nc\n")
            .into_iter()
            .filter(|i| i.rule_id == "consecutive_blank_lines")
            .collect();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].line_number, Some(3));
    }

    #[test]
    fn test_tab_reported_once() {
        let issues: Vec<_> = lint("a\tb\nc\td\n")
            .into_iter()
            .filter(|i| i.rule_id == "tab")
            .collect();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].line_number, Some(1));
    }

    #[rstest]
    #[case::no_space("#Title\n", "heading_space")]
    #[case::no_space_h2("##Title\n", "heading_space")]
    #[case::multiple_spaces("##  Title\n", "heading_multiple_spaces")]
    #[case::period("# Title.\n", "heading_punctuation")]
    #[case::comma("# Title,\n", "heading_punctuation")]
    #[case::semicolon("# Title;\n", "heading_punctuation")]
    #[case::colon("# Title:\n", "heading_punctuation")]
    fn test_heading_errors(#[case] text: &str, #[case] expected: &str) {
        let issues = lint(text);
        assert_eq!(issues.len(), 1, "{issues:?}");
        assert_eq!(issues[0].rule_id, expected);
        assert_eq!(issues[0].severity, Severity::Error);
    }

    #[rstest]
    #[case("# Why?\n")]
    #[case("# Done!\n")]
    fn test_heading_question_and_exclamation_allowed(#[case] text: &str) {
        assert!(lint(text).is_empty());
    }

    #[test]
    fn test_heading_without_blank_line_is_warning() {
        let issues = lint("Intro text\n# Title\n");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].rule_id, "heading_blank_lines");
        assert_eq!(issues[0].severity, Severity::Warning);
        assert_eq!(issues[0].line_number, Some(2));
    }

    #[test]
    fn test_heading_after_front_matter_or_comment_is_fine() {
        assert!(lint("---\ndescription: x\n---\n# Title\n").is_empty());
        assert!(lint("<!-- memory-bank/prompts/a.prompt.md -->\n# Title\n").is_empty());
    }

    #[test]
    fn test_headings_ignored_in_code_and_front_matter() {
        let text = "---\n#tag: x\n---\n\n```bash\n#!/bin/sh\n#comment.\n```\n";
        assert!(lint(text).is_empty(), "{:?}", lint(text));
    }

    #[test]
    fn test_horizontal_rules_are_not_front_matter() {
        // Only a block opening on the first line suspends heading checks
        let text = "# Title\n\n---\n\n#bad\n\n---\n";
        assert_eq!(rule_ids(text), vec!["heading_space"]);
    }

    #[test]
    fn test_bare_fence_warns_on_opener_only() {
        let issues = lint("```\ncode\n```\n");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].rule_id, "fence_language");
        assert_eq!(issues[0].line_number, Some(1));
    }

    #[test]
    fn test_long_line_reported_once() {
        let long = "word ".repeat(30);
        let text = format!("{}\n{}\n", long.trim_end(), long.trim_end());
        let issues: Vec<_> = lint(&text)
            .into_iter()
            .filter(|i| i.rule_id == "line_length")
            .collect();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].line_number, Some(1));
        assert_eq!(issues[0].severity, Severity::Warning);
    }

    #[rstest]
    #[case::table(format!("| {} |", "x".repeat(130)))]
    #[case::url(format!("see https://example.com/{}", "x".repeat(130)))]
    #[case::code(format!("```text\n{}\n```", "x".repeat(130)))]
    fn test_long_line_exemptions(#[case] text: String) {
        assert!(!rule_ids(&text).iter().any(|id| id == "line_length"));
    }

    #[test]
    fn test_typo_warning_names_correction() {
        let issues = lint("This is teh plan.\n");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Warning);
        assert!(issues[0].message.contains("teh -> the"));
    }

    #[test]
    fn test_fix_typos_then_relint_is_clean() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.md");
        fs::write(&path, "# Notes\n\nTeh result occured.\n").unwrap();
        let linter = linter();

        let before = linter.run(&[path.clone()], MarkdownOptions::default()).unwrap();
        assert_eq!(before.report.warning_count(), 2);

        let fixed = linter.run(&[path.clone()], MarkdownOptions { fix_typos: true }).unwrap();
        assert_eq!(fixed.total_replacements(), 2);
        assert_eq!(fixed.report.warning_count(), 0);
        assert_eq!(fs::read_to_string(&path).unwrap(), "# Notes\n\nThe result occurred.\n");

        let again = linter.run(&[path.clone()], MarkdownOptions { fix_typos: true }).unwrap();
        assert!(again.fixes.is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), "# Notes\n\nThe result occurred.\n");
    }

    #[test]
    fn test_run_counts_files_with_errors() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("good.md");
        let bad = dir.path().join("bad.md");
        fs::write(&good, "# Good\n\nteh\n").unwrap();
        fs::write(&bad, "#Bad \n").unwrap();

        let run = linter().run(&[good, bad], MarkdownOptions::default()).unwrap();
        assert_eq!(run.report.summary.files_checked, 2);
        assert_eq!(run.files_with_errors(), 1);
        assert!(!run.report.passed());
    }

    #[test]
    fn test_run_without_files_fails() {
        assert!(linter().run(&[], MarkdownOptions::default()).is_err());
    }
}
