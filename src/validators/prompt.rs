//! Prompt file checks: strict layout from front-matter down to the first slash command

use crate::config::PromptRules;
use crate::domain::{SourceFile, ValidationIssue};
use crate::frontmatter::FrontMatterParser;
use crate::validators::{has_web_link, FileValidator};

/// Validates `*.prompt.md` files
///
/// Layout after the front-matter is checked line by line; the first
/// failing step stops the layout walk. The link scan always runs.
#[derive(Debug, Clone)]
pub struct PromptValidator {
    rules: PromptRules,
    parser: FrontMatterParser,
}

fn is_blank(line: Option<&String>) -> bool {
    line.is_some_and(|l| l.trim().is_empty())
}

impl PromptValidator {
    pub fn new(rules: &PromptRules) -> Self {
        Self {
            rules: rules.clone(),
            parser: FrontMatterParser::strict(),
        }
    }

    /// The marker comment expected on the second line after the front-matter
    pub fn expected_marker(&self, file_name: &str) -> String {
        format!("<!-- {}{} -->", self.rules.marker_prefix, file_name)
    }

    fn check_layout(&self, file: &SourceFile, body_start: usize) -> Option<ValidationIssue> {
        let lines = file.lines();
        let mut idx = body_start;

        if !is_blank(lines.get(idx)) {
            return Some(
                ValidationIssue::structural(
                    "blank_after_front_matter",
                    file.path(),
                    "expected blank line after front-matter",
                )
                .at_line(idx + 1),
            );
        }
        idx += 1;

        let marker = self.expected_marker(&file.file_name());
        if lines.get(idx).map(String::as_str) != Some(marker.as_str()) {
            return Some(
                ValidationIssue::structural(
                    "path_marker",
                    file.path(),
                    "missing or incorrect path marker comment",
                )
                .at_line(idx + 1)
                .with_suggestion(format!("the line must read exactly: {marker}")),
            );
        }
        idx += 1;

        if !is_blank(lines.get(idx)) {
            return Some(
                ValidationIssue::structural(
                    "blank_after_marker",
                    file.path(),
                    "expected blank line after path marker comment",
                )
                .at_line(idx + 1),
            );
        }
        idx += 1;

        if !lines.get(idx).is_some_and(|l| l.starts_with("# ")) {
            return Some(
                ValidationIssue::structural(
                    "h1_title",
                    file.path(),
                    "expected H1 title immediately after marker block",
                )
                .at_line(idx + 1),
            );
        }

        let first_h2 = lines
            .iter()
            .enumerate()
            .skip(idx + 1)
            .find(|(_, l)| l.starts_with("## "));

        match first_h2 {
            None => Some(
                ValidationIssue::structural(
                    "slash_command_section",
                    file.path(),
                    "missing Slash Command section",
                )
                .with_suggestion(format!(
                    "add a '{}/<command>' heading",
                    self.rules.slash_command_prefix
                )),
            ),
            Some((h2_idx, line)) if !line.starts_with(&self.rules.slash_command_prefix) => Some(
                ValidationIssue::structural(
                    "slash_command_first",
                    file.path(),
                    "first H2 must be a Slash Command section",
                )
                .at_line(h2_idx + 1),
            ),
            Some(_) => None,
        }
    }
}

impl FileValidator for PromptValidator {
    fn name(&self) -> &'static str {
        "prompts"
    }

    fn suffix(&self) -> &str {
        &self.rules.suffix
    }

    fn validate(&self, file: &SourceFile) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        match self.parser.parse(file.lines()) {
            Ok(parsed) => {
                for key in parsed.front_matter.keys() {
                    if !self.rules.allowed_keys.iter().any(|k| k == key) {
                        issues.push(
                            ValidationIssue::policy(
                                "front_matter_key",
                                file.path(),
                                format!("disallowed front-matter key '{key}'"),
                            )
                            .with_suggestion(format!(
                                "allowed keys: {}",
                                self.rules.allowed_keys.join(", ")
                            )),
                        );
                    }
                }

                issues.extend(self.check_layout(file, parsed.body_start));
            }
            Err(e) => {
                issues.push(ValidationIssue::structural("front_matter", file.path(), e.to_string()));
            }
        }

        if has_web_link(file.raw()) {
            issues.push(ValidationIssue::policy(
                "external_link",
                file.path(),
                "external links are not allowed",
            ));
        }

        issues
    }
}
