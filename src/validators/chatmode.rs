//! Chatmode file checks: front-matter fields, a single H1 and link restrictions

use crate::config::ChatmodeRules;
use crate::domain::{SourceFile, ValidationIssue};
use crate::frontmatter::{FrontMatter, FrontMatterParser};
use crate::validators::{has_any_uri, has_external_link, FileValidator};

/// Validates `*.chatmode.md` files
#[derive(Debug, Clone)]
pub struct ChatmodeValidator {
    rules: ChatmodeRules,
    parser: FrontMatterParser,
}

impl ChatmodeValidator {
    pub fn new(rules: &ChatmodeRules) -> Self {
        Self {
            rules: rules.clone(),
            parser: FrontMatterParser::strict(),
        }
    }

    fn check_fields(&self, file: &SourceFile, front_matter: &FrontMatter) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        if !front_matter.contains_key("description") {
            issues.push(ValidationIssue::structural(
                "missing_description",
                file.path(),
                "missing description",
            ));
        }

        match front_matter.get("model") {
            None => issues.push(ValidationIssue::structural(
                "missing_model",
                file.path(),
                "missing model",
            )),
            Some(model) if !self.rules.allowed_models.iter().any(|m| m == model) => {
                issues.push(
                    ValidationIssue::policy(
                        "model_not_allowed",
                        file.path(),
                        format!("model '{model}' is not allowed"),
                    )
                    .with_suggestion(format!(
                        "use one of: {}",
                        self.rules.allowed_models.join(", ")
                    )),
                );
            }
            Some(_) => {}
        }

        match front_matter.get("tools") {
            None => issues.push(
                ValidationIssue::structural("missing_tools", file.path(), "missing tools")
                    .with_suggestion(format!("add 'tools: {}'", self.rules.expected_tools)),
            ),
            Some(tools) if tools != self.rules.expected_tools => issues.push(
                ValidationIssue::policy(
                    "tools_mismatch",
                    file.path(),
                    format!(
                        "tools mismatch: expected {}, found {}",
                        self.rules.expected_tools, tools
                    ),
                ),
            ),
            Some(_) => {}
        }

        issues
    }
}

impl FileValidator for ChatmodeValidator {
    fn name(&self) -> &'static str {
        "chatmodes"
    }

    fn suffix(&self) -> &str {
        &self.rules.suffix
    }

    fn validate(&self, file: &SourceFile) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        let front_matter = match self.parser.parse(file.lines()) {
            Ok(parsed) => parsed.front_matter,
            Err(e) => {
                issues.push(ValidationIssue::structural("front_matter", file.path(), e.to_string()));
                FrontMatter::default()
            }
        };

        issues.extend(self.check_fields(file, &front_matter));

        let h1_count = file.lines().iter().filter(|l| l.starts_with("# ")).count();
        if h1_count != 1 {
            issues.push(ValidationIssue::structural(
                "h1_count",
                file.path(),
                format!("expected exactly one top-level heading, found {h1_count}"),
            ));
        }

        if has_external_link(file.raw()) {
            issues.push(ValidationIssue::policy(
                "external_link",
                file.path(),
                "external links are not allowed",
            ));
        }

        if has_any_uri(file.raw()) {
            issues.push(
                ValidationIssue::policy("relative_links", file.path(), "links must be relative")
                    .with_suggestion("link to files inside the repository with relative paths"),
            );
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD: &str = "---\n\
description: Architect mode\n\
model: GPT-5 (Preview)\n\
tools: ['codebase', 'editFiles', 'fetch']\n\
---\n\
\n\
# Architect\n\
\n\
Plan the work. See [layers](../instructions/layer-1.instructions.md).\n";

    fn validate(text: &str) -> Vec<ValidationIssue> {
        ChatmodeValidator::new(&ChatmodeRules::default())
            .validate(&SourceFile::from_text("architect.chatmode.md", text))
    }

    fn rule_ids(text: &str) -> Vec<String> {
        validate(text).into_iter().map(|i| i.rule_id).collect()
    }

    #[test]
    fn test_good_file_has_no_issues_and_is_idempotent() {
        let first = validate(GOOD);
        let second = validate(GOOD);
        assert!(first.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn test_two_h1_reports_count() {
        let text = format!("{GOOD}\n# Second\n");
        let issues = validate(&text);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].rule_id, "h1_count");
        assert!(issues[0].message.contains('2'));
    }

    #[test]
    fn test_zero_h1_reports_count() {
        let text = GOOD.replace("# Architect", "## Architect");
        let issues = validate(&text);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.ends_with("found 0"));
    }

    #[test]
    fn test_model_missing_vs_not_allowed() {
        let missing = GOOD.replace("model: GPT-5 (Preview)\n", "");
        assert_eq!(rule_ids(&missing), vec!["missing_model"]);

        let wrong = GOOD.replace("GPT-5 (Preview)", "GPT-5");
        let issues = validate(&wrong);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].message, "model 'GPT-5' is not allowed");
    }

    #[test]
    fn test_tools_must_match_byte_for_byte() {
        let missing = GOOD.replace("tools: ['codebase', 'editFiles', 'fetch']\n", "");
        assert_eq!(rule_ids(&missing), vec!["missing_tools"]);

        let spacing = GOOD.replace("'editFiles', 'fetch'", "'editFiles','fetch'");
        assert_eq!(rule_ids(&spacing), vec!["tools_mismatch"]);

        let quotes = GOOD.replace("['codebase', 'editFiles', 'fetch']", "[\"codebase\", \"editFiles\", \"fetch\"]");
        assert_eq!(rule_ids(&quotes), vec!["tools_mismatch"]);
    }

    #[test]
    fn test_missing_description() {
        let text = GOOD.replace("description: Architect mode\n", "");
        assert_eq!(rule_ids(&text), vec!["missing_description"]);
    }

    #[test]
    fn test_web_link_reports_both_link_rules() {
        let text = format!("{GOOD}See https://example.com for more.\n");
        assert_eq!(rule_ids(&text), vec!["external_link", "relative_links"]);
    }

    #[test]
    fn test_other_scheme_only_requires_relative_links() {
        let text = format!("{GOOD}Open vscode://settings/editor.\n");
        assert_eq!(rule_ids(&text), vec!["relative_links"]);
    }

    #[test]
    fn test_unclosed_front_matter_accumulates_issues() {
        let text = "---\ndescription: x\nmodel: GPT-4.1\n# Title\n";
        let ids = rule_ids(text);
        assert_eq!(
            ids,
            vec!["front_matter", "missing_description", "missing_model", "missing_tools"]
        );
    }

    #[test]
    fn test_front_matter_parsing_stops_at_first_close() {
        let text = GOOD.replace("---\n\n# Architect", "---\nmodel: bogus\n---\n\n# Architect");
        assert!(validate(&text).is_empty());
    }
}
