//! Instruction file checks: description header and external links

use crate::config::{AllowList, InstructionRules};
use crate::domain::{LintResult, SourceFile, ValidationIssue};
use crate::frontmatter::FrontMatterParser;
use crate::validators::{has_external_link, FileValidator};

/// Validates `*.instructions.md` files
#[derive(Debug, Clone)]
pub struct InstructionValidator {
    suffix: String,
    allow_list: AllowList,
    parser: FrontMatterParser,
}

impl InstructionValidator {
    pub fn new(rules: &InstructionRules) -> LintResult<Self> {
        Ok(Self {
            suffix: rules.suffix.clone(),
            allow_list: AllowList::new(&rules.link_allow_list)?,
            // Malformed blocks still get the description check
            parser: FrontMatterParser::lenient(),
        })
    }
}

impl FileValidator for InstructionValidator {
    fn name(&self) -> &'static str {
        "instructions"
    }

    fn suffix(&self) -> &str {
        &self.suffix
    }

    fn validate(&self, file: &SourceFile) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        let has_description = self
            .parser
            .parse(file.lines())
            .map(|parsed| parsed.front_matter.contains_key("description"))
            .unwrap_or(false);

        if !has_description {
            issues.push(
                ValidationIssue::structural(
                    "missing_description",
                    file.path(),
                    "missing description header",
                )
                .with_suggestion("add a 'description:' line to the front-matter"),
            );
        }

        if !self.allow_list.covers(file.path()) && has_external_link(file.raw()) {
            issues.push(
                ValidationIssue::policy(
                    "external_link",
                    file.path(),
                    "external links are not allowed",
                )
                .with_suggestion("replace the URL with a relative link into the repository"),
            );
        }

        issues
    }
}
