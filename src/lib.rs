//! Memory Bank Lint - convention checks for memory-bank markdown files
//!
//! Architecture: Clean Architecture - Library interface serves as the application layer
//! - Validators, the markdown linter and the health check are pure domain services
//! - Linter binds them to a repository root and a validated configuration
//! - The CLI only parses arguments, formats results and maps them to exit codes

pub mod commands;
pub mod config;
pub mod domain;
pub mod frontmatter;
pub mod health;
pub mod io;
pub mod markdown;
pub mod report;
pub mod validators;

// Re-export main types for convenient access
pub use domain::{
    IssueClass, IssueCounts, LintError, LintResult, Severity, SourceFile, ValidationIssue,
    ValidationReport, ValidationSummary,
};

pub use config::{AllowList, LintConfig, SettingsRequirement};

pub use frontmatter::{FrontMatter, FrontMatterParser, ParseMode};

pub use validators::{ChatmodeValidator, FileValidator, InstructionValidator, PromptValidator};

pub use markdown::{MarkdownFilter, MarkdownLinter, MarkdownOptions, MarkdownRun};

pub use health::HealthReport;

pub use commands::SlashCommand;

pub use report::{OutputFormat, ReportFormatter, ReportOptions};

use std::path::{Path, PathBuf};

/// Entry point binding every check to one repository root
#[derive(Debug, Clone)]
pub struct Linter {
    root: PathBuf,
    config: LintConfig,
}

impl Linter {
    /// Create a linter for `root` with the given configuration
    pub fn new(root: impl Into<PathBuf>, config: LintConfig) -> LintResult<Self> {
        config.validate()?;
        Ok(Self {
            root: root.into(),
            config,
        })
    }

    /// Create a linter for `root`, loading `config_path` or the first default config file found
    pub fn discover(root: impl Into<PathBuf>, config_path: Option<&Path>) -> LintResult<Self> {
        let root = root.into();
        let config = LintConfig::discover(&root, config_path)?;
        Self::new(root, config)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &LintConfig {
        &self.config
    }

    /// Validate `*.instructions.md` files in `dir`, or the configured directory
    pub fn check_instructions(&self, dir: Option<&Path>) -> LintResult<ValidationReport> {
        let validator = InstructionValidator::new(&self.config.instructions)?;
        let dir = self.resolve_dir(dir, &self.config.paths.instructions_dir);
        validators::validate_directory(&validator, &dir)
    }

    /// Validate `*.chatmode.md` files in `dir`, or the configured directory
    pub fn check_chatmodes(&self, dir: Option<&Path>) -> LintResult<ValidationReport> {
        let validator = ChatmodeValidator::new(&self.config.chatmodes);
        let dir = self.resolve_dir(dir, &self.config.paths.chatmodes_dir);
        validators::validate_directory(&validator, &dir)
    }

    /// Validate `*.prompt.md` files in `dir`, or the configured directory
    pub fn check_prompts(&self, dir: Option<&Path>) -> LintResult<ValidationReport> {
        let validator = PromptValidator::new(&self.config.prompts);
        let dir = self.resolve_dir(dir, &self.config.paths.prompts_dir);
        validators::validate_directory(&validator, &dir)
    }

    /// Lint markdown files under `paths`, or under the root when `paths` is empty.
    ///
    /// `extra_excludes` are applied after the configured exclude patterns.
    /// Finding no markdown file at all is an error.
    pub fn lint_markdown(
        &self,
        paths: &[PathBuf],
        extra_excludes: &[String],
        options: MarkdownOptions,
    ) -> LintResult<MarkdownRun> {
        let rules = &self.config.markdown;
        let mut filter = MarkdownFilter::new(&rules.exclude, rules.ignore_file.clone())?;
        for pattern in extra_excludes {
            filter.add_pattern(pattern)?;
        }

        let files = if paths.is_empty() {
            filter.find_files(&self.root)?
        } else {
            filter.collect(paths)?
        };

        let run = MarkdownLinter::new(rules)?.run(&files, options)?;
        tracing::info!(
            "Linted {} markdown file(s): {} error(s), {} warning(s)",
            files.len(),
            run.report.error_count(),
            run.report.warning_count()
        );
        Ok(run)
    }

    /// Run the triad health check
    pub fn health(&self) -> LintResult<HealthReport> {
        health::check(&self.root, &self.config)
    }

    /// List slash commands from prompt files in `dir`, or the configured directory
    pub fn slash_commands(&self, dir: Option<&Path>) -> LintResult<Vec<SlashCommand>> {
        let dir = self.resolve_dir(dir, &self.config.paths.prompts_dir);
        commands::list(&dir, &self.config.prompts)
    }

    fn resolve_dir(&self, explicit: Option<&Path>, configured: &Path) -> PathBuf {
        match explicit {
            Some(dir) => dir.to_path_buf(),
            None => self.root.join(configured),
        }
    }
}
