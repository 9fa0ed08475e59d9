//! Memory Bank Lint CLI - command-line interface for memory-bank convention checks
//!
//! CDD Principle: Application Layer - CLI coordinates user interactions with domain services
//! - Translates user commands to Linter operations
//! - Handles external concerns like process exit codes and terminal output
//! - Findings go to stdout, logs and fatal errors to stderr

use clap::{Parser, Subcommand, ValueEnum};
use memory_bank_lint::{
    LintConfig, LintResult, Linter, MarkdownOptions, OutputFormat, ReportFormatter,
    ReportOptions, ValidationReport,
};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

/// Memory Bank Lint - convention checks for memory-bank markdown files
#[derive(Parser)]
#[command(name = "memory-bank-lint")]
#[command(version)]
#[command(about = "Validate memory-bank instruction, chatmode and prompt files and lint markdown")]
#[command(long_about = "Memory Bank Lint checks the front-matter and layout conventions of memory-bank instruction, chatmode and prompt files, lints markdown style and typos, and verifies that editor settings point at the memory-bank directories.")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Repository root the configured paths are relative to
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "human")]
    format: OutputFormatArg,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Validate *.instructions.md files
    Instructions {
        /// Directory to scan instead of the configured one
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Validate *.chatmode.md files
    Chatmodes {
        /// Directory to scan instead of the configured one
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Validate *.prompt.md files
    Prompts {
        /// Directory to scan instead of the configured one
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Lint markdown style and typos
    Markdown {
        /// Files or directories to lint (defaults to the root)
        paths: Vec<PathBuf>,

        /// Correct dictionary typos in place before linting
        #[arg(long)]
        fix_typos: bool,

        /// Report findings without remediation tips
        #[arg(long)]
        check_only: bool,

        /// Additional exclude patterns
        #[arg(long, action = clap::ArgAction::Append)]
        exclude: Vec<String>,
    },

    /// Run all triad validators and check editor settings
    Health,

    /// List slash commands declared in prompt files
    Commands {
        /// Directory to scan instead of the configured one
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Validate configuration file
    ValidateConfig {
        /// Configuration file to validate
        config_file: Option<PathBuf>,
    },
}

#[derive(Copy, Clone, ValueEnum, PartialEq)]
enum OutputFormatArg {
    Human,
    Json,
    Github,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Human => OutputFormat::Human,
            OutputFormatArg::Json => OutputFormat::Json,
            OutputFormatArg::Github => OutputFormat::GitHub,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.format == OutputFormatArg::Json);

    match run_command(cli) {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}

fn run_command(cli: Cli) -> LintResult<i32> {
    let format: OutputFormat = cli.format.into();

    if let Command::ValidateConfig { config_file } = &cli.command {
        return run_validate_config(config_file.clone().or(cli.config), &cli.root);
    }

    let linter = Linter::discover(&cli.root, cli.config.as_deref())?;
    let formatter = ReportFormatter::new(ReportOptions {
        use_colors: !cli.no_color,
        show_suggestions: !matches!(cli.command, Command::Markdown { check_only: true, .. }),
    });

    match cli.command {
        Command::Instructions { dir } => {
            let report = linter.check_instructions(dir.as_deref())?;
            print_report(&formatter, &report, format)
        }
        Command::Chatmodes { dir } => {
            let report = linter.check_chatmodes(dir.as_deref())?;
            print_report(&formatter, &report, format)
        }
        Command::Prompts { dir } => {
            let report = linter.check_prompts(dir.as_deref())?;
            print_report(&formatter, &report, format)
        }
        Command::Markdown {
            paths,
            fix_typos,
            check_only: _,
            exclude,
        } => {
            let run = linter.lint_markdown(&paths, &exclude, MarkdownOptions { fix_typos })?;
            print!("{}", formatter.format_markdown_run(&run, format)?);
            // Warnings alone never fail the run
            Ok(if run.report.has_errors() { 1 } else { 0 })
        }
        Command::Health => {
            let health = linter.health()?;
            print!("{}", formatter.format_health(&health, format)?);
            Ok(if health.passed() { 0 } else { 1 })
        }
        Command::Commands { dir } => {
            let commands = linter.slash_commands(dir.as_deref())?;
            print!("{}", formatter.format_commands(&commands, format)?);
            Ok(0)
        }
        Command::ValidateConfig { .. } => Ok(0),
    }
}

fn print_report(
    formatter: &ReportFormatter,
    report: &ValidationReport,
    format: OutputFormat,
) -> LintResult<i32> {
    print!("{}", formatter.format_report(report, format)?);
    Ok(if report.passed() { 0 } else { 1 })
}

fn run_validate_config(config_path: Option<PathBuf>, root: &Path) -> LintResult<i32> {
    let loaded = match &config_path {
        Some(path) => {
            println!("Validating configuration: {}", path.display());
            LintConfig::load_from_file(path)
        }
        None => {
            println!("Validating configuration under {}", root.display());
            LintConfig::discover(root, None)
        }
    };

    match loaded {
        Ok(config) => {
            println!("[OK] Configuration is valid");
            println!("Configuration summary:");
            println!(
                "  Directories: {}, {}, {}",
                config.paths.instructions_dir.display(),
                config.paths.chatmodes_dir.display(),
                config.paths.prompts_dir.display()
            );
            println!("  Allowed chatmode models: {}", config.chatmodes.allowed_models.len());
            println!("  Allowed prompt keys: {}", config.prompts.allowed_keys.join(", "));
            println!("  Typo dictionary entries: {}", config.markdown.typos.len());
            println!("  Max line length: {}", config.markdown.max_line_length);
            println!("  Settings requirements: {}", config.settings.requirements.len());
            Ok(0)
        }
        Err(e) => {
            eprintln!("[FAIL] Configuration validation failed: {e}");
            Ok(1)
        }
    }
}

fn init_logging(verbose: bool, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
