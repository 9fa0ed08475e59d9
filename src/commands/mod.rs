//! Slash-command listing over the prompt files

use crate::config::PromptRules;
use crate::domain::{LintError, LintResult, SourceFile};
use crate::validators::discover_files;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// A `## Slash Command: <command> <summary>` heading
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlashCommand {
    pub command: String,
    pub summary: Option<String>,
    pub file: PathBuf,
    pub line_number: usize,
}

/// Commands declared in one prompt file, in file order
pub fn extract(file: &SourceFile, rules: &PromptRules) -> Vec<SlashCommand> {
    file.lines()
        .iter()
        .enumerate()
        .filter_map(|(idx, line)| {
            let rest = line.strip_prefix(&rules.slash_command_prefix)?.trim();
            let (command, summary) = match rest.split_once(char::is_whitespace) {
                Some((command, summary)) => (command, Some(summary.trim().to_string())),
                None => (rest, None),
            };
            if command.is_empty() {
                return None;
            }

            Some(SlashCommand {
                command: command.to_string(),
                summary: summary.filter(|s| !s.is_empty()),
                file: file.path().to_path_buf(),
                line_number: idx + 1,
            })
        })
        .collect()
}

/// Every slash command in the prompt files of `dir`.
///
/// Finding nothing is an error: an empty listing means the prompts
/// directory is missing or no prompt declares a command.
pub fn list(dir: &Path, rules: &PromptRules) -> LintResult<Vec<SlashCommand>> {
    let mut commands = Vec::new();

    for path in discover_files(dir, &rules.suffix)? {
        let file = SourceFile::read(&path)?;
        commands.extend(extract(&file, rules));
    }

    if commands.is_empty() {
        return Err(LintError::validation(format!(
            "no slash commands found in {}",
            dir.display()
        )));
    }

    tracing::debug!("Found {} slash command(s) in {}", commands.len(), dir.display());
    Ok(commands)
}
