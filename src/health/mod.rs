//! Triad health check: the three validators plus the editor settings document
//!
//! Architecture: Aggregator - TriadHealth combines independent results without re-interpreting them
//! - Each validator runs against its own directory and reports pass or fail
//! - File counts per suffix are informational only
//! - Settings requirements are checked separately; a missing file fails every requirement

use crate::config::{LintConfig, SettingsRequirement};
use crate::domain::{LintError, LintResult, ValidationReport};
use crate::validators::{
    validate_directory, ChatmodeValidator, FileValidator, InstructionValidator, PromptValidator,
};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::fs;
use std::path::{Path, PathBuf};

/// Pass/fail and file count for one triad directory
#[derive(Debug, Clone, Serialize)]
pub struct TriadStatus {
    pub name: String,
    pub directory: PathBuf,
    pub files: usize,
    pub passed: bool,
    #[serde(skip)]
    pub report: ValidationReport,
}

/// Outcome of one settings requirement
#[derive(Debug, Clone, Serialize)]
pub struct SettingsCheck {
    pub requirement: String,
    pub satisfied: bool,
    pub message: String,
}

/// Combined health of the triad directories and the settings file
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub triads: Vec<TriadStatus>,
    pub settings_file: PathBuf,
    pub settings: Vec<SettingsCheck>,
}

impl HealthReport {
    /// Fails when any validator failed or any settings requirement is unmet
    pub fn passed(&self) -> bool {
        self.triads.iter().all(|t| t.passed) && self.settings.iter().all(|s| s.satisfied)
    }

    pub fn failed_settings(&self) -> impl Iterator<Item = &SettingsCheck> {
        self.settings.iter().filter(|s| !s.satisfied)
    }
}

/// Run the health check for the repository at `root`
pub fn check(root: &Path, config: &LintConfig) -> LintResult<HealthReport> {
    let instructions = InstructionValidator::new(&config.instructions)?;
    let chatmodes = ChatmodeValidator::new(&config.chatmodes);
    let prompts = PromptValidator::new(&config.prompts);

    let triads = vec![
        triad_status(&instructions, &root.join(&config.paths.instructions_dir))?,
        triad_status(&chatmodes, &root.join(&config.paths.chatmodes_dir))?,
        triad_status(&prompts, &root.join(&config.paths.prompts_dir))?,
    ];

    let settings_file = root.join(&config.paths.settings_file);
    let settings = check_settings(&settings_file, &config.settings.requirements);

    let report = HealthReport {
        triads,
        settings_file,
        settings,
    };
    tracing::info!("Health check {}", if report.passed() { "passed" } else { "failed" });
    Ok(report)
}

fn triad_status(validator: &dyn FileValidator, dir: &Path) -> LintResult<TriadStatus> {
    let report = validate_directory(validator, dir)?;

    Ok(TriadStatus {
        name: validator.name().to_string(),
        directory: dir.to_path_buf(),
        files: report.summary.files_checked,
        passed: report.passed(),
        report,
    })
}

/// Check every requirement against the settings document at `path`
pub fn check_settings(path: &Path, requirements: &[SettingsRequirement]) -> Vec<SettingsCheck> {
    match load_settings(path) {
        Ok(settings) => requirements
            .iter()
            .map(|req| evaluate(&settings, req))
            .collect(),
        Err(e) => {
            tracing::warn!("{}", e);
            requirements
                .iter()
                .map(|req| SettingsCheck {
                    requirement: req.describe(),
                    satisfied: false,
                    message: e.to_string(),
                })
                .collect()
        }
    }
}

fn load_settings(path: &Path) -> LintResult<JsonValue> {
    if !path.is_file() {
        return Err(LintError::settings(format!(
            "settings file {} not found",
            path.display()
        )));
    }

    let content = fs::read_to_string(path).map_err(|e| LintError::io(path, e))?;
    let value: JsonValue = serde_json::from_str(&strip_jsonc(&content)).map_err(|e| {
        LintError::settings(format!("failed to parse {}: {e}", path.display()))
    })?;

    if !value.is_object() {
        return Err(LintError::settings(format!(
            "{} must contain a JSON object",
            path.display()
        )));
    }

    Ok(value)
}

/// Remove `//` and `/* */` comments, then trailing commas, leaving string contents intact
fn strip_jsonc(text: &str) -> String {
    strip_trailing_commas(&strip_comments(text))
}

fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            match c {
                '\\' => out.extend(chars.next()),
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        let next = chars.peek().copied();
        match (c, next) {
            ('"', _) => {
                in_string = true;
                out.push(c);
            }
            ('/', Some('/')) => {
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut prev = '\0';
                for skipped in chars.by_ref() {
                    if prev == '*' && skipped == '/' {
                        break;
                    }
                    // Keep line numbers in parse errors accurate
                    if skipped == '\n' {
                        out.push('\n');
                    }
                    prev = skipped;
                }
            }
            _ => out.push(c),
        }
    }

    out
}

fn strip_trailing_commas(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut idx = 0;

    while idx < chars.len() {
        let c = chars[idx];
        idx += 1;

        if in_string {
            out.push(c);
            if c == '\\' {
                if let Some(&escaped) = chars.get(idx) {
                    out.push(escaped);
                    idx += 1;
                }
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        if c == ',' {
            let following = chars[idx..].iter().find(|ch| !ch.is_whitespace());
            if matches!(following, Some('}') | Some(']')) {
                continue;
            }
        }
        if c == '"' {
            in_string = true;
        }
        out.push(c);
    }

    out
}

/// Settings keys are flat dotted names, never nested paths
fn evaluate(settings: &JsonValue, requirement: &SettingsRequirement) -> SettingsCheck {
    let value = settings.get(requirement.setting());

    let (satisfied, message) = match (requirement, value) {
        (_, None) => (false, format!("{} is missing", requirement.setting())),
        (SettingsRequirement::Location { setting, location }, Some(value)) => {
            match value.as_object() {
                Some(map) if map.contains_key(location) => {
                    (true, format!("{setting} includes '{location}'"))
                }
                Some(_) => (false, format!("{setting} does not include '{location}'")),
                None => (false, format!("{setting} must be an object")),
            }
        }
        (SettingsRequirement::Enabled { setting }, Some(value)) => match value.as_bool() {
            Some(true) => (true, format!("{setting} is enabled")),
            _ => (false, format!("{setting} must be true")),
        },
    };

    SettingsCheck {
        requirement: requirement.describe(),
        satisfied,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    const SETTINGS: &str = r#"{
        "chat.instructionsFilesLocations": { "memory-bank/instructions": true },
        "github.copilot.chat.codeGeneration.useInstructionFiles": true,
        "chat.promptFilesLocations": { "memory-bank/prompts": true },
        "chat.modeFilesLocations": { "memory-bank/chatmodes": true }
    }"#;

    fn healthy_repo() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        for sub in ["instructions", "chatmodes", "prompts"] {
            fs::create_dir_all(root.join("memory-bank").join(sub)).unwrap();
        }
        fs::create_dir_all(root.join(".vscode")).unwrap();

        fs::write(
            root.join("memory-bank/instructions/core.instructions.md"),
            "---\ndescription: core rules\n---\n# Core\n",
        )
        .unwrap();
        fs::write(
            root.join("memory-bank/chatmodes/plan.chatmode.md"),
            "---\ndescription: plan\nmodel: GPT-5 (Preview)\ntools: ['codebase', 'editFiles', 'fetch']\n---\n# Plan\n",
        )
        .unwrap();
        fs::write(
            root.join("memory-bank/prompts/foo.prompt.md"),
            "---\ndescription: x\n---\n\n<!-- memory-bank/prompts/foo.prompt.md -->\n\n# Title\n\n## Slash Command: /foo\n\nbody",
        )
        .unwrap();
        fs::write(root.join(".vscode/settings.json"), SETTINGS).unwrap();
        dir
    }

    #[test]
    fn test_healthy_repository_passes() {
        let dir = healthy_repo();
        let report = check(dir.path(), &LintConfig::default()).unwrap();

        assert!(report.passed(), "{report:?}");
        assert_eq!(report.triads.len(), 3);
        assert!(report.triads.iter().all(|t| t.files == 1));
        assert_eq!(report.settings.len(), 4);
    }

    #[rstest]
    #[case("chat.instructionsFilesLocations")]
    #[case("github.copilot.chat.codeGeneration.useInstructionFiles")]
    #[case("chat.promptFilesLocations")]
    #[case("chat.modeFilesLocations")]
    fn test_removing_a_setting_fails_only_the_settings(#[case] key: &str) {
        let dir = healthy_repo();
        let path = dir.path().join(".vscode/settings.json");
        let mut settings: JsonValue = serde_json::from_str(SETTINGS).unwrap();
        settings.as_object_mut().unwrap().remove(key);
        fs::write(&path, settings.to_string()).unwrap();

        let report = check(dir.path(), &LintConfig::default()).unwrap();
        assert!(!report.passed());
        assert!(report.triads.iter().all(|t| t.passed));
        assert_eq!(report.failed_settings().count(), 1);
    }

    #[test]
    fn test_failing_validator_fails_health() {
        let dir = healthy_repo();
        fs::write(
            dir.path().join("memory-bank/instructions/bad.instructions.md"),
            "# No front matter\n",
        )
        .unwrap();

        let report = check(dir.path(), &LintConfig::default()).unwrap();
        assert!(!report.passed());
        let instructions = &report.triads[0];
        assert_eq!(instructions.name, "instructions");
        assert_eq!(instructions.files, 2);
        assert!(!instructions.passed);
    }

    #[test]
    fn test_missing_settings_file_fails_every_requirement() {
        let dir = healthy_repo();
        fs::remove_file(dir.path().join(".vscode/settings.json")).unwrap();

        let report = check(dir.path(), &LintConfig::default()).unwrap();
        assert_eq!(report.failed_settings().count(), 4);
        assert!(report.settings[0].message.contains("not found"));
    }

    #[test]
    fn test_settings_with_comments_and_trailing_commas() {
        let dir = healthy_repo();
        fs::write(
            dir.path().join(".vscode/settings.json"),
            r#"{
                // memory-bank locations
                "chat.instructionsFilesLocations": { "memory-bank/instructions": true, },
                /* toggled on
                   for the whole workspace */
                "github.copilot.chat.codeGeneration.useInstructionFiles": true,
                "chat.promptFilesLocations": { "memory-bank/prompts": true },
                "chat.modeFilesLocations": { "memory-bank/chatmodes": true },
            }"#,
        )
        .unwrap();

        let report = check(dir.path(), &LintConfig::default()).unwrap();
        assert!(report.passed(), "{:?}", report.settings);
    }

    #[rstest]
    #[case(r#"{"url": "https://example.com"}"#, r#"{"url": "https://example.com"}"#)]
    #[case(r#"{"a": "x, }", }"#, r#"{"a": "x, }" }"#)]
    #[case(r#"{"a": "\"/* not a comment */"}"#, r#"{"a": "\"/* not a comment */"}"#)]
    #[case("[1, 2, // last\n]", "[1, 2 \n]")]
    fn test_strip_jsonc_keeps_strings(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(strip_jsonc(input), expected);
    }

    #[test]
    fn test_invalid_settings_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();

        let checks = check_settings(&path, &LintConfig::default().settings.requirements);
        assert!(checks.iter().all(|c| !c.satisfied));
        assert!(checks[0].message.contains("failed to parse"));
    }

    #[rstest]
    #[case(r#"{"flag": true}"#, true)]
    #[case(r#"{"flag": false}"#, false)]
    #[case(r#"{"flag": "true"}"#, false)]
    fn test_enabled_requirement(#[case] json: &str, #[case] expected: bool) {
        let settings: JsonValue = serde_json::from_str(json).unwrap();
        let requirement = SettingsRequirement::Enabled {
            setting: "flag".to_string(),
        };
        assert_eq!(evaluate(&settings, &requirement).satisfied, expected);
    }

    #[test]
    fn test_location_must_be_object_key() {
        let settings: JsonValue =
            serde_json::from_str(r#"{"locs": ["memory-bank/prompts"]}"#).unwrap();
        let requirement = SettingsRequirement::Location {
            setting: "locs".to_string(),
            location: "memory-bank/prompts".to_string(),
        };
        let result = evaluate(&settings, &requirement);
        assert!(!result.satisfied);
        assert_eq!(result.message, "locs must be an object");
    }
}
