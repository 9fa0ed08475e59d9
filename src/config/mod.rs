//! Configuration loading and management for memory-bank-lint
//!
//! Architecture: Anti-Corruption Layer - Configuration translates external YAML formats
//! - Raw YAML structures are converted to immutable rule sets handed to each validator
//! - Default tables (models, tools literal, typo dictionary) live here, not in the validators
//! - Every section can be overridden independently; omitted sections keep their defaults

pub mod allow_list;

pub use allow_list::AllowList;

use crate::domain::issues::{LintError, LintResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Config file names looked up under the root when none is given explicitly
pub const DEFAULT_CONFIG_FILES: [&str; 3] =
    ["memory_bank_lint.yaml", "memory_bank_lint.yml", ".memory_bank_lint.yaml"];

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LintConfig {
    /// Configuration format version
    pub version: String,
    /// Where the triad directories and the settings file live
    pub paths: PathConfig,
    pub instructions: InstructionRules,
    pub chatmodes: ChatmodeRules,
    pub prompts: PromptRules,
    pub markdown: MarkdownRules,
    pub settings: SettingsRules,
}

/// Locations relative to the repository root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    pub instructions_dir: PathBuf,
    pub chatmodes_dir: PathBuf,
    pub prompts_dir: PathBuf,
    pub settings_file: PathBuf,
}

/// Rules for `*.instructions.md` files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstructionRules {
    pub suffix: String,
    /// Basename globs exempt from the external-link rule
    pub link_allow_list: Vec<String>,
}

/// Rules for `*.chatmode.md` files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatmodeRules {
    pub suffix: String,
    pub allowed_models: Vec<String>,
    /// Compared byte for byte against the `tools` value
    pub expected_tools: String,
}

/// Rules for `*.prompt.md` files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptRules {
    pub suffix: String,
    pub allowed_keys: Vec<String>,
    /// The marker comment must read `<!-- {marker_prefix}{file name} -->`
    pub marker_prefix: String,
    /// Prefix of the first second-level heading
    pub slash_command_prefix: String,
}

/// Rules for the generic markdown linter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkdownRules {
    pub max_line_length: usize,
    /// Globs excluded from directory walks
    pub exclude: Vec<String>,
    /// Per-directory ignore file name, empty to disable
    pub ignore_file: Option<String>,
    /// Misspelling to correction, matched as lowercase whole words
    pub typos: BTreeMap<String, String>,
}

/// Requirements checked against the editor settings document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsRules {
    pub requirements: Vec<SettingsRequirement>,
}

/// One condition the settings document must satisfy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SettingsRequirement {
    /// `setting` is an object containing the key `location`
    Location { setting: String, location: String },
    /// `setting` is the boolean `true`
    Enabled { setting: String },
}

impl SettingsRequirement {
    /// Name of the setting this requirement inspects
    pub fn setting(&self) -> &str {
        match self {
            Self::Location { setting, .. } | Self::Enabled { setting } => setting,
        }
    }

    /// Human-readable statement of the requirement
    pub fn describe(&self) -> String {
        match self {
            Self::Location { setting, location } => format!("{setting} includes '{location}'"),
            Self::Enabled { setting } => format!("{setting} is true"),
        }
    }
}

impl Default for LintConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            instructions_dir: PathBuf::from("memory-bank/instructions"),
            chatmodes_dir: PathBuf::from("memory-bank/chatmodes"),
            prompts_dir: PathBuf::from("memory-bank/prompts"),
            settings_file: PathBuf::from(".vscode/settings.json"),
        }
    }
}

impl Default for InstructionRules {
    fn default() -> Self {
        Self {
            suffix: ".instructions.md".to_string(),
            link_allow_list: vec!["layer-*".to_string()],
        }
    }
}

impl Default for ChatmodeRules {
    fn default() -> Self {
        Self {
            suffix: ".chatmode.md".to_string(),
            allowed_models: [
                "GPT-5 (Preview)",
                "GPT-4.1",
                "GPT-4o",
                "Claude Sonnet 4",
                "Claude Sonnet 3.7",
                "Gemini 2.5 Pro",
                "o4-mini (Preview)",
            ]
            .iter()
            .map(|m| m.to_string())
            .collect(),
            expected_tools: "['codebase', 'editFiles', 'fetch']".to_string(),
        }
    }
}

impl Default for PromptRules {
    fn default() -> Self {
        Self {
            suffix: ".prompt.md".to_string(),
            allowed_keys: ["description", "mode", "model", "tools"]
                .iter()
                .map(|k| k.to_string())
                .collect(),
            marker_prefix: "memory-bank/prompts/".to_string(),
            slash_command_prefix: "## Slash Command: ".to_string(),
        }
    }
}

impl Default for MarkdownRules {
    fn default() -> Self {
        Self {
            max_line_length: 120,
            exclude: vec![
                "node_modules".to_string(),
                ".git".to_string(),
                "target".to_string(),
            ],
            ignore_file: Some(".mdlintignore".to_string()),
            typos: default_typos(),
        }
    }
}

impl Default for SettingsRules {
    fn default() -> Self {
        Self {
            requirements: vec![
                SettingsRequirement::Location {
                    setting: "chat.instructionsFilesLocations".to_string(),
                    location: "memory-bank/instructions".to_string(),
                },
                SettingsRequirement::Enabled {
                    setting: "github.copilot.chat.codeGeneration.useInstructionFiles".to_string(),
                },
                SettingsRequirement::Location {
                    setting: "chat.promptFilesLocations".to_string(),
                    location: "memory-bank/prompts".to_string(),
                },
                SettingsRequirement::Location {
                    setting: "chat.modeFilesLocations".to_string(),
                    location: "memory-bank/chatmodes".to_string(),
                },
            ],
        }
    }
}

fn default_typos() -> BTreeMap<String, String> {
    [
        ("teh", "the"),
        ("adn", "and"),
        ("occured", "occurred"),
        ("recieve", "receive"),
        ("seperate", "separate"),
        ("definately", "definitely"),
        ("wich", "which"),
        ("untill", "until"),
        ("accross", "across"),
        ("begining", "beginning"),
        ("enviroment", "environment"),
        ("existance", "existence"),
        ("independant", "independent"),
        ("neccessary", "necessary"),
        ("occurence", "occurrence"),
        ("refered", "referred"),
        ("succesful", "successful"),
        ("thier", "their"),
        ("wierd", "weird"),
        ("paramter", "parameter"),
    ]
    .iter()
    .map(|(wrong, right)| (wrong.to_string(), right.to_string()))
    .collect()
}

impl LintConfig {
    /// Load configuration from a YAML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> LintResult<Self> {
        let contents = fs::read_to_string(&path).map_err(|e| {
            LintError::config(format!(
                "Failed to read config file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        let config: Self = serde_yaml::from_str(&contents).map_err(|e| {
            LintError::config(format!(
                "Failed to parse config file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from string content
    pub fn load_from_str(content: &str) -> LintResult<Self> {
        let config: Self = serde_yaml::from_str(content)
            .map_err(|e| LintError::config(format!("Failed to parse config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Explicit file if given, else the first default file found under `root`, else built-ins
    pub fn discover(root: &Path, explicit: Option<&Path>) -> LintResult<Self> {
        if let Some(path) = explicit {
            return Self::load_from_file(path);
        }

        for name in DEFAULT_CONFIG_FILES {
            let candidate = root.join(name);
            if candidate.is_file() {
                tracing::debug!("Using configuration from {}", candidate.display());
                return Self::load_from_file(candidate);
            }
        }

        tracing::debug!("No configuration file found, using built-in defaults");
        Ok(Self::default())
    }

    /// Get default configuration with built-in rule tables
    pub fn with_defaults() -> Self {
        Self {
            version: "1.0".to_string(),
            paths: PathConfig::default(),
            instructions: InstructionRules::default(),
            chatmodes: ChatmodeRules::default(),
            prompts: PromptRules::default(),
            markdown: MarkdownRules::default(),
            settings: SettingsRules::default(),
        }
    }

    /// Validate the configuration for consistency and correctness
    pub fn validate(&self) -> LintResult<()> {
        if !["1.0"].contains(&self.version.as_str()) {
            return Err(LintError::config(format!(
                "Unsupported configuration version: {}. Supported versions: 1.0",
                self.version
            )));
        }

        AllowList::new(&self.instructions.link_allow_list)
            .map_err(|e| LintError::config(format!("Invalid instruction allow-list: {e}")))?;

        for pattern in &self.markdown.exclude {
            glob::Pattern::new(pattern).map_err(|e| {
                LintError::config(format!("Invalid markdown exclude pattern '{pattern}': {e}"))
            })?;
        }

        if self.chatmodes.allowed_models.is_empty() {
            return Err(LintError::config("chatmodes.allowed_models must not be empty"));
        }

        if self.prompts.allowed_keys.is_empty() {
            return Err(LintError::config("prompts.allowed_keys must not be empty"));
        }

        if self.markdown.max_line_length == 0 {
            return Err(LintError::config("markdown.max_line_length must be positive"));
        }

        for suffix in [
            &self.instructions.suffix,
            &self.chatmodes.suffix,
            &self.prompts.suffix,
        ] {
            if suffix.is_empty() {
                return Err(LintError::config("file suffixes must not be empty"));
            }
        }

        for (wrong, right) in &self.markdown.typos {
            if wrong.is_empty() || right.is_empty() || wrong.chars().any(char::is_whitespace) {
                return Err(LintError::config(format!(
                    "Invalid typo entry '{wrong}' -> '{right}'"
                )));
            }
            // A correction that is itself a typo would make fixing non-idempotent
            if self.markdown.typos.contains_key(&right.to_lowercase()) {
                return Err(LintError::config(format!(
                    "Typo correction '{right}' is itself listed as a typo"
                )));
            }
        }

        Ok(())
    }

    /// Convert to YAML, e.g. to seed a project config file
    pub fn to_yaml(&self) -> LintResult<String> {
        serde_yaml::to_string(self)
            .map_err(|e| LintError::config(format!("Failed to serialize config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_valid() {
        let config = LintConfig::default();
        config.validate().unwrap();

        assert_eq!(config.markdown.typos.get("teh").map(String::as_str), Some("the"));
        assert_eq!(config.markdown.typos.len(), 20);
        assert_eq!(config.settings.requirements.len(), 4);
        assert!(config.chatmodes.allowed_models.iter().any(|m| m == "GPT-5 (Preview)"));
    }

    #[test]
    fn test_partial_yaml_keeps_other_defaults() {
        let config = LintConfig::load_from_str(
            "version: \"1.0\"\nmarkdown:\n  max_line_length: 80\n",
        )
        .unwrap();

        assert_eq!(config.markdown.max_line_length, 80);
        // Omitted fields inside an overridden section fall back too
        assert_eq!(config.markdown.typos.len(), 20);
        assert_eq!(config.prompts, PromptRules::default());
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = LintConfig::default();
        let yaml = config.to_yaml().unwrap();
        let reloaded = LintConfig::load_from_str(&yaml).unwrap();
        assert_eq!(config, reloaded);
    }

    #[test]
    fn test_settings_requirement_yaml_shape() {
        let config = LintConfig::load_from_str(
            "settings:\n  requirements:\n    - kind: enabled\n      setting: editor.formatOnSave\n",
        )
        .unwrap();

        assert_eq!(
            config.settings.requirements,
            vec![SettingsRequirement::Enabled {
                setting: "editor.formatOnSave".to_string()
            }]
        );
    }

    #[test]
    fn test_rejects_unsupported_version() {
        let err = LintConfig::load_from_str("version: \"2.0\"\n").unwrap_err();
        assert!(err.to_string().contains("Unsupported configuration version"));
    }

    #[test]
    fn test_rejects_invalid_glob() {
        let err = LintConfig::load_from_str("instructions:\n  link_allow_list: ['[bad']\n")
            .unwrap_err();
        assert!(matches!(err, LintError::Configuration { .. }));
    }

    #[test]
    fn test_rejects_empty_model_list() {
        assert!(LintConfig::load_from_str("chatmodes:\n  allowed_models: []\n").is_err());
    }

    #[test]
    fn test_rejects_chained_typo_corrections() {
        let err = LintConfig::load_from_str("markdown:\n  typos:\n    teh: hte\n    hte: the\n")
            .unwrap_err();
        assert!(err.to_string().contains("itself listed as a typo"));
    }

    #[test]
    fn test_discover_prefers_file_under_root() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("memory_bank_lint.yaml"),
            "markdown:\n  max_line_length: 99\n",
        )
        .unwrap();

        let config = LintConfig::discover(temp_dir.path(), None).unwrap();
        assert_eq!(config.markdown.max_line_length, 99);

        let empty_dir = TempDir::new().unwrap();
        let config = LintConfig::discover(empty_dir.path(), None).unwrap();
        assert_eq!(config, LintConfig::default());
    }
}
