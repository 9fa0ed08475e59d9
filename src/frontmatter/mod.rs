//! Front-matter extraction for instruction, chatmode and prompt files
//!
//! Architectural Principle: Service Layer - one parser, two strategies
//! - Strict mode requires the literal `---` delimiters and reports which one is missing
//! - Lenient mode scans every line for `key:` entries and never fails
//! - Downstream validators choose the mode; the parser never reports issues itself

use lazy_static::lazy_static;
use regex::Regex;

/// The exact delimiter line, no surrounding whitespace tolerated
pub const DELIMITER: &str = "---";

lazy_static! {
    static ref LENIENT_ENTRY: Regex =
        Regex::new(r"^\s*([A-Za-z0-9_.\-]+):(.*)$").expect("static front-matter entry regex");
}

/// How strictly the delimiters are enforced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    /// First line must be `---` and a later line must close the block
    Strict,
    /// Every `key:` line anywhere in the file is an entry; malformed files are tolerated
    Lenient,
}

/// Which delimiter a strict parse could not find
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FrontMatterError {
    #[error("front-matter must start with '---' on the first line")]
    MissingStart,
    #[error("front-matter is not closed with '---'")]
    MissingEnd,
}

/// Ordered key/value entries of one front-matter block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontMatter {
    entries: Vec<(String, String)>,
}

impl FrontMatter {
    /// Value for `key`; the last occurrence wins
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Keys in file order, duplicates included
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push(&mut self, key: &str, value: &str) {
        self.entries.push((key.to_string(), value.to_string()));
    }
}

/// Result of a successful parse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFrontMatter {
    pub front_matter: FrontMatter,
    /// Index of the first line after the closing delimiter. Always 0 in lenient mode.
    pub body_start: usize,
}

/// Parser configured with one [`ParseMode`]
#[derive(Debug, Clone, Copy)]
pub struct FrontMatterParser {
    mode: ParseMode,
}

impl FrontMatterParser {
    pub fn new(mode: ParseMode) -> Self {
        Self { mode }
    }

    pub fn strict() -> Self {
        Self::new(ParseMode::Strict)
    }

    pub fn lenient() -> Self {
        Self::new(ParseMode::Lenient)
    }

    /// Parse the leading block of `lines`
    pub fn parse<S: AsRef<str>>(&self, lines: &[S]) -> Result<ParsedFrontMatter, FrontMatterError> {
        match self.mode {
            ParseMode::Strict => parse_strict(lines),
            ParseMode::Lenient => Ok(ParsedFrontMatter {
                front_matter: scan_lenient(lines),
                body_start: 0,
            }),
        }
    }
}

fn parse_strict<S: AsRef<str>>(lines: &[S]) -> Result<ParsedFrontMatter, FrontMatterError> {
    match lines.first() {
        Some(first) if first.as_ref() == DELIMITER => {}
        _ => return Err(FrontMatterError::MissingStart),
    }

    let close = lines
        .iter()
        .skip(1)
        .position(|line| line.as_ref() == DELIMITER)
        .map(|offset| offset + 1)
        .ok_or(FrontMatterError::MissingEnd)?;

    let mut front_matter = FrontMatter::default();
    for line in &lines[1..close] {
        let line = line.as_ref();
        if line.trim().is_empty() {
            continue;
        }
        // Lines without a colon are tolerated and skipped
        if let Some((key, value)) = line.split_once(':') {
            let key = key.trim();
            if !key.is_empty() {
                front_matter.push(key, value.trim());
            }
        }
    }

    Ok(ParsedFrontMatter {
        front_matter,
        body_start: close + 1,
    })
}

fn scan_lenient<S: AsRef<str>>(lines: &[S]) -> FrontMatter {
    let mut front_matter = FrontMatter::default();
    for line in lines {
        if let Some(caps) = LENIENT_ENTRY.captures(line.as_ref()) {
            front_matter.push(&caps[1], caps[2].trim());
        }
    }
    front_matter
}
