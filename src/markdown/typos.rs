//! Typo dictionary matching and in-place correction

use crate::domain::{LintError, LintResult};
use crate::io::atomic_write;
use regex::{Captures, Regex, RegexBuilder};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// One dictionary entry found in a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypoMatch {
    pub wrong: String,
    pub right: String,
    /// 1-indexed, ascending, without duplicates
    pub lines: Vec<usize>,
}

/// Case-insensitive whole-word dictionary of misspellings
#[derive(Debug, Clone)]
pub struct TypoDictionary {
    entries: BTreeMap<String, String>,
    matcher: Option<Regex>,
}

impl TypoDictionary {
    pub fn new(entries: &BTreeMap<String, String>) -> LintResult<Self> {
        let entries: BTreeMap<String, String> = entries
            .iter()
            .map(|(wrong, right)| (wrong.to_lowercase(), right.clone()))
            .collect();

        let matcher = if entries.is_empty() {
            None
        } else {
            let alternation = entries
                .keys()
                .map(|w| regex::escape(w))
                .collect::<Vec<_>>()
                .join("|");
            let regex = RegexBuilder::new(&format!(r"\b(?:{alternation})\b"))
                .case_insensitive(true)
                .build()
                .map_err(|e| LintError::pattern(format!("Invalid typo dictionary: {e}")))?;
            Some(regex)
        };

        Ok(Self { entries, matcher })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All dictionary words present in `lines`, in dictionary order
    pub fn find<S: AsRef<str>>(&self, lines: &[S]) -> Vec<TypoMatch> {
        let Some(matcher) = &self.matcher else {
            return Vec::new();
        };

        let mut found: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (idx, line) in lines.iter().enumerate() {
            for m in matcher.find_iter(line.as_ref()) {
                let line_numbers = found.entry(m.as_str().to_lowercase()).or_default();
                if line_numbers.last() != Some(&(idx + 1)) {
                    line_numbers.push(idx + 1);
                }
            }
        }

        found
            .into_iter()
            .filter_map(|(wrong, lines)| {
                let right = self.entries.get(&wrong)?.clone();
                Some(TypoMatch { wrong, right, lines })
            })
            .collect()
    }

    /// Replace every match in `text`, returning the new text and the replacement count
    pub fn fix_text(&self, text: &str) -> (String, usize) {
        let Some(matcher) = &self.matcher else {
            return (text.to_string(), 0);
        };

        let mut count = 0;
        let fixed = matcher.replace_all(text, |caps: &Captures| {
            let matched = &caps[0];
            match self.entries.get(&matched.to_lowercase()) {
                Some(right) => {
                    count += 1;
                    match_first_letter_case(matched, right)
                }
                None => matched.to_string(),
            }
        });

        (fixed.into_owned(), count)
    }

    /// Fix `path` in place. The file is only rewritten when something changed.
    pub fn fix_file(&self, path: &Path) -> LintResult<usize> {
        let text = fs::read_to_string(path).map_err(|e| LintError::io(path, e))?;
        let (fixed, count) = self.fix_text(&text);

        if count > 0 {
            atomic_write(path, fixed.as_bytes())?;
            tracing::info!("Fixed {} typo(s) in {}", count, path.display());
        }

        Ok(count)
    }
}

/// Capitalize the replacement when the original started with an uppercase letter
fn match_first_letter_case(original: &str, replacement: &str) -> String {
    let starts_upper = original.chars().next().is_some_and(char::is_uppercase);
    if !starts_upper {
        return replacement.to_string();
    }

    let mut chars = replacement.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
