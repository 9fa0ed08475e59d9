//! Source files as read once per validation run

use crate::domain::issues::{LintError, LintResult};
use std::fs;
use std::path::{Path, PathBuf};

/// A text file loaded for validation. Never mutated after it is read.
#[derive(Debug, Clone)]
pub struct SourceFile {
    path: PathBuf,
    raw: String,
    lines: Vec<String>,
}

impl SourceFile {
    /// Read a file from disk
    pub fn read<P: AsRef<Path>>(path: P) -> LintResult<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| LintError::io(path, e))?;
        Ok(Self::from_text(path, raw))
    }

    /// Build a source file from text already in memory
    pub fn from_text(path: impl Into<PathBuf>, raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let lines = raw.lines().map(str::to_string).collect();
        Self {
            path: path.into(),
            raw,
            lines,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Basename of the file, empty when the path has none
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}
