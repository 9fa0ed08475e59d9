//! Markdown file discovery with .gitignore-style exclusions
//!
//! Architectural Principle: Service Layer - MarkdownFilter owns include/exclude evaluation
//! - Patterns apply in order; a leading `!` re-includes what an earlier pattern excluded
//! - Excluded directories are pruned during the walk instead of filtered afterwards
//! - Per-directory ignore files are read between the walk root and the file

use crate::domain::{LintError, LintResult};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Decides which markdown files a lint run looks at
#[derive(Debug, Clone)]
pub struct MarkdownFilter {
    patterns: Vec<FilterPattern>,
    ignore_filename: Option<String>,
}

/// A single filter pattern
#[derive(Debug, Clone)]
struct FilterPattern {
    pattern: glob::Pattern,
    /// Pattern started with `!`
    is_include: bool,
    /// Pattern contains `/` and is matched against the relative path
    anchored: bool,
}

impl FilterPattern {
    fn parse(raw: &str) -> LintResult<Self> {
        let (is_include, body) = match raw.strip_prefix('!') {
            Some(stripped) => (true, stripped),
            None => (false, raw),
        };
        let body = body.trim_end_matches('/');
        let anchored = body.contains('/');
        let body = body.trim_start_matches('/');

        let pattern = glob::Pattern::new(body)
            .map_err(|e| LintError::pattern(format!("Invalid pattern '{raw}': {e}")))?;

        Ok(Self { pattern, is_include, anchored })
    }

    /// Match `relative` (path below the pattern's base directory)
    fn matches(&self, relative: &Path) -> bool {
        if self.anchored {
            return self.pattern.matches_path(relative);
        }
        relative
            .file_name()
            .map(|name| self.pattern.matches(&name.to_string_lossy()))
            .unwrap_or(false)
    }
}

/// Apply patterns in order; the last matching pattern decides
fn verdict(patterns: &[FilterPattern], relative: &Path) -> Option<bool> {
    patterns
        .iter()
        .filter(|p| p.matches(relative))
        .last()
        .map(|p| p.is_include)
}

impl MarkdownFilter {
    /// Create a filter from exclude patterns and an optional ignore file name
    pub fn new(patterns: &[String], ignore_filename: Option<String>) -> LintResult<Self> {
        let patterns = patterns
            .iter()
            .map(|p| FilterPattern::parse(p))
            .collect::<LintResult<Vec<_>>>()?;

        Ok(Self {
            patterns,
            ignore_filename: ignore_filename.filter(|name| !name.is_empty()),
        })
    }

    /// Add a pattern after the configured ones
    pub fn add_pattern(&mut self, pattern: &str) -> LintResult<()> {
        self.patterns.push(FilterPattern::parse(pattern)?);
        Ok(())
    }

    /// Whether `path` (inside `root`) is excluded by patterns or ignore files
    pub fn is_excluded(&self, root: &Path, path: &Path) -> LintResult<bool> {
        let relative = path.strip_prefix(root).unwrap_or(path);

        if verdict(&self.patterns, relative) == Some(false) {
            return Ok(true);
        }

        self.is_ignored_by_files(root, path)
    }

    /// Check ignore files from `root` down to the directory holding `path`
    fn is_ignored_by_files(&self, root: &Path, path: &Path) -> LintResult<bool> {
        let Some(ignore_filename) = &self.ignore_filename else {
            return Ok(false);
        };

        let mut dirs: Vec<&Path> = path
            .ancestors()
            .skip(1)
            .take_while(|dir| dir.starts_with(root))
            .collect();
        dirs.reverse();

        let mut ignored = false;
        for dir in dirs {
            let ignore_file = dir.join(ignore_filename);
            if !ignore_file.is_file() {
                continue;
            }

            let patterns = load_ignore_file(&ignore_file)?;
            if let Ok(relative) = path.strip_prefix(dir) {
                if let Some(include) = verdict(&patterns, relative) {
                    ignored = !include;
                }
            }
        }

        Ok(ignored)
    }

    /// All `*.md` files below `root`, sorted
    pub fn find_files(&self, root: &Path) -> LintResult<Vec<PathBuf>> {
        let mut files = Vec::new();

        let walker = WalkDir::new(root).follow_links(false).into_iter().filter_entry(|entry| {
            // Never prune the root itself
            entry.depth() == 0
                || !entry.file_type().is_dir()
                || !matches!(self.is_excluded(root, entry.path()), Ok(true))
        });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                    continue;
                }
            };

            let path = entry.path();
            if !entry.file_type().is_file() || !is_markdown(path) {
                continue;
            }

            if self.is_excluded(root, path)? {
                tracing::debug!("Excluded {}", path.display());
                continue;
            }

            files.push(path.to_path_buf());
        }

        files.sort();
        Ok(files)
    }

    /// Expand explicit arguments: files are kept as given, directories are walked
    pub fn collect(&self, paths: &[PathBuf]) -> LintResult<Vec<PathBuf>> {
        let mut files = Vec::new();

        for path in paths {
            if path.is_file() {
                files.push(path.clone());
            } else if path.is_dir() {
                files.extend(self.find_files(path)?);
            } else {
                tracing::warn!("Path {} does not exist", path.display());
            }
        }

        files.sort();
        files.dedup();
        Ok(files)
    }
}

fn is_markdown(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some("md")
}

fn load_ignore_file(path: &Path) -> LintResult<Vec<FilterPattern>> {
    let content = fs::read_to_string(path).map_err(|e| LintError::io(path, e))?;

    let mut patterns = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match FilterPattern::parse(line) {
            Ok(pattern) => patterns.push(pattern),
            Err(e) => {
                // Skip invalid patterns but keep the rest of the file
                tracing::warn!("{} in {}", e, path.display());
            }
        }
    }

    Ok(patterns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn default_filter() -> MarkdownFilter {
        let excludes = vec!["node_modules".to_string(), ".git".to_string(), "target".to_string()];
        MarkdownFilter::new(&excludes, Some(".mdlintignore".to_string())).unwrap()
    }

    fn tree(files: &[&str]) -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        for file in files {
            let path = temp_dir.path().join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "# Title\n").unwrap();
        }
        temp_dir
    }

    fn relative(root: &Path, files: Vec<PathBuf>) -> Vec<String> {
        files
            .into_iter()
            .map(|f| f.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_finds_markdown_and_prunes_excluded_dirs() {
        let dir = tree(&[
            "README.md",
            "docs/guide.md",
            "docs/image.png",
            "node_modules/pkg/README.md",
            "target/doc/index.md",
        ]);

        let files = default_filter().find_files(dir.path()).unwrap();
        assert_eq!(relative(dir.path(), files), vec!["README.md", "docs/guide.md"]);
    }

    #[test]
    fn test_anchored_and_include_patterns() {
        let dir = tree(&["docs/a.md", "docs/keep.md", "other/a.md"]);
        let mut filter = default_filter();
        filter.add_pattern("docs/*.md").unwrap();
        filter.add_pattern("!docs/keep.md").unwrap();

        let files = filter.find_files(dir.path()).unwrap();
        assert_eq!(relative(dir.path(), files), vec!["docs/keep.md", "other/a.md"]);
    }

    #[test]
    fn test_ignore_file_applies_below_its_directory() {
        let dir = tree(&["a.md", "drafts/b.md", "drafts/keep.md", "notes/c.md"]);
        fs::write(dir.path().join(".mdlintignore"), "# comment\ndrafts\n").unwrap();
        fs::write(dir.path().join("notes/.mdlintignore"), "c.md\n").unwrap();

        let files = default_filter().find_files(dir.path()).unwrap();
        assert_eq!(relative(dir.path(), files), vec!["a.md"]);
    }

    #[test]
    fn test_collect_keeps_explicit_files() {
        let dir = tree(&["a.md", "sub/b.md"]);
        let explicit = dir.path().join("a.md");
        let files = default_filter()
            .collect(&[explicit.clone(), dir.path().join("sub"), explicit.clone()])
            .unwrap();
        assert_eq!(files, vec![explicit, dir.path().join("sub/b.md")]);
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        assert!(MarkdownFilter::new(&["[bad".to_string()], None).is_err());
    }
}
