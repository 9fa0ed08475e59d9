//! Basename allow-lists using shell-glob patterns

use crate::domain::issues::{LintError, LintResult};
use std::path::Path;

/// File-name globs granting an exemption from one rule
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    patterns: Vec<glob::Pattern>,
}

impl AllowList {
    /// Compile the given patterns, failing on the first invalid one
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> LintResult<Self> {
        let patterns = patterns
            .iter()
            .map(|p| {
                let p = p.as_ref();
                glob::Pattern::new(p)
                    .map_err(|e| LintError::pattern(format!("Invalid pattern '{p}': {e}")))
            })
            .collect::<LintResult<Vec<_>>>()?;

        Ok(Self { patterns })
    }

    /// Whether the basename of `path` matches any pattern
    pub fn covers(&self, path: &Path) -> bool {
        let Some(name) = path.file_name() else {
            return false;
        };
        let name = name.to_string_lossy();
        self.patterns.iter().any(|p| p.matches(&name))
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("layer-1.instructions.md", true)]
    #[case("layer-.instructions.md", true)]
    #[case("dir/layer-core.instructions.md", true)]
    #[case("players-layer-1.instructions.md", false)]
    #[case("Layer-1.instructions.md", false)]
    #[case("core.instructions.md", false)]
    fn test_prefix_glob(#[case] path: &str, #[case] expected: bool) {
        let allow = AllowList::new(&["layer-*"]).unwrap();
        assert_eq!(allow.covers(Path::new(path)), expected);
    }

    #[test]
    fn test_empty_list_covers_nothing() {
        let allow = AllowList::new::<&str>(&[]).unwrap();
        assert!(allow.is_empty());
        assert!(!allow.covers(Path::new("layer-1.instructions.md")));
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        assert!(AllowList::new(&["[unclosed"]).is_err());
    }
}
