//! File replacement helpers

use crate::domain::{LintError, LintResult};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Atomically replace `path` with `data` using a tempfile in the same directory.
///
/// The tempfile is removed when any step before the final rename fails, so
/// the target is either untouched or fully rewritten. An existing target keeps
/// its permissions.
pub fn atomic_write(path: &Path, data: &[u8]) -> LintResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| LintError::io(dir, e))?;
    tmp.write_all(data).map_err(|e| LintError::io(tmp.path(), e))?;
    if let Ok(metadata) = fs::metadata(path) {
        tmp.as_file()
            .set_permissions(metadata.permissions())
            .map_err(|e| LintError::io(tmp.path(), e))?;
    }
    tmp.as_file().sync_all().map_err(|e| LintError::io(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| LintError::io(path, e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_atomic_write_replaces_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.md");
        fs::write(&path, "old").unwrap();

        atomic_write(&path, b"new").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }

    #[cfg(unix)]
    #[test]
    fn test_atomic_write_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.md");
        fs::write(&path, "teh\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        atomic_write(&path, b"the\n").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o644);
        assert_eq!(fs::read_to_string(&path).unwrap(), "the\n");
    }

    #[test]
    fn test_atomic_write_leaves_no_stray_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.md");

        atomic_write(&path, b"one").unwrap();
        atomic_write(&path, b"two").unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_atomic_write_into_missing_dir_fails_cleanly() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent/notes.md");
        assert!(matches!(atomic_write(&path, b"x"), Err(LintError::Io { .. })));
    }
}
