//! Filesystem utilities.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::Pattern;
use walkdir::WalkDir;

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Read a file to string, with nice error messages.
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read file: {}", path.display()))
}

/// Write a string to a file, creating parent directories if needed.
pub fn write_string(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, contents).with_context(|| format!("failed to write file: {}", path.display()))
}

/// Copy a file, creating the destination's parent directories if needed.
pub fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    if let Some(parent) = dst.parent() {
        ensure_dir(parent)?;
    }
    fs::copy(src, dst).with_context(|| {
        format!("failed to copy {} to {}", src.display(), dst.display())
    })?;
    Ok(())
}

/// Recursively collect files under `root` whose file name matches `pattern`.
///
/// Returned paths are relative to `root` and sorted, so the directory
/// structure below `root` can be reproduced at the destination.
pub fn matching_files(root: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let pattern =
        Pattern::new(pattern).with_context(|| format!("invalid file pattern: {}", pattern))?;

    let mut results = Vec::new();
    for entry in WalkDir::new(root).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("walk error under {}: {}", root.display(), e);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let matches = entry
            .file_name()
            .to_str()
            .map(|name| pattern.matches(name))
            .unwrap_or(false);

        if matches {
            if let Ok(rel) = entry.path().strip_prefix(root) {
                results.push(rel.to_path_buf());
            }
        }
    }

    results.sort();
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_matching_files_is_recursive_and_filtered() {
        let tmp = TempDir::new().unwrap();
        let include = tmp.path().join("include");
        fs::create_dir_all(include.join("lms/detail")).unwrap();
        fs::write(include.join("Library.h"), "").unwrap();
        fs::write(include.join("lms/Book.h"), "").unwrap();
        fs::write(include.join("lms/detail/User.h"), "").unwrap();
        fs::write(include.join("lms/Book.hpp"), "").unwrap();
        fs::write(include.join("README.md"), "").unwrap();

        let files = matching_files(&include, "*.h").unwrap();
        assert_eq!(
            files,
            vec![
                PathBuf::from("Library.h"),
                PathBuf::from("lms/Book.h"),
                PathBuf::from("lms/detail/User.h"),
            ]
        );
    }

    #[test]
    fn test_write_string_creates_parents() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("a/b/c.txt");
        write_string(&path, "hello").unwrap();
        assert_eq!(read_to_string(&path).unwrap(), "hello");
    }
}
