//! Option cache persisted in the build directory.
//!
//! A configure run stores the option assignments it used in
//! `<build>/lms-cache.toml`. The next configure of the same build directory
//! starts from those values; assignments given on the command line take
//! precedence over cached ones.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::option::OptionValues;

/// Cache file name inside the build directory.
pub const CACHE_FILE: &str = "lms-cache.toml";

/// Contents of the option cache.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionCache {
    /// Source directory the build directory was configured from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_dir: Option<PathBuf>,

    /// Option assignments
    pub options: OptionValues,
}

impl OptionCache {
    /// Path of the cache file for a build directory.
    pub fn path(build_dir: &Path) -> PathBuf {
        build_dir.join(CACHE_FILE)
    }

    /// Load the option cache from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read option cache: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse option cache: {}", path.display()))
    }

    /// Load the option cache, or an empty cache if the file doesn't exist.
    ///
    /// An existing but unreadable cache is an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!("no option cache at {}", path.display());
            Ok(Self::default())
        }
    }

    /// Save the option cache to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create build directory: {}", parent.display())
            })?;
        }

        let contents =
            toml::to_string_pretty(self).with_context(|| "failed to serialize option cache")?;

        std::fs::write(path, contents)
            .with_context(|| format!("failed to write option cache: {}", path.display()))?;

        Ok(())
    }

    /// Overlay command-line assignments (they take precedence).
    pub fn merge(&mut self, overrides: &OptionValues) {
        self.options.merge(overrides);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_cache_round_trip() {
        let tmp = TempDir::new().unwrap();
        let path = OptionCache::path(tmp.path());

        let cache = OptionCache {
            source_dir: Some(PathBuf::from("/src/lms")),
            options: OptionValues::new().with("USE_LIBRARY", false),
        };
        cache.save(&path).unwrap();

        let loaded = OptionCache::load(&path).unwrap();
        assert_eq!(loaded, cache);
    }

    #[test]
    fn test_missing_cache_is_empty() {
        let tmp = TempDir::new().unwrap();
        let cache = OptionCache::load_or_default(&OptionCache::path(tmp.path())).unwrap();
        assert!(cache.options.is_empty());
        assert!(cache.source_dir.is_none());
    }

    #[test]
    fn test_corrupt_cache_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = OptionCache::path(tmp.path());
        std::fs::write(&path, "options = 3").unwrap();

        assert!(OptionCache::load(&path).is_err());
        let err = OptionCache::load_or_default(&path).unwrap_err();
        assert!(err.to_string().contains("failed to parse option cache"));
    }

    #[test]
    fn test_command_line_overrides_cache() {
        let mut cache = OptionCache {
            source_dir: None,
            options: OptionValues::new().with("USE_LIBRARY", false),
        };
        cache.merge(&OptionValues::new().with("USE_LIBRARY", true));
        assert_eq!(cache.options.get("USE_LIBRARY"), Some(true));
    }
}
