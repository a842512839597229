//! Implementation of `lms-build locate`.
//!
//! Finds an installed package the way a downstream project would: by
//! searching each prefix for the package's locator file and asking its
//! version file whether the installed version satisfies the request.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use semver::Version;
use thiserror::Error;

use crate::core::version::{parse_version_lenient, Compatibility};
use crate::util::fs::read_to_string;

/// Environment variable holding additional search prefixes.
pub const PREFIX_PATH_ENV: &str = "CMAKE_PREFIX_PATH";

/// Errors from package lookup.
#[derive(Debug, Error)]
pub enum LocateError {
    #[error("could not find package `{name}` (searched {} prefixes)", searched.len())]
    NotFound { name: String, searched: Vec<PathBuf> },

    #[error("invalid version request `{0}`")]
    InvalidRequest(String),

    #[error("found package `{name}` but no installed version is compatible with {requested}")]
    Incompatible {
        name: String,
        requested: String,
        /// Candidate config files with the version they advertise
        candidates: Vec<(PathBuf, String)>,
    },
}

/// Options for locating a package.
#[derive(Debug, Clone, Default)]
pub struct LocateOptions {
    /// Package name, e.g. `LMS`
    pub name: String,

    /// Minimum requested version
    pub version: Option<String>,

    /// Prefixes to search, in order
    pub prefixes: Vec<PathBuf>,
}

impl LocateOptions {
    pub fn new(name: impl Into<String>) -> Self {
        LocateOptions {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Append prefixes from a `CMAKE_PREFIX_PATH`-style list.
    pub fn with_prefix_path(mut self, value: &OsStr) -> Self {
        self.prefixes.extend(split_prefix_path(value));
        self
    }
}

/// A package found under a prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedPackage {
    pub prefix: PathBuf,

    /// The locator file that was found
    pub config_file: PathBuf,

    /// Version from the version file, if one exists
    pub version: Option<String>,

    pub compatibility: Option<Compatibility>,
}

/// Split a platform path list into prefixes, dropping empty entries.
pub fn split_prefix_path(value: &OsStr) -> Vec<PathBuf> {
    std::env::split_paths(value)
        .filter(|p| !p.as_os_str().is_empty())
        .collect()
}

/// Directories below a prefix searched for a package's config files.
fn search_dirs(prefix: &Path, name: &str) -> Vec<PathBuf> {
    let lower = name.to_ascii_lowercase();
    vec![
        prefix.join("lib").join("cmake").join(name),
        prefix.join("lib").join("cmake").join(&lower),
        prefix.join("share").join("cmake").join(name),
        prefix.join(name),
    ]
}

/// Config file names for a package, with the matching version file names.
fn config_names(name: &str) -> [(String, String); 2] {
    let lower = name.to_ascii_lowercase();
    [
        (
            format!("{}Config.cmake", name),
            format!("{}ConfigVersion.cmake", name),
        ),
        (
            format!("{}-config.cmake", lower),
            format!("{}-config-version.cmake", lower),
        ),
    ]
}

/// Version information extracted from a version file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    pub version: String,
    pub compatibility: Compatibility,
}

static VERSION_VAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"set\(\s*(PACKAGE_VERSION|PACKAGE_COMPATIBILITY)\s+"([^"]*)"\s*\)"#)
        .expect("version file regex is valid")
});

/// Parse the version and compatibility policy out of a version file.
///
/// Files without a compatibility variable are treated as `AnyNewerVersion`.
pub fn parse_version_file(contents: &str) -> Option<VersionInfo> {
    let mut version = None;
    let mut compatibility = Compatibility::default();

    for caps in VERSION_VAR.captures_iter(contents) {
        match &caps[1] {
            "PACKAGE_VERSION" => version = Some(caps[2].to_string()),
            _ => match caps[2].parse() {
                Ok(policy) => compatibility = policy,
                Err(e) => tracing::warn!("{}", e),
            },
        }
    }

    version.map(|version| VersionInfo {
        version,
        compatibility,
    })
}

/// Locate an installed package.
pub fn locate(opts: &LocateOptions) -> Result<LocatedPackage, LocateError> {
    let requested = match opts.version {
        Some(ref v) => Some(
            parse_version_lenient(v).ok_or_else(|| LocateError::InvalidRequest(v.clone()))?,
        ),
        None => None,
    };

    let mut rejected = Vec::new();

    for prefix in &opts.prefixes {
        for dir in search_dirs(prefix, &opts.name) {
            for (config, version_file) in config_names(&opts.name) {
                let config_file = dir.join(&config);
                if !config_file.is_file() {
                    continue;
                }
                tracing::debug!("considering {}", config_file.display());

                let info = read_to_string(&dir.join(&version_file))
                    .ok()
                    .and_then(|contents| parse_version_file(&contents));

                if let Some(ref requested) = requested {
                    if !satisfies(info.as_ref(), requested) {
                        let advertised = info
                            .as_ref()
                            .map(|i| i.version.clone())
                            .unwrap_or_else(|| "unknown".to_string());
                        rejected.push((config_file, advertised));
                        continue;
                    }
                }

                return Ok(LocatedPackage {
                    prefix: prefix.clone(),
                    config_file,
                    version: info.as_ref().map(|i| i.version.clone()),
                    compatibility: info.map(|i| i.compatibility),
                });
            }
        }
    }

    if rejected.is_empty() {
        Err(LocateError::NotFound {
            name: opts.name.clone(),
            searched: opts.prefixes.clone(),
        })
    } else {
        Err(LocateError::Incompatible {
            name: opts.name.clone(),
            requested: opts.version.clone().unwrap_or_default(),
            candidates: rejected,
        })
    }
}

/// A package without a version file cannot satisfy a versioned request.
fn satisfies(info: Option<&VersionInfo>, requested: &Version) -> bool {
    let Some(info) = info else {
        return false;
    };
    match parse_version_lenient(&info.version) {
        Some(installed) => info.compatibility.is_compatible(&installed, requested),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn install_package(prefix: &Path, version: &str, compatibility: &str) {
        let dir = prefix.join("lib/cmake/LMS");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("LMSConfig.cmake"), "include(LMSTargets.cmake)\n").unwrap();
        std::fs::write(
            dir.join("LMSConfigVersion.cmake"),
            format!(
                "set(PACKAGE_VERSION \"{}\")\nset(PACKAGE_COMPATIBILITY \"{}\")\n",
                version, compatibility
            ),
        )
        .unwrap();
    }

    fn opts(prefixes: &[&Path], version: Option<&str>) -> LocateOptions {
        LocateOptions {
            name: "LMS".to_string(),
            version: version.map(str::to_string),
            prefixes: prefixes.iter().map(|p| p.to_path_buf()).collect(),
        }
    }

    #[test]
    fn test_parse_version_file() {
        let info = parse_version_file(
            "set(PACKAGE_VERSION \"2.0\")\nset(PACKAGE_COMPATIBILITY \"SameMajorVersion\")\n",
        )
        .unwrap();
        assert_eq!(info.version, "2.0");
        assert_eq!(info.compatibility, Compatibility::SameMajorVersion);

        assert!(parse_version_file("# nothing here\n").is_none());
    }

    #[test]
    fn test_locate_without_version() {
        let tmp = TempDir::new().unwrap();
        install_package(tmp.path(), "2.0", "AnyNewerVersion");

        let found = locate(&opts(&[tmp.path()], None)).unwrap();
        assert_eq!(found.prefix, tmp.path());
        assert!(found.config_file.ends_with("lib/cmake/LMS/LMSConfig.cmake"));
        assert_eq!(found.version.as_deref(), Some("2.0"));
    }

    #[test]
    fn test_any_newer_version() {
        let tmp = TempDir::new().unwrap();
        install_package(tmp.path(), "2.0", "AnyNewerVersion");

        assert!(locate(&opts(&[tmp.path()], Some("1.5"))).is_ok());
        assert!(locate(&opts(&[tmp.path()], Some("2.0"))).is_ok());
        assert!(matches!(
            locate(&opts(&[tmp.path()], Some("2.1"))),
            Err(LocateError::Incompatible { .. })
        ));
    }

    #[test]
    fn test_same_major_rejects_older_major_request() {
        let tmp = TempDir::new().unwrap();
        install_package(tmp.path(), "2.0", "SameMajorVersion");

        assert!(locate(&opts(&[tmp.path()], Some("1.0"))).is_err());
        assert!(locate(&opts(&[tmp.path()], Some("2"))).is_ok());
    }

    #[test]
    fn test_later_prefix_can_satisfy() {
        let old = TempDir::new().unwrap();
        let new = TempDir::new().unwrap();
        install_package(old.path(), "1.0", "AnyNewerVersion");
        install_package(new.path(), "2.0", "AnyNewerVersion");

        let found = locate(&opts(&[old.path(), new.path()], Some("2.0"))).unwrap();
        assert_eq!(found.prefix, new.path());
    }

    #[test]
    fn test_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = locate(&opts(&[tmp.path()], None)).unwrap_err();
        assert!(matches!(err, LocateError::NotFound { .. }));
    }

    #[test]
    fn test_lowercase_config_name() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("lib/cmake/lms");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("lms-config.cmake"), "").unwrap();

        let found = locate(&opts(&[tmp.path()], None)).unwrap();
        assert!(found.version.is_none());

        // No version file, so a versioned request fails.
        assert!(locate(&opts(&[tmp.path()], Some("1.0"))).is_err());
    }

    #[test]
    fn test_split_prefix_path() {
        let joined = std::env::join_paths(["/opt/a", "/opt/b"]).unwrap();
        assert_eq!(
            split_prefix_path(&joined),
            vec![PathBuf::from("/opt/a"), PathBuf::from("/opt/b")]
        );
    }
}
