//! `lms.toml` project description.
//!
//! The project file is optional. Every section has defaults describing the
//! Library Management System sample: an interface settings target, the
//! `lms` executable, the `Library` static library and its test executable.
//! A project file only needs to list what differs.

use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::language::CppStandard;
use crate::core::option::BuildOption;
use crate::core::version::{Compatibility, ProjectVersion};

/// Canonical project file name.
pub const PROJECT_FILE: &str = "lms.toml";

/// The fully resolved project description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Project {
    /// Project name
    pub name: String,

    /// Project version, also advertised by the export version file
    pub version: ProjectVersion,

    /// The toggle gating the library
    pub option: BuildOption,

    /// Target names and sources
    pub layout: TargetLayout,

    /// Export descriptor settings
    pub export: ExportConfig,

    /// Package manifest settings
    pub package: PackageConfig,

    /// Directory containing the project sources
    pub source_dir: PathBuf,
}

/// Names and source lists of the targets the graph builder creates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TargetLayout {
    /// Interface target carrying shared compile settings
    pub settings: String,

    /// Language standard required through the settings target
    pub cxx_standard: CppStandard,

    /// Main executable
    pub executable: String,
    pub executable_sources: Vec<PathBuf>,

    /// Static library built when the option is on
    pub library: String,
    pub library_sources: Vec<PathBuf>,

    /// Public header directory of the library
    pub include_dir: PathBuf,

    /// File-name filter for installed headers
    pub header_pattern: String,

    /// Definition added to the executable when the library is linked
    pub library_define: String,

    /// Test executable built when the option is on
    pub tests: String,
    pub test_sources: Vec<PathBuf>,

    /// Testing framework package and the imported target linked by tests
    pub test_framework: TestFramework,
}

impl Default for TargetLayout {
    fn default() -> Self {
        TargetLayout {
            settings: "lms_compiler_flags".to_string(),
            cxx_standard: CppStandard::Cpp17,
            executable: "lms".to_string(),
            executable_sources: vec![PathBuf::from("src/main.cpp")],
            library: "Library".to_string(),
            library_sources: vec![
                PathBuf::from("src/Library.cpp"),
                PathBuf::from("src/User.cpp"),
                PathBuf::from("src/Book.cpp"),
            ],
            include_dir: PathBuf::from("include"),
            header_pattern: "*.h".to_string(),
            library_define: "USE_LIBRARY".to_string(),
            tests: "lms_tests".to_string(),
            test_sources: vec![PathBuf::from("tests/test_library.cpp")],
            test_framework: TestFramework::default(),
        }
    }
}

/// External testing dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TestFramework {
    /// Package that must be found at configure time
    pub package: String,
    /// Imported target the test executable links against
    pub target: String,
}

impl Default for TestFramework {
    fn default() -> Self {
        TestFramework {
            package: "GTest".to_string(),
            target: "GTest::gtest_main".to_string(),
        }
    }
}

/// Export descriptor settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// Package name consumers search for
    pub name: String,

    /// Name of the exported target set
    pub export_set: String,

    /// Install destination of the locator bundle; `lib/cmake/<name>` when unset
    pub destination: Option<PathBuf>,

    /// Version compatibility policy written to the version file
    pub compatibility: Compatibility,
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            name: "LMS".to_string(),
            export_set: "LibraryTargets".to_string(),
            destination: None,
            compatibility: Compatibility::AnyNewerVersion,
        }
    }
}

impl ExportConfig {
    /// Effective install destination for the locator and version files.
    pub fn destination(&self) -> PathBuf {
        self.destination
            .clone()
            .unwrap_or_else(|| Path::new("lib").join("cmake").join(&self.name))
    }
}

/// Output archive generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Generator {
    /// Debian package
    #[default]
    #[serde(rename = "DEB", alias = "deb")]
    Deb,
}

impl Generator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Generator::Deb => "DEB",
        }
    }

    /// File extension of the produced archive.
    pub fn extension(&self) -> &'static str {
        match self {
            Generator::Deb => "deb",
        }
    }
}

/// Package manifest settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PackageConfig {
    pub name: String,

    /// Tracked independently of the project version
    pub version: ProjectVersion,

    pub generator: Generator,

    pub contact: String,
}

impl Default for PackageConfig {
    fn default() -> Self {
        PackageConfig {
            name: "LibraryManagementSystem".to_string(),
            version: ProjectVersion::new(4, 0),
            generator: Generator::Deb,
            contact: "Library Management System Maintainers <lms@example.com>".to_string(),
        }
    }
}

/// Raw project file as deserialized from TOML.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawProject {
    #[serde(default)]
    project: RawProjectSection,

    #[serde(default)]
    option: Option<BuildOption>,

    #[serde(default)]
    targets: TargetLayout,

    #[serde(default)]
    export: ExportConfig,

    #[serde(default)]
    package: PackageConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawProjectSection {
    name: String,
    version: String,
}

impl Default for RawProjectSection {
    fn default() -> Self {
        RawProjectSection {
            name: "LibraryManagementSystem".to_string(),
            version: "2.0".to_string(),
        }
    }
}

fn default_option() -> BuildOption {
    BuildOption::new(
        "USE_LIBRARY",
        "Build the Library Management System library",
        true,
    )
}

impl Project {
    /// The built-in project description rooted at `source_dir`.
    pub fn with_defaults(source_dir: impl Into<PathBuf>) -> Self {
        Project {
            name: RawProjectSection::default().name,
            version: ProjectVersion::new(2, 0),
            option: default_option(),
            layout: TargetLayout::default(),
            export: ExportConfig::default(),
            package: PackageConfig::default(),
            source_dir: source_dir.into(),
        }
    }

    /// Load `lms.toml` from `source_dir`, falling back to defaults if absent.
    pub fn discover(source_dir: &Path) -> Result<Self> {
        let path = source_dir.join(PROJECT_FILE);
        if path.exists() {
            Self::load(&path)
        } else {
            tracing::debug!(
                "no {} in {}, using built-in project description",
                PROJECT_FILE,
                source_dir.display()
            );
            Ok(Self::with_defaults(source_dir))
        }
    }

    /// Load a project file from a path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read project file: {}", path.display()))?;

        Self::parse(&content, path)
    }

    /// Parse project file content.
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let raw: RawProject = toml::from_str(content)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        let source_dir = path.parent().unwrap_or(Path::new(".")).to_path_buf();
        Self::from_raw(raw, source_dir)
    }

    fn from_raw(raw: RawProject, source_dir: PathBuf) -> Result<Self> {
        let version: ProjectVersion = raw
            .project
            .version
            .parse()
            .with_context(|| format!("invalid version for project `{}`", raw.project.name))?;

        if raw.project.name.trim().is_empty() {
            anyhow::bail!("project name must not be empty");
        }
        if raw.export.name.trim().is_empty() {
            anyhow::bail!("export name must not be empty");
        }
        if let Some(ref destination) = raw.export.destination {
            if !is_contained_relative(destination) {
                anyhow::bail!(
                    "export destination `{}` must be a relative path inside the install prefix",
                    destination.display()
                );
            }
        }

        let package = raw.package;
        if package.version != version {
            tracing::debug!(
                "package version {} differs from project version {}",
                package.version,
                version
            );
        }

        Ok(Project {
            name: raw.project.name,
            version,
            option: raw.option.unwrap_or_else(default_option),
            layout: raw.targets,
            export: raw.export,
            package,
            source_dir,
        })
    }
}

/// True for a relative path with no `..` or root components.
fn is_contained_relative(path: &Path) -> bool {
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        && path.components().any(|c| matches!(c, Component::Normal(_)))
}

/// Generate a starter `lms.toml` listing the built-in defaults.
pub fn generate_default_project_file() -> String {
    r#"[project]
name = "LibraryManagementSystem"
version = "2.0"

[option]
name = "USE_LIBRARY"
description = "Build the Library Management System library"
default = true

[export]
name = "LMS"
destination = "lib/cmake/LMS"
compatibility = "AnyNewerVersion"

[package]
name = "LibraryManagementSystem"
version = "4.0"
generator = "DEB"
contact = "Library Management System Maintainers <lms@example.com>"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let project = Project::with_defaults("/src");
        assert_eq!(project.name, "LibraryManagementSystem");
        assert_eq!(project.version.as_str(), "2.0");
        assert_eq!(project.option.name, "USE_LIBRARY");
        assert!(project.option.default);
        assert_eq!(project.layout.library_sources.len(), 3);
        assert_eq!(project.export.destination(), PathBuf::from("lib/cmake/LMS"));
        assert_eq!(project.package.version.as_str(), "4.0");
        assert_eq!(project.package.generator, Generator::Deb);
    }

    #[test]
    fn test_generated_file_matches_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(PROJECT_FILE);
        let parsed = Project::parse(&generate_default_project_file(), &path).unwrap();
        let defaults = Project::with_defaults(tmp.path());

        assert_eq!(parsed.name, defaults.name);
        assert_eq!(parsed.version, defaults.version);
        assert_eq!(parsed.option, defaults.option);
        assert_eq!(parsed.export.destination(), defaults.export.destination());
        assert_eq!(parsed.package, defaults.package);
    }

    #[test]
    fn test_partial_project_file() {
        let content = r#"
[project]
version = "2.1"

[export]
name = "Library"

[targets]
library = "lmscore"
"#;
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(PROJECT_FILE);
        let project = Project::parse(content, &path).unwrap();

        assert_eq!(project.version.as_str(), "2.1");
        assert_eq!(project.layout.library, "lmscore");
        assert_eq!(project.layout.executable, "lms");
        assert_eq!(
            project.export.destination(),
            PathBuf::from("lib/cmake/Library")
        );
        assert_eq!(project.source_dir, tmp.path());
    }

    #[test]
    fn test_invalid_project_version_is_fatal() {
        let content = "[project]\nversion = \"two\"\n";
        let tmp = TempDir::new().unwrap();
        let err = Project::parse(content, &tmp.path().join(PROJECT_FILE)).unwrap_err();
        assert!(format!("{:#}", err).contains("invalid version"));
    }

    #[test]
    fn test_invalid_package_version_is_fatal() {
        let content = r#"
[package]
name = "lms"
version = "four"
contact = "me"
"#;
        let tmp = TempDir::new().unwrap();
        assert!(Project::parse(content, &tmp.path().join(PROJECT_FILE)).is_err());
    }

    #[test]
    fn test_unknown_section_rejected() {
        let tmp = TempDir::new().unwrap();
        let result = Project::parse("[workspace]\n", &tmp.path().join(PROJECT_FILE));
        assert!(result.is_err());
    }

    #[test]
    fn test_package_version_overrides_alone() {
        let tmp = TempDir::new().unwrap();
        let content = "[package]\nversion = \"5.0\"\n";
        let project = Project::parse(content, &tmp.path().join(PROJECT_FILE)).unwrap();

        assert_eq!(project.package.version.as_str(), "5.0");
        assert_eq!(project.package.name, "LibraryManagementSystem");
        assert_eq!(project.package.generator, Generator::Deb);
        assert_eq!(project.version.as_str(), "2.0");
    }

    #[test]
    fn test_misspelled_key_in_section_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(PROJECT_FILE);

        let err = Project::parse("[export]\ndestintion = \"lib/cmake/Library\"\n", &path)
            .unwrap_err();
        assert!(format!("{:#}", err).contains("destintion"));

        for content in [
            "[targets]\nlibary = \"core\"\n",
            "[targets.test_framework]\npackge = \"Catch2\"\n",
            "[package]\nvesion = \"5.0\"\n",
            "[project]\nnmae = \"lms\"\n",
            "[option]\nname = \"USE_LIBRARY\"\ndefualt = false\n",
        ] {
            assert!(Project::parse(content, &path).is_err(), "{}", content);
        }
    }

    #[test]
    fn test_export_destination_must_stay_in_prefix() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(PROJECT_FILE);
        let outside = tmp.path().join("outside");

        for destination in [
            outside.to_string_lossy().into_owned(),
            "../cmake/LMS".to_string(),
            "lib/../../LMS".to_string(),
            ".".to_string(),
        ] {
            let content = format!("[export]\ndestination = {:?}\n", destination);
            let err = Project::parse(&content, &path).unwrap_err();
            assert!(
                format!("{:#}", err).contains("inside the install prefix"),
                "{}",
                destination
            );
        }

        let project = Project::parse("[export]\ndestination = \"share/LMS\"\n", &path).unwrap();
        assert_eq!(project.export.destination(), PathBuf::from("share/LMS"));
    }

    #[test]
    fn test_discover_without_file_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let project = Project::discover(tmp.path()).unwrap();
        assert_eq!(project, Project::with_defaults(tmp.path()));
    }
}
