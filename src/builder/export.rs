//! Export descriptors and the files that let other projects find this one.
//!
//! When the library is enabled the project exports it under a package
//! name. Two files are generated into the build output area and installed
//! next to each other:
//!
//! - the *locator* (`<Name>Config.cmake`), which the downstream package
//!   search looks for and which pulls in the exported targets;
//! - the *version file* (`<Name>ConfigVersion.cmake`), which answers
//!   whether the installed version satisfies a requested one.
//!
//! The targets file (`<Name>Targets.cmake`) describing the imported
//! targets is written at install time, once artifact locations are known.

use std::path::{Component, Path, PathBuf};

use serde::Serialize;

use crate::builder::graph::TargetGraph;
use crate::builder::install::{ArtifactKind, InstallRule};
use crate::core::project::Project;
use crate::core::version::{Compatibility, ProjectVersion};

/// Sub-directory of the build directory receiving generated files.
pub const GENERATED_DIR: &str = "generated";

/// Variable carrying the compatibility policy in version files.
pub const COMPATIBILITY_VAR: &str = "PACKAGE_COMPATIBILITY";

/// A named bundle of installed targets plus its generated files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportDescriptor {
    /// Package name consumers search for
    pub package_name: String,

    /// Name of the exported target set
    pub export_set: String,

    /// Targets included in the export
    pub targets: Vec<String>,

    /// Install destination, relative to the prefix
    pub destination: PathBuf,

    pub locator_file: String,
    pub version_file: String,
    pub targets_file: String,

    /// Version advertised by the version file
    pub version: ProjectVersion,
    pub compatibility: Compatibility,
}

/// A generated file with its contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedFile {
    /// File name within the generated directory
    pub name: String,
    pub contents: String,
}

impl GeneratedFile {
    /// Path of this file inside a build directory.
    pub fn build_path(&self, build_dir: &Path) -> PathBuf {
        build_dir.join(GENERATED_DIR).join(&self.name)
    }
}

impl ExportDescriptor {
    /// Plan the export for a configuration. `None` when the library is off.
    pub fn plan(project: &Project, graph: &TargetGraph) -> Option<Self> {
        if !graph.library_enabled() {
            return None;
        }

        let name = &project.export.name;
        Some(ExportDescriptor {
            package_name: name.clone(),
            export_set: project.export.export_set.clone(),
            targets: vec![project.layout.library.clone()],
            destination: project.export.destination(),
            locator_file: format!("{}Config.cmake", name),
            version_file: format!("{}ConfigVersion.cmake", name),
            targets_file: format!("{}Targets.cmake", name),
            version: project.version.clone(),
            compatibility: project.export.compatibility,
        })
    }

    /// The two files generated at configure time: locator, then version file.
    pub fn generated_files(&self) -> Vec<GeneratedFile> {
        vec![
            GeneratedFile {
                name: self.locator_file.clone(),
                contents: self.render_locator(),
            },
            GeneratedFile {
                name: self.version_file.clone(),
                contents: self.render_version_file(),
            },
        ]
    }

    /// Render the locator file.
    pub fn render_locator(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "# Package configuration for {} {}.\n",
            self.package_name, self.version
        ));
        out.push_str("# Generated by lms-build; do not edit.\n");
        out.push('\n');
        out.push_str(&format!(
            "include(\"${{CMAKE_CURRENT_LIST_DIR}}/{}\")\n",
            self.targets_file
        ));
        out
    }

    /// Render the version file for the configured compatibility policy.
    pub fn render_version_file(&self) -> String {
        let version = self.version.semver();
        let mut out = String::new();

        out.push_str(&format!("# Version file for {}.\n", self.package_name));
        out.push_str("# Generated by lms-build; do not edit.\n");
        out.push('\n');
        out.push_str(&format!("set(PACKAGE_VERSION \"{}\")\n", self.version));
        out.push_str(&format!("set({} \"{}\")\n", COMPATIBILITY_VAR, self.compatibility));
        out.push('\n');

        let incompatible = match self.compatibility {
            Compatibility::AnyNewerVersion => {
                "PACKAGE_VERSION VERSION_LESS PACKAGE_FIND_VERSION".to_string()
            }
            Compatibility::SameMajorVersion => format!(
                "PACKAGE_VERSION VERSION_LESS PACKAGE_FIND_VERSION OR NOT PACKAGE_FIND_VERSION_MAJOR STREQUAL \"{}\"",
                version.major
            ),
            Compatibility::SameMinorVersion => format!(
                "PACKAGE_VERSION VERSION_LESS PACKAGE_FIND_VERSION OR NOT PACKAGE_FIND_VERSION_MAJOR STREQUAL \"{}\" OR NOT PACKAGE_FIND_VERSION_MINOR STREQUAL \"{}\"",
                version.major, version.minor
            ),
            Compatibility::ExactVersion => {
                "NOT PACKAGE_FIND_VERSION VERSION_EQUAL PACKAGE_VERSION".to_string()
            }
        };

        out.push_str(&format!("if({})\n", incompatible));
        out.push_str("  set(PACKAGE_VERSION_COMPATIBLE FALSE)\n");
        out.push_str("else()\n");
        out.push_str("  set(PACKAGE_VERSION_COMPATIBLE TRUE)\n");
        out.push_str("  if(PACKAGE_FIND_VERSION VERSION_EQUAL PACKAGE_VERSION)\n");
        out.push_str("    set(PACKAGE_VERSION_EXACT TRUE)\n");
        out.push_str("  endif()\n");
        out.push_str("endif()\n");
        out
    }

    /// Render the targets file describing the exported imported targets.
    ///
    /// Artifact and header locations are taken from the install rules so the
    /// file stays correct if destinations are changed.
    pub fn render_targets_file(&self, graph: &TargetGraph, rules: &[InstallRule], os: &str) -> String {
        let mut out = String::new();
        out.push_str(&format!("# Exported targets for {}.\n", self.package_name));
        out.push_str("# Generated by lms-build; do not edit.\n");
        out.push('\n');

        // Walk from the export destination back up to the install prefix.
        let depth = self
            .destination
            .components()
            .filter(|c| matches!(c, Component::Normal(_)))
            .count();
        let up = vec![".."; depth].join("/");
        out.push_str(&format!(
            "get_filename_component(_IMPORT_PREFIX \"${{CMAKE_CURRENT_LIST_DIR}}/{}\" ABSOLUTE)\n",
            up
        ));

        let include_dest = rules.iter().find_map(|rule| match rule {
            InstallRule::Headers { destination, .. } => Some(destination.clone()),
            _ => None,
        });

        for name in &self.targets {
            let Some(target) = graph.target(name) else {
                continue;
            };
            let archive_dest = rules.iter().find_map(|rule| match rule {
                InstallRule::Artifact {
                    target: t,
                    artifact: ArtifactKind::Archive,
                    destination,
                    ..
                } if t == name => Some(destination.clone()),
                _ => None,
            });

            out.push('\n');
            out.push_str(&format!("if(NOT TARGET {})\n", name));
            out.push_str(&format!("  add_library({} STATIC IMPORTED)\n", name));
            out.push_str(&format!("  set_target_properties({} PROPERTIES\n", name));
            if let (Some(dest), Some(file)) = (archive_dest, target.output_filename(os)) {
                out.push_str(&format!(
                    "    IMPORTED_LOCATION \"${{_IMPORT_PREFIX}}/{}\"\n",
                    slash_path(&dest.join(file))
                ));
            }
            if let Some(ref dest) = include_dest {
                out.push_str(&format!(
                    "    INTERFACE_INCLUDE_DIRECTORIES \"${{_IMPORT_PREFIX}}/{}\"\n",
                    slash_path(dest)
                ));
            }
            if !target.surface.public.features.is_empty() {
                let features: Vec<String> = target
                    .surface
                    .public
                    .features
                    .iter()
                    .map(|f| f.to_string())
                    .collect();
                out.push_str(&format!(
                    "    INTERFACE_COMPILE_FEATURES \"{}\"\n",
                    features.join(";")
                ));
            }
            out.push_str("  )\n");
            out.push_str("endif()\n");
        }

        out.push('\n');
        out.push_str("unset(_IMPORT_PREFIX)\n");
        out
    }
}

/// Render a relative path with forward slashes regardless of platform.
fn slash_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
