//! Install rule planning.
//!
//! Install rules map built artifacts, header directories and generated
//! files to destinations below the install prefix. Rules exist only when
//! the library option is on.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::builder::export::{ExportDescriptor, GENERATED_DIR};
use crate::builder::graph::TargetGraph;
use crate::core::project::Project;
use crate::core::target::{Target, TargetKind};

/// Errors from install planning.
#[derive(Debug, Error)]
pub enum InstallError {
    #[error("install rule references target `{0}`, which is not defined in this configuration")]
    UnknownTarget(String),
}

/// Which artifact of a target a rule installs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    /// Executables and runtime DLLs
    Runtime,
    /// Shared libraries on non-DLL platforms
    Library,
    /// Static archives
    Archive,
}

impl ArtifactKind {
    /// Whether a target of `kind` produces this artifact.
    ///
    /// Rules for artifacts a target does not produce are kept in the plan
    /// and skipped during installation.
    pub fn applies_to(&self, kind: TargetKind) -> bool {
        matches!(
            (self, kind),
            (ArtifactKind::Runtime, TargetKind::Executable)
                | (ArtifactKind::Archive, TargetKind::StaticLibrary)
        )
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::Runtime => f.write_str("runtime"),
            ArtifactKind::Library => f.write_str("library"),
            ArtifactKind::Archive => f.write_str("archive"),
        }
    }
}

/// A single install rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InstallRule {
    /// Install one artifact of a target
    Artifact {
        target: String,
        artifact: ArtifactKind,
        destination: PathBuf,
        /// Export set the target is recorded in, if any
        #[serde(default, skip_serializing_if = "Option::is_none")]
        export_set: Option<String>,
    },

    /// Install files under a source directory whose names match `pattern`,
    /// recursively, keeping their relative layout
    Headers {
        directory: PathBuf,
        pattern: String,
        destination: PathBuf,
    },

    /// Install files generated into the build directory
    Generated {
        files: Vec<PathBuf>,
        destination: PathBuf,
    },
}

impl InstallRule {
    /// Destination relative to the install prefix.
    pub fn destination(&self) -> &Path {
        match self {
            InstallRule::Artifact { destination, .. }
            | InstallRule::Headers { destination, .. }
            | InstallRule::Generated { destination, .. } => destination,
        }
    }

    /// Target installed by this rule, if it installs one.
    pub fn target(&self) -> Option<&str> {
        match self {
            InstallRule::Artifact { target, .. } => Some(target),
            _ => None,
        }
    }

    /// One-line description for listings.
    pub fn describe(&self) -> String {
        match self {
            InstallRule::Artifact {
                target, artifact, ..
            } => format!("{} {}", target, artifact),
            InstallRule::Headers {
                directory, pattern, ..
            } => format!("{}/**/{}", directory.display(), pattern),
            InstallRule::Generated { files, .. } => files
                .iter()
                .map(|f| f.display().to_string())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

fn artifact_rule(
    target: &Target,
    artifact: ArtifactKind,
    destination: &str,
    export_set: Option<&str>,
) -> InstallRule {
    InstallRule::Artifact {
        target: target.name.clone(),
        artifact,
        destination: PathBuf::from(destination),
        export_set: export_set.map(str::to_string),
    }
}

/// Plan install rules for a configuration.
///
/// Returns an empty list when the library option is off.
pub fn plan_install_rules(
    project: &Project,
    graph: &TargetGraph,
    export: Option<&ExportDescriptor>,
) -> Result<Vec<InstallRule>, InstallError> {
    if !graph.library_enabled() {
        tracing::debug!("library disabled, no install rules");
        return Ok(Vec::new());
    }

    let layout = &project.layout;
    let library = graph
        .target(&layout.library)
        .ok_or_else(|| InstallError::UnknownTarget(layout.library.clone()))?;
    let executable = graph
        .target(&layout.executable)
        .ok_or_else(|| InstallError::UnknownTarget(layout.executable.clone()))?;

    let export_set = export.map(|e| e.export_set.as_str());

    let mut rules = vec![
        artifact_rule(library, ArtifactKind::Runtime, "bin", export_set),
        artifact_rule(library, ArtifactKind::Library, "lib", export_set),
        artifact_rule(library, ArtifactKind::Archive, "lib", export_set),
        artifact_rule(executable, ArtifactKind::Runtime, "bin", None),
        InstallRule::Headers {
            directory: layout.include_dir.clone(),
            pattern: layout.header_pattern.clone(),
            destination: PathBuf::from("include"),
        },
    ];

    if let Some(export) = export {
        rules.push(InstallRule::Generated {
            files: export
                .generated_files()
                .into_iter()
                .map(|f| Path::new(GENERATED_DIR).join(f.name))
                .collect(),
            destination: export.destination.clone(),
        });
    }

    for rule in &rules {
        if let Some(name) = rule.target() {
            if !graph.contains(name) {
                return Err(InstallError::UnknownTarget(name.to_string()));
            }
        }
    }

    Ok(rules)
}
