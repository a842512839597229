//! Target definitions - what gets built.
//!
//! A Target represents a build unit: an executable, a static library, or
//! an interface-only bundle of usage requirements that produces no
//! artifact of its own.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::language::CompileFeature;
use crate::core::surface::{CompileSurface, Define};

/// The kind of target being built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetKind {
    /// Interface-only target: no sources, no artifact
    Interface,

    /// Static library (.a / .lib)
    #[serde(alias = "staticlib")]
    StaticLibrary,

    /// Executable binary
    #[serde(alias = "exe")]
    Executable,
}

impl TargetKind {
    /// File produced by a target of this kind on `os` (a `std::env::consts::OS`
    /// value), or `None` for interface targets.
    pub fn output_filename(&self, name: &str, os: &str) -> Option<String> {
        let windows = os == "windows";
        match self {
            TargetKind::Interface => None,
            TargetKind::StaticLibrary if windows => Some(format!("{}.lib", name)),
            TargetKind::StaticLibrary => Some(format!("lib{}.a", name)),
            TargetKind::Executable if windows => Some(format!("{}.exe", name)),
            TargetKind::Executable => Some(name.to_string()),
        }
    }

    pub fn produces_artifact(&self) -> bool {
        !matches!(self, TargetKind::Interface)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::Interface => "interface",
            TargetKind::StaticLibrary => "static-library",
            TargetKind::Executable => "executable",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visibility of a link edge or usage requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Propagates to dependents
    Public,
    /// Internal only
    Private,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Public => f.write_str("public"),
            Visibility::Private => f.write_str("private"),
        }
    }
}

/// What a link edge points at.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LinkTarget {
    /// A target defined in this project
    Local { name: String },

    /// An imported target supplied by a required external package
    External { package: String, name: String },
}

impl LinkTarget {
    pub fn local(name: impl Into<String>) -> Self {
        LinkTarget::Local { name: name.into() }
    }

    pub fn external(package: impl Into<String>, name: impl Into<String>) -> Self {
        LinkTarget::External {
            package: package.into(),
            name: name.into(),
        }
    }

    /// Name of the linked target.
    pub fn name(&self) -> &str {
        match self {
            LinkTarget::Local { name } | LinkTarget::External { name, .. } => name,
        }
    }
}

impl fmt::Display for LinkTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkTarget::Local { name } => f.write_str(name),
            LinkTarget::External { package, name } => write!(f, "{} (from {})", name, package),
        }
    }
}

/// A link edge from one target to another.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkEdge {
    pub target: LinkTarget,
    pub visibility: Visibility,
}

impl LinkEdge {
    pub fn private(target: LinkTarget) -> Self {
        LinkEdge {
            target,
            visibility: Visibility::Private,
        }
    }

    pub fn public(target: LinkTarget) -> Self {
        LinkEdge {
            target,
            visibility: Visibility::Public,
        }
    }
}

/// A build target with its configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Target name
    pub name: String,

    /// What kind of unit this is
    pub kind: TargetKind,

    /// Source files, relative to the project source directory
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<PathBuf>,

    /// Usage requirements
    #[serde(default)]
    pub surface: CompileSurface,

    /// Outgoing link edges
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<LinkEdge>,
}

impl Target {
    /// Create a new target with the given name and kind.
    pub fn new(name: impl Into<String>, kind: TargetKind) -> Self {
        Target {
            name: name.into(),
            kind,
            sources: Vec::new(),
            surface: CompileSurface::default(),
            links: Vec::new(),
        }
    }

    /// Create a new interface-only target.
    pub fn interface(name: impl Into<String>) -> Self {
        Self::new(name, TargetKind::Interface)
    }

    /// Create a new static library target.
    pub fn static_library(name: impl Into<String>) -> Self {
        Self::new(name, TargetKind::StaticLibrary)
    }

    /// Create a new executable target.
    pub fn executable(name: impl Into<String>) -> Self {
        Self::new(name, TargetKind::Executable)
    }

    /// Set source files.
    pub fn with_sources(mut self, sources: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        self.sources = sources.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_include_dir(mut self, dir: impl Into<PathBuf>, visibility: Visibility) -> Self {
        self.surface.side_mut(visibility).include_dirs.push(dir.into());
        self
    }

    pub fn with_feature(mut self, feature: CompileFeature, visibility: Visibility) -> Self {
        self.surface.side_mut(visibility).features.push(feature);
        self
    }

    pub fn with_define(mut self, define: Define, visibility: Visibility) -> Self {
        self.surface.side_mut(visibility).defines.push(define);
        self
    }

    /// Add a link edge.
    pub fn with_link(mut self, edge: LinkEdge) -> Self {
        self.links.push(edge);
        self
    }

    /// Check whether this target links (directly) against `name`.
    pub fn links_to(&self, name: &str) -> bool {
        self.links.iter().any(|e| e.target.name() == name)
    }

    /// Get the output filename for this target.
    pub fn output_filename(&self, os: &str) -> Option<String> {
        self.kind.output_filename(&self.name, os)
    }
}
