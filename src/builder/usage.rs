//! Usage-requirement propagation.
//!
//! Computes the effective compile requirements of a target: its own public
//! and private surface, plus the public surface of everything it links
//! against. Public surfaces keep propagating through public link edges; a
//! private edge contributes the dependency's public surface to the linking
//! target but goes no further.

use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::builder::graph::TargetGraph;
use crate::core::language::{CompileFeature, CppStandard};
use crate::core::surface::{CompileRequirements, Define};
use crate::core::target::{LinkTarget, Target, Visibility};

/// Errors from usage resolution.
#[derive(Debug, Error)]
pub enum UsageError {
    #[error("target `{0}` not found\nhelp: Run `lms-build graph` to see available targets")]
    TargetNotFound(String),
}

/// Which surface section a value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    CompilePublic,
    CompilePrivate,
}

impl fmt::Display for SurfaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfaceKind::CompilePublic => write!(f, "public"),
            SurfaceKind::CompilePrivate => write!(f, "private"),
        }
    }
}

/// Where a requirement originated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    pub target: String,
    pub surface_kind: SurfaceKind,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.target, self.surface_kind)
    }
}

/// A value paired with its provenance information.
#[derive(Debug, Clone)]
pub struct WithProvenance<T> {
    pub value: T,
    pub provenance: Provenance,
}

impl<T> WithProvenance<T> {
    fn new(value: T, target: &str, surface_kind: SurfaceKind) -> Self {
        WithProvenance {
            value,
            provenance: Provenance {
                target: target.to_string(),
                surface_kind,
            },
        }
    }
}

/// Effective compile requirements for one target.
#[derive(Debug, Clone, Default)]
pub struct EffectiveCompile {
    pub include_dirs: Vec<WithProvenance<PathBuf>>,
    pub features: Vec<WithProvenance<CompileFeature>>,
    pub defines: Vec<WithProvenance<Define>>,
    /// Imported targets reached through the link graph
    pub imported: Vec<String>,
}

impl EffectiveCompile {
    /// Highest language standard requested by any feature.
    pub fn cxx_standard(&self) -> Option<CppStandard> {
        self.features.iter().map(|f| f.value.standard()).max()
    }

    /// Convert to compiler flags, without provenance.
    pub fn to_flags(&self) -> Vec<String> {
        let mut flags = Vec::new();

        if let Some(std) = self.cxx_standard() {
            flags.push(format!("-std={}", std.as_flag_value()));
        }

        for item in &self.include_dirs {
            flags.push(format!("-I{}", item.value.display()));
        }

        for item in &self.defines {
            flags.push(item.value.to_flag());
        }

        flags
    }

    fn add(&mut self, reqs: &CompileRequirements, target: &str, kind: SurfaceKind) {
        for dir in &reqs.include_dirs {
            if !self.include_dirs.iter().any(|i| &i.value == dir) {
                self.include_dirs
                    .push(WithProvenance::new(dir.clone(), target, kind));
            }
        }
        for feature in &reqs.features {
            if !self.features.iter().any(|i| &i.value == feature) {
                self.features
                    .push(WithProvenance::new(*feature, target, kind));
            }
        }
        for define in &reqs.defines {
            if !self.defines.iter().any(|i| &i.value == define) {
                self.defines
                    .push(WithProvenance::new(define.clone(), target, kind));
            }
        }
    }
}

/// Resolves usage requirements over a [`TargetGraph`].
pub struct UsageResolver<'a> {
    graph: &'a TargetGraph,
}

impl<'a> UsageResolver<'a> {
    pub fn new(graph: &'a TargetGraph) -> Self {
        UsageResolver { graph }
    }

    /// Effective compile requirements for the named target.
    pub fn effective_compile(&self, name: &str) -> Result<EffectiveCompile, UsageError> {
        let target = self
            .graph
            .target(name)
            .ok_or_else(|| UsageError::TargetNotFound(name.to_string()))?;

        let mut result = EffectiveCompile::default();
        result.add(&target.surface.public, &target.name, SurfaceKind::CompilePublic);
        result.add(&target.surface.private, &target.name, SurfaceKind::CompilePrivate);

        let mut visited = HashSet::new();
        visited.insert(target.name.clone());

        // Every direct link contributes, whatever its visibility.
        for edge in &target.links {
            self.collect_interface(&edge.target, &mut visited, &mut result);
        }

        Ok(result)
    }

    /// Add the public surface of `link` and of everything it links publicly.
    fn collect_interface(
        &self,
        link: &LinkTarget,
        visited: &mut HashSet<String>,
        result: &mut EffectiveCompile,
    ) {
        let dep: &Target = match link {
            LinkTarget::Local { name } => match self.graph.target(name) {
                Some(dep) => dep,
                None => return,
            },
            LinkTarget::External { name, .. } => {
                if !result.imported.contains(name) {
                    result.imported.push(name.clone());
                }
                return;
            }
        };

        if !visited.insert(dep.name.clone()) {
            return;
        }

        result.add(&dep.surface.public, &dep.name, SurfaceKind::CompilePublic);

        for edge in dep.links.iter().filter(|e| e.visibility == Visibility::Public) {
            self.collect_interface(&edge.target, visited, result);
        }
    }
}
