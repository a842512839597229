//! Configure plan generation.
//!
//! A ConfigurePlan is everything one configuration run produces: the target
//! graph, install rules, the export descriptor and the package manifest.
//! It is computed once and never modified; the external build phase reads
//! it as JSON.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

use crate::builder::export::{ExportDescriptor, GeneratedFile};
use crate::builder::graph::{GraphError, TargetGraph};
use crate::builder::install::{plan_install_rules, InstallError, InstallRule};
use crate::builder::package::PackageManifest;
use crate::core::option::OptionValues;
use crate::core::project::Project;
use crate::core::version::ProjectVersion;
use crate::util::diagnostic::Diagnostic;

/// Errors that abort configuration.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Install(#[from] InstallError),
}

/// The complete output of one configuration run.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigurePlan {
    /// Project name
    pub project: String,

    /// Project version
    pub version: ProjectVersion,

    /// Effective value of every declared option
    pub options: BTreeMap<String, bool>,

    /// Targets and link edges
    pub graph: TargetGraph,

    /// Install rules (empty when the library is disabled)
    pub install_rules: Vec<InstallRule>,

    /// Export descriptor (absent when the library is disabled)
    pub export: Option<ExportDescriptor>,

    /// Package manifest (always present)
    pub package: PackageManifest,

    /// Diagnostics produced during configuration
    pub diagnostics: Vec<Diagnostic>,
}

/// Configure `project` under `options`.
pub fn configure(project: &Project, options: &OptionValues) -> Result<ConfigurePlan, PlanError> {
    let graph = TargetGraph::build(project, options)?;
    let export = ExportDescriptor::plan(project, &graph);
    let install_rules = plan_install_rules(project, &graph, export.as_ref())?;
    let package = PackageManifest::from_project(project);

    let mut resolved = BTreeMap::new();
    resolved.insert(project.option.name.clone(), options.resolve(&project.option));

    let diagnostics = graph.diagnostics().to_vec();

    tracing::debug!(
        "configured {} targets, {} install rules",
        graph.len(),
        install_rules.len()
    );

    Ok(ConfigurePlan {
        project: project.name.clone(),
        version: project.version.clone(),
        options: resolved,
        graph,
        install_rules,
        export,
        package,
        diagnostics,
    })
}

impl ConfigurePlan {
    /// Whether the library is part of this configuration.
    pub fn library_enabled(&self) -> bool {
        self.graph.library_enabled()
    }

    /// Files to write into the build output area.
    pub fn generated_files(&self) -> Vec<GeneratedFile> {
        self.export
            .as_ref()
            .map(ExportDescriptor::generated_files)
            .unwrap_or_default()
    }

    /// Serialize the plan as pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
