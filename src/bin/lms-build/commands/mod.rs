//! Command implementations

pub mod completions;
pub mod configure;
pub mod flags;
pub mod graph;
pub mod init;
pub mod install;
pub mod locate;
pub mod package;

use anyhow::{Context, Result};

use crate::cli::ProjectArgs;
use lms_build::builder::graph::GraphError;
use lms_build::builder::plan::{configure, ConfigurePlan, PlanError};
use lms_build::core::option::OptionError;
use lms_build::core::Project;
use lms_build::ops::configure::{load_configuration, parse_assignments};
use lms_build::util::diagnostic::{emit, suggestions};

/// Compute a plan in memory from the source directory, the cached options
/// of `-B` (if given) and `-D` assignments. Nothing is written.
pub fn plan_for(args: &ProjectArgs) -> Result<ConfigurePlan> {
    let (project, options) = match args.build_dir {
        Some(ref build_dir) => {
            let (project, cache) = load_configuration(&args.source_dir, build_dir, &args.define)?;
            (project, cache.options)
        }
        None => (
            Project::discover(&args.source_dir)?,
            parse_assignments(&args.define)?,
        ),
    };

    configure(&project, &options)
        .map_err(|e| explain(e.into()))
        .with_context(|| format!("failed to configure `{}`", project.name))
}

/// Attach a hint to errors the user can fix from the command line.
pub fn explain(err: anyhow::Error) -> anyhow::Error {
    let unknown = match err.downcast_ref::<PlanError>() {
        Some(PlanError::Graph(GraphError::Option(OptionError::Unknown { declared, .. }))) => {
            Some(declared.join(", "))
        }
        _ => None,
    };

    match unknown {
        Some(declared) => anyhow::anyhow!(
            "{:#}\n  = declared options: {}\n{}",
            err,
            declared,
            suggestions::UNKNOWN_OPTION
        ),
        None => err,
    }
}

/// Print the diagnostics collected while configuring.
pub fn emit_diagnostics(plan: &ConfigurePlan, color: bool) {
    for diagnostic in &plan.diagnostics {
        emit(diagnostic, color);
    }
}
