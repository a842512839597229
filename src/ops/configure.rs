//! Implementation of `lms-build configure`.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::builder::plan::{configure, ConfigurePlan};
use crate::core::option::OptionValues;
use crate::core::project::Project;
use crate::util::config::OptionCache;
use crate::util::diagnostic::Diagnostic;
use crate::util::fs::{ensure_dir, write_string};

/// Plan file written into the build directory.
pub const PLAN_FILE: &str = "plan.json";

/// Options for a configure run.
#[derive(Debug, Clone)]
pub struct ConfigureOptions {
    /// Project source directory
    pub source_dir: PathBuf,

    /// Build output directory
    pub build_dir: PathBuf,

    /// `NAME=VALUE` option assignments from the command line
    pub assignments: Vec<String>,

    /// Compute the plan without writing anything
    pub dry_run: bool,
}

/// Result of a configure run.
#[derive(Debug)]
pub struct ConfigureResult {
    pub plan: ConfigurePlan,

    /// Files written into the build directory
    pub written: Vec<PathBuf>,
}

/// Parse command-line assignments into option values.
pub fn parse_assignments(assignments: &[String]) -> Result<OptionValues> {
    let mut values = OptionValues::new();
    for assignment in assignments {
        values.apply_assignment(assignment)?;
    }
    Ok(values)
}

/// Load the project and cached options for a build directory.
///
/// Command-line assignments are applied on top of the cache.
pub fn load_configuration(
    source_dir: &Path,
    build_dir: &Path,
    assignments: &[String],
) -> Result<(Project, OptionCache)> {
    let project = Project::discover(source_dir)?;

    let mut cache = OptionCache::load_or_default(&OptionCache::path(build_dir))?;
    let source = source_dir
        .canonicalize()
        .unwrap_or_else(|_| source_dir.to_path_buf());

    if let Some(ref cached) = cache.source_dir {
        if cached != &source {
            bail!(
                "build directory `{}` was configured for source directory `{}`, not `{}`\n\
                 help: Use a fresh build directory or remove `{}`",
                build_dir.display(),
                cached.display(),
                source.display(),
                OptionCache::path(build_dir).display()
            );
        }
    }

    cache.source_dir = Some(source);
    cache.merge(&parse_assignments(assignments)?);

    Ok((project, cache))
}

/// Configure a build directory.
pub fn configure_build(opts: &ConfigureOptions) -> Result<ConfigureResult> {
    let (project, cache) = load_configuration(&opts.source_dir, &opts.build_dir, &opts.assignments)?;

    let mut plan = configure(&project, &cache.options)
        .with_context(|| format!("failed to configure `{}`", project.name))?;

    if plan.library_enabled() {
        let include_dir = opts.source_dir.join(&project.layout.include_dir);
        if !include_dir.is_dir() {
            plan.diagnostics.push(
                Diagnostic::warning("public header directory does not exist")
                    .with_location(include_dir)
                    .with_hint(
                        "install will copy no headers; create it or set `targets.include_dir` in lms.toml",
                    ),
            );
        }
    }

    if opts.dry_run {
        return Ok(ConfigureResult {
            plan,
            written: Vec::new(),
        });
    }

    ensure_dir(&opts.build_dir)?;
    let mut written = Vec::new();

    for file in plan.generated_files() {
        let path = file.build_path(&opts.build_dir);
        write_string(&path, &file.contents)?;
        tracing::debug!("generated {}", path.display());
        written.push(path);
    }

    let plan_path = opts.build_dir.join(PLAN_FILE);
    let json = plan
        .to_json()
        .with_context(|| "failed to serialize configure plan")?;
    write_string(&plan_path, &json)?;
    written.push(plan_path);

    let cache_path = OptionCache::path(&opts.build_dir);
    cache.save(&cache_path)?;
    written.push(cache_path);

    tracing::info!(
        "Configured {} {} in {}",
        plan.project,
        plan.version,
        opts.build_dir.display()
    );

    Ok(ConfigureResult { plan, written })
}
