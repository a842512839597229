//! Implementation of `lms-build install`.
//!
//! Installation replays the install rules of a configured build directory
//! against an install prefix. Artifacts are expected at the top level of
//! the build directory, where the external build phase leaves them.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::builder::install::InstallRule;
use crate::builder::plan::{configure, ConfigurePlan};
use crate::ops::configure::load_configuration;
use crate::util::config::OptionCache;
use crate::util::diagnostic::suggestions;
use crate::util::fs::{copy_file, matching_files, write_string};

/// Options for installing a configured build.
#[derive(Debug, Clone)]
pub struct InstallOptions {
    /// Configured build directory
    pub build_dir: PathBuf,

    /// Source directory (defaults to the one recorded in the option cache)
    pub source_dir: Option<PathBuf>,

    /// Install prefix
    pub prefix: PathBuf,

    /// Dry run - list files without copying them
    pub dry_run: bool,

    /// Operating system used for artifact naming
    pub os: String,
}

impl InstallOptions {
    /// Create install options for the host platform.
    pub fn new(build_dir: impl Into<PathBuf>, prefix: impl Into<PathBuf>) -> Self {
        InstallOptions {
            build_dir: build_dir.into(),
            source_dir: None,
            prefix: prefix.into(),
            dry_run: false,
            os: std::env::consts::OS.to_string(),
        }
    }

    /// Set the source directory explicitly.
    pub fn with_source_dir(mut self, source_dir: impl Into<PathBuf>) -> Self {
        self.source_dir = Some(source_dir.into());
        self
    }

    /// Set dry run mode.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Kind of installed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstalledFileKind {
    /// Built library or executable
    Artifact,
    /// Public header
    Header,
    /// Generated locator or version file
    Generated,
    /// Targets file written at install time
    Targets,
}

/// A file placed under the install prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledFile {
    /// Source path (`None` for files written directly)
    pub source: Option<PathBuf>,

    /// Destination path under the prefix
    pub destination: PathBuf,

    pub kind: InstalledFileKind,
}

/// Result of an install run.
#[derive(Debug)]
pub struct InstallResult {
    pub plan: ConfigurePlan,
    pub files: Vec<InstalledFile>,
}

/// Install a configured build directory into a prefix.
pub fn install(opts: &InstallOptions) -> Result<InstallResult> {
    let cache_path = OptionCache::path(&opts.build_dir);
    if !cache_path.exists() {
        bail!(
            "build directory `{}` has not been configured\n{}",
            opts.build_dir.display(),
            suggestions::NOT_CONFIGURED
        );
    }

    let source_dir = match opts.source_dir {
        Some(ref dir) => dir.clone(),
        None => OptionCache::load(&cache_path)?
            .source_dir
            .with_context(|| {
                format!(
                    "option cache `{}` does not record a source directory",
                    cache_path.display()
                )
            })?,
    };

    let (project, cache) = load_configuration(&source_dir, &opts.build_dir, &[])?;
    let plan = configure(&project, &cache.options)
        .with_context(|| format!("failed to configure `{}`", project.name))?;

    if !plan.library_enabled() {
        tracing::info!("library disabled, nothing to install");
        return Ok(InstallResult {
            plan,
            files: Vec::new(),
        });
    }

    let mut files = Vec::new();
    for rule in &plan.install_rules {
        collect_rule(&plan, rule, &source_dir, opts, &mut files)?;
    }

    if let Some(ref export) = plan.export {
        files.push(InstalledFile {
            source: None,
            destination: opts
                .prefix
                .join(&export.destination)
                .join(&export.targets_file),
            kind: InstalledFileKind::Targets,
        });
    }

    if opts.dry_run {
        return Ok(InstallResult { plan, files });
    }

    for file in &files {
        match file.source {
            Some(ref source) => copy_file(source, &file.destination)?,
            None => {
                // Only the targets file is written without a source.
                if let Some(ref export) = plan.export {
                    let contents =
                        export.render_targets_file(&plan.graph, &plan.install_rules, &opts.os);
                    write_string(&file.destination, &contents)?;
                }
            }
        }
        tracing::debug!("installed {}", file.destination.display());
    }

    tracing::info!(
        "Installed {} files into {}",
        files.len(),
        opts.prefix.display()
    );

    Ok(InstallResult { plan, files })
}

fn collect_rule(
    plan: &ConfigurePlan,
    rule: &InstallRule,
    source_dir: &Path,
    opts: &InstallOptions,
    files: &mut Vec<InstalledFile>,
) -> Result<()> {
    let destination = opts.prefix.join(rule.destination());

    match rule {
        InstallRule::Artifact {
            target, artifact, ..
        } => {
            let Some(target) = plan.graph.target(target) else {
                bail!("install rule references unknown target `{}`", target);
            };
            if !artifact.applies_to(target.kind) {
                tracing::debug!("{} has no {} artifact, skipping", target.name, artifact);
                return Ok(());
            }
            let Some(filename) = target.output_filename(&opts.os) else {
                return Ok(());
            };

            let source = opts.build_dir.join(&filename);
            if !source.exists() {
                bail!(
                    "artifact `{}` for target `{}` not found in `{}`\n\
                     help: Build the project before installing",
                    filename,
                    target.name,
                    opts.build_dir.display()
                );
            }
            files.push(InstalledFile {
                source: Some(source),
                destination: destination.join(filename),
                kind: InstalledFileKind::Artifact,
            });
        }

        InstallRule::Headers {
            directory, pattern, ..
        } => {
            let root = source_dir.join(directory);
            if !root.is_dir() {
                tracing::warn!("header directory {} does not exist", root.display());
                return Ok(());
            }
            for rel in matching_files(&root, pattern)? {
                files.push(InstalledFile {
                    source: Some(root.join(&rel)),
                    destination: destination.join(&rel),
                    kind: InstalledFileKind::Header,
                });
            }
        }

        InstallRule::Generated { files: generated, .. } => {
            for file in generated {
                let source = opts.build_dir.join(file);
                if !source.exists() {
                    bail!(
                        "generated file `{}` is missing\n{}",
                        source.display(),
                        suggestions::NOT_CONFIGURED
                    );
                }
                let Some(name) = file.file_name() else {
                    continue;
                };
                files.push(InstalledFile {
                    source: Some(source),
                    destination: destination.join(name),
                    kind: InstalledFileKind::Generated,
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::configure::{configure_build, ConfigureOptions};
    use tempfile::TempDir;

    struct Fixture {
        tmp: TempDir,
    }

    impl Fixture {
        fn new(assignments: &[&str]) -> Self {
            let tmp = TempDir::new().unwrap();
            let src = tmp.path().join("src");
            std::fs::create_dir_all(src.join("include/detail")).unwrap();
            std::fs::write(src.join("include/Library.h"), "#pragma once\n").unwrap();
            std::fs::write(src.join("include/detail/Book.h"), "#pragma once\n").unwrap();
            std::fs::write(src.join("include/notes.txt"), "not a header\n").unwrap();

            configure_build(&ConfigureOptions {
                source_dir: src,
                build_dir: tmp.path().join("build"),
                assignments: assignments.iter().map(|s| s.to_string()).collect(),
                dry_run: false,
            })
            .unwrap();

            let build = tmp.path().join("build");
            std::fs::write(build.join("libLibrary.a"), "archive").unwrap();
            std::fs::write(build.join("lms"), "exe").unwrap();

            Fixture { tmp }
        }

        fn opts(&self) -> InstallOptions {
            let mut opts = InstallOptions::new(
                self.tmp.path().join("build"),
                self.tmp.path().join("prefix"),
            );
            opts.os = "linux".to_string();
            opts
        }

        fn prefix(&self) -> PathBuf {
            self.tmp.path().join("prefix")
        }
    }

    #[test]
    fn test_install_layout() {
        let fixture = Fixture::new(&[]);
        let result = install(&fixture.opts()).unwrap();
        let prefix = fixture.prefix();

        assert!(prefix.join("lib/libLibrary.a").exists());
        assert!(prefix.join("bin/lms").exists());
        assert!(prefix.join("include/Library.h").exists());
        assert!(prefix.join("include/detail/Book.h").exists());
        assert!(!prefix.join("include/notes.txt").exists());
        assert!(prefix.join("lib/cmake/LMS/LMSConfig.cmake").exists());
        assert!(prefix.join("lib/cmake/LMS/LMSConfigVersion.cmake").exists());
        assert!(prefix.join("lib/cmake/LMS/LMSTargets.cmake").exists());
        assert_eq!(result.files.len(), 7);
    }

    #[test]
    fn test_dry_run_copies_nothing() {
        let fixture = Fixture::new(&[]);
        let result = install(&fixture.opts().with_dry_run(true)).unwrap();

        assert_eq!(result.files.len(), 7);
        assert!(!fixture.prefix().exists());
    }

    #[test]
    fn test_disabled_installs_nothing() {
        let fixture = Fixture::new(&["USE_LIBRARY=OFF"]);
        let result = install(&fixture.opts()).unwrap();

        assert!(result.files.is_empty());
        assert!(!fixture.prefix().exists());
    }

    #[test]
    fn test_missing_artifact_is_reported() {
        let fixture = Fixture::new(&[]);
        std::fs::remove_file(fixture.tmp.path().join("build/lms")).unwrap();

        let err = install(&fixture.opts()).unwrap_err();
        assert!(err.to_string().contains("artifact `lms` for target `lms` not found"));
    }

    #[test]
    fn test_unconfigured_build_dir() {
        let tmp = TempDir::new().unwrap();
        let opts = InstallOptions::new(tmp.path().join("build"), tmp.path().join("prefix"));

        let err = install(&opts).unwrap_err();
        assert!(err.to_string().contains("has not been configured"));
    }
}
