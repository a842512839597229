//! Configure-time planning.
//!
//! This module turns a project and its option values into a configure plan.

pub mod export;
pub mod graph;
pub mod install;
pub mod package;
pub mod plan;
pub mod usage;

pub use export::{ExportDescriptor, GeneratedFile};
pub use graph::{TargetGraph, DISABLED_MESSAGE};
pub use install::{ArtifactKind, InstallRule};
pub use package::PackageManifest;
pub use plan::{configure, ConfigurePlan, PlanError};
pub use usage::{EffectiveCompile, UsageResolver};
