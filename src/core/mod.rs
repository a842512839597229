//! Core data structures for lms-build.
//!
//! This module contains the foundational types used throughout the crate:
//! - Build options and their values
//! - Project versions and compatibility policies
//! - Targets and their compile surfaces
//! - The project description

pub mod language;
pub mod option;
pub mod project;
pub mod surface;
pub mod target;
pub mod version;

pub use option::{BuildOption, OptionValues};
pub use project::{Project, PROJECT_FILE};
pub use surface::{CompileRequirements, CompileSurface, Define};
pub use target::{LinkEdge, LinkTarget, Target, TargetKind, Visibility};
pub use version::{Compatibility, ProjectVersion};
