//! lms-build - configure, install and package the Library Management System
//!
//! This crate turns a small declarative project description into a
//! configure plan: a target graph with usage requirements, install rules,
//! an export descriptor and a package manifest. The plan is computed from
//! explicit option values and handed to an external build phase.

pub mod builder;
pub mod core;
pub mod ops;
pub mod util;

pub use builder::{configure, ConfigurePlan, TargetGraph};
pub use crate::core::{option::OptionValues, project::Project, target::Target};
