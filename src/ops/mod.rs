//! High-level operations.
//!
//! This module contains the implementation of lms-build commands.

pub mod configure;
pub mod install;
pub mod locate;

pub use configure::{configure_build, ConfigureOptions, ConfigureResult, PLAN_FILE};
pub use install::{install, InstallOptions, InstallResult, InstalledFile, InstalledFileKind};
pub use locate::{locate, LocateError, LocateOptions, LocatedPackage, PREFIX_PATH_ENV};
