//! Shared utilities

pub mod config;
pub mod diagnostic;
pub mod fs;

pub use config::OptionCache;
pub use diagnostic::Diagnostic;
