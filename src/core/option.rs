//! Configuration options - boolean toggles read once at configure time.
//!
//! An option is declared by the project with a default value. A configure
//! run receives an explicit [`OptionValues`] set; anything not assigned
//! there falls back to the declared default.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while parsing or applying option assignments.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OptionError {
    #[error("invalid boolean value `{value}` for option `{name}` (expected ON/OFF, TRUE/FALSE, YES/NO, 1/0)")]
    InvalidBool { name: String, value: String },

    #[error("invalid option assignment `{0}` (expected NAME=VALUE)")]
    InvalidAssignment(String),

    #[error("unknown option `{name}`")]
    Unknown { name: String, declared: Vec<String> },
}

/// A declared boolean option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildOption {
    /// Option name (e.g. `USE_LIBRARY`)
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Value used when the option is not assigned
    #[serde(default = "default_true")]
    pub default: bool,
}

fn default_true() -> bool {
    true
}

impl BuildOption {
    /// Declare a new option.
    pub fn new(name: impl Into<String>, description: impl Into<String>, default: bool) -> Self {
        BuildOption {
            name: name.into(),
            description: description.into(),
            default,
        }
    }
}

impl fmt::Display for BuildOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (default {}) - {}",
            self.name,
            format_bool(self.default),
            self.description
        )
    }
}

/// Explicit option assignments for one configure run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionValues {
    values: BTreeMap<String, bool>,
}

impl OptionValues {
    /// No assignments; every option takes its default.
    pub fn new() -> Self {
        OptionValues::default()
    }

    /// Assign a value, replacing any previous assignment.
    pub fn set(&mut self, name: impl Into<String>, value: bool) -> &mut Self {
        self.values.insert(name.into(), value);
        self
    }

    /// Builder-style assignment.
    pub fn with(mut self, name: impl Into<String>, value: bool) -> Self {
        self.set(name, value);
        self
    }

    /// Parse and apply a `NAME=VALUE` assignment.
    pub fn apply_assignment(&mut self, assignment: &str) -> Result<(), OptionError> {
        let (name, value) = assignment
            .split_once('=')
            .ok_or_else(|| OptionError::InvalidAssignment(assignment.to_string()))?;

        // Accept CMake-style typed assignments such as `USE_LIBRARY:BOOL=OFF`.
        let name = name.split_once(':').map(|(n, _)| n).unwrap_or(name).trim();
        if name.is_empty() {
            return Err(OptionError::InvalidAssignment(assignment.to_string()));
        }

        let value = parse_bool(name, value.trim())?;
        self.set(name, value);
        Ok(())
    }

    /// Explicit assignment for `name`, if any.
    pub fn get(&self, name: &str) -> Option<bool> {
        self.values.get(name).copied()
    }

    /// Effective value of a declared option.
    pub fn resolve(&self, option: &BuildOption) -> bool {
        self.get(&option.name).unwrap_or(option.default)
    }

    /// Overlay `other` on top of these assignments (other wins).
    pub fn merge(&mut self, other: &OptionValues) {
        for (name, value) in &other.values {
            self.values.insert(name.clone(), *value);
        }
    }

    /// Reject assignments to options the project does not declare.
    pub fn validate(&self, declared: &[BuildOption]) -> Result<(), OptionError> {
        for name in self.values.keys() {
            if !declared.iter().any(|o| &o.name == name) {
                return Err(OptionError::Unknown {
                    name: name.clone(),
                    declared: declared.iter().map(|o| o.name.clone()).collect(),
                });
            }
        }
        Ok(())
    }

    /// Iterate over explicit assignments.
    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Parse a CMake-style boolean.
pub fn parse_bool(name: &str, value: &str) -> Result<bool, OptionError> {
    match value.to_ascii_uppercase().as_str() {
        "ON" | "TRUE" | "YES" | "Y" | "1" => Ok(true),
        "OFF" | "FALSE" | "NO" | "N" | "0" => Ok(false),
        _ => Err(OptionError::InvalidBool {
            name: name.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Render a boolean the way option values are displayed.
pub fn format_bool(value: bool) -> &'static str {
    if value {
        "ON"
    } else {
        "OFF"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn use_library() -> BuildOption {
        BuildOption::new("USE_LIBRARY", "Build the library", true)
    }

    #[test]
    fn test_unset_option_takes_default() {
        let values = OptionValues::new();
        assert!(values.resolve(&use_library()));

        let off = BuildOption::new("EXTRA", "", false);
        assert!(!values.resolve(&off));
    }

    #[test]
    fn test_apply_assignment() {
        let mut values = OptionValues::new();
        values.apply_assignment("USE_LIBRARY=OFF").unwrap();
        assert_eq!(values.get("USE_LIBRARY"), Some(false));
        assert!(!values.resolve(&use_library()));

        values.apply_assignment("USE_LIBRARY:BOOL=yes").unwrap();
        assert_eq!(values.get("USE_LIBRARY"), Some(true));
    }

    #[test]
    fn test_invalid_assignments() {
        let mut values = OptionValues::new();
        assert_eq!(
            values.apply_assignment("USE_LIBRARY"),
            Err(OptionError::InvalidAssignment("USE_LIBRARY".to_string()))
        );
        assert!(matches!(
            values.apply_assignment("USE_LIBRARY=maybe"),
            Err(OptionError::InvalidBool { .. })
        ));
        assert!(matches!(
            values.apply_assignment("=ON"),
            Err(OptionError::InvalidAssignment(_))
        ));
    }

    #[test]
    fn test_validate_rejects_undeclared() {
        let values = OptionValues::new().with("USE_LIBARY", false);
        let err = values.validate(&[use_library()]).unwrap_err();
        assert!(err.to_string().contains("USE_LIBARY"));
    }

    #[test]
    fn test_merge_later_wins() {
        let mut cached = OptionValues::new().with("USE_LIBRARY", false);
        cached.merge(&OptionValues::new().with("USE_LIBRARY", true));
        assert_eq!(cached.get("USE_LIBRARY"), Some(true));
    }
}
