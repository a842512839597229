//! Usage requirements carried by a target.
//!
//! Each target has a compile surface split into a public half, which
//! propagates to anything linking against the target, and a private half
//! used only when compiling the target itself.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::language::CompileFeature;
use crate::core::target::Visibility;

/// Public and private compile requirements of one target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileSurface {
    #[serde(default, skip_serializing_if = "CompileRequirements::is_empty")]
    pub public: CompileRequirements,

    #[serde(default, skip_serializing_if = "CompileRequirements::is_empty")]
    pub private: CompileRequirements,
}

impl CompileSurface {
    pub fn side_mut(&mut self, visibility: Visibility) -> &mut CompileRequirements {
        match visibility {
            Visibility::Public => &mut self.public,
            Visibility::Private => &mut self.private,
        }
    }
}

/// Include directories, compile features and definitions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileRequirements {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include_dirs: Vec<PathBuf>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<CompileFeature>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub defines: Vec<Define>,
}

impl CompileRequirements {
    pub fn is_empty(&self) -> bool {
        self.include_dirs.is_empty() && self.features.is_empty() && self.defines.is_empty()
    }
}

/// A compile definition, `NAME` or `NAME=VALUE`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Define {
    pub name: String,
    pub value: Option<String>,
}

impl Define {
    /// A definition without a value.
    pub fn flag(name: impl Into<String>) -> Self {
        Define {
            name: name.into(),
            value: None,
        }
    }

    /// Compiler flag form, e.g. `-DUSE_LIBRARY`.
    pub fn to_flag(&self) -> String {
        format!("-D{}", self)
    }
}

impl fmt::Display for Define {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Some(ref value) => write!(f, "{}={}", self.name, value),
            None => f.write_str(&self.name),
        }
    }
}

impl FromStr for Define {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, value) = match s.split_once('=') {
            Some((name, value)) => (name.trim(), Some(value.to_string())),
            None => (s.trim(), None),
        };
        if name.is_empty() {
            return Err(format!("invalid definition `{}`", s));
        }
        Ok(Define {
            name: name.to_string(),
            value,
        })
    }
}

impl Serialize for Define {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Define {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::language::CppStandard;

    #[test]
    fn test_define_forms() {
        assert_eq!(Define::flag("USE_LIBRARY").to_flag(), "-DUSE_LIBRARY");
        let versioned: Define = "LMS_VERSION=2".parse().unwrap();
        assert_eq!(versioned.value.as_deref(), Some("2"));
        assert_eq!(versioned.to_flag(), "-DLMS_VERSION=2");
        assert!("=2".parse::<Define>().is_err());
    }

    #[test]
    fn test_surface_sides() {
        let mut surface = CompileSurface::default();
        surface
            .side_mut(Visibility::Private)
            .defines
            .push(Define::flag("USE_LIBRARY"));

        surface
            .side_mut(Visibility::Public)
            .features
            .push(CompileFeature::CxxStd(CppStandard::Cpp17));

        assert_eq!(surface.private.defines, vec![Define::flag("USE_LIBRARY")]);
        assert_eq!(surface.public.features.len(), 1);
        assert!(surface.public.defines.is_empty());
    }
}
