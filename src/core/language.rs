//! Language standards and compile features.
//!
//! A compile feature is a usage requirement that asks for a minimum
//! language standard, written `cxx_std_17` in the build tool's vocabulary.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported C++ standard `{0}` (expected 11, 14, 17, 20 or 23)")]
pub struct CppStandardParseError(pub String);

/// C++ language standard, ordered oldest to newest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CppStandard {
    Cpp11,
    Cpp14,
    Cpp17,
    Cpp20,
    Cpp23,
}

impl CppStandard {
    const ALL: [CppStandard; 5] = [
        CppStandard::Cpp11,
        CppStandard::Cpp14,
        CppStandard::Cpp17,
        CppStandard::Cpp20,
        CppStandard::Cpp23,
    ];

    /// Two-digit year of the standard.
    pub fn year(&self) -> u8 {
        match self {
            CppStandard::Cpp11 => 11,
            CppStandard::Cpp14 => 14,
            CppStandard::Cpp17 => 17,
            CppStandard::Cpp20 => 20,
            CppStandard::Cpp23 => 23,
        }
    }

    pub fn from_year(year: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.year() == year)
    }

    /// Value for `-std=`, e.g. `c++17`.
    pub fn as_flag_value(&self) -> String {
        format!("c++{}", self.year())
    }
}

/// Accepts `17`, `c++17` and `cpp17`.
impl FromStr for CppStandard {
    type Err = CppStandardParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("c++")
            .or_else(|| s.strip_prefix("cpp"))
            .unwrap_or(s);
        digits
            .parse()
            .ok()
            .and_then(Self::from_year)
            .ok_or_else(|| CppStandardParseError(s.to_string()))
    }
}

impl fmt::Display for CppStandard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C++{}", self.year())
    }
}

impl Serialize for CppStandard {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.year())
    }
}

impl<'de> Deserialize<'de> for CppStandard {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Year(u8),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Year(year) => Self::from_year(year)
                .ok_or_else(|| serde::de::Error::custom(CppStandardParseError(year.to_string()))),
            Repr::Text(text) => text.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// A compile feature requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CompileFeature {
    /// Minimum C++ language standard (`cxx_std_NN`)
    CxxStd(CppStandard),
}

impl CompileFeature {
    pub fn standard(&self) -> CppStandard {
        match self {
            CompileFeature::CxxStd(std) => *std,
        }
    }

    pub fn to_flag(&self) -> String {
        format!("-std={}", self.standard().as_flag_value())
    }
}

impl fmt::Display for CompileFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileFeature::CxxStd(std) => write!(f, "cxx_std_{}", std.year()),
        }
    }
}

impl FromStr for CompileFeature {
    type Err = CppStandardParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let year = s
            .strip_prefix("cxx_std_")
            .ok_or_else(|| CppStandardParseError(s.to_string()))?;
        Ok(CompileFeature::CxxStd(year.parse()?))
    }
}

impl Serialize for CompileFeature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CompileFeature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_feature_names() {
        let feature = CompileFeature::CxxStd(CppStandard::Cpp17);
        assert_eq!(feature.to_string(), "cxx_std_17");
        assert_eq!("cxx_std_17".parse::<CompileFeature>(), Ok(feature));
        assert_eq!(feature.to_flag(), "-std=c++17");
    }

    #[test]
    fn test_invalid_feature() {
        assert!("cxx_std_18".parse::<CompileFeature>().is_err());
        assert!("c_std_11".parse::<CompileFeature>().is_err());
    }

    #[test]
    fn test_standard_spellings() {
        for text in ["17", "c++17", "cpp17"] {
            assert_eq!(text.parse::<CppStandard>(), Ok(CppStandard::Cpp17));
        }
        assert!("c++98".parse::<CppStandard>().is_err());
        assert_eq!(CppStandard::Cpp20.to_string(), "C++20");
    }

    #[test]
    fn test_standard_deserializes_from_number_or_text() {
        #[derive(Deserialize)]
        struct Layout {
            cxx_standard: CppStandard,
        }

        let layout: Layout = toml::from_str("cxx_standard = 20").unwrap();
        assert_eq!(layout.cxx_standard, CppStandard::Cpp20);
        let layout: Layout = toml::from_str("cxx_standard = \"c++14\"").unwrap();
        assert_eq!(layout.cxx_standard, CppStandard::Cpp14);
        assert!(toml::from_str::<Layout>("cxx_standard = 18").is_err());
    }

    #[test]
    fn test_standards_are_ordered() {
        assert!(CppStandard::Cpp17 > CppStandard::Cpp14);
        assert!(
            CompileFeature::CxxStd(CppStandard::Cpp20) > CompileFeature::CxxStd(CppStandard::Cpp17)
        );
    }
}
