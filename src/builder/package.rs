//! Package manifest for the external packaging tool.
//!
//! The manifest is emitted for every configuration. Its version is taken
//! verbatim from the package settings and is tracked separately from the
//! project version; the two are allowed to differ.


use serde::Serialize;

use crate::core::project::{Generator, Project};
use crate::core::version::ProjectVersion;

/// Metadata describing the distributable archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageManifest {
    pub name: String,
    pub version: ProjectVersion,
    pub generator: Generator,
    pub contact: String,
}

impl PackageManifest {
    /// Build the manifest from the project's package settings.
    pub fn from_project(project: &Project) -> Self {
        let package = &project.package;
        PackageManifest {
            name: package.name.clone(),
            version: package.version.clone(),
            generator: package.generator,
            contact: package.contact.clone(),
        }
    }

    /// File name of the archive the packaging tool will produce.
    pub fn archive_name(&self, arch: &str) -> String {
        format!(
            "{}-{}-{}.{}",
            self.name,
            self.version,
            arch,
            self.generator.extension()
        )
    }

    /// Variables understood by the packaging tool, in emission order.
    pub fn variables(&self) -> Vec<(&'static str, String)> {
        vec![
            ("CPACK_GENERATOR", self.generator.as_str().to_string()),
            ("CPACK_PACKAGE_NAME", self.name.clone()),
            ("CPACK_PACKAGE_VERSION", self.version.to_string()),
            ("CPACK_PACKAGE_CONTACT", self.contact.clone()),
        ]
    }

    /// Render the variables as a packaging-tool configuration script.
    pub fn render_config(&self) -> String {
        let mut out = String::new();
        for (name, value) in self.variables() {
            out.push_str(&format!("set({} \"{}\")\n", name, value.replace('"', "\\\"")));
        }
        out
    }

    /// Render a Debian control stanza.
    pub fn render_control(&self, arch: &str) -> String {
        let package = self.name.to_ascii_lowercase();
        let mut out = String::new();
        out.push_str(&format!("Package: {}\n", package));
        out.push_str(&format!("Version: {}\n", self.version));
        out.push_str(&format!("Architecture: {}\n", arch));
        out.push_str(&format!("Maintainer: {}\n", self.contact));
        out.push_str(&format!("Description: {}\n", self.name));
        out
    }
}

/// Map a Rust target architecture to its Debian name.
pub fn debian_arch(arch: &str) -> &str {
    match arch {
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        "x86" => "i386",
        "arm" => "armhf",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_from_defaults() {
        let manifest = PackageManifest::from_project(&Project::with_defaults("/src"));
        assert_eq!(manifest.name, "LibraryManagementSystem");
        assert_eq!(manifest.generator, Generator::Deb);
        assert_eq!(manifest.version.as_str(), "4.0");
    }

    #[test]
    fn test_package_version_independent_of_project_version() {
        let project = Project::with_defaults("/src");
        let manifest = PackageManifest::from_project(&project);

        assert_eq!(project.version.as_str(), "2.0");
        assert_eq!(manifest.version.as_str(), "4.0");
        assert_ne!(manifest.version, project.version);
    }

    #[test]
    fn test_version_emitted_exactly_as_configured() {
        let mut project = Project::with_defaults("/src");
        project.package.version = "4.0.1".parse().unwrap();
        let manifest = PackageManifest::from_project(&project);

        assert!(manifest
            .render_config()
            .contains("set(CPACK_PACKAGE_VERSION \"4.0.1\")"));
        assert!(manifest.render_control("amd64").contains("Version: 4.0.1\n"));
    }

    #[test]
    fn test_render_config() {
        let manifest = PackageManifest::from_project(&Project::with_defaults("/src"));
        let config = manifest.render_config();
        assert!(config.starts_with("set(CPACK_GENERATOR \"DEB\")\n"));
        assert!(config.contains("set(CPACK_PACKAGE_NAME \"LibraryManagementSystem\")"));
    }

    #[test]
    fn test_archive_name() {
        let manifest = PackageManifest::from_project(&Project::with_defaults("/src"));
        assert_eq!(
            manifest.archive_name(debian_arch("x86_64")),
            "LibraryManagementSystem-4.0-amd64.deb"
        );
    }
}
