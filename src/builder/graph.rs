//! Target graph construction.
//!
//! [`TargetGraph::build`] is a pure function from a project description and
//! an explicit set of option values to the immutable graph of targets and
//! link edges for that configuration. Nothing here reads global state, so
//! the same project can be evaluated under several configurations.

use std::collections::HashMap;

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::core::language::CompileFeature;
use crate::core::option::{format_bool, OptionError, OptionValues};
use crate::core::project::Project;
use crate::core::surface::Define;
use crate::core::target::{LinkEdge, LinkTarget, Target, TargetKind, Visibility};
use crate::util::diagnostic::Diagnostic;

/// Message emitted when the library option is off.
pub const DISABLED_MESSAGE: &str = "Library Management System is disabled.";

/// Errors that make a target graph invalid.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error(transparent)]
    Option(#[from] OptionError),

    #[error("target `{0}` is defined more than once")]
    DuplicateTarget(String),

    #[error("target `{from}` links to `{to}`, which is not defined in this configuration")]
    UnknownLinkTarget { from: String, to: String },

    #[error("target `{target}` links to `{name}` from package `{package}`, which is not a required package")]
    UndeclaredPackage {
        target: String,
        package: String,
        name: String,
    },

    #[error("{kind} target `{target}` has no source files")]
    MissingSources { target: String, kind: TargetKind },

    #[error("interface target `{0}` cannot have source files")]
    InterfaceWithSources(String),

    #[error("link cycle detected involving target `{0}`")]
    Cycle(String),
}

/// The immutable target graph for one configuration.
///
/// Edges run from a target to the targets it links against. Only links to
/// targets defined in this graph become edges; links to imported targets
/// are kept on the [`Target`] and checked against the required packages.
#[derive(Debug, Clone)]
pub struct TargetGraph {
    graph: DiGraph<Target, Visibility>,
    by_name: HashMap<String, NodeIndex>,
    order: Vec<NodeIndex>,
    required_packages: Vec<String>,
    diagnostics: Vec<Diagnostic>,
    library_enabled: bool,
}

impl TargetGraph {
    /// Build the graph for `project` under `options`.
    pub fn build(project: &Project, options: &OptionValues) -> Result<Self, GraphError> {
        options.validate(std::slice::from_ref(&project.option))?;

        let enabled = options.resolve(&project.option);
        let layout = &project.layout;

        tracing::debug!(
            "configuring with {}={}",
            project.option.name,
            format_bool(enabled)
        );

        let mut targets = Vec::new();
        let mut required_packages = Vec::new();
        let mut diagnostics = Vec::new();

        targets.push(Target::interface(&layout.settings).with_feature(
            CompileFeature::CxxStd(layout.cxx_standard),
            Visibility::Public,
        ));

        let mut executable =
            Target::executable(&layout.executable).with_sources(layout.executable_sources.clone());

        if enabled {
            targets.push(
                Target::static_library(&layout.library)
                    .with_sources(layout.library_sources.clone())
                    .with_include_dir(layout.include_dir.clone(), Visibility::Public),
            );

            executable = executable
                .with_link(LinkEdge::private(LinkTarget::local(&layout.library)))
                .with_define(Define::flag(&layout.library_define), Visibility::Private);
            targets.push(executable);

            let framework = &layout.test_framework;
            required_packages.push(framework.package.clone());
            targets.push(
                Target::executable(&layout.tests)
                    .with_sources(layout.test_sources.clone())
                    .with_link(LinkEdge::private(LinkTarget::local(&layout.library)))
                    .with_link(LinkEdge::private(LinkTarget::external(
                        &framework.package,
                        &framework.target,
                    ))),
            );
        } else {
            executable =
                executable.with_link(LinkEdge::private(LinkTarget::local(&layout.settings)));
            targets.push(executable);

            tracing::debug!("{}", DISABLED_MESSAGE);
            diagnostics.push(Diagnostic::note(DISABLED_MESSAGE).with_context(format!(
                "{} is OFF; `{}` links `{}` instead of `{}`",
                project.option.name, layout.executable, layout.settings, layout.library
            )));
        }

        Self::assemble(targets, required_packages, diagnostics, enabled)
    }

    /// Assemble and validate a graph from explicit parts.
    pub fn assemble(
        targets: Vec<Target>,
        required_packages: Vec<String>,
        diagnostics: Vec<Diagnostic>,
        library_enabled: bool,
    ) -> Result<Self, GraphError> {
        let mut graph = DiGraph::new();
        let mut by_name = HashMap::new();

        for target in targets {
            match (target.kind, target.sources.is_empty()) {
                (TargetKind::Interface, false) => {
                    return Err(GraphError::InterfaceWithSources(target.name));
                }
                (kind, true) if kind.produces_artifact() => {
                    return Err(GraphError::MissingSources {
                        target: target.name,
                        kind,
                    });
                }
                _ => {}
            }

            if by_name.contains_key(&target.name) {
                return Err(GraphError::DuplicateTarget(target.name));
            }

            let name = target.name.clone();
            let node = graph.add_node(target);
            by_name.insert(name, node);
        }

        let mut edges = Vec::new();
        for node in graph.node_indices() {
            let target = &graph[node];
            for edge in &target.links {
                match &edge.target {
                    LinkTarget::Local { name } => {
                        let to = by_name.get(name).copied().ok_or_else(|| {
                            GraphError::UnknownLinkTarget {
                                from: target.name.clone(),
                                to: name.clone(),
                            }
                        })?;
                        edges.push((node, to, edge.visibility));
                    }
                    LinkTarget::External { package, name } => {
                        if !required_packages.contains(package) {
                            return Err(GraphError::UndeclaredPackage {
                                target: target.name.clone(),
                                package: package.clone(),
                                name: name.clone(),
                            });
                        }
                    }
                }
            }
        }

        for (from, to, visibility) in edges {
            graph.add_edge(from, to, visibility);
        }

        // toposort yields dependents before their dependencies
        let mut order = toposort(&graph, None)
            .map_err(|cycle| GraphError::Cycle(graph[cycle.node_id()].name.clone()))?;
        order.reverse();

        Ok(TargetGraph {
            graph,
            by_name,
            order,
            required_packages,
            diagnostics,
            library_enabled,
        })
    }

    /// Whether the library option was on for this configuration.
    pub fn library_enabled(&self) -> bool {
        self.library_enabled
    }

    /// Look up a target by name.
    pub fn target(&self, name: &str) -> Option<&Target> {
        self.by_name.get(name).map(|&node| &self.graph[node])
    }

    /// Check if a target exists.
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// All targets in definition order.
    pub fn targets(&self) -> impl Iterator<Item = &Target> {
        self.graph.node_indices().map(move |n| &self.graph[n])
    }

    /// Number of targets.
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Targets that link directly against `name`, sorted by name.
    pub fn dependents(&self, name: &str) -> Vec<(&Target, Visibility)> {
        let Some(&node) = self.by_name.get(name) else {
            return Vec::new();
        };

        let mut result: Vec<_> = self
            .graph
            .edges_directed(node, Direction::Incoming)
            .map(|edge| (&self.graph[edge.source()], *edge.weight()))
            .collect();
        result.sort_by(|a, b| a.0.name.cmp(&b.0.name));
        result
    }

    /// Targets in build order: every target after the targets it links.
    pub fn build_order(&self) -> Vec<&Target> {
        self.order.iter().map(|&n| &self.graph[n]).collect()
    }

    /// External packages that must be found for this configuration.
    pub fn required_packages(&self) -> &[String] {
        &self.required_packages
    }

    /// Diagnostics produced while building the graph.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

impl Serialize for TargetGraph {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let targets: Vec<&Target> = self.targets().collect();
        let order: Vec<&str> = self.build_order().iter().map(|t| t.name.as_str()).collect();

        let mut state = serializer.serialize_struct("TargetGraph", 3)?;
        state.serialize_field("targets", &targets)?;
        state.serialize_field("build_order", &order)?;
        state.serialize_field("required_packages", &self.required_packages)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::language::CppStandard;
    use std::path::PathBuf;

    fn project() -> Project {
        Project::with_defaults("/src")
    }

    fn enabled() -> TargetGraph {
        TargetGraph::build(&project(), &OptionValues::new()).unwrap()
    }

    fn disabled() -> TargetGraph {
        let options = OptionValues::new().with("USE_LIBRARY", false);
        TargetGraph::build(&project(), &options).unwrap()
    }

    #[test]
    fn test_option_defaults_to_enabled() {
        let graph = enabled();
        assert!(graph.library_enabled());
        assert!(graph.contains("Library"));
        assert!(graph.contains("lms_tests"));
        assert_eq!(graph.len(), 4);
        assert!(graph.diagnostics().is_empty());
    }

    #[test]
    fn test_settings_target_always_present() {
        for graph in [enabled(), disabled()] {
            let settings = graph.target("lms_compiler_flags").unwrap();
            assert_eq!(settings.kind, TargetKind::Interface);
            assert!(settings.sources.is_empty());
            assert_eq!(
                settings.surface.public.features,
                vec![CompileFeature::CxxStd(CppStandard::Cpp17)]
            );

            let exe = graph.target("lms").unwrap();
            assert_eq!(exe.kind, TargetKind::Executable);
            assert_eq!(exe.sources, vec![PathBuf::from("src/main.cpp")]);
        }
    }

    #[test]
    fn test_enabled_executable_links_library_not_settings() {
        let graph = enabled();
        let exe = graph.target("lms").unwrap();

        assert!(exe.links_to("Library"));
        assert!(!exe.links_to("lms_compiler_flags"));
        assert_eq!(exe.links[0].visibility, Visibility::Private);
        assert_eq!(exe.surface.private.defines, vec![Define::flag("USE_LIBRARY")]);

        let library = graph.target("Library").unwrap();
        assert_eq!(library.kind, TargetKind::StaticLibrary);
        assert_eq!(library.sources.len(), 3);
        assert_eq!(library.surface.public.include_dirs, vec![PathBuf::from("include")]);
    }

    #[test]
    fn test_disabled_executable_links_settings_not_library() {
        let graph = disabled();
        let exe = graph.target("lms").unwrap();

        assert!(exe.links_to("lms_compiler_flags"));
        assert!(!exe.links_to("Library"));
        assert!(exe.surface.private.defines.is_empty());

        assert!(!graph.library_enabled());
        assert!(!graph.contains("Library"));
        assert!(!graph.contains("lms_tests"));
        assert!(graph.required_packages().is_empty());
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn test_disabled_emits_diagnostic() {
        let graph = disabled();
        assert_eq!(graph.diagnostics().len(), 1);
        assert_eq!(graph.diagnostics()[0].message, DISABLED_MESSAGE);
    }

    #[test]
    fn test_test_executable_links_library_and_framework() {
        let graph = enabled();
        let tests = graph.target("lms_tests").unwrap();

        assert!(tests.links_to("Library"));
        assert!(tests.links_to("GTest::gtest_main"));
        assert!(tests
            .links
            .iter()
            .all(|edge| edge.visibility == Visibility::Private));
        assert_eq!(graph.required_packages(), ["GTest".to_string()]);
    }

    #[test]
    fn test_build_order_puts_dependencies_first() {
        let graph = enabled();
        let order: Vec<&str> = graph.build_order().iter().map(|t| t.name.as_str()).collect();

        let pos = |name: &str| order.iter().position(|n| *n == name).unwrap();
        assert!(pos("Library") < pos("lms"));
        assert!(pos("Library") < pos("lms_tests"));
        assert_eq!(order.len(), 4);
    }

    #[test]
    fn test_dependents() {
        let graph = enabled();
        let dependents: Vec<&str> = graph
            .dependents("Library")
            .into_iter()
            .map(|(t, _)| t.name.as_str())
            .collect();
        assert_eq!(dependents, vec!["lms", "lms_tests"]);
        assert!(graph.dependents("lms").is_empty());
        assert!(graph.dependents("GTest::gtest_main").is_empty());
    }

    #[test]
    fn test_unknown_option_rejected() {
        let options = OptionValues::new().with("USE_LIBARY", false);
        let err = TargetGraph::build(&project(), &options).unwrap_err();
        assert!(matches!(err, GraphError::Option(OptionError::Unknown { .. })));
    }

    #[test]
    fn test_dangling_link_rejected() {
        let exe = Target::executable("lms")
            .with_sources(["src/main.cpp"])
            .with_link(LinkEdge::private(LinkTarget::local("Library")));

        let err = TargetGraph::assemble(vec![exe], vec![], vec![], false).unwrap_err();
        assert!(matches!(err, GraphError::UnknownLinkTarget { .. }));
    }

    #[test]
    fn test_undeclared_external_package_rejected() {
        let exe = Target::executable("lms_tests")
            .with_sources(["tests/test_library.cpp"])
            .with_link(LinkEdge::private(LinkTarget::external("GTest", "GTest::gtest_main")));

        let err = TargetGraph::assemble(vec![exe], vec![], vec![], true).unwrap_err();
        assert!(matches!(err, GraphError::UndeclaredPackage { .. }));
    }

    #[test]
    fn test_cycle_rejected() {
        let a = Target::static_library("a")
            .with_sources(["a.cpp"])
            .with_link(LinkEdge::public(LinkTarget::local("b")));
        let b = Target::static_library("b")
            .with_sources(["b.cpp"])
            .with_link(LinkEdge::public(LinkTarget::local("a")));

        let err = TargetGraph::assemble(vec![a, b], vec![], vec![], true).unwrap_err();
        assert!(matches!(err, GraphError::Cycle(_)));
    }

    #[test]
    fn test_source_invariants() {
        let err = TargetGraph::assemble(vec![Target::executable("lms")], vec![], vec![], true)
            .unwrap_err();
        assert!(matches!(err, GraphError::MissingSources { .. }));

        let iface = Target::interface("flags").with_sources(["x.cpp"]);
        let err = TargetGraph::assemble(vec![iface], vec![], vec![], true).unwrap_err();
        assert!(matches!(err, GraphError::InterfaceWithSources(_)));

        let dup = vec![Target::interface("flags"), Target::interface("flags")];
        let err = TargetGraph::assemble(dup, vec![], vec![], true).unwrap_err();
        assert!(matches!(err, GraphError::DuplicateTarget(_)));
    }

    #[test]
    fn test_graph_serializes() {
        let json = serde_json::to_value(enabled()).unwrap();
        assert_eq!(json["targets"].as_array().unwrap().len(), 4);
        assert_eq!(json["required_packages"][0], "GTest");
    }
}
