//! `lms-build graph` command

use anyhow::Result;

use crate::cli::GraphArgs;
use crate::commands::{emit_diagnostics, plan_for};
use lms_build::builder::plan::ConfigurePlan;
use lms_build::core::option::format_bool;
use lms_build::core::target::{LinkTarget, Target};

pub fn execute(args: GraphArgs, color: bool) -> Result<()> {
    let plan = plan_for(&args.project)?;

    emit_diagnostics(&plan, color);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&plan.graph)?);
        return Ok(());
    }

    print_graph(&plan);
    Ok(())
}

fn print_graph(plan: &ConfigurePlan) {
    println!("{} {}", plan.project, plan.version);
    for (name, value) in &plan.options {
        println!("option {} = {}", name, format_bool(*value));
    }
    println!();

    let order = plan.graph.build_order();
    for target in &order {
        print_target(plan, target);
    }

    if !plan.graph.required_packages().is_empty() {
        println!();
        println!(
            "required packages: {}",
            plan.graph.required_packages().join(", ")
        );
    }

    let names: Vec<&str> = order.iter().map(|t| t.name.as_str()).collect();
    println!("build order: {}", names.join(" -> "));
}

fn print_target(plan: &ConfigurePlan, target: &Target) {
    println!("{} ({})", target.name, target.kind);

    let dependents: Vec<&str> = plan
        .graph
        .dependents(&target.name)
        .into_iter()
        .map(|(t, _)| t.name.as_str())
        .collect();
    if !dependents.is_empty() {
        println!("    used by: {}", dependents.join(", "));
    }

    let count = target.links.len();
    for (i, edge) in target.links.iter().enumerate() {
        let branch = if i + 1 == count { "└──" } else { "├──" };
        let origin = match edge.target {
            LinkTarget::Local { .. } => String::new(),
            LinkTarget::External { ref package, .. } => format!(", imported from {}", package),
        };
        println!(
            "{} {} ({}{})",
            branch,
            edge.target.name(),
            edge.visibility,
            origin
        );
    }
}
