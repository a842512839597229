//! `lms-build configure` command

use anyhow::Result;

use crate::cli::ConfigureArgs;
use crate::commands::{emit_diagnostics, explain};
use lms_build::core::option::format_bool;
use lms_build::ops::configure::{configure_build, ConfigureOptions};

pub fn execute(args: ConfigureArgs, color: bool) -> Result<()> {
    let opts = ConfigureOptions {
        source_dir: args.source_dir,
        build_dir: args.build_dir,
        assignments: args.define,
        dry_run: args.dry_run,
    };

    let result = configure_build(&opts).map_err(explain)?;
    let plan = &result.plan;

    emit_diagnostics(plan, color);

    if opts.dry_run {
        println!("{}", plan.to_json()?);
        return Ok(());
    }

    println!("Configured {} {}", plan.project, plan.version);
    for (name, value) in &plan.options {
        println!("  option {} = {}", name, format_bool(*value));
    }

    let targets: Vec<&str> = plan
        .graph
        .build_order()
        .iter()
        .map(|t| t.name.as_str())
        .collect();
    println!("  targets: {}", targets.join(", "));

    if !plan.graph.required_packages().is_empty() {
        println!(
            "  required packages: {}",
            plan.graph.required_packages().join(", ")
        );
    }

    for path in &result.written {
        println!("  wrote {}", path.display());
    }

    Ok(())
}
